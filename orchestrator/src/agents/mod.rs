pub mod executor;
pub mod fallback;
pub mod formatter;
pub mod planner;
pub mod reasoning;

pub use executor::ExecutorAgent;
pub use fallback::RuleBasedPlanner;
pub use formatter::FormatterAgent;
pub use planner::PlannerAgent;
pub use reasoning::{GeminiService, ReasoningRequest, ReasoningService};
