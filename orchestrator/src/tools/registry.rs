use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::info;

use super::explainer::ConceptExplainer;
use super::flashcards::FlashcardGenerator;
use super::note_maker::NoteMaker;
use super::{Tool, ToolSpec};
use crate::error::RegistryError;

/// Name → tool mapping. Built once at startup and shared read-only.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the note maker, flashcard generator and concept explainer.
    pub fn with_builtin_tools() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(Arc::new(NoteMaker::new()))?;
        registry.register(Arc::new(FlashcardGenerator::new()))?;
        registry.register(Arc::new(ConceptExplainer::new()))?;
        Ok(registry)
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let spec = tool.spec();
        if self.index.contains_key(&spec.name) {
            return Err(RegistryError::DuplicateTool(spec.name.clone()));
        }

        let mut seen = HashSet::new();
        for param in &spec.parameters {
            if !seen.insert(param.name.as_str()) {
                return Err(RegistryError::DuplicateParameter {
                    tool: spec.name.clone(),
                    parameter: param.name.clone(),
                });
            }
        }

        info!("Registered tool {}", spec.signature());
        self.index.insert(spec.name.clone(), self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&ToolSpec, RegistryError> {
        self.tool(name).map(|tool| tool.spec())
    }

    pub fn tool(&self, name: &str) -> Result<&Arc<dyn Tool>, RegistryError> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Specs in registration order.
    pub fn list_specs(&self) -> Vec<&ToolSpec> {
        self.tools.iter().map(|tool| tool.spec()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
