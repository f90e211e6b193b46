use std::sync::Arc;

use warp::{Filter, Rejection, Reply};

use crate::middleware::{with_rate_limit, Limiter};
use crate::pipeline::Pipeline;

mod orchestrate;

pub fn routes(
    pipeline: Arc<Pipeline>,
    limiter: Limiter,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    // POST /api/orchestrate?message=...
    let query_route = warp::path("api")
        .and(warp::path("orchestrate"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_rate_limit(limiter.clone()))
        .and(warp::query())
        .and(with_pipeline(pipeline.clone()))
        .and_then(orchestrate::handle_orchestrate);

    // POST /api/v1/orchestrate {"message": "..."}
    let json_route = warp::path("api")
        .and(warp::path("v1"))
        .and(warp::path("orchestrate"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_rate_limit(limiter))
        .and(warp::body::json())
        .and(with_pipeline(pipeline))
        .and_then(orchestrate::handle_orchestrate);

    query_route.or(json_route)
}

fn with_pipeline(
    pipeline: Arc<Pipeline>,
) -> impl Filter<Extract = (Arc<Pipeline>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || pipeline.clone())
}
