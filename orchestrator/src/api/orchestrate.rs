use std::sync::Arc;

use tracing::{info, info_span, Instrument};
use uuid::Uuid;
use warp::{Rejection, Reply};

use crate::error::ApiError;
use crate::models::{OrchestrateRequest, OrchestrateResponse};
use crate::pipeline::Pipeline;

pub async fn handle_orchestrate(
    request: OrchestrateRequest,
    pipeline: Arc<Pipeline>,
) -> Result<impl Reply, Rejection> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(warp::reject::custom(ApiError::BadRequest(
            "message must not be empty".to_string(),
        )));
    }

    let request_id = Uuid::new_v4();
    info!("Processing message [{}]: {}", request_id, message);

    let response = pipeline
        .handle(message)
        .instrument(info_span!("orchestrate", %request_id))
        .await;

    Ok(warp::reply::json(&OrchestrateResponse {
        request_id,
        response,
    }))
}
