use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use warp::{Filter, Rejection};

use crate::error::ApiError;

pub type Limiter = Arc<DefaultDirectRateLimiter>;

pub fn cors() -> warp::cors::Builder {
    warp::cors()
        .allow_any_origin()
        .allow_headers(vec![
            "User-Agent",
            "Origin",
            "Access-Control-Request-Method",
            "Access-Control-Request-Headers",
            "Content-Type",
            "Authorization",
            "Accept",
            "Content-Length",
        ])
        .allow_methods(vec!["POST", "GET", "OPTIONS"])
}

/// Process-wide limiter; a rate of zero is treated as one request per second.
pub fn rate_limiter(per_second: u32) -> Limiter {
    let rate = NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::direct(Quota::per_second(rate)))
}

pub fn with_rate_limit(limiter: Limiter) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::any()
        .and_then(move || {
            let limiter = limiter.clone();
            async move {
                limiter
                    .check()
                    .map_err(|_| warp::reject::custom(ApiError::RateLimitExceeded))
            }
        })
        .untuple_one()
}
