use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, HeaderName, HeaderValue},
    Error,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use super::{RateLimitDecision, RateLimiter};
use crate::auth::ClientIp;
use crate::error::AppError;

const LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// Counts every request against its client address and answers 429 once the
/// window budget is spent. If the counter store fails, the request is let through.
pub struct RateLimit {
    limiter: RateLimiter,
}

impl RateLimit {
    pub fn new(limiter: RateLimiter) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitService<S> {
    service: Rc<S>,
    limiter: RateLimiter,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let limiter = self.limiter.clone();

        Box::pin(async move {
            let client = ClientIp::of(req.request())
                .into_inner()
                .unwrap_or_else(|| "unknown".to_string());

            let decision = match limiter.check(&client).await {
                Ok(decision) => Some(decision),
                Err(e) => {
                    log::error!("Rate limiter unavailable, allowing request: {}", e);
                    None
                }
            };

            if let Some(decision) = decision.filter(|d| !d.allowed) {
                log::warn!("Rate limit exceeded for {}", client);
                let mut res = req.error_response(AppError::RateLimited {
                    retry_after: decision.reset_secs(),
                });
                insert_headers(res.headers_mut(), &decision);
                return Ok(res.map_into_right_body());
            }

            let mut res = service.call(req).await?;
            if let Some(decision) = decision {
                insert_headers(res.headers_mut(), &decision);
            }
            Ok(res.map_into_left_body())
        })
    }
}

fn insert_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(LIMIT, HeaderValue::from(decision.limit));
    headers.insert(REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(RESET, HeaderValue::from(decision.reset_secs()));
}
