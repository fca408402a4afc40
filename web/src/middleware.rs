//! Request tracking middleware.
//!
//! [`correlation_id_layer`] gives every request an id, runs it inside an
//! `http_request` span, echoes the id on the response and counts the
//! response by status.
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/api/links", get(links))
//!     .layer(correlation_id_layer());
//! ```
//!
//! # Flow
//!
//! 1. Take `X-Correlation-ID` from the request if it is a UUID, else generate one
//! 2. Store it in request extensions for [`CorrelationId`](crate::extractors::CorrelationId)
//! 3. Run the inner service inside the span
//! 4. Set `X-Correlation-ID` on the response

use axum::{extract::Request, http::HeaderValue, response::Response};
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Create the correlation id layer.
#[must_use]
pub const fn correlation_id_layer() -> CorrelationIdLayer {
    CorrelationIdLayer
}

/// Layer for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdLayer;

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdMiddleware { inner }
    }
}

/// Middleware service for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for CorrelationIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let correlation_id = req
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        req.extensions_mut().insert(correlation_id);

        let method = req.method().clone();
        let span = tracing::info_span!(
            "http_request",
            correlation_id = %correlation_id,
            method = %method,
            uri = %req.uri(),
            status = tracing::field::Empty,
        );

        let started = Instant::now();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut response = fut.instrument(span.clone()).await?;

            let status = response.status();
            span.record("status", status.as_u16());
            span.in_scope(|| {
                tracing::debug!(elapsed_ms = started.elapsed().as_millis(), "request finished");
            });
            metrics::counter!(
                "linkboard_http_responses_total",
                "method" => method.to_string(),
                "status" => status.as_u16().to_string()
            )
            .increment(1);

            if let Ok(header_value) = HeaderValue::from_str(&correlation_id.to_string()) {
                response.headers_mut().insert(CORRELATION_ID_HEADER, header_value);
            }

            Ok(response)
        })
    }
}
