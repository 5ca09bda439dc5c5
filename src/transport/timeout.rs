//! Timeout layer for wallet provider requests.

use alloy::{
    rpc::json_rpc::{RequestPacket, ResponsePacket},
    transports::{Transport, TransportError, TransportErrorKind, TransportFut},
};
use futures::FutureExt;
use std::{
    task::{Context, Poll},
    time::Duration,
};
use tower::{Layer, Service};
use tracing::warn;

/// A [`tower::Layer`] that bounds every request sent to the wallet provider.
///
/// Wallet prompts (account access, signing) are part of the request, so the bound has to leave
/// room for a human to answer them.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutLayer {
    timeout: Duration,
}

impl TimeoutLayer {
    /// Create a new [`TimeoutLayer`] with the given timeout duration.
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl<T> Layer<T> for TimeoutLayer {
    type Service = TimeoutService<T>;

    fn layer(&self, inner: T) -> Self::Service {
        TimeoutService { inner, timeout: self.timeout }
    }
}

/// A transport that fails requests which do not complete within the timeout.
#[derive(Debug, Clone)]
pub struct TimeoutService<T> {
    inner: T,
    timeout: Duration,
}

impl<T> Service<RequestPacket> for TimeoutService<T>
where
    T: Transport + Clone,
{
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = TransportFut<'static>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: RequestPacket) -> Self::Future {
        let method = match &req {
            RequestPacket::Single(req) => req.method().to_string(),
            RequestPacket::Batch(reqs) => format!("batch({})", reqs.len()),
        };
        let timeout = self.timeout;
        let fut = self.inner.call(req);

        async move {
            tokio::time::timeout(timeout, fut).await.unwrap_or_else(|_| {
                warn!(%method, timeout_secs = timeout.as_secs(), "Wallet request timed out");
                Err(TransportErrorKind::custom_str(&format!(
                    "request `{method}` timed out after {}s",
                    timeout.as_secs()
                )))
            })
        }
        .boxed()
    }
}
