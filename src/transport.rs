// SPDX-License-Identifier: Apache-2.0

//! Tower-based request pacing for pooled RPC endpoints.
//!
//! Public endpoints throttle aggressively. Rather than bursting and then
//! eating 429s, each pooled endpoint can be wrapped in a layer that
//! enforces a minimum interval between consecutive requests. Rotation and
//! failover remain the pool's job; this layer only spaces requests out.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use alloy_json_rpc::{RequestPacket, ResponsePacket};
use alloy_transport::TransportError;
use tokio::{
    sync::Mutex,
    time::{sleep_until, Instant},
};
use tower::Layer;

/// A Tower layer enforcing a minimum delay between consecutive requests.
///
/// Each request reserves the next free send slot and sleeps until it
/// arrives, so concurrent callers queue up at `interval` spacing instead
/// of racing.
///
/// # Example
///
/// ```rust,ignore
/// use allowscan::transport::MinIntervalLayer;
/// use alloy_rpc_client::ClientBuilder;
/// use std::time::Duration;
///
/// let client = ClientBuilder::default()
///     .layer(MinIntervalLayer::new(Duration::from_millis(250)))
///     .http(rpc_url);
/// ```
#[derive(Clone, Debug)]
pub struct MinIntervalLayer {
    interval: Duration,
    next_slot: Arc<Mutex<Option<Instant>>>,
}

impl MinIntervalLayer {
    /// Create a layer spacing requests at least `interval` apart.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Arc::new(Mutex::new(None)),
        }
    }
}

impl<S> Layer<S> for MinIntervalLayer {
    type Service = MinIntervalService<S>;

    fn layer(&self, service: S) -> Self::Service {
        MinIntervalService {
            service,
            interval: self.interval,
            next_slot: self.next_slot.clone(),
        }
    }
}

/// Service produced by [`MinIntervalLayer`].
#[derive(Clone, Debug)]
pub struct MinIntervalService<S> {
    service: S,
    interval: Duration,
    next_slot: Arc<Mutex<Option<Instant>>>,
}

impl<S> tower::Service<RequestPacket> for MinIntervalService<S>
where
    S: tower::Service<RequestPacket, Response = ResponsePacket, Error = TransportError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: RequestPacket) -> Self::Future {
        let mut service = self.service.clone();
        let interval = self.interval;
        let next_slot = self.next_slot.clone();

        Box::pin(async move {
            let slot = {
                let mut guard = next_slot.lock().await;
                let now = Instant::now();
                let slot = match *guard {
                    Some(reserved) if reserved > now => reserved,
                    _ => now,
                };
                *guard = Some(slot + interval);
                slot
            };

            sleep_until(slot).await;
            service.call(request).await
        })
    }
}
