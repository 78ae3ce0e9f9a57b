//! # Iteration Runner
//!
//! One iteration is: build a random [`FavoriteRequest`], POST it, evaluate the three
//! [`ITERATION_CHECKS`], record them, then pause for the think time. The runner holds
//! no per-iteration state and knows nothing about how many virtual users call it;
//! concurrency belongs to the [`LoadScheduler`](crate::scheduler::LoadScheduler).
//!
//! The invalid-payload prober lives here too since it shares the endpoint, transport
//! and recorder. It is invoked on its own, never as part of the iteration loop.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::check::{CheckOutcome, CheckRecorder, INVALID_REQUEST_CHECK, ITERATION_CHECKS};
use crate::config::LoadTestConfig;
use crate::payload::{invalid_payloads, FavoriteRequest};
use crate::transport::{Exchange, Transport};

pub struct IterationRunner {
    endpoint: String,
    think_time: Duration,
    recorder: Arc<dyn CheckRecorder>,
}

impl IterationRunner {
    pub fn new(config: &LoadTestConfig, recorder: Arc<dyn CheckRecorder>) -> Self {
        Self {
            endpoint: config.endpoint_url(),
            think_time: config.think_time,
            recorder,
        }
    }

    /// Full URL every request is posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn think_time(&self) -> Duration {
        self.think_time
    }

    /// Run one iteration and return the check outcomes in evaluation order.
    ///
    /// Failing checks are recorded, never propagated. The think-time pause happens
    /// before returning.
    pub async fn run_iteration<T: Transport>(&self, transport: &mut T) -> Vec<CheckOutcome> {
        let request = FavoriteRequest::random();
        let exchange = self.send(transport, &request).await;

        let outcomes: Vec<CheckOutcome> = ITERATION_CHECKS
            .iter()
            .map(|check| check.evaluate(&exchange))
            .collect();
        for outcome in &outcomes {
            self.recorder.record(outcome);
        }
        debug!(
            user_id = %request.user_id,
            fav_num = request.fav_num,
            status = exchange.status,
            elapsed_ms = exchange.elapsed.as_millis() as u64,
            "iteration complete"
        );

        if !self.think_time.is_zero() {
            tokio::time::sleep(self.think_time).await;
        }
        outcomes
    }

    /// Post each invalid payload in order and check for a 400.
    ///
    /// Always issues exactly four requests, whatever their outcomes.
    pub async fn test_invalid_data<T: Transport>(&self, transport: &mut T) -> Vec<CheckOutcome> {
        let mut outcomes = Vec::with_capacity(4);
        for payload in invalid_payloads() {
            let exchange = self.send(transport, &payload.request).await;
            let outcome = INVALID_REQUEST_CHECK.evaluate(&exchange);
            if !outcome.passed {
                debug!(
                    violation = ?payload.violation,
                    status = exchange.status,
                    "invalid payload was not rejected with 400"
                );
            }
            self.recorder.record(&outcome);
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn send<T: Transport>(&self, transport: &mut T, request: &FavoriteRequest) -> Exchange {
        match request.to_json() {
            Ok(body) => transport.post_json(&self.endpoint, body).await,
            Err(e) => {
                warn!(error = %e, "failed to serialize favorite payload");
                Exchange::failed(Duration::ZERO, e.to_string())
            }
        }
    }
}
