//! Order submission.

use std::time::{Duration, Instant};

use domain::{OrderDraft, ValidationContext, assemble};
use services::{OrderGateway, OrderReceipt, ServiceError};

use crate::error::CheckoutError;

/// Submits assembled orders to the order gateway.
///
/// One [`submit`](Self::submit) makes at most one gateway call, and never
/// one for a draft that is blocked or invalid.
pub struct CheckoutService<G>
where
    G: OrderGateway,
{
    gateway: G,
    timeout: Duration,
}

impl<G> CheckoutService<G>
where
    G: OrderGateway,
{
    pub fn new(gateway: G, timeout: Duration) -> Self {
        Self { gateway, timeout }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Re-validates the draft, freezes it into a payload and creates the order.
    ///
    /// The draft is only read; on failure it is exactly as it was.
    #[tracing::instrument(skip(self, draft, ctx), fields(guests = draft.event.guest_count))]
    pub async fn submit(
        &self,
        draft: &OrderDraft,
        ctx: &ValidationContext<'_>,
    ) -> Result<OrderReceipt, CheckoutError> {
        metrics::counter!("checkout_submissions_total").increment(1);
        let started = Instant::now();

        let payload = assemble(draft, ctx).inspect_err(|err| {
            metrics::counter!("checkout_failures_total", "reason" => "rejected_locally")
                .increment(1);
            tracing::info!(error = %err, "checkout stopped before submission");
        })?;

        let result = match tokio::time::timeout(self.timeout, self.gateway.create_order(&payload))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ServiceError::Timeout {
                operation: "order submission",
                after: self.timeout,
            }),
        };
        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());

        match result {
            Ok(receipt) => {
                tracing::info!(order_id = %receipt.id, total = %payload.totals.grand_total, "order submitted");
                Ok(receipt)
            }
            Err(err) => {
                let reason = if err.is_timeout() { "timeout" } else { "gateway" };
                metrics::counter!("checkout_failures_total", "reason" => reason).increment(1);
                tracing::warn!(error = %err, "order submission failed");
                Err(CheckoutError::Gateway(err))
            }
        }
    }
}
