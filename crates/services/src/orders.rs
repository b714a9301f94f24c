//! Order gateway trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::OrderId;
use domain::OrderPayload;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};

/// Result of a successful order creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    /// The order ID assigned by the order backend.
    pub id: OrderId,
}

/// Trait for creating orders in the order backend.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Creates an order from a frozen payload.
    async fn create_order(&self, payload: &OrderPayload) -> Result<OrderReceipt>;
}

#[derive(Debug, Default)]
struct InMemoryOrderState {
    orders: HashMap<OrderId, OrderPayload>,
    latency: Option<Duration>,
    fail_on_create: bool,
    calls: usize,
}

/// In-memory order gateway for tests and the demo server.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderGateway {
    state: Arc<RwLock<InMemoryOrderState>>,
}

impl InMemoryOrderGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to reject every create call.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on_create = fail;
    }

    /// Delays every answer, for exercising submission timeouts.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .latency = latency;
    }

    /// Returns the number of stored orders.
    pub fn order_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .orders
            .len()
    }

    /// Number of create calls received, including failed ones.
    pub fn call_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .calls
    }

    pub fn order(&self, id: OrderId) -> Option<OrderPayload> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .orders
            .get(&id)
            .cloned()
    }
}

#[async_trait]
impl OrderGateway for InMemoryOrderGateway {
    #[tracing::instrument(skip(self, payload), fields(menu_id = %payload.menu_id, items = payload.items.len()))]
    async fn create_order(&self, payload: &OrderPayload) -> Result<OrderReceipt> {
        let latency = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.calls += 1;
            if state.fail_on_create {
                return Err(ServiceError::rejected("order gateway", "order backend refused the order"));
            }
            state.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let id = OrderId::new();
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .orders
            .insert(id, payload.clone());
        tracing::info!(order_id = %id, "order created");
        Ok(OrderReceipt { id })
    }
}
