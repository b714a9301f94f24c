//! System status service trait and in-memory implementation.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::NaiveDate;
use domain::{ClosedDate, PauseStatus, SystemConstraints};

use crate::error::{Result, ServiceError};

/// Trait for the storefront's operational status.
#[async_trait]
pub trait SystemStatusService: Send + Sync {
    /// Whether ordering is currently paused.
    async fn ordering_paused(&self) -> Result<PauseStatus>;

    /// Dates on which no events are catered.
    async fn closed_dates(&self) -> Result<Vec<ClosedDate>>;
}

/// Fetches both status values.
pub async fn load_constraints<S: SystemStatusService + ?Sized>(
    service: &S,
) -> Result<SystemConstraints> {
    Ok(SystemConstraints {
        pause: service.ordering_paused().await?,
        closed_dates: service.closed_dates().await?,
    })
}

#[derive(Debug, Default)]
struct InMemoryStatusState {
    constraints: SystemConstraints,
    fail: bool,
}

/// In-memory system status for tests and the demo server.
#[derive(Debug, Clone, Default)]
pub struct InMemorySystemStatusService {
    state: Arc<RwLock<InMemoryStatusState>>,
}

impl InMemorySystemStatusService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_constraints(constraints: SystemConstraints) -> Self {
        let service = Self::new();
        service.write().constraints = constraints;
        service
    }

    /// Pauses or resumes ordering.
    pub fn set_paused(&self, paused: bool, reason: Option<String>) {
        self.write().constraints.pause = PauseStatus { paused, reason };
    }

    pub fn add_closed_date(&self, date: NaiveDate, reason: Option<String>) {
        self.write()
            .constraints
            .closed_dates
            .push(ClosedDate { date, reason });
    }

    /// Configures the service to fail every call.
    pub fn set_fail(&self, fail: bool) {
        self.write().fail = fail;
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, InMemoryStatusState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_constraints(&self) -> Result<SystemConstraints> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if state.fail {
            return Err(ServiceError::unavailable("system status", "status endpoint is down"));
        }
        Ok(state.constraints.clone())
    }
}

#[async_trait]
impl SystemStatusService for InMemorySystemStatusService {
    async fn ordering_paused(&self) -> Result<PauseStatus> {
        Ok(self.read_constraints()?.pause)
    }

    async fn closed_dates(&self) -> Result<Vec<ClosedDate>> {
        Ok(self.read_constraints()?.closed_dates)
    }
}
