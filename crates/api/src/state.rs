//! Shared application state.

use std::sync::Arc;

use domain::{Catalog, SystemConstraints, ValidationContext};
use services::{
    InMemoryCatalogService, InMemoryOrderGateway, InMemoryPostalLookupService,
    InMemorySystemStatusService, Locality, OrderGateway, ServiceError, load_constraints,
};
use wizard::{CheckoutService, WizardConfig, WizardSession, fetch_catalog};

use crate::config::Config;
use crate::error::ApiError;

const DEMO_CATALOG: &str = include_str!("../data/demo_catalog.json");
const DEMO_LOCALITIES: &str = include_str!("../data/demo_localities.json");

/// Shared application state for route handlers.
pub struct AppState<G: OrderGateway> {
    pub catalog: InMemoryCatalogService,
    pub status: InMemorySystemStatusService,
    pub postal: InMemoryPostalLookupService,
    pub checkout: CheckoutService<G>,
    pub wizard: WizardConfig,
}

impl<G: OrderGateway> AppState<G> {
    pub fn new(
        catalog: InMemoryCatalogService,
        status: InMemorySystemStatusService,
        postal: InMemoryPostalLookupService,
        gateway: G,
        wizard: WizardConfig,
    ) -> Self {
        Self {
            catalog,
            status,
            postal,
            checkout: CheckoutService::new(gateway, wizard.submission_timeout),
            wizard,
        }
    }

    /// Fetches the catalog and the system constraints, each under the lookup timeout.
    pub async fn snapshot(&self) -> Result<(Catalog, SystemConstraints), ApiError> {
        let timeout = self.wizard.lookup_timeout;
        let catalog = fetch_catalog(&self.catalog, timeout).await?;
        let constraints = tokio::time::timeout(timeout, load_constraints(&self.status))
            .await
            .unwrap_or(Err(ServiceError::Timeout {
                operation: "status refresh",
                after: timeout,
            }))?;
        Ok((catalog, constraints))
    }

    /// Rebuilds a wizard session around a draft sent by the client.
    pub async fn resume(
        &self,
        draft: domain::OrderDraft,
        cursor: usize,
    ) -> Result<WizardSession, ApiError> {
        let (catalog, constraints) = self.snapshot().await?;
        let session = WizardSession::resume(
            self.wizard.clone(),
            catalog,
            constraints,
            draft,
            cursor,
        )?;
        Ok(session)
    }
}

/// Blocking condition at the session's cursor.
pub fn blocked_at(session: &WizardSession) -> Option<domain::BlockReason> {
    let ctx: ValidationContext<'_> = session.context();
    domain::check_blocking(&ctx, session.cursor())
}

/// Creates the state served by the binary: in-memory collaborators seeded with
/// the bundled demo data, or with the catalog file named by the configuration.
pub fn create_default_state(
    config: &Config,
) -> Result<Arc<AppState<InMemoryOrderGateway>>, ServiceError> {
    let catalog = match &config.catalog_path {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|err| {
                ServiceError::unavailable("catalog", format!("{}: {err}", path.display()))
            })?;
            InMemoryCatalogService::from_json(&json)?
        }
        None => InMemoryCatalogService::from_json(DEMO_CATALOG)?,
    };
    let localities: Vec<Locality> =
        serde_json::from_str(DEMO_LOCALITIES).map_err(domain::DomainError::from)?;

    Ok(Arc::new(AppState::new(
        catalog,
        InMemorySystemStatusService::new(),
        InMemoryPostalLookupService::new(localities),
        InMemoryOrderGateway::new(),
        config.wizard_config(),
    )))
}
