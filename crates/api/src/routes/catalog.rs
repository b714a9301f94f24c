//! Read-only catalog, status and postal lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use domain::{Accessory, Menu, Product, SystemConstraints};
use serde::Deserialize;
use services::{
    CatalogService, Locality, MenuFilter, OrderGateway, PostalLookupService, ProductFilter,
    ServiceError, load_constraints,
};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub city: String,
}

/// Runs a collaborator call under the configured lookup timeout.
async fn with_timeout<T>(
    timeout: std::time::Duration,
    operation: &'static str,
    call: impl std::future::Future<Output = Result<T, ServiceError>>,
) -> Result<T, ApiError> {
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(ServiceError::Timeout {
            operation,
            after: timeout,
        }))
        .map_err(ApiError::from)
}

/// GET /menus: menus matching the query filter.
#[tracing::instrument(skip(state))]
pub async fn menus<G: OrderGateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Query(filter): Query<MenuFilter>,
) -> Result<Json<Vec<Menu>>, ApiError> {
    let menus = with_timeout(
        state.wizard.lookup_timeout,
        "menu listing",
        state.catalog.list_menus(&filter),
    )
    .await?;
    Ok(Json(menus))
}

/// GET /products: products matching the query filter.
#[tracing::instrument(skip(state))]
pub async fn products<G: OrderGateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = with_timeout(
        state.wizard.lookup_timeout,
        "product listing",
        state.catalog.list_products(&filter),
    )
    .await?;
    Ok(Json(products))
}

/// GET /accessories
pub async fn accessories<G: OrderGateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
) -> Result<Json<Vec<Accessory>>, ApiError> {
    let accessories = with_timeout(
        state.wizard.lookup_timeout,
        "accessory listing",
        state.catalog.list_accessories(),
    )
    .await?;
    Ok(Json(accessories))
}

/// GET /status: ordering pause and closed dates.
pub async fn status<G: OrderGateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
) -> Result<Json<SystemConstraints>, ApiError> {
    let constraints = with_timeout(
        state.wizard.lookup_timeout,
        "status refresh",
        load_constraints(&state.status),
    )
    .await?;
    Ok(Json(constraints))
}

/// GET /postal/{code}: city and state for a 5-digit postal code.
#[tracing::instrument(skip(state))]
pub async fn postal_code<G: OrderGateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(code): Path<String>,
) -> Result<Json<Locality>, ApiError> {
    with_timeout(
        state.wizard.lookup_timeout,
        "postal lookup",
        state.postal.lookup_postal_code(&code),
    )
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("Unknown postal code: {code}")))
}

/// GET /postal?city=...: localities whose city starts with the query.
#[tracing::instrument(skip(state))]
pub async fn city<G: OrderGateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Query(query): Query<CityQuery>,
) -> Result<Json<Vec<Locality>>, ApiError> {
    let localities = with_timeout(
        state.wizard.lookup_timeout,
        "city lookup",
        state.postal.lookup_city(&query.city),
    )
    .await?;
    Ok(Json(localities))
}
