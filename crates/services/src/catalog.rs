//! Catalog service trait and in-memory implementation.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use common::MenuId;
use domain::{Accessory, Catalog, CategoryKey, Menu, Product};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};

const SERVICE: &str = "catalog";

/// Which menus to list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuFilter {
    /// Include inactive menus as well.
    pub include_inactive: bool,
    /// Only menus whose guest minimum does not exceed this count.
    pub guest_count: Option<u32>,
}

impl MenuFilter {
    pub fn matches(&self, menu: &Menu) -> bool {
        (self.include_inactive || menu.active)
            && self.guest_count.is_none_or(|guests| menu.min_guests <= guests)
    }
}

/// Which products to list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductFilter {
    /// Only products offered by this menu.
    pub menu_id: Option<MenuId>,
    /// Only products belonging to this category or tag.
    pub category: Option<CategoryKey>,
    /// Include unavailable products as well.
    pub include_unavailable: bool,
}

impl ProductFilter {
    pub fn for_menu(menu_id: impl Into<MenuId>) -> Self {
        Self {
            menu_id: Some(menu_id.into()),
            ..Default::default()
        }
    }

    fn matches(&self, product: &Product, menu: Option<&Menu>) -> bool {
        (self.include_unavailable || product.available)
            && menu.is_none_or(|menu| menu.offers(&product.id))
            && self.category.is_none_or(|key| product.belongs_to(key))
    }
}

/// Trait for catalog queries.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Lists the menus matching the filter.
    async fn list_menus(&self, filter: &MenuFilter) -> Result<Vec<Menu>>;

    /// Lists the products matching the filter.
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>>;

    /// Lists every accessory.
    async fn list_accessories(&self) -> Result<Vec<Accessory>>;
}

/// Fetches the whole catalog with the default filters.
pub async fn load_catalog<C: CatalogService + ?Sized>(service: &C) -> Result<Catalog> {
    let menus = service.list_menus(&MenuFilter::default()).await?;
    let products = service.list_products(&ProductFilter::default()).await?;
    let accessories = service.list_accessories().await?;
    tracing::debug!(
        menus = menus.len(),
        products = products.len(),
        accessories = accessories.len(),
        "catalog loaded"
    );
    Ok(Catalog {
        menus,
        products,
        accessories,
    })
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    catalog: Catalog,
    fail_on_list: bool,
    calls: usize,
}

/// In-memory catalog service for tests and the demo server.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogService {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalogService {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryCatalogState {
                catalog,
                ..Default::default()
            })),
        }
    }

    /// Creates a service from a JSON catalog document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(Catalog::from_json(json)?))
    }

    /// Replaces the served catalog.
    pub fn replace(&self, catalog: Catalog) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .catalog = catalog;
    }

    /// Configures the service to fail every list call.
    pub fn set_fail_on_list(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on_list = fail;
    }

    /// Number of list calls served so far, including failed ones.
    pub fn call_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .calls
    }

    fn with_catalog<T>(&self, f: impl FnOnce(&Catalog) -> T) -> Result<T> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.calls += 1;
        if state.fail_on_list {
            return Err(ServiceError::unavailable(SERVICE, "catalog backend is down"));
        }
        Ok(f(&state.catalog))
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalogService {
    #[tracing::instrument(skip(self))]
    async fn list_menus(&self, filter: &MenuFilter) -> Result<Vec<Menu>> {
        self.with_catalog(|catalog| {
            catalog
                .menus
                .iter()
                .filter(|menu| filter.matches(menu))
                .cloned()
                .collect()
        })
    }

    #[tracing::instrument(skip(self))]
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        self.with_catalog(|catalog| {
            let menu = filter.menu_id.as_ref().and_then(|id| catalog.menu(id));
            if filter.menu_id.is_some() && menu.is_none() {
                return Vec::new();
            }
            catalog
                .products
                .iter()
                .filter(|product| filter.matches(product, menu))
                .cloned()
                .collect()
        })
    }

    #[tracing::instrument(skip(self))]
    async fn list_accessories(&self) -> Result<Vec<Accessory>> {
        self.with_catalog(|catalog| catalog.accessories.clone())
    }
}
