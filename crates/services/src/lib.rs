//! External collaborators of the catering order engine.
//!
//! Each collaborator is an async trait with an in-memory implementation used
//! by tests and the demo server:
//! - [`CatalogService`]: menus, products and accessories
//! - [`SystemStatusService`]: ordering pause and closed dates
//! - [`PostalLookupService`]: postal code and city lookups
//! - [`OrderGateway`]: order creation

pub mod catalog;
pub mod error;
pub mod orders;
pub mod postal;
pub mod status;

pub use catalog::{CatalogService, InMemoryCatalogService, MenuFilter, ProductFilter, load_catalog};
pub use error::ServiceError;
pub use orders::{InMemoryOrderGateway, OrderGateway, OrderReceipt};
pub use postal::{InMemoryPostalLookupService, Locality, PostalLookupService};
pub use status::{InMemorySystemStatusService, SystemStatusService, load_constraints};
