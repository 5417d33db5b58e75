// Adapters layer: concrete collaborators behind the domain ports.

pub mod catalog;
pub mod search_client;

pub use catalog::{PriceListCatalog, ProductFilter};
pub use search_client::PublicSearchClient;
