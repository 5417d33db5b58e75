pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{PriceListCatalog, ProductFilter, PublicSearchClient};
pub use crate::core::extractor::extract;
pub use crate::core::matcher::{MatcherSettings, SpecificationMatcher};
pub use crate::core::query::{MatchMode, MatchQuery, TireSearchRequest};
pub use crate::core::service::{MultiSearchOutcome, SearchOutcome, TireSearchService};
pub use domain::model::{MatchResult, TireCategory, TireSpecification};
pub use utils::error::{Result, TireSearchError};
