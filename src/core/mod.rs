pub mod extractor;
pub mod matcher;
pub mod query;
pub mod relevance;
pub mod service;

pub use crate::domain::model::{Candidate, ExternalProduct, MatchResult, TireCategory, TireSpecification};
pub use crate::domain::ports::{Catalog, ProductSearch};
pub use crate::utils::error::Result;
