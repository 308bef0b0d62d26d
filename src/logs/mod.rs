//! Log query construction, caching and the request pipelines

pub mod cache_key;
pub mod duration;
pub mod query;
pub mod service;

pub use cache_key::derive_cache_key;
pub use query::{build_log_query, BindValue, LogFilter, LogQuery, ValidationError};
pub use service::{LogService, ResultSource, Retrieved, CACHE_TTL};
