//! Configuration loading, the retrieval-augmented query engine and the
//! application context that ties them together.

pub mod app;
pub mod config;
pub mod error;
pub mod query;

pub use app::{App, IngestReport};
pub use config::Config;
pub use error::CoreError;
pub use query::{Generation, QueryEngine, QueryResult, SourceRef};
