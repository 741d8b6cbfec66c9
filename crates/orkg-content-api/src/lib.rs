//! ORKG Content API
//!
//! REST API for the content types of a scholarly knowledge graph:
//! papers, comparisons, literature lists, smart reviews, rosetta-stone
//! statements, template instances, datasets and the research-field
//! hierarchy.
//!
//! # Architecture
//!
//! - **models**: wire representations with snake_case serde contracts
//! - **usecases**: async input ports plus command/filter payloads
//! - **service**: in-memory implementations over a shared graph store
//! - **http**: axum router, extractors and problem-detail translation
//!
//! # Example
//!
//! ```no_run
//! use orkg_content_api::{config::Config, http, service::Services};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let services = Services::new(&config);
//!     http::run(&config, services).await
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod service;
pub mod usecases;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use service::Services;
