//! New Relic OCI Provider
//!
//! Declarative management of the link between an Oracle Cloud
//! Infrastructure tenancy and a New Relic account, and of the cloud
//! integrations enabled on that link. All remote work goes through New
//! Relic's NerdGraph GraphQL API.
//!
//! # Overview
//!
//! The crate provides:
//!
//! - **Resources**: `newrelic_cloud_oci_link_account` and
//!   `newrelic_cloud_oci_integrations`, each with create, read, update,
//!   delete and import
//! - **Schema types**: descriptions of the provider configuration and
//!   both resources, used for validation and planning
//! - **ProviderService trait**: the surface a host drives, implemented by
//!   [`NewRelicOciProvider`]
//! - **NerdGraph client**: [`client::NerdGraphClient`] behind the
//!   [`client::CloudApi`] trait
//! - **Diagnostics**: structured errors and warnings for the operator
//! - **Logging**: integration with `tracing` for structured logging
//!
//! # Quick Start
//!
//! ```ignore
//! use newrelic_oci_provider::{NewRelicOciProvider, ProviderService};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     newrelic_oci_provider::init_logging();
//!
//!     let provider = NewRelicOciProvider::new();
//!     let diagnostics = provider
//!         .configure(json!({
//!             "account_id": 1234567,
//!             "api_key": std::env::var("NEW_RELIC_API_KEY")?,
//!             "region": "US"
//!         }))
//!         .await?;
//!     assert!(diagnostics.is_empty());
//!
//!     let response = provider
//!         .create(
//!             "newrelic_cloud_oci_link_account",
//!             json!({"tenant_id": "ocid1.tenancy.oc1..example", "name": "production"}),
//!         )
//!         .await?;
//!     println!("linked account {:?}", response.id());
//!     Ok(())
//! }
//! ```
//!
//! # Outcomes
//!
//! Every resource operation yields a [`ResourceResponse`]: the new state
//! (or `None` when the resource no longer exists) plus diagnostics. Errors
//! reported inside a NerdGraph mutation payload become error diagnostics
//! without aborting the operation; transport failures abort it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod resources;
pub mod retry;
pub mod schema;
pub mod service;
pub mod testing;
pub mod timeouts;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use config::{ClientConfig, ProviderConfig, Region};
pub use diagnostics::{Diagnostic, DiagnosticSeverity, Diagnostics};
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::NewRelicOciProvider;
pub use schema::ProviderSchema;
pub use service::ProviderService;
pub use types::{AttributeChange, ImportedResource, PlanResult, ProviderMetadata, ResourceResponse};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
