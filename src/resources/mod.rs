//! Resource mappers and CRUD handlers.
//!
//! Each resource type is a unit struct implementing [`Resource`] with a typed
//! configuration (what the user declared) and a typed state (what is
//! persisted). Handlers talk to the API through [`ResourceContext`] and
//! report API outcomes as diagnostics in an [`Outcome`]; `Err` is reserved
//! for state the handler cannot interpret at all.

pub mod integrations;
pub mod link_account;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::client::CloudApi;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::ProviderError;
use crate::schema::Schema;
use crate::types::ResourceResponse;

pub use integrations::{
    IntegrationsConfig, IntegrationsState, MetadataAndTagsBlock, OciIntegrations,
};
pub use link_account::{LinkAccountConfig, LinkAccountState, OciLinkAccount};

/// What a resource handler needs from the configured provider.
#[derive(Clone)]
pub struct ResourceContext {
    /// The API client.
    pub api: Arc<dyn CloudApi>,
    /// Account used when a resource does not set `account_id`.
    pub default_account_id: i64,
}

impl ResourceContext {
    /// Create a context.
    pub fn new(api: Arc<dyn CloudApi>, default_account_id: i64) -> Self {
        Self {
            api,
            default_account_id,
        }
    }

    /// The account a resource operates on: its own `account_id` if set and
    /// non-zero, the provider's otherwise.
    pub fn account_id(&self, resource_account_id: Option<i64>) -> i64 {
        resource_account_id
            .filter(|id| *id != 0)
            .unwrap_or(self.default_account_id)
    }
}

impl std::fmt::Debug for ResourceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceContext")
            .field("default_account_id", &self.default_account_id)
            .finish_non_exhaustive()
    }
}

/// The result of one handler invocation.
///
/// `state == None` means the resource is absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<S> {
    /// State to persist.
    pub state: Option<S>,
    /// Diagnostics to report.
    pub diagnostics: Diagnostics,
}

impl<S> Outcome<S> {
    /// The resource exists with `state`.
    pub fn present(state: S) -> Self {
        Self {
            state: Some(state),
            diagnostics: Diagnostics::new(),
        }
    }

    /// The resource does not exist.
    pub fn absent() -> Self {
        Self {
            state: None,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Replace the diagnostics.
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Append one diagnostic.
    pub fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }

    /// Whether any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

impl<S: Serialize> Outcome<S> {
    /// Convert to the host-facing response.
    pub fn into_response(self) -> Result<ResourceResponse, ProviderError> {
        let state = self.state.map(serde_json::to_value).transpose()?;
        Ok(ResourceResponse {
            state,
            diagnostics: self.diagnostics.into_vec(),
        })
    }
}

/// A managed resource type.
#[async_trait::async_trait]
pub trait Resource: Send + Sync {
    /// Resource type name, e.g. `newrelic_cloud_oci_link_account`.
    const TYPE_NAME: &'static str;

    /// Declared configuration.
    type Config: DeserializeOwned + Send + Sync;

    /// Persisted state.
    type State: Serialize + DeserializeOwned + Send + Sync;

    /// Schema of the resource block.
    fn schema(&self) -> Schema;

    /// Create the resource from its configuration.
    async fn create(
        &self,
        ctx: &ResourceContext,
        config: Self::Config,
    ) -> Result<Outcome<Self::State>, ProviderError>;

    /// Refresh persisted state from the API.
    async fn read(
        &self,
        ctx: &ResourceContext,
        state: Self::State,
    ) -> Result<Outcome<Self::State>, ProviderError>;

    /// Apply a changed configuration to an existing resource.
    async fn update(
        &self,
        ctx: &ResourceContext,
        prior: Self::State,
        config: Self::Config,
    ) -> Result<Outcome<Self::State>, ProviderError>;

    /// Destroy the resource.
    async fn delete(
        &self,
        ctx: &ResourceContext,
        state: Self::State,
    ) -> Result<Outcome<Self::State>, ProviderError>;
}

/// Parse a persisted identifier as a linked account id.
pub(crate) fn parse_id(id: &str) -> Result<i64, ProviderError> {
    id.parse::<i64>().map_err(|err| ProviderError::invalid_id(id, err))
}

/// `Some(s)` unless `s` is empty.
pub(crate) fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Deserialize a list block whose value or elements may be `null`.
///
/// An empty block (`oci_metadata_and_tags {}`) can reach the provider as a
/// `null` element; it still counts as one block.
pub(crate) fn nullable_blocks<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let blocks = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(blocks
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

/// Fatal diagnostic for a failed API call.
pub(crate) fn transport_error(summary: &str, err: &crate::client::ClientError) -> Diagnostic {
    Diagnostic::error(summary).with_detail(err.to_string())
}
