//! Inputs and results of the cloud-integration API.
//!
//! Field names follow NerdGraph's camelCase wire format. Optional inputs are
//! omitted from the request when unset, so the API is never asked to
//! overwrite a value the user did not declare.

use serde::{Deserialize, Serialize};

/// An application-level failure reported inside a successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadError {
    /// Error kind, e.g. `ERR_INVALID_DATA`.
    #[serde(rename = "type", default)]
    pub error_type: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Linked account the error refers to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_account_id: Option<i64>,
    /// New Relic account the error refers to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nr_account_id: Option<i64>,
    /// Cloud provider slug, e.g. `oci`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_slug: Option<String>,
}

/// Marker for payload errors caused by a concurrent link racing on the
/// tenant name uniqueness check. NerdGraph exposes no error code for this.
const NAMING_CONFLICT: &str = "tenant name already exists";

impl PayloadError {
    /// A payload error with only a kind and message.
    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            message: message.into(),
            linked_account_id: None,
            nr_account_id: None,
            provider_slug: None,
        }
    }

    /// Whether this error is the transient tenant-naming conflict.
    pub fn is_naming_conflict(&self) -> bool {
        self.message.to_lowercase().contains(NAMING_CONFLICT)
    }
}

/// Common view over every mutation result.
pub trait Payload {
    /// Payload errors reported by the API.
    fn errors(&self) -> &[PayloadError];

    /// Whether the API reported any payload error.
    fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }
}

/// A cloud account registered with New Relic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedAccount {
    /// Identifier assigned by the API.
    pub id: i64,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// External (tenant) identifier.
    #[serde(default)]
    pub external_id: Option<String>,
    /// Owning New Relic account.
    #[serde(default)]
    pub nr_account_id: Option<i64>,
    /// Authentication label.
    #[serde(default)]
    pub auth_label: Option<String>,
    /// Whether data collection is disabled.
    #[serde(default)]
    pub disabled: Option<bool>,
    /// Integrations enabled on the account.
    #[serde(default)]
    pub integrations: Vec<Integration>,
}

impl LinkedAccount {
    /// A linked account with only an id.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            name: None,
            external_id: None,
            nr_account_id: None,
            auth_label: None,
            disabled: None,
            integrations: Vec::new(),
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the external (tenant) identifier.
    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    /// Set the owning New Relic account.
    pub fn with_nr_account_id(mut self, nr_account_id: i64) -> Self {
        self.nr_account_id = Some(nr_account_id);
        self
    }
}

/// A configured integration on a linked account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    /// Integration id.
    pub id: i64,
    /// Integration name.
    #[serde(default)]
    pub name: Option<String>,
    /// Owning New Relic account.
    #[serde(default)]
    pub nr_account_id: Option<i64>,
    /// Owning linked account.
    #[serde(default)]
    pub linked_account: Option<LinkedAccountRef>,
    /// Cloud service the integration collects from.
    #[serde(default)]
    pub service: Option<CloudService>,
}

impl Integration {
    /// An integration on `linked_account_id` for the service `slug`.
    pub fn new(id: i64, linked_account_id: i64, slug: impl Into<String>) -> Self {
        Self {
            id,
            name: None,
            nr_account_id: None,
            linked_account: Some(LinkedAccountRef {
                id: linked_account_id,
                name: None,
            }),
            service: Some(CloudService { slug: slug.into() }),
        }
    }
}

/// Reference to a linked account from an integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedAccountRef {
    /// Linked account id.
    pub id: i64,
    /// Linked account name.
    #[serde(default)]
    pub name: Option<String>,
}

/// A cloud service identified by slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudService {
    /// Service slug, e.g. `oci_metadata_and_tags`.
    pub slug: String,
}

// --- inputs -----------------------------------------------------------------

/// Accounts to link, grouped by cloud provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAccountInput {
    /// OCI tenancies to link.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub oci: Vec<OciLinkAccountInput>,
}

/// One OCI tenancy to link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OciLinkAccountInput {
    /// OCI tenant identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Display name for the linked account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A linked account to unlink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlinkAccountInput {
    /// Linked account id.
    pub linked_account_id: i64,
}

/// A linked account to rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameAccountInput {
    /// Linked account id.
    pub linked_account_id: i64,
    /// New display name.
    pub name: String,
}

/// Integrations to configure, grouped by cloud provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigureInput {
    /// OCI integrations.
    pub oci: OciIntegrationsInput,
}

impl ConfigureInput {
    /// Whether nothing would be configured.
    pub fn is_empty(&self) -> bool {
        self.oci.oci_metadata_and_tags.is_empty()
    }
}

/// OCI integrations to configure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OciIntegrationsInput {
    /// Metadata and tags integration entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub oci_metadata_and_tags: Vec<OciMetadataAndTagsInput>,
}

/// Enable the OCI metadata and tags integration on a linked account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OciMetadataAndTagsInput {
    /// Linked account id.
    pub linked_account_id: i64,
}

/// Integrations to disable, grouped by cloud provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisableInput {
    /// OCI integrations.
    pub oci: OciDisableIntegrationsInput,
}

impl DisableInput {
    /// Whether nothing would be disabled.
    pub fn is_empty(&self) -> bool {
        self.oci.oci_metadata_and_tags.is_empty()
    }
}

/// OCI integrations to disable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OciDisableIntegrationsInput {
    /// Metadata and tags integration entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub oci_metadata_and_tags: Vec<DisableAccountIntegrationInput>,
}

/// Disable one integration on a linked account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisableAccountIntegrationInput {
    /// Linked account id.
    pub linked_account_id: i64,
}

// --- results ----------------------------------------------------------------

/// Result of `cloudLinkAccount`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResult {
    /// Payload errors.
    #[serde(default)]
    pub errors: Vec<PayloadError>,
    /// Accounts that were linked.
    #[serde(default)]
    pub linked_accounts: Vec<LinkedAccount>,
}

/// Result of `cloudUnlinkAccount`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlinkResult {
    /// Payload errors.
    #[serde(default)]
    pub errors: Vec<PayloadError>,
    /// Accounts that were unlinked.
    #[serde(default)]
    pub unlinked_accounts: Vec<LinkedAccount>,
}

/// Result of `cloudRenameAccount`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameResult {
    /// Payload errors.
    #[serde(default)]
    pub errors: Vec<PayloadError>,
    /// Accounts that were renamed.
    #[serde(default)]
    pub linked_accounts: Vec<LinkedAccount>,
}

/// Result of `cloudConfigureIntegration`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureResult {
    /// Payload errors.
    #[serde(default)]
    pub errors: Vec<PayloadError>,
    /// Integrations that were configured.
    #[serde(default)]
    pub integrations: Vec<Integration>,
}

/// Result of `cloudDisableIntegration`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisableResult {
    /// Payload errors.
    #[serde(default)]
    pub errors: Vec<PayloadError>,
    /// Integrations that were disabled.
    #[serde(default)]
    pub disabled_integrations: Vec<Integration>,
}

macro_rules! impl_payload {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Payload for $ty {
                fn errors(&self) -> &[PayloadError] {
                    &self.errors
                }
            }
        )*
    };
}

impl_payload!(
    LinkResult,
    UnlinkResult,
    RenameResult,
    ConfigureResult,
    DisableResult
);
