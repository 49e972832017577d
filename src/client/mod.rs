//! The cloud-integration API boundary.
//!
//! Resource handlers talk to New Relic only through [`CloudApi`], so tests
//! can substitute [`FakeCloudApi`](crate::testing::FakeCloudApi) for the
//! real [`NerdGraphClient`].

mod error;
mod model;
mod nerdgraph;

pub use error::ClientError;
pub use model::{
    CloudService, ConfigureInput, ConfigureResult, DisableAccountIntegrationInput, DisableInput,
    DisableResult, Integration, LinkAccountInput, LinkResult, LinkedAccount, LinkedAccountRef,
    OciDisableIntegrationsInput, OciIntegrationsInput, OciLinkAccountInput,
    OciMetadataAndTagsInput, Payload, PayloadError, RenameAccountInput, RenameResult,
    UnlinkAccountInput, UnlinkResult,
};
pub use nerdgraph::NerdGraphClient;

/// Operations on linked cloud accounts and their integrations.
///
/// Every method returns `Err` only for transport-level failures. Semantic
/// failures are carried in the result's `errors` list.
#[async_trait::async_trait]
pub trait CloudApi: Send + Sync {
    /// Link cloud accounts to `account_id`.
    async fn link_account(
        &self,
        account_id: i64,
        input: &LinkAccountInput,
    ) -> Result<LinkResult, ClientError>;

    /// Unlink cloud accounts from `account_id`.
    async fn unlink_account(
        &self,
        account_id: i64,
        input: &[UnlinkAccountInput],
    ) -> Result<UnlinkResult, ClientError>;

    /// Rename linked accounts.
    async fn rename_account(
        &self,
        account_id: i64,
        input: &[RenameAccountInput],
    ) -> Result<RenameResult, ClientError>;

    /// Enable or reconfigure integrations.
    async fn configure_integration(
        &self,
        account_id: i64,
        input: &ConfigureInput,
    ) -> Result<ConfigureResult, ClientError>;

    /// Disable integrations.
    async fn disable_integration(
        &self,
        account_id: i64,
        input: &DisableInput,
    ) -> Result<DisableResult, ClientError>;

    /// Fetch one linked account.
    ///
    /// A missing account is reported as [`ClientError::NotFound`].
    async fn get_linked_account(
        &self,
        account_id: i64,
        linked_account_id: i64,
    ) -> Result<LinkedAccount, ClientError>;
}
