//! `newrelic_cloud_oci_link_account`: an OCI tenancy linked to a New Relic
//! account.
//!
//! Create retries while the API reports a tenant naming conflict, for up to
//! the resource's create timeout. Only the display name can change in place.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::{non_empty, parse_id, transport_error, Outcome, Resource, ResourceContext};
use crate::client::{
    ClientError, LinkAccountInput, LinkResult, LinkedAccount, OciLinkAccountInput, Payload,
    RenameAccountInput, UnlinkAccountInput,
};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::ProviderError;
use crate::retry::{retry, RetryError, RetryPolicy};
use crate::schema::{Attribute, Schema};
use crate::timeouts::Timeouts;
use crate::types::null_as_default;

/// The link-account resource type.
#[derive(Debug, Clone, Copy, Default)]
pub struct OciLinkAccount;

/// Declared configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAccountConfig {
    /// New Relic account to link into; the provider's when unset.
    #[serde(default)]
    pub account_id: Option<i64>,
    /// OCI tenant identifier.
    pub tenant_id: String,
    /// Display name.
    pub name: String,
    /// Operation timeouts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<Timeouts>,
}

/// Persisted state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAccountState {
    /// Linked account id, as a decimal string.
    pub id: String,
    /// New Relic account the tenancy is linked into.
    #[serde(default)]
    pub account_id: Option<i64>,
    /// OCI tenant identifier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tenant_id: String,
    /// Display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Operation timeouts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<Timeouts>,
}

impl LinkAccountState {
    fn from_config(id: i64, account_id: i64, config: LinkAccountConfig) -> Self {
        Self {
            id: id.to_string(),
            account_id: Some(account_id),
            tenant_id: config.tenant_id,
            name: config.name,
            timeouts: config.timeouts,
        }
    }
}

/// Build the link input; empty fields are left out rather than sent blank.
pub fn expand_link_input(config: &LinkAccountConfig) -> LinkAccountInput {
    LinkAccountInput {
        oci: vec![OciLinkAccountInput {
            tenant_id: non_empty(&config.tenant_id),
            name: non_empty(&config.name),
        }],
    }
}

/// Merge what the API echoed for `account` into `state`.
///
/// Fields the API left out (or returned empty) keep their current values.
pub fn flatten(state: &mut LinkAccountState, account: &LinkedAccount) {
    if let Some(name) = account.name.as_deref().filter(|n| !n.is_empty()) {
        state.name = name.to_string();
    }
    if let Some(tenant_id) = account.external_id.as_deref().filter(|t| !t.is_empty()) {
        state.tenant_id = tenant_id.to_string();
    }
    if let Some(account_id) = account.nr_account_id.filter(|id| *id != 0) {
        state.account_id = Some(account_id);
    }
}

/// A conflict that linked nothing. Once an account comes back the attempt
/// is final, since retrying would link the tenancy a second time.
fn is_naming_conflict(result: &LinkResult) -> bool {
    result.linked_accounts.is_empty() && result.errors().iter().any(|e| e.is_naming_conflict())
}

/// Why one link attempt did not produce a final result.
#[derive(Debug)]
enum LinkAttemptError {
    Transport(ClientError),
    NamingConflict(LinkResult),
}

impl LinkAttemptError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::NamingConflict(_))
    }

    fn describe(&self) -> String {
        match self {
            Self::Transport(err) => err.to_string(),
            Self::NamingConflict(result) => result
                .errors()
                .iter()
                .map(|e| format!("{} {}", e.error_type, e.message))
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

#[async_trait::async_trait]
impl Resource for OciLinkAccount {
    const TYPE_NAME: &'static str = "newrelic_cloud_oci_link_account";

    type Config = LinkAccountConfig;
    type State = LinkAccountState;

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Links an OCI tenancy to a New Relic account.")
            .with_attribute(
                "id",
                Attribute::computed_string().with_description("The linked account ID."),
            )
            .with_attribute(
                "account_id",
                Attribute::optional_computed_int64()
                    .with_force_new()
                    .with_description("The New Relic account to link the tenancy into."),
            )
            .with_attribute(
                "tenant_id",
                Attribute::required_string()
                    .with_force_new()
                    .with_description("The OCI tenant identifier."),
            )
            .with_attribute(
                "name",
                Attribute::required_string()
                    .with_description("Display name of the linked account."),
            )
            .with_block("timeouts", Timeouts::block())
            .importable()
    }

    #[instrument(skip_all, fields(tenant_id = %config.tenant_id))]
    async fn create(
        &self,
        ctx: &ResourceContext,
        config: LinkAccountConfig,
    ) -> Result<Outcome<LinkAccountState>, ProviderError> {
        let timeout = match Timeouts::create_timeout(config.timeouts.as_ref()) {
            Ok(timeout) => timeout,
            Err(err) => {
                return Ok(Outcome::absent().with_diagnostic(
                    Diagnostic::error("Invalid create timeout")
                        .with_detail(err.to_string())
                        .with_attribute("timeouts.create"),
                ))
            },
        };

        let account_id = ctx.account_id(config.account_id);
        let input = expand_link_input(&config);
        let policy = RetryPolicy::with_timeout(timeout);

        let api = ctx.api.as_ref();
        let input_ref = &input;
        let attempt_result = retry(
            &policy,
            LinkAttemptError::is_retryable,
            move |attempt| async move {
                debug!(attempt, account_id, "linking OCI account");
                match api.link_account(account_id, input_ref).await {
                    Err(err) => Err(LinkAttemptError::Transport(err)),
                    Ok(result) if is_naming_conflict(&result) => {
                        warn!(attempt, "tenant naming conflict, will retry");
                        Err(LinkAttemptError::NamingConflict(result))
                    },
                    Ok(result) => Ok(result),
                }
            },
        )
        .await;

        let result = match attempt_result {
            Ok(result) => result,
            Err(RetryError::Terminal(LinkAttemptError::Transport(err))) => {
                return Ok(Outcome::absent()
                    .with_diagnostic(transport_error("Failed to link OCI account", &err)))
            },
            // A conflict is always retryable, so the loop only ends on it by timing out.
            Err(RetryError::Terminal(LinkAttemptError::NamingConflict(result))) => result,
            Err(RetryError::Timeout {
                attempts,
                elapsed,
                last,
            }) => {
                let mut detail = format!(
                    "Gave up linking tenant {:?} after {} attempt(s) over {:?}",
                    config.tenant_id, attempts, elapsed
                );
                if let Some(last) = last {
                    detail.push_str(&format!("; last error: {}", last.describe()));
                }
                return Ok(Outcome::absent().with_diagnostic(
                    Diagnostic::error("Timed out linking OCI account").with_detail(detail),
                ));
            },
        };

        let mut diagnostics = Diagnostics::new();
        diagnostics.extend_payload_errors(result.errors());

        let Some(account) = result.linked_accounts.first() else {
            if diagnostics.is_empty() {
                diagnostics.push(Diagnostic::error(
                    "Linking OCI account returned no linked account",
                ));
            }
            return Ok(Outcome::absent().with_diagnostics(diagnostics));
        };

        info!(linked_account_id = account.id, "OCI account linked");
        let mut state = LinkAccountState::from_config(account.id, account_id, config);
        flatten(&mut state, account);
        Ok(Outcome::present(state).with_diagnostics(diagnostics))
    }

    #[instrument(skip_all, fields(id = %state.id))]
    async fn read(
        &self,
        ctx: &ResourceContext,
        mut state: LinkAccountState,
    ) -> Result<Outcome<LinkAccountState>, ProviderError> {
        let linked_account_id = parse_id(&state.id)?;
        let account_id = ctx.account_id(state.account_id);

        match ctx.api.get_linked_account(account_id, linked_account_id).await {
            Ok(account) => {
                flatten(&mut state, &account);
                Ok(Outcome::present(state))
            },
            Err(err) if err.is_not_found() => {
                info!(linked_account_id, "linked account no longer exists");
                Ok(Outcome::absent())
            },
            Err(err) => Ok(Outcome::present(state)
                .with_diagnostic(transport_error("Failed to read linked account", &err))),
        }
    }

    #[instrument(skip_all, fields(id = %prior.id))]
    async fn update(
        &self,
        ctx: &ResourceContext,
        prior: LinkAccountState,
        config: LinkAccountConfig,
    ) -> Result<Outcome<LinkAccountState>, ProviderError> {
        let linked_account_id = parse_id(&prior.id)?;
        let account_id = ctx.account_id(prior.account_id);
        let input = [RenameAccountInput {
            linked_account_id,
            name: config.name.clone(),
        }];

        let result = match ctx.api.rename_account(account_id, &input).await {
            Ok(result) => result,
            Err(err) => {
                return Ok(Outcome::present(prior)
                    .with_diagnostic(transport_error("Failed to rename linked account", &err)))
            },
        };

        if result.has_errors() {
            let mut diagnostics = Diagnostics::new();
            diagnostics.extend_payload_errors(result.errors());
            return Ok(Outcome::present(prior).with_diagnostics(diagnostics));
        }

        let mut state = LinkAccountState {
            name: config.name,
            timeouts: config.timeouts,
            ..prior
        };
        if let Some(account) = result
            .linked_accounts
            .iter()
            .find(|a| a.id == linked_account_id)
        {
            flatten(&mut state, account);
        }
        Ok(Outcome::present(state))
    }

    #[instrument(skip_all, fields(id = %state.id))]
    async fn delete(
        &self,
        ctx: &ResourceContext,
        state: LinkAccountState,
    ) -> Result<Outcome<LinkAccountState>, ProviderError> {
        let linked_account_id = parse_id(&state.id)?;
        let account_id = ctx.account_id(state.account_id);
        let input = [UnlinkAccountInput { linked_account_id }];

        match ctx.api.unlink_account(account_id, &input).await {
            Ok(result) => {
                let mut diagnostics = Diagnostics::new();
                diagnostics.extend_payload_errors(result.errors());
                Ok(Outcome::absent().with_diagnostics(diagnostics))
            },
            Err(err) => Ok(Outcome::present(state)
                .with_diagnostic(transport_error("Failed to unlink OCI account", &err))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::PayloadError;
    use crate::testing::{ApiCall, FakeCloudApi, FakeFailure};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn config() -> LinkAccountConfig {
        LinkAccountConfig {
            account_id: Some(500),
            tenant_id: "t-123".to_string(),
            name: "acct-1".to_string(),
            timeouts: None,
        }
    }

    fn state() -> LinkAccountState {
        LinkAccountState {
            id: "42".to_string(),
            account_id: Some(500),
            tenant_id: "t-123".to_string(),
            name: "acct-1".to_string(),
            timeouts: None,
        }
    }

    fn linked(id: i64) -> LinkedAccount {
        LinkedAccount::new(id)
            .with_name("acct-1")
            .with_external_id("t-123")
            .with_nr_account_id(500)
    }

    fn context(fake: &Arc<FakeCloudApi>) -> ResourceContext {
        ResourceContext::new(fake.clone(), 100)
    }

    fn conflict() -> LinkResult {
        LinkResult {
            errors: vec![PayloadError::new(
                "ERR_INVALID_DATA",
                "Tenant name already exists",
            )],
            linked_accounts: vec![],
        }
    }

    #[test]
    fn test_expand_omits_empty_fields() {
        let mut cfg = config();
        cfg.name = String::new();
        let input = expand_link_input(&cfg);
        assert_eq!(input.oci.len(), 1);
        assert_eq!(input.oci[0].tenant_id.as_deref(), Some("t-123"));
        assert!(input.oci[0].name.is_none());
    }

    #[test]
    fn test_imported_state_decodes_from_id_alone() {
        let imported: LinkAccountState =
            serde_json::from_value(serde_json::json!({"id": "42"})).unwrap();
        assert_eq!(imported.id, "42");
        assert!(imported.tenant_id.is_empty());
        assert!(imported.account_id.is_none());
    }

    #[test]
    fn test_flatten_keeps_values_not_echoed() {
        let mut s = state();
        flatten(&mut s, &LinkedAccount::new(42).with_name("renamed"));
        assert_eq!(s.name, "renamed");
        assert_eq!(s.tenant_id, "t-123");
        assert_eq!(s.account_id, Some(500));

        let mut blank = LinkedAccount::new(42);
        blank.name = Some(String::new());
        flatten(&mut s, &blank);
        assert_eq!(s.name, "renamed");
    }

    #[tokio::test]
    async fn test_create_assigns_id_from_first_account() {
        let fake = Arc::new(FakeCloudApi::new());
        fake.on_link(Ok(LinkResult {
            errors: vec![],
            linked_accounts: vec![linked(42)],
        }));

        let outcome = assert_ok!(OciLinkAccount.create(&context(&fake), config()).await);
        let state = outcome.state.unwrap();
        assert_eq!(state.id, "42");
        assert_eq!(state.account_id, Some(500));
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(
            fake.calls(),
            vec![ApiCall::LinkAccount {
                account_id: 500,
                input: expand_link_input(&config()),
            }]
        );
    }

    #[tokio::test]
    async fn test_create_partial_success_keeps_id_and_reports_errors() {
        let fake = Arc::new(FakeCloudApi::new());
        fake.on_link(Ok(LinkResult {
            errors: vec![PayloadError::new("ERR_WARNING", "auth label ignored")],
            linked_accounts: vec![linked(42)],
        }));

        let outcome = assert_ok!(OciLinkAccount.create(&context(&fake), config()).await);
        assert_eq!(outcome.state.unwrap().id, "42");
        let summaries: Vec<_> = outcome.diagnostics.iter().map(|d| d.summary.clone()).collect();
        assert_eq!(summaries, vec!["ERR_WARNING auth label ignored"]);
        assert!(outcome.diagnostics.has_errors());
    }

    #[tokio::test]
    async fn test_create_conflict_with_linked_account_is_not_retried() {
        let fake = Arc::new(FakeCloudApi::new());
        let mut partial = conflict();
        partial.linked_accounts = vec![linked(42)];
        fake.on_link(Ok(partial));
        fake.on_link(Ok(LinkResult {
            errors: vec![],
            linked_accounts: vec![linked(43)],
        }));

        let outcome = assert_ok!(OciLinkAccount.create(&context(&fake), config()).await);
        let summaries: Vec<_> = outcome.diagnostics.iter().map(|d| d.summary.clone()).collect();
        assert_eq!(summaries, vec!["ERR_INVALID_DATA Tenant name already exists"]);
        assert_eq!(outcome.state.unwrap().id, "42");
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_create_payload_error_without_entities_leaves_absent() {
        let fake = Arc::new(FakeCloudApi::new());
        fake.on_link(Ok(LinkResult {
            errors: vec![PayloadError::new("ERR_INVALID_DATA", "Invalid tenant")],
            linked_accounts: vec![],
        }));

        let outcome = assert_ok!(OciLinkAccount.create(&context(&fake), config()).await);
        assert!(outcome.state.is_none());
        assert_eq!(outcome.diagnostics.len(), 1);
        // Non-conflict payload errors are not retried.
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_create_transport_error_is_fatal_and_not_retried() {
        let fake = Arc::new(FakeCloudApi::new());
        fake.on_link(Err(FakeFailure::Unauthorized));

        let outcome = assert_ok!(OciLinkAccount.create(&context(&fake), config()).await);
        assert!(outcome.state.is_none());
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(
            outcome.diagnostics.iter().next().unwrap().summary,
            "Failed to link OCI account"
        );
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_retries_naming_conflict_until_success() {
        let fake = Arc::new(FakeCloudApi::new());
        fake.on_link(Ok(conflict()));
        fake.on_link(Ok(conflict()));
        fake.on_link(Ok(LinkResult {
            errors: vec![],
            linked_accounts: vec![linked(42)],
        }));

        let outcome = assert_ok!(OciLinkAccount.create(&context(&fake), config()).await);
        assert_eq!(outcome.state.unwrap().id, "42");
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(fake.calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_times_out_on_persistent_conflict() {
        let fake = Arc::new(FakeCloudApi::new());
        fake.on_link(Ok(conflict()));

        let mut cfg = config();
        cfg.timeouts = Some(Timeouts {
            create: Some("5s".to_string()),
        });

        let started = tokio::time::Instant::now();
        let outcome = assert_ok!(OciLinkAccount.create(&context(&fake), cfg).await);
        assert!(started.elapsed() <= Duration::from_secs(5));
        assert!(outcome.state.is_none());
        assert_eq!(outcome.diagnostics.len(), 1);
        let diag = outcome.diagnostics.iter().next().unwrap();
        assert_eq!(diag.summary, "Timed out linking OCI account");
        assert!(diag
            .detail
            .as_deref()
            .unwrap()
            .contains("Tenant name already exists"));
        assert!(fake.calls().len() > 1);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_timeout_without_calling_api() {
        let fake = Arc::new(FakeCloudApi::new());
        let mut cfg = config();
        cfg.timeouts = Some(Timeouts {
            create: Some("soon".to_string()),
        });

        let outcome = assert_ok!(OciLinkAccount.create(&context(&fake), cfg).await);
        assert!(outcome.state.is_none());
        assert!(outcome.has_errors());
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_zero_timeout() {
        let fake = Arc::new(FakeCloudApi::new());
        let mut cfg = config();
        cfg.timeouts = Some(Timeouts {
            create: Some("0s".to_string()),
        });

        let outcome = assert_ok!(OciLinkAccount.create(&context(&fake), cfg).await);
        assert!(outcome.state.is_none());
        let diag = outcome.diagnostics.iter().next().unwrap();
        assert_eq!(diag.summary, "Invalid create timeout");
        assert_eq!(diag.attribute.as_deref(), Some("timeouts.create"));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_uses_provider_account_when_unset() {
        let fake = Arc::new(FakeCloudApi::new());
        fake.on_link(Ok(LinkResult {
            errors: vec![],
            linked_accounts: vec![LinkedAccount::new(42)],
        }));
        let mut cfg = config();
        cfg.account_id = None;

        let outcome = assert_ok!(OciLinkAccount.create(&context(&fake), cfg).await);
        assert_eq!(outcome.state.unwrap().account_id, Some(100));
        assert!(matches!(
            fake.calls()[0],
            ApiCall::LinkAccount { account_id: 100, .. }
        ));
    }

    #[tokio::test]
    async fn test_read_flattens_external_changes() {
        let fake = Arc::new(FakeCloudApi::new());
        fake.on_get_linked_account(Ok(linked(42).with_name("renamed-outside")));

        let outcome = assert_ok!(OciLinkAccount.read(&context(&fake), state()).await);
        assert_eq!(outcome.state.unwrap().name, "renamed-outside");
        assert_eq!(
            fake.calls(),
            vec![ApiCall::GetLinkedAccount {
                account_id: 500,
                linked_account_id: 42
            }]
        );
    }

    #[tokio::test]
    async fn test_read_not_found_clears_state_silently() {
        let fake = Arc::new(FakeCloudApi::new());
        fake.on_get_linked_account(Err(FakeFailure::NotFound));

        let outcome = assert_ok!(OciLinkAccount.read(&context(&fake), state()).await);
        assert!(outcome.state.is_none());
        assert!(outcome.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_read_not_found_message_fallback() {
        let fake = Arc::new(FakeCloudApi::new());
        fake.on_get_linked_account(Err(FakeFailure::GraphQl(
            "Linked account 42 not found".to_string(),
        )));

        let outcome = assert_ok!(OciLinkAccount.read(&context(&fake), state()).await);
        assert!(outcome.state.is_none());
        assert!(outcome.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_read_other_failure_is_fatal() {
        let fake = Arc::new(FakeCloudApi::new());
        fake.on_get_linked_account(Err(FakeFailure::GraphQl("Internal error".to_string())));

        let outcome = assert_ok!(OciLinkAccount.read(&context(&fake), state()).await);
        assert_eq!(outcome.state, Some(state()));
        assert!(outcome.has_errors());
    }

    #[tokio::test]
    async fn test_corrupt_id_is_conversion_error() {
        let fake = Arc::new(FakeCloudApi::new());
        let mut corrupt = state();
        corrupt.id = "forty-two".to_string();

        let err = assert_err!(OciLinkAccount.read(&context(&fake), corrupt).await);
        assert!(matches!(err, ProviderError::InvalidId { .. }));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_renames() {
        let fake = Arc::new(FakeCloudApi::new());
        fake.on_rename(Ok(crate::client::RenameResult {
            errors: vec![],
            linked_accounts: vec![LinkedAccount::new(42).with_name("acct-2")],
        }));
        let mut cfg = config();
        cfg.name = "acct-2".to_string();

        let outcome = assert_ok!(OciLinkAccount.update(&context(&fake), state(), cfg).await);
        assert_eq!(outcome.state.unwrap().name, "acct-2");
        assert_eq!(
            fake.calls(),
            vec![ApiCall::RenameAccount {
                account_id: 500,
                input: vec![RenameAccountInput {
                    linked_account_id: 42,
                    name: "acct-2".to_string()
                }]
            }]
        );
    }

    #[tokio::test]
    async fn test_update_failure_keeps_prior_state() {
        let fake = Arc::new(FakeCloudApi::new());
        fake.on_rename(Err(FakeFailure::GraphQl("boom".to_string())));
        let mut cfg = config();
        cfg.name = "acct-2".to_string();

        let outcome =
            assert_ok!(OciLinkAccount.update(&context(&fake), state(), cfg.clone()).await);
        assert_eq!(outcome.state, Some(state()));
        assert!(outcome.has_errors());

        fake.on_rename(Ok(crate::client::RenameResult {
            errors: vec![PayloadError::new("ERR_INVALID_DATA", "Name too long")],
            linked_accounts: vec![],
        }));
        let outcome = assert_ok!(OciLinkAccount.update(&context(&fake), state(), cfg).await);
        assert_eq!(outcome.state, Some(state()));
        assert_eq!(
            outcome.diagnostics.iter().next().unwrap().summary,
            "ERR_INVALID_DATA Name too long"
        );
    }

    #[tokio::test]
    async fn test_delete_clears_state_even_with_payload_errors() {
        let fake = Arc::new(FakeCloudApi::new());
        fake.on_unlink(Ok(crate::client::UnlinkResult {
            errors: vec![PayloadError::new("ERR_INVALID_DATA", "already unlinked")],
            unlinked_accounts: vec![],
        }));

        let outcome = assert_ok!(OciLinkAccount.delete(&context(&fake), state()).await);
        assert!(outcome.state.is_none());
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(
            fake.calls(),
            vec![ApiCall::UnlinkAccount {
                account_id: 500,
                input: vec![UnlinkAccountInput {
                    linked_account_id: 42
                }]
            }]
        );
    }

    #[tokio::test]
    async fn test_delete_transport_error_keeps_state() {
        let fake = Arc::new(FakeCloudApi::new());
        fake.on_unlink(Err(FakeFailure::Unauthorized));

        let outcome = assert_ok!(OciLinkAccount.delete(&context(&fake), state()).await);
        assert_eq!(outcome.state, Some(state()));
        assert!(outcome.has_errors());
    }
}
