//! `newrelic_cloud_oci_integrations`: which integrations are enabled on an
//! OCI linked account.
//!
//! The resource has no identifier of its own; it reuses the linked account's.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{nullable_blocks, parse_id, transport_error, Outcome, Resource, ResourceContext};
use crate::client::{
    ConfigureInput, DisableAccountIntegrationInput, DisableInput, OciDisableIntegrationsInput,
    OciIntegrationsInput, OciMetadataAndTagsInput, Payload,
};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::ProviderError;
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::types::null_as_default;

/// The integrations resource type.
#[derive(Debug, Clone, Copy, Default)]
pub struct OciIntegrations;

/// The `oci_metadata_and_tags {}` block. Its presence enables the integration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataAndTagsBlock {}

/// Declared configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationsConfig {
    /// New Relic account; the provider's when unset.
    #[serde(default)]
    pub account_id: Option<i64>,
    /// Linked account the integrations belong to.
    pub linked_account_id: i64,
    /// At most one metadata-and-tags block.
    #[serde(default, deserialize_with = "nullable_blocks")]
    pub oci_metadata_and_tags: Vec<MetadataAndTagsBlock>,
}

/// Persisted state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationsState {
    /// The linked account id, as a decimal string.
    pub id: String,
    /// New Relic account.
    #[serde(default)]
    pub account_id: Option<i64>,
    /// Linked account the integrations belong to.
    #[serde(default, deserialize_with = "null_as_default")]
    pub linked_account_id: i64,
    /// At most one metadata-and-tags block.
    #[serde(default, deserialize_with = "nullable_blocks")]
    pub oci_metadata_and_tags: Vec<MetadataAndTagsBlock>,
}

impl IntegrationsState {
    fn from_config(account_id: i64, config: IntegrationsConfig) -> Self {
        Self {
            id: config.linked_account_id.to_string(),
            account_id: Some(account_id),
            linked_account_id: config.linked_account_id,
            oci_metadata_and_tags: config.oci_metadata_and_tags,
        }
    }
}

/// Build the configure and disable inputs for a transition from `prior` to
/// `config`.
///
/// A present block yields a configure entry, even when the block is empty.
/// A block that was present in `prior` and is gone now yields a disable
/// entry instead. At most one of the two inputs is populated.
pub fn expand_integrations_input(
    config: &IntegrationsConfig,
    prior: Option<&IntegrationsState>,
    linked_account_id: i64,
) -> (ConfigureInput, DisableInput) {
    let mut configure = ConfigureInput::default();
    let mut disable = DisableInput::default();

    let before = prior.map_or(0, |p| p.oci_metadata_and_tags.len());
    let after = config.oci_metadata_and_tags.len();

    if after > 0 {
        configure.oci = OciIntegrationsInput {
            oci_metadata_and_tags: vec![OciMetadataAndTagsInput { linked_account_id }],
        };
    } else if after < before {
        disable.oci = OciDisableIntegrationsInput {
            oci_metadata_and_tags: vec![DisableAccountIntegrationInput { linked_account_id }],
        };
    }

    (configure, disable)
}

/// Disable input for everything `state` has enabled.
pub fn expand_disable_input(state: &IntegrationsState, linked_account_id: i64) -> DisableInput {
    let mut disable = DisableInput::default();
    if !state.oci_metadata_and_tags.is_empty() {
        disable.oci.oci_metadata_and_tags =
            vec![DisableAccountIntegrationInput { linked_account_id }];
    }
    disable
}

#[async_trait::async_trait]
impl Resource for OciIntegrations {
    const TYPE_NAME: &'static str = "newrelic_cloud_oci_integrations";

    type Config = IntegrationsConfig;
    type State = IntegrationsState;

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Integrations enabled on an OCI linked account.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "account_id",
                Attribute::optional_computed_int64()
                    .with_description("The New Relic account the linked account belongs to."),
            )
            .with_attribute(
                "linked_account_id",
                Attribute::required_int64()
                    .with_force_new()
                    .with_description("The ID of the linked OCI account."),
            )
            .with_block(
                "oci_metadata_and_tags",
                NestedBlock::list(
                    Block::new().with_description("OCI Metadata and Tags integration"),
                )
                .with_max_items(1),
            )
            .importable()
    }

    #[instrument(skip_all, fields(linked_account_id = config.linked_account_id))]
    async fn create(
        &self,
        ctx: &ResourceContext,
        config: IntegrationsConfig,
    ) -> Result<Outcome<IntegrationsState>, ProviderError> {
        let account_id = ctx.account_id(config.account_id);
        let (configure, _) = expand_integrations_input(&config, None, config.linked_account_id);

        if configure.is_empty() {
            return Ok(Outcome::present(IntegrationsState::from_config(account_id, config)));
        }

        let result = match ctx.api.configure_integration(account_id, &configure).await {
            Ok(result) => result,
            Err(err) => {
                return Ok(Outcome::absent()
                    .with_diagnostic(transport_error("Failed to configure OCI integrations", &err)))
            },
        };

        let mut diagnostics = Diagnostics::new();
        diagnostics.extend_payload_errors(result.errors());

        if result.integrations.is_empty() {
            if diagnostics.is_empty() {
                diagnostics.push(Diagnostic::error(
                    "Configuring OCI integrations returned no integrations",
                ));
            }
            return Ok(Outcome::absent().with_diagnostics(diagnostics));
        }

        info!(count = result.integrations.len(), "OCI integrations configured");
        Ok(Outcome::present(IntegrationsState::from_config(account_id, config))
            .with_diagnostics(diagnostics))
    }

    #[instrument(skip_all, fields(id = %state.id))]
    async fn read(
        &self,
        ctx: &ResourceContext,
        mut state: IntegrationsState,
    ) -> Result<Outcome<IntegrationsState>, ProviderError> {
        let linked_account_id = parse_id(&state.id)?;
        let account_id = ctx.account_id(state.account_id);

        match ctx.api.get_linked_account(account_id, linked_account_id).await {
            Ok(account) => {
                if let Some(nr_account_id) = account.nr_account_id.filter(|id| *id != 0) {
                    state.account_id = Some(nr_account_id);
                }
                state.linked_account_id = account.id;
                Ok(Outcome::present(state))
            },
            Err(err) if err.is_not_found() => {
                info!(linked_account_id, "linked account no longer exists");
                Ok(Outcome::absent())
            },
            Err(err) => Ok(Outcome::present(state)
                .with_diagnostic(transport_error("Failed to read OCI integrations", &err))),
        }
    }

    #[instrument(skip_all, fields(id = %prior.id))]
    async fn update(
        &self,
        ctx: &ResourceContext,
        prior: IntegrationsState,
        config: IntegrationsConfig,
    ) -> Result<Outcome<IntegrationsState>, ProviderError> {
        let account_id = ctx.account_id(config.account_id.or(prior.account_id));
        let (configure, disable) =
            expand_integrations_input(&config, Some(&prior), config.linked_account_id);

        if !disable.is_empty() {
            match ctx.api.disable_integration(account_id, &disable).await {
                Ok(result) if result.has_errors() => {
                    let mut diagnostics = Diagnostics::new();
                    diagnostics.extend_payload_errors(result.errors());
                    return Ok(Outcome::present(prior).with_diagnostics(diagnostics));
                },
                Ok(_) => {},
                Err(err) => {
                    return Ok(Outcome::present(prior).with_diagnostic(transport_error(
                        "Failed to disable OCI integrations",
                        &err,
                    )))
                },
            }
        }

        if !configure.is_empty() {
            match ctx.api.configure_integration(account_id, &configure).await {
                Ok(result) if result.has_errors() => {
                    let mut diagnostics = Diagnostics::new();
                    diagnostics.extend_payload_errors(result.errors());
                    return Ok(Outcome::present(prior).with_diagnostics(diagnostics));
                },
                Ok(_) => {},
                Err(err) => {
                    return Ok(Outcome::present(prior).with_diagnostic(transport_error(
                        "Failed to configure OCI integrations",
                        &err,
                    )))
                },
            }
        }

        let state = IntegrationsState {
            id: prior.id,
            ..IntegrationsState::from_config(account_id, config)
        };
        Ok(Outcome::present(state))
    }

    #[instrument(skip_all, fields(id = %state.id))]
    async fn delete(
        &self,
        ctx: &ResourceContext,
        state: IntegrationsState,
    ) -> Result<Outcome<IntegrationsState>, ProviderError> {
        let linked_account_id = parse_id(&state.id)?;
        let disable = expand_disable_input(&state, linked_account_id);
        if disable.is_empty() {
            return Ok(Outcome::absent());
        }

        let account_id = ctx.account_id(state.account_id);
        match ctx.api.disable_integration(account_id, &disable).await {
            Ok(result) => {
                let mut diagnostics = Diagnostics::new();
                diagnostics.extend_payload_errors(result.errors());
                Ok(Outcome::absent().with_diagnostics(diagnostics))
            },
            Err(err) => Ok(Outcome::present(state)
                .with_diagnostic(transport_error("Failed to disable OCI integrations", &err))),
        }
    }
}
