//! The New Relic OCI provider.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use crate::client::{CloudApi, NerdGraphClient};
use crate::config::ProviderConfig;
use crate::diagnostics::Diagnostic;
use crate::error::ProviderError;
use crate::plan::plan_resource;
use crate::resources::{parse_id, OciIntegrations, OciLinkAccount, Resource, ResourceContext};
use crate::schema::ProviderSchema;
use crate::service::ProviderService;
use crate::types::{ImportedResource, PlanResult, ResourceResponse};
use crate::validation::validate;

/// Manages OCI linked accounts and their integrations.
///
/// Each instance carries its own configuration; nothing is shared between
/// providers. Resources can only be managed after [`ProviderService::configure`].
pub struct NewRelicOciProvider {
    context: RwLock<Option<ResourceContext>>,
    api_override: Option<Arc<dyn CloudApi>>,
}

impl Default for NewRelicOciProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl NewRelicOciProvider {
    /// A provider that talks to NerdGraph once configured.
    pub fn new() -> Self {
        Self {
            context: RwLock::new(None),
            api_override: None,
        }
    }

    /// A provider that uses `api` instead of building a NerdGraph client.
    pub fn with_api(api: Arc<dyn CloudApi>) -> Self {
        Self {
            context: RwLock::new(None),
            api_override: Some(api),
        }
    }

    async fn context(&self) -> Result<ResourceContext, ProviderError> {
        self.context.read().await.clone().ok_or_else(|| {
            ProviderError::NotConfigured(
                "configure must be called before managing resources".into(),
            )
        })
    }

    async fn run_create<R: Resource>(
        &self,
        resource: R,
        planned_state: Value,
    ) -> Result<ResourceResponse, ProviderError> {
        let ctx = self.context().await?;
        let config: R::Config = serde_json::from_value(planned_state)?;
        resource.create(&ctx, config).await?.into_response()
    }

    async fn run_read<R: Resource>(
        &self,
        resource: R,
        current_state: Value,
    ) -> Result<ResourceResponse, ProviderError> {
        let ctx = self.context().await?;
        let state: R::State = serde_json::from_value(current_state)?;
        resource.read(&ctx, state).await?.into_response()
    }

    async fn run_update<R: Resource>(
        &self,
        resource: R,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<ResourceResponse, ProviderError> {
        let ctx = self.context().await?;
        let prior: R::State = serde_json::from_value(prior_state)?;
        let config: R::Config = serde_json::from_value(planned_state)?;
        resource.update(&ctx, prior, config).await?.into_response()
    }

    async fn run_delete<R: Resource>(
        &self,
        resource: R,
        current_state: Value,
    ) -> Result<ResourceResponse, ProviderError> {
        let ctx = self.context().await?;
        let state: R::State = serde_json::from_value(current_state)?;
        resource.delete(&ctx, state).await?.into_response()
    }
}

fn unknown(resource_type: &str) -> ProviderError {
    ProviderError::UnknownResource(resource_type.to_string())
}

fn log_response(
    operation: &str,
    resource_type: &str,
    result: &Result<ResourceResponse, ProviderError>,
) {
    match result {
        Ok(response) if response.has_errors() => warn!(
            operation,
            resource_type,
            diagnostics = response.diagnostics.len(),
            "completed with errors"
        ),
        Ok(response) => info!(
            operation,
            resource_type,
            id = response.id().unwrap_or_default(),
            "completed successfully"
        ),
        Err(e) => error!(operation, resource_type, error = %e, "failed"),
    }
}

#[async_trait::async_trait]
impl ProviderService for NewRelicOciProvider {
    fn schema(&self) -> ProviderSchema {
        ProviderSchema::new()
            .with_provider_config(ProviderConfig::schema())
            .with_resource(OciLinkAccount::TYPE_NAME, OciLinkAccount.schema())
            .with_resource(OciIntegrations::TYPE_NAME, OciIntegrations.schema())
    }

    #[instrument(skip_all)]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let diagnostics = validate(&ProviderConfig::schema(), &config);
        if !diagnostics.is_empty() {
            warn!(diagnostics = diagnostics.len(), "provider configuration is invalid");
            return Ok(diagnostics);
        }

        let config = match ProviderConfig::from_value(config) {
            Ok(config) => config,
            Err(e) => {
                return Ok(vec![
                    Diagnostic::error("Invalid provider configuration").with_detail(e.message())
                ])
            },
        };

        let api: Arc<dyn CloudApi> = match &self.api_override {
            Some(api) => api.clone(),
            None => match NerdGraphClient::new(&config.client_config()).await {
                Ok(client) => Arc::new(client),
                Err(e) => {
                    return Ok(vec![Diagnostic::error("Failed to create NerdGraph client")
                        .with_detail(e.to_string())])
                },
            },
        };

        let mut diagnostics = Vec::new();
        if config.insecure_skip_verify {
            diagnostics.push(
                Diagnostic::warning("TLS certificate verification is disabled")
                    .with_attribute("insecure_skip_verify"),
            );
        }

        info!(region = %config.region, endpoint = config.endpoint(), "provider configured");
        *self.context.write().await = Some(ResourceContext::new(api, config.account_id));
        Ok(diagnostics)
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let schema = self.schema();
        let resource = schema.resource(resource_type).ok_or_else(|| unknown(resource_type))?;
        let plan = plan_resource(resource, prior_state.as_ref(), &proposed_state);
        debug!(
            resource_type,
            changes = plan.changes.len(),
            requires_replace = plan.requires_replace,
            "planned"
        );
        Ok(plan)
    }

    #[instrument(skip(self, planned_state))]
    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<ResourceResponse, ProviderError> {
        let result = match resource_type {
            t if t == OciLinkAccount::TYPE_NAME => {
                self.run_create(OciLinkAccount, planned_state).await
            },
            t if t == OciIntegrations::TYPE_NAME => {
                self.run_create(OciIntegrations, planned_state).await
            },
            _ => Err(unknown(resource_type)),
        };
        log_response("create", resource_type, &result);
        result
    }

    #[instrument(skip(self, current_state))]
    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<ResourceResponse, ProviderError> {
        let result = match resource_type {
            t if t == OciLinkAccount::TYPE_NAME => {
                self.run_read(OciLinkAccount, current_state).await
            },
            t if t == OciIntegrations::TYPE_NAME => {
                self.run_read(OciIntegrations, current_state).await
            },
            _ => Err(unknown(resource_type)),
        };
        log_response("read", resource_type, &result);
        result
    }

    #[instrument(skip(self, prior_state, planned_state))]
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<ResourceResponse, ProviderError> {
        let result = match resource_type {
            t if t == OciLinkAccount::TYPE_NAME => {
                self.run_update(OciLinkAccount, prior_state, planned_state).await
            },
            t if t == OciIntegrations::TYPE_NAME => {
                self.run_update(OciIntegrations, prior_state, planned_state).await
            },
            _ => Err(unknown(resource_type)),
        };
        log_response("update", resource_type, &result);
        result
    }

    #[instrument(skip(self, current_state))]
    async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<ResourceResponse, ProviderError> {
        let result = match resource_type {
            t if t == OciLinkAccount::TYPE_NAME => {
                self.run_delete(OciLinkAccount, current_state).await
            },
            t if t == OciIntegrations::TYPE_NAME => {
                self.run_delete(OciIntegrations, current_state).await
            },
            _ => Err(unknown(resource_type)),
        };
        log_response("delete", resource_type, &result);
        result
    }

    #[instrument(skip(self))]
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let schema = self.schema();
        let resource = schema.resource(resource_type).ok_or_else(|| unknown(resource_type))?;
        if !resource.importable {
            return Err(ProviderError::Validation(format!(
                "Import not supported for resource type: {}",
                resource_type
            )));
        }

        let linked_account_id = parse_id(id)?;
        let state = if resource_type == OciIntegrations::TYPE_NAME {
            json!({"id": id, "linked_account_id": linked_account_id})
        } else {
            json!({"id": id})
        };
        info!(resource_type, id, "imported");
        Ok(vec![ImportedResource::new(resource_type, state)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCloudApi;

    fn configured_config() -> Value {
        json!({"account_id": 500, "api_key": "NRAK-TEST"})
    }

    #[test]
    fn test_schema_lists_both_resources() {
        let provider = NewRelicOciProvider::new();
        let metadata = provider.metadata();
        assert_eq!(
            metadata.resources,
            vec![
                "newrelic_cloud_oci_integrations".to_string(),
                "newrelic_cloud_oci_link_account".to_string(),
            ]
        );
        let schema = provider.schema();
        assert!(schema.provider.block.attributes.contains_key("api_key"));
        assert!(schema.resources.values().all(|s| s.importable));
    }

    #[tokio::test]
    async fn test_operations_require_configure() {
        let provider = NewRelicOciProvider::with_api(Arc::new(FakeCloudApi::new()));
        let err = provider
            .read("newrelic_cloud_oci_link_account", json!({"id": "42"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_configure_reports_invalid_config() {
        let provider = NewRelicOciProvider::with_api(Arc::new(FakeCloudApi::new()));
        let diagnostics = provider
            .configure(json!({"account_id": "five hundred"}))
            .await
            .unwrap();
        assert_eq!(diagnostics.len(), 2);
        assert!(provider.context().await.is_err());

        let diagnostics = provider
            .configure(json!({"account_id": 500, "api_key": ""}))
            .await
            .unwrap();
        assert_eq!(diagnostics[0].summary, "Invalid provider configuration");
    }

    #[tokio::test]
    async fn test_configure_builds_nerdgraph_client() {
        let provider = NewRelicOciProvider::new();
        let diagnostics = provider
            .configure(json!({
                "account_id": 500,
                "api_key": "NRAK-TEST",
                "region": "EU",
                "insecure_skip_verify": true
            }))
            .await
            .unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert!(!diagnostics[0].is_error());
        assert_eq!(provider.context().await.unwrap().default_account_id, 500);
    }

    #[tokio::test]
    async fn test_unknown_resource_type() {
        let provider = NewRelicOciProvider::with_api(Arc::new(FakeCloudApi::new()));
        provider.configure(configured_config()).await.unwrap();

        let err = provider
            .create("newrelic_cloud_aws_link_account", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));

        let err = provider
            .plan("newrelic_cloud_aws_link_account", None, json!({}), json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));
    }

    #[tokio::test]
    async fn test_import_requires_numeric_id() {
        let provider = NewRelicOciProvider::new();

        let imported = provider
            .import_resource("newrelic_cloud_oci_integrations", "42")
            .await
            .unwrap();
        assert_eq!(imported[0].state, json!({"id": "42", "linked_account_id": 42}));

        let err = provider
            .import_resource("newrelic_cloud_oci_link_account", "ocid1.tenancy")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidId { .. }));
    }
}
