//! [`CloudApi`] over New Relic's NerdGraph GraphQL endpoint.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Certificate, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::model::{
    ConfigureInput, ConfigureResult, DisableInput, DisableResult, LinkAccountInput, LinkResult,
    LinkedAccount, RenameAccountInput, RenameResult, UnlinkAccountInput, UnlinkResult,
};
use super::{ClientError, CloudApi};
use crate::config::ClientConfig;

/// Longest response body kept in an [`ClientError::Http`] or log line.
const MAX_BODY_LENGTH: usize = 200;

const PAYLOAD_ERROR_FIELDS: &str =
    "errors { type message linkedAccountId nrAccountId providerSlug }";
const LINKED_ACCOUNT_FIELDS: &str = "id name externalId nrAccountId authLabel disabled";
const INTEGRATION_FIELDS: &str =
    "id name nrAccountId linkedAccount { id name } service { slug }";

/// NerdGraph client authenticated with a user API key.
#[derive(Clone)]
pub struct NerdGraphClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl std::fmt::Debug for NerdGraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NerdGraphClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

impl NerdGraphClient {
    /// Build a client from its configuration. Reads `cacert_file` when set.
    pub async fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.request_timeout);

        if config.insecure_skip_verify {
            warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(path) = &config.cacert_file {
            let pem = tokio::fs::read(path).await.map_err(|e| {
                ClientError::Config(format!("reading {}: {}", path.display(), e))
            })?;
            let cert = Certificate::from_pem(&pem).map_err(|e| {
                ClientError::Config(format!("parsing {}: {}", path.display(), e))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        let http = builder
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// The GraphQL endpoint this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST a GraphQL document and return its `data` object.
    async fn execute(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> Result<Value, ClientError> {
        debug!(operation, endpoint = %self.endpoint, "NerdGraph request");

        let response = self
            .http
            .post(&self.endpoint)
            .header("Api-Key", &self.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(ClientError::Unauthorized(format!(
                "NerdGraph returned HTTP {}",
                status.as_u16()
            )));
        }
        if !status.is_success() {
            let body = truncate(&body);
            warn!(operation, status = status.as_u16(), %body, "NerdGraph request failed");
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GraphQlResponse = serde_json::from_str(&body)?;
        if !envelope.errors.is_empty() {
            let messages: Vec<&str> = envelope
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect();
            return Err(ClientError::GraphQl(messages.join("; ")));
        }

        match envelope.data {
            Some(data) if !data.is_null() => Ok(data),
            _ => Err(ClientError::MissingData("data")),
        }
    }

    /// Run a mutation and decode the object under `field`.
    async fn mutate<T: DeserializeOwned>(
        &self,
        field: &'static str,
        query: &str,
        variables: Value,
    ) -> Result<T, ClientError> {
        let mut data = self.execute(field, query, variables).await?;
        match data.get_mut(field).map(Value::take) {
            Some(result) if !result.is_null() => Ok(serde_json::from_value(result)?),
            _ => Err(ClientError::MissingData(field)),
        }
    }
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_BODY_LENGTH {
        return body.to_string();
    }
    let head: String = body.chars().take(MAX_BODY_LENGTH).collect();
    format!("{}... [truncated, {} bytes total]", head, body.len())
}

#[async_trait::async_trait]
impl CloudApi for NerdGraphClient {
    async fn link_account(
        &self,
        account_id: i64,
        input: &LinkAccountInput,
    ) -> Result<LinkResult, ClientError> {
        let query = format!(
            "mutation($accountId: Int!, $accounts: CloudLinkCloudAccountsInput!) {{ \
             cloudLinkAccount(accountId: $accountId, accounts: $accounts) {{ \
             {PAYLOAD_ERROR_FIELDS} linkedAccounts {{ {LINKED_ACCOUNT_FIELDS} }} }} }}"
        );
        self.mutate(
            "cloudLinkAccount",
            &query,
            json!({ "accountId": account_id, "accounts": input }),
        )
        .await
    }

    async fn unlink_account(
        &self,
        account_id: i64,
        input: &[UnlinkAccountInput],
    ) -> Result<UnlinkResult, ClientError> {
        let query = format!(
            "mutation($accountId: Int!, $accounts: [CloudUnlinkAccountsInput!]!) {{ \
             cloudUnlinkAccount(accountId: $accountId, accounts: $accounts) {{ \
             {PAYLOAD_ERROR_FIELDS} unlinkedAccounts {{ {LINKED_ACCOUNT_FIELDS} }} }} }}"
        );
        self.mutate(
            "cloudUnlinkAccount",
            &query,
            json!({ "accountId": account_id, "accounts": input }),
        )
        .await
    }

    async fn rename_account(
        &self,
        account_id: i64,
        input: &[RenameAccountInput],
    ) -> Result<RenameResult, ClientError> {
        let query = format!(
            "mutation($accountId: Int!, $accounts: [CloudRenameAccountsInput!]!) {{ \
             cloudRenameAccount(accountId: $accountId, accounts: $accounts) {{ \
             {PAYLOAD_ERROR_FIELDS} linkedAccounts {{ {LINKED_ACCOUNT_FIELDS} }} }} }}"
        );
        self.mutate(
            "cloudRenameAccount",
            &query,
            json!({ "accountId": account_id, "accounts": input }),
        )
        .await
    }

    async fn configure_integration(
        &self,
        account_id: i64,
        input: &ConfigureInput,
    ) -> Result<ConfigureResult, ClientError> {
        let query = format!(
            "mutation($accountId: Int!, $integrations: CloudIntegrationsInput!) {{ \
             cloudConfigureIntegration(accountId: $accountId, integrations: $integrations) {{ \
             {PAYLOAD_ERROR_FIELDS} integrations {{ {INTEGRATION_FIELDS} }} }} }}"
        );
        self.mutate(
            "cloudConfigureIntegration",
            &query,
            json!({ "accountId": account_id, "integrations": input }),
        )
        .await
    }

    async fn disable_integration(
        &self,
        account_id: i64,
        input: &DisableInput,
    ) -> Result<DisableResult, ClientError> {
        let query = format!(
            "mutation($accountId: Int!, $integrations: CloudDisableIntegrationsInput!) {{ \
             cloudDisableIntegration(accountId: $accountId, integrations: $integrations) {{ \
             {PAYLOAD_ERROR_FIELDS} disabledIntegrations {{ {INTEGRATION_FIELDS} }} }} }}"
        );
        self.mutate(
            "cloudDisableIntegration",
            &query,
            json!({ "accountId": account_id, "integrations": input }),
        )
        .await
    }

    async fn get_linked_account(
        &self,
        account_id: i64,
        linked_account_id: i64,
    ) -> Result<LinkedAccount, ClientError> {
        let query = format!(
            "query($accountId: Int!, $id: Int!) {{ actor {{ account(id: $accountId) {{ \
             cloud {{ linkedAccount(id: $id) {{ {LINKED_ACCOUNT_FIELDS} \
             integrations {{ {INTEGRATION_FIELDS} }} }} }} }} }} }}"
        );
        let mut data = self
            .execute(
                "linkedAccount",
                &query,
                json!({ "accountId": account_id, "id": linked_account_id }),
            )
            .await?;

        let cloud = match data.pointer_mut("/actor/account/cloud") {
            Some(cloud) if !cloud.is_null() => cloud,
            _ => return Err(ClientError::MissingData("actor.account.cloud")),
        };
        match cloud.get_mut("linkedAccount").map(Value::take) {
            Some(account) if !account.is_null() => Ok(serde_json::from_value(account)?),
            _ => Err(ClientError::NotFound(format!(
                "linked account {}",
                linked_account_id
            ))),
        }
    }
}
