//! Provider block configuration and the client configuration derived from it.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};
use crate::types::null_as_default;

/// Per-request timeout for NerdGraph calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// New Relic data-center region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Region {
    /// United States (default).
    #[default]
    Us,
    /// European Union.
    Eu,
    /// New Relic staging.
    Staging,
}

impl Region {
    /// All regions, in the spelling the provider block accepts.
    pub const NAMES: [&'static str; 3] = ["US", "EU", "Staging"];

    /// NerdGraph endpoint for the region.
    pub fn endpoint(self) -> &'static str {
        match self {
            Region::Us => "https://api.newrelic.com/graphql",
            Region::Eu => "https://api.eu.newrelic.com/graphql",
            Region::Staging => "https://staging-api.newrelic.com/graphql",
        }
    }

    /// Canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Us => "US",
            Region::Eu => "EU",
            Region::Staging => "Staging",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "us" => Ok(Region::Us),
            "eu" => Ok(Region::Eu),
            "staging" => Ok(Region::Staging),
            _ => Err(ProviderError::Configuration(format!(
                "unknown region {:?}, expected one of {}",
                s,
                Region::NAMES.join(", ")
            ))),
        }
    }
}

impl TryFrom<String> for Region {
    type Error = ProviderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.as_str().to_string()
    }
}

/// The provider block.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Default New Relic account for resources that don't set one.
    pub account_id: i64,
    /// User API key.
    pub api_key: String,
    /// Data-center region.
    #[serde(default, deserialize_with = "null_as_default")]
    pub region: Region,
    /// Overrides the region's NerdGraph endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nerdgraph_api_url: Option<String>,
    /// Accept any TLS certificate.
    #[serde(default, deserialize_with = "null_as_default")]
    pub insecure_skip_verify: bool,
    /// Extra PEM root certificate to trust.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cacert_file: Option<PathBuf>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("account_id", &self.account_id)
            .field("api_key", &"<redacted>")
            .field("region", &self.region)
            .field("nerdgraph_api_url", &self.nerdgraph_api_url)
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .field("cacert_file", &self.cacert_file)
            .finish()
    }
}

impl ProviderConfig {
    /// Schema of the provider block.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_description("New Relic OCI provider configuration.")
            .with_attribute(
                "account_id",
                Attribute::required_int64()
                    .sensitive()
                    .with_description("The New Relic account ID to operate on."),
            )
            .with_attribute(
                "api_key",
                Attribute::required_string()
                    .sensitive()
                    .with_description("A New Relic user API key."),
            )
            .with_attribute(
                "region",
                Attribute::optional_string()
                    .with_allowed_values(Region::NAMES)
                    .with_description("The data-center region: US, EU or Staging. Defaults to US."),
            )
            .with_attribute(
                "nerdgraph_api_url",
                Attribute::optional_string()
                    .with_description("Overrides the NerdGraph endpoint derived from the region."),
            )
            .with_attribute(
                "insecure_skip_verify",
                Attribute::optional_bool()
                    .with_description("Skip TLS certificate verification."),
            )
            .with_attribute(
                "cacert_file",
                Attribute::optional_string()
                    .with_description("Path to a PEM-encoded root certificate to trust."),
            )
    }

    /// Decode and sanity-check a provider block.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ProviderError> {
        let config: Self = serde_json::from_value(value)?;
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "api_key must not be empty".to_string(),
            ));
        }
        Ok(config)
    }

    /// The NerdGraph endpoint to use.
    pub fn endpoint(&self) -> &str {
        self.nerdgraph_api_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.region.endpoint())
    }

    /// Client configuration for this provider block.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            insecure_skip_verify: self.insecure_skip_verify,
            cacert_file: self.cacert_file.clone(),
            ..ClientConfig::new(self.endpoint(), self.api_key.clone())
        }
    }
}

/// Everything needed to build an API client.
#[derive(Clone)]
pub struct ClientConfig {
    /// GraphQL endpoint URL.
    pub endpoint: String,
    /// User API key sent as `Api-Key`.
    pub api_key: String,
    /// `User-Agent` header.
    pub user_agent: String,
    /// Timeout applied to each HTTP request.
    pub request_timeout: Duration,
    /// Accept any TLS certificate.
    pub insecure_skip_verify: bool,
    /// Extra PEM root certificate to trust.
    pub cacert_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Configuration with default user agent, timeout and TLS settings.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            user_agent: concat!("newrelic-oci-provider/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            insecure_skip_verify: false,
            cacert_file: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("request_timeout", &self.request_timeout)
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .field("cacert_file", &self.cacert_file)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::is_valid;
    use serde_json::json;

    #[test]
    fn test_region_parsing_is_case_insensitive() {
        assert_eq!("us".parse::<Region>().unwrap(), Region::Us);
        assert_eq!("EU".parse::<Region>().unwrap(), Region::Eu);
        assert_eq!("sTaGiNg".parse::<Region>().unwrap(), Region::Staging);
        assert!("APAC".parse::<Region>().is_err());
    }

    #[test]
    fn test_region_endpoints() {
        assert_eq!(Region::default(), Region::Us);
        assert_eq!(Region::Us.endpoint(), "https://api.newrelic.com/graphql");
        assert_eq!(Region::Eu.endpoint(), "https://api.eu.newrelic.com/graphql");
        assert_eq!(
            Region::Staging.endpoint(),
            "https://staging-api.newrelic.com/graphql"
        );
    }

    #[test]
    fn test_decode_with_defaults() {
        let config =
            ProviderConfig::from_value(json!({"account_id": 500, "api_key": "NRAK-1"})).unwrap();
        assert_eq!(config.region, Region::Us);
        assert!(!config.insecure_skip_verify);
        assert_eq!(config.endpoint(), "https://api.newrelic.com/graphql");

        let client = config.client_config();
        assert_eq!(client.endpoint, "https://api.newrelic.com/graphql");
        assert_eq!(client.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(client.user_agent.starts_with("newrelic-oci-provider/"));
    }

    #[test]
    fn test_decode_tolerates_nulls() {
        let config = ProviderConfig::from_value(json!({
            "account_id": 500,
            "api_key": "NRAK-1",
            "region": null,
            "nerdgraph_api_url": null,
            "insecure_skip_verify": null,
            "cacert_file": null
        }))
        .unwrap();
        assert_eq!(config.region, Region::Us);
        assert!(!config.insecure_skip_verify);
    }

    #[test]
    fn test_endpoint_override_wins() {
        let config = ProviderConfig::from_value(json!({
            "account_id": 500,
            "api_key": "NRAK-1",
            "region": "eu",
            "nerdgraph_api_url": "http://localhost:8080/graphql"
        }))
        .unwrap();
        assert_eq!(config.region, Region::Eu);
        assert_eq!(config.endpoint(), "http://localhost:8080/graphql");
    }

    #[test]
    fn test_rejects_blank_api_key_and_bad_region() {
        let err =
            ProviderConfig::from_value(json!({"account_id": 1, "api_key": "  "})).unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));

        let err = ProviderConfig::from_value(json!({
            "account_id": 1,
            "api_key": "k",
            "region": "mars"
        }))
        .unwrap_err();
        assert!(matches!(err, ProviderError::Serialization(_)));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config =
            ProviderConfig::from_value(json!({"account_id": 500, "api_key": "NRAK-SECRET"}))
                .unwrap();
        let debug = format!("{:?} {:?}", config, config.client_config());
        assert!(!debug.contains("NRAK-SECRET"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_schema_checks_region_values() {
        let schema = ProviderConfig::schema();
        assert!(is_valid(
            &schema,
            &json!({"account_id": 1, "api_key": "k", "region": "staging"})
        ));
        assert!(!is_valid(
            &schema,
            &json!({"account_id": 1, "api_key": "k", "region": "mars"})
        ));
        assert!(!is_valid(&schema, &json!({"api_key": "k"})));
    }
}
