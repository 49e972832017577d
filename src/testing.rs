//! Testing utilities.
//!
//! [`ProviderTester`] drives a [`ProviderService`] the way the host would,
//! without a host. [`FakeCloudApi`] stands in for NerdGraph: replies are
//! scripted per operation and every call is recorded.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use newrelic_oci_provider::testing::{FakeCloudApi, ProviderTester};
//! use newrelic_oci_provider::client::{LinkResult, LinkedAccount};
//! use newrelic_oci_provider::NewRelicOciProvider;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_link() {
//!     let api = Arc::new(FakeCloudApi::new());
//!     api.on_link(Ok(LinkResult {
//!         errors: vec![],
//!         linked_accounts: vec![LinkedAccount::new(42)],
//!     }));
//!
//!     let tester = ProviderTester::new(NewRelicOciProvider::with_api(api.clone()));
//!     tester.configure(json!({"account_id": 500, "api_key": "test"})).await.unwrap();
//!
//!     let response = tester
//!         .create("newrelic_cloud_oci_link_account", json!({"tenant_id": "t", "name": "n"}))
//!         .await
//!         .unwrap();
//!     assert_eq!(response.id(), Some("42"));
//! }
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::client::{
    ClientError, CloudApi, ConfigureInput, ConfigureResult, DisableInput, DisableResult,
    LinkAccountInput, LinkResult, LinkedAccount, RenameAccountInput, RenameResult,
    UnlinkAccountInput, UnlinkResult,
};
use crate::diagnostics::{Diagnostic, DiagnosticSeverity};
use crate::error::ProviderError;
use crate::schema::ProviderSchema;
use crate::service::ProviderService;
use crate::types::{ImportedResource, PlanResult, ResourceResponse};

// =========================================================================
// Provider Tester
// =========================================================================

/// A test harness for provider implementations.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Get the provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Get the list of resource type names.
    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    /// Validate provider configuration.
    ///
    /// Returns `Err` with the error diagnostics if there are any.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure the provider.
    ///
    /// Returns `Err` with the error diagnostics if there are any.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Validate a resource configuration.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Plan a resource creation (no prior state).
    pub async fn plan_create(
        &self,
        resource_type: &str,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, None, proposed_state.clone(), proposed_state)
            .await
    }

    /// Plan a resource update.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(
                resource_type,
                Some(prior_state),
                proposed_state.clone(),
                proposed_state,
            )
            .await
    }

    /// Plan a resource deletion.
    pub async fn plan_delete(
        &self,
        resource_type: &str,
        prior_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), Value::Null, Value::Null)
            .await
    }

    /// Create a new resource.
    pub async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<ResourceResponse, ProviderError> {
        self.provider.create(resource_type, planned_state).await
    }

    /// Read the current state of a resource.
    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<ResourceResponse, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    /// Update an existing resource.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<ResourceResponse, ProviderError> {
        self.provider
            .update(resource_type, prior_state, planned_state)
            .await
    }

    /// Delete a resource.
    pub async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<ResourceResponse, ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    /// Import an existing resource.
    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    // =========================================================================
    // Lifecycle Helpers
    // =========================================================================

    /// Run a full create lifecycle: plan → create → read.
    ///
    /// Returns the state after read.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, TestError> {
        let plan = self.plan_create(resource_type, config).await?;
        let created = expect_present(self.create(resource_type, plan.planned_state).await?)?;
        expect_present(self.read(resource_type, created).await?)
    }

    /// Run a full update lifecycle: plan → update → read.
    ///
    /// Returns the state after read.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<Value, TestError> {
        let plan = self
            .plan_update(resource_type, prior_state.clone(), proposed_state)
            .await?;
        let updated =
            expect_present(self.update(resource_type, prior_state, plan.planned_state).await?)?;
        expect_present(self.read(resource_type, updated).await?)
    }

    /// Run a full delete lifecycle: plan → delete. The resource must end up absent.
    pub async fn lifecycle_delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), TestError> {
        let _ = self
            .plan_delete(resource_type, current_state.clone())
            .await?;

        let response = self.delete(resource_type, current_state).await?;
        check_diagnostics(response.diagnostics)?;
        match response.state {
            None => Ok(()),
            Some(state) => Err(TestError::StillPresent(state)),
        }
    }

    /// Run a full import lifecycle: import → read.
    pub async fn lifecycle_import(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Value, TestError> {
        let mut imported = self.import_resource(resource_type, id).await?;
        let Some(resource) = imported.pop() else {
            return Err(TestError::Absent);
        };
        expect_present(self.read(&resource.resource_type, resource.state).await?)
    }
}

/// Error type for test operations that may fail with diagnostics.
#[derive(Debug)]
pub enum TestError {
    /// The operation failed with diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The operation failed with a provider error.
    Provider(ProviderError),
    /// The resource was expected to exist but is absent.
    Absent,
    /// The resource was expected to be gone but still has state.
    StillPresent(Value),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            },
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
            TestError::Absent => write!(f, "Resource is absent"),
            TestError::StillPresent(state) => write!(f, "Resource still present: {}", state),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

/// Check diagnostics and return an error if there are any errors.
fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics
        .into_iter()
        .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

fn expect_present(response: ResourceResponse) -> Result<Value, TestError> {
    check_diagnostics(response.diagnostics)?;
    response.state.ok_or(TestError::Absent)
}

// =========================================================================
// Fake API
// =========================================================================

/// A recorded call to [`FakeCloudApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    /// `link_account`
    LinkAccount {
        /// Account argument.
        account_id: i64,
        /// Input argument.
        input: LinkAccountInput,
    },
    /// `unlink_account`
    UnlinkAccount {
        /// Account argument.
        account_id: i64,
        /// Input argument.
        input: Vec<UnlinkAccountInput>,
    },
    /// `rename_account`
    RenameAccount {
        /// Account argument.
        account_id: i64,
        /// Input argument.
        input: Vec<RenameAccountInput>,
    },
    /// `configure_integration`
    ConfigureIntegration {
        /// Account argument.
        account_id: i64,
        /// Input argument.
        input: ConfigureInput,
    },
    /// `disable_integration`
    DisableIntegration {
        /// Account argument.
        account_id: i64,
        /// Input argument.
        input: DisableInput,
    },
    /// `get_linked_account`
    GetLinkedAccount {
        /// Account argument.
        account_id: i64,
        /// Linked account argument.
        linked_account_id: i64,
    },
}

/// A scripted transport-level failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeFailure {
    /// [`ClientError::NotFound`].
    NotFound,
    /// [`ClientError::Unauthorized`].
    Unauthorized,
    /// [`ClientError::GraphQl`] with the given message.
    GraphQl(String),
}

impl FakeFailure {
    fn into_error(self, operation: &str) -> ClientError {
        match self {
            FakeFailure::NotFound => ClientError::NotFound(format!("{} target", operation)),
            FakeFailure::Unauthorized => ClientError::Unauthorized("invalid API key".to_string()),
            FakeFailure::GraphQl(message) => ClientError::GraphQl(message),
        }
    }
}

/// A scripted reply.
pub type FakeReply<T> = Result<T, FakeFailure>;

/// Replies for one operation, served in order; the last one repeats.
struct Script<T> {
    queue: VecDeque<FakeReply<T>>,
    last: Option<FakeReply<T>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            last: None,
        }
    }
}

impl<T: Clone> Script<T> {
    fn push(&mut self, reply: FakeReply<T>) {
        self.queue.push_back(reply);
    }

    fn next(&mut self, operation: &str) -> Result<T, ClientError> {
        if let Some(reply) = self.queue.pop_front() {
            self.last = Some(reply);
        }
        match self.last.clone() {
            Some(reply) => reply.map_err(|f| f.into_error(operation)),
            None => Err(ClientError::GraphQl(format!(
                "no reply scripted for {}",
                operation
            ))),
        }
    }
}

#[derive(Default)]
struct FakeState {
    link: Script<LinkResult>,
    unlink: Script<UnlinkResult>,
    rename: Script<RenameResult>,
    configure: Script<ConfigureResult>,
    disable: Script<DisableResult>,
    get_linked_account: Script<LinkedAccount>,
    calls: Vec<ApiCall>,
}

/// An in-memory [`CloudApi`] with scripted replies.
///
/// Replies queued with the `on_*` methods are served in order. Once the queue
/// for an operation runs dry, its last reply is repeated; an operation with
/// no reply at all fails with a GraphQL error.
#[derive(Default)]
pub struct FakeCloudApi {
    state: Mutex<FakeState>,
}

impl FakeCloudApi {
    /// Create a fake with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a reply for `link_account`.
    pub fn on_link(&self, reply: FakeReply<LinkResult>) {
        self.lock().link.push(reply);
    }

    /// Queue a reply for `unlink_account`.
    pub fn on_unlink(&self, reply: FakeReply<UnlinkResult>) {
        self.lock().unlink.push(reply);
    }

    /// Queue a reply for `rename_account`.
    pub fn on_rename(&self, reply: FakeReply<RenameResult>) {
        self.lock().rename.push(reply);
    }

    /// Queue a reply for `configure_integration`.
    pub fn on_configure(&self, reply: FakeReply<ConfigureResult>) {
        self.lock().configure.push(reply);
    }

    /// Queue a reply for `disable_integration`.
    pub fn on_disable(&self, reply: FakeReply<DisableResult>) {
        self.lock().disable.push(reply);
    }

    /// Queue a reply for `get_linked_account`.
    pub fn on_get_linked_account(&self, reply: FakeReply<LinkedAccount>) {
        self.lock().get_linked_account.push(reply);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }
}

#[async_trait::async_trait]
impl CloudApi for FakeCloudApi {
    async fn link_account(
        &self,
        account_id: i64,
        input: &LinkAccountInput,
    ) -> Result<LinkResult, ClientError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::LinkAccount {
            account_id,
            input: input.clone(),
        });
        state.link.next("link_account")
    }

    async fn unlink_account(
        &self,
        account_id: i64,
        input: &[UnlinkAccountInput],
    ) -> Result<UnlinkResult, ClientError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::UnlinkAccount {
            account_id,
            input: input.to_vec(),
        });
        state.unlink.next("unlink_account")
    }

    async fn rename_account(
        &self,
        account_id: i64,
        input: &[RenameAccountInput],
    ) -> Result<RenameResult, ClientError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::RenameAccount {
            account_id,
            input: input.to_vec(),
        });
        state.rename.next("rename_account")
    }

    async fn configure_integration(
        &self,
        account_id: i64,
        input: &ConfigureInput,
    ) -> Result<ConfigureResult, ClientError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::ConfigureIntegration {
            account_id,
            input: input.clone(),
        });
        state.configure.next("configure_integration")
    }

    async fn disable_integration(
        &self,
        account_id: i64,
        input: &DisableInput,
    ) -> Result<DisableResult, ClientError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::DisableIntegration {
            account_id,
            input: input.clone(),
        });
        state.disable.next("disable_integration")
    }

    async fn get_linked_account(
        &self,
        account_id: i64,
        linked_account_id: i64,
    ) -> Result<LinkedAccount, ClientError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::GetLinkedAccount {
            account_id,
            linked_account_id,
        });
        state.get_linked_account.next("get_linked_account")
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that a plan result indicates changes are needed.
///
/// # Panics
///
/// Panics if the plan has no changes.
pub fn assert_plan_has_changes(plan: &PlanResult) {
    assert!(
        !plan.changes.is_empty(),
        "Expected plan to have changes, but got no changes"
    );
}

/// Assert that a plan result indicates no changes.
///
/// # Panics
///
/// Panics if the plan has any changes.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        plan.changes.is_empty(),
        "Expected no changes, but got {} change(s): {:?}",
        plan.changes.len(),
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that a plan requires resource replacement.
///
/// # Panics
///
/// Panics if the plan does not require replacement.
pub fn assert_plan_replaces(plan: &PlanResult) {
    assert!(
        plan.requires_replace,
        "Expected plan to require replacement, but it does not"
    );
}

/// Assert that a plan does not require resource replacement.
///
/// # Panics
///
/// Panics if the plan requires replacement.
pub fn assert_plan_updates_in_place(plan: &PlanResult) {
    assert!(
        !plan.requires_replace,
        "Expected plan to update in place, but it requires replacement"
    );
}

/// Assert that a plan has a change for a specific attribute path.
///
/// # Panics
///
/// Panics if the plan does not have a change for the given path.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    let has_change = plan.changes.iter().any(|c| c.path == path);
    assert!(
        has_change,
        "Expected plan to change attribute '{}', but it was not changed. Changed attributes: {:?}",
        path,
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();

    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain at least one error.
///
/// # Panics
///
/// Panics if there are no error diagnostics.
pub fn assert_has_errors(diagnostics: &[Diagnostic]) {
    assert!(
        diagnostics.iter().any(Diagnostic::is_error),
        "Expected at least one error, but got none"
    );
}

/// Assert that diagnostics contain an error with the given summary substring.
///
/// # Panics
///
/// Panics if no error diagnostic contains the given substring.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let has_matching_error = diagnostics
        .iter()
        .any(|d| d.is_error() && d.summary.contains(substring));

    assert!(
        has_matching_error,
        "Expected an error containing '{}', but no matching error found. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}
