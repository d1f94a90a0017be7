//! HTTP implementation of the groups API, CLI errors, and problem classification.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use hostinv_api_models::{
    AddHostsRequest, GroupId, GroupListParams, GroupListResponse, HostId, HostListResponse,
    HostSummary, ProblemDetails, RenameGroupRequest,
};
use hostinv_core::{GroupsApi, InventoryError, InventoryResult};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, Url};

pub(crate) const HEADER_IDENTITY: &str = "x-rh-identity";
pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";
pub(crate) const API_PREFIX: &str = "/api/inventory/v1";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<InventoryError> for CliError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::ActionUnavailable { reason } => Self::Validation(reason),
            InventoryError::Validation { .. } | InventoryError::NoActiveWorkflow { .. } => {
                Self::Validation(err.to_string())
            }
            InventoryError::Network {
                status: Some(400 | 409 | 422),
                message,
                ..
            } => Self::Validation(message),
            InventoryError::Network { .. } => Self::Failure(anyhow!(err)),
        }
    }
}

/// Build the shared HTTP client with identity and request-id headers.
pub(crate) fn build_client(
    timeout_secs: u64,
    identity: Option<&str>,
    request_id: &str,
) -> CliResult<Client> {
    let mut default_headers = HeaderMap::new();
    let request_id = HeaderValue::from_str(request_id)
        .map_err(|_| CliError::failure(anyhow!("request identifier contains invalid characters")))?;
    default_headers.insert(HEADER_REQUEST_ID, request_id);
    if let Some(identity) = identity {
        let identity = HeaderValue::from_str(identity.trim())
            .map_err(|_| CliError::validation("identity header contains invalid characters"))?;
        default_headers.insert(HEADER_IDENTITY, identity);
    }

    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .default_headers(default_headers)
        .build()
        .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

/// Groups API over the inventory REST endpoints.
#[derive(Clone)]
pub(crate) struct HttpGroupsApi {
    client: Client,
    base_url: Url,
}

impl HttpGroupsApi {
    pub(crate) const fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn endpoint(&self, operation: &'static str, path: &str) -> InventoryResult<Url> {
        self.base_url
            .join(&format!("{API_PREFIX}{path}"))
            .map_err(|err| InventoryError::network(operation, format!("invalid base URL: {err}")))
    }

    async fn send(
        operation: &'static str,
        request: RequestBuilder,
    ) -> InventoryResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|err| InventoryError::network(operation, err.to_string()))?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(classify_problem(operation, response).await)
        }
    }

    /// Look up host records, including their group membership.
    pub(crate) async fn hosts_by_id(&self, ids: &[HostId]) -> InventoryResult<Vec<HostSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.endpoint("get_hosts", &format!("/hosts/{}", join_ids(ids)))?;
        let response = Self::send("get_hosts", self.client.get(url)).await?;
        let hosts: HostListResponse = response
            .json()
            .await
            .map_err(|err| InventoryError::network("get_hosts", format!("invalid response: {err}")))?;
        Ok(hosts.results)
    }
}

fn join_ids(ids: &[uuid::Uuid]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl GroupsApi for HttpGroupsApi {
    async fn list_groups(&self, params: &GroupListParams) -> InventoryResult<GroupListResponse> {
        let url = self.endpoint("list_groups", "/groups")?;
        let request = self.client.get(url).query(&params.query_pairs());
        let response = Self::send("list_groups", request).await?;
        response.json().await.map_err(|err| {
            InventoryError::network("list_groups", format!("invalid response: {err}"))
        })
    }

    async fn rename_group(&self, id: GroupId, name: &str) -> InventoryResult<()> {
        let url = self.endpoint("rename_group", &format!("/groups/{id}"))?;
        let body = RenameGroupRequest {
            name: name.to_string(),
        };
        Self::send("rename_group", self.client.patch(url).json(&body)).await?;
        Ok(())
    }

    async fn delete_groups(&self, ids: &[GroupId]) -> InventoryResult<()> {
        let url = self.endpoint("delete_groups", &format!("/groups/{}", join_ids(ids)))?;
        Self::send("delete_groups", self.client.delete(url)).await?;
        Ok(())
    }

    async fn add_hosts_to_group(
        &self,
        group_id: GroupId,
        host_ids: &[HostId],
    ) -> InventoryResult<()> {
        let url = self.endpoint("add_hosts_to_group", &format!("/groups/{group_id}/hosts"))?;
        let body = AddHostsRequest(host_ids.to_vec());
        Self::send("add_hosts_to_group", self.client.post(url).json(&body)).await?;
        Ok(())
    }
}

/// Turn an error response into a network error, preferring the problem document's detail.
pub(crate) async fn classify_problem(operation: &'static str, response: Response) -> InventoryError {
    let status = response.status();
    let bytes = response.bytes().await.unwrap_or_default();

    let body_text = String::from_utf8_lossy(&bytes).trim().to_string();
    let problem = serde_json::from_slice::<ProblemDetails>(&bytes).ok();

    let message = problem
        .as_ref()
        .and_then(|p| p.detail.clone())
        .or_else(|| problem.as_ref().map(|p| p.title.clone()))
        .or_else(|| (!body_text.is_empty()).then_some(body_text))
        .unwrap_or_else(|| format!("request failed with status {status}"));

    InventoryError::http(operation, status.as_u16(), message)
}
