use async_trait::async_trait;
use reqwest::Client;

use crate::config::ApiConfig;
use crate::error::{AppError, Result};
use crate::list::state::PageState;

use super::types::ResultPage;
use super::WorkflowSource;

const WORKFLOW_LIST_PATH: &str = "/api/v1/workflow";

/// Workflow source backed by the gateway's REST API.
pub struct HttpWorkflowSource {
    client: Client,
    base_url: String,
    token: Option<String>,
    per_page: u32,
}

impl HttpWorkflowSource {
    pub fn new(config: &ApiConfig, per_page: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            per_page,
        })
    }

    pub fn list_url(&self, state: &PageState) -> String {
        format!("{}{}", self.base_url, list_path(self.per_page, state))
    }
}

/// Path and query string for one listing request.
pub fn list_path(per_page: u32, state: &PageState) -> String {
    let mut path = format!(
        "{WORKFLOW_LIST_PATH}?per_page={per_page}&page={}",
        state.page()
    );
    if !state.query().is_empty() {
        path.push('&');
        path.push_str(&state.query().to_query_string());
    }
    path
}

#[async_trait]
impl WorkflowSource for HttpWorkflowSource {
    async fn list_workflows(&self, state: &PageState) -> Result<ResultPage> {
        let url = self.list_url(state);
        tracing::debug!(url = %url, "Fetching workflows");

        let mut request = self.client.get(&url);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Api(format!("API returned {status}: {body}")));
        }

        let bytes = response.bytes().await?;
        let page: ResultPage = serde_json::from_slice(&bytes)?;

        tracing::debug!(
            page = state.page(),
            results = page.results.len(),
            total_count = page.total_count,
            "Fetched workflows"
        );

        Ok(page)
    }
}
