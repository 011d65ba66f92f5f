pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;
use crate::list::state::PageState;
use types::ResultPage;

#[async_trait]
pub trait WorkflowSource: Send + Sync {
    /// Fetch one page of workflows matching the state's filters.
    async fn list_workflows(&self, state: &PageState) -> Result<ResultPage>;
}
