use serde::{Deserialize, Serialize};

use crate::api::types::ResultPage;
use crate::error::{AppError, Result};

use super::query::ListQuery;

pub const FIRST_PAGE: u32 = 1;

/// The page and filters a listing is requested for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageState {
    page: u32,
    query: ListQuery,
}

impl PageState {
    pub fn new(page: u32, query: ListQuery) -> Result<Self> {
        if page < FIRST_PAGE {
            return Err(AppError::InvalidState(format!(
                "Page must be at least {FIRST_PAGE}, got {page}"
            )));
        }
        Ok(Self { page, query })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn with_page(&self, page: u32) -> Result<Self> {
        Self::new(page, self.query.clone())
    }

    /// Replace the filters. A new filter set always starts back at the first page.
    pub fn with_query(&self, query: ListQuery) -> Self {
        Self {
            page: FIRST_PAGE,
            query,
        }
    }

    pub fn is_default(&self) -> bool {
        self.page == FIRST_PAGE && self.query.is_empty()
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            page: FIRST_PAGE,
            query: ListQuery::new(),
        }
    }
}

/// How completions of concurrent loads are applied to the displayed state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOrdering {
    /// Every successful response is applied when it arrives, so a slow
    /// older request can overwrite a newer one.
    #[default]
    LastResolved,
    /// Responses older than the last applied one are discarded.
    LatestIssued,
}

/// State owned by a list container.
#[derive(Debug, Clone, Default)]
pub struct ListState {
    pub page_state: PageState,
    /// `None` until the first load succeeds.
    pub data: Option<ResultPage>,
    pub error: Option<String>,
    /// Sequence number of the load that produced `data` or `error`.
    pub applied_seq: u64,
}

impl ListState {
    pub fn total_count(&self) -> u64 {
        self.data.as_ref().map_or(0, |d| d.total_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = PageState::default();
        assert_eq!(state.page(), 1);
        assert!(state.query().is_empty());
        assert!(state.is_default());
    }

    #[test]
    fn test_page_zero_rejected() {
        let err = PageState::new(0, ListQuery::new()).unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
        assert!(PageState::default().with_page(0).is_err());
    }

    #[test]
    fn test_with_query_resets_page() {
        let state = PageState::new(4, ListQuery::new()).unwrap();
        let filtered = state.with_query(ListQuery::new().with("status", "done"));
        assert_eq!(filtered.page(), 1);
        assert_eq!(filtered.query().get("status"), Some("done"));
    }

    #[test]
    fn test_ordering_deserializes_snake_case() {
        let ordering: ResponseOrdering = serde_json::from_str("\"latest_issued\"").unwrap();
        assert_eq!(ordering, ResponseOrdering::LatestIssued);
    }

    #[test]
    fn test_total_count_before_first_load() {
        let state = ListState::default();
        assert!(state.data.is_none());
        assert_eq!(state.total_count(), 0);
    }
}
