use std::fmt::Write;
use std::sync::Arc;

use crate::api::types::WorkflowSummary;
use crate::error::Result;

use super::container::ChangeHandler;
use super::query::ListQuery;
use super::state::PageState;

/// Everything the list view needs to draw itself.
#[derive(Clone)]
pub struct ListProps {
    pub page: u32,
    pub query: ListQuery,
    /// `None` while the first page is still loading.
    pub workflows: Option<Vec<WorkflowSummary>>,
    pub total_count: u64,
    pub error: Option<String>,
    pub on_change: ChangeHandler,
}

impl std::fmt::Debug for ListProps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListProps")
            .field("page", &self.page)
            .field("query", &self.query)
            .field("workflows", &self.workflows)
            .field("total_count", &self.total_count)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ListProps {
    fn eq(&self, other: &Self) -> bool {
        self.page == other.page
            && self.query == other.query
            && self.workflows == other.workflows
            && self.total_count == other.total_count
            && self.error == other.error
            && Arc::ptr_eq(&self.on_change, &other.on_change)
    }
}

impl ListProps {
    pub fn page_state(&self) -> Result<PageState> {
        PageState::new(self.page, self.query.clone())
    }

    pub fn go_to_page(&self, page: u32) -> Result<()> {
        let state = self.page_state()?.with_page(page)?;
        (self.on_change)(state);
        Ok(())
    }

    pub fn set_filter(&self, key: &str, value: &str) -> Result<()> {
        let query = self.query.clone().with(key, value);
        let state = self.page_state()?.with_query(query);
        (self.on_change)(state);
        Ok(())
    }

    pub fn clear_filter(&self, key: &str) -> Result<()> {
        let mut query = self.query.clone();
        query.remove(key);
        let state = self.page_state()?.with_query(query);
        (self.on_change)(state);
        Ok(())
    }
}

pub fn page_count(total_count: u64, per_page: u32) -> u64 {
    let per_page = u64::from(per_page.max(1));
    total_count.div_ceil(per_page).max(1)
}

/// Plain-text rendering of a workflow list.
pub fn format_table(props: &ListProps, per_page: u32) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Workflows: page {} of {} ({} total)",
        props.page,
        page_count(props.total_count, per_page),
        props.total_count
    );
    if !props.query.is_empty() {
        let filters: Vec<String> = props.query.iter().map(|(k, v)| format!("{k}={v}")).collect();
        let _ = writeln!(out, "Filters: {}", filters.join(", "));
    }
    if let Some(ref error) = props.error {
        let _ = writeln!(out, "Error: {error}");
    }

    match props.workflows {
        None => out.push_str("Loading...\n"),
        Some(ref workflows) if workflows.is_empty() => out.push_str("No workflows found.\n"),
        Some(ref workflows) => {
            let rows: Vec<[&str; 3]> = workflows
                .iter()
                .map(|w| {
                    [
                        w.id().unwrap_or("-"),
                        w.name().unwrap_or("-"),
                        w.owner().unwrap_or("-"),
                    ]
                })
                .collect();

            let mut widths = ["ID".len(), "NAME".len(), "OWNER".len()];
            for row in &rows {
                for (width, cell) in widths.iter_mut().zip(row) {
                    *width = (*width).max(cell.chars().count());
                }
            }

            let _ = writeln!(
                out,
                "{:<w0$}  {:<w1$}  {}",
                "ID",
                "NAME",
                "OWNER",
                w0 = widths[0],
                w1 = widths[1]
            );
            for [id, name, owner] in rows {
                let _ = writeln!(
                    out,
                    "{:<w0$}  {:<w1$}  {}",
                    id,
                    name,
                    owner,
                    w0 = widths[0],
                    w1 = widths[1]
                );
            }
        }
    }

    out
}
