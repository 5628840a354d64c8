//! # Grid Module
//!
//! The paged result table fed by the filter panel.
//!
//! [`Grid`] holds rows, paging and the last submitted query. It never talks
//! to the network itself: every load produces a [`GridRequest`] that the
//! runtime executes, and the response comes back through
//! [`Grid::finish_load`]. Each request carries a sequence number so a
//! response to an abandoned request is dropped instead of overwriting
//! newer rows.

pub mod client;
pub mod columns;

pub use client::{GridError, GridPage, GridSource, HttpGridSource};
pub use columns::{ColumnKind, ColumnSpec};

use crate::selector::{GridLoader, QueryParameters};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Choices offered by the page size selector.
pub const PAGE_SIZES: [u32; 6] = [25, 50, 100, 200, 500, 1000];
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// A page load waiting to be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRequest {
    pub seq: u64,
    pub params: QueryParameters,
}

/// Saved visibility of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnState {
    pub hidden: bool,
}

#[derive(Debug, Clone)]
pub struct Grid {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Map<String, Value>>,
    pub total: u64,
    pub selected_row: usize,
    page: u32,
    page_size: u32,
    query: Option<QueryParameters>,
    seq: u64,
    loading: bool,
    last_error: Option<GridError>,
    outbox: Vec<GridRequest>,
}

impl Grid {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            total: 0,
            selected_row: 0,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            query: None,
            seq: 0,
            loading: false,
            last_error: None,
            outbox: Vec::new(),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_count(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.page_size.max(1)));
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&GridError> {
        self.last_error.as_ref()
    }

    pub fn has_query(&self) -> bool {
        self.query.is_some()
    }

    /// Requests produced since the last call, oldest first.
    pub fn take_requests(&mut self) -> Vec<GridRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Columns currently shown.
    pub fn visible_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| !c.hidden)
    }

    pub fn toggle_column(&mut self, index: usize) {
        if let Some(column) = self.columns.get_mut(index) {
            column.hidden = !column.hidden;
        }
    }

    pub fn column_state(&self) -> BTreeMap<String, ColumnState> {
        self.columns
            .iter()
            .map(|c| (c.header.clone(), ColumnState { hidden: c.hidden }))
            .collect()
    }

    pub fn apply_column_state(&mut self, state: &BTreeMap<String, ColumnState>) {
        for column in &mut self.columns {
            if let Some(saved) = state.get(&column.header) {
                column.hidden = saved.hidden;
            }
        }
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        if page_size == 0 || page_size == self.page_size {
            return;
        }
        self.page_size = page_size;
        if self.query.is_some() {
            self.page = 1;
            self.issue();
        }
    }

    /// Step through [`PAGE_SIZES`].
    pub fn cycle_page_size(&mut self, forward: bool) {
        let idx = PAGE_SIZES
            .iter()
            .position(|s| *s == self.page_size)
            .unwrap_or(2);
        let next = if forward {
            (idx + 1).min(PAGE_SIZES.len() - 1)
        } else {
            idx.saturating_sub(1)
        };
        self.set_page_size(PAGE_SIZES[next]);
    }

    pub fn next_page(&mut self) {
        if self.query.is_some() && self.page < self.page_count() {
            self.page += 1;
            self.issue();
        }
    }

    pub fn previous_page(&mut self) {
        if self.query.is_some() && self.page > 1 {
            self.page -= 1;
            self.issue();
        }
    }

    /// Re-run the current query on the current page.
    pub fn reload(&mut self) {
        if self.query.is_some() {
            self.issue();
        }
    }

    pub fn select_next(&mut self) {
        if !self.rows.is_empty() {
            self.selected_row = (self.selected_row + 1).min(self.rows.len() - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    fn issue(&mut self) {
        let Some(query) = &self.query else {
            return;
        };
        self.seq += 1;

        let mut params = query.clone();
        let start = u64::from(self.page - 1) * u64::from(self.page_size);
        params.insert("limit".to_string(), self.page_size.to_string());
        params.insert("start".to_string(), start.to_string());
        params.insert("page".to_string(), self.page.to_string());

        // Only the newest request matters; anything queued before is dead
        self.outbox.clear();
        self.outbox.push(GridRequest {
            seq: self.seq,
            params,
        });
        self.loading = true;
        debug!(seq = self.seq, page = self.page, "grid load queued");
    }

    /// Deliver a page. Returns false when the response was for a request
    /// that has since been replaced.
    pub fn finish_load(&mut self, seq: u64, result: Result<GridPage, GridError>) -> bool {
        if seq != self.seq {
            debug!(seq, current = self.seq, "dropping stale grid response");
            return false;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                self.rows = page.rows;
                self.total = page.total;
                self.selected_row = 0;
                self.last_error = None;
            }
            Err(err) => {
                self.last_error = Some(err);
            }
        }
        true
    }
}

impl GridLoader for Grid {
    fn page_size(&self) -> u32 {
        self.page_size
    }

    fn load(&mut self, params: QueryParameters) {
        self.query = Some(params);
        self.page = 1;
        self.issue();
    }
}
