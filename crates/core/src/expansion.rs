//! Per-row drill-down state.
//!
//! Every variance row gets an [`ExpansionState`] the first time it is expanded. The
//! mapping is copy-on-write: [`RowExpansionStore::snapshot`] hands out an immutable view
//! that stays consistent with the last completed transition while later transitions
//! write to a fresh copy.
//!
//! [`DrillDown`] drives the store against a [`DataGateway`]. Fetches for different rows
//! run independently; a completion only writes if its row is still in the mapping.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::txn::Txn;
use crate::domain::variance::VarianceId;
use crate::gateway::{DataGateway, GatewayError};
use crate::layout::DrillDownLayout;

pub const DEFAULT_PAGE_SIZE: usize = 8;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExpansionState {
    pub open: bool,
    pub loading: bool,
    pub txns: Vec<Txn>,
    pub page: usize,
    pub load_failed: bool,
}

impl Default for ExpansionState {
    fn default() -> Self {
        Self { open: false, loading: false, txns: Vec::new(), page: 1, load_failed: false }
    }
}

impl ExpansionState {
    pub fn page_count(&self, page_size: usize) -> usize {
        page_count(self.txns.len(), page_size)
    }

    /// Transactions on the current page; empty when the page is past the end.
    pub fn page_slice(&self, page_size: usize) -> &[Txn] {
        let page_size = page_size.max(1);
        let start = self.page.saturating_sub(1).saturating_mul(page_size);
        if start >= self.txns.len() {
            return &[];
        }
        let end = (start + page_size).min(self.txns.len());
        &self.txns[start..end]
    }
}

pub fn page_count(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

pub type ExpansionMap = BTreeMap<VarianceId, ExpansionState>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub open: bool,
    pub fetch_required: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchApplied {
    Applied,
    DiscardedStale,
}

#[derive(Clone, Debug)]
pub struct RowExpansionStore {
    states: Arc<ExpansionMap>,
    page_size: usize,
}

impl Default for RowExpansionStore {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl RowExpansionStore {
    pub fn new(page_size: usize) -> Self {
        Self { states: Arc::new(ExpansionMap::new()), page_size: page_size.max(1) }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn snapshot(&self) -> Arc<ExpansionMap> {
        Arc::clone(&self.states)
    }

    pub fn get(&self, row_id: &VarianceId) -> Option<&ExpansionState> {
        self.states.get(row_id)
    }

    pub fn is_open(&self, row_id: &VarianceId) -> bool {
        self.get(row_id).map(|state| state.open).unwrap_or(false)
    }

    pub fn open_rows(&self) -> Vec<VarianceId> {
        self.states.iter().filter(|(_, state)| state.open).map(|(id, _)| id.clone()).collect()
    }

    /// Opens a closed (or never seen) row, closes an open one.
    ///
    /// A fetch is requested only when opening a row with no cached transactions and no
    /// fetch already in flight. Closing keeps the cached transactions and page.
    pub fn toggle(&mut self, row_id: &VarianceId) -> ToggleOutcome {
        let states = Arc::make_mut(&mut self.states);
        let state = states.entry(row_id.clone()).or_default();

        let next_open = !state.open;
        let fetch_required = next_open && !state.loading && state.txns.is_empty();

        state.open = next_open;
        if fetch_required {
            state.loading = true;
            state.load_failed = false;
        }

        ToggleOutcome { open: next_open, fetch_required }
    }

    pub fn close(&mut self, row_id: &VarianceId) -> bool {
        if !self.is_open(row_id) {
            return false;
        }
        if let Some(state) = Arc::make_mut(&mut self.states).get_mut(row_id) {
            state.open = false;
        }
        true
    }

    pub fn complete_fetch(
        &mut self,
        row_id: &VarianceId,
        result: Result<Vec<Txn>, GatewayError>,
    ) -> FetchApplied {
        if !self.states.contains_key(row_id) {
            debug!(
                event_name = "drilldown.fetch.discarded_stale",
                row_id = %row_id,
                "fetch completed for a row that is no longer tracked"
            );
            return FetchApplied::DiscardedStale;
        }

        let Some(state) = Arc::make_mut(&mut self.states).get_mut(row_id) else {
            return FetchApplied::DiscardedStale;
        };
        state.loading = false;
        match result {
            Ok(txns) => {
                state.txns = txns;
                state.page = 1;
                state.load_failed = false;
            }
            Err(error) => {
                warn!(
                    event_name = "drilldown.fetch.failed",
                    row_id = %row_id,
                    error = %error,
                    "transaction fetch failed; showing empty drill-down"
                );
                state.txns = Vec::new();
                state.load_failed = true;
            }
        }
        FetchApplied::Applied
    }

    /// Moves the row's page by `delta`, clamped to the available pages.
    /// Returns `false` without writing when the page would not change.
    pub fn change_page(&mut self, row_id: &VarianceId, delta: i64) -> bool {
        let Some(state) = self.states.get(row_id) else {
            return false;
        };

        let pages = state.page_count(self.page_size);
        let current = state.page.clamp(1, pages);
        let current = i64::try_from(current).unwrap_or(i64::MAX);
        let next = clamp_page(current.saturating_add(delta), pages);
        if next == state.page {
            return false;
        }

        if let Some(state) = Arc::make_mut(&mut self.states).get_mut(row_id) {
            state.page = next;
        }
        true
    }

    pub fn forget(&mut self, row_id: &VarianceId) -> bool {
        if !self.states.contains_key(row_id) {
            return false;
        }
        Arc::make_mut(&mut self.states).remove(row_id).is_some()
    }

    /// Drops every entry whose row is not in `visible`.
    pub fn retain(&mut self, visible: &BTreeSet<VarianceId>) -> usize {
        let stale = self.states.keys().filter(|id| !visible.contains(*id)).count();
        if stale > 0 {
            Arc::make_mut(&mut self.states).retain(|id, _| visible.contains(id));
        }
        stale
    }
}

fn clamp_page(candidate: i64, pages: usize) -> usize {
    let upper = i64::try_from(pages).unwrap_or(i64::MAX);
    // clamp keeps the value within 1..=pages, so the cast back cannot truncate
    candidate.clamp(1, upper) as usize
}

/// One page of a row's transactions as rendered by the drill-down panel.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageView {
    pub row_id: VarianceId,
    pub open: bool,
    pub loading: bool,
    pub load_failed: bool,
    pub page: usize,
    pub pages: usize,
    pub total: usize,
    pub txns: Vec<Txn>,
}

/// Shared drill-down controller: the store plus the gateway it fetches from.
#[derive(Clone)]
pub struct DrillDown {
    store: Arc<Mutex<RowExpansionStore>>,
    gateway: Arc<dyn DataGateway>,
    layout: Arc<dyn DrillDownLayout>,
}

impl DrillDown {
    pub fn new(
        store: RowExpansionStore,
        gateway: Arc<dyn DataGateway>,
        layout: Arc<dyn DrillDownLayout>,
    ) -> Self {
        Self { store: Arc::new(Mutex::new(store)), gateway, layout }
    }

    pub fn layout(&self) -> &dyn DrillDownLayout {
        self.layout.as_ref()
    }

    pub async fn toggle(&self, row_id: &VarianceId) -> ToggleOutcome {
        let outcome = {
            let mut store = self.lock();
            let outcome = store.toggle(row_id);
            if outcome.open {
                self.layout.after_open(&mut store, row_id);
            }
            outcome
        };

        if outcome.fetch_required {
            let result = self.gateway.fetch_transactions(row_id).await;
            self.lock().complete_fetch(row_id, result);
        }

        outcome
    }

    pub fn change_page(&self, row_id: &VarianceId, delta: i64) -> bool {
        self.lock().change_page(row_id, delta)
    }

    pub fn forget(&self, row_id: &VarianceId) -> bool {
        self.lock().forget(row_id)
    }

    pub fn retain(&self, visible: &BTreeSet<VarianceId>) -> usize {
        self.lock().retain(visible)
    }

    pub fn state(&self, row_id: &VarianceId) -> Option<ExpansionState> {
        self.lock().get(row_id).cloned()
    }

    pub fn snapshot(&self) -> Arc<ExpansionMap> {
        self.lock().snapshot()
    }

    pub fn page_view(&self, row_id: &VarianceId) -> Option<PageView> {
        let store = self.lock();
        let page_size = store.page_size();
        store.get(row_id).map(|state| PageView {
            row_id: row_id.clone(),
            open: state.open,
            loading: state.loading,
            load_failed: state.load_failed,
            page: state.page,
            pages: state.page_count(page_size),
            total: state.txns.len(),
            txns: state.page_slice(page_size).to_vec(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, RowExpansionStore> {
        match self.store.lock() {
            Ok(store) => store,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
