//! Reviewer session state: loaded rows, toolbar filters, table sort and drill-downs.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::config::{ReviewConfig, ViewMode};
use crate::domain::variance::{VarianceId, VarianceRow};
use crate::errors::DomainError;
use crate::export::{to_csv, ExportError};
use crate::expansion::{DrillDown, PageView, RowExpansionStore, ToggleOutcome};
use crate::filter::{include_derived, ReviewFilters};
use crate::format::format_inr;
use crate::gateway::{DataGateway, GatewayError};
use crate::layout::layout_for;
use crate::summary::{summarize, VarianceSummary};
use crate::variance::{derive_all, sort_rows, DerivedRow, SortKey, SortState};

/// Headline figures shown above the table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub label: String,
    pub value: String,
    pub sub: Option<String>,
}

pub struct Dashboard {
    rows: Vec<VarianceRow>,
    filters: ReviewFilters,
    sort: SortState,
    as_of: NaiveDate,
    view: ViewMode,
    gateway: Arc<dyn DataGateway>,
    drill_down: DrillDown,
}

impl Dashboard {
    pub fn new(config: &ReviewConfig, gateway: Arc<dyn DataGateway>) -> Self {
        let drill_down = DrillDown::new(
            RowExpansionStore::new(config.page_size),
            Arc::clone(&gateway),
            layout_for(config.layout),
        );
        Self {
            rows: Vec::new(),
            filters: config.filters(),
            sort: SortState::default(),
            as_of: config.as_of,
            view: config.view,
            gateway,
            drill_down,
        }
    }

    /// Replaces the loaded rows with a fresh fetch.
    pub async fn load(&mut self) -> Result<usize, GatewayError> {
        let rows = self.gateway.fetch_variances().await?;
        info!(event_name = "dashboard.rows.loaded", row_count = rows.len(), "variance rows loaded");
        self.rows = rows;
        Ok(self.rows.len())
    }

    pub fn with_rows(mut self, rows: Vec<VarianceRow>) -> Self {
        self.rows = rows;
        self
    }

    pub fn rows(&self) -> &[VarianceRow] {
        &self.rows
    }

    pub fn filters(&self) -> &ReviewFilters {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: ReviewFilters) -> Result<(), DomainError> {
        ReviewFilters::validate_threshold(filters.threshold_pct)?;
        self.filters = filters;
        Ok(())
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn select_sort(&mut self, key: SortKey) -> SortState {
        self.sort = self.sort.select(key);
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    pub fn set_as_of(&mut self, as_of: NaiveDate) {
        self.as_of = as_of;
    }

    /// Filtered rows before sorting, in load order.
    pub fn filtered_rows(&self) -> Vec<DerivedRow<'_>> {
        derive_all(&self.rows)
            .into_iter()
            .filter(|item| include_derived(item, &self.filters))
            .collect()
    }

    pub fn visible_rows(&self) -> Vec<DerivedRow<'_>> {
        let mut rows = self.filtered_rows();
        sort_rows(&mut rows, self.sort);
        rows
    }

    pub fn summary(&self) -> VarianceSummary {
        summarize(&self.filtered_rows())
    }

    pub fn stat_cards(&self) -> Vec<StatCard> {
        let summary = self.summary();
        vec![
            StatCard {
                label: "Accounts in Scope".to_string(),
                value: summary.total.to_string(),
                sub: None,
            },
            StatCard {
                label: "> Threshold".to_string(),
                value: summary.flagged().to_string(),
                sub: Some(format!("{} breached", summary.breached)),
            },
            StatCard {
                label: "Total Abs Variance".to_string(),
                value: format_inr(summary.total_abs_variance),
                sub: None,
            },
            StatCard {
                label: "Entity".to_string(),
                value: self.filters.entity.label().to_string(),
                sub: Some(format!("As-of {}", self.as_of)),
            },
        ]
    }

    pub fn export_csv(&self) -> Result<String, ExportError> {
        to_csv(&self.filtered_rows())
    }

    pub fn row(&self, row_id: &VarianceId) -> Option<&VarianceRow> {
        self.rows.iter().find(|row| &row.id == row_id)
    }

    pub async fn toggle_row(&self, row_id: &VarianceId) -> Result<ToggleOutcome, DomainError> {
        if self.row(row_id).is_none() {
            return Err(DomainError::UnknownRow(row_id.to_string()));
        }
        Ok(self.drill_down.toggle(row_id).await)
    }

    pub fn change_page(&self, row_id: &VarianceId, delta: i64) -> bool {
        self.drill_down.change_page(row_id, delta)
    }

    pub fn page_view(&self, row_id: &VarianceId) -> Option<PageView> {
        self.drill_down.page_view(row_id)
    }

    /// Drops drill-down state for rows the current filters hide.
    pub fn prune_hidden_drill_downs(&self) -> usize {
        let visible: BTreeSet<VarianceId> =
            self.filtered_rows().into_iter().map(|item| item.row.id.clone()).collect();
        self.drill_down.retain(&visible)
    }

    pub fn drill_down(&self) -> &DrillDown {
        &self.drill_down
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::config::AppConfig;
    use crate::domain::txn::{DrCr, Txn, TxnId};
    use crate::domain::variance::{VarianceId, VarianceRow, VarianceStatus};
    use crate::filter::{EntityFilter, ReviewFilters};
    use crate::gateway::StaticGateway;
    use crate::variance::SortKey;

    use super::Dashboard;

    fn row(
        id: &str,
        entity: &str,
        description: &str,
        prior: i64,
        current: i64,
        status: VarianceStatus,
    ) -> VarianceRow {
        VarianceRow {
            id: VarianceId(id.to_string()),
            entity: entity.to_string(),
            book_date: NaiveDate::from_ymd_opt(2025, 9, 16).expect("date"),
            gl: format!("10{id}"),
            description: description.to_string(),
            prior: Decimal::new(prior, 0),
            current: Decimal::new(current, 0),
            threshold_pct: Decimal::new(5, 0),
            owner: "ops".to_string(),
            status,
            last_updated: NaiveDate::from_ymd_opt(2025, 9, 17).expect("date"),
        }
    }

    fn gateway() -> StaticGateway {
        let rows = vec![
            row(
                "V1",
                "IN-BLR-PB",
                "Cash Nostro Reconciliation",
                1000,
                1300,
                VarianceStatus::Breached,
            ),
            row("V2", "CH-ZRH-PB", "Client Deposits", 1000, 1020, VarianceStatus::Ok),
            row("V3", "IN-BLR-PB", "Interbank Placements", 1000, 880, VarianceStatus::Investigate),
        ];
        let mut txns = BTreeMap::new();
        txns.insert(
            VarianceId("V1".to_string()),
            (1..=10)
                .map(|n| Txn {
                    id: TxnId(format!("T{n}")),
                    date: NaiveDate::from_ymd_opt(2025, 9, 15).expect("date"),
                    source: "SWIFT".to_string(),
                    narrative: "MT940 sweep".to_string(),
                    drcr: DrCr::Credit,
                    amount: Decimal::new(30, 0),
                    tags: Some(vec!["nostro".to_string()]),
                })
                .collect(),
        );
        StaticGateway::new(rows, txns)
    }

    async fn loaded() -> Dashboard {
        let mut dashboard = Dashboard::new(&AppConfig::default().review, Arc::new(gateway()));
        dashboard.load().await.expect("static gateway load");
        dashboard
    }

    #[tokio::test]
    async fn visible_rows_follow_filters_and_sort() {
        let mut dashboard = loaded().await;
        let ids: Vec<String> =
            dashboard.visible_rows().iter().map(|item| item.row.id.to_string()).collect();
        assert_eq!(ids, vec!["V1", "V2", "V3"]);

        dashboard.select_sort(SortKey::PctVar);
        dashboard.select_sort(SortKey::PctVar);
        let ids: Vec<String> =
            dashboard.visible_rows().iter().map(|item| item.row.id.to_string()).collect();
        assert_eq!(ids, vec!["V3", "V2", "V1"]);

        dashboard
            .set_filters(ReviewFilters {
                entity: EntityFilter::Only("IN-BLR-PB".to_string()),
                search: String::new(),
                threshold_pct: Decimal::new(15, 0),
            })
            .expect("valid filters");
        let ids: Vec<String> =
            dashboard.visible_rows().iter().map(|item| item.row.id.to_string()).collect();
        assert_eq!(ids, vec!["V1"]);
    }

    #[tokio::test]
    async fn stat_cards_summarize_filtered_scope() {
        let dashboard = loaded().await;
        let cards = dashboard.stat_cards();

        assert_eq!(cards[0].value, "3");
        assert_eq!(cards[1].value, "2");
        assert_eq!(cards[1].sub.as_deref(), Some("1 breached"));
        assert_eq!(cards[2].value, "₹440");
        assert_eq!(cards[3].value, "All");
        assert_eq!(cards[3].sub.as_deref(), Some("As-of 2025-09-17"));
    }

    #[tokio::test]
    async fn export_uses_filtered_rows() {
        let mut dashboard = loaded().await;
        dashboard
            .set_filters(ReviewFilters {
                entity: EntityFilter::All,
                search: "cash".to_string(),
                threshold_pct: Decimal::ZERO,
            })
            .expect("valid filters");

        let csv = dashboard.export_csv().expect("export");
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.contains("Cash Nostro Reconciliation,1000,1300,300,30.00%"));
    }

    #[tokio::test]
    async fn toggling_unknown_row_is_rejected() {
        let dashboard = loaded().await;
        assert!(dashboard.toggle_row(&VarianceId("V404".to_string())).await.is_err());
    }

    #[tokio::test]
    async fn drill_down_pages_through_row_transactions() {
        let dashboard = loaded().await;
        let id = VarianceId("V1".to_string());

        let outcome = dashboard.toggle_row(&id).await.expect("known row");
        assert!(outcome.open);

        let first = dashboard.page_view(&id).expect("page view");
        assert_eq!((first.page, first.pages, first.txns.len()), (1, 2, 8));

        assert!(dashboard.change_page(&id, 1));
        assert!(!dashboard.change_page(&id, 1));
        let second = dashboard.page_view(&id).expect("page view");
        assert_eq!((second.page, second.txns.len()), (2, 2));
    }

    #[tokio::test]
    async fn hidden_rows_lose_drill_down_state() {
        let mut dashboard = loaded().await;
        let id = VarianceId("V2".to_string());
        dashboard.toggle_row(&id).await.expect("known row");

        dashboard
            .set_filters(ReviewFilters {
                entity: EntityFilter::Only("IN-BLR-PB".to_string()),
                search: String::new(),
                threshold_pct: Decimal::ZERO,
            })
            .expect("valid filters");

        assert_eq!(dashboard.prune_hidden_drill_downs(), 1);
        assert!(dashboard.page_view(&id).is_none());
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let mut dashboard = Dashboard::new(&AppConfig::default().review, Arc::new(gateway()));
        let result = dashboard.set_filters(ReviewFilters {
            threshold_pct: Decimal::new(25, 0),
            ..ReviewFilters::default()
        });
        assert!(result.is_err());
    }
}
