use serde::{Deserialize, Serialize};

use crate::domain::variance::VarianceId;
use crate::errors::DomainError;
use crate::expansion::RowExpansionStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    Drawer,
    Inline,
}

impl std::str::FromStr for LayoutKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "drawer" => Ok(Self::Drawer),
            "inline" => Ok(Self::Inline),
            other => Err(DomainError::InvalidInput(format!(
                "unsupported drill-down layout `{other}` (expected drawer|inline)"
            ))),
        }
    }
}

/// How drill-down panels share the screen. Both layouts drive the same store.
pub trait DrillDownLayout: Send + Sync {
    fn kind(&self) -> LayoutKind;

    /// Runs right after `row_id` transitions to open.
    fn after_open(&self, store: &mut RowExpansionStore, row_id: &VarianceId);
}

/// Side drawer: opening a row closes whichever row was showing.
#[derive(Clone, Copy, Debug, Default)]
pub struct DrawerLayout;

impl DrillDownLayout for DrawerLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Drawer
    }

    fn after_open(&self, store: &mut RowExpansionStore, row_id: &VarianceId) {
        for other in store.open_rows() {
            if &other != row_id {
                store.close(&other);
            }
        }
    }
}

/// Inline expansion under each table row; any number of rows can be open.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineLayout;

impl DrillDownLayout for InlineLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Inline
    }

    fn after_open(&self, _store: &mut RowExpansionStore, _row_id: &VarianceId) {}
}

pub fn layout_for(kind: LayoutKind) -> std::sync::Arc<dyn DrillDownLayout> {
    match kind {
        LayoutKind::Drawer => std::sync::Arc::new(DrawerLayout),
        LayoutKind::Inline => std::sync::Arc::new(InlineLayout),
    }
}
