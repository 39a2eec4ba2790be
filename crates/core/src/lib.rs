pub mod config;
pub mod dashboard;
pub mod domain;
pub mod errors;
pub mod expansion;
pub mod export;
pub mod filter;
pub mod format;
pub mod gateway;
pub mod layout;
pub mod summary;
pub mod variance;

pub use dashboard::{Dashboard, StatCard};
pub use domain::txn::{DrCr, Txn, TxnId};
pub use domain::variance::{VarianceId, VarianceRow, VarianceStatus};
pub use errors::{ApplicationError, DomainError};
pub use expansion::{
    DrillDown, ExpansionState, FetchApplied, PageView, RowExpansionStore, ToggleOutcome,
};
pub use filter::{EntityFilter, ReviewFilters};
pub use gateway::{DataGateway, GatewayError, StaticGateway};
pub use layout::{DrawerLayout, DrillDownLayout, InlineLayout, LayoutKind};
pub use summary::VarianceSummary;
pub use variance::{DerivedRow, DerivedVariance, SortDirection, SortKey, SortState};
