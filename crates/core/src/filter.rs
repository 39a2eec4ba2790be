use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::variance::VarianceRow;
use crate::errors::DomainError;
use crate::variance::{percent_variance, DerivedRow};

pub const ALL_ENTITIES: &str = "ALL";
pub const MAX_THRESHOLD_PCT: i64 = 20;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityFilter {
    #[default]
    All,
    Only(String),
}

impl EntityFilter {
    pub fn matches(&self, entity: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(code) => code == entity,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => "All",
            Self::Only(code) => code,
        }
    }
}

impl std::str::FromStr for EntityFilter {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidInput("entity filter must not be empty".to_string()));
        }
        if trimmed == ALL_ENTITIES {
            return Ok(Self::All);
        }
        Ok(Self::Only(trimmed.to_string()))
    }
}

impl std::fmt::Display for EntityFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str(ALL_ENTITIES),
            Self::Only(code) => f.write_str(code),
        }
    }
}

/// Toolbar inputs that narrow the variance table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewFilters {
    pub entity: EntityFilter,
    pub search: String,
    pub threshold_pct: Decimal,
}

impl Default for ReviewFilters {
    fn default() -> Self {
        Self { entity: EntityFilter::All, search: String::new(), threshold_pct: Decimal::ZERO }
    }
}

impl ReviewFilters {
    /// Caller-side range check; `include` itself never clamps.
    pub fn validate_threshold(threshold_pct: Decimal) -> Result<Decimal, DomainError> {
        if threshold_pct < Decimal::ZERO || threshold_pct > Decimal::from(MAX_THRESHOLD_PCT) {
            return Err(DomainError::ThresholdOutOfRange(threshold_pct.to_string()));
        }
        Ok(threshold_pct)
    }
}

pub fn include(row: &VarianceRow, filters: &ReviewFilters) -> bool {
    include_with_percent(row, percent_variance(row.prior, row.current), filters)
}

pub fn include_derived(item: &DerivedRow<'_>, filters: &ReviewFilters) -> bool {
    include_with_percent(item.row, item.percent_variance(), filters)
}

fn include_with_percent(row: &VarianceRow, percent: Decimal, filters: &ReviewFilters) -> bool {
    filters.entity.matches(&row.entity)
        && matches_search(row, &filters.search)
        && percent.abs() >= filters.threshold_pct
}

fn matches_search(row: &VarianceRow, search: &str) -> bool {
    if search.trim().is_empty() {
        return true;
    }

    let needle = search.to_lowercase();
    row.gl.to_lowercase().contains(&needle) || row.description.to_lowercase().contains(&needle)
}
