//! Derived variance metrics and table ordering.
//!
//! Derived values are recomputed whenever a view is built. Nothing here caches or
//! mutates the source rows.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::variance::VarianceRow;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedVariance {
    pub absolute_variance: Decimal,
    pub percent_variance: Decimal,
}

/// A source row paired with its derived metrics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DerivedRow<'a> {
    pub row: &'a VarianceRow,
    pub derived: DerivedVariance,
}

impl<'a> DerivedRow<'a> {
    pub fn new(row: &'a VarianceRow) -> Self {
        Self { row, derived: compute_derived(row) }
    }

    pub fn absolute_variance(&self) -> Decimal {
        self.derived.absolute_variance
    }

    pub fn percent_variance(&self) -> Decimal {
        self.derived.percent_variance
    }
}

/// `current - prior`, saturating at the decimal range when the difference overflows.
pub fn absolute_variance(prior: Decimal, current: Decimal) -> Decimal {
    let saturated = if current > prior { Decimal::MAX } else { Decimal::MIN };
    current.checked_sub(prior).unwrap_or(saturated)
}

/// Signed percent movement against the magnitude of the prior balance.
///
/// A negative prior does not flip the sign; the sign follows the absolute variance.
/// A zero prior yields zero. Ratios beyond the decimal range saturate.
pub fn percent_variance(prior: Decimal, current: Decimal) -> Decimal {
    if prior.is_zero() {
        return Decimal::ZERO;
    }

    let movement = absolute_variance(prior, current);
    let magnitude = movement
        .abs()
        .checked_div(prior.abs())
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::MAX);
    if movement.is_sign_negative() {
        -magnitude
    } else {
        magnitude
    }
}

pub fn compute_derived(row: &VarianceRow) -> DerivedVariance {
    DerivedVariance {
        absolute_variance: absolute_variance(row.prior, row.current),
        percent_variance: percent_variance(row.prior, row.current),
    }
}

pub fn derive_all(rows: &[VarianceRow]) -> Vec<DerivedRow<'_>> {
    rows.iter().map(DerivedRow::new).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Id,
    Entity,
    BookDate,
    Gl,
    Description,
    Prior,
    Current,
    #[serde(rename = "absVar")]
    AbsVar,
    #[serde(rename = "%Var")]
    PctVar,
    ThresholdPct,
    Status,
    Owner,
    LastUpdated,
}

impl SortKey {
    pub const ALL: [SortKey; 13] = [
        SortKey::Id,
        SortKey::Entity,
        SortKey::BookDate,
        SortKey::Gl,
        SortKey::Description,
        SortKey::Prior,
        SortKey::Current,
        SortKey::AbsVar,
        SortKey::PctVar,
        SortKey::ThresholdPct,
        SortKey::Status,
        SortKey::Owner,
        SortKey::LastUpdated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Entity => "entity",
            Self::BookDate => "bookDate",
            Self::Gl => "gl",
            Self::Description => "description",
            Self::Prior => "prior",
            Self::Current => "current",
            Self::AbsVar => "absVar",
            Self::PctVar => "%Var",
            Self::ThresholdPct => "thresholdPct",
            Self::Status => "status",
            Self::Owner => "owner",
            Self::LastUpdated => "lastUpdated",
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(wanted))
            .or(match wanted.to_ascii_lowercase().as_str() {
                "pctvar" | "pct" | "percent" => Some(SortKey::PctVar),
                "abs" | "absvariance" => Some(SortKey::AbsVar),
                _ => None,
            })
            .ok_or_else(|| DomainError::UnknownSortKey(wanted.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Column sort selection for the variance table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self { key: SortKey::AbsVar, direction: SortDirection::Desc }
    }
}

impl SortState {
    /// Header click: the active key flips direction, any other key starts descending.
    pub fn select(self, key: SortKey) -> Self {
        if self.key == key {
            Self { key, direction: self.direction.flipped() }
        } else {
            Self { key, direction: SortDirection::Desc }
        }
    }

    pub fn comparator(self) -> impl Fn(&DerivedRow<'_>, &DerivedRow<'_>) -> Ordering {
        compare_by(self.key, self.direction)
    }
}

pub fn compare_by(
    key: SortKey,
    direction: SortDirection,
) -> impl Fn(&DerivedRow<'_>, &DerivedRow<'_>) -> Ordering {
    move |a: &DerivedRow<'_>, b: &DerivedRow<'_>| {
        let ordering = compare_field(key, a, b);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

fn compare_field(key: SortKey, a: &DerivedRow<'_>, b: &DerivedRow<'_>) -> Ordering {
    let (left, right) = (a.row, b.row);
    match key {
        SortKey::Id => left.id.cmp(&right.id),
        SortKey::Entity => left.entity.cmp(&right.entity),
        SortKey::BookDate => left.book_date.cmp(&right.book_date),
        SortKey::Gl => left.gl.cmp(&right.gl),
        SortKey::Description => left.description.cmp(&right.description),
        SortKey::Prior => left.prior.cmp(&right.prior),
        SortKey::Current => left.current.cmp(&right.current),
        SortKey::AbsVar => a.absolute_variance().cmp(&b.absolute_variance()),
        SortKey::PctVar => a.percent_variance().cmp(&b.percent_variance()),
        SortKey::ThresholdPct => left.threshold_pct.cmp(&right.threshold_pct),
        SortKey::Status => left.status.as_str().cmp(right.status.as_str()),
        SortKey::Owner => left.owner.cmp(&right.owner),
        SortKey::LastUpdated => left.last_updated.cmp(&right.last_updated),
    }
}

/// Stable sort; rows with equal keys keep their incoming order.
pub fn sort_rows(rows: &mut [DerivedRow<'_>], sort: SortState) {
    rows.sort_by(sort.comparator());
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::domain::variance::{VarianceId, VarianceRow, VarianceStatus};

    use super::{
        compute_derived, derive_all, percent_variance, sort_rows, SortDirection, SortKey,
        SortState,
    };

    fn row(id: &str, prior: i64, current: i64) -> VarianceRow {
        VarianceRow {
            id: VarianceId(id.to_string()),
            entity: "IN-BLR-PB".to_string(),
            book_date: NaiveDate::from_ymd_opt(2025, 9, 16).expect("date"),
            gl: "101100".to_string(),
            description: "Cash Nostro Reconciliation".to_string(),
            prior: Decimal::new(prior, 0),
            current: Decimal::new(current, 0),
            threshold_pct: Decimal::new(5, 0),
            owner: "a.sharma".to_string(),
            status: VarianceStatus::Ok,
            last_updated: NaiveDate::from_ymd_opt(2025, 9, 17).expect("date"),
        }
    }

    #[test]
    fn zero_prior_yields_zero_percent_for_any_current() {
        for current in [-500, 0, 1, 9_999_999] {
            assert_eq!(percent_variance(Decimal::ZERO, Decimal::new(current, 0)), Decimal::ZERO);
        }
    }

    #[test]
    fn out_of_range_movements_saturate_instead_of_overflowing() {
        let tiny_prior = Decimal::new(1, 2);
        let huge_current = Decimal::from_i128_with_scale(10_i128.pow(27), 0);
        assert_eq!(percent_variance(tiny_prior, huge_current), Decimal::MAX);
        assert_eq!(percent_variance(tiny_prior, -huge_current), -Decimal::MAX);

        let mut wide = row("V1", 0, 0);
        wide.prior = Decimal::MIN;
        wide.current = Decimal::MAX;
        let derived = compute_derived(&wide);
        assert_eq!(derived.absolute_variance, Decimal::MAX);
        assert_eq!(derived.percent_variance, Decimal::ONE_HUNDRED);
    }

    #[test]
    fn absolute_variance_is_exact_difference() {
        let mut source = row("V1", 0, 0);
        source.prior = Decimal::new(10_000_001, 2);
        source.current = Decimal::new(20_000_003, 2);

        let derived = compute_derived(&source);
        assert_eq!(derived.absolute_variance, Decimal::new(10_000_002, 2));
    }

    #[test]
    fn percent_sign_follows_movement_not_prior_sign() {
        // prior -1000 -> current -1200 moves down by 200 against a magnitude of 1000
        let down = compute_derived(&row("V1", -1000, -1200));
        assert_eq!(down.absolute_variance, Decimal::new(-200, 0));
        assert_eq!(down.percent_variance, Decimal::new(-20, 0));

        let up = compute_derived(&row("V2", -1000, -800));
        assert_eq!(up.percent_variance, Decimal::new(20, 0));

        let fall = compute_derived(&row("V3", 1000, 750));
        assert_eq!(fall.percent_variance, Decimal::new(-25, 0));
    }

    #[test]
    fn repeated_key_selection_toggles_direction() {
        let first = SortState::default().select(SortKey::Prior);
        assert_eq!(first.direction, SortDirection::Desc);

        let second = first.select(SortKey::Prior);
        assert_eq!(second.direction, SortDirection::Asc);

        let third = second.select(SortKey::Prior);
        assert_eq!(third.direction, SortDirection::Desc);
    }

    #[test]
    fn new_key_always_starts_descending() {
        let ascending = SortState { key: SortKey::Gl, direction: SortDirection::Asc };
        assert_eq!(ascending.select(SortKey::Owner).direction, SortDirection::Desc);

        let clicked_default = SortState::default().select(SortKey::AbsVar);
        assert_eq!(clicked_default.direction, SortDirection::Asc);
    }

    #[test]
    fn sorts_by_derived_absolute_variance_descending_by_default() {
        let rows = vec![row("V1", 100, 150), row("V2", 100, 400), row("V3", 100, 90)];
        let mut derived = derive_all(&rows);
        sort_rows(&mut derived, SortState::default());

        let ids: Vec<&str> = derived.iter().map(|item| item.row.id.as_str()).collect();
        assert_eq!(ids, vec!["V2", "V1", "V3"]);
    }

    #[test]
    fn equal_keys_keep_original_relative_order() {
        let rows = vec![row("V1", 100, 200), row("V2", 50, 150), row("V3", 10, 110)];
        let mut derived = derive_all(&rows);
        sort_rows(
            &mut derived,
            SortState { key: SortKey::AbsVar, direction: SortDirection::Asc },
        );

        let ids: Vec<&str> = derived.iter().map(|item| item.row.id.as_str()).collect();
        assert_eq!(ids, vec!["V1", "V2", "V3"]);

        sort_rows(&mut derived, SortState::default());
        let ids: Vec<&str> = derived.iter().map(|item| item.row.id.as_str()).collect();
        assert_eq!(ids, vec!["V1", "V2", "V3"]);
    }

    #[test]
    fn status_sorts_by_wire_label() {
        let mut breached = row("V1", 1, 1);
        breached.status = VarianceStatus::Breached;
        let mut ok = row("V2", 1, 1);
        ok.status = VarianceStatus::Ok;
        let mut investigate = row("V3", 1, 1);
        investigate.status = VarianceStatus::Investigate;

        let rows = vec![ok, breached, investigate];
        let mut derived = derive_all(&rows);
        sort_rows(&mut derived, SortState { key: SortKey::Status, direction: SortDirection::Asc });

        let ids: Vec<&str> = derived.iter().map(|item| item.row.id.as_str()).collect();
        assert_eq!(ids, vec!["V1", "V3", "V2"]);
    }

    #[test]
    fn sort_keys_parse_from_column_names() {
        assert_eq!("%Var".parse::<SortKey>(), Ok(SortKey::PctVar));
        assert_eq!("pctvar".parse::<SortKey>(), Ok(SortKey::PctVar));
        assert_eq!("absvar".parse::<SortKey>(), Ok(SortKey::AbsVar));
        assert_eq!("thresholdpct".parse::<SortKey>(), Ok(SortKey::ThresholdPct));
        assert!("colour".parse::<SortKey>().is_err());
    }
}
