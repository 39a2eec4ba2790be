use balview_core::dashboard::StatCard;
use balview_core::export::format_percent;
use balview_core::format::{format_inr, status_tone, Tone};
use balview_core::summary::VarianceSummary;
use balview_core::variance::{DerivedRow, SortDirection, SortKey, SortState};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::{load_config, load_dashboard, runtime, CommandResult, FilterArgs};

const COMMAND: &str = "report";

#[derive(Debug, Clone, Default)]
pub struct ReportArgs {
    pub filters: FilterArgs,
    pub sort: Option<String>,
    pub ascending: bool,
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportRow {
    id: String,
    entity: String,
    gl: String,
    description: String,
    #[serde(with = "rust_decimal::serde::float")]
    prior: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    current: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    abs_var: Decimal,
    pct_var: String,
    status: String,
    tone: Tone,
    owner: String,
}

#[derive(Debug, Serialize)]
struct ReportPayload {
    sort: SortState,
    summary: VarianceSummary,
    cards: Vec<StatCard>,
    rows: Vec<ReportRow>,
}

pub fn run(args: ReportArgs) -> CommandResult {
    let sort = match resolve_sort(args.sort.as_deref(), args.ascending) {
        Ok(sort) => sort,
        Err(result) => return result,
    };
    let overrides = match args.filters.into_overrides() {
        Ok(overrides) => overrides,
        Err(error) => return CommandResult::from_error(COMMAND, error),
    };
    let config = match load_config(COMMAND, overrides) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };
    let mut dashboard = match load_dashboard(COMMAND, &config, &runtime) {
        Ok(dashboard) => dashboard,
        Err(result) => return result,
    };
    dashboard.set_sort(sort);

    let visible = dashboard.visible_rows();
    let cards = dashboard.stat_cards();

    if args.json {
        let payload = ReportPayload {
            sort,
            summary: dashboard.summary(),
            cards,
            rows: visible.iter().map(report_row).collect(),
        };
        return CommandResult::success_with_data(
            COMMAND,
            format!("{} rows in scope", payload.rows.len()),
            &payload,
        );
    }

    CommandResult::text(render_human(&cards, &visible))
}

fn resolve_sort(key: Option<&str>, ascending: bool) -> Result<SortState, CommandResult> {
    let key = match key {
        Some(raw) => {
            raw.parse::<SortKey>().map_err(|error| CommandResult::from_error(COMMAND, error))?
        }
        None => SortState::default().key,
    };
    let direction = if ascending { SortDirection::Asc } else { SortDirection::Desc };
    Ok(SortState { key, direction })
}

fn report_row(item: &DerivedRow<'_>) -> ReportRow {
    ReportRow {
        id: item.row.id.to_string(),
        entity: item.row.entity.clone(),
        gl: item.row.gl.clone(),
        description: item.row.description.clone(),
        prior: item.row.prior,
        current: item.row.current,
        abs_var: item.absolute_variance(),
        pct_var: format_percent(item.percent_variance()),
        status: item.row.status.to_string(),
        tone: status_tone(item.row.status),
        owner: item.row.owner.clone(),
    }
}

fn render_human(cards: &[StatCard], rows: &[DerivedRow<'_>]) -> String {
    let mut lines = Vec::new();
    lines.push(
        cards
            .iter()
            .map(|card| match &card.sub {
                Some(sub) => format!("{}: {} ({sub})", card.label, card.value),
                None => format!("{}: {}", card.label, card.value),
            })
            .collect::<Vec<_>>()
            .join(" | "),
    );

    if rows.is_empty() {
        lines.push("no rows match the current filters".to_string());
        return lines.join("\n");
    }

    lines.push(format!(
        "{:<5} {:<10} {:<7} {:<32} {:>16} {:>16} {:>14} {:>9} {:<11} {}",
        "ID",
        "ENTITY",
        "GL",
        "DESCRIPTION",
        "PRIOR",
        "CURRENT",
        "ABS VAR",
        "%VAR",
        "STATUS",
        "OWNER"
    ));
    for item in rows {
        lines.push(format!(
            "{:<5} {:<10} {:<7} {:<32} {:>16} {:>16} {:>14} {:>9} {:<11} {}",
            item.row.id.as_str(),
            item.row.entity,
            item.row.gl,
            truncate(&item.row.description, 32),
            format_inr(item.row.prior),
            format_inr(item.row.current),
            format_inr(item.absolute_variance()),
            format_percent(item.percent_variance()),
            item.row.status.as_str(),
            item.row.owner,
        ));
    }

    lines.join("\n")
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use balview_core::variance::{SortDirection, SortKey};

    use super::{resolve_sort, truncate};

    #[test]
    fn sort_defaults_to_abs_var_descending() {
        let sort = resolve_sort(None, false).expect("default sort");
        assert_eq!(sort.key, SortKey::AbsVar);
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn sort_accepts_column_labels() {
        let sort = resolve_sort(Some("%Var"), true).expect("pct sort");
        assert_eq!(sort.key, SortKey::PctVar);
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn unknown_sort_key_is_invalid_input() {
        let result = resolve_sort(Some("colour"), false).expect_err("unknown key");
        assert_eq!(result.exit_code, 1);
        assert!(result.output.contains("\"error_class\":\"invalid_input\""));
    }

    #[test]
    fn long_descriptions_are_truncated() {
        assert_eq!(truncate("Cash Nostro", 32), "Cash Nostro");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }
}
