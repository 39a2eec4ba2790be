use balview_core::config::ConfigOverrides;
use balview_core::domain::variance::VarianceId;
use balview_core::expansion::PageView;
use balview_core::format::format_inr;

use crate::commands::{load_config, load_dashboard, runtime, CommandResult};

const COMMAND: &str = "drill";

#[derive(Debug, Clone)]
pub struct DrillArgs {
    pub row_id: String,
    pub page: usize,
    pub json: bool,
}

/// Opens one row's drill-down and shows the requested page, clamped to the last page.
pub fn run(args: DrillArgs) -> CommandResult {
    let config = match load_config(COMMAND, ConfigOverrides::default()) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };
    let dashboard = match load_dashboard(COMMAND, &config, &runtime) {
        Ok(dashboard) => dashboard,
        Err(result) => return result,
    };

    let row_id = VarianceId(args.row_id);
    if let Err(error) = runtime.block_on(dashboard.toggle_row(&row_id)) {
        return CommandResult::from_error(COMMAND, error);
    }
    let delta = i64::try_from(args.page.saturating_sub(1)).unwrap_or(i64::MAX);
    dashboard.change_page(&row_id, delta);

    let Some(view) = dashboard.page_view(&row_id) else {
        return CommandResult::failure(
            COMMAND,
            "invalid_input",
            format!("row `{row_id}` is not expanded"),
            1,
        );
    };
    if view.load_failed {
        return CommandResult::failure(
            COMMAND,
            "gateway",
            format!("transactions for `{row_id}` could not be loaded"),
            3,
        );
    }

    if args.json {
        return CommandResult::success_with_data(
            COMMAND,
            format!("page {} of {} for {row_id}", view.page, view.pages),
            &view,
        );
    }

    let description =
        dashboard.row(&row_id).map(|row| row.description.as_str()).unwrap_or_default();
    CommandResult::text(render_human(description, &view))
}

fn render_human(description: &str, view: &PageView) -> String {
    let mut lines = vec![format!(
        "{} {description}: page {}/{} ({} transactions)",
        view.row_id, view.page, view.pages, view.total
    )];

    if view.txns.is_empty() {
        lines.push("no transactions".to_string());
        return lines.join("\n");
    }

    for txn in &view.txns {
        let tags = txn.tags.as_deref().map(|tags| tags.join(",")).unwrap_or_default();
        lines.push(format!(
            "{:<7} {} {:<9} {:<2} {:>12} {:<44} {tags}",
            txn.id.0,
            txn.date,
            txn.source,
            txn.drcr.as_str(),
            format_inr(txn.amount),
            txn.narrative,
        ));
    }

    lines.join("\n")
}
