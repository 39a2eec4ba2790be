use std::path::PathBuf;

use balview_core::export::{write_csv_file, EXPORT_FILE_NAME};
use serde::Serialize;
use tracing::info;

use crate::commands::{load_config, load_dashboard, runtime, CommandResult, FilterArgs};

const COMMAND: &str = "export";

#[derive(Debug, Clone, Default)]
pub struct ExportArgs {
    pub filters: FilterArgs,
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ExportSummary {
    path: String,
    rows: usize,
}

/// Writes the filtered rows, in load order, as CSV.
pub fn run(args: ExportArgs) -> CommandResult {
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
    let dashboard = match load_dashboard(COMMAND, &config, &runtime) {
        Ok(dashboard) => dashboard,
        Err(result) => return result,
    };

    let path = args.out.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
    match write_csv_file(&path, &dashboard.filtered_rows()) {
        Ok(rows) => {
            info!(
                event_name = "cli.export.written",
                path = %path.display(),
                rows,
                "variance export written"
            );
            let summary = ExportSummary { path: path.display().to_string(), rows };
            CommandResult::success_with_data(
                COMMAND,
                format!("wrote {rows} rows to {}", summary.path),
                &summary,
            )
        }
        Err(error) => CommandResult::from_error(COMMAND, error),
    }
}
