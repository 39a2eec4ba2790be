use balview_core::config::{AppConfig, LoadOptions};
use balview_core::gateway::DataGateway;
use balview_gateway::{fixtures, HttpGateway};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\
                 \"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_fixture_dataset());
            checks.push(check_gateway_reachability(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(check_fixture_dataset());
            checks.push(DoctorCheck {
                name: "gateway_reachability",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let overall_status = overall(&checks);
    let summary = match overall_status {
        CheckStatus::Pass => "doctor: all readiness checks passed".to_string(),
        CheckStatus::Warn => "doctor: ready with warnings".to_string(),
        _ => "doctor: one or more readiness checks failed".to_string(),
    };

    DoctorReport { overall_status, summary, checks }
}

fn overall(checks: &[DoctorCheck]) -> CheckStatus {
    if checks.iter().any(|check| matches!(check.status, CheckStatus::Fail | CheckStatus::Skipped)) {
        CheckStatus::Fail
    } else if checks.iter().any(|check| check.status == CheckStatus::Warn) {
        CheckStatus::Warn
    } else {
        CheckStatus::Pass
    }
}

fn check_fixture_dataset() -> DoctorCheck {
    let gateway = fixtures::static_gateway();
    let rows = gateway.rows().len();
    if rows == 0 {
        return DoctorCheck {
            name: "fixture_dataset",
            status: CheckStatus::Fail,
            details: "fixture dataset is empty".to_string(),
        };
    }
    DoctorCheck {
        name: "fixture_dataset",
        status: CheckStatus::Pass,
        details: format!("{rows} rows, {} transactions", gateway.transaction_count()),
    }
}

/// An unreachable API is a warning when fixtures cover for it, a failure otherwise.
fn check_gateway_reachability(config: &AppConfig) -> DoctorCheck {
    let unreachable_status = if config.gateway.fallback_to_fixtures {
        CheckStatus::Warn
    } else {
        CheckStatus::Fail
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "gateway_reachability",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let result = HttpGateway::new(&config.gateway.base_url, config.gateway.timeout_secs)
        .map(|gateway| runtime.block_on(async move { gateway.fetch_variances().await }));

    match result {
        Ok(Ok(rows)) => DoctorCheck {
            name: "gateway_reachability",
            status: CheckStatus::Pass,
            details: format!("`{}` served {} rows", config.gateway.base_url, rows.len()),
        },
        Ok(Err(error)) | Err(error) => DoctorCheck {
            name: "gateway_reachability",
            status: unreachable_status,
            details: if config.gateway.fallback_to_fixtures {
                format!("{error}; fixture fallback is enabled")
            } else {
                error.to_string()
            },
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
