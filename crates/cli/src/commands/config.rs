use std::env;
use std::fs;
use std::path::Path;

use balview_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

struct Field {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines =
        vec!["effective config (source precedence: override > env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key_path,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, &field.value, source));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    vec![
        Field {
            key_path: "gateway.base_url",
            env_keys: &["BALVIEW_GATEWAY_BASE_URL"],
            value: config.gateway.base_url.clone(),
        },
        Field {
            key_path: "gateway.timeout_secs",
            env_keys: &["BALVIEW_GATEWAY_TIMEOUT_SECS"],
            value: config.gateway.timeout_secs.to_string(),
        },
        Field {
            key_path: "gateway.fallback_to_fixtures",
            env_keys: &["BALVIEW_GATEWAY_FALLBACK_TO_FIXTURES"],
            value: config.gateway.fallback_to_fixtures.to_string(),
        },
        Field {
            key_path: "server.bind_address",
            env_keys: &["BALVIEW_SERVER_BIND_ADDRESS"],
            value: config.server.bind_address.clone(),
        },
        Field {
            key_path: "server.port",
            env_keys: &["BALVIEW_SERVER_PORT"],
            value: config.server.port.to_string(),
        },
        Field {
            key_path: "review.entity",
            env_keys: &["BALVIEW_REVIEW_ENTITY"],
            value: config.review.entity.to_string(),
        },
        Field {
            key_path: "review.as_of",
            env_keys: &["BALVIEW_REVIEW_AS_OF"],
            value: config.review.as_of.to_string(),
        },
        Field {
            key_path: "review.search",
            env_keys: &["BALVIEW_REVIEW_SEARCH"],
            value: if config.review.search.is_empty() {
                "<empty>".to_string()
            } else {
                config.review.search.clone()
            },
        },
        Field {
            key_path: "review.threshold_pct",
            env_keys: &["BALVIEW_REVIEW_THRESHOLD_PCT"],
            value: config.review.threshold_pct.to_string(),
        },
        Field {
            key_path: "review.view",
            env_keys: &["BALVIEW_REVIEW_VIEW"],
            value: format!("{:?}", config.review.view),
        },
        Field {
            key_path: "review.page_size",
            env_keys: &["BALVIEW_REVIEW_PAGE_SIZE"],
            value: config.review.page_size.to_string(),
        },
        Field {
            key_path: "review.layout",
            env_keys: &["BALVIEW_REVIEW_LAYOUT"],
            value: format!("{:?}", config.review.layout),
        },
        Field {
            key_path: "logging.level",
            env_keys: &["BALVIEW_LOGGING_LEVEL", "BALVIEW_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Field {
            key_path: "logging.format",
            env_keys: &["BALVIEW_LOGGING_FORMAT", "BALVIEW_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format),
        },
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use toml::Value;

    use super::{contains_path, field_source};

    #[test]
    fn file_source_requires_nested_key() {
        let doc: Value = "[review]\nthreshold_pct = 5\n".parse().expect("toml");
        assert!(contains_path(&doc, "review.threshold_pct"));
        assert!(!contains_path(&doc, "review.entity"));
        assert!(!contains_path(&doc, "gateway.base_url"));

        let source = field_source(
            "review.threshold_pct",
            &["BALVIEW_TEST_UNSET_THRESHOLD"],
            Some(&doc),
            Some(Path::new("balview.toml")),
        );
        assert_eq!(source, "file (balview.toml)");
    }

    #[test]
    fn missing_everywhere_is_default() {
        let source = field_source("review.entity", &["BALVIEW_TEST_UNSET_ENTITY"], None, None);
        assert_eq!(source, "default");
    }
}
