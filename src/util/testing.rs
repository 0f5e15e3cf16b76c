//! Test support: shared tracing subscriber and outline fixtures

use std::env;
use std::path::Path;
use std::sync::Once;

use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

static TEST_SETUP: Once = Once::new();

/// Install the global test subscriber once per process, honoring `RUST_LOG`.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "versetree=debug");
        }
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_test_writer()
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// A chapter unit with two sections, each holding one leaf verse.
///
/// Local span `1-<verses>` (`verses` >= 2); leaf texts are `"<id> text"`.
pub fn chapter(id: u32, verses: u32) -> Value {
    let mid = verses / 2;
    json!({
        "level": "chapter",
        "id": id.to_string(),
        "title": format!("Chapter {id}"),
        "span": format!("1-{verses}"),
        "children": [
            {
                "level": "section",
                "id": format!("{id}.1"),
                "title": "First half",
                "span": format!("1-{mid}"),
                "children": [
                    {"level": "verse", "id": format!("{id}.1.1"), "title": "", "span": format!("1-{mid}"), "text": format!("{id}.1.1 text")}
                ]
            },
            {
                "level": "section",
                "id": format!("{id}.2"),
                "title": "Second half",
                "span": format!("{}-{verses}", mid + 1),
                "children": [
                    {"level": "verse", "id": format!("{id}.2.1"), "title": "", "span": format!("{}-{verses}", mid + 1), "text": format!("{id}.2.1 text")}
                ]
            }
        ]
    })
}

/// Write `value` as JSON to `path`, creating parent directories.
///
/// Panics on I/O failure; intended for test fixtures only.
pub fn write_json(path: &Path, value: &Value) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create fixture directory");
    }
    let content = serde_json::to_string_pretty(value).expect("encode fixture");
    std::fs::write(path, content).expect("write fixture");
}

/// Read JSON from `path`. Panics on failure; intended for test assertions only.
pub fn read_json(path: &Path) -> Value {
    let content = std::fs::read_to_string(path).expect("read output");
    serde_json::from_str(&content).expect("decode output")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_chapter_fixture_when_built_then_has_two_sections() {
        init_test_setup();
        let unit = chapter(1, 4);
        assert_eq!(unit["children"].as_array().map(Vec::len), Some(2));
        assert_eq!(unit["children"][1]["span"], "3-4");
    }
}
