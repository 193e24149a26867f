//! Structured JSON logging
//!
//! - One log line = one JSON object
//! - `event` and `severity` always present
//! - Remaining keys in deterministic (alphabetical) order
//!
//! Records come through the `log` facade; `env_logger` writes them. Level
//! filtering follows `RUST_LOG` (default `info`).

use std::collections::BTreeMap;
use std::io::Write;

use chrono::{SecondsFormat, Utc};
use log::Level;
use serde_json::{Map, Value};

use super::events::Event;

/// Log target for every event emitted by this crate
pub const TARGET: &str = "skatepark";

/// Install the JSON formatter. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let line = format_record(
                record.level(),
                record.target(),
                &record.args().to_string(),
                &Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            );
            writeln!(buf, "{}", line)
        })
        .try_init();
}

/// Log an event with string fields
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    log::log!(target: TARGET, event.level(), "{}", render_event(event, fields));
}

/// Render an event and its fields as a compact JSON object
pub fn render_event(event: Event, fields: &[(&str, &str)]) -> String {
    let sorted: BTreeMap<&str, &str> = fields.iter().copied().collect();

    let mut object = Map::new();
    object.insert("event".to_string(), Value::from(event.as_str()));
    for (key, value) in sorted {
        if key != "event" {
            object.insert(key.to_string(), Value::from(value));
        }
    }

    Value::Object(object).to_string()
}

/// Final line written for one record.
///
/// Messages produced by [`render_event`] are merged into the line; any
/// other message (from dependencies) lands under `message`.
pub fn format_record(level: Level, target: &str, message: &str, timestamp: &str) -> String {
    let mut object = match serde_json::from_str::<Value>(message) {
        Ok(Value::Object(map)) if map.contains_key("event") => map,
        _ => {
            let mut map = Map::new();
            map.insert("event".to_string(), Value::from("LOG"));
            map.insert("message".to_string(), Value::from(message));
            map
        }
    };

    object.insert("severity".to_string(), Value::from(level.as_str()));
    object.insert("target".to_string(), Value::from(target));
    object.insert("timestamp".to_string(), Value::from(timestamp));

    Value::Object(object).to_string()
}
