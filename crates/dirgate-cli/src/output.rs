//! Result printing

use colored::Colorize;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// What a successful command prints
#[derive(Debug, Clone)]
pub struct Report {
    operation: &'static str,
    summary: String,
    details: Vec<(&'static str, String)>,
}

impl Report {
    pub fn new(operation: &'static str, summary: impl Into<String>) -> Self {
        Self {
            operation,
            summary: summary.into(),
            details: Vec::new(),
        }
    }

    pub fn detail(mut self, key: &'static str, value: impl ToString) -> Self {
        self.details.push((key, value.to_string()));
        self
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("operation".into(), json!(self.operation));
        map.insert("status".into(), json!("ok"));
        map.insert("message".into(), json!(self.summary));
        for (key, value) in &self.details {
            map.insert((*key).to_string(), json!(value));
        }
        Value::Object(map)
    }

    pub fn to_text(&self) -> String {
        let mut text = format!("{} {}", "✓".green(), self.summary);
        let width = self.details.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in &self.details {
            text.push_str(&format!("\n  {:width$}  {}", key, value, width = width));
        }
        text
    }
}

/// Stable code for a failed command
pub fn error_code(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<dirgate_core::Error>()
        .map(dirgate_core::Error::code)
        .unwrap_or("error")
}

/// Process exit status for a failed command
///
/// 1: the directory refused, 2: bad configuration or input,
/// 3: the directory could not be reached.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    use dirgate_core::Error;

    match err.downcast_ref::<Error>() {
        Some(Error::Configuration(_) | Error::Encoding(_) | Error::Input(_)) => 2,
        Some(e) if e.is_transient() => 3,
        _ => 1,
    }
}

pub fn error_json(operation: &str, err: &anyhow::Error) -> Value {
    json!({
        "operation": operation,
        "status": "error",
        "code": error_code(err),
        "message": err.to_string(),
    })
}

pub fn error_text(err: &anyhow::Error) -> String {
    format!("{} {} ({})", "✗".red(), err, error_code(err))
}
