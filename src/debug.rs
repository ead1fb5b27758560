use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Name of the environment variable that switches on debug logging. Its
/// value is the target file path.
pub const DEBUG_LOG_ENV: &str = "LINOCUT_DEBUG_LOG";

/// JSON-lines debug writer plus named saturating counters. Clones share
/// one sink; a disabled log (the default) turns every call into a no-op.
#[derive(Clone, Default)]
pub struct DebugLog {
    inner: Option<Arc<Mutex<DebugState>>>,
}

struct DebugState {
    writer: BufWriter<File>,
    counters: HashMap<String, u64>,
}

impl DebugLog {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn to_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            inner: Some(Arc::new(Mutex::new(DebugState {
                writer: BufWriter::new(file),
                counters: HashMap::new(),
            }))),
        })
    }

    /// Enabled when `LINOCUT_DEBUG_LOG` names a creatable file, disabled
    /// otherwise (including on create failure).
    pub fn from_env() -> Self {
        match std::env::var(DEBUG_LOG_ENV) {
            Ok(path) if !path.is_empty() => Self::to_file(path).unwrap_or_default(),
            _ => Self::disabled(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub fn log_json(&self, json: &str) {
        if let Some(inner) = &self.inner {
            if let Ok(mut state) = inner.lock() {
                let _ = writeln!(state.writer, "{json}");
            }
        }
    }

    pub fn increment(&self, key: &str, amount: u64) {
        if let Some(inner) = &self.inner {
            if let Ok(mut state) = inner.lock() {
                let entry = state.counters.entry(key.to_string()).or_insert(0);
                *entry = entry.saturating_add(amount);
            }
        }
    }

    /// Drains the counters into one `debug.summary` line.
    pub fn emit_summary(&self, context: &str) {
        let Some(inner) = &self.inner else {
            return;
        };
        if let Ok(mut state) = inner.lock() {
            let mut counters: Vec<(String, u64)> = state.counters.drain().collect();
            counters.sort_by(|a, b| a.0.cmp(&b.0));
            let counts_json = if counters.is_empty() {
                "{}".to_string()
            } else {
                let mut out = String::from("{");
                for (idx, (key, value)) in counters.iter().enumerate() {
                    if idx > 0 {
                        out.push(',');
                    }
                    out.push_str(&format!("\"{}\":{}", json_escape(key), value));
                }
                out.push('}');
                out
            };
            let json = format!(
                "{{\"type\":\"debug.summary\",\"context\":\"{}\",\"counts\":{}}}",
                json_escape(context),
                counts_json
            );
            let _ = writeln!(state.writer, "{json}");
        }
    }

    pub fn flush(&self) {
        if let Some(inner) = &self.inner {
            if let Ok(mut state) = inner.lock() {
                let _ = state.writer.flush();
            }
        }
    }
}

pub(crate) fn json_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}
