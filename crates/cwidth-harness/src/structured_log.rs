//! Structured JSONL log for resolution runs.
//!
//! Provides:
//! - [`LogEntry`]: one JSONL record with required + optional fields.
//! - [`ArtifactIndex`]: links a run's logs to emitted headers by SHA-256.
//! - [`LogEmitter`]: writes JSONL lines to a file or an in-memory buffer.
//! - [`validate_log_line`] / [`validate_log_file`]: schema checks.
//!
//! Trace ids follow `<component>::<run_id>::<seq>` with a zero-padded,
//! strictly increasing sequence per emitter.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use cwidth_core::{BindOutcome, ResolvedType};

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

pub const DESCRIPTOR_LOADED: &str = "descriptor.loaded";
pub const DESCRIPTOR_MISSING_PARAMETER: &str = "descriptor.missing_parameter";
pub const TYPEDEF_COMMITTED: &str = "typedef.committed";
pub const TYPEDEF_ALREADY_BOUND: &str = "typedef.already_bound";
pub const TYPEDEF_CONFLICT: &str = "typedef.conflict";
pub const TYPEDEF_UNRESOLVED: &str = "typedef.unresolved";
pub const TABLE_RESOLVED: &str = "table.resolved";
pub const TABLE_FAILED: &str = "table.failed";
pub const HEADER_EMITTED: &str = "header.emitted";

pub const EVENTS: [&str; 9] = [
    DESCRIPTOR_LOADED,
    DESCRIPTOR_MISSING_PARAMETER,
    TYPEDEF_COMMITTED,
    TYPEDEF_ALREADY_BOUND,
    TYPEDEF_CONFLICT,
    TYPEDEF_UNRESOLVED,
    TABLE_RESOLVED,
    TABLE_FAILED,
    HEADER_EMITTED,
];

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const OUTCOMES: [&str; 6] = [
    "committed",
    "already_bound",
    "conflict",
    "unresolved",
    "pass",
    "fail",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Result attached to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Committed,
    AlreadyBound,
    Conflict,
    Unresolved,
    Pass,
    Fail,
}

impl From<BindOutcome> for Outcome {
    fn from(outcome: BindOutcome) -> Self {
        match outcome {
            BindOutcome::Committed => Self::Committed,
            BindOutcome::AlreadyBound => Self::AlreadyBound,
        }
    }
}

// ---------------------------------------------------------------------------
// Log entry
// ---------------------------------------------------------------------------

/// Canonical structured log entry.
///
/// Required fields: `timestamp`, `trace_id`, `level`, `event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Descriptor origin (`preset:lp64`, `host`, a file path).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Collaborator header the event belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    /// Canonical type name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed: Option<bool>,
    /// Descriptor parameter involved in a failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_refs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    /// Entry with required fields only.
    #[must_use]
    pub fn new(trace_id: impl Into<String>, level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: now_utc(),
            trace_id: trace_id.into(),
            level,
            event: event.into(),
            component: None,
            source: None,
            header: None,
            symbol: None,
            c_type: None,
            width: None,
            signed: None,
            param: None,
            outcome: None,
            error: None,
            artifact_refs: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Fill `symbol`, `c_type`, `width` and `signed` from a resolution.
    #[must_use]
    pub fn with_resolved(mut self, resolved: &ResolvedType) -> Self {
        self.symbol = Some(resolved.name.clone());
        self.c_type = Some(resolved.c_type().to_string());
        self.width = Some(resolved.width);
        self.signed = Some(resolved.signed);
        self
    }

    #[must_use]
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    #[must_use]
    pub fn with_artifacts(mut self, refs: Vec<String>) -> Self {
        self.artifact_refs = Some(refs);
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Serialize to a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Artifact index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub path: String,
    pub kind: String,
    pub sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

/// Index of the files a run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactIndex {
    pub index_version: u32,
    pub run_id: String,
    pub generated_utc: String,
    pub artifacts: Vec<ArtifactEntry>,
}

impl ArtifactIndex {
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            index_version: 1,
            run_id: run_id.into(),
            generated_utc: now_utc(),
            artifacts: Vec::new(),
        }
    }

    /// Record `bytes` written under `path`.
    pub fn add_bytes(&mut self, path: impl Into<String>, kind: impl Into<String>, bytes: &[u8]) -> &mut Self {
        self.artifacts.push(ArtifactEntry {
            path: path.into(),
            kind: kind.into(),
            sha256: sha256_hex(bytes),
            size_bytes: u64::try_from(bytes.len()).ok(),
        });
        self
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&ArtifactEntry> {
        self.artifacts.iter().find(|entry| entry.path == path)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::Digest;
    use std::fmt::Write as _;

    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        let _ = write!(out, "{b:02x}");
    }
    out
}

// ---------------------------------------------------------------------------
// Log emitter
// ---------------------------------------------------------------------------

/// Writes structured JSONL log entries.
pub struct LogEmitter {
    writer: Box<dyn Write>,
    seq: u64,
    component: String,
    run_id: String,
    emitted: Vec<LogEntry>,
}

impl LogEmitter {
    /// Emitter that writes to a file.
    pub fn to_file(path: &Path, component: &str, run_id: &str) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::to_writer(
            std::io::BufWriter::new(file),
            component,
            run_id,
        ))
    }

    /// Emitter that keeps lines in memory only.
    #[must_use]
    pub fn to_buffer(component: &str, run_id: &str) -> Self {
        Self::to_writer(std::io::sink(), component, run_id)
    }

    pub fn to_writer(writer: impl Write + 'static, component: &str, run_id: &str) -> Self {
        Self {
            writer: Box::new(writer),
            seq: 0,
            component: component.to_string(),
            run_id: run_id.to_string(),
            emitted: Vec::new(),
        }
    }

    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    fn next_trace_id(&mut self) -> String {
        self.seq += 1;
        format!("{}::{}::{:03}", self.component, self.run_id, self.seq)
    }

    /// Start an entry with the next trace id.
    pub fn entry(&mut self, level: LogLevel, event: &str) -> LogEntry {
        let trace_id = self.next_trace_id();
        LogEntry::new(trace_id, level, event).with_component(&self.component)
    }

    /// Emit a bare event.
    pub fn emit(&mut self, level: LogLevel, event: &str) -> std::io::Result<LogEntry> {
        let entry = self.entry(level, event);
        self.emit_entry(entry.clone())?;
        Ok(entry)
    }

    /// Emit a populated entry, filling a missing trace id or component.
    pub fn emit_entry(&mut self, mut entry: LogEntry) -> std::io::Result<()> {
        if entry.trace_id.is_empty() {
            entry.trace_id = self.next_trace_id();
        }
        if entry.component.is_none() {
            entry.component = Some(self.component.clone());
        }
        let line = serde_json::to_string(&entry).map_err(std::io::Error::other)?;
        writeln!(self.writer, "{line}")?;
        self.emitted.push(entry);
        Ok(())
    }

    /// Every entry emitted so far.
    #[must_use]
    pub fn emitted(&self) -> &[LogEntry] {
        &self.emitted
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validation error for a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogValidationError {
    pub line_number: usize,
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for LogValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: field '{}': {}",
            self.line_number, self.field, self.message
        )
    }
}

/// Validate a single JSONL line against the schema.
pub fn validate_log_line(
    line: &str,
    line_number: usize,
) -> Result<LogEntry, Vec<LogValidationError>> {
    let mut errors = Vec::new();
    let mut fail = |field: &str, message: String| {
        errors.push(LogValidationError {
            line_number,
            field: field.to_string(),
            message,
        });
    };

    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            fail("<json>", format!("invalid JSON: {e}"));
            return Err(errors);
        }
    };
    let Some(obj) = value.as_object() else {
        fail("<root>", "expected JSON object".to_string());
        return Err(errors);
    };

    for field in ["timestamp", "trace_id", "level", "event"] {
        if !obj.contains_key(field) {
            fail(field, "required field missing".to_string());
        }
    }

    if let Some(level) = obj.get("level").and_then(|v| v.as_str())
        && !LEVELS.contains(&level)
    {
        fail("level", format!("invalid level: '{level}'"));
    }

    if let Some(outcome) = obj.get("outcome").and_then(|v| v.as_str())
        && !OUTCOMES.contains(&outcome)
    {
        fail("outcome", format!("invalid outcome: '{outcome}'"));
    }

    if let Some(trace_id) = obj.get("trace_id").and_then(|v| v.as_str())
        && trace_id.split("::").count() != 3
    {
        fail(
            "trace_id",
            format!("trace_id should follow <component>::<run_id>::<seq> format, got: '{trace_id}'"),
        );
    }

    if let Some(event) = obj.get("event").and_then(|v| v.as_str()) {
        if !EVENTS.contains(&event) {
            fail("event", format!("unknown event: '{event}'"));
        }
        for &field in required_for(event) {
            if !obj.get(field).is_some_and(|v| !v.is_null()) {
                fail(field, format!("{event} events must include {field}"));
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    serde_json::from_value::<LogEntry>(value).map_err(|e| {
        vec![LogValidationError {
            line_number,
            field: "<deserialization>".to_string(),
            message: format!("failed to deserialize: {e}"),
        }]
    })
}

fn required_for(event: &str) -> &'static [&'static str] {
    match event {
        DESCRIPTOR_LOADED => &["source"],
        DESCRIPTOR_MISSING_PARAMETER => &["param", "error"],
        TYPEDEF_COMMITTED | TYPEDEF_ALREADY_BOUND => {
            &["header", "symbol", "c_type", "width", "outcome"]
        }
        TYPEDEF_CONFLICT => &["symbol", "error"],
        TYPEDEF_UNRESOLVED => &["header", "symbol"],
        TABLE_FAILED => &["error"],
        HEADER_EMITTED => &["header", "artifact_refs"],
        _ => &[],
    }
}

/// Validate an entire JSONL file.
///
/// Returns the non-empty line count and every error found.
pub fn validate_log_file(path: &Path) -> Result<(usize, Vec<LogValidationError>), std::io::Error> {
    let content = std::fs::read_to_string(path)?;
    let mut all_errors = Vec::new();
    let mut line_count = 0;
    let mut last_seq: Option<u64> = None;

    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        line_count += 1;
        match validate_log_line(line, i + 1) {
            Ok(entry) => {
                let seq = entry
                    .trace_id
                    .rsplit("::")
                    .next()
                    .and_then(|s| s.parse::<u64>().ok());
                match (last_seq, seq) {
                    (_, None) => all_errors.push(LogValidationError {
                        line_number: i + 1,
                        field: "trace_id".to_string(),
                        message: "sequence suffix is not a number".to_string(),
                    }),
                    (Some(prev), Some(seq)) if seq <= prev => all_errors.push(LogValidationError {
                        line_number: i + 1,
                        field: "trace_id".to_string(),
                        message: format!("sequence {seq} does not follow {prev}"),
                    }),
                    (_, Some(seq)) => last_seq = Some(seq),
                }
            }
            Err(errs) => all_errors.extend(errs),
        }
    }

    Ok((line_count, all_errors))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
#[must_use]
pub fn now_utc() -> String {
    let duration = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format_utc(duration.as_secs(), duration.subsec_millis())
}

fn format_utc(secs: u64, millis: u32) -> String {
    let days = secs / 86_400;
    let rem = secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{millis:03}Z",
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60,
    )
}

// Days since 1970-01-01 to a proleptic Gregorian date.
fn civil_from_days(days: u64) -> (u64, u64, u64) {
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z % 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + u64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cwidth_core::NativeKind;

    #[test]
    fn log_entry_serializes_required_fields() {
        let entry = LogEntry::new("harness::run-1::001", LogLevel::Info, TABLE_RESOLVED);
        let json = entry.to_jsonl().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed["timestamp"].is_string());
        assert_eq!(parsed["trace_id"], "harness::run-1::001");
        assert_eq!(parsed["level"], "info");
        assert_eq!(parsed["event"], "table.resolved");
        assert!(parsed.get("symbol").is_none());
        assert!(parsed.get("outcome").is_none());
    }

    #[test]
    fn resolved_fields_fill_typedef_context() {
        let resolved = ResolvedType {
            name: String::from("uint64_t"),
            kind: NativeKind::Long,
            width: 64,
            signed: false,
        };
        let entry = LogEntry::new("harness::run-1::002", LogLevel::Info, TYPEDEF_COMMITTED)
            .with_header("stdint")
            .with_resolved(&resolved)
            .with_outcome(BindOutcome::Committed.into());
        let parsed: serde_json::Value = serde_json::from_str(&entry.to_jsonl().unwrap()).unwrap();
        assert_eq!(parsed["symbol"], "uint64_t");
        assert_eq!(parsed["c_type"], "unsigned long");
        assert_eq!(parsed["width"], 64);
        assert_eq!(parsed["signed"], false);
        assert_eq!(parsed["outcome"], "committed");
        assert!(validate_log_line(&entry.to_jsonl().unwrap(), 1).is_ok());
    }

    #[test]
    fn typedef_event_without_symbol_is_rejected() {
        let entry = LogEntry::new("harness::run-1::003", LogLevel::Info, TYPEDEF_COMMITTED)
            .with_header("stddef");
        let errors = validate_log_line(&entry.to_jsonl().unwrap(), 7).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "symbol"));
        assert!(errors.iter().all(|e| e.line_number == 7));
    }

    #[test]
    fn validate_missing_required_field() {
        let json = r#"{"timestamp":"2026-01-01T00:00:00.000Z","level":"info","event":"table.resolved"}"#;
        let errors = validate_log_line(json, 1).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "trace_id"));
    }

    #[test]
    fn validate_rejects_unknown_vocabulary() {
        let json = r#"{"timestamp":"t","trace_id":"a::b::001","level":"critical","event":"table.exploded"}"#;
        let errors = validate_log_line(json, 1).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "level"));
        assert!(errors.iter().any(|e| e.field == "event"));
    }

    #[test]
    fn validate_invalid_json_and_trace_id() {
        let errors = validate_log_line("not json at all", 1).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "<json>"));

        let json = r#"{"timestamp":"t","trace_id":"no-separator","level":"info","event":"table.resolved"}"#;
        let errors = validate_log_line(json, 1).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "trace_id"));
    }

    #[test]
    fn emitter_generates_sequential_trace_ids() {
        let mut emitter = LogEmitter::to_buffer("harness", "run-42");
        let e1 = emitter.emit(LogLevel::Info, DESCRIPTOR_LOADED).unwrap();
        let e2 = emitter.emit(LogLevel::Info, TABLE_RESOLVED).unwrap();
        assert_eq!(e1.trace_id, "harness::run-42::001");
        assert_eq!(e2.trace_id, "harness::run-42::002");
        assert_eq!(emitter.emitted().len(), 2);
        assert_eq!(e1.component.as_deref(), Some("harness"));
    }

    #[test]
    fn artifact_index_hashes_bytes() {
        let mut idx = ArtifactIndex::new("run-001");
        idx.add_bytes("stdint.h", "header", b"abc");
        let entry = idx.get("stdint.h").unwrap();
        assert_eq!(
            entry.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(entry.size_bytes, Some(3));
        let restored = ArtifactIndex::from_json(&idx.to_json().unwrap()).unwrap();
        assert_eq!(restored, idx);
    }

    #[test]
    fn utc_formatting_is_calendar_exact() {
        assert_eq!(format_utc(0, 0), "1970-01-01T00:00:00.000Z");
        // 2000-02-29 12:34:56
        assert_eq!(format_utc(951_827_696, 7), "2000-02-29T12:34:56.007Z");
        assert_eq!(format_utc(1_790_000_000, 0), "2026-09-21T14:13:20.000Z");
    }
}
