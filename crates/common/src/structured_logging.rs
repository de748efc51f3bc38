use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::io::{self, Write};
use std::str::FromStr;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

/// One log record in JSON form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredLogEntry {
    /// ISO 8601 timestamp
    pub timestamp: String,
    pub level: String,
    /// Emitting module
    pub target: String,
    pub message: String,
    /// Remaining event fields
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ExecutionContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceMetrics>,
}

/// Process context attached to JSON log records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub app_version: String,
    pub hostname: String,
    pub pid: u32,
    pub thread_id: String,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            hostname: hostname::get()
                .map(|h| h.to_string_lossy().to_string())
                .unwrap_or_else(|_| "unknown".to_string()),
            pid: std::process::id(),
            thread_id: format!("{:?}", std::thread::current().id()),
        }
    }
}

/// Timing fields lifted out of an event when present
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub duration_ms: Option<u64>,
    pub items_processed: Option<u64>,
    pub attempts: Option<u64>,
}

/// Layer that prints one `StructuredLogEntry` per event to stderr
pub struct JsonFormatter {
    include_context: bool,
}

impl<S> Layer<S> for JsonFormatter
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);

        let performance = visitor.extract_performance_metrics();

        let entry = StructuredLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            level: level_name(event.metadata().level()).to_string(),
            target: event.metadata().target().to_string(),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
            context: self.include_context.then(ExecutionContext::default),
            performance,
        };

        if let Ok(json) = serde_json::to_string(&entry) {
            let _ = writeln!(io::stderr(), "{}", json);
        }
    }
}

fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARN",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

#[derive(Default)]
struct JsonVisitor {
    message: Option<String>,
    fields: HashMap<String, Value>,
}

impl Visit for JsonVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(
                field.name().to_string(),
                Value::String(format!("{:?}", value)),
            );
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), Value::Number(value.into()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), Value::Number(value.into()));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Some(n) = serde_json::Number::from_f64(value) {
            self.fields.insert(field.name().to_string(), Value::Number(n));
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), Value::Bool(value));
    }
}

impl JsonVisitor {
    fn extract_performance_metrics(&self) -> Option<PerformanceMetrics> {
        let metrics = PerformanceMetrics {
            duration_ms: self.get_u64_field("duration_ms"),
            items_processed: self.get_u64_field("items_count"),
            attempts: self.get_u64_field("attempts"),
        };

        if metrics.duration_ms.is_some()
            || metrics.items_processed.is_some()
            || metrics.attempts.is_some()
        {
            Some(metrics)
        } else {
            None
        }
    }

    fn get_u64_field(&self, name: &str) -> Option<u64> {
        self.fields.get(name).and_then(|v| v.as_u64())
    }
}

/// Logging setup. `RUST_LOG` overrides `level` when set.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    /// One JSON object per line instead of the human format
    pub json_output: bool,
    /// ANSI colours (human format only)
    pub color_output: bool,
    pub include_context: bool,
    pub include_line_numbers: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            json_output: false,
            color_output: true,
            include_context: true,
            include_line_numbers: cfg!(debug_assertions),
        }
    }
}

impl LoggingConfig {
    pub fn with_level(mut self, level: &str) -> anyhow::Result<Self> {
        self.level = Level::from_str(level)
            .map_err(|_| anyhow::anyhow!("Invalid log level: {level}"))?;
        Ok(self)
    }

    pub fn with_json_output(mut self, json_output: bool) -> Self {
        self.json_output = json_output;
        self
    }

    pub fn with_color(mut self, color_output: bool) -> Self {
        self.color_output = color_output;
        self
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays usable
/// for command output.
pub fn init_structured_logging(config: LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    if config.json_output {
        let json_layer = JsonFormatter {
            include_context: config.include_context,
        };

        let subscriber = Registry::default().with(env_filter).with(json_layer);

        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .with_line_number(config.include_line_numbers)
            .with_ansi(config.color_output)
            .with_span_events(FmtSpan::CLOSE);

        let subscriber = Registry::default().with(env_filter).with(fmt_layer);

        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}

/// Measures an operation and logs its duration on completion
pub struct OperationTimer {
    start: std::time::Instant,
    operation_name: String,
    items_count: Option<u64>,
    fields: HashMap<String, Value>,
}

impl OperationTimer {
    pub fn new(operation_name: impl Into<String>) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation_name: operation_name.into(),
            items_count: None,
            fields: HashMap::new(),
        }
    }

    pub fn add_field(&mut self, key: impl Into<String>, value: impl Serialize) {
        if let Ok(v) = serde_json::to_value(value) {
            self.fields.insert(key.into(), v);
        }
    }

    /// Logged as a top-level `items_count` so it lands in `performance`
    pub fn set_items_count(&mut self, count: usize) {
        self.items_count = Some(count as u64);
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    pub fn finish(self) {
        tracing::info!(
            operation = %self.operation_name,
            duration_ms = self.elapsed_ms(),
            items_count = self.items_count,
            success = true,
            fields = ?self.fields,
            "Operation completed"
        );
    }

    pub fn finish_with_result<T, E: std::fmt::Display>(self, result: &Result<T, E>) {
        let duration_ms = self.elapsed_ms();

        match result {
            Ok(_) => {
                tracing::info!(
                    operation = %self.operation_name,
                    duration_ms = duration_ms,
                    items_count = self.items_count,
                    success = true,
                    fields = ?self.fields,
                    "Operation completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    operation = %self.operation_name,
                    duration_ms = duration_ms,
                    items_count = self.items_count,
                    success = false,
                    error = %e,
                    fields = ?self.fields,
                    "Operation failed"
                );
            }
        }
    }
}

/// Correlates the log lines of one evaluation request
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub subject_area: Option<String>,
    pub start_time: std::time::Instant,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            subject_area: None,
            start_time: std::time::Instant::now(),
        }
    }

    pub fn with_subject_area(mut self, subject_area: impl Into<String>) -> Self {
        self.subject_area = Some(subject_area.into());
        self
    }

    /// Span carrying the request id; enter it around request work
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "request",
            request_id = %self.request_id,
            subject_area = self.subject_area.as_deref().unwrap_or("all")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_log_entry_serialization() {
        let mut fields = HashMap::new();
        fields.insert("kpi".to_string(), Value::String("CSSR".to_string()));

        let entry = StructuredLogEntry {
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            level: "INFO".to_string(),
            target: "domain::services".to_string(),
            message: "Enriched KPI".to_string(),
            fields,
            context: Some(ExecutionContext::default()),
            performance: Some(PerformanceMetrics {
                duration_ms: Some(100),
                items_processed: Some(4),
                attempts: None,
            }),
        };

        let json = serde_json::to_string_pretty(&entry).unwrap();
        assert!(json.contains("timestamp"));
        assert!(json.contains("\"kpi\": \"CSSR\""));
        assert!(json.contains("duration_ms"));
    }

    #[test]
    fn test_performance_metrics_only_when_present() {
        let mut visitor = JsonVisitor::default();
        assert!(visitor.extract_performance_metrics().is_none());

        visitor
            .fields
            .insert("duration_ms".to_string(), Value::Number(12u64.into()));
        let metrics = visitor.extract_performance_metrics().unwrap();
        assert_eq!(metrics.duration_ms, Some(12));
        assert_eq!(metrics.items_processed, None);
    }

    #[test]
    fn test_logging_config_level() {
        let config = LoggingConfig::default().with_level("debug").unwrap();
        assert_eq!(config.level, Level::DEBUG);
        assert!(LoggingConfig::default().with_level("loud").is_err());
    }

    /// Runs the JSON visitor over every event and keeps the lifted metrics
    #[derive(Clone, Default)]
    struct CapturePerformance {
        captured: std::sync::Arc<std::sync::Mutex<Vec<Option<PerformanceMetrics>>>>,
    }

    impl<S: Subscriber> Layer<S> for CapturePerformance {
        fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
            let mut visitor = JsonVisitor::default();
            event.record(&mut visitor);
            self.captured
                .lock()
                .unwrap()
                .push(visitor.extract_performance_metrics());
        }
    }

    fn capture_timer_events(run: impl FnOnce()) -> Vec<Option<PerformanceMetrics>> {
        let capture = CapturePerformance::default();
        let subscriber = Registry::default().with(capture.clone());
        tracing::subscriber::with_default(subscriber, run);
        let captured = capture.captured.lock().unwrap().clone();
        captured
    }

    #[test]
    fn test_operation_timer() {
        let mut timer = OperationTimer::new("enrich_batch");
        timer.set_items_count(3);
        timer.add_field("subject_area", "Integrity");
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(timer.elapsed_ms() >= 5);

        let events = capture_timer_events(|| {
            let result: Result<(), String> = Err("boom".to_string());
            timer.finish_with_result(&result);
        });

        assert_eq!(events.len(), 1);
        let metrics = events[0].clone().unwrap();
        assert_eq!(metrics.items_processed, Some(3));
        assert!(metrics.duration_ms.unwrap() >= 5);
    }

    #[test]
    fn test_timer_without_items_count_omits_it() {
        let timer = OperationTimer::new("check_config");

        let events = capture_timer_events(|| timer.finish());

        let metrics = events[0].clone().unwrap();
        assert!(metrics.duration_ms.is_some());
        assert_eq!(metrics.items_processed, None);
    }

    #[test]
    fn test_request_context_ids_are_unique() {
        let a = RequestContext::new().with_subject_area("Accessibility");
        let b = RequestContext::new();
        assert_ne!(a.request_id, b.request_id);
        assert_eq!(a.subject_area.as_deref(), Some("Accessibility"));
    }
}
