//! In-memory capture of engine log events for test assertions
//!
//! Events are stored with every field rendered to text and looked up by the
//! canonical keys from `taskvault_core_types::schema`, so tests can ask for
//! "the end event of `load_all`" or "everything logged about this task key"
//! without walking raw field maps.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock};
use taskvault_core_types::schema::{
    FIELD_COMPONENT, FIELD_ERR_CODE, FIELD_EVENT, FIELD_OP, FIELD_TASK_ID,
};
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded event
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    /// Every field, `message` included, rendered as text
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn op(&self) -> Option<&str> {
        self.field(FIELD_OP)
    }

    pub fn event(&self) -> Option<&str> {
        self.field(FIELD_EVENT)
    }

    pub fn component(&self) -> Option<&str> {
        self.field(FIELD_COMPONENT)
    }

    pub fn task_id(&self) -> Option<&str> {
        self.field(FIELD_TASK_ID)
    }

    pub fn err_code(&self) -> Option<&str> {
        self.field(FIELD_ERR_CODE)
    }

    /// A numeric field such as `task_count` or `skipped_count`
    pub fn count(&self, name: &str) -> Option<u64> {
        self.field(name).and_then(|v| v.parse().ok())
    }

    fn is(&self, op: &str, event: &str) -> bool {
        self.op() == Some(op) && self.event() == Some(event)
    }
}

/// Renders every value as text; integers and bools come through `Debug`
struct TextVisitor<'a>(&'a mut BTreeMap<String, String>);

impl Visit for TextVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        event.record(&mut TextVisitor(&mut fields));

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            fields,
        };
        if let Ok(mut events) = self.events.lock() {
            events.push(captured);
        }
    }
}

/// Shared handle onto the captured events
#[derive(Clone)]
pub struct TestCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Every event logged under an operation, oldest first
    pub fn for_op(&self, op: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.op() == Some(op))
            .collect()
    }

    /// Every event naming a task key, oldest first
    pub fn for_task(&self, task_id: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.task_id() == Some(task_id))
            .collect()
    }

    /// Most recent `event` (start / end / end_error) of `op`
    pub fn find(&self, op: &str, event: &str) -> Option<CapturedEvent> {
        self.events().into_iter().rev().find(|e| e.is(op, event))
    }

    /// As [`TestCapture::find`], panicking with the captured op names when absent
    ///
    /// # Panics
    ///
    /// Panics if no such event was captured.
    pub fn expect_event(&self, op: &str, event: &str) -> CapturedEvent {
        match self.find(op, event) {
            Some(found) => found,
            None => {
                let seen: Vec<String> = self
                    .events()
                    .iter()
                    .filter_map(|e| Some(format!("{}:{}", e.op()?, e.event()?)))
                    .collect();
                panic!("no {}:{} event; captured {:?}", op, event, seen)
            }
        }
    }

    /// `err_code` of every failed run of `op`
    pub fn error_codes(&self, op: &str) -> Vec<String> {
        self.for_op(op)
            .iter()
            .filter_map(|e| e.err_code().map(str::to_string))
            .collect()
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture subscriber for this process and return its handle
///
/// Tests in one binary share the handle; look events up by an op name or
/// task key unique to the test.
///
/// # Example
///
/// ```
/// use taskvault_core::logging_facility::test_capture::init_test_capture;
/// use taskvault_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_capture", task_count = 2);
/// let start = capture.expect_event("doc_capture", "start");
/// assert_eq!(start.count("task_count"), Some(2));
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let events = Arc::new(Mutex::new(Vec::new()));
            let layer = CaptureLayer {
                events: events.clone(),
            };
            tracing_subscriber::registry().with(layer).init();
            TestCapture { events }
        })
        .clone()
}
