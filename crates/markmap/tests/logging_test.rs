//! Failure logging: every block that falls back produces exactly one `error` event carrying the
//! block index.

use markmap::geom::{point, size};
use markmap::{Document, MindmapPage, WidgetConfig};
use std::sync::{Arc, Mutex};
use tracing_subscriber::layer::SubscriberExt;

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    block: Option<u64>,
    message: String,
}

/// A tracing layer that records every event it sees.
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

#[derive(Default)]
struct FieldVisitor {
    block: Option<u64>,
    message: String,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        if field.name() == "block" {
            self.block = Some(value);
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            block: visitor.block,
            message: visitor.message,
        });
    }
}

fn with_captured_events(f: impl FnOnce()) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(EventCapture {
        events: events.clone(),
    });
    tracing::subscriber::with_default(subscriber, f);
    let out = events.lock().unwrap().clone();
    out
}

fn errors(events: &[CapturedEvent]) -> Vec<&CapturedEvent> {
    events
        .iter()
        .filter(|e| e.level == tracing::Level::ERROR)
        .collect()
}

#[test]
fn one_error_per_failed_block() {
    let events = with_captured_events(|| {
        let mut doc = Document::new(size(1024.0, 768.0));
        let body = doc.body();
        for src in [
            "# ok\n## a",
            "---\ntitle: unterminated\n# x",
            "\n\n",
            "# ok too",
            "---\nmarkmap:\n  spacingVertical: -1\n---\n# bad option",
        ] {
            doc.append_code_block(body, "markmap", src);
        }
        let mut page = MindmapPage::new(doc, WidgetConfig::default());
        let report = page.initialize();
        assert_eq!(report.failed(), 3);
    });

    let errors = errors(&events);
    assert_eq!(errors.len(), 3, "{errors:#?}");
    let blocks: Vec<_> = errors.iter().map(|e| e.block).collect();
    assert_eq!(blocks, vec![Some(1), Some(2), Some(4)]);
    assert!(errors.iter().all(|e| e.message.contains("failed to render")));
}

#[test]
fn successful_pages_log_no_errors() {
    let events = with_captured_events(|| {
        let mut doc = Document::new(size(1024.0, 768.0));
        let body = doc.body();
        doc.append_code_block(body, "markmap", "# Root\n## Child A\n## Child B");
        let mut page = MindmapPage::new(doc, WidgetConfig::default());
        page.initialize();
        let svg = page.widget(0).unwrap().inline().surface().element();
        page.click(svg, point(1.0, 1.0));
        page.key_down("Escape");
        page.advance(std::time::Duration::from_millis(200));
    });

    assert!(errors(&events).is_empty());
    assert!(
        events
            .iter()
            .any(|e| e.level == tracing::Level::DEBUG && e.message.contains("overlay opened"))
    );
    assert!(
        events
            .iter()
            .any(|e| e.message.contains("deferred re-fit skipped"))
    );
}
