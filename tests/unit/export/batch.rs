use std::{
    sync::{Arc, mpsc},
    time::Duration,
};

use super::*;
use crate::{
    export::{
        pacing::NoDelay,
        sink::InMemorySink,
        status::StatusLog,
    },
    form::fields::FormFields,
    render::backend::FrameRGBA,
};

#[derive(Default)]
struct RecordingBackend {
    texts: Vec<String>,
}

impl CompositeBackend for RecordingBackend {
    fn render_composite(
        &mut self,
        image: &SourceImage,
        text: &str,
        _params: &RenderParams,
    ) -> StampResult<FrameRGBA> {
        self.texts.push(text.to_string());
        Ok(FrameRGBA::from_image(image))
    }
}

struct FailingSink {
    fail_at: usize,
    seen: usize,
}

impl DownloadSink for FailingSink {
    fn download(&mut self, _file_name: &str, _png: &[u8]) -> StampResult<()> {
        self.seen += 1;
        if self.seen == self.fail_at {
            return Err(StampError::render("disk full"));
        }
        Ok(())
    }
}

struct CancellingPacer;

impl Pacer for CancellingPacer {
    fn wait(&mut self, _delay: Duration, cancel: &CancelToken) -> bool {
        cancel.cancel();
        !cancel.is_cancelled()
    }
}

struct BlockingPacer {
    waiting: mpsc::Sender<()>,
}

impl Pacer for BlockingPacer {
    fn wait(&mut self, _delay: Duration, cancel: &CancelToken) -> bool {
        let _ = self.waiting.send(());
        !cancel.wait_timeout(Duration::from_secs(10))
    }
}

fn image() -> SourceImage {
    SourceImage {
        width: 2,
        height: 2,
        rgba8_premul: Arc::new(vec![255; 16]),
    }
}

fn params() -> RenderParams {
    FormFields::default().coerce()
}

fn texts(statuses: &[ExportStatus]) -> Vec<String> {
    statuses.iter().map(ToString::to_string).collect()
}

#[test]
fn exports_every_line_in_order_with_one_wait_between_items() {
    let exporter = BatchExporter::new(PacingPolicy::default());
    let mut backend = RecordingBackend::default();
    let mut sink = InMemorySink::new();
    let log = StatusLog::new();
    let mut pacer = NoDelay::new();

    let report = exporter
        .export_image(
            &image(),
            &TextLines::parse("A\nB"),
            &params(),
            &mut backend,
            ExportTargets {
                sink: &mut sink,
                status: &mut &log,
                pacer: &mut pacer,
            },
        )
        .unwrap();

    assert_eq!(report, ExportReport { exported: 2, total: 2 });
    assert_eq!(backend.texts, vec!["A", "B"]);
    assert_eq!(sink.file_names(), vec!["A.png", "B.png"]);
    assert_eq!(pacer.requested(), &[Duration::from_millis(500)]);
    assert_eq!(
        texts(&log.entries()),
        vec!["0 / 2", "1 / 2", "2 / 2", "Done: exported 2 images."]
    );
    assert!(!exporter.controller().is_running());
}

#[test]
fn zero_lines_completes_immediately() {
    let exporter = BatchExporter::new(PacingPolicy::default());
    let mut backend = RecordingBackend::default();
    let mut sink = InMemorySink::new();
    let log = StatusLog::new();
    let mut pacer = NoDelay::new();

    let report = exporter
        .export_image(
            &image(),
            &TextLines::parse(""),
            &params(),
            &mut backend,
            ExportTargets {
                sink: &mut sink,
                status: &mut &log,
                pacer: &mut pacer,
            },
        )
        .unwrap();

    assert_eq!(report.exported, 0);
    assert!(sink.downloads().is_empty());
    assert!(pacer.requested().is_empty());
    assert_eq!(
        texts(&log.entries()),
        vec!["0 / 0", "Done: exported 0 images."]
    );
}

#[test]
fn empty_line_still_downloads() {
    let exporter = BatchExporter::new(PacingPolicy::immediate());
    let mut backend = RecordingBackend::default();
    let mut sink = InMemorySink::new();
    let mut pacer = NoDelay::new();
    let mut status = crate::export::status::NullStatus;

    exporter
        .export_image(
            &image(),
            &TextLines::parse("x\n\ny"),
            &params(),
            &mut backend,
            ExportTargets {
                sink: &mut sink,
                status: &mut status,
                pacer: &mut pacer,
            },
        )
        .unwrap();

    assert_eq!(sink.file_names(), vec!["x.png", ".png", "y.png"]);
    assert_eq!(pacer.requested(), &[Duration::ZERO, Duration::ZERO]);
}

#[test]
fn sink_failure_stops_the_run_without_skipping_counts() {
    let exporter = BatchExporter::new(PacingPolicy::immediate());
    let mut backend = RecordingBackend::default();
    let mut sink = FailingSink {
        fail_at: 2,
        seen: 0,
    };
    let log = StatusLog::new();
    let mut pacer = NoDelay::new();

    let err = exporter
        .export_image(
            &image(),
            &TextLines::parse("a\nb\nc"),
            &params(),
            &mut backend,
            ExportTargets {
                sink: &mut sink,
                status: &mut &log,
                pacer: &mut pacer,
            },
        )
        .unwrap_err();

    assert!(err.to_string().contains("disk full"));
    let entries = log.entries();
    assert_eq!(texts(&entries[..2]), vec!["0 / 3", "1 / 3"]);
    assert!(matches!(
        entries.last(),
        Some(ExportStatus::Failed { completed: 1, total: 3, .. })
    ));
    assert_eq!(backend.texts, vec!["a", "b"]);
}

#[test]
fn cancellation_during_pacing_ends_the_run() {
    let exporter = BatchExporter::new(PacingPolicy::default());
    let mut backend = RecordingBackend::default();
    let mut sink = InMemorySink::new();
    let log = StatusLog::new();

    let err = exporter
        .export_image(
            &image(),
            &TextLines::parse("a\nb"),
            &params(),
            &mut backend,
            ExportTargets {
                sink: &mut sink,
                status: &mut &log,
                pacer: &mut CancellingPacer,
            },
        )
        .unwrap_err();

    assert!(matches!(err, StampError::Cancelled));
    assert_eq!(sink.file_names(), vec!["a.png"]);
    assert_eq!(
        log.entries().last(),
        Some(&ExportStatus::Cancelled {
            completed: 1,
            total: 2
        })
    );
    assert!(!exporter.controller().is_running());
}

#[test]
fn retrigger_while_running_is_rejected() {
    let exporter = BatchExporter::new(PacingPolicy::immediate());
    let _running = exporter.controller().begin(ReentryPolicy::Reject).unwrap();

    let mut backend = RecordingBackend::default();
    let mut sink = InMemorySink::new();
    let log = StatusLog::new();
    let mut pacer = NoDelay::new();

    let err = exporter
        .export_image(
            &image(),
            &TextLines::parse("a"),
            &params(),
            &mut backend,
            ExportTargets {
                sink: &mut sink,
                status: &mut &log,
                pacer: &mut pacer,
            },
        )
        .unwrap_err();

    assert!(matches!(err, StampError::ExportBusy));
    assert!(log.entries().is_empty());
    assert!(sink.downloads().is_empty());
}

#[test]
fn missing_image_is_reported_as_failed_status() {
    let exporter = BatchExporter::new(PacingPolicy::immediate());
    let mut backend = RecordingBackend::default();
    let mut sink = InMemorySink::new();
    let log = StatusLog::new();
    let mut pacer = NoDelay::new();

    let form = StampForm {
        image: None,
        text: "a\nb".to_string(),
        fields: FormFields::default(),
    };
    let err = exporter
        .export(
            &form,
            &mut backend,
            ExportTargets {
                sink: &mut sink,
                status: &mut &log,
                pacer: &mut pacer,
            },
        )
        .unwrap_err();

    assert!(matches!(err, StampError::Validation(_)));
    assert!(sink.downloads().is_empty());
    let entries = log.entries();
    assert_eq!(entries[0], ExportStatus::Started { total: 2 });
    assert!(matches!(
        entries.last(),
        Some(ExportStatus::Failed { completed: 0, total: 2, .. })
    ));
}

#[test]
fn superseding_run_cancels_the_one_in_flight() {
    let exporter = BatchExporter::new(PacingPolicy::default()).with_reentry(ReentryPolicy::Supersede);
    let first_log = StatusLog::new();
    let (tx, rx) = mpsc::channel();

    std::thread::scope(|s| {
        let exporter = &exporter;
        let first_log = &first_log;
        let first = s.spawn(move || {
            let mut backend = RecordingBackend::default();
            let mut sink = InMemorySink::new();
            let mut pacer = BlockingPacer { waiting: tx };
            exporter
                .export_image(
                    &image(),
                    &TextLines::parse("a\nb\nc"),
                    &params(),
                    &mut backend,
                    ExportTargets {
                        sink: &mut sink,
                        status: &mut &*first_log,
                        pacer: &mut pacer,
                    },
                )
                .map(|_| ())
                .map_err(|e| {
                    let files: Vec<String> =
                        sink.file_names().into_iter().map(str::to_string).collect();
                    (e, files)
                })
        });

        // The first run is now parked in its pacing wait after "a".
        rx.recv().unwrap();

        let mut backend = RecordingBackend::default();
        let mut sink = InMemorySink::new();
        let second_log = StatusLog::new();
        let mut pacer = NoDelay::new();
        let report = exporter
            .export_image(
                &image(),
                &TextLines::parse("x"),
                &params(),
                &mut backend,
                ExportTargets {
                    sink: &mut sink,
                    status: &mut &second_log,
                    pacer: &mut pacer,
                },
            )
            .unwrap();
        assert_eq!(report.exported, 1);
        assert_eq!(sink.file_names(), vec!["x.png"]);
        assert_eq!(
            second_log.current_text().as_deref(),
            Some("Done: exported 1 images.")
        );

        let (err, first_files) = first.join().unwrap().unwrap_err();
        assert!(matches!(err, StampError::Cancelled));
        assert_eq!(first_files, vec!["a.png"]);
    });

    assert_eq!(
        first_log.current_text().as_deref(),
        Some("Cancelled after 1 / 3")
    );
    assert!(!exporter.controller().is_running());
}
