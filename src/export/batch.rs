use crate::{
    assets::decode::{SourceImage, load_image},
    export::{
        pacing::{Pacer, PacingPolicy},
        run::{CancelToken, ExportController, ReentryPolicy},
        sink::{DownloadSink, download_file_name},
        status::{ExportStatus, StatusSink},
    },
    form::{
        fields::{RenderParams, StampForm},
        lines::TextLines,
    },
    foundation::error::{StampError, StampResult},
    render::{backend::CompositeBackend, png::encode_png},
};

/// Where an export run sends its output.
pub struct ExportTargets<'a> {
    /// Receives one PNG per line.
    pub sink: &'a mut dyn DownloadSink,
    /// Receives status updates.
    pub status: &'a mut dyn StatusSink,
    /// Performs the wait between items.
    pub pacer: &'a mut dyn Pacer,
}

/// Summary of a finished run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportReport {
    /// Images handed to the sink.
    pub exported: usize,
    /// Lines in the input.
    pub total: usize,
}

/// Exports one image per text line, strictly one after another.
#[derive(Clone, Debug, Default)]
pub struct BatchExporter {
    controller: ExportController,
    reentry: ReentryPolicy,
    pacing: PacingPolicy,
}

impl BatchExporter {
    /// Exporter with the given pacing and the default `Reject` re-entry policy.
    pub fn new(pacing: PacingPolicy) -> Self {
        Self {
            controller: ExportController::new(),
            reentry: ReentryPolicy::default(),
            pacing,
        }
    }

    /// Change how a re-trigger during a run is handled.
    pub fn with_reentry(mut self, reentry: ReentryPolicy) -> Self {
        self.reentry = reentry;
        self
    }

    /// Shared run guard; clone it to cancel or inspect from another thread.
    pub fn controller(&self) -> &ExportController {
        &self.controller
    }

    /// Pacing between items.
    pub fn pacing(&self) -> PacingPolicy {
        self.pacing
    }

    /// Validate the form, decode the image once, then export every line.
    #[tracing::instrument(skip_all)]
    pub fn export(
        &self,
        form: &StampForm,
        backend: &mut dyn CompositeBackend,
        targets: ExportTargets<'_>,
    ) -> StampResult<ExportReport> {
        let ticket = self.controller.begin(self.reentry)?;
        let total = TextLines::parse(&form.text).len();
        targets.status.publish(&ExportStatus::Started { total });

        let prepared = form
            .validate()
            .and_then(|form| Ok((load_image(&form.image)?, form)));
        let (image, form) = match prepared {
            Ok(p) => p,
            Err(e) => {
                targets.status.publish(&ExportStatus::Failed {
                    completed: 0,
                    total,
                    reason: e.to_string(),
                });
                return Err(e);
            }
        };

        run_lines(
            &image,
            &form.lines,
            &form.params,
            backend,
            targets,
            self.pacing,
            ticket.cancel_token(),
        )
    }

    /// Export every line over an already decoded image. Publishes `Started` itself.
    pub fn export_image(
        &self,
        image: &SourceImage,
        lines: &TextLines,
        params: &RenderParams,
        backend: &mut dyn CompositeBackend,
        targets: ExportTargets<'_>,
    ) -> StampResult<ExportReport> {
        let ticket = self.controller.begin(self.reentry)?;
        targets.status.publish(&ExportStatus::Started { total: lines.len() });
        run_lines(
            image,
            lines,
            params,
            backend,
            targets,
            self.pacing,
            ticket.cancel_token(),
        )
    }
}

fn run_lines(
    image: &SourceImage,
    lines: &TextLines,
    params: &RenderParams,
    backend: &mut dyn CompositeBackend,
    targets: ExportTargets<'_>,
    pacing: PacingPolicy,
    cancel: &CancelToken,
) -> StampResult<ExportReport> {
    let ExportTargets {
        sink,
        status,
        pacer,
    } = targets;
    let total = lines.len();
    let mut completed = 0usize;

    for line in lines.iter() {
        if cancel.is_cancelled() {
            status.publish(&ExportStatus::Cancelled { completed, total });
            return Err(StampError::Cancelled);
        }

        let exported = backend
            .render_composite(image, line, params)
            .and_then(|frame| encode_png(&frame))
            .and_then(|png| sink.download(&download_file_name(line), &png));
        if let Err(e) = exported {
            status.publish(&ExportStatus::Failed {
                completed,
                total,
                reason: e.to_string(),
            });
            return Err(e);
        }

        completed += 1;
        tracing::debug!(completed, total, line, "exported line");
        status.publish(&ExportStatus::Progress { completed, total });

        if completed < total && !pacer.wait(pacing.delay_per_item, cancel) {
            status.publish(&ExportStatus::Cancelled { completed, total });
            return Err(StampError::Cancelled);
        }
    }

    tracing::info!(exported = completed, "export finished");
    status.publish(&ExportStatus::Finished {
        exported: completed,
    });
    Ok(ExportReport {
        exported: completed,
        total,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/export/batch.rs"]
mod tests;
