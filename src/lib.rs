//! textstamp draws one line of text onto an image.
//!
//! Two entry points share one rendering routine ([`CompositeBackend::render_composite`]):
//!
//! - [`Previewer`] renders the first line of a text block onto a persistent preview surface.
//! - [`BatchExporter`] renders every line into its own PNG named `"{line}.png"`, handing them
//!   to a [`DownloadSink`] one at a time with a fixed delay in between, and reports progress
//!   through a [`StatusSink`] as `"{completed} / {total}"`.
//!
//! Form values arrive as plain strings ([`FormFields`]). [`FormFields::coerce`] reproduces
//! browser form coercion (non-numbers become `None`, which the renderer treats as "draw no
//! text"); [`FormFields::validate`] is the strict path both entry points use and names the
//! offending field on failure.
//!
//! Exports are strictly sequential. An [`ExportController`] rejects or supersedes a second
//! run while one is in flight, and a [`CancelToken`] stops a superseded run before its next
//! item.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod export;
mod form;
mod foundation;
mod preview;
mod render;

pub use assets::color::parse_css_color;
pub use assets::decode::{SourceImage, decode_image, load_image};
pub use assets::fonts::{FontLibrary, FontLibraryOpts, ResolvedFont};
pub use assets::text::{TextBrushRgba8, TextLayoutEngine};
pub use config::{PartialFields, ToolConfig};
pub use export::batch::{BatchExporter, ExportReport, ExportTargets};
pub use export::pacing::{NoDelay, Pacer, PacingPolicy, ThreadPacer};
pub use export::run::{CancelToken, ExportController, ReentryPolicy, RunTicket};
pub use export::sink::{DirectorySink, Download, DownloadSink, InMemorySink, download_file_name};
pub use export::status::{ExportStatus, NullStatus, StatusLog, StatusSink};
pub use form::fields::{
    FALLBACK_FONT_SIZE_PX, FormFields, RenderParams, StampForm, ValidatedForm, parse_int_prefix,
};
pub use form::lines::TextLines;
pub use foundation::core::Rgba8Premul;
pub use foundation::error::{StampError, StampResult};
pub use preview::Previewer;
pub use render::backend::{CompositeBackend, FrameRGBA};
pub use render::cpu::CpuCompositor;
pub use render::png::{encode_png, write_png};
