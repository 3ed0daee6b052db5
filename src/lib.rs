//! Chartcast turns a live, animated chart into a downloadable WebM video.
//!
//! The crate is the recording core of a "describe your data, get an animated
//! chart" application. The chart renderer itself is an external collaborator:
//! anything that can hand us an SVG snapshot of its current frame (a
//! [`CaptureTarget`]) can be recorded.
//!
//! # Pipeline overview
//!
//! 1. **Estimate**: `ChartKind + AnimationProfile + SeriesSet -> expected duration`
//!    ([`estimate_duration`])
//! 2. **Sample**: a fixed-rate timer pulls SVG snapshots from the target
//!    ([`FrameSampler`]) and rasterizes them onto the encoder surface
//! 3. **Encode**: an `ffmpeg`-backed [`EncoderSession`] captures the surface at
//!    the configured frame rate and accumulates WebM chunks
//! 4. **Deliver**: the [`Recorder`] state machine finalizes the session and
//!    resolves the caller's [`RecordingHandle`] with a [`VideoArtifact`]
//!    exactly once
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Estimation never fails**: duration estimation gates a user-visible
//!   action and always produces a usable value.
//! - **No resource leaks on any exit**: every terminal state releases the
//!   encoder process and all timers, including cancellation and error paths.
//! - **Single-resolution completion**: a session's outcome is delivered through
//!   a one-shot channel, so double delivery is impossible by construction.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod analyze;
mod capture;
mod encode;
mod estimate;
mod foundation;
mod model;
mod record;

pub use analyze::api::{
    AnalyzeErrorBody, AnalyzeOutcome, AnalyzeRequest, AnalyzeResponse, parse_analyze_response,
};
pub use capture::sampler::{FrameSampler, SnapshotStream, rasterize_snapshot};
pub use capture::target::{CaptureTarget, SvgSnapshot};
pub use encode::session::{
    ChunkLog, DEFAULT_ARTIFACT_NAME, EncoderConfig, EncoderEngine, EncoderSession, FfmpegVpxEngine,
    Surface, VideoArtifact, WEBM_MIME, is_ffmpeg_on_path,
};
pub use estimate::duration::{
    DEFAULT_BASE_MS, DEFAULT_UPDATE_MS, DURATION_BUFFER_MS, DURATION_FLOOR_MS, FALLBACK_DURATION_MS,
    estimate_duration,
};
pub use foundation::error::{ChartcastError, ChartcastResult};
pub use model::profile::{AnimationProfile, ChartKind, ProfileCatalog};
pub use model::series::{DataPoint, DataSeries, SeriesSet};
pub use record::controller::{Recorder, RecordingHandle, RecordingOpts, SessionState};
