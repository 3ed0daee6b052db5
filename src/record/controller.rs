//! Recording orchestration.
//!
//! The [`Recorder`] drives one session at a time through a strict state
//! machine: estimate the animation duration, open and start an encoder
//! session, sample the capture target on one timer while publishing progress
//! on another, then finalize (or abort) and deliver the outcome exactly once.
//!
//! All timers are locals of the session task and cannot outlive it; every
//! exit path, including cancellation, disposal, and target detach, concludes
//! the encoder session so no process or thread leaks.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{oneshot, watch},
    time::{self, Instant, MissedTickBehavior},
};

use crate::{
    capture::{sampler::FrameSampler, target::CaptureTarget},
    encode::session::{EncoderConfig, EncoderEngine, EncoderSession, VideoArtifact},
    estimate::duration::estimate_duration,
    foundation::error::{ChartcastError, ChartcastResult},
    model::{
        profile::{AnimationProfile, ChartKind},
        series::SeriesSet,
    },
};

/// Lifecycle of one recording session. Transitions are strictly forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No session has run yet.
    Idle,
    /// Duration estimated, encoder opening.
    Priming,
    /// Frames are being sampled and encoded.
    Sampling,
    /// Sampling stopped; the encoder is flushing.
    Finalizing,
    /// The artifact was delivered. Terminal.
    Completed,
    /// The session failed; no artifact. Terminal.
    Failed,
    /// The session was disposed of without finalizing. Terminal.
    Cancelled,
}

impl SessionState {
    /// Whether the session has reached a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Tunables for a recording session.
#[derive(Clone, Debug)]
pub struct RecordingOpts {
    /// Sampling and encoding frame rate in Hz.
    pub frame_rate: u32,
    /// Device-pixel scale applied to the target's logical size.
    pub pixel_ratio: u32,
    /// Progress recomputation rate in Hz.
    pub progress_hz: u32,
    /// Target video bitrate in kbit/s.
    pub bitrate_kbps: u32,
}

impl Default for RecordingOpts {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            pixel_ratio: 2,
            progress_hz: 20,
            bitrate_kbps: 8000,
        }
    }
}

/// Starts recording sessions and enforces the one-active-session invariant.
///
/// Must be used from within a Tokio runtime; the session runs as a spawned
/// task on the caller's runtime.
pub struct Recorder {
    opts: RecordingOpts,
    active: Option<watch::Receiver<SessionState>>,
}

impl Recorder {
    /// Recorder with the given options.
    pub fn new(opts: RecordingOpts) -> Self {
        Self { opts, active: None }
    }

    /// Start recording `target` with the production ffmpeg encoder.
    ///
    /// Fails with [`ChartcastError::AlreadyRecording`] while a previous
    /// session is still live, [`ChartcastError::CaptureTargetMissing`] when
    /// the target is detached, and [`ChartcastError::EncoderUnavailable`]
    /// when no encoder can be provided.
    pub fn start(
        &mut self,
        target: Arc<dyn CaptureTarget>,
        series: &SeriesSet,
        kind: ChartKind,
        profile: Option<&AnimationProfile>,
    ) -> ChartcastResult<RecordingHandle> {
        self.start_inner(target, series, kind, profile, None)
    }

    /// Start recording with a caller-supplied encoder engine.
    pub fn start_with_engine(
        &mut self,
        target: Arc<dyn CaptureTarget>,
        series: &SeriesSet,
        kind: ChartKind,
        profile: Option<&AnimationProfile>,
        engine: Box<dyn EncoderEngine>,
    ) -> ChartcastResult<RecordingHandle> {
        self.start_inner(target, series, kind, profile, Some(engine))
    }

    /// Latest state of the most recently started session.
    pub fn session_state(&self) -> SessionState {
        self.active
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or(SessionState::Idle)
    }

    fn start_inner(
        &mut self,
        target: Arc<dyn CaptureTarget>,
        series: &SeriesSet,
        kind: ChartKind,
        profile: Option<&AnimationProfile>,
        engine: Option<Box<dyn EncoderEngine>>,
    ) -> ChartcastResult<RecordingHandle> {
        if let Some(rx) = &self.active {
            if !rx.borrow().is_terminal() {
                return Err(ChartcastError::AlreadyRecording);
            }
        }
        if !target.is_attached() {
            return Err(ChartcastError::CaptureTargetMissing);
        }

        let expected = estimate_duration(kind, profile, series);

        let (w, h) = target.size();
        let cfg = EncoderConfig {
            width: scaled_even(w, self.opts.pixel_ratio),
            height: scaled_even(h, self.opts.pixel_ratio),
            fps: self.opts.frame_rate,
            bitrate_kbps: self.opts.bitrate_kbps,
        };

        let session = match engine {
            Some(engine) => EncoderSession::with_engine(cfg, engine)?,
            None => EncoderSession::open(cfg)?,
        };

        let (state_tx, state_rx) = watch::channel(SessionState::Priming);
        let (progress_tx, progress_rx) = watch::channel(0.0f64);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (done_tx, done_rx) = oneshot::channel();

        tokio::spawn(run_session(
            target,
            expected,
            session,
            self.opts.clone(),
            state_tx,
            progress_tx,
            cancel_rx,
            done_tx,
        ));

        self.active = Some(state_rx.clone());

        Ok(RecordingHandle {
            state_rx,
            progress_rx,
            cancel_tx,
            done_rx,
        })
    }
}

/// Caller's view of one in-flight recording session.
///
/// Dropping the handle without awaiting [`RecordingHandle::wait`] disposes of
/// the session: sampling stops and the encoder is aborted without producing
/// an artifact.
#[derive(Debug)]
pub struct RecordingHandle {
    state_rx: watch::Receiver<SessionState>,
    progress_rx: watch::Receiver<f64>,
    cancel_tx: watch::Sender<bool>,
    done_rx: oneshot::Receiver<Option<VideoArtifact>>,
}

impl RecordingHandle {
    /// Current session state.
    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Current progress fraction in `[0, 1]`, monotonically non-decreasing.
    pub fn progress(&self) -> f64 {
        *self.progress_rx.borrow()
    }

    /// A watch on the progress fraction, for UIs that await changes.
    pub fn progress_watch(&self) -> watch::Receiver<f64> {
        self.progress_rx.clone()
    }

    /// A watch on the session state.
    pub fn state_watch(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Request cancellation. Safe in any state; repeated calls are no-ops.
    ///
    /// A cancelled session finalizes early and delivers the partial
    /// recording, mirroring how stopping a media recorder mid-stream still
    /// yields the footage captured so far.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    /// Await the session outcome: the artifact on success, `None` on failure
    /// or disposal. Resolves exactly once by construction.
    pub async fn wait(self) -> Option<VideoArtifact> {
        let Self {
            done_rx, cancel_tx, ..
        } = self;
        let outcome = done_rx.await.unwrap_or(None);
        // Keep the cancel channel open until resolution so the session task
        // never mistakes a waiting caller for a disposed one.
        drop(cancel_tx);
        outcome
    }
}

/// Round a logical dimension up to an even device-pixel count.
fn scaled_even(logical: u32, ratio: u32) -> u32 {
    let px = logical.saturating_mul(ratio.max(1)).max(2);
    px + (px & 1)
}

enum Exit {
    Elapsed,
    CancelRequested,
    TargetDetached,
    Disposed,
}

#[allow(clippy::too_many_arguments)]
async fn run_session(
    target: Arc<dyn CaptureTarget>,
    expected: Duration,
    mut session: EncoderSession,
    opts: RecordingOpts,
    state_tx: watch::Sender<SessionState>,
    progress_tx: watch::Sender<f64>,
    mut cancel_rx: watch::Receiver<bool>,
    done_tx: oneshot::Sender<Option<VideoArtifact>>,
) {
    if let Err(e) = session.start() {
        tracing::error!(error = %e, "recording failed: encoder would not start");
        session.abort();
        let _ = state_tx.send(SessionState::Failed);
        let _ = done_tx.send(None);
        return;
    }

    let (sampler, stream) = FrameSampler::new(Arc::clone(&target));
    let surface = session.surface();
    let drain = tokio::spawn(stream.drive_surface(Arc::clone(&surface)));

    let _ = state_tx.send(SessionState::Sampling);
    let started_at = Instant::now();
    tracing::info!(
        expected_ms = expected.as_millis() as u64,
        "recording started"
    );

    let mut sample_int = time::interval(Duration::from_secs_f64(1.0 / f64::from(opts.frame_rate)));
    sample_int.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut progress_int =
        time::interval(Duration::from_secs_f64(1.0 / f64::from(opts.progress_hz)));
    progress_int.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let exit = loop {
        tokio::select! {
            _ = sample_int.tick() => {
                if !target.is_attached() {
                    break Exit::TargetDetached;
                }
                sampler.sample();
            }
            _ = progress_int.tick() => {
                let elapsed = started_at.elapsed();
                let frac = (elapsed.as_secs_f64() / expected.as_secs_f64()).min(1.0);
                if frac > *progress_tx.borrow() {
                    let _ = progress_tx.send(frac);
                }
                if elapsed >= expected {
                    break Exit::Elapsed;
                }
            }
            changed = cancel_rx.changed() => {
                match changed {
                    Ok(()) if *cancel_rx.borrow_and_update() => break Exit::CancelRequested,
                    Ok(()) => {}
                    // Every sender is gone: the handle was dropped unseen.
                    Err(_) => break Exit::Disposed,
                }
            }
        }
    };

    // Timers die with the loop. Dropping the sampler lets the drain task
    // apply its last pending frame and exit before the encoder flushes.
    let sampled = sampler.frames_sampled();
    drop(sampler);
    let _ = drain.await;

    match exit {
        Exit::Elapsed | Exit::CancelRequested => {
            let _ = state_tx.send(SessionState::Finalizing);
            if matches!(exit, Exit::CancelRequested) {
                tracing::info!("cancel requested; finalizing partial recording");
            }
            if surface.frames_presented() == 0 {
                tracing::warn!(
                    sampled,
                    "no frames were captured; the artifact will contain blank frames only"
                );
            }

            let finalized = tokio::task::spawn_blocking(move || {
                let res = session.stop();
                if res.is_err() {
                    session.abort();
                }
                res
            })
            .await;

            match finalized {
                Ok(Ok(artifact)) => {
                    if *progress_tx.borrow() < 1.0 {
                        let _ = progress_tx.send(1.0);
                    }
                    let _ = state_tx.send(SessionState::Completed);
                    tracing::info!(bytes = artifact.data.len(), "recording completed");
                    let _ = done_tx.send(Some(artifact));
                }
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "recording failed during finalize");
                    let _ = state_tx.send(SessionState::Failed);
                    let _ = done_tx.send(None);
                }
                Err(e) => {
                    tracing::error!(error = %e, "finalize task panicked");
                    let _ = state_tx.send(SessionState::Failed);
                    let _ = done_tx.send(None);
                }
            }
        }
        Exit::TargetDetached => {
            tracing::error!("capture target detached during sampling");
            let _ = tokio::task::spawn_blocking(move || session.abort()).await;
            let _ = state_tx.send(SessionState::Failed);
            let _ = done_tx.send(None);
        }
        Exit::Disposed => {
            tracing::debug!("recording handle dropped; aborting session");
            let _ = tokio::task::spawn_blocking(move || session.abort()).await;
            let _ = state_tx.send(SessionState::Cancelled);
            let _ = done_tx.send(None);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/record/controller.rs"]
mod tests;
