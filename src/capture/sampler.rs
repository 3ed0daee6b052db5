//! Fixed-rate extraction of still frames from a live capture target.
//!
//! Sampling is best-effort and never blocks the timer path: a tick publishes
//! the latest snapshot into a single-value slot, and a separate drain task
//! decodes whatever is newest onto the encoder surface. A snapshot that is
//! overtaken before it is decoded is simply dropped; no frame queue is kept.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use anyhow::Context as _;
use tokio::sync::watch;

use crate::{
    capture::target::{CaptureTarget, SvgSnapshot},
    encode::session::Surface,
    foundation::error::{ChartcastError, ChartcastResult},
};

/// Pulls snapshots from a [`CaptureTarget`] on each tick.
pub struct FrameSampler {
    target: Arc<dyn CaptureTarget>,
    tx: watch::Sender<Option<SvgSnapshot>>,
    sampled: AtomicU64,
}

/// Receiving side of the sampler's latest-snapshot slot.
pub struct SnapshotStream {
    rx: watch::Receiver<Option<SvgSnapshot>>,
}

impl FrameSampler {
    /// Create a sampler and the stream its snapshots are drained from.
    pub fn new(target: Arc<dyn CaptureTarget>) -> (Self, SnapshotStream) {
        let (tx, rx) = watch::channel(None);
        (
            Self {
                target,
                tx,
                sampled: AtomicU64::new(0),
            },
            SnapshotStream { rx },
        )
    }

    /// One sampling tick. A target with nothing renderable is skipped silently.
    pub fn sample(&self) {
        let Some(snapshot) = self.target.snapshot() else {
            return;
        };
        self.sampled.fetch_add(1, Ordering::Relaxed);
        // Overwrites any snapshot the drain task has not picked up yet.
        let _ = self.tx.send(Some(snapshot));
    }

    /// Number of snapshots taken so far.
    pub fn frames_sampled(&self) -> u64 {
        self.sampled.load(Ordering::Relaxed)
    }
}

impl SnapshotStream {
    /// Decode snapshots onto `surface` until the sampler is dropped.
    ///
    /// Decoding happens off the timer path via `spawn_blocking`; a decode
    /// failure is logged and the frame skipped rather than failing the
    /// session.
    pub async fn drive_surface(mut self, surface: Arc<Surface>) {
        loop {
            if self.rx.changed().await.is_err() {
                // Sampler dropped; session is finalizing.
                return;
            }
            let Some(snapshot) = self.rx.borrow_and_update().clone() else {
                continue;
            };

            let surface = Arc::clone(&surface);
            let applied = tokio::task::spawn_blocking(move || {
                let (w, h) = surface.dimensions();
                let rgba = rasterize_snapshot(&snapshot, w, h)?;
                surface.present(&rgba)
            })
            .await;

            match applied {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!(error = %e, "dropping frame: snapshot decode failed"),
                Err(e) => tracing::warn!(error = %e, "dropping frame: decode task failed"),
            }
        }
    }
}

/// Rasterize an SVG snapshot to opaque RGBA8 at exactly `width` x `height`.
///
/// The vector content is scaled to fill the surface, then flattened over a
/// white background since the encoder has no alpha channel.
pub fn rasterize_snapshot(
    snapshot: &SvgSnapshot,
    width: u32,
    height: u32,
) -> ChartcastResult<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(ChartcastError::validation(
            "rasterize target must be non-zero sized",
        ));
    }

    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(&snapshot.svg, &opts).context("parse svg snapshot")?;

    let size = tree.size();
    if !(size.width() > 0.0 && size.height() > 0.0) {
        return Err(ChartcastError::validation("svg snapshot has zero size"));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ChartcastError::encode("failed to allocate snapshot pixmap"))?;

    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(&tree, xform, &mut pixmap.as_mut());

    let mut rgba = pixmap.data().to_vec();
    flatten_premul_over_white(&mut rgba);
    Ok(rgba)
}

/// Flatten premultiplied RGBA8 over opaque white, in place.
fn flatten_premul_over_white(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        let inv = 255u16 - a;
        px[0] = (px[0] as u16 + mul_div255(255, inv)).min(255) as u8;
        px[1] = (px[1] as u16 + mul_div255(255, inv)).min(255) as u8;
        px[2] = (px[2] as u16 + mul_div255(255, inv)).min(255) as u8;
        px[3] = 255;
    }
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/capture/sampler.rs"]
mod tests;
