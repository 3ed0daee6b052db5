//! Video-encoder resource wrapper.
//!
//! An [`EncoderSession`] owns a fixed-size drawing surface and a platform
//! encoder bound to it. The production engine drives the system `ffmpeg`
//! binary over pipes: a paced writer thread pushes the current surface
//! contents at the configured frame rate (emulating a capture stream), and a
//! reader thread appends the resulting WebM chunks to the session's chunk log
//! in encoder-emission order. Finalizing concatenates the chunks into a single
//! downloadable artifact.

use std::{
    io::{Read as _, Write as _},
    process::{Child, Command, Stdio},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    thread::JoinHandle,
    time::{Duration, Instant},
};

use crate::foundation::error::{ChartcastError, ChartcastResult};

/// MIME type of finalized artifacts.
pub const WEBM_MIME: &str = "video/webm";

/// Suggested download filename for finalized artifacts.
pub const DEFAULT_ARTIFACT_NAME: &str = "chart-animation.webm";

/// Encoder configuration for one session.
#[derive(Clone, Debug)]
pub struct EncoderConfig {
    /// Surface width in device pixels.
    pub width: u32,
    /// Surface height in device pixels.
    pub height: u32,
    /// Capture frame rate in Hz.
    pub fps: u32,
    /// Target video bitrate in kbit/s.
    pub bitrate_kbps: u32,
}

impl EncoderConfig {
    /// Config with the default bitrate.
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            fps,
            bitrate_kbps: 8000,
        }
    }

    /// Check the configuration before allocating any resources.
    pub fn validate(&self) -> ChartcastResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ChartcastError::validation(
                "encoder width/height must be non-zero",
            ));
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            // The default settings target yuv420p output for maximum player
            // compatibility.
            return Err(ChartcastError::validation(
                "encoder width/height must be even (required for yuv420p output)",
            ));
        }
        if self.fps == 0 {
            return Err(ChartcastError::validation("encoder fps must be non-zero"));
        }
        Ok(())
    }
}

/// The finalized, downloadable video produced by a recording session.
#[derive(Clone, Debug)]
pub struct VideoArtifact {
    /// Encoded video bytes.
    pub data: Arc<Vec<u8>>,
    /// MIME type of `data`.
    pub mime: &'static str,
    /// Download filename convention.
    pub suggested_name: &'static str,
}

/// Encoded chunks accumulated by a session, in encoder-emission order.
pub type ChunkLog = Arc<Mutex<Vec<Vec<u8>>>>;

/// The fixed-size drawing surface an encoder captures from.
///
/// The frame sampler is the only writer; the encoder's capture thread is the
/// only other reader. Presenting a frame replaces the previous one wholesale.
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Mutex<Vec<u8>>,
    presented: AtomicU64,
}

impl Surface {
    /// Allocate a surface cleared to opaque white.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: Mutex::new(vec![255u8; (width as usize) * (height as usize) * 4]),
            presented: AtomicU64::new(0),
        }
    }

    /// Device-pixel dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Replace the surface contents with a full opaque RGBA8 frame.
    pub fn present(&self, rgba: &[u8]) -> ChartcastResult<()> {
        let mut pixels = self.pixels.lock().unwrap_or_else(|e| e.into_inner());
        if rgba.len() != pixels.len() {
            return Err(ChartcastError::validation(format!(
                "frame size mismatch: got {} bytes, surface holds {}",
                rgba.len(),
                pixels.len()
            )));
        }
        pixels.copy_from_slice(rgba);
        self.presented.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Copy the current contents into `dst` (same length as the surface).
    pub fn copy_into(&self, dst: &mut [u8]) {
        let pixels = self.pixels.lock().unwrap_or_else(|e| e.into_inner());
        dst.copy_from_slice(&pixels);
    }

    /// How many frames have been presented since allocation.
    pub fn frames_presented(&self) -> u64 {
        self.presented.load(Ordering::Relaxed)
    }
}

/// Backend seam between the session and a concrete encoding resource.
///
/// The engine owns whatever internal threads or processes it needs; the
/// session guarantees that exactly one of `finish` or `abort` concludes it.
pub trait EncoderEngine: Send {
    /// Begin capturing `surface` and appending encoded chunks to `chunks`.
    fn start(&mut self, surface: Arc<Surface>, chunks: ChunkLog) -> ChartcastResult<()>;

    /// Stop capturing, flush the encoder, and append any trailing chunks.
    fn finish(&mut self) -> ChartcastResult<()>;

    /// Halt immediately, discarding unflushed output. Must release every
    /// resource the engine holds.
    fn abort(&mut self);
}

/// `true` when the system `ffmpeg` binary is runnable.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Production engine: the system `ffmpeg` binary encoding WebM/VP9 to stdout.
pub struct FfmpegVpxEngine {
    cfg: EncoderConfig,
    child: Option<Child>,
    stop: Arc<AtomicBool>,
    writer: Option<JoinHandle<ChartcastResult<u64>>>,
    reader: Option<JoinHandle<()>>,
}

impl FfmpegVpxEngine {
    /// Create an engine for `cfg`. Fails with
    /// [`ChartcastError::EncoderUnavailable`] when `ffmpeg` is not on PATH.
    pub fn new(cfg: EncoderConfig) -> ChartcastResult<Self> {
        cfg.validate()?;
        if !is_ffmpeg_on_path() {
            return Err(ChartcastError::encoder_unavailable(
                "ffmpeg was not found on PATH",
            ));
        }
        Ok(Self {
            cfg,
            child: None,
            stop: Arc::new(AtomicBool::new(false)),
            writer: None,
            reader: None,
        })
    }

    fn join_threads(&mut self) -> ChartcastResult<u64> {
        let frames = match self.writer.take() {
            Some(h) => h
                .join()
                .map_err(|_| ChartcastError::encode("encoder writer thread panicked"))??,
            None => 0,
        };
        if let Some(h) = self.reader.take() {
            h.join()
                .map_err(|_| ChartcastError::encode("encoder reader thread panicked"))?;
        }
        Ok(frames)
    }
}

impl EncoderEngine for FfmpegVpxEngine {
    fn start(&mut self, surface: Arc<Surface>, chunks: ChunkLog) -> ChartcastResult<()> {
        if self.child.is_some() {
            return Err(ChartcastError::encode("encoder engine already started"));
        }

        // The system binary is used rather than linking FFmpeg to avoid native
        // dev header/lib requirements. WebM is streamable, so encoded output
        // can be chunked straight off stdout.
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", self.cfg.width, self.cfg.height),
            "-r",
            &self.cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libvpx-vp9",
            "-b:v",
            &format!("{}k", self.cfg.bitrate_kbps),
            "-pix_fmt",
            "yuv420p",
            "-deadline",
            "realtime",
            "-cpu-used",
            "8",
            "-f",
            "webm",
            "pipe:1",
        ]);

        let mut child = cmd.spawn().map_err(|e| {
            ChartcastError::encoder_unavailable(format!("failed to spawn ffmpeg: {e}"))
        })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ChartcastError::encode("failed to open ffmpeg stdin"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| ChartcastError::encode("failed to open ffmpeg stdout"))?;

        let stop = Arc::clone(&self.stop);
        let frame_interval = Duration::from_secs_f64(1.0 / f64::from(self.cfg.fps));
        let frame_len = (self.cfg.width as usize) * (self.cfg.height as usize) * 4;

        self.writer = Some(std::thread::spawn(move || {
            let mut scratch = vec![0u8; frame_len];
            let mut frames = 0u64;
            let mut next = Instant::now();

            while !stop.load(Ordering::Relaxed) {
                surface.copy_into(&mut scratch);
                if let Err(e) = stdin.write_all(&scratch) {
                    return Err(ChartcastError::encode(format!(
                        "failed to write frame {frames} to ffmpeg stdin: {e}"
                    )));
                }
                frames += 1;

                next += frame_interval;
                let now = Instant::now();
                if next > now {
                    std::thread::sleep(next - now);
                } else {
                    // Fell behind; resynchronize instead of bursting.
                    next = now;
                }
            }

            // EOF tells ffmpeg to flush the container.
            drop(stdin);
            Ok(frames)
        }));

        self.reader = Some(std::thread::spawn(move || {
            let mut buf = [0u8; 64 * 1024];
            loop {
                match stdout.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        let mut log = chunks.lock().unwrap_or_else(|e| e.into_inner());
                        log.push(buf[..n].to_vec());
                    }
                }
            }
        }));

        self.child = Some(child);
        tracing::debug!(
            width = self.cfg.width,
            height = self.cfg.height,
            fps = self.cfg.fps,
            "ffmpeg vp9 encoder started"
        );
        Ok(())
    }

    fn finish(&mut self) -> ChartcastResult<()> {
        self.stop.store(true, Ordering::Relaxed);
        let frames = self.join_threads()?;

        let Some(mut child) = self.child.take() else {
            return Err(ChartcastError::encode("encoder engine was never started"));
        };

        let mut stderr = String::new();
        if let Some(mut pipe) = child.stderr.take() {
            let _ = pipe.read_to_string(&mut stderr);
        }
        let status = child
            .wait()
            .map_err(|e| ChartcastError::encode(format!("failed to wait for ffmpeg: {e}")))?;

        if !status.success() {
            return Err(ChartcastError::encode(format!(
                "ffmpeg exited with status {status}: {}",
                stderr.trim()
            )));
        }

        tracing::debug!(frames, "ffmpeg vp9 encoder finished");
        Ok(())
    }

    fn abort(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(child) = self.child.as_mut() {
            let _ = child.kill();
        }
        let _ = self.join_threads();
        if let Some(mut child) = self.child.take() {
            let _ = child.wait();
        }
    }
}

impl Drop for FfmpegVpxEngine {
    fn drop(&mut self) {
        // A session always concludes its engine, but a dropped half-open
        // engine must still reap the child process.
        if self.child.is_some() {
            self.abort();
        }
    }
}

/// A video-encoding resource bound to a sequence of drawn frames.
///
/// Exactly one finalize-or-abort outcome is ever produced: `stop` is
/// idempotent and returns the same artifact on every call, `abort` after a
/// successful `stop` is a no-op, and `stop` after `abort` is an error.
pub struct EncoderSession {
    surface: Arc<Surface>,
    chunks: ChunkLog,
    engine: Box<dyn EncoderEngine>,
    started: bool,
    finalized: Option<VideoArtifact>,
    aborted: bool,
}

impl EncoderSession {
    /// Open a session with the production ffmpeg engine.
    pub fn open(cfg: EncoderConfig) -> ChartcastResult<Self> {
        let engine = FfmpegVpxEngine::new(cfg.clone())?;
        Self::with_engine(cfg, Box::new(engine))
    }

    /// Open a session with a custom engine.
    pub fn with_engine(cfg: EncoderConfig, engine: Box<dyn EncoderEngine>) -> ChartcastResult<Self> {
        cfg.validate()?;
        Ok(Self {
            surface: Arc::new(Surface::new(cfg.width, cfg.height)),
            chunks: Arc::new(Mutex::new(Vec::new())),
            engine,
            started: false,
            finalized: None,
            aborted: false,
        })
    }

    /// The drawing surface frames are presented to.
    pub fn surface(&self) -> Arc<Surface> {
        Arc::clone(&self.surface)
    }

    /// Begin accepting frames and accumulating encoded chunks.
    pub fn start(&mut self) -> ChartcastResult<()> {
        if self.started {
            return Err(ChartcastError::encode("encoder session already started"));
        }
        self.engine
            .start(Arc::clone(&self.surface), Arc::clone(&self.chunks))?;
        self.started = true;
        Ok(())
    }

    /// Number of encoded chunks accumulated so far.
    pub fn chunk_count(&self) -> usize {
        self.chunks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Flush the encoder and concatenate all chunks into the artifact.
    ///
    /// Idempotent: a second call returns the identical artifact handle.
    pub fn stop(&mut self) -> ChartcastResult<VideoArtifact> {
        if let Some(artifact) = &self.finalized {
            return Ok(artifact.clone());
        }
        if self.aborted {
            return Err(ChartcastError::encode(
                "encoder session was aborted before finalize",
            ));
        }
        if !self.started {
            return Err(ChartcastError::encode("encoder session was never started"));
        }

        self.engine.finish()?;

        let chunks = self.chunks.lock().unwrap_or_else(|e| e.into_inner());
        let total: usize = chunks.iter().map(Vec::len).sum();
        let mut data = Vec::with_capacity(total);
        for chunk in chunks.iter() {
            data.extend_from_slice(chunk);
        }
        drop(chunks);

        if data.is_empty() {
            tracing::warn!("encoder produced no output; artifact is empty");
        }

        let artifact = VideoArtifact {
            data: Arc::new(data),
            mime: WEBM_MIME,
            suggested_name: DEFAULT_ARTIFACT_NAME,
        };
        self.finalized = Some(artifact.clone());
        Ok(artifact)
    }

    /// Halt immediately without producing an artifact.
    ///
    /// No-op when the session is already finalized or aborted.
    pub fn abort(&mut self) {
        if self.finalized.is_some() || self.aborted {
            return;
        }
        self.engine.abort();
        self.aborted = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/session.rs"]
mod tests;
