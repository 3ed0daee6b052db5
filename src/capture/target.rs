use std::sync::Arc;

/// A still vector snapshot of a capture target's current frame.
#[derive(Clone, Debug)]
pub struct SvgSnapshot {
    /// Complete SVG document bytes.
    pub svg: Arc<Vec<u8>>,
}

impl SvgSnapshot {
    /// Wrap SVG document bytes.
    pub fn new(svg: impl Into<Vec<u8>>) -> Self {
        Self {
            svg: Arc::new(svg.into()),
        }
    }
}

/// The live visual surface being recorded.
///
/// Implemented by whatever hosts the chart renderer. The recording core only
/// ever reads from a target: it polls [`CaptureTarget::snapshot`] on a timer
/// and never mutates the underlying surface.
pub trait CaptureTarget: Send + Sync {
    /// Whether the target is still mounted on a live surface.
    ///
    /// A target that detaches mid-recording fails the session.
    fn is_attached(&self) -> bool;

    /// Logical (CSS-pixel) size of the surface.
    fn size(&self) -> (u32, u32);

    /// A vector snapshot of the current frame, or `None` when nothing is
    /// renderable yet. Returning `None` is not an error; the tick is skipped.
    fn snapshot(&self) -> Option<SvgSnapshot>;
}
