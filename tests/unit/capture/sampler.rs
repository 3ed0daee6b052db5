use super::*;

use std::sync::atomic::AtomicBool;

const RED_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="2" height="2"><rect width="2" height="2" fill="#ff0000"/></svg>"##;

struct FixedTarget {
    renderable: AtomicBool,
}

impl FixedTarget {
    fn new(renderable: bool) -> Arc<Self> {
        Arc::new(Self {
            renderable: AtomicBool::new(renderable),
        })
    }
}

impl CaptureTarget for FixedTarget {
    fn is_attached(&self) -> bool {
        true
    }

    fn size(&self) -> (u32, u32) {
        (2, 2)
    }

    fn snapshot(&self) -> Option<SvgSnapshot> {
        if self.renderable.load(Ordering::Relaxed) {
            Some(SvgSnapshot::new(RED_SVG))
        } else {
            None
        }
    }
}

#[test]
fn unrenderable_ticks_are_skipped() {
    let (sampler, _stream) = FrameSampler::new(FixedTarget::new(false));
    sampler.sample();
    sampler.sample();
    assert_eq!(sampler.frames_sampled(), 0);
}

#[test]
fn sampling_counts_and_overwrites_the_slot() {
    let (sampler, mut stream) = FrameSampler::new(FixedTarget::new(true));
    sampler.sample();
    sampler.sample();
    sampler.sample();
    assert_eq!(sampler.frames_sampled(), 3);

    // Only the newest snapshot is held; intermediate ones were overwritten.
    assert!(stream.rx.has_changed().unwrap());
    assert!(stream.rx.borrow_and_update().is_some());
    assert!(!stream.rx.has_changed().unwrap());
}

#[tokio::test]
async fn drive_surface_presents_the_latest_snapshot() {
    let (sampler, stream) = FrameSampler::new(FixedTarget::new(true));
    let surface = Arc::new(Surface::new(4, 4));
    let drain = tokio::spawn(stream.drive_surface(Arc::clone(&surface)));

    sampler.sample();
    drop(sampler);
    drain.await.unwrap();

    assert_eq!(surface.frames_presented(), 1);
    let mut pixels = vec![0u8; 4 * 4 * 4];
    surface.copy_into(&mut pixels);
    assert_eq!(&pixels[..4], &[255, 0, 0, 255]);
}

#[tokio::test]
async fn drive_surface_exits_when_sampler_drops() {
    let (sampler, stream) = FrameSampler::new(FixedTarget::new(true));
    let surface = Arc::new(Surface::new(4, 4));
    let drain = tokio::spawn(stream.drive_surface(surface));
    drop(sampler);
    drain.await.unwrap();
}

#[test]
fn rasterize_fills_the_requested_size() {
    let rgba = rasterize_snapshot(&SvgSnapshot::new(RED_SVG), 4, 4).unwrap();
    assert_eq!(rgba.len(), 4 * 4 * 4);
    for px in rgba.chunks_exact(4) {
        assert_eq!(px, &[255, 0, 0, 255]);
    }
}

#[test]
fn rasterize_rejects_bad_inputs() {
    assert!(rasterize_snapshot(&SvgSnapshot::new(RED_SVG), 0, 4).is_err());
    assert!(rasterize_snapshot(&SvgSnapshot::new("not svg at all"), 4, 4).is_err());
}

#[test]
fn flatten_blends_partial_alpha_over_white() {
    // Premultiplied red @ ~50% alpha over white.
    let mut rgba = vec![128u8, 0, 0, 128];
    flatten_premul_over_white(&mut rgba);
    assert_eq!(rgba, vec![255, 127, 127, 255]);

    // Opaque pixels pass through untouched.
    let mut rgba = vec![10u8, 20, 30, 255];
    flatten_premul_over_white(&mut rgba);
    assert_eq!(rgba, vec![10, 20, 30, 255]);

    // Fully transparent becomes white.
    let mut rgba = vec![0u8, 0, 0, 0];
    flatten_premul_over_white(&mut rgba);
    assert_eq!(rgba, vec![255, 255, 255, 255]);
}
