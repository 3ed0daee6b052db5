use super::*;

#[derive(Clone, Default)]
struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    fn push(&self, call: &'static str) {
        self.0.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

struct MockEngine {
    log: CallLog,
    chunks: Option<ChunkLog>,
    fail_start: bool,
}

impl MockEngine {
    fn new(log: CallLog) -> Box<Self> {
        Box::new(Self {
            log,
            chunks: None,
            fail_start: false,
        })
    }
}

impl EncoderEngine for MockEngine {
    fn start(&mut self, _surface: Arc<Surface>, chunks: ChunkLog) -> ChartcastResult<()> {
        self.log.push("start");
        if self.fail_start {
            return Err(ChartcastError::encode("mock start failure"));
        }
        chunks.lock().unwrap().push(b"head".to_vec());
        self.chunks = Some(chunks);
        Ok(())
    }

    fn finish(&mut self) -> ChartcastResult<()> {
        self.log.push("finish");
        if let Some(chunks) = &self.chunks {
            chunks.lock().unwrap().push(b"tail".to_vec());
        }
        Ok(())
    }

    fn abort(&mut self) {
        self.log.push("abort");
    }
}

fn cfg() -> EncoderConfig {
    EncoderConfig::new(16, 12, 30)
}

#[test]
fn config_validation_catches_bad_values() {
    assert!(EncoderConfig::new(0, 12, 30).validate().is_err());
    assert!(EncoderConfig::new(16, 0, 30).validate().is_err());
    assert!(EncoderConfig::new(15, 12, 30).validate().is_err());
    assert!(EncoderConfig::new(16, 11, 30).validate().is_err());
    assert!(EncoderConfig::new(16, 12, 0).validate().is_err());
    assert!(cfg().validate().is_ok());
}

#[test]
fn surface_rejects_mismatched_frames() {
    let surface = Surface::new(4, 4);
    assert!(surface.present(&[0u8; 3]).is_err());
    assert_eq!(surface.frames_presented(), 0);

    let frame = vec![7u8; 4 * 4 * 4];
    surface.present(&frame).unwrap();
    assert_eq!(surface.frames_presented(), 1);

    let mut out = vec![0u8; frame.len()];
    surface.copy_into(&mut out);
    assert_eq!(out, frame);
}

#[test]
fn stop_concatenates_chunks_in_order() {
    let log = CallLog::default();
    let mut session = EncoderSession::with_engine(cfg(), MockEngine::new(log.clone())).unwrap();
    session.start().unwrap();
    assert_eq!(session.chunk_count(), 1);

    let artifact = session.stop().unwrap();
    assert_eq!(artifact.data.as_slice(), b"headtail");
    assert_eq!(artifact.mime, WEBM_MIME);
    assert_eq!(artifact.suggested_name, DEFAULT_ARTIFACT_NAME);
    assert_eq!(log.calls(), vec!["start", "finish"]);
}

#[test]
fn stop_is_idempotent_and_flushes_once() {
    let log = CallLog::default();
    let mut session = EncoderSession::with_engine(cfg(), MockEngine::new(log.clone())).unwrap();
    session.start().unwrap();

    let first = session.stop().unwrap();
    let second = session.stop().unwrap();
    assert!(Arc::ptr_eq(&first.data, &second.data));
    // The engine flushed exactly once.
    assert_eq!(log.calls(), vec!["start", "finish"]);
}

#[test]
fn lifecycle_misuse_is_rejected() {
    let log = CallLog::default();
    let mut session = EncoderSession::with_engine(cfg(), MockEngine::new(log.clone())).unwrap();

    // Stop without start.
    assert!(session.stop().is_err());

    session.start().unwrap();
    assert!(session.start().is_err());

    // Abort wins over a later stop.
    session.abort();
    assert!(session.stop().is_err());
    assert_eq!(log.calls(), vec!["start", "abort"]);
}

#[test]
fn abort_after_stop_is_a_no_op() {
    let log = CallLog::default();
    let mut session = EncoderSession::with_engine(cfg(), MockEngine::new(log.clone())).unwrap();
    session.start().unwrap();
    session.stop().unwrap();

    session.abort();
    session.abort();
    assert_eq!(log.calls(), vec!["start", "finish"]);
}

#[test]
fn failed_engine_start_leaves_session_unstarted() {
    let log = CallLog::default();
    let mut engine = MockEngine::new(log.clone());
    engine.fail_start = true;
    let mut session = EncoderSession::with_engine(cfg(), engine).unwrap();

    assert!(session.start().is_err());
    assert!(session.stop().is_err());
}
