use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ChartcastError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ChartcastError::encoder_unavailable("x")
            .to_string()
            .contains("encoder unavailable:")
    );
    assert!(
        ChartcastError::encode("x")
            .to_string()
            .contains("encoding error:")
    );
}

#[test]
fn unit_variants_have_fixed_messages() {
    assert_eq!(
        ChartcastError::CaptureTargetMissing.to_string(),
        "capture target is not attached"
    );
    assert_eq!(
        ChartcastError::AlreadyRecording.to_string(),
        "a recording session is already active"
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ChartcastError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
