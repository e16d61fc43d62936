use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StitchError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        StitchError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn insufficient_input_lists_missing_slots() {
    let err = StitchError::insufficient_input(6, 4, vec!["top".into(), "bottom".into()]);
    let msg = err.to_string();
    assert!(msg.contains("4/6"));
    assert!(msg.contains("top, bottom"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = StitchError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
