use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        VizError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        VizError::animation("x")
            .to_string()
            .contains("animation error:")
    );
    assert!(VizError::render("x").to_string().contains("render error:"));
    assert!(
        VizError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = VizError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
