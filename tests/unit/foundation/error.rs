use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ShardmapError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ShardmapError::parse("x").to_string().contains("parse error:"));
    assert!(
        ShardmapError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        ShardmapError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ShardmapError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
