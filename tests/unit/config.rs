use super::*;

#[test]
fn empty_object_yields_defaults() {
    let cfg = ShardmapConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, ShardmapConfig::default());
    assert_eq!(cfg.canvas, Canvas::UHD);
    assert!(cfg.compositor.use_inverse);
    assert_eq!(cfg.compositor.quad_mapping[3].source_quad, 3);
}

#[test]
fn partial_sections_keep_remaining_defaults() {
    let cfg = ShardmapConfig::from_json_str(
        r#"{
            "canvas": { "width": 1920, "height": 1080 },
            "compositor": {
                "selection": { "mode": "single", "index": 2 },
                "debug_view": true,
                "quad_mapping": [
                    { "source_quad": 1, "rotation_deg": 90, "mirror": true },
                    {}, {}, {}
                ]
            }
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.canvas, Canvas::new(1920, 1080).unwrap());
    assert_eq!(cfg.compositor.selection, ShardSelection::Single { index: 2 });
    assert!(cfg.compositor.debug_view);
    assert!(cfg.compositor.use_inverse);
    assert!(cfg.compositor.quad_mapping[0].mirror);
    assert_eq!(cfg.compositor.quad_mapping[1].source_quad, 0);
    assert!(cfg.shard_surfaces.use_mask);
}

#[test]
fn invalid_values_are_rejected() {
    assert!(matches!(
        ShardmapConfig::from_json_str(r#"{"canvas":{"width":0,"height":10}}"#),
        Err(ShardmapError::Validation(_))
    ));
    assert!(matches!(
        ShardmapConfig::from_json_str(r#"{"compositor":{"live_opacity":1.5}}"#),
        Err(ShardmapError::Validation(_))
    ));
    assert!(matches!(
        ShardmapConfig::from_json_str("{not json"),
        Err(ShardmapError::Serde(_))
    ));
}

#[test]
fn pretty_json_round_trips() {
    let mut cfg = ShardmapConfig::default();
    cfg.compositor.flat_background = true;
    let text = cfg.to_json_pretty().unwrap();
    assert_eq!(ShardmapConfig::from_json_str(&text).unwrap(), cfg);
}
