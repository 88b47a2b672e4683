use super::*;
use crate::foundation::core::Rgba8;

const UNIT: &str = "4\n0 0\n0 0\n10 0\n10 0\n10 10\n10 10\n0 10\n0 10\n";
const MASK: &str = "3\n1 1\n8 1\n4 8\n";

fn fixture_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("registry-tests").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn small() -> Canvas {
    Canvas::new(32, 32).unwrap()
}

#[test]
fn missing_directory_is_created_empty() {
    let dir = fixture_dir("missing").join("nested");
    let reg = ShardRegistry::discover(&dir, small()).unwrap();
    assert!(reg.is_empty());
    assert!(dir.is_dir());
}

#[test]
fn broken_stem_is_skipped_without_consuming_an_index() {
    let dir = fixture_dir("broken");
    std::fs::write(dir.join("a_points.txt"), UNIT).unwrap();
    std::fs::write(dir.join("b_points.txt"), "2\n0 0\n").unwrap();
    std::fs::write(dir.join("c_points.txt"), UNIT).unwrap();
    std::fs::write(dir.join("c_mask.txt"), MASK).unwrap();
    std::fs::write(dir.join("orphan_mask.txt"), MASK).unwrap();
    std::fs::write(dir.join("notes.md"), "ignored").unwrap();

    let reg = ShardRegistry::discover(&dir, small()).unwrap();
    let names: Vec<_> = reg.shards().iter().map(|s| s.name()).collect();
    assert_eq!(names, ["a", "c"]);
    assert_eq!(reg.get("c").unwrap().index(), 1);
    assert_eq!(reg.get("c").unwrap().color(), Rgba8::opaque(134, 72, 30));
    assert!(reg.get("c").unwrap().has_mask());
    assert!(reg.get("b").is_none());
}

#[test]
fn save_all_then_reload_keeps_edits() {
    let dir = fixture_dir("save");
    std::fs::write(dir.join("a_points.txt"), UNIT).unwrap();
    let mut reg = ShardRegistry::discover(&dir, small()).unwrap();
    reg.get_mut("a")
        .unwrap()
        .set_mask_perimeter(vec![
            crate::Point::new(2.0, 2.0),
            crate::Point::new(6.0, 2.0),
            crate::Point::new(6.0, 6.0),
        ]);
    reg.save_all().unwrap();
    assert!(dir.join("a_mask.txt").exists());

    reg.reload().unwrap();
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.shards()[0].mask_points().len(), 3);
    assert!(reg.shards()[0].is_mask_ready());
}

#[test]
fn surface_settings_reach_every_shard() {
    let dir = fixture_dir("surface-settings");
    std::fs::write(dir.join("a_points.txt"), UNIT).unwrap();
    std::fs::write(dir.join("b_points.txt"), UNIT).unwrap();
    let mut reg = ShardRegistry::discover(&dir, small()).unwrap();
    reg.apply_surface_settings(ShardSurfaceSettings {
        use_mask: false,
        use_bounding_box: true,
    });
    assert!(reg.shards().iter().all(|s| !s.use_mask() && s.use_bounding_box()));
}
