use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn dump(dir: &std::path::Path, seed: &str) {
    let status = Command::new(env!("CARGO_BIN_EXE_glasspaper"))
        .args([
            "--dump-shards",
            dir.to_str().unwrap(),
            "--seed",
            seed,
            "--size",
            "800x600",
        ])
        .status()
        .expect("failed to run glasspaper --dump-shards");
    assert!(status.success());
}

#[test]
fn dump_shards_writes_twelve_pngs() {
    let root = TempDir::new().unwrap();
    let dir = root.path().join("shards");
    dump(&dir, "7");

    for index in 0..12 {
        let path = dir.join(format!("shard-{index:02}.png"));
        assert!(path.exists(), "missing {}", path.display());
    }
    assert!(!dir.join("shard-12.png").exists());
}

#[test]
fn dump_is_deterministic_for_a_seed() {
    let root = TempDir::new().unwrap();
    let first = root.path().join("first");
    let second = root.path().join("second");
    dump(&first, "42");
    dump(&second, "42");

    for index in 0..12 {
        let name = format!("shard-{index:02}.png");
        let lhs = fs::read(first.join(&name)).unwrap();
        let rhs = fs::read(second.join(&name)).unwrap();
        assert_eq!(lhs, rhs, "{name} differs between runs with the same seed");
    }
}

#[test]
fn different_seeds_produce_different_textures() {
    let root = TempDir::new().unwrap();
    let first = root.path().join("first");
    let second = root.path().join("second");
    dump(&first, "1");
    dump(&second, "2");

    let lhs = fs::read(first.join("shard-00.png")).unwrap();
    let rhs = fs::read(second.join("shard-00.png")).unwrap();
    assert_ne!(lhs, rhs);
}
