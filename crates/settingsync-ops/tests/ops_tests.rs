use std::fs;
use std::sync::Arc;

use settingsync_core::{
    Action, ActionKind, CompareMethod, DiffConfig, ErrorKind, MemoryFileSystem, OsFileSystem,
    Priority, RelativePath, RootPair,
};
use settingsync_ops::{execute, execute_batch, render};
use settingsync_scan::diff;
use tempfile::TempDir;

fn create_settings_pair() -> TempDir {
    let temp = TempDir::new().unwrap();
    let live = temp.path().join("live");
    let backup = temp.path().join("backup");
    fs::create_dir_all(live.join("snippets")).unwrap();
    fs::create_dir_all(&backup).unwrap();

    fs::write(live.join("settings.json"), r#"{"editor.fontSize": 14}"#).unwrap();
    fs::write(backup.join("settings.json"), r#"{"editor.fontSize": 12}"#).unwrap();
    fs::write(live.join("snippets/rust.json"), "{}").unwrap();
    fs::write(backup.join("stale.json"), "old").unwrap();

    temp
}

#[test]
fn test_left_wins_copy_makes_files_identical() {
    let temp = create_settings_pair();
    let live = temp.path().join("live");
    let backup = temp.path().join("backup");

    let report = diff(&OsFileSystem::new(), &DiffConfig::new(&live, &backup)).unwrap();
    let record = report
        .records
        .iter()
        .find(|r| r.relative_path().as_str() == "settings.json")
        .unwrap();
    let action = record.default_action().unwrap();
    assert_eq!(action.kind, ActionKind::CopyToRight);

    let bytes = execute(&OsFileSystem::new(), action).unwrap();
    assert_eq!(bytes, 23);
    assert_eq!(
        fs::read(live.join("settings.json")).unwrap(),
        fs::read(backup.join("settings.json")).unwrap()
    );
}

#[tokio::test]
async fn test_batch_with_one_read_only_destination() {
    let fs = Arc::new(MemoryFileSystem::new());
    fs.add_file("/live/a.json", "a")
        .add_file("/live/b.json", "bb")
        .add_file("/live/c.json", "ccc")
        .add_file("/backup/b.json", "old")
        .set_read_only("/backup/b.json");
    let roots = Arc::new(RootPair::new("/live", "/backup"));

    let actions: Vec<Action> = ["a.json", "b.json", "c.json"]
        .into_iter()
        .map(|p| {
            Action::new(
                ActionKind::CopyToRight,
                RelativePath::new(p).unwrap(),
                Arc::clone(&roots),
            )
        })
        .collect();

    let report = execute_batch(Arc::clone(&fs), actions).await;
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.bytes_copied, 4);

    let (failed, error) = report.failures().next().unwrap();
    assert_eq!(failed.relative_path.as_str(), "b.json");
    assert_eq!(error.kind, ErrorKind::PermissionDenied);

    assert_eq!(fs.read("/backup/a.json").unwrap(), b"a");
    assert_eq!(fs.read("/backup/b.json").unwrap(), b"old");
    assert_eq!(fs.read("/backup/c.json").unwrap(), b"ccc");

    let failure = report.into_result().unwrap_err();
    assert_eq!(failure.report.outcomes.len(), 3);
    assert_eq!(failure.to_string(), "1 of 3 actions failed");
}

#[tokio::test]
async fn test_applying_defaults_brings_trees_in_sync() {
    let fs = Arc::new(OsFileSystem::new());

    for priority in [Priority::LeftWins, Priority::RightWins] {
        let temp = create_settings_pair();
        let live = temp.path().join("live");
        let backup = temp.path().join("backup");
        let mut config = DiffConfig::new(&live, &backup);
        config.priority = priority;

        let before = diff(fs.as_ref(), &config).unwrap();
        assert!(!before.is_in_sync());

        let report = execute_batch(Arc::clone(&fs), before.default_actions()).await;
        assert!(report.is_success(), "{}", report.summary());

        let after = diff(fs.as_ref(), &config).unwrap();
        assert!(after.is_in_sync());

        match priority {
            Priority::LeftWins => {
                assert!(!backup.join("stale.json").exists());
                assert!(backup.join("snippets/rust.json").is_file());
            }
            Priority::RightWins => {
                assert!(live.join("stale.json").is_file());
                assert!(!live.join("snippets/rust.json").exists());
            }
        }
    }
}

#[tokio::test]
async fn test_mtime_comparison_in_sync_after_apply() {
    let temp = create_settings_pair();
    let live = temp.path().join("live");
    let backup = temp.path().join("backup");
    let fs = Arc::new(OsFileSystem::new());

    let config = DiffConfig::builder()
        .left(&live)
        .right(&backup)
        .compare(CompareMethod::SizeAndModified)
        .build()
        .unwrap();

    let before = diff(fs.as_ref(), &config).unwrap();
    assert!(before
        .records
        .iter()
        .any(|r| r.relative_path().as_str() == "settings.json"));

    let report = execute_batch(Arc::clone(&fs), before.default_actions()).await;
    assert!(report.is_success(), "{}", report.summary());

    let after = diff(fs.as_ref(), &config).unwrap();
    assert!(after.records.is_empty(), "{:?}", after.records);
    assert_eq!(after.stats.identical, 2);
}

#[test]
fn test_render_from_real_diff() {
    let temp = create_settings_pair();
    let live = temp.path().join("live");
    let backup = temp.path().join("backup");

    let report = diff(&OsFileSystem::new(), &DiffConfig::new(&live, &backup)).unwrap();
    let lines: Vec<String> = report
        .records
        .iter()
        .map(|r| render(r, 0).unwrap())
        .collect();

    assert_eq!(
        lines,
        vec![
            format!(
                "{} --> {}",
                live.join("settings.json").display(),
                backup.join("settings.json").display()
            ),
            format!(
                "{} --> {}",
                live.join("snippets/rust.json").display(),
                backup.join("snippets").display()
            ),
            format!("    X{}", backup.join("stale.json").display()),
        ]
    );
}
