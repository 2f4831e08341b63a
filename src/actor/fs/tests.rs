use std::path::{Path, PathBuf};
use std::time::Duration;

use rustc_hash::FxHashMap;
use tempfile::TempDir;

use super::debouncer::{COOLDOWN, DEBOUNCE, Debouncer, is_temp_file};
use super::filter::ChangeFilter;
use super::to_message;
use super::types::{ChangeKind, Changes};
use crate::actor::messages::BuildMsg;
use crate::config::{ProjectConfig, test_config_at};
use crate::fileset::SetKind;
use crate::pipeline::{Trigger, WriteRegistry};

fn make_config() -> (TempDir, ProjectConfig) {
    let temp = TempDir::new().unwrap();
    let config = test_config_at(temp.path(), "");
    std::fs::create_dir_all(config.output_dir()).unwrap();
    (temp, config)
}

fn touch(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path
}

fn filter(
    config: &ProjectConfig,
    writes: &WriteRegistry,
    raw: Vec<(PathBuf, ChangeKind)>,
) -> Option<Changes> {
    let sets = config.file_sets().unwrap();
    let raw: FxHashMap<_, _> = raw.into_iter().collect();
    ChangeFilter::new(config, &sets, writes).filter(raw)
}

fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn remove_kind() -> notify::EventKind {
    notify::EventKind::Remove(notify::event::RemoveKind::File)
}

// =============================================================================
// Debouncer
// =============================================================================

#[test]
fn test_debouncer_empty() {
    let debouncer = Debouncer::new();
    assert!(!debouncer.is_ready());
}

#[test]
fn test_event_routing_by_kind() {
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/a.scss"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/b.js"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/c.png"], remove_kind()));

    assert_eq!(debouncer.changes.len(), 3);
    assert_eq!(
        debouncer.changes[&PathBuf::from("/tmp/a.scss")],
        ChangeKind::Created
    );
    assert_eq!(
        debouncer.changes[&PathBuf::from("/tmp/b.js")],
        ChangeKind::Modified
    );
    assert_eq!(
        debouncer.changes[&PathBuf::from("/tmp/c.png")],
        ChangeKind::Removed
    );
}

#[test]
fn test_metadata_change_ignored() {
    let mut debouncer = Debouncer::new();
    let kind = notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
        notify::event::MetadataKind::WriteTime,
    ));
    debouncer.add_event(&make_event(vec!["/tmp/a.scss"], kind));
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.last_event.is_none());
}

#[test]
fn test_temp_file_ignored() {
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/main.scss"], modify_kind()));
    let first_time = debouncer.last_event.unwrap();

    std::thread::sleep(Duration::from_millis(5));

    debouncer.add_event(&make_event(vec!["/tmp/.main.scss.swp"], modify_kind()));
    assert_eq!(debouncer.last_event.unwrap(), first_time);
    assert_eq!(debouncer.changes.len(), 1);
}

#[test]
fn test_is_temp_file() {
    assert!(is_temp_file(Path::new("/p/app/main.js~")));
    assert!(is_temp_file(Path::new("/p/app/4913")));
    assert!(is_temp_file(Path::new("/p/app/#main.js#")));
    assert!(is_temp_file(Path::new("/p/index.html.tmp")));
    assert!(!is_temp_file(Path::new("/p/app/main.js")));
}

#[test]
fn test_dedup_first_event_wins() {
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/a.js"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.js"], modify_kind()));

    assert_eq!(debouncer.changes.len(), 1);
    assert_eq!(
        debouncer.changes[&PathBuf::from("/tmp/a.js")],
        ChangeKind::Created
    );
}

#[test]
fn test_remove_then_create_restores() {
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/a.js"], remove_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.js"], create_kind()));

    assert_eq!(debouncer.changes.len(), 1);
    assert_eq!(
        debouncer.changes[&PathBuf::from("/tmp/a.js")],
        ChangeKind::Created
    );
}

#[test]
fn test_create_then_remove_discards() {
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/a.js"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.js"], remove_kind()));
    assert!(debouncer.changes.is_empty());
}

#[test]
fn test_modify_then_remove_upgrades() {
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/a.js"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.js"], remove_kind()));
    assert_eq!(
        debouncer.changes[&PathBuf::from("/tmp/a.js")],
        ChangeKind::Removed
    );
}

#[test]
fn test_take_waits_for_quiet_window() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.js"], modify_kind()));
    assert!(debouncer.take_if_ready().is_none());

    debouncer.last_event = Some(std::time::Instant::now() - DEBOUNCE - Duration::from_millis(1));
    let taken = debouncer.take_if_ready().unwrap();
    assert_eq!(taken.len(), 1);
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.last_batch.is_some());
}

#[test]
fn test_sleep_duration_no_events() {
    let debouncer = Debouncer::new();
    assert!(debouncer.sleep_duration() >= Duration::from_secs(3600));
}

#[test]
fn test_sleep_duration_after_event() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.js"], modify_kind()));

    let dur = debouncer.sleep_duration();
    assert!(dur >= DEBOUNCE - Duration::from_millis(10));
    assert!(dur <= DEBOUNCE);
}

#[test]
fn test_sleep_duration_respects_cooldown() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.js"], modify_kind()));
    debouncer.last_batch = Some(std::time::Instant::now());

    let dur = debouncer.sleep_duration();
    assert!(dur >= COOLDOWN - Duration::from_millis(10));
    assert!(dur <= COOLDOWN);
}

#[test]
fn test_sleep_idle_after_burst_cancels_out() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.js"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.js"], remove_kind()));
    assert!(debouncer.sleep_duration() >= Duration::from_secs(3600));
}

// =============================================================================
// ChangeFilter
// =============================================================================

#[test]
fn test_filter_maps_to_set_kinds() {
    let (_tmp, config) = make_config();
    let root = config.get_root().to_path_buf();
    let scss = touch(&root, "app/styles/main.scss", "a{}");
    let js = touch(&root, "app/scripts/a.js", "1");

    let changes = filter(
        &config,
        &WriteRegistry::new(),
        vec![(scss, ChangeKind::Modified), (js, ChangeKind::Created)],
    )
    .unwrap();

    assert!(!changes.config_changed);
    assert_eq!(
        changes.kinds.iter().copied().collect::<Vec<_>>(),
        vec![SetKind::Styles, SetKind::Scripts]
    );
    assert_eq!(changes.paths.len(), 2);
}

#[test]
fn test_filter_drops_output_dir() {
    let (_tmp, config) = make_config();
    let css = touch(config.output_dir(), "main.css", "a{}");

    assert!(filter(&config, &WriteRegistry::new(), vec![(css, ChangeKind::Modified)]).is_none());
}

#[test]
fn test_filter_drops_untracked() {
    let (_tmp, config) = make_config();
    let readme = touch(config.get_root(), "README.md", "# hi");

    assert!(filter(&config, &WriteRegistry::new(), vec![(readme, ChangeKind::Modified)]).is_none());
}

#[test]
fn test_filter_drops_own_write() {
    let (_tmp, config) = make_config();
    let index = touch(config.get_root(), "index.html", "main.js?cb=2");
    let writes = WriteRegistry::new();
    writes.record(&index, b"main.js?cb=2");

    assert!(filter(&config, &writes, vec![(index.clone(), ChangeKind::Modified)]).is_none());

    // A later edit by the user no longer matches the recorded content
    std::fs::write(&index, "main.js?cb=2 edited").unwrap();
    let changes = filter(&config, &writes, vec![(index, ChangeKind::Modified)]).unwrap();
    assert!(changes.kinds.contains(&SetKind::Markup));
}

#[test]
fn test_filter_keeps_removed_source() {
    let (_tmp, config) = make_config();
    let gone = config.get_root().join("app/scripts/gone.js");

    let changes = filter(&config, &WriteRegistry::new(), vec![(gone, ChangeKind::Removed)]).unwrap();
    assert!(changes.kinds.contains(&SetKind::Scripts));
}

#[test]
fn test_filter_corrects_modified_to_removed() {
    let (_tmp, config) = make_config();
    let gone = config.get_root().join("app/scripts/gone.js");

    let changes =
        filter(&config, &WriteRegistry::new(), vec![(gone, ChangeKind::Modified)]).unwrap();
    assert_eq!(changes.paths[0].1, ChangeKind::Removed);
}

#[test]
fn test_filter_discards_vanished_creation() {
    let (_tmp, config) = make_config();
    let gone = config.get_root().join("app/scripts/gone.js");

    assert!(filter(&config, &WriteRegistry::new(), vec![(gone, ChangeKind::Created)]).is_none());
}

#[test]
fn test_filter_detects_config_change() {
    let (_tmp, config) = make_config();
    std::fs::write(&config.config_path, "[pipeline]\nparallel = false\n").unwrap();

    let changes = filter(
        &config,
        &WriteRegistry::new(),
        vec![(config.config_path.clone(), ChangeKind::Modified)],
    )
    .unwrap();
    assert!(changes.config_changed);
    assert!(changes.kinds.is_empty());
}

// =============================================================================
// Messages
// =============================================================================

#[test]
fn test_to_message_run() {
    let mut changes = Changes::default();
    changes.kinds.insert(SetKind::Styles);

    match to_message(changes) {
        BuildMsg::Run(trigger) => assert_eq!(trigger, Trigger::changed([SetKind::Styles])),
        other => panic!("unexpected message: {other:?}"),
    }
}

#[test]
fn test_config_change_supersedes_files() {
    let mut changes = Changes::default();
    changes.kinds.insert(SetKind::Scripts);
    changes.config_changed = true;

    assert!(matches!(to_message(changes), BuildMsg::ConfigChanged));
}
