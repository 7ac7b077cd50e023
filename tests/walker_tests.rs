use pathcheck::scanner::{CancelToken, PathWalker, WalkItem};
use pathcheck::WalkError;
use std::fs;
use std::path::{Path, PathBuf};

fn build_tree(root: &Path) {
    fs::write(root.join("a.txt"), b"aaaa").unwrap();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub").join("b.txt"), b"bb").unwrap();
    fs::create_dir(root.join("sub").join("deeper")).unwrap();
    fs::write(root.join("sub").join("deeper").join("c.txt"), b"c").unwrap();
}

fn walk(walker: PathWalker) -> Vec<WalkItem> {
    walker.spawn().unwrap().collect()
}

fn record_paths(items: &[WalkItem]) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = items
        .iter()
        .filter_map(|item| item.as_ref().ok())
        .map(|record| record.path.clone())
        .collect();
    paths.sort();
    paths
}

#[test]
fn test_flat_walk_emits_subdirectory_but_not_its_contents() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());
    let root = dir.path().canonicalize().unwrap();

    let items = walk(PathWalker::new(&root, CancelToken::new()));

    assert!(items.iter().all(Result::is_ok));
    assert_eq!(
        record_paths(&items),
        vec![root.clone(), root.join("a.txt"), root.join("sub")]
    );
}

#[test]
fn test_recursive_walk_visits_whole_tree() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());
    let root = dir.path().canonicalize().unwrap();

    let items = walk(PathWalker::new(&root, CancelToken::new()).recursive(true));

    assert_eq!(record_paths(&items).len(), 6);
    let first = items[0].as_ref().unwrap();
    assert_eq!(first.path, root);
    assert!(first.is_dir);
}

#[test]
fn test_excluded_directory_is_skipped_with_its_subtree() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());
    let root = dir.path().canonicalize().unwrap();
    // spelled with a redundant component and a trailing separator
    let exclusion = PathBuf::from(format!("{}/./sub/", root.display()));

    let items = walk(
        PathWalker::new(&root, CancelToken::new())
            .recursive(true)
            .exclusions(&[exclusion]),
    );

    let ignored: Vec<&PathBuf> = items
        .iter()
        .filter_map(|item| match item {
            Err(WalkError::Ignored(path)) => Some(path),
            _ => None,
        })
        .collect();
    assert_eq!(ignored, vec![&root.join("sub")]);
    assert_eq!(record_paths(&items), vec![root.clone(), root.join("a.txt")]);
}

#[test]
fn test_missing_root_yields_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent");

    let items = walk(PathWalker::new(&missing, CancelToken::new()));

    assert_eq!(items.len(), 1);
    assert!(matches!(&items[0], Err(WalkError::NotFound(path)) if path.ends_with("absent")));
    assert!(items[0].as_ref().unwrap_err().is_tolerable(true));
    assert!(!items[0].as_ref().unwrap_err().is_tolerable(false));
}

#[test]
fn test_single_file_root() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("only.log");
    fs::write(&file, b"12345").unwrap();

    let items = walk(PathWalker::new(&file, CancelToken::new()).recursive(true));

    assert_eq!(items.len(), 1);
    let record = items[0].as_ref().unwrap();
    assert!(!record.is_dir);
    assert_eq!(record.size, 5);
    assert_eq!(record.name(), "only.log");
}

#[test]
fn test_cancellation_allows_at_most_one_more_result() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..50 {
        fs::write(dir.path().join(format!("f{:02}", i)), b"x").unwrap();
    }

    let cancel = CancelToken::new();
    let mut stream = PathWalker::new(dir.path(), cancel.clone())
        .spawn()
        .unwrap();

    assert!(stream.next().unwrap().is_ok());
    assert!(cancel.cancel());

    let rest: Vec<WalkItem> = stream.collect();
    let records_after = rest.iter().filter(|item| item.is_ok()).count();
    assert!(records_after <= 1, "{} records after cancel", records_after);
    assert!(matches!(rest.last(), Some(Err(WalkError::Canceled))));
}

#[test]
fn test_dropping_stream_stops_walker() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());

    let mut stream = PathWalker::new(dir.path(), CancelToken::new())
        .recursive(true)
        .spawn()
        .unwrap();
    assert!(stream.next().is_some());
    // joins the walker thread; hangs if the walker cannot observe the disconnect
    drop(stream);
}
