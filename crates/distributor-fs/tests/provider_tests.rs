use std::fs;

use distributor_fs::{CreateOutcome, DirEntry, EntryKind, Error, FileSystem, LocalFileSystem};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::TempDir;

#[test]
fn test_list_missing_directory_is_none() {
    let temp = TempDir::new().unwrap();
    let listing = LocalFileSystem::new()
        .list_directory(&temp.path().join("mod_warehouse"))
        .unwrap();
    assert!(listing.is_none());
}

#[test]
fn test_list_directory_sorted_with_kinds() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("server")).unwrap();
    fs::write(temp.path().join("b.jar"), "b").unwrap();
    fs::write(temp.path().join("a.jar"), "a").unwrap();

    let listing = LocalFileSystem::new()
        .list_directory(temp.path())
        .unwrap()
        .unwrap();

    assert_eq!(
        listing,
        vec![
            DirEntry::new("a.jar", EntryKind::File),
            DirEntry::new("b.jar", EntryKind::File),
            DirEntry::new("server", EntryKind::Directory),
        ]
    );
}

#[test]
fn test_list_file_is_not_a_directory() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("mods");
    fs::write(&file, "oops").unwrap();

    let err = LocalFileSystem::new().list_directory(&file).unwrap_err();
    assert!(matches!(err, Error::NotADirectory { .. }));
    assert_eq!(err.path(), file.as_path());
}

#[test]
fn test_create_directory_creates_parents() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("mod_warehouse/mods/server");

    let outcome = LocalFileSystem::new().create_directory(&target).unwrap();

    assert_eq!(outcome, CreateOutcome::Created);
    assert!(target.is_dir());
}

#[rstest]
#[case("mods")]
#[case("mods/server")]
fn test_create_existing_directory_is_idempotent(#[case] relative: &str) {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join(relative);
    fs::create_dir_all(&target).unwrap();

    let fs_provider = LocalFileSystem::new();
    assert_eq!(
        fs_provider.create_directory(&target).unwrap(),
        CreateOutcome::AlreadyExists
    );
    assert_eq!(
        fs_provider.create_directory(&target).unwrap(),
        CreateOutcome::AlreadyExists
    );
}

#[test]
fn test_create_directory_over_file_fails() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("archives");
    fs::write(&target, "not a folder").unwrap();

    let err = LocalFileSystem::new().create_directory(&target).unwrap_err();
    assert!(matches!(err, Error::NotADirectory { .. }));
}

#[test]
fn test_read_write_roundtrip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("distribution-config.toml");
    let provider = LocalFileSystem::new();

    assert!(provider.read_file(&path).unwrap().is_none());
    provider.write_file(&path, b"[FTP]\nhost = \"\"\n").unwrap();
    assert_eq!(
        provider.read_file(&path).unwrap().unwrap(),
        b"[FTP]\nhost = \"\"\n".to_vec()
    );
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_is_skipped() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.jar"), "a").unwrap();
    std::os::unix::fs::symlink(temp.path().join("gone.jar"), temp.path().join("broken.jar"))
        .unwrap();

    let listing = LocalFileSystem::new()
        .list_directory(temp.path())
        .unwrap()
        .unwrap();

    assert_eq!(listing, vec![DirEntry::new("a.jar", EntryKind::File)]);
}

#[cfg(unix)]
#[test]
fn test_symlinked_folder_counts_as_directory() {
    let temp = TempDir::new().unwrap();
    let real = temp.path().join("real");
    fs::create_dir(&real).unwrap();
    let listed = temp.path().join("listed");
    fs::create_dir(&listed).unwrap();
    std::os::unix::fs::symlink(&real, listed.join("server")).unwrap();

    let listing = LocalFileSystem::new().list_directory(&listed).unwrap().unwrap();

    assert_eq!(listing, vec![DirEntry::new("server", EntryKind::Directory)]);
}
