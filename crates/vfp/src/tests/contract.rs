// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Behavioral contract shared by every provider.
//!
//! Each `check_*` takes an empty root directory and exercises one property;
//! `provider_contract!` runs every check against a provider constructor.

use crate::{
    DirHandle, Entry, EntryType, Error, ErrorKind, GenericInit, HostProvider, MemoryProvider,
    SHA512_LEN, VirtualFileProvider,
};
use sha2::{Digest, Sha512};

async fn new_file(root: &DirHandle, name: &[u8], contents: &[u8]) -> crate::FileHandle {
    let file = root.create_file(name).await.unwrap();
    file.write(contents).await.unwrap();
    file
}

pub async fn check_read_whole_equals_range(root: DirHandle) {
    let file = new_file(&root, b"f", b"0123456789").await;
    let size = file.size().await.unwrap();
    assert_eq!(size, 10);
    assert_eq!(
        file.read().await.unwrap(),
        file.read_range(0, size as usize).await.unwrap()
    );
    assert_eq!(file.read_range(3, 4).await.unwrap(), b"3456");
    assert_eq!(file.read_range(10, 0).await.unwrap(), b"");
}

pub async fn check_read_out_of_bounds(root: DirHandle) {
    let file = new_file(&root, b"f", b"abcdef").await;

    for (offset, count) in [(0, 7), (4, 3), (7, 0), (u64::MAX, 1)] {
        let err = file.read_range(offset, count).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Bounds, "offset {} count {}", offset, count);
    }
    assert_eq!(file.read().await.unwrap(), b"abcdef");
    assert_eq!(file.size().await.unwrap(), 6);
}

pub async fn check_write_is_idempotent(root: DirHandle) {
    let file = new_file(&root, b"f", b"old contents that are long").await;

    file.write(b"new").await.unwrap();
    let once = file.read().await.unwrap();
    file.write(b"new").await.unwrap();
    assert_eq!(file.read().await.unwrap(), once);
    assert_eq!(once, b"new");
    assert_eq!(file.size().await.unwrap(), 3);

    file.write(b"").await.unwrap();
    assert_eq!(file.size().await.unwrap(), 0);
}

pub async fn check_write_at(root: DirHandle) {
    let file = new_file(&root, b"f", b"hello").await;

    file.write_at(1, b"EL").await.unwrap();
    assert_eq!(file.read().await.unwrap(), b"hELlo");

    // Writing past the end grows the file
    file.write_at(4, b"O world").await.unwrap();
    file.write_at(4, b"O world").await.unwrap();
    assert_eq!(file.read().await.unwrap(), b"hELlO world");

    // Appending at exactly the end is allowed
    file.write_at(11, b"!").await.unwrap();
    assert_eq!(file.read().await.unwrap(), b"hELlO world!");

    let err = file.write_at(13, b"?").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Bounds);
    assert_eq!(file.read().await.unwrap(), b"hELlO world!");
}

pub async fn check_resize(root: DirHandle) {
    let file = new_file(&root, b"f", b"abcdef").await;

    file.resize(3).await.unwrap();
    file.resize(3).await.unwrap();
    assert_eq!(file.read().await.unwrap(), b"abc");

    file.resize(6).await.unwrap();
    assert_eq!(file.read().await.unwrap(), b"abc\0\0\0");
    assert_eq!(file.size().await.unwrap(), 6);

    file.resize(0).await.unwrap();
    assert_eq!(file.read().await.unwrap(), b"");
}

pub async fn check_sha512_tracks_contents(root: DirHandle) {
    let file = new_file(&root, b"f", b"first").await;

    let Some(digest) = file.sha512().await.unwrap() else {
        return;
    };
    assert_eq!(digest.len(), SHA512_LEN);
    assert_eq!(digest.as_slice(), Sha512::digest(b"first").as_slice());

    file.write(b"second").await.unwrap();
    let digest = file.sha512().await.unwrap().unwrap();
    assert_eq!(digest.as_slice(), Sha512::digest(b"second").as_slice());
}

pub async fn check_last_modified(root: DirHandle) {
    let file = new_file(&root, b"f", b"x").await;
    if let Some(ms) = file.last_modified().await.unwrap() {
        // Sometime after 2020-01-01
        assert!(ms > 1_577_836_800_000);
    }
}

pub async fn check_create_file_is_idempotent(root: DirHandle) {
    let first = root.create_file(b"a.txt").await.unwrap();
    let second = root.create_file(b"a.txt").await.unwrap();
    assert_eq!(first.name(), b"a.txt");

    first.write(b"shared").await.unwrap();
    assert_eq!(second.read().await.unwrap(), b"shared");

    // Opening an existing file does not truncate it
    let third = root.create_file(b"a.txt").await.unwrap();
    assert_eq!(third.read().await.unwrap(), b"shared");

    let listing = root.list().await.unwrap();
    assert_eq!(listing.len(), 1);
    assert!(matches!(listing.get(b"a.txt".as_slice()), Some(Entry::File(_))));
}

pub async fn check_create_directory_is_idempotent(root: DirHandle) {
    let first = root.create_directory(b"d").await.unwrap();
    let _ = first.create_file(b"inner").await.unwrap();
    let second = root.create_directory(b"d").await.unwrap();
    assert_eq!(second.name(), Some(b"d".as_slice()));

    let inner = second.list().await.unwrap();
    assert_eq!(inner.keys().collect::<Vec<_>>(), vec![&b"inner".to_vec()]);

    let listing = root.list().await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[b"d".as_slice()].entry_type(), EntryType::Directory);
}

pub async fn check_kind_conflict(root: DirHandle) {
    let _ = new_file(&root, b"file", b"keep").await;
    let _ = root.create_directory(b"dir").await.unwrap();

    match root.create_directory(b"file").await.unwrap_err() {
        Error::KindConflict { existing, .. } => assert_eq!(existing, EntryType::File),
        other => panic!("unexpected {:?}", other),
    }
    match root.create_file(b"dir").await.unwrap_err() {
        Error::KindConflict { existing, .. } => assert_eq!(existing, EntryType::Directory),
        other => panic!("unexpected {:?}", other),
    }

    let listing = root.list().await.unwrap();
    assert_eq!(listing[b"file".as_slice()].entry_type(), EntryType::File);
    assert_eq!(listing[b"dir".as_slice()].entry_type(), EntryType::Directory);
    let file = listing[b"file".as_slice()].as_file().unwrap();
    assert_eq!(file.read().await.unwrap(), b"keep");
}

pub async fn check_delete_missing_is_noop(root: DirHandle) {
    let _ = new_file(&root, b"present", b"1").await;
    let before: Vec<_> = root.list().await.unwrap().into_keys().collect();

    root.delete(b"absent").await.unwrap();
    root.delete(b"absent").await.unwrap();

    let after: Vec<_> = root.list().await.unwrap().into_keys().collect();
    assert_eq!(before, after);
}

pub async fn check_delete_file(root: DirHandle) {
    let file = new_file(&root, b"f", b"bytes").await;
    root.delete(b"f").await.unwrap();
    root.delete(b"f").await.unwrap();

    assert!(root.list().await.unwrap().is_empty());
    let err = file.read().await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "unexpected {:?}", err);
    assert_eq!(err.kind(), ErrorKind::Io);
}

pub async fn check_delete_empty_directory(root: DirHandle) {
    let _ = root.create_directory(b"empty").await.unwrap();
    root.delete(b"empty").await.unwrap();
    assert!(root.list().await.unwrap().is_empty());
}

pub async fn check_delete_directory_recursively(root: DirHandle) {
    let top = root.create_directory(b"top").await.unwrap();
    let nested = top.create_directory(b"nested").await.unwrap();
    let deep = new_file(&nested, b"deep", b"data").await;
    let _ = new_file(&top, b"shallow", b"data").await;

    root.delete(b"top").await.unwrap();
    assert!(root.list().await.unwrap().is_empty());

    assert_eq!(nested.list().await.unwrap_err().kind(), ErrorKind::Io);
    assert_eq!(deep.size().await.unwrap_err().kind(), ErrorKind::Io);
    assert_eq!(top.create_file(b"new").await.unwrap_err().kind(), ErrorKind::Io);

    // The name is free again, and comes back empty
    let top = root.create_directory(b"top").await.unwrap();
    assert!(top.list().await.unwrap().is_empty());
}

pub async fn check_invalid_names(root: DirHandle) {
    for name in [&b""[..], &b"."[..], &b".."[..], &b"a/b"[..], &b"nul\0"[..]] {
        let err = root.create_file(name).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument, "{:?}", name);
        let err = root.create_directory(name).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument, "{:?}", name);
        let err = root.delete(name).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument, "{:?}", name);
    }
    assert!(root.list().await.unwrap().is_empty());
}

pub async fn check_raw_byte_names(root: DirHandle) {
    let name = [b'n', 0xff, 0xfe, b'x'];
    let file = new_file(&root, &name, b"raw").await;
    assert_eq!(file.name(), name.as_slice());

    let listing = root.list().await.unwrap();
    let entry = listing.get(name.as_slice()).unwrap();
    assert_eq!(entry.as_file().unwrap().read().await.unwrap(), b"raw");

    root.delete(&name).await.unwrap();
    assert!(root.list().await.unwrap().is_empty());
}

pub async fn check_root_and_nested_names(root: DirHandle) {
    assert_eq!(root.name(), None);
    let sub = root.create_directory(b"sub").await.unwrap();
    let file = sub.create_file(b"leaf").await.unwrap();
    assert_eq!(sub.name(), Some(b"sub".as_slice()));
    assert_eq!(file.name(), b"leaf");

    let listing = root.list().await.unwrap();
    let sub_again = listing[b"sub".as_slice()].as_dir().unwrap();
    assert!(sub_again.list().await.unwrap().contains_key(b"leaf".as_slice()));
    assert!(listing[b"sub".as_slice()].as_file().is_err());
}

pub async fn check_end_to_end(root: DirHandle) {
    let file = root.create_file(b"a.txt").await.unwrap();
    file.write(b"hello").await.unwrap();
    assert_eq!(file.read().await.unwrap(), b"hello");
    file.resize(2).await.unwrap();
    assert_eq!(file.read().await.unwrap(), b"he");
    root.delete(b"a.txt").await.unwrap();
    assert!(root.list().await.unwrap().is_empty());
}

/// Generate one `#[tokio::test]` per contract check for a provider.
///
/// `$root` is an async expression yielding `(guard, DirHandle)`; the guard
/// is kept alive for the duration of the test.
macro_rules! provider_contract {
    ($provider:ident, $root:expr) => {
        mod $provider {
            use super::*;

            provider_contract!(@tests $root;
                check_read_whole_equals_range,
                check_read_out_of_bounds,
                check_write_is_idempotent,
                check_write_at,
                check_resize,
                check_sha512_tracks_contents,
                check_last_modified,
                check_create_file_is_idempotent,
                check_create_directory_is_idempotent,
                check_kind_conflict,
                check_delete_missing_is_noop,
                check_delete_file,
                check_delete_empty_directory,
                check_delete_directory_recursively,
                check_invalid_names,
                check_root_and_nested_names,
                check_end_to_end,
            );
        }
    };
    (@tests $root:expr; $($check:ident),* $(,)?) => {
        $(
            #[tokio::test]
            async fn $check() {
                let (_guard, root) = $root.await;
                super::$check(root).await;
            }
        )*
    };
}

async fn memory_root() -> ((), DirHandle) {
    let provider = MemoryProvider::init(MemoryProvider::template()).await.unwrap();
    ((), provider.root())
}

async fn hostmount_root() -> (tempfile::TempDir, DirHandle) {
    let dir = tempfile::TempDir::new().unwrap();
    let mut arguments = HostProvider::template();
    arguments[0]
        .set_from_str(&dir.path().display().to_string())
        .unwrap();
    let provider = HostProvider::init(arguments).await.unwrap();
    (dir, provider.root())
}

provider_contract!(memory, memory_root());
provider_contract!(hostmount, hostmount_root());

#[tokio::test]
async fn memory_raw_byte_names() {
    let (_guard, root) = memory_root().await;
    check_raw_byte_names(root).await;
}

#[cfg(unix)]
#[tokio::test]
async fn hostmount_raw_byte_names() {
    let (_guard, root) = hostmount_root().await;
    check_raw_byte_names(root).await;
}
