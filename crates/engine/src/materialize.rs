//! Filesystem actions behind each classification.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

use crate::error::{SnapshotError, SnapshotResult};

/// Blocks copied between two interval-callback invocations.
const INTERVAL_BLOCKS: u64 = 10;

/// Block size used when the source does not report a preferred one.
const FALLBACK_BLOCK_SIZE: usize = 8192;

/// Creates one snapshot directory with mode 0770 (the process umask narrows
/// this further). An already-existing directory is fine: same-day reruns
/// revisit the tree they built earlier.
pub(crate) fn create_directory(destination: &Path) -> SnapshotResult<()> {
    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;

        builder.mode(0o770);
    }
    match builder.create(destination) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(error) => Err(SnapshotError::io("create directory", destination, error)),
    }
}

/// Creates the run's `DEST/YYYY/MM/DD/BASE` chain, all levels at mode 0770.
pub(crate) fn create_snapshot_root(destination: &Path) -> SnapshotResult<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;

        builder.mode(0o770);
    }
    builder
        .create(destination)
        .map_err(|error| SnapshotError::io("create snapshot directory", destination, error))
}

/// Copies `source` into `destination` block by block, invoking `interval`
/// every [`INTERVAL_BLOCKS`] blocks, then applies the source's timestamps
/// and mode. Returns the number of bytes written.
pub(crate) fn copy_file(
    source: &Path,
    destination: &Path,
    metadata: &fs::Metadata,
    mut interval: Option<&mut dyn FnMut()>,
) -> SnapshotResult<u64> {
    let mut reader =
        File::open(source).map_err(|error| SnapshotError::io("open", source, error))?;
    // Unlink rather than truncate: a leftover destination from an earlier
    // same-day run may share its inode with a prior snapshot.
    match fs::remove_file(destination) {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => return Err(SnapshotError::io("replace", destination, error)),
    }
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
        .map_err(|error| SnapshotError::io("create", destination, error))?;

    let mut buffer = vec![0u8; preferred_block_size(metadata)];
    let mut written = 0u64;
    let mut blocks = 0u64;
    loop {
        let count = reader
            .read(&mut buffer)
            .map_err(|error| SnapshotError::io("read", source, error))?;
        if count == 0 {
            break;
        }
        writer
            .write_all(&buffer[..count])
            .map_err(|error| SnapshotError::io("write", destination, error))?;
        written += count as u64;
        blocks += 1;
        if blocks % INTERVAL_BLOCKS == 0 {
            if let Some(callback) = interval.as_deref_mut() {
                callback();
            }
        }
    }
    drop(writer);

    pdumpfs_meta::apply_file_metadata(destination, metadata)?;
    Ok(written)
}

/// Hard-links `destination` to the prior snapshot's `prior` entry.
pub(crate) fn link_to_prior(prior: &Path, destination: &Path) -> SnapshotResult<()> {
    pdumpfs_meta::force_hard_link(prior, destination)?;
    Ok(())
}

/// Recreates the symlink at `source` under `destination` with identical
/// target text.
pub(crate) fn recreate_symlink(source: &Path, destination: &Path) -> SnapshotResult<()> {
    let target = pdumpfs_meta::read_link_target(source)?;
    pdumpfs_meta::force_symlink(&target, destination)?;
    Ok(())
}

fn preferred_block_size(metadata: &fs::Metadata) -> usize {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;

        let reported = metadata.blksize();
        if reported > 0 {
            return reported as usize;
        }
    }
    #[cfg(not(unix))]
    let _ = metadata;
    FALLBACK_BLOCK_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{set_file_mtime, FileTime};

    #[test]
    fn copy_preserves_contents_and_mtime() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("source.bin");
        let dest = temp.path().join("dest.bin");
        let payload: Vec<u8> = (0..100_000u32).map(|value| value as u8).collect();
        fs::write(&source, &payload).expect("write");
        let mtime = FileTime::from_unix_time(1_650_000_000, 0);
        set_file_mtime(&source, mtime).expect("mtime");

        let metadata = fs::symlink_metadata(&source).expect("lstat");
        let written = copy_file(&source, &dest, &metadata, None).expect("copy");

        assert_eq!(written, payload.len() as u64);
        assert_eq!(fs::read(&dest).expect("read"), payload);
        let dest_meta = fs::metadata(&dest).expect("metadata");
        assert_eq!(FileTime::from_last_modification_time(&dest_meta), mtime);
    }

    #[test]
    fn copy_replaces_existing_destination() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("source.bin");
        let dest = temp.path().join("dest.bin");
        fs::write(&source, b"new").expect("write source");
        fs::write(&dest, b"much longer old contents").expect("write dest");

        let metadata = fs::symlink_metadata(&source).expect("lstat");
        copy_file(&source, &dest, &metadata, None).expect("copy");
        assert_eq!(fs::read(&dest).expect("read"), b"new");
    }

    #[cfg(unix)]
    #[test]
    fn copy_breaks_hard_links_instead_of_writing_through_them() {
        use std::os::unix::fs::MetadataExt;

        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("source.bin");
        let dest = temp.path().join("dest.bin");
        let sibling = temp.path().join("sibling.bin");
        fs::write(&source, b"fresh").expect("write source");
        fs::write(&sibling, b"shared contents").expect("write sibling");
        fs::hard_link(&sibling, &dest).expect("link");

        let metadata = fs::symlink_metadata(&source).expect("lstat");
        copy_file(&source, &dest, &metadata, None).expect("copy");

        assert_eq!(fs::read(&sibling).expect("read"), b"shared contents");
        assert_ne!(
            fs::metadata(&sibling).expect("metadata").ino(),
            fs::metadata(&dest).expect("metadata").ino()
        );
    }

    #[test]
    fn interval_callback_fires_on_large_copies() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("big.bin");
        let dest = temp.path().join("copy.bin");
        let metadata_probe = || fs::symlink_metadata(&source).expect("lstat");

        // More than INTERVAL_BLOCKS blocks at whatever block size the
        // filesystem reports.
        fs::write(&source, vec![7u8; 4096]).expect("probe write");
        let block = super::preferred_block_size(&metadata_probe());
        fs::write(&source, vec![7u8; block * 25]).expect("write");

        let mut ticks = 0u32;
        let mut callback = || ticks += 1;
        let metadata = fs::symlink_metadata(&source).expect("lstat");
        copy_file(&source, &dest, &metadata, Some(&mut callback)).expect("copy");
        assert!(ticks >= 2, "expected at least two interval ticks, got {ticks}");
    }

    #[test]
    fn create_directory_tolerates_existing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().join("snapshot");
        create_directory(&dir).expect("first");
        create_directory(&dir).expect("second");
        assert!(dir.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn recreate_symlink_copies_target_text() {
        let temp = tempfile::tempdir().expect("tempdir");
        let link = temp.path().join("link");
        let copy = temp.path().join("copy");
        std::os::unix::fs::symlink("relative/target", &link).expect("symlink");

        recreate_symlink(&link, &copy).expect("recreate");
        assert_eq!(
            fs::read_link(&copy).expect("read link"),
            std::path::PathBuf::from("relative/target")
        );
    }
}
