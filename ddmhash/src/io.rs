/// DAG file discovery and preparation.
///
/// A DAG file is the 8-byte magic followed by the raw dataset, named
/// `full-R{REVISION}-{seed fragment}` inside a per-user directory. The
/// [`prepare`] state machine decides whether an existing file can be trusted
/// or a fresh one has to be laid out.
use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};

use crate::error::Result;
use crate::types::H256;
use crate::{DAG_MAGIC, REVISION};

/// Bytes of magic preceding the dataset in a DAG file.
pub(crate) const DAG_MAGIC_SIZE: u64 = 8;

/// Per-user default DAG directory.
///
/// `$HOME/.ddmhash` on Unix-like systems, `%LOCALAPPDATA%\DDMhash` on
/// Windows. Returns `None` when the environment probe fails; every
/// constructor also accepts an explicit directory instead.
pub fn default_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    return dirs::data_local_dir().map(|dir| dir.join("DDMhash"));
    #[cfg(not(windows))]
    dirs::home_dir().map(|dir| dir.join(".ddmhash"))
}

/// File name for the DAG of an epoch: the revision plus the first 8 seed
/// bytes rendered as a big-endian hex u64 (the original's little-endian
/// load, byte-swapped).
pub(crate) fn dag_file_name(seed: &H256) -> String {
    let fragment = BigEndian::read_u64(&seed.as_bytes()[..8]);
    format!("full-R{REVISION}-{fragment:016x}")
}

/// Outcome of preparing a DAG file.
pub(crate) enum Prepared {
    /// Existing file with the right length and magic; its dataset can be
    /// trusted as-is.
    Match(File),
    /// Freshly laid-out file of the right length, contents undefined and
    /// magic not yet written.
    Fresh(File),
    /// Existing file with the wrong length or magic; the caller re-enters
    /// with `force_create` to replace it.
    SizeMismatch,
}

/// Prepare the DAG file for `seed` in `dir`.
///
/// Without `force_create`, an existing file is validated (length must be
/// `full_size` plus the magic, and the magic must match). With it, the file
/// is created or truncated and extended to its final length so it can be
/// memory-mapped before generation runs.
pub(crate) fn prepare(
    dir: &Path,
    seed: &H256,
    full_size: u64,
    force_create: bool,
) -> Result<Prepared> {
    create_dag_dir(dir)?;
    let path = dir.join(dag_file_name(seed));

    if !force_create {
        if let Ok(mut file) = OpenOptions::new().read(true).write(true).open(&path) {
            let found_size = file.metadata()?.len();
            if found_size != full_size + DAG_MAGIC_SIZE {
                return Ok(Prepared::SizeMismatch);
            }
            return match file.read_u64::<LittleEndian>() {
                Ok(magic) if magic == DAG_MAGIC => Ok(Prepared::Match(file)),
                _ => Ok(Prepared::SizeMismatch),
            };
        }
    }

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)?;
    if let Err(err) = extend_to(&mut file, full_size + DAG_MAGIC_SIZE) {
        // Do not leave a zero-length file behind to poison later runs.
        drop(file);
        let _ = fs::remove_file(&path);
        return Err(err.into());
    }
    Ok(Prepared::Fresh(file))
}

fn extend_to(file: &mut File, len: u64) -> std::io::Result<()> {
    file.seek(SeekFrom::Start(len - 1))?;
    file.write_all(b"\n")?;
    file.flush()
}

#[cfg(unix)]
fn create_dag_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o755).create(dir)
}

#[cfg(not(unix))]
fn create_dag_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use tempfile::tempdir;

    #[test]
    fn test_dag_file_name() {
        assert_eq!(dag_file_name(&H256::default()), "full-R23-0000000000000000");

        let mut seed = H256::default();
        seed.0[..8].copy_from_slice(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        assert_eq!(dag_file_name(&seed), "full-R23-0102030405060708");
    }

    #[test]
    fn test_prepare_lifecycle() {
        let dir = tempdir().unwrap();
        let seed = H256::default();
        let size = 4096u64;
        let path = dir.path().join(dag_file_name(&seed));

        // Absent file: laid out fresh at its final length.
        let prepared = prepare(dir.path(), &seed, size, false).unwrap();
        assert!(matches!(prepared, Prepared::Fresh(_)));
        assert_eq!(fs::metadata(&path).unwrap().len(), size + DAG_MAGIC_SIZE);

        // Right length but no magic yet: treated as a mismatch.
        assert!(matches!(
            prepare(dir.path(), &seed, size, false).unwrap(),
            Prepared::SizeMismatch
        ));

        // With the magic in place the file is trusted.
        let mut file = OpenOptions::new().write(true).open(&path).unwrap();
        file.write_u64::<LittleEndian>(DAG_MAGIC).unwrap();
        drop(file);
        assert!(matches!(
            prepare(dir.path(), &seed, size, false).unwrap(),
            Prepared::Match(_)
        ));

        // A different target size no longer matches.
        assert!(matches!(
            prepare(dir.path(), &seed, size * 2, false).unwrap(),
            Prepared::SizeMismatch
        ));

        // Truncating by one byte invalidates the file.
        let file = OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len(size + DAG_MAGIC_SIZE - 1).unwrap();
        drop(file);
        assert!(matches!(
            prepare(dir.path(), &seed, size, false).unwrap(),
            Prepared::SizeMismatch
        ));

        // Forced creation replaces whatever is there.
        assert!(matches!(
            prepare(dir.path(), &seed, size, true).unwrap(),
            Prepared::Fresh(_)
        ));
        assert_eq!(fs::metadata(&path).unwrap().len(), size + DAG_MAGIC_SIZE);
    }
}
