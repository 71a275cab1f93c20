/// Full-DAG generation and the memory-mapped Full handle.
///
/// The dataset for an epoch exceeds a gigabyte, so a [`Full`] handle never
/// holds it in anonymous memory: the per-epoch file is laid out first,
/// mapped shared, populated in place, and stamped with the magic only once
/// generation finished. A later construction for the same epoch maps the
/// existing file and skips generation entirely.
use std::fs::File;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use memmap2::MmapMut;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::cache::{seedhash, Light};
use crate::error::{DdmhashError, Result};
use crate::hashimoto::{hashimoto, Lookup};
use crate::io::{prepare, Prepared, DAG_MAGIC_SIZE};
use crate::sizes::get_data_size;
use crate::types::{PowOutput, H256};
use crate::{DAG_MAGIC, HASH_BYTES, MIX_BYTES};

/// Progress callback for DAG generation: receives a percentage in
/// `[0, 100]` and returns `false` to cancel the build.
pub type ProgressCallback<'a> = &'a mut dyn FnMut(u32) -> bool;

/// Materialize every dataset item of `light`'s epoch into `mem`.
///
/// `mem.len()` must be a positive multiple of the mix width. The callback,
/// when present, fires every `max_n / 100` items with the completed
/// percentage; item generation within a stride runs in parallel, so reported
/// progress stays monotonically non-decreasing and cancellation takes effect
/// at percent boundaries.
pub fn compute_full_data(
    mem: &mut [u8],
    light: &Light,
    mut callback: Option<ProgressCallback<'_>>,
) -> Result<()> {
    let full_size = mem.len() as u64;
    if full_size == 0
        || full_size % MIX_BYTES as u64 != 0
        || full_size % HASH_BYTES as u64 != 0
    {
        return Err(DdmhashError::InvalidDataSize(full_size));
    }

    let max_n = mem.len() / HASH_BYTES;
    let stride = (max_n / 100).max(1);
    let mut done = 0usize;
    for chunk in mem.chunks_mut(stride * HASH_BYTES) {
        if let Some(cb) = callback.as_mut() {
            let percent = ((done * 100 + max_n - 1) / max_n) as u32;
            if !cb(percent) {
                return Err(DdmhashError::Cancelled);
            }
        }
        chunk
            .par_chunks_mut(HASH_BYTES)
            .enumerate()
            .for_each(|(i, out)| {
                let item = light.calc_dataset_item((done + i) as u32);
                out.copy_from_slice(&item.bytes);
            });
        done += chunk.len() / HASH_BYTES;
    }
    Ok(())
}

/// Full handle: the complete dataset, served from a shared file mapping.
///
/// Compute calls are read-only and safe to issue from multiple threads.
/// Dropping the handle unmaps the dataset and closes the backing file.
pub struct Full {
    map: MmapMut,
    // Keeps the descriptor owned by the handle for the mapping's lifetime.
    _file: File,
    full_size: u64,
}

impl Full {
    /// Build or memo-load the DAG for `light`'s epoch in the default
    /// per-user directory.
    pub fn new(light: &Light, callback: Option<ProgressCallback<'_>>) -> Result<Self> {
        let dir = crate::io::default_dir().ok_or_else(|| {
            DdmhashError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not determine the DAG directory",
            ))
        })?;
        Self::new_in(&dir, light, callback)
    }

    /// Build or memo-load the DAG for `light`'s epoch in an explicit
    /// directory.
    pub fn new_in(
        dir: &Path,
        light: &Light,
        callback: Option<ProgressCallback<'_>>,
    ) -> Result<Self> {
        let block_number = light.block_number();
        Self::with_size(
            dir,
            &seedhash(block_number),
            get_data_size(block_number),
            light,
            callback,
        )
    }

    /// Build or memo-load a DAG of an explicit size for an explicit seed.
    ///
    /// The light handle is only borrowed for the duration of construction;
    /// the resulting handle is self-sufficient.
    pub fn with_size(
        dir: &Path,
        seed: &H256,
        full_size: u64,
        light: &Light,
        callback: Option<ProgressCallback<'_>>,
    ) -> Result<Self> {
        let (file, fresh) = match prepare(dir, seed, full_size, false)? {
            Prepared::Match(file) => (file, false),
            Prepared::Fresh(file) => (file, true),
            Prepared::SizeMismatch => {
                warn!(full_size, "existing DAG file has unexpected size or magic, recreating");
                match prepare(dir, seed, full_size, true)? {
                    Prepared::Fresh(file) => (file, true),
                    _ => return Err(DdmhashError::DagMismatch),
                }
            }
        };

        let mut map = unsafe { MmapMut::map_mut(&file) }.map_err(DdmhashError::Mmap)?;
        debug_assert_eq!(map.len() as u64, full_size + DAG_MAGIC_SIZE);

        if fresh {
            info!(full_size, "generating DAG dataset");
            compute_full_data(&mut map[DAG_MAGIC_SIZE as usize..], light, callback)?;
            LittleEndian::write_u64(&mut map[..DAG_MAGIC_SIZE as usize], DAG_MAGIC);
            map.flush()?;
            info!("DAG generation complete");
        } else {
            info!(full_size, "memory-mapped existing DAG file");
        }

        Ok(Self {
            map,
            _file: file,
            full_size,
        })
    }

    /// Compute `(result, mix_hash)` for a header and nonce from the mapped
    /// dataset.
    pub fn compute(&self, header_hash: &H256, nonce: u64) -> Result<PowOutput> {
        hashimoto(Lookup::Full(self.dataset()), self.full_size, header_hash, nonce)
    }

    /// The raw mapped dataset, magic excluded.
    pub fn dataset(&self) -> &[u8] {
        &self.map[DAG_MAGIC_SIZE as usize..]
    }

    /// Dataset size in bytes.
    pub fn size(&self) -> u64 {
        self.full_size
    }
}
