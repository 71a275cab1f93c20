//! DDMhash - Dagger-Hashimoto proof-of-work engine
//!
//! Given a block number, a header hash and a 64-bit nonce, the engine
//! produces a 256-bit result hash together with a 256-bit mix digest. Two
//! operating modes are provided: [`Light`] keeps only the per-epoch cache in
//! memory and derives dataset nodes on demand; [`Full`] materializes the
//! complete DAG once, persists it to a memory-mapped file and serves all
//! subsequent hashes from the mapping.

pub mod cache;
pub mod dag;
pub mod error;
pub mod fnv;
pub mod hashimoto;
pub mod io;
pub mod keccak;
pub mod sizes;
pub mod types;

// Re-export main types
pub use cache::{seedhash, Light};
pub use dag::{compute_full_data, Full, ProgressCallback};
pub use error::{DdmhashError, Result};
pub use hashimoto::{quick_check_difficulty, quick_hash};
pub use io::default_dir;
pub use sizes::{epoch, get_cache_size, get_data_size, MAX_EPOCH};
pub use types::{Node, PowOutput, H256};

/// DAG file format revision; part of the file name so that format changes
/// invalidate old files.
pub const REVISION: u32 = 23;
/// Number of consecutive blocks sharing one cache and one DAG.
pub const EPOCH_LENGTH: u64 = 30000;
/// Size of a dataset node in bytes.
pub const HASH_BYTES: usize = 64;
/// Width of the Hashimoto mix in bytes.
pub const MIX_BYTES: usize = 128;
/// Number of cache parents folded into each dataset item.
pub const DATASET_PARENTS: u32 = 256;
/// RandMemoHash rounds applied to the cache.
pub const CACHE_ROUNDS: usize = 3;
/// Dataset accesses per Hashimoto invocation.
pub const ACCESSES: usize = 64;
/// Sentinel at the head of a DAG file, confirming format integrity.
pub const DAG_MAGIC: u64 = 0xFEE1_DEAD_BADD_CAFE;
