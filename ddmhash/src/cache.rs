/// Epoch seed derivation, cache construction and the Light handle.
///
/// The cache is a small node array derived from the epoch seed by SHA3-512
/// chaining plus three rounds of RandMemoHash. A [`Light`] handle owns one
/// cache and can derive any dataset node on demand, which is all the
/// verification path ever needs.
use tracing::info;

use crate::error::{DdmhashError, Result};
use crate::fnv::fnv_hash;
use crate::hashimoto::{hashimoto, Lookup};
use crate::keccak::{keccak_256, keccak_512};
use crate::sizes::{epoch, get_cache_size, get_data_size};
use crate::types::{Node, PowOutput, H256, NODE_WORDS};
use crate::{CACHE_ROUNDS, DATASET_PARENTS, HASH_BYTES};

/// Derive the 32-byte epoch seed for a block number.
///
/// The seed is SHA3-256 applied `epoch` times to a zero buffer, so epoch 0
/// has the all-zero seed.
pub fn seedhash(block_number: u64) -> H256 {
    let mut seed = H256::default();
    for _ in 0..epoch(block_number) {
        seed = H256(keccak_256(seed.as_bytes()));
    }
    seed
}

/// Build the cache node array for a seed.
///
/// `cache_size` must be a positive multiple of the node size.
fn compute_cache_nodes(cache_size: u64, seed: &H256) -> Result<Box<[Node]>> {
    if cache_size == 0 || cache_size % HASH_BYTES as u64 != 0 {
        return Err(DdmhashError::InvalidCacheSize(cache_size));
    }
    let num_nodes = (cache_size / HASH_BYTES as u64) as usize;
    let mut nodes = vec![Node::default(); num_nodes];

    nodes[0].bytes = keccak_512(seed.as_bytes());
    for i in 1..num_nodes {
        nodes[i].bytes = keccak_512(&nodes[i - 1].bytes);
    }

    for _ in 0..CACHE_ROUNDS {
        for i in 0..num_nodes {
            let idx = (nodes[i].word(0) % num_nodes as u32) as usize;
            let mut data = nodes[(num_nodes - 1 + i) % num_nodes];
            for (byte, other) in data.bytes.iter_mut().zip(nodes[idx].bytes.iter()) {
                *byte ^= other;
            }
            nodes[i].bytes = keccak_512(&data.bytes);
        }
    }

    // Nodes are kept as little-endian byte arrays; the word accessors decode
    // on demand, so no host-order normalization pass is needed here.
    Ok(nodes.into_boxed_slice())
}

/// Light verification handle: the per-epoch cache plus its block number.
///
/// The cache is immutable after construction and safe to share across
/// threads; dropping the handle frees it.
pub struct Light {
    cache: Box<[Node]>,
    block_number: u64,
}

impl Light {
    /// Build the cache for the epoch of `block_number`.
    pub fn new(block_number: u64) -> Result<Self> {
        let cache_size = get_cache_size(block_number);
        info!(block_number, cache_size, "building light cache");
        let mut light = Self::with_cache_size(cache_size, &seedhash(block_number))?;
        light.block_number = block_number;
        Ok(light)
    }

    /// Build a handle with an explicit cache size and seed.
    ///
    /// This is the reduced-size entry point used to exercise the engine
    /// without multi-gigabyte datasets; the resulting handle reports block
    /// number 0.
    pub fn with_cache_size(cache_size: u64, seed: &H256) -> Result<Self> {
        Ok(Self {
            cache: compute_cache_nodes(cache_size, seed)?,
            block_number: 0,
        })
    }

    /// Block number the handle was created for.
    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    /// Cache size in bytes.
    pub fn cache_size(&self) -> u64 {
        (self.cache.len() * HASH_BYTES) as u64
    }

    /// Deterministically compute the `index`-th 64-byte dataset node.
    ///
    /// Pure and independent of every other item, which is what makes both
    /// the on-demand light path and the parallel full-DAG build possible.
    pub fn calc_dataset_item(&self, index: u32) -> Node {
        let num_parent_nodes = self.cache.len() as u32;

        let init = &self.cache[(index % num_parent_nodes) as usize];
        let mut mix = init.words();
        mix[0] ^= index;
        let mut item = Node::from_words(mix);
        item.bytes = keccak_512(&item.bytes);

        let mut mix = item.words();
        for i in 0..DATASET_PARENTS {
            let parent_index =
                fnv_hash(index ^ i, mix[(i as usize) % NODE_WORDS]) % num_parent_nodes;
            let parent = &self.cache[parent_index as usize];
            for w in 0..NODE_WORDS {
                mix[w] = fnv_hash(mix[w], parent.word(w));
            }
        }

        let mut item = Node::from_words(mix);
        item.bytes = keccak_512(&item.bytes);
        item
    }

    /// Compute `(result, mix_hash)` for a header and nonce, deriving every
    /// accessed dataset node from the cache.
    pub fn compute(&self, header_hash: &H256, nonce: u64) -> Result<PowOutput> {
        self.compute_with_size(get_data_size(self.block_number), header_hash, nonce)
    }

    /// Compute against an explicit dataset size.
    pub fn compute_with_size(
        &self,
        full_size: u64,
        header_hash: &H256,
        nonce: u64,
    ) -> Result<PowOutput> {
        hashimoto(Lookup::Light(self), full_size, header_hash, nonce)
    }
}
