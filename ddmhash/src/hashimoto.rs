/// The Hashimoto mixer: the actual proof-of-work.
///
/// A 128-byte mix is seeded from `(header_hash, nonce)`, folded with 64
/// FNV-guided dataset page reads and compressed down to the 32-byte mix
/// digest; the result hash binds the seed and the digest together.
use crate::cache::Light;
use crate::error::{DdmhashError, Result};
use crate::fnv::fnv_hash;
use crate::keccak::{keccak_256, keccak_512};
use crate::types::{PowOutput, H256, NODE_WORDS};
use crate::{ACCESSES, HASH_BYTES, MIX_BYTES};

const MIX_WORDS: usize = MIX_BYTES / 4;
const MIX_NODES: usize = MIX_WORDS / NODE_WORDS;

/// Where dataset nodes come from during a hash: the mapped full dataset, or
/// on-demand derivation from a light cache.
pub(crate) enum Lookup<'a> {
    Full(&'a [u8]),
    Light(&'a Light),
}

impl Lookup<'_> {
    #[inline]
    fn node_words(&self, index: u32) -> [u32; NODE_WORDS] {
        match self {
            Lookup::Full(data) => {
                let off = index as usize * HASH_BYTES;
                let mut words = [0u32; NODE_WORDS];
                for (w, word) in words.iter_mut().enumerate() {
                    let at = off + w * 4;
                    *word = u32::from_le_bytes([
                        data[at],
                        data[at + 1],
                        data[at + 2],
                        data[at + 3],
                    ]);
                }
                words
            }
            Lookup::Light(light) => light.calc_dataset_item(index).words(),
        }
    }
}

/// Run the mixer over `full_size` bytes of dataset.
pub(crate) fn hashimoto(
    lookup: Lookup<'_>,
    full_size: u64,
    header_hash: &H256,
    nonce: u64,
) -> Result<PowOutput> {
    if full_size == 0 || full_size % MIX_BYTES as u64 != 0 {
        return Err(DdmhashError::InvalidDataSize(full_size));
    }
    let num_full_pages = (full_size / MIX_BYTES as u64) as u32;

    // Seed node: header || little-endian nonce, hashed to 64 bytes.
    let mut seed_buf = [0u8; 40];
    seed_buf[..32].copy_from_slice(header_hash.as_bytes());
    seed_buf[32..].copy_from_slice(&nonce.to_le_bytes());
    let seed = keccak_512(&seed_buf);

    let mut seed_words = [0u32; NODE_WORDS];
    for (i, word) in seed_words.iter_mut().enumerate() {
        *word = u32::from_le_bytes([
            seed[i * 4],
            seed[i * 4 + 1],
            seed[i * 4 + 2],
            seed[i * 4 + 3],
        ]);
    }

    // Replicate the seed words across the 128-byte working mix.
    let mut mix = [0u32; MIX_WORDS];
    for (w, word) in mix.iter_mut().enumerate() {
        *word = seed_words[w % NODE_WORDS];
    }

    for i in 0..ACCESSES as u32 {
        let index =
            fnv_hash(seed_words[0] ^ i, mix[(i as usize) % MIX_WORDS]) % num_full_pages;
        for n in 0..MIX_NODES {
            let dag_words = lookup.node_words(index * MIX_NODES as u32 + n as u32);
            for w in 0..NODE_WORDS {
                mix[n * NODE_WORDS + w] = fnv_hash(mix[n * NODE_WORDS + w], dag_words[w]);
            }
        }
    }

    // Compress the 32 mix words down to 8 by FNV-folding groups of four.
    let mut compressed = [0u32; MIX_WORDS / 4];
    for w in (0..MIX_WORDS).step_by(4) {
        let mut reduction = mix[w];
        reduction = fnv_hash(reduction, mix[w + 1]);
        reduction = fnv_hash(reduction, mix[w + 2]);
        reduction = fnv_hash(reduction, mix[w + 3]);
        compressed[w / 4] = reduction;
    }

    let mut mix_hash = [0u8; 32];
    for (i, word) in compressed.iter().enumerate() {
        mix_hash[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
    }

    let mut final_buf = [0u8; HASH_BYTES + 32];
    final_buf[..HASH_BYTES].copy_from_slice(&seed);
    final_buf[HASH_BYTES..].copy_from_slice(&mix_hash);

    Ok(PowOutput {
        result: H256(keccak_256(&final_buf)),
        mix_hash: H256(mix_hash),
    })
}

/// Re-derive the result hash from a header, nonce and an already-produced
/// mix digest, without touching the dataset. Enables O(1) pre-verification.
pub fn quick_hash(header_hash: &H256, nonce: u64, mix_hash: &H256) -> H256 {
    let mut buf = [0u8; HASH_BYTES + 32];
    buf[..32].copy_from_slice(header_hash.as_bytes());
    buf[32..40].copy_from_slice(&nonce.to_le_bytes());
    let seed = keccak_512(&buf[..40]);
    buf[..HASH_BYTES].copy_from_slice(&seed);
    buf[HASH_BYTES..].copy_from_slice(mix_hash.as_bytes());
    H256(keccak_256(&buf))
}

/// Pre-verify a sealed header: recompute the result from the carried mix
/// digest and compare it against the boundary.
pub fn quick_check_difficulty(
    header_hash: &H256,
    nonce: u64,
    mix_hash: &H256,
    boundary: &H256,
) -> bool {
    quick_hash(header_hash, nonce, mix_hash).meets_boundary(boundary)
}
