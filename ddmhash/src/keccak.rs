/// Keccak primitives used throughout the engine.
///
/// These are the original Keccak submission variants (the padding scheme
/// predating FIPS 202), not the standardized SHA-3 functions.
use sha3::{Digest, Keccak256, Keccak512};

/// 256-bit Keccak digest.
pub fn keccak_256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    out
}

/// 512-bit Keccak digest.
pub fn keccak_512(data: &[u8]) -> [u8; 64] {
    let mut out = [0u8; 64];
    out.copy_from_slice(&Keccak512::digest(data));
    out
}
