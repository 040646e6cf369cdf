// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Keyed mid-square pixel hash.
//!
//! Mixes a pixel's channel values with the session key and extracts the middle
//! four decimal digits of the square. Encoder and decoder evaluate it on the
//! same (already embedded) pixels, so the placement walk is reproducible from
//! the passphrase alone. It is a deterministic scrambler, not a cryptographic
//! hash.

/// Exclusive upper bound of [`keyed_hash`] output.
pub const HASH_RANGE: u32 = 10_000;

const SEED: u128 = 17;
const PRODUCT_MODULUS: u64 = 9_999;

/// Hash `channels` (in R, G, B order) together with `key`.
///
/// The running accumulator `h` is exact (`u128` covers any RGB pixel); the
/// channel product is only ever used modulo 9999 and is reduced as it grows.
pub fn keyed_hash(channels: &[u8], key: u64) -> u32 {
    let mut h = SEED;
    let mut product: u64 = 1;
    for &v in channels {
        let v = u128::from(v);
        h += h * v;
        let mut factor = if v == 0 { h } else { v };
        if factor < 10 {
            factor <<= 7;
        } else if factor < 100 {
            factor <<= 4;
        }
        let factor = (factor % u128::from(PRODUCT_MODULUS)) as u64;
        product = product * factor % PRODUCT_MODULUS;
    }
    let product = (product + key % PRODUCT_MODULUS) % PRODUCT_MODULUS;
    (product * product / 100 % u64::from(HASH_RANGE)) as u32
}
