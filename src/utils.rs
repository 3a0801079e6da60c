// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Random sampling over [`BigNumber`] ranges and transcript challenge
//! derivation.

use crate::{
    curve::k256_order,
    errors::{Error, Result},
};
use libpaillier::unknown_order::BigNumber;
use merlin::Transcript;
use rand::{CryptoRng, Rng, RngCore};
use tracing::error;
use zeroize::Zeroize;

/// Iteration budget for every rejection sampler in the crate. A healthy RNG
/// exhausts this with negligible probability.
pub(crate) const CRYPTOGRAPHIC_RETRY_MAX: usize = 255;

/// Returns `true` iff `value ∊ [-2^n, 2^n]`.
///
/// This is the membership test used by all zero-knowledge range checks: the
/// absolute value must fit in `n` bits.
pub(crate) fn within_bound_by_size(value: &BigNumber, n: usize) -> bool {
    let bound = BigNumber::one() << n;
    value <= &bound && value >= &-bound
}

/// Compute `a^e (mod n)`.
pub(crate) fn modpow(a: &BigNumber, e: &BigNumber, n: &BigNumber) -> BigNumber {
    a.modpow(e, n)
}

/// Sample uniformly at random from `[0, n)`.
pub(crate) fn random_positive_bn<R: RngCore + CryptoRng>(rng: &mut R, n: &BigNumber) -> BigNumber {
    BigNumber::from_rng(n, rng)
}

/// Sample uniformly at random from the closed interval `[-n, n]`.
pub(crate) fn random_plusminus<R: RngCore + CryptoRng>(rng: &mut R, n: &BigNumber) -> BigNumber {
    // `from_rng` samples the half-open interval; widen by one to cover `n`
    // itself.
    let open_interval_max: BigNumber = n + 1;
    let val = BigNumber::from_rng(&open_interval_max, rng);
    let is_positive: bool = rng.gen();
    match is_positive {
        true => val,
        false => -val,
    }
}

/// Sample uniformly at random from `[-2^n, 2^n]`.
pub(crate) fn random_plusminus_by_size<R: RngCore + CryptoRng>(rng: &mut R, n: usize) -> BigNumber {
    let range = BigNumber::one() << n;
    random_plusminus(rng, &range)
}

/// Sample uniformly at random from `[-scale·2^n, scale·2^n]`.
pub(crate) fn random_plusminus_scaled<R: RngCore + CryptoRng>(
    rng: &mut R,
    n: usize,
    scale: &BigNumber,
) -> BigNumber {
    let range = (BigNumber::one() << n) * scale;
    random_plusminus(rng, &range)
}

/// Sample an element of the multiplicative group `Z_n^*`.
///
/// `n` is a product of two large primes here, so a draw that shares a factor
/// with `n` would actually reveal the factorization; the chance is
/// negligible and such draws are rejected anyway.
pub(crate) fn random_bn_in_z_star<R: RngCore + CryptoRng>(
    rng: &mut R,
    n: &BigNumber,
) -> Result<BigNumber> {
    std::iter::repeat_with(|| BigNumber::from_rng(n, rng))
        .take(CRYPTOGRAPHIC_RETRY_MAX)
        .find(|candidate| candidate != &BigNumber::zero() && candidate.gcd(n) == BigNumber::one())
        .ok_or_else(|| {
            error!("Failed to sample an invertible element mod n after {CRYPTOGRAPHIC_RETRY_MAX} attempts");
            Error::SampleExhausted
        })
}

/// Derive a deterministic pseudorandom value in `[-q, q]` from the
/// [`Transcript`], where `q` is the curve order. This is the challenge set
/// of every proof in the crate.
pub(crate) fn plusminus_challenge_from_transcript(transcript: &mut Transcript) -> Result<BigNumber> {
    let mut is_neg_byte = [0u8; 1];
    transcript.challenge_bytes(b"sampling negation bit", &mut is_neg_byte);
    let is_neg: bool = is_neg_byte[0] & 1 == 1;

    // Sampling is over the half-open interval; widen by one to make the
    // interval closed at `q`.
    let q = k256_order();
    let open_interval_max = &q + 1;
    let b = positive_challenge_from_transcript(transcript, &open_interval_max)?;
    Ok(match is_neg {
        true => -b,
        false => b,
    })
}

/// Derive a deterministic pseudorandom value in `[0, n)` from the
/// [`Transcript`].
pub(crate) fn positive_challenge_from_transcript(
    transcript: &mut Transcript,
    n: &BigNumber,
) -> Result<BigNumber> {
    // Reducing a fixed-width draw mod `n` would bias small values, so
    // rejection-sample instead; each draw advances the transcript state and
    // is therefore fresh.
    let len = n.to_bytes().len();
    let mut t = vec![0u8; len];
    for _ in 0..CRYPTOGRAPHIC_RETRY_MAX {
        transcript.challenge_bytes(b"sampling randomness", t.as_mut_slice());
        let b = BigNumber::from_slice(t.as_slice());
        if &b < n {
            return Ok(b);
        }
    }
    error!("Failed to derive a transcript challenge below the bound after {CRYPTOGRAPHIC_RETRY_MAX} attempts");
    Err(Error::SampleExhausted)
}

/// Helper type for parsing a byte array into fixed slices.
///
/// This type implements [`Zeroize`]. When parsing secret types, call
/// `zeroize()` once parsing is complete.
#[derive(Zeroize)]
pub(crate) struct ParseBytes {
    bytes: Vec<u8>,
    offset: usize,
}

impl ParseBytes {
    /// Consume bytes for parsing.
    pub(crate) fn new(bytes: Vec<u8>) -> ParseBytes {
        ParseBytes { bytes, offset: 0 }
    }

    /// Take the next `n` bytes from the array.
    pub(crate) fn take_bytes(&mut self, n: usize) -> Result<&[u8]> {
        let slice = self
            .bytes
            .get(self.offset..self.offset + n)
            .ok_or(Error::Deserialization)?;
        self.offset += n;
        Ok(slice)
    }

    /// Parse the next 8 bytes as a little-endian length field.
    pub(crate) fn take_len(&mut self) -> Result<usize> {
        const LENGTH_BYTES: usize = 8;
        let len_slice = self.take_bytes(LENGTH_BYTES)?;
        let len_bytes: [u8; LENGTH_BYTES] =
            len_slice.try_into().map_err(|_| Error::InternalInvariantFailed)?;
        Ok(usize::from_le_bytes(len_bytes))
    }

    /// Take the remaining bytes from the array.
    pub(crate) fn take_rest(&mut self) -> Result<&[u8]> {
        self.bytes.get(self.offset..).ok_or(Error::Deserialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testing::init_testing;

    #[test]
    fn plusminus_sampling_covers_the_full_width() {
        let mut rng = init_testing();
        let num_bytes = 100;

        // Statistical check: the top bytes of the range should actually get
        // hit.
        let mut max_len = 0;
        for _ in 0..1000 {
            let bn = random_plusminus_by_size(&mut rng, num_bytes * 8);
            max_len = max_len.max(bn.to_bytes().len());
        }
        assert!(max_len > num_bytes - 2);
    }

    #[test]
    fn within_bound_uses_absolute_value() {
        let bound = 16;
        let edge = BigNumber::one() << bound;
        assert!(within_bound_by_size(&edge, bound));
        assert!(within_bound_by_size(&-edge.clone(), bound));
        assert!(!within_bound_by_size(&(edge + 1), bound));
    }

    #[test]
    fn challenges_are_deterministic_in_the_transcript() {
        let mut t1 = merlin::Transcript::new(b"test");
        let mut t2 = merlin::Transcript::new(b"test");
        let e1 = plusminus_challenge_from_transcript(&mut t1).unwrap();
        let e2 = plusminus_challenge_from_transcript(&mut t2).unwrap();
        assert_eq!(e1, e2);

        let mut t3 = merlin::Transcript::new(b"test");
        t3.append_message(b"extra", b"data");
        let e3 = plusminus_challenge_from_transcript(&mut t3).unwrap();
        assert_ne!(e1, e3);
    }

    #[test]
    fn z_star_samples_are_invertible() {
        let mut rng = init_testing();
        let n = BigNumber::from(35u64); // 5 * 7
        for _ in 0..20 {
            let x = random_bn_in_z_star(&mut rng, &n).unwrap();
            assert_eq!(x.gcd(&n), BigNumber::one());
        }
    }
}

////////////////////////////
// Test Utility Functions //
////////////////////////////
