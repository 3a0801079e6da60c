// Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Statistical and structural size parameters for the zero-knowledge proofs
//! and the Paillier encryption scheme.
//!
//! The range-proof parameters follow the recommendations of the paper: a
//! witness lives in `±2^ℓ` (or `±2^ℓ'` for affine addends), the prover's
//! masking values in `±2^(ℓ+ε)`, and the slack `ε` makes the masked response
//! statistically independent of the witness.

/// Bit bound `ℓ` on plaintexts proven in range (matches the curve order
/// size).
pub(crate) const ELL: usize = 256;

/// Bit bound `ℓ'` on the affine addend in the Π_aff-g relation.
pub(crate) const ELL_PRIME: usize = 1280;

/// Statistical slack `ε` added to the bounds of masked responses.
pub(crate) const EPSILON: usize = 512;

/// Bit length of each Paillier prime. Both primes must be safe Blum primes
/// of exactly this length.
pub(crate) const PRIME_BITS: usize = 1024;

/// Bit length of the Paillier modulus `N = p·q`.
pub(crate) const MODULUS_BITS: usize = 2 * PRIME_BITS;
