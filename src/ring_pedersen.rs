// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Ring-Pedersen commitment parameters over an RSA modulus.
//!
//! A scheme is a tuple `(N, s, t)` with `t = τ² mod N` for random
//! invertible `τ` and `s = t^λ mod N` for secret `λ`. Commitments
//! `s^x·t^y mod N` are statistically hiding and are used by the verifier
//! side of every range proof in [`crate::zkp`].

use crate::{
    errors::{Error, Result},
    paillier::DecryptionKey,
    utils::{modpow, random_bn_in_z_star, random_positive_bn},
};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Ring-Pedersen commitment parameters `(N, s, t)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingPedersen {
    modulus: BigNumber,
    s: BigNumber,
    t: BigNumber,
}

/// A [`RingPedersen`] scheme whose well-formedness has been established.
///
/// With a trusted dealer this holds by construction; in a distributed
/// setting this type is where a proof of parameter correctness would be
/// attached and checked before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedRingPedersen(RingPedersen);

impl VerifiedRingPedersen {
    /// The underlying commitment scheme.
    pub(crate) fn scheme(&self) -> &RingPedersen {
        &self.0
    }

    /// Derive commitment parameters from a party's own Paillier key.
    ///
    /// `λ` is drawn from `[0, φ(N))` and `τ` from `Z_N^*`; both are
    /// discarded after `s` and `t` are formed.
    pub fn from_decryption_key<R: RngCore + CryptoRng>(
        dk: &DecryptionKey,
        rng: &mut R,
    ) -> Result<Self> {
        let modulus = dk.encryption_key().modulus().clone();
        let mut lambda = random_positive_bn(rng, dk.totient());
        let mut tau = random_bn_in_z_star(rng, &modulus)?;

        let t = tau.modmul(&tau, &modulus);
        let s = modpow(&t, &lambda, &modulus);

        lambda.zeroize();
        tau.zeroize();

        Ok(Self(RingPedersen { modulus, s, t }))
    }

    /// Generate a scheme over a fresh modulus, for tests.
    #[cfg(test)]
    pub(crate) fn gen<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let (p, q) = crate::paillier::prime_gen::get_prime_pair_from_pool_insecure(rng)?;
        let dk = DecryptionKey::from_primes(&p, &q)?;
        Self::from_decryption_key(&dk, rng)
    }
}

impl RingPedersen {
    /// The commitment modulus `N`.
    pub(crate) fn modulus(&self) -> &BigNumber {
        &self.modulus
    }

    /// Commit to `x` with randomizer `y`: `s^x · t^y mod N`.
    ///
    /// Exponents may be negative; both bases are invertible mod `N`.
    pub(crate) fn commit(&self, x: &BigNumber, y: &BigNumber) -> BigNumber {
        modpow(&self.s, x, &self.modulus).modmul(&modpow(&self.t, y, &self.modulus), &self.modulus)
    }

    /// Check the response side of a sigma protocol:
    /// `s^a · t^b ≡ S · T^e (mod N)` with `S, T ∈ Z_N^*`.
    pub(crate) fn verify(
        &self,
        a: &BigNumber,
        b: &BigNumber,
        e: &BigNumber,
        cap_s: &BigNumber,
        cap_t: &BigNumber,
    ) -> Result<()> {
        for commitment in [cap_s, cap_t] {
            if commitment <= &BigNumber::zero()
                || commitment >= &self.modulus
                || commitment.gcd(&self.modulus) != BigNumber::one()
            {
                tracing::error!("Pedersen commitment is not in the multiplicative group mod N");
                return Err(Error::ProofRejected);
            }
        }
        let lhs = self.commit(a, b);
        let rhs = cap_t
            .modpow(e, &self.modulus)
            .modmul(cap_s, &self.modulus);
        if lhs != rhs {
            return Err(Error::ProofRejected);
        }
        Ok(())
    }
}
