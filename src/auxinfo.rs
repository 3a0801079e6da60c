// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Auxiliary cryptographic material for presigning: each participant's
//! Paillier keypair and the ring-Pedersen commitment parameters derived
//! from it.
//!
//! Like [`crate::keygen`], this module provides the centralized
//! trusted-dealer variant: the dealer generates (or is handed primes for)
//! one Paillier keypair per participant and derives that participant's
//! commitment parameters from its own modulus.

use crate::{
    errors::{Error, Result},
    paillier::{DecryptionKey, EncryptionKey},
    protocol::ParticipantIdentifier,
    ring_pedersen::VerifiedRingPedersen,
};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::error;

/// A participant's secret auxiliary material: its Paillier decryption key.
#[derive(Clone)]
pub struct AuxInfoPrivate {
    paillier: DecryptionKey,
}

impl Debug for AuxInfoPrivate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuxInfoPrivate([redacted])")
    }
}

impl From<DecryptionKey> for AuxInfoPrivate {
    fn from(paillier: DecryptionKey) -> Self {
        Self { paillier }
    }
}

impl AuxInfoPrivate {
    /// The Paillier decryption key.
    pub(crate) fn decryption_key(&self) -> &DecryptionKey {
        &self.paillier
    }
}

/// A participant's public auxiliary material: its Paillier encryption key
/// and ring-Pedersen commitment parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxInfoPublic {
    participant: ParticipantIdentifier,
    paillier: EncryptionKey,
    params: VerifiedRingPedersen,
}

impl AuxInfoPublic {
    pub(crate) fn new(
        participant: ParticipantIdentifier,
        paillier: EncryptionKey,
        params: VerifiedRingPedersen,
    ) -> Self {
        Self {
            participant,
            paillier,
            params,
        }
    }

    /// The participant this material belongs to.
    pub fn participant(&self) -> ParticipantIdentifier {
        self.participant
    }

    /// The participant's Paillier encryption key.
    pub(crate) fn pk(&self) -> &EncryptionKey {
        &self.paillier
    }

    /// The participant's commitment parameters.
    pub(crate) fn params(&self) -> &VerifiedRingPedersen {
        &self.params
    }
}

/// One participant's output of auxiliary-material generation: the public
/// material of every participant plus its own secret half.
#[derive(Debug, Clone)]
pub struct Output {
    public_auxinfo: Vec<AuxInfoPublic>,
    private_auxinfo: AuxInfoPrivate,
}

impl Output {
    /// The public auxiliary material of every participant.
    pub fn public_auxinfo(&self) -> &[AuxInfoPublic] {
        &self.public_auxinfo
    }

    /// Find the public material of a specific participant.
    pub(crate) fn find_public(&self, pid: ParticipantIdentifier) -> Result<&AuxInfoPublic> {
        self.public_auxinfo
            .iter()
            .find(|public| public.participant() == pid)
            .ok_or_else(|| {
                error!("No public auxiliary material for participant {pid}");
                Error::BadInput
            })
    }

    /// This participant's secret material.
    pub fn private_auxinfo(&self) -> &AuxInfoPrivate {
        &self.private_auxinfo
    }
}

/// Generate auxiliary material for each participant from freshly-sampled
/// safe primes. Slow: expect tens of seconds per participant.
pub fn trusted_dealer<R: RngCore + CryptoRng>(
    ids: &[ParticipantIdentifier],
    rng: &mut R,
) -> Result<Vec<Output>> {
    let decryption_keys = ids
        .iter()
        .map(|_| DecryptionKey::generate(rng))
        .collect::<Result<Vec<_>>>()?;
    outputs_from_keys(ids, decryption_keys, rng)
}

/// Generate auxiliary material from caller-supplied primes, one pair per
/// participant.
///
/// Each pair must consist of two distinct 1024-bit safe Blum primes; a pair
/// that fails validation surfaces as [`crate::errors::Error::PrimeInvalid`].
/// This is the entry point for deployments that source their primes from
/// dedicated hardware or a vetted generation ceremony.
pub fn trusted_dealer_with_primes<R: RngCore + CryptoRng>(
    ids: &[ParticipantIdentifier],
    prime_pairs: &[(BigNumber, BigNumber)],
    rng: &mut R,
) -> Result<Vec<Output>> {
    if ids.len() != prime_pairs.len() {
        error!(
            "Expected one prime pair per participant: {} participants, {} pairs",
            ids.len(),
            prime_pairs.len()
        );
        return Err(Error::BadInput);
    }
    let decryption_keys = prime_pairs
        .iter()
        .map(|(p, q)| DecryptionKey::from_primes(p, q))
        .collect::<Result<Vec<_>>>()?;
    outputs_from_keys(ids, decryption_keys, rng)
}

/// Generate auxiliary material using primes from the compiled-in test pool.
///
/// 🔒 The pool is public; only use this in tests. Fails if the pool cannot
/// supply each participant with a disjoint pair of primes.
pub fn trusted_dealer_from_pool_insecure<R: RngCore + CryptoRng>(
    ids: &[ParticipantIdentifier],
    rng: &mut R,
) -> Result<Vec<Output>> {
    let prime_pairs = crate::paillier::prime_gen::disjoint_pool_pairs_insecure(ids.len())?;
    let decryption_keys = prime_pairs
        .into_iter()
        .map(|(p, q)| DecryptionKey::from_primes(&p, &q))
        .collect::<Result<Vec<_>>>()?;
    outputs_from_keys(ids, decryption_keys, rng)
}

fn outputs_from_keys<R: RngCore + CryptoRng>(
    ids: &[ParticipantIdentifier],
    decryption_keys: Vec<DecryptionKey>,
    rng: &mut R,
) -> Result<Vec<Output>> {
    let public_auxinfo = ids
        .iter()
        .zip(&decryption_keys)
        .map(|(pid, dk)| {
            let params = VerifiedRingPedersen::from_decryption_key(dk, rng)?;
            Ok(AuxInfoPublic::new(
                *pid,
                dk.encryption_key().clone(),
                params,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(decryption_keys
        .into_iter()
        .map(|dk| Output {
            public_auxinfo: public_auxinfo.clone(),
            private_auxinfo: dk.into(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::init_testing;

    #[test]
    fn pool_dealer_outputs_are_consistent() {
        let mut rng = init_testing();
        let ids = ParticipantIdentifier::random_set(3, 100, &mut rng).unwrap();
        let outputs = trusted_dealer_from_pool_insecure(&ids, &mut rng).unwrap();
        assert_eq!(outputs.len(), 3);

        for (output, pid) in outputs.iter().zip(&ids) {
            // Everyone sees the same public material.
            assert_eq!(output.public_auxinfo(), outputs[0].public_auxinfo());
            // Each private key matches the published public key.
            let own_public = output.find_public(*pid).unwrap();
            assert_eq!(
                own_public.pk(),
                output.private_auxinfo().decryption_key().encryption_key()
            );
        }
    }

    #[test]
    fn participants_get_distinct_moduli() {
        let mut rng = init_testing();
        let ids = ParticipantIdentifier::random_set(4, 100, &mut rng).unwrap();
        let outputs = trusted_dealer_from_pool_insecure(&ids, &mut rng).unwrap();
        let moduli: Vec<_> = outputs[0]
            .public_auxinfo()
            .iter()
            .map(|public| public.pk().modulus().clone())
            .collect();
        for (i, m) in moduli.iter().enumerate() {
            for other in &moduli[i + 1..] {
                assert_ne!(m, other);
            }
        }
    }

    #[test]
    fn caller_supplied_primes_are_validated() {
        let mut rng = init_testing();
        let ids = ParticipantIdentifier::random_set(2, 100, &mut rng).unwrap();
        let pairs = crate::paillier::prime_gen::disjoint_pool_pairs_insecure(2).unwrap();

        assert!(trusted_dealer_with_primes(&ids, &pairs, &mut rng).is_ok());

        // A repeated prime fails validation.
        let bad_pairs = vec![pairs[0].clone(), (pairs[1].0.clone(), pairs[1].0.clone())];
        assert!(matches!(
            trusted_dealer_with_primes(&ids, &bad_pairs, &mut rng),
            Err(crate::errors::Error::PrimeInvalid)
        ));

        // One pair per participant, no more, no fewer.
        assert!(trusted_dealer_with_primes(&ids, &pairs[..1], &mut rng).is_err());
    }

    #[test]
    fn pool_cannot_serve_an_oversized_quorum() {
        let mut rng = init_testing();
        let ids = ParticipantIdentifier::random_set(20, 100, &mut rng).unwrap();
        assert!(trusted_dealer_from_pool_insecure(&ids, &mut rng).is_err());
    }
}
