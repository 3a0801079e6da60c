// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Session and participant identifiers, plus the shared context bound into
//! every Fiat–Shamir transcript.

use crate::{
    errors::{Error, Result},
    zkp::ProofContext,
};
use rand::{CryptoRng, Rng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{collections::HashSet, fmt};

/// A session identifier (`ssid`) binding a single signing session.
///
/// Derived by hashing a 32-byte secure random sample with SHA-256 and
/// truncating to 16 bytes. Every zero-knowledge proof produced within a
/// session commits to this value through its transcript, so proofs cannot be
/// replayed across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier([u8; 16]);

impl Identifier {
    /// Generate a fresh session identifier from a cryptographically secure
    /// source.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        let digest = Sha256::digest(seed);
        let mut id = [0u8; 16];
        id.copy_from_slice(&digest[..16]);
        Self(id)
    }

    /// The raw 16-byte value.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// The identity of a protocol participant.
///
/// Identifiers are small positive integers chosen by the dealer; they double
/// as the evaluation points of the Shamir polynomial, so two participants
/// must never share an identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ParticipantIdentifier(u32);

impl ParticipantIdentifier {
    /// Wrap a raw identifier. Must be non-zero: zero is the evaluation point
    /// of the shared secret itself.
    pub fn from_u32(id: u32) -> Result<Self> {
        if id == 0 {
            return Err(Error::BadInput);
        }
        Ok(Self(id))
    }

    /// Draw `n` distinct identifiers uniformly from `1..=id_range`.
    pub fn random_set<R: RngCore + CryptoRng>(
        n: usize,
        id_range: u32,
        rng: &mut R,
    ) -> Result<Vec<Self>> {
        if (id_range as usize) < n {
            return Err(Error::BadInput);
        }
        let mut ids = HashSet::with_capacity(n);
        while ids.len() < n {
            ids.insert(rng.gen_range(1..=id_range));
        }
        Ok(ids.into_iter().map(Self).collect())
    }

    /// The identifier as a scalar in the curve's field, for polynomial
    /// evaluation and Lagrange interpolation.
    pub(crate) fn as_scalar(&self) -> k256::Scalar {
        k256::Scalar::from(self.0 as u64)
    }
}

impl fmt::Display for ParticipantIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One participant's view of the signer set: its own identifier and the
/// identifiers of all other signers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantConfig {
    id: ParticipantIdentifier,
    other_ids: Vec<ParticipantIdentifier>,
}

impl ParticipantConfig {
    /// Build a config for the participant `id` among `other_ids`.
    ///
    /// Fails if any identifier appears twice.
    pub fn new(id: ParticipantIdentifier, other_ids: &[ParticipantIdentifier]) -> Result<Self> {
        let mut all = HashSet::with_capacity(other_ids.len() + 1);
        all.insert(id);
        for other in other_ids {
            if !all.insert(*other) {
                tracing::error!("Duplicate participant identifier {other} in signer set");
                return Err(Error::BadInput);
            }
        }
        Ok(Self {
            id,
            other_ids: other_ids.to_vec(),
        })
    }

    /// This participant's identifier.
    pub fn id(&self) -> ParticipantIdentifier {
        self.id
    }

    /// The identifiers of the other signers.
    pub fn other_ids(&self) -> &[ParticipantIdentifier] {
        &self.other_ids
    }

    /// All signers, including this participant.
    pub fn all_participants(&self) -> Vec<ParticipantIdentifier> {
        let mut all = self.other_ids.clone();
        all.push(self.id);
        all
    }

    /// Total number of signers.
    pub fn count(&self) -> usize {
        self.other_ids.len() + 1
    }
}

/// Context shared by all signers in a session, bound into every proof
/// transcript so that a proof is only valid for the session, signer set, and
/// threshold it was produced for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedContext {
    sid: Identifier,
    participants: Vec<ParticipantIdentifier>,
    threshold: usize,
}

impl SharedContext {
    /// Gather the shared context of a session.
    pub fn new(
        sid: Identifier,
        mut participants: Vec<ParticipantIdentifier>,
        threshold: usize,
    ) -> Self {
        // Canonical ordering, so every party derives identical transcripts.
        participants.sort();
        Self {
            sid,
            participants,
            threshold,
        }
    }

    /// The session identifier.
    pub fn sid(&self) -> Identifier {
        self.sid
    }

    #[cfg(test)]
    pub(crate) fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let ids = ParticipantIdentifier::random_set(3, 100, rng).unwrap();
        Self::new(Identifier::random(rng), ids, 1)
    }
}

impl ProofContext for SharedContext {
    fn as_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = self.sid.0.to_vec();
        bytes.extend((self.participants.len() as u64).to_le_bytes());
        for id in &self.participants {
            bytes.extend(id.0.to_le_bytes());
        }
        bytes.extend((self.threshold as u64).to_le_bytes());
        Ok(bytes)
    }
}
