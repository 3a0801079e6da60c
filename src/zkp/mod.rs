// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! The non-interactive zero-knowledge proofs that make presigning secure
//! against malicious participants.
//!
//! Each proof is a sigma protocol compiled with the Fiat–Shamir transform
//! over a [`merlin::Transcript`]. The transcript is seeded with a
//! [`ProofContext`] — the session identifier, signer set, and threshold —
//! and with every public input of the proof, so a proof binds to the exact
//! session and statement it was produced for. Challenges are
//! rejection-sampled into `[-q, q]` where `q` is the secp256k1 order.

use crate::errors::Result;
use merlin::Transcript;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

pub mod piaffg;
pub mod pienc;
pub mod pilog;

/// Identifies which proof failed, for error attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofKind {
    /// [`pienc::PiEncProof`]: a Paillier ciphertext encrypts a value in
    /// `±2^ℓ`.
    PiEnc,
    /// [`piaffg::PiAffgProof`]: a ciphertext is a correct affine transform
    /// consistent with a curve point.
    PiAffg,
    /// [`pilog::PiLogProof`]: a ciphertext and a discrete-log image hide
    /// the same value.
    PiLog,
}

/// A non-interactive zero-knowledge proof.
pub(crate) trait Proof: Sized {
    /// The public statement being proven.
    type CommonInput<'a>;
    /// The witness known only to the prover.
    type ProverSecret<'a>;

    fn prove<R: RngCore + CryptoRng>(
        input: Self::CommonInput<'_>,
        secret: Self::ProverSecret<'_>,
        context: &impl ProofContext,
        transcript: &mut Transcript,
        rng: &mut R,
    ) -> Result<Self>;

    fn verify(
        self,
        input: Self::CommonInput<'_>,
        context: &impl ProofContext,
        transcript: &mut Transcript,
    ) -> Result<()>;
}

/// Session context bound into a proof transcript.
///
/// Implementors serialize everything that scopes a proof's validity; two
/// sessions with different contexts can never exchange proofs.
pub trait ProofContext {
    /// The canonical byte encoding of the context.
    fn as_bytes(&self) -> Result<Vec<u8>>;
}
