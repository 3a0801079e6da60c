// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Proves that a Paillier ciphertext encrypts a value in the range `±2^ℓ`
//! (`Π_enc` in the paper[^cite]).
//!
//! Presign round one attaches one of these to the nonce-share ciphertext
//! `K`, so a malicious signer cannot smuggle an oversized nonce into the
//! multiplication protocol of round two.
//!
//! [^cite]: Ran Canetti, Rosario Gennaro, Steven Goldfeder, Nikolaos
//! Makriyannis, and Udi Peled. UC Non-Interactive, Proactive, Threshold
//! ECDSA with Identifiable Aborts. [EPrint archive,
//! 2021](https://eprint.iacr.org/archive/2021/060/1634824619.pdf). Figure 14.

use crate::{
    errors::{Error, Result},
    paillier::{Ciphertext, EncryptionKey, MaskedNonce, Nonce},
    parameters::{ELL, EPSILON},
    ring_pedersen::VerifiedRingPedersen,
    utils::{
        plusminus_challenge_from_transcript, random_plusminus_by_size, random_plusminus_scaled,
        within_bound_by_size,
    },
    zkp::{Proof, ProofContext},
};
use libpaillier::unknown_order::BigNumber;
use merlin::Transcript;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::error;

/// Proof of knowledge of a plaintext in `±2^ℓ` behind a Paillier
/// ciphertext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PiEncProof {
    /// Pedersen commitment to the plaintext (`S` in the paper).
    S: BigNumber,
    /// Encryption of the mask (`A` in the paper).
    A: Ciphertext,
    /// Pedersen commitment to the mask (`C` in the paper).
    C: BigNumber,
    /// Fiat–Shamir challenge.
    e: BigNumber,
    /// Masked plaintext response (`z₁ = α + e·k`, over the integers).
    z1: BigNumber,
    /// Masked encryption randomness response (`z₂ = r·ρ^e mod N₀`).
    z2: MaskedNonce,
    /// Masked commitment randomness response (`z₃ = γ + e·μ`).
    z3: BigNumber,
}

/// The public statement: ciphertext `K` under the prover's key, judged
/// against the verifier's commitment parameters.
#[derive(Clone, Copy, Serialize)]
pub(crate) struct CommonInput<'a> {
    K: &'a Ciphertext,
    prover_encryption_key: &'a EncryptionKey,
    setup_params: &'a VerifiedRingPedersen,
}

impl<'a> CommonInput<'a> {
    pub(crate) fn new(
        ciphertext: &'a Ciphertext,
        prover_encryption_key: &'a EncryptionKey,
        verifier_setup_params: &'a VerifiedRingPedersen,
    ) -> Self {
        Self {
            K: ciphertext,
            prover_encryption_key,
            setup_params: verifier_setup_params,
        }
    }
}

/// The witness: the plaintext and the encryption randomness of `K`.
pub(crate) struct ProverSecret<'a> {
    k: &'a BigNumber,
    rho: &'a Nonce,
}

impl Debug for ProverSecret<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("pienc::ProverSecret")
            .field("k", &"[redacted]")
            .field("rho", &"[redacted]")
            .finish()
    }
}

impl<'a> ProverSecret<'a> {
    pub(crate) fn new(plaintext: &'a BigNumber, nonce: &'a Nonce) -> Self {
        Self {
            k: plaintext,
            rho: nonce,
        }
    }
}

impl Proof for PiEncProof {
    type CommonInput<'a> = CommonInput<'a>;
    type ProverSecret<'a> = ProverSecret<'a>;

    fn prove<R: RngCore + CryptoRng>(
        input: Self::CommonInput<'_>,
        secret: Self::ProverSecret<'_>,
        context: &impl ProofContext,
        transcript: &mut Transcript,
        rng: &mut R,
    ) -> Result<Self> {
        let setup_modulus = input.setup_params.scheme().modulus();

        // Mask for the plaintext, with ε bits of statistical slack.
        let alpha = random_plusminus_by_size(rng, ELL + EPSILON);
        // Commitment randomizers, scaled by the commitment modulus.
        let mu = random_plusminus_scaled(rng, ELL, setup_modulus);
        let gamma = random_plusminus_scaled(rng, ELL + EPSILON, setup_modulus);

        let S = input.setup_params.scheme().commit(secret.k, &mu);
        let (A, r) = input.prover_encryption_key.encrypt(rng, &alpha)?;
        let C = input.setup_params.scheme().commit(&alpha, &gamma);

        Self::fill_transcript(transcript, context, &input, &S, &A, &C)?;
        let e = plusminus_challenge_from_transcript(transcript)?;

        // Responses are over the integers (no modular reduction for z₁, z₃).
        let z1 = &alpha + &e * secret.k;
        let z2 = MaskedNonce::mask(&r, secret.rho, &e, input.prover_encryption_key.modulus());
        let z3 = &gamma + &e * &mu;

        Ok(Self {
            S,
            A,
            C,
            e,
            z1,
            z2,
            z3,
        })
    }

    fn verify(
        self,
        input: Self::CommonInput<'_>,
        context: &impl ProofContext,
        transcript: &mut Transcript,
    ) -> Result<()> {
        // The challenge must be reproducible from the claimed commitments.
        Self::fill_transcript(transcript, context, &input, &self.S, &self.A, &self.C)?;
        let e = plusminus_challenge_from_transcript(transcript)?;
        if e != self.e {
            error!("Fiat-Shamir challenge does not match the transcript");
            return Err(Error::ProofRejected);
        }

        if !within_bound_by_size(&self.z1, ELL + EPSILON) {
            error!("Plaintext response is out of range");
            return Err(Error::ProofRejected);
        }

        // Every ciphertext entering the algebra must be in Z_{N₀²}^*.
        input.prover_encryption_key.validate(input.K)?;
        input.prover_encryption_key.validate(&self.A)?;

        // Enc(z₁; z₂) ≟ A · K^e (mod N₀²)
        let lhs = input
            .prover_encryption_key
            .encrypt_with_nonce(&self.z1, &self.z2);
        let rhs = input
            .prover_encryption_key
            .multiply_and_add(&self.e, input.K, &self.A);
        if lhs != rhs {
            error!("Ciphertext equation of Π_enc does not hold");
            return Err(Error::ProofRejected);
        }

        // s^z₁ · t^z₃ ≟ C · S^e (mod N̂)
        input
            .setup_params
            .scheme()
            .verify(&self.z1, &self.z3, &self.e, &self.C, &self.S)
            .map_err(|err| {
                error!("Commitment equation of Π_enc does not hold");
                err
            })?;

        Ok(())
    }
}

impl PiEncProof {
    /// Append the context and all public values to the transcript, fixing
    /// the challenge.
    fn fill_transcript(
        transcript: &mut Transcript,
        context: &impl ProofContext,
        input: &CommonInput,
        S: &BigNumber,
        A: &Ciphertext,
        C: &BigNumber,
    ) -> Result<()> {
        transcript.append_message(b"PiEnc ProofContext", &context.as_bytes()?);
        transcript.append_message(b"PiEnc CommonInput", &serialize!(input)?);
        transcript.append_message(b"PiEnc Commitments (S, A, C)", &serialize!(&(S, A, C))?);
        Ok(())
    }
}
