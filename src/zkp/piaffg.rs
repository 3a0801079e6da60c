// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Proves correctness of a Paillier affine transformation whose multiplier
//! is committed on the curve (`Π_aff-g` in the paper[^cite]).
//!
//! The statement: for public ciphertexts `C`, `D`, `Y` and a public point
//! `X`, the prover knows `x ∈ ±2^ℓ` and `y ∈ ±2^ℓ'` such that
//!
//! - `D = C^x · Enc₀(y; ρ)` under the *verifier's* Paillier key,
//! - `Y = Enc₁(y; ρ_y)` under the *prover's* Paillier key,
//! - `X = x·G`.
//!
//! Presign round two produces two of these per peer: one ties the
//! nonce-mask transform of `K` to `Γᵢ = γᵢ·G`, the other ties the key-share
//! transform to the (Lagrange-scaled) public key share.
//!
//! [^cite]: Ran Canetti, Rosario Gennaro, Steven Goldfeder, Nikolaos
//! Makriyannis, and Udi Peled. UC Non-Interactive, Proactive, Threshold
//! ECDSA with Identifiable Aborts. [EPrint archive,
//! 2021](https://eprint.iacr.org/archive/2021/060/1634824619.pdf). Figure 15.

use crate::{
    curve::CurvePoint,
    errors::{Error, Result},
    paillier::{Ciphertext, EncryptionKey, MaskedNonce, Nonce},
    parameters::{ELL, ELL_PRIME, EPSILON},
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

/// Proof of a correct affine-like transformation of a Paillier ciphertext,
/// with the multiplier committed as a curve point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PiAffgProof {
    /// Pedersen commitment to the multiplier mask (`E` in the paper).
    E: BigNumber,
    /// Pedersen commitment to the multiplier `x` (`S` in the paper).
    S: BigNumber,
    /// Pedersen commitment to the addend mask (`F` in the paper).
    F: BigNumber,
    /// Pedersen commitment to the addend `y` (`T` in the paper).
    T: BigNumber,
    /// Affine transform of `C` by the masks (`A` in the paper).
    A: Ciphertext,
    /// Curve commitment to the multiplier mask (`Bₓ` in the paper).
    B_x: CurvePoint,
    /// Encryption of the addend mask under the prover's key (`B_y`).
    B_y: Ciphertext,
    /// Fiat–Shamir challenge.
    e: BigNumber,
    /// Masked multiplier response (`z₁ = α + e·x`).
    z1: BigNumber,
    /// Masked addend response (`z₂ = β + e·y`).
    z2: BigNumber,
    /// Masked randomizer for `S` (`z₃ = γ + e·m`).
    z3: BigNumber,
    /// Masked randomizer for `T` (`z₄ = δ + e·μ`).
    z4: BigNumber,
    /// Masked nonce for the verifier-side equation (`w = r·ρ^e mod N₀`).
    w: MaskedNonce,
    /// Masked nonce for the prover-side equation (`w_y = r_y·ρ_y^e mod N₁`).
    w_y: MaskedNonce,
}

/// The public statement of a [`PiAffgProof`].
#[derive(Clone, Copy, Serialize)]
pub(crate) struct CommonInput<'a> {
    /// `X = x·G`.
    X: &'a CurvePoint,
    /// The ciphertext being transformed, under the verifier's key.
    C: &'a Ciphertext,
    /// The transformed ciphertext `C^x · Enc₀(y)`.
    D: &'a Ciphertext,
    /// The addend encrypted under the prover's own key.
    Y: &'a Ciphertext,
    /// The verifier's Paillier key (`N₀`).
    verifier_encryption_key: &'a EncryptionKey,
    /// The prover's Paillier key (`N₁`).
    prover_encryption_key: &'a EncryptionKey,
    /// The verifier's commitment parameters.
    setup_params: &'a VerifiedRingPedersen,
}

impl<'a> CommonInput<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        multiplier_commitment: &'a CurvePoint,
        original_ciphertext: &'a Ciphertext,
        transformed_ciphertext: &'a Ciphertext,
        encrypted_addend: &'a Ciphertext,
        verifier_encryption_key: &'a EncryptionKey,
        prover_encryption_key: &'a EncryptionKey,
        verifier_setup_params: &'a VerifiedRingPedersen,
    ) -> Self {
        Self {
            X: multiplier_commitment,
            C: original_ciphertext,
            D: transformed_ciphertext,
            Y: encrypted_addend,
            verifier_encryption_key,
            prover_encryption_key,
            setup_params: verifier_setup_params,
        }
    }
}

/// The witness of a [`PiAffgProof`].
pub(crate) struct ProverSecret<'a> {
    x: &'a BigNumber,
    y: &'a BigNumber,
    rho: &'a Nonce,
    rho_y: &'a Nonce,
}

impl Debug for ProverSecret<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("piaffg::ProverSecret")
            .field("x", &"[redacted]")
            .field("y", &"[redacted]")
            .field("rho", &"[redacted]")
            .field("rho_y", &"[redacted]")
            .finish()
    }
}

impl<'a> ProverSecret<'a> {
    pub(crate) fn new(
        multiplier: &'a BigNumber,
        addend: &'a BigNumber,
        transform_nonce: &'a Nonce,
        addend_nonce: &'a Nonce,
    ) -> Self {
        Self {
            x: multiplier,
            y: addend,
            rho: transform_nonce,
            rho_y: addend_nonce,
        }
    }
}

impl Proof for PiAffgProof {
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

        // Masks for the two witness values...
        let alpha = random_plusminus_by_size(rng, ELL + EPSILON);
        let beta = random_plusminus_by_size(rng, ELL_PRIME + EPSILON);
        // ...and randomizers for the four Pedersen commitments.
        let gamma = random_plusminus_scaled(rng, ELL + EPSILON, setup_modulus);
        let m = random_plusminus_scaled(rng, ELL, setup_modulus);
        let delta = random_plusminus_scaled(rng, ELL_PRIME + EPSILON, setup_modulus);
        let mu = random_plusminus_scaled(rng, ELL_PRIME, setup_modulus);

        // A = C^α · Enc₀(β; r) mirrors the shape of D with masks in place
        // of witnesses.
        let (beta_ciphertext, r) = input.verifier_encryption_key.encrypt(rng, &beta)?;
        let A = input
            .verifier_encryption_key
            .multiply_and_add(&alpha, input.C, &beta_ciphertext);
        let B_x = CurvePoint::GENERATOR.multiply_by_bignum(&alpha)?;
        let (B_y, r_y) = input.prover_encryption_key.encrypt(rng, &beta)?;

        let E = input.setup_params.scheme().commit(&alpha, &gamma);
        let S = input.setup_params.scheme().commit(secret.x, &m);
        let F = input.setup_params.scheme().commit(&beta, &delta);
        let T = input.setup_params.scheme().commit(secret.y, &mu);

        Self::fill_transcript(transcript, context, &input, &E, &S, &F, &T, &A, &B_x, &B_y)?;
        let e = plusminus_challenge_from_transcript(transcript)?;

        let z1 = &alpha + &e * secret.x;
        let z2 = &beta + &e * secret.y;
        let z3 = &gamma + &e * &m;
        let z4 = &delta + &e * &mu;
        let w = MaskedNonce::mask(&r, secret.rho, &e, input.verifier_encryption_key.modulus());
        let w_y = MaskedNonce::mask(
            &r_y,
            secret.rho_y,
            &e,
            input.prover_encryption_key.modulus(),
        );

        Ok(Self {
            E,
            S,
            F,
            T,
            A,
            B_x,
            B_y,
            e,
            z1,
            z2,
            z3,
            z4,
            w,
            w_y,
        })
    }

    fn verify(
        self,
        input: Self::CommonInput<'_>,
        context: &impl ProofContext,
        transcript: &mut Transcript,
    ) -> Result<()> {
        Self::fill_transcript(
            transcript, context, &input, &self.E, &self.S, &self.F, &self.T, &self.A, &self.B_x,
            &self.B_y,
        )?;
        let e = plusminus_challenge_from_transcript(transcript)?;
        if e != self.e {
            error!("Fiat-Shamir challenge does not match the transcript");
            return Err(Error::ProofRejected);
        }

        if !within_bound_by_size(&self.z1, ELL + EPSILON) {
            error!("Multiplier response is out of range");
            return Err(Error::ProofRejected);
        }
        if !within_bound_by_size(&self.z2, ELL_PRIME + EPSILON) {
            error!("Addend response is out of range");
            return Err(Error::ProofRejected);
        }

        input.verifier_encryption_key.validate(input.C)?;
        input.verifier_encryption_key.validate(input.D)?;
        input.verifier_encryption_key.validate(&self.A)?;
        input.prover_encryption_key.validate(input.Y)?;
        input.prover_encryption_key.validate(&self.B_y)?;

        // C^z₁ · Enc₀(z₂; w) ≟ A · D^e (mod N₀²)
        let lhs = input.verifier_encryption_key.multiply_and_add(
            &self.z1,
            input.C,
            &input
                .verifier_encryption_key
                .encrypt_with_nonce(&self.z2, &self.w),
        );
        let rhs = input
            .verifier_encryption_key
            .multiply_and_add(&self.e, input.D, &self.A);
        if lhs != rhs {
            error!("Affine ciphertext equation of Π_aff-g does not hold");
            return Err(Error::ProofRejected);
        }

        // z₁·G ≟ Bₓ + e·X
        let lhs = CurvePoint::GENERATOR.multiply_by_bignum(&self.z1)?;
        let rhs = self.B_x + input.X.multiply_by_bignum(&self.e)?;
        if lhs != rhs {
            error!("Curve equation of Π_aff-g does not hold");
            return Err(Error::ProofRejected);
        }

        // Enc₁(z₂; w_y) ≟ B_y · Y^e (mod N₁²)
        let lhs = input
            .prover_encryption_key
            .encrypt_with_nonce(&self.z2, &self.w_y);
        let rhs = input
            .prover_encryption_key
            .multiply_and_add(&self.e, input.Y, &self.B_y);
        if lhs != rhs {
            error!("Addend ciphertext equation of Π_aff-g does not hold");
            return Err(Error::ProofRejected);
        }

        // s^z₁ · t^z₃ ≟ E · S^e and s^z₂ · t^z₄ ≟ F · T^e (mod N̂)
        input
            .setup_params
            .scheme()
            .verify(&self.z1, &self.z3, &self.e, &self.E, &self.S)
            .map_err(|err| {
                error!("Multiplier commitment equation of Π_aff-g does not hold");
                err
            })?;
        input
            .setup_params
            .scheme()
            .verify(&self.z2, &self.z4, &self.e, &self.F, &self.T)
            .map_err(|err| {
                error!("Addend commitment equation of Π_aff-g does not hold");
                err
            })?;

        Ok(())
    }
}

impl PiAffgProof {
    #[allow(clippy::too_many_arguments)]
    fn fill_transcript(
        transcript: &mut Transcript,
        context: &impl ProofContext,
        input: &CommonInput,
        E: &BigNumber,
        S: &BigNumber,
        F: &BigNumber,
        T: &BigNumber,
        A: &Ciphertext,
        B_x: &CurvePoint,
        B_y: &Ciphertext,
    ) -> Result<()> {
        transcript.append_message(b"PiAffg ProofContext", &context.as_bytes()?);
        transcript.append_message(b"PiAffg CommonInput", &serialize!(input)?);
        transcript.append_message(
            b"PiAffg Commitments (E, S, F, T, A, B_x, B_y)",
            &serialize!(&(E, S, F, T, A, B_x, B_y))?,
        );
        Ok(())
    }
}
