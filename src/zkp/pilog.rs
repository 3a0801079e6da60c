// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Proves that a Paillier ciphertext and a discrete-log image hide the same
//! value (`Π_log*` in the paper[^cite]).
//!
//! The statement: for a public ciphertext `C` under the prover's key, a
//! public point `X`, and a public generator `g`, the prover knows
//! `x ∈ ±2^ℓ` and `ρ` with `C = Enc(x; ρ)` and `X = x·g`.
//!
//! Presign uses this twice: in round two over the base point to tie `Gᵢ` to
//! `Γᵢ`, and in round three with generator `Γ` to tie `Kᵢ` to `Δᵢ`.
//!
//! [^cite]: Ran Canetti, Rosario Gennaro, Steven Goldfeder, Nikolaos
//! Makriyannis, and Udi Peled. UC Non-Interactive, Proactive, Threshold
//! ECDSA with Identifiable Aborts. [EPrint archive,
//! 2021](https://eprint.iacr.org/archive/2021/060/1634824619.pdf). Figure 25.

use crate::{
    curve::CurvePoint,
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

/// Proof that a ciphertext and a curve point commit to the same value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PiLogProof {
    /// Pedersen commitment to the witness (`S` in the paper).
    S: BigNumber,
    /// Encryption of the mask (`A` in the paper).
    A: Ciphertext,
    /// The mask moved along the generator (`Y` in the paper).
    Y: CurvePoint,
    /// Pedersen commitment to the mask (`D` in the paper).
    D: BigNumber,
    /// Fiat–Shamir challenge.
    e: BigNumber,
    /// Masked witness response (`z₁ = α + e·x`).
    z1: BigNumber,
    /// Masked encryption randomness response (`z₂ = r·ρ^e mod N₀`).
    z2: MaskedNonce,
    /// Masked commitment randomizer response (`z₃ = γ + e·μ`).
    z3: BigNumber,
}

/// The public statement of a [`PiLogProof`].
#[derive(Clone, Copy, Serialize)]
pub(crate) struct CommonInput<'a> {
    C: &'a Ciphertext,
    X: &'a CurvePoint,
    setup_params: &'a VerifiedRingPedersen,
    prover_encryption_key: &'a EncryptionKey,
    g: &'a CurvePoint,
}

impl<'a> CommonInput<'a> {
    pub(crate) fn new(
        ciphertext: &'a Ciphertext,
        dlog_commit: &'a CurvePoint,
        verifier_setup_params: &'a VerifiedRingPedersen,
        prover_encryption_key: &'a EncryptionKey,
        generator: &'a CurvePoint,
    ) -> Self {
        Self {
            C: ciphertext,
            X: dlog_commit,
            setup_params: verifier_setup_params,
            prover_encryption_key,
            g: generator,
        }
    }
}

/// The witness of a [`PiLogProof`].
pub(crate) struct ProverSecret<'a> {
    x: &'a BigNumber,
    rho: &'a Nonce,
}

impl Debug for ProverSecret<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("pilog::ProverSecret")
            .field("x", &"[redacted]")
            .field("rho", &"[redacted]")
            .finish()
    }
}

impl<'a> ProverSecret<'a> {
    pub(crate) fn new(exponent: &'a BigNumber, nonce: &'a Nonce) -> Self {
        Self {
            x: exponent,
            rho: nonce,
        }
    }
}

impl Proof for PiLogProof {
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

        let alpha = random_plusminus_by_size(rng, ELL + EPSILON);
        let mu = random_plusminus_scaled(rng, ELL, setup_modulus);
        let gamma = random_plusminus_scaled(rng, ELL + EPSILON, setup_modulus);

        let S = input.setup_params.scheme().commit(secret.x, &mu);
        let (A, r) = input.prover_encryption_key.encrypt(rng, &alpha)?;
        let Y = input.g.multiply_by_bignum(&alpha)?;
        let D = input.setup_params.scheme().commit(&alpha, &gamma);

        Self::fill_transcript(transcript, context, &input, &S, &A, &Y, &D)?;
        let e = plusminus_challenge_from_transcript(transcript)?;

        let z1 = &alpha + &e * secret.x;
        let z2 = MaskedNonce::mask(&r, secret.rho, &e, input.prover_encryption_key.modulus());
        let z3 = &gamma + &e * &mu;

        Ok(Self {
            S,
            A,
            Y,
            D,
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
        Self::fill_transcript(transcript, context, &input, &self.S, &self.A, &self.Y, &self.D)?;
        let e = plusminus_challenge_from_transcript(transcript)?;
        if e != self.e {
            error!("Fiat-Shamir challenge does not match the transcript");
            return Err(Error::ProofRejected);
        }

        if !within_bound_by_size(&self.z1, ELL + EPSILON) {
            error!("Witness response is out of range");
            return Err(Error::ProofRejected);
        }

        input.prover_encryption_key.validate(input.C)?;
        input.prover_encryption_key.validate(&self.A)?;

        // Enc(z₁; z₂) ≟ A · C^e (mod N₀²)
        let lhs = input
            .prover_encryption_key
            .encrypt_with_nonce(&self.z1, &self.z2);
        let rhs = input
            .prover_encryption_key
            .multiply_and_add(&self.e, input.C, &self.A);
        if lhs != rhs {
            error!("Ciphertext equation of Π_log* does not hold");
            return Err(Error::ProofRejected);
        }

        // z₁·g ≟ Y + e·X
        let lhs = input.g.multiply_by_bignum(&self.z1)?;
        let rhs = self.Y + input.X.multiply_by_bignum(&self.e)?;
        if lhs != rhs {
            error!("Curve equation of Π_log* does not hold");
            return Err(Error::ProofRejected);
        }

        // s^z₁ · t^z₃ ≟ D · S^e (mod N̂)
        input
            .setup_params
            .scheme()
            .verify(&self.z1, &self.z3, &self.e, &self.D, &self.S)
            .map_err(|err| {
                error!("Commitment equation of Π_log* does not hold");
                err
            })?;

        Ok(())
    }
}

impl PiLogProof {
    fn fill_transcript(
        transcript: &mut Transcript,
        context: &impl ProofContext,
        input: &CommonInput,
        S: &BigNumber,
        A: &Ciphertext,
        Y: &CurvePoint,
        D: &BigNumber,
    ) -> Result<()> {
        transcript.append_message(b"PiLog ProofContext", &context.as_bytes()?);
        transcript.append_message(b"PiLog CommonInput", &serialize!(input)?);
        transcript.append_message(
            b"PiLog Commitments (S, A, Y, D)",
            &serialize!(&(S, A, Y, D))?,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        paillier::{prime_gen, DecryptionKey},
        protocol::SharedContext,
        utils::testing::init_testing,
    };
    use rand::rngs::StdRng;

    fn transcript() -> Transcript {
        Transcript::new(b"PiLogProof Test")
    }

    fn with_random_proof(
        rng: &mut StdRng,
        x: BigNumber,
        generator: CurvePoint,
        test_code: impl FnOnce(PiLogProof, CommonInput, SharedContext, &mut StdRng) -> Result<()>,
    ) -> Result<()> {
        let (p, q) = prime_gen::get_prime_pair_from_pool_insecure(rng)?;
        let dk = DecryptionKey::from_primes(&p, &q)?;
        let pk = dk.encryption_key();
        let setup = VerifiedRingPedersen::gen(rng)?;
        let context = SharedContext::random(rng);

        let (C, rho) = pk.encrypt(rng, &x)?;
        let X = generator.multiply_by_bignum(&x)?;

        let input = CommonInput::new(&C, &X, &setup, pk, &generator);
        let proof = PiLogProof::prove(
            input,
            ProverSecret::new(&x, &rho),
            &context,
            &mut transcript(),
            rng,
        )?;
        test_code(proof, input, context, rng)
    }

    #[test]
    fn proof_from_honest_prover_verifies() -> Result<()> {
        let mut rng = init_testing();
        let x = random_plusminus_by_size(&mut rng, ELL);
        with_random_proof(&mut rng, x, CurvePoint::GENERATOR, |proof, input, context, _| {
            proof.verify(input, &context, &mut transcript())
        })
    }

    #[test]
    fn proof_works_with_an_arbitrary_generator() -> Result<()> {
        let mut rng = init_testing();
        let x = random_plusminus_by_size(&mut rng, ELL);
        // Round three runs this proof with generator Γ, which is an
        // arbitrary group element from the verifier's point of view.
        let generator = CurvePoint::random(&mut rng);
        with_random_proof(&mut rng, x, generator, |proof, input, context, _| {
            proof.verify(input, &context, &mut transcript())
        })
    }

    #[test]
    fn proof_requires_the_matching_context() -> Result<()> {
        let mut rng = init_testing();
        let x = random_plusminus_by_size(&mut rng, ELL);
        with_random_proof(&mut rng, x, CurvePoint::GENERATOR, |proof, input, _context, rng| {
            let wrong_context = SharedContext::random(rng);
            assert!(proof
                .verify(input, &wrong_context, &mut transcript())
                .is_err());
            Ok(())
        })
    }

    #[test]
    fn mismatched_point_is_rejected() -> Result<()> {
        let mut rng = init_testing();
        let x = random_plusminus_by_size(&mut rng, ELL);
        with_random_proof(&mut rng, x, CurvePoint::GENERATOR, |proof, input, context, rng| {
            let wrong_X = CurvePoint::random(rng);
            let bad_input = CommonInput::new(
                input.C,
                &wrong_X,
                input.setup_params,
                input.prover_encryption_key,
                input.g,
            );
            assert!(proof.verify(bad_input, &context, &mut transcript()).is_err());
            Ok(())
        })
    }

    #[test]
    fn oversized_witness_is_rejected() -> Result<()> {
        let mut rng = init_testing();
        let x = random_plusminus_scaled(&mut rng, ELL + EPSILON, &(BigNumber::one() << EPSILON));
        with_random_proof(&mut rng, x, CurvePoint::GENERATOR, |proof, input, context, _| {
            assert!(proof.verify(input, &context, &mut transcript()).is_err());
            Ok(())
        })
    }

    #[test]
    fn each_response_field_is_binding() -> Result<()> {
        let mut rng = init_testing();
        let x = random_plusminus_by_size(&mut rng, ELL);
        let tamper = BigNumber::from(1u64);

        with_random_proof(&mut rng, x, CurvePoint::GENERATOR, |proof, input, context, rng| {
            let bad = PiLogProof {
                z1: &proof.z1 + &tamper,
                ..proof.clone()
            };
            assert!(bad.verify(input, &context, &mut transcript()).is_err());

            let bad = PiLogProof {
                z2: MaskedNonce::random(rng, input.prover_encryption_key.modulus()),
                ..proof.clone()
            };
            assert!(bad.verify(input, &context, &mut transcript()).is_err());

            let bad = PiLogProof {
                z3: &proof.z3 + &tamper,
                ..proof.clone()
            };
            assert!(bad.verify(input, &context, &mut transcript()).is_err());

            let bad = PiLogProof {
                e: &proof.e + &tamper,
                ..proof.clone()
            };
            assert!(bad.verify(input, &context, &mut transcript()).is_err());

            let bad = PiLogProof {
                Y: CurvePoint::GENERATOR,
                ..proof.clone()
            };
            assert!(bad.verify(input, &context, &mut transcript()).is_err());

            proof.verify(input, &context, &mut transcript())
        })
    }

    #[test]
    fn proof_survives_serialization() -> Result<()> {
        let mut rng = init_testing();
        let x = random_plusminus_by_size(&mut rng, ELL);
        with_random_proof(&mut rng, x, CurvePoint::GENERATOR, |proof, input, context, _| {
            let bytes = serialize!(&proof)?;
            let restored: PiLogProof = deserialize!(&bytes)?;
            restored.verify(input, &context, &mut transcript())
        })
    }
}
