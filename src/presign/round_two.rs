// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::{
    auxinfo::AuxInfoPublic,
    curve::CurvePoint,
    errors::{Result, Round},
    paillier::Ciphertext,
    presign::round_one::PublicBroadcast as RoundOnePublicBroadcast,
    protocol::ParticipantIdentifier,
    zkp::{piaffg, pienc, pilog, Proof, ProofContext, ProofKind},
};
use libpaillier::unknown_order::BigNumber;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use zeroize::ZeroizeOnDrop;

/// State retained per peer after round two: the blinding addends whose
/// negations were encrypted into `D` and `D̂`. They re-enter the arithmetic
/// in round three and never cross the wire.
#[derive(Clone, ZeroizeOnDrop)]
pub(crate) struct Private {
    pub beta: BigNumber,
    pub beta_hat: BigNumber,
}

impl Debug for Private {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("presign::round_two::Private")
            .field("beta", &"[redacted]")
            .field("beta_hat", &"[redacted]")
            .finish()
    }
}

/// Round-two output addressed to a single peer `j`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Public {
    /// `Γᵢ = γᵢ·G`.
    pub Gamma: CurvePoint,
    /// `K_j^{γᵢ} · Enc_j(-βᵢⱼ)` — the peer's encrypted nonce share
    /// transformed by our mask share.
    pub D: Ciphertext,
    /// `Enc_i(-βᵢⱼ)` — the same addend under our own key.
    pub F: Ciphertext,
    /// `K_j^{xᵢ} · Enc_j(-β̂ᵢⱼ)` — the peer's encrypted nonce share
    /// transformed by our scaled key share.
    pub D_hat: Ciphertext,
    /// `Enc_i(-β̂ᵢⱼ)`.
    pub F_hat: Ciphertext,
    /// Ties `D` to `Γᵢ`.
    pub psi: piaffg::PiAffgProof,
    /// Ties `D̂` to our scaled public key share.
    pub psi_hat: piaffg::PiAffgProof,
    /// Ties `Gᵢ` (from round one) to `Γᵢ`.
    pub psi_prime: pilog::PiLogProof,
}

impl Public {
    /// Verify a round-two message received from `prover`: both affine
    /// proofs against our own ciphertext `K` and commitment parameters,
    /// plus the log proof tying the prover's round-one `G` to its `Γ`.
    ///
    /// `verifier_auxinfo` is ours; `prover_auxinfo`,
    /// `prover_public_key_share` (Lagrange-scaled), and
    /// `prover_r1_broadcast` belong to the sender. Failures come back
    /// attributed to `prover` and the failing proof.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn verify(
        &self,
        context: &impl ProofContext,
        prover: ParticipantIdentifier,
        verifier_auxinfo: &AuxInfoPublic,
        prover_auxinfo: &AuxInfoPublic,
        receiver_k: &Ciphertext,
        prover_public_key_share: &CurvePoint,
        prover_r1_broadcast: &RoundOnePublicBroadcast,
    ) -> Result<()> {
        let psi_input = piaffg::CommonInput::new(
            &self.Gamma,
            receiver_k,
            &self.D,
            &self.F,
            verifier_auxinfo.pk(),
            prover_auxinfo.pk(),
            verifier_auxinfo.params(),
        );
        self.psi
            .clone()
            .verify(psi_input, context, &mut transcripts::psi())
            .map_err(|err| err.attribute(Round::Two, prover, ProofKind::PiAffg))?;

        let psi_hat_input = piaffg::CommonInput::new(
            prover_public_key_share,
            receiver_k,
            &self.D_hat,
            &self.F_hat,
            verifier_auxinfo.pk(),
            prover_auxinfo.pk(),
            verifier_auxinfo.params(),
        );
        self.psi_hat
            .clone()
            .verify(psi_hat_input, context, &mut transcripts::psi_hat())
            .map_err(|err| err.attribute(Round::Two, prover, ProofKind::PiAffg))?;

        let psi_prime_input = pilog::CommonInput::new(
            &prover_r1_broadcast.G,
            &self.Gamma,
            verifier_auxinfo.params(),
            prover_auxinfo.pk(),
            &CurvePoint::GENERATOR,
        );
        self.psi_prime
            .clone()
            .verify(psi_prime_input, context, &mut transcripts::psi_prime())
            .map_err(|err| err.attribute(Round::Two, prover, ProofKind::PiLog))?;

        Ok(())
    }
}

/// Verify the round-one range proof that accompanied `prover`'s broadcast.
pub(crate) fn verify_round_one_proof(
    context: &impl ProofContext,
    prover: ParticipantIdentifier,
    verifier_auxinfo: &AuxInfoPublic,
    prover_auxinfo: &AuxInfoPublic,
    proof: pienc::PiEncProof,
    prover_r1_broadcast: &RoundOnePublicBroadcast,
) -> Result<()> {
    let input = pienc::CommonInput::new(
        &prover_r1_broadcast.K,
        prover_auxinfo.pk(),
        verifier_auxinfo.params(),
    );
    proof
        .verify(input, context, &mut transcripts::pienc())
        .map_err(|err| err.attribute(Round::One, prover, ProofKind::PiEnc))
}

/// Fresh transcripts for the proofs of rounds one and two. Prover and
/// verifier must start from the same label.
pub(crate) mod transcripts {
    use merlin::Transcript;

    pub(crate) fn pienc() -> Transcript {
        Transcript::new(b"PiEncProof")
    }

    pub(crate) fn psi() -> Transcript {
        Transcript::new(b"PiAffgProof Gamma")
    }

    pub(crate) fn psi_hat() -> Transcript {
        Transcript::new(b"PiAffgProof KeyShare")
    }

    pub(crate) fn psi_prime() -> Transcript {
        Transcript::new(b"PiLogProof RoundTwo")
    }
}
