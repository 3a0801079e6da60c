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
    protocol::ParticipantIdentifier,
    zkp::{pilog, Proof, ProofContext, ProofKind},
};
use k256::Scalar;
use libpaillier::unknown_order::BigNumber;
use merlin::Transcript;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use zeroize::ZeroizeOnDrop;

/// State retained by a signer after round three: everything needed to
/// finalize the record once the peers' round-three messages arrive.
#[derive(Clone, ZeroizeOnDrop)]
pub(crate) struct Private {
    /// Nonce share `kᵢ`.
    pub k: BigNumber,
    /// Share of `x·k`.
    pub chi: Scalar,
    /// `Γ = Σⱼ Γⱼ`; public, sent to peers as well.
    #[zeroize(skip)]
    pub Gamma: CurvePoint,
    /// Our share `δᵢ`; public, sent to peers as well.
    #[zeroize(skip)]
    pub delta: Scalar,
    /// `Δᵢ = kᵢ·Γ`; public, sent to peers as well.
    #[zeroize(skip)]
    pub Delta: CurvePoint,
}

impl Debug for Private {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("presign::round_three::Private")
            .field("k", &"[redacted]")
            .field("chi", &"[redacted]")
            .field("Gamma", &self.Gamma)
            .field("delta", &self.delta)
            .field("Delta", &self.Delta)
            .finish()
    }
}

/// Round-three output addressed to a single peer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Public {
    /// The sender's share `δᵢ` of `γ·k`.
    pub delta: Scalar,
    /// `Δᵢ = kᵢ·Γ`.
    pub Delta: CurvePoint,
    /// Proves `Δᵢ` consistent with the sender's round-one ciphertext `Kᵢ`,
    /// with generator `Γ`.
    pub psi_double_prime: pilog::PiLogProof,
    /// The sender's view of `Γ`, included so the verifier can run the proof
    /// without reassembling it.
    pub Gamma: CurvePoint,
}

impl Public {
    /// Verify a round-three message received from `prover`.
    ///
    /// `verifier_auxinfo` is ours; `prover_auxinfo` and `prover_k` (the
    /// round-one ciphertext `Kᵢ`) belong to the sender.
    pub(crate) fn verify(
        &self,
        context: &impl ProofContext,
        prover: ParticipantIdentifier,
        verifier_auxinfo: &AuxInfoPublic,
        prover_auxinfo: &AuxInfoPublic,
        prover_k: &Ciphertext,
    ) -> Result<()> {
        let input = pilog::CommonInput::new(
            prover_k,
            &self.Delta,
            verifier_auxinfo.params(),
            prover_auxinfo.pk(),
            &self.Gamma,
        );
        self.psi_double_prime
            .clone()
            .verify(input, context, &mut transcript())
            .map_err(|err| err.attribute(Round::Three, prover, ProofKind::PiLog))
    }
}

/// Fresh transcript for the round-three log proof.
pub(crate) fn transcript() -> Transcript {
    Transcript::new(b"PiLogProof RoundThree")
}
