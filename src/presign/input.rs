// Copyright (c) 2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::{
    auxinfo::{self, AuxInfoPublic},
    curve::CurvePoint,
    errors::{Error, Result},
    keygen::{self, KeySharePrivate, KeySharePublic},
    paillier::DecryptionKey,
    protocol::ParticipantIdentifier,
    threshold::lagrange_coefficient_at_zero,
};
use k256::Scalar;
use tracing::error;

/// Input for presigning: one signer's key-generation and auxiliary
/// material, restricted and Lagrange-scaled to the chosen signer subset.
///
/// Scaling turns the polynomial sharing into an additive sharing over the
/// subset: each signer's share is multiplied by its Lagrange coefficient at
/// zero, after which the scaled public shares sum to the group public key.
/// That identity is checked here, before any round runs.
#[derive(Debug)]
pub struct Input {
    keygen_output: keygen::Output,
    auxinfo_output: auxinfo::Output,
    /// Scaled private share of this signer.
    private_key_share: KeySharePrivate,
    /// Scaled public shares of all signers in the subset.
    public_key_shares: Vec<KeySharePublic>,
}

impl Input {
    /// Restrict `keygen_output` and `auxinfo_output` to the signer subset
    /// and apply Lagrange scaling.
    ///
    /// `own_id` must identify the signer this input belongs to, and the
    /// subset must contain it, have at least `threshold + 1` members, and be
    /// covered by both outputs.
    pub fn new(
        own_id: ParticipantIdentifier,
        signers: &[ParticipantIdentifier],
        keygen_output: keygen::Output,
        auxinfo_output: auxinfo::Output,
    ) -> Result<Self> {
        if !signers.contains(&own_id) {
            error!("Signer subset does not contain this participant ({own_id})");
            return Err(Error::BadInput);
        }
        if signers.len() < keygen_output.threshold() + 1 {
            error!(
                "Signer subset has {} members; threshold {} requires at least {}",
                signers.len(),
                keygen_output.threshold(),
                keygen_output.threshold() + 1
            );
            return Err(Error::BadInput);
        }
        // Both outputs must cover the whole subset.
        for pid in signers {
            let _ = keygen_output.find_public_key_share(*pid)?;
            let _ = auxinfo_output.find_public(*pid)?;
        }

        let points: Vec<Scalar> = signers.iter().map(|pid| pid.as_scalar()).collect();

        // Scale the public shares of everyone in the subset.
        let public_key_shares = signers
            .iter()
            .map(|pid| {
                let lambda = lagrange_coefficient_at_zero(&pid.as_scalar(), &points)?;
                let share = keygen_output.find_public_key_share(*pid)?;
                Ok(KeySharePublic::new(
                    *pid,
                    share.as_ref().multiply_by_scalar(&lambda),
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        // The scaled public shares must reassemble the group public key.
        let sum = public_key_shares
            .iter()
            .fold(CurvePoint::IDENTITY, |sum, share| sum + *share.as_ref());
        if &sum != keygen_output.public_key() {
            error!("Lagrange-scaled public key shares do not sum to the group public key");
            return Err(Error::BadInput);
        }

        // Scale our own private share to match.
        let own_lambda = lagrange_coefficient_at_zero(&own_id.as_scalar(), &points)?;
        let scaled = keygen_output.private_key_share().as_scalar()? * own_lambda;
        let private_key_share = KeySharePrivate::from_scalar(&scaled);

        Ok(Self {
            keygen_output,
            auxinfo_output,
            private_key_share,
            public_key_shares,
        })
    }

    /// This signer's Lagrange-scaled private key share.
    pub(crate) fn private_key_share(&self) -> &KeySharePrivate {
        &self.private_key_share
    }

    /// A signer's Lagrange-scaled public key share.
    pub(crate) fn public_key_share(&self, pid: ParticipantIdentifier) -> Result<&KeySharePublic> {
        self.public_key_shares
            .iter()
            .find(|share| share.participant() == pid)
            .ok_or_else(|| {
                error!("No scaled public key share for participant {pid}");
                Error::BadInput
            })
    }

    /// The Lagrange-scaled public key shares of the whole subset.
    pub(crate) fn public_key_shares(&self) -> &[KeySharePublic] {
        &self.public_key_shares
    }

    /// The group public key.
    pub(crate) fn public_key(&self) -> &CurvePoint {
        self.keygen_output.public_key()
    }

    /// A participant's public auxiliary material.
    pub(crate) fn find_auxinfo_public(
        &self,
        pid: ParticipantIdentifier,
    ) -> Result<&AuxInfoPublic> {
        self.auxinfo_output.find_public(pid)
    }

    /// This signer's Paillier decryption key.
    pub(crate) fn decryption_key(&self) -> &DecryptionKey {
        self.auxinfo_output.private_auxinfo().decryption_key()
    }

    /// The sharing threshold `t`.
    pub(crate) fn threshold(&self) -> usize {
        self.keygen_output.threshold()
    }

    /// The session identifier of the underlying key material.
    pub(crate) fn sid(&self) -> crate::protocol::Identifier {
        self.keygen_output.sid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{keygen::trusted_dealer, utils::testing::init_testing};

    #[test]
    fn scaled_shares_sum_to_the_public_key() {
        let mut rng = init_testing();
        let keygen_outputs = trusted_dealer(3, 1, 100, &mut rng).unwrap();
        let ids: Vec<ParticipantIdentifier> = keygen_outputs[0]
            .public_key_shares()
            .iter()
            .map(|share| share.participant())
            .collect();
        let auxinfo_outputs =
            auxinfo::trusted_dealer_from_pool_insecure(&ids, &mut rng).unwrap();

        // Input::new runs the sum-check internally; all three must pass.
        for ((keygen_output, auxinfo_output), pid) in keygen_outputs
            .into_iter()
            .zip(auxinfo_outputs.into_iter())
            .zip(&ids)
        {
            assert!(Input::new(*pid, &ids, keygen_output, auxinfo_output).is_ok());
        }
    }

    #[test]
    fn undersized_signer_subsets_are_rejected() {
        let mut rng = init_testing();
        let keygen_outputs = trusted_dealer(3, 1, 100, &mut rng).unwrap();
        let ids: Vec<ParticipantIdentifier> = keygen_outputs[0]
            .public_key_shares()
            .iter()
            .map(|share| share.participant())
            .collect();
        let auxinfo_outputs =
            auxinfo::trusted_dealer_from_pool_insecure(&ids, &mut rng).unwrap();

        // Threshold 1 needs at least 2 signers.
        let subset = &ids[..1];
        let result = Input::new(
            ids[0],
            subset,
            keygen_outputs.into_iter().next().unwrap(),
            auxinfo_outputs.into_iter().next().unwrap(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn subset_must_contain_the_owner() {
        let mut rng = init_testing();
        let keygen_outputs = trusted_dealer(3, 1, 100, &mut rng).unwrap();
        let ids: Vec<ParticipantIdentifier> = keygen_outputs[0]
            .public_key_shares()
            .iter()
            .map(|share| share.participant())
            .collect();
        let auxinfo_outputs =
            auxinfo::trusted_dealer_from_pool_insecure(&ids, &mut rng).unwrap();

        let subset = vec![ids[1], ids[2]];
        let result = Input::new(
            ids[0],
            &subset,
            keygen_outputs.into_iter().next().unwrap(),
            auxinfo_outputs.into_iter().next().unwrap(),
        );
        assert!(result.is_err());
    }
}
