// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Key generation: Shamir shares of an ECDSA signing key.
//!
//! This module implements the centralized trusted-dealer variant: a dealer
//! samples a degree-`t` polynomial over the secp256k1 scalar field, hands
//! each participant the evaluation at its identifier, and publishes the
//! matching public points. Any `t+1` participants can reconstruct (or,
//! through presigning, use without reconstructing) the secret at `f(0)`.
//!
//! The dealer must be trusted not to retain the polynomial; distributed key
//! generation with bias resistance is out of scope.

use crate::{
    curve::{bn_to_scalar, scalar_to_bn, CurvePoint},
    errors::{Error, Result},
    protocol::{Identifier, ParticipantIdentifier},
    threshold::{evaluate_polynomial, lagrange_coefficient_at_zero, random_polynomial},
};
use k256::{elliptic_curve::Field, Scalar};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::error;
use zeroize::ZeroizeOnDrop;

/// A participant's secret share of the group signing key: the Shamir
/// polynomial evaluated at the participant's identifier.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, ZeroizeOnDrop)]
pub struct KeySharePrivate {
    x: BigNumber, // in the range [0, q)
}

impl Debug for KeySharePrivate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeySharePrivate([redacted])")
    }
}

impl KeySharePrivate {
    pub(crate) fn from_scalar(share: &Scalar) -> Self {
        Self {
            x: scalar_to_bn(share),
        }
    }

    /// The share as a scalar.
    pub(crate) fn as_scalar(&self) -> Result<Scalar> {
        bn_to_scalar(&self.x)
    }

    /// Compute the public point corresponding to this share.
    pub(crate) fn public_share(&self) -> Result<CurvePoint> {
        CurvePoint::scale_generator(&self.x)
    }
}

impl AsRef<BigNumber> for KeySharePrivate {
    fn as_ref(&self) -> &BigNumber {
        &self.x
    }
}

/// The public point matching one participant's [`KeySharePrivate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySharePublic {
    participant: ParticipantIdentifier,
    X: CurvePoint,
}

impl KeySharePublic {
    pub(crate) fn new(participant: ParticipantIdentifier, share: CurvePoint) -> Self {
        Self {
            participant,
            X: share,
        }
    }

    /// The participant holding the matching private share.
    pub fn participant(&self) -> ParticipantIdentifier {
        self.participant
    }
}

impl AsRef<CurvePoint> for KeySharePublic {
    fn as_ref(&self) -> &CurvePoint {
        &self.X
    }
}

/// One participant's output of key generation.
#[derive(Debug, Clone)]
pub struct Output {
    sid: Identifier,
    threshold: usize,
    public_key_shares: Vec<KeySharePublic>,
    private_key_share: KeySharePrivate,
    public_key: CurvePoint,
}

impl Output {
    /// The session identifier bound to this key.
    pub fn sid(&self) -> Identifier {
        self.sid
    }

    /// The polynomial degree `t`; any `t+1` participants can sign.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// The public key shares of every participant.
    pub fn public_key_shares(&self) -> &[KeySharePublic] {
        &self.public_key_shares
    }

    /// This participant's private key share.
    pub fn private_key_share(&self) -> &KeySharePrivate {
        &self.private_key_share
    }

    /// The group public key.
    pub fn public_key(&self) -> &CurvePoint {
        &self.public_key
    }

    /// This participant's public key share.
    pub(crate) fn find_public_key_share(
        &self,
        pid: ParticipantIdentifier,
    ) -> Result<&KeySharePublic> {
        self.public_key_shares
            .iter()
            .find(|share| share.participant() == pid)
            .ok_or_else(|| {
                error!("No public key share for participant {pid}");
                Error::BadInput
            })
    }

    /// Recompute the group public key from the public shares of any quorum
    /// of at least `t+1` participants, by Lagrange interpolation in the
    /// exponent.
    pub fn public_key_from_shares(&self, quorum: &[ParticipantIdentifier]) -> Result<CurvePoint> {
        if quorum.len() < self.threshold + 1 {
            error!(
                "Need at least {} shares to recover the public key, got {}",
                self.threshold + 1,
                quorum.len()
            );
            return Err(Error::BadInput);
        }
        let points: Vec<Scalar> = quorum.iter().map(|pid| pid.as_scalar()).collect();
        let mut sum = CurvePoint::IDENTITY;
        for pid in quorum {
            let share = self.find_public_key_share(*pid)?;
            let lambda = lagrange_coefficient_at_zero(&pid.as_scalar(), &points)?;
            sum = sum + share.as_ref().multiply_by_scalar(&lambda);
        }
        Ok(sum)
    }
}

/// Run trusted-dealer key generation for `n` participants with threshold
/// `t`, drawing identifiers from `1..=id_range`.
///
/// Returns one [`Output`] per participant, in identifier order. The dealer's
/// view (the polynomial and all shares) lives only inside this function.
pub fn trusted_dealer<R: RngCore + CryptoRng>(
    n: usize,
    t: usize,
    id_range: u32,
    rng: &mut R,
) -> Result<Vec<Output>> {
    if n < t + 1 || n < 2 {
        error!("Cannot share among {n} participants with threshold {t}");
        return Err(Error::BadInput);
    }

    let mut ids = ParticipantIdentifier::random_set(n, id_range, rng)?;
    ids.sort();
    let sid = Identifier::random(rng);

    let secret = Scalar::random(&mut *rng);
    let coefficients = random_polynomial(t, secret, rng);
    let public_key = CurvePoint::GENERATOR.multiply_by_scalar(&secret);

    let private_shares: Vec<KeySharePrivate> = ids
        .iter()
        .map(|pid| {
            let eval = evaluate_polynomial(&coefficients, &pid.as_scalar());
            KeySharePrivate::from_scalar(&eval)
        })
        .collect();

    let public_key_shares: Vec<KeySharePublic> = ids
        .iter()
        .zip(&private_shares)
        .map(|(pid, share)| Ok(KeySharePublic::new(*pid, share.public_share()?)))
        .collect::<Result<_>>()?;

    Ok(private_shares
        .into_iter()
        .map(|private_key_share| Output {
            sid,
            threshold: t,
            public_key_shares: public_key_shares.clone(),
            private_key_share,
            public_key,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::init_testing;

    #[test]
    fn dealer_outputs_are_internally_consistent() {
        let mut rng = init_testing();
        let outputs = trusted_dealer(5, 2, 100, &mut rng).unwrap();
        assert_eq!(outputs.len(), 5);

        // Every output agrees on the public material.
        for output in &outputs[1..] {
            assert_eq!(output.public_key_shares(), outputs[0].public_key_shares());
            assert_eq!(output.public_key(), outputs[0].public_key());
            assert_eq!(output.sid(), outputs[0].sid());
        }

        // Each private share matches its public point.
        for (output, share) in outputs.iter().zip(outputs[0].public_key_shares()) {
            assert_eq!(&output.private_key_share().public_share().unwrap(), share.as_ref());
        }
    }

    #[test]
    fn any_quorum_reconstructs_the_secret_key() {
        let mut rng = init_testing();
        let t = 2;
        let outputs = trusted_dealer(5, t, 100, &mut rng).unwrap();
        let all_ids: Vec<ParticipantIdentifier> = outputs[0]
            .public_key_shares()
            .iter()
            .map(|share| share.participant())
            .collect();

        // Reconstruct x = Σ λ_i·x_i over a few quorums of size t+1 and
        // check x·G against the published public key.
        for skip in 0..outputs.len() {
            let quorum: Vec<ParticipantIdentifier> = all_ids
                .iter()
                .copied()
                .filter(|pid| *pid != all_ids[skip])
                .take(t + 1)
                .collect();
            let points: Vec<Scalar> = quorum.iter().map(|pid| pid.as_scalar()).collect();

            // Outputs are in identifier order, so index by position in
            // `all_ids`.
            let secret = quorum
                .iter()
                .map(|pid| {
                    let position = all_ids.iter().position(|id| id == pid).unwrap();
                    let share = outputs[position].private_key_share().as_scalar().unwrap();
                    let lambda =
                        lagrange_coefficient_at_zero(&pid.as_scalar(), &points).unwrap();
                    share * lambda
                })
                .fold(Scalar::ZERO, |acc, x| acc + x);

            assert_eq!(
                &CurvePoint::GENERATOR.multiply_by_scalar(&secret),
                outputs[0].public_key()
            );
            assert_eq!(
                outputs[0].public_key_from_shares(&quorum).unwrap(),
                *outputs[0].public_key()
            );
        }
    }

    #[test]
    fn undersized_quorum_cannot_recover_the_public_key() {
        let mut rng = init_testing();
        let outputs = trusted_dealer(4, 2, 100, &mut rng).unwrap();
        let quorum: Vec<ParticipantIdentifier> = outputs[0]
            .public_key_shares()
            .iter()
            .take(2)
            .map(|share| share.participant())
            .collect();
        assert!(outputs[0].public_key_from_shares(&quorum).is_err());
    }

    #[test]
    fn dealer_rejects_impossible_thresholds() {
        let mut rng = init_testing();
        assert!(trusted_dealer(3, 3, 100, &mut rng).is_err());
        assert!(trusted_dealer(1, 0, 100, &mut rng).is_err());
    }
}
