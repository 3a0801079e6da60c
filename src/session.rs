// Copyright (c) 2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Round-synchronous orchestration of a full signing session.
//!
//! The functions here drive a set of [`PresignParticipant`]s through the
//! three presign rounds and the signing step, delivering every round output
//! to its addressee. All deliveries pass through the crate's wire encoding,
//! so running a session in-process exercises the same serialization paths a
//! networked deployment would.
//!
//! A real deployment replaces this module with its own transport; the round
//! methods of [`PresignParticipant`] and the functions of [`crate::sign`]
//! are the complete external surface needed to do so.

use crate::{
    auxinfo,
    curve::CurvePoint,
    errors::{Error, Result},
    keygen,
    presign::{Input, PresignParticipant, PresignRecord},
    protocol::{ParticipantConfig, ParticipantIdentifier},
    sign,
};
use k256::{ecdsa::Signature, Scalar};
use rand::{CryptoRng, RngCore};
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::info;

/// Ship a round output across the in-process wire: serialize on the
/// sender's side, re-parse on the receiver's, exactly as a real transport
/// would.
fn route<T: Serialize + DeserializeOwned>(value: &T) -> Result<T> {
    let bytes = serialize!(value)?;
    deserialize!(&bytes)
}

/// Build one [`PresignParticipant`] per signer from the dealer outputs.
///
/// `outputs` must be aligned with `signers`: the i-th entry holds the
/// key-generation and auxiliary outputs of the i-th signer.
pub fn presign_participants(
    signers: &[ParticipantIdentifier],
    outputs: Vec<(keygen::Output, auxinfo::Output)>,
) -> Result<Vec<PresignParticipant>> {
    if signers.len() != outputs.len() {
        return Err(Error::BadInput);
    }
    signers
        .iter()
        .zip(outputs)
        .map(|(pid, (keygen_output, auxinfo_output))| {
            let others: Vec<ParticipantIdentifier> = signers
                .iter()
                .copied()
                .filter(|other| other != pid)
                .collect();
            let config = ParticipantConfig::new(*pid, &others)?;
            let input = Input::new(*pid, signers, keygen_output, auxinfo_output)?;
            PresignParticipant::new(config, input)
        })
        .collect()
}

/// Drive every participant through the three presign rounds, verifying all
/// proofs along the way, and return each signer's [`PresignRecord`].
///
/// Any proof failure or inconsistency aborts the whole session with the
/// offending participant named in the error.
pub fn run_presign<R: RngCore + CryptoRng>(
    participants: &mut [PresignParticipant],
    rng: &mut R,
) -> Result<HashMap<ParticipantIdentifier, PresignRecord>> {
    info!("Starting a presign session with {} signers", participants.len());

    // Round one: everyone broadcasts (K, G) and addresses a range proof to
    // each peer.
    let mut broadcasts = HashMap::new();
    let mut r1_by_receiver: HashMap<ParticipantIdentifier, HashMap<_, _>> = HashMap::new();
    for participant in participants.iter_mut() {
        let (broadcast, proofs) = participant.round_one(rng)?;
        broadcasts.insert(participant.id(), route(&broadcast)?);
        for (receiver, public) in proofs {
            r1_by_receiver
                .entry(receiver)
                .or_default()
                .insert(participant.id(), route(&public)?);
        }
    }

    // Round two: verify the round-one proofs and exchange the affine
    // transformations.
    let mut r2_by_receiver: HashMap<ParticipantIdentifier, HashMap<_, _>> = HashMap::new();
    for participant in participants.iter_mut() {
        let incoming = r1_by_receiver
            .remove(&participant.id())
            .ok_or(Error::InternalInvariantFailed)?;
        let outgoing = participant.round_two(rng, &broadcasts, &incoming)?;
        for (receiver, public) in outgoing {
            r2_by_receiver
                .entry(receiver)
                .or_default()
                .insert(participant.id(), route(&public)?);
        }
    }

    // Round three: verify, decrypt, and combine into (δᵢ, Δᵢ, Γ).
    let mut r3_by_receiver: HashMap<ParticipantIdentifier, HashMap<_, _>> = HashMap::new();
    for participant in participants.iter_mut() {
        let incoming = r2_by_receiver
            .remove(&participant.id())
            .ok_or(Error::InternalInvariantFailed)?;
        let outgoing = participant.round_three(rng, &incoming)?;
        for (receiver, public) in outgoing {
            r3_by_receiver
                .entry(receiver)
                .or_default()
                .insert(participant.id(), route(&public)?);
        }
    }

    // Finalize: the consistency check and the records.
    let mut records = HashMap::new();
    for participant in participants.iter_mut() {
        let incoming = r3_by_receiver
            .remove(&participant.id())
            .ok_or(Error::InternalInvariantFailed)?;
        let record = participant.finalize(&incoming)?;
        records.insert(participant.id(), record);
    }
    Ok(records)
}

/// Sign a message with a set of presign records, aggregating and verifying
/// the result against the group public key.
///
/// The message is hashed with SHA-256; the records are consumed.
pub fn sign(
    records: HashMap<ParticipantIdentifier, PresignRecord>,
    message: &[u8],
    public_key: &CurvePoint,
) -> Result<Signature> {
    if records.is_empty() {
        return Err(Error::BadInput);
    }
    let digest = Sha256::new_with_prefix(message);
    let digest_bytes: [u8; 32] = digest.clone().finalize().into();

    let mut x_projection: Option<Scalar> = None;
    let mut shares = Vec::with_capacity(records.len());
    for (_, record) in records {
        let (r, share) = sign::sign_share(record, &digest_bytes)?;
        match x_projection {
            None => x_projection = Some(r),
            // Records from the same session agree on R; a mismatch means
            // the caller mixed sessions.
            Some(previous) if previous != r => return Err(Error::BadInput),
            Some(_) => {}
        }
        shares.push(route(&share)?);
    }

    let x_projection = x_projection.ok_or(Error::InternalInvariantFailed)?;
    let signature = sign::combine(&x_projection, shares)?;
    sign::verify_signature(public_key, digest, &signature)?;
    Ok(signature)
}

/// End-to-end signing: presign with the given signers, then sign `message`.
///
/// `outputs` must be aligned with `signers` as in
/// [`presign_participants`]. Returns the canonical (low-s) signature,
/// already verified against the group public key.
pub fn sign_message<R: RngCore + CryptoRng>(
    message: &[u8],
    signers: &[ParticipantIdentifier],
    outputs: Vec<(keygen::Output, auxinfo::Output)>,
    rng: &mut R,
) -> Result<Signature> {
    let public_key = *outputs
        .first()
        .ok_or(Error::BadInput)?
        .0
        .public_key();
    let mut participants = presign_participants(signers, outputs)?;
    let records = run_presign(&mut participants, rng)?;
    sign(records, message, &public_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::Round,
        paillier::Ciphertext,
        presign::round_two,
        utils::testing::init_testing,
        zkp::ProofKind,
    };
    use k256::elliptic_curve::{scalar::IsHigh, Field};
    use k256::Scalar;
    use rand::{rngs::StdRng, seq::SliceRandom};

    /// Dealer setup for `n` parties with threshold `t`; returns the ids and
    /// the per-party output pairs.
    fn dealer_setup(
        n: usize,
        t: usize,
        rng: &mut StdRng,
    ) -> (
        Vec<ParticipantIdentifier>,
        Vec<(keygen::Output, auxinfo::Output)>,
    ) {
        let keygen_outputs = keygen::trusted_dealer(n, t, 100, rng).unwrap();
        let ids: Vec<ParticipantIdentifier> = keygen_outputs[0]
            .public_key_shares()
            .iter()
            .map(|share| share.participant())
            .collect();
        let auxinfo_outputs = auxinfo::trusted_dealer_from_pool_insecure(&ids, rng).unwrap();
        let outputs = keygen_outputs.into_iter().zip(auxinfo_outputs).collect();
        (ids, outputs)
    }

    /// Select the dealer outputs for a signer subset.
    fn outputs_for(
        signers: &[ParticipantIdentifier],
        all_ids: &[ParticipantIdentifier],
        outputs: &[(keygen::Output, auxinfo::Output)],
    ) -> Vec<(keygen::Output, auxinfo::Output)> {
        signers
            .iter()
            .map(|pid| {
                let position = all_ids.iter().position(|id| id == pid).unwrap();
                outputs[position].clone()
            })
            .collect()
    }

    #[test]
    fn three_party_signing_end_to_end() {
        let mut rng = init_testing();
        let (ids, outputs) = dealer_setup(3, 1, &mut rng);
        let public_key = *outputs[0].0.public_key();

        let mut participants = presign_participants(&ids, outputs).unwrap();
        let records = run_presign(&mut participants, &mut rng).unwrap();

        let message = b"hello";
        let digest = Sha256::new_with_prefix(message);
        let digest_bytes: [u8; 32] = digest.clone().finalize().into();

        // Sign by hand so the aggregation identities are observable.
        let mut x_projections = Vec::new();
        let mut shares = Vec::new();
        for (_, record) in records {
            let (r, share) = sign::sign_share(record, &digest_bytes).unwrap();
            x_projections.push(r);
            shares.push(share);
        }

        // Every signer derives the same r = R.x mod q.
        assert!(x_projections.windows(2).all(|r| r[0] == r[1]));

        // The aggregated s is the (normalized) sum of the shares.
        let share_sum: Scalar = shares.iter().map(|share| *share.as_scalar()).sum();
        let signature = sign::combine(&x_projections[0], shares).unwrap();
        let s: Scalar = *signature.s();
        assert!(s == share_sum || s == share_sum.negate());
        assert!(!bool::from(signature.s().is_high()));

        // r is the x-projection embedded in the signature.
        let r: Scalar = *signature.r();
        assert_eq!(r, x_projections[0]);

        // The signature verifies under the group public key, and the
        // wire-level encodings have the documented shapes.
        sign::verify_signature(&public_key, digest, &signature).unwrap();
        assert_eq!(signature.to_bytes().len(), 64);
        let sec1 = public_key.to_sec1_uncompressed();
        assert_eq!(sec1.len(), 65);
        assert_eq!(sec1[0], 0x04);
    }

    #[test]
    fn five_of_seven_signing_end_to_end() {
        let mut rng = init_testing();
        // A 5-signer quorum: polynomial degree 4.
        let (ids, outputs) = dealer_setup(7, 4, &mut rng);

        let mut signers = ids.clone();
        signers.shuffle(&mut rng);
        signers.truncate(5);
        signers.sort();

        let public_key = *outputs[0].0.public_key();
        let subset_outputs = outputs_for(&signers, &ids, &outputs);

        let message = b"Happy birthday to you!";
        let signature = sign_message(message, &signers, subset_outputs, &mut rng).unwrap();
        sign::verify_signature(&public_key, Sha256::new_with_prefix(message), &signature)
            .unwrap();
    }

    #[test]
    fn tampered_round_two_ciphertext_aborts_the_session() {
        let mut rng = init_testing();
        let (ids, outputs) = dealer_setup(3, 1, &mut rng);
        let mut participants = presign_participants(&ids, outputs).unwrap();

        // Drive rounds one and two by hand.
        let mut broadcasts = HashMap::new();
        let mut r1_by_receiver: HashMap<ParticipantIdentifier, HashMap<_, _>> = HashMap::new();
        for participant in participants.iter_mut() {
            let (broadcast, proofs) = participant.round_one(&mut rng).unwrap();
            broadcasts.insert(participant.id(), broadcast);
            for (receiver, public) in proofs {
                r1_by_receiver
                    .entry(receiver)
                    .or_default()
                    .insert(participant.id(), public);
            }
        }
        let mut r2_by_receiver: HashMap<ParticipantIdentifier, HashMap<_, round_two::Public>> =
            HashMap::new();
        for participant in participants.iter_mut() {
            let incoming = r1_by_receiver.remove(&participant.id()).unwrap();
            let outgoing = participant
                .round_two(&mut rng, &broadcasts, &incoming)
                .unwrap();
            for (receiver, public) in outgoing {
                r2_by_receiver
                    .entry(receiver)
                    .or_default()
                    .insert(participant.id(), public);
            }
        }

        // Corrupt the D ciphertext of one message before delivery.
        let victim = participants[0].id();
        let incoming = r2_by_receiver.get_mut(&victim).unwrap();
        let culprit = *incoming.keys().next().unwrap();
        let message = incoming.get_mut(&culprit).unwrap();
        message.D = Ciphertext::from_bn(message.D.as_bn() + 1);

        let incoming = r2_by_receiver.remove(&victim).unwrap();
        let result = participants[0].round_three(&mut rng, &incoming);
        assert_eq!(
            result.unwrap_err(),
            Error::ProofInvalid {
                round: Round::Two,
                from: culprit,
                kind: ProofKind::PiAffg,
            }
        );
    }

    #[test]
    fn tampered_delta_fails_the_consistency_check() {
        let mut rng = init_testing();
        let (ids, outputs) = dealer_setup(3, 1, &mut rng);
        let mut participants = presign_participants(&ids, outputs).unwrap();

        // Honest rounds one through three.
        let mut broadcasts = HashMap::new();
        let mut r1_by_receiver: HashMap<ParticipantIdentifier, HashMap<_, _>> = HashMap::new();
        for participant in participants.iter_mut() {
            let (broadcast, proofs) = participant.round_one(&mut rng).unwrap();
            broadcasts.insert(participant.id(), broadcast);
            for (receiver, public) in proofs {
                r1_by_receiver
                    .entry(receiver)
                    .or_default()
                    .insert(participant.id(), public);
            }
        }
        let mut r2_by_receiver: HashMap<ParticipantIdentifier, HashMap<_, _>> = HashMap::new();
        for participant in participants.iter_mut() {
            let incoming = r1_by_receiver.remove(&participant.id()).unwrap();
            let outgoing = participant
                .round_two(&mut rng, &broadcasts, &incoming)
                .unwrap();
            for (receiver, public) in outgoing {
                r2_by_receiver
                    .entry(receiver)
                    .or_default()
                    .insert(participant.id(), public);
            }
        }
        let mut r3_by_receiver: HashMap<
            ParticipantIdentifier,
            HashMap<_, crate::presign::round_three::Public>,
        > = HashMap::new();
        for participant in participants.iter_mut() {
            let incoming = r2_by_receiver.remove(&participant.id()).unwrap();
            let outgoing = participant.round_three(&mut rng, &incoming).unwrap();
            for (receiver, public) in outgoing {
                r3_by_receiver
                    .entry(receiver)
                    .or_default()
                    .insert(participant.id(), public);
            }
        }

        // One signer swaps its δ for a random scalar just before
        // finalization. The log proof does not cover δ, so only the global
        // δ·G = Δ identity can catch this.
        let culprit = participants[2].id();
        for incoming in r3_by_receiver.values_mut() {
            if let Some(message) = incoming.get_mut(&culprit) {
                message.delta = Scalar::random(&mut rng);
            }
        }

        for participant in participants.iter_mut() {
            let incoming = r3_by_receiver.remove(&participant.id()).unwrap();
            let result = participant.finalize(&incoming);
            if participant.id() == culprit {
                // The culprit received honest messages and finalizes fine.
                assert!(result.is_ok());
            } else {
                assert_eq!(result.unwrap_err(), Error::PresignInconsistent);
            }
        }
    }

    #[test]
    fn records_from_different_sessions_do_not_mix() {
        let mut rng = init_testing();
        let (ids, outputs) = dealer_setup(3, 1, &mut rng);
        let public_key = *outputs[0].0.public_key();

        let mut participants = presign_participants(&ids, outputs.clone()).unwrap();
        let mut records_one = run_presign(&mut participants, &mut rng).unwrap();

        let mut participants = presign_participants(&ids, outputs).unwrap();
        let records_two = run_presign(&mut participants, &mut rng).unwrap();

        // Replace one record with its counterpart from another session.
        let pid = ids[0];
        records_one.insert(pid, records_two.into_iter().find(|(id, _)| *id == pid).unwrap().1);

        assert!(sign(records_one, b"mixed sessions", &public_key).is_err());
    }
}
