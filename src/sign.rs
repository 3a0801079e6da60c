// Copyright (c) 2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Non-interactive signing: turning presign records into an ECDSA
//! signature.
//!
//! Signing involves no further zero-knowledge machinery. Each signer holds
//! a [`PresignRecord`] with the nonce commitment `R`, a nonce share `kᵢ`,
//! and a masked key share `χᵢ`; its partial signature on a digest `m` is
//! `σᵢ = m·kᵢ + r·χᵢ` with `r = R.x mod q`. The shares sum to the `s`
//! component of a standard ECDSA signature, which is normalized to its low
//! form and checked against the group public key before being released.

use crate::{
    curve::{scalar_from_digest, CurvePoint},
    errors::{Error, Result},
    presign::PresignRecord,
};
use k256::{
    ecdsa::{signature::DigestVerifier, Signature, VerifyingKey},
    elliptic_curve::scalar::IsHigh,
    Scalar,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::error;
use zeroize::Zeroize;

/// A single signer's share of a signature.
///
/// Shares are broadcast in the clear; they reveal nothing about the key
/// material beyond what the final signature reveals. They are short-lived:
/// aggregate them with [`combine`] and discard them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SignatureShare(Scalar);

impl SignatureShare {
    /// The share as a scalar.
    pub fn as_scalar(&self) -> &Scalar {
        &self.0
    }
}

impl std::ops::Add for SignatureShare {
    type Output = Scalar;
    fn add(self, rhs: Self) -> Self::Output {
        self.0 + rhs.0
    }
}

/// Produce a signature share on a 32-byte message digest, consuming the
/// [`PresignRecord`].
///
/// Also returns `r`, the x-projection of the record's nonce commitment,
/// which the aggregator needs to assemble the signature. Every signer of
/// the same session computes the same `r`.
///
/// # 🔒 Lifetime requirement
/// The record is consumed (and its memory wiped) here; a record must never
/// sign two digests.
pub fn sign_share(record: PresignRecord, digest: &[u8; 32]) -> Result<(Scalar, SignatureShare)> {
    let mut m = scalar_from_digest(digest);
    let x_projection = record.x_projection()?;

    let share = m * record.mask_share() + x_projection * record.masked_key_share();

    // The record dies with this scope (ZeroizeOnDrop); clear our local
    // copy of the digest scalar as well.
    m.zeroize();
    drop(record);

    Ok((x_projection, SignatureShare(share)))
}

/// Combine signature shares into a complete ECDSA signature.
///
/// The `s` sum is normalized to the low representative (BIP-0062 style) so
/// the signature is canonical.
pub fn combine(
    x_projection: &Scalar,
    shares: impl IntoIterator<Item = SignatureShare>,
) -> Result<Signature> {
    let mut sum = shares
        .into_iter()
        .fold(Scalar::ZERO, |acc, share| acc + share.0);
    if bool::from(sum.is_high()) {
        sum = sum.negate();
    }

    Signature::from_scalars(x_projection.to_bytes(), sum.to_bytes()).map_err(|_| {
        error!("Combined signature shares do not form a valid (r, s) pair");
        Error::SignatureInvalid
    })
}

/// Verify a signature on the given message digest against the group public
/// key.
pub fn verify_signature(
    public_key: &CurvePoint,
    digest: Sha256,
    signature: &Signature,
) -> Result<()> {
    let verifying_key: VerifyingKey = public_key.to_verifying_key()?;
    verifying_key.verify_digest(digest, signature).map_err(|_| {
        error!("Aggregated signature failed secp256k1 verification");
        Error::SignatureInvalid
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::init_testing;
    use k256::elliptic_curve::Field;

    #[test]
    fn simulated_records_produce_a_valid_signature() {
        let mut rng = init_testing();

        // Three additive key shares and a consistent record set.
        let key_shares: Vec<Scalar> = (0..3).map(|_| Scalar::random(&mut rng)).collect();
        let secret_key: Scalar = key_shares.iter().sum();
        let public_key =
            crate::curve::CurvePoint::GENERATOR.multiply_by_scalar(&secret_key);

        let records = crate::presign::PresignRecord::simulate_set(&key_shares, &mut rng);

        let message = b"the quick brown fox jumped over the lazy dog";
        let digest = Sha256::new_with_prefix(message);
        let digest_bytes: [u8; 32] = digest.clone().finalize().into();

        let mut x_projections = Vec::new();
        let shares: Vec<SignatureShare> = records
            .into_iter()
            .map(|record| {
                let (r, share) = sign_share(record, &digest_bytes).unwrap();
                x_projections.push(r);
                share
            })
            .collect();

        // All signers agree on r.
        assert!(x_projections.windows(2).all(|r| r[0] == r[1]));

        let signature = combine(&x_projections[0], shares).unwrap();
        assert!(verify_signature(&public_key, digest, &signature).is_ok());
    }

    #[test]
    fn combined_signature_is_low_s() {
        let mut rng = init_testing();
        let key_shares: Vec<Scalar> = (0..2).map(|_| Scalar::random(&mut rng)).collect();
        let records = crate::presign::PresignRecord::simulate_set(&key_shares, &mut rng);

        let digest_bytes: [u8; 32] = Sha256::digest(b"low s please").into();
        let mut r = Scalar::ZERO;
        let shares: Vec<SignatureShare> = records
            .into_iter()
            .map(|record| {
                let (x_projection, share) = sign_share(record, &digest_bytes).unwrap();
                r = x_projection;
                share
            })
            .collect();

        let signature = combine(&r, shares).unwrap();
        assert!(!bool::from(signature.s().is_high()));
    }

    #[test]
    fn a_corrupted_share_invalidates_the_signature() {
        let mut rng = init_testing();
        let key_shares: Vec<Scalar> = (0..3).map(|_| Scalar::random(&mut rng)).collect();
        let secret_key: Scalar = key_shares.iter().sum();
        let public_key =
            crate::curve::CurvePoint::GENERATOR.multiply_by_scalar(&secret_key);

        let records = crate::presign::PresignRecord::simulate_set(&key_shares, &mut rng);

        let digest = Sha256::new_with_prefix(b"tamper with me");
        let digest_bytes: [u8; 32] = digest.clone().finalize().into();

        let mut r = Scalar::ZERO;
        let mut shares: Vec<SignatureShare> = records
            .into_iter()
            .map(|record| {
                let (x_projection, share) = sign_share(record, &digest_bytes).unwrap();
                r = x_projection;
                share
            })
            .collect();

        // One signer lies about its share.
        shares[1] = SignatureShare(Scalar::random(&mut rng));

        match combine(&r, shares) {
            // Usually the sum is still a well-formed-but-wrong signature...
            Ok(signature) => {
                assert_eq!(
                    verify_signature(&public_key, digest, &signature),
                    Err(Error::SignatureInvalid)
                );
            }
            // ...but a zero sum is rejected at assembly.
            Err(error) => assert_eq!(error, Error::SignatureInvalid),
        }
    }

    #[test]
    fn shares_sum_to_the_signature_scalar() {
        let mut rng = init_testing();
        let key_shares: Vec<Scalar> = (0..3).map(|_| Scalar::random(&mut rng)).collect();
        let records = crate::presign::PresignRecord::simulate_set(&key_shares, &mut rng);

        let digest_bytes: [u8; 32] = Sha256::digest(b"share sum").into();
        let mut r = Scalar::ZERO;
        let shares: Vec<SignatureShare> = records
            .into_iter()
            .map(|record| {
                let (x_projection, share) = sign_share(record, &digest_bytes).unwrap();
                r = x_projection;
                share
            })
            .collect();

        let sum: Scalar = shares.iter().map(|share| share.0).sum();
        let signature = combine(&r, shares).unwrap();

        // The returned s is either the sum or its negation (whichever is
        // low).
        let s: Scalar = *signature.s();
        assert!(s == sum || s == sum.negate());
    }
}
