// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::{
    curve::{bn_to_scalar, CurvePoint},
    errors::{Error, Result},
    presign::round_three::{Private as RoundThreePrivate, Public as RoundThreePublic},
    utils::ParseBytes,
};
use k256::Scalar;
use std::fmt::Debug;
use tracing::error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A signer's finalization view: its own round-three state plus every
/// peer's round-three output.
pub(crate) struct RecordPair {
    pub(crate) private: RoundThreePrivate,
    pub(crate) publics: Vec<RoundThreePublic>,
}

/// The output of presigning, consumed to create one partial signature.
///
/// # 🔒 Storage requirements
/// This type must be stored securely by the calling application.
///
/// # 🔒 Lifetime requirements
/// This type must be used at most _once_. Reusing a record across two
/// message digests leaks the signing key.
///
/// The record holds the nonce commitment `R = δ⁻¹·Γ`, this signer's nonce
/// share `kᵢ`, and its masked key share `χᵢ`. A partial signature on a
/// digest `m` is simply `m·kᵢ + r·χᵢ`, where `r` is the x-projection of
/// `R`; summed over the signer set these shares form a standard ECDSA `s`.
#[derive(Zeroize, ZeroizeOnDrop, PartialEq, Eq)]
pub struct PresignRecord {
    R: CurvePoint,
    k: Scalar,
    chi: Scalar,
}

const RECORD_TAG: &[u8] = b"Presign Record";

impl Debug for PresignRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // All fields redacted: `k` and `chi` are secret shares, and even
        // `R` narrows the session this record belongs to.
        f.debug_struct("PresignRecord")
            .field("R", &"[redacted]")
            .field("k", &"[redacted]")
            .field("chi", &"[redacted]")
            .finish()
    }
}

impl TryFrom<RecordPair> for PresignRecord {
    type Error = Error;
    fn try_from(RecordPair { private, publics }: RecordPair) -> Result<Self> {
        let mut delta = private.delta;
        let mut Delta = private.Delta;
        for p in publics {
            delta += p.delta;
            Delta = Delta + p.Delta;
        }

        // δ·G must equal Δ; a mismatch means some signer deviated after
        // its proofs were checked.
        if CurvePoint::GENERATOR.multiply_by_scalar(&delta) != Delta {
            error!("Presign consistency check failed: delta*G != Delta");
            return Err(Error::PresignInconsistent);
        }

        let delta_inv = Option::<Scalar>::from(delta.invert()).ok_or_else(|| {
            error!("Combined delta is zero; either a negligible-probability event or a bug");
            Error::InternalInvariantFailed
        })?;
        let R = private.Gamma.multiply_by_scalar(&delta_inv);

        Ok(PresignRecord {
            R,
            k: bn_to_scalar(&private.k)?,
            chi: private.chi,
        })
    }
}

impl PresignRecord {
    /// The nonce share (`kᵢ`).
    pub(crate) fn mask_share(&self) -> &Scalar {
        &self.k
    }

    /// The masked key share (`χᵢ`).
    pub(crate) fn masked_key_share(&self) -> &Scalar {
        &self.chi
    }

    /// The x-projection of the nonce commitment `R` — the `r` component of
    /// the eventual signature.
    pub(crate) fn x_projection(&self) -> Result<Scalar> {
        self.R.x_projection()
    }

    /// Serialize the record for secure storage.
    ///
    /// 🔒 The output contains key material; handle it with the same care as
    /// the record itself.
    pub fn into_bytes(self) -> Vec<u8> {
        // Format: RECORD_TAG, then each of (R, k, chi) prefixed with an
        // 8-byte little-endian length.
        let mut point = self.R.to_bytes();
        let point_len = point.len().to_le_bytes();

        let mut mask_share = self.k.to_bytes().to_vec();
        let mask_share_len = mask_share.len().to_le_bytes();

        let mut masked_key_share = self.chi.to_bytes().to_vec();
        let masked_key_share_len = masked_key_share.len().to_le_bytes();

        let bytes = [
            RECORD_TAG,
            &point_len,
            &point,
            &mask_share_len,
            &mask_share,
            &masked_key_share_len,
            &masked_key_share,
        ]
        .concat();

        point.zeroize();
        mask_share.zeroize();
        masked_key_share.zeroize();

        bytes
    }

    /// Deserialize a record previously produced by [`Self::into_bytes`].
    ///
    /// 🔒 Only feed this bytes produced by `into_bytes`; it is not a way to
    /// construct arbitrary records.
    pub fn try_from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let mut parser = ParseBytes::new(bytes);

        // Closure so that the input buffer is zeroized and the error logged
        // in exactly one place, whatever the parse outcome.
        let mut parse = || -> Result<PresignRecord> {
            let actual_tag = parser.take_bytes(RECORD_TAG.len())?;
            if actual_tag != RECORD_TAG {
                Err(Error::Deserialization)?
            }

            let point_len = parser.take_len()?;
            let point_bytes = parser.take_bytes(point_len)?;
            let R = CurvePoint::try_from_bytes(point_bytes)?;

            let mask_share_len = parser.take_len()?;
            let mask_share_slice = parser.take_bytes(mask_share_len)?;
            let mut mask_share_bytes: [u8; 32] = mask_share_slice
                .try_into()
                .map_err(|_| Error::Deserialization)?;
            let k: Option<Scalar> = scalar_from_bytes(&mask_share_bytes);
            mask_share_bytes.zeroize();

            let masked_key_share_len = parser.take_len()?;
            let masked_key_share_slice = parser.take_rest()?;
            if masked_key_share_slice.len() != masked_key_share_len {
                Err(Error::Deserialization)?
            }
            let mut masked_key_share_bytes: [u8; 32] = masked_key_share_slice
                .try_into()
                .map_err(|_| Error::Deserialization)?;
            let chi: Option<Scalar> = scalar_from_bytes(&masked_key_share_bytes);
            masked_key_share_bytes.zeroize();

            // Both shares must be canonical field elements.
            match (k, chi) {
                (Some(k), Some(chi)) => Ok(Self { R, k, chi }),
                _ => Err(Error::Deserialization)?,
            }
        };

        let result = parse();

        // The parser still holds a copy of the key material; erase it.
        parser.zeroize();

        if result.is_err() {
            error!(
                "Failed to deserialize a PresignRecord. Expected format:
                {RECORD_TAG:?} | R | k | chi
                where each of the last three fields is prefixed with an
                8-byte little-endian length"
            );
        }
        result
    }
}

fn scalar_from_bytes(bytes: &[u8; 32]) -> Option<Scalar> {
    use k256::elliptic_curve::PrimeField;
    Option::from(Scalar::from_repr(
        generic_array::GenericArray::clone_from_slice(bytes),
    ))
}
