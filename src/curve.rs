// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! secp256k1 point arithmetic and conversions between [`BigNumber`] and the
//! curve's scalar field.

use crate::errors::{Error, Result};
use generic_array::GenericArray;
use k256::{
    ecdsa::VerifyingKey,
    elliptic_curve::{
        bigint::Encoding, group::GroupEncoding, ops::Reduce, point::AffineCoordinates,
        sec1::ToEncodedPoint, Curve, Group, PrimeField,
    },
    AffinePoint, ProjectivePoint, Scalar, U256,
};
use libpaillier::unknown_order::BigNumber;
#[cfg(test)]
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::error;
use zeroize::{Zeroize, Zeroizing};

/// Wrapper around [`k256::ProjectivePoint`] with the serialization and
/// bignum conversions the protocol needs.
///
/// The identity element is the group identity of the underlying
/// representation; there is no sentinel encoding.
///
/// Note that this type derives [`Debug`]; if a [`CurvePoint`] is a field of
/// a private type, `Debug` should be manually implemented there with the
/// field redacted!
#[derive(Eq, PartialEq, Debug, Clone, Copy, Zeroize)]
pub struct CurvePoint(ProjectivePoint);

impl CurvePoint {
    /// The base point of secp256k1.
    pub const GENERATOR: Self = CurvePoint(ProjectivePoint::GENERATOR);

    /// The identity point, used to initialize sums of points.
    pub const IDENTITY: Self = CurvePoint(ProjectivePoint::IDENTITY);

    /// True iff this is the identity point.
    pub fn is_identity(&self) -> bool {
        self.0.is_identity().into()
    }

    /// Multiply `self` by a scalar.
    pub(crate) fn multiply_by_scalar(&self, scalar: &Scalar) -> Self {
        Self(self.0 * scalar)
    }

    /// Multiply `self` by a [`BigNumber`], which is first reduced into the
    /// scalar field (negative values negate the point).
    ///
    /// Note: this clones the value in the process of converting it, which
    /// may be a concern if it contains private data.
    pub(crate) fn multiply_by_bignum(&self, scalar: &BigNumber) -> Result<Self> {
        let s = Zeroizing::new(bn_to_scalar(scalar)?);
        Ok(self.multiply_by_scalar(&s))
    }

    /// Multiply the base point by a [`BigNumber`].
    pub(crate) fn scale_generator(scalar: &BigNumber) -> Result<Self> {
        Self::GENERATOR.multiply_by_bignum(scalar)
    }

    /// The x-coordinate of the point, reduced into the scalar field. This is
    /// the `r` computation of ECDSA.
    pub(crate) fn x_projection(&self) -> Result<Scalar> {
        if self.is_identity() {
            error!("Attempted to take the x-projection of the identity point");
            return Err(Error::InternalInvariantFailed);
        }
        let x_bytes = self.0.to_affine().x();
        Ok(<Scalar as Reduce<U256>>::reduce_bytes(&x_bytes))
    }

    /// Serialize as a compressed SEC1 byte array (33 bytes).
    pub(crate) fn to_bytes(self) -> Vec<u8> {
        let mut bytes = self.0.to_affine().to_bytes();
        let out = bytes.to_vec();
        bytes.zeroize();
        out
    }

    /// Deserialize from a compressed SEC1 byte array.
    pub(crate) fn try_from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut fixed: [u8; 33] = bytes.try_into().map_err(|_| {
            error!("Failed to decode bytes as a curve point");
            Error::Deserialization
        })?;
        let point: Option<AffinePoint> = AffinePoint::from_bytes(&fixed.into()).into();
        fixed.zeroize();
        match point {
            Some(point) => Ok(Self(point.into())),
            None => {
                error!("Failed to decode bytes as a curve point");
                Err(Error::Deserialization)
            }
        }
    }

    /// Serialize as an uncompressed SEC1 public key: `0x04 ‖ X ‖ Y`, 65
    /// bytes with both coordinates zero-padded to 32 bytes.
    pub fn to_sec1_uncompressed(&self) -> Vec<u8> {
        self.0.to_affine().to_encoded_point(false).as_bytes().to_vec()
    }

    /// Interpret the point as an ECDSA verifying key.
    pub fn to_verifying_key(&self) -> Result<VerifyingKey> {
        VerifyingKey::from_sec1_bytes(&self.to_sec1_uncompressed()).map_err(|_| {
            error!("Curve point is not a valid verifying key");
            Error::InternalInvariantFailed
        })
    }

    /// A uniformly random point, for tests and simulation.
    #[cfg(test)]
    pub(crate) fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self(ProjectivePoint::random(rng))
    }
}

impl std::ops::Add for CurvePoint {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AsRef<CurvePoint> for CurvePoint {
    fn as_ref(&self) -> &CurvePoint {
        self
    }
}

impl From<ProjectivePoint> for CurvePoint {
    fn from(p: ProjectivePoint) -> Self {
        Self(p)
    }
}

impl Serialize for CurvePoint {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        AffinePoint::from(self.0).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CurvePoint {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let p = AffinePoint::deserialize(deserializer)?;
        Ok(Self(p.into()))
    }
}

/// The order `q` of the secp256k1 group as a [`BigNumber`].
pub(crate) fn k256_order() -> BigNumber {
    let order_bytes: [u8; 32] = k256::Secp256k1::ORDER.to_be_bytes();
    BigNumber::from_slice(order_bytes)
}

/// Reduce a [`BigNumber`] into the scalar field, preserving sign: a negative
/// input maps to the negation of its magnitude's residue.
pub(crate) fn bn_to_scalar(x: &BigNumber) -> Result<Scalar> {
    let order = k256_order();
    let x_modded = x % order;

    let bytes = Zeroizing::new(x_modded.to_bytes());
    let mut padded = Zeroizing::new(vec![0u8; 32 - bytes.len()]);
    padded.extend_from_slice(&bytes);

    let mut scalar: Scalar = Option::from(<Scalar as PrimeField>::from_repr(
        GenericArray::clone_from_slice(&padded),
    ))
    .ok_or_else(|| {
        error!("Failed to convert BigNumber into k256::Scalar");
        Error::InternalInvariantFailed
    })?;

    // `%` truncates toward zero, so the residue of a negative input keeps
    // its sign; fold it back into [0, q).
    if x < &BigNumber::zero() {
        scalar = scalar.negate();
    }
    Ok(scalar)
}

/// Convert a scalar to a (non-negative) [`BigNumber`].
pub(crate) fn scalar_to_bn(x: &Scalar) -> BigNumber {
    BigNumber::from_slice(x.to_repr())
}

/// Interpret a 32-byte message digest as a scalar, reducing the big-endian
/// value mod `q`. This matches the `bits2int` step of ECDSA as implemented
/// by the k256 verifier.
pub(crate) fn scalar_from_digest(digest: &[u8; 32]) -> Scalar {
    <Scalar as Reduce<U256>>::reduce_bytes(GenericArray::from_slice(digest))
}
