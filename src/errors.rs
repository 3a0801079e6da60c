// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Error types surfaced by the protocol.
//!
//! Every failure has a named kind; there is no exception-style control flow.
//! Proof failures are fatal to the session — the caller must abort and may
//! use the embedded participant identifier to accuse the deviating peer.

use crate::{protocol::ParticipantIdentifier, zkp::ProofKind};
use std::fmt;

/// The default result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The presign round in which a faulty message was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Round {
    /// Round one: nonce encryption and range proofs.
    One,
    /// Round two: affine transformations and consistency proofs.
    Two,
    /// Round three: share combination and the final log proof.
    Three,
}

/// Errors produced by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A Paillier ciphertext was not coprime to `N²`. The peer that produced
    /// it must be rejected.
    InvalidCiphertext,

    /// A check inside a zero-knowledge proof verification did not hold.
    ///
    /// The protocol layer converts this into [`Error::ProofInvalid`], which
    /// carries the identity of the deviating peer.
    ProofRejected,

    /// A zero-knowledge proof failed to verify. The session must be aborted.
    ProofInvalid {
        /// The round in which the faulty proof was produced.
        round: Round,
        /// The participant whose proof failed.
        from: ParticipantIdentifier,
        /// Which of the three proofs failed.
        kind: ProofKind,
    },

    /// A candidate Paillier prime failed the length, Blum, or safe-prime
    /// check.
    PrimeInvalid,

    /// The combined presign values were inconsistent (`δ·G ≠ Δ`); some
    /// participant deviated from the protocol.
    PresignInconsistent,

    /// The aggregated signature failed secp256k1 verification; some
    /// participant contributed a bad signature share.
    SignatureInvalid,

    /// A value fell outside its required range (e.g. a Paillier plaintext
    /// larger than `(N-1)/2`). This indicates a programming error in the
    /// calling application.
    OutOfRange,

    /// A rejection sampler failed to produce a valid value after the maximum
    /// number of iterations. This happens with negligible probability with a
    /// functioning random number generator.
    SampleExhausted,

    /// The calling application passed invalid input to a protocol entry
    /// point.
    BadInput,

    /// A value could not be serialized with the crate's wire encoding.
    Serialization,

    /// Bytes could not be deserialized into the expected type.
    Deserialization,

    /// An invariant internal to the crate was violated; this is a bug.
    InternalInvariantFailed,
}

impl Error {
    /// Attach protocol attribution to a failure that arose while checking a
    /// peer's proof. [`Error::InvalidCiphertext`] keeps its identity (the
    /// recovery differs); everything else becomes
    /// [`Error::ProofInvalid`].
    pub(crate) fn attribute(
        self,
        round: Round,
        from: ParticipantIdentifier,
        kind: ProofKind,
    ) -> Error {
        match self {
            Error::InvalidCiphertext => self,
            _ => Error::ProofInvalid { round, from, kind },
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidCiphertext => {
                write!(f, "ciphertext is not in the multiplicative group mod N^2")
            }
            Error::ProofRejected => write!(f, "zero-knowledge proof verification failed"),
            Error::ProofInvalid { round, from, kind } => write!(
                f,
                "{kind:?} proof from participant {from} produced in round {round:?} failed to verify"
            ),
            Error::PrimeInvalid => {
                write!(f, "prime failed the length, Blum, or safe-prime check")
            }
            Error::PresignInconsistent => {
                write!(f, "presign consistency check failed: δ·G ≠ Δ")
            }
            Error::SignatureInvalid => {
                write!(f, "combined signature failed secp256k1 verification")
            }
            Error::OutOfRange => write!(f, "value out of range"),
            Error::SampleExhausted => {
                write!(f, "rejection sampler exceeded its iteration budget")
            }
            Error::BadInput => write!(f, "invalid input from the calling application"),
            Error::Serialization => write!(f, "serialization failed"),
            Error::Deserialization => write!(f, "deserialization failed"),
            Error::InternalInvariantFailed => {
                write!(f, "internal invariant violated (this is a bug)")
            }
        }
    }
}

impl std::error::Error for Error {}
