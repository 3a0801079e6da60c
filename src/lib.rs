// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! A threshold ECDSA signing library for secp256k1, following the protocol of
//! Canetti et al.[^cite]
//!
//! A group of `n` parties holds Shamir shares of an ECDSA signing key; any
//! `t+1` of them can cooperate to produce a standard secp256k1 signature,
//! while no coalition of `t` or fewer learns anything about the key.
//!
//! The protocol has three phases:
//!
//! 1. **Key generation** ([`keygen`], [`auxinfo`]): a one-time setup that
//!    produces each party's secret key share plus auxiliary material — a
//!    Paillier keypair and ring-Pedersen commitment parameters. This crate
//!    provides the centralized trusted-dealer variant.
//!
//! 2. **Presigning** ([`presign`]): a three-round, per-message offline phase
//!    in which the chosen signers jointly compute a nonce commitment `R`
//!    without knowing the message. Malicious security comes from three
//!    Fiat–Shamir-compiled zero-knowledge proofs ([`zkp::pienc`],
//!    [`zkp::piaffg`], [`zkp::pilog`]) exchanged and verified every round.
//!
//! 3. **Signing** ([`sign`]): each signer produces a partial signature from
//!    its [`PresignRecord`] and the message digest; the shares sum to a
//!    complete, low-`s` ECDSA signature that verifies under the group public
//!    key.
//!
//! Message transport is out of scope: the caller (or the round-synchronous
//! [`session`] orchestrator, which is also the reference for wiring the
//! rounds) delivers each party's round outputs to every other party.
//!
//! [^cite]: Ran Canetti, Rosario Gennaro, Steven Goldfeder, Nikolaos
//! Makriyannis, and Udi Peled. UC Non-Interactive, Proactive, Threshold ECDSA
//! with Identifiable Aborts. [EPrint archive,
//! 2021](https://eprint.iacr.org/archive/2021/060/1634824619.pdf).

#![allow(non_snake_case)] // Protocol variables use the paper's capitalization.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

/// Serialize a value with the crate-wide wire encoding.
macro_rules! serialize {
    ($x:expr) => {{
        bincode::serialize($x).or(Err(crate::errors::Error::Serialization))
    }};
}

/// Deserialize a value with the crate-wide wire encoding.
macro_rules! deserialize {
    ($x:expr) => {{
        bincode::deserialize($x).or(Err(crate::errors::Error::Deserialization))
    }};
}

pub mod auxinfo;
mod curve;
pub mod errors;
pub mod keygen;
mod paillier;
mod parameters;
pub mod presign;
mod protocol;
mod ring_pedersen;
pub mod session;
pub mod sign;
mod threshold;
mod utils;
pub mod zkp;

pub use curve::CurvePoint;
pub use presign::{PresignParticipant, PresignRecord};
pub use protocol::{Identifier, ParticipantConfig, ParticipantIdentifier, SharedContext};
pub use sign::SignatureShare;
