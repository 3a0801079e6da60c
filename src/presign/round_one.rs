// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::{
    paillier::{Ciphertext, Nonce},
    zkp::pienc::PiEncProof,
};
use libpaillier::unknown_order::BigNumber;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use zeroize::ZeroizeOnDrop;

/// State retained by a signer after round one: the sampled shares and the
/// encryption nonces needed to prove statements about `K` and `G` in later
/// rounds.
#[derive(Clone, ZeroizeOnDrop)]
pub(crate) struct Private {
    /// Nonce share `kᵢ`.
    pub k: BigNumber,
    /// Encryption randomness of `K`.
    pub rho: Nonce,
    /// Mask share `γᵢ`.
    pub gamma: BigNumber,
    /// Encryption randomness of `G`.
    pub nu: Nonce,
    /// `Enc(γᵢ)` under our own key.
    #[zeroize(skip)]
    pub G: Ciphertext,
    /// `Enc(kᵢ)` under our own key.
    #[zeroize(skip)]
    pub K: Ciphertext,
}

impl Debug for Private {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("presign::round_one::Private")
            .field("k", &"[redacted]")
            .field("rho", &"[redacted]")
            .field("gamma", &"[redacted]")
            .field("nu", &"[redacted]")
            .field("G", &self.G)
            .field("K", &self.K)
            .finish()
    }
}

/// Round-one output addressed to a single peer: the range proof on `K`
/// built against that peer's commitment parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Public {
    pub proof: PiEncProof,
}

/// Round-one output broadcast to all peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PublicBroadcast {
    /// `Enc(kᵢ)` under the sender's key.
    pub K: Ciphertext,
    /// `Enc(γᵢ)` under the sender's key.
    pub G: Ciphertext,
}
