// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::{
    curve::{bn_to_scalar, k256_order, CurvePoint},
    errors::{Error, Result},
    parameters::ELL_PRIME,
    presign::{
        input::Input,
        record::{PresignRecord, RecordPair},
        round_one, round_three, round_two,
    },
    protocol::{ParticipantConfig, ParticipantIdentifier, SharedContext},
    utils::{random_plusminus_by_size, random_positive_bn},
    zkp::{piaffg, pienc, pilog, Proof},
};
use rand::{CryptoRng, RngCore};
use std::collections::HashMap;
use tracing::{error, info};

/// One signer's view of a presign session.
///
/// The participant is a straight-line state machine: [`round_one`] →
/// [`round_two`] → [`round_three`] → [`finalize`], each consuming the state
/// of the previous round and the other signers' outputs for it. Calling a
/// round out of order fails with [`Error::BadInput`] and leaves the state
/// unchanged. Abandoning a participant at any point zeroizes the
/// accumulated secrets on drop; partial progress never carries over into
/// another session.
///
/// [`round_one`]: Self::round_one
/// [`round_two`]: Self::round_two
/// [`round_three`]: Self::round_three
/// [`finalize`]: Self::finalize
#[derive(Debug)]
pub struct PresignParticipant {
    config: ParticipantConfig,
    input: Input,
    context: SharedContext,
    state: State,
}

#[derive(Debug)]
enum State {
    Init,
    RoundOneDone {
        r1_private: round_one::Private,
    },
    RoundTwoDone {
        r1_private: round_one::Private,
        r1_broadcasts: HashMap<ParticipantIdentifier, round_one::PublicBroadcast>,
        r2_privates: HashMap<ParticipantIdentifier, round_two::Private>,
        Gamma: CurvePoint,
    },
    RoundThreeDone {
        r3_private: round_three::Private,
        r1_broadcasts: HashMap<ParticipantIdentifier, round_one::PublicBroadcast>,
    },
    Complete,
}

impl PresignParticipant {
    /// Create a participant for the signer `config.id()` from its
    /// Lagrange-scaled [`Input`].
    pub fn new(config: ParticipantConfig, input: Input) -> Result<Self> {
        // The config and the input must describe the same signer set.
        if config.count() != input.public_key_shares().len() {
            error!("Signer config and presign input disagree on the quorum size");
            return Err(Error::BadInput);
        }
        for pid in config.all_participants() {
            let _ = input.public_key_share(pid)?;
            let _ = input.find_auxinfo_public(pid)?;
        }

        let context = SharedContext::new(
            input.sid(),
            config.all_participants(),
            input.threshold(),
        );
        Ok(Self {
            config,
            input,
            context,
            state: State::Init,
        })
    }

    /// This signer's identifier.
    pub fn id(&self) -> ParticipantIdentifier {
        self.config.id()
    }

    /// The other signers' identifiers.
    pub fn other_ids(&self) -> &[ParticipantIdentifier] {
        self.config.other_ids()
    }

    /// Run round one: sample the nonce and mask shares, encrypt them, and
    /// produce a range proof on `K` for every peer.
    ///
    /// Returns the broadcast `(K, G)` plus the per-receiver proof map.
    pub fn round_one<R: RngCore + CryptoRng>(
        &mut self,
        rng: &mut R,
    ) -> Result<(
        round_one::PublicBroadcast,
        HashMap<ParticipantIdentifier, round_one::Public>,
    )> {
        if !matches!(self.state, State::Init) {
            error!("Presign round one called out of order");
            return Err(Error::BadInput);
        }
        info!("Presign round one for participant {}", self.id());

        let order = k256_order();
        let k = random_positive_bn(rng, &order);
        let gamma = random_positive_bn(rng, &order);

        let own_pk = self.input.find_auxinfo_public(self.id())?.pk();
        let (K, rho) = own_pk.encrypt(rng, &k)?;
        let (G, nu) = own_pk.encrypt(rng, &gamma)?;

        let broadcast = round_one::PublicBroadcast {
            K: K.clone(),
            G: G.clone(),
        };

        let mut publics = HashMap::new();
        for peer in self.config.other_ids() {
            let peer_aux = self.input.find_auxinfo_public(*peer)?;
            let proof = pienc::PiEncProof::prove(
                pienc::CommonInput::new(&K, own_pk, peer_aux.params()),
                pienc::ProverSecret::new(&k, &rho),
                &self.context,
                &mut round_two::transcripts::pienc(),
                rng,
            )?;
            publics.insert(*peer, round_one::Public { proof });
        }

        self.state = State::RoundOneDone {
            r1_private: round_one::Private {
                k,
                rho,
                gamma,
                nu,
                G,
                K,
            },
        };
        Ok((broadcast, publics))
    }

    /// Run round two: verify the peers' round-one range proofs, then
    /// produce the affine transformations of each peer's encrypted nonce
    /// share together with their proofs.
    ///
    /// `r1_broadcasts` holds every peer's broadcast; `r1_proofs` holds, for
    /// each peer, the range proof that peer addressed to us.
    pub fn round_two<R: RngCore + CryptoRng>(
        &mut self,
        rng: &mut R,
        r1_broadcasts: &HashMap<ParticipantIdentifier, round_one::PublicBroadcast>,
        r1_proofs: &HashMap<ParticipantIdentifier, round_one::Public>,
    ) -> Result<HashMap<ParticipantIdentifier, round_two::Public>> {
        let r1_private = match std::mem::replace(&mut self.state, State::Init) {
            State::RoundOneDone { r1_private } => r1_private,
            state => {
                self.state = state;
                error!("Presign round two called out of order");
                return Err(Error::BadInput);
            }
        };
        info!("Presign round two for participant {}", self.id());

        let own_aux = self.input.find_auxinfo_public(self.id())?;

        // Reject any peer whose nonce-share ciphertext fails its range
        // proof.
        for peer in self.config.other_ids() {
            let broadcast = Self::message_from(r1_broadcasts, *peer)?;
            let proof = Self::message_from(r1_proofs, *peer)?;
            let peer_aux = self.input.find_auxinfo_public(*peer)?;
            round_two::verify_round_one_proof(
                &self.context,
                *peer,
                own_aux,
                peer_aux,
                proof.proof.clone(),
                broadcast,
            )?;
        }

        let Gamma = CurvePoint::scale_generator(&r1_private.gamma)?;
        let own_pk = own_aux.pk();
        let x = self.input.private_key_share();
        let own_share_point = *self.input.public_key_share(self.id())?.as_ref();

        let mut r2_privates = HashMap::new();
        let mut publics = HashMap::new();
        for peer in self.config.other_ids() {
            let peer_aux = self.input.find_auxinfo_public(*peer)?;
            let peer_pk = peer_aux.pk();
            let peer_K = &Self::message_from(r1_broadcasts, *peer)?.K;

            // Blinding addends. The ciphertexts carry their negations; the
            // originals stay local and cancel in round three.
            let beta = random_plusminus_by_size(rng, ELL_PRIME);
            let beta_hat = random_plusminus_by_size(rng, ELL_PRIME);
            let neg_beta = -&beta;
            let neg_beta_hat = -&beta_hat;

            // D = K_j^γ · Enc_j(-β), F = Enc_i(-β).
            let (beta_ciphertext, s) = peer_pk.encrypt(rng, &neg_beta)?;
            let D = peer_pk.multiply_and_add(&r1_private.gamma, peer_K, &beta_ciphertext);
            let (F, r) = own_pk.encrypt(rng, &neg_beta)?;

            // D̂ = K_j^x · Enc_j(-β̂), F̂ = Enc_i(-β̂).
            let (beta_hat_ciphertext, s_hat) = peer_pk.encrypt(rng, &neg_beta_hat)?;
            let D_hat = peer_pk.multiply_and_add(x.as_ref(), peer_K, &beta_hat_ciphertext);
            let (F_hat, r_hat) = own_pk.encrypt(rng, &neg_beta_hat)?;

            let psi = piaffg::PiAffgProof::prove(
                piaffg::CommonInput::new(
                    &Gamma,
                    peer_K,
                    &D,
                    &F,
                    peer_pk,
                    own_pk,
                    peer_aux.params(),
                ),
                piaffg::ProverSecret::new(&r1_private.gamma, &neg_beta, &s, &r),
                &self.context,
                &mut round_two::transcripts::psi(),
                rng,
            )?;
            let psi_hat = piaffg::PiAffgProof::prove(
                piaffg::CommonInput::new(
                    &own_share_point,
                    peer_K,
                    &D_hat,
                    &F_hat,
                    peer_pk,
                    own_pk,
                    peer_aux.params(),
                ),
                piaffg::ProverSecret::new(x.as_ref(), &neg_beta_hat, &s_hat, &r_hat),
                &self.context,
                &mut round_two::transcripts::psi_hat(),
                rng,
            )?;
            let psi_prime = pilog::PiLogProof::prove(
                pilog::CommonInput::new(
                    &r1_private.G,
                    &Gamma,
                    peer_aux.params(),
                    own_pk,
                    &CurvePoint::GENERATOR,
                ),
                pilog::ProverSecret::new(&r1_private.gamma, &r1_private.nu),
                &self.context,
                &mut round_two::transcripts::psi_prime(),
                rng,
            )?;

            r2_privates.insert(*peer, round_two::Private { beta, beta_hat });
            publics.insert(
                *peer,
                round_two::Public {
                    Gamma,
                    D,
                    F,
                    D_hat,
                    F_hat,
                    psi,
                    psi_hat,
                    psi_prime,
                },
            );
        }

        self.state = State::RoundTwoDone {
            r1_private,
            r1_broadcasts: r1_broadcasts.clone(),
            r2_privates,
            Gamma,
        };
        Ok(publics)
    }

    /// Run round three: verify the peers' round-two proofs, decrypt the
    /// transformed ciphertexts addressed to us, and combine everything into
    /// our `δᵢ`, `χᵢ`, `Γ`, and `Δᵢ` with a consistency proof for each
    /// peer.
    pub fn round_three<R: RngCore + CryptoRng>(
        &mut self,
        rng: &mut R,
        r2_publics: &HashMap<ParticipantIdentifier, round_two::Public>,
    ) -> Result<HashMap<ParticipantIdentifier, round_three::Public>> {
        let (r1_private, r1_broadcasts, r2_privates, own_Gamma) =
            match std::mem::replace(&mut self.state, State::Init) {
                State::RoundTwoDone {
                    r1_private,
                    r1_broadcasts,
                    r2_privates,
                    Gamma,
                } => (r1_private, r1_broadcasts, r2_privates, Gamma),
                state => {
                    self.state = state;
                    error!("Presign round three called out of order");
                    return Err(Error::BadInput);
                }
            };
        info!("Presign round three for participant {}", self.id());

        let own_aux = self.input.find_auxinfo_public(self.id())?;
        let dk = self.input.decryption_key();

        // Integer accumulators; reduction into the scalar field happens
        // once, after the telescoping sums are assembled.
        let mut delta_sum = &r1_private.gamma * &r1_private.k;
        let mut chi_sum = self.input.private_key_share().as_ref() * &r1_private.k;
        let mut Gamma = own_Gamma;

        for peer in self.config.other_ids() {
            let public = Self::message_from(r2_publics, *peer)?;
            let peer_aux = self.input.find_auxinfo_public(*peer)?;
            let peer_share_point = self.input.public_key_share(*peer)?.as_ref();
            let peer_broadcast = Self::message_from(&r1_broadcasts, *peer)?;

            public.verify(
                &self.context,
                *peer,
                own_aux,
                peer_aux,
                &r1_private.K,
                peer_share_point,
                peer_broadcast,
            )?;

            // α = γ_j·kᵢ - β_{j,i} and α̂ = x_j·kᵢ - β̂_{j,i}; adding our own
            // β_{i,j}, β̂_{i,j} makes the cross terms cancel over the sum of
            // all signers.
            let alpha = dk.decrypt(&public.D)?;
            let alpha_hat = dk.decrypt(&public.D_hat)?;
            let private = r2_privates.get(peer).ok_or_else(|| {
                error!("Missing round-two private state for peer {peer}");
                Error::InternalInvariantFailed
            })?;

            delta_sum = delta_sum + alpha + &private.beta;
            chi_sum = chi_sum + alpha_hat + &private.beta_hat;
            Gamma = Gamma + public.Gamma;
        }

        let Delta = Gamma.multiply_by_bignum(&r1_private.k)?;
        let delta = bn_to_scalar(&delta_sum)?;
        let chi = bn_to_scalar(&chi_sum)?;

        let mut publics = HashMap::new();
        for peer in self.config.other_ids() {
            let peer_aux = self.input.find_auxinfo_public(*peer)?;
            let psi_double_prime = pilog::PiLogProof::prove(
                pilog::CommonInput::new(
                    &r1_private.K,
                    &Delta,
                    peer_aux.params(),
                    own_aux.pk(),
                    &Gamma,
                ),
                pilog::ProverSecret::new(&r1_private.k, &r1_private.rho),
                &self.context,
                &mut round_three::transcript(),
                rng,
            )?;
            publics.insert(
                *peer,
                round_three::Public {
                    delta,
                    Delta,
                    psi_double_prime,
                    Gamma,
                },
            );
        }

        self.state = State::RoundThreeDone {
            r3_private: round_three::Private {
                k: r1_private.k.clone(),
                chi,
                Gamma,
                delta,
                Delta,
            },
            r1_broadcasts,
        };
        Ok(publics)
    }

    /// Finalize the presign session: verify the peers' round-three proofs,
    /// check the global consistency identity `δ·G = Δ`, and produce the
    /// [`PresignRecord`].
    pub fn finalize(
        &mut self,
        r3_publics: &HashMap<ParticipantIdentifier, round_three::Public>,
    ) -> Result<PresignRecord> {
        let (r3_private, r1_broadcasts) =
            match std::mem::replace(&mut self.state, State::Complete) {
                State::RoundThreeDone {
                    r3_private,
                    r1_broadcasts,
                } => (r3_private, r1_broadcasts),
                state => {
                    self.state = state;
                    error!("Presign finalize called out of order");
                    return Err(Error::BadInput);
                }
            };
        info!("Presign finalize for participant {}", self.id());

        let own_aux = self.input.find_auxinfo_public(self.id())?;
        for peer in self.config.other_ids() {
            let public = Self::message_from(r3_publics, *peer)?;
            let peer_aux = self.input.find_auxinfo_public(*peer)?;
            let peer_broadcast = Self::message_from(&r1_broadcasts, *peer)?;
            public.verify(&self.context, *peer, own_aux, peer_aux, &peer_broadcast.K)?;
        }

        PresignRecord::try_from(RecordPair {
            private: r3_private,
            publics: self
                .config
                .other_ids()
                .iter()
                .map(|peer| Self::message_from(r3_publics, *peer).cloned())
                .collect::<Result<Vec<_>>>()?,
        })
    }

    fn message_from<'a, T>(
        messages: &'a HashMap<ParticipantIdentifier, T>,
        peer: ParticipantIdentifier,
    ) -> Result<&'a T> {
        messages.get(&peer).ok_or_else(|| {
            error!("Missing a message from participant {peer}");
            Error::BadInput
        })
    }
}
