// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Paillier encryption over a modulus built from two safe Blum primes.
//!
//! Plaintexts live in the symmetric range `[-(N-1)/2, (N-1)/2]`; decryption
//! returns the representative in that range, so homomorphically-computed
//! negative values come back negative. The scheme is additively homomorphic:
//! multiplying ciphertexts adds plaintexts, and raising a ciphertext to a
//! power multiplies its plaintext by that power.

use crate::{
    errors::{Error, Result},
    parameters::{MODULUS_BITS, PRIME_BITS},
    utils::{modpow, random_bn_in_z_star},
};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A Paillier ciphertext: an element of `Z_{N²}^*`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Ciphertext(BigNumber);

impl Ciphertext {
    /// The ciphertext as a raw integer. Tests use this to play the
    /// adversary; every ciphertext entering a decryption or proof
    /// verification is range- and coprimality-checked there.
    #[cfg(test)]
    pub(crate) fn as_bn(&self) -> &BigNumber {
        &self.0
    }

    /// Build a ciphertext from a raw integer without any validation.
    #[cfg(test)]
    pub(crate) fn from_bn(bn: BigNumber) -> Self {
        Self(bn)
    }
}

/// The encryption randomness of a Paillier ciphertext. Secret: together with
/// the ciphertext it reveals the plaintext.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct Nonce(BigNumber);

impl Debug for Nonce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Nonce([redacted])")
    }
}

/// A nonce masked with a challenge power of another nonce: `r·ρ^e mod N`.
/// These appear as responses in zero-knowledge proofs and are safe to
/// publish.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct MaskedNonce(BigNumber);

impl MaskedNonce {
    /// Compute `r·ρ^e mod n`.
    pub(crate) fn mask(r: &Nonce, rho: &Nonce, e: &BigNumber, n: &BigNumber) -> Self {
        Self(modpow(&rho.0, e, n).modmul(&r.0, n))
    }

    #[cfg(test)]
    pub(crate) fn random<R: RngCore + CryptoRng>(rng: &mut R, n: &BigNumber) -> Self {
        Self(BigNumber::from_rng(n, rng))
    }
}

/// A public Paillier encryption key with modulus `N = p·q`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct EncryptionKey {
    n: BigNumber,
}

impl EncryptionKey {
    /// The public modulus `N`.
    pub(crate) fn modulus(&self) -> &BigNumber {
        &self.n
    }

    fn modulus_squared(&self) -> BigNumber {
        &self.n * &self.n
    }

    /// Largest plaintext magnitude the scheme accepts: `(N-1)/2`.
    fn plaintext_bound(&self) -> BigNumber {
        (&self.n - 1) / BigNumber::from(2u64)
    }

    /// Encrypt `m` with fresh randomness, returning the ciphertext and the
    /// nonce used. Fails with [`Error::OutOfRange`] if `|m| > (N-1)/2`.
    pub(crate) fn encrypt<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        m: &BigNumber,
    ) -> Result<(Ciphertext, Nonce)> {
        let bound = self.plaintext_bound();
        if m > &bound || m < &-bound {
            error!("Tried to encrypt a plaintext outside ±(N-1)/2");
            return Err(Error::OutOfRange);
        }
        let nonce = Nonce(random_bn_in_z_star(rng, &self.n)?);
        let nn = self.modulus_squared();
        let c = self.raw_encrypt(m, &nonce.0, &nn);
        Ok((Ciphertext(c), nonce))
    }

    /// Encrypt `m` under the given (masked) nonce. Used by proof
    /// verification to re-derive the prover's ciphertext equations; no
    /// plaintext range check is applied because the inputs were already
    /// range-checked by the caller.
    pub(crate) fn encrypt_with_nonce(&self, m: &BigNumber, nonce: &MaskedNonce) -> Ciphertext {
        let nn = self.modulus_squared();
        Ciphertext(self.raw_encrypt(m, &nonce.0, &nn))
    }

    /// `(N+1)^m · ρ^N mod N²`.
    fn raw_encrypt(&self, m: &BigNumber, rho: &BigNumber, nn: &BigNumber) -> BigNumber {
        let base = &self.n + 1;
        modpow(&base, m, nn).modmul(&modpow(rho, &self.n, nn), nn)
    }

    /// Homomorphic addition: the result decrypts to the sum of the two
    /// plaintexts.
    pub(crate) fn add(&self, c1: &Ciphertext, c2: &Ciphertext) -> Ciphertext {
        let nn = self.modulus_squared();
        Ciphertext(c1.0.modmul(&c2.0, &nn))
    }

    /// Homomorphic scalar multiplication: the result decrypts to `k` times
    /// the plaintext of `c`.
    pub(crate) fn multiply(&self, c: &Ciphertext, k: &BigNumber) -> Ciphertext {
        let nn = self.modulus_squared();
        Ciphertext(modpow(&c.0, k, &nn))
    }

    /// The affine transformation of presigning: `c1^a · c2 mod N²`, which
    /// decrypts to `a·m1 + m2`.
    pub(crate) fn multiply_and_add(
        &self,
        a: &BigNumber,
        c1: &Ciphertext,
        c2: &Ciphertext,
    ) -> Ciphertext {
        let nn = self.modulus_squared();
        Ciphertext(modpow(&c1.0, a, &nn).modmul(&c2.0, &nn))
    }

    /// Check that a ciphertext received from the network is an element of
    /// `Z_{N²}^*`; everything else is rejected before any algebra touches
    /// it.
    pub(crate) fn validate(&self, c: &Ciphertext) -> Result<()> {
        let nn = self.modulus_squared();
        if c.0 <= BigNumber::zero() || c.0 >= nn || c.0.gcd(&nn) != BigNumber::one() {
            error!("Ciphertext is not in the multiplicative group mod N^2");
            return Err(Error::InvalidCiphertext);
        }
        Ok(())
    }
}

/// A Paillier decryption key: the primes `p, q` and the precomputed totient
/// material for `N = p·q`.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DecryptionKey {
    p: BigNumber,
    q: BigNumber,
    totient: BigNumber,
    totient_inv: BigNumber,
    #[zeroize(skip)]
    pk: EncryptionKey,
}

impl Debug for DecryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptionKey")
            .field("p", &"[redacted]")
            .field("q", &"[redacted]")
            .field("pk", &self.pk)
            .finish()
    }
}

impl DecryptionKey {
    /// Form a keypair from two safe Blum primes.
    ///
    /// Fails with [`Error::PrimeInvalid`] unless both primes are distinct
    /// 1024-bit safe Blum primes whose product is exactly 2048 bits.
    pub fn from_primes(p: &BigNumber, q: &BigNumber) -> Result<Self> {
        prime_gen::validate_blum_safe_prime(p)?;
        prime_gen::validate_blum_safe_prime(q)?;
        if p == q {
            error!("Paillier primes must be distinct");
            return Err(Error::PrimeInvalid);
        }
        let n = p * q;
        if n.bit_length() != MODULUS_BITS {
            error!(
                "Paillier modulus must be exactly {MODULUS_BITS} bits, got {}",
                n.bit_length()
            );
            return Err(Error::PrimeInvalid);
        }

        let totient = (p - 1u32) * (q - 1u32);
        let totient_inv = totient.invert(&n).ok_or_else(|| {
            // gcd(φ(N), N) > 1 requires p | q-1 or q | p-1, impossible for
            // equal-size primes.
            error!("Paillier totient is not invertible mod N");
            Error::PrimeInvalid
        })?;

        Ok(Self {
            p: p.clone(),
            q: q.clone(),
            totient,
            totient_inv,
            pk: EncryptionKey { n },
        })
    }

    /// Generate a fresh keypair by sampling two safe Blum primes.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let (p, q) = prime_gen::get_random_safe_prime_pair(rng)?;
        Self::from_primes(&p, &q)
    }

    /// The public half of the keypair.
    pub fn encryption_key(&self) -> &EncryptionKey {
        &self.pk
    }

    /// The primes `(p, q)`.
    #[cfg(test)]
    pub(crate) fn primes(&self) -> (&BigNumber, &BigNumber) {
        (&self.p, &self.q)
    }

    /// Euler's totient `φ(N)`.
    pub(crate) fn totient(&self) -> &BigNumber {
        &self.totient
    }

    /// Decrypt a ciphertext to its plaintext in `[-(N-1)/2, (N-1)/2]`.
    ///
    /// Fails with [`Error::InvalidCiphertext`] if the ciphertext is not in
    /// `Z_{N²}^*`.
    pub(crate) fn decrypt(&self, c: &Ciphertext) -> Result<BigNumber> {
        self.pk.validate(c)?;
        let n = self.pk.modulus();
        let nn = self.pk.modulus_squared();

        // m = L(c^φ mod N²)·φ⁻¹ mod N, with L(u) = (u-1)/N.
        let u = modpow(&c.0, &self.totient, &nn);
        let ell = (u - 1u32) / n;
        let m = ell.modmul(&self.totient_inv, n);

        // Map [0, N) onto the symmetric range.
        let half = self.pk.plaintext_bound();
        if m > half {
            Ok(m - n)
        } else {
            Ok(m)
        }
    }
}

pub(crate) mod prime_gen {
    //! Safe Blum prime sampling and validation.
    //!
    //! Production key generation samples fresh safe primes, which takes tens
    //! of seconds per prime. Tests draw from a fixed pool of real safe
    //! primes instead; the pool is public, so pool-based keys protect
    //! nothing.

    use super::*;
    use rand::Rng;

    /// Check that `candidate` is a 1024-bit safe Blum prime: prime,
    /// `≡ 3 (mod 4)`, with `(candidate-1)/2` also prime.
    pub(crate) fn validate_blum_safe_prime(candidate: &BigNumber) -> Result<()> {
        if candidate.bit_length() != PRIME_BITS {
            error!(
                "Paillier prime must be exactly {PRIME_BITS} bits, got {}",
                candidate.bit_length()
            );
            return Err(Error::PrimeInvalid);
        }
        if candidate % BigNumber::from(4u64) != BigNumber::from(3u64) {
            error!("Paillier prime is not a Blum prime");
            return Err(Error::PrimeInvalid);
        }
        if !candidate.is_prime() {
            error!("Paillier prime candidate is composite");
            return Err(Error::PrimeInvalid);
        }
        let half: BigNumber = (candidate - 1) / BigNumber::from(2u64);
        if !half.is_prime() {
            error!("Paillier prime is not a safe prime");
            return Err(Error::PrimeInvalid);
        }
        Ok(())
    }

    /// Sample a pair of distinct safe Blum primes. Slow.
    pub(crate) fn get_random_safe_prime_pair<R: RngCore + CryptoRng>(
        rng: &mut R,
    ) -> Result<(BigNumber, BigNumber)> {
        let p = BigNumber::safe_prime_from_rng(PRIME_BITS, rng);
        validate_blum_safe_prime(&p)?;
        let q = std::iter::repeat_with(|| BigNumber::safe_prime_from_rng(PRIME_BITS, rng))
            .take(crate::utils::CRYPTOGRAPHIC_RETRY_MAX)
            .find(|q| q != &p && (&p * q).bit_length() == MODULUS_BITS)
            .ok_or(Error::SampleExhausted)?;
        validate_blum_safe_prime(&q)?;
        Ok((p, q))
    }

    /// 1024-bit safe Blum primes for tests, generated once with
    /// `openssl prime -generate -safe -bits 1024`.
    const POOL_OF_PRIMES: &[&str] = &[
        "e0c13475a91b05a35aa40e54e2378084babeb90cea8b497a211e8692f9b638b3706358d601a43eb60c393033e7776f9bd1a67318808e547bd4cd7043053a0341bf21661b267e710407cf5f918744affaea1c4b98630c037b9368d60540e28d1cfa82311c4103f39205603835b79e99c34694d78509c6e7a96b8452d777b393bb",
        "fa8cc82700ec4e5e0f83ba02194170bc34ef23e61fc8473ca07f6dc586a2abe1a530f22a2e8401ce28722409d33c5d9b8fdaeba7c24e38c2ca55b01d33e9ae3535541d3e06fdff5f208b21752703d4a6f25aa6003805b734afdaf657e19c1bee458a810308bc0b1ccf7ed4dc638c8d552fa288612c248a05c49ed27068ab985f",
        "c74a725dadd2625f39e5548eaafcf5ce7cb2dcdef2d82b3d1df2409cedde0ceca8308e584d46fa2a928deaed437eb7603633bdc2a9c3dfff4a9a04df2c930697edb81fcd5dbcfa67369bd75bd56033f57ac63a6aa6ecb3b19b0557a4f993dfda295622615af821f07fb8f20e933905297b22498f89bf1e133376b82646016677",
        "d76c6f333a4e46197363cb3a193642ec309a364f0aca6380189ce010078579f341bb614d27778a0b008c4f1798fc08f4693b0b718ceead134c37b213210bc16453137bc0795fee2e80365e3a876a6b843fe05d9db6be143afbc6547ee33a42bbd68f0aa3c13f16dc623f73facefbc4343e86de17461cb65ee6df19ef364be37b",
        "eedc60c77df2b2d72141f72f030b3250028cd42ef0b6068dbe4b04f95cc58400c3aef96ac32f71d5c08288fb4536219f74ff1345319fa63a9bb223c285979006c21b74d13800460918694d817185956b8e43b8d8652489690cfe12acdc9dfac1820bf16cad1d403d29a9019372bc72b4df50af419891916dc8ef930f7ded7d07",
        "c8ccaaad35e66c3a3bb58f0f702c3164dd43c8e14c95e991cbfe8660adb5f1e57209094638c2b0f7d179058ed6cdb9ee8ff55e85d79e76708446a9ddffe40a34d0a9d8be2e6d477587e704064027f3951dc76baa0688aabdeeb6db7065be232dcd1351f5b9d5fc685c310943892b67abfc93805aeaf494bddd3374807e892c57",
        "f4abb0a04b93f3460ada74d870768364ea319478ae9574dc4baaae42b300c6e1482ef25f703715b8519b6d5933ac7f6634893bc1cc8e9b55f91604703bde847eb2844e0f44778b7d1ba8ba81446a6c6f7ce4be9c51f2dbe3dc3392ddbb9ac9bd5d21b5a499a4301755bbdb99652a0adbaa72bdc1f4015ff9ad3aa796aba5b853",
        "d22ce3378f4b08da44fb42670709abd43fcdeba0c0a2030419d47572b088d2587f9de60c43adaa37df30eaa655b0f83c773e99cb0e2da85889093735e9b28ae5e526c933491dce96e3bb59ac62494df63ce7f711e59c3f1eb54465b4101a3238a519478fc4c8a7af56be6e77098c687b1124e42971efefe3e1597bf46570604b",
        "ed6c87eb426a2bfd311d54aa5ffbdda8d03020c4a04a8d7e16eb4f5d0bd16a92f2d2166a8743bbf6300abb784ce72ecdff1d31563075616923f5c45fd076adf58ca04d76b76ad4c96cab1c6e7548f51d50f00b4d4c9b3b4bbbb7d38226e529e715dfc32be50d07afcc3228d6346dcb3cae366a8d4b1026d3173e8641325c9ab3",
        "f90963e6efb3c22ae6050ab1f4eaa789dc69dc605b69f4af1f0fc9c381efe00d447e85814bc9475947a6a5dd59dc965d47b82db404293a9385ddb25b65eccaef98eeb60447d745d74257f9f9ebc31eedd24ca335281a24b4b1852a0711bfd7b875d934f6f11f714f879c57ad80cca937530bc619b81fcbcb29aa048cb017a10b",
        "ca143ade214c61b3fa627e20d5d45ca0a8c4dafda09cf06336c0ed55f9b6de5bdc5f9c00d0d73da793af7ad3d7387223f852b96661c6a03c4b05493362cd8fb58f88b1774a28be4fce19b6c2c3da58cdbfbcf809e60051127e82b23cf7adfa782ab939800acd2d7cbf540c0baf43f8eabe8ec1f24c0e55ddf99e25d17b74aec7",
        "cd866d78f061ee9eda882481f0416ae40456d130fc37839a9ecba82d0c4f5d584b0a062db64f21e82574fa496e69bddcd68087d22441142961600922f63c5a1e7ac0a9375da6e4ed2a71fea9a2bcbf9ca3a41dc1497d28262bd84f8b00f5c09f3d8867253006cf99b21d650f50d86e285fde27550ab4069ce215d57aa5f72353",
        "d18275a1a8ce36441db726cc156cc0bae1d2cdf5247bb4166936ac1e3146c5420cb0c2b7d681e36853ab6965015fb134261122635b477f7d08040ea45cb6634f1def9c4ea3afb7a44f0fec6c02a48157533ec5b47775725b5ce0eb7ad57c910098708190fcc166b3dbf8c102915eb1dbf02e75bc33e21a46229180b4a4cd0e13",
        "f728128a464dcb8784e010c206652dfba4c27941b83b2eb5bffb3700f24719eae81e73383fa74f90847515649a96ce9a249bcaacb3ead6050ce454ae07567fe2bf3ac6c7dcc1b8f896a39d3c2f89820252732c6f809d98ee5c0264e517628a93fbfd330a386bd7edd516d1b4b95c5fb13aea9477337dc09f71ce6512badd5c63",
        "d4b4c9d724a43cea3ad6f8400abda896ebfb7847e3253ab90acd0e08e6263852baef7114e1d2ae6e57c0cd41fedc02667cccc677d38d405eba662f3c1c3b1e903540117bb9846cec8ee403f0c798b82aa9aecc12f12db7b0bad405716bd9c797b607fa458f30f314a943689cd23add5400eb05b001d36cac31ab9832ea121523",
        "ead96ec8168d04c05950292792d69a11a5a40ddbfe204bdd18e0007d94b2235f009a88021d807ff1d2ffb192ed0376f8f19c833cc7bf45e090dca6295bf518064555c5bab483d0151e027934ef3b22a370923d057a7e38af7f5eab5eda139f2467f8cfa3ff10577f5093b8bdae04c7e850b86e8a33d35180ace46ece3408ed53",
    ];

    /// Draw a pair of distinct primes from the compiled-in pool.
    ///
    /// 🔒 The pool is published in this source file; never use this outside
    /// of tests.
    pub(crate) fn get_prime_pair_from_pool_insecure<R: RngCore + CryptoRng>(
        rng: &mut R,
    ) -> Result<(BigNumber, BigNumber)> {
        let i = rng.gen_range(0..POOL_OF_PRIMES.len());
        let j = std::iter::repeat_with(|| rng.gen_range(0..POOL_OF_PRIMES.len()))
            .find(|j| *j != i)
            .ok_or(Error::SampleExhausted)?;
        Ok((prime_from_pool(i)?, prime_from_pool(j)?))
    }

    /// Deal `n` disjoint prime pairs from the pool, so a whole test quorum
    /// gets distinct moduli.
    ///
    /// 🔒 The pool is published in this source file; never use this outside
    /// of tests.
    pub(crate) fn disjoint_pool_pairs_insecure(n: usize) -> Result<Vec<(BigNumber, BigNumber)>> {
        if 2 * n > POOL_OF_PRIMES.len() {
            error!(
                "The prime pool holds {} primes; cannot deal {n} disjoint pairs",
                POOL_OF_PRIMES.len()
            );
            return Err(Error::BadInput);
        }
        (0..n)
            .map(|i| Ok((prime_from_pool(2 * i)?, prime_from_pool(2 * i + 1)?)))
            .collect()
    }

    fn prime_from_pool(index: usize) -> Result<BigNumber> {
        let bytes = hex::decode(POOL_OF_PRIMES[index]).map_err(|_| {
            error!("Prime pool entry {index} is not valid hex");
            Error::InternalInvariantFailed
        })?;
        Ok(BigNumber::from_slice(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{random_plusminus_by_size, testing::init_testing};

    fn test_key(rng: &mut (impl RngCore + CryptoRng)) -> DecryptionKey {
        let (p, q) = prime_gen::get_prime_pair_from_pool_insecure(rng).unwrap();
        DecryptionKey::from_primes(&p, &q).unwrap()
    }

    #[test]
    fn encryption_decryption_round_trip() {
        let mut rng = init_testing();
        let dk = test_key(&mut rng);
        let pk = dk.encryption_key();

        for _ in 0..10 {
            let m = random_plusminus_by_size(&mut rng, 512);
            let (c, _nonce) = pk.encrypt(&mut rng, &m).unwrap();
            assert_eq!(dk.decrypt(&c).unwrap(), m);
        }
    }

    #[test]
    fn plaintext_bound_is_enforced() {
        let mut rng = init_testing();
        let dk = test_key(&mut rng);
        let pk = dk.encryption_key();

        let bound: BigNumber = (pk.modulus() - 1) / BigNumber::from(2u64);
        assert!(pk.encrypt(&mut rng, &bound).is_ok());
        assert!(pk.encrypt(&mut rng, &(&bound + 1)).is_err());
        assert!(pk.encrypt(&mut rng, &-(&bound + 1u32)).is_err());
    }

    #[test]
    fn ciphertext_product_adds_plaintexts() {
        let mut rng = init_testing();
        let dk = test_key(&mut rng);
        let pk = dk.encryption_key();

        let m1 = random_plusminus_by_size(&mut rng, 512);
        let m2 = random_plusminus_by_size(&mut rng, 512);
        let (c1, _) = pk.encrypt(&mut rng, &m1).unwrap();
        let (c2, _) = pk.encrypt(&mut rng, &m2).unwrap();

        let sum = pk.add(&c1, &c2);
        assert_eq!(dk.decrypt(&sum).unwrap(), m1 + m2);
    }

    #[test]
    fn ciphertext_power_scales_plaintext() {
        let mut rng = init_testing();
        let dk = test_key(&mut rng);
        let pk = dk.encryption_key();

        let m = random_plusminus_by_size(&mut rng, 512);
        let k = random_plusminus_by_size(&mut rng, 128);
        let (c, _) = pk.encrypt(&mut rng, &m).unwrap();

        let scaled = pk.multiply(&c, &k);
        assert_eq!(dk.decrypt(&scaled).unwrap(), &m * &k);
    }

    #[test]
    fn affine_transform_matches_its_algebra() {
        let mut rng = init_testing();
        let dk = test_key(&mut rng);
        let pk = dk.encryption_key();

        let m1 = random_plusminus_by_size(&mut rng, 256);
        let m2 = random_plusminus_by_size(&mut rng, 256);
        let a = random_plusminus_by_size(&mut rng, 256);
        let (c1, _) = pk.encrypt(&mut rng, &m1).unwrap();
        let (c2, _) = pk.encrypt(&mut rng, &m2).unwrap();

        let combined = pk.multiply_and_add(&a, &c1, &c2);
        assert_eq!(dk.decrypt(&combined).unwrap(), &a * &m1 + &m2);
    }

    #[test]
    fn non_coprime_ciphertext_is_rejected() {
        let mut rng = init_testing();
        let dk = test_key(&mut rng);
        let (p, _) = dk.primes();

        // A multiple of p shares a factor with N².
        let evil = Ciphertext::from_bn(p * p);
        assert_eq!(dk.decrypt(&evil), Err(Error::InvalidCiphertext));

        let zero = Ciphertext::from_bn(BigNumber::zero());
        assert_eq!(dk.decrypt(&zero), Err(Error::InvalidCiphertext));
    }

    #[test]
    fn pool_primes_pass_validation() {
        let mut rng = init_testing();
        let (p, q) = prime_gen::get_prime_pair_from_pool_insecure(&mut rng).unwrap();
        assert!(prime_gen::validate_blum_safe_prime(&p).is_ok());
        assert!(prime_gen::validate_blum_safe_prime(&q).is_ok());
        assert_ne!(p, q);
    }

    #[test]
    fn non_blum_primes_are_rejected() {
        // 1024-bit prime that is ≡ 1 mod 4 fails the Blum check; easiest to
        // simulate with a wrong-size prime which fails the length check
        // first.
        let small = BigNumber::from(13u64);
        assert_eq!(
            prime_gen::validate_blum_safe_prime(&small),
            Err(Error::PrimeInvalid)
        );
    }
}
