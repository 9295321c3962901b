use crypto_bigint::{Encoding, Integer, NonZero, RandomMod, U512, U1024, U2048, Zero};
use crypto_primes::RandomPrimeWithRng;
use rand_core::CryptoRngCore;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::crypto::field::{mod_inv, mod_pow, truncate, widen};
use crate::{Error, GroupAlgebra, Result};

/// Bit length of each prime factor of the modulus.
const PRIME_BITS: u32 = 512;

/// Bit length of the challenge domain. Challenges must stay below both prime
/// factors of n, so the full scalar range cannot be used.
const CHALLENGE_BITS: usize = 128;

/// The ciphertext group Z_{n²}* of a Paillier public key.
///
/// Elements are ciphertexts modulo n²; the group operation multiplies
/// ciphertexts (adding plaintexts), and exponentiation scales plaintexts.
/// Scalars live modulo n.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaillierGroup {
    n: U1024,
    n_squared: U2048,
}

/// Scalar modulo n (a plaintext, randomizer, or response value).
#[derive(Clone, Debug, Eq, PartialEq, Zeroize)]
#[zeroize(drop)]
pub struct Scalar(U1024);

/// Ciphertext modulo n².
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Element(U2048);

impl Scalar {
    pub fn new(value: U1024) -> Self {
        Self(value)
    }

    pub fn inner(&self) -> &U1024 {
        &self.0
    }
}

impl Element {
    pub fn new(value: U2048) -> Self {
        Self(value)
    }

    pub fn inner(&self) -> &U2048 {
        &self.0
    }
}

impl PaillierGroup {
    /// Builds the ciphertext group of a public modulus.
    pub fn from_modulus(n: U1024) -> Result<Self> {
        if bool::from(n.is_zero()) || !bool::from(n.is_odd()) {
            return Err(Error::InvalidParams(
                "Paillier modulus must be odd and non-zero".to_string(),
            ));
        }

        if n <= U1024::ONE {
            return Err(Error::InvalidParams(
                "Paillier modulus must exceed one".to_string(),
            ));
        }

        let n_squared: U2048 = n.split_mul(&n).into();
        Ok(Self { n, n_squared })
    }

    /// The public modulus n.
    pub fn modulus(&self) -> &U1024 {
        &self.n
    }

    /// The ciphertext modulus n².
    pub fn modulus_squared(&self) -> &U2048 {
        &self.n_squared
    }

    /// Encrypts `message` with fresh randomness, returning the ciphertext and
    /// the randomizer (the randomizer is part of a consistency-proof witness).
    pub fn encrypt<R: CryptoRngCore>(&self, message: &Scalar, rng: &mut R) -> (Element, Scalar) {
        let randomizer = self.sample_unit(rng);
        let ciphertext = self.encrypt_with(message, &randomizer);
        (ciphertext, randomizer)
    }

    /// Computes `(1+n)^message * randomizer^n mod n²`.
    pub fn encrypt_with(&self, message: &Scalar, randomizer: &Scalar) -> Element {
        let base = self.power(&self.generator(), message);
        let r_wide: U2048 = widen(&randomizer.0);
        let n_wide: U2048 = widen(&self.n);
        let masked = mod_pow(&r_wide, &n_wide, &self.n_squared)
            .unwrap_or_else(|_| unreachable!("n² is odd"));
        self.combine(&base, &Element(masked))
    }

    /// Samples a randomizer that is invertible modulo n.
    pub fn sample_unit<R: CryptoRngCore>(&self, rng: &mut R) -> Scalar {
        loop {
            let candidate = self.sample(rng);
            let invertible = mod_inv(&candidate.0, &self.n)
                .unwrap_or_else(|_| unreachable!("n is odd"))
                .is_some();
            if invertible {
                return candidate;
            }
        }
    }

    fn non_zero_n(&self) -> NonZero<U1024> {
        let non_zero: Option<NonZero<U1024>> = NonZero::new(self.n).into();
        non_zero.unwrap_or_else(|| unreachable!("n was validated non-zero"))
    }

    fn non_zero_n_squared(&self) -> NonZero<U2048> {
        let non_zero: Option<NonZero<U2048>> = NonZero::new(self.n_squared).into();
        non_zero.unwrap_or_else(|| unreachable!("n² is non-zero"))
    }

    /// Scalar exponentiation modulo n, used for randomizer responses.
    pub fn scalar_pow(&self, base: &Scalar, exponent: &Scalar) -> Scalar {
        Scalar(
            mod_pow(&base.0, &exponent.0, &self.n)
                .unwrap_or_else(|_| unreachable!("n was validated odd")),
        )
    }

    /// The L function (x - 1) / n of Paillier decryption.
    fn l_function(&self, x: &U2048) -> U1024 {
        let n_wide: U2048 = widen(&self.n);
        let non_zero: Option<NonZero<U2048>> = NonZero::new(n_wide).into();
        let non_zero = non_zero.unwrap_or_else(|| unreachable!("n is non-zero"));
        let quotient = x.wrapping_sub(&U2048::ONE) / non_zero;
        truncate(&quotient)
    }
}

impl GroupAlgebra for PaillierGroup {
    type Scalar = Scalar;
    type Element = Element;

    fn name(&self) -> &'static str {
        "paillier-1024"
    }

    fn generator(&self) -> Element {
        let n_wide: U2048 = widen(&self.n);
        Element(n_wide.wrapping_add(&U2048::ONE))
    }

    fn identity(&self) -> Element {
        Element(U2048::ONE)
    }

    fn combine(&self, a: &Element, b: &Element) -> Element {
        Element(a.0.mul_mod(&b.0, &self.non_zero_n_squared()))
    }

    fn invert(&self, element: &Element) -> Result<Element> {
        match mod_inv(&element.0, &self.n_squared)? {
            Some(inverse) => Ok(Element(inverse)),
            None => Err(Error::InvalidGroupElement(
                "ciphertext is not invertible modulo n²".to_string(),
            )),
        }
    }

    fn power(&self, base: &Element, exponent: &Scalar) -> Element {
        let exp: U2048 = widen(&exponent.0);
        Element(
            mod_pow(&base.0, &exp, &self.n_squared)
                .unwrap_or_else(|_| unreachable!("n² is odd")),
        )
    }

    fn equal(&self, a: &Element, b: &Element) -> bool {
        bool::from(a.0.ct_eq(&b.0))
    }

    fn sample<R: CryptoRngCore>(&self, rng: &mut R) -> Scalar {
        let non_zero_n = self.non_zero_n();

        loop {
            let value = U1024::random_mod(rng, &non_zero_n);
            if !bool::from(value.is_zero()) {
                return Scalar(value);
            }
        }
    }

    fn challenge_scalar(&self, bytes: &[u8; 64]) -> Scalar {
        // Low-order 128 bits of the transcript output.
        let mut padded = [0u8; 128];
        padded[128 - CHALLENGE_BITS / 8..].copy_from_slice(&bytes[64 - CHALLENGE_BITS / 8..]);
        Scalar(U1024::from_be_slice(&padded))
    }

    fn scalar_add(&self, a: &Scalar, b: &Scalar) -> Scalar {
        Scalar(a.0.add_mod(&b.0, &self.non_zero_n()))
    }

    fn scalar_sub(&self, a: &Scalar, b: &Scalar) -> Scalar {
        Scalar(a.0.sub_mod(&b.0, &self.non_zero_n()))
    }

    fn scalar_mul(&self, a: &Scalar, b: &Scalar) -> Scalar {
        Scalar(a.0.mul_mod(&b.0, &self.non_zero_n()))
    }

    fn scalar_invert(&self, scalar: &Scalar) -> Option<Scalar> {
        if self.scalar_is_zero(scalar) {
            return None;
        }

        mod_inv(&scalar.0, &self.n).ok().flatten().map(Scalar)
    }

    fn scalar_is_zero(&self, scalar: &Scalar) -> bool {
        bool::from(scalar.0.is_zero())
    }

    fn scalar_from_u64(&self, value: u64) -> Scalar {
        Scalar(U1024::from_u64(value))
    }

    fn scalar_to_bytes(&self, scalar: &Scalar) -> Vec<u8> {
        scalar.0.to_be_bytes().to_vec()
    }

    fn scalar_from_bytes(&self, bytes: &[u8]) -> Result<Scalar> {
        if bytes.len() != 128 {
            return Err(Error::InvalidScalar(format!(
                "Expected 128 bytes, got {}",
                bytes.len()
            )));
        }

        let value = U1024::from_be_slice(bytes);
        if value >= self.n {
            return Err(Error::InvalidScalar(
                "Scalar value must be less than the modulus".to_string(),
            ));
        }

        Ok(Scalar(value))
    }

    fn element_to_bytes(&self, element: &Element) -> Vec<u8> {
        element.0.to_be_bytes().to_vec()
    }

    fn element_from_bytes(&self, bytes: &[u8]) -> Result<Element> {
        if bytes.len() != 256 {
            return Err(Error::InvalidGroupElement(format!(
                "Expected 256 bytes, got {}",
                bytes.len()
            )));
        }

        let element = Element(U2048::from_be_slice(bytes));
        self.validate_element(&element)?;
        Ok(element)
    }

    fn validate_element(&self, element: &Element) -> Result<()> {
        if element.0 >= self.n_squared {
            return Err(Error::InvalidGroupElement(
                "Ciphertext must be less than n²".to_string(),
            ));
        }

        let invertible = mod_inv(&element.0, &self.n_squared)?.is_some();
        if !invertible {
            return Err(Error::InvalidGroupElement(
                "Ciphertext shares a factor with the modulus".to_string(),
            ));
        }

        Ok(())
    }
}

/// A Paillier key pair. The prime factors never leave this struct and are
/// zeroized on drop.
#[derive(Clone)]
pub struct PaillierKeypair {
    p: U512,
    q: U512,
    public: PaillierGroup,
}

impl PaillierKeypair {
    /// Generates a fresh key pair with two 512-bit primes.
    pub fn generate<R: CryptoRngCore>(rng: &mut R) -> Self {
        Self::generate_with_prime_bits(rng, PRIME_BITS)
    }

    /// Generates a key pair with smaller primes, for tests and benchmarks
    /// where full-size key generation is too slow.
    pub fn generate_with_prime_bits<R: CryptoRngCore>(rng: &mut R, bits: u32) -> Self {
        // primes must stay above the challenge domain
        let bits = bits.clamp(CHALLENGE_BITS as u32, PRIME_BITS);
        let p = U512::generate_prime_with_rng(rng, bits);
        let mut q = U512::generate_prime_with_rng(rng, bits);
        while q == p {
            q = U512::generate_prime_with_rng(rng, bits);
        }

        let n: U1024 = p.split_mul(&q).into();
        let public = PaillierGroup::from_modulus(n)
            .unwrap_or_else(|_| unreachable!("a product of odd primes is a valid modulus"));

        Self { p, q, public }
    }

    /// The public half of the key.
    pub fn public(&self) -> &PaillierGroup {
        &self.public
    }

    /// Decrypts a ciphertext.
    pub fn decrypt(&self, ciphertext: &Element) -> Result<Scalar> {
        self.public.validate_element(ciphertext)?;

        // phi = (p-1)(q-1); for c = (1+n)^m r^n, c^phi = 1 + phi*m*n mod n²
        let p_minus_one = self.p.wrapping_sub(&U512::ONE);
        let q_minus_one = self.q.wrapping_sub(&U512::ONE);
        let totient: U1024 = p_minus_one.split_mul(&q_minus_one).into();

        let exp: U2048 = widen(&totient);
        let x = mod_pow(&ciphertext.0, &exp, &self.public.n_squared)?;
        let l = self.public.l_function(&x);

        let totient_inverse = mod_inv(&totient, &self.public.n)?.ok_or_else(|| {
            Error::InvalidParams("totient is not invertible modulo n".to_string())
        })?;

        Ok(Scalar(l.mul_mod(&totient_inverse, &self.public.non_zero_n())))
    }
}

impl Drop for PaillierKeypair {
    fn drop(&mut self) {
        self.p.zeroize();
        self.q.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SecureRng;

    fn test_keypair() -> PaillierKeypair {
        let mut rng = SecureRng::new();
        PaillierKeypair::generate_with_prime_bits(&mut rng, 128)
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let keypair = test_keypair();
        let mut rng = SecureRng::new();

        let message = keypair.public().scalar_from_u64(123_456_789);
        let (ciphertext, _randomizer) = keypair.public().encrypt(&message, &mut rng);

        let decrypted = keypair.decrypt(&ciphertext).unwrap();
        assert_eq!(message, decrypted);
    }

    #[test]
    fn ciphertexts_are_homomorphic() {
        let keypair = test_keypair();
        let group = keypair.public().clone();
        let mut rng = SecureRng::new();

        let a = group.scalar_from_u64(41);
        let b = group.scalar_from_u64(1);
        let (ca, _) = group.encrypt(&a, &mut rng);
        let (cb, _) = group.encrypt(&b, &mut rng);

        let sum = keypair.decrypt(&group.combine(&ca, &cb)).unwrap();
        assert_eq!(sum, group.scalar_from_u64(42));
    }

    #[test]
    fn encryption_is_randomized() {
        let keypair = test_keypair();
        let group = keypair.public().clone();
        let mut rng = SecureRng::new();

        let message = group.scalar_from_u64(7);
        let (c1, _) = group.encrypt(&message, &mut rng);
        let (c2, _) = group.encrypt(&message, &mut rng);
        assert!(!group.equal(&c1, &c2));
    }

    #[test]
    fn modulus_validation() {
        assert!(PaillierGroup::from_modulus(U1024::ZERO).is_err());
        assert!(PaillierGroup::from_modulus(U1024::from_u64(10)).is_err());
        assert!(PaillierGroup::from_modulus(U1024::ONE).is_err());
    }

    #[test]
    fn challenge_scalar_is_bounded() {
        let keypair = test_keypair();
        let group = keypair.public();
        let challenge = group.challenge_scalar(&[0xFF; 64]);
        // 128-bit bound: the high limbs must be empty
        let bytes = group.scalar_to_bytes(&challenge);
        assert!(bytes[..112].iter().all(|&b| b == 0));
    }
}
