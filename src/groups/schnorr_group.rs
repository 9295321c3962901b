use crypto_bigint::{Encoding, Integer, NonZero, Random, U256, U512, U2048, Zero};
use rand_core::CryptoRngCore;
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

use crate::crypto::field::{mod_inv, mod_pow, truncate, widen};
use crate::{Error, GroupAlgebra, Result};

/// Multiplicative subgroup of Z_p* with prime order q, generated by g.
///
/// The default parameter set is the RFC 5114 2048-bit MODP group with a
/// 256-bit prime-order subgroup. Custom parameters (including deliberately
/// tiny groups for soundness experiments) go through [`SchnorrGroup::from_parameters`],
/// which validates them before any protocol can run on top.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SchnorrGroup {
    p: U2048,
    q: U256,
    g: U2048,
}

/// Scalar in the order-q exponent field.
#[derive(Clone, Debug, Eq, PartialEq, Zeroize)]
#[zeroize(drop)]
pub struct Scalar(U256);

/// Element of the order-q subgroup of Z_p*.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Element(U2048);

impl ConstantTimeEq for Scalar {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl Scalar {
    pub fn new(value: U256) -> Self {
        Self(value)
    }

    pub fn inner(&self) -> &U256 {
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

impl SchnorrGroup {
    /// The RFC 5114 2048-bit MODP group with 256-bit subgroup order.
    pub fn rfc5114() -> Self {
        Self::from_parameters(rfc5114_p(), rfc5114_q(), rfc5114_g())
            .unwrap_or_else(|_| unreachable!("RFC 5114 constants are valid"))
    }

    /// Builds a group from explicit parameters.
    ///
    /// Validates that p and q are odd, q divides p-1, and g generates the
    /// order-q subgroup.
    pub fn from_parameters(p: U2048, q: U256, g: U2048) -> Result<Self> {
        if bool::from(p.is_zero()) || !bool::from(p.is_odd()) {
            return Err(Error::InvalidParams(
                "modulus p must be odd and non-zero".to_string(),
            ));
        }

        if bool::from(q.is_zero()) || !bool::from(q.is_odd()) {
            return Err(Error::InvalidParams(
                "subgroup order q must be odd and non-zero".to_string(),
            ));
        }

        let q_wide: U2048 = widen(&q);
        let non_zero_q: Option<NonZero<U2048>> = NonZero::new(q_wide).into();
        let non_zero_q = non_zero_q.unwrap_or_else(|| unreachable!("q was checked non-zero"));

        let p_minus_one = p.wrapping_sub(&U2048::ONE);
        if !bool::from(p_minus_one.rem(&non_zero_q).is_zero()) {
            return Err(Error::InvalidParams(
                "q must divide p - 1".to_string(),
            ));
        }

        if g >= p || g <= U2048::ONE {
            return Err(Error::InvalidParams(
                "generator g must lie in (1, p)".to_string(),
            ));
        }

        if !bool::from(mod_pow(&g, &q_wide, &p)?.ct_eq(&U2048::ONE)) {
            return Err(Error::InvalidParams(
                "generator g is not in the order-q subgroup".to_string(),
            ));
        }

        Ok(Self { p, q, g })
    }

    /// The group modulus p.
    pub fn modulus(&self) -> &U2048 {
        &self.p
    }

    /// The subgroup order q (the scalar field modulus).
    pub fn order(&self) -> &U256 {
        &self.q
    }

    fn non_zero_p(&self) -> NonZero<U2048> {
        let non_zero: Option<NonZero<U2048>> = NonZero::new(self.p).into();
        non_zero.unwrap_or_else(|| unreachable!("p was validated non-zero"))
    }

    fn non_zero_q(&self) -> NonZero<U256> {
        let non_zero: Option<NonZero<U256>> = NonZero::new(self.q).into();
        non_zero.unwrap_or_else(|| unreachable!("q was validated non-zero"))
    }
}

impl GroupAlgebra for SchnorrGroup {
    type Scalar = Scalar;
    type Element = Element;

    fn name(&self) -> &'static str {
        "modp-2048-256"
    }

    fn generator(&self) -> Element {
        Element(self.g)
    }

    fn identity(&self) -> Element {
        Element(U2048::ONE)
    }

    fn combine(&self, a: &Element, b: &Element) -> Element {
        Element(a.0.mul_mod(&b.0, &self.non_zero_p()))
    }

    fn invert(&self, element: &Element) -> Result<Element> {
        match mod_inv(&element.0, &self.p)? {
            Some(inverse) => Ok(Element(inverse)),
            None => Err(Error::InvalidGroupElement(
                "element has no inverse modulo p".to_string(),
            )),
        }
    }

    fn power(&self, base: &Element, exponent: &Scalar) -> Element {
        let exp: U2048 = widen(&exponent.0);
        Element(
            mod_pow(&base.0, &exp, &self.p)
                .unwrap_or_else(|_| unreachable!("p was validated odd")),
        )
    }

    fn equal(&self, a: &Element, b: &Element) -> bool {
        bool::from(a.0.ct_eq(&b.0))
    }

    fn sample<R: CryptoRngCore>(&self, rng: &mut R) -> Scalar {
        let non_zero_q = self.non_zero_q();

        loop {
            let value = U256::random(rng);
            let reduced = value.rem(&non_zero_q);

            if !bool::from(reduced.is_zero()) {
                return Scalar(reduced);
            }
        }
    }

    fn challenge_scalar(&self, bytes: &[u8; 64]) -> Scalar {
        let wide = U512::from_be_slice(bytes);
        let q_wide: U512 = widen(&self.q);
        let non_zero_q: Option<NonZero<U512>> = NonZero::new(q_wide).into();
        let non_zero_q = non_zero_q.unwrap_or_else(|| unreachable!("q was validated non-zero"));
        Scalar(truncate(&wide.rem(&non_zero_q)))
    }

    fn scalar_add(&self, a: &Scalar, b: &Scalar) -> Scalar {
        Scalar(a.0.add_mod(&b.0, &self.non_zero_q()))
    }

    fn scalar_sub(&self, a: &Scalar, b: &Scalar) -> Scalar {
        Scalar(a.0.sub_mod(&b.0, &self.non_zero_q()))
    }

    fn scalar_mul(&self, a: &Scalar, b: &Scalar) -> Scalar {
        Scalar(a.0.mul_mod(&b.0, &self.non_zero_q()))
    }

    fn scalar_invert(&self, scalar: &Scalar) -> Option<Scalar> {
        if self.scalar_is_zero(scalar) {
            return None;
        }

        mod_inv(&scalar.0, &self.q).ok().flatten().map(Scalar)
    }

    fn scalar_is_zero(&self, scalar: &Scalar) -> bool {
        bool::from(scalar.0.is_zero())
    }

    fn scalar_from_u64(&self, value: u64) -> Scalar {
        Scalar(U256::from_u64(value).rem(&self.non_zero_q()))
    }

    fn scalar_to_bytes(&self, scalar: &Scalar) -> Vec<u8> {
        scalar.0.to_be_bytes().to_vec()
    }

    fn scalar_from_bytes(&self, bytes: &[u8]) -> Result<Scalar> {
        if bytes.len() != 32 {
            return Err(Error::InvalidScalar(format!(
                "Expected 32 bytes, got {}",
                bytes.len()
            )));
        }

        let value = U256::from_be_slice(bytes);
        if value >= self.q {
            return Err(Error::InvalidScalar(
                "Scalar value must be less than group order".to_string(),
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
        if element.0 >= self.p {
            return Err(Error::InvalidGroupElement(
                "Element must be less than p".to_string(),
            ));
        }

        if bool::from(element.0.is_zero()) {
            return Err(Error::InvalidGroupElement(
                "Zero is not a group element".to_string(),
            ));
        }

        if bool::from(element.0.ct_eq(&U2048::ONE)) {
            return Ok(());
        }

        let q_wide: U2048 = widen(&self.q);
        let result = mod_pow(&element.0, &q_wide, &self.p)?;
        if !bool::from(result.ct_eq(&U2048::ONE)) {
            return Err(Error::InvalidGroupElement(
                "Element is not in the correct subgroup".to_string(),
            ));
        }

        Ok(())
    }
}

fn rfc5114_p() -> U2048 {
    U2048::from_be_hex(
        "87A8E61DB4B6663CFFBBD19C651959998CEEF608660DD0F25D2CEED4435E3B00E00DF8F1D61957D4FAF7DF4561B2AA3016C3D91134096FAA3BF4296D830E9A7C209E0C6497517ABD5A8A9D306BCF67ED91F9E6725B4758C022E0B1EF4275BF7B6C5BFC11D45F9088B941F54EB1E59BB8BC39A0BF12307F5C4FDB70C581B23F76B63ACAE1CAA6B7902D52526735488A0EF13C6D9A51BFA4AB3AD8347796524D8EF6A167B5A41825D967E144E5140564251CCACB83E6B486F6B3CA3F7971506026C0B857F689962856DED4010ABD0BE621C3A3960A54E710C375F26375D7014103A4B54330C198AF126116D2276E11715F693877FAD7EF09CADB094AE91E1A1597",
    )
}

fn rfc5114_q() -> U256 {
    U256::from_be_hex("8CF83642A709A097B447997640129DA299B1A47D1EB3750BA308B0FE64F5FBD3")
}

fn rfc5114_g() -> U2048 {
    U2048::from_be_hex(
        "3FB32C9B73134D0B2E77506660EDBD484CA7B18F21EF205407F4793A1A0BA12510DBC15077BE463FFF4FED4AAC0BB555BE3A6C1B0C6B47B1BC3773BF7E8C6F62901228F8C28CBB18A55AE31341000A650196F931C77A57F2DDF463E5E9EC144B777DE62AAAB8A8628AC376D282D6ED3864E67982428EBC831D14348F6F2F9193B5045AF2767164E1DFC967C1FB3F2E55A4BD1BFFE83B9C80D052B985D182EA0ADB2A3B7313D3FE14C8484B1E052588B9B7D2BBD2DF016199ECD06E1557CD0915B3353BBB64E0EC377FD028370DF92B52C7891428CDC67EB6184B523D1DB246C32F63078490F00EF8D647D148D47954515E2327CFEF98C582664B4C0F6CC41659",
    )
}

/// A deliberately tiny group (p = 23, q = 11, g = 4) for soundness
/// experiments where the challenge space must be enumerable.
#[cfg(test)]
pub(crate) fn tiny_group() -> SchnorrGroup {
    SchnorrGroup::from_parameters(
        U2048::from_u64(23),
        U256::from_u64(11),
        U2048::from_u64(4),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SecureRng;

    #[test]
    fn rfc5114_parameters_validate() {
        let group = SchnorrGroup::rfc5114();
        group.validate_element(&group.generator()).unwrap();
    }

    #[test]
    fn from_parameters_rejects_bad_generator() {
        // 5 is not in the order-11 subgroup of Z_23*
        let result = SchnorrGroup::from_parameters(
            U2048::from_u64(23),
            U256::from_u64(11),
            U2048::from_u64(5),
        );
        assert!(result.is_err());
    }

    #[test]
    fn from_parameters_rejects_even_modulus() {
        let result = SchnorrGroup::from_parameters(
            U2048::from_u64(22),
            U256::from_u64(11),
            U2048::from_u64(4),
        );
        assert!(result.is_err());
    }

    #[test]
    fn scalar_add_sub() {
        let group = SchnorrGroup::rfc5114();
        let mut rng = SecureRng::new();
        let a = group.sample(&mut rng);
        let b = group.sample(&mut rng);

        let sum = group.scalar_add(&a, &b);
        let diff = group.scalar_sub(&sum, &b);
        assert_eq!(a, diff);
    }

    #[test]
    fn scalar_inversion() {
        let group = SchnorrGroup::rfc5114();
        let mut rng = SecureRng::new();
        let a = group.sample(&mut rng);

        let inverse = group.scalar_invert(&a).unwrap();
        let product = group.scalar_mul(&a, &inverse);
        assert_eq!(product, group.scalar_from_u64(1));
    }

    #[test]
    fn scalar_serialization() {
        let group = SchnorrGroup::rfc5114();
        let mut rng = SecureRng::new();
        let scalar = group.sample(&mut rng);
        let bytes = group.scalar_to_bytes(&scalar);
        let deserialized = group.scalar_from_bytes(&bytes).unwrap();
        assert_eq!(scalar, deserialized);
    }

    #[test]
    fn element_operations() {
        let group = SchnorrGroup::rfc5114();
        let mut rng = SecureRng::new();
        let x = group.sample(&mut rng);

        let y = group.power(&group.generator(), &x);
        group.validate_element(&y).unwrap();

        let inverse = group.invert(&y).unwrap();
        assert!(group.is_identity(&group.combine(&y, &inverse)));
    }

    #[test]
    fn element_rejects_out_of_subgroup() {
        let group = SchnorrGroup::rfc5114();
        let mut bytes = vec![0u8; 256];
        bytes[255] = 5;
        // 5 generates a larger subgroup than q with overwhelming probability
        assert!(group.element_from_bytes(&bytes).is_err());
    }

    #[test]
    fn identity() {
        let group = SchnorrGroup::rfc5114();
        let id = group.identity();
        assert!(group.is_identity(&id));
        assert!(!group.is_identity(&group.generator()));
    }

    #[test]
    fn tiny_group_arithmetic() {
        let group = tiny_group();
        // 4^6 mod 23 = 2
        let x = group.scalar_from_u64(6);
        let y = group.power(&group.generator(), &x);
        assert_eq!(*y.inner(), U2048::from_u64(2));
    }

    #[test]
    fn sample_never_zero_in_tiny_group() {
        let group = tiny_group();
        let mut rng = SecureRng::new();
        for _ in 0..200 {
            assert!(!group.scalar_is_zero(&group.sample(&mut rng)));
        }
    }
}
