use curve25519_dalek::constants::RISTRETTO_BASEPOINT_TABLE;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar as DalekScalar;
use curve25519_dalek::traits::Identity;
use rand_core::CryptoRngCore;
use zeroize::Zeroize;

use crate::{Error, GroupAlgebra, Result};

/// Number of bytes in a Ristretto255 scalar or compressed element.
const RISTRETTO_BYTES: usize = 32;

/// Number of bytes used for wide scalar reduction.
const WIDE_REDUCTION_BYTES: usize = 64;

/// Ristretto255 group providing fast, prime-order elliptic curve operations.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Ristretto255;

/// Scalar in the Ristretto255 group.
///
/// Scalars are automatically zeroized when dropped.
#[derive(Clone, Debug, Eq, PartialEq, Zeroize)]
#[zeroize(drop)]
pub struct Scalar(DalekScalar);

/// Element (point) in the Ristretto255 group.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Element(RistrettoPoint);

impl Scalar {
    pub fn new(value: DalekScalar) -> Self {
        Self(value)
    }

    pub fn inner(&self) -> &DalekScalar {
        &self.0
    }
}

impl Element {
    pub fn new(value: RistrettoPoint) -> Self {
        Self(value)
    }

    pub fn inner(&self) -> &RistrettoPoint {
        &self.0
    }
}

impl Ristretto255 {
    pub fn new() -> Self {
        Self
    }
}

impl GroupAlgebra for Ristretto255 {
    type Scalar = Scalar;
    type Element = Element;

    fn name(&self) -> &'static str {
        "ristretto255"
    }

    fn generator(&self) -> Element {
        Element(RISTRETTO_BASEPOINT_TABLE.basepoint())
    }

    fn identity(&self) -> Element {
        Element(RistrettoPoint::identity())
    }

    fn combine(&self, a: &Element, b: &Element) -> Element {
        Element(a.0 + b.0)
    }

    fn invert(&self, element: &Element) -> Result<Element> {
        Ok(Element(-element.0))
    }

    fn power(&self, base: &Element, exponent: &Scalar) -> Element {
        Element(base.0 * exponent.0)
    }

    fn equal(&self, a: &Element, b: &Element) -> bool {
        a.0 == b.0
    }

    fn sample<R: CryptoRngCore>(&self, rng: &mut R) -> Scalar {
        loop {
            let mut bytes = [0u8; WIDE_REDUCTION_BYTES];
            rng.fill_bytes(&mut bytes);
            let value = DalekScalar::from_bytes_mod_order_wide(&bytes);

            if value != DalekScalar::ZERO {
                return Scalar(value);
            }
        }
    }

    fn challenge_scalar(&self, bytes: &[u8; 64]) -> Scalar {
        Scalar(DalekScalar::from_bytes_mod_order_wide(bytes))
    }

    fn scalar_add(&self, a: &Scalar, b: &Scalar) -> Scalar {
        Scalar(a.0 + b.0)
    }

    fn scalar_sub(&self, a: &Scalar, b: &Scalar) -> Scalar {
        Scalar(a.0 - b.0)
    }

    fn scalar_mul(&self, a: &Scalar, b: &Scalar) -> Scalar {
        Scalar(a.0 * b.0)
    }

    fn scalar_invert(&self, scalar: &Scalar) -> Option<Scalar> {
        if self.scalar_is_zero(scalar) {
            None
        } else {
            Some(Scalar(scalar.0.invert()))
        }
    }

    fn scalar_is_zero(&self, scalar: &Scalar) -> bool {
        scalar.0 == DalekScalar::ZERO
    }

    fn scalar_from_u64(&self, value: u64) -> Scalar {
        Scalar(DalekScalar::from(value))
    }

    fn scalar_to_bytes(&self, scalar: &Scalar) -> Vec<u8> {
        scalar.0.to_bytes().to_vec()
    }

    fn scalar_from_bytes(&self, bytes: &[u8]) -> Result<Scalar> {
        if bytes.len() != RISTRETTO_BYTES {
            return Err(Error::InvalidScalar(format!(
                "Expected {} bytes, got {}",
                RISTRETTO_BYTES,
                bytes.len()
            )));
        }

        let mut array = [0u8; RISTRETTO_BYTES];
        array.copy_from_slice(bytes);

        match DalekScalar::from_canonical_bytes(array).into() {
            Some(scalar) => Ok(Scalar(scalar)),
            None => Err(Error::InvalidScalar(
                "Bytes do not represent a valid scalar".to_string(),
            )),
        }
    }

    fn element_to_bytes(&self, element: &Element) -> Vec<u8> {
        element.0.compress().to_bytes().to_vec()
    }

    fn element_from_bytes(&self, bytes: &[u8]) -> Result<Element> {
        if bytes.len() != RISTRETTO_BYTES {
            return Err(Error::InvalidGroupElement(format!(
                "Expected {} bytes, got {}",
                RISTRETTO_BYTES,
                bytes.len()
            )));
        }

        let mut array = [0u8; RISTRETTO_BYTES];
        array.copy_from_slice(bytes);

        match CompressedRistretto(array).decompress() {
            Some(point) => Ok(Element(point)),
            None => Err(Error::InvalidGroupElement(
                "Bytes do not represent a valid Ristretto point".to_string(),
            )),
        }
    }

    fn validate_element(&self, _element: &Element) -> Result<()> {
        // Every decompressed Ristretto point is a valid group element.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SecureRng;

    #[test]
    fn generator_is_not_identity() {
        let group = Ristretto255::new();
        assert!(!group.is_identity(&group.generator()));
    }

    #[test]
    fn scalar_add_sub() {
        let group = Ristretto255::new();
        let mut rng = SecureRng::new();
        let a = group.sample(&mut rng);
        let b = group.sample(&mut rng);

        let sum = group.scalar_add(&a, &b);
        let diff = group.scalar_sub(&sum, &b);
        assert_eq!(a, diff);
    }

    #[test]
    fn scalar_inversion() {
        let group = Ristretto255::new();
        let mut rng = SecureRng::new();
        let a = group.sample(&mut rng);

        let inverse = group.scalar_invert(&a).unwrap();
        let product = group.scalar_mul(&a, &inverse);
        assert_eq!(product, group.scalar_from_u64(1));
    }

    #[test]
    fn element_serialization() {
        let group = Ristretto255::new();
        let mut rng = SecureRng::new();
        let x = group.sample(&mut rng);
        let y = group.power(&group.generator(), &x);

        let bytes = group.element_to_bytes(&y);
        let deserialized = group.element_from_bytes(&bytes).unwrap();
        assert_eq!(y, deserialized);
    }

    #[test]
    fn element_rejects_garbage() {
        let group = Ristretto255::new();
        assert!(group.element_from_bytes(&[0xFF; 32]).is_err());
        assert!(group.element_from_bytes(&[1, 2, 3]).is_err());
    }

    #[test]
    fn exponent_addition_matches_element_combination() {
        let group = Ristretto255::new();
        let mut rng = SecureRng::new();
        let a = group.sample(&mut rng);
        let b = group.sample(&mut rng);

        let ga = group.power(&group.generator(), &a);
        let gb = group.power(&group.generator(), &b);
        let combined = group.combine(&ga, &gb);

        let sum = group.scalar_add(&a, &b);
        let expected = group.power(&group.generator(), &sum);

        assert!(group.equal(&combined, &expected));
    }

    #[test]
    fn inverse_cancels() {
        let group = Ristretto255::new();
        let mut rng = SecureRng::new();
        let x = group.sample(&mut rng);
        let y = group.power(&group.generator(), &x);
        let inverse = group.invert(&y).unwrap();
        assert!(group.is_identity(&group.combine(&y, &inverse)));
    }
}
