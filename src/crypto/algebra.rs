use core::fmt::Debug;

use rand_core::CryptoRngCore;
use zeroize::Zeroize;

use crate::Result;

/// Capability set shared by every algebraic structure a protocol variant can
/// run over.
///
/// Implementations carry their public parameters — modulus, order and
/// generator for the multiplicative group, curve constants, or a Paillier
/// public key — so all operations take `&self`. The three-move state machine
/// and the protocol variants depend only on this trait, never on a concrete
/// structure, and every implementation satisfies the same algebraic laws
/// (associativity, identity, inverses).
pub trait GroupAlgebra: Clone + Debug + Send + Sync + 'static {
    /// Scalar type for this algebra (exponents, challenges, responses).
    ///
    /// Scalars must be zeroizable since witnesses and nonces live in this
    /// domain.
    type Scalar: Clone + Debug + Eq + PartialEq + Zeroize + Send + Sync;

    /// Element type for this algebra (group elements, curve points,
    /// ciphertexts).
    type Element: Clone + Debug + Eq + PartialEq + Send + Sync;

    /// Returns the name of this algebra, bound into every transcript.
    fn name(&self) -> &'static str;

    /// Returns the distinguished generator.
    fn generator(&self) -> Self::Element;

    /// Returns the identity element.
    fn identity(&self) -> Self::Element;

    /// Checks whether an element is the identity.
    fn is_identity(&self, element: &Self::Element) -> bool {
        self.equal(element, &self.identity())
    }

    /// Group operation.
    fn combine(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;

    /// Group inverse of an element.
    fn invert(&self, element: &Self::Element) -> Result<Self::Element>;

    /// Exponentiation / scalar multiplication.
    fn power(&self, base: &Self::Element, exponent: &Self::Scalar) -> Self::Element;

    /// Element equality, constant-time where the representation allows it.
    fn equal(&self, a: &Self::Element, b: &Self::Element) -> bool;

    /// Samples a uniformly random scalar in the valid exponent range.
    ///
    /// Never returns zero; a zero exponent would produce identity commitments
    /// and break the protocols built on top.
    fn sample<R: CryptoRngCore>(&self, rng: &mut R) -> Self::Scalar;

    /// Derives a challenge scalar from 64 uniform bytes (wide reduction).
    fn challenge_scalar(&self, bytes: &[u8; 64]) -> Self::Scalar;

    /// Adds two scalars.
    fn scalar_add(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar;

    /// Subtracts two scalars.
    fn scalar_sub(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar;

    /// Multiplies two scalars.
    fn scalar_mul(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar;

    /// Multiplicative inverse of a scalar.
    ///
    /// Returns `None` for zero, or for residues that are not invertible in a
    /// composite scalar domain.
    fn scalar_invert(&self, scalar: &Self::Scalar) -> Option<Self::Scalar>;

    /// Checks whether a scalar is zero.
    fn scalar_is_zero(&self, scalar: &Self::Scalar) -> bool;

    /// Embeds a small integer into the scalar domain.
    fn scalar_from_u64(&self, value: u64) -> Self::Scalar;

    /// Serializes a scalar to bytes.
    fn scalar_to_bytes(&self, scalar: &Self::Scalar) -> Vec<u8>;

    /// Deserializes a scalar, rejecting wrong lengths and out-of-range values.
    fn scalar_from_bytes(&self, bytes: &[u8]) -> Result<Self::Scalar>;

    /// Serializes an element to bytes.
    fn element_to_bytes(&self, element: &Self::Element) -> Vec<u8>;

    /// Deserializes an element, rejecting anything outside the group.
    fn element_from_bytes(&self, bytes: &[u8]) -> Result<Self::Element>;

    /// Validates that an element belongs to the group.
    fn validate_element(&self, element: &Self::Element) -> Result<()>;
}
