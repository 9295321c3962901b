use rand_core::CryptoRngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::expect_parts;
use crate::crypto::GroupAlgebra;
use crate::protocol::SigmaRelation;
use crate::{Error, Result};

/// Schnorr proof of knowledge of a discrete logarithm: the prover knows `x`
/// such that `h = g^x`.
///
/// Generic over the algebra, so one relation covers the multiplicative-group
/// and elliptic-curve variants. The `_zkp`/`_zkpok` variants are this same
/// relation driven in a Fiat-Shamir [`crate::protocol::ProofMode`].
#[derive(Clone, Debug)]
pub struct SchnorrRelation<A: GroupAlgebra> {
    algebra: A,
}

impl<A: GroupAlgebra> SchnorrRelation<A> {
    pub fn new(algebra: A) -> Self {
        Self { algebra }
    }

    /// Computes the public statement `h = g^x` for a witness.
    pub fn statement_for(&self, witness: &SchnorrWitness<A>) -> SchnorrStatement<A> {
        SchnorrStatement {
            h: self.algebra.power(&self.algebra.generator(), &witness.x),
        }
    }
}

/// The prover's secret exponent. Zeroized on drop.
pub struct SchnorrWitness<A: GroupAlgebra> {
    x: A::Scalar,
}

impl<A: GroupAlgebra> SchnorrWitness<A> {
    pub fn new(x: A::Scalar) -> Self {
        Self { x }
    }

    /// Samples a fresh witness.
    pub fn random<R: CryptoRngCore>(algebra: &A, rng: &mut R) -> Self {
        Self {
            x: algebra.sample(rng),
        }
    }
}

impl<A: GroupAlgebra> Zeroize for SchnorrWitness<A> {
    fn zeroize(&mut self) {
        self.x.zeroize();
    }
}

impl<A: GroupAlgebra> Drop for SchnorrWitness<A> {
    fn drop(&mut self) {
        self.x.zeroize();
    }
}

impl<A: GroupAlgebra> ZeroizeOnDrop for SchnorrWitness<A> {}

/// The public claim `h = g^x`.
#[derive(Clone, Debug)]
pub struct SchnorrStatement<A: GroupAlgebra> {
    h: A::Element,
}

impl<A: GroupAlgebra> SchnorrStatement<A> {
    pub fn new(h: A::Element) -> Self {
        Self { h }
    }

    pub fn h(&self) -> &A::Element {
        &self.h
    }
}

/// First move: `u = g^k` for an ephemeral `k`.
#[derive(Clone, Debug)]
pub struct SchnorrCommitment<A: GroupAlgebra> {
    u: A::Element,
}

impl<A: GroupAlgebra> SchnorrCommitment<A> {
    pub fn u(&self) -> &A::Element {
        &self.u
    }
}

/// Ephemeral commitment randomness. Zeroized on drop.
pub struct SchnorrNonce<A: GroupAlgebra> {
    k: A::Scalar,
}

impl<A: GroupAlgebra> Zeroize for SchnorrNonce<A> {
    fn zeroize(&mut self) {
        self.k.zeroize();
    }
}

impl<A: GroupAlgebra> Drop for SchnorrNonce<A> {
    fn drop(&mut self) {
        self.k.zeroize();
    }
}

impl<A: GroupAlgebra> ZeroizeOnDrop for SchnorrNonce<A> {}

/// Third move: `z = k + c·x`.
#[derive(Clone, Debug)]
pub struct SchnorrResponse<A: GroupAlgebra> {
    z: A::Scalar,
}

impl<A: GroupAlgebra> SchnorrResponse<A> {
    pub fn z(&self) -> &A::Scalar {
        &self.z
    }
}

impl<A: GroupAlgebra> SigmaRelation for SchnorrRelation<A> {
    type Algebra = A;
    type Statement = SchnorrStatement<A>;
    type Witness = SchnorrWitness<A>;
    type Commitment = SchnorrCommitment<A>;
    type Nonce = SchnorrNonce<A>;
    type Response = SchnorrResponse<A>;

    fn algebra(&self) -> &A {
        &self.algebra
    }

    fn commit<R: CryptoRngCore>(
        &self,
        _statement: &Self::Statement,
        rng: &mut R,
    ) -> (Self::Commitment, Self::Nonce) {
        let k = self.algebra.sample(rng);
        let u = self.algebra.power(&self.algebra.generator(), &k);
        (SchnorrCommitment { u }, SchnorrNonce { k })
    }

    fn respond(
        &self,
        witness: &Self::Witness,
        nonce: Self::Nonce,
        challenge: &A::Scalar,
    ) -> Self::Response {
        let cx = self.algebra.scalar_mul(challenge, &witness.x);
        SchnorrResponse {
            z: self.algebra.scalar_add(&nonce.k, &cx),
        }
    }

    fn check(
        &self,
        statement: &Self::Statement,
        commitment: &Self::Commitment,
        challenge: &A::Scalar,
        response: &Self::Response,
    ) -> bool {
        // g^z == u * h^c
        let lhs = self.algebra.power(&self.algebra.generator(), &response.z);
        let hc = self.algebra.power(&statement.h, challenge);
        let rhs = self.algebra.combine(&commitment.u, &hc);
        self.algebra.equal(&lhs, &rhs)
    }

    fn encode_statement(&self, statement: &Self::Statement) -> Vec<Vec<u8>> {
        vec![self.algebra.element_to_bytes(&statement.h)]
    }

    fn decode_statement(&self, data: &[Vec<u8>]) -> Result<Self::Statement> {
        expect_parts(data, 1, "schnorr statement")?;
        let h = self.algebra.element_from_bytes(&data[0])?;
        if self.algebra.is_identity(&h) {
            return Err(Error::InvalidGroupElement(
                "statement is the identity element".to_string(),
            ));
        }
        Ok(SchnorrStatement { h })
    }

    fn encode_commitment(&self, commitment: &Self::Commitment) -> Vec<Vec<u8>> {
        vec![self.algebra.element_to_bytes(&commitment.u)]
    }

    fn decode_commitment(&self, data: &[Vec<u8>]) -> Result<Self::Commitment> {
        expect_parts(data, 1, "schnorr commitment")?;
        let u = self.algebra.element_from_bytes(&data[0])?;
        if self.algebra.is_identity(&u) {
            return Err(Error::InvalidGroupElement(
                "commitment is the identity element".to_string(),
            ));
        }
        Ok(SchnorrCommitment { u })
    }

    fn encode_response(&self, response: &Self::Response) -> Vec<Vec<u8>> {
        vec![self.algebra.scalar_to_bytes(&response.z)]
    }

    fn decode_response(&self, data: &[Vec<u8>]) -> Result<Self::Response> {
        expect_parts(data, 1, "schnorr response")?;
        Ok(SchnorrResponse {
            z: self.algebra.scalar_from_bytes(&data[0])?,
        })
    }
}
