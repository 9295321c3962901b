use crypto_bigint::Encoding;
use rand_core::CryptoRngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::expect_parts;
use crate::crypto::GroupAlgebra;
use crate::groups::paillier::{Element, PaillierGroup, Scalar};
use crate::protocol::SigmaRelation;
use crate::{Error, Result};

/// Ciphertext-consistency proof for Paillier: the prover knows a plaintext
/// `m` and randomizer `r` with `c = (1+n)^m * r^n mod n²`, without revealing
/// either.
///
/// Moves: commit `u = (1+n)^a * s^n`; respond `z1 = a + e·m mod n`,
/// `z2 = s * r^e mod n`; verify `(1+n)^z1 * z2^n == u * c^e (mod n²)`.
/// Challenges stay in the 128-bit domain of [`PaillierGroup`], below both
/// prime factors of n.
#[derive(Clone, Debug)]
pub struct CiphertextRelation {
    algebra: PaillierGroup,
}

impl CiphertextRelation {
    pub fn new(algebra: PaillierGroup) -> Self {
        Self { algebra }
    }

    /// Encrypts `message` and packages the resulting statement/witness pair.
    pub fn encrypt_statement<R: CryptoRngCore>(
        &self,
        message: Scalar,
        rng: &mut R,
    ) -> (CiphertextStatement, CiphertextWitness) {
        let (ciphertext, randomizer) = self.algebra.encrypt(&message, rng);
        (
            CiphertextStatement { ciphertext },
            CiphertextWitness {
                plaintext: message,
                randomness: randomizer,
            },
        )
    }
}

/// The public ciphertext whose consistency is being proven.
#[derive(Clone, Debug)]
pub struct CiphertextStatement {
    ciphertext: Element,
}

impl CiphertextStatement {
    pub fn new(ciphertext: Element) -> Self {
        Self { ciphertext }
    }

    pub fn ciphertext(&self) -> &Element {
        &self.ciphertext
    }
}

/// The plaintext and encryption randomizer. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CiphertextWitness {
    plaintext: Scalar,
    randomness: Scalar,
}

impl CiphertextWitness {
    pub fn new(plaintext: Scalar, randomness: Scalar) -> Self {
        Self {
            plaintext,
            randomness,
        }
    }
}

/// First move: a fresh encryption of a random value.
#[derive(Clone, Debug)]
pub struct CiphertextCommitment {
    u: Element,
}

impl CiphertextCommitment {
    pub fn u(&self) -> &Element {
        &self.u
    }
}

/// Ephemeral commitment randomness. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CiphertextNonce {
    a: Scalar,
    s: Scalar,
}

/// Third move: the masked plaintext and randomizer.
#[derive(Clone, Debug)]
pub struct CiphertextResponse {
    z1: Scalar,
    z2: Scalar,
}

impl CiphertextResponse {
    pub fn z1(&self) -> &Scalar {
        &self.z1
    }

    pub fn z2(&self) -> &Scalar {
        &self.z2
    }
}

impl SigmaRelation for CiphertextRelation {
    type Algebra = PaillierGroup;
    type Statement = CiphertextStatement;
    type Witness = CiphertextWitness;
    type Commitment = CiphertextCommitment;
    type Nonce = CiphertextNonce;
    type Response = CiphertextResponse;

    fn algebra(&self) -> &PaillierGroup {
        &self.algebra
    }

    fn commit<R: CryptoRngCore>(
        &self,
        _statement: &Self::Statement,
        rng: &mut R,
    ) -> (Self::Commitment, Self::Nonce) {
        let a = self.algebra.sample(rng);
        let s = self.algebra.sample_unit(rng);
        let u = self.algebra.encrypt_with(&a, &s);
        (CiphertextCommitment { u }, CiphertextNonce { a, s })
    }

    fn respond(
        &self,
        witness: &Self::Witness,
        nonce: Self::Nonce,
        challenge: &Scalar,
    ) -> Self::Response {
        let em = self.algebra.scalar_mul(challenge, &witness.plaintext);
        let z1 = self.algebra.scalar_add(&nonce.a, &em);
        let r_to_e = self.algebra.scalar_pow(&witness.randomness, challenge);
        let z2 = self.algebra.scalar_mul(&nonce.s, &r_to_e);
        CiphertextResponse { z1, z2 }
    }

    fn check(
        &self,
        statement: &Self::Statement,
        commitment: &Self::Commitment,
        challenge: &Scalar,
        response: &Self::Response,
    ) -> bool {
        // (1+n)^z1 * z2^n == u * c^e (mod n²)
        let lhs = self.algebra.encrypt_with(&response.z1, &response.z2);
        let ce = self.algebra.power(&statement.ciphertext, challenge);
        let rhs = self.algebra.combine(&commitment.u, &ce);
        self.algebra.equal(&lhs, &rhs)
    }

    fn encode_statement(&self, statement: &Self::Statement) -> Vec<Vec<u8>> {
        vec![
            self.algebra.modulus().to_be_bytes().to_vec(),
            self.algebra.element_to_bytes(&statement.ciphertext),
        ]
    }

    fn decode_statement(&self, data: &[Vec<u8>]) -> Result<Self::Statement> {
        expect_parts(data, 2, "ciphertext statement")?;
        if data[0] != self.algebra.modulus().to_be_bytes().to_vec() {
            return Err(Error::InvalidParams(
                "statement modulus does not match the configured public key".to_string(),
            ));
        }
        Ok(CiphertextStatement {
            ciphertext: self.algebra.element_from_bytes(&data[1])?,
        })
    }

    fn encode_commitment(&self, commitment: &Self::Commitment) -> Vec<Vec<u8>> {
        vec![self.algebra.element_to_bytes(&commitment.u)]
    }

    fn decode_commitment(&self, data: &[Vec<u8>]) -> Result<Self::Commitment> {
        expect_parts(data, 1, "ciphertext commitment")?;
        Ok(CiphertextCommitment {
            u: self.algebra.element_from_bytes(&data[0])?,
        })
    }

    fn encode_response(&self, response: &Self::Response) -> Vec<Vec<u8>> {
        vec![
            self.algebra.scalar_to_bytes(&response.z1),
            self.algebra.scalar_to_bytes(&response.z2),
        ]
    }

    fn decode_response(&self, data: &[Vec<u8>]) -> Result<Self::Response> {
        expect_parts(data, 2, "ciphertext response")?;
        Ok(CiphertextResponse {
            z1: self.algebra.scalar_from_bytes(&data[0])?,
            z2: self.algebra.scalar_from_bytes(&data[1])?,
        })
    }
}
