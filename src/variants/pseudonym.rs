use rand_core::CryptoRngCore;
use zeroize::Zeroize;

use super::dlog_equality::{DlogEqualityStatement, DlogEqualityWitness};
use crate::crypto::GroupAlgebra;

/// A context-specific pseudonym `(a, b) = (g^γ, a^s)`.
///
/// Fresh `γ` per context makes pseudonyms unlinkable; the shared exponent `s`
/// ties each one to the holder's master key.
#[derive(Clone, Debug)]
pub struct Pseudonym<A: GroupAlgebra> {
    a: A::Element,
    b: A::Element,
}

impl<A: GroupAlgebra> Pseudonym<A> {
    pub fn a(&self) -> &A::Element {
        &self.a
    }

    pub fn b(&self) -> &A::Element {
        &self.b
    }
}

/// Long-term user credential: secret `s`, public key `h = g^s`.
pub struct MasterKey<A: GroupAlgebra> {
    secret: A::Scalar,
    public: A::Element,
}

impl<A: GroupAlgebra> MasterKey<A> {
    pub fn generate<R: CryptoRngCore>(algebra: &A, rng: &mut R) -> Self {
        let secret = algebra.sample(rng);
        let public = algebra.power(&algebra.generator(), &secret);
        Self { secret, public }
    }

    pub fn public(&self) -> &A::Element {
        &self.public
    }

    /// Derives a fresh pseudonym bound to this key.
    pub fn new_pseudonym<R: CryptoRngCore>(&self, algebra: &A, rng: &mut R) -> Pseudonym<A> {
        let gamma = algebra.sample(rng);
        let a = algebra.power(&algebra.generator(), &gamma);
        let b = algebra.power(&a, &self.secret);
        Pseudonym { a, b }
    }

    /// The claim registered with a verifier: `log_g(h) = log_a(b)` — two
    /// linked Schnorr instances sharing the master secret.
    pub fn registration_statement(
        &self,
        algebra: &A,
        pseudonym: &Pseudonym<A>,
    ) -> DlogEqualityStatement<A> {
        DlogEqualityStatement::new(
            algebra.generator(),
            self.public.clone(),
            pseudonym.a.clone(),
            pseudonym.b.clone(),
        )
    }

    /// The witness for [`MasterKey::registration_statement`].
    pub fn registration_witness(&self) -> DlogEqualityWitness<A> {
        DlogEqualityWitness::new(self.secret.clone())
    }
}

impl<A: GroupAlgebra> Drop for MasterKey<A> {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SecureRng;
    use crate::groups::SchnorrGroup;
    use crate::protocol::{SigmaProver, SigmaRelation, SigmaVerifier};
    use crate::variants::dlog_equality::DlogEqualityRelation;

    #[test]
    fn registration_proof_accepts() {
        let mut rng = SecureRng::new();
        let group = SchnorrGroup::rfc5114();
        let key = MasterKey::generate(&group, &mut rng);
        let pseudonym = key.new_pseudonym(&group, &mut rng);

        let relation = DlogEqualityRelation::new(group);
        let statement = key.registration_statement(relation.algebra(), &pseudonym);
        let witness = key.registration_witness();

        let mut prover = SigmaProver::new(relation.clone(), statement.clone(), witness);
        let mut verifier = SigmaVerifier::new(relation, statement);

        let commitment = prover.commit(&mut rng).unwrap();
        let challenge = verifier.receive_commitment(commitment, &mut rng).unwrap();
        let response = prover.respond(&challenge).unwrap();
        assert!(verifier.verify(&response).unwrap());
    }

    #[test]
    fn stolen_pseudonym_does_not_verify() {
        let mut rng = SecureRng::new();
        let group = SchnorrGroup::rfc5114();
        let owner = MasterKey::generate(&group, &mut rng);
        let thief = MasterKey::generate(&group, &mut rng);
        let pseudonym = owner.new_pseudonym(&group, &mut rng);

        let relation = DlogEqualityRelation::new(group);
        // the thief claims the owner's pseudonym under its own key
        let statement = thief.registration_statement(relation.algebra(), &pseudonym);
        let witness = thief.registration_witness();

        let mut prover = SigmaProver::new(relation.clone(), statement.clone(), witness);
        let mut verifier = SigmaVerifier::new(relation, statement);

        let commitment = prover.commit(&mut rng).unwrap();
        let challenge = verifier.receive_commitment(commitment, &mut rng).unwrap();
        let response = prover.respond(&challenge).unwrap();
        assert!(!verifier.verify(&response).unwrap());
    }

    #[test]
    fn pseudonyms_are_unlinkable_in_form() {
        let mut rng = SecureRng::new();
        let group = SchnorrGroup::rfc5114();
        let key = MasterKey::generate(&group, &mut rng);

        let first = key.new_pseudonym(&group, &mut rng);
        let second = key.new_pseudonym(&group, &mut rng);
        assert!(!group.equal(first.a(), second.a()));
        assert!(!group.equal(first.b(), second.b()));
    }
}
