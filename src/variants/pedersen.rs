use rand_core::CryptoRngCore;
use zeroize::Zeroize;

use crate::crypto::GroupAlgebra;
use crate::protocol::VerifierStage;
use crate::{Error, Result};

/// Receiver side of a Pedersen commitment.
///
/// Samples the trapdoor `a` and publishes the commitment base `h = g^a`;
/// the committer must not know `a`, which is why the receiver generates it.
/// Unlike the three-move sigma protocols there is no challenge: the opening
/// collapses commitment and response into a single reveal.
pub struct PedersenReceiver<A: GroupAlgebra> {
    algebra: A,
    trapdoor: A::Scalar,
    h: A::Element,
    commitment: Option<A::Element>,
    stage: VerifierStage,
}

impl<A: GroupAlgebra> PedersenReceiver<A> {
    pub fn new<R: CryptoRngCore>(algebra: A, rng: &mut R) -> Self {
        let trapdoor = algebra.sample(rng);
        let h = algebra.power(&algebra.generator(), &trapdoor);
        Self {
            algebra,
            trapdoor,
            h,
            commitment: None,
            stage: VerifierStage::AwaitingCommitment,
        }
    }

    pub fn algebra(&self) -> &A {
        &self.algebra
    }

    pub fn stage(&self) -> VerifierStage {
        self.stage
    }

    /// The commitment base `h` sent to the committer.
    pub fn commitment_base(&self) -> &A::Element {
        &self.h
    }

    /// Stores the committer's value `c = g^m * h^r`.
    pub fn receive_commitment(&mut self, commitment: A::Element) -> Result<()> {
        match self.stage {
            VerifierStage::AwaitingCommitment => {}
            VerifierStage::AwaitingResponse => {
                self.stage = VerifierStage::Aborted;
                return Err(Error::ProtocolViolation(
                    "duplicate commitment in one session".to_string(),
                ));
            }
            stage => {
                return Err(Error::ProtocolViolation(format!(
                    "commitment is not a valid move in stage {stage:?}"
                )));
            }
        }

        self.commitment = Some(commitment);
        self.stage = VerifierStage::AwaitingResponse;
        Ok(())
    }

    /// Checks a revealed `(message, randomness)` opening against the stored
    /// commitment. `Ok(false)` means the opening does not match.
    pub fn check_opening(&mut self, message: &A::Scalar, randomness: &A::Scalar) -> Result<bool> {
        match self.stage {
            VerifierStage::AwaitingResponse => {}
            VerifierStage::AwaitingCommitment => {
                self.stage = VerifierStage::Aborted;
                return Err(Error::ProtocolViolation(
                    "opening received before any commitment".to_string(),
                ));
            }
            stage => {
                return Err(Error::ProtocolViolation(format!(
                    "opening is not a valid move in stage {stage:?}"
                )));
            }
        }

        let commitment = self
            .commitment
            .take()
            .unwrap_or_else(|| unreachable!("a receiver past the commitment move stores it"));

        let expected = self.algebra.combine(
            &self.algebra.power(&self.algebra.generator(), message),
            &self.algebra.power(&self.h, randomness),
        );

        self.stage = VerifierStage::Completed;
        Ok(self.algebra.equal(&commitment, &expected))
    }
}

impl<A: GroupAlgebra> Drop for PedersenReceiver<A> {
    fn drop(&mut self) {
        self.trapdoor.zeroize();
    }
}

/// Committer side of a Pedersen commitment: binds to a message now, reveals
/// the opening later.
pub struct PedersenCommitter<A: GroupAlgebra> {
    algebra: A,
    message: A::Scalar,
    randomness: A::Scalar,
}

impl<A: GroupAlgebra> PedersenCommitter<A> {
    /// Commits to `message` under the receiver's base `h`, returning the
    /// committer state and the commitment `c = g^m * h^r`.
    pub fn commit<R: CryptoRngCore>(
        algebra: A,
        h: &A::Element,
        message: A::Scalar,
        rng: &mut R,
    ) -> (Self, A::Element) {
        let randomness = algebra.sample(rng);
        let commitment = algebra.combine(
            &algebra.power(&algebra.generator(), &message),
            &algebra.power(h, &randomness),
        );
        (
            Self {
                algebra,
                message,
                randomness,
            },
            commitment,
        )
    }

    /// Reveals the opening.
    pub fn open(&self) -> (&A::Scalar, &A::Scalar) {
        (&self.message, &self.randomness)
    }

    pub fn algebra(&self) -> &A {
        &self.algebra
    }
}

impl<A: GroupAlgebra> Drop for PedersenCommitter<A> {
    fn drop(&mut self) {
        self.message.zeroize();
        self.randomness.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SecureRng;
    use crate::groups::{Ristretto255, SchnorrGroup};

    fn open_round_trip<A: GroupAlgebra>(algebra: A) {
        let mut rng = SecureRng::new();
        let mut receiver = PedersenReceiver::new(algebra.clone(), &mut rng);

        let message = algebra.sample(&mut rng);
        let (committer, commitment) = PedersenCommitter::commit(
            algebra,
            receiver.commitment_base(),
            message,
            &mut rng,
        );

        receiver.receive_commitment(commitment).unwrap();
        let (m, r) = committer.open();
        assert!(receiver.check_opening(m, r).unwrap());
    }

    #[test]
    fn opening_verifies_modp() {
        open_round_trip(SchnorrGroup::rfc5114());
    }

    #[test]
    fn opening_verifies_ristretto() {
        open_round_trip(Ristretto255::new());
    }

    #[test]
    fn wrong_message_is_rejected() {
        let algebra = Ristretto255::new();
        let mut rng = SecureRng::new();
        let mut receiver = PedersenReceiver::new(algebra.clone(), &mut rng);

        let message = algebra.sample(&mut rng);
        let (committer, commitment) = PedersenCommitter::commit(
            algebra.clone(),
            receiver.commitment_base(),
            message,
            &mut rng,
        );

        receiver.receive_commitment(commitment).unwrap();
        let (_, r) = committer.open();
        let other = algebra.sample(&mut rng);
        assert!(!receiver.check_opening(&other, r).unwrap());
    }

    #[test]
    fn opening_before_commitment_is_a_violation() {
        let algebra = Ristretto255::new();
        let mut rng = SecureRng::new();
        let mut receiver = PedersenReceiver::new(algebra.clone(), &mut rng);

        let m = algebra.sample(&mut rng);
        let r = algebra.sample(&mut rng);
        assert!(receiver.check_opening(&m, &r).is_err());
        assert_eq!(receiver.stage(), VerifierStage::Aborted);
    }

    #[test]
    fn second_opening_is_a_violation() {
        let algebra = Ristretto255::new();
        let mut rng = SecureRng::new();
        let mut receiver = PedersenReceiver::new(algebra.clone(), &mut rng);

        let message = algebra.sample(&mut rng);
        let (committer, commitment) = PedersenCommitter::commit(
            algebra,
            receiver.commitment_base(),
            message,
            &mut rng,
        );

        receiver.receive_commitment(commitment).unwrap();
        let (m, r) = committer.open();
        assert!(receiver.check_opening(m, r).unwrap());
        assert!(receiver.check_opening(m, r).is_err());
    }
}
