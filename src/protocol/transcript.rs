use merlin::Transcript as MerlinTranscript;

/// Protocol label for transcript initialization.
const PROTOCOL_LABEL: &[u8] = b"sigma-zkp v0.1.0";

/// Transcript wrapper for Fiat-Shamir challenge derivation.
///
/// Provides domain-separated challenge generation using Merlin. The label
/// passed to [`ProofTranscript::new`] keeps challenges from one protocol mode
/// or variant from being replayed in another.
pub struct ProofTranscript(MerlinTranscript);

impl ProofTranscript {
    /// Creates a transcript under a domain-separation label.
    pub fn new(label: &'static [u8]) -> Self {
        let mut transcript = MerlinTranscript::new(PROTOCOL_LABEL);
        transcript.append_message(b"protocol", label);
        Self(transcript)
    }

    /// Appends the algebra name so challenges never transfer between groups.
    pub fn append_algebra(&mut self, name: &str) {
        self.0.append_message(b"algebra", name.as_bytes());
    }

    /// Appends one encoded statement component.
    pub fn append_statement(&mut self, bytes: &[u8]) {
        self.0.append_message(b"statement", bytes);
    }

    /// Appends one encoded commitment component.
    pub fn append_commitment(&mut self, bytes: &[u8]) {
        self.0.append_message(b"commitment", bytes);
    }

    /// Produces 64 uniform bytes for wide challenge reduction.
    pub fn challenge_bytes(&mut self) -> [u8; 64] {
        let mut buffer = [0u8; 64];
        self.0.challenge_bytes(b"challenge", &mut buffer);
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_same_challenge() {
        let mut first = ProofTranscript::new(b"test");
        first.append_statement(b"y");
        first.append_commitment(b"u");

        let mut second = ProofTranscript::new(b"test");
        second.append_statement(b"y");
        second.append_commitment(b"u");

        assert_eq!(first.challenge_bytes(), second.challenge_bytes());
    }

    #[test]
    fn different_commitments_different_challenges() {
        let mut first = ProofTranscript::new(b"test");
        first.append_commitment(b"u");

        let mut second = ProofTranscript::new(b"test");
        second.append_commitment(b"u-prime");

        assert_ne!(first.challenge_bytes(), second.challenge_bytes());
    }

    #[test]
    fn labels_separate_domains() {
        let mut first = ProofTranscript::new(b"zkp");
        first.append_commitment(b"u");

        let mut second = ProofTranscript::new(b"zkpok");
        second.append_commitment(b"u");

        assert_ne!(first.challenge_bytes(), second.challenge_bytes());
    }
}
