/// Paillier ciphertext-consistency proof.
pub mod cspaillier;
/// Chaum-Pedersen discrete-log equality, plain and blinded-transcript forms.
pub mod dlog_equality;
/// Pedersen trapdoor commitments.
pub mod pedersen;
/// Pseudonym system built from linked Schnorr proofs.
pub mod pseudonym;
/// Schnorr proof of knowledge of a discrete log.
pub mod schnorr;
/// Shamir threshold secret sharing.
pub mod shamir;

use core::fmt;
use core::str::FromStr;

use crate::protocol::ProofMode;
use crate::Error;

/// Every protocol variant the engine can run, by its selector name.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Variant {
    Schnorr,
    SchnorrZkp,
    SchnorrZkpok,
    SchnorrEc,
    SchnorrEcZkp,
    SchnorrEcZkpok,
    Pedersen,
    PedersenEc,
    DlogEquality,
    DlogEqualityBlindedTranscript,
    Pseudonymsys,
    CsPaillier,
    SplitSecret,
}

impl Variant {
    /// All variants, in selector order.
    pub const ALL: [Variant; 13] = [
        Variant::Schnorr,
        Variant::SchnorrZkp,
        Variant::SchnorrZkpok,
        Variant::SchnorrEc,
        Variant::SchnorrEcZkp,
        Variant::SchnorrEcZkpok,
        Variant::Pedersen,
        Variant::PedersenEc,
        Variant::DlogEquality,
        Variant::DlogEqualityBlindedTranscript,
        Variant::Pseudonymsys,
        Variant::CsPaillier,
        Variant::SplitSecret,
    ];

    /// The selector name used on the CLI and as the wire tag.
    pub fn name(self) -> &'static str {
        match self {
            Variant::Schnorr => "schnorr",
            Variant::SchnorrZkp => "schnorr_zkp",
            Variant::SchnorrZkpok => "schnorr_zkpok",
            Variant::SchnorrEc => "schnorr_ec",
            Variant::SchnorrEcZkp => "schnorr_ec_zkp",
            Variant::SchnorrEcZkpok => "schnorr_ec_zkpok",
            Variant::Pedersen => "pedersen",
            Variant::PedersenEc => "pedersen_ec",
            Variant::DlogEquality => "dlog_equality",
            Variant::DlogEqualityBlindedTranscript => "dlog_equality_blinded_transcript",
            Variant::Pseudonymsys => "pseudonymsys",
            Variant::CsPaillier => "cspaillier",
            Variant::SplitSecret => "split_secret",
        }
    }

    /// How this variant derives its challenge.
    pub fn mode(self) -> ProofMode {
        match self {
            Variant::SchnorrZkp | Variant::SchnorrEcZkp => ProofMode::Zkp,
            Variant::SchnorrZkpok | Variant::SchnorrEcZkpok => ProofMode::Zkpok,
            _ => ProofMode::Interactive,
        }
    }

    /// Variants that drive both roles inside one process; the role selector
    /// is ignored for them.
    pub fn is_local(self) -> bool {
        matches!(
            self,
            Variant::DlogEquality
                | Variant::DlogEqualityBlindedTranscript
                | Variant::Pseudonymsys
                | Variant::SplitSecret
        )
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .iter()
            .copied()
            .find(|variant| variant.name() == s)
            .ok_or_else(|| Error::UnknownVariant(s.to_string()))
    }
}

/// Checks the part count of a wire payload before element-wise decoding.
pub(crate) fn expect_parts(data: &[Vec<u8>], expected: usize, what: &str) -> crate::Result<()> {
    if data.len() != expected {
        return Err(Error::ProtocolViolation(format!(
            "{what} carries {} parts, expected {expected}",
            data.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for variant in Variant::ALL {
            assert_eq!(variant.name().parse::<Variant>().unwrap(), variant);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!(matches!(
            "schnorr_ecc".parse::<Variant>(),
            Err(Error::UnknownVariant(_))
        ));
    }

    #[test]
    fn zkp_variants_are_non_interactive() {
        assert!(!Variant::SchnorrZkp.mode().is_interactive());
        assert!(!Variant::SchnorrEcZkpok.mode().is_interactive());
        assert!(Variant::Schnorr.mode().is_interactive());
        assert!(Variant::Pedersen.mode().is_interactive());
    }
}
