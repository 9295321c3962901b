/// Paillier cryptosystem and its ciphertext group.
pub mod paillier;
/// Ristretto255 group implementation (fast, modern elliptic curve).
pub mod ristretto;
/// Multiplicative subgroup of Z_p* (RFC 5114 2048-bit defaults).
pub mod schnorr_group;

pub use paillier::{PaillierGroup, PaillierKeypair};
pub use ristretto::Ristretto255;
pub use schnorr_group::SchnorrGroup;
