/// The capability set every algebra implements.
pub mod algebra;
/// Modular arithmetic primitives.
pub mod field;
/// Cryptographically secure random number generation.
pub mod rng;

pub use algebra::GroupAlgebra;
pub use rng::SecureRng;
