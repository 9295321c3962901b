use rand_core::CryptoRngCore;

use crate::crypto::GroupAlgebra;
use crate::{Error, Result};

/// One Shamir share: the dealer polynomial evaluated at `index`.
///
/// Shares persist as plain `(index, value-bytes)` pairs via
/// [`SecretShare::to_bytes`]; index uniqueness is the only ordering
/// requirement.
#[derive(Clone, Debug)]
pub struct SecretShare<A: GroupAlgebra> {
    index: u32,
    value: A::Scalar,
}

impl<A: GroupAlgebra> SecretShare<A> {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn value(&self) -> &A::Scalar {
        &self.value
    }

    /// The persisted form of a share.
    pub fn to_bytes(&self, algebra: &A) -> (u32, Vec<u8>) {
        (self.index, algebra.scalar_to_bytes(&self.value))
    }

    /// Rebuilds a share from its persisted form.
    pub fn from_bytes(algebra: &A, index: u32, bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            index,
            value: algebra.scalar_from_bytes(bytes)?,
        })
    }
}

/// Splits `secret` into `total` shares, any `threshold` of which reconstruct
/// it. The polynomial coefficients above the constant term are drawn from
/// `rng`; fewer than `threshold` shares reveal nothing about the secret.
pub fn split<A: GroupAlgebra, R: CryptoRngCore>(
    algebra: &A,
    secret: &A::Scalar,
    total: u32,
    threshold: u32,
    rng: &mut R,
) -> Result<Vec<SecretShare<A>>> {
    if threshold < 1 || total < 2 || threshold > total {
        return Err(Error::InvalidParams(format!(
            "invalid sharing of {total} shares with threshold {threshold}"
        )));
    }

    let mut coefficients = vec![secret.clone()];
    for _ in 1..threshold {
        coefficients.push(algebra.sample(rng));
    }

    Ok((1..=total)
        .map(|index| {
            let x = algebra.scalar_from_u64(u64::from(index));
            SecretShare {
                index,
                value: evaluate(algebra, &coefficients, &x),
            }
        })
        .collect())
}

/// Reconstructs the secret from at least `threshold` shares by Lagrange
/// interpolation at zero.
///
/// Returns [`Error::InsufficientShares`] below the threshold — it never
/// interpolates a plausible-looking wrong secret from too few shares.
pub fn reconstruct<A: GroupAlgebra>(
    algebra: &A,
    shares: &[SecretShare<A>],
    threshold: u32,
) -> Result<A::Scalar> {
    if shares.len() < threshold as usize {
        return Err(Error::InsufficientShares {
            threshold: threshold as usize,
            provided: shares.len(),
        });
    }

    let shares = &shares[..threshold as usize];
    for (position, share) in shares.iter().enumerate() {
        if share.index == 0 {
            return Err(Error::InvalidParams(
                "share index must be non-zero".to_string(),
            ));
        }
        if shares[..position].iter().any(|other| other.index == share.index) {
            return Err(Error::InvalidParams(format!(
                "duplicate share index {}",
                share.index
            )));
        }
    }

    let mut secret = algebra.scalar_from_u64(0);
    for share in shares {
        let xi = algebra.scalar_from_u64(u64::from(share.index));
        let mut basis = algebra.scalar_from_u64(1);

        for other in shares {
            if other.index == share.index {
                continue;
            }
            let xj = algebra.scalar_from_u64(u64::from(other.index));
            let difference = algebra.scalar_sub(&xj, &xi);
            let inverse = algebra.scalar_invert(&difference).ok_or_else(|| {
                Error::InvalidParams("share indices collide in the scalar field".to_string())
            })?;
            basis = algebra.scalar_mul(&basis, &algebra.scalar_mul(&xj, &inverse));
        }

        secret = algebra.scalar_add(&secret, &algebra.scalar_mul(&share.value, &basis));
    }

    Ok(secret)
}

// Horner evaluation of the dealer polynomial.
fn evaluate<A: GroupAlgebra>(algebra: &A, coefficients: &[A::Scalar], x: &A::Scalar) -> A::Scalar {
    let mut iter = coefficients.iter().rev();
    let mut accumulator = match iter.next() {
        Some(top) => top.clone(),
        None => return algebra.scalar_from_u64(0),
    };
    for coefficient in iter {
        accumulator = algebra.scalar_add(&algebra.scalar_mul(&accumulator, x), coefficient);
    }
    accumulator
}
