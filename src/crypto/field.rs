use crypto_bigint::modular::{MontyForm, MontyParams};
use crypto_bigint::{InvMod, Odd, Uint, Zero};

use crate::{Error, Result};

/// Performs modular exponentiation using Montgomery form.
///
/// Computes `base^exp mod modulus` in constant time.
///
/// # Security Note
///
/// Uses `new_vartime` for parameter setup, which is acceptable because:
/// - The modulus is always public (group modulus or Paillier modulus)
/// - Timing variations occur only during setup, not during exponentiation
/// - The actual `pow()` operation is constant-time
pub fn mod_pow<const LIMBS: usize>(
    base: &Uint<LIMBS>,
    exp: &Uint<LIMBS>,
    modulus: &Uint<LIMBS>,
) -> Result<Uint<LIMBS>> {
    if modulus.is_zero().into() {
        return Err(Error::InvalidParams("modulus cannot be zero".to_string()));
    }

    let odd_modulus: Option<Odd<Uint<LIMBS>>> = Odd::new(*modulus).into();
    let odd_modulus = odd_modulus.ok_or_else(|| {
        Error::InvalidParams("modulus must be odd for Montgomery form".to_string())
    })?;

    let params = MontyParams::new_vartime(odd_modulus);
    let base_monty = MontyForm::new(base, params);
    let result = base_monty.pow(exp);
    Ok(result.retrieve())
}

/// Computes the modular inverse of `value` modulo an odd modulus.
///
/// Returns `Ok(None)` when no inverse exists (the value shares a factor with
/// the modulus).
pub fn mod_inv<const LIMBS: usize>(
    value: &Uint<LIMBS>,
    modulus: &Uint<LIMBS>,
) -> Result<Option<Uint<LIMBS>>>
where
    Uint<LIMBS>: InvMod<Output = Uint<LIMBS>>,
{
    if modulus.is_zero().into() {
        return Err(Error::InvalidParams("modulus cannot be zero".to_string()));
    }

    let odd_modulus: Option<Odd<Uint<LIMBS>>> = Odd::new(*modulus).into();
    let _odd_modulus = odd_modulus.ok_or_else(|| {
        Error::InvalidParams("modulus must be odd for Montgomery form".to_string())
    })?;

    let inverse = InvMod::inv_mod(value, modulus);
    Ok(Option::<Uint<LIMBS>>::from(inverse))
}

/// Zero-extends a value into a wider limb count.
pub fn widen<const LIMBS: usize, const WIDE: usize>(value: &Uint<LIMBS>) -> Uint<WIDE> {
    let mut wide = Uint::<WIDE>::ZERO;
    wide.as_limbs_mut()[..LIMBS].copy_from_slice(value.as_limbs());
    wide
}

/// Keeps the low limbs of a wider value. The caller guarantees the value fits.
pub fn truncate<const WIDE: usize, const LIMBS: usize>(value: &Uint<WIDE>) -> Uint<LIMBS> {
    let mut low = Uint::<LIMBS>::ZERO;
    let limbs = value.as_limbs();
    low.as_limbs_mut().copy_from_slice(&limbs[..LIMBS]);
    low
}
