//! Diagram geometry in English Metric Units.
//!
//! Office drawing markup measures everything in EMU: 914 400 per inch,
//! 360 000 per centimetre. Diagrams only need an outer extent; the layout
//! inside it is computed by the viewer from the static layout part.

use serde::Deserialize;

/// English Metric Units per inch.
pub const EMU_PER_INCH: u64 = 914_400;

/// English Metric Units per centimetre.
pub const EMU_PER_CM: u64 = 360_000;

/// Width and height of an inline diagram, in EMU.
///
/// # Examples
///
/// ```
/// use smartart_core::geometry::Extent;
///
/// let extent = Extent::from_inches(6.0, 3.5);
/// assert_eq!(extent.width(), 5_486_400);
/// assert_eq!(extent.height(), 3_200_400);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct Extent {
    width: u64,
    height: u64,
}

impl Extent {
    /// Creates an extent from raw EMU values.
    pub const fn new(width: u64, height: u64) -> Self {
        Self { width, height }
    }

    /// Creates an extent from inches, rounding to the nearest EMU.
    pub fn from_inches(width: f64, height: f64) -> Self {
        Self::new(inches_to_emu(width), inches_to_emu(height))
    }

    /// Creates an extent from centimetres, rounding to the nearest EMU.
    pub fn from_cm(width: f64, height: f64) -> Self {
        Self::new(
            (width.max(0.0) * EMU_PER_CM as f64).round() as u64,
            (height.max(0.0) * EMU_PER_CM as f64).round() as u64,
        )
    }

    pub fn width(&self) -> u64 {
        self.width
    }

    pub fn height(&self) -> u64 {
        self.height
    }
}

impl Default for Extent {
    /// 6.0 × 3.5 inches.
    fn default() -> Self {
        Self::new(5_486_400, 3_200_400)
    }
}

fn inches_to_emu(inches: f64) -> u64 {
    (inches.max(0.0) * EMU_PER_INCH as f64).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extent_is_six_by_three_and_a_half_inches() {
        assert_eq!(Extent::default(), Extent::from_inches(6.0, 3.5));
    }

    #[test]
    fn test_from_cm() {
        let extent = Extent::from_cm(10.0, 2.5);
        assert_eq!(extent.width(), 3_600_000);
        assert_eq!(extent.height(), 900_000);
    }

    #[test]
    fn test_negative_inches_clamp_to_zero() {
        let extent = Extent::from_inches(-1.0, 1.0);
        assert_eq!(extent.width(), 0);
        assert_eq!(extent.height(), EMU_PER_INCH);
    }
}
