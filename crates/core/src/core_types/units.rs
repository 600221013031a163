//! Semantic unit types for type-safe physical quantity handling
//!
//! This module provides newtype wrappers for the physical quantities that cross
//! module boundaries in the canopy and soil solvers, so that the recurring
//! µmol→mol, mmol→m/s and photon→watt conversions live in exactly one place.
//!
//! # Design Philosophy
//! - Every type wraps an `f64`; the solvers iterate to tolerances of 1e-8
//! - Implements common traits (Add, Sub, Mul, Div, Ord, Display, etc.)
//! - Provides explicit, named conversion methods between related types
//! - Serde support so parameter sets can be loaded from any format
//! - Total ordering via Ord trait (NaN handled as greater than all values)
//!
//! # Usage
//! ```
//! use canopy_sim_core::core_types::units::{Celsius, Kelvin, StomatalConductance};
//!
//! let temp = Celsius::new(25.0);
//! let kelvin: Kelvin = temp.into();
//! assert!((*kelvin - 298.15).abs() < 0.01);
//!
//! // 41 000 mmol m⁻² s⁻¹ of water vapour conductance is 1 m/s
//! let gs = StomatalConductance::new(41_000.0);
//! assert!((gs.to_meters_per_second() - 1.0).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Deref, Div, Mul, Neg, Sub};

// ============================================================================
// HELPER FUNCTIONS FOR TOTAL ORDERING
// ============================================================================

/// Compare f64 values with total ordering using Rust's built-in `total_cmp`
#[inline]
fn f64_total_cmp(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

/// Shared boilerplate for scalar unit newtypes: total ordering, `Deref` to the
/// raw value, conversions to and from `f64`, same-unit addition/subtraction
/// and scaling by a dimensionless factor.
macro_rules! scalar_unit {
    ($name:ident, $suffix:literal) => {
        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                f64_total_cmp(self.0, other.0)
            }
        }

        impl Deref for $name {
            type Target = f64;
            #[inline]
            fn deref(&self) -> &f64 {
                &self.0
            }
        }

        impl From<$name> for f64 {
            fn from(v: $name) -> f64 {
                v.0
            }
        }

        impl Add for $name {
            type Output = $name;
            fn add(self, rhs: $name) -> $name {
                $name(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = $name;
            fn sub(self, rhs: $name) -> $name {
                $name(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $name {
            type Output = $name;
            fn mul(self, rhs: f64) -> $name {
                $name(self.0 * rhs)
            }
        }

        impl Div<f64> for $name {
            type Output = $name;
            fn div(self, rhs: f64) -> $name {
                $name(self.0 / rhs)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:.3}{}", self.0, $suffix)
            }
        }
    };
}

// ============================================================================
// TEMPERATURE TYPES
// ============================================================================

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Celsius(f64);

impl Eq for Celsius {}

impl PartialOrd for Celsius {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Celsius {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Celsius {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Celsius {
    /// Absolute zero in Celsius
    pub const ABSOLUTE_ZERO: Celsius = Celsius(-273.15);

    /// Celsius to Kelvin conversion offset (0°C = 273.15 K)
    const CELSIUS_KELVIN_OFFSET: f64 = 273.15;

    /// Create a new Celsius temperature. Asserts value >= absolute zero (-273.15°C).
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(
            value >= -Self::CELSIUS_KELVIN_OFFSET,
            "Celsius::new: value is below absolute zero (-273.15°C)"
        );
        Celsius(value)
    }

    /// Convert to Kelvin
    #[inline]
    #[must_use]
    pub fn to_kelvin(self) -> Kelvin {
        Kelvin(self.0 + Self::CELSIUS_KELVIN_OFFSET)
    }
}

impl From<Celsius> for Kelvin {
    fn from(c: Celsius) -> Kelvin {
        c.to_kelvin()
    }
}

impl From<Celsius> for f64 {
    fn from(c: Celsius) -> f64 {
        c.0
    }
}

// Celsius + CelsiusDelta = Celsius (leaf temperature from air temperature and offset)
impl Add<CelsiusDelta> for Celsius {
    type Output = Celsius;
    fn add(self, rhs: CelsiusDelta) -> Celsius {
        Celsius::new(self.0 + rhs.0)
    }
}

// Celsius - Celsius = CelsiusDelta (difference between two absolute temperatures)
impl Sub for Celsius {
    type Output = CelsiusDelta;
    fn sub(self, rhs: Celsius) -> CelsiusDelta {
        CelsiusDelta(self.0 - rhs.0)
    }
}

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°C", self.0)
    }
}

/// Temperature difference/delta in Celsius
/// Can be any value (positive or negative)
/// Used for the leaf-to-air temperature offset of the energy balance
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct CelsiusDelta(f64);

scalar_unit!(CelsiusDelta, " K");

impl CelsiusDelta {
    /// Create a temperature delta (can be any value, positive or negative)
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        CelsiusDelta(value)
    }

    /// Absolute value of the delta
    #[inline]
    #[must_use]
    pub fn abs(self) -> Self {
        CelsiusDelta(self.0.abs())
    }
}

impl Neg for CelsiusDelta {
    type Output = CelsiusDelta;
    fn neg(self) -> CelsiusDelta {
        CelsiusDelta(-self.0)
    }
}

/// Temperature in Kelvin (absolute scale)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kelvin(f64);

scalar_unit!(Kelvin, " K");

impl Kelvin {
    /// Create a new Kelvin temperature. Asserts value >= absolute zero (0 K).
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(value >= 0.0, "Kelvin::new: value is below absolute zero (0 K)");
        Kelvin(value)
    }

    /// Convert to Celsius
    #[inline]
    #[must_use]
    pub fn to_celsius(self) -> Celsius {
        Celsius::new(self.0 - Celsius::CELSIUS_KELVIN_OFFSET)
    }
}

// ============================================================================
// SPATIAL TYPES
// ============================================================================

/// Distance in meters (canopy height, leaf width, soil depth)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Meters(f64);

scalar_unit!(Meters, " m");

impl Meters {
    /// Create a new distance in meters
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Meters(value)
    }
}

// ============================================================================
// VELOCITY TYPES
// ============================================================================

/// Velocity in meters per second
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MetersPerSecond(f64);

scalar_unit!(MetersPerSecond, " m/s");

impl MetersPerSecond {
    /// Create a new velocity
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        MetersPerSecond(value)
    }
}

// ============================================================================
// ANGLE TYPES
// ============================================================================

/// Angle in degrees (latitude)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Degrees(f64);

scalar_unit!(Degrees, "°");

impl Degrees {
    /// Create a new angle in degrees
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Degrees(value)
    }

    /// Convert to radians
    #[inline]
    #[must_use]
    pub fn to_radians(self) -> f64 {
        self.0.to_radians()
    }
}

// ============================================================================
// FRACTION/RATIO TYPES
// ============================================================================

/// A fraction in the range [0, 1]
/// Represents sunlit/shaded leaf fractions and water-stress coefficients
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Fraction(f64);

impl Eq for Fraction {}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Fraction {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Fraction {
    /// Zero fraction
    pub const ZERO: Fraction = Fraction(0.0);

    /// Full/complete (1.0)
    pub const ONE: Fraction = Fraction(1.0);

    /// Create a new fraction. Asserts value is within [0, 1].
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(
            value >= 0.0 && value <= 1.0,
            "Fraction::new: value not in [0, 1]"
        );
        Fraction(value)
    }

    /// Create a fraction by clamping into [0, 1]. NaN maps to zero.
    #[inline]
    #[must_use]
    pub fn saturating(value: f64) -> Self {
        if value.is_nan() {
            Fraction::ZERO
        } else {
            Fraction(value.clamp(0.0, 1.0))
        }
    }

    /// Complement `1 - self`
    #[inline]
    #[must_use]
    pub fn complement(self) -> Self {
        Fraction(1.0 - self.0)
    }
}

impl From<Fraction> for f64 {
    fn from(f: Fraction) -> f64 {
        f.0
    }
}

impl Mul<f64> for Fraction {
    type Output = f64;
    fn mul(self, rhs: f64) -> f64 {
        self.0 * rhs
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

// ============================================================================
// FLUX TYPES
// ============================================================================

/// Photosynthetic photon flux density in µmol m⁻² s⁻¹
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PhotonFlux(f64);

scalar_unit!(PhotonFlux, " µmol/m²/s");

impl PhotonFlux {
    /// Energy carried by one µmol of PAR photons (J)
    const JOULES_PER_MICROMOLE: f64 = 0.235;

    /// Create a new photon flux density
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        PhotonFlux(value)
    }

    /// Convert to mol m⁻² s⁻¹
    #[inline]
    #[must_use]
    pub fn to_mol_per_square_meter_second(self) -> f64 {
        self.0 * 1e-6
    }

    /// Convert to radiant flux density (W m⁻²) assuming 0.235 J per µmol
    #[inline]
    #[must_use]
    pub fn to_watts_per_square_meter(self) -> f64 {
        self.0 * Self::JOULES_PER_MICROMOLE
    }
}

/// Stomatal or layer conductance to water vapour in mmol m⁻² s⁻¹
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct StomatalConductance(f64);

scalar_unit!(StomatalConductance, " mmol/m²/s");

impl StomatalConductance {
    /// Molar-to-velocity factor for water vapour near 20°C
    /// (1 m/s ≈ 41 000 mmol m⁻² s⁻¹)
    const MMOL_PER_METER_PER_SECOND: f64 = 41_000.0;

    /// Create a new conductance in mmol m⁻² s⁻¹
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        StomatalConductance(value)
    }

    /// Build from a conductance expressed as a velocity (m/s)
    #[inline]
    #[must_use]
    pub fn from_meters_per_second(value: f64) -> Self {
        StomatalConductance(value * Self::MMOL_PER_METER_PER_SECOND)
    }

    /// Convert to a velocity (m/s)
    #[inline]
    #[must_use]
    pub fn to_meters_per_second(self) -> f64 {
        self.0 / Self::MMOL_PER_METER_PER_SECOND
    }

    /// Convert to mol m⁻² s⁻¹
    #[inline]
    #[must_use]
    pub fn to_mol_per_square_meter_second(self) -> f64 {
        self.0 * 1e-3
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_celsius_to_kelvin() {
        let c = Celsius(25.0);
        let k = c.to_kelvin();
        assert!((k.0 - 298.15).abs() < 0.01);
    }

    #[test]
    fn test_kelvin_to_celsius() {
        let k = Kelvin(273.15);
        let c = k.to_celsius();
        assert!((c.0 - 0.0).abs() < 0.01);
    }

    #[test]
    fn test_celsius_plus_delta() {
        let leaf = Celsius::new(25.0) + CelsiusDelta::new(-2.5);
        assert!((*leaf - 22.5).abs() < 1e-12);
        assert_eq!(Celsius::new(30.0) - Celsius::new(25.0), CelsiusDelta::new(5.0));
    }

    #[test]
    #[should_panic(expected = "Celsius::new: value is below absolute zero")]
    fn test_celsius_below_absolute_zero_panics() {
        let _ = Celsius::new(-300.0);
    }

    #[test]
    #[should_panic(expected = "Fraction::new: value not in [0, 1]")]
    fn test_fraction_new_panics_on_too_large() {
        let _ = Fraction::new(1.5);
    }

    #[test]
    fn test_fraction_saturating() {
        assert_eq!(Fraction::saturating(1.2), Fraction::ONE);
        assert_eq!(Fraction::saturating(-0.1), Fraction::ZERO);
        assert_eq!(Fraction::saturating(f64::NAN), Fraction::ZERO);
        assert_eq!(*Fraction::saturating(0.25).complement(), 0.75);
    }

    #[test]
    fn test_photon_flux_conversions() {
        let q = PhotonFlux::new(1000.0);
        assert!((q.to_watts_per_square_meter() - 235.0).abs() < 1e-9);
        assert!((q.to_mol_per_square_meter_second() - 1e-3).abs() < 1e-15);
    }

    #[test]
    fn test_conductance_velocity_round_trip() {
        let gs = StomatalConductance::new(250.0);
        let back = StomatalConductance::from_meters_per_second(gs.to_meters_per_second());
        assert!((*back - 250.0).abs() < 1e-9);
        assert!((gs.to_mol_per_square_meter_second() - 0.25).abs() < 1e-15);
    }

    #[test]
    fn test_total_ordering_allows_clamp() {
        let d = CelsiusDelta::new(12.0).clamp(CelsiusDelta::new(-10.0), CelsiusDelta::new(10.0));
        assert_eq!(d, CelsiusDelta::new(10.0));
        assert_eq!(Degrees::new(180.0).to_radians(), std::f64::consts::PI);
    }
}
