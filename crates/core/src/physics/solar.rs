//! Solar geometry and the above-canopy light environment
//!
//! Computes the cosine of the solar zenith angle from latitude, day of year
//! and local solar hour, then partitions incoming irradiance into direct and
//! diffuse fractions from the atmospheric path length.
//!
//! # Scientific References
//! - Campbell, G.S. & Norman, J.M. (1998). "An Introduction to Environmental
//!   Biophysics", 2nd ed., Ch. 11 (eqs. 11.1-11.13)

use crate::core_types::units::{Degrees, Fraction};
use serde::{Deserialize, Serialize};

/// Earth's axial tilt (degrees)
const AXIAL_TILT: f64 = 23.5;

/// Hour of solar noon
const SOLAR_NOON: f64 = 12.0;

/// Hour angle per hour of time (degrees)
const DEGREES_PER_HOUR: f64 = 15.0;

/// Clear-sky atmospheric transmittance
const ATMOSPHERIC_TRANSMITTANCE: f64 = 0.85;

/// Proportion of attenuated beam that reaches the ground as diffuse light
const SCATTERED_PROPORTION: f64 = 0.3;

/// Direct/diffuse partitioning of above-canopy irradiance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightMacroEnvironment {
    /// Fraction of irradiance arriving as direct beam
    pub direct_fraction: Fraction,
    /// Fraction of irradiance arriving as diffuse sky light
    pub diffuse_fraction: Fraction,
    /// Cosine of the solar zenith angle (1 with the sun overhead)
    pub cos_zenith: f64,
}

/// Cosine of the solar zenith angle
///
/// # Arguments
/// * `latitude` - Site latitude (degrees, north positive)
/// * `day_of_year` - Day of year (1-365)
/// * `hour` - Local solar time (hours, 12 = solar noon)
///
/// # Returns
/// cos θ, negative when the sun is below the horizon
pub fn cos_zenith_angle(latitude: Degrees, day_of_year: u16, hour: f64) -> f64 {
    let phi = latitude.to_radians();
    let days_since_solstice = f64::from(day_of_year) + 10.0;
    let omega = (360.0 * days_since_solstice / 365.0).to_radians();
    let declination = -AXIAL_TILT.to_radians() * omega.cos();
    let hour_angle = ((hour - SOLAR_NOON) * DEGREES_PER_HOUR).to_radians();

    declination.sin() * phi.sin() + declination.cos() * phi.cos() * hour_angle.cos()
}

/// Partition above-canopy irradiance into direct and diffuse fractions
///
/// With the sun at or below the horizon all light is diffuse. Otherwise the
/// direct transmittance is `0.85^(1/cosθ)` (Campbell & Norman eq. 11.11) and
/// the diffuse transmittance is `0.3·(1 - direct)·cosθ` (eq. 11.13); the two
/// are normalised to fractions summing to one.
pub fn light_macro_environment(
    latitude: Degrees,
    day_of_year: u16,
    hour: f64,
) -> LightMacroEnvironment {
    let cos_zenith = cos_zenith_angle(latitude, day_of_year, hour);

    let (direct, diffuse) = if cos_zenith <= 0.0 {
        (0.0, 1.0)
    } else {
        let direct = ATMOSPHERIC_TRANSMITTANCE.powf(1.0 / cos_zenith);
        (direct, SCATTERED_PROPORTION * (1.0 - direct) * cos_zenith)
    };

    let total = direct + diffuse;
    LightMacroEnvironment {
        direct_fraction: Fraction::saturating(direct / total),
        diffuse_fraction: Fraction::saturating(diffuse / total),
        cos_zenith,
    }
}
