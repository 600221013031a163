//! Temperature-dependent properties of moist air
//!
//! Linear and quadratic fits over the 0-50°C range used by the leaf and soil
//! energy balances, plus the Arden Buck saturation vapour pressure.
//!
//! # References
//! - Thornley, J.H.M. & Johnson, I.R. (1990). "Plant and Crop Modelling", Ch. 14
//! - Buck, A.L. (1981). "New equations for computing vapor pressure and
//!   enhancement factor". Journal of Applied Meteorology, 20(12), 1527-1532

use crate::core_types::units::Celsius;

/// Density of dry air (kg m⁻³)
pub fn dry_air_density(temperature: Celsius) -> f64 {
    1.295163636 - 0.004258182 * *temperature
}

/// Latent heat of vaporization of water (MJ kg⁻¹)
pub fn latent_heat_of_vaporization(temperature: Celsius) -> f64 {
    2.501 - 0.002372727 * *temperature
}

/// Slope of the saturation vapour density curve (g m⁻³ K⁻¹)
///
/// Multiply by 1e-3 for kg m⁻³ K⁻¹ as used in the Penman forms.
pub fn saturation_slope(temperature: Celsius) -> f64 {
    let t = *temperature;
    0.338376068 + 0.011435897 * t + 0.001111111 * t * t
}

/// Saturation vapour pressure over water (hPa), Arden Buck equation
///
/// # Examples
/// ```
/// use canopy_sim_core::core_types::units::Celsius;
/// use canopy_sim_core::physics::thermodynamics::saturation_vapor_pressure;
///
/// // 6.1121 hPa at the freezing point
/// assert!((saturation_vapor_pressure(Celsius::new(0.0)) - 6.1121).abs() < 1e-9);
/// ```
pub fn saturation_vapor_pressure(temperature: Celsius) -> f64 {
    let t = *temperature;
    let a = (18.678 - t / 234.5) * t;
    let b = 257.14 + t;
    6.1121 * (a / b).exp()
}
