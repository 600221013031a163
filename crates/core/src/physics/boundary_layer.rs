//! Leaf boundary-layer conductance to water vapour
//!
//! Forced and free convection estimates after Nikolov, Massman & Schoettle;
//! the larger of the two controls exchange.
//!
//! # References
//! - Nikolov, N.T., Massman, W.J. & Schoettle, A.W. (1995). "Coupling
//!   biochemical and biophysical processes at the leaf level: an equilibrium
//!   photosynthesis model for leaves of C3 plants". Ecological Modelling, 80,
//!   205-235 (eqs. 29-35)

use super::thermodynamics::saturation_vapor_pressure;
use crate::core_types::units::{Celsius, CelsiusDelta, Meters, MetersPerSecond};

/// Atmospheric pressure (Pa)
const ATMOSPHERIC_PRESSURE: f64 = 101_325.0;

/// Conductance coefficient for water vapour (m s⁻¹ K^-0.56 ...)
const CONDUCTANCE_COEFFICIENT: f64 = 1.6361e-3;

/// Boundary-layer conductance to water vapour (m s⁻¹)
///
/// # Arguments
/// * `wind_speed` - Wind speed at the leaf
/// * `leaf_width` - Characteristic leaf dimension
/// * `air_temperature` - Air temperature
/// * `leaf_offset` - Leaf minus air temperature
/// * `stomatal_conductance` - Stomatal conductance to vapour (m s⁻¹)
/// * `vapor_pressure` - Ambient vapour pressure (hPa)
pub fn leaf_boundary_layer_conductance(
    wind_speed: MetersPerSecond,
    leaf_width: Meters,
    air_temperature: Celsius,
    leaf_offset: CelsiusDelta,
    stomatal_conductance: f64,
    vapor_pressure: f64,
) -> f64 {
    let p = ATMOSPHERIC_PRESSURE;
    let cf = CONDUCTANCE_COEFFICIENT;
    let leaf_temperature = air_temperature + leaf_offset;

    let tak = *air_temperature.to_kelvin();
    let tlk = *leaf_temperature.to_kelvin();
    let ea = vapor_pressure * 1e2;
    let es_leaf = saturation_vapor_pressure(leaf_temperature) * 1e2;
    let gsv = stomatal_conductance;

    let forced = cf * tak.powf(0.56) * ((tak + 120.0) * (*wind_speed / *leaf_width) / p).sqrt();

    // Vapour pressure at the leaf surface, weighted by the two conductances
    let eb = (gsv * es_leaf + forced * ea) / (gsv + forced);
    let virtual_difference =
        (tlk / (1.0 - 0.378 * eb / p) - tak / (1.0 - 0.378 * ea / p)).abs();

    let free = cf
        * tlk.powf(0.56)
        * ((tlk + 120.0) / p).sqrt()
        * (virtual_difference / *leaf_width).powf(0.25);

    forced.max(free)
}
