//! Evaporation from the soil surface beneath the canopy
//!
//! Radiation reaching the soil is a fixed share of the above-canopy
//! irradiance; the sunlit soil area follows Beer's law through the canopy,
//! and drying soil throttles the rate through a dimensionless uptake factor.
//!
//! # Scientific References
//! - Campbell, G.S. & Norman, J.M. (1998). "An Introduction to Environmental
//!   Biophysics", 2nd ed., p. 142 (dimensionless uptake)
//! - Thornley, J.H.M. & Johnson, I.R. (1990). "Plant and Crop Modelling", Ch. 14

use super::thermodynamics::{
    dry_air_density, latent_heat_of_vaporization, saturation_slope, saturation_vapor_pressure,
};
use crate::core_types::units::{Celsius, MetersPerSecond, PhotonFlux};
use serde::{Deserialize, Serialize};

/// Characteristic soil clod size (m)
const SOIL_CLOD_SIZE: f64 = 0.04;
const SOIL_REFLECTANCE: f64 = 0.2;
const SOIL_TRANSMISSION: f64 = 0.01;
/// Specific heat of air (J kg⁻¹ K⁻¹)
const SPECIFIC_HEAT: f64 = 1010.0;
const STEFAN_BOLTZMANN: f64 = 5.67e-8;
/// Assumed soil-air temperature difference for the long-wave term (K)
const SOIL_AIR_OFFSET: f64 = 0.005;
const MIN_WIND_SPEED: f64 = 0.5;

/// mmol H2O m⁻² s⁻¹ → Mg H2O ha⁻¹ h⁻¹
const MMOL_TO_MG_PER_HECTARE_HOUR: f64 = 3600.0 * 1e-3 * 18.0 * 1e-6 * 1e4;

/// Smallest reported evaporation (Mg ha⁻¹ h⁻¹)
const MIN_EVAPORATION: f64 = 1e-6;

/// Evaporation formula used for the soil surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SoilEvaporationMethod {
    #[default]
    PenmanMonteith,
    PriestleyTaylor,
}

/// Canopy and weather forcing for the soil surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilSurfaceForcing {
    pub leaf_area_index: f64,
    /// Canopy extinction coefficient for the sunlit soil fraction
    pub extinction_coefficient: f64,
    pub air_temperature: Celsius,
    /// Above-canopy irradiance
    pub irradiance: PhotonFlux,
    pub wind_speed: MetersPerSecond,
    /// Relative humidity (0-1 fraction)
    pub relative_humidity: f64,
}

/// Soil surface evaporation (Mg H2O ha⁻¹ h⁻¹)
///
/// # Arguments
/// * `forcing` - Canopy cover and weather above the soil
/// * `water_content` - Volumetric water content of the top layer
/// * `field_capacity` - Field capacity of the top layer
/// * `wilting_point` - Wilting point of the top layer
/// * `radiation_factor` - Share of above-canopy irradiance reaching the soil
/// * `method` - Penman-Monteith or Priestley-Taylor
///
/// # Returns
/// Evaporation rate, never below 1e-6
pub fn soil_evaporation(
    forcing: &SoilSurfaceForcing,
    water_content: f64,
    field_capacity: f64,
    wilting_point: f64,
    radiation_factor: f64,
    method: SoilEvaporationMethod,
) -> f64 {
    let t = forcing.air_temperature;
    let soil_area = (-forcing.extinction_coefficient * forcing.leaf_area_index).exp();

    // Relative available water and the dimensionless uptake it allows. Soil
    // wetter than field capacity keeps rising; below wilting point the uptake
    // curve would diverge, so it is floored at zero.
    let relative_water =
        ((water_content - wilting_point) / (field_capacity - wilting_point)).max(0.0);
    let uptake = 1.0 - (1.0 + 1.3 * relative_water).powi(-5);

    let radiation = forcing.irradiance.to_watts_per_square_meter() * radiation_factor;

    let lhv = latent_heat_of_vaporization(t) * 1e6;
    let slope = saturation_slope(t) * 1e-3;
    let psychrometric = dry_air_density(t) * SPECIFIC_HEAT / lhv;
    let deficit = saturation_vapor_pressure(t) * 1e-3 * (1.0 - forcing.relative_humidity);

    let wind = forcing.wind_speed.max(MetersPerSecond::new(MIN_WIND_SPEED));
    let boundary_thickness = 4e-3 * (SOIL_CLOD_SIZE / *wind).sqrt();
    let diffusivity = 2.126e-5 + 1.48e-7 * *t;
    let boundary_conductance = diffusivity / boundary_thickness;

    let absorbed =
        2.0 * radiation * ((1.0 - SOIL_REFLECTANCE - SOIL_TRANSMISSION) / (1.0 - SOIL_TRANSMISSION));
    let longwave = 4.0 * STEFAN_BOLTZMANN * (273.0 + *t).powi(3) * SOIL_AIR_OFFSET;
    let mut net_radiation = absorbed - longwave;
    if net_radiation < 0.0 {
        net_radiation = 1e-7;
    }

    let evaporation = match method {
        SoilEvaporationMethod::PriestleyTaylor => {
            1.26 * slope * net_radiation / (lhv * (slope + psychrometric))
        }
        SoilEvaporationMethod::PenmanMonteith => {
            (slope * net_radiation + lhv * psychrometric * boundary_conductance * deficit)
                / (lhv * (slope + psychrometric))
        }
    };

    let rate = evaporation * 1e6 / 18.0 * soil_area * uptake * MMOL_TO_MG_PER_HECTARE_HOUR;
    rate.max(MIN_EVAPORATION)
}
