//! Soil water balance
//!
//! Two hourly bucket models driven by precipitation and crop water demand:
//!
//! - [`watstr`] treats the rooting zone as a single layer, with runoff above
//!   saturation and Campbell-type drainage above field capacity.
//! - [`soil_ml`] sweeps an ordered column of layers from the deepest up,
//!   applying hydraulic redistribution, filling layers with infiltrating rain,
//!   and drawing transpiration in proportion to root density. Soil evaporation
//!   is charged to the top layer, and demand a layer cannot meet is carried to
//!   the next layer of the sweep.
//!
//! Water contents are volumetric fractions, kept within
//! `[wilting point, saturation]` after every update. The caller owns the
//! column's water-content buffer between calls.
//!
//! # Scientific References
//! - Campbell, G.S. & Norman, J.M. (1998). "An Introduction to Environmental
//!   Biophysics", 2nd ed., Ch. 9
//! - Campbell, G.S. (1985). "Soil Physics with BASIC", p. 129
//! - Grant, R.F. (1990). "Dynamic simulation of water deficit effects upon
//!   maize yield". Agricultural Systems, 33, 13-39
//! - Parton, W.J. et al. (1988). Biogeochemistry, 5, 109-131 (nitrate leaching)

use super::check_layer_count;
use super::root_distribution::root_distribution;
use super::soil_evaporation::{soil_evaporation, SoilEvaporationMethod, SoilSurfaceForcing};
use super::water_stress::{layer_water_stress, WaterStressCoefficients, WaterStressFunction};
use crate::core_types::soil_texture::{SoilTexture, SoilType};
use crate::core_types::units::{Fraction, Meters};
use crate::error::{CanopyError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Standard gravity (m s⁻²)
const GRAVITY: f64 = 9.8;

/// Density of water at 20°C (Mg m⁻³)
const WATER_DENSITY: f64 = 0.9982;

/// Reference potentials for the log-linear retention curve (MPa)
const FIELD_CAPACITY_POTENTIAL: f64 = 0.033;
const WILTING_POINT_POTENTIAL: f64 = 1.5;

/// Water retention and stress-response parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilWaterParameters {
    /// Field capacity override; the soil texture value is used when absent
    pub field_capacity: Option<f64>,
    /// Wilting point override; the soil texture value is used when absent
    pub wilting_point: Option<f64>,
    /// Logistic stress width
    pub phi1: f64,
    /// Leaf-expansion stress exponent
    pub phi2: f64,
    pub stress_function: WaterStressFunction,
}

impl Default for SoilWaterParameters {
    fn default() -> Self {
        Self {
            field_capacity: None,
            wilting_point: None,
            phi1: 0.01,
            phi2: 10.0,
            stress_function: WaterStressFunction::Linear,
        }
    }
}

impl SoilWaterParameters {
    /// Field capacity and wilting point, falling back to the texture table
    pub fn limits(&self, texture: &SoilTexture) -> (f64, f64) {
        (
            self.field_capacity.unwrap_or(texture.field_capacity),
            self.wilting_point.unwrap_or(texture.wilting_point),
        )
    }

    fn stress(&self, water_content: f64, fc: f64, wp: f64) -> WaterStressCoefficients {
        layer_water_stress(water_content, fc, wp, self.phi1, self.phi2, self.stress_function)
    }
}

/// Parameters of the layered column model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilColumnParameters {
    pub water: SoilWaterParameters,
    /// Move water between adjacent layers along the matric potential gradient
    pub hydraulic_redistribution: bool,
    /// Poisson shape factor per rooted layer
    pub root_distribution_lambda: f64,
    /// Share of above-canopy irradiance reaching the soil surface
    pub soil_evaporation_radiation_factor: f64,
    /// Rooting depth per unit root biomass (m per Mg ha⁻¹)
    pub root_depth_factor: f64,
    pub soil_evaporation_method: SoilEvaporationMethod,
}

impl Default for SoilColumnParameters {
    fn default() -> Self {
        Self {
            water: SoilWaterParameters::default(),
            hydraulic_redistribution: true,
            root_distribution_lambda: 0.2,
            soil_evaporation_radiation_factor: 0.2,
            root_depth_factor: 0.44,
            soil_evaporation_method: SoilEvaporationMethod::PenmanMonteith,
        }
    }
}

/// Result of the single-layer balance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingleLayerWaterBalance {
    /// Updated volumetric water content
    pub water_content: f64,
    /// Water above saturation shed by the layer (m)
    pub runoff: f64,
    /// Nitrate leached with the runoff
    pub nitrate_leaching: f64,
    /// Soil matric potential (kPa, negative)
    pub matric_potential: f64,
    pub stress: WaterStressCoefficients,
}

/// Hourly forcing of the layered column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnForcing {
    /// Precipitation (mm)
    pub precipitation: f64,
    /// Canopy transpiration demand (Mg H2O ha⁻¹)
    pub transpiration: f64,
    /// Root biomass (Mg ha⁻¹)
    pub root_biomass: f64,
    /// Conditions at the soil surface for the evaporation estimate
    pub surface: SoilSurfaceForcing,
}

/// State of one layer after the column update
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SoilLayerState {
    pub water_content: f64,
    /// Root biomass in the layer (Mg ha⁻¹)
    pub root_biomass: f64,
    pub root_fraction: f64,
    /// Redistribution flux toward the layer above (m h⁻¹, negative downward)
    pub hourly_water_flux: f64,
}

/// Result of the layered column update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiLayerWaterBalance {
    /// Layer-averaged stress coefficients
    pub stress: WaterStressCoefficients,
    /// Water leaving the column: bottom redistribution loss plus rain that
    /// found no room (m)
    pub drainage: f64,
    /// Nitrate carried by the rain that found no room; zero on dry hours
    pub nitrate_leaching: f64,
    /// Evaporation from the top layer (Mg ha⁻¹ h⁻¹)
    pub soil_evaporation: f64,
    /// Transpiration and evaporation demand no layer could supply (Mg ha⁻¹)
    pub unmet_demand: f64,
    /// Per-layer state, top layer first
    pub layers: Vec<SoilLayerState>,
}

/// Soil matric potential (kPa) from a log-linear interpolation between
/// -33 kPa at field capacity and -1500 kPa at wilting point
fn matric_potential(water_content: f64, fc: f64, wp: f64) -> f64 {
    let position = (fc.ln() - water_content.ln()) / (fc.ln() - wp.ln());
    let ln_mpa = FIELD_CAPACITY_POTENTIAL.ln()
        + position * (WILTING_POINT_POTENTIAL.ln() - FIELD_CAPACITY_POTENTIAL.ln());
    -ln_mpa.exp() * 1e3
}

/// Unsaturated hydraulic conductivity at matric potential `psim` (Campbell)
fn hydraulic_conductivity(texture: &SoilTexture, psim: f64) -> f64 {
    texture.saturated_conductivity * (texture.air_entry / psim).powf(2.0 + 3.0 / texture.b)
}

/// kg m⁻² s⁻¹ → m³ m⁻² h⁻¹
fn to_hourly_depth(flux: f64) -> f64 {
    flux * 3600.0 * WATER_DENSITY * 1e-3
}

/// Single-layer soil water balance
///
/// # Arguments
/// * `precipitation` - Rain this hour (mm)
/// * `demand` - Evapotranspiration demand (Mg H2O ha⁻¹)
/// * `water_content` - Current volumetric water content
/// * `soil_depth` - Depth of the layer (must be positive)
/// * `soil` - Texture class
/// * `params` - Retention limits and stress response
///
/// # Errors
/// A depth that is not finite and positive, or retention limits that leave
/// no plant-available range.
pub fn watstr(
    precipitation: f64,
    demand: f64,
    water_content: f64,
    soil_depth: Meters,
    soil: SoilType,
    params: &SoilWaterParameters,
) -> Result<SingleLayerWaterBalance> {
    let texture = soil.texture();
    let (fc, wp) = params.limits(&texture);
    let saturation = texture.saturation;
    let depth = *soil_depth;
    if !(depth.is_finite() && depth > 0.0) {
        return Err(invalid_profile(format!("soil depth {depth} m must be positive")));
    }
    validate_limits(fc, wp, saturation)?;

    let mut theta = (precipitation * 1e-3 + water_content * depth) / depth;
    let mut runoff = 0.0;
    let mut nitrate_leaching = 0.0;
    if theta > saturation {
        runoff = (theta - saturation) * depth;
        nitrate_leaching = runoff / 18.0 * (0.2 + 0.7 * texture.sand);
        theta = saturation;
    }

    // Plant-available water (m³ ha⁻¹) less the demand converted from Mg
    let available = (theta - wp) * depth * 1e4;
    let remaining = (available - demand / WATER_DENSITY).max(0.0);
    let mut awc = remaining * 1e-4 / depth + wp;

    let psim = matric_potential(awc, fc, wp);

    if awc > fc {
        let k = hydraulic_conductivity(&texture, psim);
        // Darcy flux over half the layer depth plus gravity
        let flux = -k * (-psim / (depth * 0.5)) - GRAVITY * k;
        awc += to_hourly_depth(flux) / depth;
    }
    let awc = awc.max(wp).min(saturation);

    trace!(awc, runoff, psim, "Single-layer water balance");

    Ok(SingleLayerWaterBalance {
        water_content: awc,
        runoff,
        nitrate_leaching,
        matric_potential: psim,
        stress: params.stress(awc, fc, wp),
    })
}

fn invalid_profile(reason: String) -> CanopyError {
    warn!(%reason, "Soil column rejected");
    CanopyError::InvalidSoilProfile(reason)
}

fn validate_column(water_content: &[f64], depths: &[f64], fc: f64, wp: f64, saturation: f64) -> Result<()> {
    check_layer_count(water_content.len())?;
    if depths.len() != water_content.len() + 1 {
        return Err(invalid_profile(format!(
            "{} layers need {} depth boundaries, got {}",
            water_content.len(),
            water_content.len() + 1,
            depths.len()
        )));
    }
    if depths.iter().any(|d| !d.is_finite()) || depths.windows(2).any(|w| w[1] <= w[0]) {
        return Err(invalid_profile(
            "depth boundaries must be finite and strictly increasing".to_string(),
        ));
    }
    validate_limits(fc, wp, saturation)
}

fn validate_limits(fc: f64, wp: f64, saturation: f64) -> Result<()> {
    if !(wp > 0.0 && wp < fc && wp < saturation) {
        return Err(invalid_profile(format!(
            "wilting point {wp} must be positive and below field capacity {fc} and saturation {saturation}"
        )));
    }
    Ok(())
}

/// Layered soil water balance for one hour
///
/// Layers are swept from the deepest to the surface. For each layer:
/// 1. Hydraulic redistribution with the layer above (when enabled); a
///    downward flux out of the bottom layer is reported as drainage. A
///    single-layer column has no neighbour and drains under gravity alone.
/// 2. Water content is clamped to `[wilting point, saturation]`.
/// 3. An equal share of the rain plus any overflow from the layer below is
///    added, filling the layer to field capacity and carrying the excess on.
/// 4. Transpiration is drawn in proportion to the layer's root fraction, the
///    top layer also pays soil evaporation, and unmet demand carries on.
///
/// # Arguments
/// * `water_content` - Volumetric water content per layer, top first; updated in place
/// * `depths` - Layer boundaries (m), `layers + 1` values increasing downward
/// * `soil` - Texture class of the column
/// * `forcing` - Rain, transpiration demand, root biomass and surface weather
/// * `params` - Column parameters
///
/// # Errors
/// Layer count outside `1..=200`, a depth vector that does not bound the
/// layers, or retention limits that leave no plant-available range.
pub fn soil_ml(
    water_content: &mut [f64],
    depths: &[f64],
    soil: SoilType,
    forcing: &ColumnForcing,
    params: &SoilColumnParameters,
) -> Result<MultiLayerWaterBalance> {
    let texture = soil.texture();
    let (fc, wp) = params.water.limits(&texture);
    let saturation = texture.saturation;
    validate_column(water_content, depths, fc, wp, saturation)?;

    let layers = water_content.len();
    let soil_depth = depths[layers] - depths[0];
    let root_depth = (forcing.root_biomass * params.root_depth_factor).min(soil_depth);
    let root_fractions = root_distribution(depths, root_depth, params.root_distribution_lambda);

    // Redistribution reads neighbouring layers before they are visited
    for theta in water_content.iter_mut() {
        *theta = theta.clamp(wp, saturation);
    }

    let water_in = forcing.precipitation * 1e-3;
    let mut overflow = 0.0;
    let mut unmet = 0.0;
    let mut drainage = 0.0;
    let mut evaporation = 0.0;
    let mut photosynthesis_sum = 0.0;
    let mut leaf_expansion_sum = 0.0;
    let mut states = vec![SoilLayerState::default(); layers];

    for i in (0..layers).rev() {
        let layer_depth = depths[i + 1] - depths[i];

        let mut flux = 0.0;
        let bottom = i == layers - 1;
        if params.hydraulic_redistribution && (i > 0 || bottom) {
            let psim = texture.air_entry * (water_content[i] / saturation).powf(-texture.b);
            let gradient = if i > 0 {
                psim - texture.air_entry * (water_content[i - 1] / saturation).powf(-texture.b)
            } else {
                0.0
            };
            let k = hydraulic_conductivity(&texture, psim);
            flux = to_hourly_depth(k * gradient / layer_depth - GRAVITY * k);

            if bottom && flux < 0.0 {
                drainage -= flux;
            } else if i > 0 {
                water_content[i] -= flux / layer_depth;
                water_content[i - 1] += flux / layer_depth;
            }
        }

        water_content[i] = water_content[i].clamp(wp, saturation);

        let mut water = water_content[i] * layer_depth;
        if water_in > 0.0 {
            water += water_in / layers as f64 + overflow;
            let capacity = fc * layer_depth;
            if water > capacity {
                overflow = water - capacity;
                water = capacity;
            } else {
                overflow = 0.0;
            }
        }

        let root_fraction = root_fractions[i];
        let mut demand = forcing.transpiration * root_fraction;
        if i == 0 {
            evaporation = soil_evaporation(
                &forcing.surface,
                water / layer_depth,
                fc,
                wp,
                params.soil_evaporation_radiation_factor,
                params.soil_evaporation_method,
            );
            demand += evaporation;
        }

        // Plant-available water (m³ ha⁻¹) less this layer's demand and the carry
        let available = ((water - wp * layer_depth) * 1e4).max(0.0);
        let mut remaining = available - (demand + unmet) / WATER_DENSITY;
        if remaining < 0.0 {
            unmet = -remaining * WATER_DENSITY;
            remaining = 0.0;
        } else {
            unmet = 0.0;
        }

        let theta = (remaining / 1e4 / layer_depth + wp).clamp(wp, saturation);
        water_content[i] = theta;

        let stress = params.water.stress(theta, fc, wp);
        photosynthesis_sum += *stress.photosynthesis;
        leaf_expansion_sum += *stress.leaf_expansion;

        states[i] = SoilLayerState {
            water_content: theta,
            root_biomass: forcing.root_biomass * root_fraction,
            root_fraction,
            hourly_water_flux: flux,
        };
        trace!(layer = i, theta, flux, unmet, "Soil layer updated");
    }

    drainage += overflow;
    // Only rain left over after filling the column carries nitrate
    let nitrate_leaching = if water_in > 0.0 {
        overflow * 0.1 * (30.0 / 24.0) / (18.0 * (0.2 + 0.7 * texture.sand))
    } else {
        0.0
    };
    let stress = WaterStressCoefficients {
        photosynthesis: Fraction::saturating(photosynthesis_sum / layers as f64),
        leaf_expansion: Fraction::saturating(leaf_expansion_sum / layers as f64),
    };

    debug!(
        layers,
        drainage,
        evaporation,
        unmet,
        photosynthesis_stress = *stress.photosynthesis,
        "Soil column balance"
    );

    Ok(MultiLayerWaterBalance {
        stress,
        drainage,
        nitrate_leaching,
        soil_evaporation: evaporation,
        unmet_demand: unmet,
        layers: states,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::units::{Celsius, MetersPerSecond, PhotonFlux};
    use crate::physics::root_distribution::uniform_layer_depths;
    use approx::assert_relative_eq;

    fn surface() -> SoilSurfaceForcing {
        SoilSurfaceForcing {
            leaf_area_index: 3.0,
            extinction_coefficient: 0.5,
            air_temperature: Celsius::new(25.0),
            irradiance: PhotonFlux::new(1200.0),
            wind_speed: MetersPerSecond::new(2.0),
            relative_humidity: 0.6,
        }
    }

    fn forcing(precipitation: f64, transpiration: f64) -> ColumnForcing {
        ColumnForcing {
            precipitation,
            transpiration,
            root_biomass: 2.0,
            surface: surface(),
        }
    }

    #[test]
    fn test_matric_potential_reference_points() {
        assert_relative_eq!(matric_potential(0.27, 0.27, 0.12), -33.0, epsilon = 1e-9);
        assert_relative_eq!(matric_potential(0.12, 0.27, 0.12), -1500.0, epsilon = 1e-6);
    }

    #[test]
    fn test_watstr_heavy_rain_runs_off() {
        let r = watstr(
            500.0,
            0.0,
            0.5,
            Meters::new(1.0),
            SoilType::Loam,
            &SoilWaterParameters::default(),
        )
        .unwrap();
        // 0.5 + 0.5 m over a 1 m layer exceeds saturation (0.57)
        assert_relative_eq!(r.runoff, 0.43, epsilon = 1e-9);
        assert!(r.nitrate_leaching > 0.0);
        assert!(r.water_content <= 0.57 && r.water_content > 0.27);
    }

    #[test]
    fn test_watstr_demand_dries_to_wilting_point() {
        let r = watstr(
            0.0,
            1e5,
            0.2,
            Meters::new(1.0),
            SoilType::Loam,
            &SoilWaterParameters::default(),
        )
        .unwrap();
        assert_eq!(r.water_content, 0.12);
        assert_eq!(r.runoff, 0.0);
        assert_relative_eq!(r.matric_potential, -1500.0, epsilon = 1e-6);
    }

    #[test]
    fn test_watstr_uses_overrides() {
        let params = SoilWaterParameters {
            field_capacity: Some(0.30),
            wilting_point: Some(0.10),
            ..SoilWaterParameters::default()
        };
        // 100 Mg ha⁻¹ ≈ 0.01 m of water from a 1 m layer
        let r = watstr(0.0, 100.0, 0.25, Meters::new(1.0), SoilType::Loam, &params).unwrap();
        assert_relative_eq!(r.water_content, 0.25 - 0.01 / WATER_DENSITY, epsilon = 1e-9);
        assert!(*r.stress.photosynthesis < 1.0);
    }

    #[test]
    fn test_watstr_rejects_non_positive_depth() {
        let params = SoilWaterParameters::default();
        for depth in [0.0, -0.5, f64::NAN] {
            let err = watstr(10.0, 1.0, 0.2, Meters::new(depth), SoilType::Loam, &params)
                .unwrap_err();
            assert!(matches!(err, CanopyError::InvalidSoilProfile(_)), "depth {depth}");
        }

        let inverted = SoilWaterParameters {
            field_capacity: Some(0.1),
            wilting_point: Some(0.2),
            ..params
        };
        assert!(watstr(0.0, 0.0, 0.2, Meters::new(1.0), SoilType::Loam, &inverted).is_err());
    }

    #[test]
    fn test_soil_ml_validates_profile() {
        let params = SoilColumnParameters::default();
        let mut theta = vec![0.2; 3];
        let err = soil_ml(&mut theta, &[0.0, 0.5, 1.0], SoilType::Loam, &forcing(0.0, 0.0), &params)
            .unwrap_err();
        assert!(matches!(err, CanopyError::InvalidSoilProfile(_)));

        let err = soil_ml(
            &mut theta,
            &[0.0, 0.5, 0.5, 1.0],
            SoilType::Loam,
            &forcing(0.0, 0.0),
            &params,
        )
        .unwrap_err();
        assert!(matches!(err, CanopyError::InvalidSoilProfile(_)));

        let mut empty: Vec<f64> = Vec::new();
        let err = soil_ml(&mut empty, &[0.0], SoilType::Loam, &forcing(0.0, 0.0), &params)
            .unwrap_err();
        assert!(matches!(err, CanopyError::LayerCountOutOfRange { value: 0, .. }));
    }

    #[test]
    fn test_soil_ml_rain_fills_from_the_bottom() {
        let params = SoilColumnParameters {
            hydraulic_redistribution: false,
            ..SoilColumnParameters::default()
        };
        let depths = uniform_layer_depths(1.0, 4);
        let mut theta = vec![0.15; 4];
        let r = soil_ml(&mut theta, &depths, SoilType::Loam, &forcing(400.0, 0.0), &params)
            .unwrap();
        // 0.1 m per layer tops every 0.25 m layer up to field capacity
        for layer in &r.layers[1..] {
            assert_relative_eq!(layer.water_content, 0.27, epsilon = 1e-9);
        }
        assert!(r.drainage > 0.0);
        assert!(r.nitrate_leaching > 0.0);
        assert_eq!(theta[3], r.layers[3].water_content);
    }

    #[test]
    fn test_soil_ml_roots_follow_biomass() {
        let params = SoilColumnParameters::default();
        let depths = uniform_layer_depths(2.0, 10);
        let mut theta = vec![0.25; 10];
        let r = soil_ml(&mut theta, &depths, SoilType::SiltLoam, &forcing(0.0, 1.0), &params)
            .unwrap();
        let total: f64 = r.layers.iter().map(|l| l.root_fraction).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
        let biomass: f64 = r.layers.iter().map(|l| l.root_biomass).sum();
        assert_relative_eq!(biomass, 2.0, epsilon = 1e-12);
        // 2 Mg ha⁻¹ · 0.44 m reaches 0.88 m: layers below 1.0 m are unrooted
        assert!(r.layers[5..].iter().all(|l| l.root_fraction == 0.0));
    }

    #[test]
    fn test_soil_ml_reports_unmet_demand() {
        let params = SoilColumnParameters::default();
        let depths = uniform_layer_depths(0.5, 1);
        let mut theta = vec![0.20];
        let r = soil_ml(&mut theta, &depths, SoilType::Loam, &forcing(0.0, 1e6), &params)
            .unwrap();
        assert_eq!(theta[0], 0.12);
        // 0.08 · 0.5 m · 1e4 m³ ha⁻¹ of plant-available water at most
        assert!(r.unmet_demand > 1e6 - 0.08 * 0.5 * 1e4 * WATER_DENSITY - 1.0);
        assert!(*r.stress.photosynthesis < 1e-9);
    }
}
