//! Leaf energy balance and transpiration
//!
//! Two fixed-point solvers for the leaf-to-air temperature offset, both built
//! on the linearised (first-order Taylor) long-wave balance of Thornley &
//! Johnson:
//!
//! - [`evapo_trans`] holds a log-profile aerodynamic conductance fixed and
//!   clamps the offset to ±5 K. Stomatal conductance may be supplied or
//!   derived from the C3 photosynthesis solver.
//! - [`evapo_trans2`] recomputes the leaf boundary-layer conductance every
//!   pass and clamps the offset to ±10 K. The caller selects which
//!   transpiration estimator is reported.
//!
//! After the loop, net radiation is floored at zero and three transpiration
//! estimates are formed: the resistance (diffusion) form, Penman and
//! Priestley-Taylor. Rates are reported in mmol H2O m⁻² s⁻¹.
//!
//! # Scientific References
//! - Thornley, J.H.M. & Johnson, I.R. (1990). "Plant and Crop Modelling",
//!   pp. 400-418
//! - Campbell, G.S. & Norman, J.M. (1998). "An Introduction to Environmental
//!   Biophysics", 2nd ed., Ch. 12 & 14
//! - Priestley, C.H.B. & Taylor, R.J. (1972). Monthly Weather Review, 100(2), 81-92

use super::boundary_layer::leaf_boundary_layer_conductance;
use super::photosynthesis::{c3_photosynthesis, C3Parameters, LeafEnvironment};
use super::thermodynamics::{
    dry_air_density, latent_heat_of_vaporization, saturation_slope, saturation_vapor_pressure,
};
use crate::core_types::convergence::Convergence;
use crate::core_types::units::{
    Celsius, CelsiusDelta, Fraction, Meters, MetersPerSecond, PhotonFlux, StomatalConductance,
};
use crate::error::{CanopyError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Stefan-Boltzmann constant (W m⁻² K⁻⁴)
const STEFAN_BOLTZMANN: f64 = 5.67037e-8;

/// Specific heat of air (J kg⁻¹ K⁻¹)
const SPECIFIC_HEAT: f64 = 1010.0;

/// Leaf PAR reflectance and transmittance
const LEAF_REFLECTANCE: f64 = 0.2;
const LEAF_TRANSMITTANCE: f64 = 0.2;

/// Von Kármán constant
const KAPPA: f64 = 0.41;

/// Zero-plane displacement and roughness lengths as fractions of canopy height
const DISPLACEMENT_COEF: f64 = 0.77;
const ZETA_COEF: f64 = 0.026;
const ZETA_M_COEF: f64 = 0.13;

/// Lower bounds applied to the canopy forcing
const MIN_CANOPY_HEIGHT: f64 = 0.1;
const MIN_WIND_SPEED: f64 = 0.5;

/// Temperature-offset loop: start value, exit tolerance and pass cap
const INITIAL_OFFSET: f64 = 0.01;
const OFFSET_TOLERANCE: f64 = 0.5;
pub const MAX_ITERATIONS: u32 = 10;

/// Offset clamps of the two variants (K)
pub const AERODYNAMIC_OFFSET_LIMIT: f64 = 5.0;
pub const BOUNDARY_LAYER_OFFSET_LIMIT: f64 = 10.0;

/// Absorbed short-wave above this is physically impossible (W m⁻²)
const MAX_TOTAL_RADIATION: f64 = 650.0;

/// Floors on stomatal conductance to vapour (m s⁻¹)
const MIN_AERODYNAMIC_VARIANT_CONDUCTANCE: f64 = 0.01;
const MIN_BOUNDARY_LAYER_VARIANT_CONDUCTANCE: f64 = 0.001;

/// kg H2O m⁻² s⁻¹ → mmol H2O m⁻² s⁻¹
const KG_TO_MMOL_WATER: f64 = 1e6 / 18.0;

/// Air state around the canopy layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanopyMicroclimate {
    pub air_temperature: Celsius,
    /// Relative humidity (0-1 fraction)
    pub relative_humidity: f64,
    pub wind_speed: MetersPerSecond,
    pub canopy_height: Meters,
}

/// Where the aerodynamic variant takes its stomatal conductance from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConductanceSource<'a> {
    /// A conductance computed by the caller
    Supplied(StomatalConductance),
    /// Solve the C3 model at air temperature with the layer's irradiance
    C3 {
        parameters: &'a C3Parameters,
        /// Ambient CO2 (µmol mol⁻¹)
        co2: f64,
        water_stress: Fraction,
    },
}

/// Which estimator the boundary-layer variant reports as transpiration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TranspirationEstimator {
    /// Resistance form using stomatal and boundary-layer conductances
    #[default]
    Diffusion,
    Penman,
    PriestleyTaylor,
}

/// Outcome of a leaf energy-balance solve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeafEnergyBalance {
    /// Reported transpiration (mmol m⁻² s⁻¹)
    pub transpiration: f64,
    /// Penman potential evaporation (mmol m⁻² s⁻¹)
    pub penman: f64,
    /// Priestley-Taylor potential evaporation (mmol m⁻² s⁻¹)
    pub priestley_taylor: f64,
    pub leaf_temperature_offset: CelsiusDelta,
    /// Stomatal conductance used by the balance, after flooring
    pub layer_conductance: StomatalConductance,
    pub convergence: Convergence,
}

/// Temperature-dependent air properties shared by both variants
struct AirProperties {
    /// Latent heat (J kg⁻¹)
    latent_heat: f64,
    /// Slope of the saturation curve (kg m⁻³ K⁻¹)
    slope: f64,
    /// Psychrometric parameter (kg m⁻³ K⁻¹)
    psychrometric: f64,
}

impl AirProperties {
    fn new(air_temperature: Celsius) -> Self {
        let latent_heat = latent_heat_of_vaporization(air_temperature) * 1e6;
        Self {
            latent_heat,
            slope: saturation_slope(air_temperature) * 1e-3,
            psychrometric: dry_air_density(air_temperature) * SPECIFIC_HEAT / latent_heat,
        }
    }

    /// Resistance, Penman and Priestley-Taylor estimates (kg m⁻² s⁻¹)
    fn estimates(
        &self,
        net_radiation: f64,
        aerodynamic: f64,
        stomatal: f64,
        deficit: f64,
    ) -> (f64, f64, f64) {
        let lhv = self.latent_heat;
        let s = self.slope;
        let psy = self.psychrometric;
        let radiative = s * net_radiation;
        let advective = lhv * psy * aerodynamic * deficit;

        let resistance =
            (radiative + advective) / (lhv * (s + psy * (1.0 + aerodynamic / stomatal)));
        let penman = (radiative + advective) / (lhv * (s + psy));
        let priestley_taylor = 1.26 * radiative / (lhv * (s + psy));
        (resistance, penman, priestley_taylor)
    }
}

fn check_humidity(relative_humidity: f64) -> Result<()> {
    if relative_humidity > 1.0 {
        let percent = relative_humidity * 100.0;
        warn!(percent, "Leaf energy balance rejected relative humidity");
        return Err(CanopyError::RelativeHumidityAbove100(percent));
    }
    Ok(())
}

fn check_saturation(svp: f64) -> Result<()> {
    if svp < 0.0 {
        warn!(svp, "Leaf energy balance rejected saturation vapour pressure");
        return Err(CanopyError::NegativeSaturationVaporPressure(svp));
    }
    Ok(())
}

/// Absorbed radiation available to a leaf from a photon flux (W m⁻²)
fn absorbed_radiation(flux: PhotonFlux) -> f64 {
    2.0 * flux.to_watts_per_square_meter() * (1.0 - LEAF_REFLECTANCE - LEAF_TRANSMITTANCE)
        / (1.0 - LEAF_TRANSMITTANCE)
}

/// Linearised net long-wave loss for a leaf `offset` K above the air (W m⁻²)
fn longwave_loss(air_temperature: Celsius, offset: f64) -> f64 {
    4.0 * STEFAN_BOLTZMANN * (273.0 + *air_temperature).powi(3) * offset
}

/// Leaf energy balance with a fixed aerodynamic conductance
///
/// Wind is measured at 5 m, raised by the canopy height when the canopy
/// comes within a metre of it. The offset is clamped to ±5 K.
///
/// # Arguments
/// * `irradiance` - Photon flux absorbed by the layer
/// * `climate` - Air state at the layer
/// * `conductance` - Supplied stomatal conductance or C3 parameters to derive it
///
/// # Errors
/// Relative humidity above 1, negative saturation vapour pressure, or a
/// negative aerodynamic conductance.
pub fn evapo_trans(
    irradiance: PhotonFlux,
    climate: &CanopyMicroclimate,
    conductance: ConductanceSource<'_>,
) -> Result<LeafEnergyBalance> {
    let air = climate.air_temperature;
    let rh = climate.relative_humidity;
    let height = climate.canopy_height.max(Meters::new(MIN_CANOPY_HEIGHT));
    let wind = *climate.wind_speed.max(MetersPerSecond::new(MIN_WIND_SPEED));

    check_humidity(rh)?;
    let svp = saturation_vapor_pressure(air) * 1e-3;
    check_saturation(svp)?;

    let props = AirProperties::new(air);
    let deficit = svp * (1.0 - rh);

    let stomatal = match conductance {
        ConductanceSource::Supplied(gs) => gs,
        ConductanceSource::C3 {
            parameters,
            co2,
            water_stress,
        } => {
            let leaf = LeafEnvironment {
                photon_flux: irradiance,
                leaf_temperature: air,
                relative_humidity: rh,
                co2,
                water_stress,
            };
            c3_photosynthesis(&leaf, parameters).stomatal_conductance
        }
    };
    let mut gs = stomatal.to_meters_per_second();
    if gs <= 0.0 {
        gs = MIN_AERODYNAMIC_VARIANT_CONDUCTANCE;
    }

    let mut reference_height = 5.0;
    if *height + 1.0 > reference_height {
        reference_height += *height;
    }
    let zeta = ZETA_COEF * *height;
    let zeta_m = ZETA_M_COEF * *height;
    let d = DISPLACEMENT_COEF * *height;
    let ga = KAPPA.powi(2) * wind
        / (((reference_height + zeta - d) / zeta).ln()
            * ((reference_height + zeta_m - d) / zeta_m).ln());
    if ga < 0.0 {
        warn!(ga, "Leaf energy balance produced negative aerodynamic conductance");
        return Err(CanopyError::NegativeAerodynamicConductance(ga));
    }

    let ja = absorbed_radiation(irradiance);
    let bottom = props.latent_heat * (props.slope + props.psychrometric * (1.0 + ga / gs));

    let mut offset = INITIAL_OFFSET;
    let mut change = 10.0;
    let mut net_radiation = ja;
    let mut iterations = 0;
    while change > OFFSET_TOLERANCE && iterations < MAX_ITERATIONS {
        iterations += 1;
        let previous = offset;
        net_radiation = ja - longwave_loss(air, offset);
        let top = net_radiation * (1.0 / ga + 1.0 / gs) - props.latent_heat * deficit;
        offset = (top / bottom).clamp(-AERODYNAMIC_OFFSET_LIMIT, AERODYNAMIC_OFFSET_LIMIT);
        change = (previous - offset).abs();
        trace!(iteration = iterations, offset, net_radiation, "Aerodynamic energy balance");
    }
    let convergence = Convergence::from_loop(iterations, change <= OFFSET_TOLERANCE);

    let (resistance, penman, priestley_taylor) =
        props.estimates(net_radiation.max(0.0), ga, gs, deficit);

    debug!(%convergence, offset, ga, gs, "Aerodynamic energy balance solved");

    Ok(LeafEnergyBalance {
        transpiration: resistance * KG_TO_MMOL_WATER,
        penman: penman * KG_TO_MMOL_WATER,
        priestley_taylor: priestley_taylor * KG_TO_MMOL_WATER,
        leaf_temperature_offset: CelsiusDelta::new(offset),
        layer_conductance: StomatalConductance::from_meters_per_second(gs),
        convergence,
    })
}

/// Leaf energy balance with an iterated leaf boundary-layer conductance
///
/// # Arguments
/// * `radiation` - Photon flux used for the reported net radiation
/// * `average_irradiance` - Layer-average photon flux driving leaf temperature
/// * `climate` - Air state at the layer
/// * `stomatal_conductance` - Stomatal conductance to vapour
/// * `leaf_width` - Characteristic leaf dimension
/// * `estimator` - Transpiration estimate to report
///
/// # Errors
/// Absorbed short-wave above 650 W m⁻², relative humidity above 1, or a
/// negative saturation vapour pressure.
pub fn evapo_trans2(
    radiation: PhotonFlux,
    average_irradiance: PhotonFlux,
    climate: &CanopyMicroclimate,
    stomatal_conductance: StomatalConductance,
    leaf_width: Meters,
    estimator: TranspirationEstimator,
) -> Result<LeafEnergyBalance> {
    let air = climate.air_temperature;
    let rh = climate.relative_humidity;
    let wind = climate.wind_speed.max(MetersPerSecond::new(MIN_WIND_SPEED));

    check_humidity(rh)?;
    let svp = saturation_vapor_pressure(air);
    check_saturation(svp)?;

    let total_radiation = radiation.to_watts_per_square_meter();
    if total_radiation > MAX_TOTAL_RADIATION {
        warn!(total_radiation, "Leaf energy balance rejected radiation");
        return Err(CanopyError::RadiationOutOfRange(total_radiation));
    }

    let props = AirProperties::new(air);
    // Saturated vapour density (kg m⁻³) at 1013.25 hPa
    let saturated_density = dry_air_density(air) * 0.622 * svp / 1013.25;
    let deficit = saturated_density * (1.0 - rh);
    let vapor_pressure = rh * svp;

    let ja = absorbed_radiation(radiation);
    let ja_leaf = absorbed_radiation(average_irradiance);

    let gs = stomatal_conductance
        .to_meters_per_second()
        .max(MIN_BOUNDARY_LAYER_VARIANT_CONDUCTANCE);

    let mut offset = INITIAL_OFFSET;
    let mut change = 10.0;
    let mut rlc = 0.0;
    let mut ga = 0.0;
    let mut iterations = 0;
    while change > OFFSET_TOLERANCE && iterations < MAX_ITERATIONS {
        iterations += 1;
        let previous = offset;
        rlc = longwave_loss(air, offset);
        ga = leaf_boundary_layer_conductance(
            wind,
            leaf_width,
            air,
            CelsiusDelta::new(offset),
            gs,
            vapor_pressure,
        );
        let leaf_net = ja_leaf - rlc;
        let top = leaf_net * (1.0 / ga + 1.0 / gs) - props.latent_heat * deficit;
        let bottom = props.latent_heat * (props.slope + props.psychrometric * (1.0 + ga / gs));
        offset = (top / bottom).clamp(-BOUNDARY_LAYER_OFFSET_LIMIT, BOUNDARY_LAYER_OFFSET_LIMIT);
        change = (previous - offset).abs();
        trace!(iteration = iterations, offset, ga, "Boundary-layer energy balance");
    }
    let convergence = Convergence::from_loop(iterations, change <= OFFSET_TOLERANCE);

    let net_radiation = (ja - rlc).max(0.0);
    let (resistance, penman, priestley_taylor) = props.estimates(net_radiation, ga, gs, deficit);
    let reported = match estimator {
        TranspirationEstimator::Diffusion => resistance,
        TranspirationEstimator::Penman => penman,
        TranspirationEstimator::PriestleyTaylor => priestley_taylor,
    };

    debug!(%convergence, offset, ga, gs, ?estimator, "Boundary-layer energy balance solved");

    Ok(LeafEnergyBalance {
        transpiration: reported * KG_TO_MMOL_WATER,
        penman: penman * KG_TO_MMOL_WATER,
        priestley_taylor: priestley_taylor * KG_TO_MMOL_WATER,
        leaf_temperature_offset: CelsiusDelta::new(offset),
        layer_conductance: StomatalConductance::from_meters_per_second(gs),
        convergence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn climate(t: f64, rh: f64, wind: f64, h: f64) -> CanopyMicroclimate {
        CanopyMicroclimate {
            air_temperature: Celsius::new(t),
            relative_humidity: rh,
            wind_speed: MetersPerSecond::new(wind),
            canopy_height: Meters::new(h),
        }
    }

    #[test]
    fn test_aerodynamic_variant_typical_day() {
        let r = evapo_trans(
            PhotonFlux::new(1200.0),
            &climate(25.0, 0.6, 2.0, 2.0),
            ConductanceSource::Supplied(StomatalConductance::new(300.0)),
        )
        .unwrap();
        assert!(r.transpiration > 0.0);
        assert!(r.penman > 0.0 && r.priestley_taylor > 0.0);
        assert!(r.convergence.iterations() <= MAX_ITERATIONS);
        assert!(r.leaf_temperature_offset.abs() <= CelsiusDelta::new(AERODYNAMIC_OFFSET_LIMIT));
        assert!((*r.layer_conductance - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_aerodynamic_variant_floors_zero_conductance() {
        let r = evapo_trans(
            PhotonFlux::new(500.0),
            &climate(20.0, 0.5, 0.0, 0.0),
            ConductanceSource::Supplied(StomatalConductance::new(0.0)),
        )
        .unwrap();
        assert!((*r.layer_conductance - 410.0).abs() < 1e-9);
    }

    #[test]
    fn test_aerodynamic_variant_with_c3_conductance() {
        let params = C3Parameters::default();
        let r = evapo_trans(
            PhotonFlux::new(1500.0),
            &climate(25.0, 0.7, 3.0, 3.0),
            ConductanceSource::C3 {
                parameters: &params,
                co2: 400.0,
                water_stress: Fraction::ONE,
            },
        )
        .unwrap();
        assert!(*r.layer_conductance > 10.0 && *r.layer_conductance <= 800.0);
    }

    #[test]
    fn test_tall_canopy_raises_reference_height() {
        // 10 m canopy would put the 5 m reference inside the canopy
        let r = evapo_trans(
            PhotonFlux::new(800.0),
            &climate(22.0, 0.5, 2.0, 10.0),
            ConductanceSource::Supplied(StomatalConductance::new(200.0)),
        )
        .unwrap();
        assert!(r.transpiration.is_finite());
    }

    #[test]
    fn test_humidity_above_saturation_is_rejected() {
        let err = evapo_trans(
            PhotonFlux::new(800.0),
            &climate(22.0, 1.2, 2.0, 1.0),
            ConductanceSource::Supplied(StomatalConductance::new(200.0)),
        )
        .unwrap_err();
        assert!(matches!(err, CanopyError::RelativeHumidityAbove100(p) if (p - 120.0).abs() < 1e-9));
    }

    #[test]
    fn test_boundary_layer_variant_selects_estimator() {
        let c = climate(28.0, 0.4, 1.5, 1.0);
        let run = |e| {
            evapo_trans2(
                PhotonFlux::new(1500.0),
                PhotonFlux::new(800.0),
                &c,
                StomatalConductance::new(250.0),
                Meters::new(0.04),
                e,
            )
            .unwrap()
        };
        let diffusion = run(TranspirationEstimator::Diffusion);
        let penman = run(TranspirationEstimator::Penman);
        let pt = run(TranspirationEstimator::PriestleyTaylor);

        assert_eq!(penman.transpiration, penman.penman);
        assert_eq!(pt.transpiration, pt.priestley_taylor);
        assert_eq!(diffusion.penman, penman.penman);
        // Stomata restrict the resistance form below the open-water Penman rate
        assert!(diffusion.transpiration < diffusion.penman);
        assert!(diffusion.leaf_temperature_offset.abs() <= CelsiusDelta::new(10.0));
    }

    #[test]
    fn test_boundary_layer_variant_rejects_excess_radiation() {
        let err = evapo_trans2(
            PhotonFlux::new(3000.0),
            PhotonFlux::new(1000.0),
            &climate(25.0, 0.5, 2.0, 1.0),
            StomatalConductance::new(250.0),
            Meters::new(0.04),
            TranspirationEstimator::Diffusion,
        )
        .unwrap_err();
        assert!(matches!(err, CanopyError::RadiationOutOfRange(w) if (w - 705.0).abs() < 1e-9));
    }
}
