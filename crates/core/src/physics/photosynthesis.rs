//! Coupled C3 photosynthesis and stomatal conductance
//!
//! Farquhar-type biochemistry (Rubisco, electron transport and triose-phosphate
//! utilisation limits) iterated jointly with the Ball-Berry stomatal model
//! until the net assimilation rate is self-consistent with the intercellular
//! CO2 it implies.
//!
//! # Scientific References
//! - Farquhar, G.D., von Caemmerer, S. & Berry, J.A. (1980). "A biochemical
//!   model of photosynthetic CO2 assimilation in leaves of C3 species".
//!   Planta, 149, 78-90
//! - Bernacchi, C.J. et al. (2001). "Improved temperature response functions
//!   for models of Rubisco-limited photosynthesis". Plant, Cell & Environment,
//!   24, 253-259
//! - Ball, J.T., Woodrow, I.E. & Berry, J.A. (1987). "A model predicting
//!   stomatal conductance and its contribution to the control of
//!   photosynthesis under different environmental conditions"
//! - Collatz, G.J. et al. (1991). Agricultural and Forest Meteorology, 54, 107-136

use crate::core_types::convergence::Convergence;
use crate::core_types::units::{Celsius, Fraction, Kelvin, PhotonFlux, StomatalConductance};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// Universal gas constant (J K⁻¹ mol⁻¹)
const GAS_CONSTANT: f64 = 8.314472;

/// Atmospheric pressure (Pa)
const ATMOSPHERIC_PRESSURE: f64 = 101_325.0;

/// Leaf reflectance for PAR
const LEAF_REFLECTANCE: f64 = 0.2;

/// Maximum triose-phosphate utilisation rate (mol m⁻² s⁻¹)
const MAXIMUM_TPU_RATE: f64 = 23e-6;

/// Maximum fixed-point passes of the assimilation/conductance loop
pub const MAX_ITERATIONS: u32 = 50;

/// Convergence tolerance on net assimilation (mol m⁻² s⁻¹)
const ASSIMILATION_TOLERANCE: f64 = 1e-8;

/// Conductance bounds (mmol m⁻² s⁻¹)
pub const MIN_STOMATAL_CONDUCTANCE: f64 = 1e-5;
pub const MAX_STOMATAL_CONDUCTANCE: f64 = 800.0;

/// Floor for non-positive ambient CO2 (µmol mol⁻¹)
const MIN_AMBIENT_CO2: f64 = 1e-4;

/// Floor for intercellular CO2 partial pressure (Pa)
const MIN_INTERCELLULAR_PRESSURE: f64 = 1e-5;

/// Leaf boundary-layer conductance to water vapour assumed by Ball-Berry (mol m⁻² s⁻¹)
const BALL_BERRY_BOUNDARY_CONDUCTANCE: f64 = 1.2;

/// Where the soil water-stress factor acts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WaterStressApproach {
    /// Scale net assimilation before conductance is computed
    #[default]
    Assimilation,
    /// Scale stomatal conductance after it has been clamped
    Conductance,
}

/// Biochemical and stomatal parameters of a C3 leaf
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct C3Parameters {
    /// Maximum carboxylation rate at 25°C (µmol m⁻² s⁻¹)
    pub vcmax: f64,
    /// Maximum electron transport rate (µmol m⁻² s⁻¹)
    pub jmax: f64,
    /// Dark respiration at 25°C (µmol m⁻² s⁻¹)
    pub dark_respiration: f64,
    /// Ball-Berry intercept (mol m⁻² s⁻¹)
    pub ball_berry_intercept: f64,
    /// Ball-Berry slope (dimensionless)
    pub ball_berry_slope: f64,
    /// Atmospheric O2 (mmol mol⁻¹)
    pub oxygen: f64,
    /// Curvature of the electron-transport light response at 0°C
    pub curvature: f64,
    pub electrons_per_carboxylation: f64,
    pub electrons_per_oxygenation: f64,
    pub water_stress_approach: WaterStressApproach,
}

impl Default for C3Parameters {
    fn default() -> Self {
        Self {
            vcmax: 100.0,
            jmax: 180.0,
            dark_respiration: 1.1,
            ball_berry_intercept: 0.08,
            ball_berry_slope: 5.0,
            oxygen: 210.0,
            curvature: 0.7,
            electrons_per_carboxylation: 4.5,
            electrons_per_oxygenation: 5.25,
            water_stress_approach: WaterStressApproach::Assimilation,
        }
    }
}

/// Leaf-level forcing of the photosynthesis solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeafEnvironment {
    /// Incident photosynthetic photon flux
    pub photon_flux: PhotonFlux,
    pub leaf_temperature: Celsius,
    /// Relative humidity (0-1 fraction)
    pub relative_humidity: f64,
    /// Ambient CO2 mole fraction (µmol mol⁻¹)
    pub co2: f64,
    /// Soil water-stress coefficient (1 = unstressed)
    pub water_stress: Fraction,
}

/// Which biochemical process set the carboxylation rate
///
/// Exact ties resolve in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitingRate {
    Rubisco,
    ElectronTransport,
    TriosePhosphateUtilization,
}

impl fmt::Display for LimitingRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LimitingRate::Rubisco => "Rubisco",
            LimitingRate::ElectronTransport => "electron transport",
            LimitingRate::TriosePhosphateUtilization => "TPU",
        };
        f.write_str(name)
    }
}

/// Result of the coupled photosynthesis/conductance solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeafGasExchange {
    /// Net CO2 assimilation (µmol m⁻² s⁻¹)
    pub net_assimilation: f64,
    /// Gross CO2 assimilation, net plus dark respiration (µmol m⁻² s⁻¹)
    pub gross_assimilation: f64,
    pub stomatal_conductance: StomatalConductance,
    /// Intercellular CO2 mole fraction (µmol mol⁻¹)
    pub intercellular_co2: f64,
    pub limiting_rate: LimitingRate,
    pub convergence: Convergence,
}

/// Exponential term of the Arrhenius function, `exp(c - Ea / (R·T))`
///
/// # Arguments
/// * `c` - Scaling constant (dimensionless)
/// * `activation_energy` - Activation energy (J mol⁻¹)
/// * `temperature` - Absolute temperature
pub fn arrhenius_exponent(c: f64, activation_energy: f64, temperature: Kelvin) -> f64 {
    (c - activation_energy / (GAS_CONSTANT * *temperature)).exp()
}

/// Temperature correction of O2 solubility relative to 25°C
fn oxygen_solubility(leaf_temperature: f64) -> f64 {
    let t = leaf_temperature;
    if t > 24.0 && t < 26.0 {
        1.0
    } else {
        (0.047 - 0.0013087 * t + 2.5603e-05 * t.powi(2) - 2.1441e-07 * t.powi(3)) / 0.026934
    }
}

/// Ball-Berry stomatal conductance to water vapour
///
/// Solves the leaf-surface humidity `hs` from the quadratic coupling the
/// boundary layer and stomata, then `gs = β1·hs·A/Cs + β0`.
///
/// # Arguments
/// * `assimilation` - Net assimilation (mol m⁻² s⁻¹)
/// * `co2` - Ambient CO2 (mol mol⁻¹)
/// * `relative_humidity` - Ambient relative humidity (0-1)
/// * `intercept` - β0 (mol m⁻² s⁻¹)
/// * `slope` - β1 (dimensionless)
///
/// # References
/// Ball et al. (1987), Collatz et al. (1991) Appendix
pub fn ball_berry(
    assimilation: f64,
    co2: f64,
    relative_humidity: f64,
    intercept: f64,
    slope: f64,
) -> StomatalConductance {
    let gbw = BALL_BERRY_BOUNDARY_CONDUCTANCE;

    let mut surface_co2 = co2 - (1.4 / gbw) * assimilation;
    if surface_co2 < 0.0 {
        surface_co2 = 1.0;
    }

    let gs = if assimilation > 0.0 {
        let a_over_cs = assimilation / surface_co2;
        let aaa = slope * a_over_cs;
        let bbb = intercept + gbw - slope * a_over_cs;
        let ccc = -(relative_humidity * gbw + intercept);
        let hs = (-bbb + (bbb * bbb - 4.0 * aaa * ccc).sqrt()) / (2.0 * aaa);
        slope * hs * a_over_cs + intercept
    } else {
        intercept
    };

    // mol → mmol
    StomatalConductance::new(gs * 1e3)
}

/// Coupled C3 photosynthesis/stomatal conductance for one leaf
///
/// Iterates until successive net assimilation estimates differ by less than
/// 1e-8 mol m⁻² s⁻¹ or 50 passes have been made. Hitting the cap is not an
/// error; the outcome is reported in [`LeafGasExchange::convergence`].
pub fn c3_photosynthesis(env: &LeafEnvironment, params: &C3Parameters) -> LeafGasExchange {
    let tleaf = *env.leaf_temperature;
    let tk = env.leaf_temperature.to_kelvin();

    // Kinetic constants, Bernacchi et al. (2001)
    let kc = 1e-6 * arrhenius_exponent(38.05, 79.43e3, tk);
    let ko = 1e-3 * arrhenius_exponent(20.30, 36.38e3, tk);
    let gamma_star = 1e-6 * arrhenius_exponent(19.02, 37.83e3, tk);
    let vcmax = params.vcmax * 1e-6 * arrhenius_exponent(26.35, 65.33e3, tk);
    let rd = params.dark_respiration * 1e-6 * arrhenius_exponent(18.72, 46.39e3, tk);
    let jmax = params.jmax * 1e-6;

    let theta = params.curvature + 0.018 * tleaf - 3.7e-4 * tleaf.powi(2);

    // Light-limited electron transport (non-rectangular hyperbola)
    let fe_ii = 0.352 + 0.022 * tleaf - 3.4e-4 * tleaf.powi(2);
    let i2 = env.photon_flux.to_mol_per_square_meter_second() * fe_ii * (1.0 - LEAF_REFLECTANCE)
        / 2.0;
    let disc = ((jmax + i2).powi(2) - 4.0 * theta * i2 * jmax).max(0.0);
    let j = (jmax + i2 - disc.sqrt()) / (2.0 * theta);

    let oi = params.oxygen * 1e-3 * oxygen_solubility(tleaf);

    let ca = if env.co2 <= 0.0 { MIN_AMBIENT_CO2 } else { env.co2 };
    let ca_pa = ca * 1e-6 * ATMOSPHERIC_PRESSURE;

    let stress = *env.water_stress;
    let mut ci_pa = 0.0;
    let mut assimilation = 0.0;
    let mut gs = MIN_STOMATAL_CONDUCTANCE;
    let mut limiting = LimitingRate::Rubisco;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < MAX_ITERATIONS {
        iterations += 1;
        let previous = assimilation;
        let ci = ci_pa / ATMOSPHERIC_PRESSURE;

        let ac = vcmax * (ci - gamma_star) / (ci + kc * (1.0 + oi / ko));
        let aj = (j * (ci - gamma_star)
            / (params.electrons_per_carboxylation * ci
                + 2.0 * params.electrons_per_oxygenation * gamma_star))
            .max(0.0);
        let ap = 3.0 * MAXIMUM_TPU_RATE / (1.0 - gamma_star / ci);

        let (vc, rate) = if ac <= aj && ac <= ap {
            (ac, LimitingRate::Rubisco)
        } else if aj <= ap {
            (aj, LimitingRate::ElectronTransport)
        } else {
            (ap.max(0.0), LimitingRate::TriosePhosphateUtilization)
        };
        limiting = rate;

        assimilation = vc - rd;
        if params.water_stress_approach == WaterStressApproach::Assimilation {
            assimilation *= stress;
        }

        gs = (*ball_berry(
            assimilation,
            ca * 1e-6,
            env.relative_humidity,
            params.ball_berry_intercept,
            params.ball_berry_slope,
        ))
        .clamp(MIN_STOMATAL_CONDUCTANCE, MAX_STOMATAL_CONDUCTANCE);
        if params.water_stress_approach == WaterStressApproach::Conductance {
            gs = (gs * stress).max(MIN_STOMATAL_CONDUCTANCE);
        }

        // Fick's law through the stomata; 1.6 is the H2O/CO2 diffusivity ratio
        ci_pa = ca_pa - assimilation * 1.6 * ATMOSPHERIC_PRESSURE / (gs * 1e-3);
        if ci_pa < 0.0 {
            ci_pa = MIN_INTERCELLULAR_PRESSURE;
        }

        trace!(
            iteration = iterations,
            assimilation,
            gs,
            ci_pa,
            "C3 assimilation iteration"
        );

        if (previous - assimilation).abs() < ASSIMILATION_TOLERANCE {
            converged = true;
            break;
        }
    }

    let convergence = Convergence::from_loop(iterations, converged);
    debug!(
        %convergence,
        %limiting,
        net_assimilation = assimilation * 1e6,
        "C3 photosynthesis solved"
    );

    LeafGasExchange {
        net_assimilation: assimilation * 1e6,
        gross_assimilation: (assimilation + rd) * 1e6,
        stomatal_conductance: StomatalConductance::new(gs),
        intercellular_co2: ci_pa / ATMOSPHERIC_PRESSURE * 1e6,
        limiting_rate: limiting,
        convergence,
    }
}
