//! Soil water-stress coefficients
//!
//! Maps a layer's volumetric water content to two reduction factors: one for
//! photosynthetic capacity and a harsher one for leaf expansion. Leaf
//! expansion responds first as soil dries.

use crate::core_types::units::Fraction;
use serde::{Deserialize, Serialize};

/// Smallest photosynthesis coefficient reported
const MIN_PHOTOSYNTHESIS_COEFFICIENT: f64 = 1e-10;

/// Functional form of the photosynthesis stress response
///
/// The variants are evaluated exactly as named; no fallthrough between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WaterStressFunction {
    /// Linear from 0 at wilting point to 1 at field capacity
    #[default]
    Linear,
    /// Logistic centred between wilting point and field capacity, width `phi1`
    Logistic,
    /// Saturating exponential of the rescaled water content
    Exponential,
    /// No stress
    None,
}

/// Reduction factors applied to the crop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterStressCoefficients {
    /// Multiplier on photosynthetic capacity (or stomatal conductance)
    pub photosynthesis: Fraction,
    /// Multiplier on specific leaf area expansion
    pub leaf_expansion: Fraction,
}

impl Default for WaterStressCoefficients {
    fn default() -> Self {
        Self {
            photosynthesis: Fraction::ONE,
            leaf_expansion: Fraction::ONE,
        }
    }
}

/// Stress coefficients of one soil layer
///
/// # Arguments
/// * `water_content` - Volumetric water content
/// * `field_capacity` - Field capacity
/// * `wilting_point` - Permanent wilting point
/// * `phi1` - Logistic width parameter
/// * `phi2` - Leaf-expansion exponent, `(θ/θfc)^phi2`
/// * `function` - Photosynthesis response form
pub fn layer_water_stress(
    water_content: f64,
    field_capacity: f64,
    wilting_point: f64,
    phi1: f64,
    phi2: f64,
    function: WaterStressFunction,
) -> WaterStressCoefficients {
    let (fc, wp, theta) = (field_capacity, wilting_point, water_content);

    let photosynthesis = match function {
        WaterStressFunction::Linear => {
            let slope = 1.0 / (fc - wp);
            let intercept = 1.0 - fc * slope;
            slope * theta + intercept
        }
        WaterStressFunction::Logistic => {
            let midpoint = (fc + wp) / 2.0;
            1.0 / (1.0 + ((midpoint - theta) / phi1).exp())
        }
        WaterStressFunction::Exponential => {
            let slope = (1.0 - wp) / (fc - wp);
            let intercept = 1.0 - fc * slope;
            let rescaled = slope * theta + intercept;
            (1.0 - (-2.5 * (rescaled - wp) / (1.0 - wp)).exp()) / (1.0 - (-2.5_f64).exp())
        }
        WaterStressFunction::None => 1.0,
    };

    let leaf_expansion = match function {
        WaterStressFunction::None => 1.0,
        _ => (theta / fc).powf(phi2),
    };

    WaterStressCoefficients {
        photosynthesis: Fraction::saturating(photosynthesis.max(MIN_PHOTOSYNTHESIS_COEFFICIENT)),
        leaf_expansion: Fraction::saturating(leaf_expansion),
    }
}
