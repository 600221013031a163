//! Multi-layer canopy light profile
//!
//! Distributes direct and diffuse irradiance through `n` equal-LAI canopy
//! layers using an ellipsoidal leaf-angle extinction coefficient, and
//! partitions each layer's leaf area into sunlit and shaded fractions.
//!
//! # Scientific References
//! - Campbell, G.S. (1986). "Extinction coefficients for radiation in plant
//!   canopies calculated using an ellipsoidal inclination angle distribution".
//!   Agricultural and Forest Meteorology, 36, 317-321
//! - Campbell, G.S. & Norman, J.M. (1998). "An Introduction to Environmental
//!   Biophysics", 2nd ed., Ch. 15
//! - Humphries, S.W. & Long, S.P. (1995). "WIMOVAC: a software package for
//!   modelling the dynamics of plant leaf and canopy photosynthesis"

use super::check_layer_count;
use crate::core_types::units::{Fraction, Meters, PhotonFlux};
use crate::error::{CanopyError, Result};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// Leaf absorptivity for scattered beam radiation
const ALPHA_SCATTER: f64 = 0.8;

/// Extinction coefficients and geometry of the canopy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanopyLightParameters {
    /// Extinction coefficient for diffuse light (kd)
    pub diffuse_extinction: f64,
    /// Ellipsoidal leaf-angle distribution parameter (chi, 1 = spherical)
    pub leaf_angle_chi: f64,
    /// Leaf area per metre of canopy height, used to map cumulative LAI to height
    pub height_factor: f64,
}

impl Default for CanopyLightParameters {
    fn default() -> Self {
        Self {
            diffuse_extinction: 0.7,
            leaf_angle_chi: 1.0,
            height_factor: 3.0,
        }
    }
}

/// Irradiance and leaf partitioning in one canopy layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanopyLayerLight {
    /// Irradiance on sunlit leaves (beam plus diffuse)
    pub direct_irradiance: PhotonFlux,
    /// Irradiance on shaded leaves (sky diffuse plus scattered beam)
    pub diffuse_irradiance: PhotonFlux,
    /// Leaf-area-weighted average irradiance absorbed by the layer
    pub total_irradiance: PhotonFlux,
    pub sunlit_fraction: Fraction,
    pub shaded_fraction: Fraction,
    /// Height of the layer's mid-point above the canopy base
    pub height: Meters,
}

/// Per-layer light environment, top of the canopy first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightProfile {
    pub layers: Vec<CanopyLayerLight>,
    /// Direct-beam extinction coefficient used for the profile
    pub extinction_coefficient: f64,
}

/// Direct-beam extinction coefficient for an ellipsoidal leaf-angle distribution
///
/// k = √(χ² + tan²θ) / (χ + 1.744·(χ + 1.183)^-0.733)
///
/// The sign is chosen so that `k` stays positive when the denominator is
/// negative.
///
/// # References
/// Campbell (1986), Campbell & Norman (1998) eq. 15.4
pub fn direct_beam_extinction(cos_zenith: f64, leaf_angle_chi: f64) -> f64 {
    let theta = cos_zenith.acos();
    let k0 = (leaf_angle_chi.powi(2) + theta.tan().powi(2)).sqrt();
    let k1 = leaf_angle_chi + 1.744 * (leaf_angle_chi + 1.183).powf(-0.733);
    if k1 > 0.0 {
        k0 / k1
    } else {
        -k0 / k1
    }
}

/// `(1 - e^(-k·x)) / k`, with its limit `x` as `k → 0`
fn attenuated_area(k: f64, x: f64) -> f64 {
    if k.abs() < 1e-12 {
        x
    } else {
        -(-k * x).exp_m1() / k
    }
}

/// Light profile of an `n`-layer canopy
///
/// # Arguments
/// * `direct` - Direct-beam irradiance above the canopy
/// * `diffuse` - Diffuse irradiance above the canopy
/// * `leaf_area_index` - Total LAI
/// * `layers` - Number of layers, `1..=200`
/// * `cos_zenith` - Cosine of the solar zenith angle, `(0, 1]`
/// * `params` - Canopy extinction and geometry parameters
///
/// # Errors
/// Out-of-range layer count or zenith cosine, negative irradiance, or negative LAI.
pub fn sun_ml(
    direct: PhotonFlux,
    diffuse: PhotonFlux,
    leaf_area_index: f64,
    layers: usize,
    cos_zenith: f64,
    params: &CanopyLightParameters,
) -> Result<LightProfile> {
    check_layer_count(layers)?;
    if !(cos_zenith > 0.0 && cos_zenith <= 1.0) {
        warn!(cos_zenith, "Light profile rejected zenith cosine");
        return Err(CanopyError::CosZenithOutOfRange(cos_zenith));
    }
    for (name, value) in [("direct", *direct), ("diffuse", *diffuse)] {
        if value < 0.0 {
            warn!(name, value, "Light profile rejected negative irradiance");
            return Err(CanopyError::NegativeIrradiance { name, value });
        }
    }
    if leaf_area_index < 0.0 {
        warn!(leaf_area_index, "Light profile rejected negative LAI");
        return Err(CanopyError::NegativeLeafAreaIndex(leaf_area_index));
    }

    let k = direct_beam_extinction(cos_zenith, params.leaf_angle_chi);
    let kd = params.diffuse_extinction;
    let layer_lai = leaf_area_index / layers as f64;
    let beam = *direct * cos_zenith;
    let solar = beam * k;

    let profile = (0..layers)
        .map(|i| {
            let cum_lai = layer_lai * (i as f64 + 0.5);

            let scattered =
                beam * (-k * ALPHA_SCATTER.sqrt() * cum_lai).exp() - beam * (-k * cum_lai).exp();
            let diffuse_here = *diffuse * (-kd * cum_lai).exp() + scattered;

            // Sunlit leaf area of the layer; an empty layer counts as fully sunlit
            let sunlit_area = attenuated_area(k, layer_lai) * (-k * cum_lai).exp();
            let sunlit = if layer_lai > 0.0 {
                Fraction::saturating(sunlit_area / layer_lai)
            } else {
                Fraction::ONE
            };
            let shaded = sunlit.complement();

            let average = (sunlit * (solar + diffuse_here) + shaded * diffuse_here)
                * attenuated_area(k, layer_lai);

            trace!(layer = i, cum_lai, sunlit = *sunlit, "Canopy layer light");

            CanopyLayerLight {
                direct_irradiance: PhotonFlux::new(solar + diffuse_here),
                diffuse_irradiance: PhotonFlux::new(diffuse_here),
                total_irradiance: PhotonFlux::new(average),
                sunlit_fraction: sunlit,
                shaded_fraction: shaded,
                height: Meters::new((leaf_area_index - cum_lai) / params.height_factor),
            }
        })
        .collect();

    Ok(LightProfile {
        layers: profile,
        extinction_coefficient: k,
    })
}
