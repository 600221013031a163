//! Within-canopy profiles of wind, humidity and leaf nitrogen
//!
//! Simple exponential-decay profiles evaluated per layer, top of the canopy
//! first. They supply the per-layer forcing for the photosynthesis and leaf
//! energy-balance solvers.

use super::check_layer_count;
use crate::core_types::units::MetersPerSecond;
use crate::error::Result;

/// Wind attenuation coefficient per unit LAI
const WIND_EXTINCTION: f64 = 0.7;

/// Wind speed in each layer
///
/// u_i = u · exp(-0.7 · LAI_above_i), where `LAI_above_i` is the leaf area
/// above the top of layer `i` (zero for the top layer).
///
/// # Errors
/// Layer count outside `1..=200`.
pub fn wind_profile(
    wind_speed: MetersPerSecond,
    leaf_area_index: f64,
    layers: usize,
) -> Result<Vec<MetersPerSecond>> {
    Ok(exponential_decay(*wind_speed, leaf_area_index, layers, WIND_EXTINCTION)?
        .into_iter()
        .map(MetersPerSecond::new)
        .collect())
}

/// Relative humidity (0-1 fraction) in each layer
///
/// RH_i = RH · exp((1 - RH) · (i + 1) / n). Humidity rises toward the
/// bottom of the canopy; values are capped at saturation.
///
/// # Errors
/// Layer count outside `1..=200`.
pub fn relative_humidity_profile(relative_humidity: f64, layers: usize) -> Result<Vec<f64>> {
    check_layer_count(layers)?;
    let kh = 1.0 - relative_humidity;
    Ok((1..=layers)
        .map(|j| {
            let rh = relative_humidity * (kh * j as f64 / layers as f64).exp();
            rh.min(1.0)
        })
        .collect())
}

/// Leaf nitrogen concentration in each layer
///
/// N_i = N · exp(-kpLN · LAI_above_i)
///
/// # Errors
/// Layer count outside `1..=200`.
pub fn leaf_nitrogen_profile(
    leaf_nitrogen: f64,
    leaf_area_index: f64,
    layers: usize,
    nitrogen_decay: f64,
) -> Result<Vec<f64>> {
    exponential_decay(leaf_nitrogen, leaf_area_index, layers, nitrogen_decay)
}

fn exponential_decay(top: f64, leaf_area_index: f64, layers: usize, k: f64) -> Result<Vec<f64>> {
    check_layer_count(layers)?;
    let layer_lai = leaf_area_index / layers as f64;
    Ok((0..layers)
        .map(|i| {
            let lai_above = layer_lai * i as f64;
            top * (-k * lai_above).exp()
        })
        .collect())
}
