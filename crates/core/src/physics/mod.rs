//! Canopy, leaf and soil process models
//!
//! Each module is a set of pure functions over plain parameter structs; the
//! only mutable state is the soil water-content buffer passed to
//! [`soil_water::soil_ml`].

pub mod boundary_layer;
pub mod evapotranspiration;
pub mod light_profile;
pub mod photosynthesis;
pub mod profiles;
pub mod root_distribution;
pub mod soil_evaporation;
pub mod soil_water;
pub mod solar;
pub mod thermodynamics;
pub mod water_stress;

use crate::error::{CanopyError, Result};
use tracing::warn;

pub use boundary_layer::leaf_boundary_layer_conductance;
pub use evapotranspiration::{
    evapo_trans, evapo_trans2, CanopyMicroclimate, ConductanceSource, LeafEnergyBalance,
    TranspirationEstimator,
};
pub use light_profile::{sun_ml, CanopyLayerLight, CanopyLightParameters, LightProfile};
pub use photosynthesis::{
    ball_berry, c3_photosynthesis, C3Parameters, LeafEnvironment, LeafGasExchange, LimitingRate,
    WaterStressApproach,
};
pub use profiles::{leaf_nitrogen_profile, relative_humidity_profile, wind_profile};
pub use root_distribution::{root_distribution, uniform_layer_depths};
pub use soil_evaporation::{soil_evaporation, SoilEvaporationMethod, SoilSurfaceForcing};
pub use soil_water::{
    soil_ml, watstr, ColumnForcing, MultiLayerWaterBalance, SingleLayerWaterBalance,
    SoilColumnParameters, SoilLayerState, SoilWaterParameters,
};
pub use solar::{cos_zenith_angle, light_macro_environment, LightMacroEnvironment};
pub use water_stress::{layer_water_stress, WaterStressCoefficients, WaterStressFunction};

/// Largest number of canopy or soil layers accepted
pub const MAX_LAYERS: usize = 200;

/// Reject layer counts outside `1..=MAX_LAYERS`
pub(crate) fn check_layer_count(layers: usize) -> Result<()> {
    if layers == 0 || layers > MAX_LAYERS {
        warn!(layers, max = MAX_LAYERS, "Layer count out of range");
        return Err(CanopyError::LayerCountOutOfRange {
            value: layers,
            max: MAX_LAYERS,
        });
    }
    Ok(())
}
