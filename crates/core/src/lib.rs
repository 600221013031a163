//! Canopy Simulation Core Library
//!
//! Numerical core of a crop growth model: the per-hour physics that turns
//! weather into canopy carbon gain and water use.
//!
//! ## Canopy
//!
//! - Sun position and the direct/diffuse split of incoming light
//! - Multi-layer sunlit/shaded light profile with a leaf-angle extinction model
//! - Wind, humidity and leaf nitrogen profiles through the canopy
//!
//! ## Leaf
//!
//! - C3 photosynthesis (Farquhar-von Caemmerer-Berry) coupled to Ball-Berry
//!   stomatal conductance by fixed-point iteration
//! - Leaf boundary layer conductance (forced and free convection)
//! - Leaf energy balance with Penman-Monteith transpiration, in an
//!   aerodynamic-conductance form and a boundary-layer form
//!
//! ## Soil
//!
//! - Soil surface evaporation
//! - Water-stress coefficients for photosynthesis and leaf expansion
//! - Poisson root distribution
//! - Single-layer and layered hourly water balances
//!
//! All solvers are pure functions of their inputs apart from the soil
//! water-content buffer, which the caller owns and [`physics::soil_ml`]
//! updates in place.

// Core types and utilities
pub mod core_types;
pub mod error;

// Canopy, leaf and soil models
pub mod physics;

pub use core_types::{
    Celsius, CelsiusDelta, Convergence, Degrees, Fraction, Kelvin, Meters, MetersPerSecond,
    PhotonFlux, SoilTexture, SoilType, StomatalConductance,
};
pub use error::{CanopyError, Result};
pub use physics::{
    c3_photosynthesis, evapo_trans, evapo_trans2, soil_ml, sun_ml, watstr, C3Parameters,
    LeafEnvironment, LeafGasExchange, LightProfile, MultiLayerWaterBalance, SoilColumnParameters,
};
