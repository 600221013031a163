//! Domain errors raised by the canopy and soil solvers
//!
//! Only two kinds of anomaly become errors: violated entry preconditions
//! (layer counts, zenith angle, negative inputs) and physically impossible
//! derived quantities that point at corrupt upstream forcing. Everything else
//! (iteration caps, out-of-range intermediates) is absorbed by clamping and
//! reported through the result values.

use thiserror::Error;

/// Errors returned by the canopy and soil solvers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CanopyError {
    /// Layer count outside `1..=max`
    #[error("layer count {value} must be at least 1 but no more than {max}")]
    LayerCountOutOfRange { value: usize, max: usize },

    /// Cosine of the solar zenith angle outside `(0, 1]`
    #[error("cosine of the zenith angle must be positive but no more than 1, got {0}")]
    CosZenithOutOfRange(f64),

    /// A named irradiance input was negative
    #[error("{name} irradiance must be non-negative, got {value}")]
    NegativeIrradiance { name: &'static str, value: f64 },

    #[error("leaf area index must be non-negative, got {0}")]
    NegativeLeafAreaIndex(f64),

    /// Aerodynamic conductance came out negative (canopy geometry is inconsistent)
    #[error("aerodynamic conductance is negative ({0} m/s)")]
    NegativeAerodynamicConductance(f64),

    #[error("relative humidity exceeds 100% ({0}%)")]
    RelativeHumidityAbove100(f64),

    #[error("saturation vapour pressure is negative ({0})")]
    NegativeSaturationVaporPressure(f64),

    /// Absorbed short-wave radiation above the 650 W/m² physical ceiling
    #[error("total radiation too high ({0} W/m²)")]
    RadiationOutOfRange(f64),

    /// Depth boundaries or water-content buffer do not describe a valid column
    #[error("invalid soil profile: {0}")]
    InvalidSoilProfile(String),

    /// Legacy integer soil code outside `0..=10`
    #[error("unknown soil type code {0}")]
    UnknownSoilType(u8),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CanopyError>;
