//! Soil texture classes and their hydraulic constants
//!
//! Eleven USDA texture classes with the water-retention and conductivity
//! constants tabulated by Campbell & Norman. The table is static reference
//! data; the soil-water solvers only read it.
//!
//! # References
//! - Campbell, G.S. & Norman, J.M. (1998). "An Introduction to Environmental
//!   Biophysics", 2nd ed., Table 9.1, p. 130
//! - Bulk densities after the CENTURY `getsoilprop` tables

use crate::error::CanopyError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// USDA soil texture class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SoilType {
    Sand,
    LoamySand,
    SandyLoam,
    #[default]
    Loam,
    SiltLoam,
    SandyClayLoam,
    ClayLoam,
    SiltyClayLoam,
    SandyClay,
    SiltyClay,
    Clay,
}

/// Static hydraulic constants of one texture class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilTexture {
    /// Sand mass fraction
    pub sand: f64,
    /// Silt mass fraction
    pub silt: f64,
    /// Clay mass fraction
    pub clay: f64,
    /// Air-entry water potential (J/kg, negative)
    pub air_entry: f64,
    /// Campbell pore-size distribution exponent
    pub b: f64,
    /// Saturated hydraulic conductivity (kg s m⁻³)
    pub saturated_conductivity: f64,
    /// Volumetric water content at saturation
    pub saturation: f64,
    /// Volumetric water content at field capacity (-33 kPa)
    pub field_capacity: f64,
    /// Volumetric water content at permanent wilting point (-1500 kPa)
    pub wilting_point: f64,
    /// Bulk density (Mg m⁻³)
    pub bulk_density: f64,
}

impl SoilType {
    /// All classes in legacy code order
    pub const ALL: [SoilType; 11] = [
        SoilType::Sand,
        SoilType::LoamySand,
        SoilType::SandyLoam,
        SoilType::Loam,
        SoilType::SiltLoam,
        SoilType::SandyClayLoam,
        SoilType::ClayLoam,
        SoilType::SiltyClayLoam,
        SoilType::SandyClay,
        SoilType::SiltyClay,
        SoilType::Clay,
    ];

    /// Look up the hydraulic constants of this class
    #[must_use]
    pub const fn texture(self) -> SoilTexture {
        // (sand, silt, clay, air_entry, b, Ks, saturation, fc, wp, bulk density)
        let (sand, silt, clay, air_entry, b, ks, satur, fc, wp, bulkd) = match self {
            // Bulk density is undefined for pure sand; a small placeholder keeps it positive
            SoilType::Sand => (0.92, 0.05, 0.03, -0.7, 1.7, 5.8e-3, 0.87, 0.09, 0.03, 0.01),
            SoilType::LoamySand => (0.81, 0.12, 0.07, -0.9, 2.1, 1.7e-3, 0.72, 0.13, 0.06, 1.55),
            SoilType::SandyLoam => (0.65, 0.25, 0.10, -1.5, 3.1, 7.2e-4, 0.57, 0.21, 0.10, 1.50),
            SoilType::Loam => (0.52, 0.40, 0.18, -1.1, 4.5, 3.7e-4, 0.57, 0.27, 0.12, 1.43),
            SoilType::SiltLoam => (0.20, 0.65, 0.15, -2.1, 4.7, 1.9e-4, 0.59, 0.33, 0.13, 1.36),
            SoilType::SandyClayLoam => (0.60, 0.13, 0.27, -2.8, 4.0, 1.2e-4, 0.48, 0.26, 0.15, 1.39),
            SoilType::ClayLoam => (0.32, 0.34, 0.34, -2.6, 5.2, 6.4e-5, 0.52, 0.32, 0.20, 1.35),
            // Wilting point uses the published errata value (0.21)
            SoilType::SiltyClayLoam => (0.09, 0.58, 0.33, -3.3, 6.6, 4.2e-5, 0.52, 0.37, 0.21, 1.24),
            SoilType::SandyClay => (0.53, 0.07, 0.40, -2.9, 6.0, 3.3e-5, 0.51, 0.34, 0.24, 1.30),
            SoilType::SiltyClay => (0.10, 0.45, 0.45, -3.4, 7.9, 2.5e-5, 0.52, 0.39, 0.25, 1.28),
            SoilType::Clay => (0.20, 0.20, 0.60, -3.7, 7.6, 1.7e-5, 0.53, 0.40, 0.27, 1.19),
        };
        SoilTexture {
            sand,
            silt,
            clay,
            air_entry,
            b,
            saturated_conductivity: ks,
            saturation: satur,
            field_capacity: fc,
            wilting_point: wp,
            bulk_density: bulkd,
        }
    }

    /// Human-readable class name
    pub fn name(self) -> &'static str {
        match self {
            SoilType::Sand => "sand",
            SoilType::LoamySand => "loamy sand",
            SoilType::SandyLoam => "sandy loam",
            SoilType::Loam => "loam",
            SoilType::SiltLoam => "silt loam",
            SoilType::SandyClayLoam => "sandy clay loam",
            SoilType::ClayLoam => "clay loam",
            SoilType::SiltyClayLoam => "silty clay loam",
            SoilType::SandyClay => "sandy clay",
            SoilType::SiltyClay => "silty clay",
            SoilType::Clay => "clay",
        }
    }
}

impl TryFrom<u8> for SoilType {
    type Error = CanopyError;

    /// Legacy integer codes `0..=10`, sand through clay
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        SoilType::ALL
            .get(usize::from(code))
            .copied()
            .ok_or(CanopyError::UnknownSoilType(code))
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
