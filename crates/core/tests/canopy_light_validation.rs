//! Canopy Light Validation Suite
//!
//! Checks the solar geometry and multi-layer light profile against
//! closed-form results from the radiation literature.
//!
//! # Test Categories
//! 1. Solar geometry and direct/diffuse partitioning
//! 2. Direct-beam extinction for limiting leaf-angle distributions
//! 3. Sunlit/shaded partitioning through the canopy
//! 4. Input validation
//! 5. Wind, humidity and nitrogen profiles
//!
//! # References
//! - Campbell, G.S. & Norman, J.M. (1998). "An Introduction to Environmental
//!   Biophysics", 2nd ed., Ch. 11 & 15
//! - Campbell, G.S. (1986). Agricultural and Forest Meteorology, 36, 317-321
//!
//! Run tests with: `cargo test --test canopy_light_validation`

mod common;

use approx::assert_relative_eq;
use canopy_sim_core::{
    physics::{
        leaf_nitrogen_profile, light_macro_environment, light_profile::direct_beam_extinction,
        relative_humidity_profile, sun_ml, wind_profile, CanopyLightParameters,
    },
    CanopyError, Degrees, Fraction, LightProfile, MetersPerSecond, PhotonFlux,
};

fn profile(lai: f64, layers: usize, cos_zenith: f64) -> LightProfile {
    sun_ml(
        PhotonFlux::new(1500.0),
        PhotonFlux::new(300.0),
        lai,
        layers,
        cos_zenith,
        &CanopyLightParameters::default(),
    )
    .expect("valid canopy")
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECTION 1: SOLAR GEOMETRY
// ═══════════════════════════════════════════════════════════════════════════════

/// Solar noon near the June solstice at 40°N
/// Declination ≈ +23.5°, so the zenith angle is ≈ 16.5° (cos ≈ 0.959)
#[test]
fn test_solstice_noon_is_beam_dominated() {
    common::init_tracing();
    let light = light_macro_environment(Degrees::new(40.0), 172, 12.0);

    assert!(
        light.cos_zenith > 0.95 && light.cos_zenith <= 1.0,
        "cos θ = {}",
        light.cos_zenith
    );
    assert_relative_eq!(light.cos_zenith, 16.5_f64.to_radians().cos(), epsilon = 1e-3);
    assert!(light.direct_fraction > light.diffuse_fraction);
    assert!(*light.direct_fraction > 0.9);
    assert_relative_eq!(
        *light.direct_fraction + *light.diffuse_fraction,
        1.0,
        epsilon = 1e-12
    );
}

/// Midnight is all diffuse
#[test]
fn test_night_is_all_diffuse() {
    common::init_tracing();
    let light = light_macro_environment(Degrees::new(40.0), 172, 0.0);
    assert!(light.cos_zenith < 0.0);
    assert_eq!(light.direct_fraction, Fraction::ZERO);
    assert_eq!(light.diffuse_fraction, Fraction::ONE);
}

/// Winter noon sun is lower than summer noon sun
#[test]
fn test_winter_sun_is_lower() {
    common::init_tracing();
    let summer = light_macro_environment(Degrees::new(40.0), 172, 12.0);
    let winter = light_macro_environment(Degrees::new(40.0), 355, 12.0);
    assert!(winter.cos_zenith < summer.cos_zenith);
    assert!(winter.diffuse_fraction > summer.diffuse_fraction);
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECTION 2: DIRECT-BEAM EXTINCTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Spherical leaf angles (χ = 1): k ≈ 0.5 / cos θ
/// Source: Campbell & Norman (1998), Table 15.1
#[test]
fn test_spherical_extinction() {
    common::init_tracing();
    for cos_zenith in [1.0, 0.9, 0.7, 0.5, 0.3] {
        let k = direct_beam_extinction(cos_zenith, 1.0);
        let expected = 0.5 / cos_zenith;
        assert!(
            ((k - expected) / expected).abs() < 0.015,
            "cos θ = {cos_zenith}: k = {k}, expected ≈ {expected}"
        );
    }
}

/// Vertical leaves (χ = 0): k ≈ 2·tan θ / π
#[test]
fn test_vertical_leaf_extinction() {
    common::init_tracing();
    let cos_zenith: f64 = 0.6;
    let tan = cos_zenith.acos().tan();
    let k = direct_beam_extinction(cos_zenith, 0.0);
    let expected = 2.0 * tan / std::f64::consts::PI;
    assert!(((k - expected) / expected).abs() < 0.03, "k = {k}");
}

/// Horizontal leaves (χ → ∞): k → 1 at every sun angle
#[test]
fn test_horizontal_leaf_extinction() {
    common::init_tracing();
    for cos_zenith in [1.0, 0.8, 0.5] {
        let k = direct_beam_extinction(cos_zenith, 1000.0);
        assert!((k - 1.0).abs() < 0.01, "cos θ = {cos_zenith}: k = {k}");
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECTION 3: SUNLIT/SHADED PARTITIONING
// ═══════════════════════════════════════════════════════════════════════════════

/// Sunlit and shaded fractions partition every layer for every layer count
#[test]
fn test_fractions_partition_every_layer() {
    common::init_tracing();
    for layers in 1..=200 {
        let p = profile(4.0, layers, 0.8);
        assert_eq!(p.layers.len(), layers);
        for layer in &p.layers {
            let sum = *layer.sunlit_fraction + *layer.shaded_fraction;
            assert!((sum - 1.0).abs() < 1e-12, "{layers} layers: sum = {sum}");
        }
    }
}

/// Sunlit fraction decays by exp(-k·ΔLAI) from one layer to the next
/// Source: Beer's law for the sunlit leaf area
#[test]
fn test_sunlit_fraction_follows_beer_law() {
    common::init_tracing();
    let p = profile(5.0, 10, 0.7);
    let k = p.extinction_coefficient;
    for pair in p.layers.windows(2) {
        let ratio = *pair[1].sunlit_fraction / *pair[0].sunlit_fraction;
        assert_relative_eq!(ratio, (-k * 0.5).exp(), epsilon = 1e-12);
    }
}

/// Layers sit lower in the canopy as cumulative LAI grows
#[test]
fn test_layer_heights_descend() {
    common::init_tracing();
    let p = profile(3.0, 6, 0.9);
    assert!(p.layers.windows(2).all(|w| w[1].height < w[0].height));
    assert!(p.layers.iter().all(|l| *l.height >= 0.0));
    // Top layer mid-point sits 0.25 LAI below the top at 3 LAI per metre
    assert_relative_eq!(*p.layers[0].height, 2.75 / 3.0, epsilon = 1e-12);
}

/// A leafless canopy is fully sunlit
#[test]
fn test_zero_leaf_area_is_fully_sunlit() {
    common::init_tracing();
    let p = profile(0.0, 5, 0.8);
    assert!(p.layers.iter().all(|l| l.sunlit_fraction == Fraction::ONE));
    assert!(p.layers.iter().all(|l| l.shaded_fraction == Fraction::ZERO));
}

/// Darkness is a valid input and yields a dark canopy
#[test]
fn test_zero_irradiance_is_dark() {
    common::init_tracing();
    let p = sun_ml(
        PhotonFlux::new(0.0),
        PhotonFlux::new(0.0),
        3.0,
        4,
        0.5,
        &CanopyLightParameters::default(),
    )
    .expect("darkness is valid");
    assert!(p.layers.iter().all(|l| *l.total_irradiance == 0.0));
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECTION 4: INPUT VALIDATION
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_rejects_out_of_range_inputs() {
    common::init_tracing();
    let params = CanopyLightParameters::default();
    let light = |direct: f64, lai: f64, layers: usize, cos_zenith: f64| {
        sun_ml(
            PhotonFlux::new(direct),
            PhotonFlux::new(100.0),
            lai,
            layers,
            cos_zenith,
            &params,
        )
    };

    assert_eq!(
        light(500.0, 3.0, 0, 0.5).unwrap_err(),
        CanopyError::LayerCountOutOfRange { value: 0, max: 200 }
    );
    assert_eq!(
        light(500.0, 3.0, 201, 0.5).unwrap_err(),
        CanopyError::LayerCountOutOfRange { value: 201, max: 200 }
    );
    assert_eq!(
        light(500.0, 3.0, 5, 0.0).unwrap_err(),
        CanopyError::CosZenithOutOfRange(0.0)
    );
    assert_eq!(
        light(500.0, 3.0, 5, 1.01).unwrap_err(),
        CanopyError::CosZenithOutOfRange(1.01)
    );
    assert!(matches!(
        light(500.0, 3.0, 5, f64::NAN),
        Err(CanopyError::CosZenithOutOfRange(_))
    ));
    assert_eq!(
        light(-1.0, 3.0, 5, 0.5).unwrap_err(),
        CanopyError::NegativeIrradiance {
            name: "direct",
            value: -1.0
        }
    );
    assert_eq!(
        light(500.0, -0.5, 5, 0.5).unwrap_err(),
        CanopyError::NegativeLeafAreaIndex(-0.5)
    );
}

/// Partial configuration files fall back to published defaults
#[test]
fn test_light_parameters_from_json() {
    common::init_tracing();
    let params: CanopyLightParameters = serde_json::from_str("{}").expect("empty object");
    assert_eq!(params, CanopyLightParameters::default());

    let params: CanopyLightParameters =
        serde_json::from_str(r#"{"leaf_angle_chi": 0.5}"#).expect("partial object");
    assert_eq!(params.leaf_angle_chi, 0.5);
    assert_eq!(params.diffuse_extinction, 0.7);
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECTION 5: MICROCLIMATE PROFILES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_wind_attenuates_with_leaf_area() {
    common::init_tracing();
    let wind = wind_profile(MetersPerSecond::new(4.0), 3.0, 6).expect("valid layers");
    assert_eq!(*wind[0], 4.0);
    assert_relative_eq!(*wind[5], 4.0 * (-0.7_f64 * 2.5).exp(), epsilon = 1e-12);
    assert!(wind.windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn test_humidity_rises_into_canopy_but_never_saturates_past_one() {
    common::init_tracing();
    let rh = relative_humidity_profile(0.6, 10).expect("valid layers");
    assert!(rh.windows(2).all(|w| w[1] >= w[0]));
    assert_relative_eq!(rh[9], 0.6 * 0.4_f64.exp(), epsilon = 1e-12);

    let humid = relative_humidity_profile(0.95, 10).expect("valid layers");
    assert!(humid.iter().all(|&h| h <= 1.0));
}

#[test]
fn test_nitrogen_decays_with_leaf_area() {
    common::init_tracing();
    let n = leaf_nitrogen_profile(2.0, 4.0, 4, 0.17).expect("valid layers");
    assert_eq!(n[0], 2.0);
    assert_relative_eq!(n[3], 2.0 * (-0.17_f64 * 3.0).exp(), epsilon = 1e-12);
    assert!(relative_humidity_profile(0.5, 0).is_err());
}
