//! Vertical distribution of root biomass
//!
//! Roots are spread over the layers reached by the rooting depth following
//! a Poisson mass function, which concentrates biomass a little below the
//! surface and tails off toward the rooting front.

/// Layer boundaries `0, d/n, 2d/n, …, d` for a column of `n` equal layers
///
/// # Examples
/// ```
/// use canopy_sim_core::physics::root_distribution::uniform_layer_depths;
///
/// assert_eq!(uniform_layer_depths(1.0, 4), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// ```
pub fn uniform_layer_depths(total_depth: f64, layers: usize) -> Vec<f64> {
    if layers == 0 {
        return vec![0.0];
    }
    let step = total_depth / layers as f64;
    (0..=layers).map(|i| i as f64 * step).collect()
}

/// Natural log of the Poisson mass function P(X = k; λ)
fn ln_poisson(k: usize, lambda: f64) -> f64 {
    let ln_factorial: f64 = (2..=k).map(|i| (i as f64).ln()).sum();
    k as f64 * lambda.ln() - lambda - ln_factorial
}

/// Fraction of root biomass in each soil layer
///
/// The number of rooted layers is one plus the number of layers whose
/// bottom lies above the rooting depth. Layer `j` of the rooted set receives
/// weight `Poisson(j + 1; λ)` with `λ = rooted_layers · lambda_factor`; the
/// weights are normalised to sum to one and unrooted layers receive zero.
///
/// # Arguments
/// * `depths` - Layer boundaries, `layers + 1` values increasing downward
/// * `root_depth` - Rooting depth below the top boundary (m)
/// * `lambda_factor` - Poisson shape factor per rooted layer
///
/// # Returns
/// One fraction per layer; empty when `depths` describes no layers
pub fn root_distribution(depths: &[f64], root_depth: f64, lambda_factor: f64) -> Vec<f64> {
    let layers = depths.len().saturating_sub(1);
    if layers == 0 {
        return Vec::new();
    }

    let top = depths[0];
    let reached = depths[1..]
        .iter()
        .filter(|&&bottom| root_depth > bottom - top)
        .count();
    let rooted = (reached + 1).min(layers);

    let lambda = rooted as f64 * lambda_factor;
    let mut fractions = vec![0.0; layers];
    if lambda <= 0.0 {
        fractions[0] = 1.0;
        return fractions;
    }

    for (j, f) in fractions.iter_mut().take(rooted).enumerate() {
        *f = ln_poisson(j + 1, lambda).exp();
    }
    let total: f64 = fractions.iter().sum();
    for f in &mut fractions {
        *f /= total;
    }
    fractions
}
