//! Radio signal calculations for the access-point link.
//!
//! Contains helpers for:
//! - Free-space path loss at a fixed carrier frequency
//! - Zero-mean Gaussian (log-normal in linear units) shadowing
//! - Received power sampling for a single link instance
//! - Effective range estimation from the link budget
//!
//! Units:
//! - Power: dBm
//! - Frequency: Hz
//! - Distance: meters

use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::types::SimulationError;

/// Speed of light used by the path loss model (m/s).
pub(crate) const SPEED_OF_LIGHT: f64 = 3.0e8;

/// Shortest distance the path loss model is evaluated at (meters).
///
/// The free-space formula is a far-field model and diverges as the distance
/// approaches zero (`log10(0)` is undefined). Any shorter distance, including a
/// station placed exactly on the access point, is clamped to this value.
pub(crate) const MIN_LINK_DISTANCE: f64 = 1.0;

/// Parameters of the transmitter → access point radio channel.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ChannelParameters {
    /// Carrier frequency in Hz.
    pub(crate) carrier_frequency: f64,
    /// Transmit power at the antenna port in dBm.
    pub(crate) tx_power: f64,
    /// Minimum received power (dBm) for a successful link. The comparison is strict.
    pub(crate) success_threshold: f64,
    /// Standard deviation of the shadowing term in dB. 0.0 disables shadowing.
    pub(crate) shadowing_sigma: f64,
}

impl Default for ChannelParameters {
    fn default() -> Self {
        Self {
            carrier_frequency: 5.0e9,
            tx_power: 20.0,
            success_threshold: -80.0,
            shadowing_sigma: 4.0,
        }
    }
}

/// Carrier wavelength in meters.
pub(crate) fn wavelength(carrier_frequency: f64) -> f64 {
    SPEED_OF_LIGHT / carrier_frequency
}

/// Calculate the free-space path loss (in dB) at a given distance.
///
/// # Formula
///
/// ```text
/// FSPL(d) = 20 × log₁₀(4π × d / λ),   λ = c / f
/// ```
///
/// Distances below [`MIN_LINK_DISTANCE`] are clamped to it, so the result is
/// always finite for non-negative input.
pub(crate) fn free_space_path_loss(distance: f64, carrier_frequency: f64) -> f64 {
    let distance = distance.max(MIN_LINK_DISTANCE);
    20.0 * (4.0 * std::f64::consts::PI * distance / wavelength(carrier_frequency)).log10()
}

/// Sample one shadowing value in dB from Normal(0, sigma).
///
/// Returns 0.0 without touching the random source when sigma is zero. A
/// negative or non-finite sigma is rejected.
pub(crate) fn sample_shadowing<R: Rng + ?Sized>(sigma: f64, rng: &mut R) -> Result<f64, SimulationError> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(SimulationError::InvalidConfiguration(format!("shadowing sigma must be finite and non-negative, got {sigma}")));
    }
    if sigma == 0.0 {
        return Ok(0.0);
    }
    let normal = Normal::new(0.0, sigma).map_err(|e| SimulationError::InvalidConfiguration(format!("invalid shadowing sigma {sigma}: {e}")))?;
    Ok(normal.sample(rng))
}

/// Received power (dBm) for one link instance without shadowing.
pub(crate) fn calculate_mean_received_power(distance: f64, params: &ChannelParameters) -> f64 {
    params.tx_power - free_space_path_loss(distance, params.carrier_frequency)
}

/// Calculate the instantaneous received power (in dBm) at a given distance.
///
/// Formula: P_rx(dBm) = P_tx(dBm) - FSPL(d) + X_σ
///
/// Each call samples a fresh shadowing value, so repeated calls with the same
/// distance yield different results unless sigma is zero.
pub(crate) fn calculate_received_power<R: Rng + ?Sized>(distance: f64, params: &ChannelParameters, rng: &mut R) -> Result<f64, SimulationError> {
    Ok(calculate_mean_received_power(distance, params) + sample_shadowing(params.shadowing_sigma, rng)?)
}

/// Whether a received power clears the success threshold.
pub(crate) fn is_link_successful(received_power: f64, params: &ChannelParameters) -> bool {
    received_power > params.success_threshold
}

// Solve P_tx - 20 log10(4πd/λ) = threshold for d:
//   d = λ / (4π) × 10^((P_tx - threshold) / 20)
/// Estimate the deterministic range at which the mean received power equals
/// the success threshold. Shadowing is not sampled.
pub(crate) fn calculate_effective_distance(params: &ChannelParameters) -> f64 {
    let budget = params.tx_power - params.success_threshold;
    let d = wavelength(params.carrier_frequency) / (4.0 * std::f64::consts::PI) * 10.0_f64.powf(budget / 20.0);
    d.max(MIN_LINK_DISTANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn no_shadowing() -> ChannelParameters {
        ChannelParameters {
            shadowing_sigma: 0.0,
            ..ChannelParameters::default()
        }
    }

    #[test]
    fn wavelength_at_five_ghz() {
        assert!((wavelength(5.0e9) - 0.06).abs() < 1e-12);
    }

    #[test]
    fn path_loss_is_monotonic_in_distance() {
        let params = no_shadowing();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut previous = f64::INFINITY;
        for d in [1.0, 2.0, 5.0, 10.0, 50.0, 100.0, 500.0, 10_000.0] {
            let p = calculate_received_power(d, &params, &mut rng).unwrap();
            assert!(p <= previous, "power at {d} m ({p}) exceeds power at a shorter distance ({previous})");
            previous = p;
        }
    }

    #[test]
    fn doubling_distance_costs_six_db() {
        let params = no_shadowing();
        let p10 = calculate_mean_received_power(10.0, &params);
        let p20 = calculate_mean_received_power(20.0, &params);
        assert!((p10 - p20 - 20.0 * 2.0_f64.log10()).abs() < 1e-9);
    }

    #[test]
    fn zero_distance_is_clamped_and_accepted() {
        let params = no_shadowing();
        let at_zero = calculate_mean_received_power(0.0, &params);
        let at_min = calculate_mean_received_power(MIN_LINK_DISTANCE, &params);
        assert!(at_zero.is_finite());
        assert_eq!(at_zero, at_min);
        // 20 dBm - 20 log10(4π / 0.06) ≈ -26.4 dBm
        assert!((at_zero + 26.42).abs() < 0.01, "got {at_zero}");
        assert!(is_link_successful(at_zero, &params));
    }

    #[test]
    fn ten_km_link_fails_threshold() {
        let params = no_shadowing();
        let p = calculate_mean_received_power(10_000.0, &params);
        assert!(p < -100.0, "got {p}");
        assert!(!is_link_successful(p, &params));
    }

    #[test]
    fn zero_sigma_does_not_consume_randomness() {
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(sample_shadowing(0.0, &mut a).unwrap(), 0.0);
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn shadowing_is_zero_mean_with_configured_spread() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| sample_shadowing(4.0, &mut rng).unwrap()).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.1, "mean {mean}");
        assert!((var.sqrt() - 4.0).abs() < 0.1, "sigma {}", var.sqrt());
    }

    #[test]
    fn negative_sigma_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(sample_shadowing(-1.0, &mut rng), Err(SimulationError::InvalidConfiguration(_))));
        assert!(matches!(sample_shadowing(f64::NAN, &mut rng), Err(SimulationError::InvalidConfiguration(_))));
        assert!(matches!(sample_shadowing(f64::INFINITY, &mut rng), Err(SimulationError::InvalidConfiguration(_))));
    }

    #[test]
    fn rejected_sigma_does_not_consume_randomness() {
        let mut a = ChaCha8Rng::seed_from_u64(3);
        let mut b = ChaCha8Rng::seed_from_u64(3);
        assert!(sample_shadowing(-4.0, &mut a).is_err());
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn received_power_propagates_invalid_sigma() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let params = ChannelParameters {
            shadowing_sigma: -1.0,
            ..ChannelParameters::default()
        };
        assert!(calculate_received_power(10.0, &params, &mut rng).is_err());
    }

    #[test]
    fn effective_distance_matches_threshold() {
        let params = no_shadowing();
        let d = calculate_effective_distance(&params);
        let p = calculate_mean_received_power(d, &params);
        assert!((p - params.success_threshold).abs() < 1e-6);
        // λ/(4π) × 10^5 ≈ 477.5 m for the default budget
        assert!((d - 477.46).abs() < 0.1, "got {d}");
    }

    #[test]
    fn effective_distance_grows_with_tx_power() {
        let mut params = no_shadowing();
        let d_low = calculate_effective_distance(&params);
        params.tx_power = 30.0;
        let d_high = calculate_effective_distance(&params);
        assert!(d_high > d_low);
    }
}
