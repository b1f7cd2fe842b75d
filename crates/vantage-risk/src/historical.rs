//! Historical simulation: replays the aligned return window.

use crate::statistics::CovarianceModel;

/// Replays observed returns against current exposures.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoricalSimulator;

impl HistoricalSimulator {
    /// Creates a historical simulator.
    pub fn new() -> Self {
        Self
    }

    /// One portfolio value per observed period:
    /// `baseline + sqrt(h) · Σ exposure_i · r_i(t)`.
    ///
    /// Exposure outside the model is held at zero return.
    pub fn replay(&self, model: &CovarianceModel, baseline: f64, horizon_days: u32) -> Vec<f64> {
        let sqrt_h = f64::from(horizon_days).sqrt();
        let exposures = model.exposures();
        let window = model.window();

        (0..window.rows())
            .map(|t| {
                let pnl: f64 = window
                    .row(t)
                    .iter()
                    .zip(exposures)
                    .map(|(r, e)| r * e)
                    .sum();
                baseline + sqrt_h * pnl
            })
            .collect()
    }
}
