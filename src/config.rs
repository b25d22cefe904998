//! Configuration and defaults for featex.
//!
//! This module contains the constant set that controls feature
//! classification and gene selection.

/// Configuration for the per-feature selection process.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Distinct-value ceiling at or below which binary detection is attempted.
    pub binary_max_distinct: usize,
    /// Absolute floor for the minimum selected-row count.
    pub min_hits_floor: usize,
    /// Fraction of non-missing rows contributing to the minimum count.
    pub min_hits_fraction: f64,
    /// Quantile where the search starts, in percent.
    pub quantile_start_pct: u32,
    /// Amount the quantile drops by on each retry, in percent.
    pub quantile_step_pct: u32,
    /// Exclusive lower bound of the quantile search, in percent.
    pub quantile_floor_pct: u32,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        SelectorConfig {
            binary_max_distinct: 3,
            min_hits_floor: 2000,
            min_hits_fraction: 0.2,
            quantile_start_pct: 90,
            quantile_step_pct: 5,
            quantile_floor_pct: 10,
        }
    }
}

impl SelectorConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum number of rows a continuous selection must retain.
    ///
    /// The fractional part of `fraction * rows` is truncated.
    pub fn min_required(&self, num_rows: usize) -> usize {
        let by_fraction = (self.min_hits_fraction * num_rows as f64) as usize;
        self.min_hits_floor.max(by_fraction)
    }

    /// Quantiles to try, in descending order.
    ///
    /// The ladder walks in integer percent steps so that no floating-point
    /// accumulation can change which quantiles are visited. The floor is
    /// exclusive: with defaults the ladder is 0.90, 0.85, ..., 0.15.
    pub fn quantile_ladder(&self) -> Vec<f64> {
        let mut ladder = Vec::new();
        let mut pct = self.quantile_start_pct;
        while pct > self.quantile_floor_pct {
            ladder.push(pct as f64 / 100.0);
            if pct < self.quantile_step_pct {
                break;
            }
            pct -= self.quantile_step_pct;
        }
        ladder
    }
}
