//! Random ripple policy
//!
//! Drops a random impulse on the wave field at a fixed real-time cadence so
//! the water keeps moving without user input. Cells are sampled away from the
//! grid edge to respect the simulator's interior-only disturbance contract.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::RippleConfig;
use crate::sim::waves::WaveField;

/// Schedules periodic random disturbances on a wave field
pub struct RippleScheduler {
    interval: f32,
    min_magnitude: f32,
    max_magnitude: f32,
    edge_margin: usize,
    elapsed: f32,
    rng: StdRng,
}

impl RippleScheduler {
    /// Create a scheduler from config; the seed fixes the ripple sequence.
    pub fn new(config: &RippleConfig) -> Self {
        Self {
            interval: config.interval,
            min_magnitude: config.min_magnitude,
            max_magnitude: config.max_magnitude,
            edge_margin: config.edge_margin.max(1),
            elapsed: 0.0,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// Accumulate elapsed real time and fire one disturbance per whole
    /// interval crossed.
    pub fn tick(&mut self, dt: f32, waves: &mut WaveField) {
        self.elapsed += dt;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;

            let row = self
                .rng
                .gen_range(self.edge_margin..waves.row_count() - self.edge_margin);
            let col = self
                .rng
                .gen_range(self.edge_margin..waves.column_count() - self.edge_margin);
            let magnitude = self.rng.gen_range(self.min_magnitude..self.max_magnitude);

            log::trace!("ripple at ({row}, {col}) magnitude {magnitude:.3}");
            waves.disturb(row, col, magnitude);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_field() -> WaveField {
        WaveField::new(32, 32, 1.0, 0.03, 4.0, 0.2).unwrap()
    }

    fn max_height(waves: &WaveField) -> f32 {
        (0..waves.vertex_count())
            .map(|i| waves.position(i).y.abs())
            .fold(0.0_f32, f32::max)
    }

    #[test]
    fn test_no_ripple_before_interval() {
        let mut waves = test_field();
        let mut scheduler = RippleScheduler::new(&RippleConfig::default());

        scheduler.tick(0.2, &mut waves);
        assert_eq!(max_height(&waves), 0.0);

        scheduler.tick(0.1, &mut waves);
        assert!(max_height(&waves) > 0.0);
    }

    #[test]
    fn test_one_ripple_per_interval() {
        let mut waves = test_field();
        let config = RippleConfig {
            min_magnitude: 0.3,
            max_magnitude: 0.300_001,
            ..RippleConfig::default()
        };
        let mut scheduler = RippleScheduler::new(&config);

        // Two whole intervals at once fire exactly two disturbances: the
        // summed impulse over the plus-kernels is 2 * (1 + 4 * 0.5) * 0.3.
        scheduler.tick(0.5, &mut waves);
        let total: f32 = (0..waves.vertex_count()).map(|i| waves.position(i).y).sum();
        assert!((total - 2.0 * 3.0 * 0.3).abs() < 1e-3);
    }

    #[test]
    fn test_ripples_respect_edge_margin() {
        let config = RippleConfig {
            edge_margin: 4,
            ..RippleConfig::default()
        };
        let mut waves = test_field();
        let mut scheduler = RippleScheduler::new(&config);
        for _ in 0..100 {
            scheduler.tick(0.25, &mut waves);
        }

        // Cells inside the margin band (minus kernel spill of one cell) must
        // be untouched; in particular the outermost ring stays flat.
        let n = waves.column_count();
        for j in 0..n {
            assert_eq!(waves.position(j).y, 0.0);
            assert_eq!(waves.position((waves.row_count() - 1) * n + j).y, 0.0);
        }
    }

    #[test]
    fn test_seeded_sequences_are_reproducible() {
        let config = RippleConfig::default();
        let mut a = test_field();
        let mut b = test_field();
        let mut sa = RippleScheduler::new(&config);
        let mut sb = RippleScheduler::new(&config);

        for _ in 0..20 {
            sa.tick(0.25, &mut a);
            sb.tick(0.25, &mut b);
        }
        for i in 0..a.vertex_count() {
            assert_eq!(a.position(i).y, b.position(i).y);
        }
    }
}
