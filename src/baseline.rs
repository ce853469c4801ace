// StepWatch — Adaptive Baseline Filter
//
// Removes the slow component of the magnitude stream (posture, gravity
// orientation) with a short moving average, then reshapes what is left into
// an energy signal: shifted so the batch minimum is zero, squared to sharpen
// peaks, and optionally clipped.
//
// An exponential low-pass was tried for this stage; the 2–3 sample moving
// average costs less per sample and counted steps just as well.

use heapless::Vec;

use crate::config::MAX_BATCH_SIZE;

/// One value per sample of a batch.
pub type Signal = Vec<f32, MAX_BATCH_SIZE>;

/// Moving-average state carried from one batch to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BaselineFilter {
    /// Last raw magnitude of the previous batch; `None` before the first one.
    last_magnitude: Option<f32>,
}

impl BaselineFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_magnitude(&self) -> Option<f32> {
        self.last_magnitude
    }

    /// Detrend one batch of magnitudes into squared energies.
    ///
    /// Window positions that reach back before the batch are filled with the
    /// previous batch's last magnitude, so consecutive batches filter as one
    /// continuous stream. The very first batch seeds with its own first
    /// sample.
    pub fn detrend(&mut self, magnitudes: &Signal, window: usize, clip: Option<f32>) -> Signal {
        let mut energy = Signal::new();
        let Some(&first) = magnitudes.first() else {
            return energy;
        };
        let window = window.max(1);
        let seed = self.last_magnitude.unwrap_or(first);

        let mut detrended = Signal::new();
        for i in 0..magnitudes.len() {
            let sum: f32 = (0..window)
                .map(|back| match i.checked_sub(back) {
                    Some(j) => magnitudes[j],
                    None => seed,
                })
                .sum();
            let average = sum / window as f32;
            let _ = detrended.push(magnitudes[i] - average);
        }

        let floor = detrended.iter().copied().fold(f32::INFINITY, f32::min);
        for value in &detrended {
            let shifted = value - floor;
            let mut squared = shifted * shifted;
            if let Some(limit) = clip {
                squared = squared.min(limit);
            }
            let _ = energy.push(squared);
        }

        self.last_magnitude = magnitudes.last().copied();
        energy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(values: &[f32]) -> Signal {
        values.iter().copied().collect()
    }

    #[test]
    fn steady_posture_has_no_energy() {
        let mut filter = BaselineFilter::new();
        let energy = filter.detrend(&signal(&[1000.0; 10]), 2, None);
        assert_eq!(energy.len(), 10);
        assert!(energy.iter().all(|&e| e == 0.0));
        assert_eq!(filter.last_magnitude(), Some(1000.0));
    }

    #[test]
    fn spike_becomes_the_batch_maximum() {
        let mut filter = BaselineFilter::new();
        let mut raw = [1000.0; 10];
        raw[4] = 1400.0;
        let energy = filter.detrend(&signal(&raw), 2, None);

        // d = ±200 around the spike, shifted by +200 and squared.
        assert_eq!(energy[4], 160_000.0);
        assert_eq!(energy[5], 0.0);
        assert_eq!(energy[0], 40_000.0);
    }

    #[test]
    fn previous_batch_seeds_the_window() {
        let mut filter = BaselineFilter::new();
        filter.detrend(&signal(&[1000.0; 10]), 2, None);

        // A jump at the batch boundary is seen against the seed, not against
        // the new batch's own first sample.
        let energy = filter.detrend(&signal(&[1200.0; 10]), 2, None);
        assert_eq!(energy[0], 10_000.0);
        assert!(energy[1..].iter().all(|&e| e == 0.0));
    }

    #[test]
    fn clip_bounds_violent_motion() {
        let mut filter = BaselineFilter::new();
        let mut raw = [1000.0; 10];
        raw[3] = 9000.0;
        let energy = filter.detrend(&signal(&raw), 2, Some(1_000_000.0));
        assert!(energy.iter().all(|&e| e <= 1_000_000.0));
        assert_eq!(energy[3], 1_000_000.0);
    }

    #[test]
    fn empty_batch_leaves_state_alone() {
        let mut filter = BaselineFilter::new();
        filter.detrend(&signal(&[990.0, 1010.0]), 3, None);
        let energy = filter.detrend(&Signal::new(), 3, None);
        assert!(energy.is_empty());
        assert_eq!(filter.last_magnitude(), Some(1010.0));
    }
}
