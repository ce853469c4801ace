// StepWatch — Step Detector
//
// Finds footfall peaks in the energy signal of one batch and only counts them
// once they form a walking run:
//   1. neighbouring energies within the tolerance ratio are one footfall;
//      the smaller of the pair is zeroed,
//   2. a peak must reach the batch's meanMax threshold (mean of the
//      above-average energies), and that threshold must clear a fixed floor,
//   3. peaks closer than the debounce gap are ignored,
//   4. a gap of RUN_BREAK_GAP samples aborts the run and drops its pending
//      steps; pending steps are committed only while the run is longer than
//      RUN_CONFIRMATION.
//
// Short bursts (picking the watch up, a few steps to the kitchen) therefore
// never count.

use crate::baseline::Signal;
use crate::config::PedometerConfig;

/// Debounce and run-confirmation state, carried across batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDetector {
    samples_since_peak: u32,
    consecutive_run: u32,
    pending_steps: u32,
}

/// What one batch did to the detector, for logging and the activity vote.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatchReport {
    /// Mean energy over the valid samples, before neighbour suppression.
    pub mean_energy: f32,
    /// Adaptive peak threshold, `None` when the batch is below the floor.
    pub threshold: Option<f32>,
    /// Debounced peaks accepted in this batch.
    pub peaks: u32,
    /// Pending steps dropped because their run broke.
    pub discarded: u32,
    /// Steps moved into the daily total.
    pub committed: u32,
}

/// Batch-level energy statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyStats {
    pub mean: f32,
    /// Mean of the values strictly above `mean`; `None` for a flat batch.
    pub mean_max: Option<f32>,
}

pub fn energy_stats(energy: &[f32]) -> EnergyStats {
    if energy.is_empty() {
        return EnergyStats {
            mean: 0.0,
            mean_max: None,
        };
    }
    let mean = energy.iter().sum::<f32>() / energy.len() as f32;

    let (sum, count) = energy
        .iter()
        .filter(|&&e| e > mean)
        .fold((0.0f32, 0u32), |(sum, count), &e| (sum + e, count + 1));
    let mean_max = (count > 0).then(|| sum / count as f32);

    EnergyStats { mean, mean_max }
}

/// Zero the smaller of two neighbours whose ratio lies within `1 ± tolerance`.
/// Pairs with a zero right-hand value are skipped.
pub fn suppress_neighbors(energy: &mut [f32], tolerance: f32) {
    for i in 1..energy.len() {
        let (left, right) = (energy[i - 1], energy[i]);
        if right == 0.0 {
            continue;
        }
        let ratio = left / right;
        if (1.0..1.0 + tolerance).contains(&ratio) {
            energy[i] = 0.0;
        } else if ratio < 1.0 && ratio > 1.0 - tolerance {
            energy[i - 1] = 0.0;
        }
    }
}

impl StepDetector {
    pub fn new(config: &PedometerConfig) -> Self {
        Self {
            // No previous peak: the first one is never debounced away.
            samples_since_peak: config.run_break_gap,
            consecutive_run: 0,
            pending_steps: 0,
        }
    }

    pub fn pending_steps(&self) -> u32 {
        self.pending_steps
    }

    pub fn consecutive_run(&self) -> u32 {
        self.consecutive_run
    }

    pub fn process(&mut self, energy: &Signal, config: &PedometerConfig) -> BatchReport {
        let stats = energy_stats(energy);
        let threshold = stats
            .mean_max
            .map(|mean_max| mean_max * config.peak_threshold_ratio)
            .filter(|&threshold| threshold > config.step_energy_floor);

        let mut report = BatchReport {
            mean_energy: stats.mean,
            threshold,
            ..BatchReport::default()
        };

        let mut shaped = energy.clone();
        suppress_neighbors(&mut shaped, config.neighbor_tolerance);

        for &value in shaped.iter() {
            self.samples_since_peak = self.samples_since_peak.saturating_add(1);

            if self.consecutive_run > 0 && self.samples_since_peak >= config.run_break_gap {
                // A confirmed run keeps its tail; an unconfirmed one is noise.
                if self.consecutive_run > config.run_confirmation {
                    report.committed += self.pending_steps;
                } else {
                    report.discarded += self.pending_steps;
                }
                self.consecutive_run = 0;
                self.pending_steps = 0;
            }

            let Some(threshold) = threshold else {
                continue;
            };
            // Equality counts: a lone peak in a batch is exactly its meanMax.
            if self.samples_since_peak < config.min_peak_gap || value < threshold {
                continue;
            }

            self.pending_steps = self.pending_steps.saturating_add(1);
            self.consecutive_run = self.consecutive_run.saturating_add(1);
            self.samples_since_peak = 0;
            report.peaks += 1;
        }

        if self.consecutive_run > config.run_confirmation && self.pending_steps > 0 {
            report.committed += self.pending_steps;
            self.pending_steps = 0;
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRIDE: f32 = 160_000.0;
    const SHOULDER: f32 = 40_000.0;

    /// Energy of one batch with footfalls at the given positions, shaped like
    /// the baseline filter's output for a clean spike.
    fn footfalls(positions: &[usize]) -> Signal {
        let mut energy: Signal = core::iter::repeat(SHOULDER).take(10).collect();
        for &p in positions {
            energy[p] = STRIDE;
            if p + 1 < energy.len() {
                energy[p + 1] = 0.0;
            }
        }
        energy
    }

    fn still() -> Signal {
        core::iter::repeat(0.0).take(10).collect()
    }

    #[test]
    fn stats_ignore_flat_batches() {
        let stats = energy_stats(&still());
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.mean_max, None);

        let stats = energy_stats(&footfalls(&[2, 7]));
        assert_eq!(stats.mean_max, Some(STRIDE));
    }

    #[test]
    fn neighbour_within_tolerance_is_suppressed() {
        let mut energy = [100.0, 110.0, 0.0, 50.0, 45.0];
        suppress_neighbors(&mut energy, 0.2);
        // 100/110 ≈ 0.91 → left zeroed; 50/45 ≈ 1.11 → right zeroed.
        assert_eq!(energy, [0.0, 110.0, 0.0, 50.0, 0.0]);
    }

    #[test]
    fn zero_neighbour_is_skipped() {
        let mut energy = [100.0, 0.0, 0.0];
        suppress_neighbors(&mut energy, 0.2);
        assert_eq!(energy, [100.0, 0.0, 0.0]);
    }

    #[test]
    fn six_peaks_commit_nothing() {
        let config = PedometerConfig::default();
        let mut detector = StepDetector::new(&config);
        let mut committed = 0;
        for _ in 0..3 {
            committed += detector.process(&footfalls(&[2, 7]), &config).committed;
        }
        assert_eq!(committed, 0);
        assert_eq!(detector.pending_steps(), 6);

        let report = detector.process(&still(), &config);
        assert_eq!(report.discarded, 6);
        assert_eq!(detector.pending_steps(), 0);
        assert_eq!(detector.consecutive_run(), 0);
    }

    #[test]
    fn eight_peaks_commit_the_whole_run() {
        let config = PedometerConfig::default();
        let mut detector = StepDetector::new(&config);
        let committed: u32 = (0..4)
            .map(|_| detector.process(&footfalls(&[2, 7]), &config).committed)
            .sum();
        assert_eq!(committed, 8);

        // A confirmed run keeps committing batch by batch.
        assert_eq!(detector.process(&footfalls(&[2, 7]), &config).committed, 2);
    }

    #[test]
    fn run_confirmed_on_first_sample_survives_a_quiet_tail() {
        let config = PedometerConfig::default();
        let mut detector = StepDetector::new(&config);
        let mut batches = vec![footfalls(&[5])];
        batches.extend(core::iter::repeat(footfalls(&[0, 5])).take(3));
        // The eighth footfall opens the batch; nine quiet samples follow.
        batches.push(footfalls(&[0]));

        let reports: Vec<_> = batches
            .iter()
            .map(|energy| detector.process(energy, &config))
            .collect();
        let committed: u32 = reports.iter().map(|r| r.committed).sum();
        let discarded: u32 = reports.iter().map(|r| r.discarded).sum();
        assert_eq!(committed, 8);
        assert_eq!(discarded, 0);
        assert_eq!(detector.consecutive_run(), 0);
    }

    #[test]
    fn lone_peak_equal_to_threshold_counts() {
        let config = PedometerConfig::default();
        let mut detector = StepDetector::new(&config);
        let report = detector.process(&footfalls(&[4]), &config);
        assert_eq!(report.threshold, Some(STRIDE));
        assert_eq!(report.peaks, 1);
    }

    #[test]
    fn peaks_inside_debounce_gap_are_ignored() {
        let config = PedometerConfig {
            peak_threshold_ratio: 0.5,
            ..PedometerConfig::default()
        };
        let mut detector = StepDetector::new(&config);
        let mut energy = still();
        energy[3] = STRIDE;
        energy[4] = STRIDE * 2.0;
        let report = detector.process(&energy, &config);
        // Both clear the 120 000 threshold, but the second is one sample
        // after the first.
        assert_eq!(report.threshold, Some(120_000.0));
        assert_eq!(report.peaks, 1);
    }

    #[test]
    fn low_energy_never_counts() {
        let config = PedometerConfig::default();
        let mut detector = StepDetector::new(&config);
        let mut energy = still();
        energy[2] = 20_000.0;
        energy[7] = 20_000.0;
        let report = detector.process(&energy, &config);
        assert_eq!(report.threshold, None);
        assert_eq!(report.peaks, 0);
    }
}
