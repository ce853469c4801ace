// StepWatch — Motion Magnitude
//
// Norm of one 3-axis sample. The square root is a capped Newton-Raphson
// iteration so the worst-case cost per sample is fixed, whatever the input.

use crate::events::MotionSample;

/// Square root by Newton-Raphson, at most `max_steps` refinements.
///
/// Returns the best estimate once successive estimates differ by no more than
/// `tolerance`, or when the step budget runs out. Never faults: zero, negative
/// and non-finite inputs collapse to `0.0`.
pub fn bounded_sqrt(value: f32, max_steps: u32, tolerance: f32) -> f32 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }

    // Starting above the root keeps every iterate above it, so the sequence
    // descends monotonically (also for values below 1).
    let mut estimate = value.max(1.0);
    for _ in 0..max_steps {
        if estimate == 0.0 {
            break;
        }
        let next = 0.5 * (estimate + value / estimate);
        let delta = estimate - next;
        estimate = next;
        if delta.abs() <= tolerance {
            break;
        }
    }
    estimate
}

/// Motion energy of one sample: `sqrt(x² + y² + z²)` in milli-g.
pub fn magnitude(sample: &MotionSample, max_steps: u32, tolerance: f32) -> f32 {
    let x = f32::from(sample.x);
    let y = f32::from(sample.y);
    let z = f32::from(sample.z);
    bounded_sqrt(x * x + y * y + z * z, max_steps, tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SQRT_MAX_STEPS, SQRT_TOLERANCE};

    fn sqrt(value: f32) -> f32 {
        bounded_sqrt(value, SQRT_MAX_STEPS, SQRT_TOLERANCE)
    }

    #[test]
    fn converges_on_typical_magnitudes() {
        assert!((sqrt(1_000_000.0) - 1000.0).abs() < 0.05);
        assert!((sqrt(2.0) - std::f32::consts::SQRT_2).abs() < 0.01);
        assert!((sqrt(0.25) - 0.5).abs() < 0.01);
    }

    #[test]
    fn zero_and_garbage_inputs_do_not_fault() {
        assert_eq!(sqrt(0.0), 0.0);
        assert_eq!(sqrt(-4.0), 0.0);
        assert_eq!(sqrt(f32::NAN), 0.0);
        assert_eq!(sqrt(f32::INFINITY), 0.0);
    }

    #[test]
    fn step_budget_bounds_the_answer() {
        // One refinement from 1e6 only halves the estimate.
        let rough = bounded_sqrt(1_000_000.0, 1, SQRT_TOLERANCE);
        assert!(rough > 400_000.0);
        assert!(rough.is_finite());
    }

    #[test]
    fn resting_wrist_reads_one_g() {
        let sample = MotionSample::new(0, 0, 1000);
        assert!((magnitude(&sample, SQRT_MAX_STEPS, SQRT_TOLERANCE) - 1000.0).abs() < 0.05);

        let extreme = MotionSample::new(i16::MIN, i16::MIN, i16::MIN);
        let norm = magnitude(&extreme, SQRT_MAX_STEPS, SQRT_TOLERANCE);
        assert!((norm - 56_755.8).abs() < 1.0);
    }
}
