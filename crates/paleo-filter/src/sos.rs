// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// One second-order filter section in transposed direct form II.
///
/// Transfer function `(b0 + b1 q^-1 + b2 q^-2) / (1 + a1 q^-1 + a2 q^-2)`.
/// A first-order section is carried with `b2 = a2 = 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Biquad {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Biquad {
    /// Filters `input` in place through this section.
    ///
    /// `x0` seeds the delay registers at the section's steady-state response
    /// to a constant `x0`, so a constant signal passes through unchanged and
    /// the startup transient tracks the signal's opening level.
    pub fn run(&self, input: &mut [f64], x0: f64) {
        // Steady state for a unit-DC-gain section: y == x0 with
        // z2 = (b2 - a2) x0 and z1 = (1 - b0) x0.
        let mut z1 = (1.0 - self.b0) * x0;
        let mut z2 = (self.b2 - self.a2) * x0;

        for sample in input.iter_mut() {
            let x = *sample;
            let y = self.b0 * x + z1;
            z1 = self.b1 * x - self.a1 * y + z2;
            z2 = self.b2 * x - self.a2 * y;
            *sample = y;
        }
    }

    /// Gain at zero frequency.
    pub fn dc_gain(&self) -> f64 {
        (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2)
    }
}

/// Runs a cascade of sections over `input`, each seeded from its own first
/// sample after the previous sections have acted.
pub fn run_cascade(sections: &[Biquad], input: &mut [f64]) {
    for section in sections {
        let x0 = input.first().copied().unwrap_or(0.0);
        section.run(input, x0);
    }
}

#[cfg(test)]
mod tests {
    use super::{run_cascade, Biquad};

    fn simple_low_section() -> Biquad {
        // One-pole smoother with unit DC gain.
        Biquad {
            b0: 0.25,
            b1: 0.25,
            b2: 0.0,
            a1: -0.5,
            a2: 0.0,
        }
    }

    #[test]
    fn constant_input_passes_unchanged() {
        let section = simple_low_section();
        let mut signal = vec![3.5; 64];
        section.run(&mut signal, 3.5);
        for sample in signal {
            assert!((sample - 3.5).abs() < 1e-12);
        }
    }

    #[test]
    fn dc_gain_is_one_for_normalized_section() {
        let section = simple_low_section();
        assert!((section.dc_gain() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cascade_applies_sections_in_order() {
        let sections = [simple_low_section(), simple_low_section()];
        let mut signal = vec![1.0; 32];
        signal[16] = 2.0;
        run_cascade(&sections, &mut signal);
        // The spike is smeared but the baseline is untouched.
        assert!((signal[0] - 1.0).abs() < 1e-12);
        assert!(signal[16] < 2.0);
        assert!(signal[17] > 1.0);
    }
}
