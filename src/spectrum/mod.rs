// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The sampled-spectrum data type that every pipeline stage operates on.
//!
//! A [`SampledSpectrum`] is an ordered sequence of (wavelength, flux)
//! samples. Wavelengths are in nm; flux is in photons s⁻¹ nm⁻¹ m⁻² until
//! the telescope-aperture transform integrates out the collecting area.
//! Transforms mutate a spectrum in place; cloning yields fully independent
//! storage, which the AO core/halo split relies on.

mod error;

pub use error::SpectrumError;

use itertools::Itertools;
use ndarray::Array1;

/// An ordered sequence of (wavelength \[nm\], flux) samples. The grid is
/// strictly increasing but not necessarily uniform.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledSpectrum {
    wavelengths: Array1<f64>,
    values: Array1<f64>,
}

impl SampledSpectrum {
    /// Construct from an explicit grid. The grid must be non-empty and
    /// strictly increasing, and the two arrays must have equal lengths.
    pub fn new(wavelengths: Vec<f64>, values: Vec<f64>) -> Result<SampledSpectrum, SpectrumError> {
        if wavelengths.is_empty() {
            return Err(SpectrumError::Empty);
        }
        if wavelengths.len() != values.len() {
            return Err(SpectrumError::LengthMismatch {
                wavelengths: wavelengths.len(),
                values: values.len(),
            });
        }
        for (i, w) in wavelengths.windows(2).enumerate() {
            if w[1] <= w[0] {
                return Err(SpectrumError::NotIncreasing {
                    index: i + 1,
                    previous: w[0],
                    current: w[1],
                });
            }
        }
        Ok(SampledSpectrum {
            wavelengths: Array1::from(wavelengths),
            values: Array1::from(values),
        })
    }

    /// Construct on a uniform grid starting at `start_nm` with spacing
    /// `interval_nm`.
    pub fn uniform(
        start_nm: f64,
        interval_nm: f64,
        values: Vec<f64>,
    ) -> Result<SampledSpectrum, SpectrumError> {
        if interval_nm <= 0.0 {
            return Err(SpectrumError::BadInterval(interval_nm));
        }
        let wavelengths = (0..values.len())
            .map(|i| start_nm + i as f64 * interval_nm)
            .collect();
        SampledSpectrum::new(wavelengths, values)
    }

    /// Construct a spectrum with a constant flux value over a uniform grid
    /// spanning `[start_nm, end_nm]`.
    pub fn flat(
        start_nm: f64,
        end_nm: f64,
        interval_nm: f64,
        value: f64,
    ) -> Result<SampledSpectrum, SpectrumError> {
        if start_nm >= end_nm {
            return Err(SpectrumError::InvertedWindow {
                start: start_nm,
                end: end_nm,
            });
        }
        if interval_nm <= 0.0 {
            return Err(SpectrumError::BadInterval(interval_nm));
        }
        let n = ((end_nm - start_nm) / interval_nm).floor() as usize + 1;
        SampledSpectrum::uniform(start_nm, interval_nm, vec![value; n])
    }

    /// The first sampled wavelength \[nm\].
    pub fn start(&self) -> f64 {
        self.wavelengths[0]
    }

    /// The last sampled wavelength \[nm\].
    pub fn end(&self) -> f64 {
        self.wavelengths[self.wavelengths.len() - 1]
    }

    /// The number of samples.
    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    /// A spectrum is never empty; this exists to satisfy the usual pairing
    /// with [`SampledSpectrum::len`].
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn wavelengths(&self) -> &Array1<f64> {
        &self.wavelengths
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// Linearly interpolated flux at `lambda_nm`; 0.0 outside the sampled
    /// range.
    pub fn value_at(&self, lambda_nm: f64) -> f64 {
        if lambda_nm < self.start() || lambda_nm > self.end() {
            return 0.0;
        }
        // Index of the first sample at or beyond lambda.
        let i = self
            .wavelengths
            .as_slice()
            .expect("contiguous")
            .partition_point(|&w| w < lambda_nm);
        if i == 0 {
            return self.values[0];
        }
        let (w0, w1) = (self.wavelengths[i - 1], self.wavelengths[i]);
        let (v0, v1) = (self.values[i - 1], self.values[i]);
        v0 + (v1 - v0) * (lambda_nm - w0) / (w1 - w0)
    }

    /// Trapezoidal integral over the whole sampled range.
    pub fn integral(&self) -> f64 {
        self.wavelengths
            .iter()
            .zip(self.values.iter())
            .tuple_windows()
            .map(|((w0, v0), (w1, v1))| 0.5 * (v0 + v1) * (w1 - w0))
            .sum()
    }

    /// Trapezoidal integral restricted to `[start_nm, end_nm]`, with the
    /// window edges interpolated. The window is clamped to the sampled
    /// range; a window entirely outside it integrates to 0.0.
    pub fn integral_over(&self, start_nm: f64, end_nm: f64) -> f64 {
        if start_nm >= end_nm || end_nm <= self.start() || start_nm >= self.end() {
            return 0.0;
        }
        let a = start_nm.max(self.start());
        let b = end_nm.min(self.end());

        let ws = self.wavelengths.as_slice().expect("contiguous");
        let first_inside = ws.partition_point(|&w| w <= a);
        let last_inside = ws.partition_point(|&w| w < b);

        let mut sum = 0.0;
        let mut prev_w = a;
        let mut prev_v = self.value_at(a);
        for i in first_inside..last_inside {
            sum += 0.5 * (self.values[i] + prev_v) * (self.wavelengths[i] - prev_w);
            prev_w = self.wavelengths[i];
            prev_v = self.values[i];
        }
        sum += 0.5 * (self.value_at(b) + prev_v) * (b - prev_w);
        sum
    }

    /// The flux-weighted mean wavelength over the sampled range \[nm\].
    pub fn flux_weighted_wavelength(&self) -> f64 {
        let mut weighted = 0.0;
        let mut total = 0.0;
        for i in 1..self.len() {
            let dw = self.wavelengths[i] - self.wavelengths[i - 1];
            let mid_v = 0.5 * (self.values[i] + self.values[i - 1]);
            let mid_w = 0.5 * (self.wavelengths[i] + self.wavelengths[i - 1]);
            weighted += mid_v * mid_w * dw;
            total += mid_v * dw;
        }
        if total == 0.0 {
            0.5 * (self.start() + self.end())
        } else {
            weighted / total
        }
    }

    /// Remove samples outside `[start_nm, end_nm]` without altering the
    /// remaining sample values.
    pub fn trim(&mut self, start_nm: f64, end_nm: f64) -> Result<(), SpectrumError> {
        if start_nm >= end_nm {
            return Err(SpectrumError::InvertedWindow {
                start: start_nm,
                end: end_nm,
            });
        }
        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| self.wavelengths[i] >= start_nm && self.wavelengths[i] <= end_nm)
            .collect();
        if keep.is_empty() {
            return Err(SpectrumError::EmptyRange {
                start: start_nm,
                end: end_nm,
                spectrum_start: self.start(),
                spectrum_end: self.end(),
            });
        }
        self.wavelengths = keep.iter().map(|&i| self.wavelengths[i]).collect();
        self.values = keep.iter().map(|&i| self.values[i]).collect();
        Ok(())
    }

    /// Multiply every flux value by `factor`. Wavelengths are untouched.
    pub fn rescale(&mut self, factor: f64) {
        self.values.mapv_inplace(|v| v * factor);
    }

    /// Multiply every wavelength by `factor` (the redshift primitive; a
    /// factor of 1 + z shifts the spectrum redward). Flux values are
    /// untouched.
    pub fn shift_wavelengths(&mut self, factor: f64) {
        self.wavelengths.mapv_inplace(|w| w * factor);
    }

    /// Pointwise multiply by a wavelength-dependent transmission function.
    pub fn multiply_curve(&mut self, f: impl Fn(f64) -> f64) {
        for i in 0..self.len() {
            self.values[i] *= f(self.wavelengths[i]);
        }
    }

    /// Pointwise add another spectrum, interpolated onto this spectrum's
    /// grid. Samples of `other` outside this grid contribute nothing.
    pub fn add(&mut self, other: &SampledSpectrum) {
        for i in 0..self.len() {
            self.values[i] += other.value_at(self.wavelengths[i]);
        }
    }

    /// Resample onto a uniform grid with spacing `interval_nm`, conserving
    /// total flux to within [`crate::constants::RESAMPLE_INTEGRAL_TOLERANCE`]
    /// for smooth spectra. Each output sample is the mean of the
    /// interpolated input over its own bin.
    pub fn resampled(&self, interval_nm: f64) -> Result<SampledSpectrum, SpectrumError> {
        if interval_nm <= 0.0 {
            return Err(SpectrumError::BadInterval(interval_nm));
        }
        let n = ((self.end() - self.start()) / interval_nm).floor() as usize + 1;
        let values = (0..n)
            .map(|i| {
                let centre = self.start() + i as f64 * interval_nm;
                let lo = (centre - 0.5 * interval_nm).max(self.start());
                let hi = (centre + 0.5 * interval_nm).min(self.end());
                if hi <= lo {
                    self.value_at(centre)
                } else {
                    self.integral_over(lo, hi) / (hi - lo)
                }
            })
            .collect();
        SampledSpectrum::uniform(self.start(), interval_nm, values)
    }
}

#[cfg(test)]
impl approx::AbsDiffEq for SampledSpectrum {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.len() == other.len()
            && self
                .wavelengths
                .iter()
                .zip(other.wavelengths.iter())
                .all(|(a, b)| f64::abs_diff_eq(a, b, epsilon))
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(a, b)| f64::abs_diff_eq(a, b, epsilon))
    }
}
