// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Errors associated with constructing or windowing a sampled spectrum.
#[derive(Error, Debug, PartialEq)]
pub enum SpectrumError {
    #[error("Cannot construct a spectrum from an empty sample set")]
    Empty,

    #[error("Spectrum wavelength and value arrays differ in length ({wavelengths} vs {values})")]
    LengthMismatch { wavelengths: usize, values: usize },

    #[error("Spectrum wavelengths must be strictly increasing; sample {index} is {current} nm, following {previous} nm")]
    NotIncreasing {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("Window start {start} nm is not below window end {end} nm")]
    InvertedWindow { start: f64, end: f64 },

    #[error("Trimming to {start} nm..{end} nm leaves no samples (spectrum covers {spectrum_start} nm..{spectrum_end} nm)")]
    EmptyRange {
        start: f64,
        end: f64,
        spectrum_start: f64,
        spectrum_end: f64,
    },

    #[error("Resample interval must be positive, got {0} nm")]
    BadInterval(f64),
}
