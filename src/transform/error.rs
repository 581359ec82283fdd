// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::{spectrum::SpectrumError, units::MagnitudeBand};

/// Errors associated with applying a spectrum transform.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Redshift z = {0} is not physical (z must be > -1)")]
    InvalidRedshift(f64),

    #[error("The {band} normalization band ({band_start} nm..{band_end} nm) is outside the spectrum ({spectrum_start} nm..{spectrum_end} nm); the redshift may have moved the spectrum away from it")]
    NormalizationOutsideSpectrum {
        band: MagnitudeBand,
        band_start: f64,
        band_end: f64,
        spectrum_start: f64,
        spectrum_end: f64,
    },

    #[error("The spectrum has no flux in the {band} normalization band")]
    NoFluxInNormalizationBand { band: MagnitudeBand },

    #[error("Optical component {name} does not overlap the spectrum: {source}")]
    ComponentOutsideSpectrum {
        name: String,
        source: SpectrumError,
    },

    #[error(transparent)]
    Spectrum(#[from] SpectrumError),
}
