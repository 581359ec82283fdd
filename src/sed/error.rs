// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::{spectrum::SpectrumError, tables::TableError, transform::TransformError};

/// Errors associated with building the transformed source and sky SEDs.
#[derive(Error, Debug)]
pub enum SedError {
    #[error("After the redshift of z = {z}, the source spectrum ({spectrum_start} nm..{spectrum_end} nm) no longer covers the instrument's observing range ({required_start} nm..{required_end} nm)")]
    OutsideObservingRange {
        z: f64,
        spectrum_start: f64,
        spectrum_end: f64,
        required_start: f64,
        required_end: f64,
    },

    #[error("A blackbody temperature must be positive, got {0} K")]
    BadTemperature(f64),

    #[error("An emission line needs a positive width, got {0} km/s")]
    BadLineWidth(f64),

    #[error("The Strehl ratio must be in (0, 1], got {0}")]
    BadStrehl(f64),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Spectrum(#[from] SpectrumError),

    #[error(transparent)]
    Table(#[from] TableError),
}
