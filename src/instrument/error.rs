// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::tables::TableError;

/// Errors associated with assembling an instrument. All of these are
/// raised before any spectrum maths runs.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("{instrument}: spectroscopy was requested but no disperser is selected")]
    SpectroscopyNeedsDisperser { instrument: String },

    #[error("{instrument}: imaging was requested but disperser {disperser} is in the beam")]
    ImagingWithDisperser {
        instrument: String,
        disperser: String,
    },

    #[error("{instrument}: spectroscopy was requested but no focal-plane mask is selected")]
    SpectroscopyNeedsMask { instrument: String },

    #[error("{instrument}: spectroscopy was requested with the IFU but this instrument has no IFU")]
    NoIfu { instrument: String },

    #[error("{instrument}: read mode {read_mode} is not supported with the {method} method")]
    UnsupportedReadMode {
        instrument: String,
        read_mode: String,
        method: String,
    },

    #[error("{instrument}: polarimetry is only available with the imaging method")]
    PolarimetryNeedsImaging { instrument: String },

    #[error("{instrument}: a disperser needs a central wavelength, but none was given")]
    MissingCentralWavelength { instrument: String },

    #[error("{instrument}: the filter range ({filter_start} nm..{filter_end} nm) and the disperser coverage ({grating_start} nm..{grating_end} nm) do not overlap")]
    DisjointRange {
        instrument: String,
        filter_start: f64,
        filter_end: f64,
        grating_start: f64,
        grating_end: f64,
    },

    #[error("{instrument}: binning factors must be at least 1")]
    ZeroBinning { instrument: String },

    #[error(transparent)]
    Table(#[from] TableError),
}
