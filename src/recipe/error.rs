// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Request-level validation failures, raised before any noise
/// integration.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("The exposure time must be positive, got {0} s")]
    NonPositiveExposureTime(f64),

    #[error("The number of exposures must be at least 1")]
    NoExposures,

    #[error("The on-source fraction must be in (0, 1], got {0}")]
    BadOnSourceFraction(f64),

    #[error("{n_exposures} exposures with an on-source fraction of {fraction} gives {product} on-source exposures, which is not a whole number")]
    FractionalOnSourceExposures {
        n_exposures: u32,
        fraction: f64,
        product: f64,
    },

    #[error("The emission line ({width_kms:.1} km/s) is narrower than this disperser resolves; the minimum acceptable line width is {min_kms:.1} km/s")]
    UndersampledEmissionLine { width_kms: f64, min_kms: f64 },

    #[error("IFU analysis was requested without the IFU focal-plane mask")]
    IfuAnalysisWithoutIfu,

    #[error("The IFU focal-plane mask requires IFU analysis")]
    IfuMaskWithoutIfuAnalysis,
}
