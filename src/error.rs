// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::{
    instrument::ConfigurationError, recipe::ValidationError, sed::SedError,
    spectrum::SpectrumError, tables::TableError, transform::TransformError,
};

/// Any fatal error a calculation request can produce. All of these abort
/// the recipe with no partial result; non-fatal conditions are reported as
/// [`crate::recipe::Warning`]s on a completed result instead.
#[derive(Error, Debug)]
pub enum CalcError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Sed(#[from] SedError),

    #[error(transparent)]
    Spectrum(#[from] SpectrumError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Table(#[from] TableError),
}
