// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Errors associated with lookup-table and spectral-library access.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("No transmission table for key {0}")]
    UnknownTransmission(String),

    #[error("No dispersion table row for key {0}")]
    UnknownDispersion(String),

    #[error("No background table for key {0}")]
    UnknownBackground(String),

    #[error("No library spectrum named {0}")]
    UnknownSed(String),

    #[error("Malformed table: {0}")]
    BadTable(String),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
