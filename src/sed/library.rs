// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A built-in stellar spectral library.
//!
//! Real deployments load measured template spectra; this library provides
//! blackbody-shaped stand-ins at each spectral type's effective
//! temperature, which is enough for continuum work and keeps the engine
//! self-contained. Normalisation is arbitrary — the pipeline normalises
//! every library SED to the requested brightness.

use super::blackbody_photon_shape;
use crate::{
    spectrum::SampledSpectrum,
    tables::{SpectralLibrary, TableError},
};

/// Library coverage \[nm\].
const LIBRARY_START_NM: f64 = 300.0;
const LIBRARY_END_NM: f64 = 28_000.0;
const LIBRARY_STEP_NM: f64 = 2.0;

/// The built-in library. Lookup is by spectral-type name, e.g. "K0III".
pub struct BuiltinLibrary;

impl BuiltinLibrary {
    /// Effective temperature for a spectral type \[K\].
    fn temperature(name: &str) -> Option<f64> {
        let t = match name {
            "O5V" => 42_000.0,
            "B0V" => 30_000.0,
            "B5V" => 15_200.0,
            "A0V" => 9_520.0,
            "A5V" => 8_200.0,
            "F0V" => 7_200.0,
            "F5V" => 6_440.0,
            "G0V" => 6_030.0,
            "G2V" => 5_770.0,
            "G5V" => 5_570.0,
            "K0V" => 5_250.0,
            "K0III" => 4_810.0,
            "K4V" => 4_340.0,
            "K5III" => 4_050.0,
            "M0V" => 3_850.0,
            "M0III" => 3_690.0,
            "M5V" => 3_050.0,
            _ => return None,
        };
        Some(t)
    }
}

impl SpectralLibrary for BuiltinLibrary {
    fn sed(&self, name: &str) -> Result<SampledSpectrum, TableError> {
        let temperature =
            BuiltinLibrary::temperature(name).ok_or_else(|| TableError::UnknownSed(name.to_string()))?;
        let n = ((LIBRARY_END_NM - LIBRARY_START_NM) / LIBRARY_STEP_NM) as usize + 1;
        let values = (0..n)
            .map(|i| {
                let w = LIBRARY_START_NM + i as f64 * LIBRARY_STEP_NM;
                blackbody_photon_shape(w, temperature)
            })
            .collect();
        SampledSpectrum::uniform(LIBRARY_START_NM, LIBRARY_STEP_NM, values)
            .map_err(|e| TableError::BadTable(e.to_string()))
    }
}
