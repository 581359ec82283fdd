// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Lookup-table and spectral-library services.
//!
//! The engine never touches the filesystem; transmission curves, dispersion
//! rows, background SEDs and reference spectra all come through the traits
//! here. [`MemoryTables`] is the standard implementation, deserialised from
//! YAML by whatever loading layer the deployment uses. Providers are
//! read-only after construction, so sharing one across calculation requests
//! needs no locking.

pub mod builtin;
mod error;

pub use error::TableError;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::spectrum::SampledSpectrum;

/// A tabulated wavelength-dependent transmission curve. Values are
/// dimensionless in [0, 1] for optics; background tables reuse the same
/// shape with emission values instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransmissionTable {
    /// Sampled wavelengths \[nm\], strictly increasing.
    pub wavelengths_nm: Vec<f64>,

    /// Transmission (or emission) at each sampled wavelength.
    pub values: Vec<f64>,
}

impl TransmissionTable {
    /// Interpret the table as a spectrum (used for background tables).
    pub fn to_spectrum(&self) -> Result<SampledSpectrum, TableError> {
        SampledSpectrum::new(self.wavelengths_nm.clone(), self.values.clone())
            .map_err(|e| TableError::BadTable(e.to_string()))
    }
}

/// One row of a grating/grism dispersion table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispersionEntry {
    /// Linear dispersion at the blaze wavelength \[nm/pixel\], unbinned.
    pub dispersion_nm_per_pixel: f64,

    /// Resolving power λ/Δλ for a 0.5 arcsec slit.
    pub resolving_power: f64,

    /// Blaze wavelength \[nm\].
    pub blaze_nm: f64,
}

/// Provider of instrument/site lookup tables, keyed by
/// `instrument/component` strings.
pub trait TableProvider {
    fn transmission(&self, key: &str) -> Result<&TransmissionTable, TableError>;
    fn dispersion(&self, key: &str) -> Result<DispersionEntry, TableError>;
    fn background(&self, key: &str) -> Result<&TransmissionTable, TableError>;
}

/// Provider of named reference SEDs (spectral-type libraries).
pub trait SpectralLibrary {
    /// A reference SED for `name`, in photons s⁻¹ nm⁻¹ m⁻² with arbitrary
    /// normalisation (the pipeline normalises it afterwards).
    fn sed(&self, name: &str) -> Result<SampledSpectrum, TableError>;
}

/// In-memory table set. The standard [`TableProvider`]; deserialises from
/// YAML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryTables {
    #[serde(default)]
    pub transmissions: IndexMap<String, TransmissionTable>,

    #[serde(default)]
    pub dispersions: IndexMap<String, DispersionEntry>,

    #[serde(default)]
    pub backgrounds: IndexMap<String, TransmissionTable>,
}

impl MemoryTables {
    pub fn from_yaml(yaml: &str) -> Result<MemoryTables, TableError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json(json: &str) -> Result<MemoryTables, TableError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl TableProvider for MemoryTables {
    fn transmission(&self, key: &str) -> Result<&TransmissionTable, TableError> {
        self.transmissions
            .get(key)
            .ok_or_else(|| TableError::UnknownTransmission(key.to_string()))
    }

    fn dispersion(&self, key: &str) -> Result<DispersionEntry, TableError> {
        self.dispersions
            .get(key)
            .copied()
            .ok_or_else(|| TableError::UnknownDispersion(key.to_string()))
    }

    fn background(&self, key: &str) -> Result<&TransmissionTable, TableError> {
        self.backgrounds
            .get(key)
            .ok_or_else(|| TableError::UnknownBackground(key.to_string()))
    }
}
