// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Construction functions for the two instrument families.
//!
//! Filters and dispersers are closed enums here; the table row backing a
//! disperser is derived from the enum, never re-parsed from a string.

use serde::{Deserialize, Serialize};

use super::{
    CalcMethod, ConfigurationError, Detector, FocalPlaneMask, Instrument, InstrumentConfig,
    ReadMode, ReadNoiseModel,
};
use crate::tables::TableProvider;

/// Lyra: an optical imager and long-slit/IFU spectrograph.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
pub enum LyraFilter {
    G,
    R,
    I,
    Z,
}

impl LyraFilter {
    fn key(self) -> &'static str {
        match self {
            LyraFilter::G => "lyra/filter_g",
            LyraFilter::R => "lyra/filter_r",
            LyraFilter::I => "lyra/filter_i",
            LyraFilter::Z => "lyra/filter_z",
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
pub enum LyraGrating {
    B600,
    R400,
}

impl LyraGrating {
    fn key(self) -> &'static str {
        match self {
            LyraGrating::B600 => "lyra/b600",
            LyraGrating::R400 => "lyra/r400",
        }
    }
}

/// User-facing Lyra parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyraParams {
    pub method: CalcMethod,
    pub filter: LyraFilter,
    pub grating: Option<LyraGrating>,
    pub central_wavelength_nm: Option<f64>,
    pub focal_plane_mask: Option<FocalPlaneMask>,
    pub read_mode: ReadMode,
    pub spectral_binning: u32,
    pub spatial_binning: u32,
}

/// Assemble a Lyra instrument. The bright read mode is too noisy to pair
/// with dispersed light and is imaging-only.
pub fn lyra(
    params: &LyraParams,
    tables: &dyn TableProvider,
) -> Result<Instrument, ConfigurationError> {
    if params.method == CalcMethod::Spectroscopy && params.read_mode == ReadMode::Bright {
        return Err(ConfigurationError::UnsupportedReadMode {
            instrument: "Lyra".to_string(),
            read_mode: params.read_mode.to_string(),
            method: params.method.to_string(),
        });
    }
    let config = InstrumentConfig {
        name: "Lyra".to_string(),
        method: params.method,
        filter_key: params.filter.key().to_string(),
        fixed_optics_keys: vec!["lyra/optics".to_string()],
        detector_qe_key: "lyra/detector_qe".to_string(),
        disperser_key: params.grating.map(|g| g.key().to_string()),
        central_wavelength_nm: params.central_wavelength_nm,
        focal_plane_mask: params.focal_plane_mask,
        read_mode: params.read_mode,
        spectral_binning: params.spectral_binning,
        spatial_binning: params.spatial_binning,
        pixel_scale_arcsec: 0.08,
        detector: Detector {
            pixels: 6144,
            well_depth_e: 105_000.0,
            dark_current_e_per_s: 2.8e-4,
            gain_e_per_adu: 1.8,
            read_noise: ReadNoiseModel::PerMode {
                bright_e: 6.2,
                faint_e: 3.4,
            },
            gap_pixel_ranges: vec![(2028, 2070), (4096, 4138)],
        },
    };
    Instrument::build(&config, tables)
}

/// Draco: a near-infrared AO imager and grism spectrograph.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
pub enum DracoFilter {
    J,
    H,
    K,
}

impl DracoFilter {
    fn key(self) -> &'static str {
        match self {
            DracoFilter::J => "draco/filter_j",
            DracoFilter::H => "draco/filter_h",
            DracoFilter::K => "draco/filter_k",
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
pub enum DracoGrism {
    Jh,
    Hk,
}

impl DracoGrism {
    fn key(self) -> &'static str {
        match self {
            DracoGrism::Jh => "draco/grism_jh",
            DracoGrism::Hk => "draco/grism_hk",
        }
    }
}

/// User-facing Draco parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DracoParams {
    pub method: CalcMethod,
    pub filter: DracoFilter,
    pub grism: Option<DracoGrism>,
    pub central_wavelength_nm: Option<f64>,
    pub focal_plane_mask: Option<FocalPlaneMask>,
}

/// Assemble a Draco instrument. Draco has no selectable read mode; its
/// array always integrates with non-destructive reads.
pub fn draco(
    params: &DracoParams,
    tables: &dyn TableProvider,
) -> Result<Instrument, ConfigurationError> {
    if params.focal_plane_mask == Some(FocalPlaneMask::Ifu) {
        return Err(ConfigurationError::NoIfu {
            instrument: "Draco".to_string(),
        });
    }
    let config = InstrumentConfig {
        name: "Draco".to_string(),
        method: params.method,
        filter_key: params.filter.key().to_string(),
        fixed_optics_keys: vec!["draco/optics".to_string()],
        detector_qe_key: "draco/detector_qe".to_string(),
        disperser_key: params.grism.map(|g| g.key().to_string()),
        central_wavelength_nm: params.central_wavelength_nm,
        focal_plane_mask: params.focal_plane_mask,
        read_mode: ReadMode::Faint,
        spectral_binning: 1,
        spatial_binning: 1,
        pixel_scale_arcsec: 0.022,
        detector: Detector {
            pixels: 1024,
            well_depth_e: 120_000.0,
            dark_current_e_per_s: 0.25,
            gain_e_per_adu: 12.3,
            read_noise: ReadNoiseModel::NonDestructiveReads {
                base_e: 35.0,
                read_time_s: 2.8,
                max_reads: 16,
            },
            gap_pixel_ranges: vec![],
        },
    };
    Instrument::build(&config, tables)
}

/// The 8.1 m telescope both preset instruments are mounted on.
pub fn demo_telescope() -> super::Telescope {
    super::Telescope {
        aperture_diameter_m: 8.1,
        central_obscuration_m: 1.2,
        coating: super::Coating::Aluminium,
        surfaces: 2,
        thermal_background_key: Some("telescope/thermal_background".to_string()),
    }
}
