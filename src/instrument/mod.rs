// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Instrument composition.
//!
//! An [`Instrument`] is a single capability record: an ordered optical
//! train, an optional disperser, a detector and scale/binning data. There
//! is no per-instrument subclassing; instrument families differ only in the
//! data their construction functions (see [`presets`]) put here. Illegal
//! filter/disperser/mask/method combinations are rejected at build time,
//! before any spectrum maths runs.

mod components;
mod error;
pub mod presets;
#[cfg(test)]
mod tests;

pub use components::{GratingOptics, OpticalComponent};
pub use error::ConfigurationError;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::tables::TableProvider;

/// Whether a calculation is imaging or spectroscopy.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
pub enum CalcMethod {
    Imaging,
    Spectroscopy,
}

/// Detector read mode.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
pub enum ReadMode {
    /// Fast readout, higher read noise.
    Bright,

    /// Slow readout, lower read noise.
    Faint,
}

/// The focal-plane mask feeding a spectrograph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocalPlaneMask {
    /// A long slit of the given width \[arcsec\].
    Slit { width_arcsec: f64 },

    /// The integral field unit.
    Ifu,
}

/// How a detector's read noise is determined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadNoiseModel {
    /// A single value \[e-\].
    Fixed { rms_e: f64 },

    /// One value per read mode \[e-\].
    PerMode { bright_e: f64, faint_e: f64 },

    /// Non-destructive reads: the read count is derived from the exposure
    /// time, and both the read noise and the dark current depend on it.
    /// The dark-current coupling reproduces the legacy formula and is
    /// scientifically unverified; see DESIGN.md.
    NonDestructiveReads {
        base_e: f64,
        read_time_s: f64,
        max_reads: u32,
    },
}

impl ReadNoiseModel {
    /// Number of non-destructive reads for an exposure; 1 for the other
    /// models.
    fn reads(&self, exposure_s: f64) -> u32 {
        match self {
            ReadNoiseModel::Fixed { .. } | ReadNoiseModel::PerMode { .. } => 1,
            ReadNoiseModel::NonDestructiveReads {
                read_time_s,
                max_reads,
                ..
            } => ((exposure_s / read_time_s).floor() as u32).clamp(1, *max_reads),
        }
    }
}

/// Detector parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detector {
    /// Pixels along the dispersion axis.
    pub pixels: u32,

    /// Full-well depth \[e-\].
    pub well_depth_e: f64,

    /// Dark current \[e-/s/pixel\].
    pub dark_current_e_per_s: f64,

    /// Gain \[e-/ADU\].
    pub gain_e_per_adu: f64,

    pub read_noise: ReadNoiseModel,

    /// Chip-gap pixel ranges along the dispersion axis (inclusive).
    #[serde(default)]
    pub gap_pixel_ranges: Vec<(u32, u32)>,
}

/// Mirror coating of the telescope train.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
pub enum Coating {
    Aluminium,
    Silver,
}

impl Coating {
    /// Broadband reflectivity per surface.
    pub fn reflectivity(self) -> f64 {
        match self {
            Coating::Aluminium => 0.92,
            Coating::Silver => 0.985,
        }
    }
}

/// The telescope feeding an instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telescope {
    /// Primary mirror diameter \[m\].
    pub aperture_diameter_m: f64,

    /// Central obscuration diameter \[m\].
    pub central_obscuration_m: f64,

    pub coating: Coating,

    /// Number of reflecting surfaces before the instrument.
    pub surfaces: u32,

    /// Key of the thermal-emission background table, for sites/wavelengths
    /// where the telescope itself glows.
    pub thermal_background_key: Option<String>,
}

impl Telescope {
    /// Unobscured collecting area \[m²\].
    pub fn collecting_area_m2(&self) -> f64 {
        std::f64::consts::FRAC_PI_4
            * (self.aperture_diameter_m.powi(2) - self.central_obscuration_m.powi(2))
    }
}

/// Everything needed to assemble an [`Instrument`]. Preset construction
/// functions fill this from their closed filter/disperser enums; it can
/// also be deserialised directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub name: String,
    pub method: CalcMethod,
    pub filter_key: String,

    /// Fixed optics (collimator, camera, fold mirrors), in beam order.
    pub fixed_optics_keys: Vec<String>,

    pub detector_qe_key: String,
    pub disperser_key: Option<String>,
    pub central_wavelength_nm: Option<f64>,
    pub focal_plane_mask: Option<FocalPlaneMask>,
    pub read_mode: ReadMode,
    pub spectral_binning: u32,
    pub spatial_binning: u32,

    /// Unbinned pixel scale \[arcsec/pixel\].
    pub pixel_scale_arcsec: f64,

    pub detector: Detector,
}

/// The composition root: an ordered optical train plus detector and scale
/// data, validated at construction.
#[derive(Debug, Clone)]
pub struct Instrument {
    name: String,
    method: CalcMethod,
    components: Vec<OpticalComponent>,
    filter: OpticalComponent,
    grating: Option<GratingOptics>,
    mask: Option<FocalPlaneMask>,
    read_mode: ReadMode,
    spectral_binning: u32,
    spatial_binning: u32,
    pixel_scale_arcsec: f64,
    detector: Detector,
    observing_range: (f64, f64),
}

impl Instrument {
    /// Assemble and validate an instrument. This is the fail-fast gate for
    /// physically inconsistent parameter sets.
    pub fn build(
        config: &InstrumentConfig,
        tables: &dyn TableProvider,
    ) -> Result<Instrument, ConfigurationError> {
        let name = config.name.clone();

        if config.spectral_binning == 0 || config.spatial_binning == 0 {
            return Err(ConfigurationError::ZeroBinning { instrument: name });
        }

        match (config.method, &config.disperser_key) {
            (CalcMethod::Spectroscopy, None) => {
                return Err(ConfigurationError::SpectroscopyNeedsDisperser { instrument: name })
            }
            (CalcMethod::Imaging, Some(d)) => {
                return Err(ConfigurationError::ImagingWithDisperser {
                    instrument: name,
                    disperser: d.clone(),
                })
            }
            _ => (),
        }
        if config.method == CalcMethod::Spectroscopy && config.focal_plane_mask.is_none() {
            return Err(ConfigurationError::SpectroscopyNeedsMask { instrument: name });
        }

        let filter = OpticalComponent::from_table(&config.filter_key, tables.transmission(&config.filter_key)?)?;

        let mut components = Vec::with_capacity(config.fixed_optics_keys.len() + 2);
        components.push(filter.clone());
        for key in &config.fixed_optics_keys {
            components.push(OpticalComponent::from_table(key, tables.transmission(key)?)?);
        }
        components.push(OpticalComponent::from_table(
            &config.detector_qe_key,
            tables.transmission(&config.detector_qe_key)?,
        )?);

        let grating = match &config.disperser_key {
            None => None,
            Some(key) => {
                let central = config.central_wavelength_nm.ok_or_else(|| {
                    ConfigurationError::MissingCentralWavelength {
                        instrument: name.clone(),
                    }
                })?;
                let entry = tables.dispersion(key)?;
                Some(GratingOptics::new(key, entry, central, config.detector.pixels))
            }
        };

        // The observable range is the intersection of the filter's range
        // and, when dispersing, the grating's coverage.
        let observing_range = match &grating {
            None => (filter.start(), filter.end()),
            Some(g) => {
                let (g_start, g_end) = g.coverage();
                let start = filter.start().max(g_start);
                let end = filter.end().min(g_end);
                if start >= end {
                    return Err(ConfigurationError::DisjointRange {
                        instrument: name,
                        filter_start: filter.start(),
                        filter_end: filter.end(),
                        grating_start: g_start,
                        grating_end: g_end,
                    });
                }
                (start, end)
            }
        };

        debug!(
            "{name}: observing range {:.1} nm..{:.1} nm",
            observing_range.0, observing_range.1
        );

        Ok(Instrument {
            name,
            method: config.method,
            components,
            filter,
            grating,
            mask: config.focal_plane_mask,
            read_mode: config.read_mode,
            spectral_binning: config.spectral_binning,
            spatial_binning: config.spatial_binning,
            pixel_scale_arcsec: config.pixel_scale_arcsec,
            detector: config.detector.clone(),
            observing_range,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> CalcMethod {
        self.method
    }

    /// The ordered optical train (filter, fixed optics, detector QE).
    pub fn components(&self) -> &[OpticalComponent] {
        &self.components
    }

    pub fn grating(&self) -> Option<&GratingOptics> {
        self.grating.as_ref()
    }

    pub fn mask(&self) -> Option<FocalPlaneMask> {
        self.mask
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    pub fn spectral_binning(&self) -> u32 {
        self.spectral_binning
    }

    pub fn spatial_binning(&self) -> u32 {
        self.spatial_binning
    }

    /// Unbinned pixel scale \[arcsec/pixel\].
    pub fn pixel_scale_arcsec(&self) -> f64 {
        self.pixel_scale_arcsec
    }

    /// Binned pixel scale in the spatial direction \[arcsec/pixel\].
    pub fn binned_pixel_scale_arcsec(&self) -> f64 {
        self.pixel_scale_arcsec * self.spatial_binning as f64
    }

    /// The observable wavelength range \[nm\]: the filter range intersected
    /// with the disperser coverage.
    pub fn observing_range(&self) -> (f64, f64) {
        self.observing_range
    }

    /// The grating's central wavelength for spectroscopy, else the filter's
    /// transmission-weighted effective wavelength \[nm\].
    pub fn effective_wavelength(&self) -> f64 {
        match (&self.method, &self.grating) {
            (CalcMethod::Spectroscopy, Some(g)) => g.central_nm(),
            _ => self.filter.effective_wavelength(),
        }
    }

    /// Width of one binned spectral pixel \[nm\].
    pub fn spectral_pixel_width(&self) -> Option<f64> {
        self.grating
            .as_ref()
            .map(|g| g.dispersion_nm_per_pixel() * self.spectral_binning as f64)
    }

    /// Chip-gap wavelength ranges for the current grating setting.
    pub fn gap_wavelength_ranges(&self) -> Vec<(f64, f64)> {
        match &self.grating {
            None => vec![],
            Some(g) => g.pixel_ranges_to_wavelengths(&self.detector.gap_pixel_ranges),
        }
    }

    /// Read noise for an exposure \[e- rms/pixel\].
    pub fn read_noise(&self, exposure_s: f64) -> f64 {
        match &self.detector.read_noise {
            ReadNoiseModel::Fixed { rms_e } => *rms_e,
            ReadNoiseModel::PerMode { bright_e, faint_e } => match self.read_mode {
                ReadMode::Bright => *bright_e,
                ReadMode::Faint => *faint_e,
            },
            ReadNoiseModel::NonDestructiveReads { base_e, .. } => {
                let reads = self.detector.read_noise.reads(exposure_s);
                base_e / (reads as f64).sqrt()
            }
        }
    }

    /// Dark charge accumulated over an exposure \[e-/pixel\]. For
    /// non-destructive-read detectors the read count feeds back into the
    /// dark term; this reproduces the legacy formula as documented
    /// behaviour.
    pub fn dark_current(&self, exposure_s: f64) -> f64 {
        let base = self.detector.dark_current_e_per_s * exposure_s;
        match &self.detector.read_noise {
            ReadNoiseModel::NonDestructiveReads { .. } => {
                let reads = self.detector.read_noise.reads(exposure_s);
                base * (1.0 + 1.0 / reads as f64)
            }
            _ => base,
        }
    }

    /// Wall-clock time for one frame, including readout \[s\].
    pub fn frame_time(&self, exposure_s: f64) -> f64 {
        match &self.detector.read_noise {
            ReadNoiseModel::NonDestructiveReads { read_time_s, .. } => {
                let reads = self.detector.read_noise.reads(exposure_s);
                exposure_s + read_time_s * reads as f64
            }
            _ => match self.read_mode {
                ReadMode::Bright => exposure_s + 10.0,
                ReadMode::Faint => exposure_s + 30.0,
            },
        }
    }
}
