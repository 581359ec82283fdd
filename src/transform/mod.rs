// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Physical transforms applied in order to a sampled spectrum.
//!
//! Each variant is a pure function of its parameters; a pipeline is a plain
//! ordered list folded over the spectrum with [`apply_all`]. Transforms
//! mutate in place, so the spectrum after `apply` *is* the post-transform
//! state.

mod error;
#[cfg(test)]
mod tests;

pub use error::TransformError;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::{
    spectrum::SampledSpectrum,
    units::{BrightnessUnit, MagnitudeBand},
};

/// Sky transparency bins, by percentile of nights.
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
pub enum CloudCover {
    /// Photometric.
    Percent50,
    Percent70,
    Percent80,
    Any,
}

impl CloudCover {
    /// Grey transmission factor for the bin.
    pub fn transmission(self) -> f64 {
        match self {
            CloudCover::Percent50 => 1.0,
            CloudCover::Percent70 => 0.9,
            CloudCover::Percent80 => 0.8,
            CloudCover::Any => 0.5,
        }
    }
}

/// Water-vapour bins, by percentile of nights. Selects which absorption
/// table applies.
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
pub enum WaterVaporPercentile {
    Percent20,
    Percent50,
    Percent80,
    Any,
}

impl WaterVaporPercentile {
    /// The lookup-table key for this bin's absorption curve.
    pub fn table_key(self) -> &'static str {
        match self {
            WaterVaporPercentile::Percent20 => "atmosphere/water_20",
            WaterVaporPercentile::Percent50 => "atmosphere/water_50",
            WaterVaporPercentile::Percent80 => "atmosphere/water_80",
            WaterVaporPercentile::Any => "atmosphere/water_100",
        }
    }
}

/// One step of the spectral pipeline.
#[derive(Debug, Clone)]
pub enum SpectrumTransform {
    /// Multiply the wavelength grid by 1 + z. Not idempotent: repeated
    /// application compounds.
    Redshift { z: f64 },

    /// Rescale so the band-averaged photon flux matches the requested
    /// brightness.
    Normalize {
        band: MagnitudeBand,
        magnitude: f64,
        unit: BrightnessUnit,
    },

    /// Atmospheric extinction; the curve is tabulated at airmass 1 and
    /// taken to the `airmass` power.
    AtmosphericExtinction {
        curve: SampledSpectrum,
        airmass: f64,
    },

    /// Grey cloud attenuation.
    CloudTransmission { cover: CloudCover },

    /// Water-vapour absorption, already selected for site/percentile.
    WaterVapor { curve: SampledSpectrum },

    /// Mirror-train reflectivity: coating reflectivity to the power of the
    /// surface count.
    TelescopeTransmission { reflectivity: f64, surfaces: u32 },

    /// Integrate out the collecting area: photons s⁻¹ nm⁻¹ m⁻² becomes
    /// photons s⁻¹ nm⁻¹.
    TelescopeAperture { area_m2: f64 },

    /// Add an emission spectrum (telescope thermal background onto the
    /// sky).
    AddBackground { background: SampledSpectrum },

    /// One optical element: trim to the element's valid range, then
    /// multiply by its transmission.
    ComponentTransmission {
        name: String,
        curve: SampledSpectrum,
    },

    /// Chip-gap mask: flux in any of the wavelength ranges is lost.
    DetectorGaps { gaps: Vec<(f64, f64)> },
}

impl SpectrumTransform {
    /// Apply this transform, leaving `spectrum` in the post-transform
    /// state.
    pub fn apply(&self, spectrum: &mut SampledSpectrum) -> Result<(), TransformError> {
        match self {
            SpectrumTransform::Redshift { z } => {
                if *z <= -1.0 {
                    return Err(TransformError::InvalidRedshift(*z));
                }
                spectrum.shift_wavelengths(1.0 + z);
            }

            SpectrumTransform::Normalize {
                band,
                magnitude,
                unit,
            } => {
                if band.start_nm() < spectrum.start() || band.end_nm() > spectrum.end() {
                    return Err(TransformError::NormalizationOutsideSpectrum {
                        band: *band,
                        band_start: band.start_nm(),
                        band_end: band.end_nm(),
                        spectrum_start: spectrum.start(),
                        spectrum_end: spectrum.end(),
                    });
                }
                let mean = spectrum.integral_over(band.start_nm(), band.end_nm()) / band.width_nm();
                if mean <= 0.0 {
                    return Err(TransformError::NoFluxInNormalizationBand { band: *band });
                }
                let target = unit.to_photon_flux(*magnitude, *band);
                trace!(
                    "Normalising to {magnitude} {unit} in {band}: scale {}",
                    target / mean
                );
                spectrum.rescale(target / mean);
            }

            SpectrumTransform::AtmosphericExtinction { curve, airmass } => {
                spectrum.multiply_curve(|w| curve.value_at(w).powf(*airmass));
            }

            SpectrumTransform::CloudTransmission { cover } => {
                spectrum.rescale(cover.transmission());
            }

            SpectrumTransform::WaterVapor { curve } => {
                spectrum.multiply_curve(|w| curve.value_at(w));
            }

            SpectrumTransform::TelescopeTransmission {
                reflectivity,
                surfaces,
            } => {
                spectrum.rescale(reflectivity.powi(*surfaces as i32));
            }

            SpectrumTransform::TelescopeAperture { area_m2 } => {
                spectrum.rescale(*area_m2);
            }

            SpectrumTransform::AddBackground { background } => {
                spectrum.add(background);
            }

            SpectrumTransform::ComponentTransmission { name, curve } => {
                let start = spectrum.start().max(curve.start());
                let end = spectrum.end().min(curve.end());
                spectrum.trim(start, end).map_err(|e| {
                    TransformError::ComponentOutsideSpectrum {
                        name: name.clone(),
                        source: e,
                    }
                })?;
                spectrum.multiply_curve(|w| curve.value_at(w));
            }

            SpectrumTransform::DetectorGaps { gaps } => {
                spectrum.multiply_curve(|w| {
                    if gaps.iter().any(|&(lo, hi)| w >= lo && w <= hi) {
                        0.0
                    } else {
                        1.0
                    }
                });
            }
        }
        Ok(())
    }
}

/// Fold an ordered transform list over a spectrum.
pub fn apply_all(
    transforms: &[SpectrumTransform],
    spectrum: &mut SampledSpectrum,
) -> Result<(), TransformError> {
    for t in transforms {
        t.apply(spectrum)?;
    }
    Ok(())
}
