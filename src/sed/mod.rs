// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Building the transformed source and sky SEDs.
//!
//! The factory assembles the initial source spectrum from its model,
//! redshifts and normalises it, then applies the atmosphere → telescope →
//! instrument transform chain identically to the source and to an
//! independently constructed sky spectrum. Adaptive-optics requests split
//! the transformed source into a diffraction-limited core and a seeing-halo
//! clone.

mod error;
pub mod library;
#[cfg(test)]
mod tests;

pub use error::SedError;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{BOLTZMANN_J_PER_K, PLANCK_J_S, VEL_LIGHT_KM_PER_S, VEL_LIGHT_M_PER_S},
    instrument::{Instrument, Telescope},
    spectrum::SampledSpectrum,
    tables::{SpectralLibrary, TableProvider},
    transform::{apply_all, CloudCover, SpectrumTransform, WaterVaporPercentile},
    units::{BrightnessUnit, MagnitudeBand},
};

/// The spectral model of a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSpec {
    /// A named reference SED from the spectral library.
    Library { name: String },

    /// A blackbody of the given temperature.
    Blackbody { temperature_k: f64 },

    /// A single Gaussian emission line on a flat continuum. The line flux
    /// is absolute \[W/m²\] and the continuum is f_λ \[W/m²/µm\], so
    /// emission-line sources skip normalisation.
    EmissionLine {
        wavelength_nm: f64,
        width_kms: f64,
        line_flux_w_m2: f64,
        continuum_w_m2_um: f64,
    },

    /// f(λ) ∝ λ^index.
    PowerLaw { index: f64 },
}

/// Brightness normalisation of a source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    pub band: MagnitudeBand,
    pub brightness: f64,
    pub unit: BrightnessUnit,
}

/// A source model plus its redshift and normalisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDefinition {
    pub spec: SourceSpec,

    #[serde(default)]
    pub redshift: f64,

    /// `None` for absolutely calibrated sources (emission lines).
    pub normalization: Option<Normalization>,
}

/// Atmospheric conditions of the observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservingConditions {
    pub airmass: f64,

    /// Seeing FWHM at 500 nm \[arcsec\].
    pub seeing_arcsec: f64,

    pub cloud: CloudCover,
    pub water: WaterVaporPercentile,
}

/// Site-specific table keys for the atmosphere and sky.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub extinction_key: String,
    pub sky_emission_key: String,
}

/// The fully transformed spectra a recipe's calculators consume. Immutable
/// after creation.
#[derive(Debug, Clone)]
pub struct SourceResult {
    /// The transformed source SED \[photons s⁻¹ nm⁻¹\]. Under AO this is
    /// the Strehl-scaled core.
    pub source: SampledSpectrum,

    /// The transformed sky SED \[photons s⁻¹ nm⁻¹ arcsec⁻²\].
    pub sky: SampledSpectrum,

    /// The (1 − Strehl) seeing halo, an independent clone of the source.
    pub halo: Option<SampledSpectrum>,
}

/// Builds [`SourceResult`]s.
pub struct SedFactory<'a> {
    pub tables: &'a dyn TableProvider,
    pub library: &'a dyn SpectralLibrary,
}

impl SedFactory<'_> {
    /// Run the full SED pipeline for one calculation request.
    ///
    /// `strehl` is `Some` for adaptive-optics observations and splits the
    /// transformed source into core and halo.
    pub fn build(
        &self,
        source: &SourceDefinition,
        instrument: &Instrument,
        telescope: &Telescope,
        conditions: &ObservingConditions,
        site: &SiteConfig,
        strehl: Option<f64>,
    ) -> Result<SourceResult, SedError> {
        let (obs_start, obs_end) = instrument.observing_range();
        let interval = sampling_interval(instrument);

        let mut sed = self.initial_sed(source, instrument, interval)?;

        SpectrumTransform::Redshift { z: source.redshift }.apply(&mut sed)?;

        // The redshift may have moved the spectrum off the instrument.
        if sed.start() > obs_start || sed.end() < obs_end {
            return Err(SedError::OutsideObservingRange {
                z: source.redshift,
                spectrum_start: sed.start(),
                spectrum_end: sed.end(),
                required_start: obs_start,
                required_end: obs_end,
            });
        }

        if let Some(norm) = &source.normalization {
            SpectrumTransform::Normalize {
                band: norm.band,
                magnitude: norm.brightness,
                unit: norm.unit,
            }
            .apply(&mut sed)?;
        }

        sed.trim(obs_start, obs_end)?;

        // Atmosphere → telescope → instrument, identical for source and
        // sky apart from the source-only terms (extinction of light from
        // above the atmosphere, grey cloud loss).
        let extinction = self.tables.transmission(&site.extinction_key)?.to_spectrum()?;
        let water = self
            .tables
            .transmission(conditions.water.table_key())?
            .to_spectrum()?;

        let mut source_chain = vec![
            SpectrumTransform::AtmosphericExtinction {
                curve: extinction,
                airmass: conditions.airmass,
            },
            SpectrumTransform::CloudTransmission {
                cover: conditions.cloud,
            },
            SpectrumTransform::WaterVapor { curve: water },
        ];
        source_chain.extend(telescope_and_instrument_chain(telescope, instrument));
        apply_all(&source_chain, &mut sed)?;

        // The sky starts from the site emission table (already selected
        // for the water-vapour bin) and picks up the telescope's own
        // thermal glow after the mirror train.
        let mut sky = self
            .tables
            .background(&site.sky_emission_key)?
            .to_spectrum()?;
        sky.trim(obs_start, obs_end)?;
        let mut sky_chain = vec![SpectrumTransform::TelescopeTransmission {
            reflectivity: telescope.coating.reflectivity(),
            surfaces: telescope.surfaces,
        }];
        if let Some(key) = &telescope.thermal_background_key {
            if let Ok(thermal) = self.tables.background(key) {
                sky_chain.push(SpectrumTransform::AddBackground {
                    background: thermal.to_spectrum()?,
                });
            }
        }
        sky_chain.push(SpectrumTransform::TelescopeAperture {
            area_m2: telescope.collecting_area_m2(),
        });
        for component in instrument.components() {
            sky_chain.push(SpectrumTransform::ComponentTransmission {
                name: component.name().to_string(),
                curve: component.curve().clone(),
            });
        }
        apply_all(&sky_chain, &mut sky)?;

        // AO: the core keeps `strehl` of the light, an independent clone
        // gets the rest. The clone must not share storage with the core.
        match strehl {
            None => Ok(SourceResult {
                source: sed,
                sky,
                halo: None,
            }),
            Some(s) => {
                if !(0.0..=1.0).contains(&s) || s == 0.0 {
                    return Err(SedError::BadStrehl(s));
                }
                let mut halo = sed.clone();
                halo.rescale(1.0 - s);
                sed.rescale(s);
                trace!("AO split: Strehl {s}, halo fraction {}", 1.0 - s);
                Ok(SourceResult {
                    source: sed,
                    sky,
                    halo: Some(halo),
                })
            }
        }
    }

    /// The initial (pre-redshift) source SED, sampled finely enough for
    /// the instrument and wide enough that the redshift lands it on the
    /// observing range and the normalization band.
    fn initial_sed(
        &self,
        source: &SourceDefinition,
        instrument: &Instrument,
        interval: f64,
    ) -> Result<SampledSpectrum, SedError> {
        let (obs_start, obs_end) = instrument.observing_range();
        let shift = 1.0 + source.redshift;

        // Rest-frame range that must exist so that, after shifting, the
        // spectrum still covers the observing range and the normalization
        // band.
        let mut start = obs_start / shift;
        let mut end = obs_end / shift;
        if let Some(norm) = &source.normalization {
            start = start.min(norm.band.start_nm() / shift);
            end = end.max(norm.band.end_nm() / shift);
        }
        // A little margin so trims never land exactly on the last sample.
        start = (start - 5.0 * interval).max(interval);
        end += 5.0 * interval;

        let sed = match &source.spec {
            SourceSpec::Library { name } => {
                let reference = self.library.sed(name)?;
                // A library SED has finite native coverage; sampling must
                // not manufacture flux outside it.
                let lo = start.max(reference.start());
                let hi = end.min(reference.end());
                if lo >= hi {
                    return Err(SedError::OutsideObservingRange {
                        z: source.redshift,
                        spectrum_start: reference.start() * shift,
                        spectrum_end: reference.end() * shift,
                        required_start: obs_start,
                        required_end: obs_end,
                    });
                }
                sample_onto(&reference, lo, hi, interval)?
            }

            SourceSpec::Blackbody { temperature_k } => {
                if *temperature_k <= 0.0 {
                    return Err(SedError::BadTemperature(*temperature_k));
                }
                generate(start, end, interval, |w| {
                    blackbody_photon_shape(w, *temperature_k)
                })?
            }

            SourceSpec::EmissionLine {
                wavelength_nm,
                width_kms,
                line_flux_w_m2,
                continuum_w_m2_um,
            } => {
                if *width_kms <= 0.0 {
                    return Err(SedError::BadLineWidth(*width_kms));
                }
                let fwhm_nm = wavelength_nm * width_kms / VEL_LIGHT_KM_PER_S;
                let sigma_nm = fwhm_nm / (8.0 * 2f64.ln()).sqrt();
                // Photon count conversions at each sample's wavelength.
                let line_photons =
                    line_flux_w_m2 * (wavelength_nm * 1e-9) / (PLANCK_J_S * VEL_LIGHT_M_PER_S);
                generate(start, end, interval, |w| {
                    let continuum = continuum_w_m2_um * 1e-3 * (w * 1e-9)
                        / (PLANCK_J_S * VEL_LIGHT_M_PER_S);
                    let gauss = (-0.5 * ((w - wavelength_nm) / sigma_nm).powi(2)).exp()
                        / (sigma_nm * (2.0 * std::f64::consts::PI).sqrt());
                    continuum + line_photons * gauss
                })?
            }

            SourceSpec::PowerLaw { index } => {
                generate(start, end, interval, |w| (w / 1000.0).powf(*index))?
            }
        };
        Ok(sed)
    }
}

/// The transform chain every photon from above the atmosphere shares:
/// mirror train, collecting area, then each optical element in beam order.
fn telescope_and_instrument_chain(
    telescope: &Telescope,
    instrument: &Instrument,
) -> Vec<SpectrumTransform> {
    let mut chain = vec![
        SpectrumTransform::TelescopeTransmission {
            reflectivity: telescope.coating.reflectivity(),
            surfaces: telescope.surfaces,
        },
        SpectrumTransform::TelescopeAperture {
            area_m2: telescope.collecting_area_m2(),
        },
    ];
    for component in instrument.components() {
        chain.push(SpectrumTransform::ComponentTransmission {
            name: component.name().to_string(),
            curve: component.curve().clone(),
        });
    }
    chain
}

/// The source sampling interval \[nm\]: half a binned spectral pixel for
/// spectroscopy, 1 nm for imaging.
fn sampling_interval(instrument: &Instrument) -> f64 {
    match instrument.spectral_pixel_width() {
        Some(w) => 0.5 * w,
        None => 1.0,
    }
}

/// Sample a reference SED onto a uniform grid by interpolation. Outside
/// the reference's coverage the flux is zero, which downstream range
/// checks will catch.
fn sample_onto(
    reference: &SampledSpectrum,
    start: f64,
    end: f64,
    interval: f64,
) -> Result<SampledSpectrum, SedError> {
    generate(start, end, interval, |w| reference.value_at(w))
}

fn generate(
    start: f64,
    end: f64,
    interval: f64,
    f: impl Fn(f64) -> f64,
) -> Result<SampledSpectrum, SedError> {
    let n = ((end - start) / interval).ceil() as usize + 1;
    let values = (0..n).map(|i| f(start + i as f64 * interval)).collect();
    Ok(SampledSpectrum::uniform(start, interval, values)?)
}

/// The photon-flux shape of a blackbody, n_λ ∝ λ⁻⁴ / (e^{hc/λkT} − 1),
/// with arbitrary normalisation.
pub(crate) fn blackbody_photon_shape(lambda_nm: f64, temperature_k: f64) -> f64 {
    let lambda_m = lambda_nm * 1e-9;
    let x = PLANCK_J_S * VEL_LIGHT_M_PER_S / (lambda_m * BOLTZMANN_J_PER_K * temperature_k);
    // Scale λ to µm to keep the fourth power in a comfortable float range.
    let lambda_um = lambda_nm * 1e-3;
    1.0 / (lambda_um.powi(4) * (x.exp() - 1.0))
}
