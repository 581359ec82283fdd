// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The Draco recipe: near-infrared imaging and grism spectroscopy with
//! adaptive optics and polarimetry.

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    imaging_spatial, saturation_warnings, slit_spatial, spectroscopy_curves, validate_emission_line,
    validate_setup, CalcOutput, CalcResult, ObservationDetails,
};
use crate::{
    error::CalcError,
    instrument::{
        presets::{draco as build_draco, DracoParams},
        CalcMethod, ConfigurationError, FocalPlaneMask, Telescope,
    },
    morphology::{peak_pixel_fraction, AoSystem, ImageQuality, SpatialProfile},
    s2n::{imaging_s2n, spec_s2n, ExposureSetup, HaloContribution, ImagingInputs, SpecInputs},
    sed::{ObservingConditions, SedFactory, SiteConfig, SourceDefinition},
    tables::{SpectralLibrary, TableProvider},
};

/// A complete Draco calculation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DracoRequest {
    pub instrument: DracoParams,
    pub source: SourceDefinition,
    pub profile: SpatialProfile,
    pub conditions: ObservingConditions,
    pub observation: ObservationDetails,
    pub telescope: Telescope,
    pub site: SiteConfig,

    /// Adaptive-optics correction, when the loop is closed.
    pub ao: Option<AoSystem>,

    /// Polarimetry mode: the waveplate sequence costs ×4 in observing
    /// time, modelled as a first-class multiplier on the accumulated
    /// on-source exposures.
    pub polarimetry: bool,
}

/// Run a Draco request start to finish.
pub fn run(
    request: &DracoRequest,
    tables: &dyn TableProvider,
    library: &dyn SpectralLibrary,
) -> Result<CalcResult, CalcError> {
    let instrument = build_draco(&request.instrument, tables)?;

    if request.polarimetry && instrument.method() == CalcMethod::Spectroscopy {
        return Err(ConfigurationError::PolarimetryNeedsImaging {
            instrument: instrument.name().to_string(),
        }
        .into());
    }

    let setup = request.observation.setup();
    validate_setup(&setup)?;
    validate_emission_line(&request.source, &instrument)?;

    // The ×4 polarimetry overhead, applied after validation so the user's
    // exposure count is still checked as given.
    let effective_setup = if request.polarimetry {
        ExposureSetup {
            on_source_fraction: setup.on_source_fraction * 0.25,
            ..setup
        }
    } else {
        setup
    };

    let factory = SedFactory { tables, library };
    let seds = factory.build(
        &request.source,
        &instrument,
        &request.telescope,
        &request.conditions,
        &request.site,
        request.ao.map(|ao| ao.strehl),
    )?;

    // Core and halo see different PSFs: the corrected core under AO, the
    // seeing-limited halo always.
    let seeing_quality = match request.profile {
        SpatialProfile::Uniform => ImageQuality::uniform_profile(),
        _ => ImageQuality::seeing_limited(
            request.conditions.seeing_arcsec,
            request.conditions.airmass,
            instrument.effective_wavelength(),
        ),
    };
    let core_quality = match (&request.ao, request.profile) {
        (Some(ao), SpatialProfile::Point | SpatialProfile::Gaussian { .. }) => {
            ao.corrected_fwhm(instrument.effective_wavelength())
        }
        _ => seeing_quality,
    };

    let scale = instrument.binned_pixel_scale_arcsec();
    let dark = instrument.dark_current(setup.exposure_s);
    let read_noise = instrument.read_noise(setup.exposure_s);
    let well = instrument.detector().well_depth_e;

    match instrument.method() {
        CalcMethod::Imaging => {
            let spatial = imaging_spatial(
                request.profile,
                core_quality,
                request.observation.analysis,
                scale,
            )?;

            // The halo spills through the same aperture with its own,
            // seeing-limited fractions.
            let halo = seds.halo.as_ref().map(|spectrum| HaloContribution {
                spectrum,
                source_fraction: crate::morphology::source_fraction(
                    request.profile,
                    seeing_quality,
                    spatial.aperture,
                ),
                peak_pixel_fraction: peak_pixel_fraction(request.profile, seeing_quality, scale),
            });
            debug!(
                "Draco imaging: core fraction {:.3}, halo {}",
                spatial.source_fraction,
                halo.is_some()
            );

            let result = imaging_s2n(&ImagingInputs {
                source: &seds.source,
                sky: &seds.sky,
                halo,
                source_fraction: spatial.source_fraction,
                peak_pixel_fraction: spatial.peak_pixel_fraction,
                n_pixels: spatial.n_pixels,
                pixel_area_arcsec2: scale.powi(2),
                dark_e_per_pixel: dark,
                read_noise_e: read_noise,
                setup: effective_setup,
            });
            Ok(CalcResult {
                warnings: saturation_warnings(result.peak_pixel_e, well),
                image_quality_arcsec: core_quality.fwhm_arcsec,
                source_fraction: spatial.source_fraction,
                peak_pixel_e: result.peak_pixel_e,
                output: CalcOutput::Imaging(result),
            })
        }

        CalcMethod::Spectroscopy => {
            let width_arcsec = match instrument.mask() {
                Some(FocalPlaneMask::Slit { width_arcsec }) => width_arcsec,
                // Unreachable: the builder rejects maskless spectroscopy
                // and Draco has no IFU.
                _ => unreachable!("Draco spectroscopy always has a slit"),
            };
            let spatial = slit_spatial(
                request.profile,
                core_quality,
                request.observation.analysis,
                width_arcsec,
                scale,
            )?;

            let halo = seds.halo.as_ref().map(|spectrum| HaloContribution {
                spectrum,
                source_fraction: crate::morphology::source_fraction(
                    request.profile,
                    seeing_quality,
                    spatial.aperture,
                ),
                peak_pixel_fraction: 0.0,
            });

            let gaps = instrument.gap_wavelength_ranges();
            let result = spec_s2n(&SpecInputs {
                source: &seds.source,
                sky: &seds.sky,
                halo,
                gaps: &gaps,
                source_fraction: spatial.source_fraction,
                peak_spatial_fraction: spatial.peak_spatial_fraction,
                aperture_area_arcsec2: spatial.aperture_area_arcsec2,
                n_spatial_pixels: spatial.n_spatial_pixels,
                pixel_width_nm: instrument
                    .spectral_pixel_width()
                    .expect("spectroscopy has a disperser"),
                range: instrument.observing_range(),
                dark_e_per_pixel: dark,
                read_noise_e: read_noise,
                setup: effective_setup,
            });

            Ok(CalcResult {
                warnings: saturation_warnings(result.peak_pixel_e, well),
                image_quality_arcsec: core_quality.fwhm_arcsec,
                source_fraction: spatial.source_fraction,
                peak_pixel_e: result.peak_pixel_e,
                output: CalcOutput::Spectroscopy {
                    curves: spectroscopy_curves(result),
                },
            })
        }
    }
}
