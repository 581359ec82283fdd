// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The Lyra recipe: optical imaging, long-slit and IFU spectroscopy.

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    imaging_spatial, saturation_warnings, slit_spatial, spectroscopy_curves, validate_emission_line,
    validate_setup, AnalysisMethod, CalcOutput, CalcResult, ObservationDetails, ValidationError,
};
use crate::{
    error::CalcError,
    instrument::{
        presets::{lyra as build_lyra, LyraParams},
        CalcMethod, FocalPlaneMask, Telescope,
    },
    math::round_half_up,
    morphology::{
        peak_pixel_fraction, Aperture, IfuApertures, ImageQuality, SpatialProfile,
    },
    s2n::{imaging_s2n, spec_s2n, ImagingInputs, SpecInputs},
    sed::{ObservingConditions, SedFactory, SiteConfig, SourceDefinition},
    tables::{SpectralLibrary, TableProvider},
};

/// Side length of one hexagonal IFU element \[arcsec\].
const IFU_ELEMENT_SIDE_ARCSEC: f64 = 0.14;

/// Centre-to-centre pitch of adjacent IFU elements \[arcsec\].
const IFU_ELEMENT_PITCH_ARCSEC: f64 = 0.25;

/// Number of IFU elements in the summed aperture.
const IFU_ELEMENT_COUNT: usize = 5;

/// A complete Lyra calculation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyraRequest {
    pub instrument: LyraParams,
    pub source: SourceDefinition,
    pub profile: SpatialProfile,
    pub conditions: ObservingConditions,
    pub observation: ObservationDetails,
    pub telescope: Telescope,
    pub site: SiteConfig,
}

/// Run a Lyra request start to finish.
pub fn run(
    request: &LyraRequest,
    tables: &dyn TableProvider,
    library: &dyn SpectralLibrary,
) -> Result<CalcResult, CalcError> {
    let instrument = build_lyra(&request.instrument, tables)?;

    let setup = request.observation.setup();
    validate_setup(&setup)?;
    validate_emission_line(&request.source, &instrument)?;

    // The IFU mask and IFU analysis only make sense together.
    let ifu_selected = instrument.mask() == Some(FocalPlaneMask::Ifu);
    let ifu_analysis = matches!(request.observation.analysis, AnalysisMethod::Ifu { .. });
    if ifu_selected && !ifu_analysis {
        return Err(ValidationError::IfuMaskWithoutIfuAnalysis.into());
    }
    if ifu_analysis && !ifu_selected {
        return Err(ValidationError::IfuAnalysisWithoutIfu.into());
    }

    let factory = SedFactory { tables, library };
    let seds = factory.build(
        &request.source,
        &instrument,
        &request.telescope,
        &request.conditions,
        &request.site,
        None,
    )?;

    let quality = match request.profile {
        SpatialProfile::Uniform => ImageQuality::uniform_profile(),
        _ => ImageQuality::seeing_limited(
            request.conditions.seeing_arcsec,
            request.conditions.airmass,
            instrument.effective_wavelength(),
        ),
    };
    let scale = instrument.binned_pixel_scale_arcsec();
    let dark = instrument.dark_current(setup.exposure_s);
    let read_noise = instrument.read_noise(setup.exposure_s);
    let well = instrument.detector().well_depth_e;

    match instrument.method() {
        CalcMethod::Imaging => {
            let spatial =
                imaging_spatial(request.profile, quality, request.observation.analysis, scale)?;
            debug!(
                "Lyra imaging: fraction {:.3} over {} pixels",
                spatial.source_fraction, spatial.n_pixels
            );
            let result = imaging_s2n(&ImagingInputs {
                source: &seds.source,
                sky: &seds.sky,
                halo: None,
                source_fraction: spatial.source_fraction,
                peak_pixel_fraction: spatial.peak_pixel_fraction,
                n_pixels: spatial.n_pixels,
                pixel_area_arcsec2: scale.powi(2),
                dark_e_per_pixel: dark,
                read_noise_e: read_noise,
                setup,
            });
            Ok(CalcResult {
                warnings: saturation_warnings(result.peak_pixel_e, well),
                image_quality_arcsec: quality.fwhm_arcsec,
                source_fraction: spatial.source_fraction,
                peak_pixel_e: result.peak_pixel_e,
                output: CalcOutput::Imaging(result),
            })
        }

        CalcMethod::Spectroscopy => {
            let (fraction, peak_spatial, area, n_spatial) = match instrument.mask() {
                Some(FocalPlaneMask::Slit { width_arcsec }) => {
                    let spatial = slit_spatial(
                        request.profile,
                        quality,
                        request.observation.analysis,
                        width_arcsec,
                        scale,
                    )?;
                    (
                        spatial.source_fraction,
                        spatial.peak_spatial_fraction,
                        spatial.aperture_area_arcsec2,
                        spatial.n_spatial_pixels,
                    )
                }
                Some(FocalPlaneMask::Ifu) => ifu_spatial(
                    request.profile,
                    quality,
                    request.observation.analysis,
                    scale,
                ),
                // Unreachable: the instrument builder rejects maskless
                // spectroscopy.
                None => unreachable!("spectroscopy always has a mask"),
            };

            let gaps = instrument.gap_wavelength_ranges();
            let result = spec_s2n(&SpecInputs {
                source: &seds.source,
                sky: &seds.sky,
                halo: None,
                gaps: &gaps,
                source_fraction: fraction,
                peak_spatial_fraction: peak_spatial,
                aperture_area_arcsec2: area,
                n_spatial_pixels: n_spatial,
                pixel_width_nm: instrument
                    .spectral_pixel_width()
                    .expect("spectroscopy has a disperser"),
                range: instrument.observing_range(),
                dark_e_per_pixel: dark,
                read_noise_e: read_noise,
                setup,
            });

            Ok(CalcResult {
                warnings: saturation_warnings(result.peak_pixel_e, well),
                image_quality_arcsec: quality.fwhm_arcsec,
                source_fraction: fraction,
                peak_pixel_e: result.peak_pixel_e,
                output: CalcOutput::Spectroscopy {
                    curves: spectroscopy_curves(result),
                },
            })
        }
    }
}

/// Fractions, extraction area and pixel count for the IFU: either the
/// summed row of elements or the central element alone.
fn ifu_spatial(
    profile: SpatialProfile,
    quality: ImageQuality,
    analysis: AnalysisMethod,
    binned_pixel_scale_arcsec: f64,
) -> (f64, f64, f64, f64) {
    let element = Aperture::Hexagonal {
        side_arcsec: IFU_ELEMENT_SIDE_ARCSEC,
    };
    let ifu = IfuApertures::row(element, IFU_ELEMENT_COUNT, IFU_ELEMENT_PITCH_ARCSEC);
    let summed = matches!(analysis, AnalysisMethod::Ifu { summed: true });

    let (fraction, area) = if summed {
        (
            ifu.summed_fraction(profile, quality),
            element.area_arcsec2() * IFU_ELEMENT_COUNT as f64,
        )
    } else {
        (
            ifu.element_fractions(profile, quality)[0],
            element.area_arcsec2(),
        )
    };

    let n_spatial = round_half_up(area / binned_pixel_scale_arcsec.powi(2)).max(1.0);
    let peak_spatial = if fraction > 0.0 {
        (peak_pixel_fraction(profile, quality, binned_pixel_scale_arcsec) / fraction).min(1.0)
    } else {
        0.0
    };
    (fraction, peak_spatial, area, n_spatial)
}
