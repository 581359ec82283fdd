// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Per-instrument calculation recipes.
//!
//! A recipe wires the whole pipeline together for one instrument family:
//! fail-fast configuration checks, request validation, the SED factory,
//! morphology, and the imaging or spectroscopy calculator. Per-instrument
//! special cases (IFU aperture summation, AO core/halo treatment, the
//! polarimetry timing overhead) live here and nowhere deeper.

pub mod draco;
mod error;
pub mod lyra;

pub use error::ValidationError;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{EXPOSURE_COUNT_TOLERANCE, NEAR_FULL_WELL_FRACTION, VEL_LIGHT_KM_PER_S},
    error::CalcError,
    instrument::Instrument,
    math::is_near_integer,
    morphology::{
        peak_pixel_fraction, source_fraction, Aperture, ImageQuality, SpatialProfile,
    },
    s2n::{ExposureSetup, ImagingResult},
    sed::{SourceDefinition, SourceSpec},
    spectrum::SampledSpectrum,
    tables::{SpectralLibrary, TableProvider},
};

/// How the measurement aperture is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMethod {
    /// Sized automatically from the delivered image quality.
    Auto,

    /// A user aperture: circular diameter for imaging, extraction length
    /// for spectroscopy \[arcsec\].
    Aperture { size_arcsec: f64 },

    /// IFU analysis: sum all spatial elements, or report the central one.
    Ifu { summed: bool },
}

/// Exposure and analysis choices of the observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationDetails {
    pub exposure_s: f64,
    pub n_exposures: u32,

    /// Fraction of exposures spent on source.
    pub on_source_fraction: f64,

    pub analysis: AnalysisMethod,
}

impl ObservationDetails {
    pub(crate) fn setup(&self) -> ExposureSetup {
        ExposureSetup {
            exposure_s: self.exposure_s,
            n_exposures: self.n_exposures,
            on_source_fraction: self.on_source_fraction,
        }
    }
}

/// The named output curves of a spectroscopy calculation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
pub enum CurveKind {
    #[strum(serialize = "signal")]
    Signal,

    #[strum(serialize = "background")]
    Background,

    #[strum(serialize = "single_exposure_s2n")]
    SingleExposureS2n,

    #[strum(serialize = "final_s2n")]
    FinalS2n,
}

/// Non-fatal conditions attached to a completed result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Warning {
    /// The peak pixel is above [`NEAR_FULL_WELL_FRACTION`] of the well.
    NearFullWell { peak_e: f64, well_e: f64 },

    /// The peak pixel exceeds the well depth.
    Saturation { peak_e: f64, well_e: f64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Warning::NearFullWell { peak_e, well_e } => write!(
                f,
                "The peak pixel ({peak_e:.0} e-) is above {:.0}% of the detector well depth ({well_e:.0} e-)",
                NEAR_FULL_WELL_FRACTION * 100.0
            ),
            Warning::Saturation { peak_e, well_e } => write!(
                f,
                "The peak pixel ({peak_e:.0} e-) saturates the detector well depth ({well_e:.0} e-)"
            ),
        }
    }
}

/// The method-specific part of a result.
#[derive(Debug, Clone)]
pub enum CalcOutput {
    Imaging(ImagingResult),
    Spectroscopy {
        curves: IndexMap<CurveKind, SampledSpectrum>,
    },
}

/// A completed calculation: output curves or scalars, scalar summaries,
/// and any warnings.
#[derive(Debug, Clone)]
pub struct CalcResult {
    pub output: CalcOutput,

    /// Delivered image FWHM \[arcsec\].
    pub image_quality_arcsec: f64,

    /// Fraction of source flux in the measurement aperture.
    pub source_fraction: f64,

    /// The brightest pixel anywhere \[e-/exposure\].
    pub peak_pixel_e: f64,

    pub warnings: Vec<Warning>,
}

/// A calculation request for any supported instrument. Recipes are peers;
/// this enum is only the dispatch point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalcRequest {
    Lyra(lyra::LyraRequest),
    Draco(draco::DracoRequest),
}

impl CalcRequest {
    /// Run the request start to finish.
    pub fn run(
        &self,
        tables: &dyn TableProvider,
        library: &dyn SpectralLibrary,
    ) -> Result<CalcResult, CalcError> {
        match self {
            CalcRequest::Lyra(request) => lyra::run(request, tables, library),
            CalcRequest::Draco(request) => draco::run(request, tables, library),
        }
    }
}

/// Exposure-setup validation, before any noise integration.
pub(crate) fn validate_setup(setup: &ExposureSetup) -> Result<(), ValidationError> {
    if setup.exposure_s <= 0.0 {
        return Err(ValidationError::NonPositiveExposureTime(setup.exposure_s));
    }
    if setup.n_exposures == 0 {
        return Err(ValidationError::NoExposures);
    }
    if setup.on_source_fraction <= 0.0 || setup.on_source_fraction > 1.0 {
        return Err(ValidationError::BadOnSourceFraction(
            setup.on_source_fraction,
        ));
    }
    let product = setup.on_source_exposures();
    if !is_near_integer(product, EXPOSURE_COUNT_TOLERANCE) {
        return Err(ValidationError::FractionalOnSourceExposures {
            n_exposures: setup.n_exposures,
            fraction: setup.on_source_fraction,
            product,
        });
    }
    Ok(())
}

/// An emission line narrower than the disperser resolves is meaningless;
/// reject it with the minimum acceptable width.
pub(crate) fn validate_emission_line(
    source: &SourceDefinition,
    instrument: &Instrument,
) -> Result<(), ValidationError> {
    let (width_kms, grating) = match (&source.spec, instrument.grating()) {
        (SourceSpec::EmissionLine { width_kms, .. }, Some(g)) => (*width_kms, g),
        _ => return Ok(()),
    };
    let min_kms = VEL_LIGHT_KM_PER_S / grating.resolving_power();
    if width_kms < min_kms {
        return Err(ValidationError::UndersampledEmissionLine { width_kms, min_kms });
    }
    Ok(())
}

/// Saturation is a warning, never an error: the result completes and the
/// caller is told.
pub(crate) fn saturation_warnings(peak_e: f64, well_e: f64) -> Vec<Warning> {
    if peak_e > well_e {
        vec![Warning::Saturation { peak_e, well_e }]
    } else if peak_e > NEAR_FULL_WELL_FRACTION * well_e {
        vec![Warning::NearFullWell { peak_e, well_e }]
    } else {
        vec![]
    }
}

/// The spatial numbers the calculators need for one imaging aperture.
pub(crate) struct ImagingSpatial {
    pub aperture: Aperture,
    pub source_fraction: f64,
    pub peak_pixel_fraction: f64,
    pub n_pixels: f64,
}

/// Aperture, fractions and pixel count for imaging.
pub(crate) fn imaging_spatial(
    profile: SpatialProfile,
    quality: ImageQuality,
    analysis: AnalysisMethod,
    binned_pixel_scale_arcsec: f64,
) -> Result<ImagingSpatial, ValidationError> {
    let aperture = match analysis {
        AnalysisMethod::Auto => Aperture::auto_imaging(quality),
        AnalysisMethod::Aperture { size_arcsec } => Aperture::Circular {
            diameter_arcsec: size_arcsec,
        },
        AnalysisMethod::Ifu { .. } => return Err(ValidationError::IfuAnalysisWithoutIfu),
    };
    let n_pixels = (aperture.area_arcsec2() / binned_pixel_scale_arcsec.powi(2)).ceil().max(1.0);
    Ok(ImagingSpatial {
        aperture,
        source_fraction: source_fraction(profile, quality, aperture),
        peak_pixel_fraction: peak_pixel_fraction(profile, quality, binned_pixel_scale_arcsec),
        n_pixels,
    })
}

/// The spatial numbers the calculators need for one slit extraction.
pub(crate) struct SlitSpatial {
    pub aperture: Aperture,
    pub source_fraction: f64,

    /// Of the extracted signal, the share in the central spatial row.
    pub peak_spatial_fraction: f64,
    pub aperture_area_arcsec2: f64,
    pub n_spatial_pixels: f64,
}

/// Aperture, fractions and pixel counts for a slit spectrum.
pub(crate) fn slit_spatial(
    profile: SpatialProfile,
    quality: ImageQuality,
    analysis: AnalysisMethod,
    slit_width_arcsec: f64,
    binned_pixel_scale_arcsec: f64,
) -> Result<SlitSpatial, ValidationError> {
    let aperture = match analysis {
        AnalysisMethod::Auto => {
            Aperture::auto_spectroscopy(quality, slit_width_arcsec, binned_pixel_scale_arcsec)
        }
        AnalysisMethod::Aperture { size_arcsec } => {
            let pixels = crate::math::round_half_up(size_arcsec / binned_pixel_scale_arcsec).max(1.0);
            Aperture::Rectangular {
                width_arcsec: slit_width_arcsec,
                length_arcsec: pixels * binned_pixel_scale_arcsec,
            }
        }
        AnalysisMethod::Ifu { .. } => return Err(ValidationError::IfuAnalysisWithoutIfu),
    };
    let fraction = source_fraction(profile, quality, aperture);

    // The central row's share: the same aperture one pixel long.
    let central_row = Aperture::Rectangular {
        width_arcsec: slit_width_arcsec,
        length_arcsec: binned_pixel_scale_arcsec,
    };
    let central_fraction = source_fraction(profile, quality, central_row);
    let peak_spatial_fraction = if fraction > 0.0 {
        (central_fraction / fraction).min(1.0)
    } else {
        0.0
    };

    Ok(SlitSpatial {
        aperture,
        source_fraction: fraction,
        peak_spatial_fraction,
        aperture_area_arcsec2: aperture.area_arcsec2(),
        n_spatial_pixels: aperture.spatial_pixels(binned_pixel_scale_arcsec),
    })
}

/// Assemble the spectroscopy curve map in its canonical order.
pub(crate) fn spectroscopy_curves(
    result: crate::s2n::SpecResult,
) -> IndexMap<CurveKind, SampledSpectrum> {
    let mut curves = IndexMap::with_capacity(4);
    curves.insert(CurveKind::Signal, result.signal);
    curves.insert(CurveKind::Background, result.background);
    curves.insert(CurveKind::SingleExposureS2n, result.single_s2n);
    curves.insert(CurveKind::FinalS2n, result.final_s2n);
    curves
}
