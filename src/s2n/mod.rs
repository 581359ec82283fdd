// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Signal and noise calculators.
//!
//! Pure functions of their inputs. Imaging collapses the transformed
//! spectra to scalar totals; spectroscopy evaluates the same noise algebra
//! independently per spectral pixel to produce curves. Both accumulate
//! over exposures as √(n × on-source fraction) on the single-exposure
//! ratio.

#[cfg(test)]
mod tests;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::{math::round_half_up, spectrum::SampledSpectrum};

/// Exposure parameters shared by both calculators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposureSetup {
    /// Single-exposure time \[s\].
    pub exposure_s: f64,

    pub n_exposures: u32,

    /// Fraction of exposures spent on source (chopping/nodding duty
    /// cycle).
    pub on_source_fraction: f64,
}

impl ExposureSetup {
    /// The (possibly fractional) number of on-source exposures.
    pub fn on_source_exposures(&self) -> f64 {
        self.n_exposures as f64 * self.on_source_fraction
    }
}

/// An AO halo contribution: its transformed spectrum and its own aperture
/// fraction.
#[derive(Debug, Clone, Copy)]
pub struct HaloContribution<'a> {
    pub spectrum: &'a SampledSpectrum,
    pub source_fraction: f64,
    pub peak_pixel_fraction: f64,
}

/// Inputs to the imaging calculator.
#[derive(Debug, Clone, Copy)]
pub struct ImagingInputs<'a> {
    /// Transformed source SED \[photons s⁻¹ nm⁻¹\].
    pub source: &'a SampledSpectrum,

    /// Transformed sky SED \[photons s⁻¹ nm⁻¹ arcsec⁻²\].
    pub sky: &'a SampledSpectrum,

    pub halo: Option<HaloContribution<'a>>,

    /// Fraction of source flux inside the measurement aperture.
    pub source_fraction: f64,

    /// Fraction of source flux in the brightest pixel.
    pub peak_pixel_fraction: f64,

    /// Pixels inside the measurement aperture (binned).
    pub n_pixels: f64,

    /// Area of one binned pixel \[arcsec²\].
    pub pixel_area_arcsec2: f64,

    /// Dark charge per pixel per exposure \[e-\].
    pub dark_e_per_pixel: f64,

    /// Read noise \[e- rms/pixel\].
    pub read_noise_e: f64,

    pub setup: ExposureSetup,
}

/// Scalar imaging results, per exposure except the accumulated ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagingResult {
    /// Source electrons in the aperture per exposure.
    pub signal_e: f64,

    /// Sky electrons in the aperture per exposure.
    pub background_e: f64,

    /// Electrons in the brightest pixel per exposure, all contributors.
    pub peak_pixel_e: f64,

    pub single_s2n: f64,
    pub final_s2n: f64,
}

/// The imaging signal-to-noise calculation.
pub fn imaging_s2n(inputs: &ImagingInputs) -> ImagingResult {
    let t = inputs.setup.exposure_s;

    let mut signal = inputs.source.integral() * inputs.source_fraction * t;
    let mut peak_source = inputs.source.integral() * inputs.peak_pixel_fraction * t;
    if let Some(halo) = &inputs.halo {
        // The halo shares the aperture but carries its own fractions.
        signal += halo.spectrum.integral() * halo.source_fraction * t;
        peak_source += halo.spectrum.integral() * halo.peak_pixel_fraction * t;
    }

    let background_per_pixel = inputs.sky.integral() * inputs.pixel_area_arcsec2 * t;
    let background = background_per_pixel * inputs.n_pixels;
    let dark = inputs.dark_e_per_pixel * inputs.n_pixels;
    let read = inputs.read_noise_e.powi(2) * inputs.n_pixels;

    let variance = signal + background + dark + read;
    let single_s2n = if variance > 0.0 {
        signal / variance.sqrt()
    } else {
        0.0
    };
    let final_s2n = inputs.setup.on_source_exposures().sqrt() * single_s2n;

    trace!(
        "imaging: signal {signal:.1} e-, background {background:.1} e-, single S/N {single_s2n:.2}"
    );

    ImagingResult {
        signal_e: signal,
        background_e: background,
        peak_pixel_e: peak_source + background_per_pixel + inputs.dark_e_per_pixel,
        single_s2n,
        final_s2n,
    }
}

/// Inputs to the spectroscopy calculator.
#[derive(Debug, Clone, Copy)]
pub struct SpecInputs<'a> {
    /// Transformed source SED \[photons s⁻¹ nm⁻¹\].
    pub source: &'a SampledSpectrum,

    /// Transformed sky SED \[photons s⁻¹ nm⁻¹ arcsec⁻²\].
    pub sky: &'a SampledSpectrum,

    pub halo: Option<HaloContribution<'a>>,

    /// Chip-gap wavelength ranges; source flux inside them is lost.
    pub gaps: &'a [(f64, f64)],

    /// Fraction of source flux entering the slit and extraction aperture.
    pub source_fraction: f64,

    /// Of the extracted signal, the fraction landing in the central
    /// spatial pixel row (for saturation).
    pub peak_spatial_fraction: f64,

    /// Extraction aperture area \[arcsec²\].
    pub aperture_area_arcsec2: f64,

    /// Binned spatial pixels in the extraction aperture.
    pub n_spatial_pixels: f64,

    /// Width of one binned spectral pixel \[nm\].
    pub pixel_width_nm: f64,

    /// The wavelength range to extract \[nm\].
    pub range: (f64, f64),

    /// Dark charge per pixel per exposure \[e-\].
    pub dark_e_per_pixel: f64,

    /// Read noise \[e- rms/pixel\].
    pub read_noise_e: f64,

    pub setup: ExposureSetup,
}

/// Per-wavelength spectroscopy results. All curves are sampled at spectral
/// pixel centres; signal and background are per exposure.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecResult {
    pub signal: SampledSpectrum,
    pub background: SampledSpectrum,
    pub single_s2n: SampledSpectrum,
    pub final_s2n: SampledSpectrum,

    /// The largest per-pixel charge anywhere on the detector \[e-\], for
    /// the saturation check.
    pub peak_pixel_e: f64,
}

/// The spectroscopy signal-to-noise calculation, evaluated independently
/// at every spectral pixel.
pub fn spec_s2n(inputs: &SpecInputs) -> SpecResult {
    let t = inputs.setup.exposure_s;
    let (start, end) = inputs.range;
    let n_pixels = ((end - start) / inputs.pixel_width_nm).floor() as usize;
    // At least one pixel; the instrument range is never this narrow in
    // practice but the algebra should not divide by zero.
    let n_pixels = n_pixels.max(1);

    let accumulation = inputs.setup.on_source_exposures().sqrt();

    let mut wavelengths = Vec::with_capacity(n_pixels);
    let mut signal = Vec::with_capacity(n_pixels);
    let mut background = Vec::with_capacity(n_pixels);
    let mut single = Vec::with_capacity(n_pixels);
    let mut fin = Vec::with_capacity(n_pixels);
    let mut peak_pixel_e: f64 = 0.0;

    let dark = inputs.dark_e_per_pixel * inputs.n_spatial_pixels;
    let read = inputs.read_noise_e.powi(2) * inputs.n_spatial_pixels;

    for i in 0..n_pixels {
        let lambda = start + (i as f64 + 0.5) * inputs.pixel_width_nm;
        let in_gap = inputs.gaps.iter().any(|&(lo, hi)| lambda >= lo && lambda <= hi);

        // The chip-gap mask applies to the source before extraction.
        let mut source_rate = if in_gap {
            0.0
        } else {
            inputs.source.value_at(lambda) * inputs.source_fraction
        };
        if let Some(halo) = &inputs.halo {
            if !in_gap {
                source_rate += halo.spectrum.value_at(lambda) * halo.source_fraction;
            }
        }
        let s = source_rate * t * inputs.pixel_width_nm;

        let b = inputs.sky.value_at(lambda) * inputs.aperture_area_arcsec2 * t
            * inputs.pixel_width_nm;

        let variance = s + b + dark + read;
        let s2n = if variance > 0.0 { s / variance.sqrt() } else { 0.0 };

        // The brightest detector pixel in this column.
        let column_peak =
            s * inputs.peak_spatial_fraction + b / inputs.n_spatial_pixels + inputs.dark_e_per_pixel;
        peak_pixel_e = peak_pixel_e.max(column_peak);

        wavelengths.push(lambda);
        signal.push(s);
        background.push(b);
        single.push(s2n);
        fin.push(accumulation * s2n);
    }

    // The grids are identical by construction, so these cannot fail.
    let make = |values: Vec<f64>| {
        SampledSpectrum::new(wavelengths.clone(), values).expect("curve grid is valid")
    };
    SpecResult {
        signal: make(signal),
        background: make(background),
        single_s2n: make(single),
        final_s2n: make(fin),
        peak_pixel_e,
    }
}

/// The inverse calculation: how many exposures reach `target_s2n`, given
/// the single-exposure ratio? Rounded half-up to a whole exposure count.
pub fn exposures_for_target_snr(
    target_s2n: f64,
    single_s2n: f64,
    on_source_fraction: f64,
) -> Option<u32> {
    if single_s2n <= 0.0 || on_source_fraction <= 0.0 {
        return None;
    }
    let on_source = (target_s2n / single_s2n).powi(2);
    Some(round_half_up(on_source / on_source_fraction).max(1.0) as u32)
}
