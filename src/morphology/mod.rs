// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Image quality, apertures and enclosed-flux fractions.
//!
//! Point and Gaussian profiles are treated as Gaussians of the delivered
//! image FWHM; uniform profiles are per-arcsec² surface brightnesses whose
//! enclosed flux depends only on the aperture area.


use serde::{Deserialize, Serialize};
use vec1::Vec1;

use crate::{
    constants::{
        AUTO_APERTURE_FWHM_RATIO, SEEING_REF_WAVELENGTH_NM, UNIFORM_PROFILE_IQ_ARCSEC,
    },
    math::{erf, round_half_up},
};

/// ln 2, as it appears in Gaussian FWHM algebra.
const LN2: f64 = std::f64::consts::LN_2;

/// The spatial profile of a source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialProfile {
    /// Unresolved; the delivered image FWHM applies directly.
    Point,

    /// Resolved Gaussian of the given intrinsic FWHM \[arcsec\], convolved
    /// with the delivered image quality.
    Gaussian { fwhm_arcsec: f64 },

    /// Uniform surface brightness, normalised per arcsec².
    Uniform,
}

/// Delivered image quality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageQuality {
    /// FWHM \[arcsec\].
    pub fwhm_arcsec: f64,
}

impl ImageQuality {
    /// Seeing-limited image quality: seeing degraded by airmass and
    /// improving slowly towards the red.
    pub fn seeing_limited(seeing_at_500nm_arcsec: f64, airmass: f64, lambda_nm: f64) -> ImageQuality {
        let fwhm = seeing_at_500nm_arcsec
            * airmass.powf(0.6)
            * (lambda_nm / SEEING_REF_WAVELENGTH_NM).powf(-0.2);
        ImageQuality { fwhm_arcsec: fwhm }
    }

    /// The fixed image quality used for uniform profiles.
    pub fn uniform_profile() -> ImageQuality {
        ImageQuality {
            fwhm_arcsec: UNIFORM_PROFILE_IQ_ARCSEC,
        }
    }

    /// Convolve with an intrinsic Gaussian source size (in quadrature).
    pub fn convolved_with(self, fwhm_arcsec: f64) -> ImageQuality {
        ImageQuality {
            fwhm_arcsec: (self.fwhm_arcsec.powi(2) + fwhm_arcsec.powi(2)).sqrt(),
        }
    }
}

/// An adaptive-optics system model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AoSystem {
    /// Fraction of light in the corrected core.
    pub strehl: f64,

    /// Telescope diameter, for the diffraction limit \[m\].
    pub telescope_diameter_m: f64,

    /// Residual wavefront error floor on the corrected core \[arcsec\].
    pub residual_fwhm_arcsec: f64,
}

impl AoSystem {
    /// The FWHM of the corrected core: the diffraction limit with the
    /// residual floor in quadrature.
    pub fn corrected_fwhm(&self, lambda_nm: f64) -> ImageQuality {
        // 1.22 λ/D in arcsec.
        let diffraction =
            1.22 * lambda_nm * 1e-9 / self.telescope_diameter_m * (180.0 / std::f64::consts::PI) * 3600.0;
        ImageQuality {
            fwhm_arcsec: (diffraction.powi(2) + self.residual_fwhm_arcsec.powi(2)).sqrt(),
        }
    }
}

/// A measurement aperture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aperture {
    /// Circular, of the given diameter \[arcsec\].
    Circular { diameter_arcsec: f64 },

    /// Slit width × extraction length \[arcsec\].
    Rectangular {
        width_arcsec: f64,
        length_arcsec: f64,
    },

    /// A hexagonal IFU element of the given side length \[arcsec\].
    Hexagonal { side_arcsec: f64 },
}

impl Aperture {
    /// Geometric area \[arcsec²\].
    pub fn area_arcsec2(&self) -> f64 {
        match self {
            Aperture::Circular { diameter_arcsec } => {
                std::f64::consts::FRAC_PI_4 * diameter_arcsec.powi(2)
            }
            Aperture::Rectangular {
                width_arcsec,
                length_arcsec,
            } => width_arcsec * length_arcsec,
            Aperture::Hexagonal { side_arcsec } => 1.5 * 3f64.sqrt() * side_arcsec.powi(2),
        }
    }

    /// The automatic imaging aperture: a circle of 1.18 × FWHM.
    pub fn auto_imaging(quality: ImageQuality) -> Aperture {
        Aperture::Circular {
            diameter_arcsec: AUTO_APERTURE_FWHM_RATIO * quality.fwhm_arcsec,
        }
    }

    /// The automatic spectroscopy aperture: the slit width times an
    /// extraction length of 1.4 × FWHM rounded to a whole number of
    /// (binned) spatial pixels, never fewer than one.
    pub fn auto_spectroscopy(
        quality: ImageQuality,
        slit_width_arcsec: f64,
        binned_pixel_scale_arcsec: f64,
    ) -> Aperture {
        let pixels = round_half_up(1.4 * quality.fwhm_arcsec / binned_pixel_scale_arcsec).max(1.0);
        Aperture::Rectangular {
            width_arcsec: slit_width_arcsec,
            length_arcsec: pixels * binned_pixel_scale_arcsec,
        }
    }

    /// The number of (binned) spatial pixels the aperture spans.
    pub fn spatial_pixels(&self, binned_pixel_scale_arcsec: f64) -> f64 {
        match self {
            Aperture::Circular { diameter_arcsec } => {
                round_half_up(diameter_arcsec / binned_pixel_scale_arcsec).max(1.0)
            }
            Aperture::Rectangular { length_arcsec, .. } => {
                round_half_up(length_arcsec / binned_pixel_scale_arcsec).max(1.0)
            }
            Aperture::Hexagonal { .. } => {
                // Effective extent: equal-area circle diameter.
                let diameter = 2.0 * (self.area_arcsec2() / std::f64::consts::PI).sqrt();
                round_half_up(diameter / binned_pixel_scale_arcsec).max(1.0)
            }
        }
    }
}

/// Fraction of a source's total flux landing inside `aperture`.
///
/// For uniform profiles the result is the aperture area in arcsec² (the
/// flux is normalised per arcsec²), independent of image quality.
pub fn source_fraction(profile: SpatialProfile, quality: ImageQuality, aperture: Aperture) -> f64 {
    let quality = match profile {
        SpatialProfile::Point => quality,
        SpatialProfile::Gaussian { fwhm_arcsec } => quality.convolved_with(fwhm_arcsec),
        SpatialProfile::Uniform => return aperture.area_arcsec2(),
    };
    let fwhm = quality.fwhm_arcsec;
    match aperture {
        // Enclosed flux of a Gaussian in a centred circle of radius r:
        // 1 − exp(−4 ln2 r²/FWHM²).
        Aperture::Circular { diameter_arcsec } => {
            1.0 - (-4.0 * LN2 * (0.5 * diameter_arcsec / fwhm).powi(2)).exp()
        }
        // Product of the 1-D enclosed fractions:
        // erf(√ln2 · w/FWHM) · erf(√ln2 · l/FWHM).
        Aperture::Rectangular {
            width_arcsec,
            length_arcsec,
        } => {
            erf(LN2.sqrt() * width_arcsec / fwhm) * erf(LN2.sqrt() * length_arcsec / fwhm)
        }
        // A centred hexagon is treated as its equal-area circle.
        Aperture::Hexagonal { .. } => {
            let r_eq = (aperture.area_arcsec2() / std::f64::consts::PI).sqrt();
            1.0 - (-4.0 * LN2 * (r_eq / fwhm).powi(2)).exp()
        }
    }
}

/// Fraction of a source's total flux landing in the single brightest
/// (binned) pixel. For uniform profiles this is just the pixel's area.
pub fn peak_pixel_fraction(
    profile: SpatialProfile,
    quality: ImageQuality,
    binned_pixel_scale_arcsec: f64,
) -> f64 {
    let quality = match profile {
        SpatialProfile::Point => quality,
        SpatialProfile::Gaussian { fwhm_arcsec } => quality.convolved_with(fwhm_arcsec),
        SpatialProfile::Uniform => return binned_pixel_scale_arcsec.powi(2),
    };
    // A centred square pixel of side p: erf(√ln2 · p/FWHM)².
    erf(LN2.sqrt() * binned_pixel_scale_arcsec / quality.fwhm_arcsec).powi(2)
}

/// Fraction of a Gaussian source's flux landing in an aperture centred
/// `offset_arcsec` away. Off-centre elements are approximated by the
/// Gaussian density at the element centre times the element area, which is
/// accurate for elements small against the FWHM.
pub fn offset_source_fraction(
    profile: SpatialProfile,
    quality: ImageQuality,
    aperture: Aperture,
    offset_arcsec: f64,
) -> f64 {
    if offset_arcsec == 0.0 {
        return source_fraction(profile, quality, aperture);
    }
    let quality = match profile {
        SpatialProfile::Point => quality,
        SpatialProfile::Gaussian { fwhm_arcsec } => quality.convolved_with(fwhm_arcsec),
        SpatialProfile::Uniform => return aperture.area_arcsec2(),
    };
    let fwhm = quality.fwhm_arcsec;
    let density =
        4.0 * LN2 / (std::f64::consts::PI * fwhm.powi(2)) * (-4.0 * LN2 * (offset_arcsec / fwhm).powi(2)).exp();
    density * aperture.area_arcsec2()
}

/// The spatial elements of an IFU observation: one aperture shape at an
/// ordered list of sky offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct IfuApertures {
    pub element: Aperture,

    /// Offsets of each element's centre from the source \[arcsec\].
    pub offsets: Vec1<f64>,
}

impl IfuApertures {
    /// A linear row of `n` elements stepping outward from the source.
    pub fn row(element: Aperture, n: usize, pitch_arcsec: f64) -> IfuApertures {
        let mut offsets = Vec1::new(0.0);
        for i in 1..n {
            offsets.push(i as f64 * pitch_arcsec);
        }
        IfuApertures { element, offsets }
    }

    /// Per-element source fractions, in offset order.
    pub fn element_fractions(
        &self,
        profile: SpatialProfile,
        quality: ImageQuality,
    ) -> Vec<f64> {
        self.offsets
            .iter()
            .map(|&offset| offset_source_fraction(profile, quality, self.element, offset))
            .collect()
    }

    /// The summed-aperture source fraction.
    pub fn summed_fraction(&self, profile: SpatialProfile, quality: ImageQuality) -> f64 {
        self.element_fractions(profile, quality).iter().sum()
    }
}
