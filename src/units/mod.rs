// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Magnitude bands and brightness units.
//!
//! Everything internal to the engine is photons s⁻¹ nm⁻¹ m⁻²; this module
//! converts the brightness units users actually quote into that convention.


use serde::{Deserialize, Serialize};

use crate::constants::{PLANCK_J_S, VEL_LIGHT_M_PER_S};

/// Broadband photometric bands, Johnson/Mauna Kea system.
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
pub enum MagnitudeBand {
    U,
    B,
    V,
    R,
    I,
    Y,
    J,
    H,
    K,
    L,
    M,
    N,
    Q,
}

impl MagnitudeBand {
    /// Band centre \[nm\].
    pub fn centre_nm(self) -> f64 {
        match self {
            MagnitudeBand::U => 365.0,
            MagnitudeBand::B => 440.0,
            MagnitudeBand::V => 550.0,
            MagnitudeBand::R => 700.0,
            MagnitudeBand::I => 900.0,
            MagnitudeBand::Y => 1020.0,
            MagnitudeBand::J => 1250.0,
            MagnitudeBand::H => 1650.0,
            MagnitudeBand::K => 2200.0,
            MagnitudeBand::L => 3760.0,
            MagnitudeBand::M => 4770.0,
            MagnitudeBand::N => 10470.0,
            MagnitudeBand::Q => 20130.0,
        }
    }

    /// Band width \[nm\].
    pub fn width_nm(self) -> f64 {
        match self {
            MagnitudeBand::U => 66.0,
            MagnitudeBand::B => 94.0,
            MagnitudeBand::V => 88.0,
            MagnitudeBand::R => 138.0,
            MagnitudeBand::I => 149.0,
            MagnitudeBand::Y => 120.0,
            MagnitudeBand::J => 260.0,
            MagnitudeBand::H => 290.0,
            MagnitudeBand::K => 410.0,
            MagnitudeBand::L => 700.0,
            MagnitudeBand::M => 240.0,
            MagnitudeBand::N => 5230.0,
            MagnitudeBand::Q => 1800.0,
        }
    }

    /// Band start \[nm\].
    pub fn start_nm(self) -> f64 {
        self.centre_nm() - 0.5 * self.width_nm()
    }

    /// Band end \[nm\].
    pub fn end_nm(self) -> f64 {
        self.centre_nm() + 0.5 * self.width_nm()
    }

    /// Vega-system zero point: the photon flux of a mag-0 source at the
    /// band centre \[photons s⁻¹ nm⁻¹ m⁻²\].
    pub fn zero_point(self) -> f64 {
        match self {
            MagnitudeBand::U => 7.70e7,
            MagnitudeBand::B => 1.40e8,
            MagnitudeBand::V => 1.00e8,
            MagnitudeBand::R => 7.66e7,
            MagnitudeBand::I => 5.10e7,
            MagnitudeBand::Y => 3.00e7,
            MagnitudeBand::J => 1.97e7,
            MagnitudeBand::H => 9.46e6,
            MagnitudeBand::K => 4.78e6,
            MagnitudeBand::L => 1.31e6,
            MagnitudeBand::M => 5.30e5,
            MagnitudeBand::N => 6.50e4,
            MagnitudeBand::Q => 6.80e3,
        }
    }
}

/// The units a source brightness can be quoted in. The `PerArcsec2`
/// variants are surface brightnesses and mark the source as normalised per
/// square arcsecond, which the uniform-profile morphology branch consumes.
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
pub enum BrightnessUnit {
    VegaMag,
    AbMag,
    Jansky,
    WattsPerSqmPerUm,
    ErgsPerSqcmPerSPerA,
    VegaMagPerArcsec2,
    AbMagPerArcsec2,
    JanskyPerArcsec2,
}

impl BrightnessUnit {
    /// Is this a per-arcsec² surface-brightness unit?
    pub fn is_surface_brightness(self) -> bool {
        matches!(
            self,
            BrightnessUnit::VegaMagPerArcsec2
                | BrightnessUnit::AbMagPerArcsec2
                | BrightnessUnit::JanskyPerArcsec2
        )
    }

    /// Convert a brightness in this unit to a photon flux at the centre of
    /// `band` \[photons s⁻¹ nm⁻¹ m⁻²\] (per arcsec² for surface-brightness
    /// units).
    pub fn to_photon_flux(self, value: f64, band: MagnitudeBand) -> f64 {
        let lambda_m = band.centre_nm() * 1e-9;
        match self {
            BrightnessUnit::VegaMag | BrightnessUnit::VegaMagPerArcsec2 => {
                band.zero_point() * 10f64.powf(-0.4 * value)
            }
            BrightnessUnit::AbMag | BrightnessUnit::AbMagPerArcsec2 => {
                let jansky = 3631.0 * 10f64.powf(-0.4 * value);
                jansky_to_photon_flux(jansky, lambda_m)
            }
            BrightnessUnit::Jansky | BrightnessUnit::JanskyPerArcsec2 => {
                jansky_to_photon_flux(value, lambda_m)
            }
            // f_λ units: photons = f_λ / (h c / λ).
            BrightnessUnit::WattsPerSqmPerUm => {
                value * 1e-3 * lambda_m / (PLANCK_J_S * VEL_LIGHT_M_PER_S)
            }
            BrightnessUnit::ErgsPerSqcmPerSPerA => {
                value * 1e-2 * lambda_m / (PLANCK_J_S * VEL_LIGHT_M_PER_S)
            }
        }
    }
}

/// f_ν in Jansky to photons s⁻¹ nm⁻¹ m⁻² at wavelength `lambda_m`.
fn jansky_to_photon_flux(jansky: f64, lambda_m: f64) -> f64 {
    // n_λ = f_ν / (h λ), with the 1e-26 (Jy) and 1e-9 (per-nm) factors.
    jansky * 1e-26 * 1e-9 / (PLANCK_J_S * lambda_m)
}
