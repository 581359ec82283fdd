// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision; the engine does every calculation
in double precision so that results can be compared bit-for-bit against
reference baselines.
 */

/// Speed of light \[m/s\]
pub const VEL_LIGHT_M_PER_S: f64 = 2.99792458e8;

/// Speed of light \[km/s\]
pub const VEL_LIGHT_KM_PER_S: f64 = 2.99792458e5;

/// Planck's constant \[J s\]
pub const PLANCK_J_S: f64 = 6.62607015e-34;

/// Boltzmann's constant \[J/K\]
pub const BOLTZMANN_J_PER_K: f64 = 1.380649e-23;

/// The wavelength that atmospheric seeing values are quoted at \[nm\]
pub const SEEING_REF_WAVELENGTH_NM: f64 = 500.0;

/// The image quality assumed for uniform (extended) source profiles
/// \[arcsec FWHM\]. Forced large so that the aperture geometry, not the
/// seeing, determines the enclosed flux.
pub const UNIFORM_PROFILE_IQ_ARCSEC: f64 = 10.0;

/// Auto-aperture diameter for point sources, as a multiple of the image
/// FWHM.
pub const AUTO_APERTURE_FWHM_RATIO: f64 = 1.18;

/// Peak-pixel counts above this fraction of the detector well depth raise a
/// near-full-well warning.
pub const NEAR_FULL_WELL_FRACTION: f64 = 0.8;

/// Tolerance used when checking that the on-source exposure count is an
/// integer.
pub const EXPOSURE_COUNT_TOLERANCE: f64 = 1e-6;

/// Relative tolerance on the total integral when resampling a smooth
/// spectrum onto a different grid.
pub const RESAMPLE_INTEGRAL_TOLERANCE: f64 = 1e-3;
