// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::{assert_abs_diff_eq, assert_relative_eq};

use super::presets::*;
use super::*;
use crate::tables::builtin::demo_tables;

fn lyra_spec_params() -> LyraParams {
    LyraParams {
        method: CalcMethod::Spectroscopy,
        filter: LyraFilter::R,
        grating: Some(LyraGrating::B600),
        central_wavelength_nm: Some(620.0),
        focal_plane_mask: Some(FocalPlaneMask::Slit { width_arcsec: 0.5 }),
        read_mode: ReadMode::Faint,
        spectral_binning: 1,
        spatial_binning: 1,
    }
}

#[test]
fn spectroscopy_without_disperser_is_rejected() {
    let tables = demo_tables();
    let mut params = lyra_spec_params();
    params.grating = None;
    let err = lyra(&params, &tables).unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::SpectroscopyNeedsDisperser { .. }
    ));
}

#[test]
fn imaging_with_disperser_is_rejected() {
    let tables = demo_tables();
    let mut params = lyra_spec_params();
    params.method = CalcMethod::Imaging;
    let err = lyra(&params, &tables).unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::ImagingWithDisperser { .. }
    ));
}

#[test]
fn spectroscopy_without_mask_is_rejected() {
    let tables = demo_tables();
    let mut params = lyra_spec_params();
    params.focal_plane_mask = None;
    let err = lyra(&params, &tables).unwrap_err();
    assert!(matches!(err, ConfigurationError::SpectroscopyNeedsMask { .. }));
}

#[test]
fn missing_central_wavelength_is_rejected() {
    let tables = demo_tables();
    let mut params = lyra_spec_params();
    params.central_wavelength_nm = None;
    let err = lyra(&params, &tables).unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::MissingCentralWavelength { .. }
    ));
}

#[test]
fn bright_read_mode_is_imaging_only() {
    let tables = demo_tables();
    let mut params = lyra_spec_params();
    params.read_mode = ReadMode::Bright;
    let err = lyra(&params, &tables).unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::UnsupportedReadMode { .. }
    ));
    assert!(err.to_string().contains("Bright"));
}

#[test]
fn draco_has_no_ifu() {
    let tables = demo_tables();
    let params = DracoParams {
        method: CalcMethod::Spectroscopy,
        filter: DracoFilter::K,
        grism: Some(DracoGrism::Hk),
        central_wavelength_nm: Some(2200.0),
        focal_plane_mask: Some(FocalPlaneMask::Ifu),
    };
    assert!(matches!(
        draco(&params, &tables),
        Err(ConfigurationError::NoIfu { .. })
    ));
}

#[test]
fn observing_range_is_filter_grating_intersection() {
    let tables = demo_tables();
    let instrument = lyra(&lyra_spec_params(), &tables).unwrap();
    let (start, end) = instrument.observing_range();
    // The B600 grating at 620 nm covers 466.4..773.6 nm; the r filter
    // spans 562..698 nm. The filter bounds the intersection on both sides.
    assert_abs_diff_eq!(start, 562.0, epsilon = 1e-9);
    assert_abs_diff_eq!(end, 698.0, epsilon = 1e-9);
    assert!(start < end);
}

#[test]
fn imaging_observing_range_is_the_filter() {
    let tables = demo_tables();
    let params = LyraParams {
        method: CalcMethod::Imaging,
        filter: LyraFilter::G,
        grating: None,
        central_wavelength_nm: None,
        focal_plane_mask: None,
        read_mode: ReadMode::Bright,
        spectral_binning: 1,
        spatial_binning: 1,
    };
    let instrument = lyra(&params, &tables).unwrap();
    let (start, end) = instrument.observing_range();
    assert_abs_diff_eq!(start, 398.0);
    assert_abs_diff_eq!(end, 552.0);
}

#[test]
fn disjoint_filter_and_grating_are_rejected() {
    let tables = demo_tables();
    let mut params = lyra_spec_params();
    // B600 centred at 400 nm covers at most ~554 nm, the r filter starts
    // at 562 nm.
    params.central_wavelength_nm = Some(400.0);
    params.filter = LyraFilter::R;
    let err = lyra(&params, &tables).unwrap_err();
    assert!(matches!(err, ConfigurationError::DisjointRange { .. }));
}

#[test]
fn effective_wavelength_follows_the_method() {
    let tables = demo_tables();
    let spec = lyra(&lyra_spec_params(), &tables).unwrap();
    assert_abs_diff_eq!(spec.effective_wavelength(), 620.0);

    let imaging = lyra(
        &LyraParams {
            method: CalcMethod::Imaging,
            filter: LyraFilter::R,
            grating: None,
            central_wavelength_nm: None,
            focal_plane_mask: None,
            read_mode: ReadMode::Bright,
            spectral_binning: 1,
            spatial_binning: 1,
        },
        &tables,
    )
    .unwrap();
    // The r filter is symmetric about 630 nm.
    assert_relative_eq!(imaging.effective_wavelength(), 630.0, max_relative = 1e-3);
}

#[test]
fn spectral_pixel_width_scales_with_binning() {
    let tables = demo_tables();
    let mut params = lyra_spec_params();
    params.spectral_binning = 2;
    let instrument = lyra(&params, &tables).unwrap();
    assert_abs_diff_eq!(instrument.spectral_pixel_width().unwrap(), 0.1);
}

#[test]
fn per_mode_read_noise() {
    let tables = demo_tables();
    let faint = lyra(&lyra_spec_params(), &tables).unwrap();
    assert_abs_diff_eq!(faint.read_noise(120.0), 3.4);

    let bright = lyra(
        &LyraParams {
            method: CalcMethod::Imaging,
            filter: LyraFilter::R,
            grating: None,
            central_wavelength_nm: None,
            focal_plane_mask: None,
            read_mode: ReadMode::Bright,
            spectral_binning: 1,
            spatial_binning: 1,
        },
        &tables,
    )
    .unwrap();
    assert_abs_diff_eq!(bright.read_noise(120.0), 6.2);
}

#[test]
fn ndr_read_noise_falls_with_exposure_time() {
    let tables = demo_tables();
    let params = DracoParams {
        method: CalcMethod::Imaging,
        filter: DracoFilter::K,
        grism: None,
        central_wavelength_nm: None,
        focal_plane_mask: None,
    };
    let instrument = draco(&params, &tables).unwrap();

    // Shorter than one read time: a single read at the full base noise.
    assert_abs_diff_eq!(instrument.read_noise(1.0), 35.0);
    // 4 reads fit in 11.2 s+: noise divides by 2.
    assert_abs_diff_eq!(instrument.read_noise(11.5), 17.5);
    // Clamped at 16 reads no matter how long the exposure.
    assert_abs_diff_eq!(instrument.read_noise(3600.0), 35.0 / 4.0);
}

#[test]
fn ndr_dark_current_couples_to_the_read_count() {
    let tables = demo_tables();
    let params = DracoParams {
        method: CalcMethod::Imaging,
        filter: DracoFilter::K,
        grism: None,
        central_wavelength_nm: None,
        focal_plane_mask: None,
    };
    let instrument = draco(&params, &tables).unwrap();

    // One read: dark is doubled by the legacy 1 + 1/reads factor.
    assert_relative_eq!(instrument.dark_current(1.0), 0.25 * 1.0 * 2.0);
    // Sixteen reads: the factor shrinks towards 1.
    assert_relative_eq!(
        instrument.dark_current(60.0),
        0.25 * 60.0 * (1.0 + 1.0 / 16.0)
    );
}

#[test]
fn chip_gaps_map_to_wavelength_ranges() {
    let tables = demo_tables();
    let instrument = lyra(&lyra_spec_params(), &tables).unwrap();
    let gaps = instrument.gap_wavelength_ranges();
    assert_eq!(gaps.len(), 2);
    for &(lo, hi) in &gaps {
        assert!(lo < hi);
    }
    // Gap pixels below the detector midpoint sit blueward of the central
    // wavelength.
    assert!(gaps[0].0 < 620.0);
    assert!(gaps[1].0 > 620.0);
}

#[test]
fn telescope_collecting_area_subtracts_obscuration() {
    let telescope = demo_telescope();
    let expected = std::f64::consts::FRAC_PI_4 * (8.1f64.powi(2) - 1.2f64.powi(2));
    assert_relative_eq!(telescope.collecting_area_m2(), expected);
}
