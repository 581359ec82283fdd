// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::{assert_abs_diff_eq, assert_relative_eq};

use super::*;

fn setup(n: u32) -> ExposureSetup {
    ExposureSetup {
        exposure_s: 100.0,
        n_exposures: n,
        on_source_fraction: 1.0,
    }
}

fn flat(value: f64) -> SampledSpectrum {
    SampledSpectrum::flat(500.0, 600.0, 1.0, value).unwrap()
}

#[test]
fn imaging_hand_check() {
    // 10 photons/s/nm over 100 nm = 1000 photons/s; fraction 0.5, 100 s
    // → 50 000 e- of signal.
    let source = flat(10.0);
    let sky = flat(0.2); // 20 e-/s/arcsec²
    let inputs = ImagingInputs {
        source: &source,
        sky: &sky,
        halo: None,
        source_fraction: 0.5,
        peak_pixel_fraction: 0.2,
        n_pixels: 100.0,
        pixel_area_arcsec2: 0.01,
        dark_e_per_pixel: 1.0,
        read_noise_e: 4.0,
        setup: setup(1),
    };
    let result = imaging_s2n(&inputs);

    assert_relative_eq!(result.signal_e, 50_000.0, max_relative = 1e-9);
    // Background: 20 e-/s/arcsec² × 0.01 arcsec² × 100 s × 100 pixels.
    assert_relative_eq!(result.background_e, 2_000.0, max_relative = 1e-9);
    // Noise² = 50000 + 2000 + 100×1 + 100×16 = 53700.
    let expected_s2n = 50_000.0 / 53_700f64.sqrt();
    assert_relative_eq!(result.single_s2n, expected_s2n, max_relative = 1e-9);
    assert_relative_eq!(result.final_s2n, expected_s2n, max_relative = 1e-9);
    // Peak pixel: 20000 source + 20 sky + 1 dark.
    assert_relative_eq!(result.peak_pixel_e, 20_021.0, max_relative = 1e-9);
}

#[test]
fn imaging_accumulates_as_sqrt_n() {
    let source = flat(10.0);
    let sky = flat(0.2);
    let mut inputs = ImagingInputs {
        source: &source,
        sky: &sky,
        halo: None,
        source_fraction: 0.5,
        peak_pixel_fraction: 0.2,
        n_pixels: 100.0,
        pixel_area_arcsec2: 0.01,
        dark_e_per_pixel: 1.0,
        read_noise_e: 4.0,
        setup: setup(1),
    };
    let one = imaging_s2n(&inputs);
    inputs.setup = setup(4);
    let four = imaging_s2n(&inputs);
    assert_relative_eq!(four.final_s2n, 2.0 * one.final_s2n, max_relative = 1e-12);
    // The single-exposure ratio is unchanged.
    assert_relative_eq!(four.single_s2n, one.single_s2n, max_relative = 1e-12);
}

#[test]
fn on_source_fraction_scales_the_accumulation() {
    let source = flat(10.0);
    let sky = flat(0.2);
    let mut inputs = ImagingInputs {
        source: &source,
        sky: &sky,
        halo: None,
        source_fraction: 0.5,
        peak_pixel_fraction: 0.2,
        n_pixels: 100.0,
        pixel_area_arcsec2: 0.01,
        dark_e_per_pixel: 1.0,
        read_noise_e: 4.0,
        setup: ExposureSetup {
            exposure_s: 100.0,
            n_exposures: 8,
            on_source_fraction: 0.5,
        },
    };
    let chopped = imaging_s2n(&inputs);
    inputs.setup = setup(4);
    let solid = imaging_s2n(&inputs);
    // 8 × 0.5 on-source exposures is the same as 4 × 1.0.
    assert_relative_eq!(chopped.final_s2n, solid.final_s2n, max_relative = 1e-12);
}

#[test]
fn halo_adds_signal_with_its_own_fraction() {
    let source = flat(10.0);
    let halo_spectrum = flat(10.0);
    let sky = flat(0.0);
    let base = ImagingInputs {
        source: &source,
        sky: &sky,
        halo: None,
        source_fraction: 0.6,
        peak_pixel_fraction: 0.2,
        n_pixels: 10.0,
        pixel_area_arcsec2: 0.01,
        dark_e_per_pixel: 0.0,
        read_noise_e: 0.0,
        setup: setup(1),
    };
    let without = imaging_s2n(&base);

    let with = imaging_s2n(&ImagingInputs {
        halo: Some(HaloContribution {
            spectrum: &halo_spectrum,
            source_fraction: 0.1,
            peak_pixel_fraction: 0.01,
        }),
        ..base
    });

    // Signal picks up the halo's 0.1 fraction on top of the core's 0.6.
    assert_relative_eq!(
        with.signal_e,
        without.signal_e * (0.6 + 0.1) / 0.6,
        max_relative = 1e-9
    );
    // Photon-limited: S/N = √S, so more signal means more S/N.
    assert!(with.single_s2n > without.single_s2n);
}

#[test]
fn spec_hand_check_flat_inputs() {
    let source = flat(100.0);
    let sky = flat(1.0);
    let inputs = SpecInputs {
        source: &source,
        sky: &sky,
        halo: None,
        gaps: &[],
        source_fraction: 0.4,
        peak_spatial_fraction: 0.3,
        aperture_area_arcsec2: 0.5,
        n_spatial_pixels: 10.0,
        pixel_width_nm: 0.5,
        range: (520.0, 580.0),
        dark_e_per_pixel: 2.0,
        read_noise_e: 3.0,
        setup: setup(1),
    };
    let result = spec_s2n(&inputs);

    assert_eq!(result.signal.len(), 120);
    // Signal per pixel: 100 × 0.4 × 100 s × 0.5 nm = 2000 e-.
    assert_relative_eq!(result.signal.value_at(550.25), 2_000.0, max_relative = 1e-9);
    // Background per pixel: 1 × 0.5 × 100 × 0.5 = 25 e-.
    assert_relative_eq!(
        result.background.value_at(550.25),
        25.0,
        max_relative = 1e-9
    );
    // Noise² = 2000 + 25 + 10×2 + 10×9 = 2135.
    let expected = 2_000.0 / 2_135f64.sqrt();
    assert_relative_eq!(
        result.single_s2n.value_at(550.25),
        expected,
        max_relative = 1e-9
    );
}

#[test]
fn spec_final_s2n_grows_with_exposures() {
    let source = flat(100.0);
    let sky = flat(1.0);
    let mut inputs = SpecInputs {
        source: &source,
        sky: &sky,
        halo: None,
        gaps: &[],
        source_fraction: 0.4,
        peak_spatial_fraction: 0.3,
        aperture_area_arcsec2: 0.5,
        n_spatial_pixels: 10.0,
        pixel_width_nm: 0.5,
        range: (520.0, 580.0),
        dark_e_per_pixel: 2.0,
        read_noise_e: 3.0,
        setup: setup(1),
    };
    let mut previous = 0.0;
    for n in [1, 3, 9] {
        inputs.setup = setup(n);
        let result = spec_s2n(&inputs);
        let peak = result
            .final_s2n
            .values()
            .iter()
            .cloned()
            .fold(0.0, f64::max);
        assert!(peak > previous, "final S/N should grow with exposures");
        previous = peak;
    }
}

#[test]
fn chip_gaps_zero_the_signal_but_not_the_background() {
    let source = flat(100.0);
    let sky = flat(1.0);
    let inputs = SpecInputs {
        source: &source,
        sky: &sky,
        halo: None,
        gaps: &[(540.0, 545.0)],
        source_fraction: 0.4,
        peak_spatial_fraction: 0.3,
        aperture_area_arcsec2: 0.5,
        n_spatial_pixels: 10.0,
        pixel_width_nm: 0.5,
        range: (520.0, 580.0),
        dark_e_per_pixel: 2.0,
        read_noise_e: 3.0,
        setup: setup(1),
    };
    let result = spec_s2n(&inputs);
    assert_abs_diff_eq!(result.signal.value_at(542.25), 0.0);
    assert_abs_diff_eq!(result.single_s2n.value_at(542.25), 0.0);
    assert_relative_eq!(
        result.background.value_at(542.25),
        25.0,
        max_relative = 1e-9
    );
    // Outside the gap the signal is untouched.
    assert_relative_eq!(result.signal.value_at(560.25), 2_000.0, max_relative = 1e-9);
}

#[test]
fn spec_determinism() {
    let source = flat(100.0);
    let sky = flat(1.0);
    let inputs = SpecInputs {
        source: &source,
        sky: &sky,
        halo: None,
        gaps: &[(540.0, 545.0)],
        source_fraction: 0.4,
        peak_spatial_fraction: 0.3,
        aperture_area_arcsec2: 0.5,
        n_spatial_pixels: 10.0,
        pixel_width_nm: 0.5,
        range: (520.0, 580.0),
        dark_e_per_pixel: 2.0,
        read_noise_e: 3.0,
        setup: setup(3),
    };
    let a = spec_s2n(&inputs);
    let b = spec_s2n(&inputs);
    // Element-for-element identical, not approximately equal.
    assert_eq!(a, b);
}

#[test]
fn exposure_solver_inverts_the_accumulation() {
    // Single-exposure S/N of 10, target 100 → 100 on-source exposures.
    assert_eq!(exposures_for_target_snr(100.0, 10.0, 1.0), Some(100));
    // Chopping at 50% doubles the count.
    assert_eq!(exposures_for_target_snr(100.0, 10.0, 0.5), Some(200));
    // Already there: one exposure.
    assert_eq!(exposures_for_target_snr(1.0, 10.0, 1.0), Some(1));
    assert_eq!(exposures_for_target_snr(10.0, 0.0, 1.0), None);
}
