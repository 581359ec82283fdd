// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::{assert_abs_diff_eq, assert_relative_eq};

use super::library::BuiltinLibrary;
use super::*;
use crate::{
    instrument::presets::{demo_telescope, lyra, LyraFilter, LyraGrating, LyraParams},
    instrument::{CalcMethod, FocalPlaneMask, ReadMode},
    tables::builtin::demo_tables,
    tables::MemoryTables,
};

fn factory_fixtures() -> (MemoryTables, crate::instrument::Telescope) {
    (demo_tables(), demo_telescope())
}

fn site() -> SiteConfig {
    SiteConfig {
        extinction_key: "atmosphere/extinction_optical".to_string(),
        sky_emission_key: "sky/optical_emission".to_string(),
    }
}

fn conditions() -> ObservingConditions {
    ObservingConditions {
        airmass: 1.2,
        seeing_arcsec: 0.7,
        cloud: CloudCover::Percent50,
        water: WaterVaporPercentile::Percent50,
    }
}

fn spectrograph(tables: &MemoryTables) -> Instrument {
    lyra(
        &LyraParams {
            method: CalcMethod::Spectroscopy,
            filter: LyraFilter::R,
            grating: Some(LyraGrating::B600),
            central_wavelength_nm: Some(620.0),
            focal_plane_mask: Some(FocalPlaneMask::Slit { width_arcsec: 0.5 }),
            read_mode: ReadMode::Faint,
            spectral_binning: 1,
            spatial_binning: 1,
        },
        tables,
    )
    .unwrap()
}

fn k0iii_source() -> SourceDefinition {
    SourceDefinition {
        spec: SourceSpec::Library {
            name: "K0III".to_string(),
        },
        redshift: 0.0,
        normalization: Some(Normalization {
            band: MagnitudeBand::R,
            brightness: 20.0,
            unit: BrightnessUnit::VegaMag,
        }),
    }
}

#[test]
fn build_produces_spectra_on_the_observing_range() {
    let (tables, telescope) = factory_fixtures();
    let instrument = spectrograph(&tables);
    let factory = SedFactory {
        tables: &tables,
        library: &BuiltinLibrary,
    };
    let result = factory
        .build(
            &k0iii_source(),
            &instrument,
            &telescope,
            &conditions(),
            &site(),
            None,
        )
        .unwrap();

    let (obs_start, obs_end) = instrument.observing_range();
    assert!(result.source.start() >= obs_start - 1.0);
    assert!(result.source.end() <= obs_end + 1.0);
    assert!(result.sky.start() >= obs_start - 1.0);
    assert!(result.halo.is_none());
    // Light made it through the whole train.
    assert!(result.source.integral() > 0.0);
    assert!(result.sky.integral() > 0.0);
}

#[test]
fn redshift_off_the_instrument_is_rejected() {
    let (tables, telescope) = factory_fixtures();
    let instrument = spectrograph(&tables);
    let factory = SedFactory {
        tables: &tables,
        library: &BuiltinLibrary,
    };
    let mut source = k0iii_source();
    // The library stops at 28 µm; a z of 60 pushes its blue end past the
    // whole optical range.
    source.redshift = 60.0;
    let err = factory
        .build(
            &source,
            &instrument,
            &telescope,
            &conditions(),
            &site(),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, SedError::OutsideObservingRange { .. }));
}

#[test]
fn ao_split_conserves_flux_between_core_and_halo() {
    let (tables, telescope) = factory_fixtures();
    let instrument = spectrograph(&tables);
    let factory = SedFactory {
        tables: &tables,
        library: &BuiltinLibrary,
    };

    let plain = factory
        .build(
            &k0iii_source(),
            &instrument,
            &telescope,
            &conditions(),
            &site(),
            None,
        )
        .unwrap();
    let split = factory
        .build(
            &k0iii_source(),
            &instrument,
            &telescope,
            &conditions(),
            &site(),
            Some(0.3),
        )
        .unwrap();

    let core = split.source.integral();
    let halo = split.halo.as_ref().unwrap().integral();
    assert_relative_eq!(core + halo, plain.source.integral(), max_relative = 1e-9);
    assert_relative_eq!(core / (core + halo), 0.3, max_relative = 1e-9);
}

#[test]
fn bad_strehl_is_rejected() {
    let (tables, telescope) = factory_fixtures();
    let instrument = spectrograph(&tables);
    let factory = SedFactory {
        tables: &tables,
        library: &BuiltinLibrary,
    };
    for s in [0.0, -0.1, 1.5] {
        let err = factory
            .build(
                &k0iii_source(),
                &instrument,
                &telescope,
                &conditions(),
                &site(),
                Some(s),
            )
            .unwrap_err();
        assert!(matches!(err, SedError::BadStrehl(_)));
    }
}

#[test]
fn determinism_identical_requests_identical_output() {
    let (tables, telescope) = factory_fixtures();
    let instrument = spectrograph(&tables);
    let factory = SedFactory {
        tables: &tables,
        library: &BuiltinLibrary,
    };
    let a = factory
        .build(
            &k0iii_source(),
            &instrument,
            &telescope,
            &conditions(),
            &site(),
            None,
        )
        .unwrap();
    let b = factory
        .build(
            &k0iii_source(),
            &instrument,
            &telescope,
            &conditions(),
            &site(),
            None,
        )
        .unwrap();
    // Bit-for-bit equality, not approximate equality.
    assert_eq!(a.source, b.source);
    assert_eq!(a.sky, b.sky);
}

#[test]
fn emission_line_skips_normalisation_and_carries_its_flux() {
    let (tables, telescope) = factory_fixtures();
    let instrument = spectrograph(&tables);
    let factory = SedFactory {
        tables: &tables,
        library: &BuiltinLibrary,
    };
    let source = SourceDefinition {
        spec: SourceSpec::EmissionLine {
            wavelength_nm: 620.0,
            width_kms: 500.0,
            line_flux_w_m2: 1e-18,
            continuum_w_m2_um: 1e-18,
        },
        redshift: 0.0,
        normalization: None,
    };
    let result = factory
        .build(
            &source,
            &instrument,
            &telescope,
            &conditions(),
            &site(),
            None,
        )
        .unwrap();
    // The line peaks where we put it.
    let at_line = result.source.value_at(620.0);
    let off_line = result.source.value_at(640.0);
    assert!(at_line > 10.0 * off_line);
}

#[test]
fn blackbody_shape_peaks_in_a_sensible_place() {
    // Wien: the photon-flux peak of a 5770 K blackbody sits near 635 nm
    // (λ_peak ≈ 3.67e6 nm·K / T for photon flux).
    let mut peak_w = 0.0;
    let mut peak_v = 0.0;
    for i in 0..5000 {
        let w = 300.0 + i as f64;
        let v = blackbody_photon_shape(w, 5770.0);
        if v > peak_v {
            peak_v = v;
            peak_w = w;
        }
    }
    assert_abs_diff_eq!(peak_w, 3.67e6 / 5770.0, epsilon = 20.0);
}

#[test]
fn unknown_library_name_is_descriptive() {
    let err = BuiltinLibrary.sed("Z9IX").unwrap_err();
    assert!(err.to_string().contains("Z9IX"));
}
