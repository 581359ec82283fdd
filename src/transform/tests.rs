// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::{assert_abs_diff_eq, assert_relative_eq};

use super::*;

fn flat(start: f64, end: f64, value: f64) -> SampledSpectrum {
    SampledSpectrum::flat(start, end, 1.0, value).unwrap()
}

#[test]
fn redshift_compounds_on_repeated_application() {
    let mut s = flat(500.0, 600.0, 1.0);
    let t = SpectrumTransform::Redshift { z: 0.1 };
    t.apply(&mut s).unwrap();
    assert_relative_eq!(s.start(), 550.0);
    t.apply(&mut s).unwrap();
    // Compounds: (1.1)², not 1.2.
    assert_relative_eq!(s.start(), 605.0);
}

#[test]
fn unphysical_redshift_is_rejected() {
    let mut s = flat(500.0, 600.0, 1.0);
    let t = SpectrumTransform::Redshift { z: -1.0 };
    assert!(matches!(
        t.apply(&mut s),
        Err(TransformError::InvalidRedshift(_))
    ));
}

#[test]
fn normalize_hits_the_requested_brightness() {
    use crate::units::{BrightnessUnit, MagnitudeBand};

    let mut s = flat(400.0, 700.0, 123.0);
    let t = SpectrumTransform::Normalize {
        band: MagnitudeBand::V,
        magnitude: 15.0,
        unit: BrightnessUnit::VegaMag,
    };
    t.apply(&mut s).unwrap();
    let band = MagnitudeBand::V;
    let mean = s.integral_over(band.start_nm(), band.end_nm()) / band.width_nm();
    let expected = BrightnessUnit::VegaMag.to_photon_flux(15.0, band);
    assert_relative_eq!(mean, expected, max_relative = 1e-10);
}

#[test]
fn normalize_outside_spectrum_fails() {
    use crate::units::{BrightnessUnit, MagnitudeBand};

    // A spectrum redshifted past the V band entirely.
    let mut s = flat(900.0, 1700.0, 1.0);
    let t = SpectrumTransform::Normalize {
        band: MagnitudeBand::V,
        magnitude: 15.0,
        unit: BrightnessUnit::VegaMag,
    };
    let err = t.apply(&mut s).unwrap_err();
    assert!(matches!(
        err,
        TransformError::NormalizationOutsideSpectrum { .. }
    ));
    assert!(err.to_string().contains("V"));
}

#[test]
fn extinction_scales_with_airmass() {
    let curve = flat(400.0, 700.0, 0.8);
    let mut at_am1 = flat(500.0, 600.0, 1.0);
    SpectrumTransform::AtmosphericExtinction {
        curve: curve.clone(),
        airmass: 1.0,
    }
    .apply(&mut at_am1)
    .unwrap();
    let mut at_am2 = flat(500.0, 600.0, 1.0);
    SpectrumTransform::AtmosphericExtinction {
        curve,
        airmass: 2.0,
    }
    .apply(&mut at_am2)
    .unwrap();
    assert_relative_eq!(at_am1.value_at(550.0), 0.8);
    assert_relative_eq!(at_am2.value_at(550.0), 0.64, max_relative = 1e-12);
}

#[test]
fn cloud_bins_are_monotonic() {
    let factors: Vec<f64> = [
        CloudCover::Percent50,
        CloudCover::Percent70,
        CloudCover::Percent80,
        CloudCover::Any,
    ]
    .iter()
    .map(|c| c.transmission())
    .collect();
    assert!(factors.windows(2).all(|w| w[1] < w[0]));
    assert_abs_diff_eq!(CloudCover::Percent50.transmission(), 1.0);
}

#[test]
fn telescope_transmission_compounds_over_surfaces() {
    let mut s = flat(500.0, 600.0, 1.0);
    SpectrumTransform::TelescopeTransmission {
        reflectivity: 0.98,
        surfaces: 3,
    }
    .apply(&mut s)
    .unwrap();
    assert_relative_eq!(s.value_at(550.0), 0.98f64.powi(3), max_relative = 1e-12);
}

#[test]
fn component_trims_to_intersection() {
    let mut s = flat(400.0, 900.0, 2.0);
    let filter = flat(550.0, 650.0, 0.5);
    SpectrumTransform::ComponentTransmission {
        name: "filter_r".to_string(),
        curve: filter,
    }
    .apply(&mut s)
    .unwrap();
    assert_abs_diff_eq!(s.start(), 550.0);
    assert_abs_diff_eq!(s.end(), 650.0);
    assert_abs_diff_eq!(s.value_at(600.0), 1.0);
}

#[test]
fn disjoint_component_fails_with_component_name() {
    let mut s = flat(400.0, 500.0, 1.0);
    let filter = flat(800.0, 900.0, 0.5);
    let err = SpectrumTransform::ComponentTransmission {
        name: "filter_z".to_string(),
        curve: filter,
    }
    .apply(&mut s)
    .unwrap_err();
    assert!(err.to_string().contains("filter_z"));
}

#[test]
fn detector_gaps_zero_the_masked_ranges() {
    let mut s = flat(500.0, 600.0, 3.0);
    SpectrumTransform::DetectorGaps {
        gaps: vec![(520.0, 522.0), (560.0, 562.0)],
    }
    .apply(&mut s)
    .unwrap();
    assert_abs_diff_eq!(s.value_at(521.0), 0.0);
    assert_abs_diff_eq!(s.value_at(561.0), 0.0);
    assert_abs_diff_eq!(s.value_at(540.0), 3.0);
}

#[test]
fn apply_all_folds_in_order() {
    // Aperture then background: the background must not be scaled by the
    // aperture.
    let mut s = flat(500.0, 600.0, 1.0);
    let background = flat(500.0, 600.0, 7.0);
    apply_all(
        &[
            SpectrumTransform::TelescopeAperture { area_m2: 50.0 },
            SpectrumTransform::AddBackground { background },
        ],
        &mut s,
    )
    .unwrap();
    assert_abs_diff_eq!(s.value_at(550.0), 57.0);
}
