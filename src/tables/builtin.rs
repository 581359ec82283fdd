// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A built-in synthetic table set.
//!
//! Deployments normally load measured curves from files; these analytic
//! stand-ins keep the preset instruments and the test suite self-contained.
//! All curves are generated deterministically.

use super::{DispersionEntry, MemoryTables, TransmissionTable};

lazy_static::lazy_static! {
    static ref DEMO_TABLES: MemoryTables = demo_tables();
}

/// A process-wide copy of [`demo_tables`], built lazily on first use.
/// Read-only after construction, so concurrent calculation requests can
/// share it without locking.
pub fn shared() -> &'static MemoryTables {
    &DEMO_TABLES
}

/// Sample `f` over `[start_nm, end_nm]` with spacing `step_nm`.
fn curve(start_nm: f64, end_nm: f64, step_nm: f64, f: impl Fn(f64) -> f64) -> TransmissionTable {
    let n = ((end_nm - start_nm) / step_nm).floor() as usize + 1;
    let wavelengths_nm: Vec<f64> = (0..n).map(|i| start_nm + i as f64 * step_nm).collect();
    let values = wavelengths_nm.iter().map(|&w| f(w)).collect();
    TransmissionTable {
        wavelengths_nm,
        values,
    }
}

/// A flat-topped bandpass with linear edge ramps `edge_nm` wide.
fn tophat(start_nm: f64, end_nm: f64, peak: f64, edge_nm: f64) -> TransmissionTable {
    curve(start_nm, end_nm, 1.0, |w| {
        let rise = ((w - start_nm) / edge_nm).min(1.0);
        let fall = ((end_nm - w) / edge_nm).min(1.0);
        peak * rise.min(fall).max(0.0)
    })
}

/// The synthetic table set backing the preset instruments.
pub fn demo_tables() -> MemoryTables {
    let mut t = MemoryTables::default();

    // Lyra: an optical imager/spectrograph.
    t.transmissions
        .insert("lyra/filter_g".to_string(), tophat(398.0, 552.0, 0.92, 8.0));
    t.transmissions
        .insert("lyra/filter_r".to_string(), tophat(562.0, 698.0, 0.94, 8.0));
    t.transmissions
        .insert("lyra/filter_i".to_string(), tophat(706.0, 850.0, 0.94, 8.0));
    t.transmissions
        .insert("lyra/filter_z".to_string(), tophat(848.0, 1000.0, 0.9, 8.0));
    t.transmissions.insert(
        "lyra/optics".to_string(),
        curve(350.0, 1050.0, 2.0, |w| 0.82 - 2.0e-5 * (w - 700.0).abs()),
    );
    t.transmissions.insert(
        "lyra/detector_qe".to_string(),
        curve(350.0, 1050.0, 2.0, |w| {
            // CCD-like: peaks near 650 nm, falls off to the red cutoff.
            (0.9 - 8.0e-7 * (w - 650.0).powi(2)).max(0.05)
        }),
    );
    t.dispersions.insert(
        "lyra/b600".to_string(),
        DispersionEntry {
            dispersion_nm_per_pixel: 0.050,
            resolving_power: 3744.0,
            blaze_nm: 520.0,
        },
    );
    t.dispersions.insert(
        "lyra/r400".to_string(),
        DispersionEntry {
            dispersion_nm_per_pixel: 0.067,
            resolving_power: 1918.0,
            blaze_nm: 764.0,
        },
    );

    // Draco: a near-infrared AO imager/spectrograph.
    t.transmissions.insert(
        "draco/filter_j".to_string(),
        tophat(1150.0, 1330.0, 0.88, 15.0),
    );
    t.transmissions.insert(
        "draco/filter_h".to_string(),
        tophat(1490.0, 1780.0, 0.9, 15.0),
    );
    t.transmissions.insert(
        "draco/filter_k".to_string(),
        tophat(2030.0, 2370.0, 0.9, 15.0),
    );
    t.transmissions.insert(
        "draco/optics".to_string(),
        curve(1000.0, 2500.0, 5.0, |_| 0.78),
    );
    t.transmissions.insert(
        "draco/detector_qe".to_string(),
        curve(1000.0, 2500.0, 5.0, |w| {
            // HgCdTe-like: gently rising to the long-wavelength cutoff.
            0.75 + 5.0e-5 * (w - 1000.0) / 15.0
        }),
    );
    t.dispersions.insert(
        "draco/grism_jh".to_string(),
        DispersionEntry {
            dispersion_nm_per_pixel: 0.36,
            resolving_power: 1200.0,
            blaze_nm: 1400.0,
        },
    );
    t.dispersions.insert(
        "draco/grism_hk".to_string(),
        DispersionEntry {
            dispersion_nm_per_pixel: 0.52,
            resolving_power: 1000.0,
            blaze_nm: 2090.0,
        },
    );

    // Atmosphere. Extinction curves are tabulated at airmass 1.
    t.transmissions.insert(
        "atmosphere/extinction_optical".to_string(),
        curve(320.0, 1100.0, 2.0, |w| {
            // Rayleigh-dominated: worse in the blue.
            (1.0 - 0.25 * (450.0 / w).powi(4)).clamp(0.0, 1.0)
        }),
    );
    t.transmissions.insert(
        "atmosphere/extinction_nearir".to_string(),
        curve(900.0, 2600.0, 5.0, |w| {
            // Telluric absorption bands near 1400 and 1900 nm.
            let band = |centre: f64, depth: f64, width: f64| {
                depth * (-((w - centre) / width).powi(2)).exp()
            };
            (0.98 - band(1400.0, 0.6, 40.0) - band(1900.0, 0.7, 50.0)).clamp(0.0, 1.0)
        }),
    );
    for (pct, depth) in [("20", 0.02), ("50", 0.05), ("80", 0.12), ("100", 0.25)] {
        t.transmissions.insert(
            format!("atmosphere/water_{pct}"),
            curve(320.0, 2600.0, 5.0, move |w| {
                (1.0 - depth * (w / 2600.0)).clamp(0.0, 1.0)
            }),
        );
    }

    // Sky emission, photons s⁻¹ nm⁻¹ m⁻² arcsec⁻². Dark-site levels:
    // ~21 mag/arcsec² in V, brightening steeply through the OH bands to
    // the K-band thermal regime.
    t.backgrounds.insert(
        "sky/optical_emission".to_string(),
        curve(320.0, 1100.0, 2.0, |w| 0.2 + 1.0e-3 * (w - 320.0)),
    );
    t.backgrounds.insert(
        "sky/nearir_emission".to_string(),
        curve(900.0, 2600.0, 5.0, |w| ((w - 900.0) / 350.0).exp()),
    );
    t.backgrounds.insert(
        "telescope/thermal_background".to_string(),
        curve(900.0, 2600.0, 5.0, |w| {
            if w < 1800.0 {
                0.0
            } else {
                5.0 * ((w - 1800.0) / 200.0)
            }
        }),
    );

    t
}
