// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Deterministic signal-to-noise and exposure-time estimation engine for
optical/infrared telescope instruments.

One calculation request runs start to finish with no suspension points and
no shared mutable state; identical inputs yield bit-for-bit identical
outputs. Lookup tables and spectral libraries are supplied by the caller
through the traits in [`tables`].
 */

pub mod constants;
pub mod instrument;
pub(crate) mod math;
pub mod morphology;
pub mod recipe;
pub mod s2n;
pub mod sed;
pub mod spectrum;
pub mod tables;
pub mod transform;
pub mod units;

mod error;

// Re-exports.
pub use error::CalcError;
pub use instrument::{Instrument, InstrumentConfig, Telescope};
pub use recipe::{CalcRequest, CalcResult, Warning};
pub use sed::{SourceResult, SourceSpec};
pub use spectrum::SampledSpectrum;
pub use transform::SpectrumTransform;
