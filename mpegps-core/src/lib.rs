// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared I/O, error, and output-container types for the `mpegps-*` family of crates: a bit
//! buffer over a byte source, a small error enum for the conditions that are not simply "try
//! again later", and the `Frame`/`Samples` containers a video or audio decoder hands back.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod errors;
pub mod frame;
pub mod io;
pub mod samples;
pub mod time;

pub use errors::{MpegpsError, Result};
pub use frame::{Frame, Plane};
pub use samples::Samples;
