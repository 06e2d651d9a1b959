// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Sentinel presentation timestamp used throughout this crate family to mean "no timestamp
/// available", rather than an `Option<f64>` at every call site.
pub const INVALID_TS: f64 = -1.0;

/// The MPEG system clock runs at 90 kHz; a 33-bit PTS/DTS field divided by this yields seconds.
pub const PTS_CLOCK_HZ: f64 = 90_000.0;

/// Decodes a 33-bit MPEG timestamp (already reassembled from its marker-bit-separated fields)
/// into seconds.
pub fn pts_to_seconds(pts_ticks: u64) -> f64 {
    pts_ticks as f64 / PTS_CLOCK_HZ
}
