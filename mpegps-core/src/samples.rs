// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::time::INVALID_TS;

/// Number of PCM samples per channel produced by one Layer II audio frame (3 parts x 4 granules
/// x 3 samples x 32 subbands of synthesis output... collapsed to the fixed 1152 the format
/// always yields per frame).
pub const SAMPLES_PER_FRAME: usize = 1152;

/// A decoded block of interleaved-by-channel PCM, one frame's worth of Layer II output.
/// Mono streams duplicate into both channels so callers need not special-case channel count.
///
/// Like [`crate::frame::Frame`], this is a view owned by the decoder and is overwritten on the
/// next `decode()` call.
pub struct Samples {
    pub left: Box<[f32; SAMPLES_PER_FRAME]>,
    pub right: Box<[f32; SAMPLES_PER_FRAME]>,
    pub pts: f64,
}

impl Default for Samples {
    fn default() -> Self {
        Samples {
            left: Box::new([0.0; SAMPLES_PER_FRAME]),
            right: Box::new([0.0; SAMPLES_PER_FRAME]),
            pts: INVALID_TS,
        }
    }
}
