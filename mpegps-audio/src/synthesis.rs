// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The 32-subband polyphase synthesis filterbank shared by every Layer II channel: a 32-to-64
//! point matrixing step (the "IDCT-36"), a rotating 1024-entry history buffer `V`, and windowed
//! accumulation against the synthesis window `D` to produce 32 PCM output samples per call.

use lazy_static::lazy_static;

use crate::tables::{synthesis_window, SYNTHESIS_WINDOW_LEN};

lazy_static! {
    static ref SYNTHESIS_D: [f64; SYNTHESIS_WINDOW_LEN] = synthesis_window();

    /// `MATRIX[k][i] = cos((2*k+1)*(i+16)*pi/64)`, the ISO 11172-3 subband-to-64-point matrixing
    /// coefficients, evaluated directly from the published formula rather than transcribed as a
    /// literal constant table.
    static ref MATRIX: [[f64; 32]; 64] = {
        let mut m = [[0.0f64; 32]; 64];
        for (k, row) in m.iter_mut().enumerate() {
            for (i, slot) in row.iter_mut().enumerate() {
                let angle = (2.0 * k as f64 + 1.0) * (i as f64 + 16.0) * std::f64::consts::PI / 64.0;
                *slot = angle.cos();
            }
        }
        m
    };
}

/// Normalizes the accumulated synthesis output into the `[-1, 1]` PCM range.
const OUTPUT_SCALE: f64 = 2_147_418_112.0;

/// Per-channel rolling state for the polyphase synthesis filterbank. `v` is the 1024-entry history
/// buffer described by SPEC_FULL's `vPos` rotation; `v_pos` is that rotating write cursor.
pub struct SynthesisState {
    v: [f64; SYNTHESIS_WINDOW_LEN],
    v_pos: usize,
}

impl Default for SynthesisState {
    fn default() -> Self {
        SynthesisState { v: [0.0; SYNTHESIS_WINDOW_LEN], v_pos: 0 }
    }
}

impl SynthesisState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one 32-subband-sample synthesis step, appending 32 PCM samples to `out`.
    pub fn synthesize(&mut self, subband_samples: &[f64; 32], out: &mut Vec<f32>) {
        self.v_pos = (self.v_pos + SYNTHESIS_WINDOW_LEN - 64) % SYNTHESIS_WINDOW_LEN;

        for (k, row) in MATRIX.iter().enumerate() {
            let mut acc = 0.0;
            for (i, coeff) in row.iter().enumerate() {
                acc += coeff * subband_samples[i];
            }
            self.v[(self.v_pos + k) % SYNTHESIS_WINDOW_LEN] = acc;
        }

        let mut u = [0.0f64; 32];
        let mut d = 512 - (self.v_pos >> 1);
        let mut v = (self.v_pos % 128) >> 1;
        while v < SYNTHESIS_WINDOW_LEN {
            for k in 0..32 {
                u[k] += SYNTHESIS_D[(d + k) % SYNTHESIS_WINDOW_LEN]
                    * self.v[(v + k) % SYNTHESIS_WINDOW_LEN];
            }
            v += 128 - 32;
            d += 64 - 32;
        }
        d -= 512 - 32;
        v = 128 - 32 + SYNTHESIS_WINDOW_LEN - v;
        while v < SYNTHESIS_WINDOW_LEN {
            for k in 0..32 {
                u[k] += SYNTHESIS_D[(d + k) % SYNTHESIS_WINDOW_LEN]
                    * self.v[(v + k) % SYNTHESIS_WINDOW_LEN];
            }
            v += 128 - 32;
            d += 64 - 32;
        }

        for sample in u {
            out.push((sample / OUTPUT_SCALE) as f32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A silent subband input must synthesize to silence once the history buffer has settled.
    #[test]
    fn silence_in_silence_out() {
        let mut state = SynthesisState::new();
        let zero = [0.0f64; 32];
        let mut out = Vec::new();
        for _ in 0..8 {
            state.synthesize(&zero, &mut out);
        }
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn matrix_matches_direct_cosine_formula() {
        let k = 5;
        let i = 7;
        let expected = ((2.0 * k as f64 + 1.0) * (i as f64 + 16.0) * std::f64::consts::PI / 64.0).cos();
        assert!((MATRIX[k][i] - expected).abs() < 1e-12);
    }
}
