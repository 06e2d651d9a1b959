// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed lookup tables transcribed from ISO/IEC 11172-2.

/// Zig-zag scan: `ZIGZAG[n]` is the natural (row-major) position of the `n`th coefficient in
/// scan order.
pub const ZIGZAG: [usize; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10,
    17, 24, 32, 25, 18, 11, 4, 5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13, 6, 7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Default intra quantizer matrix (natural order), used until a sequence header supplies a
/// custom one.
pub const DEFAULT_INTRA_QUANT_MATRIX: [u8; 64] = [
    8, 16, 19, 22, 26, 27, 29, 34,
    16, 16, 22, 24, 27, 29, 34, 37,
    19, 22, 26, 27, 29, 34, 34, 38,
    22, 22, 26, 27, 29, 34, 37, 40,
    22, 26, 27, 29, 32, 35, 40, 48,
    26, 27, 29, 32, 35, 40, 48, 58,
    26, 27, 29, 34, 38, 46, 56, 69,
    27, 29, 35, 38, 46, 56, 69, 83,
];

/// Default non-intra quantizer matrix: flat.
pub const DEFAULT_NON_INTRA_QUANT_MATRIX: [u8; 64] = [16; 64];

/// Scale factor merging the Arai-Agui-Nakajima IDCT's row/column DC scaling into each
/// dequantized coefficient before the transform, in 7-bit fixed point (1.0 == 128).
/// `PREMULTIPLIER[u * 8 + v] = round(128 * c(u) * c(v))` with `c(0) = 1/sqrt(2)`, `c(k) = 1`
/// otherwise.
pub const PREMULTIPLIER: [i32; 64] = [
    64, 91, 91, 91, 91, 91, 91, 91,
    91, 128, 128, 128, 128, 128, 128, 128,
    91, 128, 128, 128, 128, 128, 128, 128,
    91, 128, 128, 128, 128, 128, 128, 128,
    91, 128, 128, 128, 128, 128, 128, 128,
    91, 128, 128, 128, 128, 128, 128, 128,
    91, 128, 128, 128, 128, 128, 128, 128,
    91, 128, 128, 128, 128, 128, 128, 128,
];

/// Picture rate lookup by the sequence header's 4-bit `picture_rate` code (index 0 is unused /
/// forbidden).
pub const PICTURE_RATE: [f64; 16] = [
    0.0, 23.976, 24.0, 25.0, 29.97, 30.0, 50.0, 59.94, 60.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zigzag_is_a_permutation() {
        let mut seen = [false; 64];
        for &p in ZIGZAG.iter() {
            assert!(p < 64);
            assert!(!seen[p]);
            seen[p] = true;
        }
    }

    #[test]
    fn premultiplier_dc_cell_is_quarter_scale() {
        assert_eq!(PREMULTIPLIER[0], 64);
        assert_eq!(PREMULTIPLIER[1], 91);
        assert_eq!(PREMULTIPLIER[8], 91);
        assert_eq!(PREMULTIPLIER[9], 128);
    }
}
