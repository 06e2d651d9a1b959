// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Half-pel motion compensation: copies (or interpolate-averages, for biprediction) a
//! `width x height` block out of a reference plane at a half-pel motion vector.

use mpegps_core::io::BitBuffer;
use mpegps_core::Plane;

use crate::vlc::MOTION_CODE;

/// Decodes one motion-vector-component residual and accumulates it into `v`, per ISO 11172-2's
/// `r_size`-extended `motion_code` (Table B.10), wrapping the result into `[-16*fscale,
/// 16*fscale)`.
pub fn read_motion_delta(buf: &mut BitBuffer, v: &mut i32, r_size: u32) {
    let fscale = 1i32 << r_size;
    let m = buf.read_vlc(&MOTION_CODE);
    let d = if m != 0 && fscale != 1 {
        let r = buf.read(r_size) as i32;
        let mag = ((m.abs() - 1) << r_size) + r + 1;
        if m < 0 {
            -mag
        } else {
            mag
        }
    } else {
        m
    };

    *v += d;
    let range = 32 * fscale;
    if *v < -16 * fscale {
        *v += range;
    } else if *v >= 16 * fscale {
        *v -= range;
    }
}

/// Copies (`interpolate = false`) or averages-in (`interpolate = true`) a block from `src` at
/// half-pel vector `(h, v)` into `dst` at `(dst_row, dst_col)`. `h`/`v` are in half-pel units; the
/// integer part `(h >> 1, v >> 1)` addresses `src`, and the low bit of each picks one of the four
/// half-pel averaging formulas. Returns `false` (without modifying `dst`) if any sample the block
/// touches falls outside `src` — callers silently drop the macroblock in that case.
pub fn predict_block(
    dst: &mut Plane,
    dst_row: usize,
    dst_col: usize,
    src: &Plane,
    h: i32,
    v: i32,
    width: usize,
    height: usize,
    interpolate: bool,
) -> bool {
    let row0 = v >> 1;
    let col0 = h >> 1;
    let odd_h = (h & 1) != 0;
    let odd_v = (v & 1) != 0;

    if row0 < 0
        || col0 < 0
        || (row0 as usize) + height + (odd_v as usize) > src.height
        || (col0 as usize) + width + (odd_h as usize) > src.stride
    {
        return false;
    }

    for dy in 0..height {
        for dx in 0..width {
            let r = row0 as usize + dy;
            let c = col0 as usize + dx;
            let s = src.get(c, r) as u32;
            let s_r = src.get(c + 1, r) as u32;
            let s_dw = src.get(c, r + 1) as u32;
            let s_drdw = src.get(c + 1, r + 1) as u32;

            let pred = match (odd_h, odd_v) {
                (false, false) => s,
                (false, true) => (s + s_dw + 1) >> 1,
                (true, false) => (s + s_r + 1) >> 1,
                (true, true) => (s + s_r + s_dw + s_drdw + 2) >> 2,
            };

            let out_row = dst_row + dy;
            let out_col = dst_col + dx;
            if interpolate {
                let d = dst.get(out_col, out_row) as u32;
                dst.set(out_col, out_row, ((d + pred + 1) >> 1) as u8);
            } else {
                dst.set(out_col, out_row, pred as u8);
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_plane() -> Plane {
        let mut p = Plane::new(8, 8);
        for r in 0..8 {
            for c in 0..8 {
                p.set(r, c, (r * 8 + c) as u8);
            }
        }
        p
    }

    #[test]
    fn zero_vector_is_a_plain_copy() {
        let src = test_plane();
        let mut dst = Plane::new(4, 4);
        assert!(predict_block(&mut dst, 0, 0, &src, 0, 0, 4, 4, false));
        for r in 0..4 {
            for c in 0..4 {
                assert_eq!(dst.get(r, c), src.get(r, c));
            }
        }
    }

    #[test]
    fn odd_h_averages_with_right_neighbour() {
        let src = test_plane();
        let mut dst = Plane::new(2, 2);
        assert!(predict_block(&mut dst, 0, 0, &src, 1, 0, 2, 2, false));
        let expect = (src.get(0, 0) as u32 + src.get(1, 0) as u32 + 1) >> 1;
        assert_eq!(dst.get(0, 0) as u32, expect);
    }

    #[test]
    fn out_of_range_vector_is_rejected() {
        let src = test_plane();
        let mut dst = Plane::new(4, 4);
        assert!(!predict_block(&mut dst, 0, 0, &src, 100, 100, 4, 4, false));
    }

    #[test]
    fn biprediction_averages_with_existing_destination() {
        let src = test_plane();
        let mut dst = Plane::new(2, 2);
        dst.set(0, 0, 10);
        assert!(predict_block(&mut dst, 0, 0, &src, 0, 0, 2, 2, true));
        let expect = (10 + src.get(0, 0) as u32 + 1) >> 1;
        assert_eq!(dst.get(0, 0) as u32, expect);
    }
}
