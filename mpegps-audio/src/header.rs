// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MPEG-1 Audio Layer II frame header: sync, parse, and the frame-size-in-bytes formula.

use mpegps_core::io::BitBuffer;

use crate::tables::{BIT_RATES_MPEG1_L2, SAMPLE_RATES_MPEG1};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelMode {
    Stereo,
    JointStereo,
    DualMono,
    Mono,
}

impl ChannelMode {
    pub fn is_mono(self) -> bool {
        matches!(self, ChannelMode::Mono)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FrameHeader {
    pub bitrate_bps: u32,
    pub samplerate_hz: u32,
    pub mode: ChannelMode,
    pub mode_extension: u8,
    pub has_padding: bool,
    pub has_crc: bool,
    /// Number of samples per channel the subband range `0..bound` is encoded independently for
    /// (beyond it, joint-stereo subbands share one bitstream allocation).
    pub bound: usize,
}

/// Scans the bit buffer for the 11-bit all-ones sync word followed by a version/layer field that
/// selects MPEG-1 Layer II, then parses the remaining header fields. Returns `None` on underflow
/// (caller retries once more bytes arrive) or on reaching a version/layer this decoder does not
/// support within a bounded number of resync attempts.
pub fn sync_and_parse(buf: &mut BitBuffer) -> Option<FrameHeader> {
    const MAX_RESYNC_ATTEMPTS: u32 = 4096;

    for _ in 0..MAX_RESYNC_ATTEMPTS {
        if !buf.has(32) {
            return None;
        }
        if buf.peek(11) != 0x7FF {
            buf.skip(8);
            continue;
        }
        let header = buf.peek(32);
        match parse_frame_header(header) {
            Some(parsed) => {
                buf.skip(32);
                return Some(parsed);
            }
            None => {
                log::debug!("mpegps-audio: sync word found but header rejected, resyncing");
                buf.skip(8);
                continue;
            }
        }
    }
    log::warn!("mpegps-audio: exhausted resync attempts without a valid header");
    None
}

/// Parses a 32-bit header word already known to start with the 11-bit sync pattern. Returns
/// `None` for any version/layer/bitrate/samplerate this decoder rejects.
fn parse_frame_header(header: u32) -> Option<FrameHeader> {
    let version = (header >> 19) & 0x3;
    let layer = (header >> 17) & 0x3;
    // MPEG-1 (0b11), Layer II (0b10). Every other version/layer combination is out of scope.
    if version != 0b11 || layer != 0b10 {
        return None;
    }

    let has_crc = (header >> 16) & 0x1 == 0;
    let bitrate_index = (header >> 12) & 0xF;
    if bitrate_index == 0 || bitrate_index == 0xF {
        return None;
    }
    let bitrate_bps = BIT_RATES_MPEG1_L2[bitrate_index as usize];

    let samplerate_index = (header >> 10) & 0x3;
    if samplerate_index == 0b11 {
        return None;
    }
    let samplerate_hz = SAMPLE_RATES_MPEG1[samplerate_index as usize];

    let has_padding = (header >> 9) & 0x1 != 0;
    let mode_bits = (header >> 6) & 0x3;
    let mode_extension = ((header >> 4) & 0x3) as u8;

    let mode = match mode_bits {
        0b00 => ChannelMode::Stereo,
        0b01 => ChannelMode::JointStereo,
        0b10 => ChannelMode::DualMono,
        0b11 => ChannelMode::Mono,
        _ => unreachable!(),
    };

    if mode == ChannelMode::Mono {
        if bitrate_bps == 224_000
            || bitrate_bps == 256_000
            || bitrate_bps == 320_000
            || bitrate_bps == 384_000
        {
            return None;
        }
    } else if bitrate_bps == 32_000 || bitrate_bps == 48_000 || bitrate_bps == 56_000 || bitrate_bps == 80_000 {
        return None;
    }

    let bound = match mode {
        ChannelMode::JointStereo => (mode_extension as usize + 1) * 4,
        ChannelMode::Mono => 0,
        ChannelMode::Stereo | ChannelMode::DualMono => 32,
    };

    Some(FrameHeader { bitrate_bps, samplerate_hz, mode, mode_extension, has_padding, has_crc, bound })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(bitrate_index: u32, samplerate_index: u32, mode_bits: u32, mode_ext: u32) -> u32 {
        (0x7FF << 21)
            | (0b11 << 19) // version: MPEG-1
            | (0b10 << 17) // layer: Layer II
            | (1 << 16) // protection_bit=1 => no CRC
            | (bitrate_index << 12)
            | (samplerate_index << 10)
            | (mode_bits << 6)
            | (mode_ext << 4)
    }

    #[test]
    fn parses_a_valid_stereo_header() {
        let header = encode(0b1000, 0b00, 0b00, 0b00);
        let parsed = parse_frame_header(header).expect("valid header");
        assert_eq!(parsed.bitrate_bps, 128_000);
        assert_eq!(parsed.samplerate_hz, 44_100);
        assert_eq!(parsed.mode, ChannelMode::Stereo);
        assert_eq!(parsed.bound, 32);
    }

    #[test]
    fn joint_stereo_bound_follows_mode_extension() {
        let header = encode(0b1000, 0b00, 0b01, 0b10);
        let parsed = parse_frame_header(header).expect("valid header");
        assert_eq!(parsed.bound, 12);
    }

    #[test]
    fn rejects_non_layer_ii() {
        // Layer III (0b01) instead of Layer II (0b10).
        let header = (0x7FF << 21) | (0b11 << 19) | (0b01 << 17) | (1 << 16) | (0b0101 << 12);
        assert!(parse_frame_header(header).is_none());
    }

    #[test]
    fn rejects_reserved_bitrate_and_samplerate() {
        assert!(parse_frame_header(encode(0b1111, 0b00, 0b00, 0b00)).is_none());
        assert!(parse_frame_header(encode(0b0101, 0b11, 0b00, 0b00)).is_none());
    }
}
