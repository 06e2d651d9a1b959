// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The MPEG-1 Audio Layer II frame decoder: bit allocation, scale factors, subband sample
//! dequantization, and polyphase synthesis, wired into the public [`AudioDecoder`] surface.

use mpegps_core::io::BitBuffer;
use mpegps_core::Samples;

use crate::header::{self, ChannelMode, FrameHeader};
use crate::synthesis::SynthesisState;
use crate::tables::{alloc_class, quant_index_for_code, scale_factor, ALLOC_TABLES, QUANTIZER_SPECS};

const PARTS: usize = 3;
const GRANULES: usize = 4;
const GROUP_SIZE: usize = 3;
const MAX_SUBBANDS: usize = 32;

/// Per-channel, per-subband decode state for one frame: which [`QUANTIZER_SPECS`] entry (1-based,
/// 0 = unallocated) applies, and the three per-part scale factors selected by that subband's
/// scale-factor-select-info code.
struct Layer2Frame {
    header: FrameHeader,
    sblimit: usize,
    channels: usize,
    alloc: [[u8; MAX_SUBBANDS]; 2],
    scale_factors: [[[i64; PARTS]; MAX_SUBBANDS]; 2],
}

fn read_scale_factor_triplet(buf: &mut BitBuffer, scfsi: u8) -> [i64; PARTS] {
    match scfsi {
        0 => {
            let c0 = buf.read(6);
            let c1 = buf.read(6);
            let c2 = buf.read(6);
            [scale_factor(c0), scale_factor(c1), scale_factor(c2)]
        }
        1 => {
            let c0 = buf.read(6);
            let c1 = buf.read(6);
            let s0 = scale_factor(c0);
            [s0, s0, scale_factor(c1)]
        }
        2 => {
            let c0 = buf.read(6);
            let s0 = scale_factor(c0);
            [s0, s0, s0]
        }
        _ => {
            let c0 = buf.read(6);
            let c1 = buf.read(6);
            let s1 = scale_factor(c1);
            [scale_factor(c0), s1, s1]
        }
    }
}

fn dequantize(raw: u32, levels: u32, sf: i64) -> f64 {
    let adj = levels as i64;
    let scale_q = 65_536i64 / (adj + 1);
    let bias = ((adj + 1) >> 1) - 1;
    let val = (bias - raw as i64) * scale_q;
    let out = (val * (sf >> 12) + ((val * (sf & 4095) + 2048) >> 12)) >> 12;
    out as f64
}

/// Parses the bit-allocation and scale-factor side information following the frame header.
fn read_side_info(buf: &mut BitBuffer, header: FrameHeader) -> Layer2Frame {
    let mono = header.mode.is_mono();
    let channels = if mono { 1 } else { 2 };
    let class = alloc_class(header.bitrate_bps, header.samplerate_hz, mono);
    let table = &ALLOC_TABLES[class];
    let sblimit = table.sblimit;
    let bound = header.bound.min(sblimit);

    let mut alloc = [[0u8; MAX_SUBBANDS]; 2];
    for sb in 0..sblimit {
        let nbal = table.nbal[sb] as u32;
        if sb < bound || channels == 1 {
            for ch in alloc.iter_mut().take(channels) {
                ch[sb] = quant_index_for_code(buf.read(nbal), nbal);
            }
        }
        else {
            let idx = quant_index_for_code(buf.read(nbal), nbal);
            alloc[0][sb] = idx;
            alloc[1][sb] = idx;
        }
    }

    let mut scfsi = [[0u8; MAX_SUBBANDS]; 2];
    for sb in 0..sblimit {
        for ch in 0..channels {
            if alloc[ch][sb] != 0 {
                scfsi[ch][sb] = buf.read(2) as u8;
            }
        }
    }

    let mut scale_factors = [[[0i64; PARTS]; MAX_SUBBANDS]; 2];
    for sb in 0..sblimit {
        for ch in 0..channels {
            if alloc[ch][sb] != 0 {
                scale_factors[ch][sb] = read_scale_factor_triplet(buf, scfsi[ch][sb]);
            }
        }
    }

    Layer2Frame { header, sblimit, channels, alloc, scale_factors }
}

/// Reads one group of `GROUP_SIZE` quantized subband samples for an allocated subband, either by
/// decomposing a single grouped codeword or by three direct reads.
fn read_sample_group(buf: &mut BitBuffer, spec_idx: u8) -> [u32; GROUP_SIZE] {
    let spec = QUANTIZER_SPECS[spec_idx as usize - 1];
    let mut group = [0u32; GROUP_SIZE];
    if spec.grouped {
        let mut code = buf.read(spec.bits as u32);
        for slot in group.iter_mut() {
            *slot = code % spec.levels;
            code /= spec.levels;
        }
    }
    else {
        for slot in group.iter_mut() {
            *slot = buf.read(spec.bits as u32);
        }
    }
    group
}

/// Decodes the sample data of one frame (all 3 parts x 4 granules), feeding each of the resulting
/// 36 subband-sample instants through `synth` and appending the PCM output to `out`.
fn decode_samples(
    buf: &mut BitBuffer,
    frame: &Layer2Frame,
    synth: &mut [SynthesisState; 2],
    out: &mut [Vec<f32>; 2],
) {
    let bound = frame.header.bound.min(frame.sblimit);
    let mut raw = [[[0u32; GROUP_SIZE]; MAX_SUBBANDS]; 2];

    for part in 0..PARTS {
        for _granule in 0..GRANULES {
            for sb in 0..frame.sblimit {
                if sb < bound || frame.channels == 1 {
                    for ch in 0..frame.channels {
                        if frame.alloc[ch][sb] != 0 {
                            raw[ch][sb] = read_sample_group(buf, frame.alloc[ch][sb]);
                        }
                    }
                }
                else if frame.alloc[0][sb] != 0 {
                    let shared = read_sample_group(buf, frame.alloc[0][sb]);
                    raw[0][sb] = shared;
                    raw[1][sb] = shared;
                }
            }

            for k in 0..GROUP_SIZE {
                for ch in 0..frame.channels {
                    let mut subband_vec = [0.0f64; MAX_SUBBANDS];
                    for sb in 0..frame.sblimit {
                        let spec_idx = frame.alloc[ch][sb];
                        if spec_idx != 0 {
                            let levels = QUANTIZER_SPECS[spec_idx as usize - 1].levels;
                            let sf = frame.scale_factors[ch][sb][part];
                            subband_vec[sb] = dequantize(raw[ch][sb][k], levels, sf);
                        }
                    }
                    synth[ch].synthesize(&subband_vec, &mut out[ch]);
                }
            }
        }
    }
}

/// Decodes MPEG-1 Audio Layer II elementary streams one frame at a time, producing 1152
/// interleaved-by-channel PCM samples per call. Mono streams duplicate into both output channels.
pub struct AudioDecoder {
    buf: BitBuffer,
    has_header: bool,
    samplerate_hz: u32,
    time: f64,
    synth: [SynthesisState; 2],
}

impl AudioDecoder {
    pub fn new(buf: BitBuffer) -> Self {
        AudioDecoder {
            buf,
            has_header: false,
            samplerate_hz: 0,
            time: mpegps_core::time::INVALID_TS,
            synth: [SynthesisState::new(), SynthesisState::new()],
        }
    }

    pub fn has_header(&self) -> bool {
        self.has_header
    }

    pub fn samplerate(&self) -> u32 {
        self.samplerate_hz
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    pub fn has_ended(&self) -> bool {
        self.buf.has_ended() && !self.buf.has(32)
    }

    /// Decodes and returns the next frame's worth of PCM, or `None` on underflow, an unrecoverable
    /// header, or stream end. Callers retry on `None` as more bytes arrive.
    pub fn decode(&mut self) -> Option<Samples> {
        let header = header::sync_and_parse(&mut self.buf)?;
        self.has_header = true;
        self.samplerate_hz = header.samplerate_hz;

        let frame = read_side_info(&mut self.buf, header);

        let mut out: [Vec<f32>; 2] =
            [Vec::with_capacity(mpegps_core::samples::SAMPLES_PER_FRAME), Vec::with_capacity(mpegps_core::samples::SAMPLES_PER_FRAME)];
        decode_samples(&mut self.buf, &frame, &mut self.synth, &mut out);
        self.buf.align();

        let mono = header.mode == ChannelMode::Mono;
        let mut samples = Samples::default();
        for i in 0..mpegps_core::samples::SAMPLES_PER_FRAME {
            samples.left[i] = *out[0].get(i).unwrap_or(&0.0);
            samples.right[i] = if mono { samples.left[i] } else { *out[1].get(i).unwrap_or(&0.0) };
        }
        samples.pts = self.time;
        Some(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_decoder_has_no_header() {
        let decoder = AudioDecoder::new(BitBuffer::from_slice(vec![]));
        assert!(!decoder.has_header());
        assert_eq!(decoder.samplerate(), 0);
    }

    #[test]
    fn empty_stream_yields_no_frame() {
        let mut decoder = AudioDecoder::new(BitBuffer::from_slice(vec![0u8; 8]));
        assert!(decoder.decode().is_none());
    }

    #[test]
    fn dequantize_is_centred_for_mid_code() {
        // A mid-range quantizer code against a zero scale factor dequantizes to exactly zero.
        assert_eq!(dequantize(15, 31, 0), 0.0);
    }
}
