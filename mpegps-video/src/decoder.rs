// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sequence -> picture -> slice -> macroblock -> block state machine.

use mpegps_core::io::{BitBuffer, INVALID_CODE};
use mpegps_core::Frame;

use crate::block::{decode_block, place_block, BlockCoeffs, Plane2};
use crate::common::{
    PictureType, EXTENSION_START_CODE, GROUP_START_CODE, PICTURE_START_CODE, SEQUENCE_END_CODE,
    SEQUENCE_HEADER_CODE, SLICE_START_CODE_MAX, SLICE_START_CODE_MIN, USER_DATA_START_CODE,
};
use crate::motion::{predict_block, read_motion_delta};
use crate::tables::{DEFAULT_INTRA_QUANT_MATRIX, DEFAULT_NON_INTRA_QUANT_MATRIX, PICTURE_RATE, ZIGZAG};
use crate::vlc::{self, MB_ADDR_INCREMENT, MB_TYPE_B, MB_TYPE_I, MB_TYPE_P};

/// Decodes MPEG-1 video (ISO/IEC 11172-2) elementary-stream pictures from a [`BitBuffer`] into
/// planar YCbCr 4:2:0 [`Frame`]s.
pub struct VideoDecoder {
    buf: BitBuffer,
    has_header: bool,
    width: u32,
    height: u32,
    mb_w: usize,
    mb_h: usize,
    intra_quant: [u8; 64],
    non_intra_quant: [u8; 64],

    frames: [Frame; 3],
    current_idx: usize,
    forward_idx: usize,
    backward_idx: usize,

    time: f64,
    framerate: f64,
    pub no_delay: bool,
    has_ended: bool,
    /// Set once an I/P picture finishes without yet being emitted (delay-mode pipeline).
    pending_reference: bool,
    /// A start code read ahead of need (e.g. while probing for the end of a slice run) and not
    /// yet dispatched.
    pending_code: Option<i32>,
}

impl VideoDecoder {
    pub fn new(buf: BitBuffer) -> Self {
        VideoDecoder {
            buf,
            has_header: false,
            width: 0,
            height: 0,
            mb_w: 0,
            mb_h: 0,
            intra_quant: DEFAULT_INTRA_QUANT_MATRIX,
            non_intra_quant: DEFAULT_NON_INTRA_QUANT_MATRIX,
            frames: [Frame::new(16, 16), Frame::new(16, 16), Frame::new(16, 16)],
            current_idx: 0,
            forward_idx: 1,
            backward_idx: 2,
            time: 0.0,
            framerate: 0.0,
            no_delay: false,
            has_ended: false,
            pending_reference: false,
            pending_code: None,
        }
    }

    pub fn has_header(&self) -> bool {
        self.has_header
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn framerate(&self) -> f64 {
        self.framerate
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    pub fn has_ended(&self) -> bool {
        self.has_ended && self.buf.has_ended()
    }

    fn next_code(&mut self) -> i32 {
        match self.pending_code.take() {
            Some(c) => c,
            None => self.buf.next_start_code(),
        }
    }

    /// Decodes and returns the next frame due for emission, or `None` if no frame is ready this
    /// call (retry once more bytes arrive, or the stream has ended).
    pub fn decode(&mut self) -> Option<Frame> {
        loop {
            if !self.has_header {
                let code = self.buf.find_start_code(SEQUENCE_HEADER_CODE as u8);
                if code == INVALID_CODE {
                    self.has_ended = true;
                    return None;
                }
                self.parse_sequence_header();
                continue;
            }

            let code = self.next_code();
            if code == INVALID_CODE {
                self.has_ended = true;
                return self.flush_pending();
            }
            match code as u32 {
                PICTURE_START_CODE => {
                    if let Some(frame) = self.decode_picture() {
                        return Some(frame);
                    }
                }
                SEQUENCE_HEADER_CODE => self.parse_sequence_header(),
                SEQUENCE_END_CODE => {
                    self.has_ended = true;
                    return self.flush_pending();
                }
                GROUP_START_CODE | EXTENSION_START_CODE | USER_DATA_START_CODE => {}
                _ => {}
            }
        }
    }

    fn flush_pending(&mut self) -> Option<Frame> {
        if self.pending_reference {
            self.pending_reference = false;
            Some(self.frames[self.backward_idx].clone())
        } else {
            None
        }
    }

    fn parse_sequence_header(&mut self) {
        let width = self.buf.read(12);
        let height = self.buf.read(12);
        self.buf.skip(4); // aspect_ratio
        let rate_code = self.buf.read(4) as usize;
        self.buf.skip(18); // bit_rate (lower bits)
        self.buf.skip(1); // marker_bit
        self.buf.skip(10); // vbv_buffer_size
        self.buf.skip(1); // constrained_parameters_flag

        if self.buf.read(1) != 0 {
            for i in 0..64 {
                self.intra_quant[ZIGZAG[i]] = self.buf.read(8) as u8;
            }
        } else {
            self.intra_quant = DEFAULT_INTRA_QUANT_MATRIX;
        }

        if self.buf.read(1) != 0 {
            for i in 0..64 {
                self.non_intra_quant[ZIGZAG[i]] = self.buf.read(8) as u8;
            }
        } else {
            self.non_intra_quant = DEFAULT_NON_INTRA_QUANT_MATRIX;
        }

        if width == 0 || height == 0 {
            return; // malformed; keep any previously established geometry
        }

        self.width = width;
        self.height = height;
        self.mb_w = (width as usize + 15) >> 4;
        self.mb_h = (height as usize + 15) >> 4;
        self.framerate = PICTURE_RATE[rate_code];
        self.frames = [Frame::new(width, height), Frame::new(width, height), Frame::new(width, height)];
        self.current_idx = 0;
        self.forward_idx = 1;
        self.backward_idx = 2;
        self.has_header = true;
    }

    fn decode_picture(&mut self) -> Option<Frame> {
        self.buf.skip(10); // temporal_reference
        let type_code = self.buf.read(3);
        let Some(picture_type) = PictureType::from_code(type_code) else {
            return None; // D-picture or reserved: drop, resync at next start code
        };
        self.buf.skip(16); // vbv_delay

        let mut full_pel_forward = false;
        let mut f_code_forward = 0u32;
        let mut full_pel_backward = false;
        let mut f_code_backward = 0u32;

        if picture_type != PictureType::Intra {
            full_pel_forward = self.buf.read(1) != 0;
            f_code_forward = self.buf.read(3);
            if f_code_forward == 0 {
                return None;
            }
        }
        if picture_type == PictureType::Bidirectional {
            full_pel_backward = self.buf.read(1) != 0;
            f_code_backward = self.buf.read(3);
            if f_code_backward == 0 {
                return None;
            }
        }

        let old_forward = self.forward_idx;
        if picture_type != PictureType::Bidirectional {
            self.forward_idx = self.backward_idx;
        }

        // Skip extension_data/user_data before the first slice.
        loop {
            let code = self.buf.next_start_code();
            if code == EXTENSION_START_CODE as i32 || code == USER_DATA_START_CODE as i32 {
                continue;
            }
            self.pending_code = Some(code);
            break;
        }

        let mut mb_addr: i64 = -1;

        loop {
            let code = self.next_code();
            if code == INVALID_CODE {
                self.pending_code = Some(code);
                break;
            }
            if (SLICE_START_CODE_MIN as i32..=SLICE_START_CODE_MAX as i32).contains(&code) {
                self.decode_slice(
                    code as u8,
                    picture_type,
                    full_pel_forward,
                    f_code_forward,
                    full_pel_backward,
                    f_code_backward,
                    &mut mb_addr,
                );
            } else {
                self.pending_code = Some(code);
                break;
            }
        }

        if picture_type != PictureType::Bidirectional {
            self.backward_idx = self.current_idx;
            self.current_idx = old_forward;
        }

        self.frames[if picture_type == PictureType::Bidirectional {
            self.current_idx
        } else {
            self.backward_idx
        }]
        .pts = self.time;

        if self.no_delay {
            let idx = if picture_type == PictureType::Bidirectional {
                self.current_idx
            } else {
                self.backward_idx
            };
            return Some(self.frames[idx].clone());
        }

        match picture_type {
            PictureType::Bidirectional => Some(self.frames[self.current_idx].clone()),
            _ => {
                let emit = self.pending_reference.then(|| self.frames[old_forward].clone());
                self.pending_reference = true;
                emit
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn decode_slice(
        &mut self,
        slice_code: u8,
        picture_type: PictureType,
        full_pel_forward: bool,
        f_code_forward: u32,
        full_pel_backward: bool,
        f_code_backward: u32,
        mb_addr: &mut i64,
    ) {
        let slice = slice_code as i64;
        *mb_addr = (slice - 1) * self.mb_w as i64 - 1;

        let mut forward_mv = (0i32, 0i32);
        let mut backward_mv = (0i32, 0i32);
        let mut dc_pred = [128i32; 3];
        let mut quantizer_scale = self.buf.read(5) as u8;

        loop {
            let flag = self.buf.read(1);
            if flag == 1 {
                self.buf.skip(8);
            } else {
                break;
            }
        }

        let mb_size = (self.mb_w * self.mb_h) as i64;
        let mut first_mb = true;

        while *mb_addr < mb_size - 1 && self.buf.peek_nonzero(23) {
            let increment = self.read_mb_address_increment();
            if increment < 0 {
                break;
            }

            if first_mb {
                *mb_addr += increment as i64;
                first_mb = false;
            } else {
                if increment > 1 {
                    dc_pred = [128; 3];
                    if picture_type == PictureType::Predicted {
                        forward_mv = (0, 0);
                    }
                }
                for _ in 0..increment {
                    *mb_addr += 1;
                    if *mb_addr as usize >= self.mb_w * self.mb_h {
                        break;
                    }
                    self.predict_skipped_macroblock(*mb_addr as usize, forward_mv, full_pel_forward);
                }
                continue;
            }

            if *mb_addr < 0 || *mb_addr as usize >= self.mb_w * self.mb_h {
                break;
            }

            self.decode_macroblock(
                *mb_addr as usize,
                picture_type,
                full_pel_forward,
                f_code_forward,
                full_pel_backward,
                f_code_backward,
                &mut forward_mv,
                &mut backward_mv,
                &mut dc_pred,
                &mut quantizer_scale,
            );
        }
    }

    fn read_mb_address_increment(&mut self) -> i32 {
        loop {
            let v = self.buf.read_vlc(&MB_ADDR_INCREMENT);
            if v == vlc::MB_ADDR_STUFFING {
                continue;
            }
            if v == vlc::MB_ADDR_ESCAPE {
                // Caller accumulates +33 and re-reads; modelled here as a direct loop.
                let next = self.read_mb_address_increment();
                if next < 0 {
                    return next;
                }
                return 33 + next;
            }
            return v;
        }
    }

    fn predict_skipped_macroblock(&mut self, mb_addr: usize, forward_mv: (i32, i32), full_pel_forward: bool) {
        let row = mb_addr / self.mb_w;
        let col = mb_addr % self.mb_w;
        self.motion_compensate(row, col, forward_mv, (0, 0), true, false, full_pel_forward, false);
    }

    #[allow(clippy::too_many_arguments)]
    fn decode_macroblock(
        &mut self,
        mb_addr: usize,
        picture_type: PictureType,
        full_pel_forward: bool,
        f_code_forward: u32,
        full_pel_backward: bool,
        f_code_backward: u32,
        forward_mv: &mut (i32, i32),
        backward_mv: &mut (i32, i32),
        dc_pred: &mut [i32; 3],
        quantizer_scale: &mut u8,
    ) {
        let row = mb_addr / self.mb_w;
        let col = mb_addr % self.mb_w;

        let type_table = match picture_type {
            PictureType::Intra => &*MB_TYPE_I,
            PictureType::Predicted => &*MB_TYPE_P,
            PictureType::Bidirectional => &*MB_TYPE_B,
        };
        let flags = self.buf.read_vlc(type_table);
        if flags < 0 {
            return; // corrupt; abandon this macroblock
        }

        if flags & vlc::MB_QUANT as i32 != 0 {
            *quantizer_scale = self.buf.read(5) as u8;
        }

        let intra = flags & vlc::MB_INTRA as i32 != 0;
        if intra {
            *forward_mv = (0, 0);
            *backward_mv = (0, 0);
        } else {
            *dc_pred = [128; 3];

            if flags & vlc::MB_FORWARD as i32 != 0 {
                let r_size = f_code_forward.saturating_sub(1);
                read_motion_delta(&mut self.buf, &mut forward_mv.0, r_size);
                read_motion_delta(&mut self.buf, &mut forward_mv.1, r_size);
            } else if picture_type == PictureType::Predicted {
                *forward_mv = (0, 0);
            }

            if flags & vlc::MB_BACKWARD as i32 != 0 {
                let r_size = f_code_backward.saturating_sub(1);
                read_motion_delta(&mut self.buf, &mut backward_mv.0, r_size);
                read_motion_delta(&mut self.buf, &mut backward_mv.1, r_size);
            }

            let has_forward = flags & vlc::MB_FORWARD as i32 != 0;
            let has_backward = flags & vlc::MB_BACKWARD as i32 != 0;
            self.motion_compensate(
                row,
                col,
                *forward_mv,
                *backward_mv,
                has_forward,
                has_backward,
                full_pel_forward,
                full_pel_backward,
            );
        }

        let cbp = if flags & vlc::MB_CODED as i32 != 0 {
            self.buf.read_vlc(&vlc::CODED_BLOCK_PATTERN) as u32
        } else if intra {
            0x3f
        } else {
            0
        };

        let (intra_quant, non_intra_quant) = (self.intra_quant, self.non_intra_quant);
        let quant_matrix = if intra { &intra_quant } else { &non_intra_quant };

        for block in 0..6u32 {
            if cbp & (0x20 >> block) == 0 {
                continue;
            }
            let plane2 = if block < 4 { Plane2::Luma } else { Plane2::Chroma };
            let predictor = match block {
                0..=3 => &mut dc_pred[0],
                4 => &mut dc_pred[1],
                _ => &mut dc_pred[2],
            };
            let coeffs = decode_block(&mut self.buf, intra, plane2, predictor, *quantizer_scale, quant_matrix);
            let Some(coeffs) = coeffs else { return };

            let (plane, brow, bcol) = match block {
                0 => (&mut self.frames[self.current_idx].y, row * 16, col * 16),
                1 => (&mut self.frames[self.current_idx].y, row * 16, col * 16 + 8),
                2 => (&mut self.frames[self.current_idx].y, row * 16 + 8, col * 16),
                3 => (&mut self.frames[self.current_idx].y, row * 16 + 8, col * 16 + 8),
                4 => (&mut self.frames[self.current_idx].cb, row * 8, col * 8),
                _ => (&mut self.frames[self.current_idx].cr, row * 8, col * 8),
            };
            place_block(plane, brow, bcol, coeffs, intra);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn motion_compensate(
        &mut self,
        row: usize,
        col: usize,
        forward_mv: (i32, i32),
        backward_mv: (i32, i32),
        has_forward: bool,
        has_backward: bool,
        full_pel_forward: bool,
        full_pel_backward: bool,
    ) {
        let scale = |mv: (i32, i32), full_pel: bool| {
            if full_pel {
                (mv.0 * 2, mv.1 * 2)
            } else {
                mv
            }
        };

        let (fh, fv) = scale(forward_mv, full_pel_forward);
        let (bh, bv) = scale(backward_mv, full_pel_backward);

        let luma_row = row * 16;
        let luma_col = col * 16;
        let chroma_row = row * 8;
        let chroma_col = col * 8;

        let [f0, f1, f2] = &mut self.frames;
        let (current, forward, backward) = match (self.current_idx, self.forward_idx, self.backward_idx) {
            (0, 1, 2) => (f0, &*f1, &*f2),
            (0, 2, 1) => (f0, &*f2, &*f1),
            (1, 0, 2) => (f1, &*f0, &*f2),
            (1, 2, 0) => (f1, &*f2, &*f0),
            (2, 0, 1) => (f2, &*f0, &*f1),
            (2, 1, 0) => (f2, &*f1, &*f0),
            _ => return,
        };

        if has_forward || !has_backward {
            predict_block(&mut current.y, luma_row, luma_col, &forward.y, fh, fv, 16, 16, false);
            predict_block(
                &mut current.cb,
                chroma_row,
                chroma_col,
                &forward.cb,
                fh / 2,
                fv / 2,
                8,
                8,
                false,
            );
            predict_block(
                &mut current.cr,
                chroma_row,
                chroma_col,
                &forward.cr,
                fh / 2,
                fv / 2,
                8,
                8,
                false,
            );
        }
        if has_backward {
            let interpolate = has_forward;
            predict_block(&mut current.y, luma_row, luma_col, &backward.y, bh, bv, 16, 16, interpolate);
            predict_block(
                &mut current.cb,
                chroma_row,
                chroma_col,
                &backward.cb,
                bh / 2,
                bv / 2,
                8,
                8,
                interpolate,
            );
            predict_block(
                &mut current.cr,
                chroma_row,
                chroma_col,
                &backward.cr,
                bh / 2,
                bv / 2,
                8,
                8,
                interpolate,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_decoder_has_no_header() {
        let decoder = VideoDecoder::new(BitBuffer::from_slice(Vec::new()));
        assert!(!decoder.has_header());
        assert_eq!(decoder.width(), 0);
    }

    #[test]
    fn empty_stream_ends_immediately() {
        let mut decoder = VideoDecoder::new(BitBuffer::from_slice(Vec::new()));
        assert!(decoder.decode().is_none());
        assert!(decoder.has_ended());
    }
}
