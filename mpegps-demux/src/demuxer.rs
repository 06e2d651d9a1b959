// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use log::debug;

use mpegps_core::io::{BitBuffer, INVALID_CODE};
use mpegps_core::time::INVALID_TS;

use crate::header::{
    read_pack_header, read_system_header, AUDIO_STREAM_ID_RANGE, PACK_START_CODE,
    PRIVATE_STREAM_1_ID, PROGRAM_END_CODE, SYSTEM_HEADER_START_CODE, VIDEO_STREAM_ID,
};
use crate::packet::{Packet, StreamKind};
use crate::pes::read_pes_packet;

const MIN_SEEK_WINDOW: u64 = 64 * 1024;
const MAX_SEEK_WINDOW: u64 = 4 * 1024 * 1024;
const MAX_SEEK_PROBES: u32 = 32;

/// Demultiplexes an MPEG-1 Program Stream into per-stream [`Packet`]s.
pub struct Demuxer {
    buf: BitBuffer,
    has_pack_header: bool,
    has_system_header: bool,
    num_audio_streams: u32,
    num_video_streams: u32,
    duration_cache: Option<f64>,
}

impl Demuxer {
    pub fn new(buf: BitBuffer) -> Self {
        Demuxer {
            buf,
            has_pack_header: false,
            has_system_header: false,
            num_audio_streams: 0,
            num_video_streams: 0,
            duration_cache: None,
        }
    }

    pub fn has_headers(&self) -> bool {
        self.has_pack_header && self.has_system_header
    }

    pub fn has_ended(&self) -> bool {
        self.buf.has_ended()
    }

    pub fn num_audio_streams(&self) -> u32 {
        self.num_audio_streams
    }

    pub fn num_video_streams(&self) -> u32 {
        self.num_video_streams
    }

    /// Returns the next demultiplexed packet, skipping over pack/system headers and any stream
    /// id this demuxer doesn't recognize. Returns `None` at end of stream.
    pub fn decode(&mut self) -> Option<Packet> {
        loop {
            let code = self.buf.next_start_code();
            if code == INVALID_CODE {
                return None;
            }
            let code = code as u8;

            match code {
                PACK_START_CODE => {
                    read_pack_header(&mut self.buf);
                    self.has_pack_header = true;
                }
                SYSTEM_HEADER_START_CODE => {
                    let (audio, video) = read_system_header(&mut self.buf);
                    self.num_audio_streams = audio;
                    self.num_video_streams = video;
                    self.has_system_header = true;
                }
                PROGRAM_END_CODE => return None,
                VIDEO_STREAM_ID => return read_pes_packet(&mut self.buf, code, StreamKind::Video),
                PRIVATE_STREAM_1_ID => {
                    return read_pes_packet(&mut self.buf, code, StreamKind::Private)
                }
                c if AUDIO_STREAM_ID_RANGE.contains(&c) => {
                    return read_pes_packet(&mut self.buf, code, StreamKind::Audio)
                }
                _ => continue,
            }
        }
    }

    pub fn rewind(&mut self) -> bool {
        self.has_pack_header = false;
        self.has_system_header = false;
        self.buf.rewind()
    }

    /// Rewinds, decodes until a packet of `kind` carries a valid PTS, then restores the cursor
    /// to where it was before the call.
    pub fn get_start_time(&mut self, kind: StreamKind) -> f64 {
        let resume_pos = self.buf.tell();
        if !self.rewind() {
            return INVALID_TS;
        }

        let mut result = INVALID_TS;
        while let Some(pkt) = self.decode() {
            if pkt.kind == kind && pkt.pts >= 0.0 {
                result = pkt.pts;
                break;
            }
        }

        self.buf.seek(resume_pos);
        result
    }

    /// Estimates stream duration by scanning a growing tail window (64 KiB doubling up to 4 MiB)
    /// for the last packet of `kind` carrying a valid PTS. Cached after the first call.
    pub fn get_duration(&mut self, kind: StreamKind) -> f64 {
        if let Some(cached) = self.duration_cache {
            return cached;
        }

        let Some(size) = self.buf.size() else {
            return INVALID_TS;
        };

        let start_time = self.get_start_time(kind);
        if start_time < 0.0 {
            return INVALID_TS;
        }

        let resume_pos = self.buf.tell();

        let mut window = MIN_SEEK_WINDOW;
        let mut last_pts = INVALID_TS;
        while window <= MAX_SEEK_WINDOW && last_pts < 0.0 {
            let tail_pos = size.saturating_sub(window);
            if !self.buf.seek(tail_pos) {
                break;
            }
            self.has_pack_header = false;
            self.has_system_header = false;

            while let Some(pkt) = self.decode() {
                if pkt.kind == kind && pkt.pts >= 0.0 {
                    last_pts = pkt.pts;
                }
            }
            window *= 2;
        }

        self.buf.seek(resume_pos);

        if last_pts < 0.0 {
            return INVALID_TS;
        }

        let duration = last_pts - start_time;
        self.duration_cache = Some(duration);
        duration
    }

    /// Binary-probe seek to `target_s`. When `force_intra` is set, only video packets whose
    /// payload begins with an intra-coded picture header are accepted as candidates (this
    /// parameter is meaningless for `StreamKind::Audio`, which has no picture types).
    ///
    /// The probe repeatedly estimates a byte position from a running byterate, scans forward
    /// collecting the last in-range candidate, and narrows in on the target; see `DESIGN.md` for
    /// a known dead branch in the widen-on-miss fallback, preserved intentionally.
    pub fn seek(&mut self, target_s: f64, kind: StreamKind, force_intra: bool) -> Option<Packet> {
        let size = self.buf.size()?;
        let duration = self.get_duration(kind);
        if duration <= 0.0 {
            return None;
        }

        let mut byterate = size as f64 / duration;
        let mut span = duration / 2.0;
        let mut cur_time = 0.0_f64;
        let mut cur_pos = 0u64;
        // Intended to latch `true` once any packet with a usable PTS is observed, widening the
        // search span on a miss rather than treating it the same as "found nothing at all".
        // Never actually set below — see DESIGN.md's Open Question decisions.
        let found_packet_with_pts = false;
        let mut best: Option<Packet> = None;

        debug!("seeking to ts={target_s} (estimated byterate={byterate})");

        for _ in 0..MAX_SEEK_PROBES {
            let target_pos = (cur_pos as f64 + (target_s - cur_time - span) * byterate).max(0.0);
            if !self.buf.seek(target_pos as u64) {
                break;
            }
            self.has_pack_header = false;
            self.has_system_header = false;

            let scan_start = self.buf.tell();
            let mut round_best: Option<Packet> = None;

            while let Some(pkt) = self.decode() {
                if pkt.kind != kind {
                    continue;
                }
                if pkt.pts < 0.0 {
                    continue;
                }
                if force_intra && !is_intra_picture(&pkt) {
                    continue;
                }

                if pkt.pts <= target_s {
                    cur_time = pkt.pts;
                    cur_pos = self.buf.tell();
                    round_best = Some(pkt);
                }
                else {
                    let delta_pos = self.buf.tell().saturating_sub(scan_start) as f64;
                    let delta_t = pkt.pts - cur_time;
                    if delta_t > 0.0 {
                        byterate = delta_pos / delta_t;
                    }
                    break;
                }
            }

            if let Some(pkt) = round_best {
                let hit = (cur_time - target_s).abs() < 0.5;
                best = Some(pkt);
                if hit {
                    break;
                }
            }
            else if found_packet_with_pts {
                span *= 2.0;
            }
            else {
                span *= 2.0;
            }
        }

        best
    }
}

/// Tests whether a video packet's payload begins with an intra-coded picture header, per the
/// `00 00 01 00 .. .. <picture_coding_type>` layout (picture type occupies bits 3..5 of the 6th
/// byte after the start code).
fn is_intra_picture(pkt: &Packet) -> bool {
    if pkt.kind != StreamKind::Video {
        return false;
    }
    pkt.data
        .windows(6)
        .any(|w| w[0] == 0 && w[1] == 0 && w[2] == 1 && w[3] == 0x00 && (w[5] & 0x38) == 0x08)
}
