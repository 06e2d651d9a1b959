// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use mpegps_core::io::BitBuffer;

/// Start code introducing a pack header.
pub const PACK_START_CODE: u8 = 0xba;
/// Start code introducing a system header.
pub const SYSTEM_HEADER_START_CODE: u8 = 0xbb;
/// Program stream end code.
pub const PROGRAM_END_CODE: u8 = 0xb9;
/// The (sole) video elementary stream id this demuxer recognizes.
pub const VIDEO_STREAM_ID: u8 = 0xe0;
/// Private stream 1, passed through opaquely.
pub const PRIVATE_STREAM_1_ID: u8 = 0xbd;
/// Audio elementary stream ids this demuxer recognizes (up to 5 Layer II streams).
pub const AUDIO_STREAM_ID_RANGE: std::ops::RangeInclusive<u8> = 0xc0..=0xc4;

/// Reads the fields of a pack header following its already-consumed `00 00 01 ba` start code.
/// The system clock reference is parsed (to keep the bitstream position correct) but is not
/// currently surfaced; only the side effect of leaving the cursor past the header matters here.
pub fn read_pack_header(buf: &mut BitBuffer) {
    let marker = buf.read(4);
    if marker != 0b0010 {
        log::warn!("pack header: unexpected leading bits {marker:#06b}");
    }

    let scr_32_30 = u64::from(buf.read(3));
    buf.skip(1);
    let scr_29_15 = u64::from(buf.read(15));
    buf.skip(1);
    let scr_14_0 = u64::from(buf.read(15));
    buf.skip(1);
    buf.skip(9); // SCR extension
    buf.skip(1);
    let _scr = (scr_32_30 << 30) | (scr_29_15 << 15) | scr_14_0;

    buf.skip(22); // mux_rate
    buf.skip(1); // marker_bit
}

/// Reads the fields of a system header following its already-consumed `00 00 01 bb` start code.
/// Returns `(num_audio_streams, num_video_streams)` as declared by the header's bound fields.
pub fn read_system_header(buf: &mut BitBuffer) -> (u32, u32) {
    let _header_length = buf.read(16);
    buf.skip(1); // marker_bit
    buf.skip(22); // rate_bound
    buf.skip(1); // marker_bit
    let audio_bound = buf.read(6);
    buf.skip(1); // fixed_flag
    buf.skip(1); // CSPS_flag
    buf.skip(1); // system_audio_lock_flag
    buf.skip(1); // system_video_lock_flag
    buf.skip(1); // marker_bit
    let video_bound = buf.read(5);
    buf.skip(1); // packet_rate_restriction_flag / reserved

    (audio_bound, video_bound)
}
