// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use mpegps_core::io::BitBuffer;
use mpegps_core::time::{pts_to_seconds, INVALID_TS};

use crate::packet::{Packet, StreamKind};

/// Decodes one PES packet body, following an already-consumed `00 00 01 <stream_id>` start code.
/// Returns `None` on a malformed packet; the caller resynchronizes by scanning for the next start
/// code, so no attempt is made to skip the remainder of a rejected packet.
pub fn read_pes_packet(buf: &mut BitBuffer, stream_id: u8, kind: StreamKind) -> Option<Packet> {
    let mut length = i32::try_from(buf.read(16)).ok()?;
    if length <= 0 {
        return None;
    }

    length -= buf.skip_bytes(0xff) as i32;

    if buf.peek(2) == 0b01 {
        buf.skip(16); // P-STD buffer scale + size
        length -= 2;
    }

    let pts = match buf.read(2) {
        0b00 => {
            buf.skip(4);
            length -= 1;
            INVALID_TS
        }
        0b10 => {
            let ts = read_timestamp(buf);
            length -= 5;
            ts
        }
        0b11 => {
            let ts = read_timestamp(buf);
            buf.skip(40); // DTS, discarded
            length -= 10;
            ts
        }
        _ => {
            log::warn!("pes packet (stream {stream_id:#x}): invalid pts/dts marker");
            return None;
        }
    };

    if length < 0 {
        log::warn!("pes packet (stream {stream_id:#x}): negative payload length after header");
        return None;
    }

    let data = buf.read_bytes(length as usize).into_boxed_slice();
    Some(Packet { stream_id, kind, pts, data })
}

/// Reads a 33-bit timestamp already positioned after its 2-bit PTS/DTS marker, in the
/// `3 / marker / 15 / marker / 15 / marker` layout common to PTS and DTS fields, and converts it
/// to seconds.
fn read_timestamp(buf: &mut BitBuffer) -> f64 {
    let hi = u64::from(buf.read(3));
    buf.skip(1);
    let mid = u64::from(buf.read(15));
    buf.skip(1);
    let lo = u64::from(buf.read(15));
    buf.skip(1);
    let ticks = (hi << 30) | (mid << 15) | lo;
    pts_to_seconds(ticks)
}
