// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Demultiplexer for MPEG-1 Program Stream containers: pack and system headers, PES
//! packetization, PTS extraction, and time-based seeking.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod demuxer;
mod header;
mod packet;
mod pes;

pub use demuxer::Demuxer;
pub use packet::{Packet, StreamKind};

#[cfg(test)]
mod tests {
    use super::*;
    use mpegps_core::io::BitBuffer;

    fn pack_header_bytes() -> Vec<u8> {
        let mut b = vec![0x00, 0x00, 0x01, 0xba];
        // '0010' + SCR(33) + marker bits + SCR ext(9) + marker + mux_rate(22) + marker, packed.
        // Exact values don't matter for this fixture beyond being the right bit count (80 bits
        // total after the 4-byte start code -> 6 bytes here to keep byte alignment simple).
        b.extend_from_slice(&[0b0010_0000, 0x00, 0x00, 0x00, 0x00, 0x00]);
        b
    }

    fn system_header_bytes() -> Vec<u8> {
        let mut b = vec![0x00, 0x00, 0x01, 0xbb];
        // header_length (16) + marker + rate_bound(22) + marker + audio_bound(6) + 4 flags +
        // marker + video_bound(5) + 1 bit, packed into 6 bytes (48 bits after the 16-bit length
        // field, i.e. 8 bytes total).
        b.extend_from_slice(&[0x00, 0x06, 0x80, 0x00, 0x00, 0x41, 0x00]);
        b
    }

    fn pes_bytes(stream_id: u8, payload: &[u8]) -> Vec<u8> {
        let mut b = vec![0x00, 0x00, 0x01, stream_id];
        // length = 1 (marker nibble) + payload, no PTS (marker bits '00').
        let length = 1 + payload.len();
        b.extend_from_slice(&(length as u16).to_be_bytes());
        b.push(0b0000_1111); // '00' (no pts) + 4 reserved/marker bits + 2 bits of padding
        b.extend_from_slice(payload);
        b
    }

    #[test]
    fn decodes_headers_then_packet() {
        let mut bytes = pack_header_bytes();
        bytes.extend(system_header_bytes());
        bytes.extend(pes_bytes(0xe0, &[1, 2, 3, 4]));

        let mut demux = Demuxer::new(BitBuffer::from_slice(bytes));
        let pkt = demux.decode().expect("expected a video packet");
        assert_eq!(pkt.kind, StreamKind::Video);
        assert_eq!(&*pkt.data, &[1, 2, 3, 4]);
        assert!(demux.has_headers());
    }

    #[test]
    fn recognizes_audio_stream_ids() {
        let mut bytes = pack_header_bytes();
        bytes.extend(pes_bytes(0xc2, &[9, 9]));

        let mut demux = Demuxer::new(BitBuffer::from_slice(bytes));
        let pkt = demux.decode().expect("expected an audio packet");
        assert_eq!(pkt.kind, StreamKind::Audio);
        assert_eq!(pkt.stream_id, 0xc2);
    }

    #[test]
    fn unknown_stream_id_is_skipped() {
        let mut bytes = pack_header_bytes();
        bytes.extend(pes_bytes(0xbc, &[9])); // program stream map, not handled
        bytes.extend(pes_bytes(0xe0, &[5, 6]));

        let mut demux = Demuxer::new(BitBuffer::from_slice(bytes));
        let pkt = demux.decode().expect("expected the video packet past the skipped one");
        assert_eq!(pkt.kind, StreamKind::Video);
        assert_eq!(&*pkt.data, &[5, 6]);
    }

    #[test]
    fn rewind_replays_the_same_packets() {
        let mut bytes = pack_header_bytes();
        bytes.extend(pes_bytes(0xe0, &[7, 8]));

        let mut demux = Demuxer::new(BitBuffer::from_slice(bytes));
        let first = demux.decode().unwrap();
        assert!(demux.decode().is_none());
        assert!(demux.rewind());
        let second = demux.decode().unwrap();
        assert_eq!(&*first.data, &*second.data);
    }
}
