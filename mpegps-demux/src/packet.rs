// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Which elementary stream a [`Packet`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
    /// Private stream 1 (0xBD); passed through opaquely, not demultiplexed further here.
    Private,
}

/// One demultiplexed PES payload.
///
/// Owns its payload bytes (copied out of the demuxer's bit buffer at parse time), so a `Packet`
/// remains valid after the demuxer's next `decode()` call, unlike the `Frame`/`Samples` views
/// handed back by the video/audio decoders.
pub struct Packet {
    pub stream_id: u8,
    pub kind: StreamKind,
    /// Presentation timestamp in seconds, or `mpegps_core::time::INVALID_TS` if none was present.
    pub pts: f64,
    pub data: Box<[u8]>,
}
