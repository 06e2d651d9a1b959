// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A single dependency for decoding MPEG-1 Program Stream media: demux a `.mpg`/`.dat`/`.vob`-style
//! container into video and audio elementary streams, then decode MPEG-1 Part 2 video and MPEG-1
//! Audio Layer II with [`VideoDecoder`] and [`AudioDecoder`].
//!
//! ```no_run
//! use mpegps::{BitBuffer, Demuxer, StreamKind, VideoDecoder};
//!
//! # fn run() -> std::io::Result<()> {
//! let mut demux = Demuxer::new(BitBuffer::from_file("movie.mpg")?);
//! let mut video = VideoDecoder::new(BitBuffer::ring());
//! while let Some(packet) = demux.decode() {
//!     if packet.kind == StreamKind::Video {
//!         video.decode();
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use mpegps_audio::{AudioDecoder, ChannelMode};
pub use mpegps_core::errors::{MpegpsError, Result};
pub use mpegps_core::io::{BitBuffer, MediaSource};
pub use mpegps_core::{Frame, Plane, Samples};
pub use mpegps_demux::{Demuxer, Packet, StreamKind};
pub use mpegps_video::{PictureType, VideoDecoder};
