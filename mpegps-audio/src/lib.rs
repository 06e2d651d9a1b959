// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MPEG-1 Audio Layer II elementary-stream decoder: header sync, bit allocation, scale factors,
//! and 32-subband polyphase synthesis, producing interleaved-by-channel PCM.

#![forbid(unsafe_code)]

mod decoder;
mod header;
mod synthesis;
mod tables;

pub use decoder::AudioDecoder;
pub use header::ChannelMode;
pub use mpegps_core::Samples;
