// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MPEG-1 video (ISO/IEC 11172-2) elementary-stream decoder: sequence/picture/slice/macroblock
//! state machine, half-pel motion compensation, and a scaled IDCT, producing planar YCbCr 4:2:0
//! frames.

#![forbid(unsafe_code)]

mod block;
mod common;
mod decoder;
mod idct;
mod motion;
mod tables;
mod vlc;

pub use common::PictureType;
pub use decoder::VideoDecoder;
pub use mpegps_core::{Frame, Plane};
