// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod bitbuffer;
mod source;

pub use bitbuffer::{BitBuffer, SourceMode, VlcEntry, INVALID_CODE};
pub use source::MediaSource;
