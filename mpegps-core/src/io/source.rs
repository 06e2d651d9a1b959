// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io;

/// A `MediaSource` is a composite trait of `std::io::Read` and `std::io::Seek`. Seeking is an
/// optional capability; support for it can be checked with `is_seekable`.
pub trait MediaSource: io::Read + io::Seek {
    /// Returns whether the source is seekable.
    fn is_seekable(&self) -> bool;

    /// Returns the total length in bytes, if known ahead of time.
    fn len(&self) -> Option<u64>;
}

impl MediaSource for std::fs::File {
    fn is_seekable(&self) -> bool {
        true
    }

    fn len(&self) -> Option<u64> {
        self.metadata().ok().map(|md| md.len())
    }
}

impl<T: AsRef<[u8]>> MediaSource for io::Cursor<T> {
    fn is_seekable(&self) -> bool {
        true
    }

    fn len(&self) -> Option<u64> {
        Some(self.get_ref().as_ref().len() as u64)
    }
}
