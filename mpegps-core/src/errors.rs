// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::error;
use std::fmt;
use std::io;
use std::result;

/// A list of generic reasons why a seek may fail.
#[derive(Debug)]
pub enum SeekErrorKind {
    /// The stream is not seekable at all.
    Unseekable,
    /// The stream can only be seeked forward.
    ForwardOnly,
    /// The timestamp to seek to is out of range.
    OutOfRange,
}

impl SeekErrorKind {
    fn as_str(&self) -> &'static str {
        match *self {
            SeekErrorKind::Unseekable => "stream is not seekable",
            SeekErrorKind::ForwardOnly => "stream can only be seeked forward",
            SeekErrorKind::OutOfRange => "requested seek timestamp is out-of-range for stream",
        }
    }
}

/// Enumerates the errors this crate reports. Only raised for conditions a caller cannot simply
/// retry past: construction failures, I/O errors from a caller-supplied source, and programmer
/// errors such as an out-of-range stream index. Recoverable bitstream conditions (underflow,
/// malformed header, corruption inside a macroblock) are never raised as `MpegpsError`; they are
/// reported by the relevant decoder returning `None`/`false`.
#[derive(Debug)]
pub enum MpegpsError {
    /// An IO error occurred while reading, writing, or seeking the source.
    IoError(io::Error),
    /// The stream contained malformed data that could not be decoded or demuxed.
    DecodeError(&'static str),
    /// The stream could not be seeked.
    SeekError(SeekErrorKind),
    /// An unsupported container or codec feature was encountered.
    Unsupported(&'static str),
    /// A caller-supplied argument (e.g. a stream index) was out of range.
    LimitError(&'static str, usize),
}

impl fmt::Display for MpegpsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MpegpsError::IoError(ref err) => err.fmt(f),
            MpegpsError::DecodeError(msg) => {
                f.write_str("malformed stream encountered: ")?;
                f.write_str(msg)
            }
            MpegpsError::SeekError(ref kind) => {
                f.write_str("seek failed: ")?;
                f.write_str(kind.as_str())
            }
            MpegpsError::Unsupported(feature) => {
                f.write_str("unsupported feature encountered: ")?;
                f.write_str(feature)
            }
            MpegpsError::LimitError(constraint, limit) => {
                f.write_fmt(format_args!("limit reached: {constraint} ({limit})"))
            }
        }
    }
}

impl error::Error for MpegpsError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            MpegpsError::IoError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for MpegpsError {
    fn from(err: io::Error) -> MpegpsError {
        MpegpsError::IoError(err)
    }
}

pub type Result<T> = result::Result<T, MpegpsError>;

/// Convenience function to create a decode error.
pub fn decode_error<T>(desc: &'static str) -> Result<T> {
    Err(MpegpsError::DecodeError(desc))
}

/// Convenience function to create a seek error.
pub fn seek_error<T>(kind: SeekErrorKind) -> Result<T> {
    Err(MpegpsError::SeekError(kind))
}

/// Convenience function to create an unsupported-feature error.
pub fn unsupported_error<T>(feature: &'static str) -> Result<T> {
    Err(MpegpsError::Unsupported(feature))
}

/// Convenience function to create a limit error.
pub fn limit_error<T>(constraint: &'static str, limit: usize) -> Result<T> {
    Err(MpegpsError::LimitError(constraint, limit))
}
