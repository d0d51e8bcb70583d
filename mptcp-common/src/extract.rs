// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Big-endian field extraction.
//!
//! Option buffers are rarely aligned, so every read goes through a byte array
//! copy rather than a pointer cast. Reads that would run past the end of the
//! slice return `None`.

/// Borrows `T` bytes of `bytes` starting at `start` as a fixed-size array.
#[inline]
pub fn get_array<const T: usize>(bytes: &[u8], start: usize) -> Option<&[u8; T]> {
    bytes.get(start..start.checked_add(T)?)?.try_into().ok()
}

/// Copies `T` bytes of `bytes` starting at `start` into an owned array.
#[inline]
pub fn to_array<const T: usize>(bytes: &[u8], start: usize) -> Option<[u8; T]> {
    Some(*get_array(bytes, start)?)
}

#[inline]
pub fn be_u16(bytes: &[u8], start: usize) -> Option<u16> {
    to_array(bytes, start).map(u16::from_be_bytes)
}

#[inline]
pub fn be_u32(bytes: &[u8], start: usize) -> Option<u32> {
    to_array(bytes, start).map(u32::from_be_bytes)
}

#[inline]
pub fn be_u64(bytes: &[u8], start: usize) -> Option<u64> {
    to_array(bytes, start).map(u64::from_be_bytes)
}
