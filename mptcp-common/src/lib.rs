// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Helpers shared by the MPTCP option printer.
//!
//! None of these routines know anything about MPTCP itself: they pull
//! big-endian integers out of unaligned byte slices and turn raw bytes into
//! printable text.

#![forbid(unsafe_code)]

pub mod addr;
pub mod extract;
pub mod hexdump;

pub use addr::{ipv4_string, ipv6_string};
pub use extract::{be_u16, be_u32, be_u64, get_array, to_array};
pub use hexdump::{hex_bytes, HexBytes};
