// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//! Decoding and trace-style printing of Multipath TCP options.
//!
//! The entry point is [`mptcp_print`], which takes the raw bytes of a single
//! MPTCP option (kind, length, subtype and payload) along with the flag byte
//! of the enclosing TCP segment and writes a short textual summary of the
//! option to any [`core::fmt::Write`] sink:
//!
//! ```
//! use mptcp_print::{mptcp_print, tcp::TcpFlags};
//!
//! let opt = [0x1e, 0x06, 0x40, 0x07, 0x08, 0x09];
//! let mut out = String::new();
//! mptcp_print(&mut out, &opt, TcpFlags::ACK).unwrap();
//! assert_eq!(out, " rem-addr id 7 8 9");
//! ```
//!
//! Options can also be decoded into a typed [`MptcpOption`] without
//! producing any text, or rendered through [`format_option`], which only
//! yields output when the option is well-formed.

pub mod error;
pub mod mptcp;
pub mod tcp;

pub use error::{Error, Result, ValidationError, ValidationErrorClass};
pub use mptcp::{format_option, mptcp_print, mptcp_print_with_len, MptcpOption, Subtype};
