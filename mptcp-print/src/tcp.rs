// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//! The TCP context an MPTCP option is decoded in.
//!
//! This module holds the segment flags consulted by the option decoders and a
//! walker over a raw TCP option area, used to locate and print the MPTCP
//! options a segment carries.

use core::fmt;

use bitflags::bitflags;
use mptcp_common::HexBytes;

use crate::error::Error;
use crate::mptcp::mptcp_print;

pub const TCP_OPT_KIND_EOOL: u8 = 0;
pub const TCP_OPT_KIND_NOP: u8 = 1;
pub const TCP_OPT_KIND_MPTCP: u8 = 30;

bitflags! {
    /// The flag octet of a TCP header.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TcpFlags: u8 {
        const CWR = 0b_1000_0000;
        const ECE = 0b_0100_0000;
        const URG = 0b_0010_0000;
        const ACK = 0b_0001_0000;
        const PSH = 0b_0000_1000;
        const RST = 0b_0000_0100;
        const SYN = 0b_0000_0010;
        const FIN = 0b_0000_0001;
    }
}

impl TcpFlags {
    #[inline]
    pub fn new() -> Self {
        TcpFlags::default()
    }
}

impl From<u8> for TcpFlags {
    fn from(value: u8) -> Self {
        TcpFlags::from_bits_truncate(value)
    }
}

/// A single record of a TCP option area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TcpOption<'a> {
    /// End of Options List.
    ///
    /// Any bytes following this option are padding.
    Eool,
    /// No-Operation, used to align subsequent options.
    Nop,
    /// A kind/length option. `raw` spans the whole option, including its kind
    /// and length octets.
    Sized { kind: u8, raw: &'a [u8] },
    /// Trailing bytes that do not form a well-formed option: either the
    /// length octet is missing, less than 2, or runs past the option area.
    Malformed(&'a [u8]),
}

/// Iterator over the records of a TCP option area.
///
/// Iteration ends after an EOOL option or the first malformed record.
#[derive(Clone, Debug)]
pub struct TcpOptions<'a> {
    remaining: &'a [u8],
}

impl<'a> TcpOptions<'a> {
    #[inline]
    pub fn new(area: &'a [u8]) -> Self {
        Self { remaining: area }
    }
}

impl<'a> Iterator for TcpOptions<'a> {
    type Item = TcpOption<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.remaining;
        let (&kind, rest) = bytes.split_first()?;

        match kind {
            TCP_OPT_KIND_EOOL => {
                self.remaining = &[];
                Some(TcpOption::Eool)
            }
            TCP_OPT_KIND_NOP => {
                self.remaining = rest;
                Some(TcpOption::Nop)
            }
            _ => match bytes.get(1) {
                Some(&len @ 2..) if bytes.len() >= len as usize => {
                    let (raw, rest) = bytes.split_at(len as usize);
                    self.remaining = rest;
                    Some(TcpOption::Sized { kind, raw })
                }
                _ => {
                    self.remaining = &[];
                    Some(TcpOption::Malformed(bytes))
                }
            },
        }
    }
}

/// Prints every option of a TCP option area, separated by commas.
///
/// MPTCP options are printed as `mptcp` followed by the output of
/// [`mptcp_print`]. An MPTCP option that fails validation is followed by
/// ` [bad opt]` and a hex dump of its bytes. Other sized options are printed
/// as `opt-<kind>` with a hex dump of their value.
///
/// Returns the number of MPTCP options that failed validation.
pub fn print_options<W: fmt::Write>(out: &mut W, area: &[u8], flags: TcpFlags) -> Result<usize, fmt::Error> {
    let mut rejected = 0;

    for (idx, option) in TcpOptions::new(area).enumerate() {
        if idx > 0 {
            out.write_char(',')?;
        }

        match option {
            TcpOption::Eool => out.write_str("eol")?,
            TcpOption::Nop => out.write_str("nop")?,
            TcpOption::Sized {
                kind: TCP_OPT_KIND_MPTCP,
                raw,
            } => {
                out.write_str("mptcp")?;
                match mptcp_print(&mut *out, raw, flags) {
                    Ok(()) => (),
                    Err(Error::Validation(_)) => {
                        rejected += 1;
                        write!(out, " [bad opt] 0x{}", HexBytes(raw))?;
                    }
                    Err(Error::Format(e)) => return Err(e),
                }
            }
            TcpOption::Sized { kind, raw } => {
                write!(out, "opt-{}", kind)?;
                if raw.len() > 2 {
                    write!(out, " 0x{}", HexBytes(&raw[2..]))?;
                }
            }
            TcpOption::Malformed(bytes) => {
                log::debug!("malformed TCP option record: {} trailing bytes", bytes.len());
                write!(out, "[bad opt-len] 0x{}", HexBytes(bytes))?;
            }
        }
    }

    Ok(rejected)
}
