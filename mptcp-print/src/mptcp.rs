// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//! Multipath TCP option dispatch.
//!
//! Every MPTCP option shares a three-octet header: the TCP option kind, the
//! total option length, and a byte whose upper nibble selects the MPTCP
//! subtype. The remaining nibble and any following octets are interpreted by
//! the subtype decoders in the submodules of this module.

use core::fmt;

use mptcp_common::{be_u16, be_u32, be_u64, to_array};

use crate::error::{Result, ValidationError, ValidationErrorClass};
use crate::tcp::TcpFlags;

pub mod addr;
pub mod capable;
pub mod dss;
pub mod fail;
pub mod join;
pub mod prio;

pub use addr::{AddAddrOpt, AddrOctets, RemoveAddrOpt};
pub use capable::{CapableFlags, CapableOpt};
pub use dss::{dss_len, DsnInfo, DssFlags, DssOpt};
pub use fail::{FailOpt, FastCloseOpt};
pub use join::{JoinFlags, JoinOpt, JoinPayload};
pub use prio::{PrioFlags, PrioOpt};

pub const MP_CAPABLE: u8 = 0x0;
pub const MP_JOIN: u8 = 0x1;
pub const MP_DSS: u8 = 0x2;
pub const MP_ADD_ADDR: u8 = 0x3;
pub const MP_REMOVE_ADDR: u8 = 0x4;
pub const MP_PRIO: u8 = 0x5;
pub const MP_FAIL: u8 = 0x6;
pub const MP_FASTCLOSE: u8 = 0x7;

/// Length of the kind, length and subtype octets common to every option.
pub const MPTCP_HEADER_LEN: usize = 3;

pub(crate) const SUBTYPE_OFFSET: usize = 2;

/// The MPTCP option subtype, taken from the upper nibble of the third octet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subtype {
    Capable,
    Join,
    Dss,
    AddAddr,
    RemoveAddr,
    Prio,
    Fail,
    FastClose,
    /// Any subtype above [`MP_FASTCLOSE`].
    Unknown,
}

impl Subtype {
    /// Maps a subtype value to its variant.
    ///
    /// Values beyond the last known subtype are clamped to
    /// [`Subtype::Unknown`] rather than wrapped.
    #[inline]
    pub fn from_value(value: u8) -> Self {
        match value {
            MP_CAPABLE => Self::Capable,
            MP_JOIN => Self::Join,
            MP_DSS => Self::Dss,
            MP_ADD_ADDR => Self::AddAddr,
            MP_REMOVE_ADDR => Self::RemoveAddr,
            MP_PRIO => Self::Prio,
            MP_FAIL => Self::Fail,
            MP_FASTCLOSE => Self::FastClose,
            _ => Self::Unknown,
        }
    }

    /// Reads the subtype of a raw option, rejecting options shorter than the
    /// common header.
    pub fn of(opt: &[u8]) -> core::result::Result<Self, ValidationError> {
        if opt.len() < MPTCP_HEADER_LEN {
            return Err(ValidationError::new(
                "mptcp",
                ValidationErrorClass::InsufficientBytes,
                "option too short to hold an MPTCP subtype",
            ));
        }

        Ok(Self::from_value(opt[SUBTYPE_OFFSET] >> 4))
    }

    /// The short name used when printing the subtype.
    pub fn name(self) -> &'static str {
        match self {
            Self::Capable => "capable",
            Self::Join => "join",
            Self::Dss => "dss",
            Self::AddAddr => "add-addr",
            Self::RemoveAddr => "rem-addr",
            Self::Prio => "prio",
            Self::Fail => "fail",
            Self::FastClose => "fast-close",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded MPTCP option.
///
/// Each variant is only constructed once the option's length, subtype-specific
/// flags and TCP flag context have been validated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MptcpOption<'a> {
    Capable(CapableOpt),
    Join(JoinOpt),
    Dss(DssOpt),
    AddAddr(AddAddrOpt),
    RemoveAddr(RemoveAddrOpt<'a>),
    Prio(PrioOpt),
    Fail(FailOpt),
    FastClose(FastCloseOpt),
    /// An option with an unrecognised subtype, holding the raw subtype value.
    Unknown(u8),
}

impl<'a> MptcpOption<'a> {
    /// Decodes a single MPTCP option.
    ///
    /// `opt` must span exactly the option: its length is taken to be the
    /// option length. `flags` are the flags of the TCP segment carrying it.
    pub fn parse(opt: &'a [u8], flags: TcpFlags) -> core::result::Result<Self, ValidationError> {
        let subtype = Subtype::of(opt).map_err(|e| rejected(opt, flags, e))?;
        Self::parse_subtype(subtype, opt, flags)
    }

    fn parse_subtype(
        subtype: Subtype,
        opt: &'a [u8],
        flags: TcpFlags,
    ) -> core::result::Result<Self, ValidationError> {
        log::trace!("decoding MPTCP {} option, {} bytes", subtype, opt.len());

        let res = match subtype {
            Subtype::Capable => CapableOpt::parse(opt, flags).map(Self::Capable),
            Subtype::Join => JoinOpt::parse(opt, flags).map(Self::Join),
            Subtype::Dss => DssOpt::parse(opt, flags).map(Self::Dss),
            Subtype::AddAddr => AddAddrOpt::parse(opt, flags).map(Self::AddAddr),
            Subtype::RemoveAddr => RemoveAddrOpt::parse(opt, flags).map(Self::RemoveAddr),
            Subtype::Prio => PrioOpt::parse(opt, flags).map(Self::Prio),
            Subtype::Fail => FailOpt::parse(opt, flags).map(Self::Fail),
            Subtype::FastClose => FastCloseOpt::parse(opt, flags).map(Self::FastClose),
            Subtype::Unknown => Ok(Self::Unknown(opt[SUBTYPE_OFFSET] >> 4)),
        };

        res.map_err(|e| rejected(opt, flags, e))
    }

    pub fn subtype(&self) -> Subtype {
        match self {
            Self::Capable(_) => Subtype::Capable,
            Self::Join(_) => Subtype::Join,
            Self::Dss(_) => Subtype::Dss,
            Self::AddAddr(_) => Subtype::AddAddr,
            Self::RemoveAddr(_) => Subtype::RemoveAddr,
            Self::Prio(_) => Subtype::Prio,
            Self::Fail(_) => Subtype::Fail,
            Self::FastClose(_) => Subtype::FastClose,
            Self::Unknown(_) => Subtype::Unknown,
        }
    }

    /// The option text following the subtype name.
    #[inline]
    pub fn body(&self) -> Body<'_, 'a> {
        Body(self)
    }
}

/// Renders the full option fragment: a space, the subtype name, then the body.
impl fmt::Display for MptcpOption<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " {}{}", self.subtype(), self.body())
    }
}

/// Display adapter for the portion of an option's text that follows its name.
#[derive(Clone, Copy, Debug)]
pub struct Body<'o, 'a>(&'o MptcpOption<'a>);

impl fmt::Display for Body<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            MptcpOption::Capable(o) => fmt::Display::fmt(o, f),
            MptcpOption::Join(o) => fmt::Display::fmt(o, f),
            MptcpOption::Dss(o) => fmt::Display::fmt(o, f),
            MptcpOption::AddAddr(o) => fmt::Display::fmt(o, f),
            MptcpOption::RemoveAddr(o) => fmt::Display::fmt(o, f),
            MptcpOption::Prio(o) => fmt::Display::fmt(o, f),
            MptcpOption::Fail(o) => fmt::Display::fmt(o, f),
            MptcpOption::FastClose(o) => fmt::Display::fmt(o, f),
            MptcpOption::Unknown(_) => Ok(()),
        }
    }
}

fn rejected(opt: &[u8], flags: TcpFlags, err: ValidationError) -> ValidationError {
    log::debug!(
        "rejecting MPTCP option (len={}, tcp flags={:?}): {}",
        opt.len(),
        flags,
        err
    );
    err
}

/// Prints a single MPTCP option to `out`.
///
/// The subtype name is written before the rest of the option is validated,
/// so a rejected option leaves ` <name>` in `out`. Callers that want nothing
/// written for a malformed option should use [`format_option`] instead.
pub fn mptcp_print<W: fmt::Write>(out: &mut W, opt: &[u8], flags: TcpFlags) -> Result<()> {
    let subtype = Subtype::of(opt).map_err(|e| rejected(opt, flags, e))?;
    write!(out, " {}", subtype)?;

    let option = MptcpOption::parse_subtype(subtype, opt, flags)?;
    write!(out, "{}", option.body())?;
    Ok(())
}

/// Prints the option occupying the first `length` bytes of `buffer`.
pub fn mptcp_print_with_len<W: fmt::Write>(
    out: &mut W,
    buffer: &[u8],
    length: usize,
    flags: TcpFlags,
) -> Result<()> {
    let Some(opt) = buffer.get(..length) else {
        return Err(rejected(
            buffer,
            flags,
            ValidationError::new(
                "mptcp",
                ValidationErrorClass::InsufficientBytes,
                "option length exceeds the supplied buffer",
            ),
        )
        .into());
    };

    mptcp_print(out, opt, flags)
}

/// Renders a single MPTCP option, producing no text if it is rejected.
pub fn format_option(opt: &[u8], flags: TcpFlags) -> core::result::Result<String, ValidationError> {
    MptcpOption::parse(opt, flags).map(|option| option.to_string())
}

/// Sequential big-endian reader over a validated option.
///
/// Reads start just past the common header and only ever move forward.
#[derive(Debug)]
pub(crate) struct Cursor<'a> {
    opt: &'a [u8],
    idx: usize,
    subtype: Subtype,
}

impl<'a> Cursor<'a> {
    #[inline]
    pub(crate) fn new(opt: &'a [u8], subtype: Subtype) -> Self {
        Self {
            opt,
            idx: MPTCP_HEADER_LEN,
            subtype,
        }
    }

    fn truncated(&self) -> ValidationError {
        ValidationError::new(
            self.subtype.name(),
            ValidationErrorClass::InsufficientBytes,
            "option ends before a required field",
        )
    }

    fn advance<T>(&mut self, value: Option<T>, len: usize) -> core::result::Result<T, ValidationError> {
        let value = value.ok_or_else(|| self.truncated())?;
        self.idx += len;
        Ok(value)
    }

    /// The low nibble of the subtype octet, whose meaning depends on the
    /// subtype.
    pub(crate) fn subtype_bits(&self) -> core::result::Result<u8, ValidationError> {
        self.opt
            .get(SUBTYPE_OFFSET)
            .map(|b| b & 0x0f)
            .ok_or_else(|| self.truncated())
    }

    pub(crate) fn read_u8(&mut self) -> core::result::Result<u8, ValidationError> {
        let value = self.opt.get(self.idx).copied();
        self.advance(value, 1)
    }

    pub(crate) fn read_u16(&mut self) -> core::result::Result<u16, ValidationError> {
        let value = be_u16(self.opt, self.idx);
        self.advance(value, 2)
    }

    pub(crate) fn read_u32(&mut self) -> core::result::Result<u32, ValidationError> {
        let value = be_u32(self.opt, self.idx);
        self.advance(value, 4)
    }

    pub(crate) fn read_u64(&mut self) -> core::result::Result<u64, ValidationError> {
        let value = be_u64(self.opt, self.idx);
        self.advance(value, 8)
    }

    pub(crate) fn read_array<const N: usize>(&mut self) -> core::result::Result<[u8; N], ValidationError> {
        let value = to_array(self.opt, self.idx);
        self.advance(value, N)
    }

    /// Borrows every byte not yet read.
    pub(crate) fn rest(&mut self) -> &'a [u8] {
        let rest = self.opt.get(self.idx..).unwrap_or_default();
        self.idx = self.opt.len();
        rest
    }
}
