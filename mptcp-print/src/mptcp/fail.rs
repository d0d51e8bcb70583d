// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//! MP_FAIL and MP_FASTCLOSE.
//!
//! Both options share one layout: a reserved octet followed by a 64-bit
//! value.

use core::fmt;

use crate::error::{ValidationError, ValidationErrorClass};
use crate::tcp::TcpFlags;

use super::{Cursor, Subtype};

const FAIL_FASTCLOSE_LEN: usize = 12;

fn parse_reserved_u64(opt: &[u8], subtype: Subtype) -> Result<(u8, u64), ValidationError> {
    if opt.len() != FAIL_FASTCLOSE_LEN {
        return Err(ValidationError::new(
            subtype.name(),
            ValidationErrorClass::InvalidSize,
            "option must be 12 bytes",
        ));
    }

    let mut cursor = Cursor::new(opt, subtype);
    let reserved = cursor.read_u8()?;
    let value = cursor.read_u64()?;
    Ok((reserved, value))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailOpt {
    reserved: u8,
    dsn: u64,
}

impl FailOpt {
    pub fn parse(opt: &[u8], _flags: TcpFlags) -> Result<Self, ValidationError> {
        let (reserved, dsn) = parse_reserved_u64(opt, Subtype::Fail)?;
        Ok(Self { reserved, dsn })
    }

    #[inline]
    pub fn reserved(&self) -> u8 {
        self.reserved
    }

    /// The data sequence number at which the checksum failure was detected.
    #[inline]
    pub fn dsn(&self) -> u64 {
        self.dsn
    }
}

impl fmt::Display for FailOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " seq {}", self.dsn)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FastCloseOpt {
    reserved: u8,
    receiver_key: u64,
}

impl FastCloseOpt {
    pub fn parse(opt: &[u8], _flags: TcpFlags) -> Result<Self, ValidationError> {
        let (reserved, receiver_key) = parse_reserved_u64(opt, Subtype::FastClose)?;
        Ok(Self {
            reserved,
            receiver_key,
        })
    }

    #[inline]
    pub fn reserved(&self) -> u8 {
        self.reserved
    }

    #[inline]
    pub fn receiver_key(&self) -> u64 {
        self.receiver_key
    }
}

impl fmt::Display for FastCloseOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " key 0x{:x}", self.receiver_key)
    }
}
