// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//! ADD_ADDR and REMOVE_ADDR: address advertisement and withdrawal.

use core::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use mptcp_common::{ipv4_string, ipv6_string};

use crate::error::{ValidationError, ValidationErrorClass};
use crate::tcp::TcpFlags;

use super::{Cursor, Subtype};

/// An advertised address, kept as the octets carried on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddrOctets {
    V4([u8; 4]),
    V6([u8; 16]),
}

impl From<AddrOctets> for IpAddr {
    fn from(octets: AddrOctets) -> Self {
        match octets {
            AddrOctets::V4(v4) => IpAddr::V4(Ipv4Addr::from(v4)),
            AddrOctets::V6(v6) => IpAddr::V6(Ipv6Addr::from(v6)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddAddrOpt {
    addr_id: u8,
    addr: AddrOctets,
    port: Option<u16>,
}

impl AddAddrOpt {
    pub const V4_LEN: usize = 8;
    pub const V4_PORT_LEN: usize = 10;
    pub const V6_LEN: usize = 20;
    pub const V6_PORT_LEN: usize = 22;

    pub fn parse(opt: &[u8], _flags: TcpFlags) -> Result<Self, ValidationError> {
        let mut cursor = Cursor::new(opt, Subtype::AddAddr);
        let ipver = cursor.subtype_bits()?;
        let valid = match ipver {
            4 => matches!(opt.len(), Self::V4_LEN | Self::V4_PORT_LEN),
            6 => matches!(opt.len(), Self::V6_LEN | Self::V6_PORT_LEN),
            _ => {
                return Err(ValidationError::new(
                    Subtype::AddAddr.name(),
                    ValidationErrorClass::InvalidValue,
                    "ADD_ADDR IP version must be 4 or 6",
                ))
            }
        };

        if !valid {
            return Err(ValidationError::new(
                Subtype::AddAddr.name(),
                ValidationErrorClass::InvalidSize,
                "ADD_ADDR length does not match its IP version",
            ));
        }

        let addr_id = cursor.read_u8()?;
        let addr = if ipver == 4 {
            AddrOctets::V4(cursor.read_array()?)
        } else {
            AddrOctets::V6(cursor.read_array()?)
        };

        // Lengths with a port are the only ones not divisible by 4
        let port = if opt.len() % 4 != 0 {
            Some(cursor.read_u16()?)
        } else {
            None
        };

        Ok(Self {
            addr_id,
            addr,
            port,
        })
    }

    #[inline]
    pub fn addr_id(&self) -> u8 {
        self.addr_id
    }

    #[inline]
    pub fn addr(&self) -> IpAddr {
        self.addr.into()
    }

    #[inline]
    pub fn addr_octets(&self) -> AddrOctets {
        self.addr
    }

    #[inline]
    pub fn port(&self) -> Option<u16> {
        self.port
    }
}

impl fmt::Display for AddAddrOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let addr = match &self.addr {
            AddrOctets::V4(v4) => ipv4_string(v4),
            AddrOctets::V6(v6) => ipv6_string(v6),
        };
        write!(f, " id {} {}", self.addr_id, addr)?;

        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        Ok(())
    }
}

/// REMOVE_ADDR, borrowing the address ids from the option buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoveAddrOpt<'a> {
    addr_ids: &'a [u8],
}

impl<'a> RemoveAddrOpt<'a> {
    /// Shortest accepted option: one address id.
    pub const MIN_LEN: usize = 4;

    pub fn parse(opt: &'a [u8], _flags: TcpFlags) -> Result<Self, ValidationError> {
        if opt.len() < Self::MIN_LEN {
            return Err(ValidationError::new(
                Subtype::RemoveAddr.name(),
                ValidationErrorClass::InvalidSize,
                "REMOVE_ADDR option holds no address ids",
            ));
        }

        let mut cursor = Cursor::new(opt, Subtype::RemoveAddr);
        Ok(Self {
            addr_ids: cursor.rest(),
        })
    }

    #[inline]
    pub fn addr_ids(&self) -> &'a [u8] {
        self.addr_ids
    }
}

impl fmt::Display for RemoveAddrOpt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(" id")?;
        for id in self.addr_ids {
            write!(f, " {}", id)?;
        }
        Ok(())
    }
}
