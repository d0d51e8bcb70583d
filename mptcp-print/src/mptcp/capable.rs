// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//! MP_CAPABLE: connection setup and key exchange.

use core::fmt;

use bitflags::bitflags;

use crate::error::{ValidationError, ValidationErrorClass};
use crate::tcp::TcpFlags;

use super::{Cursor, Subtype};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct CapableFlags: u8 {
        /// Checksum Required flag.
        const C = 0b_1000_0000;
        /// Extensibility flag.
        const B = 0b_0100_0000;
        /// Unassigned.
        const D = 0b_0010_0000;
        /// Unassigned.
        const E = 0b_0001_0000;
        /// Unassigned.
        const F = 0b_0000_1000;
        /// Unassigned.
        const G = 0b_0000_0100;
        /// Unassigned.
        const H = 0b_0000_0010;
        /// HMAC-SHA1 flag.
        const S = 0b_0000_0001;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapableOpt {
    version: u8,
    flags: CapableFlags,
    sender_key: Option<u64>,
    receiver_key: Option<u64>,
}

impl CapableOpt {
    /// Option length on a SYN or SYN/ACK, carrying the sender's key.
    pub const SYN_LEN: usize = 12;
    /// Option length on the third ACK, echoing both keys.
    pub const ACK_LEN: usize = 20;

    pub fn parse(opt: &[u8], flags: TcpFlags) -> Result<Self, ValidationError> {
        let syn_ack = flags & (TcpFlags::SYN | TcpFlags::ACK);
        match opt.len() {
            Self::SYN_LEN if flags.contains(TcpFlags::SYN) => (),
            Self::ACK_LEN if syn_ack == TcpFlags::ACK => (),
            Self::SYN_LEN | Self::ACK_LEN => {
                return Err(ValidationError::new(
                    Subtype::Capable.name(),
                    ValidationErrorClass::InvalidFlags,
                    "MP_CAPABLE length does not match the TCP handshake step",
                ))
            }
            _ => {
                return Err(ValidationError::new(
                    Subtype::Capable.name(),
                    ValidationErrorClass::InvalidSize,
                    "MP_CAPABLE option must be 12 or 20 bytes",
                ))
            }
        }

        let mut cursor = Cursor::new(opt, Subtype::Capable);
        let version = cursor.subtype_bits()?;
        let flags = CapableFlags::from_bits_retain(cursor.read_u8()?);

        // Only version 0 has a known layout past the flags
        if version != 0 {
            return Ok(Self {
                version,
                flags,
                sender_key: None,
                receiver_key: None,
            });
        }

        let sender_key = Some(cursor.read_u64()?);
        let receiver_key = if opt.len() == Self::ACK_LEN {
            Some(cursor.read_u64()?)
        } else {
            None
        };

        Ok(Self {
            version,
            flags,
            sender_key,
            receiver_key,
        })
    }

    #[inline]
    pub fn version(&self) -> u8 {
        self.version
    }

    #[inline]
    pub fn flags(&self) -> CapableFlags {
        self.flags
    }

    #[inline]
    pub fn checksum_required(&self) -> bool {
        self.flags.contains(CapableFlags::C)
    }

    /// The sender's key, or `None` if the option's version is not understood.
    #[inline]
    pub fn sender_key(&self) -> Option<u64> {
        self.sender_key
    }

    #[inline]
    pub fn receiver_key(&self) -> Option<u64> {
        self.receiver_key
    }
}

impl fmt::Display for CapableOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(sender_key) = self.sender_key else {
            return write!(f, " Unknown Version ({})", self.version);
        };

        if self.checksum_required() {
            f.write_str(" csum")?;
        }
        write!(f, " {{0x{:016x}", sender_key)?;
        if let Some(receiver_key) = self.receiver_key {
            write!(f, ",0x{:016x}", receiver_key)?;
        }
        f.write_str("}")
    }
}
