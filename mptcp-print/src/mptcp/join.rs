// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//! MP_JOIN: adding a subflow to an existing connection.

use core::fmt;

use bitflags::bitflags;
use mptcp_common::HexBytes;

use crate::error::{ValidationError, ValidationErrorClass};
use crate::tcp::TcpFlags;

use super::{Cursor, Subtype};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct JoinFlags: u8 {
        const R1 = 0b_0000_1000;
        const R2 = 0b_0000_0100;
        const R3 = 0b_0000_0010;
        /// Backup path.
        const B = 0b_0000_0001;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinOpt {
    flags: JoinFlags,
    addr_id: u8,
    payload: JoinPayload,
}

/// The handshake-step specific part of an MP_JOIN option.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JoinPayload {
    Syn { token: u32, nonce: u32 },
    SynAck { hmac: u64, nonce: u32 },
    Ack { hmac: [u8; 20] },
}

impl JoinOpt {
    pub const SYN_LEN: usize = 12;
    pub const SYN_ACK_LEN: usize = 16;
    pub const ACK_LEN: usize = 24;

    pub fn parse(opt: &[u8], flags: TcpFlags) -> Result<Self, ValidationError> {
        let syn_ack = flags & (TcpFlags::SYN | TcpFlags::ACK);
        let step_matches = match opt.len() {
            Self::SYN_LEN => syn_ack == TcpFlags::SYN,
            Self::SYN_ACK_LEN => syn_ack == TcpFlags::SYN | TcpFlags::ACK,
            Self::ACK_LEN => flags.contains(TcpFlags::ACK),
            _ => {
                return Err(ValidationError::new(
                    Subtype::Join.name(),
                    ValidationErrorClass::InvalidSize,
                    "MP_JOIN option must be 12, 16 or 24 bytes",
                ))
            }
        };

        if !step_matches {
            return Err(ValidationError::new(
                Subtype::Join.name(),
                ValidationErrorClass::InvalidFlags,
                "MP_JOIN length does not match the TCP handshake step",
            ));
        }

        let mut cursor = Cursor::new(opt, Subtype::Join);
        let join_flags = JoinFlags::from_bits_retain(cursor.subtype_bits()?);
        let addr_id = cursor.read_u8()?;
        let payload = match opt.len() {
            Self::SYN_LEN => JoinPayload::Syn {
                token: cursor.read_u32()?,
                nonce: cursor.read_u32()?,
            },
            Self::SYN_ACK_LEN => JoinPayload::SynAck {
                hmac: cursor.read_u64()?,
                nonce: cursor.read_u32()?,
            },
            _ => JoinPayload::Ack {
                hmac: cursor.read_array()?,
            },
        };

        Ok(Self {
            flags: join_flags,
            addr_id,
            payload,
        })
    }

    #[inline]
    pub fn flags(&self) -> JoinFlags {
        self.flags
    }

    #[inline]
    pub fn is_backup(&self) -> bool {
        self.flags.contains(JoinFlags::B)
    }

    /// The address id. The third ACK of a join has no address id field; the
    /// octet in its place is reserved.
    #[inline]
    pub fn addr_id(&self) -> u8 {
        self.addr_id
    }

    #[inline]
    pub fn payload(&self) -> &JoinPayload {
        &self.payload
    }
}

impl fmt::Display for JoinOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !matches!(self.payload, JoinPayload::Ack { .. }) {
            if self.is_backup() {
                f.write_str(" backup")?;
            }
            write!(f, " id {}", self.addr_id)?;
        }

        match &self.payload {
            JoinPayload::Syn { token, nonce } => write!(f, " token 0x{:x} nonce 0x{:x}", token, nonce),
            JoinPayload::SynAck { hmac, nonce } => write!(f, " hmac 0x{:x} nonce 0x{:x}", hmac, nonce),
            JoinPayload::Ack { hmac } => write!(f, " hmac 0x{}", HexBytes(hmac)),
        }
    }
}
