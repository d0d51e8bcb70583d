// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//! MP_PRIO: changing a subflow's backup priority.

use core::fmt;

use bitflags::bitflags;

use crate::error::{ValidationError, ValidationErrorClass};
use crate::tcp::TcpFlags;

use super::{Cursor, Subtype, MPTCP_HEADER_LEN};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct PrioFlags: u8 {
        const R1 = 0b_0000_1000;
        const R2 = 0b_0000_0100;
        const R3 = 0b_0000_0010;
        /// Backup path.
        const B = 0b_0000_0001;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrioOpt {
    flags: PrioFlags,
    addr_id: Option<u8>,
}

impl PrioOpt {
    pub fn parse(opt: &[u8], _flags: TcpFlags) -> Result<Self, ValidationError> {
        if opt.len() != MPTCP_HEADER_LEN && opt.len() != MPTCP_HEADER_LEN + 1 {
            return Err(ValidationError::new(
                Subtype::Prio.name(),
                ValidationErrorClass::InvalidSize,
                "MP_PRIO option must be 3 or 4 bytes",
            ));
        }

        let mut cursor = Cursor::new(opt, Subtype::Prio);
        let flags = PrioFlags::from_bits_retain(cursor.subtype_bits()?);
        let addr_id = if opt.len() > MPTCP_HEADER_LEN {
            Some(cursor.read_u8()?)
        } else {
            None
        };

        Ok(Self { flags, addr_id })
    }

    #[inline]
    pub fn flags(&self) -> PrioFlags {
        self.flags
    }

    #[inline]
    pub fn is_backup(&self) -> bool {
        self.flags.contains(PrioFlags::B)
    }

    #[inline]
    pub fn addr_id(&self) -> Option<u8> {
        self.addr_id
    }
}

impl fmt::Display for PrioOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_backup() { " backup" } else { " non-backup" })?;
        if let Some(addr_id) = self.addr_id {
            write!(f, " id {}", addr_id)?;
        }
        Ok(())
    }
}
