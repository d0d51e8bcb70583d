// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//! DSS: data sequence signal.
//!
//! The DSS option carries an optional data-level acknowledgement and an
//! optional mapping of subflow sequence space onto data sequence space. Which
//! of these are present, and how wide they are, is given by the flag octet
//! following the subtype:
//!
//! ```text
//!  7 6 5 4 3 2 1 0
//! +-+-+-+-+-+-+-+-+
//! |R|R|R|F|m|M|a|A|
//! +-+-+-+-+-+-+-+-+
//! ```
//!
//! The mapping ends with a two-octet checksum only if checksums were
//! negotiated during MP_CAPABLE, which a single segment cannot reveal. The
//! option length is therefore checked against both possible layouts.

use core::fmt;

use bitflags::bitflags;

use crate::error::{ValidationError, ValidationErrorClass};
use crate::tcp::TcpFlags;

use super::{Cursor, Subtype, MPTCP_HEADER_LEN};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DssFlags: u8 {
        const R1           = 0b_1000_0000;
        const R2           = 0b_0100_0000;
        const R3           = 0b_0010_0000;
        const DATA_FIN     = 0b_0001_0000;
        const DSN_8_OCTETS = 0b_0000_1000;
        const DSN_PRESENT  = 0b_0000_0100;
        const ACK_8_OCTETS = 0b_0000_0010;
        const ACK_PRESENT  = 0b_0000_0001;
    }
}

const DSS_CHKSUM_LEN: usize = 2;

/// Computes the length of a DSS option with the given flags, with or without
/// the trailing mapping checksum.
pub fn dss_len(flags: DssFlags, csum: bool) -> usize {
    let mut len = MPTCP_HEADER_LEN + 1;

    if flags.contains(DssFlags::ACK_PRESENT) {
        len += if flags.contains(DssFlags::ACK_8_OCTETS) {
            8
        } else {
            4
        };
    }

    if flags.contains(DssFlags::DSN_PRESENT) {
        // DSN, subflow sequence number and data-level length
        len += if flags.contains(DssFlags::DSN_8_OCTETS) {
            14
        } else {
            10
        };

        if csum {
            len += DSS_CHKSUM_LEN;
        }
    }

    len
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DssOpt {
    flags: DssFlags,
    data_ack: Option<u64>,
    mapping: Option<DsnInfo>,
}

impl DssOpt {
    pub fn parse(opt: &[u8], flags: TcpFlags) -> Result<Self, ValidationError> {
        if flags.contains(TcpFlags::SYN) {
            return Err(ValidationError::new(
                Subtype::Dss.name(),
                ValidationErrorClass::InvalidFlags,
                "DSS option not permitted on SYN segment",
            ));
        }

        let mut cursor = Cursor::new(opt, Subtype::Dss);
        let dss_flags = DssFlags::from_bits_retain(cursor.read_u8()?);

        let with_csum = dss_len(dss_flags, true);
        if opt.len() != with_csum && opt.len() != dss_len(dss_flags, false) {
            return Err(ValidationError::new(
                Subtype::Dss.name(),
                ValidationErrorClass::InvalidSize,
                "DSS length does not match its flags",
            ));
        }

        let data_ack = if !dss_flags.contains(DssFlags::ACK_PRESENT) {
            None
        } else if dss_flags.contains(DssFlags::ACK_8_OCTETS) {
            Some(cursor.read_u64()?)
        } else {
            Some(u64::from(cursor.read_u32()?))
        };

        let mapping = if dss_flags.contains(DssFlags::DSN_PRESENT) {
            let dsn = if dss_flags.contains(DssFlags::DSN_8_OCTETS) {
                cursor.read_u64()?
            } else {
                u64::from(cursor.read_u32()?)
            };
            let ssn = cursor.read_u32()?;
            let dll = cursor.read_u16()?;
            let chksum = if opt.len() == with_csum {
                Some(cursor.read_u16()?)
            } else {
                None
            };

            Some(DsnInfo {
                dsn,
                ssn,
                dll,
                chksum,
            })
        } else {
            None
        };

        Ok(Self {
            flags: dss_flags,
            data_ack,
            mapping,
        })
    }

    #[inline]
    pub fn flags(&self) -> DssFlags {
        self.flags
    }

    #[inline]
    pub fn data_fin(&self) -> bool {
        self.flags.contains(DssFlags::DATA_FIN)
    }

    /// The data-level acknowledgement, widened to 64 bits if sent in 4 octets.
    #[inline]
    pub fn data_ack(&self) -> Option<u64> {
        self.data_ack
    }

    #[inline]
    pub fn mapping(&self) -> Option<&DsnInfo> {
        self.mapping.as_ref()
    }
}

impl fmt::Display for DssOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.data_fin() {
            f.write_str(" fin")?;
        }

        if let Some(ack) = self.data_ack {
            write!(f, " ack {}", ack)?;
        }

        if let Some(mapping) = &self.mapping {
            write!(
                f,
                " seq {} subseq {} len {}",
                mapping.dsn, mapping.ssn, mapping.dll
            )?;
            if let Some(chksum) = mapping.chksum {
                write!(f, " csum 0x{:x}", chksum)?;
            }
        }

        Ok(())
    }
}

/// A DSS data sequence mapping.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DsnInfo {
    dsn: u64,
    ssn: u32,
    dll: u16,
    chksum: Option<u16>,
}

impl DsnInfo {
    /// Data sequence number, widened to 64 bits if sent in 4 octets.
    #[inline]
    pub fn dsn(&self) -> u64 {
        self.dsn
    }

    /// Subflow sequence number, relative to the subflow's initial sequence.
    #[inline]
    pub fn ssn(&self) -> u32 {
        self.ssn
    }

    /// Data-level length.
    #[inline]
    pub fn dll(&self) -> u16 {
        self.dll
    }

    #[inline]
    pub fn chksum(&self) -> Option<u16> {
        self.chksum
    }
}
