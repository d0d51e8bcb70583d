// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Address-to-text conversion.

use std::net::{Ipv4Addr, Ipv6Addr};

/// Renders an IPv4 address in dotted-quad form.
#[inline]
pub fn ipv4_string(octets: &[u8; 4]) -> String {
    Ipv4Addr::from(*octets).to_string()
}

/// Renders an IPv6 address in its RFC 5952 canonical text form.
#[inline]
pub fn ipv6_string(octets: &[u8; 16]) -> String {
    Ipv6Addr::from(*octets).to_string()
}
