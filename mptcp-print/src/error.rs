// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use core::fmt;

use thiserror::Error;

/// A printer result.
pub type Result<T> = core::result::Result<T, Error>;

/// An error raised while printing an option.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The option did not match any valid layout for its subtype.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The output sink refused a write.
    #[error("failed to write option text")]
    Format(#[from] fmt::Error),
}

/// Describes why an option was rejected.
///
/// `option` holds the short name of the subtype being decoded, or `"mptcp"`
/// when the option was too short for its subtype to be read.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
#[error("invalid {option} option: {reason}")]
pub struct ValidationError {
    pub option: &'static str,
    pub class: ValidationErrorClass,
    pub reason: &'static str,
}

impl ValidationError {
    #[inline]
    pub(crate) const fn new(
        option: &'static str,
        class: ValidationErrorClass,
        reason: &'static str,
    ) -> Self {
        Self {
            option,
            class,
            reason,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValidationErrorClass {
    /// The option ends before a field that its layout requires.
    InsufficientBytes,
    /// The option length is not one permitted for its subtype.
    InvalidSize,
    /// The TCP flags of the segment do not allow this option layout.
    InvalidFlags,
    /// A field within the option holds an unsupported value.
    InvalidValue,
}
