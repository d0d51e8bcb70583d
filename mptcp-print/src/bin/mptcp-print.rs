// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//! Command-line driver: prints hex-encoded MPTCP options in trace form.
//!
//! ```text
//! $ mptcp-print --flags syn 1e0c00000000000000000001
//! mptcp capable {0x0000000000000001}
//! ```

use std::fmt::{self, Write};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use mptcp_common::HexBytes;

use mptcp_print::tcp::{print_options, TcpFlags};
use mptcp_print::{format_option, mptcp_print, Error, ValidationError};

#[derive(Parser, Debug)]
#[clap(version, about = "Print Multipath TCP options in trace form", long_about = None)]
pub struct Configuration {
    /// Hex-encoded option bytes; one option per argument, or one option area with --area
    #[clap(required = true)]
    pub options: Vec<String>,
    /// Flags of the TCP segment carrying the options
    #[clap(short, long, value_enum, value_delimiter = ',')]
    pub flags: Vec<FlagName>,
    /// Flag octet of the TCP segment, decimal or 0x-prefixed hex; combined with --flags
    #[clap(long, value_parser = parse_octet)]
    pub raw_flags: Option<u8>,
    /// Treat each argument as a complete TCP option area
    #[clap(long)]
    pub area: bool,
    /// Print only an error for options that fail validation
    #[clap(long, conflicts_with = "area")]
    pub strict: bool,
}

impl Configuration {
    pub fn tcp_flags(&self) -> TcpFlags {
        let named = self
            .flags
            .iter()
            .fold(TcpFlags::empty(), |acc, &flag| acc | TcpFlags::from(flag));
        named | TcpFlags::from(self.raw_flags.unwrap_or(0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FlagName {
    Fin,
    Syn,
    Rst,
    Psh,
    Ack,
    Urg,
    Ece,
    Cwr,
}

impl From<FlagName> for TcpFlags {
    fn from(flag: FlagName) -> Self {
        match flag {
            FlagName::Fin => TcpFlags::FIN,
            FlagName::Syn => TcpFlags::SYN,
            FlagName::Rst => TcpFlags::RST,
            FlagName::Psh => TcpFlags::PSH,
            FlagName::Ack => TcpFlags::ACK,
            FlagName::Urg => TcpFlags::URG,
            FlagName::Ece => TcpFlags::ECE,
            FlagName::Cwr => TcpFlags::CWR,
        }
    }
}

fn parse_octet(s: &str) -> Result<u8, String> {
    let res = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    res.map_err(|e| format!("invalid flag octet `{}`: {}", s, e))
}

/// Decodes option bytes, ignoring an optional `0x` prefix and any whitespace
/// or colons between octets.
fn decode_hex(input: &str) -> anyhow::Result<Vec<u8>> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let digits: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&digits).with_context(|| format!("invalid hex option `{}`", input))
}

/// Renders one option as a trace line. A rejected option keeps whatever text
/// was printed before validation failed, followed by a hex dump of its bytes.
fn print_line(bytes: &[u8], flags: TcpFlags) -> Result<(String, Option<ValidationError>), fmt::Error> {
    let mut line = String::from("mptcp");
    match mptcp_print(&mut line, bytes, flags) {
        Ok(()) => Ok((line, None)),
        Err(Error::Validation(e)) => {
            write!(line, " [bad opt] 0x{}", HexBytes(bytes))?;
            Ok((line, Some(e)))
        }
        Err(Error::Format(e)) => Err(e),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Configuration::parse();
    let flags = config.tcp_flags();
    log::debug!("printing {} input(s) with TCP flags {:?}", config.options.len(), flags);

    let mut failed = 0;
    for input in &config.options {
        let bytes = decode_hex(input)?;

        if config.area {
            let mut line = String::new();
            failed += print_options(&mut line, &bytes, flags)?;
            println!("{}", line);
        } else if config.strict {
            match format_option(&bytes, flags) {
                Ok(text) => println!("mptcp{}", text),
                Err(e) => {
                    failed += 1;
                    eprintln!("{}: {}", input, e);
                }
            }
        } else {
            let (line, rejected) = print_line(&bytes, flags)?;
            if let Some(e) = rejected {
                failed += 1;
                log::warn!("{}: {}", input, e);
            }
            println!("{}", line);
        }
    }

    if failed > 0 {
        log::info!("{} option(s) failed validation", failed);
        std::process::exit(1);
    }

    Ok(())
}
