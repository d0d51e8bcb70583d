// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use hex_literal::hex;
use test_case::test_case;

use mptcp_print::mptcp::{dss_len, DssFlags};
use mptcp_print::tcp::TcpFlags;
use mptcp_print::{format_option, mptcp_print, Error, MptcpOption, Subtype, ValidationErrorClass};

fn print(opt: &[u8], flags: TcpFlags) -> (String, Result<(), Error>) {
    let mut out = String::new();
    let res = mptcp_print(&mut out, opt, flags);
    (out, res)
}

#[test_case(&hex!("1e 0c 00 00 00 00 00 00 00 00 00 01"), TcpFlags::SYN,
    " capable {0x0000000000000001}" ; "capable syn")]
#[test_case(&hex!("1e 14 00 80 00 00 00 00 00 00 00 01 00 00 00 00 00 00 00 02"), TcpFlags::ACK,
    " capable csum {0x0000000000000001,0x0000000000000002}" ; "capable ack")]
#[test_case(&hex!("1e 0c 11 01 de ad be ef ca fe ba be"), TcpFlags::SYN,
    " join backup id 1 token 0xdeadbeef nonce 0xcafebabe" ; "join syn backup")]
#[test_case(&hex!("1e 1c 20 0f 00 00 00 00 00 00 01 00 00 00 00 00 00 00 02 00 00 00 00 03 00 10 ab cd"),
    TcpFlags::ACK, " dss ack 256 seq 512 subseq 3 len 16 csum 0xabcd" ; "dss full")]
#[test_case(&hex!("1e 0a 34 05 c0 00 02 01 1f 90"), TcpFlags::ACK,
    " add-addr id 5 192.0.2.1:8080" ; "add addr v4 port")]
#[test_case(&hex!("1e 06 40 07 08 09"), TcpFlags::ACK, " rem-addr id 7 8 9" ; "remove three ids")]
#[test_case(&hex!("1e 04 50 03"), TcpFlags::ACK, " prio non-backup id 3" ; "prio with id")]
#[test_case(&hex!("1e 0c 60 00 00 00 00 00 00 00 00 2a"), TcpFlags::ACK, " fail seq 42" ; "fail")]
#[test_case(&hex!("1e 0c 70 00 01 23 45 67 89 ab cd ef"), TcpFlags::ACK,
    " fast-close key 0x123456789abcdef" ; "fast close")]
#[test_case(&hex!("1e 04 f0 00"), TcpFlags::ACK, " unknown" ; "experimental subtype")]
fn scenarios(opt: &[u8], flags: TcpFlags, expected: &str) {
    let (out, res) = print(opt, flags);
    assert_eq!(res, Ok(()));
    assert_eq!(out, expected);
    assert_eq!(format_option(opt, flags).as_deref(), Ok(expected));
}

#[test_case(&hex!("1e 14 00 00 00 00 00 00 00 00 00 01 00 00 00 00 00 00 00 02"), TcpFlags::SYN,
    " capable" ; "capable syn with ack length")]
#[test_case(&hex!("1e 0c 10 01 de ad be ef ca fe ba be"), TcpFlags::ACK,
    " join" ; "join syn length without syn")]
#[test_case(&hex!("1e 0a 20 03 00 00 00 01 00 00"), TcpFlags::ACK,
    " dss" ; "dss flags call for twelve")]
#[test_case(&hex!("1e 14 34 05 c0 00 02 01 00 00 00 00 00 00 00 00 00 00 00 00"), TcpFlags::ACK,
    " add-addr" ; "add addr v4 with v6 length")]
#[test_case(&hex!("1e 02"), TcpFlags::ACK, "" ; "truncated header")]
fn rejections(opt: &[u8], flags: TcpFlags, partial: &str) {
    let (out, res) = print(opt, flags);
    assert!(matches!(res, Err(Error::Validation(_))));
    assert_eq!(out, partial);
    assert!(format_option(opt, flags).is_err());
}

#[test]
fn dss_rejection_is_a_size_error() {
    // an 8-octet data ack makes the option 12 bytes long
    let opt = hex!("1e 0a 20 03 00 00 00 01 00 00");
    let err = MptcpOption::parse(&opt, TcpFlags::ACK).unwrap_err();
    assert_eq!(err.class, ValidationErrorClass::InvalidSize);
    assert_eq!(dss_len(DssFlags::from_bits_retain(0x03), false), 12);
    assert_eq!(dss_len(DssFlags::from_bits_retain(0x03), true), 12);
}

#[test]
fn every_subtype_has_a_valid_encoding() {
    let valid: [(&[u8], TcpFlags); 8] = [
        (&hex!("1e 0c 00 00 00 00 00 00 00 00 00 01"), TcpFlags::SYN),
        (&hex!("1e 10 10 01 00 00 00 00 00 00 00 01 00 00 00 02"), TcpFlags::SYN | TcpFlags::ACK),
        (&hex!("1e 04 20 10"), TcpFlags::ACK),
        (&hex!("1e 08 34 01 0a 00 00 01"), TcpFlags::empty()),
        (&hex!("1e 04 40 01"), TcpFlags::empty()),
        (&hex!("1e 03 51"), TcpFlags::empty()),
        (&hex!("1e 0c 60 00 00 00 00 00 00 00 00 01"), TcpFlags::ACK),
        (&hex!("1e 0c 70 00 00 00 00 00 00 00 00 01"), TcpFlags::ACK),
    ];

    for (value, (opt, flags)) in valid.into_iter().enumerate() {
        let option = MptcpOption::parse(opt, flags).unwrap();
        assert_eq!(option.subtype(), Subtype::from_value(value as u8));
        assert_ne!(option.subtype(), Subtype::Unknown);
    }
}

#[test]
fn high_subtypes_print_unknown() {
    for high in 8u8..=0xf {
        let opt = [0x1e, 0x0c, high << 4, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        for flags in [TcpFlags::SYN, TcpFlags::ACK, TcpFlags::SYN | TcpFlags::ACK] {
            let (out, res) = print(&opt, flags);
            assert_eq!(res, Ok(()));
            assert_eq!(out, " unknown");
        }
    }
}

#[test]
fn dss_length_rule_is_complete() {
    for bits in 0u8..32 {
        let dss_flags = DssFlags::from_bits_retain(bits);
        let accepted: Vec<usize> = (0..=40)
            .filter(|&len| {
                let mut opt = vec![0u8; len];
                if len > 3 {
                    opt[0] = 0x1e;
                    opt[1] = len as u8;
                    opt[2] = 0x20;
                    opt[3] = bits;
                }
                len > 3 && MptcpOption::parse(&opt, TcpFlags::ACK).is_ok()
            })
            .collect();

        let mut expected = vec![dss_len(dss_flags, false), dss_len(dss_flags, true)];
        expected.dedup();
        assert_eq!(accepted, expected, "dss flags {:#04x}", bits);
    }
}

#[test]
fn dss_csum_only_printed_with_checksum_length() {
    let without = hex!("1e 0e 20 04 00 00 00 01 00 00 00 02 00 03");
    let (out, _) = print(&without, TcpFlags::ACK);
    assert_eq!(out, " dss seq 1 subseq 2 len 3");

    let with = hex!("1e 10 20 04 00 00 00 01 00 00 00 02 00 03 12 34");
    let (out, _) = print(&with, TcpFlags::ACK);
    assert_eq!(out, " dss seq 1 subseq 2 len 3 csum 0x1234");
}

#[test]
fn output_is_deterministic_and_input_untouched() {
    let opt = hex!("1e 18 10 00 00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f 10 11 12 13");
    let copy = opt;
    let (first, _) = print(&opt, TcpFlags::ACK);
    let (second, _) = print(&opt, TcpFlags::ACK);
    assert_eq!(first, second);
    assert_eq!(first, " join hmac 0x000102030405060708090a0b0c0d0e0f10111213");
    assert_eq!(opt, copy);
}

/// Locates the value printed after ` <label> `.
fn printed_value<'o>(out: &'o str, label: &str) -> &'o str {
    let pattern = format!(" {} ", label);
    let start = out
        .find(&pattern)
        .unwrap_or_else(|| panic!("no `{}` in `{}`", label, out))
        + pattern.len();
    out[start..].split(' ').next().unwrap()
}

/// Turns a printed number back into its `width` big-endian wire octets.
fn value_octets(value: &str, width: usize) -> Vec<u8> {
    fn narrow(value: u64, width: usize) -> Vec<u8> {
        let bytes = value.to_be_bytes();
        assert!(
            bytes[..8 - width].iter().all(|&b| b == 0),
            "{} does not fit in {} octets",
            value,
            width
        );
        bytes[8 - width..].to_vec()
    }

    match value.strip_prefix("0x") {
        Some(digits) if width > 8 => {
            assert_eq!(digits.len(), width * 2, "{}", value);
            (0..width)
                .map(|i| u8::from_str_radix(&digits[2 * i..2 * i + 2], 16).unwrap())
                .collect()
        }
        Some(digits) => narrow(u64::from_str_radix(digits, 16).unwrap(), width),
        None => narrow(value.parse().unwrap(), width),
    }
}

#[test_case(&hex!("1e 0c 10 9c 00 12 ab cd 80 00 00 01"), TcpFlags::SYN,
    &[("id", 3, 1), ("token", 4, 4), ("nonce", 8, 4)] ; "join syn")]
#[test_case(&hex!("1e 10 11 fe 00 80 ff 01 00 00 00 0a 0f ff ff ff"), TcpFlags::SYN | TcpFlags::ACK,
    &[("id", 3, 1), ("hmac", 4, 8), ("nonce", 12, 4)] ; "join syn ack")]
#[test_case(&hex!("1e 18 10 00 00 0f 80 ff 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f f0"), TcpFlags::ACK,
    &[("hmac", 4, 20)] ; "join ack")]
#[test_case(&hex!("1e 14 20 05 00 a0 00 ff 80 00 00 01 00 00 f0 0d 05 dc 00 0f"), TcpFlags::ACK,
    &[("ack", 4, 4), ("seq", 8, 4), ("subseq", 12, 4), ("len", 16, 2), ("csum", 18, 2)] ; "dss short fields")]
#[test_case(&hex!("1e 1c 20 0f 00 00 00 01 ff 00 00 00 80 00 00 00 00 00 00 01 00 00 00 07 ff ff 0a bc"), TcpFlags::ACK,
    &[("ack", 4, 8), ("seq", 12, 8), ("subseq", 20, 4), ("len", 24, 2), ("csum", 26, 2)] ; "dss long fields")]
#[test_case(&hex!("1e 04 51 ff"), TcpFlags::ACK, &[("id", 3, 1)] ; "prio id")]
#[test_case(&hex!("1e 0c 60 00 80 00 00 00 00 00 0f 00"), TcpFlags::ACK, &[("seq", 4, 8)] ; "fail seq")]
#[test_case(&hex!("1e 0c 70 00 00 0f dc ba 98 76 54 32"), TcpFlags::ACK, &[("key", 4, 8)] ; "fast close key")]
fn printed_fields_recover_wire_octets(opt: &[u8], flags: TcpFlags, fields: &[(&str, usize, usize)]) {
    let (out, res) = print(opt, flags);
    assert_eq!(res, Ok(()));
    for &(label, offset, width) in fields {
        assert_eq!(
            value_octets(printed_value(&out, label), width),
            &opt[offset..offset + width],
            "{} in `{}`",
            label,
            out
        );
    }
}

#[test]
fn capable_keys_recover_wire_octets() {
    let opt = hex!("1e 14 00 81 00 00 0a bc ff 00 00 01 80 00 00 00 00 00 00 0f");
    let (out, res) = print(&opt, TcpFlags::ACK);
    assert_eq!(res, Ok(()));

    let (_, keys) = out.split_once('{').unwrap();
    let keys: Vec<&str> = keys.trim_end_matches('}').split(',').collect();
    assert_eq!(keys.len(), 2);
    assert_eq!(value_octets(keys[0], 8), &opt[4..12]);
    assert_eq!(value_octets(keys[1], 8), &opt[12..20]);
}

#[test_case(&hex!("1e 0a 34 05 80 00 02 01 00 50") ; "v4 with port")]
#[test_case(&hex!("1e 16 36 09 20 01 0d b8 00 00 ff 00 00 00 00 00 00 00 00 01 ff 01") ; "v6 with port")]
fn add_addr_recovers_wire_octets(opt: &[u8]) {
    let (out, res) = print(opt, TcpFlags::ACK);
    assert_eq!(res, Ok(()));

    assert_eq!(value_octets(printed_value(&out, "id"), 1), &opt[3..4]);
    let endpoint = out.rsplit(' ').next().unwrap();
    let (addr, port) = endpoint.rsplit_once(':').unwrap();
    let octets = match addr.parse::<std::net::IpAddr>().unwrap() {
        std::net::IpAddr::V4(v4) => v4.octets().to_vec(),
        std::net::IpAddr::V6(v6) => v6.octets().to_vec(),
    };
    assert_eq!(octets, &opt[4..opt.len() - 2]);
    assert_eq!(value_octets(port, 2), &opt[opt.len() - 2..]);
}

#[test]
fn remove_addr_ids_recover_wire_octets() {
    let opt = hex!("1e 07 40 00 7f 80 ff");
    let (out, res) = print(&opt, TcpFlags::ACK);
    assert_eq!(res, Ok(()));

    let ids: Vec<u8> = out
        .strip_prefix(" rem-addr id ")
        .unwrap()
        .split(' ')
        .map(|id| id.parse().unwrap())
        .collect();
    assert_eq!(ids, &opt[3..]);
}

#[test]
fn decoders_never_read_past_length() {
    // a valid 12-byte option followed by bytes that would change the output
    // if they were read
    let buffer = hex!("1e 0c 00 00 00 00 00 00 00 00 00 01 ff ff ff ff ff ff ff ff");
    let mut out = String::new();
    mptcp_print::mptcp_print_with_len(&mut out, &buffer, 12, TcpFlags::SYN).unwrap();
    assert_eq!(out, " capable {0x0000000000000001}");
}
