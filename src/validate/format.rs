//! Parsers for the textual formats found in a plan
//!
//! These accept the same notation the installer's users already write:
//! plain IPv4/IPv6 addresses, `address/prefix` CIDR blocks, and Go-style
//! durations such as `17520h` or `1h30m`.

use std::net::IpAddr;

/// Parse an IPv4 or IPv6 address
pub fn parse_ip(s: &str) -> Option<IpAddr> {
    s.parse().ok()
}

/// Parse a CIDR block into its address and prefix length
pub fn parse_cidr(s: &str) -> Result<(IpAddr, u8), String> {
    let invalid = || format!("invalid CIDR address: {}", s);

    let (addr, prefix) = s.split_once('/').ok_or_else(invalid)?;
    let addr: IpAddr = addr.parse().map_err(|_| invalid())?;

    // u8::from_str accepts a leading '+', which is not CIDR notation
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let prefix: u8 = prefix.parse().map_err(|_| invalid())?;

    let max = if addr.is_ipv4() { 32 } else { 128 };
    if prefix > max {
        return Err(invalid());
    }

    Ok((addr, prefix))
}

/// Parse a duration such as `300ms`, `-1.5h` or `2h45m` into signed nanoseconds
///
/// Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. A bare `0` is
/// accepted, as is a single leading sign. The total must fit in an `i64`
/// count of nanoseconds, roughly 292 years either way.
pub fn parse_duration(s: &str) -> Result<i64, String> {
    let invalid = || format!("invalid duration {:?}", s);

    let (negative, mut rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if rest == "0" {
        return Ok(0);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let limit: u128 = if negative { 1 << 63 } else { i64::MAX as u128 };
    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (whole, tail) = split_digits(rest);
        let (fraction, tail) = match tail.strip_prefix('.') {
            Some(after_dot) => split_digits(after_dot),
            None => ("", tail),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        let unit_len = tail
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60_000_000_000,
            "h" => 3_600_000_000_000,
            "" => return Err(format!("missing unit in duration {:?}", s)),
            other => return Err(format!("unknown unit {:?} in duration {:?}", other, s)),
        };

        let whole: u128 = match whole {
            "" => 0,
            digits => digits.parse().map_err(|_| invalid())?,
        };
        let mut value = whole.checked_mul(scale).ok_or_else(invalid)?;
        if !fraction.is_empty() {
            // Digits past nanosecond precision of the largest unit cannot matter
            let digits = &fraction[..fraction.len().min(19)];
            let numerator: u128 = digits.parse().map_err(|_| invalid())?;
            value += numerator * scale / 10u128.pow(digits.len() as u32);
        }

        total = total.checked_add(value).ok_or_else(invalid)?;
        if total > limit {
            return Err(invalid());
        }
        rest = tail;
    }

    let total = total as i128;
    let signed = if negative { -total } else { total };
    Ok(signed as i64)
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}
