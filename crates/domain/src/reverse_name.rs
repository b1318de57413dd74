//! Conversion between IPv6 addresses and their `ip6.arpa.` reverse names,
//! plus synthesis of automatic hostnames.

use crate::DomainError;
use std::net::Ipv6Addr;

/// Reverse zone suffix for IPv6, including the root label.
pub const REVERSE_ZONE: &str = "ip6.arpa.";

const NIBBLES: usize = 32;

/// Parses a full reverse name (`b.a.9.8. ... .ip6.arpa.`) into an address.
///
/// Exactly 32 single hex digit labels followed by `ip6.arpa.` are accepted.
/// Matching is ASCII case-insensitive; anything else is rejected outright.
pub fn parse_reverse_name(name: &str) -> Result<Ipv6Addr, DomainError> {
    let nibble_part = strip_reverse_zone(name).ok_or_else(|| {
        DomainError::MalformedQuery(format!("'{}' is not under {}", name, REVERSE_ZONE))
    })?;

    let mut value: u128 = 0;
    let mut count = 0usize;

    // Labels arrive least significant nibble first.
    for label in nibble_part.split('.') {
        if count == NIBBLES {
            return Err(DomainError::MalformedQuery(format!(
                "'{}' has more than {} nibble labels",
                name, NIBBLES
            )));
        }

        let bytes = label.as_bytes();
        if bytes.len() != 1 {
            return Err(DomainError::MalformedQuery(format!(
                "label '{}' in '{}' is not a single hex digit",
                label, name
            )));
        }

        let nibble = (bytes[0] as char).to_digit(16).ok_or_else(|| {
            DomainError::MalformedQuery(format!("label '{}' in '{}' is not hex", label, name))
        })?;

        value |= (nibble as u128) << (4 * count);
        count += 1;
    }

    if count != NIBBLES {
        return Err(DomainError::MalformedQuery(format!(
            "'{}' has {} nibble labels, expected {}",
            name, count, NIBBLES
        )));
    }

    Ok(Ipv6Addr::from(value))
}

/// Renders the canonical reverse name of an address.
pub fn to_reverse_name(addr: Ipv6Addr) -> String {
    let value = u128::from(addr);
    let mut out = String::with_capacity(NIBBLES * 2 + REVERSE_ZONE.len());

    for i in 0..NIBBLES {
        let nibble = ((value >> (4 * i)) & 0xf) as u32;
        // nibble is always < 16
        out.push(char::from_digit(nibble, 16).unwrap_or('0'));
        out.push('.');
    }
    out.push_str(REVERSE_ZONE);
    out
}

/// Builds the automatic hostname for an address: 32 lowercase hex digits,
/// a dot, then `domain_suffix`.
///
/// The suffix is expected to be normalized with [`normalize_suffix`].
pub fn synthesize_name(addr: Ipv6Addr, domain_suffix: &str) -> String {
    format!("{:032x}.{}", u128::from(addr), domain_suffix)
}

/// Normalizes a configured domain suffix: leading dots are stripped and the
/// root dot is appended when missing.
pub fn normalize_suffix(raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return Err(DomainError::InvalidDomainName(
            "domain suffix cannot be empty".to_string(),
        ));
    }

    let mut suffix = trimmed.to_string();
    if !suffix.ends_with('.') {
        suffix.push('.');
    }

    validate_fqdn(&suffix)?;
    Ok(suffix)
}

/// Checks that `name` is a dot-terminated DNS name with sane labels.
pub fn validate_fqdn(name: &str) -> Result<(), DomainError> {
    let Some(body) = name.strip_suffix('.') else {
        return Err(DomainError::InvalidDomainName(format!(
            "'{}' must end with a dot",
            name
        )));
    };

    if body.len() > 253 {
        return Err(DomainError::InvalidDomainName(format!(
            "'{}' is longer than 253 characters",
            name
        )));
    }

    for label in body.split('.') {
        if label.is_empty() {
            return Err(DomainError::InvalidDomainName(format!(
                "'{}' contains an empty label",
                name
            )));
        }
        if label.len() > 63 {
            return Err(DomainError::InvalidDomainName(format!(
                "label '{}' exceeds 63 characters",
                label
            )));
        }
        if label.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(DomainError::InvalidDomainName(format!(
                "label '{}' contains whitespace",
                label
            )));
        }
    }

    Ok(())
}

fn strip_reverse_zone(name: &str) -> Option<&str> {
    let split = name.len().checked_sub(REVERSE_ZONE.len() + 1)?;
    if !name.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = name.split_at(split);
    let tail = tail.strip_prefix('.')?;
    if tail.eq_ignore_ascii_case(REVERSE_ZONE) {
        Some(head)
    } else {
        None
    }
}
