use std::net::Ipv4Addr;

use crate::data_aquisition::core::BindingValue;

use super::DecodeError;

/// Decodes the textual form of a cdpCacheAddress, four colon-separated hex octets
/// such as `0a:00:00:01`, into an IPv4 address.
pub fn decode_cache_address(raw: &str) -> Result<Ipv4Addr, DecodeError> {
    let malformed = || DecodeError::Address {
        raw: raw.to_string(),
    };

    let groups: Vec<&str> = raw.trim().split(':').collect();
    if groups.len() != 4 {
        return Err(malformed());
    }

    let mut octets = [0u8; 4];
    for (octet, group) in octets.iter_mut().zip(&groups) {
        if group.is_empty() || group.len() > 2 || !group.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(malformed());
        }
        *octet = u8::from_str_radix(group, 16).map_err(|_| malformed())?;
    }
    Ok(Ipv4Addr::from(octets))
}

/// Address carried by a cdpCacheAddress binding.
///
/// Four raw octets are taken as they are, since a printable address such as
/// 65.66.67.68 would otherwise render as text. Everything else goes through the
/// textual hex form.
pub fn decode_address_value(value: &BindingValue) -> Result<Ipv4Addr, DecodeError> {
    match value {
        BindingValue::IpAddress(ip) => Ok(*ip),
        BindingValue::OctetString(bytes) if bytes.len() == 4 => {
            Ok(Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]))
        }
        other => decode_cache_address(&other.to_display_string()),
    }
}
