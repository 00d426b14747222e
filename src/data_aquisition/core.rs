use std::{fmt::Display, net::Ipv4Addr};

use async_trait::async_trait;
use snmp2::Value;

use super::snmp::SessionError;

/// One variable binding returned by a device, detached from the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    /// Full structured index of the binding, root included.
    pub oid: Vec<u64>,
    pub value: BindingValue,
}

impl Binding {
    pub fn new(oid: impl Into<Vec<u64>>, value: BindingValue) -> Self {
        Self {
            oid: oid.into(),
            value,
        }
    }

    /// Returns the part of the index below `root`, or `None` if the binding lies outside it.
    pub fn index_under(&self, root: &[u64]) -> Option<&[u64]> {
        self.oid.strip_prefix(root)
    }

    pub fn oid_string(&self) -> String {
        format_oid(&self.oid)
    }
}

/// Replacement for the snmp2::Value type due to lifetime shenanigans
#[derive(Debug, Clone, PartialEq)]
pub enum BindingValue {
    Integer(i64),
    IpAddress(Ipv4Addr),
    OctetString(Vec<u8>),
    ObjectIdentifier(Vec<u64>),
    Counter32(u32),
    Unsigned32(u32),
    Timeticks(u32),
    Counter64(u64),
    Boolean(bool),
    Null,

    // Exception values, never carry data
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,

    // Fallback
    Unknown,
}

impl BindingValue {
    /// Whether the value is an exception marker rather than real data.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            BindingValue::NoSuchObject | BindingValue::NoSuchInstance | BindingValue::EndOfMibView
        )
    }

    /// Textual form of the value, the way a CLI tool prints it.
    ///
    /// Octet strings holding UTF-8 text without control characters come out as text.
    /// Anything else (raw addresses, MAC addresses, binary blobs) is rendered as
    /// colon-separated two-digit hex, e.g. `0a:00:00:01`.
    pub fn to_display_string(&self) -> String {
        match self {
            BindingValue::OctetString(bytes) => render_octets(bytes),
            BindingValue::Integer(i) => i.to_string(),
            BindingValue::IpAddress(ip) => ip.to_string(),
            BindingValue::ObjectIdentifier(oid) => format_oid(oid),
            BindingValue::Counter32(c) => c.to_string(),
            BindingValue::Unsigned32(u) => u.to_string(),
            BindingValue::Timeticks(t) => t.to_string(),
            BindingValue::Counter64(c) => c.to_string(),
            BindingValue::Boolean(b) => b.to_string(),
            BindingValue::Null => String::new(),
            BindingValue::NoSuchObject => "noSuchObject".to_string(),
            BindingValue::NoSuchInstance => "noSuchInstance".to_string(),
            BindingValue::EndOfMibView => "endOfMibView".to_string(),
            BindingValue::Unknown => "unknown".to_string(),
        }
    }
}

impl Display for BindingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl From<&Value<'_>> for BindingValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Integer(i) => BindingValue::Integer(*i),
            Value::IpAddress(ip) => BindingValue::IpAddress(Ipv4Addr::from(*ip)),
            Value::OctetString(s) => BindingValue::OctetString(s.to_vec()),
            Value::ObjectIdentifier(oid) => match oid.iter() {
                Some(arcs) => BindingValue::ObjectIdentifier(arcs.collect()),
                None => BindingValue::Unknown,
            },
            Value::Counter32(c) => BindingValue::Counter32(*c),
            Value::Unsigned32(u) => BindingValue::Unsigned32(*u),
            Value::Timeticks(t) => BindingValue::Timeticks(*t),
            Value::Counter64(c) => BindingValue::Counter64(*c),
            Value::Boolean(b) => BindingValue::Boolean(*b),
            Value::Null => BindingValue::Null,
            Value::NoSuchObject => BindingValue::NoSuchObject,
            Value::NoSuchInstance => BindingValue::NoSuchInstance,
            Value::EndOfMibView => BindingValue::EndOfMibView,
            _ => BindingValue::Unknown,
        }
    }
}

fn render_octets(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) if !text.is_empty() && !text.chars().any(char::is_control) => text.to_string(),
        _ => bytes
            .iter()
            .map(|b| hex::encode([*b]))
            .collect::<Vec<_>>()
            .join(":"),
    }
}

pub fn format_oid(oid: &[u64]) -> String {
    oid.iter()
        .map(|arc| arc.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// Represents a device that can enumerate a set of sub-trees in bulk.
#[async_trait]
pub trait BindingSource: Send {
    /// Enumerates every binding under `roots` and returns them untouched.
    async fn bulk_walk(&mut self, roots: &[&[u64]]) -> Result<Vec<Binding>, SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_octets_render_as_text() {
        let value = BindingValue::OctetString(b"GigabitEthernet0/1".to_vec());
        assert_eq!(value.to_display_string(), "GigabitEthernet0/1");
    }

    #[test]
    fn binary_octets_render_as_hex_groups() {
        let value = BindingValue::OctetString(vec![10, 0, 0, 1]);
        assert_eq!(value.to_display_string(), "0a:00:00:01");

        let value = BindingValue::OctetString(vec![0xc0, 0xa8, 0xfe, 0x21]);
        assert_eq!(value.to_display_string(), "c0:a8:fe:21");
    }

    #[test]
    fn utf8_octets_render_as_text() {
        let value = BindingValue::OctetString("Коммутатор-1.café".as_bytes().to_vec());
        assert_eq!(value.to_display_string(), "Коммутатор-1.café");
    }

    #[test]
    fn control_characters_and_invalid_utf8_render_as_hex() {
        let value = BindingValue::OctetString(b"Gi0/1\t".to_vec());
        assert_eq!(value.to_display_string(), "47:69:30:2f:31:09");

        let value = BindingValue::OctetString(vec![0xc3, 0x28]);
        assert_eq!(value.to_display_string(), "c3:28");
    }

    #[test]
    fn index_under_strips_root() {
        let binding = Binding::new(vec![1, 3, 6, 1, 2, 1, 1, 5, 0], BindingValue::Null);
        assert_eq!(binding.index_under(&[1, 3, 6, 1, 2, 1, 1, 5]), Some(&[0u64][..]));
        assert_eq!(binding.index_under(&[1, 3, 6, 1, 2, 1, 2]), None);
        assert_eq!(binding.oid_string(), "1.3.6.1.2.1.1.5.0");
    }

    #[test]
    fn exceptions_are_flagged() {
        assert!(BindingValue::EndOfMibView.is_exception());
        assert!(BindingValue::NoSuchInstance.is_exception());
        assert!(!BindingValue::Integer(1).is_exception());
    }
}
