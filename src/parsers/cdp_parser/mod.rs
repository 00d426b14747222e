/*
This module turns the flat binding list of a CDP walk into neighbor records.

--- data_aquisition module ---
SNMP GETBULK walk over cdpCacheEntry, ifDescr and sysName
|
| Untyped bindings, grouped by nothing
v
--- cdp_parser module ---
Rows keyed by local ifIndex, interface names resolved and compacted,
cache addresses decoded
|
v
--- topology module ---
One query, one immutable NeighborTable
*/

use thiserror::Error;

pub mod address;
pub mod ifname;
pub mod neighbor;
pub mod oids;

/// A neighbor row points at something the device itself does not have.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no interface description for ifIndex {if_index}")]
    MissingInterface { if_index: u64 },
    #[error("device did not report its sysName")]
    MissingDeviceName,
}

/// A binding could not be decoded into its field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed CDP cache address {raw:?}")]
    Address { raw: String },
    #[error("malformed CDP cache index {oid}")]
    MalformedIndex { oid: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CdpError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("neighbor row {row} is missing {}", .missing.join(", "))]
    IncompleteRow {
        row: String,
        missing: Vec<&'static str>,
    },
}
