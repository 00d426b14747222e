use std::{
    collections::{BTreeMap, btree_map::Entry},
    net::Ipv4Addr,
};

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::data_aquisition::core::{Binding, BindingValue};

use super::{
    CdpError, DecodeError, LookupError,
    address::decode_address_value,
    ifname::compact_if_name,
    oids::{
        CACHE_INDEX_LEN, CDP_CACHE_ENTRY, COLUMN_FROM_END, CacheColumn, DEVICE_INDEX_FROM_END, IF_DESCR,
        IF_INDEX_FROM_END, SYS_NAME, arc_from_end,
    },
};

/// One CDP adjacency as seen from the queried device.
///
/// The "local" side is always the queried device and the interface the neighbor was
/// heard on. The "remote" side is what the neighbor advertised about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborRecord {
    pub local_device_name: String,
    pub local_ip: String,
    pub local_interface: String,
    pub remote_interface: String,
    pub remote_ip: String,
    pub remote_device_name: String,
}

impl NeighborRecord {
    /// Literal column placed between the local and the remote side.
    pub const SEPARATOR: &'static str = "->";

    /// The seven display columns, in table order.
    pub fn display_fields(&self) -> [&str; 7] {
        [
            self.local_device_name.as_str(),
            self.local_ip.as_str(),
            self.local_interface.as_str(),
            Self::SEPARATOR,
            self.remote_interface.as_str(),
            self.remote_ip.as_str(),
            self.remote_device_name.as_str(),
        ]
    }
}

/// Neighbors keyed by row index (the local ifIndex in text form), sorted by that text.
pub type NeighborTable = BTreeMap<String, NeighborRecord>;

/// Identity of the queried device, shared by every row.
#[derive(Debug, Clone)]
struct LocalDevice {
    name: String,
    ip: String,
}

/// A neighbor row collected column by column.
#[derive(Debug)]
struct NeighborRowBuilder {
    local_interface: String,
    device_index: Option<u64>,
    shared_port_reported: bool,
    remote_interface: Option<String>,
    remote_ip: Option<Ipv4Addr>,
    remote_device_name: Option<String>,
}

impl NeighborRowBuilder {
    fn new(local_interface: String) -> Self {
        Self {
            local_interface,
            device_index: None,
            shared_port_reported: false,
            remote_interface: None,
            remote_ip: None,
            remote_device_name: None,
        }
    }

    /// Rows are keyed by ifIndex alone, so a second neighbor on the same port overwrites the first.
    fn note_device(&mut self, row: &str, device_index: u64) {
        match self.device_index {
            None => self.device_index = Some(device_index),
            Some(seen) if seen != device_index && !self.shared_port_reported => {
                warn!(
                    row,
                    first = seen,
                    other = device_index,
                    "several CDP neighbors share one local interface, keeping the last one seen"
                );
                self.shared_port_reported = true;
            }
            Some(_) => {}
        }
    }

    fn apply(&mut self, column: CacheColumn, value: &BindingValue) -> Result<(), DecodeError> {
        match column {
            CacheColumn::Address => self.remote_ip = Some(decode_address_value(value)?),
            CacheColumn::DeviceId => self.remote_device_name = Some(value.to_display_string()),
            CacheColumn::DevicePort => {
                self.remote_interface = Some(compact_if_name(&value.to_display_string()))
            }
        }
        Ok(())
    }

    fn build(self, row: &str, local: &LocalDevice) -> Result<NeighborRecord, CdpError> {
        let mut missing = Vec::new();
        if self.remote_device_name.is_none() {
            missing.push("device id");
        }
        if self.remote_interface.is_none() {
            missing.push("device port");
        }
        if self.remote_ip.is_none() {
            missing.push("address");
        }

        match (self.remote_interface, self.remote_ip, self.remote_device_name) {
            (Some(remote_interface), Some(remote_ip), Some(remote_device_name)) => {
                Ok(NeighborRecord {
                    local_device_name: local.name.clone(),
                    local_ip: local.ip.clone(),
                    local_interface: self.local_interface,
                    remote_interface,
                    remote_ip: remote_ip.to_string(),
                    remote_device_name,
                })
            }
            _ => Err(CdpError::IncompleteRow {
                row: row.to_string(),
                missing,
            }),
        }
    }
}

/// ifDescr bindings, searched only when a new ifIndex shows up.
#[derive(Debug, Default)]
struct InterfaceDescriptions<'a> {
    bindings: Vec<&'a Binding>,
}

impl<'a> InterfaceDescriptions<'a> {
    fn push(&mut self, binding: &'a Binding) {
        self.bindings.push(binding);
    }

    fn lookup(&self, if_index: u64) -> Option<String> {
        self.bindings
            .iter()
            .find(|b| b.index_under(IF_DESCR) == Some(&[if_index][..]))
            .map(|b| b.value.to_display_string())
    }
}

/// Builds the neighbor table of one device from the bindings of a single walk.
///
/// `host` is the management address the device was queried on. Any row that cannot be
/// resolved or decoded fails the whole table.
pub fn build_neighbor_table(bindings: &[Binding], host: &str) -> Result<NeighborTable, CdpError> {
    let mut cache_entries: Vec<&Binding> = Vec::new();
    let mut interfaces = InterfaceDescriptions::default();
    let mut sys_name: Option<String> = None;

    for binding in bindings {
        if binding.index_under(CDP_CACHE_ENTRY).is_some() {
            cache_entries.push(binding);
        } else if binding.index_under(IF_DESCR).is_some() {
            interfaces.push(binding);
        } else if sys_name.is_none() && binding.index_under(SYS_NAME).is_some() {
            sys_name = Some(binding.value.to_display_string());
        }
    }

    let mut rows: BTreeMap<String, NeighborRowBuilder> = BTreeMap::new();
    for binding in cache_entries {
        let malformed = || DecodeError::MalformedIndex {
            oid: binding.oid_string(),
        };
        if binding.index_under(CDP_CACHE_ENTRY).map(<[u64]>::len) != Some(CACHE_INDEX_LEN) {
            return Err(malformed().into());
        }
        let column_arc = arc_from_end(&binding.oid, COLUMN_FROM_END).ok_or_else(malformed)?;
        let if_index = arc_from_end(&binding.oid, IF_INDEX_FROM_END).ok_or_else(malformed)?;
        let device_index = arc_from_end(&binding.oid, DEVICE_INDEX_FROM_END).ok_or_else(malformed)?;

        let Some(column) = CacheColumn::from_arc(column_arc) else {
            trace!(oid = %binding.oid_string(), "skipping unused cdpCacheEntry column");
            continue;
        };

        let row = if_index.to_string();
        let builder = match rows.entry(row.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let name = interfaces
                    .lookup(if_index)
                    .ok_or(LookupError::MissingInterface { if_index })?;
                entry.insert(NeighborRowBuilder::new(compact_if_name(&name)))
            }
        };
        builder.note_device(&row, device_index);
        builder.apply(column, &binding.value)?;
    }

    if rows.is_empty() {
        return Ok(NeighborTable::new());
    }

    let local = LocalDevice {
        name: sys_name.ok_or(LookupError::MissingDeviceName)?,
        ip: host.to_string(),
    };

    rows.into_iter()
        .map(|(row, builder)| builder.build(&row, &local).map(|record| (row, record)))
        .collect()
}
