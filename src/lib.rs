//! CDP neighbor discovery over SNMP.
//!
//! A query walks the CDP cache, interface descriptions and sysName of one device
//! and returns its directly connected neighbors as a sorted [`NeighborTable`].

pub mod config;
pub mod data_aquisition;
pub mod output;
pub mod parsers;
pub mod topology;

pub use config::DiscoveryConfig;
pub use parsers::cdp_parser::neighbor::{NeighborRecord, NeighborTable};
pub use topology::{TopologyError, query_neighbors};
