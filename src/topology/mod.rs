/*!
Topology module

Structure:
- `source`: the caller-facing `NeighborSource` trait and its error type.
- `cdp`: CDP neighbor query over any `BindingSource`, with `CdpSnmpTopology`
         as the SNMP-backed default and `query_neighbors` as the one-call entry point.
*/

pub mod cdp;
pub mod source;

pub use cdp::{CdpSnmpTopology, CdpTopology, query_neighbors};
pub use source::{NeighborSource, TopologyError, TopologyResult};
