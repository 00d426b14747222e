/*!
Caller-facing neighbor provider interface.

This module defines:
- `TopologyError`: the single failure a query reports to its caller.
- `NeighborSource`: an async trait that returns the finished neighbor table of one device.
*/

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    data_aquisition::snmp::SessionError,
    parsers::cdp_parser::{CdpError, neighbor::NeighborTable},
};

/// Error type for neighbor retrieval.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// The device could not be walked at all.
    #[error("could not walk the device")]
    Acquisition(#[from] SessionError),
    /// The walk came back but does not describe a consistent neighbor table.
    #[error("device returned an inconsistent neighbor table")]
    Protocol(#[from] CdpError),
    #[error("query did not finish within {}", format_deadline(.0))]
    DeadlineExceeded(Duration),
}

fn format_deadline(deadline: &Duration) -> String {
    humantime::format_duration(*deadline).to_string()
}

/// Convenience result alias for topology operations.
pub type TopologyResult<T> = Result<T, TopologyError>;

/// Provides the neighbor table of one device per call. No state is kept between calls.
#[async_trait]
pub trait NeighborSource: Send {
    async fn fetch_neighbors(&mut self) -> TopologyResult<NeighborTable>;
}
