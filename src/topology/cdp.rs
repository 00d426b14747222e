use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::{
    config::DiscoveryConfig,
    data_aquisition::{core::BindingSource, snmp::SnmpClient},
    parsers::cdp_parser::{
        neighbor::{NeighborTable, build_neighbor_table},
        oids::NEIGHBOR_WALK_ROOTS,
    },
    topology::source::{NeighborSource, TopologyError, TopologyResult},
};

/// CDP neighbor query against one device, generic over how the bindings are fetched.
pub struct CdpTopology<S: BindingSource> {
    source: S,
    host: String,
    deadline: Option<Duration>,
}

/// The default CDP-over-SNMP topology provider.
pub type CdpSnmpTopology = CdpTopology<SnmpClient>;

impl<S: BindingSource> CdpTopology<S> {
    /// `host` is reported as the management address of the queried device.
    pub fn new(source: S, host: impl Into<String>) -> Self {
        Self {
            source,
            host: host.into(),
            deadline: None,
        }
    }

    /// Bounds the whole query, every retry and walk round included.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    async fn query(&mut self) -> TopologyResult<NeighborTable> {
        let bindings = self.source.bulk_walk(&NEIGHBOR_WALK_ROOTS).await?;
        debug!(host = %self.host, bindings = bindings.len(), "walk finished");

        let table = build_neighbor_table(&bindings, &self.host)?;
        info!(host = %self.host, neighbors = table.len(), "CDP neighbors collected");
        Ok(table)
    }
}

#[async_trait]
impl<S: BindingSource> NeighborSource for CdpTopology<S> {
    async fn fetch_neighbors(&mut self) -> TopologyResult<NeighborTable> {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.query())
                .await
                .map_err(|_| TopologyError::DeadlineExceeded(deadline))?,
            None => self.query().await,
        }
    }
}

/// Queries the CDP neighbors of `host` over SNMP using `config`.
pub async fn query_neighbors(host: &str, config: &DiscoveryConfig) -> TopologyResult<NeighborTable> {
    let client = SnmpClient::resolve(host, config.port, &config.community)
        .await?
        .with_timeout(config.timeout())
        .with_retries(config.retries)
        .with_max_repetitions(config.max_repetitions)
        .with_max_rounds(config.max_rounds);

    let mut topology = CdpSnmpTopology::new(client, host).with_deadline(config.deadline());
    topology.fetch_neighbors().await
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use super::*;
    use crate::{
        data_aquisition::{
            core::{Binding, BindingValue},
            snmp::SessionError,
        },
        parsers::cdp_parser::{
            CdpError, LookupError,
            oids::{CDP_CACHE_ADDRESS, CDP_CACHE_DEVICE_ID, CDP_CACHE_DEVICE_PORT, IF_DESCR, SYS_NAME},
        },
    };

    /// Stands in for a device: replays a canned walk and records what was asked.
    struct ScriptedSource {
        bindings: Vec<Binding>,
        delay: Option<Duration>,
        fail: bool,
        requested: Vec<Vec<u64>>,
    }

    impl ScriptedSource {
        fn new(bindings: Vec<Binding>) -> Self {
            Self {
                bindings,
                delay: None,
                fail: false,
                requested: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl BindingSource for ScriptedSource {
        async fn bulk_walk(&mut self, roots: &[&[u64]]) -> Result<Vec<Binding>, SessionError> {
            self.requested = roots.iter().map(|r| r.to_vec()).collect();
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                let address: SocketAddr = "192.0.2.1:161".parse().unwrap();
                return Err(SessionError::Timeout { address, attempts: 2 });
            }
            Ok(self.bindings.clone())
        }
    }

    fn at(root: &[u64], index: &[u64], value: BindingValue) -> Binding {
        Binding::new(root.iter().chain(index).copied().collect::<Vec<_>>(), value)
    }

    fn text(s: &str) -> BindingValue {
        BindingValue::OctetString(s.as_bytes().to_vec())
    }

    fn device_walk() -> Vec<Binding> {
        vec![
            at(CDP_CACHE_DEVICE_ID, &[10101, 1], text("dist-1.example.net")),
            at(CDP_CACHE_DEVICE_ID, &[10102, 4], text("dist-2.example.net")),
            at(CDP_CACHE_DEVICE_PORT, &[10101, 1], text("TenGigabitEthernet1/0/1")),
            at(CDP_CACHE_DEVICE_PORT, &[10102, 4], text("TenGigabitEthernet1/0/1")),
            at(CDP_CACHE_ADDRESS, &[10101, 1], BindingValue::OctetString(vec![10, 1, 0, 1])),
            at(CDP_CACHE_ADDRESS, &[10102, 4], BindingValue::OctetString(vec![10, 1, 0, 2])),
            at(IF_DESCR, &[1], text("Vlan1")),
            at(IF_DESCR, &[10101], text("GigabitEthernet0/1")),
            at(IF_DESCR, &[10102], text("GigabitEthernet0/2")),
            at(SYS_NAME, &[0], text("access-7")),
        ]
    }

    #[tokio::test]
    async fn query_walks_all_roots_and_builds_table() {
        let mut topology = CdpTopology::new(ScriptedSource::new(device_walk()), "192.0.2.7");
        let table = topology.fetch_neighbors().await.unwrap();

        assert_eq!(topology.source.requested.len(), 5);
        assert_eq!(topology.source.requested[4], SYS_NAME.to_vec());

        assert_eq!(table.len(), 2);
        let fields: Vec<[&str; 7]> = table.values().map(|r| r.display_fields()).collect();
        assert_eq!(
            fields,
            vec![
                ["access-7", "192.0.2.7", "Gi 0/1", "->", "Te 1/0/1", "10.1.0.1", "dist-1.example.net"],
                ["access-7", "192.0.2.7", "Gi 0/2", "->", "Te 1/0/1", "10.1.0.2", "dist-2.example.net"],
            ]
        );
    }

    #[tokio::test]
    async fn session_failure_is_an_acquisition_error() {
        let mut source = ScriptedSource::new(Vec::new());
        source.fail = true;
        let mut topology = CdpTopology::new(source, "192.0.2.1");

        let err = topology.fetch_neighbors().await.unwrap_err();
        assert!(matches!(err, TopologyError::Acquisition(SessionError::Timeout { .. })));
    }

    #[tokio::test]
    async fn lookup_failure_returns_no_table() {
        let walk: Vec<Binding> = device_walk()
            .into_iter()
            .filter(|b| b.oid != [IF_DESCR, &[10102][..]].concat())
            .collect();
        let mut topology = CdpTopology::new(ScriptedSource::new(walk), "192.0.2.7");

        let err = topology.fetch_neighbors().await.unwrap_err();
        assert!(matches!(
            err,
            TopologyError::Protocol(CdpError::Lookup(LookupError::MissingInterface { if_index: 10102 }))
        ));
    }

    #[tokio::test]
    async fn deadline_bounds_the_whole_query() {
        let mut source = ScriptedSource::new(device_walk());
        source.delay = Some(Duration::from_secs(5));
        let mut topology = CdpTopology::new(source, "192.0.2.7")
            .with_deadline(Some(Duration::from_millis(20)));

        let err = topology.fetch_neighbors().await.unwrap_err();
        assert!(matches!(err, TopologyError::DeadlineExceeded(_)));
        assert_eq!(err.to_string(), "query did not finish within 20ms");
    }

    #[tokio::test]
    async fn each_query_starts_from_scratch() {
        let mut topology = CdpTopology::new(ScriptedSource::new(device_walk()), "192.0.2.7");
        let first = topology.fetch_neighbors().await.unwrap();

        topology.source.bindings = vec![at(SYS_NAME, &[0], text("access-7"))];
        let second = topology.fetch_neighbors().await.unwrap();

        assert_eq!(first.len(), 2);
        assert!(second.is_empty());
    }
}
