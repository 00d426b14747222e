use std::{io, net::SocketAddr, time::Duration};

use async_trait::async_trait;
use snmp2::{AsyncSession, Oid};
use thiserror::Error;
use tracing::{debug, warn};

use super::{
    core::{Binding, BindingSource, BindingValue, format_oid},
    walk::BulkWalk,
};

/// Default SNMP agent port.
pub const SNMP_PORT: u16 = 161;

/// Failures of the protocol session itself. Data inside a successful response is never
/// reported here.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to resolve address {host}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to open SNMP session to {address}")]
    Open {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("invalid OID {0}")]
    InvalidOid(String),
    #[error("invalid query: {0}")]
    InvalidQuery(&'static str),
    #[error("SNMP request to {address} failed: {reason}")]
    Request { address: SocketAddr, reason: String },
    #[error("no response from {address} after {attempts} attempt(s)")]
    Timeout { address: SocketAddr, attempts: u32 },
}

/// SNMP v2c client for a single network device.
///
/// The client only keeps settings. Every walk opens its own session and drops it before
/// returning, so no socket outlives a query.
#[derive(Debug, Clone)]
pub struct SnmpClient {
    address: SocketAddr,
    community: String,
    timeout: Duration,
    retries: u32,
    max_repetitions: u32,
    max_rounds: usize,
}

impl SnmpClient {
    /// Creates a new SNMP client for a single network device.
    pub fn new(address: SocketAddr, community: &str) -> Self {
        Self {
            address,
            community: community.to_string(),
            timeout: Duration::from_secs(3),
            retries: 1,
            max_repetitions: 10,
            max_rounds: 64,
        }
    }

    /// Resolves `host` (name or literal, without port) against `port`.
    pub async fn resolve(host: &str, port: u16, community: &str) -> Result<Self, SessionError> {
        let resolve_error = |source| SessionError::Resolve {
            host: host.to_string(),
            source,
        };
        let mut addrs = tokio::net::lookup_host((host, port))
            .await
            .map_err(resolve_error)?;
        let address = addrs.next().ok_or_else(|| {
            resolve_error(io::Error::new(io::ErrorKind::NotFound, "no addresses found"))
        })?;
        Ok(Self::new(address, community))
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_max_repetitions(mut self, max_repetitions: u32) -> Self {
        self.max_repetitions = max_repetitions;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    /// Start building a new query on a fresh session.
    pub async fn query(&self) -> Result<QueryBuilder, SessionError> {
        let session = open_session(self.address, &self.community).await?;
        Ok(QueryBuilder {
            session,
            address: self.address,
            community: self.community.clone(),
            oids: Vec::new(),
            timeout: self.timeout,
            retries: self.retries,
            non_repeaters: 0,
            max_repetitions: self.max_repetitions,
        })
    }
}

async fn open_session(address: SocketAddr, community: &str) -> Result<AsyncSession, SessionError> {
    AsyncSession::new_v2c(address, community.as_bytes(), 0)
        .await
        .map_err(|source| SessionError::Open { address, source })
}

/// A GETBULK request bound to an open session.
///
/// A failed attempt leaves the session's socket behind: the retry goes out on a new
/// one, so a late answer to the old request can never be read as the answer to a
/// later one.
pub struct QueryBuilder {
    session: AsyncSession,
    address: SocketAddr,
    community: String,
    oids: Vec<Oid<'static>>,
    timeout: Duration,
    retries: u32,
    non_repeaters: u32,
    max_repetitions: u32,
}

impl QueryBuilder {
    pub fn get_bulk(mut self, non_repeaters: u32, max_repetitions: u32) -> Self {
        self.non_repeaters = non_repeaters;
        self.max_repetitions = max_repetitions;
        self
    }

    /// Replaces the requested names, keeping the session.
    pub fn set_oids<'a>(
        &mut self,
        starts: impl IntoIterator<Item = &'a [u64]>,
    ) -> Result<(), SessionError> {
        self.oids.clear();
        for arcs in starts {
            let oid = Oid::from(arcs).map_err(|_| SessionError::InvalidOid(format_oid(arcs)))?;
            self.oids.push(oid);
        }
        Ok(())
    }

    /// Sends the request, retrying on silence or a stray answer, and returns the
    /// response bindings.
    pub async fn execute(&mut self) -> Result<Vec<Binding>, SessionError> {
        if self.oids.is_empty() {
            return Err(SessionError::InvalidQuery("no OIDs requested"));
        }

        let oid_refs: Vec<&Oid> = self.oids.iter().collect();
        let attempts = self.retries + 1;

        for attempt in 1..=attempts {
            if attempt > 1 {
                self.session = open_session(self.address, &self.community).await?;
            }

            let request = self
                .session
                .getbulk(&oid_refs, self.non_repeaters, self.max_repetitions);

            let response = match tokio::time::timeout(self.timeout, request).await {
                Ok(Ok(pdu)) => pdu,
                Ok(Err(snmp2::Error::RequestIdMismatch)) => {
                    debug!(
                        address = %self.address,
                        attempt,
                        "discarded answer to an earlier request"
                    );
                    continue;
                }
                Ok(Err(e)) => {
                    return Err(SessionError::Request {
                        address: self.address,
                        reason: format!("{e:?}"),
                    });
                }
                Err(_) => {
                    debug!(address = %self.address, attempt, "GETBULK timed out");
                    continue;
                }
            };

            if response.error_status != 0 {
                warn!(
                    address = %self.address,
                    error_status = response.error_status,
                    error_index = response.error_index,
                    "device reported an error status, keeping partial response"
                );
            }

            let bindings = response
                .varbinds
                .map(|(oid, value)| Binding {
                    oid: oid
                        .iter()
                        .map(|arcs| arcs.collect::<Vec<u64>>())
                        .unwrap_or_default(),
                    value: BindingValue::from(&value),
                })
                .collect();
            return Ok(bindings);
        }

        Err(SessionError::Timeout {
            address: self.address,
            attempts,
        })
    }
}

#[async_trait]
impl BindingSource for SnmpClient {
    async fn bulk_walk(&mut self, roots: &[&[u64]]) -> Result<Vec<Binding>, SessionError> {
        if roots.is_empty() {
            return Err(SessionError::InvalidQuery("no sub-trees to walk"));
        }

        // Session lives for this walk only and is dropped on every return path.
        let mut query = self.query().await?.get_bulk(0, self.max_repetitions);
        let mut walk = BulkWalk::new(roots);

        while !walk.is_finished() {
            if walk.rounds() >= self.max_rounds {
                warn!(
                    address = %self.address,
                    rounds = walk.rounds(),
                    "bulk walk round limit reached, stopping"
                );
                walk.abandon();
                break;
            }

            let pending = walk.pending();
            query.set_oids(pending.iter().map(|(_, start)| start.as_slice()))?;

            let response = query.execute().await?;
            debug!(
                address = %self.address,
                round = walk.rounds() + 1,
                subtrees = pending.len(),
                bindings = response.len(),
                "GETBULK round"
            );

            let slots: Vec<usize> = pending.iter().map(|(slot, _)| *slot).collect();
            walk.absorb(&slots, response);
        }

        Ok(walk.into_bindings())
    }
}
