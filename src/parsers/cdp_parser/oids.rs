//! Sub-tree roots walked for a CDP neighbor query and the layout of their indices.

/// SNMPv2-MIB::sysName, the queried device's own identity.
pub const SYS_NAME: &[u64] = &[1, 3, 6, 1, 2, 1, 1, 5];

/// IF-MIB::ifDescr, indexed by ifIndex.
pub const IF_DESCR: &[u64] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 2];

/// CISCO-CDP-MIB::cdpCacheEntry.
pub const CDP_CACHE_ENTRY: &[u64] = &[1, 3, 6, 1, 4, 1, 9, 9, 23, 1, 2, 1, 1];

pub const CDP_CACHE_ADDRESS: &[u64] = &[1, 3, 6, 1, 4, 1, 9, 9, 23, 1, 2, 1, 1, 4];
pub const CDP_CACHE_DEVICE_ID: &[u64] = &[1, 3, 6, 1, 4, 1, 9, 9, 23, 1, 2, 1, 1, 6];
pub const CDP_CACHE_DEVICE_PORT: &[u64] = &[1, 3, 6, 1, 4, 1, 9, 9, 23, 1, 2, 1, 1, 7];

/// Roots requested in the single bulk walk, in request order.
pub const NEIGHBOR_WALK_ROOTS: [&[u64]; 5] = [
    CDP_CACHE_DEVICE_ID,
    CDP_CACHE_DEVICE_PORT,
    CDP_CACHE_ADDRESS,
    IF_DESCR,
    SYS_NAME,
];

/// A cdpCacheEntry index below the entry root reads `<column>.<ifIndex>.<deviceIndex>`.
pub const CACHE_INDEX_LEN: usize = 3;

// Positions counted from the end of the full OID.
pub const COLUMN_FROM_END: usize = 3;
pub const IF_INDEX_FROM_END: usize = 2;
pub const DEVICE_INDEX_FROM_END: usize = 1;

/// Columns of cdpCacheEntry this tool understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheColumn {
    Address,
    DeviceId,
    DevicePort,
}

impl CacheColumn {
    pub fn from_arc(arc: u64) -> Option<Self> {
        match arc {
            4 => Some(CacheColumn::Address),
            6 => Some(CacheColumn::DeviceId),
            7 => Some(CacheColumn::DevicePort),
            _ => None,
        }
    }
}

/// Component of `oid` at `offset` positions from its end (1 = last).
pub fn arc_from_end(oid: &[u64], offset: usize) -> Option<u64> {
    oid.len().checked_sub(offset).map(|i| oid[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_arcs_of_a_cache_oid() {
        let oid = [1, 3, 6, 1, 4, 1, 9, 9, 23, 1, 2, 1, 1, 6, 10101, 3];
        assert_eq!(arc_from_end(&oid, COLUMN_FROM_END), Some(6));
        assert_eq!(arc_from_end(&oid, IF_INDEX_FROM_END), Some(10101));
        assert_eq!(arc_from_end(&oid, DEVICE_INDEX_FROM_END), Some(3));
        assert_eq!(arc_from_end(&[1, 2], 3), None);
    }

    #[test]
    fn column_arcs_decode() {
        assert_eq!(CacheColumn::from_arc(4), Some(CacheColumn::Address));
        assert_eq!(CacheColumn::from_arc(6), Some(CacheColumn::DeviceId));
        assert_eq!(CacheColumn::from_arc(7), Some(CacheColumn::DevicePort));
        assert_eq!(CacheColumn::from_arc(5), None);
    }

    #[test]
    fn column_roots_sit_under_cache_entry() {
        for root in [CDP_CACHE_ADDRESS, CDP_CACHE_DEVICE_ID, CDP_CACHE_DEVICE_PORT] {
            assert!(root.starts_with(CDP_CACHE_ENTRY));
            assert!(CacheColumn::from_arc(root[CDP_CACHE_ENTRY.len()]).is_some());
        }
    }
}
