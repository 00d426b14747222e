//! Rendering of a neighbor table for the terminal.

use comfy_table::{Table, presets};

use crate::parsers::cdp_parser::neighbor::NeighborTable;

pub const HEADER: [&str; 7] = [
    "Name",
    "IP",
    "Local IF",
    "--",
    "Remote IF",
    "Remote IP",
    "Remote Name",
];

/// Borderless table, one line per neighbor in row-index order.
pub fn render_table(neighbors: &NeighborTable) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table.set_header(HEADER.to_vec());
    for record in neighbors.values() {
        table.add_row(record.display_fields().to_vec());
    }
    table
}

pub fn render_json(neighbors: &NeighborTable) -> serde_json::Result<String> {
    serde_json::to_string_pretty(neighbors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::cdp_parser::neighbor::NeighborRecord;

    fn sample() -> NeighborTable {
        let mut table = NeighborTable::new();
        table.insert(
            "2".to_string(),
            NeighborRecord {
                local_device_name: "core-sw".to_string(),
                local_ip: "192.0.2.10".to_string(),
                local_interface: "Gi 0/2".to_string(),
                remote_interface: "Fa 0/1".to_string(),
                remote_ip: "10.0.0.2".to_string(),
                remote_device_name: "access-2".to_string(),
            },
        );
        table
    }

    #[test]
    fn table_has_header_and_separator() {
        let rendered = render_table(&sample()).to_string();
        assert!(rendered.contains("Remote Name"));
        assert!(rendered.contains("->"));
        assert!(rendered.contains("access-2"));
        assert!(!rendered.contains('│'));
    }

    #[test]
    fn empty_table_renders_header_only() {
        let rendered = render_table(&NeighborTable::new()).to_string();
        assert!(rendered.contains("Local IF"));
        assert!(!rendered.contains("->"));
    }

    #[test]
    fn json_is_keyed_by_row() {
        let json = render_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["2"]["remote_ip"], "10.0.0.2");
        assert_eq!(value["2"]["local_interface"], "Gi 0/2");
    }
}
