/// Verbose interface type names and their short display forms, checked in this order.
const COMPACTIONS: [(&str, &str, &str); 3] = [
    ("Ten", "TenGigabitEthernet", "Te "),
    ("Gig", "GigabitEthernet", "Gi "),
    ("Fas", "FastEthernet", "Fa "),
];

/// Shortens a vendor interface name, e.g. `GigabitEthernet0/1` -> `Gi 0/1`.
/// Names of any other type are returned as they are.
pub fn compact_if_name(name: &str) -> String {
    for (prefix, verbose, short) in COMPACTIONS {
        if name.starts_with(prefix) {
            return name.replace(verbose, short);
        }
    }
    name.to_string()
}
