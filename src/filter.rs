use crate::device::DeviceTable;

/// Filter used when there are no buttons: valid BPF that never matches.
///
/// libpcap's optimizer folds this to `ret #0` and then refuses it as
/// "expression rejects all packets", so it must be compiled unoptimized.
pub const MATCH_NOTHING: &str = "arp and not arp";

/// Whether `filter` may go through libpcap's optimizer.
pub fn optimize_filter(filter: &str) -> bool {
    filter != MATCH_NOTHING
}

/// Builds the BPF expression handed to libpcap: ARP frames whose Ethernet
/// source is one of the configured buttons.
///
/// Addresses are written in lowercase colon-hex, in table order, so the same
/// table always produces the same string.
pub fn build_filter(table: &DeviceTable) -> String {
    if table.is_empty() {
        return MATCH_NOTHING.to_string();
    }

    let clauses: Vec<String> = table
        .iter()
        .map(|device| format!("(ether src host {})", device.hardware_address))
        .collect();

    format!("arp and ({})", clauses.join(" or "))
}
