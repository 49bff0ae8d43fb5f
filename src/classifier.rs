use crate::device::{Device, DeviceTable, parse_hardware_address};
use crate::logging::LogSink;
use pnet_base::MacAddr;
use pnet_packet::ethernet::EthernetPacket;

/// Returns the first device in table order with this source address.
pub fn classify<'a>(source: &MacAddr, table: &'a DeviceTable) -> Option<&'a Device> {
    table.iter().find(|device| device.hardware_address == *source)
}

/// Same as [`classify`] for a textual address. Case does not matter;
/// text that is not a MAC address never matches.
pub fn classify_str<'a>(source: &str, table: &'a DeviceTable) -> Option<&'a Device> {
    let source = parse_hardware_address(source)?;
    classify(&source, table)
}

/// Pulls the Ethernet source address out of a captured frame.
/// `None` if the frame is too short to carry an Ethernet header.
pub fn source_address(frame: &[u8]) -> Option<MacAddr> {
    EthernetPacket::new(frame).map(|ethernet| ethernet.get_source())
}

/// Classifies a raw captured frame. Frames without a usable Ethernet header
/// are reported at debug level and treated as no match.
pub fn classify_frame<'a>(frame: &[u8], table: &'a DeviceTable, sink: &dyn LogSink) -> Option<&'a Device> {
    match source_address(frame) {
        Some(source) => classify(&source, table),
        None => {
            sink.debug(&format!("Ignoring frame without an Ethernet header ({} bytes)", frame.len()));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::ActionSpec;
    use crate::logging::testing::RecordingSink;

    fn device(name: &str, mac: &str) -> Device {
        Device {
            name: name.to_string(),
            hardware_address: mac.parse().unwrap(),
            action: ActionSpec::direct("http://example.test/trigger"),
        }
    }

    // Broadcast ARP request as sent by a button waking up.
    fn arp_frame(source: [u8; 6]) -> Vec<u8> {
        let mut frame = vec![0xff; 6];
        frame.extend_from_slice(&source);
        frame.extend_from_slice(&[0x08, 0x06]);
        frame.extend_from_slice(&[0u8; 28]);
        frame
    }

    #[test]
    fn test_match_is_case_insensitive() {
        // ARRANGE
        let table = DeviceTable::new(vec![device("Lower", "aa:bb:cc:dd:ee:ff")]);

        // ACT
        let result = classify_str("AA:BB:CC:DD:EE:FF", &table);

        // ASSERT
        assert_eq!(result.map(|d| d.name.as_str()), Some("Lower"));
    }

    #[test]
    fn test_duplicate_address_returns_first_entry() {
        // ARRANGE
        let table = DeviceTable::new(vec![
            device("DeviceA", "10:20:30:40:50:60"),
            device("DeviceB", "10:20:30:40:50:60"),
        ]);

        // ACT
        let result = classify(&MacAddr(0x10, 0x20, 0x30, 0x40, 0x50, 0x60), &table);

        // ASSERT
        assert_eq!(result.map(|d| d.name.as_str()), Some("DeviceA"));
    }

    #[test]
    fn test_unknown_address_no_match() {
        // ARRANGE
        let table = DeviceTable::new(vec![device("Known", "10:20:30:40:50:60")]);
        let sink = RecordingSink::default();

        // ACT
        let result = classify_frame(&arp_frame([1, 2, 3, 4, 5, 6]), &table, &sink);

        // ASSERT
        assert!(result.is_none());
        assert!(sink.lines().is_empty(), "unknown sources are silent");
    }

    #[test]
    fn test_frame_source_is_classified() {
        // ARRANGE
        let table = DeviceTable::new(vec![device("Known", "10:20:30:40:50:60")]);
        let sink = RecordingSink::default();

        // ACT
        let result = classify_frame(&arp_frame([0x10, 0x20, 0x30, 0x40, 0x50, 0x60]), &table, &sink);

        // ASSERT
        assert_eq!(result.map(|d| d.name.as_str()), Some("Known"));
    }

    #[test]
    fn test_runt_frame_is_logged_not_matched() {
        // ARRANGE
        let table = DeviceTable::new(vec![device("Known", "10:20:30:40:50:60")]);
        let sink = RecordingSink::default();

        // ACT
        let result = classify_frame(&[0x10, 0x20, 0x30], &table, &sink);

        // ASSERT
        assert!(result.is_none());
        assert_eq!(sink.lines()[0].0, log::Level::Debug);
    }

    #[test]
    fn test_garbage_text_no_match() {
        // ARRANGE
        let table = DeviceTable::new(vec![device("Known", "10:20:30:40:50:60")]);

        // ACT
        let result = classify_str("zz:zz", &table);

        // ASSERT
        assert!(result.is_none());
    }
}
