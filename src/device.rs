use crate::dispatch::ActionSpec;
use crate::error::StartupError;
use crate::logging::LogSink;
use crate::settings::ButtonSettings;
use pnet_base::MacAddr;

/// A button we know about.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    /// Only used in log lines; two buttons may share a name.
    pub name: String,
    pub hardware_address: MacAddr,
    pub action: ActionSpec,
}

/// The configured buttons, in file order. Built once at startup and never
/// changed afterwards, so it can be shared behind an `Arc` without locking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceTable {
    devices: Vec<Device>,
}

impl DeviceTable {
    pub fn new(devices: Vec<Device>) -> Self {
        DeviceTable { devices }
    }

    /// Builds the table from configuration, failing on the first MAC that
    /// does not parse.
    pub fn from_settings(buttons: &[ButtonSettings]) -> Result<Self, StartupError> {
        let devices = buttons
            .iter()
            .map(|button| -> Result<Device, StartupError> {
                let hardware_address =
                    parse_hardware_address(&button.mac).ok_or_else(|| StartupError::InvalidMac {
                        name: button.name.clone(),
                        mac: button.mac.clone(),
                    })?;

                Ok(Device {
                    name: button.name.clone(),
                    hardware_address,
                    action: ActionSpec::from(button),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DeviceTable { devices })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Device> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Startup summary: how many buttons and what each one does.
    pub fn log_summary(&self, sink: &dyn LogSink) {
        sink.info(&format!("Loaded {} button(s):", self.devices.len()));
        for device in &self.devices {
            sink.info(&format!(
                "- Button: {} ({}): {}, {:?}, {:?}",
                device.name,
                device.hardware_address,
                device.action.url,
                device.action.header,
                device.action.data
            ));
        }
    }
}

/// Parses a 48-bit address written as six two-digit hex groups separated by
/// `:` or `-` (one separator throughout), in either case.
pub fn parse_hardware_address(text: &str) -> Option<MacAddr> {
    let text = text.trim();
    let separator = if text.contains('-') { '-' } else { ':' };

    let mut octets = [0u8; 6];
    let mut groups = text.split(separator);
    for octet in octets.iter_mut() {
        let group = groups.next()?;
        if group.len() != 2 || !group.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        *octet = u8::from_str_radix(group, 16).ok()?;
    }
    if groups.next().is_some() {
        return None;
    }

    let [a, b, c, d, e, f] = octets;
    Some(MacAddr(a, b, c, d, e, f))
}

impl<'a> IntoIterator for &'a DeviceTable {
    type Item = &'a Device;
    type IntoIter = std::slice::Iter<'a, Device>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.iter()
    }
}
