use sastre_model::Id;

/// A device targeted by a template attach/detach or policy
/// activate/deactivate action. `system_ip` drives the chunk ordering
/// (spec.md §4.F) since it's the one field guaranteed present and stable
/// across a device's lifetime on the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: Id,
    pub system_ip: String,
    pub hostname: Option<String>,
}

impl Device {
    pub fn new(id: Id, system_ip: impl Into<String>) -> Self {
        Device {
            id,
            system_ip: system_ip.into(),
            hostname: None,
        }
    }
}

/// Partitions `devices` into chunks of at most `chunk_size`, after sorting
/// by system-ip ascending so repeated runs submit devices to the
/// controller in the same order (spec.md §4.F.1).
pub fn chunk_devices(mut devices: Vec<Device>, chunk_size: usize) -> Vec<Vec<Device>> {
    devices.sort_by(|a, b| a.system_ip.cmp(&b.system_ip));
    devices.chunks(chunk_size.max(1)).map(|c| c.to_vec()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_respect_size_and_system_ip_order() {
        let devices = vec![
            Device::new(Id::new("3"), "10.0.0.3"),
            Device::new(Id::new("1"), "10.0.0.1"),
            Device::new(Id::new("2"), "10.0.0.2"),
        ];
        let chunks = chunk_devices(devices, 2);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].iter().map(|d| d.system_ip.as_str()).collect::<Vec<_>>(), vec!["10.0.0.1", "10.0.0.2"]);
        assert_eq!(chunks[1].iter().map(|d| d.system_ip.as_str()).collect::<Vec<_>>(), vec!["10.0.0.3"]);
    }
}
