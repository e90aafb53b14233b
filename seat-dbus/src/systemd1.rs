//! Proxy for the `org.freedesktop.systemd1` manager plus the names of the
//! per-kind unit property interfaces.

use serde::{Deserialize, Serialize};
use zbus::proxy;
use zbus::zvariant::{OwnedObjectPath, Type};

/// One row of `ListUnits`: the generic unit descriptor. Type-specific
/// properties live on the per-kind interfaces below and are fetched
/// separately.
#[derive(Debug, Clone, Type, Serialize, Deserialize)]
pub struct UnitInfo {
    pub name: String,
    pub description: String,
    /// `loaded`, `error`, `masked`, ...
    pub load_state: String,
    /// `active`, `inactive`, `failed`, ...
    pub active_state: String,
    /// `running`, `dead`, `failed`, ...
    pub sub_state: String,
    /// Unit being followed in state, empty if none.
    pub followed: String,
    pub object_path: OwnedObjectPath,
    /// Queued job for this unit, id 0 if none.
    pub job_id: u32,
    pub job_type: String,
    pub job_path: OwnedObjectPath,
}

impl UnitInfo {
    pub fn queued_job(&self) -> Option<(u32, &str, &OwnedObjectPath)> {
        if self.job_id == 0 {
            None
        } else {
            Some((self.job_id, self.job_type.as_str(), &self.job_path))
        }
    }
}

#[proxy(
    interface = "org.freedesktop.systemd1.Manager",
    default_service = "org.freedesktop.systemd1",
    default_path = "/org/freedesktop/systemd1"
)]
pub trait Manager {
    fn list_units(&self) -> zbus::Result<Vec<UnitInfo>>;

    #[zbus(property)]
    fn version(&self) -> zbus::Result<String>;
}

pub const IFACE_UNIT: &str = "org.freedesktop.systemd1.Unit";

pub const IFACE_TIMER: &str = "org.freedesktop.systemd1.Timer";
pub const IFACE_SOCKET: &str = "org.freedesktop.systemd1.Socket";
pub const IFACE_DEVICE: &str = "org.freedesktop.systemd1.Device";
pub const IFACE_TARGET: &str = "org.freedesktop.systemd1.Target";
pub const IFACE_MOUNT: &str = "org.freedesktop.systemd1.Mount";
pub const IFACE_AUTOMOUNT: &str = "org.freedesktop.systemd1.Automount";
pub const IFACE_SNAPSHOT: &str = "org.freedesktop.systemd1.Snapshot";
pub const IFACE_SWAP: &str = "org.freedesktop.systemd1.Swap";
pub const IFACE_PATH: &str = "org.freedesktop.systemd1.Path";
pub const IFACE_SLICE: &str = "org.freedesktop.systemd1.Slice";
pub const IFACE_SCOPE: &str = "org.freedesktop.systemd1.Scope";
pub const IFACE_SERVICE: &str = "org.freedesktop.systemd1.Service";
