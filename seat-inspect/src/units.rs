//! Unit-kind dispatch and rendering.
//!
//! The manager's `ListUnits` descriptor does not say what kind of unit an
//! object is; the kind is discovered by probing the per-kind property
//! interfaces in a fixed priority order and taking the first one the object
//! exposes. Units exposing none of the known interfaces are dropped from the
//! grouped report.

use std::collections::HashSet;

use log::{debug, warn};
use seat_dbus::systemd1::{self, UnitInfo};
use seat_dbus::SYSTEMD_DEST;
use zbus::blocking::Connection;
use zbus::blocking::fdo::PropertiesProxy;
use zbus::names::InterfaceName;

use crate::console::Console;
use crate::error::Result;
use crate::format::format_timestamp;
use crate::journal::{journal_access_advisory, LogReader};
use crate::props::{self, PropBag};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceResult {
    Success,
    Resources,
    Timeout,
    ExitCode,
    Signal,
    CoreDump,
    Watchdog,
    StartLimit,
    Other(String),
}

impl From<&str> for ServiceResult {
    fn from(s: &str) -> Self {
        match s {
            "success" => ServiceResult::Success,
            "resources" => ServiceResult::Resources,
            "timeout" => ServiceResult::Timeout,
            "exit-code" => ServiceResult::ExitCode,
            "signal" => ServiceResult::Signal,
            "core-dump" => ServiceResult::CoreDump,
            "watchdog" => ServiceResult::Watchdog,
            "start-limit" => ServiceResult::StartLimit,
            _ => ServiceResult::Other(s.to_owned()),
        }
    }
}

impl ServiceResult {
    pub fn as_str(&self) -> &str {
        match self {
            ServiceResult::Success => "success",
            ServiceResult::Resources => "resources",
            ServiceResult::Timeout => "timeout",
            ServiceResult::ExitCode => "exit-code",
            ServiceResult::Signal => "signal",
            ServiceResult::CoreDump => "core-dump",
            ServiceResult::Watchdog => "watchdog",
            ServiceResult::StartLimit => "start-limit",
            ServiceResult::Other(s) => s,
        }
    }
}

/// Type-specific payload, one concrete variant per unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitKind {
    Timer {
        next_elapse: u64,
    },
    Socket {
        accept: bool,
        connections: u32,
    },
    Device {
        sysfs_path: String,
    },
    Target,
    Mount {
        mount_point: String,
        what: String,
        fstype: String,
        control_group: String,
    },
    Automount {
        mount_point: String,
    },
    Snapshot,
    Swap {
        what: String,
        slice: String,
        control_pid: u32,
    },
    Path {
        unit: String,
        paths: Vec<(String, String)>,
    },
    Slice {
        slice: String,
        control_group: String,
    },
    Scope {
        slice: String,
        control_group: String,
        controller: String,
    },
    Service {
        result: ServiceResult,
        active_exit: u64,
    },
}

impl UnitKind {
    pub fn label(&self) -> &'static str {
        match self {
            UnitKind::Timer { .. } => "timer",
            UnitKind::Socket { .. } => "socket",
            UnitKind::Device { .. } => "device",
            UnitKind::Target => "target",
            UnitKind::Mount { .. } => "mount",
            UnitKind::Automount { .. } => "automount",
            UnitKind::Snapshot => "snapshot",
            UnitKind::Swap { .. } => "swap",
            UnitKind::Path { .. } => "path",
            UnitKind::Slice { .. } => "slice",
            UnitKind::Scope { .. } => "scope",
            UnitKind::Service { .. } => "service",
        }
    }
}

/// Group labels in the same order the kinds are probed; `kind_index` into
/// this table is what the report groups by.
pub const KIND_LABELS: [&str; 12] = [
    "timer",
    "socket",
    "device",
    "target",
    "mount",
    "automount",
    "snapshot",
    "swap",
    "path",
    "slice",
    "scope",
    "service",
];

type KindCtor = fn(&mut PropBag) -> Result<UnitKind>;

/// Probe order and the explicit interface-to-constructor mapping.
const KIND_PROBES: [(&str, KindCtor); 12] = [
    (systemd1::IFACE_TIMER, kind_timer),
    (systemd1::IFACE_SOCKET, kind_socket),
    (systemd1::IFACE_DEVICE, kind_device),
    (systemd1::IFACE_TARGET, kind_target),
    (systemd1::IFACE_MOUNT, kind_mount),
    (systemd1::IFACE_AUTOMOUNT, kind_automount),
    (systemd1::IFACE_SNAPSHOT, kind_snapshot),
    (systemd1::IFACE_SWAP, kind_swap),
    (systemd1::IFACE_PATH, kind_path),
    (systemd1::IFACE_SLICE, kind_slice),
    (systemd1::IFACE_SCOPE, kind_scope),
    (systemd1::IFACE_SERVICE, kind_service),
];

fn kind_timer(bag: &mut PropBag) -> Result<UnitKind> {
    Ok(UnitKind::Timer {
        next_elapse: props::take_u64(bag, "NextElapseUSecRealtime")?,
    })
}

fn kind_socket(bag: &mut PropBag) -> Result<UnitKind> {
    Ok(UnitKind::Socket {
        accept: props::take_bool(bag, "Accept")?,
        connections: props::take_u32(bag, "NConnections")?,
    })
}

fn kind_device(bag: &mut PropBag) -> Result<UnitKind> {
    Ok(UnitKind::Device {
        sysfs_path: props::take_str(bag, "SysFSPath")?,
    })
}

fn kind_target(_bag: &mut PropBag) -> Result<UnitKind> {
    Ok(UnitKind::Target)
}

fn kind_mount(bag: &mut PropBag) -> Result<UnitKind> {
    Ok(UnitKind::Mount {
        mount_point: props::take_str(bag, "Where")?,
        what: props::take_str(bag, "What")?,
        fstype: props::take_str(bag, "Type")?,
        control_group: props::take_str(bag, "ControlGroup")?,
    })
}

fn kind_automount(bag: &mut PropBag) -> Result<UnitKind> {
    Ok(UnitKind::Automount {
        mount_point: props::take_str(bag, "Where")?,
    })
}

fn kind_snapshot(_bag: &mut PropBag) -> Result<UnitKind> {
    Ok(UnitKind::Snapshot)
}

fn kind_swap(bag: &mut PropBag) -> Result<UnitKind> {
    Ok(UnitKind::Swap {
        what: props::take_str(bag, "What")?,
        slice: props::take_str(bag, "Slice")?,
        control_pid: props::take_u32(bag, "ControlPID")?,
    })
}

fn kind_path(bag: &mut PropBag) -> Result<UnitKind> {
    Ok(UnitKind::Path {
        unit: props::take_str(bag, "Unit")?,
        paths: props::take_string_pairs(bag, "Paths")?,
    })
}

fn kind_slice(bag: &mut PropBag) -> Result<UnitKind> {
    Ok(UnitKind::Slice {
        slice: props::take_str(bag, "Slice")?,
        control_group: props::take_str(bag, "ControlGroup")?,
    })
}

fn kind_scope(bag: &mut PropBag) -> Result<UnitKind> {
    Ok(UnitKind::Scope {
        slice: props::take_str(bag, "Slice")?,
        control_group: props::take_str(bag, "ControlGroup")?,
        controller: props::take_str(bag, "Controller")?,
    })
}

fn kind_service(bag: &mut PropBag) -> Result<UnitKind> {
    Ok(UnitKind::Service {
        result: ServiceResult::from(props::take_str(bag, "Result")?.as_str()),
        // Read separately from the Unit interface after the probe.
        active_exit: 0,
    })
}

/// Generic descriptor plus the discovered type-specific payload.
#[derive(Debug)]
pub struct Unit {
    pub info: UnitInfo,
    pub kind: UnitKind,
}

impl Unit {
    pub fn failed(&self) -> bool {
        self.info.active_state == "failed"
            || self.info.sub_state == "failed"
            || self.info.load_state == "error"
    }

    pub fn kind_index(&self) -> usize {
        KIND_LABELS
            .iter()
            .position(|label| *label == self.kind.label())
            .unwrap_or(KIND_LABELS.len() - 1)
    }

    fn header(&self) -> String {
        format!(
            "  {}: {}, {} ({})",
            self.info.name, self.info.load_state, self.info.active_state, self.info.sub_state
        )
    }

    pub fn render(&self, console: &mut Console, journal: &mut Option<LogReader>) {
        let failed_service = matches!(self.kind, UnitKind::Service { .. }) && self.failed();

        if failed_service {
            console.alert(self.header());
        } else if self.info.sub_state == "dead" {
            console.attention(self.header());
        } else {
            console.info(self.header());
        }

        if let Some((id, job_type, _)) = self.info.queued_job() {
            console.info(format!("    queued job: {} (id {})", job_type, id));
        }

        match &self.kind {
            UnitKind::Timer { next_elapse } => {
                console.info(format!("    {}", self.info.description));
                if self.info.active_state == "active" {
                    console.info(format!("    next elapse: {}", format_timestamp(*next_elapse)));
                }
            }
            UnitKind::Socket {
                accept,
                connections,
            } => {
                if *accept {
                    console.info(format!("    {} connections accepted", connections));
                }
            }
            UnitKind::Device { sysfs_path } => {
                console.info(format!("    sysfs: {}", sysfs_path));
            }
            UnitKind::Target | UnitKind::Snapshot => {}
            UnitKind::Mount {
                mount_point,
                what,
                fstype,
                control_group,
            } => {
                console.info(format!(
                    "    {} on {} type {}, control group {}",
                    what, mount_point, fstype, control_group
                ));
            }
            UnitKind::Automount { mount_point } => {
                console.info(format!("    mounts {}", mount_point));
            }
            UnitKind::Swap {
                what,
                slice,
                control_pid,
            } => {
                console.info(format!(
                    "    backed by {}, slice {}, control pid {}",
                    what, slice, control_pid
                ));
            }
            UnitKind::Path { unit, paths } => {
                console.info(format!("    activates {}", unit));
                for (watch_type, path) in paths {
                    console.info(format!("    watches {} ({})", path, watch_type));
                }
            }
            UnitKind::Slice {
                slice,
                control_group,
            } => {
                console.info(format!("    slice {}, control group {}", slice, control_group));
            }
            UnitKind::Scope {
                slice,
                control_group,
                controller,
            } => {
                console.info(format!(
                    "    slice {}, control group {}, controller {}",
                    slice, control_group, controller
                ));
            }
            UnitKind::Service {
                result,
                active_exit,
            } => {
                if failed_service {
                    console.detail(format!(
                        "    result: {}, left active state: {}",
                        result.as_str(),
                        format_timestamp(*active_exit)
                    ));
                    self.render_journal_entries(console, journal);
                } else {
                    console.info(format!(
                        "    result: {}, left active state: {}",
                        result.as_str(),
                        format_timestamp(*active_exit)
                    ));
                }
            }
        }
    }

    fn render_journal_entries(&self, console: &mut Console, journal: &mut Option<LogReader>) {
        if let Some(reader) = journal {
            match reader.entries_for_unit(&self.info.name) {
                Ok(entries) if entries.is_empty() => {
                    console.detail("    no journal entries for this unit");
                }
                Ok(entries) => {
                    let mut explained = HashSet::new();
                    for entry in entries {
                        console.detail(format!("    {}", entry.render_line()));
                        if let (Some(id), Some(catalog)) = (&entry.message_id, &entry.catalog) {
                            if explained.insert(id.clone()) {
                                for line in catalog.lines() {
                                    console.detail(format!("      {}", line));
                                }
                            }
                        }
                    }
                }
                Err(err) => warn!("journal query for {} failed: {}", self.info.name, err),
            }
        }
        if let Some(advisory) = journal_access_advisory() {
            console.warn(format!("    {}", advisory));
        }
    }
}

/// Probe the unit's per-kind interfaces in priority order and build the
/// matching variant. Returns `None` when no known interface is exposed.
pub fn dispatch_unit(conn: &Connection, info: UnitInfo) -> Result<Option<Unit>> {
    let properties = PropertiesProxy::builder(conn)
        .destination(SYSTEMD_DEST)?
        .path(info.object_path.as_str().to_owned())?
        .build()?;

    for &(iface, ctor) in &KIND_PROBES {
        let name = InterfaceName::from_static_str_unchecked(iface);
        let mut bag = match properties.get_all(Some(name).into()) {
            Ok(bag) => bag,
            Err(_) => continue,
        };

        let mut kind = ctor(&mut bag)?;
        if let UnitKind::Service { active_exit, .. } = &mut kind {
            let unit_iface = InterfaceName::from_static_str_unchecked(systemd1::IFACE_UNIT);
            let value = properties.get(unit_iface, "ActiveExitTimestamp")?;
            *active_exit = props::value_u64(value, "ActiveExitTimestamp")?;
        }
        return Ok(Some(Unit { info, kind }));
    }

    debug!("unit {} exposes no known kind interface, skipped", info.name);
    Ok(None)
}
