//! Journal cross-referencing for failed services.
//!
//! One reader is opened for the whole run and reused per unit; matches are
//! flushed between queries. Closing is left to `Drop` so the reader is
//! released on every exit path.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use libsystemd_sys::journal::sd_journal_get_catalog_for_message_id;
use nix::unistd::{geteuid, getgroups, Group};
use systemd::id128::Id128;
use systemd::journal::{Journal, JournalSeek, OpenOptions};

use crate::error::{InspectError, Result};
use crate::format::{format_system_time, NEVER};

/// One journal entry, already reduced to the fields the report renders.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: Option<String>,
    pub hostname: Option<String>,
    pub identifier: Option<String>,
    pub pid: Option<String>,
    pub message: Option<String>,
    pub message_id: Option<String>,
    pub catalog: Option<String>,
}

impl LogEntry {
    pub fn render_line(&self) -> String {
        format!(
            "{} {} {}[{}]: {}",
            self.timestamp.as_deref().unwrap_or(NEVER),
            self.hostname.as_deref().unwrap_or("?"),
            self.identifier.as_deref().unwrap_or("?"),
            self.pid.as_deref().unwrap_or("?"),
            self.message.as_deref().unwrap_or(""),
        )
    }
}

pub struct LogReader {
    journal: Journal,
    boot_id: String,
    machine_id: String,
}

impl LogReader {
    pub fn open() -> Result<Self> {
        let journal = OpenOptions::default()
            .open()
            .map_err(InspectError::Journal)?;
        let boot_id = id128_hex(Id128::from_boot().map_err(InspectError::Journal)?.as_bytes());
        let machine_id =
            id128_hex(Id128::from_machine().map_err(InspectError::Journal)?.as_bytes());
        Ok(LogReader {
            journal,
            boot_id,
            machine_id,
        })
    }

    /// Entries for one unit, this boot and machine, informational severity
    /// or above, in chronological order. The unit is matched under either
    /// of its two tag keys; the common filters are repeated on both
    /// branches of the disjunction.
    pub fn entries_for_unit(&mut self, unit: &str) -> Result<Vec<LogEntry>> {
        self.journal.match_flush().map_err(InspectError::Journal)?;
        self.add_common_matches("_SYSTEMD_UNIT", unit)?;
        self.journal.match_or().map_err(InspectError::Journal)?;
        self.add_common_matches("UNIT", unit)?;

        self.journal
            .seek(JournalSeek::Head)
            .map_err(InspectError::Journal)?;

        let mut entries = Vec::new();
        while self.journal.next().map_err(InspectError::Journal)? != 0 {
            entries.push(self.current_entry());
        }
        Ok(entries)
    }

    fn add_common_matches(&mut self, key: &str, unit: &str) -> Result<()> {
        let boot_id = self.boot_id.clone();
        let machine_id = self.machine_id.clone();
        self.journal
            .match_add("_BOOT_ID", boot_id)
            .map_err(InspectError::Journal)?;
        self.journal
            .match_add("_MACHINE_ID", machine_id)
            .map_err(InspectError::Journal)?;
        // PRIORITY 0..=6 is emergency through informational; matches on the
        // same field are OR'd by sd-journal.
        for priority in 0..=6u8 {
            self.journal
                .match_add("PRIORITY", priority.to_string())
                .map_err(InspectError::Journal)?;
        }
        self.journal
            .match_add(key, unit.to_owned())
            .map_err(InspectError::Journal)?;
        Ok(())
    }

    fn current_entry(&mut self) -> LogEntry {
        let timestamp = self.journal.timestamp().ok().map(format_system_time);
        let hostname = field(&mut self.journal, "_HOSTNAME");
        let identifier = field(&mut self.journal, "SYSLOG_IDENTIFIER")
            .or_else(|| field(&mut self.journal, "_COMM"));
        let pid = field(&mut self.journal, "_PID");
        let message = field(&mut self.journal, "MESSAGE");
        let message_id = field(&mut self.journal, "MESSAGE_ID");
        let catalog = message_id.as_deref().and_then(catalog_for_message_id);

        LogEntry {
            timestamp,
            hostname,
            identifier,
            pid,
            message,
            message_id,
            catalog,
        }
    }
}

fn field(journal: &mut Journal, key: &str) -> Option<String> {
    journal
        .get_data(key)
        .ok()
        .flatten()
        .and_then(|f| f.value().map(|v| String::from_utf8_lossy(v).into_owned()))
}

fn id128_hex(bytes: &[u8; 16]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(32);
    for byte in bytes {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

/// Catalog text attached to a message id, if the catalog knows it. Not
/// wrapped by the high-level journal crate, so this goes through the sys
/// binding directly.
fn catalog_for_message_id(message_id: &str) -> Option<String> {
    let raw = CString::new(message_id).ok()?;
    let id = Id128::from_cstr(&raw).ok()?;

    let mut text: *const c_char = ptr::null();
    let rc = unsafe {
        sd_journal_get_catalog_for_message_id(
            *id.as_raw(),
            &mut text as *mut *const c_char,
        )
    };
    if rc < 0 || text.is_null() {
        return None;
    }
    let catalog = unsafe { CStr::from_ptr(text) }
        .to_string_lossy()
        .trim_end()
        .to_owned();
    unsafe { libc::free(text.cast_mut().cast()) };
    Some(catalog)
}

/// Advisory shown under failed services when the caller cannot read the
/// full journal.
pub fn journal_access_advisory() -> Option<String> {
    if has_journal_access() {
        None
    } else {
        Some(
            "journal entries may be invisible: you are not in the systemd-journal or root group"
                .to_owned(),
        )
    }
}

fn has_journal_access() -> bool {
    if geteuid().is_root() {
        return true;
    }
    let groups = match getgroups() {
        Ok(groups) => groups,
        Err(_) => return false,
    };
    for gid in groups {
        if let Ok(Some(group)) = Group::from_gid(gid) {
            if group.name == "systemd-journal" || group.name == "root" {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id128_renders_as_32_hex_chars() {
        let bytes: [u8; 16] = [
            0x00, 0x01, 0x0a, 0x10, 0xff, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0xfe,
        ];
        let hex = id128_hex(&bytes);
        assert_eq!(hex.len(), 32);
        assert_eq!(&hex[..8], "00010a10");
        assert!(hex.ends_with("fe"));
    }

    #[test]
    fn entry_line_fills_missing_fields() {
        let entry = LogEntry {
            timestamp: Some("2026-08-06 10:00:01".to_owned()),
            hostname: Some("host".to_owned()),
            identifier: Some("sshd".to_owned()),
            pid: Some("123".to_owned()),
            message: Some("refused connect".to_owned()),
            message_id: None,
            catalog: None,
        };
        assert_eq!(
            entry.render_line(),
            "2026-08-06 10:00:01 host sshd[123]: refused connect"
        );

        let sparse = LogEntry {
            timestamp: None,
            hostname: None,
            identifier: None,
            pid: None,
            message: None,
            message_id: None,
            catalog: None,
        };
        assert_eq!(sparse.render_line(), "-- ? ?[?]: ");
    }

    #[test]
    #[ignore = "requires a readable journal on the host"]
    fn live_journal_query_does_not_error() {
        let mut reader = LogReader::open().unwrap();
        let entries = reader.entries_for_unit("systemd-journald.service").unwrap();
        dbg!(entries.len());
    }
}
