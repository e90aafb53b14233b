//! Proxies for `org.freedesktop.login1`: the manager plus the per-object
//! Seat, Session, and User interfaces.

use serde::{Deserialize, Serialize};
use zbus::proxy;
use zbus::zvariant::{OwnedObjectPath, Type};

/// One row of `ListSeats`.
#[derive(Debug, Clone, Type, Serialize, Deserialize)]
pub struct SeatInfo {
    pub id: String,
    pub path: OwnedObjectPath,
}

/// One row of `ListUsers`.
#[derive(Debug, Clone, Type, Serialize, Deserialize)]
pub struct UserInfo {
    pub uid: u32,
    pub name: String,
    pub path: OwnedObjectPath,
}

/// One row of `ListSessions`.
#[derive(Debug, Clone, Type, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: String,
    pub uid: u32,
    pub user: String,
    pub seat: String,
    pub path: OwnedObjectPath,
}

/// One row of `ListInhibitors`. `what` is a colon-joined set of operations,
/// `mode` is `block` or `delay`.
#[derive(Debug, Clone, Type, Serialize, Deserialize)]
pub struct InhibitorInfo {
    pub what: String,
    pub who: String,
    pub why: String,
    pub mode: String,
    pub uid: u32,
    pub pid: u32,
}

#[proxy(
    interface = "org.freedesktop.login1.Manager",
    default_service = "org.freedesktop.login1",
    default_path = "/org/freedesktop/login1"
)]
pub trait Manager {
    fn list_seats(&self) -> zbus::Result<Vec<SeatInfo>>;

    fn list_users(&self) -> zbus::Result<Vec<UserInfo>>;

    fn list_sessions(&self) -> zbus::Result<Vec<SessionInfo>>;

    fn list_inhibitors(&self) -> zbus::Result<Vec<InhibitorInfo>>;

    #[zbus(name = "GetSessionByPID")]
    fn get_session_by_pid(&self, pid: u32) -> zbus::Result<OwnedObjectPath>;

    /// Not supported by older logind versions; those answer with an
    /// access-denied error.
    #[zbus(name = "GetUserByPID")]
    fn get_user_by_pid(&self, pid: u32) -> zbus::Result<OwnedObjectPath>;

    /// All five capability queries answer `na`, `yes`, `no`, or `challenge`.
    fn can_power_off(&self) -> zbus::Result<String>;

    fn can_reboot(&self) -> zbus::Result<String>;

    fn can_suspend(&self) -> zbus::Result<String>;

    fn can_hibernate(&self) -> zbus::Result<String>;

    fn can_hybrid_sleep(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn idle_hint(&self) -> zbus::Result<bool>;

    #[zbus(property)]
    fn idle_since_hint(&self) -> zbus::Result<u64>;

    /// Colon-joined operations currently held by block-mode inhibitors.
    #[zbus(property)]
    fn block_inhibited(&self) -> zbus::Result<String>;

    /// Colon-joined operations currently held by delay-mode inhibitors.
    #[zbus(property)]
    fn delay_inhibited(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn preparing_for_shutdown(&self) -> zbus::Result<bool>;

    #[zbus(property)]
    fn preparing_for_sleep(&self) -> zbus::Result<bool>;
}

#[proxy(
    interface = "org.freedesktop.login1.Seat",
    default_service = "org.freedesktop.login1",
    assume_defaults = false
)]
pub trait Seat {
    #[zbus(property)]
    fn id(&self) -> zbus::Result<String>;

    /// `(session-id, object-path)` pairs; the id is empty when no session
    /// is active on the seat.
    #[zbus(property)]
    fn active_session(&self) -> zbus::Result<(String, OwnedObjectPath)>;

    #[zbus(property)]
    fn sessions(&self) -> zbus::Result<Vec<(String, OwnedObjectPath)>>;

    #[zbus(property)]
    fn can_multi_session(&self) -> zbus::Result<bool>;

    #[zbus(property, name = "CanTTY")]
    fn can_tty(&self) -> zbus::Result<bool>;

    #[zbus(property)]
    fn can_graphical(&self) -> zbus::Result<bool>;

    #[zbus(property)]
    fn idle_hint(&self) -> zbus::Result<bool>;

    #[zbus(property)]
    fn idle_since_hint(&self) -> zbus::Result<u64>;
}

#[proxy(
    interface = "org.freedesktop.login1.User",
    default_service = "org.freedesktop.login1",
    assume_defaults = false
)]
pub trait User {
    #[zbus(property, name = "UID")]
    fn uid(&self) -> zbus::Result<u32>;

    #[zbus(property, name = "GID")]
    fn gid(&self) -> zbus::Result<u32>;

    #[zbus(property)]
    fn name(&self) -> zbus::Result<String>;

    /// Login time, µs since the epoch.
    #[zbus(property)]
    fn timestamp(&self) -> zbus::Result<u64>;

    #[zbus(property)]
    fn runtime_path(&self) -> zbus::Result<String>;

    /// The `user@<uid>.service` unit backing this user.
    #[zbus(property)]
    fn service(&self) -> zbus::Result<String>;

    /// The `user-<uid>.slice` unit holding the user's sessions.
    #[zbus(property)]
    fn slice(&self) -> zbus::Result<String>;

    /// The display session, id empty when there is none.
    #[zbus(property)]
    fn display(&self) -> zbus::Result<(String, OwnedObjectPath)>;

    /// `offline`, `lingering`, `online`, `active`, or `closing`; newer
    /// logind versions may add values.
    #[zbus(property)]
    fn state(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn sessions(&self) -> zbus::Result<Vec<(String, OwnedObjectPath)>>;

    #[zbus(property)]
    fn idle_hint(&self) -> zbus::Result<bool>;

    #[zbus(property)]
    fn idle_since_hint(&self) -> zbus::Result<u64>;
}

#[proxy(
    interface = "org.freedesktop.login1.Session",
    default_service = "org.freedesktop.login1",
    assume_defaults = false
)]
pub trait Session {
    #[zbus(property)]
    fn id(&self) -> zbus::Result<String>;

    /// Owning user as `(uid, object-path)`.
    #[zbus(property)]
    fn user(&self) -> zbus::Result<(u32, OwnedObjectPath)>;

    /// Name of the owning user.
    #[zbus(property)]
    fn name(&self) -> zbus::Result<String>;

    /// Creation time, µs since the epoch.
    #[zbus(property)]
    fn timestamp(&self) -> zbus::Result<u64>;

    /// The seat, id empty for seatless (remote) sessions.
    #[zbus(property)]
    fn seat(&self) -> zbus::Result<(String, OwnedObjectPath)>;

    #[zbus(property, name = "TTY")]
    fn tty(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn display(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn remote(&self) -> zbus::Result<bool>;

    #[zbus(property)]
    fn remote_host(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn remote_user(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn service(&self) -> zbus::Result<String>;

    /// The `session-<id>.scope` unit holding the session's processes.
    #[zbus(property)]
    fn scope(&self) -> zbus::Result<String>;

    /// PID of the session leader.
    #[zbus(property)]
    fn leader(&self) -> zbus::Result<u32>;

    /// Kernel audit session id, 0 when auditing is unavailable.
    #[zbus(property)]
    fn audit(&self) -> zbus::Result<u32>;

    /// `unspecified`, `tty`, or `x11`; newer logind versions may add values.
    #[zbus(property, name = "Type")]
    fn session_type(&self) -> zbus::Result<String>;

    /// `user`, `greeter`, or `lock-screen`.
    #[zbus(property)]
    fn class(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn active(&self) -> zbus::Result<bool>;

    /// `online`, `active`, or `closing`.
    #[zbus(property)]
    fn state(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn idle_hint(&self) -> zbus::Result<bool>;

    #[zbus(property)]
    fn idle_since_hint(&self) -> zbus::Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_signatures_match_logind() {
        assert_eq!(SeatInfo::signature(), "(so)");
        assert_eq!(UserInfo::signature(), "(uso)");
        assert_eq!(SessionInfo::signature(), "(susso)");
        assert_eq!(InhibitorInfo::signature(), "(ssssuu)");
    }
}
