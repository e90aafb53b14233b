//! zbus proxies and wire types for the login manager
//! (`org.freedesktop.login1`) and the service manager
//! (`org.freedesktop.systemd1`).
//!
//! Reference https://www.freedesktop.org/wiki/Software/systemd/logind/

pub mod login1;
pub mod systemd1;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const LOGIN_DEST: &str = "org.freedesktop.login1";
pub const SYSTEMD_DEST: &str = "org.freedesktop.systemd1";
