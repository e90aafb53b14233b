use seat_dbus::login1::SessionProxyBlocking;
use zbus::blocking::Connection;
use zbus::zvariant::OwnedObjectPath;

use crate::console::Console;
use crate::error::Result;
use crate::format::{elapsed_since, format_timestamp, IdleStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionType {
    Unspecified,
    Tty,
    X11,
    Other(String),
}

impl From<&str> for SessionType {
    fn from(s: &str) -> Self {
        match s {
            "" | "unspecified" => SessionType::Unspecified,
            "tty" => SessionType::Tty,
            "x11" => SessionType::X11,
            _ => SessionType::Other(s.to_owned()),
        }
    }
}

impl SessionType {
    pub fn as_str(&self) -> &str {
        match self {
            SessionType::Unspecified => "unspecified",
            SessionType::Tty => "tty",
            SessionType::X11 => "x11",
            SessionType::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionClass {
    User,
    Greeter,
    LockScreen,
    Other(String),
}

impl From<&str> for SessionClass {
    fn from(s: &str) -> Self {
        match s {
            "user" => SessionClass::User,
            "greeter" => SessionClass::Greeter,
            "lock-screen" => SessionClass::LockScreen,
            _ => SessionClass::Other(s.to_owned()),
        }
    }
}

impl SessionClass {
    pub fn as_str(&self) -> &str {
        match self {
            SessionClass::User => "user",
            SessionClass::Greeter => "greeter",
            SessionClass::LockScreen => "lock-screen",
            SessionClass::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Online,
    Active,
    Closing,
    Other(String),
}

impl From<&str> for SessionState {
    fn from(s: &str) -> Self {
        match s {
            "online" => SessionState::Online,
            "active" => SessionState::Active,
            "closing" => SessionState::Closing,
            _ => SessionState::Other(s.to_owned()),
        }
    }
}

impl SessionState {
    pub fn as_str(&self) -> &str {
        match self {
            SessionState::Online => "online",
            SessionState::Active => "active",
            SessionState::Closing => "closing",
            SessionState::Other(s) => s,
        }
    }

    pub fn describe(&self) -> &str {
        match self {
            SessionState::Online => "session logged in, but not active",
            SessionState::Active => "session logged in and active",
            SessionState::Closing => "session ending, some processes still remain",
            SessionState::Other(_) => "description unknown",
        }
    }
}

/// Point-in-time snapshot of one login session.
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub uid: u32,
    pub user_name: String,
    pub path: OwnedObjectPath,
    pub created: u64,
    pub seat: Option<(String, OwnedObjectPath)>,
    pub tty: Option<String>,
    pub display: Option<String>,
    pub remote: bool,
    pub remote_host: String,
    pub remote_user: String,
    pub service: String,
    pub scope: String,
    pub leader: u32,
    pub audit: Option<u32>,
    pub kind: SessionType,
    pub class: SessionClass,
    pub active: bool,
    pub state: SessionState,
    pub idle: IdleStatus,
}

fn none_if_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

impl Session {
    pub fn from_bus(conn: &Connection, path: &OwnedObjectPath) -> Result<Self> {
        let proxy = SessionProxyBlocking::builder(conn)
            .path(path.as_str().to_owned())?
            .build()?;

        let (uid, _user_path) = proxy.user()?;
        let seat = proxy.seat()?;
        let seat = if seat.0.is_empty() { None } else { Some(seat) };
        let audit = match proxy.audit()? {
            0 => None,
            id => Some(id),
        };

        Ok(Session {
            id: proxy.id()?,
            uid,
            user_name: proxy.name()?,
            path: path.clone(),
            created: proxy.timestamp()?,
            seat,
            tty: none_if_empty(proxy.tty()?),
            display: none_if_empty(proxy.display()?),
            remote: proxy.remote()?,
            remote_host: proxy.remote_host()?,
            remote_user: proxy.remote_user()?,
            service: proxy.service()?,
            scope: proxy.scope()?,
            leader: proxy.leader()?,
            audit,
            kind: SessionType::from(proxy.session_type()?.as_str()),
            class: SessionClass::from(proxy.class()?.as_str()),
            active: proxy.active()?,
            state: SessionState::from(proxy.state()?.as_str()),
            idle: IdleStatus::new(proxy.idle_hint()?, proxy.idle_since_hint()?),
        })
    }

    pub fn render(&self, console: &mut Console) {
        console.info(format!(
            "  {} (type {}, class {})",
            self.id,
            self.kind.as_str(),
            self.class.as_str()
        ));
        console.info(format!("    user: {} ({})", self.user_name, self.uid));

        match (&self.tty, &self.display) {
            (Some(tty), Some(display)) => {
                console.info(format!("    tty: {}, display: {}", tty, display))
            }
            (Some(tty), None) => console.info(format!("    tty: {}", tty)),
            (None, Some(display)) => console.info(format!("    display: {}", display)),
            (None, None) => {}
        }

        if self.remote {
            console.info(format!(
                "    remote host: {}, remote user: {}",
                self.remote_host, self.remote_user
            ));
        }

        console.info(format!(
            "    created {} ago at {}, {}",
            elapsed_since(self.created),
            format_timestamp(self.created),
            self.idle.describe(),
        ));

        match self.audit {
            Some(audit) => {
                console.info(format!("    leader pid: {}, audit session: {}", self.leader, audit))
            }
            None => console.info(format!("    leader pid: {}", self.leader)),
        }

        console.info(format!(
            "    active: {}, state: {} ({})",
            if self.active { "yes" } else { "no" },
            self.state.as_str(),
            self.state.describe(),
        ));

        console.info(format!("    try: loginctl session-status {}", self.id));
        if let Some((seat_id, _)) = &self.seat {
            console.info(format!("    try: loginctl seat-status {}", seat_id));
        }
        console.info(format!("    try: systemctl status {}", self.service));
        console.info(format!("    try: systemctl status {}", self.scope));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_session() -> Session {
        Session {
            id: "2".to_owned(),
            uid: 1000,
            user_name: "enrico".to_owned(),
            path: OwnedObjectPath::try_from("/org/freedesktop/login1/session/_32").unwrap(),
            created: 1_700_000_000_000_000,
            seat: Some((
                "seat0".to_owned(),
                OwnedObjectPath::try_from("/org/freedesktop/login1/seat/seat0").unwrap(),
            )),
            tty: Some("tty7".to_owned()),
            display: Some(":0".to_owned()),
            remote: false,
            remote_host: String::new(),
            remote_user: String::new(),
            service: "gdm-password".to_owned(),
            scope: "session-2.scope".to_owned(),
            leader: 1234,
            audit: Some(2),
            kind: SessionType::X11,
            class: SessionClass::User,
            active: true,
            state: SessionState::Active,
            idle: IdleStatus::new(false, 0),
        }
    }

    #[test]
    fn type_and_class_parse_with_forward_compat() {
        assert_eq!(SessionType::from(""), SessionType::Unspecified);
        assert_eq!(SessionType::from("x11"), SessionType::X11);
        assert_eq!(
            SessionType::from("wayland"),
            SessionType::Other("wayland".to_owned())
        );
        assert_eq!(SessionClass::from("lock-screen"), SessionClass::LockScreen);
        assert_eq!(
            SessionClass::from("background").as_str(),
            "background"
        );
    }

    #[test]
    fn unknown_state_describes_as_unknown() {
        assert_eq!(SessionState::from("frozen").describe(), "description unknown");
        assert_eq!(SessionState::from("active").describe(), "session logged in and active");
    }

    #[test]
    fn local_session_render_has_no_remote_line() {
        let session = sample_session();
        let mut console = Console::buffered(true);
        session.render(&mut console);

        assert!(!console.lines().iter().any(|l| l.contains("remote host")));
        let suggestions = console.lines().iter().filter(|l| l.contains("try: ")).count();
        assert_eq!(suggestions, 4);
    }

    #[test]
    fn remote_session_renders_host_and_skips_seat() {
        let mut session = sample_session();
        session.remote = true;
        session.remote_host = "198.51.100.7".to_owned();
        session.remote_user = "enrico".to_owned();
        session.seat = None;
        session.tty = None;
        session.display = None;

        let mut console = Console::buffered(true);
        session.render(&mut console);

        assert!(console
            .lines()
            .iter()
            .any(|l| l.contains("remote host: 198.51.100.7, remote user: enrico")));
        assert!(!console.lines().iter().any(|l| l.contains("seat-status")));
        let suggestions = console.lines().iter().filter(|l| l.contains("try: ")).count();
        assert_eq!(suggestions, 3);
    }
}
