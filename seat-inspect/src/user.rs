use seat_dbus::login1::UserProxyBlocking;
use zbus::blocking::Connection;
use zbus::zvariant::OwnedObjectPath;

use crate::console::Console;
use crate::error::Result;
use crate::format::{elapsed_since, format_timestamp, IdleStatus};

/// Login state of a user as reported by the manager. Newer manager versions
/// may report values we do not know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserState {
    Offline,
    Lingering,
    Online,
    Active,
    Closing,
    Other(String),
}

impl From<&str> for UserState {
    fn from(s: &str) -> Self {
        match s {
            "offline" => UserState::Offline,
            "lingering" => UserState::Lingering,
            "online" => UserState::Online,
            "active" => UserState::Active,
            "closing" => UserState::Closing,
            _ => UserState::Other(s.to_owned()),
        }
    }
}

impl UserState {
    pub fn as_str(&self) -> &str {
        match self {
            UserState::Offline => "offline",
            UserState::Lingering => "lingering",
            UserState::Online => "online",
            UserState::Active => "active",
            UserState::Closing => "closing",
            UserState::Other(s) => s,
        }
    }

    pub fn describe(&self) -> &str {
        match self {
            UserState::Offline => "user not logged in, and no pending processes",
            UserState::Lingering => "user not logged in, but leftover processes are kept",
            UserState::Online => "user logged in, but no session is active",
            UserState::Active => "user logged in, and at least one session is active",
            UserState::Closing => "user logging out, some processes still remain",
            UserState::Other(_) => "description unknown",
        }
    }
}

/// Point-in-time snapshot of one logged-in user.
#[derive(Debug)]
pub struct User {
    pub uid: u32,
    pub name: String,
    pub gid: u32,
    pub path: OwnedObjectPath,
    pub login_time: u64,
    pub runtime_path: String,
    pub service: String,
    pub slice: String,
    pub display: Option<(String, OwnedObjectPath)>,
    pub state: UserState,
    pub sessions: Vec<(String, OwnedObjectPath)>,
    pub idle: IdleStatus,
}

impl User {
    pub fn from_bus(conn: &Connection, path: &OwnedObjectPath) -> Result<Self> {
        let proxy = UserProxyBlocking::builder(conn)
            .path(path.as_str().to_owned())?
            .build()?;

        let display = proxy.display()?;
        let display = if display.0.is_empty() { None } else { Some(display) };

        Ok(User {
            uid: proxy.uid()?,
            name: proxy.name()?,
            gid: proxy.gid()?,
            path: path.clone(),
            login_time: proxy.timestamp()?,
            runtime_path: proxy.runtime_path()?,
            service: proxy.service()?,
            slice: proxy.slice()?,
            display,
            state: UserState::from(proxy.state()?.as_str()),
            sessions: proxy.sessions()?,
            idle: IdleStatus::new(proxy.idle_hint()?, proxy.idle_since_hint()?),
        })
    }

    pub fn render(&self, console: &mut Console) {
        console.info(format!("  {} {} (gid {})", self.uid, self.name, self.gid));

        if let Some((id, _)) = &self.display {
            console.info(format!("    display session: {}", id));
        }
        if self.sessions.is_empty() {
            console.info("    no sessions");
        } else {
            let ids: Vec<&str> = self.sessions.iter().map(|(id, _)| id.as_str()).collect();
            console.info(format!("    sessions: {}", ids.join(" ")));
        }

        console.info(format!(
            "    logged in {} ago at {}, {}",
            elapsed_since(self.login_time),
            format_timestamp(self.login_time),
            self.idle.describe(),
        ));
        console.info(format!("    runtime path: {}", self.runtime_path));
        console.info(format!(
            "    state: {} ({})",
            self.state.as_str(),
            self.state.describe()
        ));

        console.info(format!("    try: loginctl user-status {}", self.name));
        console.info(format!("    try: systemctl status {}", self.service));
        console.info(format!("    try: systemctl status {}", self.slice));
    }
}
