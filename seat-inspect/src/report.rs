//! Sequential report assembly: one pass over the managers, no retries.
//!
//! The run context (bus connection, manager proxies, journal reader,
//! console) lives here and is released by `Drop` on every exit path,
//! including early aborts.

use std::env;
use std::process;

use log::{debug, warn};
use seat_dbus::login1::{InhibitorInfo, ManagerProxyBlocking as LoginManagerProxy};
use seat_dbus::systemd1::ManagerProxyBlocking as SystemdManagerProxy;
use zbus::blocking::Connection;

use crate::console::Console;
use crate::error::{InspectError, Result};
use crate::format::IdleStatus;
use crate::journal::LogReader;
use crate::seat::Seat;
use crate::session::Session;
use crate::units::{self, Unit, KIND_LABELS};
use crate::user::User;

pub struct Report {
    conn: Connection,
    logind: LoginManagerProxy<'static>,
    systemd: SystemdManagerProxy<'static>,
    journal: Option<LogReader>,
    console: Console,
}

impl Report {
    pub fn new(console: Console) -> Result<Self> {
        match systemd::daemon::booted() {
            Ok(true) => {}
            Ok(false) => return Err(InspectError::ManagerNotRunning),
            Err(err) => return Err(InspectError::Io(err)),
        }

        let conn = Connection::system().map_err(InspectError::BusUnreachable)?;
        let logind = LoginManagerProxy::new(&conn)?;
        let systemd = SystemdManagerProxy::new(&conn)?;

        let journal = match LogReader::open() {
            Ok(reader) => Some(reader),
            Err(err) => {
                warn!("cannot open the journal, log cross-references disabled: {}", err);
                None
            }
        };

        Ok(Report {
            conn,
            logind,
            systemd,
            journal,
            console,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        self.render_seats()?;
        self.render_users()?;
        self.render_sessions()?;
        let current = self.render_current()?;
        self.render_capabilities()?;
        self.render_inhibitors()?;
        self.render_manager_state()?;
        self.render_sanity(&current);
        self.render_units()?;
        Ok(())
    }

    fn render_seats(&mut self) -> Result<()> {
        let listings = self.logind.list_seats()?;
        let mut seats = Vec::with_capacity(listings.len());
        for listing in &listings {
            let seat = Seat::from_bus(&self.conn, &listing.path)?;
            debug!("inspected seat {} at {}", seat.id, seat.path.as_str());
            seats.push(seat);
        }
        render_seat_group(&mut self.console, &seats);
        Ok(())
    }

    fn render_users(&mut self) -> Result<()> {
        let listings = self.logind.list_users()?;
        let mut users = Vec::with_capacity(listings.len());
        for listing in &listings {
            let user = User::from_bus(&self.conn, &listing.path)?;
            debug!("inspected user {} at {}", user.uid, user.path.as_str());
            users.push(user);
        }
        render_user_group(&mut self.console, &users);
        Ok(())
    }

    fn render_sessions(&mut self) -> Result<()> {
        let listings = self.logind.list_sessions()?;
        let mut sessions = Vec::with_capacity(listings.len());
        for listing in &listings {
            let session = Session::from_bus(&self.conn, &listing.path)?;
            debug!("inspected session {} at {}", session.id, session.path.as_str());
            sessions.push(session);
        }
        render_session_group(&mut self.console, &sessions);
        Ok(())
    }

    /// Resolve the caller's own session and user. The session lookup is
    /// required; the user lookup is missing from older managers, which
    /// answer access-denied, and that is only worth a note.
    fn render_current(&mut self) -> Result<Session> {
        let pid = process::id();
        let path = self.logind.get_session_by_pid(pid)?;
        let session = Session::from_bus(&self.conn, &path)?;

        self.console.header("Current session:");
        self.console.info(format!(
            "  session {} of user {} ({})",
            session.id, session.user_name, session.uid
        ));

        match self.logind.get_user_by_pid(pid) {
            Ok(user_path) => {
                let user = User::from_bus(&self.conn, &user_path)?;
                self.console.info(format!(
                    "  user {} ({}) is {}",
                    user.name,
                    user.uid,
                    user.state.as_str()
                ));
            }
            Err(zbus::Error::MethodError(name, _, _))
                if name.as_str() == "org.freedesktop.DBus.Error.AccessDenied" =>
            {
                self.console
                    .info("  this manager does not support user lookup by PID, skipping");
            }
            Err(err) => return Err(err.into()),
        }

        Ok(session)
    }

    fn render_capabilities(&mut self) -> Result<()> {
        let answers = [
            ("power off", self.logind.can_power_off()?),
            ("reboot", self.logind.can_reboot()?),
            ("suspend", self.logind.can_suspend()?),
            ("hibernate", self.logind.can_hibernate()?),
            ("hybrid sleep", self.logind.can_hybrid_sleep()?),
        ];
        render_capability_group(&mut self.console, &answers);
        Ok(())
    }

    fn render_inhibitors(&mut self) -> Result<()> {
        let inhibitors = self.logind.list_inhibitors()?;
        render_inhibitor_group(&mut self.console, &inhibitors);
        Ok(())
    }

    fn render_manager_state(&mut self) -> Result<()> {
        let idle = IdleStatus::new(self.logind.idle_hint()?, self.logind.idle_since_hint()?);
        let block = self.logind.block_inhibited()?;
        let delay = self.logind.delay_inhibited()?;
        let shutdown = self.logind.preparing_for_shutdown()?;
        let sleep = self.logind.preparing_for_sleep()?;

        let console = &mut self.console;
        console.header("Manager state:");
        console.info(format!("  idle hint: {}", idle.describe()));
        console.info(format!("  block inhibitors held: {}", list_or_none(&block)));
        console.info(format!("  delay inhibitors held: {}", list_or_none(&delay)));
        console.info(format!("  preparing for shutdown: {}", yes_no(shutdown)));
        console.info(format!("  preparing for sleep: {}", yes_no(sleep)));
        Ok(())
    }

    fn render_sanity(&mut self, current: &Session) {
        let env_id = env::var("XDG_SESSION_ID").ok();
        self.console.header("Sanity checks:");
        render_sanity_outcome(&mut self.console, sanity_check(env_id.as_deref(), current));
    }

    fn render_units(&mut self) -> Result<()> {
        let listings = self.systemd.list_units()?;
        let mut groups: Vec<Vec<Unit>> = (0..KIND_LABELS.len()).map(|_| Vec::new()).collect();
        for listing in listings {
            if let Some(unit) = units::dispatch_unit(&self.conn, listing)? {
                groups[unit.kind_index()].push(unit);
            }
        }

        for (label, group) in KIND_LABELS.iter().zip(&groups) {
            if group.is_empty() {
                self.console.header(&format!("No {} units found.", label));
                continue;
            }
            self.console
                .header(&format!("{} {} units:", group.len(), label));
            for unit in group {
                unit.render(&mut self.console, &mut self.journal);
            }
        }
        Ok(())
    }
}

pub fn render_seat_group(console: &mut Console, seats: &[Seat]) {
    console.header("Seats:");
    if seats.is_empty() {
        console.info("  No seats found.");
    }
    for seat in seats {
        seat.render(console);
    }
}

pub fn render_user_group(console: &mut Console, users: &[User]) {
    console.header("Users:");
    if users.is_empty() {
        console.info("  No users found.");
    }
    for user in users {
        user.render(console);
    }
}

pub fn render_session_group(console: &mut Console, sessions: &[Session]) {
    console.header("Sessions:");
    if sessions.is_empty() {
        console.info("  No sessions found.");
    }
    for session in sessions {
        session.render(console);
    }
}

/// Fixed explanations for the capability answers, total over unknown
/// values for forward compatibility.
pub fn describe_capability(answer: &str) -> &'static str {
    match answer {
        "na" => "not supported by the hardware or environment",
        "yes" => "allowed",
        "no" => "not allowed",
        "challenge" => "allowed after authentication",
        _ => "answer unknown",
    }
}

pub fn render_capability_group(console: &mut Console, answers: &[(&str, String)]) {
    console.header("Power capabilities:");
    for (operation, answer) in answers {
        console.info(format!(
            "  can {}: {} ({})",
            operation,
            answer,
            describe_capability(answer)
        ));
    }
}

pub fn render_inhibitor_group(console: &mut Console, inhibitors: &[InhibitorInfo]) {
    console.header("Inhibitor locks:");
    if inhibitors.is_empty() {
        console.info("  No inhibitor locks present.");
    }
    for lock in inhibitors {
        console.info(format!(
            "  {} ({}) held by {} (uid {}, pid {}): {}",
            lock.what, lock.mode, lock.who, lock.uid, lock.pid, lock.why
        ));
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn list_or_none(list: &str) -> &str {
    if list.is_empty() {
        "none"
    } else {
        list
    }
}

/// The one sanity outcome reported per run; first match wins, so a session
/// that is both remote and inactive reports only the remote warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanityOutcome {
    EnvUnset,
    EnvMismatch { env_id: String, manager_id: String },
    RemoteSession,
    InactiveSession,
    LocalAndActive,
}

pub fn sanity_check(env_id: Option<&str>, current: &Session) -> SanityOutcome {
    match env_id {
        None => SanityOutcome::EnvUnset,
        Some(env_id) if env_id != current.id => SanityOutcome::EnvMismatch {
            env_id: env_id.to_owned(),
            manager_id: current.id.clone(),
        },
        Some(_) => {
            if current.remote {
                SanityOutcome::RemoteSession
            } else if !current.active {
                SanityOutcome::InactiveSession
            } else {
                SanityOutcome::LocalAndActive
            }
        }
    }
}

pub fn render_sanity_outcome(console: &mut Console, outcome: SanityOutcome) {
    match outcome {
        SanityOutcome::EnvUnset => {
            console.warn("  XDG_SESSION_ID is not set: cannot verify the current session");
        }
        SanityOutcome::EnvMismatch { env_id, manager_id } => {
            console.warn(format!(
                "  XDG_SESSION_ID is {} but the manager reports session {}",
                env_id, manager_id
            ));
        }
        SanityOutcome::RemoteSession => {
            console.warn("  the current session is remote: system actions may require authentication");
        }
        SanityOutcome::InactiveSession => {
            console.warn("  the current session is not active: system actions may be denied");
        }
        SanityOutcome::LocalAndActive => {
            console.info(
                "  the current session is local and active: system actions should work normally",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::format::IdleStatus;
    use crate::session::{SessionClass, SessionState, SessionType};
    use zbus::zvariant::OwnedObjectPath;

    use super::*;

    fn session(id: &str, remote: bool, active: bool) -> Session {
        Session {
            id: id.to_owned(),
            uid: 1000,
            user_name: "enrico".to_owned(),
            path: OwnedObjectPath::try_from("/org/freedesktop/login1/session/_32").unwrap(),
            created: 1_700_000_000_000_000,
            seat: None,
            tty: None,
            display: None,
            remote,
            remote_host: String::new(),
            remote_user: String::new(),
            service: "sshd".to_owned(),
            scope: "session-2.scope".to_owned(),
            leader: 4321,
            audit: None,
            kind: SessionType::Tty,
            class: SessionClass::User,
            active,
            state: SessionState::Active,
            idle: IdleStatus::new(false, 0),
        }
    }

    #[test]
    fn empty_enumerations_render_the_fallback_lines() {
        let mut console = Console::buffered(true);
        render_seat_group(&mut console, &[]);
        render_user_group(&mut console, &[]);
        render_session_group(&mut console, &[]);

        let lines = console.lines();
        assert!(lines.iter().any(|l| l.contains("No seats found.")));
        assert!(lines.iter().any(|l| l.contains("No users found.")));
        assert!(lines.iter().any(|l| l.contains("No sessions found.")));
    }

    #[test]
    fn missing_env_short_circuits_all_other_checks() {
        // Remote and inactive at once, yet only the env warning appears.
        let current = session("7", true, false);
        assert_eq!(sanity_check(None, &current), SanityOutcome::EnvUnset);

        let mut console = Console::buffered(false);
        render_sanity_outcome(&mut console, sanity_check(None, &current));
        assert_eq!(console.lines().len(), 1);
        assert!(console.lines()[0].contains("XDG_SESSION_ID is not set"));
    }

    #[test]
    fn mismatched_env_wins_over_remote() {
        let current = session("7", true, false);
        assert_eq!(
            sanity_check(Some("3"), &current),
            SanityOutcome::EnvMismatch {
                env_id: "3".to_owned(),
                manager_id: "7".to_owned()
            }
        );
    }

    #[test]
    fn remote_wins_over_inactive() {
        let current = session("7", true, false);
        assert_eq!(sanity_check(Some("7"), &current), SanityOutcome::RemoteSession);
    }

    #[test]
    fn inactive_session_is_reported() {
        let current = session("7", false, false);
        assert_eq!(
            sanity_check(Some("7"), &current),
            SanityOutcome::InactiveSession
        );
    }

    #[test]
    fn healthy_session_reports_local_and_active() {
        let current = session("7", false, true);
        assert_eq!(
            sanity_check(Some("7"), &current),
            SanityOutcome::LocalAndActive
        );

        // The all-good outcome is informational, quiet runs stay quiet.
        let mut console = Console::buffered(false);
        render_sanity_outcome(&mut console, SanityOutcome::LocalAndActive);
        assert!(console.lines().is_empty());
    }

    #[test]
    fn capability_descriptions_are_total() {
        assert_eq!(describe_capability("yes"), "allowed");
        assert_eq!(describe_capability("no"), "not allowed");
        assert_eq!(describe_capability("challenge"), "allowed after authentication");
        assert_eq!(
            describe_capability("na"),
            "not supported by the hardware or environment"
        );
        assert_eq!(describe_capability("maybe"), "answer unknown");
    }

    #[test]
    fn inhibitor_lines_show_mode_and_owner() {
        let locks = [InhibitorInfo {
            what: "shutdown:sleep".to_owned(),
            who: "NetworkManager".to_owned(),
            why: "NetworkManager needs to turn off networks".to_owned(),
            mode: "delay".to_owned(),
            uid: 0,
            pid: 777,
        }];
        let mut console = Console::buffered(true);
        render_inhibitor_group(&mut console, &locks);

        assert!(console
            .lines()
            .iter()
            .any(|l| l.contains("shutdown:sleep (delay) held by NetworkManager (uid 0, pid 777)")));

        let mut console = Console::buffered(true);
        render_inhibitor_group(&mut console, &[]);
        assert!(console
            .lines()
            .iter()
            .any(|l| l.contains("No inhibitor locks present.")));
    }
}
