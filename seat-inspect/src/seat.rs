use seat_dbus::login1::SeatProxyBlocking;
use zbus::blocking::Connection;
use zbus::zvariant::OwnedObjectPath;

use crate::console::Console;
use crate::error::Result;
use crate::format::IdleStatus;

/// Point-in-time snapshot of one logind seat.
#[derive(Debug)]
pub struct Seat {
    pub id: String,
    pub path: OwnedObjectPath,
    pub sessions: Vec<(String, OwnedObjectPath)>,
    pub active_session: Option<(String, OwnedObjectPath)>,
    pub can_multi_session: bool,
    pub can_tty: bool,
    pub can_graphical: bool,
    pub idle: IdleStatus,
}

pub fn has_no(flag: bool, what: &str) -> String {
    if flag {
        format!("has {}", what)
    } else {
        format!("no {}", what)
    }
}

impl Seat {
    pub fn from_bus(conn: &Connection, path: &OwnedObjectPath) -> Result<Self> {
        let proxy = SeatProxyBlocking::builder(conn)
            .path(path.as_str().to_owned())?
            .build()?;

        let active = proxy.active_session()?;
        let active_session = if active.0.is_empty() { None } else { Some(active) };

        Ok(Seat {
            id: proxy.id()?,
            path: path.clone(),
            sessions: proxy.sessions()?,
            active_session,
            can_multi_session: proxy.can_multi_session()?,
            can_tty: proxy.can_tty()?,
            can_graphical: proxy.can_graphical()?,
            idle: IdleStatus::new(proxy.idle_hint()?, proxy.idle_since_hint()?),
        })
    }

    pub fn render(&self, console: &mut Console) {
        console.info(format!("  {}", self.id));

        if self.sessions.is_empty() {
            console.info("    no sessions");
        } else {
            let active_id = self.active_session.as_ref().map(|(id, _)| id.as_str());
            let ids: Vec<String> = self
                .sessions
                .iter()
                .map(|(id, _)| {
                    if Some(id.as_str()) == active_id {
                        format!("*{}", id)
                    } else {
                        id.clone()
                    }
                })
                .collect();
            console.info(format!("    sessions: {}", ids.join(" ")));
        }

        console.info(format!(
            "    {}, {}, {}",
            has_no(self.can_multi_session, "multi-session"),
            has_no(self.can_tty, "tty"),
            has_no(self.can_graphical, "graphical"),
        ));
        console.info(format!("    {}", self.idle.describe()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object_path(raw: &str) -> OwnedObjectPath {
        OwnedObjectPath::try_from(raw.to_owned()).unwrap()
    }

    fn seat_with_sessions(active: Option<&str>) -> Seat {
        Seat {
            id: "seat0".to_owned(),
            path: object_path("/org/freedesktop/login1/seat/seat0"),
            sessions: vec![
                ("1".to_owned(), object_path("/org/freedesktop/login1/session/_31")),
                ("2".to_owned(), object_path("/org/freedesktop/login1/session/_32")),
            ],
            active_session: active.map(|id| {
                (id.to_owned(), object_path("/org/freedesktop/login1/session/_31"))
            }),
            can_multi_session: true,
            can_tty: false,
            can_graphical: true,
            idle: IdleStatus::new(false, 0),
        }
    }

    #[test]
    fn exactly_the_active_session_is_starred() {
        let seat = seat_with_sessions(Some("2"));
        let mut console = Console::buffered(true);
        seat.render(&mut console);

        let sessions_line = console
            .lines()
            .iter()
            .find(|l| l.contains("sessions:"))
            .unwrap();
        assert!(sessions_line.contains("*2"));
        assert_eq!(sessions_line.matches('*').count(), 1);
    }

    #[test]
    fn no_star_without_an_active_session() {
        let seat = seat_with_sessions(None);
        let mut console = Console::buffered(true);
        seat.render(&mut console);

        let sessions_line = console
            .lines()
            .iter()
            .find(|l| l.contains("sessions:"))
            .unwrap();
        assert_eq!(sessions_line.matches('*').count(), 0);
    }

    #[test]
    fn empty_seat_reports_no_sessions() {
        let mut seat = seat_with_sessions(None);
        seat.sessions.clear();
        let mut console = Console::buffered(true);
        seat.render(&mut console);

        assert!(console.lines().iter().any(|l| l.contains("no sessions")));
    }

    #[test]
    fn capabilities_render_as_has_no_pairs() {
        let seat = seat_with_sessions(None);
        let mut console = Console::buffered(true);
        seat.render(&mut console);

        let caps = console
            .lines()
            .iter()
            .find(|l| l.contains("multi-session"))
            .unwrap();
        assert!(caps.contains("has multi-session"));
        assert!(caps.contains("no tty"));
        assert!(caps.contains("has graphical"));
    }
}
