use std::fmt;

pub type Result<T> = std::result::Result<T, InspectError>;

#[derive(Debug)]
pub enum InspectError {
    /// The service manager liveness probe failed.
    ManagerNotRunning,
    /// The system bus could not be contacted at all.
    BusUnreachable(zbus::Error),
    Zbus(zbus::Error),
    ZbusFdo(zbus::fdo::Error),
    /// A property bag fetch succeeded but the named key was absent.
    MissingProperty(&'static str),
    /// A property carried a value of an unexpected wire type.
    PropertyType(&'static str),
    Journal(std::io::Error),
    Io(std::io::Error),
}

impl fmt::Display for InspectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InspectError::ManagerNotRunning => {
                write!(f, "systemd is not running on this system, nothing to inspect")
            }
            InspectError::BusUnreachable(error) => {
                write!(f, "cannot connect to the system bus: {}", error)
            }
            InspectError::Zbus(error) => write!(f, "bus call failed: {}", error),
            InspectError::ZbusFdo(error) => write!(f, "bus call failed: {}", error),
            InspectError::MissingProperty(name) => {
                write!(f, "remote object did not report property {}", name)
            }
            InspectError::PropertyType(name) => {
                write!(f, "remote property {} has an unexpected type", name)
            }
            InspectError::Journal(error) => write!(f, "journal read failed: {}", error),
            InspectError::Io(error) => write!(f, "std::io error: {}", error),
        }
    }
}

impl std::error::Error for InspectError {}

impl From<zbus::Error> for InspectError {
    fn from(err: zbus::Error) -> Self {
        InspectError::Zbus(err)
    }
}

impl From<zbus::fdo::Error> for InspectError {
    fn from(err: zbus::fdo::Error) -> Self {
        InspectError::ZbusFdo(err)
    }
}

impl From<std::io::Error> for InspectError {
    fn from(err: std::io::Error) -> Self {
        InspectError::Io(err)
    }
}
