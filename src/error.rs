use core::fmt;

/// Errors that end a task. None of them are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskError {
    /// Named device not found
    Resolution { name: &'static str },
    /// Port rejected the pin setup
    Configuration {
        pin: u8,
        label: &'static str,
        code: i32,
    },
    /// USB stack could not start
    Enable,
    /// Console device is not the USB ACM port
    IdentityMismatch,
    /// No terminal asserted DTR within a bounded wait
    NoTerminal { attempts: u32 },
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::Resolution { name } => write!(f, "Error: didn't find {} device", name),
            TaskError::Configuration { pin, label, code } => {
                write!(f, "Error {}: failed to configure pin {} '{}'", code, pin, label)
            }
            TaskError::Enable => write!(f, "Error: failed to enable USB"),
            TaskError::IdentityMismatch => {
                write!(f, "Error: Console device name is not USB ACM")
            }
            TaskError::NoTerminal { attempts } => {
                write!(f, "Error: no terminal after {} polls", attempts)
            }
        }
    }
}
