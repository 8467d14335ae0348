use core::fmt::Write;

use arrform::{arrform, ArrForm};

use crate::error::TaskError;

pub mod blink;
pub mod console;

pub use blink::blink_task;
pub use console::console_task;

/// Writes the line for a task-ending error to `log`, best effort.
///
/// Enable failures are left to the USB stack, which logs them itself.
pub fn report<W: Write>(err: &TaskError, log: &mut W) {
    if let TaskError::Enable = err {
        return;
    }
    let _ = log.write_str(arrform!(128, "{}\n", err).as_str());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_writes_line() {
        let mut log = String::new();
        report(&TaskError::Resolution { name: "GPIOE" }, &mut log);
        assert_eq!(log, "Error: didn't find GPIOE device\n");
    }

    #[test]
    fn test_report_skips_enable_failure() {
        let mut log = String::new();
        report(&TaskError::Enable, &mut log);
        assert!(log.is_empty());
    }
}
