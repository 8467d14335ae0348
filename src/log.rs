use core::fmt;

use rtt_target::rprint;

/// Text sink on the RTT up channel set up by `rtt_init_print!`.
pub struct RttLog;

impl fmt::Write for RttLog {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        rprint!("{}", s);
        Ok(())
    }
}
