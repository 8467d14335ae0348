//! USB console: wait for a terminal on the CDC-ACM port, then print a
//! heartbeat on it forever.

use core::fmt::Write;

use embedded_hal::blocking::delay::DelayMs;

use crate::config::{ConsoleConfig, ACM_DEVICE_NAME};
use crate::device::{ConsoleDevice, LineControl, UsbStack};
use crate::error::TaskError;
use crate::poll::poll_until;
use crate::tasks::report;

/// The console must be the USB ACM port, matched exactly.
pub fn verify_identity<C: ConsoleDevice>(device: &C) -> Result<(), TaskError> {
    if device.name() == ACM_DEVICE_NAME {
        Ok(())
    } else {
        Err(TaskError::IdentityMismatch)
    }
}

pub struct ConsoleTask {
    config: ConsoleConfig,
}

impl ConsoleTask {
    pub fn new(config: ConsoleConfig) -> Self {
        ConsoleTask { config }
    }

    /// Enables USB, resolves the console device, waits for DTR and checks
    /// the device identity.
    pub fn prepare<U, D>(&self, usb: &mut U, delay: &mut D) -> Result<Heartbeat<U::Device>, TaskError>
    where
        U: UsbStack,
        U::Device: ConsoleDevice,
        D: DelayMs<u32>,
    {
        usb.enable().map_err(|_| TaskError::Enable)?;

        let mut device = usb.resolve(self.config.device).ok_or(TaskError::Resolution {
            name: self.config.device,
        })?;

        // blocks this task only, other tasks run while nobody is connected
        poll_until(delay, self.config.terminal_poll, || device.dtr())
            .map_err(|t| TaskError::NoTerminal { attempts: t.attempts })?;

        // both the name it was bound under and the name it reports
        if self.config.device != ACM_DEVICE_NAME {
            return Err(TaskError::IdentityMismatch);
        }
        verify_identity(&device)?;

        Ok(Heartbeat {
            device,
            message: self.config.message,
            period_ms: self.config.period_ms,
        })
    }
}

/// Console with a terminal attached.
pub struct Heartbeat<C> {
    device: C,
    message: &'static str,
    period_ms: u32,
}

impl<C: ConsoleDevice> Heartbeat<C> {
    pub fn beat<D: DelayMs<u32>>(&mut self, delay: &mut D) {
        // best effort, nobody to tell if the host stopped reading
        let _ = self.device.write_str(self.message);
        delay.delay_ms(self.period_ms);
    }

    pub fn run<D: DelayMs<u32>>(mut self, delay: &mut D) -> ! {
        loop {
            self.beat(delay);
        }
    }
}

/// Runs the console forever. Returns only when it cannot be brought up.
pub fn console_task<U, D, W>(config: ConsoleConfig, usb: &mut U, delay: &mut D, log: &mut W)
where
    U: UsbStack,
    U::Device: ConsoleDevice,
    D: DelayMs<u32>,
    W: Write,
{
    match ConsoleTask::new(config).prepare(usb, delay) {
        Ok(heartbeat) => heartbeat.run(delay),
        Err(err) => report(&err, log),
    }
}
