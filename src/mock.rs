//! Host stand-ins for the device traits, for unit tests.

use core::fmt;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::blocking::delay::DelayMs;

use crate::device::{
    check_config, Bindings, ConsoleDevice, GpioController, GpioError, GpioFlags, LineControl,
    UsbEnableError, UsbStack,
};

/// Virtual time in milliseconds, shared between a delay and the devices it paces.
pub type Clock = Rc<Cell<u64>>;

/// Delay that advances a virtual clock instead of sleeping.
pub struct MockDelay {
    pub clock: Clock,
    pub now_ms: u64,
    pub sleeps: Vec<u32>,
}

impl MockDelay {
    pub fn new() -> Self {
        MockDelay {
            clock: Rc::new(Cell::new(0)),
            now_ms: 0,
            sleeps: Vec::new(),
        }
    }
}

impl Default for MockDelay {
    fn default() -> Self {
        MockDelay::new()
    }
}

impl DelayMs<u32> for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.sleeps.push(ms);
        self.now_ms += u64::from(ms);
        self.clock.set(self.now_ms);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioCall {
    Configure { pin: u8, flags: GpioFlags },
    SetLevel { pin: u8, level: bool, at_ms: u64 },
}

/// GPIO port recording every call. Clones share the record.
#[derive(Clone)]
pub struct MockGpio {
    pub calls: Rc<RefCell<Vec<GpioCall>>>,
    clock: Clock,
    reject: Option<GpioError>,
}

impl MockGpio {
    pub fn new(clock: Clock) -> Self {
        MockGpio {
            calls: Rc::new(RefCell::new(Vec::new())),
            clock,
            reject: None,
        }
    }

    /// Port that refuses every configuration with `err`.
    pub fn rejecting(clock: Clock, err: GpioError) -> Self {
        MockGpio {
            reject: Some(err),
            ..MockGpio::new(clock)
        }
    }

    pub fn configured(&self) -> Vec<(u8, GpioFlags)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                GpioCall::Configure { pin, flags } => Some((*pin, *flags)),
                _ => None,
            })
            .collect()
    }

    pub fn levels(&self) -> Vec<(bool, u64)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                GpioCall::SetLevel { level, at_ms, .. } => Some((*level, *at_ms)),
                _ => None,
            })
            .collect()
    }
}

impl GpioController for MockGpio {
    fn configure(&mut self, pin: u8, flags: GpioFlags) -> Result<(), GpioError> {
        self.calls.borrow_mut().push(GpioCall::Configure { pin, flags });
        if let Some(err) = self.reject {
            return Err(err);
        }
        check_config(pin, flags)
    }

    fn set_level(&mut self, pin: u8, level: bool) {
        self.calls.borrow_mut().push(GpioCall::SetLevel {
            pin,
            level,
            at_ms: self.clock.get(),
        });
    }
}

/// Name to device table.
pub struct MockBindings<D> {
    devices: Vec<(&'static str, D)>,
    pub lookups: Vec<String>,
}

impl<D> MockBindings<D> {
    pub fn new() -> Self {
        MockBindings {
            devices: Vec::new(),
            lookups: Vec::new(),
        }
    }

    pub fn with(mut self, name: &'static str, device: D) -> Self {
        self.devices.push((name, device));
        self
    }
}

impl<D> Default for MockBindings<D> {
    fn default() -> Self {
        MockBindings::new()
    }
}

impl<D> Bindings for MockBindings<D> {
    type Device = D;

    fn resolve(&mut self, name: &str) -> Option<D> {
        self.lookups.push(name.to_owned());
        let index = self.devices.iter().position(|(n, _)| *n == name)?;
        Some(self.devices.remove(index).1)
    }
}

/// Serial device with a scripted DTR line. Writes are stamped with the clock.
#[derive(Clone)]
pub struct MockSerial {
    name: &'static str,
    clock: Clock,
    dtr: Rc<RefCell<VecDeque<bool>>>,
    pub dtr_reads: Rc<Cell<u32>>,
    pub written: Rc<RefCell<Vec<(u64, String)>>>,
}

impl MockSerial {
    /// DTR reads return `dtr` in order, then keep returning the last value.
    pub fn new(name: &'static str, clock: Clock, dtr: &[bool]) -> Self {
        MockSerial {
            name,
            clock,
            dtr: Rc::new(RefCell::new(dtr.iter().copied().collect())),
            dtr_reads: Rc::new(Cell::new(0)),
            written: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn output(&self) -> String {
        self.written.borrow().iter().map(|(_, s)| s.as_str()).collect()
    }
}

impl LineControl for MockSerial {
    fn dtr(&mut self) -> bool {
        self.dtr_reads.set(self.dtr_reads.get() + 1);
        let mut script = self.dtr.borrow_mut();
        if script.len() > 1 {
            script.pop_front().unwrap_or(false)
        } else {
            script.front().copied().unwrap_or(false)
        }
    }
}

impl fmt::Write for MockSerial {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.written.borrow_mut().push((self.clock.get(), s.to_owned()));
        Ok(())
    }
}

impl ConsoleDevice for MockSerial {
    fn name(&self) -> &str {
        self.name
    }
}

/// USB stack whose devices only resolve after a successful enable.
pub struct MockUsb {
    bindings: MockBindings<MockSerial>,
    fail_enable: bool,
    pub enabled: bool,
    pub enable_calls: u32,
}

impl MockUsb {
    pub fn new(bindings: MockBindings<MockSerial>) -> Self {
        MockUsb {
            bindings,
            fail_enable: false,
            enabled: false,
            enable_calls: 0,
        }
    }

    pub fn failing(bindings: MockBindings<MockSerial>) -> Self {
        MockUsb {
            fail_enable: true,
            ..MockUsb::new(bindings)
        }
    }

    pub fn lookups(&self) -> &[String] {
        &self.bindings.lookups
    }
}

impl Bindings for MockUsb {
    type Device = MockSerial;

    fn resolve(&mut self, name: &str) -> Option<MockSerial> {
        if !self.enabled {
            self.bindings.lookups.push(name.to_owned());
            return None;
        }
        self.bindings.resolve(name)
    }
}

impl UsbStack for MockUsb {
    fn enable(&mut self) -> Result<(), UsbEnableError> {
        self.enable_calls += 1;
        if self.fail_enable {
            return Err(UsbEnableError);
        }
        self.enabled = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delay_starts_at_zero() {
        let mut delay = MockDelay::default();
        assert_eq!(delay.now_ms, 0);
        delay.delay_ms(250);
        assert_eq!(delay.clock.get(), 250);
        assert_eq!(delay.sleeps, vec![250]);
    }

    #[test]
    fn test_default_bindings_are_empty() {
        let mut bindings = MockBindings::<MockSerial>::default();
        assert!(bindings.resolve("CDC_ACM_0").is_none());
        assert_eq!(bindings.lookups, vec!["CDC_ACM_0".to_owned()]);
    }
}
