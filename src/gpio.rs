//! GPIO ports driven straight through the PAC registers, so pins can be
//! picked by index at runtime.

use cdc_heartbeat::device::{check_config, Bindings, GpioController, GpioError, GpioFlags};
use stm32f4xx_hal::pac;

pub enum PortRegs {
    B(pac::GPIOB),
    C(pac::GPIOC),
    D(pac::GPIOD),
    E(pac::GPIOE),
}

// Each port has its own register block type, expand the body once per port.
macro_rules! with_regs {
    ($port:expr, $r:ident => $body:expr) => {
        match $port {
            PortRegs::B($r) => $body,
            PortRegs::C($r) => $body,
            PortRegs::D($r) => $body,
            PortRegs::E($r) => $body,
        }
    };
}

const MODE_INPUT: u32 = 0b00;
const MODE_OUTPUT: u32 = 0b01;
const MODE_ANALOG: u32 = 0b11;

const PULL_NONE: u32 = 0b00;
const PULL_UP: u32 = 0b01;
const PULL_DOWN: u32 = 0b10;

const SPEED_LOW: u32 = 0b00;
const SPEED_HIGH: u32 = 0b10;

fn field2(bits: u32, pin: u8, value: u32) -> u32 {
    let shift = 2 * pin as u32;
    (bits & !(0b11 << shift)) | (value << shift)
}

fn bit(bits: u32, pin: u8, set: bool) -> u32 {
    if set {
        bits | (1 << pin)
    } else {
        bits & !(1 << pin)
    }
}

fn bsrr(pin: u8, high: bool) -> u32 {
    if high {
        1 << pin
    } else {
        1 << (pin + 16)
    }
}

pub struct GpioPort {
    name: &'static str,
    regs: PortRegs,
    outputs: u16,
    active_low: u16,
}

impl GpioPort {
    /// The port clock must already be running.
    pub fn new(name: &'static str, regs: PortRegs) -> Self {
        GpioPort {
            name,
            regs,
            outputs: 0,
            active_low: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn write_pin(&mut self, pin: u8, physical: bool) {
        let value = bsrr(pin, physical);
        with_regs!(&self.regs, r => r.bsrr.write(|w| unsafe { w.bits(value) }));
    }
}

impl GpioController for GpioPort {
    fn configure(&mut self, pin: u8, flags: GpioFlags) -> Result<(), GpioError> {
        check_config(pin, flags)?;

        let mode = if flags.contains(GpioFlags::OUTPUT) {
            MODE_OUTPUT
        } else if flags.contains(GpioFlags::INPUT) {
            MODE_INPUT
        } else {
            MODE_ANALOG
        };
        let pull = if flags.contains(GpioFlags::PULL_UP) {
            PULL_UP
        } else if flags.contains(GpioFlags::PULL_DOWN) {
            PULL_DOWN
        } else {
            PULL_NONE
        };
        let speed = if flags.contains(GpioFlags::DRIVE_FAST) {
            SPEED_HIGH
        } else {
            SPEED_LOW
        };
        let open_drain = flags.contains(GpioFlags::OPEN_DRAIN);

        // latch the initial level before the driver is switched on
        if let Some(level) = flags.initial_level() {
            self.write_pin(pin, flags.physical(level));
        }

        with_regs!(&self.regs, r => {
            r.pupdr.modify(|v, w| unsafe { w.bits(field2(v.bits(), pin, pull)) });
            r.otyper.modify(|v, w| unsafe { w.bits(bit(v.bits(), pin, open_drain)) });
            r.ospeedr.modify(|v, w| unsafe { w.bits(field2(v.bits(), pin, speed)) });
            r.moder.modify(|v, w| unsafe { w.bits(field2(v.bits(), pin, mode)) });
        });

        let mask = 1u16 << pin;
        if mode == MODE_OUTPUT {
            self.outputs |= mask;
        } else {
            self.outputs &= !mask;
        }
        if flags.contains(GpioFlags::ACTIVE_LOW) {
            self.active_low |= mask;
        } else {
            self.active_low &= !mask;
        }
        Ok(())
    }

    fn set_level(&mut self, pin: u8, level: bool) {
        if pin > 15 || self.outputs & (1 << pin) == 0 {
            return;
        }
        let physical = if self.active_low & (1 << pin) != 0 {
            !level
        } else {
            level
        };
        self.write_pin(pin, physical);
    }
}

/// GPIO ports left to the tasks, looked up by name.
pub struct GpioBindings {
    ports: [Option<GpioPort>; 4],
}

impl GpioBindings {
    pub fn new(b: pac::GPIOB, c: pac::GPIOC, d: pac::GPIOD, e: pac::GPIOE) -> Self {
        GpioBindings {
            ports: [
                Some(GpioPort::new("GPIOB", PortRegs::B(b))),
                Some(GpioPort::new("GPIOC", PortRegs::C(c))),
                Some(GpioPort::new("GPIOD", PortRegs::D(d))),
                Some(GpioPort::new("GPIOE", PortRegs::E(e))),
            ],
        }
    }
}

impl Bindings for GpioBindings {
    type Device = GpioPort;

    fn resolve(&mut self, name: &str) -> Option<GpioPort> {
        self.ports
            .iter_mut()
            .find(|slot| slot.as_ref().map_or(false, |port| port.name() == name))
            .and_then(Option::take)
    }
}
