//! Peripheral seams used by the tasks.
//!
//! Timed suspension is `embedded_hal::blocking::delay::DelayMs<u32>` and text
//! output is `core::fmt::Write`; everything else is defined here.

use core::fmt;
use core::ops::BitOr;

/// Zephyr errno values. Drivers report them negated.
pub const EINVAL: i32 = 22;
pub const ENOTSUP: i32 = 134;

pub const MAX_PIN: u8 = 15;

/// Pin configuration flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GpioFlags(u32);

impl GpioFlags {
    pub const NONE: GpioFlags = GpioFlags(0);
    pub const OUTPUT: GpioFlags = GpioFlags(1 << 0);
    pub const INPUT: GpioFlags = GpioFlags(1 << 1);
    /// Logical level 1 drives the pin low.
    pub const ACTIVE_LOW: GpioFlags = GpioFlags(1 << 2);
    pub const PULL_UP: GpioFlags = GpioFlags(1 << 3);
    pub const PULL_DOWN: GpioFlags = GpioFlags(1 << 4);
    pub const OPEN_DRAIN: GpioFlags = GpioFlags(1 << 5);
    /// Output starts at logical 1.
    pub const INIT_ACTIVE: GpioFlags = GpioFlags(1 << 6);
    /// Output starts at logical 0.
    pub const INIT_INACTIVE: GpioFlags = GpioFlags(1 << 7);
    pub const DRIVE_FAST: GpioFlags = GpioFlags(1 << 8);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn union(self, other: GpioFlags) -> GpioFlags {
        GpioFlags(self.0 | other.0)
    }

    pub const fn contains(self, other: GpioFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Checks the combination is something a GPIO port can do.
    pub fn validate(self) -> Result<(), GpioError> {
        if self.contains(GpioFlags::OUTPUT.union(GpioFlags::INPUT)) {
            return Err(GpioError::Unsupported);
        }
        if self.contains(GpioFlags::PULL_UP.union(GpioFlags::PULL_DOWN)) {
            return Err(GpioError::Unsupported);
        }
        if self.contains(GpioFlags::INIT_ACTIVE.union(GpioFlags::INIT_INACTIVE)) {
            return Err(GpioError::InvalidFlags);
        }
        Ok(())
    }

    /// Physical pin level for a logical level.
    pub const fn physical(self, logical: bool) -> bool {
        if self.contains(GpioFlags::ACTIVE_LOW) {
            !logical
        } else {
            logical
        }
    }

    /// Logical level the pin is driven to right after configuration, if any.
    pub const fn initial_level(self) -> Option<bool> {
        if self.contains(GpioFlags::INIT_ACTIVE) {
            Some(true)
        } else if self.contains(GpioFlags::INIT_INACTIVE) {
            Some(false)
        } else {
            None
        }
    }
}

impl BitOr for GpioFlags {
    type Output = GpioFlags;

    fn bitor(self, rhs: GpioFlags) -> GpioFlags {
        self.union(rhs)
    }
}

/// Rejected pin configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    /// Pin index outside the port
    InvalidPin,
    /// Contradicting flags
    InvalidFlags,
    /// The port cannot do what the flags ask for
    Unsupported,
}

impl GpioError {
    /// Numeric code as the driver would return it.
    pub const fn code(self) -> i32 {
        match self {
            GpioError::InvalidPin | GpioError::InvalidFlags => -EINVAL,
            GpioError::Unsupported => -ENOTSUP,
        }
    }
}

/// Checks a pin index and flag set before touching hardware.
pub fn check_config(pin: u8, flags: GpioFlags) -> Result<(), GpioError> {
    if pin > MAX_PIN {
        return Err(GpioError::InvalidPin);
    }
    flags.validate()
}

/// Named device lookup.
///
/// Resolving hands the device over to the caller; a second lookup of the same
/// name finds nothing.
pub trait Bindings {
    type Device;

    fn resolve(&mut self, name: &str) -> Option<Self::Device>;
}

/// A GPIO port addressed by pin index.
pub trait GpioController {
    fn configure(&mut self, pin: u8, flags: GpioFlags) -> Result<(), GpioError>;

    /// Drives a configured pin to a logical level. Unconfigured pins are ignored.
    fn set_level(&mut self, pin: u8, level: bool);
}

/// USB stack could not be brought up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbEnableError;

/// USB device stack. Its console devices only resolve once it is enabled.
pub trait UsbStack: Bindings {
    fn enable(&mut self) -> Result<(), UsbEnableError>;
}

/// Serial line-control signals.
pub trait LineControl {
    /// Data Terminal Ready, set by the host when a terminal opens the port.
    fn dtr(&mut self) -> bool;
}

/// A serial device that can carry the console.
pub trait ConsoleDevice: LineControl + fmt::Write {
    fn name(&self) -> &str;
}
