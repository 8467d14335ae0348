use crate::device::GpioFlags;

/// An LED wired to a GPIO port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedDescriptor {
    /// Name of the GPIO port device, e.g. `"GPIOE"`
    pub controller: &'static str,
    pub pin: u8,
    pub label: &'static str,
    pub flags: GpioFlags,
}

impl LedDescriptor {
    pub const fn new(
        controller: &'static str,
        pin: u8,
        label: &'static str,
        flags: GpioFlags,
    ) -> Self {
        LedDescriptor {
            controller,
            pin,
            label,
            flags,
        }
    }
}

// LED0 and CONSOLE_DEVICE, from the BOARD_* build environment
include!(concat!(env!("OUT_DIR"), "/board.rs"));
