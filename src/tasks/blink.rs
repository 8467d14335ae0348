use core::fmt::Write;

use embedded_hal::blocking::delay::DelayMs;

use crate::board::LedDescriptor;
use crate::config::BlinkConfig;
use crate::device::{Bindings, GpioController, GpioFlags};
use crate::error::TaskError;
use crate::tasks::report;

/// An LED bound to its port and configured as an output.
pub struct Blink<G> {
    gpio: G,
    pin: u8,
    led_is_on: bool,
    period_ms: u32,
}

impl<G: GpioController> Blink<G> {
    /// Resolves the LED's port and configures the pin as an output.
    pub fn bind<B>(led: &LedDescriptor, bindings: &mut B, config: BlinkConfig) -> Result<Self, TaskError>
    where
        B: Bindings<Device = G>,
    {
        let mut gpio = bindings.resolve(led.controller).ok_or(TaskError::Resolution {
            name: led.controller,
        })?;

        gpio.configure(led.pin, led.flags | GpioFlags::OUTPUT)
            .map_err(|e| TaskError::Configuration {
                pin: led.pin,
                label: led.label,
                code: e.code(),
            })?;

        Ok(Blink {
            gpio,
            pin: led.pin,
            led_is_on: true,
            period_ms: config.period_ms,
        })
    }

    /// Level the next step writes.
    pub fn next_level(&self) -> bool {
        self.led_is_on
    }

    pub fn step<D: DelayMs<u32>>(&mut self, delay: &mut D) {
        self.gpio.set_level(self.pin, self.led_is_on);
        self.led_is_on = !self.led_is_on;
        // the only point where this task gives up the cpu
        delay.delay_ms(self.period_ms);
    }

    pub fn run<D: DelayMs<u32>>(mut self, delay: &mut D) -> ! {
        loop {
            self.step(delay);
        }
    }
}

/// Blinks `led` forever. Returns only when the LED cannot be set up.
pub fn blink_task<B, D, W>(led: &LedDescriptor, config: BlinkConfig, bindings: &mut B, delay: &mut D, log: &mut W)
where
    B: Bindings,
    B::Device: GpioController,
    D: DelayMs<u32>,
    W: Write,
{
    match Blink::bind(led, bindings, config) {
        Ok(blink) => blink.run(delay),
        Err(err) => report(&err, log),
    }
}
