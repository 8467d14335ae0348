#![no_main]
#![no_std]

extern crate alloc;

use cortex_m::asm;
use cortex_m_rt::{entry, exception, ExceptionFrame};
use freertos_rust::*;
use panic_halt as _;
use rtt_target::{rprintln, rtt_init_print};
use stm32f4xx_hal::otg_fs::USB;
use stm32f4xx_hal::{pac, prelude::*};

use cdc_heartbeat::board::LED0;
use cdc_heartbeat::config::{BlinkConfig, ConsoleConfig, BLINK0_TASK, CONSOLE_TASK};
use cdc_heartbeat::tasks::{blink_task, console_task};

use crate::gpio::GpioBindings;
use crate::log::RttLog;
use crate::rtos::{spawn, RtosDelay};
use crate::usb::UsbConsole;

mod gpio;
mod log;
mod rtos;
mod usb;

#[global_allocator]
static GLOBAL: FreeRtosAllocator = FreeRtosAllocator;

#[entry]
fn main() -> ! {
    rtt_init_print!();
    let dp = pac::Peripherals::take().unwrap();

    // ports handed to the tasks by name, the HAL never splits them
    dp.RCC.ahb1enr.modify(|_, w| {
        w.gpioben()
            .enabled()
            .gpiocen()
            .enabled()
            .gpioden()
            .enabled()
            .gpioeen()
            .enabled()
    });

    let rcc = dp.RCC.constrain();

    let clocks = rcc
        .cfgr
        .use_hse(8.MHz())
        .sysclk(48.MHz())
        .hclk(48.MHz())
        .require_pll48clk()
        .pclk1(24.MHz())
        .pclk2(24.MHz())
        .freeze();

    let mut delay = dp.TIM1.delay_us(&clocks);
    delay.delay(100.millis()); // apparently required for USB to set up properly...

    let gpioa = dp.GPIOA.split();
    let mut gpio_bindings = GpioBindings::new(dp.GPIOB, dp.GPIOC, dp.GPIOD, dp.GPIOE);

    let usb = USB {
        usb_global: dp.OTG_FS_GLOBAL,
        usb_device: dp.OTG_FS_DEVICE,
        usb_pwrclk: dp.OTG_FS_PWRCLK,
        pin_dm: gpioa.pa11.into_alternate().into(),
        pin_dp: gpioa.pa12.into_alternate().into(),
        hclk: clocks.hclk(),
    };
    let mut usb_console = UsbConsole::new(usb);

    rprintln!("boot up ok");

    if let Err(e) = spawn(&BLINK0_TASK, move |_| {
        blink_task(&LED0, BlinkConfig::default(), &mut gpio_bindings, &mut RtosDelay, &mut RttLog);
    }) {
        rprintln!("{}: spawn failed: {:?}", BLINK0_TASK.name, e);
    }

    // separate task, waiting for a terminal must not hold up the LED
    if let Err(e) = spawn(&CONSOLE_TASK, move |_| {
        console_task(ConsoleConfig::default(), &mut usb_console, &mut RtosDelay, &mut RttLog);
    }) {
        rprintln!("{}: spawn failed: {:?}", CONSOLE_TASK.name, e);
    }

    FreeRtosUtils::start_scheduler();
}

#[exception]
#[allow(non_snake_case)]
unsafe fn DefaultHandler(_irqn: i16) {
// custom default handler
// irqn is negative for Cortex-M exceptions
// irqn is positive for device specific (line IRQ)
}

#[exception]
#[allow(non_snake_case)]
unsafe fn HardFault(_ef: &ExceptionFrame) -> ! {
    loop {}
}

#[no_mangle]
#[allow(non_snake_case, unused_variables)]
fn vApplicationStackOverflowHook(pxTask: FreeRtosTaskHandle, pcTaskName: FreeRtosCharPtr) {
    asm::bkpt();
}
