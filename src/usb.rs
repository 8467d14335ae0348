use core::cell::RefCell;
use core::fmt;

use cdc_heartbeat::device::{Bindings, ConsoleDevice, LineControl, UsbEnableError, UsbStack};
use cortex_m::interrupt::Mutex;
use freertos_rust::{CurrentTask, Duration};
use rtt_target::rprintln;
use stm32f4xx_hal::otg_fs::{UsbBus, UsbBusType, USB};
use stm32f4xx_hal::pac::{interrupt, Interrupt};
use usb_device::bus::UsbBusAllocator;
use usb_device::prelude::*;
use usb_device::UsbError;
use usbd_serial::SerialPort;

/// Name the CDC-ACM port is bound under.
pub const CDC_ACM_NAME: &str = "CDC_ACM_0";

const WRITE_RETRIES: u32 = 50;

// Make USB serial device globally available
pub static G_USB_SERIAL: Mutex<RefCell<Option<SerialPort<UsbBus<USB>>>>> =
    Mutex::new(RefCell::new(None));

// Make USB device globally available
pub static G_USB_DEVICE: Mutex<RefCell<Option<UsbDevice<UsbBus<USB>>>>> =
    Mutex::new(RefCell::new(None));

/// USB OTG FS stack with a single CDC-ACM port.
pub struct UsbConsole {
    usb: Option<USB>,
    acm_taken: bool,
}

impl UsbConsole {
    pub fn new(usb: USB) -> Self {
        UsbConsole {
            usb: Some(usb),
            acm_taken: false,
        }
    }

    fn enabled(&self) -> bool {
        self.usb.is_none()
    }
}

impl UsbStack for UsbConsole {
    fn enable(&mut self) -> Result<(), UsbEnableError> {
        let usb = match self.usb.take() {
            Some(usb) => usb,
            None => {
                rprintln!("usb: already enabled");
                return Err(UsbEnableError);
            }
        };

        let usb_bus: &'static UsbBusAllocator<UsbBusType> = match cortex_m::singleton!(
            : [u32; 1024] = [0; 1024]
        )
        .and_then(|ep_memory| {
            let mut ep_memory: &'static mut [u32] = ep_memory;
            cortex_m::singleton!(: UsbBusAllocator<UsbBusType> = UsbBusType::new(usb, core::mem::take(&mut ep_memory)))
        }) {
            Some(bus) => bus,
            None => {
                rprintln!("usb: endpoint memory already allocated");
                return Err(UsbEnableError);
            }
        };

        let serial_port = SerialPort::new(usb_bus);
        let usb_dev = UsbDeviceBuilder::new(usb_bus, UsbVidPid(0x16c0, 0x27dd))
            .manufacturer("cdc-heartbeat")
            .product("CDC Virtual COM port")
            .serial_number("0001")
            .device_class(usbd_serial::USB_CLASS_CDC)
            .build();
        cortex_m::interrupt::free(|cs| {
            *G_USB_SERIAL.borrow(cs).borrow_mut() = Some(serial_port);
            *G_USB_DEVICE.borrow(cs).borrow_mut() = Some(usb_dev);
        });
        unsafe {
            cortex_m::peripheral::NVIC::unmask(Interrupt::OTG_FS);
        }
        rprintln!("usb: enabled");
        Ok(())
    }
}

impl Bindings for UsbConsole {
    type Device = CdcAcm;

    fn resolve(&mut self, name: &str) -> Option<CdcAcm> {
        if !self.enabled() || self.acm_taken || name != CDC_ACM_NAME {
            return None;
        }
        self.acm_taken = true;
        Some(CdcAcm { _private: () })
    }
}

/// Handle to the CDC-ACM port. The port itself stays in `G_USB_SERIAL`,
/// shared with the interrupt.
pub struct CdcAcm {
    _private: (),
}

impl LineControl for CdcAcm {
    fn dtr(&mut self) -> bool {
        cortex_m::interrupt::free(|cs| {
            G_USB_SERIAL
                .borrow(cs)
                .borrow()
                .as_ref()
                .map_or(false, |serial| serial.dtr())
        })
    }
}

impl fmt::Write for CdcAcm {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut bytes = s.as_bytes();
        let mut retries = 0;
        while !bytes.is_empty() {
            let written = cortex_m::interrupt::free(|cs| {
                match G_USB_SERIAL.borrow(cs).borrow_mut().as_mut() {
                    None => Err(UsbError::InvalidState),
                    Some(serial) => serial.write(bytes),
                }
            });
            match written {
                Ok(count) if count > 0 => bytes = &bytes[count..],
                Ok(_) | Err(UsbError::WouldBlock) if retries < WRITE_RETRIES => {
                    // let the interrupt drain the buffer
                    retries += 1;
                    CurrentTask::delay(Duration::ms(1));
                }
                _ => return Err(fmt::Error),
            }
        }
        Ok(())
    }
}

impl ConsoleDevice for CdcAcm {
    fn name(&self) -> &str {
        CDC_ACM_NAME
    }
}

#[interrupt]
fn OTG_FS() {
    cortex_m::interrupt::free(|cs| {
        match G_USB_DEVICE.borrow(cs).borrow_mut().as_mut() {
            None => {}
            Some(usb_dev) => {
                match G_USB_SERIAL.borrow(cs).borrow_mut().as_mut() {
                    None => {}
                    Some(serial) => {
                        // do this regularly to keep connection to USB host
                        usb_dev.poll(&mut [serial]);
                    }
                }
            }
        }
    });
}
