#![cfg_attr(not(test), no_std)]

//! LED blink and USB CDC-ACM heartbeat tasks.
//!
//! The task logic only talks to the device traits in [`device`], the firmware
//! binary supplies the STM32F4 implementations and the FreeRTOS wiring.

pub mod board;
pub mod config;
pub mod device;
pub mod error;
pub mod poll;
pub mod tasks;

#[cfg(test)]
mod mock;

pub use error::TaskError;
