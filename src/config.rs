// Compile-time configuration. Board wiring lives in `board`.
use crate::board::CONSOLE_DEVICE;
use crate::poll::PollPolicy;

pub const BLINK_PERIOD_MS: u32 = 500;
pub const DTR_POLL_MS: u32 = 250;
pub const HEARTBEAT_PERIOD_MS: u32 = 2000;

/// Name the console device must report to be accepted as the USB ACM port.
pub const ACM_DEVICE_NAME: &str = "CDC_ACM_0";
pub const HEARTBEAT: &str = "Hello from STM32 CDC Virtual COM port!\n\n";

/// stack size in words
pub const STACK_SIZE: u16 = 512;
pub const PRIORITY: u8 = 2;

/// Everything the scheduler needs to start a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpec {
    pub name: &'static str,
    pub stack_size: u16,
    pub priority: u8,
}

pub const BLINK0_TASK: TaskSpec = TaskSpec {
    name: "BLINK0 TASK",
    stack_size: STACK_SIZE,
    priority: PRIORITY,
};

pub const CONSOLE_TASK: TaskSpec = TaskSpec {
    name: "CONSOLE TASK",
    stack_size: STACK_SIZE,
    priority: PRIORITY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkConfig {
    pub period_ms: u32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        BlinkConfig {
            period_ms: BLINK_PERIOD_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Device the console is resolved by
    pub device: &'static str,
    pub terminal_poll: PollPolicy,
    pub message: &'static str,
    pub period_ms: u32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleConfig {
            device: CONSOLE_DEVICE,
            terminal_poll: PollPolicy::forever(DTR_POLL_MS),
            message: HEARTBEAT,
            period_ms: HEARTBEAT_PERIOD_MS,
        }
    }
}
