use cdc_heartbeat::config::TaskSpec;
use embedded_hal::blocking::delay::DelayMs;
use freertos_rust::{CurrentTask, Duration, FreeRtosError, Task, TaskPriority};

/// Sleeps by blocking the calling task, the scheduler runs the others meanwhile.
pub struct RtosDelay;

impl DelayMs<u32> for RtosDelay {
    fn delay_ms(&mut self, ms: u32) {
        CurrentTask::delay(Duration::ms(ms));
    }
}

/// Creates the task described by `spec`. It is never joined; when `entry`
/// returns the task is deleted.
pub fn spawn<F>(spec: &TaskSpec, entry: F) -> Result<Task, FreeRtosError>
where
    F: FnOnce(Task) + Send + 'static,
{
    Task::new()
        .name(spec.name)
        .stack_size(spec.stack_size)
        .priority(TaskPriority(spec.priority))
        .start(entry)
}
