//! The single logical 1 Hz trigger handle.
//!
//! The controller never schedules itself. It arms and disarms this handle,
//! and the host loop only calls `tick` while the handle is armed. Every arm
//! bumps the generation so the loop can realign its interval to the new
//! phase start.

/// Arm state of the periodic tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickTrigger {
    armed: bool,
    generation: u64,
}

impl TickTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the trigger, replacing any previous arming.
    pub fn arm(&mut self) {
        self.armed = true;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Counter bumped on every [`arm`](Self::arm).
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
