//! GPIO pin abstractions
//!
//! The bootloader only drives outputs: a status LED that blinks while rows
//! are flushed and goes dark once an image has been programmed.

/// Status output driven by the programming pipeline
pub trait OutputPin {
    /// Drive the output to logic 1
    fn set_high(&mut self);

    /// Drive the output to logic 0; used to signal the end of a transfer
    fn set_low(&mut self);

    /// Flip the output; called once per row flush
    fn toggle(&mut self);

    /// Drive the output to `high`
    fn set_state(&mut self, high: bool) {
        match high {
            true => self.set_high(),
            false => self.set_low(),
        }
    }

    /// Last level driven
    fn is_set_high(&self) -> bool;

    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Output that goes nowhere
///
/// For boards without a status LED.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPin {
    high: bool,
}

impl OutputPin for NoPin {
    fn set_high(&mut self) {
        self.high = true;
    }

    fn set_low(&mut self) {
        self.high = false;
    }

    fn toggle(&mut self) {
        self.high = !self.high;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}
