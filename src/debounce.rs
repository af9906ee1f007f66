// Collapses bursts of triggers into one timer, `delay_ms` after the last

use crate::surface::Timers;
use wasm_bindgen::JsValue;

pub struct Debounce<T> {
    timers: T,
    delay_ms: i32,
    pending: Option<i32>,
}

impl<T: Timers> Debounce<T> {
    pub fn new(timers: T, delay_ms: i32) -> Self {
        Debounce {
            timers,
            delay_ms,
            pending: None,
        }
    }

    /// Restarts the delay, dropping any timer still waiting.
    pub fn trigger(&mut self) -> Result<(), JsValue> {
        if let Some(handle) = self.pending.take() {
            self.timers.clear_timeout(handle);
        }
        self.pending = Some(self.timers.set_timeout(self.delay_ms)?);
        Ok(())
    }

    /// Called from the timer callback. Returns false if nothing was waiting.
    pub fn fired(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn pending(&self) -> Option<i32> {
        self.pending
    }

    pub fn timers(&self) -> &T {
        &self.timers
    }

    #[cfg(test)]
    pub(crate) fn timers_mut(&mut self) -> &mut T {
        &mut self.timers
    }
}
