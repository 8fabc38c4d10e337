//! Inter-task communication channels
//!
//! The input task produces debounced events and knob levels; the runtime
//! task consumes them. Both sides are lock-free from the task's point of
//! view (critical sections only).

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use portable_atomic::{AtomicU32, Ordering};

use ostinato_core::input::InputEvent;

/// Channel capacity for input events
const INPUT_CHANNEL_SIZE: usize = 16;

/// Debounced input events for the runtime task
pub static INPUT_CHANNEL: Channel<CriticalSectionRawMutex, InputEvent, INPUT_CHANNEL_SIZE> =
    Channel::new();

/// Latest knob levels (16-bit scale), read by the panel driver
static KNOB_LEVELS: Mutex<CriticalSectionRawMutex, Cell<[u16; 2]>> =
    Mutex::new(Cell::new([0; 2]));

/// Samples and events lost since the runtime task last looked
static DROPPED: AtomicU32 = AtomicU32::new(0);

/// Record lost samples or events
pub fn record_dropped(count: u32) {
    if count > 0 {
        DROPPED.fetch_add(count, Ordering::Relaxed);
    }
}

/// Take the lost count, resetting it
pub fn take_dropped() -> u32 {
    DROPPED.swap(0, Ordering::Relaxed)
}

/// Publish new knob levels
pub fn publish_knobs(levels: [u16; 2]) {
    KNOB_LEVELS.lock(|cell| cell.set(levels));
}

/// Latest knob levels
pub fn knob_levels() -> [u16; 2] {
    KNOB_LEVELS.lock(|cell| cell.get())
}
