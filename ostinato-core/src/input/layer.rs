//! Input event layer
//!
//! Fed one raw sample per poll period; produces debounced events into a
//! bounded queue. Overload drops events and counts them, it never queues
//! without bound and never replays stale samples.

use heapless::Deque;

use super::chord::ChordDetector;
use super::debounce::{Debouncer, KnobTracker};
use super::events::{InputEvent, InputKind, InputSource};
use super::hold::HoldDetector;
use crate::config::InputConfig;
use crate::time;

/// Capacity of the pending event queue
pub const EVENT_QUEUE_LEN: usize = 16;

/// One raw reading of every panel input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    /// Button A level (true = pressed)
    pub button_a: bool,
    /// Button B level (true = pressed)
    pub button_b: bool,
    /// Knob 1 position (0..=65535)
    pub knob_1: u16,
    /// Knob 2 position (0..=65535)
    pub knob_2: u16,
}

/// Debounces raw samples into input events
#[derive(Debug)]
pub struct InputLayer {
    config: InputConfig,
    button_a: Debouncer,
    button_b: Debouncer,
    knob_1: KnobTracker,
    knob_2: KnobTracker,
    chord: ChordDetector,
    hold_a: HoldDetector,
    hold_b: HoldDetector,
    queue: Deque<InputEvent, EVENT_QUEUE_LEN>,
    last_sample_ms: Option<u32>,
    dropped: u32,
}

impl InputLayer {
    /// Create an input layer
    pub fn new(config: InputConfig) -> Self {
        Self {
            button_a: Debouncer::new(config.debounce_samples),
            button_b: Debouncer::new(config.debounce_samples),
            knob_1: KnobTracker::new(config.debounce_samples, config.knob_hysteresis),
            knob_2: KnobTracker::new(config.debounce_samples, config.knob_hysteresis),
            chord: ChordDetector::new(config.long_press_ms),
            hold_a: HoldDetector::new(config.long_press_ms),
            hold_b: HoldDetector::new(config.long_press_ms),
            queue: Deque::new(),
            last_sample_ms: None,
            dropped: 0,
            config,
        }
    }

    /// Feed one raw sample taken at `now_ms`
    pub fn sample(&mut self, raw: RawSample, now_ms: u32) {
        self.account_gap(now_ms);

        // The latch is checked before this sample's update so the releases
        // that end a chord are suppressed as well. A release that ends a
        // single-button long press is swallowed the same way.
        let suppress_buttons = self.chord.is_latched();

        if let Some(level) = self.button_a.sample(raw.button_a) {
            let swallowed = !level && self.hold_a.is_fired();
            if !suppress_buttons && !swallowed {
                self.push(InputSource::ButtonA, edge(level), now_ms);
            }
        }
        if let Some(level) = self.button_b.sample(raw.button_b) {
            let swallowed = !level && self.hold_b.is_fired();
            if !suppress_buttons && !swallowed {
                self.push(InputSource::ButtonB, edge(level), now_ms);
            }
        }

        let a = self.button_a.is_active();
        let b = self.button_b.is_active();
        if self.chord.update(a, b, now_ms) {
            self.push(InputSource::BothButtons, InputKind::LongPress, now_ms);
        }
        if self.hold_a.update(a, b, now_ms) {
            self.push(InputSource::ButtonA, InputKind::LongPress, now_ms);
        }
        if self.hold_b.update(b, a, now_ms) {
            self.push(InputSource::ButtonB, InputKind::LongPress, now_ms);
        }

        if let Some(position) = self.knob_1.sample(raw.knob_1) {
            self.push(InputSource::Knob1, InputKind::Moved { position }, now_ms);
        }
        if let Some(position) = self.knob_2.sample(raw.knob_2) {
            self.push(InputSource::Knob2, InputKind::Moved { position }, now_ms);
        }
    }

    /// Pop the oldest pending event
    pub fn next_event(&mut self) -> Option<InputEvent> {
        self.queue.pop_front()
    }

    /// Number of pending events
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Return and clear the dropped sample/event count
    pub fn take_dropped(&mut self) -> u32 {
        core::mem::take(&mut self.dropped)
    }

    /// Debounced level of a button source
    pub fn is_pressed(&self, source: InputSource) -> bool {
        match source {
            InputSource::ButtonA => self.button_a.is_active(),
            InputSource::ButtonB => self.button_b.is_active(),
            InputSource::BothButtons => self.button_a.is_active() && self.button_b.is_active(),
            InputSource::Knob1 | InputSource::Knob2 => false,
        }
    }

    fn push(&mut self, source: InputSource, kind: InputKind, now_ms: u32) {
        if self
            .queue
            .push_back(InputEvent::new(source, kind, now_ms))
            .is_err()
        {
            self.dropped = self.dropped.saturating_add(1);
        }
    }

    /// Count samples lost to a sampling gap
    fn account_gap(&mut self, now_ms: u32) {
        let period = self.config.poll_period_ms.max(1);
        if let Some(last) = self.last_sample_ms {
            let gap = time::elapsed(now_ms, last);
            if gap > period.saturating_mul(self.config.stale_factor) {
                self.dropped = self.dropped.saturating_add((gap / period).saturating_sub(1));
            }
        }
        self.last_sample_ms = Some(now_ms);
    }
}

fn edge(level: bool) -> InputKind {
    if level {
        InputKind::Pressed
    } else {
        InputKind::Released
    }
}
