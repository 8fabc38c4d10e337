//! Selection menu
//!
//! Shown whenever no program is running. The selected program's display
//! code is rendered on the indicator LEDs; button B advances, button A
//! confirms, knob 1 selects directly.
//!
//! Entering the menu, at boot or after a program stops, first plays an
//! [`LedSweep`] across the indicator LEDs.

use crate::input::{InputEvent, InputKind, InputSource};
use crate::registry::{DisplayCode, OutOfRange, ProgramRegistry};
use crate::time;
use crate::traits::{KnobValue, PanelDriver};

/// Time each LED of the sweep stays lit
pub const SWEEP_FRAME_MS: u32 = 50;

/// Lit LED per frame: one pass out, three passes back
const SWEEP_FRAMES: [usize; 16] = [0, 1, 2, 3, 3, 2, 1, 0, 3, 2, 1, 0, 3, 2, 1, 0];

/// Whole sweep, from the first anchored frame to the dark indicator
pub const SWEEP_DURATION_MS: u32 = SWEEP_FRAMES.len() as u32 * SWEEP_FRAME_MS;

/// Menu action decoded from an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuAction {
    /// Move to the next program, wrapping around
    Advance,
    /// Start the selected program
    Confirm,
    /// Jump to the program under knob 1
    Knob(u16),
}

impl MenuAction {
    /// Decode a menu action, `None` if the event means nothing to the menu
    pub fn from_event(event: &InputEvent) -> Option<Self> {
        match (event.source, event.kind) {
            (InputSource::ButtonB, InputKind::Released) => Some(MenuAction::Advance),
            (InputSource::ButtonA, InputKind::Released) => Some(MenuAction::Confirm),
            (InputSource::Knob1, InputKind::Moved { position }) => Some(MenuAction::Knob(position)),
            _ => None,
        }
    }
}

/// Selection state over `len` programs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SelectionMenu {
    index: usize,
    len: usize,
}

impl SelectionMenu {
    /// Create a menu with the first program selected
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    /// Selected index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of selectable programs
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if there is nothing to select
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Select the next program, wrapping to the first
    pub fn advance(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
        self.index
    }

    /// Select a program by index
    pub fn select(&mut self, index: usize) -> Result<(), OutOfRange> {
        if index >= self.len {
            return Err(OutOfRange {
                index,
                len: self.len,
            });
        }
        self.index = index;
        Ok(())
    }

    /// Select the program under a knob position
    ///
    /// The knob range is split into `len` equal zones. Always in range.
    pub fn select_by_knob(&mut self, position: u16) -> usize {
        if self.len > 0 {
            self.index = KnobValue(position).choice(self.len);
        }
        self.index
    }

    /// Show the selected program's display code
    pub fn render(
        &self,
        registry: &ProgramRegistry,
        io: &mut dyn PanelDriver,
    ) -> Result<(), OutOfRange> {
        let descriptor = registry.get(self.index)?;
        io.set_indicator(descriptor.code);
        Ok(())
    }
}

/// Snake sweep across the indicator LEDs
///
/// Advanced from the scheduler tick rather than by sleeping, so input is
/// never blocked while it plays. The first frame is shown on `start`; its
/// timing is anchored at the first `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedSweep {
    frame: usize,
    next_at: Option<u32>,
}

impl LedSweep {
    /// Show the first frame
    pub fn start(io: &mut dyn PanelDriver) -> Self {
        let sweep = Self {
            frame: 0,
            next_at: None,
        };
        sweep.show(io);
        sweep
    }

    /// Step the sweep at `now_ms`
    ///
    /// Returns `false` once the last frame has run out; the indicator is
    /// left dark and the caller takes it over.
    pub fn advance(&mut self, now_ms: u32, io: &mut dyn PanelDriver) -> bool {
        let Some(at) = self.next_at else {
            self.next_at = Some(now_ms.wrapping_add(SWEEP_FRAME_MS));
            return true;
        };
        if !time::reached(now_ms, at) {
            return true;
        }

        self.frame += 1;
        if self.frame >= SWEEP_FRAMES.len() {
            io.set_indicator(DisplayCode::ZERO);
            return false;
        }
        self.show(io);
        self.next_at = Some(at.wrapping_add(SWEEP_FRAME_MS));
        true
    }

    /// Time the next frame is due
    pub fn deadline(&self, now_ms: u32) -> u32 {
        self.next_at.unwrap_or(now_ms)
    }

    /// Index of the frame being shown
    pub fn frame(&self) -> usize {
        self.frame
    }

    fn show(&self, io: &mut dyn PanelDriver) {
        let led = SWEEP_FRAMES[self.frame];
        io.set_indicator(DisplayCode::new(0b1000 >> led).unwrap_or(DisplayCode::ZERO));
    }
}
