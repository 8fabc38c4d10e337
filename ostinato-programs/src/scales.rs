//! Quantizer scales
//!
//! CV outputs are 16-bit PWM duty values spanning 0..3.3V. A semitone
//! (1/12 V) is `65535 / (11.75 * 3.3)` duty units, so three octaves plus
//! one note fit below full scale.

use heapless::Vec;

/// Octaves available below full scale
pub const OCTAVE_RANGE: usize = 3;

/// Most notes a scale can hold (three chromatic octaves plus the top note)
pub const MAX_NOTES: usize = 37;

/// Duty value of a chromatic step above 0V
pub fn chromatic_duty(semitone: u32) -> u16 {
    // 65535 / 38.775 per semitone, kept in integers
    let duty = semitone as u64 * 65_535_000 / 38_775;
    duty.min(u16::MAX as u64) as u16
}

/// A scale as the set of chromatic degrees (1 = root ... 12 = major 7th)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    pub name: &'static str,
    pub degrees: &'static [u8],
    /// Add the root of the fourth octave as the top note
    pub include_octave: bool,
}

/// Available scales, in the order the arpeggiator cycles through them
pub const SCALES: [Scale; 9] = [
    Scale {
        name: "major",
        degrees: &[1, 3, 5, 6, 8, 10, 12],
        include_octave: true,
    },
    Scale {
        name: "minor",
        degrees: &[1, 3, 4, 6, 8, 9, 11],
        include_octave: true,
    },
    Scale {
        name: "major triad",
        degrees: &[1, 5, 8],
        include_octave: false,
    },
    Scale {
        name: "minor triad",
        degrees: &[1, 4, 8],
        include_octave: false,
    },
    Scale {
        name: "major pentatonic",
        degrees: &[1, 3, 5, 6, 8],
        include_octave: false,
    },
    Scale {
        name: "minor pentatonic",
        degrees: &[1, 4, 5, 6, 9],
        include_octave: false,
    },
    Scale {
        name: "chromatic",
        degrees: &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
        include_octave: true,
    },
    Scale {
        name: "octave",
        degrees: &[1],
        include_octave: true,
    },
    Scale {
        name: "octave + 7th",
        degrees: &[1, 12],
        include_octave: false,
    },
];

impl Scale {
    /// Expand the scale over the full output range
    pub fn notes(&self) -> ScaleNotes {
        let chromatic_steps = if self.include_octave { 37 } else { 36 };
        let mut notes = Vec::new();
        for semitone in 0..chromatic_steps {
            let degree = (semitone % 12) as u8 + 1;
            if self.degrees.contains(&degree) {
                // At most one entry per chromatic step
                let _ = notes.push(chromatic_duty(semitone));
            }
        }
        ScaleNotes {
            notes,
            include_octave: self.include_octave,
        }
    }
}

/// Expanded note table of a scale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleNotes {
    notes: Vec<u16, MAX_NOTES>,
    include_octave: bool,
}

impl ScaleNotes {
    /// All notes, lowest first
    pub fn as_slice(&self) -> &[u16] {
        &self.notes
    }

    /// Number of notes over the whole range
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Check if the scale has no notes
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Note at an index, if in range
    pub fn get(&self, index: usize) -> Option<u16> {
        self.notes.get(index).copied()
    }

    /// Number of notes covering `octave_range` octaves (1..=3)
    ///
    /// Includes the closing octave note when the scale has one.
    pub fn step_count(&self, octave_range: usize) -> usize {
        let mut count = self.notes.len() * octave_range / OCTAVE_RANGE;
        if self.include_octave {
            count += 1;
        }
        count.min(self.notes.len())
    }

    /// Quantize an arbitrary index into the first `range` notes
    pub fn quantize(&self, index: usize, range: usize) -> u16 {
        let range = range.min(self.notes.len());
        if range == 0 {
            return 0;
        }
        self.notes[index % range]
    }
}
