//! Probabilistic shift register ("Turing Machine")
//!
//! On every clock the outgoing most significant bit is fed back into the
//! low end. With probability `p` the fed-back bit is replaced by a fresh
//! random bit. `p = 0` loops the register forever, `p = 1` produces an
//! independent random bit every step.

use crate::rng::{Probability, Rng};

/// Narrowest supported register
pub const MIN_WIDTH: u8 = 2;

/// Widest supported register
pub const MAX_WIDTH: u8 = 16;

/// Fixed-width recirculating bit register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShiftRegister {
    bits: u16,
    width: u8,
}

impl ShiftRegister {
    /// Create a register, `None` if `width` is outside `2..=16`
    ///
    /// Bits of `initial` above `width` are discarded.
    pub fn new(width: u8, initial: u16) -> Option<Self> {
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
            return None;
        }
        let mut reg = Self { bits: 0, width };
        reg.bits = initial & reg.mask();
        Some(reg)
    }

    /// Create a register filled with random bits
    pub fn random(width: u8, rng: &mut Rng) -> Option<Self> {
        Self::new(width, rng.next_u16())
    }

    fn mask(&self) -> u16 {
        if self.width >= 16 {
            u16::MAX
        } else {
            (1 << self.width) - 1
        }
    }

    /// Register width in bits
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Current contents
    pub fn value(&self) -> u16 {
        self.bits
    }

    /// The lowest `count` bits
    pub fn low_bits(&self, count: u8) -> u16 {
        if count >= 16 {
            self.bits
        } else {
            self.bits & ((1 << count) - 1)
        }
    }

    /// State of one bit
    pub fn bit(&self, index: u8) -> bool {
        index < self.width && (self.bits >> index) & 1 == 1
    }

    fn outgoing(&self) -> bool {
        self.bit(self.width - 1)
    }

    fn shift_in(&mut self, bit: bool) {
        self.bits = ((self.bits << 1) | bit as u16) & self.mask();
    }

    /// Clock the register once
    ///
    /// Returns `true` if the bit fed back differs from the one shifted out.
    pub fn step(&mut self, p: Probability, rng: &mut Rng) -> bool {
        let out = self.outgoing();
        let incoming = if rng.chance(p) { rng.next_bool() } else { out };
        self.shift_in(incoming);
        incoming != out
    }

    /// Clock the register once, inverting the fed-back bit
    pub fn step_flip(&mut self) {
        let out = self.outgoing();
        self.shift_in(!out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_bounds() {
        assert!(ShiftRegister::new(1, 0).is_none());
        assert!(ShiftRegister::new(17, 0).is_none());
        assert_eq!(ShiftRegister::new(4, 0xFF).unwrap().value(), 0x0F);
        assert_eq!(ShiftRegister::new(16, 0xBEEF).unwrap().value(), 0xBEEF);
    }

    #[test]
    fn test_zero_probability_loops() {
        let mut rng = Rng::new(1);
        let mut reg = ShiftRegister::new(8, 0b1011_0010).unwrap();
        let initial = reg.value();

        for round in 0..4 {
            for _ in 0..8 {
                assert!(!reg.step(Probability::ZERO, &mut rng));
            }
            assert_eq!(reg.value(), initial, "round {}", round);
        }
    }

    #[test]
    fn test_zero_probability_rotates() {
        let mut rng = Rng::new(1);
        let mut reg = ShiftRegister::new(4, 0b1000).unwrap();
        reg.step(Probability::ZERO, &mut rng);
        assert_eq!(reg.value(), 0b0001);
        reg.step(Probability::ZERO, &mut rng);
        assert_eq!(reg.value(), 0b0010);
    }

    #[test]
    fn test_full_probability_reproducible() {
        let mut a_rng = Rng::new(2024);
        let mut b_rng = Rng::new(2024);
        let mut a = ShiftRegister::new(16, 0).unwrap();
        let mut b = ShiftRegister::new(16, 0).unwrap();
        for _ in 0..256 {
            a.step(Probability::ONE, &mut a_rng);
            b.step(Probability::ONE, &mut b_rng);
            assert_eq!(a.value(), b.value());
        }
    }

    #[test]
    fn test_full_probability_not_periodic() {
        let mut rng = Rng::new(77);
        let mut reg = ShiftRegister::new(8, 0b0101_0101).unwrap();
        let mut outputs = [false; 256];
        for out in outputs.iter_mut() {
            reg.step(Probability::ONE, &mut rng);
            *out = reg.bit(0);
        }

        for period in 1..=reg.width() as usize {
            let periodic = (period..outputs.len()).all(|i| outputs[i] == outputs[i - period]);
            assert!(!periodic, "period {}", period);
        }
    }

    #[test]
    fn test_step_flip() {
        let mut reg = ShiftRegister::new(4, 0b1000).unwrap();
        reg.step_flip();
        assert_eq!(reg.value(), 0b0000);
        reg.step_flip();
        assert_eq!(reg.value(), 0b0001);
    }

    #[test]
    fn test_bits() {
        let reg = ShiftRegister::new(8, 0b1100_0101).unwrap();
        assert!(reg.bit(0));
        assert!(!reg.bit(1));
        assert!(reg.bit(7));
        assert!(!reg.bit(8));
        assert_eq!(reg.low_bits(3), 0b101);
    }
}
