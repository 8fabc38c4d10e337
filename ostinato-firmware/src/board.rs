//! EuroPi pin map
//!
//! | Function | GPIO | Peripheral |
//! |----------|------|------------|
//! | Knob 1 / Knob 2 | 28 / 27 | ADC |
//! | Button A / Button B | 15 / 18 | input, pull-up, low = pressed |
//! | CV1 | 14 | PWM slice 7 A |
//! | CV2 / CV3 | 11 / 10 | PWM slice 5 B / A |
//! | CV4 | 7 | PWM slice 3 B |
//! | Gate 1-4 | 21, 22, 19, 20 | output (also the indicator LEDs) |
//! | SMPS mode | 23 | output, held high for quieter ADC reads |

use defmt::*;
use embassy_rp::adc::{Adc, Async, Channel, Config as AdcConfig, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::Peripherals;

use ostinato_core::input::RawSample;
use ostinato_core::registry::DisplayCode;
use ostinato_core::traits::{CvChannel, GateChannel, Knob, KnobValue, PanelDriver};

use crate::channels;

bind_interrupts!(pub struct Irqs {
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

/// Full-scale 12-bit ADC reading
const ADC_MAX: u32 = 4095;

/// PWM wrap value; a duty of `u16::MAX` holds the output high
const PWM_TOP: u16 = u16::MAX - 1;

/// Buttons and knobs, owned by the input task
pub struct PanelInputs {
    button_a: Input<'static>,
    button_b: Input<'static>,
    adc: Adc<'static, Async>,
    knob_1: Channel<'static>,
    knob_2: Channel<'static>,
    last: [u16; 2],
}

impl PanelInputs {
    /// Read every input once
    ///
    /// A failed ADC conversion keeps the previous knob level.
    pub async fn sample(&mut self) -> RawSample {
        let knob_1 = match self.adc.read(&mut self.knob_1).await {
            Ok(raw) => scale_adc(raw),
            Err(_) => {
                warn!("Knob 1 ADC read error");
                self.last[0]
            }
        };
        let knob_2 = match self.adc.read(&mut self.knob_2).await {
            Ok(raw) => scale_adc(raw),
            Err(_) => {
                warn!("Knob 2 ADC read error");
                self.last[1]
            }
        };
        self.last = [knob_1, knob_2];

        RawSample {
            button_a: self.button_a.is_low(),
            button_b: self.button_b.is_low(),
            knob_1,
            knob_2,
        }
    }
}

fn scale_adc(raw: u16) -> u16 {
    ((raw as u32).min(ADC_MAX) * u16::MAX as u32 / ADC_MAX) as u16
}

/// CV and gate outputs, owned by the runtime task
pub struct EuroPiPanel {
    cv_1: Pwm<'static>,
    cv_2_3: Pwm<'static>,
    cv_4: Pwm<'static>,
    /// Slice configs for CV1, CV2/3, CV4; compare values are updated in place
    pwm: [PwmConfig; 3],
    gates: [Output<'static>; 4],
    _smps_mode: Output<'static>,
}

impl PanelDriver for EuroPiPanel {
    fn read_knob(&mut self, knob: Knob) -> KnobValue {
        KnobValue(channels::knob_levels()[knob.index()])
    }

    fn write_cv(&mut self, channel: CvChannel, value: u16) {
        match channel {
            CvChannel::Cv1 => {
                self.pwm[0].compare_a = value;
                self.cv_1.set_config(&self.pwm[0]);
            }
            CvChannel::Cv2 => {
                self.pwm[1].compare_b = value;
                self.cv_2_3.set_config(&self.pwm[1]);
            }
            CvChannel::Cv3 => {
                self.pwm[1].compare_a = value;
                self.cv_2_3.set_config(&self.pwm[1]);
            }
            CvChannel::Cv4 => {
                self.pwm[2].compare_b = value;
                self.cv_4.set_config(&self.pwm[2]);
            }
        }
    }

    fn write_gate(&mut self, channel: GateChannel, high: bool) {
        self.gates[channel.index()].set_level(Level::from(high));
    }

    fn set_indicator(&mut self, pattern: DisplayCode) {
        for (i, gate) in self.gates.iter_mut().enumerate() {
            gate.set_level(Level::from(pattern.led(i)));
        }
    }
}

/// Claim the panel peripherals
pub fn init(p: Peripherals) -> (PanelInputs, EuroPiPanel) {
    let mut pwm_config = PwmConfig::default();
    pwm_config.top = PWM_TOP;
    pwm_config.compare_a = 0;
    pwm_config.compare_b = 0;

    let inputs = PanelInputs {
        button_a: Input::new(p.PIN_15, Pull::Up),
        button_b: Input::new(p.PIN_18, Pull::Up),
        adc: Adc::new(p.ADC, Irqs, AdcConfig::default()),
        knob_1: Channel::new_pin(p.PIN_28, Pull::None),
        knob_2: Channel::new_pin(p.PIN_27, Pull::None),
        last: [0; 2],
    };

    let panel = EuroPiPanel {
        cv_1: Pwm::new_output_a(p.PWM_SLICE7, p.PIN_14, pwm_config.clone()),
        cv_2_3: Pwm::new_output_ab(p.PWM_SLICE5, p.PIN_10, p.PIN_11, pwm_config.clone()),
        cv_4: Pwm::new_output_b(p.PWM_SLICE3, p.PIN_7, pwm_config.clone()),
        pwm: [pwm_config.clone(), pwm_config.clone(), pwm_config],
        gates: [
            Output::new(p.PIN_21, Level::Low),
            Output::new(p.PIN_22, Level::Low),
            Output::new(p.PIN_19, Level::Low),
            Output::new(p.PIN_20, Level::Low),
        ],
        _smps_mode: Output::new(p.PIN_23, Level::High),
    };

    info!("EuroPi panel initialized");
    (inputs, panel)
}
