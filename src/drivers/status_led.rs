//! RGB status LED driver.
//!
//! Three PWM channels drive discrete R/G/B LEDs (or a common-cathode RGB
//! LED).  Each [`StatusPhase`] maps to one fixed colour.
//!
//! | Phase      | Colour  |
//! |------------|---------|
//! | Connecting | yellow  |
//! | Sending    | cyan    |
//! | Awaiting   | blue    |
//! | Parsing    | magenta |
//! | Success    | green   |
//! | Failure    | red     |
//! | Feeding    | white   |
//!
//! Fire-and-forget: PWM errors are dropped.

use embedded_hal::pwm::SetDutyCycle;

use crate::app::ports::{StatusPhase, StatusPort};

pub const fn colour_for(phase: StatusPhase) -> (u8, u8, u8) {
    match phase {
        StatusPhase::Connecting => (255, 160, 0),
        StatusPhase::Sending => (0, 200, 255),
        StatusPhase::Awaiting => (0, 0, 255),
        StatusPhase::Parsing => (180, 0, 255),
        StatusPhase::Success => (0, 255, 0),
        StatusPhase::Failure => (255, 0, 0),
        StatusPhase::Feeding => (255, 255, 255),
    }
}

pub struct RgbStatusLed<P> {
    red: P,
    green: P,
    blue: P,
    current: (u8, u8, u8),
}

impl<P: SetDutyCycle> RgbStatusLed<P> {
    pub fn new(red: P, green: P, blue: P) -> Self {
        let mut led = Self { red, green, blue, current: (0, 0, 0) };
        led.off();
        led
    }

    pub fn set_colour(&mut self, r: u8, g: u8, b: u8) {
        let _ = self.red.set_duty_cycle_fraction(u16::from(r), 255);
        let _ = self.green.set_duty_cycle_fraction(u16::from(g), 255);
        let _ = self.blue.set_duty_cycle_fraction(u16::from(b), 255);
        self.current = (r, g, b);
    }

    pub fn off(&mut self) {
        self.set_colour(0, 0, 0);
    }

    pub fn current_colour(&self) -> (u8, u8, u8) {
        self.current
    }
}

impl<P: SetDutyCycle> StatusPort for RgbStatusLed<P> {
    fn signal(&mut self, phase: StatusPhase) {
        let (r, g, b) = colour_for(phase);
        self.set_colour(r, g, b);
    }
}
