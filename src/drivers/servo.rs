//! Hopper servo driver (MG996R on a 400 Hz LEDC channel).
//!
//! One scoop is a few short "jiggle" strokes to loosen the food followed by
//! a full extend/retract.  The PWM output is switched off after the last
//! scoop so the servo does not hum while idle.
//!
//! ```text
//!  per scoop:  (jiggle-extend ─ dwell ─ retract ─ dwell) × N
//!              extend ─ settle ─ retract ─ settle
//!  after all:  duty 0
//! ```
//!
//! Generic over `embedded-hal` PWM and delay, so the same driver runs on
//! ESP-IDF LEDC and on host mocks.  PWM errors are logged and absorbed:
//! the controller treats feeding as infallible.

use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::SetDutyCycle;
use log::{debug, warn};

use crate::app::ports::ActuatorPort;
use crate::config::ServoProfile;

/// Duty cycles in the profile are expressed out of this.
const DUTY_SCALE: u16 = 255;

pub struct ServoFeeder<P, D> {
    pwm: P,
    delay: D,
    profile: ServoProfile,
    scoops_dispensed: u64,
}

impl<P: SetDutyCycle, D: DelayNs> ServoFeeder<P, D> {
    pub fn new(pwm: P, delay: D, profile: ServoProfile) -> Self {
        Self { pwm, delay, profile, scoops_dispensed: 0 }
    }

    /// Total scoops since boot.
    pub fn scoops_dispensed(&self) -> u64 {
        self.scoops_dispensed
    }

    pub fn release(self) -> (P, D) {
        (self.pwm, self.delay)
    }

    fn set_duty(&mut self, duty: u8) {
        if let Err(e) = self.pwm.set_duty_cycle_fraction(u16::from(duty), DUTY_SCALE) {
            warn!("SERVO | set duty {} failed: {:?}", duty, e);
        }
    }

    fn disable(&mut self) {
        if let Err(e) = self.pwm.set_duty_cycle_fully_off() {
            warn!("SERVO | disable failed: {:?}", e);
        }
    }

    fn scoop(&mut self) {
        let p = self.profile;
        for _ in 0..p.jiggles_per_scoop {
            self.set_duty(p.jiggle_extend_duty);
            self.delay.delay_ms(p.jiggle_delay_ms);
            self.set_duty(p.retract_duty);
            self.delay.delay_ms(p.jiggle_delay_ms);
        }
        self.set_duty(p.extend_duty);
        self.delay.delay_ms(p.move_delay_ms);
        self.set_duty(p.retract_duty);
        self.delay.delay_ms(p.move_delay_ms);
        self.scoops_dispensed += 1;
    }
}

impl<P: SetDutyCycle, D: DelayNs> ActuatorPort for ServoFeeder<P, D> {
    fn actuate(&mut self, cycles: u32) {
        debug!("SERVO | {} scoop(s)", cycles);
        for _ in 0..cycles {
            self.scoop();
        }
        self.disable();
    }
}
