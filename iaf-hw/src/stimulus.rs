//! Step-indexed injected-current protocol: a base current plus square pulses.

use heapless::Vec;

use crate::error::{DeviceError, DeviceResult};

pub const MAX_PULSES: usize = 8;

pub const REFERENCE_BASE_CURRENT: f32 = 0.0;

pub const REFERENCE_PULSES: [Pulse; 2] = [
    Pulse {
        first_step: 0,
        last_step: 49,
        amplitude: 1000.0,
    },
    Pulse {
        first_step: 350,
        last_step: 399,
        amplitude: 1000.0,
    },
];

/// Square current pulse over an inclusive step range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pulse {
    pub first_step: u64,
    pub last_step: u64,
    /// pA, added on top of the base current
    pub amplitude: f32,
}

impl Pulse {
    pub fn new(first_step: u64, last_step: u64, amplitude: f32) -> DeviceResult<Self> {
        if first_step > last_step {
            return Err(DeviceError::InvalidInput("pulse ends before it starts"));
        }
        Ok(Self {
            first_step,
            last_step,
            amplitude,
        })
    }

    #[inline]
    pub fn covers(&self, step: u64) -> bool {
        self.first_step <= step && step <= self.last_step
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PulseTrain {
    base_current: f32,
    pulses: Vec<Pulse, MAX_PULSES>,
}

impl PulseTrain {
    /// Constant current, no pulses.
    pub fn constant(base_current: f32) -> Self {
        Self {
            base_current,
            pulses: Vec::new(),
        }
    }

    /// Two 1000 pA pulses on steps 0..=49 and 350..=399 over a 0 pA base
    /// (5 ms each at dt = 0.1 ms).
    pub fn reference() -> DeviceResult<Self> {
        REFERENCE_PULSES
            .iter()
            .try_fold(Self::constant(REFERENCE_BASE_CURRENT), |train, p| train.with_pulse(*p))
    }

    pub fn push(&mut self, pulse: Pulse) -> DeviceResult<()> {
        if pulse.first_step > pulse.last_step {
            return Err(DeviceError::InvalidInput("pulse ends before it starts"));
        }
        self.pulses.push(pulse).map_err(|_| DeviceError::Capacity)
    }

    pub fn with_pulse(mut self, pulse: Pulse) -> DeviceResult<Self> {
        self.push(pulse)?;
        Ok(self)
    }

    pub fn base_current(&self) -> f32 {
        self.base_current
    }

    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    /// I_e for a step: base plus every pulse covering it (overlaps add up).
    pub fn current_at(&self, step: u64) -> f32 {
        self.pulses
            .iter()
            .filter(|p| p.covers(step))
            .fold(self.base_current, |acc, p| acc + p.amplitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_protocol_windows() {
        let t = PulseTrain::reference().unwrap();
        assert_eq!(t.pulses(), &REFERENCE_PULSES[..]);
        assert_eq!(t.current_at(0), 1000.0);
        assert_eq!(t.current_at(49), 1000.0);
        assert_eq!(t.current_at(50), 0.0);
        assert_eq!(t.current_at(349), 0.0);
        assert_eq!(t.current_at(350), 1000.0);
        assert_eq!(t.current_at(399), 1000.0);
        assert_eq!(t.current_at(400), 0.0);
        assert_eq!(t.current_at(2000), 0.0);
    }

    #[test]
    fn overlapping_pulses_add() {
        let t = PulseTrain::constant(10.0)
            .with_pulse(Pulse::new(5, 10, 100.0).unwrap())
            .unwrap()
            .with_pulse(Pulse::new(8, 12, -30.0).unwrap())
            .unwrap();
        assert_eq!(t.current_at(4), 10.0);
        assert_eq!(t.current_at(6), 110.0);
        assert_eq!(t.current_at(9), 80.0);
        assert_eq!(t.current_at(12), -20.0);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut t = PulseTrain::constant(0.0);
        for k in 0..MAX_PULSES as u64 {
            t.push(Pulse::new(k, k, 1.0).unwrap()).unwrap();
        }
        assert_eq!(t.push(Pulse::new(100, 100, 1.0).unwrap()), Err(DeviceError::Capacity));
        assert_eq!(t.pulses().len(), MAX_PULSES);
    }

    #[test]
    fn reversed_pulse_is_rejected() {
        assert!(matches!(Pulse::new(10, 3, 1.0), Err(DeviceError::InvalidInput(_))));
        let bad = Pulse { first_step: 10, last_step: 3, amplitude: 1.0 };
        assert!(PulseTrain::constant(0.0).push(bad).is_err());
    }
}
