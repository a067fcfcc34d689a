//! Lap book
//!
//! Records gate crossings as laps. Times are in milliseconds from a
//! monotonic clock supplied by the caller.

use heapless::Vec;

/// Hard upper bound on recorded laps
pub const LAP_TIMER_MAXIMUM_LAPS: usize = 50;

/// Lap timer states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LapTimerState {
    /// Armed, waiting for the first crossing
    #[default]
    Waiting = 0,
    /// Clock running
    Start = 1,
    /// Lap maximum reached
    Stop = 2,
}

impl LapTimerState {
    /// Wire value
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// One recorded lap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LapRecord {
    /// Lap duration in milliseconds
    pub time_ms: u32,
    /// Raw RSSI at the crossing
    pub rssi: u16,
    /// Filtered RSSI at the crossing
    pub rssi_filtered: u16,
}

/// What a crossing did to the lap book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Crossing {
    /// First crossing, the clock started
    Started,
    /// A lap was recorded (1-based lap number)
    Lap(u8),
    /// A lap was recorded and the lap maximum stopped the timer
    Finished(u8),
    /// Too soon after the previous crossing, or the timer is not running
    Ignored,
}

/// Lap timer snapshot and bookkeeping
#[derive(Debug, Clone)]
pub struct LapTimer {
    state: LapTimerState,
    started_at_ms: u32,
    laps: Vec<LapRecord, LAP_TIMER_MAXIMUM_LAPS>,
}

impl Default for LapTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl LapTimer {
    /// Create an empty, waiting lap timer
    pub const fn new() -> Self {
        Self {
            state: LapTimerState::Waiting,
            started_at_ms: 0,
            laps: Vec::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> LapTimerState {
        self.state
    }

    /// Number of recorded laps
    pub fn count(&self) -> u8 {
        self.laps.len() as u8
    }

    /// Lap by 1-based number; `None` for 0 or past the last lap
    pub fn lap(&self, number: u8) -> Option<&LapRecord> {
        let index = (number as usize).checked_sub(1)?;
        self.laps.get(index)
    }

    /// Clear all laps and wait for the first crossing
    pub fn arm(&mut self) {
        self.laps.clear();
        self.started_at_ms = 0;
        self.state = LapTimerState::Waiting;
    }

    /// Record a gate crossing at `now_ms`.
    ///
    /// `min_lap_ms` is the shortest accepted lap. `max_laps` is clamped to
    /// [`LAP_TIMER_MAXIMUM_LAPS`].
    pub fn crossing(
        &mut self,
        now_ms: u32,
        rssi: u16,
        rssi_filtered: u16,
        min_lap_ms: u32,
        max_laps: u8,
    ) -> Crossing {
        match self.state {
            LapTimerState::Waiting => {
                self.started_at_ms = now_ms;
                self.state = LapTimerState::Start;
                Crossing::Started
            }
            LapTimerState::Start => {
                let elapsed = now_ms.wrapping_sub(self.started_at_ms);
                if elapsed < min_lap_ms {
                    return Crossing::Ignored;
                }

                let record = LapRecord {
                    time_ms: elapsed,
                    rssi,
                    rssi_filtered,
                };
                if self.laps.push(record).is_err() {
                    self.state = LapTimerState::Stop;
                    return Crossing::Ignored;
                }
                self.started_at_ms = now_ms;

                let number = self.count();
                let limit = (max_laps as usize).min(LAP_TIMER_MAXIMUM_LAPS);
                if self.laps.len() >= limit {
                    self.state = LapTimerState::Stop;
                    Crossing::Finished(number)
                } else {
                    Crossing::Lap(number)
                }
            }
            LapTimerState::Stop => Crossing::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_crossing_starts_clock() {
        let mut timer = LapTimer::new();
        assert_eq!(timer.crossing(1_000, 300, 290, 5_000, 3), Crossing::Started);
        assert_eq!(timer.state(), LapTimerState::Start);
        assert_eq!(timer.count(), 0);
    }

    #[test]
    fn test_laps_recorded_as_durations() {
        let mut timer = LapTimer::new();
        timer.crossing(1_000, 0, 0, 5_000, 10);
        assert_eq!(timer.crossing(12_000, 310, 300, 5_000, 10), Crossing::Lap(1));
        assert_eq!(timer.crossing(20_500, 320, 305, 5_000, 10), Crossing::Lap(2));

        assert_eq!(timer.lap(1).unwrap().time_ms, 11_000);
        assert_eq!(timer.lap(2).unwrap().time_ms, 8_500);
        assert_eq!(timer.lap(2).unwrap().rssi, 320);
        assert!(timer.lap(0).is_none());
        assert!(timer.lap(3).is_none());
    }

    #[test]
    fn test_crossing_before_min_lap_time_ignored() {
        let mut timer = LapTimer::new();
        timer.crossing(0, 0, 0, 5_000, 10);
        assert_eq!(timer.crossing(4_999, 0, 0, 5_000, 10), Crossing::Ignored);
        assert_eq!(timer.count(), 0);
        assert_eq!(timer.crossing(5_000, 0, 0, 5_000, 10), Crossing::Lap(1));
    }

    #[test]
    fn test_lap_maximum_stops_timer() {
        let mut timer = LapTimer::new();
        timer.crossing(0, 0, 0, 0, 2);
        assert_eq!(timer.crossing(10, 0, 0, 0, 2), Crossing::Lap(1));
        assert_eq!(timer.crossing(20, 0, 0, 0, 2), Crossing::Finished(2));
        assert_eq!(timer.state(), LapTimerState::Stop);
        assert_eq!(timer.crossing(30, 0, 0, 0, 2), Crossing::Ignored);
        assert_eq!(timer.count(), 2);
    }

    #[test]
    fn test_hard_limit_applies_over_max_laps() {
        let mut timer = LapTimer::new();
        timer.crossing(0, 0, 0, 0, u8::MAX);
        for i in 1..=LAP_TIMER_MAXIMUM_LAPS as u32 {
            timer.crossing(i * 10, 0, 0, 0, u8::MAX);
        }
        assert_eq!(timer.count() as usize, LAP_TIMER_MAXIMUM_LAPS);
        assert_eq!(timer.state(), LapTimerState::Stop);
    }

    #[test]
    fn test_arm_clears_laps() {
        let mut timer = LapTimer::new();
        timer.crossing(0, 0, 0, 0, 5);
        timer.crossing(100, 0, 0, 0, 5);
        timer.arm();
        assert_eq!(timer.count(), 0);
        assert_eq!(timer.state(), LapTimerState::Waiting);
    }
}
