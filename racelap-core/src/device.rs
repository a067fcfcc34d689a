//! Reference lap timer device
//!
//! [`Device`] implements [`LapTimerSubsystem`] on top of the device state
//! machine, the lap book and three small collaborators: a [`Tuner`] for the
//! video receiver, an [`RssiFilter`], and a [`SettingsStore`].

use racelap_protocol::WILDCARD_DEVICE_ID;

use crate::config::{defaults, Settings};
use crate::state::{Crossing, DeviceState, Event, LapTimer};
use crate::traits::{
    FilterParams, LapTimerSubsystem, RssiFilter, RssiReading, SettingsStore, Tuner,
};

/// Result of one RSSI sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Filtered value
    pub filtered: u16,
    /// The filtered value rose to the threshold on this sample
    pub entered_gate: bool,
}

#[derive(Debug, Clone, Copy)]
struct Calibration {
    remaining: u16,
    peak: u16,
}

/// A lap timer built from its collaborators
#[derive(Debug)]
pub struct Device<T, S, F> {
    id: u8,
    state: DeviceState,
    timer: LapTimer,
    rssi: RssiReading,
    in_gate: bool,
    calibration: Option<Calibration>,
    channel: u16,
    threshold: u16,
    filter_params: FilterParams,
    min_lap_ms: u32,
    max_laps: u8,
    debug: u8,
    persist_failures: u16,
    tuner: T,
    store: S,
    filter: F,
}

impl<T, S, F> Device<T, S, F>
where
    T: Tuner,
    S: SettingsStore,
    F: RssiFilter,
{
    /// Build a device from stored settings, tuning the receiver and
    /// configuring the filter.
    pub fn from_settings(settings: &Settings, mut tuner: T, store: S, mut filter: F) -> Self {
        tuner.tune(settings.channel);
        filter.configure(settings.rssi_filter_q, settings.rssi_filter_r);

        Self {
            id: defaults::DEVICE_ID,
            state: settings.state,
            timer: LapTimer::new(),
            rssi: RssiReading {
                raw: 0,
                min: settings.rssi_min,
                max: settings.rssi_max,
                filtered: 0,
            },
            in_gate: false,
            calibration: None,
            channel: settings.channel,
            threshold: settings.rssi_threshold,
            filter_params: FilterParams {
                q: settings.rssi_filter_q,
                r: settings.rssi_filter_r,
            },
            min_lap_ms: settings.min_lap_time_ms(),
            max_laps: settings.max_laps,
            debug: 0,
            persist_failures: 0,
            tuner,
            store,
            filter,
        }
    }

    /// Build a device with factory settings
    pub fn new(tuner: T, store: S, filter: F) -> Self {
        Self::from_settings(&Settings::default(), tuner, store, filter)
    }

    /// Snapshot of everything that is persisted
    pub fn settings(&self) -> Settings {
        Settings {
            state: self.state,
            channel: self.channel,
            min_lap_time_s: (self.min_lap_ms / 1000).min(u8::MAX as u32) as u8,
            max_laps: self.max_laps,
            rssi_min: self.rssi.min,
            rssi_max: self.rssi.max,
            rssi_threshold: self.threshold,
            rssi_filter_q: self.filter_params.q,
            rssi_filter_r: self.filter_params.r,
        }
    }

    /// Feed one raw RSSI reading.
    ///
    /// Updates the RSSI bundle, advances calibration and reports whether the
    /// filtered value just rose to the threshold.
    pub fn sample_rssi(&mut self, raw: u16) -> Sample {
        let filtered = self.filter.filter(raw);
        self.rssi.raw = raw;
        self.rssi.filtered = filtered;
        self.rssi.min = self.rssi.min.min(raw);
        self.rssi.max = self.rssi.max.max(raw);

        if let Some(mut calibration) = self.calibration.take() {
            calibration.peak = calibration.peak.max(filtered);
            calibration.remaining = calibration.remaining.saturating_sub(1);
            if calibration.remaining == 0 {
                self.threshold = calibration.peak;
                self.state = self.state.transition(Event::CalibrationComplete);
            } else {
                self.calibration = Some(calibration);
            }
        }

        let above = filtered >= self.threshold;
        let entered_gate = above && !self.in_gate;
        self.in_gate = above;

        Sample {
            filtered,
            entered_gate,
        }
    }

    /// Record a gate crossing at `now_ms`; ignored unless timing
    pub fn crossing(&mut self, now_ms: u32) -> Crossing {
        if !self.state.is_timing() {
            return Crossing::Ignored;
        }
        self.timer.crossing(
            now_ms,
            self.rssi.raw,
            self.rssi.filtered,
            self.min_lap_ms,
            self.max_laps,
        )
    }

    /// Whether the threshold is being calibrated
    pub fn is_calibrating(&self) -> bool {
        self.calibration.is_some()
    }

    /// Number of settings writes the store rejected
    pub fn persist_failures(&self) -> u16 {
        self.persist_failures
    }

    pub fn tuner(&self) -> &T {
        &self.tuner
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn apply(&mut self, event: Event) -> DeviceState {
        self.state = self.state.transition(event);
        self.state
    }
}

impl<T, S, F> LapTimerSubsystem for Device<T, S, F>
where
    T: Tuner,
    S: SettingsStore,
    F: RssiFilter,
{
    fn device_id(&self) -> u8 {
        self.id
    }

    fn set_device_id(&mut self, id: u8) {
        if id != WILDCARD_DEVICE_ID {
            self.id = id;
        }
    }

    fn device_state(&self) -> DeviceState {
        self.state
    }

    fn lap_timer(&self) -> &LapTimer {
        &self.timer
    }

    fn rssi(&self) -> RssiReading {
        self.rssi
    }

    fn channel(&self) -> u16 {
        self.channel
    }

    fn set_channel(&mut self, channel: u16) {
        self.channel = channel;
        self.tuner.tune(channel);
    }

    fn rssi_threshold(&self) -> u16 {
        self.threshold
    }

    fn set_rssi_threshold(&mut self, threshold: u16) {
        self.threshold = threshold;
    }

    fn rssi_filter(&self) -> FilterParams {
        self.filter_params
    }

    fn set_rssi_filter(&mut self, params: FilterParams) {
        self.filter_params = params;
        self.filter.configure(params.q, params.r);
    }

    fn min_lap_time_ms(&self) -> u32 {
        self.min_lap_ms
    }

    fn set_min_lap_time_ms(&mut self, ms: u32) {
        self.min_lap_ms = ms;
    }

    fn max_laps(&self) -> u8 {
        self.max_laps
    }

    fn set_max_laps(&mut self, laps: u8) {
        self.max_laps = laps;
    }

    fn debug(&self) -> u8 {
        self.debug
    }

    fn set_debug(&mut self, debug: u8) {
        self.debug = debug;
    }

    fn reset(&mut self) {
        if self.apply(Event::Reset) == DeviceState::Idle {
            self.calibration = None;
            self.timer.arm();
        }
    }

    fn start(&mut self) {
        if self.apply(Event::Start) == DeviceState::Timing {
            self.timer.arm();
        }
    }

    fn activate(&mut self) {
        self.apply(Event::Activate);
    }

    fn deactivate(&mut self) {
        if self.apply(Event::Deactivate) == DeviceState::Inactive {
            self.calibration = None;
        }
    }

    fn calibrate_rssi(&mut self) {
        if self.state == DeviceState::Idle
            && self.apply(Event::Calibrate) == DeviceState::CalibrateRssi
        {
            self.calibration = Some(Calibration {
                remaining: defaults::RSSI_CALIBRATE_READS,
                peak: 0,
            });
        }
    }

    fn persist(&mut self) {
        let settings = self.settings();
        if self.store.save(&settings).is_err() {
            self.persist_failures = self.persist_failures.saturating_add(1);
        }
    }
}
