use crate::{
    rotation::{ReplayControl, TimerRegistry, start_command, stop_command},
    schedule::RotationSchedule,
    session::is_synthetic,
};

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Default pause between the stop and start commands of a rotation.
///
/// Must exceed the recorder's finalize latency so the closed segment is
/// fully flushed before a new one begins.
pub(crate) const DEFAULT_SETTLE: Duration = Duration::from_secs(2);

/// Drives the external replay recorder and keeps per-key rotation timers
/// armed.
///
/// Every countdown expiry triggers a rotation (stop with finalize, settle,
/// start) on its own task, then re-arms the key with the currently
/// configured interval. Recorder command failures are logged and swallowed;
/// they never affect timer state or other keys.
pub struct RotationEngine {
    control: Arc<dyn ReplayControl>,
    timers: TimerRegistry,
    schedule: Arc<RotationSchedule>,
    /// Keys with a rotation currently running, mapped to whether the key
    /// was canceled while that rotation was in flight. Caps in-flight
    /// rotations per key at one (closing the race between a manual cut and
    /// a countdown firing at the same instant) and lets a cancel landing
    /// during the settle window suppress the post-rotation re-arm.
    in_flight: Mutex<HashMap<String, bool>>,
    settle: Duration,
}

impl RotationEngine {
    /// Creates an engine with an explicit settle delay.
    ///
    /// Production callers want [`RotationEngine::with_default_settle`];
    /// tests inject a shorter delay.
    pub fn new(
        control: Arc<dyn ReplayControl>,
        schedule: Arc<RotationSchedule>,
        settle: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            control,
            timers: TimerRegistry::new(),
            schedule,
            in_flight: Mutex::new(HashMap::new()),
            settle,
        })
    }

    /// Creates an engine with the standard 2 second settle delay.
    pub fn with_default_settle(
        control: Arc<dyn ReplayControl>,
        schedule: Arc<RotationSchedule>,
    ) -> Arc<Self> {
        Self::new(control, schedule, DEFAULT_SETTLE)
    }

    /// Starts recording for `key`. Fire-and-forget; synthetic keys are a
    /// no-op and recorder failures are logged, never propagated.
    #[instrument(skip(self))]
    pub fn begin_recording(&self, key: &str) {
        if is_synthetic(key) {
            debug!(key, "Synthetic session, recording not started");
            return;
        }

        if let Err(e) = self.control.execute(&start_command(key)) {
            error!(key, error = ?e, "Failed to start recording");
        } else {
            info!(key, "Recording started");
        }
    }

    /// Stops recording for `key` gracefully and cancels its countdown.
    ///
    /// Unlike the other operations this is not synthetic-gated: an explicit
    /// stop is honored for any key so an operator can always end a capture.
    #[instrument(skip(self))]
    pub fn stop_recording(&self, key: &str) {
        if let Err(e) = self.control.execute(&stop_command(key)) {
            error!(key, error = ?e, "Failed to stop recording");
        } else {
            info!(key, "Recording stopped");
        }

        self.cancel_rotation(key);
    }

    /// Rotates the recording for `key`: stop with finalize, settle, start,
    /// then re-arm the countdown with the current interval.
    ///
    /// Runs on its own task so neither timer expiry nor the event dispatch
    /// path ever waits on the settle delay. At most one rotation per key is
    /// in flight; a concurrent second request is dropped.
    #[instrument(skip(self))]
    pub fn rotate_recording(self: &Arc<Self>, key: &str) {
        if is_synthetic(key) {
            debug!(key, "Synthetic session, rotation skipped");
            return;
        }

        {
            let mut in_flight = self.lock_in_flight();
            if in_flight.contains_key(key) {
                debug!(key, "Rotation already in flight, skipping");
                return;
            }
            in_flight.insert(key.to_string(), false);
        }

        let rotation_id = Uuid::new_v4();
        let engine = Arc::clone(self);
        let key = key.to_string();

        tokio::spawn(async move {
            info!(key = %key, rotation_id = %rotation_id, "Rotation started");

            if let Err(e) = engine.control.execute(&stop_command(&key)) {
                error!(key = %key, rotation_id = %rotation_id, error = ?e, "Failed to stop segment");
            }

            tokio::time::sleep(engine.settle).await;

            if let Err(e) = engine.control.execute(&start_command(&key)) {
                error!(key = %key, rotation_id = %rotation_id, error = ?e, "Failed to start new segment");
            }

            let canceled = {
                let mut in_flight = engine.lock_in_flight();
                in_flight.remove(&key).unwrap_or(false)
            };

            if canceled {
                // A leave or explicit stop landed during the settle window;
                // the key must end up unmonitored, not resurrected.
                debug!(key = %key, rotation_id = %rotation_id, "Canceled during rotation, not re-armed");
            } else {
                // Re-arm regardless of command outcome: external failures
                // must not stop the rotation cycle for this key.
                engine.arm_rotation(&key);
            }

            info!(key = %key, rotation_id = %rotation_id, "Rotation complete");
        });
    }

    /// Arms (or re-arms) the rotation countdown for `key` using the current
    /// configured interval. Expiry triggers [`Self::rotate_recording`].
    #[instrument(skip(self))]
    pub fn arm_rotation(self: &Arc<Self>, key: &str) {
        let engine = Arc::clone(self);
        let interval = self.schedule.interval();

        self.timers
            .arm(key, interval, move |key| engine.rotate_recording(&key));
    }

    /// Cancels the rotation countdown for `key`, if armed. Idempotent.
    ///
    /// If a rotation is in flight for the key, the cancel is recorded
    /// against it so the rotation task skips its re-arm.
    pub fn cancel_rotation(&self, key: &str) {
        self.timers.cancel(key);
        if let Some(canceled) = self.lock_in_flight().get_mut(key) {
            *canceled = true;
            debug!(key, "Cancel recorded against in-flight rotation");
        }
    }

    /// Returns `true` if `key` currently has an armed rotation countdown.
    pub fn is_monitored(&self, key: &str) -> bool {
        self.timers.is_armed(key)
    }

    /// Best-effort cancellation of every armed countdown at shutdown.
    ///
    /// In-flight rotations are marked canceled so they do not re-arm after
    /// the sweep.
    pub fn shutdown(&self) {
        self.timers.cancel_all();
        for canceled in self.lock_in_flight().values_mut() {
            *canceled = true;
        }
    }

    /// Locks the in-flight guard, recovering from poison.
    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<String, bool>> {
        self.in_flight.lock().unwrap_or_else(|e| {
            warn!("Rotation guard lock poisoned, recovering");
            e.into_inner()
        })
    }
}
