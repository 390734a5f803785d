//! Thermal actuation: a cooling fan and a spring-loaded vent actuator driven
//! from the enclosure and processor temperatures.
//!
//! The enclosure band drives both lines. Crossing `on` starts the fan and
//! lets the vent spring open. Crossing `off` stops the fan and energizes the
//! actuator for `pulse_duration` to pull the door shut, after which the
//! actuator is released to save power. The CPU band only ever touches the fan.
//!
//! Evaluations are synchronous. The only background work is the release
//! task, which shares the controller state behind one mutex.

pub mod hysteresis;
pub mod release;

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use thiserror::Error;
use tokio::{runtime::Handle, sync::broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::{
    models::control_event::{FanState, StateChangeEvent, TemperatureSource},
    ports::{Level, OutputLine, OutputPort},
};

use self::{
    hysteresis::{BandDecision, HysteresisBand},
    release::PendingRelease,
};

const EVENT_CHANNEL_CAPACITY: usize = 32;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Controller must be created inside a tokio runtime.")]
    NoRuntime,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSettings {
    pub enclosure: HysteresisBand,
    pub cpu: HysteresisBand,
    pub pulse_duration: Duration,
}

/// Outcome of a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    SwitchedOn,
    SwitchedOff,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSnapshot {
    pub fan_on: bool,
    pub actuator_engaged: bool,
    pub release_pending: bool,
    pub shut_down: bool,
}

struct ControllerState {
    fan_on: bool,
    actuator_engaged: bool,
    pending_release: Option<PendingRelease>,
    outputs: Box<dyn OutputPort>,
    shut_down: bool,
}

impl ControllerState {
    /// A failed write is logged and otherwise ignored: the logical state is
    /// what the next evaluation reasons about.
    fn drive(&mut self, line: OutputLine, level: Level) {
        match self.outputs.set_level(line, level) {
            Ok(()) => trace!("Drove {} {}.", line, level),
            Err(e) => error!("Failed to drive output. Error: {}", e),
        }
    }

    fn cancel_pending_release(&mut self) {
        if let Some(pending) = self.pending_release.take() {
            debug!("Cancelling pending actuator release.");
            pending.cancel();
        }
    }

    fn release_actuator(&mut self) {
        self.cancel_pending_release();
        self.drive(OutputLine::VentActuator, Level::Low);
        self.actuator_engaged = false;
    }
}

fn lock(state: &Mutex<ControllerState>) -> MutexGuard<'_, ControllerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cheap to clone; every clone drives the same outputs.
#[derive(Clone)]
pub struct ThermalController {
    settings: ControllerSettings,
    state: Arc<Mutex<ControllerState>>,
    events: broadcast::Sender<StateChangeEvent>,
    runtime: Handle,
}

impl ThermalController {
    /// Start in OFF/relaxed with both lines low, whatever the hardware was doing before.
    pub fn new(
        settings: ControllerSettings,
        outputs: impl OutputPort + 'static,
    ) -> Result<Self, ControllerError> {
        let runtime = Handle::try_current().map_err(|_| ControllerError::NoRuntime)?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let mut state = ControllerState {
            fan_on: false,
            actuator_engaged: false,
            pending_release: None,
            outputs: Box::new(outputs),
            shut_down: false,
        };
        state.drive(OutputLine::Fan, Level::Low);
        state.drive(OutputLine::VentActuator, Level::Low);

        info!(
            "Thermal controller ready on {} outputs. enclosure on/off={}/{} cpu on/off={}/{} pulse={:?}",
            state.outputs.backend(),
            settings.enclosure.on(),
            settings.enclosure.off(),
            settings.cpu.on(),
            settings.cpu.off(),
            settings.pulse_duration,
        );

        Ok(Self {
            settings,
            state: Arc::new(Mutex::new(state)),
            events,
            runtime,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChangeEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        let state = lock(&self.state);
        ControllerSnapshot {
            fan_on: state.fan_on,
            actuator_engaged: state.actuator_engaged,
            release_pending: state.pending_release.is_some(),
            shut_down: state.shut_down,
        }
    }

    /// Enclosure reading: drives the fan and the vent actuator.
    pub fn evaluate_enclosure(&self, reading: Option<f32>) -> Transition {
        self.evaluate(TemperatureSource::Enclosure, reading)
    }

    /// Processor reading: drives the fan only.
    pub fn evaluate_cpu(&self, reading: Option<f32>) -> Transition {
        self.evaluate(TemperatureSource::Cpu, reading)
    }

    /// Evaluate one sampling cycle. Enclosure goes first and CPU second, so
    /// when the two disagree the CPU band has the last word on the fan.
    pub fn evaluate_cycle(
        &self,
        enclosure: Option<f32>,
        cpu: Option<f32>,
    ) -> (Transition, Transition) {
        let enclosure = self.evaluate_enclosure(enclosure);
        let cpu = self.evaluate_cpu(cpu);
        (enclosure, cpu)
    }

    /// De-assert the actuator now and drop any scheduled release. Idempotent.
    pub fn release_actuator(&self) {
        let mut state = lock(&self.state);
        state.release_actuator();
        debug!("Vent actuator released on request.");
    }

    /// Cancel the pending release and force both lines low.
    /// Later evaluations are ignored; calling this again does nothing.
    pub fn shutdown(&self) {
        let mut state = lock(&self.state);
        if state.shut_down {
            debug!("Controller already shut down.");
            return;
        }
        state.release_actuator();
        state.drive(OutputLine::Fan, Level::Low);
        state.fan_on = false;
        state.shut_down = true;
        info!("Thermal controller shut down, outputs low.");
    }

    fn evaluate(&self, source: TemperatureSource, reading: Option<f32>) -> Transition {
        let Some(reading) = reading.filter(|r| r.is_finite()) else {
            return Transition::Unchanged;
        };
        let band = match source {
            TemperatureSource::Enclosure => self.settings.enclosure,
            TemperatureSource::Cpu => self.settings.cpu,
        };

        let mut state = lock(&self.state);
        if state.shut_down {
            warn!("Ignoring {} reading after shutdown.", source);
            return Transition::Unchanged;
        }

        let transition = match band.decide(reading, state.fan_on) {
            BandDecision::SwitchOn => {
                state.drive(OutputLine::Fan, Level::High);
                state.fan_on = true;
                match source {
                    TemperatureSource::Enclosure => {
                        state.release_actuator();
                        info!("Fan ON, vent open. ({} degC enclosure)", reading);
                    }
                    TemperatureSource::Cpu => info!("Fan ON. ({} degC cpu)", reading),
                }
                Transition::SwitchedOn
            }
            BandDecision::SwitchOff => {
                state.drive(OutputLine::Fan, Level::Low);
                state.fan_on = false;
                match source {
                    TemperatureSource::Enclosure => {
                        state.drive(OutputLine::VentActuator, Level::High);
                        state.actuator_engaged = true;
                        self.schedule_release(&mut state);
                        info!("Fan OFF, closing vent. ({} degC enclosure)", reading);
                    }
                    TemperatureSource::Cpu => info!("Fan OFF. ({} degC cpu)", reading),
                }
                Transition::SwitchedOff
            }
            BandDecision::Hold => return Transition::Unchanged,
        };

        let new_state = if state.fan_on { FanState::On } else { FanState::Off };
        if self
            .events
            .send(StateChangeEvent::now(source, new_state))
            .is_err()
        {
            trace!("No subscribers for state change event.");
        }
        transition
    }

    /// Replace whatever release was pending with a fresh one.
    fn schedule_release(&self, state: &mut ControllerState) {
        state.cancel_pending_release();

        let token = CancellationToken::new();
        let task_token = token.clone();
        let shared = Arc::clone(&self.state);
        let pulse = self.settings.pulse_duration;

        let task = self.runtime.spawn(async move {
            tokio::select! {
                _ = task_token.cancelled() => return,
                _ = tokio::time::sleep(pulse) => {}
            }

            let mut state = lock(&shared);
            // Lost the race against a cancel that held the lock first.
            if task_token.is_cancelled() {
                return;
            }
            state.pending_release = None;
            state.release_actuator();
            info!("Vent actuator released after {:?}.", pulse);
        });

        state.pending_release = Some(PendingRelease::new(token, task));
    }
}
