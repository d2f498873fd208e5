use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::io;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use launch_core::{
    ports::{
        CompletionToken, DelayScheduler, DisplayProbe, FatalAlert, FatalNotice, InitOutcome,
        LocationSubsystem, PermissionKind, PermissionProvider, ScreenLauncher,
        SubsystemInitializer, TaskHandle,
    },
    InitError, LaunchRequest, LaunchSequencer, Phase, ScreenId, ScreenResult,
};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InitMode {
    #[default]
    Ready,
    Pending,
    StorageError,
}

/// How the simulated platform answers the launch screen.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub grant_location: bool,
    pub init_mode: InitMode,
    pub car_display: bool,
    pub result_code: i32,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            grant_location: true,
            init_mode: InitMode::Ready,
            car_display: false,
            result_code: ScreenResult::OK,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum HostEvent {
    Hidden,
    Shown,
    PermissionResult(BTreeSet<PermissionKind>),
    InitComplete(CompletionToken),
    DestinationResult(ScreenResult),
    FatalDismissed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScreenTransition {
    Launched {
        destination: ScreenId,
        payload: LaunchRequest,
    },
    LaunchedForResult {
        destination: ScreenId,
        payload: LaunchRequest,
    },
    Finished {
        result: Option<ScreenResult>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct LaunchReport {
    pub final_phase: String,
    pub transitions: Vec<ScreenTransition>,
    pub fatal: Option<FatalNotice>,
    pub location_started: bool,
}

#[derive(Debug, Default)]
struct HostState {
    queue: VecDeque<HostEvent>,
    timers: Vec<(Instant, TaskHandle)>,
    next_id: u64,
    granted: BTreeSet<PermissionKind>,
    location_active: bool,
    location_started: bool,
    transitions: Vec<ScreenTransition>,
    fatal: Option<FatalNotice>,
    finished: bool,
}

impl HostState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Single-threaded stand-in for the platform: every collaborator the launch
/// screen needs, plus the event loop that feeds callbacks back into it.
#[derive(Clone, Debug)]
pub struct SimulatedHost {
    scenario: Scenario,
    state: Rc<RefCell<HostState>>,
}

impl SimulatedHost {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            state: Rc::new(RefCell::new(HostState::default())),
        }
    }

    pub fn run(&self, sequencer: &mut LaunchSequencer) -> LaunchReport {
        sequencer.on_create();
        sequencer.on_visible();

        while !self.state.borrow().finished {
            let event = self.state.borrow_mut().queue.pop_front();
            if let Some(event) = event {
                self.dispatch(sequencer, event);
                continue;
            }
            match self.take_next_timer() {
                Some((due, handle)) => {
                    let now = Instant::now();
                    if due > now {
                        thread::sleep(due - now);
                    }
                    sequencer.on_timer_elapsed(handle);
                }
                None => {
                    debug!(phase = ?sequencer.phase(), "event loop idle");
                    break;
                }
            }
        }

        sequencer.on_invisible();
        sequencer.on_destroy();
        self.report(sequencer.phase())
    }

    fn dispatch(&self, sequencer: &mut LaunchSequencer, event: HostEvent) {
        debug!(?event, "dispatching host event");
        match event {
            HostEvent::Hidden => {
                sequencer.on_invisible();
            }
            HostEvent::Shown => {
                sequencer.on_visible();
            }
            HostEvent::PermissionResult(granted) => {
                sequencer.on_permission_result(&granted);
            }
            HostEvent::InitComplete(token) => {
                sequencer.on_init_complete(token);
            }
            HostEvent::DestinationResult(result) => {
                sequencer.on_destination_result(result);
            }
            HostEvent::FatalDismissed => {
                sequencer.on_fatal_dismissed();
            }
        }
    }

    fn take_next_timer(&self) -> Option<(Instant, TaskHandle)> {
        let mut state = self.state.borrow_mut();
        let index = state
            .timers
            .iter()
            .enumerate()
            .min_by_key(|(_, (due, _))| *due)
            .map(|(index, _)| index)?;
        Some(state.timers.remove(index))
    }

    fn push(&self, event: HostEvent) {
        self.state.borrow_mut().queue.push_back(event);
    }

    fn report(&self, phase: Phase) -> LaunchReport {
        let state = self.state.borrow();
        LaunchReport {
            final_phase: format!("{phase:?}"),
            transitions: state.transitions.clone(),
            fatal: state.fatal.clone(),
            location_started: state.location_started,
        }
    }
}

impl PermissionProvider for SimulatedHost {
    fn request(&self, kinds: &BTreeSet<PermissionKind>) {
        let granted = if self.scenario.grant_location {
            kinds.clone()
        } else {
            BTreeSet::new()
        };
        info!(?granted, "permission dialog answered");
        self.state.borrow_mut().granted.extend(granted.iter().copied());
        // The dialog covers the screen while it is open.
        self.push(HostEvent::Hidden);
        self.push(HostEvent::PermissionResult(granted));
        self.push(HostEvent::Shown);
    }

    fn check_granted(&self, kind: PermissionKind) -> bool {
        self.state.borrow().granted.contains(&kind)
    }
}

impl SubsystemInitializer for SimulatedHost {
    fn init(&self) -> Result<InitOutcome, InitError> {
        match self.scenario.init_mode {
            InitMode::Ready => Ok(InitOutcome::Ready),
            InitMode::Pending => {
                let token = CompletionToken(self.state.borrow_mut().next_id());
                self.push(HostEvent::InitComplete(token));
                Ok(InitOutcome::Pending(token))
            }
            InitMode::StorageError => Err(InitError::Storage(io::Error::new(
                io::ErrorKind::Other,
                "no writable storage for map data",
            ))),
        }
    }
}

impl LocationSubsystem for SimulatedHost {
    fn on_entered_first_run(&self) {
        info!("location subsystem entered first run");
    }

    fn is_active(&self) -> bool {
        self.state.borrow().location_active
    }

    fn start(&self) {
        let mut state = self.state.borrow_mut();
        state.location_active = true;
        state.location_started = true;
    }
}

impl ScreenLauncher for SimulatedHost {
    fn launch(&self, destination: &ScreenId, payload: &LaunchRequest) {
        self.state
            .borrow_mut()
            .transitions
            .push(ScreenTransition::Launched {
                destination: destination.clone(),
                payload: payload.clone(),
            });
    }

    fn launch_for_result(&self, destination: &ScreenId, payload: &LaunchRequest) {
        self.state
            .borrow_mut()
            .transitions
            .push(ScreenTransition::LaunchedForResult {
                destination: destination.clone(),
                payload: payload.clone(),
            });
        // The destination echoes the request back with the configured code.
        self.push(HostEvent::Hidden);
        self.push(HostEvent::DestinationResult(ScreenResult::new(
            self.scenario.result_code,
            Some(payload.clone()),
        )));
    }

    fn finish(&self, result: Option<&ScreenResult>) {
        let mut state = self.state.borrow_mut();
        state.transitions.push(ScreenTransition::Finished {
            result: result.cloned(),
        });
        state.finished = true;
    }
}

impl DelayScheduler for SimulatedHost {
    fn schedule(&self, delay: Duration) -> TaskHandle {
        let mut state = self.state.borrow_mut();
        let handle = TaskHandle(state.next_id());
        state.timers.push((Instant::now() + delay, handle));
        handle
    }

    fn cancel(&self, handle: TaskHandle) {
        self.state
            .borrow_mut()
            .timers
            .retain(|(_, pending)| *pending != handle);
    }
}

impl FatalAlert for SimulatedHost {
    fn show(&self, notice: &FatalNotice) {
        info!(title = %notice.title, "fatal dialog shown");
        self.state.borrow_mut().fatal = Some(notice.clone());
        // The user taps the only button.
        self.push(HostEvent::FatalDismissed);
    }
}

impl DisplayProbe for SimulatedHost {
    fn is_car_display_used(&self) -> bool {
        self.scenario.car_display
    }
}
