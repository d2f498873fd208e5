use std::collections::BTreeSet;

use tracing::{debug, error, info, instrument, warn};

use crate::{
    config::SequencerConfig,
    error::{InitError, LaunchError},
    ports::{
        location_granted, CompletionToken, ConfigStore, DelayScheduler, DisplayProbe, FatalAlert,
        FatalNotice, InitOutcome, LocationSubsystem, PermissionKind, PermissionProvider,
        ScreenLauncher, SubsystemInitializer, TaskHandle,
    },
    request::{LaunchRequest, ScreenResult},
    router::{NavigationOutcome, Router},
    state::{Phase, SequencerState},
};

/// How navigation continues once the initializer returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    Immediate(NavigationOutcome),
    Deferred(CompletionToken),
}

/// Drives one launch screen instance from its first visibility to the hand-off
/// to the next screen. Every host callback enters through an `on_*` method.
pub struct LaunchSequencer {
    config: SequencerConfig,
    router: Router,
    request: LaunchRequest,
    state: SequencerState,
    outcome: Option<NavigationOutcome>,
    permissions: Box<dyn PermissionProvider>,
    store: Box<dyn ConfigStore>,
    initializer: Box<dyn SubsystemInitializer>,
    location: Box<dyn LocationSubsystem>,
    launcher: Box<dyn ScreenLauncher>,
    scheduler: Box<dyn DelayScheduler>,
    alert: Box<dyn FatalAlert>,
    display: Option<Box<dyn DisplayProbe>>,
}

pub struct LaunchSequencerBuilder {
    request: LaunchRequest,
    config: SequencerConfig,
    permissions: Option<Box<dyn PermissionProvider>>,
    store: Option<Box<dyn ConfigStore>>,
    initializer: Option<Box<dyn SubsystemInitializer>>,
    location: Option<Box<dyn LocationSubsystem>>,
    launcher: Option<Box<dyn ScreenLauncher>>,
    scheduler: Option<Box<dyn DelayScheduler>>,
    alert: Option<Box<dyn FatalAlert>>,
    display: Option<Box<dyn DisplayProbe>>,
}

impl LaunchSequencerBuilder {
    pub fn new(request: LaunchRequest) -> Self {
        Self {
            request,
            config: SequencerConfig::default(),
            permissions: None,
            store: None,
            initializer: None,
            location: None,
            launcher: None,
            scheduler: None,
            alert: None,
            display: None,
        }
    }

    pub fn with_config(mut self, config: SequencerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_permissions(mut self, permissions: Box<dyn PermissionProvider>) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn with_config_store(mut self, store: Box<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_initializer(mut self, initializer: Box<dyn SubsystemInitializer>) -> Self {
        self.initializer = Some(initializer);
        self
    }

    pub fn with_location(mut self, location: Box<dyn LocationSubsystem>) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_launcher(mut self, launcher: Box<dyn ScreenLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    pub fn with_scheduler(mut self, scheduler: Box<dyn DelayScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn with_fatal_alert(mut self, alert: Box<dyn FatalAlert>) -> Self {
        self.alert = Some(alert);
        self
    }

    /// Optional; without a probe no car display is ever assumed.
    pub fn with_display_probe(mut self, display: Box<dyn DisplayProbe>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn build(self) -> Result<LaunchSequencer, LaunchError> {
        let router = Router::new(self.config.default_destination.clone());
        Ok(LaunchSequencer {
            config: self.config,
            router,
            request: self.request,
            state: SequencerState::default(),
            outcome: None,
            permissions: self
                .permissions
                .ok_or(LaunchError::MissingCollaborator("permissions"))?,
            store: self
                .store
                .ok_or(LaunchError::MissingCollaborator("config_store"))?,
            initializer: self
                .initializer
                .ok_or(LaunchError::MissingCollaborator("initializer"))?,
            location: self
                .location
                .ok_or(LaunchError::MissingCollaborator("location"))?,
            launcher: self
                .launcher
                .ok_or(LaunchError::MissingCollaborator("launcher"))?,
            scheduler: self
                .scheduler
                .ok_or(LaunchError::MissingCollaborator("scheduler"))?,
            alert: self
                .alert
                .ok_or(LaunchError::MissingCollaborator("fatal_alert"))?,
            display: self.display,
        })
    }
}

impl LaunchSequencer {
    pub fn builder(request: LaunchRequest) -> LaunchSequencerBuilder {
        LaunchSequencerBuilder::new(request)
    }

    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// The routing decision, once one has been made.
    pub fn outcome(&self) -> Option<&NavigationOutcome> {
        self.outcome.as_ref()
    }

    pub fn on_create(&mut self) -> Phase {
        if self.state.is_created() || self.state.phase() == Phase::Destroyed {
            warn!("launch screen created twice; ignoring");
            return self.phase();
        }
        self.state.mark_created();
        self.cancel_pending_timer();
        self.store.update_counters();

        let car_display = self
            .display
            .as_ref()
            .map(|display| display.is_car_display_used())
            .unwrap_or(false);
        if car_display {
            let placeholder = self.config.placeholder_destination.clone();
            info!(destination = %placeholder, "car display in use; bypassing bootstrap");
            self.launcher.launch(&placeholder, &LaunchRequest::new());
            self.finish(None);
            self.state.transition(Phase::Navigated);
        }
        self.phase()
    }

    /// The screen became visible (resumed).
    pub fn on_visible(&mut self) -> Phase {
        self.state.set_visible(true);
        if self.state.is_canceled() {
            debug!("launch canceled; visibility ignored");
            return self.phase();
        }
        match self.phase() {
            Phase::Idle => self.enter_visible(),
            phase => debug!(?phase, "already progressing; visibility ignored"),
        }
        self.phase()
    }

    /// The screen was paused. Only a pending delayed initialization is
    /// withdrawn; dispatched requests keep running.
    pub fn on_invisible(&mut self) -> Phase {
        self.state.set_visible(false);
        if self.cancel_pending_timer() {
            self.state.transition(Phase::Idle);
        }
        self.phase()
    }

    /// The permission dialog closed. The outcome does not matter: the request
    /// is only ever made once.
    #[instrument(skip(self))]
    pub fn on_permission_result(&mut self, granted: &BTreeSet<PermissionKind>) -> Phase {
        if self.phase() != Phase::AwaitingPermission {
            warn!(phase = ?self.phase(), "unexpected permission result; ignoring");
            return self.phase();
        }
        self.store.set_location_requested();
        self.state.transition(Phase::Idle);
        if self.state.is_canceled() {
            return self.phase();
        }
        if self.state.is_visible() {
            self.enter_visible();
        }
        self.phase()
    }

    #[instrument(skip(self))]
    pub fn on_timer_elapsed(&mut self, handle: TaskHandle) -> Phase {
        match self.phase() {
            Phase::InitScheduled(pending) if pending == handle => {
                self.state.transition(Phase::Idle);
                self.initialize();
            }
            phase => warn!(?phase, "stale initialization timer; ignoring"),
        }
        self.phase()
    }

    /// Completion callback of an initializer that returned
    /// [`InitOutcome::Pending`].
    #[instrument(skip(self))]
    pub fn on_init_complete(&mut self, token: CompletionToken) -> Phase {
        if self.state.is_canceled() {
            debug!("launch canceled; completion ignored");
            return self.phase();
        }
        match self.phase() {
            Phase::AwaitingCompletion(expected) if expected == token => {
                let outcome = self.router.route(&self.request);
                self.navigate(outcome);
            }
            phase => warn!(?phase, "unexpected initialization completion; ignoring"),
        }
        self.phase()
    }

    /// The screen opened for an API caller returned. Its result is passed
    /// through untouched.
    pub fn on_destination_result(&mut self, result: ScreenResult) -> Phase {
        if self.phase() != Phase::AwaitingResult {
            warn!(phase = ?self.phase(), "unexpected destination result; ignoring");
            return self.phase();
        }
        info!(code = result.code, "relaying destination result to caller");
        self.finish(Some(&result));
        self.state.transition(Phase::Navigated);
        self.phase()
    }

    /// The user closed the fatal error dialog.
    pub fn on_fatal_dismissed(&mut self) -> Phase {
        if self.phase() == Phase::Fatal && !self.state.is_finished() {
            self.finish(None);
        }
        self.phase()
    }

    pub fn on_destroy(&mut self) -> Phase {
        self.cancel_pending_timer();
        self.state.set_visible(false);
        self.state.transition(Phase::Destroyed);
        self.phase()
    }

    fn enter_visible(&mut self) {
        if !self.state.is_permission_requested()
            && !self.store.is_location_requested()
            && !self.permissions.check_granted(PermissionKind::CoarseLocation)
        {
            info!("requesting location permissions");
            self.state.mark_permission_requested();
            let kinds = BTreeSet::from([PermissionKind::CoarseLocation, PermissionKind::FineLocation]);
            self.permissions.request(&kinds);
            self.state.transition(Phase::AwaitingPermission);
            return;
        }

        let delay = self.config.init_delay;
        let handle = self.scheduler.schedule(delay);
        debug!(?handle, ?delay, "initialization scheduled");
        self.state.transition(Phase::InitScheduled(handle));
    }

    fn initialize(&mut self) {
        match self.begin_initialization() {
            Ok(Continuation::Immediate(outcome)) => self.navigate(outcome),
            Ok(Continuation::Deferred(token)) => {
                debug!(?token, "waiting for initialization to complete");
                self.state.transition(Phase::AwaitingCompletion(token));
            }
            Err(err) => self.fail(err),
        }
    }

    /// Runs the initializer and the first-run bootstrap.
    fn begin_initialization(&mut self) -> Result<Continuation, InitError> {
        let outcome = self.initializer.init()?;
        self.bootstrap_first_run();
        Ok(match outcome {
            InitOutcome::Ready => Continuation::Immediate(self.router.route(&self.request)),
            InitOutcome::Pending(token) => Continuation::Deferred(token),
        })
    }

    fn bootstrap_first_run(&self) {
        if !self.store.is_first_launch() || !location_granted(self.permissions.as_ref()) {
            return;
        }
        info!("first run with location access; starting location updates");
        self.location.on_entered_first_run();
        if !self.location.is_active() {
            self.location.start();
        }
    }

    fn navigate(&mut self, outcome: NavigationOutcome) {
        if self.outcome.is_some() {
            warn!("navigation already performed; ignoring");
            return;
        }
        if outcome.expects_result {
            // The first start dialog marker is left untouched for API callers.
            info!(destination = %outcome.destination, "launching for result");
            self.launcher
                .launch_for_result(&outcome.destination, &outcome.payload);
            self.state.transition(Phase::AwaitingResult);
        } else {
            info!(destination = %outcome.destination, "launching");
            self.store.set_first_start_dialog_seen();
            self.launcher.launch(&outcome.destination, &outcome.payload);
            self.finish(None);
            self.state.transition(Phase::Navigated);
        }
        self.outcome = Some(outcome);
    }

    fn fail(&mut self, err: InitError) {
        error!(%err, "initialization failed");
        self.state.cancel();
        self.alert.show(&FatalNotice::storage());
    }

    fn finish(&mut self, result: Option<&ScreenResult>) {
        self.launcher.finish(result);
        self.state.mark_finished();
    }

    fn cancel_pending_timer(&mut self) -> bool {
        match self.state.pending_task() {
            Some(handle) => {
                debug!(?handle, "canceling pending initialization");
                self.scheduler.cancel(handle);
                true
            }
            None => false,
        }
    }
}
