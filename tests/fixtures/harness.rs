//! A fully wired engine over in-memory stores and a manual clock.

use std::sync::Arc;
use std::time::Duration;

use backhaul_alerts::clock::ManualClock;
use backhaul_alerts::config::EngineConfig;
use backhaul_alerts::dispatcher::AlertDispatcher;
use backhaul_alerts::engine::{BackhaulEngine, Collaborators};
use backhaul_alerts::model::{Channel, DriverContactProfile, DriverTrajectory, LoadCandidate};
use backhaul_alerts::source::LoadBoard;
use backhaul_alerts::store::{InMemoryAlertRepository, InMemoryContactDirectory, InMemoryTrajectoryStore};
use backhaul_alerts::traits::{LoadSource, TrajectoryStore};

use super::builders::t0;
use super::senders::RecordingSender;

pub const CHANNEL_TIMEOUT: Duration = Duration::from_millis(200);

pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub trajectories: Arc<InMemoryTrajectoryStore>,
    pub contacts: Arc<InMemoryContactDirectory>,
    pub push: Arc<RecordingSender>,
    pub sms: Arc<RecordingSender>,
    pub call: Arc<RecordingSender>,
    pub engine: Arc<BackhaulEngine>,
}

impl Harness {
    /// Load board around the given loads, recording senders on push, SMS
    /// and call.
    pub fn new(loads: Vec<LoadCandidate>) -> Self {
        let board = Arc::new(LoadBoard::with_loads(150.0, loads));
        Self::with_source(board)
    }

    pub fn with_source(loads: Arc<dyn LoadSource>) -> Self {
        let push = Arc::new(RecordingSender::new());
        let sms = Arc::new(RecordingSender::new());
        let call = Arc::new(RecordingSender::new());
        let dispatcher = AlertDispatcher::new(CHANNEL_TIMEOUT)
            .with_sender(Channel::Push, push.clone())
            .with_sender(Channel::Sms, sms.clone())
            .with_sender(Channel::Call, call.clone());
        Self::build(loads, dispatcher, push, sms, call)
    }

    pub fn with_dispatcher(loads: Vec<LoadCandidate>, dispatcher: AlertDispatcher) -> Self {
        let board = Arc::new(LoadBoard::with_loads(150.0, loads));
        Self::build(
            board,
            dispatcher,
            Arc::new(RecordingSender::new()),
            Arc::new(RecordingSender::new()),
            Arc::new(RecordingSender::new()),
        )
    }

    fn build(
        loads: Arc<dyn LoadSource>,
        dispatcher: AlertDispatcher,
        push: Arc<RecordingSender>,
        sms: Arc<RecordingSender>,
        call: Arc<RecordingSender>,
    ) -> Self {
        let clock = Arc::new(ManualClock::new(t0()));
        let trajectories = Arc::new(InMemoryTrajectoryStore::new());
        let contacts = Arc::new(InMemoryContactDirectory::new());
        let collaborators = Collaborators {
            trajectories: trajectories.clone(),
            contacts: contacts.clone(),
            loads,
            alerts: Arc::new(InMemoryAlertRepository::new()),
            clock: clock.clone(),
        };
        let engine = BackhaulEngine::new(EngineConfig::default(), collaborators, dispatcher)
            .expect("default config is valid");

        Self {
            clock,
            trajectories,
            contacts,
            push,
            sms,
            call,
            engine: Arc::new(engine),
        }
    }

    pub fn driver(&self, trajectory: DriverTrajectory, contact: Option<DriverContactProfile>) {
        if let Some(contact) = contact {
            self.contacts.insert(contact);
        }
        self.trajectories
            .insert(trajectory)
            .expect("fixture trajectory is valid");
    }
}
