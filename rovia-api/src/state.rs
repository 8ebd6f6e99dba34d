use rovia_fleet::{BookingLedger, FleetRegistry};
use rovia_match::{ReassignmentCoordinator, RequestBoard};
use rovia_terms::{CommissionLedger, DepositSchedule, NegotiationEngine};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::app_config::BusinessRules;
use crate::notify::{LogNotifier, Notifier};

/// Shared handles over the engine aggregates. Each engine serializes its own
/// mutations behind its lock; handlers that need several locks acquire them
/// in field order (board, fleet, bookings, reassignments, negotiations).
#[derive(Clone)]
pub struct AppState {
    pub board: Arc<RwLock<RequestBoard>>,
    pub fleet: Arc<RwLock<FleetRegistry>>,
    pub bookings: Arc<RwLock<BookingLedger>>,
    pub reassignments: Arc<RwLock<ReassignmentCoordinator>>,
    pub negotiations: Arc<RwLock<NegotiationEngine>>,
    pub commissions: Arc<RwLock<CommissionLedger>>,
    pub deposits: Arc<RwLock<DepositSchedule>>,
    pub notifier: Arc<dyn Notifier>,
    pub rules: BusinessRules,
}

impl AppState {
    pub fn new(rules: BusinessRules) -> Self {
        Self::with_notifier(rules, Arc::new(LogNotifier))
    }

    pub fn with_notifier(rules: BusinessRules, notifier: Arc<dyn Notifier>) -> Self {
        let deposits = DepositSchedule::new(rules.default_deposit_dollars);
        Self {
            board: Arc::new(RwLock::new(RequestBoard::new())),
            fleet: Arc::new(RwLock::new(FleetRegistry::new())),
            bookings: Arc::new(RwLock::new(BookingLedger::new())),
            reassignments: Arc::new(RwLock::new(ReassignmentCoordinator::new())),
            negotiations: Arc::new(RwLock::new(NegotiationEngine::new())),
            commissions: Arc::new(RwLock::new(CommissionLedger::new())),
            deposits: Arc::new(RwLock::new(deposits)),
            notifier,
            rules,
        }
    }
}
