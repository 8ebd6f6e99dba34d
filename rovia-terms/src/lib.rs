pub mod actor;
pub mod commission;
pub mod deposit;
pub mod eligibility;
pub mod negotiation;

pub use actor::{ActorIdentity, ActorRole};
pub use commission::{
    initial_rate_for_fleet, resolve, CommissionLedger, CommissionTerms, CommissionTier,
    MonetizationPath, TermsError,
};
pub use deposit::{normalize, DepositSchedule};
pub use eligibility::{EligibilityOutcome, EligibilityPolicy, HostActivity, QualifyingPath};
pub use negotiation::{NegotiationEngine, NegotiationError, NewInvitation, MAX_NEGOTIATION_ROUNDS};
