pub mod audit;
pub mod booking;
pub mod claim;
pub mod events;
pub mod expiry;
pub mod invitation;
pub mod pii;
pub mod request;
pub mod vehicle;

pub use audit::CommissionAuditEntry;
pub use booking::{Booking, BookingStatus, HostReview, ReassignmentToken, ReviewOutcome};
pub use claim::{ClaimStatus, RequestClaim};
pub use expiry::{flip_if_expired, LazyExpire};
pub use invitation::{
    InvitationStatus, ManagementInvitation, ManagerPermissions, NegotiationEntry, Party,
    PartyRole, RevenueSplit,
};
pub use pii::Masked;
pub use request::{
    DateRange, RequestPricing, RequestPriority, RequestStatus, ReservationRequest, VehicleRequirements,
};
pub use vehicle::{DepositMode, Vehicle};
