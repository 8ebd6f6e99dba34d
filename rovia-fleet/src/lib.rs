pub mod bookings;
pub mod registry;

pub use bookings::{BookingLedger, LedgerError};
pub use registry::{FleetError, FleetRegistry};
