pub mod assignment;
pub mod board;
pub mod reassignment;

pub use assignment::AssignmentResolver;
pub use board::{MatchError, NewRequest, RequestBoard};
pub use reassignment::{ReassignmentCoordinator, TOKEN_VALIDITY_HOURS};
