mod coordinator;
mod manager;

pub use coordinator::{
    Admission, LeaderTicket, RefreshCoordinator, RefreshResolution, RefreshRole, WaiterId,
};
pub use manager::{Renewal, SessionManager};
