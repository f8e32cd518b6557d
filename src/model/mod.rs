pub mod attendance;
pub mod employee;
pub mod leave_request;
pub mod punch_event;
pub mod report;
pub mod shift;
pub mod statistics;
