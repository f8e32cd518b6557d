//! Pure attendance calculations. Nothing in here touches storage or the clock.

pub mod aggregator;
pub mod attribution;
pub mod recalculation;
pub mod summary;
pub mod validator;
