pub mod parameters;
pub mod scenario;
