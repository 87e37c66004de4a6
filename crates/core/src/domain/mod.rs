pub mod contract;
pub mod record;
