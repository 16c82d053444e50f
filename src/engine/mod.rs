pub mod assignment;
pub mod delivery;
pub mod selector;
pub mod sweep;
