pub mod booking;
pub mod capacity;
pub mod lifecycle;
pub mod pricing;
