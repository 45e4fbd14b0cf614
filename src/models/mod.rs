//! Data models for equipment checkout

pub mod equipment;
pub mod permission;
pub mod reservation;
pub mod user;

// Re-export commonly used types
pub use equipment::{Equipment, EquipmentStatus};
pub use permission::Permission;
pub use reservation::{CreateReservation, Reservation};
pub use user::{Subject, User};
