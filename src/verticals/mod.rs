//! Per-vertical record adapters over [`ListingCore`](crate::record::ListingCore).

pub mod doctor;
pub mod emergency;
pub mod hospital;
pub mod lab;
pub mod salon;

pub use doctor::Doctor;
pub use emergency::EmergencyProvider;
pub use hospital::Hospital;
pub use lab::Lab;
pub use salon::Salon;
