// Storage models: the JSON shapes written to the local state collections
pub mod appointment;
pub mod reading;

pub use appointment::StoredAppointment;
pub use reading::StoredReading;
