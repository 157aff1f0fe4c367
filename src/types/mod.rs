pub mod date_window;
pub mod location;
pub mod observation;
pub mod station;
