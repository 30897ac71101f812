pub mod sweep;
pub mod uploads;
