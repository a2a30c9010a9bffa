// Domain layer - Readings, status bands and history
pub mod history;
pub mod reading;
pub mod status;
