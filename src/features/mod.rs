pub mod content;
pub mod gallery;
pub mod uploads;
