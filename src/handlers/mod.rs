pub mod pages;
pub mod photos;
pub mod uploads;
