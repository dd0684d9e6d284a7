pub mod institution;
pub mod job;
pub mod profile;
