// Job/Application Matcher: eligibility filtering and application tracking.

pub mod handlers;
pub mod matcher;
pub mod service;
