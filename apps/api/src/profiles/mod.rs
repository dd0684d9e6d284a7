// Profile Store: identity-keyed student profiles with unique roll numbers.

pub mod handlers;
pub mod service;
pub mod validation;
