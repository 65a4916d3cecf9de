pub mod attendance;
pub mod audit;
pub mod family;
pub mod person;
pub mod service;
pub mod setting;
pub mod user;
