pub mod audit;
pub mod backup;
pub mod checkin;
pub mod fonts;
pub mod labels;
pub mod log;
pub mod people;
pub mod permissions;
pub mod reports;
pub mod service;
pub mod service_admin;
pub mod settings_store;
pub mod theme;
pub mod users;
