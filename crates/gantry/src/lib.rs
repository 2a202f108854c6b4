pub mod agent;
pub mod capability;
pub mod errors;
pub mod models;
pub mod observer;
pub mod providers;
pub mod registry;
pub mod tools;
