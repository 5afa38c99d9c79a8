pub mod command_runner;
pub mod config;
pub mod descriptor;
pub mod doctor;
pub mod order;
pub mod preserve;
pub mod registry;
pub mod session;
pub mod state;
pub mod step;
pub mod theme;
pub mod time;
