pub mod agent;
pub mod client;
pub mod config;
pub mod economics;
pub mod lab;
pub mod logging;
pub mod render;
pub mod schema;
pub mod server;
pub mod shell;
pub mod sim;
