pub mod app;
pub mod backend;
pub mod config;
pub mod conversation;
pub mod handler;
pub mod health;
pub mod index;
pub mod input;
pub mod layout;
pub mod logging;
pub mod markdown;
pub mod panel;
pub mod tui;
pub mod ui;
pub mod upload;
