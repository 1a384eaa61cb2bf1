//! FIELDCALL terminal client library exports.

pub mod api_client;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod keys;
pub mod nav;
pub mod notifications;
pub mod persistence;
pub mod session;
pub mod state;
pub mod tasks;
pub mod telemetry;
pub mod theme;
pub mod views;
pub mod widgets;
pub mod wire;
