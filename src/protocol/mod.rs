//! CAN-simple protocol: command table, payload layouts, axis model, periodic
//! telemetry, node dispatcher, and CAN transport.
pub mod axis;
pub mod commands;
pub mod messages;
pub mod node;
pub mod periodic;
pub mod transport;
