//! `axis-can` library: the CAN-simple command and telemetry layer of a
//! multi-axis motor controller, for `no_std` targets. The crate exposes the
//! signal codec (`infra`), the protocol logic (command table, dispatcher,
//! periodic telemetry, transport), and the shared error types.
#![cfg_attr(not(test), no_std)]
//==================================================================================
/// Signal descriptors and values shared by the codec and the payload layouts.
pub mod core;
/// Layout validation, bit-level, codec and transmission errors.
pub mod error;
/// Bit-level signal codec working on 8-byte payloads.
pub mod infra;
/// CAN-simple protocol implementation: arbitration ids, command table,
/// axis dispatch, and periodic telemetry.
pub mod protocol;
//==================================================================================
