//! Cafe Booking - Table reservations for a multi-cafe restaurant chain
//!
//! This crate implements admission control for table bookings: capacity and
//! double-booking checks, the time-slot scheduler, and the authorization
//! rules that decide who may see and change cafe resources.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
