//! Pitchcraft - Sales Roleplay Coaching Core
//!
//! This crate drives a sales-training roleplay through the intent, logical,
//! emotional and pitch stages, calling out to an LLM for each reply.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
