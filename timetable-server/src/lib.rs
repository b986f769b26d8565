//! Bus timetable server.
//!
//! Answers "when does a bus leave station A for station B on a given date,
//! and when does it arrive?" from stored departures plus road travel
//! estimates.

pub mod cache;
pub mod config;
pub mod domain;
pub mod matrix;
pub mod store;
pub mod timetable;
pub mod web;
