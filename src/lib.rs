//! `kickoff` - football match clock and tactical decision simulator
//!
//! A match runs on a simulated clock (first half, halftime, second half).
//! While the ball is in play the engine occasionally raises a decision
//! event; the coach's answer, or the lack of one, moves the momentum and
//! statistic counters that presentation layers read.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod observability;
pub mod tactics;
