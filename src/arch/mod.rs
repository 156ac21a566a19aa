//! # Architecture Abstraction Layer
//!
//! Hardware glue between a target's periodic timer and the scheduler's
//! tick source. The scheduler itself is target-independent; a port only has
//! to call `on_tick()` once per tick period.

pub mod cortex_m4;
