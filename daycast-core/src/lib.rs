//! Daycast Core — leakage-free next-day direction classification.
//!
//! This crate holds everything that does not touch the outside world beyond
//! fetching bars:
//! - Domain types (bars, directions, validation outcomes)
//! - Data providers with a bounded retry policy
//! - Lagged indicators and the feature table they produce
//! - A seeded CART decision tree and random forest
//! - Hierarchical RNG and dataset fingerprinting

pub mod data;
pub mod domain;
pub mod features;
pub mod fingerprint;
pub mod indicators;
pub mod ml;
pub mod rng;
