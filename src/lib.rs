//! Linkleaf - A personalized link-in-bio page service
//!
//! This library provides the core functionality for the Linkleaf service:
//! public pages assembled from ordered content blocks, an optimistic editor
//! with dirty tracking and reconciling saves, and visit/click analytics.
//!
//! # Architecture
//! - `editor`: Client-side editing session (block ordering, dirty tracking,
//!   save coordination)
//! - `storage`: sea-orm persistence for pages, blocks and visits
//! - `services`: Business logic (page lifecycle, visit recording, analytics)
//! - `api`: HTTP services and middleware
//! - `config`: Configuration management

pub mod api;
pub mod config;
pub mod editor;
pub mod errors;
pub mod services;
pub mod storage;
pub mod utils;
