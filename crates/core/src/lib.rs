//! Marquee Core - Shared types library.
//!
//! This crate provides the types shared by every Marquee component:
//! - `site` - Server-rendered marketing site and its AJAX action endpoint
//! - `client` - Navigation and signup controllers that drive the rendered pages
//! - `cli` - Command-line tools for migrations and page reconciliation
//!
//! # Architecture
//!
//! The core crate contains only types and wire contracts - no I/O, no database
//! access, no HTTP clients. The server and the client agree on everything in
//! here, so a change to a field name or marker attribute is a change to both.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for emails, entity IDs, and page statuses
//! - [`ajax`] - Form fields and JSON envelope of the action endpoint
//! - [`markers`] - Data attributes and element IDs the signup controller reads
//! - [`nav`] - Navigation configuration and the page-ready event name

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod ajax;
pub mod markers;
pub mod nav;
pub mod types;

pub use ajax::{AjaxData, AjaxResponse};
pub use nav::{NavConfig, PAGE_READY_EVENT};
pub use types::*;
