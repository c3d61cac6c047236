//! Marquee Client - controllers that drive the rendered site.
//!
//! This crate holds the two client-side subsystems of the site:
//!
//! - [`navigation`] - intercepts same-origin link clicks, fetches replacement
//!   content fragments, swaps them into the content region, keeps browser
//!   history and a URL-keyed fragment cache, and fires the page-ready event.
//! - [`signup`] - the two-step registration flow: email capture, then a
//!   profile modal, both submitted to the site's action endpoint.
//!
//! # Seams
//!
//! The controllers never touch a browser or a socket directly:
//!
//! - [`Viewport`] is the page surface (content region, title, history,
//!   scroll, loading indicator, native navigation). [`HeadlessViewport`] is an
//!   in-memory implementation built from an HTML document.
//! - [`Transport`] performs GET and form POST requests. [`HttpTransport`] is
//!   the `reqwest` implementation.
//!
//! # Concurrency
//!
//! Everything runs on one task. The only suspension points are the content
//! fetch and the two signup requests; controller methods take `&mut self`, so
//! a navigation that completes last simply wins.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod markup;
pub mod navigation;
pub mod signup;
pub mod transport;

pub use error::{ClientConfigError, NavigationError, SignupError, TransportError};
pub use navigation::{
    Click, ClickOutcome, HeadlessViewport, HistoryEntry, HistoryMode, Link, LoadOutcome,
    Modifiers, NavigationController, PageReady, PopOutcome, StartOutcome, Viewport,
};
pub use signup::{SignupController, SignupForm, ProfileModal};
pub use transport::{FetchedPage, HttpTransport, Transport};
