//! Business logic services for the site.
//!
//! # Services
//!
//! - `tokens` - Anti-forgery tokens bound to an action name
//! - `signup` - Email registration and profile update
//! - `pages` - Managed-page reconciliation (collect, diff, apply)
//! - `content_options` - Editable copy with defaults

pub mod content_options;
pub mod pages;
pub mod signup;
pub mod tokens;

pub use content_options::ContentOptions;
pub use pages::{PageDefinition, PageReconciler, ReconcileError, ReconcilePlan, ReconcileReport};
pub use signup::{SignupService, SignupSettings};
pub use tokens::{TokenError, TokenIssuer};
