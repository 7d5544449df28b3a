//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Parsed Request (method, target)
//!     → router.rs (ordered scan of the route table)
//!     → matcher.rs (exact or prefix comparison against the target)
//!     → handler.rs (invoke the matched handler)
//!     → Return: Response, or 404 when nothing matched
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime (shared via `Arc`)
//! - First match wins in registration order, regardless of specificity
//! - No regex; a closed set of match kinds

pub mod handler;
pub mod matcher;
pub mod router;

pub use handler::{Handler, HandlerContext};
pub use matcher::Match;
pub use router::{Route, Router};
