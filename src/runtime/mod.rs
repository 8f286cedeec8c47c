//! Reactive component runtime.
//!
//! A small runtime for the embedded side of the bridge, built on
//! spark-signals:
//!
//! ```text
//! update(props) → pending + scheduler dirty queue
//! flush()       → pending applied to context
//!               → generation signal bumped once   (one coalesced re-render)
//!               → render effect replaces target children
//!               → update observers notified
//! ```
//!
//! Property updates are never applied synchronously; several updates before
//! a [`flush`] produce a single render.
//!
//! # Example
//!
//! ```ignore
//! use spark_elements::runtime::{flush, Template};
//! use spark_elements::dom::Node;
//!
//! let counter = Template::new(|scope| vec![Node::text(scope.prop("count").to_string())])
//!     .prop("count", 0);
//!
//! spark_elements::register("x-counter", counter.factory(), ["count"])?;
//! ```

mod component;
mod scheduler;
mod template;

pub use component::{ComponentFlags, ReactiveComponent};
pub use scheduler::{flush, has_pending, reset_scheduler};
pub use template::{RenderFn, RenderScope, Template};
