//! # Overview
//!
//! This crate implements the [Zhang-Shasha algorithm][zhang-shasha] for the edit distance between
//! ordered labeled trees, according to a user-defined measure for the cost of relabeling,
//! deleting and inserting nodes. Besides the distance, it recovers a co-optimal alignment between
//! the nodes of both trees and converts it into an [EditScript] that can be applied to turn one
//! tree into the other.
//!
//! [zhang-shasha]: https://doi.org/10.1137/0218082
//!
//! # Example
//!
//! ```rust
//! use tree_alignment::*;
//! use serde_json::Value;
//!
//! fn tree(value: &Value) -> Tree<String> {
//!     match value {
//!         Value::Array(a) => Tree::node("[]".into(), a.iter().map(tree)),
//!         Value::Object(m) => Tree::node(
//!             "{}".into(),
//!             m.iter().map(|(k, v)| Tree::node(k.clone(), [tree(v)])),
//!         ),
//!         v => Tree::leaf(v.to_string()),
//!     }
//! }
//!
//! let john = tree(&serde_json::json!({
//!     "name": "John Doe",
//!     "age": 43,
//!     "phones": [
//!         "+44 1234567",
//!         "+44 2345678"
//!     ]
//! }));
//!
//! let jane = tree(&serde_json::json!({
//!     "name": "Jane Doe",
//!     "maiden name": "Smith",
//!     "age": 40,
//!     "phones": [
//!         "+44 7654321",
//!     ]
//! }));
//!
//! // Relabel the name, the age and one phone number, insert the maiden name and remove a phone.
//! assert_eq!(distance(&john, &jane, &UnitCost)?, 6.);
//!
//! let alignment = backtrace(&john, &jane, &UnitCost)?;
//! let script = alignment.to_script(&john, &jane)?;
//!
//! assert_eq!(script.len(), 6);
//! assert_eq!(script.apply(&john)?, jane);
//! # Ok::<(), Error>(())
//! ```

mod alignment;
mod batch;
mod config;
mod cost;
mod diff;
mod edit;
mod error;
mod tree;

pub use alignment::*;
pub use batch::*;
pub use config::*;
pub use cost::*;
pub use diff::*;
pub use edit::*;
pub use error::*;
pub use tree::*;

pub mod sequence;

mod backtrace;
mod forest;

pub(crate) use backtrace::*;
pub(crate) use forest::*;
