//! Headless tree state engine for tree and tree-select widgets.
//!
//! The crate keeps a flat, key-indexed copy of a nested tree and maintains
//! expansion, selection and tri-state checkbox state on top of it, with
//! parent/child propagation, label search and a cached list of visible rows
//! for virtual scrolling. Rendering is left to the host.
//!
//! Feature flags:
//! - `serde`: serde support for [`TreeNode`], [`TreeConfig`] and
//!   [`TreeStateSnapshot`], plus JSON ingestion with custom field names.

mod action;
mod config;
mod error;
mod event;
mod index;
mod model;
pub mod prelude;
mod search;
mod selection;
mod state;
mod window;

pub use action::{ActionOutcome, TreeAction};
pub use config::TreeConfig;
pub use error::{TreeError, TreeResult};
pub use event::{EventLog, NoListener, TreeEvent, TreeListener};
pub use index::{FlatNode, NodeEntry, NodeId, TreeIndex};
pub use model::{FieldNames, NodeFlags, TreeNode};
pub use search::{SearchIndex, SearchMatch};
pub use selection::{SelectChange, SelectionState};
pub use state::{NodeView, TreeState, TreeStateSnapshot};
pub use window::VirtualWindow;
