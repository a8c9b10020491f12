//! Data transfer objects exchanged with the browser side and the host API.
//!
//! - `context`: RepoContext, the repository currently being browsed
//! - `tree`: TreeNode, TreeItem, Submodule and host API response bodies
//! - `page`: PageSnapshot and BranchSignals observed by the content script
//! - `layout`: LayoutInput and LayoutPatch for making room for the sidebar
//! - `event`: SidebarEvent and NavigationSignal pushed to subscribers

pub mod context;
pub mod event;
pub mod layout;
pub mod page;
pub mod tree;

pub use context::*;
pub use event::*;
pub use layout::*;
pub use page::*;
pub use tree::*;
