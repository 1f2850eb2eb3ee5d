//! Engine for batch, regex-driven renaming of a set of files and folders: a
//! cancellable preview pass computes candidate names for every item, then a
//! single commit pass applies the selected candidates to disk.

pub mod commit;
pub mod config;
pub mod disambiguate;
pub mod error;
pub mod events;
pub mod flags;
pub mod item;
pub mod item_factory;
pub mod manager;
pub mod preview;
pub mod regex_adapter;
pub mod store;

pub use commit::{CommitOptions, CommitSummary, FsRenamePrimitive, OwnerWindowHandle, RenameRequest, StdFsRenamePrimitive};
pub use config::Config;
pub use error::{ManagerError, Result};
pub use events::{Cookie, EventMulticaster, Observer};
pub use flags::{RenameFlags, SourceScope};
pub use item::{Item, ItemId};
pub use item_factory::{enumerate_directory, ItemFactory, SequentialItemFactory};
pub use manager::Manager;
pub use regex_adapter::{RegexAdapter, RegexAdapterObserver, StdRegexAdapter};
pub use store::ItemStore;
