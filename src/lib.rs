pub mod cli;
pub mod clock;
pub mod config;
pub mod logging;
pub mod models;
pub mod storage;
pub mod store;
pub mod tui;
pub mod utils;
pub mod validate;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use models::{Priority, Task, TaskDraft, ThemeMode};
pub use storage::{MemoryStorage, SqliteStorage, StorageAdapter, StorageError};
pub use store::{StoreError, StoreOptions, TaskStore};
pub use utils::Profile;
pub use validate::{Field, ValidationErrors, validate};
pub use view::{FilterSpec, PriorityFilter, StatusFilter, select_visible};
