mod app;
mod config;
mod controller;
mod error;
mod events;
mod gateway;
mod key_event;
mod mode_state;
mod notify;
mod transfer;
mod ui;
mod utils;

// Re-export commonly used types
pub use app::{App, AppMode};
pub use config::{AppSettings, ConfigManager, Profile};
pub use controller::{NavigationState, Session, SessionController};
pub use error::{AppError, Result};
pub use events::{AppEvent, ControlEvent, OpKind};
pub use gateway::{Credentials, DirEntry, EntryKind, GatewayClient, Listing, TransferBackend};
pub use mode_state::{DeleteConfirmation, PendingModal, UploadPrompt};
pub use notify::{Notification, Notifications, Severity};
pub use transfer::default_download_dir;
pub use utils::{init_panic_hook, init_tracing, restore_tui};
