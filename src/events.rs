use std::path::PathBuf;

use crossterm::event::Event;

use crate::error::AppError;
use crate::gateway::Listing;

/// Events consumed by the main application loop.
#[derive(Debug)]
pub enum AppEvent {
    Input(Event),
    Tick,
    /// Outcome of a gateway round-trip, reported by a spawned task.
    Control(ControlEvent),
}

/// Mutating operations that share the dispatch-then-refresh contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    ChangeDir,
    Delete,
    Rename,
    CreateDir,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::ChangeDir => "change-directory",
            OpKind::Delete => "delete",
            OpKind::Rename => "rename",
            OpKind::CreateDir => "create-directory",
        }
    }
}

/// Results flowing back from spawned gateway tasks into the controller's
/// reducer. Tasks never touch controller state directly.
#[derive(Debug)]
pub enum ControlEvent {
    ConnectFinished(Result<String, AppError>),
    ListingFinished {
        seq: u64,
        result: Result<Listing, AppError>,
    },
    OperationFinished {
        op: OpKind,
        result: Result<String, AppError>,
    },
    UploadFinished(Result<String, AppError>),
    DownloadFinished {
        filename: String,
        result: Result<PathBuf, AppError>,
    },
}
