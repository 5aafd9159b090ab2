//! Transient dialog state for the browser view.

/// Dialog state for the rename and create-directory flows.
///
/// At most one modal is open at a time; open transitions are accepted from
/// `Closed` only, which the key handler enforces before calling `open_*`.
/// Confirm closes the modal only once the operation succeeds, so a failed
/// request leaves the dialog open for another attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingModal {
    Closed,
    RenameOpen { old_name: String, new_name: String },
    CreateDirOpen { name: String },
}

impl PendingModal {
    pub fn is_closed(&self) -> bool {
        matches!(self, PendingModal::Closed)
    }

    /// Open the rename dialog, pre-seeding the new name with the old one.
    pub fn open_rename(&mut self, old_name: String) {
        let new_name = old_name.clone();
        *self = PendingModal::RenameOpen { old_name, new_name };
    }

    pub fn open_create_dir(&mut self) {
        *self = PendingModal::CreateDirOpen {
            name: String::new(),
        };
    }

    pub fn close(&mut self) {
        *self = PendingModal::Closed;
    }

    /// Append a character to the modal's editable field.
    pub fn push_input(&mut self, c: char) {
        match self {
            PendingModal::RenameOpen { new_name, .. } => new_name.push(c),
            PendingModal::CreateDirOpen { name } => name.push(c),
            PendingModal::Closed => {}
        }
    }

    /// Remove the last character from the modal's editable field.
    pub fn pop_input(&mut self) {
        match self {
            PendingModal::RenameOpen { new_name, .. } => {
                new_name.pop();
            }
            PendingModal::CreateDirOpen { name } => {
                name.pop();
            }
            PendingModal::Closed => {}
        }
    }
}

impl Default for PendingModal {
    fn default() -> Self {
        PendingModal::Closed
    }
}

/// State for the delete confirmation popup.
///
/// Delete is the only operation gated behind an explicit confirmation step;
/// the request is issued strictly after the popup is answered.
#[derive(Clone, Debug, Default)]
pub struct DeleteConfirmation {
    pub showing: bool,
    pub file_name: String,
}

impl DeleteConfirmation {
    pub fn show(&mut self, file_name: String) {
        self.showing = true;
        self.file_name = file_name;
    }

    pub fn hide(&mut self) {
        self.showing = false;
        self.file_name.clear();
    }
}

/// Input prompt for picking local files to upload.
///
/// Accepts several whitespace-separated paths, though only the first one is
/// transmitted per invocation.
#[derive(Clone, Debug, Default)]
pub struct UploadPrompt {
    pub showing: bool,
    pub input: String,
}

impl UploadPrompt {
    pub fn show(&mut self) {
        self.showing = true;
        self.input.clear();
    }

    pub fn hide(&mut self) {
        self.showing = false;
        self.input.clear();
    }

    /// Parse the entered paths in input order.
    pub fn paths(&self) -> Vec<std::path::PathBuf> {
        self.input
            .split_whitespace()
            .map(std::path::PathBuf::from)
            .collect()
    }
}
