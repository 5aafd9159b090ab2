//! Session, navigation, and operation controller.
//!
//! All client-side state for an active gateway session lives in
//! [`SessionController`]. Mutation happens only inside its transition
//! methods and the [`SessionController::apply`] reducer, driven from the
//! single application event loop. Gateway round-trips run on spawned tasks
//! that report back exclusively through [`ControlEvent`]s; no task touches
//! controller state directly.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::AppError;
use crate::events::{ControlEvent, OpKind};
use crate::gateway::{Credentials, DirEntry, TransferBackend};
use crate::mode_state::{DeleteConfirmation, PendingModal};
use crate::notify::{Notifications, Severity};
use crate::transfer;

/// An established gateway session.
#[derive(Clone, Debug)]
pub struct Session {
    pub id: String,
    pub host: String,
    pub port: u16,
    pub username: String,
}

/// Current path and directory listing state.
///
/// `entries` always reflects the most recently applied listing response and
/// is replaced wholesale, never patched. `listing_in_flight` is advisory: it
/// suppresses a duplicate manual refresh but does not serialize requests.
#[derive(Debug)]
pub struct NavigationState {
    pub current_path: String,
    pub entries: Vec<DirEntry>,
    pub listing_in_flight: bool,
    /// Monotone ticket fencing listing responses: only the newest issued
    /// request may update `entries`, stale responses are discarded.
    latest_seq: u64,
}

impl NavigationState {
    fn new() -> Self {
        Self {
            current_path: "/".to_string(),
            entries: Vec::new(),
            listing_in_flight: false,
            latest_seq: 0,
        }
    }

    fn reset(&mut self) {
        self.current_path = "/".to_string();
        self.entries.clear();
        self.listing_in_flight = false;
        // fence off responses still in flight for the old session
        self.latest_seq += 1;
    }
}

pub struct SessionController {
    backend: Arc<dyn TransferBackend>,
    events: mpsc::Sender<ControlEvent>,
    session: Option<Session>,
    pending_connect: Option<Credentials>,
    download_dir: PathBuf,
    pub nav: NavigationState,
    pub notifications: Notifications,
    pub modal: PendingModal,
    pub delete_confirmation: DeleteConfirmation,
}

impl SessionController {
    pub fn new(
        backend: Arc<dyn TransferBackend>,
        events: mpsc::Sender<ControlEvent>,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            backend,
            events,
            session: None,
            pending_connect: None,
            download_dir,
            nav: NavigationState::new(),
            notifications: Notifications::new(),
            modal: PendingModal::Closed,
            delete_confirmation: DeleteConfirmation::default(),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn connect_in_flight(&self) -> bool {
        self.pending_connect.is_some()
    }

    /// The "navigate up" affordance is offered only away from the root.
    pub fn can_navigate_up(&self) -> bool {
        self.nav.current_path != "/"
    }

    /// Expire the displayed notification if its window has elapsed.
    /// Returns true if the display changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.notifications.expire(now)
    }

    // ------------------------------------------------------------------
    // Connection manager
    // ------------------------------------------------------------------

    /// Establish a session. All four credential fields are required; on
    /// success the reducer stores the session and fetches the root listing.
    pub fn connect(&mut self, creds: Credentials, now: Instant) {
        if self.session.is_some() || self.pending_connect.is_some() {
            debug!("ignoring connect while a session or attempt is active");
            return;
        }
        if let Err(e) = validate_credentials(&creds) {
            self.notifications.show(e.to_string(), Severity::Error, now);
            return;
        }

        info!("connecting to {}:{} as {}", creds.host, creds.port, creds.username);
        self.pending_connect = Some(creds.clone());
        let backend = self.backend.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = backend.connect(&creds).await;
            let _ = events.send(ControlEvent::ConnectFinished(result)).await;
        });
    }

    /// Tear down the session. The remote notify is best-effort and its
    /// outcome is ignored; local state is always cleared, so disconnect
    /// cannot fail and is idempotent.
    pub fn disconnect(&mut self, now: Instant) {
        if let Some(session) = self.session.take() {
            info!("disconnecting session {}", session.id);
            let backend = self.backend.clone();
            tokio::spawn(async move {
                let _ = backend.disconnect(&session.id).await;
            });
        }
        self.pending_connect = None;
        self.nav.reset();
        self.modal.close();
        self.delete_confirmation.hide();
        self.notifications
            .show("Disconnected successfully!", Severity::Success, now);
    }

    // ------------------------------------------------------------------
    // Navigation controller
    // ------------------------------------------------------------------

    /// Fetch a listing. `None` lists the session's current directory; the
    /// gateway resolves the absolute path either way. Each request takes a
    /// fresh fencing ticket.
    pub fn request_listing(&mut self, path: Option<String>) {
        let Some(session) = &self.session else {
            return;
        };
        self.nav.latest_seq += 1;
        let seq = self.nav.latest_seq;
        self.nav.listing_in_flight = true;

        debug!("listing seq={} path={:?}", seq, path);
        let backend = self.backend.clone();
        let events = self.events.clone();
        let session_id = session.id.clone();
        tokio::spawn(async move {
            let result = backend.list(&session_id, path.as_deref()).await;
            let _ = events
                .send(ControlEvent::ListingFinished { seq, result })
                .await;
        });
    }

    /// Manual refresh; suppressed while a listing is already in flight.
    pub fn refresh(&mut self) {
        if self.nav.listing_in_flight {
            debug!("refresh suppressed, listing already in flight");
            return;
        }
        self.request_listing(None);
    }

    /// `target` is a child directory name or the literal `".."` token;
    /// the gateway performs the resolution.
    pub fn change_directory(&mut self, target: String) {
        let Some(session) = &self.session else {
            return;
        };
        let backend = self.backend.clone();
        let session_id = session.id.clone();
        self.spawn_operation(OpKind::ChangeDir, async move {
            backend.change_directory(&session_id, &target).await
        });
    }

    pub fn navigate_up(&mut self) {
        if self.can_navigate_up() {
            self.change_directory("..".to_string());
        }
    }

    // ------------------------------------------------------------------
    // Operation dispatcher
    // ------------------------------------------------------------------

    /// Ask for confirmation before deleting; the request is only issued
    /// from [`SessionController::confirm_delete`].
    pub fn request_delete(&mut self, file_name: String) {
        if !self.modal.is_closed() || self.delete_confirmation.showing {
            return;
        }
        self.delete_confirmation.show(file_name);
    }

    pub fn confirm_delete(&mut self) {
        if !self.delete_confirmation.showing {
            return;
        }
        let file_name = self.delete_confirmation.file_name.clone();
        self.delete_confirmation.hide();

        let Some(session) = &self.session else {
            return;
        };
        let backend = self.backend.clone();
        let session_id = session.id.clone();
        self.spawn_operation(OpKind::Delete, async move {
            backend.delete(&session_id, &file_name).await
        });
    }

    pub fn cancel_delete(&mut self) {
        self.delete_confirmation.hide();
    }

    pub fn open_rename(&mut self, old_name: String) {
        if !self.modal.is_closed() || self.delete_confirmation.showing {
            return;
        }
        self.modal.open_rename(old_name);
    }

    pub fn open_create_dir(&mut self) {
        if !self.modal.is_closed() || self.delete_confirmation.showing {
            return;
        }
        self.modal.open_create_dir();
    }

    /// Cancel closes the modal unconditionally, with no dispatch.
    pub fn cancel_modal(&mut self) {
        self.modal.close();
    }

    /// Dispatch the open modal's operation. The modal stays open until the
    /// success outcome arrives, so a failure leaves it open for a retry.
    pub fn confirm_modal(&mut self, now: Instant) {
        let Some(session) = &self.session else {
            return;
        };
        let session_id = session.id.clone();
        match &self.modal {
            PendingModal::RenameOpen { old_name, new_name } => {
                let new_name = new_name.trim().to_string();
                if new_name.is_empty() {
                    self.notifications
                        .show("New name cannot be empty", Severity::Error, now);
                    return;
                }
                let old_name = old_name.clone();
                let backend = self.backend.clone();
                self.spawn_operation(OpKind::Rename, async move {
                    backend.rename(&session_id, &old_name, &new_name).await
                });
            }
            PendingModal::CreateDirOpen { name } => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    self.notifications
                        .show("Directory name cannot be empty", Severity::Error, now);
                    return;
                }
                let backend = self.backend.clone();
                self.spawn_operation(OpKind::CreateDir, async move {
                    backend.create_directory(&session_id, &name).await
                });
            }
            PendingModal::Closed => {}
        }
    }

    fn spawn_operation<F>(&self, op: OpKind, fut: F)
    where
        F: Future<Output = Result<String, AppError>> + Send + 'static,
    {
        debug!("dispatching {}", op.as_str());
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = fut.await;
            let _ = events
                .send(ControlEvent::OperationFinished { op, result })
                .await;
        });
    }

    // ------------------------------------------------------------------
    // Transfer handler
    // ------------------------------------------------------------------

    /// Upload a single file. Extra selections beyond the first are ignored.
    pub fn upload(&mut self, paths: Vec<PathBuf>, now: Instant) {
        let Some(session) = &self.session else {
            return;
        };
        let Some(path) = paths.first().cloned() else {
            self.notifications
                .show("No file selected", Severity::Error, now);
            return;
        };
        if paths.len() > 1 {
            info!("ignoring {} additional upload selections", paths.len() - 1);
        }

        let backend = self.backend.clone();
        let events = self.events.clone();
        let session_id = session.id.clone();
        tokio::spawn(async move {
            let result = match transfer::read_upload(&path).await {
                Ok((filename, payload)) => backend.upload(&session_id, &filename, payload).await,
                Err(e) => Err(e),
            };
            let _ = events.send(ControlEvent::UploadFinished(result)).await;
        });
    }

    /// Download a named file into the download directory.
    pub fn download(&mut self, filename: String) {
        let Some(session) = &self.session else {
            return;
        };
        let backend = self.backend.clone();
        let events = self.events.clone();
        let session_id = session.id.clone();
        let download_dir = self.download_dir.clone();
        tokio::spawn(async move {
            let result = match backend.download(&session_id, &filename).await {
                Ok(payload) => transfer::persist_download(&download_dir, &filename, &payload),
                Err(e) => Err(e),
            };
            let _ = events
                .send(ControlEvent::DownloadFinished { filename, result })
                .await;
        });
    }

    // ------------------------------------------------------------------
    // Reducer
    // ------------------------------------------------------------------

    /// Apply the outcome of a gateway round-trip. This is the only place
    /// spawned-task results reach controller state.
    pub fn apply(&mut self, event: ControlEvent, now: Instant) {
        match event {
            ControlEvent::ConnectFinished(result) => {
                let Some(creds) = self.pending_connect.take() else {
                    debug!("discarding connect result with no pending attempt");
                    return;
                };
                match result {
                    Ok(id) => {
                        self.session = Some(Session {
                            id,
                            host: creds.host,
                            port: creds.port,
                            username: creds.username,
                        });
                        self.notifications
                            .show("Connected successfully!", Severity::Success, now);
                        self.request_listing(Some("/".to_string()));
                    }
                    Err(e) => {
                        self.notifications.show(e.to_string(), Severity::Error, now);
                    }
                }
            }
            ControlEvent::ListingFinished { seq, result } => {
                if self.session.is_none() {
                    debug!("discarding listing for a closed session");
                    return;
                }
                if seq != self.nav.latest_seq {
                    debug!(
                        "discarding stale listing response (seq {} != {})",
                        seq, self.nav.latest_seq
                    );
                    return;
                }
                self.nav.listing_in_flight = false;
                match result {
                    Ok(listing) => {
                        self.nav.entries = listing.entries;
                        self.nav.current_path = listing.resolved_path;
                    }
                    Err(e) => {
                        self.notifications.show(e.to_string(), Severity::Error, now);
                    }
                }
            }
            ControlEvent::OperationFinished { op, result } => {
                if self.session.is_none() {
                    debug!("discarding {} result for a closed session", op.as_str());
                    return;
                }
                match result {
                    Ok(message) => {
                        let close_modal = matches!(
                            (op, &self.modal),
                            (OpKind::Rename, PendingModal::RenameOpen { .. })
                                | (OpKind::CreateDir, PendingModal::CreateDirOpen { .. })
                        );
                        if close_modal {
                            self.modal.close();
                        }
                        self.notifications.show(message, Severity::Success, now);
                        self.request_listing(None);
                    }
                    Err(e) => {
                        self.notifications.show(e.to_string(), Severity::Error, now);
                    }
                }
            }
            ControlEvent::UploadFinished(result) => {
                if self.session.is_none() {
                    debug!("discarding upload result for a closed session");
                    return;
                }
                match result {
                    Ok(message) => {
                        self.notifications.show(message, Severity::Success, now);
                        self.request_listing(None);
                    }
                    Err(e) => {
                        self.notifications.show(e.to_string(), Severity::Error, now);
                    }
                }
            }
            ControlEvent::DownloadFinished { filename, result } => {
                if self.session.is_none() {
                    debug!("discarding download result for a closed session");
                    return;
                }
                match result {
                    Ok(_) => {
                        self.notifications.show(
                            format!("Downloaded: {filename}"),
                            Severity::Success,
                            now,
                        );
                    }
                    Err(e) => {
                        self.notifications.show(e.to_string(), Severity::Error, now);
                    }
                }
            }
        }
    }
}

fn validate_credentials(creds: &Credentials) -> Result<(), AppError> {
    if creds.host.trim().is_empty() {
        return Err(AppError::ValidationError("Host cannot be empty".to_string()));
    }
    if creds.port == 0 {
        return Err(AppError::ValidationError(
            "Port must be greater than 0".to_string(),
        ));
    }
    if creds.username.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Username cannot be empty".to_string(),
        ));
    }
    if creds.password.is_empty() {
        return Err(AppError::ValidationError(
            "Password cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;

    use super::*;
    use crate::error::Result;
    use crate::gateway::{EntryKind, Listing};
    use crate::notify::Severity;

    fn dir_entry(name: &str) -> DirEntry {
        DirEntry {
            name: name.to_string(),
            kind: EntryKind::Directory,
            size: None,
            modified: None,
        }
    }

    fn file_entry(name: &str, size: u64) -> DirEntry {
        DirEntry {
            name: name.to_string(),
            kind: EntryKind::File,
            size: Some(size),
            modified: Some("Jan 15 10:30".to_string()),
        }
    }

    fn child_path(cwd: &str, name: &str) -> String {
        if cwd == "/" {
            format!("/{name}")
        } else {
            format!("{cwd}/{name}")
        }
    }

    struct FakeRemote {
        cwd: String,
        dirs: HashMap<String, Vec<DirEntry>>,
        files: HashMap<String, Vec<u8>>,
    }

    /// In-memory stand-in for the transfer gateway, with just enough
    /// filesystem semantics to drive the controller end to end.
    struct FakeBackend {
        calls: Mutex<Vec<String>>,
        remote: Mutex<FakeRemote>,
        fail_disconnect: bool,
    }

    impl FakeBackend {
        /// Remote tree: `/` containing a `docs` directory.
        fn seeded() -> Self {
            let mut dirs = HashMap::new();
            dirs.insert("/".to_string(), vec![dir_entry("docs")]);
            dirs.insert("/docs".to_string(), Vec::new());
            Self {
                calls: Mutex::new(Vec::new()),
                remote: Mutex::new(FakeRemote {
                    cwd: "/".to_string(),
                    dirs,
                    files: HashMap::new(),
                }),
                fail_disconnect: false,
            }
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls_matching(&self, prefix: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.starts_with(prefix))
                .count()
        }
    }

    #[async_trait]
    impl TransferBackend for FakeBackend {
        async fn connect(&self, creds: &Credentials) -> Result<String> {
            self.record(format!("connect {}:{}", creds.host, creds.port));
            if creds.password == "wrong" {
                return Err(AppError::Gateway(
                    "Connection failed: 530 Login incorrect".to_string(),
                ));
            }
            Ok("s1".to_string())
        }

        async fn disconnect(&self, session_id: &str) -> Result<()> {
            self.record(format!("disconnect {session_id}"));
            if self.fail_disconnect {
                return Err(AppError::Gateway("No active connection found".to_string()));
            }
            Ok(())
        }

        async fn list(&self, _session_id: &str, path: Option<&str>) -> Result<Listing> {
            self.record(format!("list {}", path.unwrap_or("-")));
            let mut remote = self.remote.lock().unwrap();
            if let Some(path) = path {
                if remote.dirs.contains_key(path) {
                    remote.cwd = path.to_string();
                }
            }
            let entries = remote
                .dirs
                .get(&remote.cwd)
                .cloned()
                .ok_or_else(|| AppError::Gateway("Failed to list files".to_string()))?;
            Ok(Listing {
                entries,
                resolved_path: remote.cwd.clone(),
            })
        }

        async fn change_directory(&self, _session_id: &str, target: &str) -> Result<String> {
            self.record(format!("cd {target}"));
            let mut remote = self.remote.lock().unwrap();
            let next = if target == ".." {
                match remote.cwd.rsplit_once('/') {
                    Some(("", _)) | None => "/".to_string(),
                    Some((parent, _)) => parent.to_string(),
                }
            } else {
                child_path(&remote.cwd, target)
            };
            if !remote.dirs.contains_key(&next) {
                return Err(AppError::Gateway(format!(
                    "Failed to change directory: {target} not found"
                )));
            }
            remote.cwd = next.clone();
            Ok(format!("Changed directory to {next}"))
        }

        async fn upload(
            &self,
            _session_id: &str,
            filename: &str,
            payload: Vec<u8>,
        ) -> Result<String> {
            self.record(format!("upload {filename}"));
            let mut remote = self.remote.lock().unwrap();
            let cwd = remote.cwd.clone();
            let key = child_path(&cwd, filename);
            let entry = file_entry(filename, payload.len() as u64);
            remote.files.insert(key, payload);
            if let Some(entries) = remote.dirs.get_mut(&cwd) {
                entries.push(entry);
            }
            Ok(format!("File '{filename}' uploaded successfully"))
        }

        async fn download(&self, _session_id: &str, filename: &str) -> Result<Bytes> {
            self.record(format!("download {filename}"));
            let remote = self.remote.lock().unwrap();
            let key = child_path(&remote.cwd, filename);
            remote
                .files
                .get(&key)
                .map(|payload| Bytes::from(payload.clone()))
                .ok_or_else(|| {
                    AppError::Gateway(format!("Failed to download file: {filename}"))
                })
        }

        async fn delete(&self, _session_id: &str, filename: &str) -> Result<String> {
            self.record(format!("delete {filename}"));
            let mut remote = self.remote.lock().unwrap();
            let cwd = remote.cwd.clone();
            let key = child_path(&cwd, filename);
            remote.files.remove(&key);
            let Some(entries) = remote.dirs.get_mut(&cwd) else {
                return Err(AppError::Gateway("Failed to delete file".to_string()));
            };
            let before = entries.len();
            entries.retain(|e| e.name != filename);
            if entries.len() == before {
                return Err(AppError::Gateway(format!(
                    "Failed to delete file: {filename} not found"
                )));
            }
            Ok(format!("File '{filename}' deleted successfully"))
        }

        async fn rename(
            &self,
            _session_id: &str,
            old_name: &str,
            new_name: &str,
        ) -> Result<String> {
            self.record(format!("rename {old_name} {new_name}"));
            let mut remote = self.remote.lock().unwrap();
            let cwd = remote.cwd.clone();
            let Some(entry) = remote
                .dirs
                .get_mut(&cwd)
                .and_then(|entries| entries.iter_mut().find(|e| e.name == old_name))
            else {
                return Err(AppError::Gateway(format!(
                    "Failed to rename: {old_name} not found"
                )));
            };
            entry.name = new_name.to_string();
            Ok(format!("Renamed '{old_name}' to '{new_name}'"))
        }

        async fn create_directory(&self, _session_id: &str, name: &str) -> Result<String> {
            self.record(format!("mkdir {name}"));
            let mut remote = self.remote.lock().unwrap();
            let cwd = remote.cwd.clone();
            let key = child_path(&cwd, name);
            remote.dirs.insert(key, Vec::new());
            if let Some(entries) = remote.dirs.get_mut(&cwd) {
                entries.push(dir_entry(name));
            }
            Ok(format!("Directory '{name}' created successfully"))
        }
    }

    fn creds() -> Credentials {
        Credentials {
            host: "ftp.example.com".to_string(),
            port: 21,
            username: "bob".to_string(),
            password: "x".to_string(),
        }
    }

    fn harness(
        backend: Arc<FakeBackend>,
        download_dir: PathBuf,
    ) -> (SessionController, mpsc::Receiver<ControlEvent>) {
        let (tx, rx) = mpsc::channel(16);
        (SessionController::new(backend, tx, download_dir), rx)
    }

    /// Apply the next `n` control events in arrival order.
    async fn pump(
        controller: &mut SessionController,
        rx: &mut mpsc::Receiver<ControlEvent>,
        n: usize,
        now: Instant,
    ) {
        for _ in 0..n {
            let event = rx.recv().await.unwrap();
            controller.apply(event, now);
        }
    }

    async fn connected(
        backend: Arc<FakeBackend>,
        download_dir: PathBuf,
    ) -> (SessionController, mpsc::Receiver<ControlEvent>) {
        let (mut controller, mut rx) = harness(backend, download_dir);
        let now = Instant::now();
        controller.connect(creds(), now);
        pump(&mut controller, &mut rx, 2, now).await;
        (controller, rx)
    }

    #[tokio::test]
    async fn test_connect_success_triggers_root_listing() {
        let backend = Arc::new(FakeBackend::seeded());
        let (mut controller, mut rx) = harness(backend.clone(), PathBuf::from("."));
        let now = Instant::now();

        controller.connect(creds(), now);
        pump(&mut controller, &mut rx, 1, now).await;
        assert!(controller.is_connected());
        assert_eq!(controller.session().unwrap().id, "s1");
        assert_eq!(
            controller.notifications.active(now).map(|n| n.text.as_str()),
            Some("Connected successfully!")
        );

        pump(&mut controller, &mut rx, 1, now).await;
        assert_eq!(controller.nav.current_path, "/");
        assert_eq!(controller.nav.entries.len(), 1);
        assert_eq!(controller.nav.entries[0].name, "docs");
        assert!(controller.nav.entries[0].is_directory());
        assert_eq!(backend.calls_matching("list /"), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_stays_disconnected() {
        let backend = Arc::new(FakeBackend::seeded());
        let (mut controller, mut rx) = harness(backend.clone(), PathBuf::from("."));
        let now = Instant::now();

        let mut bad = creds();
        bad.password = "wrong".to_string();
        controller.connect(bad, now);
        pump(&mut controller, &mut rx, 1, now).await;

        assert!(!controller.is_connected());
        let notification = controller.notifications.active(now).unwrap();
        assert_eq!(notification.severity, Severity::Error);
        assert_eq!(notification.text, "Connection failed: 530 Login incorrect");
        assert_eq!(backend.calls_matching("list"), 0);
    }

    #[tokio::test]
    async fn test_connect_requires_all_fields() {
        let backend = Arc::new(FakeBackend::seeded());
        let (mut controller, _rx) = harness(backend.clone(), PathBuf::from("."));
        let now = Instant::now();

        let mut incomplete = creds();
        incomplete.username = String::new();
        controller.connect(incomplete, now);

        assert!(!controller.is_connected());
        assert!(!controller.connect_in_flight());
        let notification = controller.notifications.active(now).unwrap();
        assert_eq!(notification.severity, Severity::Error);
        assert_eq!(backend.calls_matching("connect"), 0);
    }

    #[tokio::test]
    async fn test_change_directory_refreshes_and_updates_path() {
        let backend = Arc::new(FakeBackend::seeded());
        let (mut controller, mut rx) = connected(backend.clone(), PathBuf::from(".")).await;
        let now = Instant::now();

        assert!(!controller.can_navigate_up());
        controller.change_directory("docs".to_string());
        pump(&mut controller, &mut rx, 2, now).await;

        assert_eq!(controller.nav.current_path, "/docs");
        assert!(controller.can_navigate_up());
        assert_eq!(
            controller.notifications.active(now).map(|n| n.text.as_str()),
            Some("Changed directory to /docs")
        );

        controller.navigate_up();
        pump(&mut controller, &mut rx, 2, now).await;
        assert_eq!(controller.nav.current_path, "/");
        assert!(!controller.can_navigate_up());
    }

    #[tokio::test]
    async fn test_create_directory_round_trip() {
        let backend = Arc::new(FakeBackend::seeded());
        let (mut controller, mut rx) = connected(backend.clone(), PathBuf::from(".")).await;
        let now = Instant::now();
        let lists_before = backend.calls_matching("list");

        controller.open_create_dir();
        for c in "reports".chars() {
            controller.modal.push_input(c);
        }
        controller.confirm_modal(now);
        pump(&mut controller, &mut rx, 2, now).await;

        assert!(controller.modal.is_closed());
        assert_eq!(
            controller.notifications.active(now).map(|n| n.text.as_str()),
            Some("Directory 'reports' created successfully")
        );
        // exactly one refresh after the mutation
        assert_eq!(backend.calls_matching("list") - lists_before, 1);
        assert!(
            controller
                .nav
                .entries
                .iter()
                .any(|e| e.name == "reports" && e.is_directory())
        );
    }

    #[tokio::test]
    async fn test_failed_operation_keeps_modal_and_listing() {
        let backend = Arc::new(FakeBackend::seeded());
        let (mut controller, mut rx) = connected(backend.clone(), PathBuf::from(".")).await;
        let now = Instant::now();
        let entries_before = controller.nav.entries.len();
        let lists_before = backend.calls_matching("list");

        controller.open_rename("ghost.txt".to_string());
        controller.confirm_modal(now);
        pump(&mut controller, &mut rx, 1, now).await;

        assert!(matches!(
            controller.modal,
            PendingModal::RenameOpen { .. }
        ));
        let notification = controller.notifications.active(now).unwrap();
        assert_eq!(notification.severity, Severity::Error);
        assert_eq!(notification.text, "Failed to rename: ghost.txt not found");
        // no refresh on failure, listing untouched
        assert_eq!(backend.calls_matching("list"), lists_before);
        assert_eq!(controller.nav.entries.len(), entries_before);
    }

    #[tokio::test]
    async fn test_empty_modal_input_is_rejected_locally() {
        let backend = Arc::new(FakeBackend::seeded());
        let (mut controller, _rx) = connected(backend.clone(), PathBuf::from(".")).await;
        let now = Instant::now();

        controller.open_create_dir();
        controller.confirm_modal(now);

        assert!(!controller.modal.is_closed());
        assert_eq!(backend.calls_matching("mkdir"), 0);
        assert_eq!(
            controller.notifications.active(now).map(|n| n.severity),
            Some(Severity::Error)
        );
    }

    #[tokio::test]
    async fn test_only_one_dialog_at_a_time() {
        let backend = Arc::new(FakeBackend::seeded());
        let (mut controller, _rx) = connected(backend, PathBuf::from(".")).await;

        controller.open_rename("docs".to_string());
        controller.open_create_dir();
        assert!(matches!(
            controller.modal,
            PendingModal::RenameOpen { .. }
        ));

        controller.request_delete("docs".to_string());
        assert!(!controller.delete_confirmation.showing);

        controller.cancel_modal();
        controller.request_delete("docs".to_string());
        assert!(controller.delete_confirmation.showing);
        controller.open_rename("docs".to_string());
        assert!(controller.modal.is_closed());
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let backend = Arc::new(FakeBackend::seeded());
        let (mut controller, mut rx) = connected(backend.clone(), PathBuf::from(".")).await;
        let now = Instant::now();

        controller.request_delete("docs".to_string());
        assert!(controller.delete_confirmation.showing);
        assert_eq!(backend.calls_matching("delete"), 0);

        controller.cancel_delete();
        assert!(!controller.delete_confirmation.showing);
        assert_eq!(backend.calls_matching("delete"), 0);

        controller.request_delete("docs".to_string());
        controller.confirm_delete();
        pump(&mut controller, &mut rx, 2, now).await;

        assert_eq!(backend.calls_matching("delete"), 1);
        assert!(controller.nav.entries.iter().all(|e| e.name != "docs"));
    }

    #[tokio::test]
    async fn test_upload_transmits_first_file_only() {
        let backend = Arc::new(FakeBackend::seeded());
        let (mut controller, mut rx) = connected(backend.clone(), PathBuf::from(".")).await;
        let now = Instant::now();

        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("fileA");
        let second = dir.path().join("fileB");
        std::fs::write(&first, b"AAAA").unwrap();
        std::fs::write(&second, b"BBBB").unwrap();

        controller.upload(vec![first, second], now);
        pump(&mut controller, &mut rx, 2, now).await;

        assert_eq!(backend.calls_matching("upload"), 1);
        assert_eq!(backend.calls_matching("upload fileA"), 1);
        assert_eq!(
            controller.notifications.active(now).map(|n| n.text.as_str()),
            Some("File 'fileA' uploaded successfully")
        );
        assert!(controller.nav.entries.iter().any(|e| e.name == "fileA"));
        assert!(controller.nav.entries.iter().all(|e| e.name != "fileB"));
    }

    #[tokio::test]
    async fn test_download_persists_payload_without_refresh() {
        let backend = Arc::new(FakeBackend::seeded());
        let downloads = tempfile::tempdir().unwrap();
        let (mut controller, mut rx) =
            connected(backend.clone(), downloads.path().to_path_buf()).await;
        let now = Instant::now();

        let upload_dir = tempfile::tempdir().unwrap();
        let local = upload_dir.path().join("fileA");
        std::fs::write(&local, b"payload").unwrap();
        controller.upload(vec![local], now);
        pump(&mut controller, &mut rx, 2, now).await;
        let lists_before = backend.calls_matching("list");

        controller.download("fileA".to_string());
        pump(&mut controller, &mut rx, 1, now).await;

        assert_eq!(
            controller.notifications.active(now).map(|n| n.text.as_str()),
            Some("Downloaded: fileA")
        );
        assert_eq!(
            std::fs::read(downloads.path().join("fileA")).unwrap(),
            b"payload"
        );
        // downloads do not touch the listing
        assert_eq!(backend.calls_matching("list"), lists_before);
    }

    #[tokio::test]
    async fn test_download_failure_reports_detail() {
        let backend = Arc::new(FakeBackend::seeded());
        let downloads = tempfile::tempdir().unwrap();
        let (mut controller, mut rx) =
            connected(backend, downloads.path().to_path_buf()).await;
        let now = Instant::now();

        controller.download("missing.bin".to_string());
        pump(&mut controller, &mut rx, 1, now).await;

        let notification = controller.notifications.active(now).unwrap();
        assert_eq!(notification.severity, Severity::Error);
        assert_eq!(notification.text, "Failed to download file: missing.bin");
    }

    #[tokio::test]
    async fn test_stale_listing_response_is_discarded() {
        let backend = Arc::new(FakeBackend::seeded());
        let (mut controller, mut rx) = connected(backend, PathBuf::from(".")).await;
        let now = Instant::now();

        // a newer request is in flight when an older response arrives
        controller.request_listing(Some("/docs".to_string()));
        let stale = ControlEvent::ListingFinished {
            seq: controller.nav.latest_seq - 1,
            result: Ok(Listing {
                entries: vec![file_entry("stale.txt", 1)],
                resolved_path: "/elsewhere".to_string(),
            }),
        };
        controller.apply(stale, now);
        assert_eq!(controller.nav.current_path, "/");
        assert!(controller.nav.entries.iter().all(|e| e.name != "stale.txt"));
        assert!(controller.nav.listing_in_flight);

        // the in-flight response still applies
        pump(&mut controller, &mut rx, 1, now).await;
        assert_eq!(controller.nav.current_path, "/docs");
        assert!(!controller.nav.listing_in_flight);
    }

    #[tokio::test]
    async fn test_refresh_respects_advisory_flag() {
        let backend = Arc::new(FakeBackend::seeded());
        let (mut controller, mut rx) = connected(backend.clone(), PathBuf::from(".")).await;
        let now = Instant::now();
        let lists_before = backend.calls_matching("list");

        controller.request_listing(None);
        controller.refresh();
        pump(&mut controller, &mut rx, 1, now).await;
        assert_eq!(backend.calls_matching("list") - lists_before, 1);

        controller.refresh();
        pump(&mut controller, &mut rx, 1, now).await;
        assert_eq!(backend.calls_matching("list") - lists_before, 2);
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent_and_always_succeeds() {
        let mut backend = FakeBackend::seeded();
        backend.fail_disconnect = true;
        let backend = Arc::new(backend);
        let (mut controller, _rx) = connected(backend, PathBuf::from(".")).await;
        let now = Instant::now();

        controller.disconnect(now);
        assert!(!controller.is_connected());
        assert_eq!(controller.nav.current_path, "/");
        assert!(controller.nav.entries.is_empty());
        assert_eq!(
            controller.notifications.active(now).map(|n| n.text.as_str()),
            Some("Disconnected successfully!")
        );

        controller.disconnect(now);
        assert!(!controller.is_connected());
        assert_eq!(controller.nav.current_path, "/");
        assert!(controller.nav.entries.is_empty());
    }

    #[tokio::test]
    async fn test_results_after_disconnect_are_discarded() {
        let backend = Arc::new(FakeBackend::seeded());
        let (mut controller, mut rx) = connected(backend, PathBuf::from(".")).await;
        let now = Instant::now();

        controller.request_listing(None);
        controller.disconnect(now);
        pump(&mut controller, &mut rx, 1, now).await;

        assert!(controller.nav.entries.is_empty());
        assert_eq!(controller.nav.current_path, "/");
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let backend = Arc::new(FakeBackend::seeded());
        let downloads = tempfile::tempdir().unwrap();
        let (mut controller, mut rx) = harness(backend.clone(), downloads.path().to_path_buf());
        let now = Instant::now();

        // connect -> session "s1", root listing shows docs/
        controller.connect(creds(), now);
        pump(&mut controller, &mut rx, 2, now).await;
        assert_eq!(controller.session().unwrap().id, "s1");
        assert_eq!(controller.nav.current_path, "/");
        assert_eq!(controller.nav.entries[0].name, "docs");

        // cd docs
        controller.change_directory("docs".to_string());
        pump(&mut controller, &mut rx, 2, now).await;
        assert_eq!(controller.nav.current_path, "/docs");

        // upload fileA
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("fileA");
        std::fs::write(&local, b"contents").unwrap();
        controller.upload(vec![local], now);
        pump(&mut controller, &mut rx, 2, now).await;
        assert!(controller.nav.entries.iter().any(|e| e.name == "fileA"));

        // download fileA
        controller.download("fileA".to_string());
        pump(&mut controller, &mut rx, 1, now).await;
        assert_eq!(
            std::fs::read(downloads.path().join("fileA")).unwrap(),
            b"contents"
        );

        // delete fileA after confirmation
        controller.request_delete("fileA".to_string());
        controller.confirm_delete();
        pump(&mut controller, &mut rx, 2, now).await;
        assert!(controller.nav.entries.iter().all(|e| e.name != "fileA"));
    }
}
