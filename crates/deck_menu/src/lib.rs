//! Menu controller for the RepoDeck shell.
//!
//! Builds the application menu and the text-input context menu, owns their
//! click handling, and drives the host event loop over a command channel.
//! The controller never touches the GUI toolkit directly: everything that
//! needs a window, a dialog, or the tray goes out as a [`HostCmd`] and comes
//! back (where a result is needed) on a oneshot responder.

use deck_repos::{RepoRegistry, SyncScheduler};
use deck_storage::PrefStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// Preference key for the dark-theme flag
pub const PREF_DARK: &str = "dark";
/// Preference key for the serialized path list
pub const PREF_PATHS: &str = "paths";

/// Menu item ids the controller dispatches on
pub mod item {
    pub const OPEN_PATH_LIST: &str = "open-path-list";
    pub const QUIT: &str = "quit";
    pub const RELOAD: &str = "reload";
    pub const FORCE_RELOAD: &str = "force-reload";
    pub const TOGGLE_DEVTOOLS: &str = "toggle-devtools";
    pub const DARK_THEME: &str = "dark-theme";
    pub const SKIP_TASKBAR: &str = "skip-taskbar";
    pub const HISTORY_BACK: &str = "history-back";
    pub const HISTORY_FORWARD: &str = "history-forward";
    pub const CUT: &str = "cut";
    pub const COPY: &str = "copy";
    pub const PASTE: &str = "paste";
    pub const DELETE: &str = "delete";
}

// ============================================================================
// Error Types
// ============================================================================

/// Error codes for menu operations (8200-8209)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MenuErrorCode {
    /// Channel send error
    ChannelSend = 8200,
    /// Channel receive error
    ChannelRecv = 8201,
    /// IO error (path-list file read)
    Io = 8202,
    /// Preference store error
    Storage = 8203,
    /// Repo registry error
    Repo = 8204,
}

/// Custom error type for menu operations
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("[{code}] Channel send error: {message}")]
    ChannelSend { code: u32, message: String },

    #[error("[{code}] Channel receive error: {message}")]
    ChannelRecv { code: u32, message: String },

    #[error("[{code}] IO error: {message}")]
    Io { code: u32, message: String },

    #[error("[{code}] Storage error: {source}")]
    Storage {
        code: u32,
        #[source]
        source: deck_storage::StorageError,
    },

    #[error("[{code}] Repo error: {source}")]
    Repo {
        code: u32,
        #[source]
        source: deck_repos::RepoError,
    },
}

impl MenuError {
    pub fn channel_send(message: impl Into<String>) -> Self {
        Self::ChannelSend {
            code: MenuErrorCode::ChannelSend as u32,
            message: message.into(),
        }
    }

    pub fn channel_recv(message: impl Into<String>) -> Self {
        Self::ChannelRecv {
            code: MenuErrorCode::ChannelRecv as u32,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for MenuError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            code: MenuErrorCode::Io as u32,
            message: e.to_string(),
        }
    }
}

impl From<deck_storage::StorageError> for MenuError {
    fn from(source: deck_storage::StorageError) -> Self {
        Self::Storage {
            code: MenuErrorCode::Storage as u32,
            source,
        }
    }
}

impl From<deck_repos::RepoError> for MenuError {
    fn from(source: deck_repos::RepoError) -> Self {
        Self::Repo {
            code: MenuErrorCode::Repo as u32,
            source,
        }
    }
}

// ============================================================================
// Menu Template Types
// ============================================================================

/// Host-toolkit built-in behaviors a menu item can delegate to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Quit,
    Reload,
    ForceReload,
    ToggleDevTools,
    Cut,
    Copy,
    Paste,
    Delete,
}

impl Role {
    pub fn item_id(self) -> &'static str {
        match self {
            Role::Quit => item::QUIT,
            Role::Reload => item::RELOAD,
            Role::ForceReload => item::FORCE_RELOAD,
            Role::ToggleDevTools => item::TOGGLE_DEVTOOLS,
            Role::Cut => item::CUT,
            Role::Copy => item::COPY,
            Role::Paste => item::PASTE,
            Role::Delete => item::DELETE,
        }
    }

    pub fn from_item_id(id: &str) -> Option<Self> {
        match id {
            item::QUIT => Some(Role::Quit),
            item::RELOAD => Some(Role::Reload),
            item::FORCE_RELOAD => Some(Role::ForceReload),
            item::TOGGLE_DEVTOOLS => Some(Role::ToggleDevTools),
            item::CUT => Some(Role::Cut),
            item::COPY => Some(Role::Copy),
            item::PASTE => Some(Role::Paste),
            item::DELETE => Some(Role::Delete),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Quit => "Quit",
            Role::Reload => "Reload",
            Role::ForceReload => "Force Reload",
            Role::ToggleDevTools => "Toggle Developer Tools",
            Role::Cut => "Cut",
            Role::Copy => "Copy",
            Role::Paste => "Paste",
            Role::Delete => "Delete",
        }
    }
}

/// Menu item definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: Option<String>,
    pub label: String,
    pub role: Option<Role>,
    pub accelerator: Option<String>,
    pub enabled: Option<bool>,
    pub checked: Option<bool>,
    pub submenu: Option<Vec<MenuItem>>,
    #[serde(rename = "type")]
    pub item_type: Option<String>, // "normal", "checkbox", "separator"
}

impl MenuItem {
    fn empty(label: &str) -> Self {
        Self {
            id: None,
            label: label.to_string(),
            role: None,
            accelerator: None,
            enabled: None,
            checked: None,
            submenu: None,
            item_type: None,
        }
    }

    pub fn normal(id: &str, label: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Self::empty(label)
        }
    }

    pub fn with_role(role: Role) -> Self {
        Self {
            id: Some(role.item_id().to_string()),
            role: Some(role),
            ..Self::empty(role.label())
        }
    }

    pub fn checkbox(id: &str, label: &str, checked: bool) -> Self {
        Self {
            id: Some(id.to_string()),
            checked: Some(checked),
            item_type: Some("checkbox".to_string()),
            ..Self::empty(label)
        }
    }

    pub fn separator() -> Self {
        Self {
            item_type: Some("separator".to_string()),
            ..Self::empty("")
        }
    }

    pub fn submenu(label: &str, items: Vec<MenuItem>) -> Self {
        Self {
            submenu: Some(items),
            ..Self::empty(label)
        }
    }

    pub fn accelerator(mut self, accelerator: &str) -> Self {
        self.accelerator = Some(accelerator.to_string());
        self
    }
}

/// Menu event delivered when an item is clicked.
/// `checked` carries the toolkit-toggled state for checkbox items.
#[derive(Debug, Clone, Serialize)]
pub struct MenuEvent {
    /// Source of the event: "app" for the app menu, "context" for popups
    pub menu_id: String,
    pub item_id: String,
    pub label: String,
    pub checked: Option<bool>,
}

/// Options for the file open dialog
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileDialogOpts {
    pub title: Option<String>,
    pub default_path: Option<String>,
    pub filters: Option<Vec<FileFilter>>,
    pub multiple: Option<bool>,
    pub directory: Option<bool>,
}

/// File filter for dialogs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

// ============================================================================
// Host Command Protocol
// ============================================================================

/// Commands sent from the menu controller to the host event loop
#[derive(Debug)]
pub enum HostCmd {
    ShowOpenDialog {
        opts: FileDialogOpts,
        respond: oneshot::Sender<Option<Vec<String>>>,
    },
    SetAppMenu {
        items: Vec<MenuItem>,
        respond: oneshot::Sender<bool>,
    },
    ShowContextMenu {
        items: Vec<MenuItem>,
        respond: oneshot::Sender<Option<String>>,
    },
    CreateTray {
        respond: oneshot::Sender<bool>,
    },
    DestroyTray {
        respond: oneshot::Sender<bool>,
    },
    IsTrayActive {
        respond: oneshot::Sender<bool>,
    },
    SetSkipTaskbar {
        skip: bool,
    },
    ApplyTheme {
        dark: bool,
    },
    NavigateHistory {
        delta: i32,
    },
    RunRole {
        role: Role,
    },
}

// ============================================================================
// Path List Parsing
// ============================================================================

/// Parse a newline-delimited path-list file: trim every line, drop blank
/// lines, preserve order. No escaping, no comments.
pub fn parse_path_list(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Context Menu Policy
// ============================================================================

/// Snapshot of a right-click target, reported by the renderer preload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementTarget {
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub classes: Vec<String>,
}

/// Marker classes that opt a text element into the edit context menu
const CONTEXT_MENU_CLASSES: [&str; 2] = ["input", "textarea"];

/// Whether a right-click on `target` should show the edit context menu.
/// Disabled elements never get one, regardless of class.
pub fn context_menu_allowed(target: &ElementTarget) -> bool {
    if target.disabled {
        return false;
    }
    target
        .classes
        .iter()
        .any(|c| CONTEXT_MENU_CLASSES.contains(&c.as_str()))
}

/// The Cut/Copy/Paste/Delete popup shown over text inputs
pub fn build_context_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::with_role(Role::Cut),
        MenuItem::with_role(Role::Copy),
        MenuItem::with_role(Role::Paste),
        MenuItem::with_role(Role::Delete),
    ]
}

// ============================================================================
// Menu Controller
// ============================================================================

/// Builds the shell menus and handles their events.
///
/// Cheap to clone; clones share the host channel and the backing stores.
/// Context-menu requests are typically handled on their own task because
/// they stay pending until the user picks an entry or the next popup
/// supersedes them.
#[derive(Clone)]
pub struct MenuController {
    host: mpsc::Sender<HostCmd>,
    prefs: PrefStore,
    repos: Arc<RepoRegistry>,
    sync: Arc<SyncScheduler>,
}

impl MenuController {
    pub fn new(
        host: mpsc::Sender<HostCmd>,
        prefs: PrefStore,
        repos: Arc<RepoRegistry>,
        sync: Arc<SyncScheduler>,
    ) -> Self {
        Self {
            host,
            prefs,
            repos,
            sync,
        }
    }

    async fn send(&self, cmd: HostCmd) -> Result<(), MenuError> {
        self.host
            .send(cmd)
            .await
            .map_err(|e| MenuError::channel_send(e.to_string()))
    }

    async fn query<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> HostCmd,
    ) -> Result<T, MenuError> {
        let (respond, rx) = oneshot::channel();
        self.send(make(respond)).await?;
        rx.await.map_err(|e| MenuError::channel_recv(e.to_string()))
    }

    /// Build the File / View / History application menu.
    ///
    /// The dark-theme checkbox defaults the `dark` preference to true when
    /// it has never been written, and the effective value is applied to the
    /// document root so page and checkbox agree from the first frame. The
    /// skip-taskbar checkbox mirrors the host's current tray state.
    pub async fn build_app_menu(&self) -> Result<Vec<MenuItem>, MenuError> {
        let dark = match self.prefs.get_bool(PREF_DARK).await? {
            Some(v) => v,
            None => {
                self.prefs.set_bool(PREF_DARK, true).await?;
                true
            }
        };
        self.send(HostCmd::ApplyTheme { dark }).await?;

        let tray_active = self.query(|respond| HostCmd::IsTrayActive { respond }).await?;

        Ok(vec![
            MenuItem::submenu(
                "File",
                vec![
                    MenuItem::normal(item::OPEN_PATH_LIST, "Open Path List"),
                    MenuItem::with_role(Role::Quit).accelerator("CmdOrCtrl+KeyQ"),
                ],
            ),
            MenuItem::submenu(
                "View",
                vec![
                    MenuItem::with_role(Role::Reload),
                    MenuItem::with_role(Role::ForceReload),
                    MenuItem::with_role(Role::ToggleDevTools),
                    MenuItem::separator(),
                    MenuItem::checkbox(item::DARK_THEME, "Dark Theme", dark),
                    MenuItem::checkbox(item::SKIP_TASKBAR, "Skip Taskbar", tray_active),
                ],
            ),
            MenuItem::submenu(
                "History",
                vec![
                    MenuItem::normal(item::HISTORY_BACK, "Back").accelerator("Alt+ArrowLeft"),
                    MenuItem::normal(item::HISTORY_FORWARD, "Forward")
                        .accelerator("Alt+ArrowRight"),
                ],
            ),
        ])
    }

    /// Build and install the application menu, replacing any previous one
    pub async fn install_app_menu(&self) -> Result<(), MenuError> {
        let items = self.build_app_menu().await?;
        let installed = self
            .query(|respond| HostCmd::SetAppMenu { items, respond })
            .await?;
        if installed {
            info!("application menu installed");
        }
        Ok(())
    }

    /// Dispatch one menu click
    pub async fn handle_menu_event(&self, event: MenuEvent) -> Result<(), MenuError> {
        debug!(item = %event.item_id, checked = ?event.checked, "menu click");

        match event.item_id.as_str() {
            item::OPEN_PATH_LIST => self.open_path_list().await,

            item::DARK_THEME => {
                let dark = event.checked.unwrap_or(false);
                self.send(HostCmd::ApplyTheme { dark }).await?;
                self.prefs.set_bool(PREF_DARK, dark).await?;
                Ok(())
            }

            item::SKIP_TASKBAR => {
                let skip = event.checked.unwrap_or(false);
                self.send(HostCmd::SetSkipTaskbar { skip }).await?;
                if skip {
                    self.query(|respond| HostCmd::CreateTray { respond }).await?;
                } else {
                    self.query(|respond| HostCmd::DestroyTray { respond }).await?;
                }
                Ok(())
            }

            item::HISTORY_BACK => self.send(HostCmd::NavigateHistory { delta: -1 }).await,
            item::HISTORY_FORWARD => self.send(HostCmd::NavigateHistory { delta: 1 }).await,

            other => match Role::from_item_id(other) {
                Some(role) => self.send(HostCmd::RunRole { role }).await,
                None => {
                    debug!(item = other, "unhandled menu item");
                    Ok(())
                }
            },
        }
    }

    /// File → Open Path List.
    ///
    /// Cancelling the dialog is a normal no-op: nothing is persisted and the
    /// registry is not touched. A failing file read propagates to the
    /// dispatch loop. The sync timer starts only after the registry has
    /// accepted the new list.
    async fn open_path_list(&self) -> Result<(), MenuError> {
        let selection = self
            .query(|respond| HostCmd::ShowOpenDialog {
                opts: FileDialogOpts::default(),
                respond,
            })
            .await?;

        let Some(file) = selection.and_then(|paths| paths.into_iter().next()) else {
            debug!("open path list cancelled");
            return Ok(());
        };

        let text = tokio::fs::read_to_string(&file).await?;
        let paths = parse_path_list(&text);
        info!(file = %file, paths = paths.len(), "path list loaded");

        self.prefs.set(PREF_PATHS, &serde_json::json!(paths)).await?;

        self.repos.init(&paths).await?;
        self.sync.start_timer();

        Ok(())
    }

    /// Global right-click handling: apply the policy, pop the edit menu for
    /// eligible targets, and forward the selected role to the host. Returns
    /// the selected item id, or None when nothing was shown or selected.
    pub async fn handle_context_menu_request(
        &self,
        target: ElementTarget,
    ) -> Result<Option<String>, MenuError> {
        if !context_menu_allowed(&target) {
            debug!(disabled = target.disabled, "context menu suppressed");
            return Ok(None);
        }

        let items = build_context_menu();
        let selected = self
            .query(|respond| HostCmd::ShowContextMenu { items, respond })
            .await?;

        if let Some(ref id) = selected {
            if let Some(role) = Role::from_item_id(id) {
                self.send(HostCmd::RunRole { role }).await?;
            }
        }

        Ok(selected)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[test]
    fn path_list_trims_and_drops_blanks() {
        assert_eq!(parse_path_list("a\n\n b \n"), vec!["a", "b"]);

        let text = "  /srv/one\n\t\n/srv/two  \n   \n\t/srv/three\n";
        let parsed = parse_path_list(text);
        assert_eq!(parsed, vec!["/srv/one", "/srv/two", "/srv/three"]);

        assert!(parse_path_list("").is_empty());
        assert!(parse_path_list("\n \n\t\n").is_empty());
    }

    #[test]
    fn context_policy_disabled_and_markers() {
        let disabled_input = ElementTarget {
            disabled: true,
            classes: vec!["input".into()],
        };
        assert!(!context_menu_allowed(&disabled_input));

        let input = ElementTarget {
            disabled: false,
            classes: vec!["field".into(), "input".into()],
        };
        assert!(context_menu_allowed(&input));

        let textarea = ElementTarget {
            disabled: false,
            classes: vec!["textarea".into()],
        };
        assert!(context_menu_allowed(&textarea));

        let plain = ElementTarget {
            disabled: false,
            classes: vec!["button".into()],
        };
        assert!(!context_menu_allowed(&plain));

        assert!(!context_menu_allowed(&ElementTarget::default()));
    }

    #[test]
    fn role_strings_match_host_toolkit_names() {
        let json = serde_json::to_string(&Role::ForceReload).unwrap();
        assert_eq!(json, "\"forcereload\"");
        let json = serde_json::to_string(&Role::ToggleDevTools).unwrap();
        assert_eq!(json, "\"toggledevtools\"");
    }

    // ------------------------------------------------------------------
    // Scripted host loop: answers queries with fixed values and records a
    // compact tag per command for assertions.
    // ------------------------------------------------------------------

    #[derive(Default)]
    struct HostScript {
        tray_active: bool,
        dialog_result: Option<Vec<String>>,
        context_selection: Option<String>,
    }

    type SeenLog = Arc<Mutex<Vec<String>>>;

    fn spawn_host(script: HostScript) -> (mpsc::Sender<HostCmd>, SeenLog) {
        let (tx, mut rx) = mpsc::channel::<HostCmd>(16);
        let seen: SeenLog = Arc::new(Mutex::new(Vec::new()));
        let seen_task = seen.clone();

        tokio::spawn(async move {
            let mut tray_active = script.tray_active;
            while let Some(cmd) = rx.recv().await {
                let mut log = seen_task.lock().await;
                match cmd {
                    HostCmd::ShowOpenDialog { respond, .. } => {
                        log.push("show-open-dialog".into());
                        let _ = respond.send(script.dialog_result.clone());
                    }
                    HostCmd::SetAppMenu { items, respond } => {
                        log.push(format!("set-app-menu:{}", items.len()));
                        let _ = respond.send(true);
                    }
                    HostCmd::ShowContextMenu { items, respond } => {
                        log.push(format!("show-context-menu:{}", items.len()));
                        let _ = respond.send(script.context_selection.clone());
                    }
                    HostCmd::CreateTray { respond } => {
                        tray_active = true;
                        log.push("create-tray".into());
                        let _ = respond.send(true);
                    }
                    HostCmd::DestroyTray { respond } => {
                        tray_active = false;
                        log.push("destroy-tray".into());
                        let _ = respond.send(true);
                    }
                    HostCmd::IsTrayActive { respond } => {
                        let _ = respond.send(tray_active);
                    }
                    HostCmd::SetSkipTaskbar { skip } => {
                        log.push(format!("set-skip-taskbar:{skip}"));
                    }
                    HostCmd::ApplyTheme { dark } => {
                        log.push(format!("apply-theme:{dark}"));
                    }
                    HostCmd::NavigateHistory { delta } => {
                        log.push(format!("navigate:{delta}"));
                    }
                    HostCmd::RunRole { role } => {
                        log.push(format!("role:{role:?}"));
                    }
                }
            }
        });

        (tx, seen)
    }

    struct Fixture {
        controller: MenuController,
        host: mpsc::Sender<HostCmd>,
        seen: SeenLog,
        prefs: PrefStore,
        repos: Arc<RepoRegistry>,
        sync: Arc<SyncScheduler>,
    }

    impl Fixture {
        /// Round-trip a query so every fire-and-forget command sent before it
        /// has been processed by the scripted host.
        async fn settle(&self) {
            let (respond, rx) = oneshot::channel();
            self.host
                .send(HostCmd::IsTrayActive { respond })
                .await
                .unwrap();
            rx.await.unwrap();
        }
    }

    fn fixture(script: HostScript) -> Fixture {
        let (host, seen) = spawn_host(script);
        let prefs = PrefStore::open_in_memory().unwrap();
        let repos = Arc::new(RepoRegistry::new());
        let sync = Arc::new(SyncScheduler::new(Duration::from_secs(60), repos.clone()));
        let controller =
            MenuController::new(host.clone(), prefs.clone(), repos.clone(), sync.clone());
        Fixture {
            controller,
            host,
            seen,
            prefs,
            repos,
            sync,
        }
    }

    fn click(item_id: &str, checked: Option<bool>) -> MenuEvent {
        MenuEvent {
            menu_id: "app".into(),
            item_id: item_id.into(),
            label: String::new(),
            checked,
        }
    }

    #[tokio::test]
    async fn app_menu_has_file_view_history_shape() {
        let fx = fixture(HostScript::default());
        let menu = fx.controller.build_app_menu().await.unwrap();

        let labels: Vec<&str> = menu.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["File", "View", "History"]);

        let file = menu[0].submenu.as_ref().unwrap();
        assert_eq!(file[0].label, "Open Path List");
        assert_eq!(file[1].role, Some(Role::Quit));
        assert_eq!(file[1].accelerator.as_deref(), Some("CmdOrCtrl+KeyQ"));

        let view = menu[1].submenu.as_ref().unwrap();
        assert_eq!(view[3].item_type.as_deref(), Some("separator"));
        assert_eq!(view[4].id.as_deref(), Some(item::DARK_THEME));
        assert_eq!(view[5].id.as_deref(), Some(item::SKIP_TASKBAR));

        let history = menu[2].submenu.as_ref().unwrap();
        assert_eq!(history[0].accelerator.as_deref(), Some("Alt+ArrowLeft"));
        assert_eq!(history[1].accelerator.as_deref(), Some("Alt+ArrowRight"));
    }

    #[tokio::test]
    async fn dark_theme_defaults_to_true_and_toggles_off() {
        let fx = fixture(HostScript::default());

        // No preference written yet: building defaults it to true, applies
        // the class, and checks the box.
        let menu = fx.controller.build_app_menu().await.unwrap();
        let view = menu[1].submenu.as_ref().unwrap();
        assert_eq!(view[4].checked, Some(true));
        assert_eq!(fx.prefs.get_bool(PREF_DARK).await.unwrap(), Some(true));
        assert!(fx.seen.lock().await.contains(&"apply-theme:true".to_string()));

        // Unchecking persists false and clears the class
        fx.controller
            .handle_menu_event(click(item::DARK_THEME, Some(false)))
            .await
            .unwrap();
        fx.settle().await;
        assert_eq!(fx.prefs.get_bool(PREF_DARK).await.unwrap(), Some(false));
        assert!(fx.seen.lock().await.contains(&"apply-theme:false".to_string()));

        // A later build honors the stored value instead of re-defaulting
        let menu = fx.controller.build_app_menu().await.unwrap();
        let view = menu[1].submenu.as_ref().unwrap();
        assert_eq!(view[4].checked, Some(false));
    }

    #[tokio::test]
    async fn skip_taskbar_mirrors_tray_state() {
        let fx = fixture(HostScript {
            tray_active: true,
            ..Default::default()
        });

        let menu = fx.controller.build_app_menu().await.unwrap();
        let view = menu[1].submenu.as_ref().unwrap();
        assert_eq!(view[5].checked, Some(true));

        // Unchecking clears the window flag and tears the tray down
        fx.controller
            .handle_menu_event(click(item::SKIP_TASKBAR, Some(false)))
            .await
            .unwrap();

        let seen = fx.seen.lock().await.clone();
        assert!(seen.contains(&"set-skip-taskbar:false".to_string()));
        let creates = seen.iter().filter(|s| *s == "create-tray").count();
        let destroys = seen.iter().filter(|s| *s == "destroy-tray").count();
        assert_eq!((creates, destroys), (0, 1));
    }

    #[tokio::test]
    async fn skip_taskbar_checked_creates_tray() {
        let fx = fixture(HostScript::default());

        fx.controller
            .handle_menu_event(click(item::SKIP_TASKBAR, Some(true)))
            .await
            .unwrap();

        let seen = fx.seen.lock().await.clone();
        assert!(seen.contains(&"set-skip-taskbar:true".to_string()));
        let creates = seen.iter().filter(|s| *s == "create-tray").count();
        let destroys = seen.iter().filter(|s| *s == "destroy-tray").count();
        assert_eq!((creates, destroys), (1, 0));
    }

    #[tokio::test]
    async fn dialog_cancel_is_a_noop() {
        let fx = fixture(HostScript {
            dialog_result: None,
            ..Default::default()
        });

        fx.controller
            .handle_menu_event(click(item::OPEN_PATH_LIST, None))
            .await
            .unwrap();

        assert_eq!(fx.prefs.get(PREF_PATHS).await.unwrap(), None);
        assert!(fx.repos.is_empty().await);
        assert!(!fx.sync.is_running());

        let seen = fx.seen.lock().await.clone();
        assert_eq!(seen, vec!["show-open-dialog"]);
    }

    #[tokio::test]
    async fn open_path_list_persists_inits_and_starts_sync() {
        let list_file = std::env::temp_dir().join(format!(
            "repodeck-menu-test-{}.txt",
            std::process::id()
        ));
        std::fs::write(&list_file, "/srv/alpha\n\n  /srv/beta \n").unwrap();

        let fx = fixture(HostScript {
            dialog_result: Some(vec![list_file.to_string_lossy().to_string()]),
            ..Default::default()
        });

        fx.controller
            .handle_menu_event(click(item::OPEN_PATH_LIST, None))
            .await
            .unwrap();

        assert_eq!(
            fx.prefs.get(PREF_PATHS).await.unwrap(),
            Some(serde_json::json!(["/srv/alpha", "/srv/beta"]))
        );

        let entries = fx.repos.entries().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "alpha");
        assert!(fx.sync.is_running());

        let _ = std::fs::remove_file(&list_file);
    }

    #[tokio::test]
    async fn unreadable_path_list_file_propagates() {
        let fx = fixture(HostScript {
            dialog_result: Some(vec!["/definitely/not/here/paths.txt".into()]),
            ..Default::default()
        });

        let err = fx
            .controller
            .handle_menu_event(click(item::OPEN_PATH_LIST, None))
            .await
            .unwrap_err();
        assert!(matches!(err, MenuError::Io { .. }));

        // Nothing downstream of the failed read happened
        assert_eq!(fx.prefs.get(PREF_PATHS).await.unwrap(), None);
        assert!(fx.repos.is_empty().await);
        assert!(!fx.sync.is_running());
    }

    #[tokio::test]
    async fn history_items_navigate_relative() {
        let fx = fixture(HostScript::default());

        fx.controller
            .handle_menu_event(click(item::HISTORY_BACK, None))
            .await
            .unwrap();
        fx.controller
            .handle_menu_event(click(item::HISTORY_FORWARD, None))
            .await
            .unwrap();
        fx.settle().await;

        let seen = fx.seen.lock().await.clone();
        assert_eq!(seen, vec!["navigate:-1", "navigate:1"]);
    }

    #[tokio::test]
    async fn role_items_delegate_to_host() {
        let fx = fixture(HostScript::default());

        fx.controller
            .handle_menu_event(click(item::QUIT, None))
            .await
            .unwrap();
        fx.controller
            .handle_menu_event(click(item::TOGGLE_DEVTOOLS, None))
            .await
            .unwrap();
        fx.controller
            .handle_menu_event(click("no-such-item", None))
            .await
            .unwrap();
        fx.settle().await;

        let seen = fx.seen.lock().await.clone();
        assert_eq!(seen, vec!["role:Quit", "role:ToggleDevTools"]);
    }

    #[tokio::test]
    async fn context_menu_runs_selected_role() {
        let fx = fixture(HostScript {
            context_selection: Some(item::COPY.into()),
            ..Default::default()
        });

        let target = ElementTarget {
            disabled: false,
            classes: vec!["input".into()],
        };
        let selected = fx
            .controller
            .handle_context_menu_request(target)
            .await
            .unwrap();
        assert_eq!(selected.as_deref(), Some(item::COPY));
        fx.settle().await;

        let seen = fx.seen.lock().await.clone();
        assert_eq!(seen, vec!["show-context-menu:4", "role:Copy"]);
    }

    #[tokio::test]
    async fn context_menu_suppressed_for_disabled_target() {
        let fx = fixture(HostScript {
            context_selection: Some(item::COPY.into()),
            ..Default::default()
        });

        let target = ElementTarget {
            disabled: true,
            classes: vec!["textarea".into()],
        };
        let selected = fx
            .controller
            .handle_context_menu_request(target)
            .await
            .unwrap();
        assert_eq!(selected, None);
        assert!(fx.seen.lock().await.is_empty());
    }
}
