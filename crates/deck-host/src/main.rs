use anyhow::{Context, Result};
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::env;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tao::event::{Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder};
use tao::window::WindowBuilder;
use wry::http::{Response, StatusCode};
use wry::WebViewBuilder;

use deck_menu::{ElementTarget, HostCmd, MenuController, Role};
use deck_repos::{RepoRegistry, SyncScheduler};
use deck_storage::PrefStore;

mod crash;

/// How often the event loop wakes to drain the menu-event channel
const MENU_POLL_INTERVAL: Duration = Duration::from_millis(50);

const START_URL: &str = "app://index.html";

#[derive(Debug, Deserialize, Clone)]
pub struct Manifest {
    pub app: App,
    pub window: Option<WindowCfg>,
    pub sync: Option<SyncCfg>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct App {
    pub name: String,
    pub identifier: String,
    pub version: String,
    pub crash_reporting: Option<bool>,
    pub crash_report_dir: Option<String>,
    pub tray_icon: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct WindowCfg {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub resizable: Option<bool>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SyncCfg {
    pub interval_secs: Option<u64>,
}

fn preload_js() -> &'static str {
    include_str!("preload.js")
}

fn mime_for(path: &str) -> &'static str {
    if let Some(ext) = std::path::Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
    {
        match ext {
            "html" | "htm" => "text/html; charset=utf-8",
            "js" | "mjs" => "text/javascript; charset=utf-8",
            "css" => "text/css; charset=utf-8",
            "json" => "application/json",
            "svg" => "image/svg+xml",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "ico" => "image/x-icon",
            "txt" => "text/plain; charset=utf-8",
            _ => "application/octet-stream",
        }
    } else {
        "application/octet-stream"
    }
}

// ============================================================================
// Muda Menu Construction
// ============================================================================

/// Mapping from muda's internal ids back to template items, plus the kept
/// checkbox handles so events can report the toolkit-toggled state.
#[derive(Default)]
struct MenuIndex {
    ids: HashMap<muda::MenuId, (String, String)>, // MenuId -> (item id, label)
    checks: HashMap<muda::MenuId, muda::CheckMenuItem>,
}

impl MenuIndex {
    fn register(&mut self, id: &muda::MenuId, item: &deck_menu::MenuItem) {
        let user_id = item.id.clone().unwrap_or_else(|| item.label.clone());
        self.ids.insert(id.clone(), (user_id, item.label.clone()));
    }
}

fn append_menu_items(menu: &muda::Menu, items: &[deck_menu::MenuItem], index: &mut MenuIndex) {
    for item in items {
        if item.item_type.as_deref() == Some("separator") {
            let _ = menu.append(&muda::PredefinedMenuItem::separator());
        } else if let Some(ref submenu_items) = item.submenu {
            let submenu = muda::Submenu::new(&item.label, item.enabled.unwrap_or(true));
            append_submenu_items(&submenu, submenu_items, index);
            let _ = menu.append(&submenu);
        } else if item.item_type.as_deref() == Some("checkbox") {
            let check_item = muda::CheckMenuItem::new(
                &item.label,
                item.enabled.unwrap_or(true),
                item.checked.unwrap_or(false),
                item.accelerator.as_ref().and_then(|a| a.parse().ok()),
            );
            index.register(check_item.id(), item);
            index.checks.insert(check_item.id().clone(), check_item.clone());
            let _ = menu.append(&check_item);
        } else {
            let menu_item = muda::MenuItem::new(
                &item.label,
                item.enabled.unwrap_or(true),
                item.accelerator.as_ref().and_then(|a| a.parse().ok()),
            );
            index.register(menu_item.id(), item);
            let _ = menu.append(&menu_item);
        }
    }
}

fn append_submenu_items(
    submenu: &muda::Submenu,
    items: &[deck_menu::MenuItem],
    index: &mut MenuIndex,
) {
    for item in items {
        if item.item_type.as_deref() == Some("separator") {
            let _ = submenu.append(&muda::PredefinedMenuItem::separator());
        } else if let Some(ref nested_items) = item.submenu {
            let nested = muda::Submenu::new(&item.label, item.enabled.unwrap_or(true));
            append_submenu_items(&nested, nested_items, index);
            let _ = submenu.append(&nested);
        } else if item.item_type.as_deref() == Some("checkbox") {
            let check_item = muda::CheckMenuItem::new(
                &item.label,
                item.enabled.unwrap_or(true),
                item.checked.unwrap_or(false),
                item.accelerator.as_ref().and_then(|a| a.parse().ok()),
            );
            index.register(check_item.id(), item);
            index.checks.insert(check_item.id().clone(), check_item.clone());
            let _ = submenu.append(&check_item);
        } else {
            let menu_item = muda::MenuItem::new(
                &item.label,
                item.enabled.unwrap_or(true),
                item.accelerator.as_ref().and_then(|a| a.parse().ok()),
            );
            index.register(menu_item.id(), item);
            let _ = submenu.append(&menu_item);
        }
    }
}

// ============================================================================
// Tray Icon
// ============================================================================

/// Simple gray square used when no icon is configured or decoding fails
fn default_tray_icon() -> tray_icon::Icon {
    let size = 22u32;
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    for _ in 0..(size * size) {
        rgba.extend_from_slice(&[128, 128, 128, 255]);
    }
    tray_icon::Icon::from_rgba(rgba, size, size).expect("Failed to create default icon")
}

fn load_tray_icon(app_dir: &std::path::Path, icon_path: Option<&str>) -> tray_icon::Icon {
    let Some(icon_path) = icon_path else {
        return default_tray_icon();
    };

    let full_path = if std::path::Path::new(icon_path).is_absolute() {
        PathBuf::from(icon_path)
    } else {
        app_dir.join(icon_path)
    };

    let bytes = match std::fs::read(&full_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to read icon file {:?}: {}", full_path, e);
            return default_tray_icon();
        }
    };

    match image::load_from_memory(&bytes) {
        Ok(img) => {
            // 22x22 is the standard macOS menu bar size
            let resized = img.resize_exact(22, 22, image::imageops::FilterType::Lanczos3);
            let rgba = resized.to_rgba8();
            let (width, height) = rgba.dimensions();
            match tray_icon::Icon::from_rgba(rgba.into_raw(), width, height) {
                Ok(icon) => icon,
                Err(e) => {
                    tracing::warn!("Failed to create icon from decoded image: {}", e);
                    default_tray_icon()
                }
            }
        }
        Err(e) => {
            tracing::warn!("Failed to decode image {:?}: {}", full_path, e);
            default_tray_icon()
        }
    }
}

// ============================================================================
// Entry Point
// ============================================================================

fn main() -> Result<()> {
    // Create the tokio runtime manually so the tao event loop on the main
    // thread and the controller tasks on worker threads share one runtime.
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");

    sync_main(rt)
}

fn sync_main(rt: tokio::runtime::Runtime) -> Result<()> {
    // DECK_LOG controls the log level, default "info"
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_env("DECK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    // Parse args: --app-dir <dir> --dev
    let mut args = env::args().skip(1);
    let mut app_dir = PathBuf::from("app");
    let mut dev_mode = false;
    while let Some(a) = args.next() {
        match a.as_str() {
            "--app-dir" => {
                app_dir = PathBuf::from(args.next().expect("--app-dir requires a path"));
            }
            "--dev" => {
                dev_mode = true;
            }
            _ => {}
        }
    }

    let manifest_path = app_dir.join("manifest.app.toml");
    let manifest_txt = rt
        .block_on(tokio::fs::read_to_string(&manifest_path))
        .with_context(|| format!("reading manifest at {}", manifest_path.display()))?;
    let manifest: Manifest = toml::from_str(&manifest_txt).context("parsing manifest")?;

    tracing::info!("Starting {} v{}", manifest.app.name, manifest.app.version);
    if dev_mode {
        tracing::info!("Running in dev mode - relaxed content security policy");
    }

    let crash_report_dir = manifest
        .app
        .crash_report_dir
        .clone()
        .unwrap_or_else(|| app_dir.join("crashes").to_string_lossy().to_string());
    crash::init_crash_reporting(
        manifest.app.crash_reporting.unwrap_or(false),
        &crash_report_dir,
        &manifest.app.name,
    );

    // Shared state: preference store, repo registry, sync scheduler
    let prefs = rt
        .block_on(PrefStore::open(&manifest.app.identifier))
        .context("opening preference store")?;

    let repos = std::sync::Arc::new(RepoRegistry::new());
    let sync_interval = manifest
        .sync
        .as_ref()
        .and_then(|s| s.interval_secs)
        .unwrap_or(300);
    let sync = std::sync::Arc::new(SyncScheduler::new(
        Duration::from_secs(sync_interval),
        repos.clone(),
    ));

    // Channels: controller -> host commands, host -> controller events,
    // renderer -> controller IPC
    let (host_tx, mut host_rx) = tokio::sync::mpsc::channel::<HostCmd>(64);
    let (menu_events_tx, mut menu_events_rx) = tokio::sync::mpsc::channel::<deck_menu::MenuEvent>(64);
    let (renderer_tx, mut renderer_rx) =
        tokio::sync::mpsc::channel::<(String, serde_json::Value)>(256);

    let controller = MenuController::new(host_tx, prefs.clone(), repos.clone(), sync.clone());

    enum UserEvent {
        Host(HostCmd),
    }

    let event_loop: EventLoop<UserEvent> = EventLoopBuilder::with_user_event().build();
    let proxy = event_loop.create_proxy();

    // Forward controller commands into the event loop
    rt.spawn(async move {
        while let Some(cmd) = host_rx.recv().await {
            let _ = proxy.send_event(UserEvent::Host(cmd));
        }
    });

    // Controller task: install the menu, re-seed tracked repos from the last
    // loaded path list, then serve menu and renderer events.
    rt.spawn({
        let controller = controller.clone();
        let prefs = prefs.clone();
        let repos = repos.clone();
        let sync = sync.clone();
        async move {
            if let Err(e) = controller.install_app_menu().await {
                tracing::error!("failed to install application menu: {e}");
            }

            match prefs.get(deck_menu::PREF_PATHS).await {
                Ok(Some(value)) => match serde_json::from_value::<Vec<String>>(value) {
                    Ok(paths) if !paths.is_empty() => match repos.init(&paths).await {
                        Ok(count) => {
                            sync.start_timer();
                            tracing::info!(repos = count, "restored tracked repos");
                        }
                        Err(e) => tracing::error!("failed to restore repos: {e}"),
                    },
                    Ok(_) => {}
                    Err(e) => tracing::warn!("stored path list is malformed: {e}"),
                },
                Ok(None) => {}
                Err(e) => tracing::warn!("failed to read stored path list: {e}"),
            }

            loop {
                tokio::select! {
                    maybe_event = menu_events_rx.recv() => {
                        let Some(event) = maybe_event else { break };
                        if let Err(e) = controller.handle_menu_event(event).await {
                            tracing::error!("menu action failed: {e}");
                        }
                    }
                    maybe_ipc = renderer_rx.recv() => {
                        let Some((channel, payload)) = maybe_ipc else { break };
                        match channel.as_str() {
                            // A context menu stays pending until the user picks an
                            // entry or the next popup supersedes it, so each
                            // request gets its own task.
                            "contextmenu" => match serde_json::from_value::<ElementTarget>(payload) {
                                Ok(target) => {
                                    let controller = controller.clone();
                                    tokio::task::spawn(async move {
                                        if let Err(e) =
                                            controller.handle_context_menu_request(target).await
                                        {
                                            tracing::error!("context menu failed: {e}");
                                        }
                                    });
                                }
                                Err(e) => tracing::warn!("malformed contextmenu payload: {e}"),
                            },
                            other => tracing::debug!(channel = other, "renderer event"),
                        }
                    }
                }
            }
        }
    });

    // Main window + webview
    let window_cfg = manifest.window.clone().unwrap_or_default();
    let window = WindowBuilder::new()
        .with_title(&manifest.app.name)
        .with_inner_size(tao::dpi::LogicalSize::new(
            window_cfg.width.unwrap_or(1024),
            window_cfg.height.unwrap_or(768),
        ))
        .with_resizable(window_cfg.resizable.unwrap_or(true))
        .build(&event_loop)
        .context("creating main window")?;

    let mut builder = WebViewBuilder::new()
        .with_initialization_script(preload_js())
        .with_devtools(true);

    // IPC: renderer -> controller
    let renderer_tx_for_ipc = renderer_tx.clone();
    builder = builder.with_ipc_handler(move |msg| {
        if let Ok(val) = serde_json::from_str::<serde_json::Value>(msg.body()) {
            let channel = val
                .get("channel")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string();
            let payload = val.get("payload").cloned().unwrap_or(serde_json::json!(null));
            let _ = renderer_tx_for_ipc.try_send((channel, payload));
        }
    });

    // Custom app:// protocol serving <app-dir>/web
    let web_dir = app_dir.join("web");
    let is_dev_mode = dev_mode;
    builder = builder.with_custom_protocol("app".into(), move |_ctx, request| {
        let uri = request.uri().to_string();
        let mut path = uri
            .strip_prefix("app://")
            .unwrap_or("")
            .trim_start_matches('/')
            .trim_end_matches('/');

        // The browser resolves relative resources against the document URL,
        // producing paths like "index.html/style.css"
        if let Some(slash_pos) = path.find('/') {
            let first_part = &path[..slash_pos];
            if first_part.ends_with(".html") || first_part.ends_with(".htm") {
                path = &path[slash_pos + 1..];
            }
        }

        let csp = if is_dev_mode {
            "default-src 'self' app:; \
             script-src 'self' app: 'unsafe-inline' 'unsafe-eval'; \
             style-src 'self' app: 'unsafe-inline'; \
             connect-src 'self' app: http://localhost:* http://127.0.0.1:*; \
             img-src 'self' app: data: blob:;"
        } else {
            "default-src 'self' app:; \
             script-src 'self' app:; \
             style-src 'self' app: 'unsafe-inline'; \
             img-src 'self' app: data: blob:; \
             connect-src 'self' app:;"
        };

        let file_path = web_dir.join(path);
        if file_path.exists() {
            match std::fs::read(&file_path) {
                Ok(bytes) => {
                    return Response::builder()
                        .status(StatusCode::OK)
                        .header("Content-Type", mime_for(path))
                        .header("Content-Security-Policy", csp)
                        .header("X-Content-Type-Options", "nosniff")
                        .body(Cow::Owned(bytes))
                        .unwrap();
                }
                Err(e) => {
                    tracing::error!("Failed to read {}: {}", file_path.display(), e);
                }
            }
        }

        Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(Cow::Owned(format!("Not found: {}", path).into_bytes()))
            .unwrap()
    });

    builder = builder.with_url(START_URL);
    let webview = builder.build(&window).context("creating webview")?;

    tracing::info!("Main window ready at {}", START_URL);

    // Event loop state
    let mut menu_index = MenuIndex::default();
    #[allow(unused_assignments)]
    let mut _app_menu: Option<muda::Menu> = None;
    let mut tray: Option<tray_icon::TrayIcon> = None;

    // Pending context menu: the muda ids of the open popup plus the
    // responder resolved by the eventual selection
    struct PendingContextMenu {
        ids: HashSet<muda::MenuId>,
        respond: tokio::sync::oneshot::Sender<Option<String>>,
        _menu: muda::Menu,
    }
    let mut pending_ctx: Option<PendingContextMenu> = None;

    let app_dir_for_loop = app_dir.clone();
    let manifest_for_loop = manifest.clone();

    event_loop.run(move |event, _event_loop_target, control| {
        // Menu clicks arrive on muda's own channel, so wake on a short
        // cadence to drain it even when the window is idle.
        *control = ControlFlow::WaitUntil(Instant::now() + MENU_POLL_INTERVAL);

        match event {
            Event::MainEventsCleared => {
                while let Ok(menu_event) = muda::MenuEvent::receiver().try_recv() {
                    // Context menu selections resolve the pending popup and
                    // are not forwarded as app menu events
                    if let Some(pending) = pending_ctx.as_ref() {
                        if pending.ids.contains(&menu_event.id) {
                            if let Some(pending) = pending_ctx.take() {
                                let selected = menu_index
                                    .ids
                                    .get(&menu_event.id)
                                    .map(|(item_id, _)| item_id.clone());
                                tracing::debug!(selected = ?selected, "context menu selection");
                                let _ = pending.respond.send(selected);
                            }
                            continue;
                        }
                    }

                    if let Some((item_id, label)) = menu_index.ids.get(&menu_event.id) {
                        let checked = menu_index
                            .checks
                            .get(&menu_event.id)
                            .map(|c| c.is_checked());
                        tracing::debug!(item = %item_id, checked = ?checked, "menu event");
                        let _ = menu_events_tx.try_send(deck_menu::MenuEvent {
                            menu_id: "app".to_string(),
                            item_id: item_id.clone(),
                            label: label.clone(),
                            checked,
                        });
                    } else {
                        tracing::warn!("menu event for unknown id: {:?}", menu_event.id);
                    }
                }
            }

            Event::UserEvent(UserEvent::Host(cmd)) => match cmd {
                HostCmd::ShowOpenDialog { opts, respond } => {
                    let mut dialog = rfd::FileDialog::new();

                    if let Some(title) = &opts.title {
                        dialog = dialog.set_title(title);
                    }
                    if let Some(path) = &opts.default_path {
                        dialog = dialog.set_directory(path);
                    }
                    if let Some(filters) = &opts.filters {
                        for filter in filters {
                            let extensions: Vec<&str> =
                                filter.extensions.iter().map(|s| s.as_str()).collect();
                            dialog = dialog.add_filter(&filter.name, &extensions);
                        }
                    }

                    let result = if opts.directory.unwrap_or(false) {
                        dialog
                            .pick_folder()
                            .map(|p| vec![p.to_string_lossy().to_string()])
                    } else if opts.multiple.unwrap_or(false) {
                        dialog.pick_files().map(|paths| {
                            paths
                                .into_iter()
                                .map(|p| p.to_string_lossy().to_string())
                                .collect()
                        })
                    } else {
                        dialog
                            .pick_file()
                            .map(|p| vec![p.to_string_lossy().to_string()])
                    };

                    let _ = respond.send(result);
                }

                HostCmd::SetAppMenu { items, respond } => {
                    menu_index = MenuIndex::default();

                    let menu = muda::Menu::new();
                    append_menu_items(&menu, &items, &mut menu_index);
                    tracing::debug!(
                        "registered {} menu items for event tracking",
                        menu_index.ids.len()
                    );

                    #[cfg(target_os = "macos")]
                    {
                        menu.init_for_nsapp();
                    }

                    #[cfg(target_os = "windows")]
                    {
                        use tao::platform::windows::WindowExtWindows;
                        unsafe {
                            let _ = menu.init_for_hwnd(window.hwnd() as isize);
                        }
                    }

                    #[cfg(target_os = "linux")]
                    {
                        use gtk::prelude::*;
                        use tao::platform::unix::WindowExtUnix;
                        let gtk_win = window.gtk_window();
                        let gtk_win_ref: &gtk::Window = gtk_win.upcast_ref();
                        let _ = menu.init_for_gtk_window(gtk_win_ref, None::<&gtk::Box>);
                    }

                    _app_menu = Some(menu);
                    tracing::info!("Set app menu with {} groups", items.len());
                    let _ = respond.send(true);
                }

                HostCmd::ShowContextMenu { items, respond } => {
                    use muda::ContextMenu;

                    // A superseded popup resolves as "nothing selected"
                    if let Some(old) = pending_ctx.take() {
                        let _ = old.respond.send(None);
                    }

                    if items.is_empty() {
                        let _ = respond.send(None);
                        return;
                    }

                    let menu = muda::Menu::new();
                    let before: HashSet<muda::MenuId> =
                        menu_index.ids.keys().cloned().collect();
                    append_menu_items(&menu, &items, &mut menu_index);
                    let ids: HashSet<muda::MenuId> = menu_index
                        .ids
                        .keys()
                        .filter(|id| !before.contains(*id))
                        .cloned()
                        .collect();

                    #[cfg(target_os = "macos")]
                    {
                        use tao::platform::macos::WindowExtMacOS;
                        unsafe {
                            menu.show_context_menu_for_nsview(
                                window.ns_view() as _,
                                None::<muda::dpi::Position>,
                            );
                        }
                    }

                    #[cfg(target_os = "windows")]
                    {
                        use tao::platform::windows::WindowExtWindows;
                        unsafe {
                            menu.show_context_menu_for_hwnd(
                                window.hwnd() as isize,
                                None::<muda::dpi::Position>,
                            );
                        }
                    }

                    #[cfg(target_os = "linux")]
                    {
                        use gtk::prelude::*;
                        use tao::platform::unix::WindowExtUnix;
                        let gtk_win = window.gtk_window();
                        let gtk_win_ref: &gtk::Window = gtk_win.upcast_ref();
                        menu.show_context_menu_for_gtk_window(
                            gtk_win_ref,
                            None::<muda::dpi::Position>,
                        );
                    }

                    tracing::debug!("showed context menu with {} items", items.len());
                    pending_ctx = Some(PendingContextMenu {
                        ids,
                        respond,
                        _menu: menu,
                    });
                }

                HostCmd::CreateTray { respond } => {
                    if tray.is_some() {
                        let _ = respond.send(true);
                    } else {
                        let icon = load_tray_icon(
                            &app_dir_for_loop,
                            manifest_for_loop.app.tray_icon.as_deref(),
                        );
                        let built = tray_icon::TrayIconBuilder::new()
                            .with_icon(icon)
                            .with_tooltip(&manifest_for_loop.app.name)
                            .build();
                        match built {
                            Ok(t) => {
                                tray = Some(t);
                                tracing::info!("Created tray icon");
                                let _ = respond.send(true);
                            }
                            Err(e) => {
                                tracing::error!("Failed to create tray: {}", e);
                                let _ = respond.send(false);
                            }
                        }
                    }
                }

                HostCmd::DestroyTray { respond } => {
                    let existed = tray.take().is_some();
                    if existed {
                        tracing::info!("Destroyed tray icon");
                    }
                    let _ = respond.send(existed);
                }

                HostCmd::IsTrayActive { respond } => {
                    let _ = respond.send(tray.is_some());
                }

                HostCmd::SetSkipTaskbar { skip } => {
                    #[cfg(target_os = "windows")]
                    {
                        use tao::platform::windows::WindowExtWindows;
                        let _ = window.set_skip_taskbar(skip);
                        tracing::debug!(skip, "skip taskbar updated");
                    }

                    #[cfg(target_os = "linux")]
                    {
                        use tao::platform::unix::WindowExtUnix;
                        let _ = window.set_skip_taskbar(skip);
                        tracing::debug!(skip, "skip taskbar updated");
                    }

                    #[cfg(target_os = "macos")]
                    {
                        tracing::debug!(skip, "skip taskbar is not supported on macOS");
                    }
                }

                HostCmd::ApplyTheme { dark } => {
                    let js = format!(
                        "document.documentElement.classList.toggle('dark', {});",
                        dark
                    );
                    let _ = webview.evaluate_script(&js);
                    tracing::debug!(dark, "theme applied");
                }

                HostCmd::NavigateHistory { delta } => {
                    let _ = webview.evaluate_script(&format!("history.go({});", delta));
                    tracing::debug!(delta, "history navigation");
                }

                HostCmd::RunRole { role } => match role {
                    Role::Quit => {
                        tracing::info!("Quit requested");
                        *control = ControlFlow::Exit;
                    }
                    Role::Reload => {
                        let _ = webview.evaluate_script("window.location.reload();");
                    }
                    Role::ForceReload => {
                        // No cache-bypassing reload in the webview; a fresh
                        // load of the start URL tears the page down instead
                        let _ = webview.load_url(START_URL);
                    }
                    Role::ToggleDevTools => {
                        if webview.is_devtools_open() {
                            webview.close_devtools();
                        } else {
                            webview.open_devtools();
                        }
                    }
                    Role::Cut => {
                        let _ = webview.evaluate_script("document.execCommand('cut');");
                    }
                    Role::Copy => {
                        let _ = webview.evaluate_script("document.execCommand('copy');");
                    }
                    Role::Paste => {
                        let _ = webview.evaluate_script("document.execCommand('paste');");
                    }
                    Role::Delete => {
                        let _ = webview.evaluate_script("document.execCommand('delete');");
                    }
                },
            },

            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                tracing::info!("Main window closed");
                *control = ControlFlow::Exit;
            }

            _ => {}
        }
    });
}
