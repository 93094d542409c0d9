use gpui::*;
use gpui_component::{Root, ThemeRegistry};
use mimic_chat::ChatConfig;
use tracing_subscriber::EnvFilter;

use mimic::app::{ChatAppShell, Quit, ToggleSearch, ToggleSidebar, ToggleTheme};
use mimic::theme::{apply_theme, default_themes_path};

/// Bootstraps assets, components, theme and config, then opens the chat window.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ChatConfig::load();
    let initial_theme = config.theme;
    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(move |cx| {
        gpui_tokio_bridge::init(cx);

        // Must run before any Root is created.
        gpui_component::init(cx);

        // A missing ./themes directory is fine; the built-in themes are used.
        if let Err(err) = ThemeRegistry::watch_dir(default_themes_path(), cx, move |cx| {
            apply_theme(initial_theme, None, cx);
            tracing::info!("theme directory watch initialized");
        }) {
            tracing::warn!(
                "failed to watch themes directory: {}. using default themes",
                err
            );
            apply_theme(initial_theme, None, cx);
        }

        cx.on_action(|_: &Quit, cx| {
            cx.quit();
        });

        cx.bind_keys([
            KeyBinding::new("cmd-q", Quit, None),
            KeyBinding::new("cmd-b", ToggleSidebar, None),
            KeyBinding::new("cmd-f", ToggleSearch, None),
            KeyBinding::new("cmd-shift-l", ToggleTheme, None),
        ]);

        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        size(px(1100.), px(780.)),
                        cx,
                    ))),
                    titlebar: Some(TitlebarOptions {
                        appears_transparent: true,
                        traffic_light_position: Some(point(px(9.), px(9.))),
                        ..Default::default()
                    }),
                    // Client decorations on Linux/FreeBSD so the app draws its own title bar.
                    #[cfg(any(target_os = "linux", target_os = "freebsd"))]
                    window_decorations: Some(WindowDecorations::Client),
                    #[cfg(not(any(target_os = "linux", target_os = "freebsd")))]
                    window_decorations: None,
                    ..Default::default()
                };

                let opened = cx.open_window(options, |window, cx| {
                    let shell = cx.new(|cx| ChatAppShell::new(config, window, cx));

                    // gpui-component overlays need a Root at the top of the tree.
                    cx.new(|cx| Root::new(shell, window, cx))
                });

                if let Err(error) = opened {
                    tracing::error!("failed to open main window: {}", error);
                    cx.quit();
                    return;
                }

                cx.activate(true);
            })
        })
        .detach();
    });
}
