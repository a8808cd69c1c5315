mod app;
mod canvas;
mod config;
mod export;
mod geometry;
mod loader;
mod manager;
mod mapping;
mod panel;
mod selection;
mod viewport;

use std::ffi::OsString;
use std::path::PathBuf;

use app::RegionViewApp;
use config::AppConfig;

/// Positional arguments are images to open on startup. Flags are not
/// understood and are skipped.
fn startup_paths<I>(args: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .filter(|arg| {
            let is_flag = arg.to_str().is_some_and(|s| s.starts_with('-') && s.len() > 1);
            if is_flag {
                tracing::warn!("ignoring unknown option {:?}", arg);
            }
            !is_flag
        })
        .map(PathBuf::from)
        .collect()
}

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = AppConfig::load();
    let zoom_sensitivity = config::resolve_zoom_sensitivity(&config);
    tracing::debug!("zoom sensitivity {}", zoom_sensitivity);
    let paths = startup_paths(std::env::args_os().skip(1));

    let width = config.window_width.unwrap_or(1280.0);
    let height = config.window_height.unwrap_or(800.0);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("regionview")
            .with_app_id("regionview")
            .with_inner_size([width, height])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "regionview",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(RegionViewApp::new(
                cc,
                config,
                zoom_sensitivity,
                paths,
            )))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::startup_paths;
    use std::ffi::OsString;
    use std::path::PathBuf;

    #[test]
    fn startup_paths_keeps_positional_arguments() {
        let args = ["a.png", "--verbose", "dir/b.jpg", "-"].map(OsString::from);
        assert_eq!(
            startup_paths(args),
            vec![
                PathBuf::from("a.png"),
                PathBuf::from("dir/b.jpg"),
                PathBuf::from("-"),
            ]
        );
    }

    #[test]
    fn startup_paths_handles_no_arguments() {
        assert!(startup_paths(Vec::<OsString>::new()).is_empty());
    }
}
