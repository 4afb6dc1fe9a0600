mod app;

use app::UiApp;
use eframe::NativeOptions;
use std::path::PathBuf;
use tumor_core::AppConfig;

fn main() {
    tracing_subscriber::fmt::init();
    let config_path = config_path();
    let (stored, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => {
            tracing::warn!("config ignored: {e:#}");
            (AppConfig::default(), Some(format!("{e:#}")))
        }
    };
    let mut config = stored.clone();
    config.apply_env_overrides();

    let options = NativeOptions::default();
    if let Err(e) = eframe::run_native(
        "Brain Tumor Detection",
        options,
        Box::new(move |_cc| {
            let mut app = UiApp::new(stored, config, config_path);
            if let Some(msg) = load_error {
                app.set_status(format!("Configuration ignored: {msg}"));
            }
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(Box::new(app))
        }),
    ) {
        eprintln!("Application stopped with error: {e}");
    }
}

fn config_path() -> PathBuf {
    directories_next::ProjectDirs::from("org", "BrainScan", "BrainScan")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}
