mod app;
mod cli;
mod loader;
mod render;
mod report;
mod ui;
mod util;

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use crate::app::DriftnetViewerPlugin;

fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

fn main() -> anyhow::Result<()> {
    let args = cli::parse_args()?;
    let mut cfg = util::config::load_or_default();
    args.apply(&mut cfg);

    if args.headless {
        init_tracing();
        return report::run(&cfg, args.report_ticks());
    }

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "driftnet".into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .add_plugins(DriftnetViewerPlugin { cfg })
        .run();
    Ok(())
}
