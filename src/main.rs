mod arena;
mod atlas;
mod bake;
mod config;
mod font;
mod sink;

use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let result = config::load_config(config_path.as_deref()).and_then(|config| bake::run(&config));
    match result {
        Ok(summary) => {
            log::info!(
                "Baked {} glyphs into a {}x{} atlas (advance {}px, {} arena bytes held)",
                summary.glyph_count,
                summary.layout.width(),
                summary.layout.height(),
                summary.metrics.advance,
                summary.arena_used
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
