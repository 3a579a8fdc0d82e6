mod app_dir;
mod preview;
mod settings;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};

use smoothbrot_render::{create_backend, Pipeline, RenderResult};

use settings::RenderSettings;

fn settings_path() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(app_dir::default_settings_path)
}

fn run(settings: &RenderSettings) -> Result<RenderResult, Box<dyn std::error::Error>> {
    let backend = create_backend(
        settings.backend,
        settings.workers,
        settings.reserve_orchestrator,
    )?;
    info!(backend = backend.name(), "Backend ready");

    let result = Pipeline::new(backend).render(&settings.view, &settings.colors)?;

    let mut out = io::stdout().lock();
    preview::print(&mut out, &result.colors, settings.preview_width as usize)?;
    Ok(result)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    info!("Starting smoothbrot");

    let path = settings_path();
    let settings = RenderSettings::load(&path);
    if !path.exists() {
        settings.save(&path);
    }

    let view = &settings.view;
    match run(&settings) {
        Ok(result) => {
            let (re_min, re_max) = view.re_bounds();
            let (im_min, im_max) = view.im_bounds();
            println!(
                "re [{re_min}, {re_max}]  im [{im_min}, {im_max}]  {0}x{0}  cap {1}  interior {2}  {3} ms",
                view.resolution(),
                view.iteration_cap(),
                result.orbits.interior_count(),
                result.elapsed.as_millis(),
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Render failed: {e}");
            ExitCode::FAILURE
        }
    }
}
