/// objview - render an OBJ model in the terminal
///
/// Controls:
///   - W/S A/D Space/C: Move the camera
///   - Arrow Keys: Pitch and turn the camera
///   - M: Cycle wireframe / points / fill
///   - T: Cycle the selected texture
///   - Q/ESC: Quit
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use objview_core::{MeshOptions, Model, UvMode};
use objview_terminal::{TerminalApp, ViewerSettings};

#[derive(Parser, Debug)]
#[command(name = "objview", version, about = "Terminal viewer for Wavefront OBJ models")]
struct Cli {
    /// OBJ file to load
    model: PathBuf,

    /// Texture images to cycle through with T
    textures: Vec<PathBuf>,

    /// Use the (x, y) fallback for vertices without texture coordinates
    #[arg(long)]
    planar_uv: bool,

    /// Vertical field of view
    #[arg(long, value_name = "DEGREES", default_value_t = 45.0, value_parser = parse_fov)]
    fov: f32,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Field of view in degrees, strictly between 0 and 180
fn parse_fov(value: &str) -> Result<f32, String> {
    let degrees: f32 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if degrees > 0.0 && degrees < 180.0 {
        Ok(degrees)
    } else {
        Err(format!("{degrees} is outside the range (0, 180)"))
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let options = MeshOptions {
        uv_mode: if cli.planar_uv {
            UvMode::Planar
        } else {
            UvMode::Spherical
        },
    };
    let model = Model::load_with(&cli.model, options)
        .with_context(|| format!("Failed to load {}", cli.model.display()))?;

    let settings = ViewerSettings {
        fov_degrees: cli.fov,
        textures: cli.textures,
    };
    let mut app = TerminalApp::new(&model, settings).context("Failed to start the viewer")?;
    app.run().context("Viewer stopped with an error")?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("objview: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
