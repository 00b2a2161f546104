//! Entry point for objport.
//! Imports OBJ meshes (and optional shaders/texture) and logs what was loaded.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use asset::{library::ModelLibrary, obj, shader::ProgramSource, texture::TextureData};

#[derive(Debug, Default)]
struct Args {
    models: Vec<PathBuf>,
    models_dir: Option<PathBuf>,
    vertex_shader: Option<PathBuf>,
    fragment_shader: Option<PathBuf>,
    texture: Option<PathBuf>,
    strict: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Args {
    // Accept: --model=PATH (repeatable), --models-dir=DIR, --vertex-shader=PATH,
    // --fragment-shader=PATH, --texture=PATH, --strict[=on|off]
    let mut out = Args::default();
    for arg in args {
        if let Some(v) = arg.strip_prefix("--model=") {
            out.models.push(PathBuf::from(v));
        } else if let Some(v) = arg.strip_prefix("--models-dir=") {
            out.models_dir = Some(PathBuf::from(v));
        } else if let Some(v) = arg.strip_prefix("--vertex-shader=") {
            out.vertex_shader = Some(PathBuf::from(v));
        } else if let Some(v) = arg.strip_prefix("--fragment-shader=") {
            out.fragment_shader = Some(PathBuf::from(v));
        } else if let Some(v) = arg.strip_prefix("--texture=") {
            out.texture = Some(PathBuf::from(v));
        } else if arg == "--strict" {
            out.strict = true;
        } else if let Some(v) = arg.strip_prefix("--strict=") {
            out.strict = matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "on" | "yes");
        } else {
            log::warn!("Ignoring unknown argument '{}'", arg);
        }
    }
    out
}

fn import_models(args: &Args) -> Result<()> {
    for path in &args.models {
        let report = obj::import_with_report(path);
        let stats = report.stats();
        log::info!(
            "{}: {} triangles ({} v, {} vt, {} vn, {} faces), {} corners dropped",
            path.display(),
            stats.vertices / 3,
            stats.positions,
            stats.tex_coords,
            stats.normals,
            stats.faces,
            stats.dropped_corners()
        );

        if report.is_empty() {
            bail!("Model could not be loaded: {}", path.display());
        }
        if args.strict && stats.diagnostics() > 0 {
            bail!(
                "{}: {} diagnostics (first: {})",
                path.display(),
                stats.diagnostics(),
                report.diagnostics[0]
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args(std::env::args().skip(1));
    log::info!(
        "Starting objport. models={}, models_dir={:?}, strict={}",
        args.models.len(),
        args.models_dir,
        args.strict
    );

    import_models(&args)?;

    if let Some(dir) = &args.models_dir {
        let library = ModelLibrary::load_digits(dir);
        let missing = library.missing();
        if missing.is_empty() {
            log::info!("All {} digit models loaded from {}", library.len(), dir.display());
        } else {
            log::warn!("Digit models missing in {}: {:?}", dir.display(), missing);
        }
    }

    match (&args.vertex_shader, &args.fragment_shader) {
        (Some(vs), Some(fs)) => {
            let program = ProgramSource::load(vs, fs).context("Failed to load shader program")?;
            log::info!(
                "Shader sources ready ({} + {} bytes)",
                program.vertex.source.len(),
                program.fragment.source.len()
            );
        }
        (None, None) => {}
        _ => bail!("--vertex-shader and --fragment-shader must be given together"),
    }

    if let Some(path) = &args.texture {
        let tex = TextureData::load(path)?;
        log::info!("Texture ready: {}x{}", tex.width, tex.height);
    }

    log::info!("Done.");
    Ok(())
}
