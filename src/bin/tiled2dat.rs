use anyhow::{bail, Context};
use std::path::PathBuf;
use tiled_dat_export::{decode_map_file_to_ir, ExportConfig, FormatRegistry};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: tiled2dat <map.json> [output.dat] [--config <config.json>]";

struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut positional = Vec::new();
    let mut config = None;

    let mut it = std::env::args_os().skip(1);
    while let Some(arg) = it.next() {
        match arg.to_str() {
            Some("--config") => {
                let path = it.next().context("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            Some("-h") | Some("--help") => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let mut positional = positional.into_iter();
    let Some(input) = positional.next() else {
        bail!("{USAGE}");
    };
    let output = positional.next();
    if positional.next().is_some() {
        bail!("{USAGE}");
    }

    Ok(Args {
        input,
        output,
        config,
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => ExportConfig::from_json_file(path)
            .with_context(|| format!("Loading export config {}", path.display()))?,
        None => ExportConfig::default(),
    };
    let extension = config.extension.clone();
    let registry = FormatRegistry::with_dat(config);

    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension(&extension));
    let format = registry
        .for_path(&output)
        .with_context(|| format!("No export format registered for {}", output.display()))?;

    let (map, _) = decode_map_file_to_ir(&args.input)
        .with_context(|| format!("Reading map file {}", args.input.display()))?;

    let diagnostics = format
        .write(&map, &output)
        .with_context(|| format!("Exporting {} as {}", args.input.display(), format.name()))?;

    info!(
        "{} -> {} ({} warnings)",
        args.input.display(),
        output.display(),
        diagnostics.len()
    );
    Ok(())
}
