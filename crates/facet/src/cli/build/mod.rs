//! The `facet build` command.

mod setup;
mod summary;
pub mod types;

pub use types::EmitFormat;

use clap::Args;
use facet_core::{BuildReport, Config, Facet, GenerateOptions, OutputWriter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use setup::apply_overrides;
use summary::{create_progress_bar, print_summary};

/// Arguments for the `build` command.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Source image or directory of source images
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output directory for variants, manifests and the registry
    #[arg(short = 'd', long)]
    pub out_dir: Option<PathBuf>,

    /// URL prefix for every emitted path
    #[arg(long)]
    pub public_path: Option<String>,

    /// Comma-separated breakpoint widths (e.g. 300,600,1200)
    #[arg(short, long, value_delimiter = ',')]
    pub breakpoints: Vec<u32>,

    /// JPEG quality (1-100)
    #[arg(long)]
    pub jpeg_quality: Option<u8>,

    /// Number of parallel workers
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Skip placeholder generation
    #[arg(long)]
    pub no_placeholder: bool,

    /// Re-encode variants even if their files already exist
    #[arg(long)]
    pub force: bool,

    /// Echo the built manifests in this format
    #[arg(short, long, value_enum)]
    pub emit: Option<EmitFormat>,

    /// File for --emit output (defaults to stdout)
    #[arg(short, long, requires = "emit")]
    pub output: Option<PathBuf>,
}

/// Execute the build command.
pub async fn execute(args: BuildArgs, config: Config) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            args.input
        );
    }

    let config = apply_overrides(config, &args)?;
    let registry_path = config.registry_path();
    let facet = Facet::new(config);

    let sources = facet.discover(&args.input);
    if sources.is_empty() {
        tracing::warn!("No supported image files found at {:?}", args.input);
        return Ok(());
    }
    tracing::info!("Found {} source image(s)", sources.len());

    let options = GenerateOptions {
        skip_placeholder: args.no_placeholder,
        force: args.force,
    };

    let progress = create_progress_bar(sources.len() as u64);
    let report = facet
        .build(&sources, &options, |path, _| {
            progress.inc(1);
            if let Some(name) = path.file_name() {
                progress.set_message(name.to_string_lossy().into_owned());
            }
        })
        .await?;
    progress.finish_and_clear();

    if let Some(format) = args.emit {
        emit_manifests(&report, format, args.output.as_deref())?;
    }

    print_summary(&report, &registry_path);

    if !report.is_clean() {
        anyhow::bail!(
            "Build finished with {} failure(s) ({} image(s), {} variant(s))",
            report.failures.len(),
            report.failed_images(),
            report.failed_variants()
        );
    }
    Ok(())
}

/// Write every built manifest to `output` (or stdout).
fn emit_manifests(
    report: &BuildReport,
    format: EmitFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let sink: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = OutputWriter::new(sink, format.into(), true);
    for built in &report.manifests {
        writer.push(built)?;
    }
    let records = writer.records();
    writer.finish()?;

    if let Some(path) = output {
        tracing::info!("Wrote {} {} record(s) to {:?}", records, format, path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_core::{BuiltManifest, Manifest};

    fn report() -> BuildReport {
        let built = |name: &str| BuiltManifest {
            reference: format!("{}.png", name),
            source: PathBuf::from(format!("assets/{}.png", name)),
            location: format!("manifests/{}-00000000.json", name),
            manifest: Manifest {
                name: format!("{}.png", name),
                src: String::new(),
                placeholder: None,
                width: 1,
                height: 1,
                has_alpha: true,
                images: Vec::new(),
            },
        };
        BuildReport {
            manifests: vec![built("a"), built("b")],
            ..BuildReport::default()
        }
    }

    #[test]
    fn test_emit_jsonl_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifests.jsonl");
        emit_manifests(&report(), EmitFormat::Jsonl, Some(&path)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(r#""reference":"a.png""#));
    }

    #[test]
    fn test_emit_json_array_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifests.json");
        emit_manifests(&report(), EmitFormat::Json, Some(&path)).unwrap();

        let parsed: Vec<serde_json::Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1]["location"], "manifests/b-00000000.json");
    }

    #[tokio::test]
    async fn test_execute_missing_input() {
        let args = BuildArgs {
            input: PathBuf::from("/nonexistent/assets"),
            out_dir: None,
            public_path: None,
            breakpoints: Vec::new(),
            jpeg_quality: None,
            parallel: None,
            no_placeholder: false,
            force: false,
            emit: None,
            output: None,
        };
        let err = execute(args, Config::default()).await.unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
