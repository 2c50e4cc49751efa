use crate::config::load_config;
use crate::error::{ParseError, SceneError, SceneLoadError};
use crate::layout::{Diagnostic, compute_layout};
use crate::layout_dump::write_layout_dump;
use crate::parser::parse_scene;
use crate::render::{render_svg, write_output_png, write_output_svg};
use crate::verify::verify_svg;
use crate::RenderOutput;
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "diagram-layout",
    version,
    about = "Lay out circles, arrows and labels without collisions and emit SVG",
    args_conflicts_with_subcommands = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Scene JSON file or '-' for stdin
    #[arg(short = 's', long = "scene")]
    pub scene: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "out")]
    pub out: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "svg")]
    pub format: OutputFormat,

    /// Config JSON file (theme, themeVariables, layout, render)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Write `{svg, diagnostics}` JSON instead of the bare SVG
    #[arg(long = "json")]
    pub json: bool,

    /// Also write the resolved layout as pretty JSON
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,

    /// Re-check the produced SVG with the collision verifier
    #[arg(long = "verify")]
    pub verify: bool,

    /// Debug logging to stderr (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report collisions in an existing SVG file
    Verify {
        /// SVG file or '-' for stdin
        svg: PathBuf,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    run_with(Args::parse())
}

pub fn run_with(args: Args) -> Result<()> {
    init_tracing(args.verbose);
    match &args.command {
        Some(Command::Verify { svg }) => run_verify(svg),
        None => run_render(&args),
    }
}

fn run_render(args: &Args) -> Result<()> {
    if args.json && args.format == OutputFormat::Png {
        anyhow::bail!("--json can only be combined with SVG output");
    }
    let config = load_config(args.config.as_deref())
        .with_context(|| "failed to load config")?;
    let input = read_input(args.scene.as_deref())?;
    let scene = parse_scene(&input)?;
    let layout = compute_layout(&scene, &config.theme, &config.layout)?;

    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &layout)
            .with_context(|| format!("failed to write layout dump {}", path.display()))?;
    }

    let svg = render_svg(&layout, &config.theme);
    report(&layout.diagnostics);
    if args.verify {
        report(&verify_svg(&svg));
    }

    match args.format {
        OutputFormat::Svg if args.json => {
            let output = RenderOutput {
                svg,
                diagnostics: layout.diagnostics,
            };
            let json = serde_json::to_string_pretty(&output)?;
            write_output_svg(&json, args.out.as_deref())?;
        }
        OutputFormat::Svg => {
            write_output_svg(&svg, args.out.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.out, "png")?;
            write_output_png(&svg, &output, &config.render)?;
        }
    }
    Ok(())
}

fn run_verify(path: &Path) -> Result<()> {
    let svg = read_input(Some(path))?;
    let findings = verify_svg(&svg);
    report(&findings);
    if !findings.is_empty() {
        anyhow::bail!("{} collision(s) found in {}", findings.len(), path.display());
    }
    Ok(())
}

fn report(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("warning: {diagnostic}");
    }
}

/// Process exit status for a failed run: 2 when the scene document could
/// not be decoded, 1 for everything else (invalid geometry, unknown owners,
/// I/O).
pub fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(load) = cause.downcast_ref::<SceneLoadError>() {
            return match load {
                SceneLoadError::Parse(_) => 2,
                SceneLoadError::Scene(_) => 1,
            };
        }
        if cause.downcast_ref::<ParseError>().is_some() {
            return 2;
        }
        if cause.downcast_ref::<SceneError>().is_some() {
            return 1;
        }
    }
    1
}

#[cfg(feature = "tracing")]
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => return,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    // A second init in the same process (tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(not(feature = "tracing"))]
fn init_tracing(_verbose: u8) {}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvalidGeometryError;
    use std::ffi::OsStr;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("diagram-layout-{}-{name}", std::process::id()))
    }

    #[test]
    fn parses_scene_and_out() {
        let args = Args::try_parse_from([
            "diagram-layout",
            "--scene",
            "scene.json",
            "--out",
            "out.svg",
        ])
        .unwrap();
        assert_eq!(args.scene.as_deref(), Some(Path::new("scene.json")));
        assert_eq!(args.out.as_deref(), Some(Path::new("out.svg")));
        assert_eq!(args.format, OutputFormat::Svg);
        assert!(args.command.is_none());
    }

    #[test]
    fn parses_verify_subcommand() {
        let args = Args::try_parse_from(["diagram-layout", "verify", "drawing.svg"]).unwrap();
        match args.command {
            Some(Command::Verify { svg }) => assert_eq!(svg, PathBuf::from("drawing.svg")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn exit_codes_follow_error_kind() {
        let parse: anyhow::Error = SceneLoadError::Parse(ParseError::Invalid("x".into())).into();
        assert_eq!(exit_code(&parse), 2);

        let owner: anyhow::Error =
            SceneLoadError::Scene(SceneError::UnknownOwner { id: "ghost".into() }).into();
        assert_eq!(exit_code(&owner), 1);

        let geometry: anyhow::Error =
            SceneLoadError::from(InvalidGeometryError::new("s", "segment start equals end")).into();
        assert_eq!(exit_code(&geometry), 1);

        let wrapped = anyhow::Error::from(SceneLoadError::Parse(ParseError::Invalid("x".into())))
            .context("loading scene");
        assert_eq!(exit_code(&wrapped), 2);

        assert_eq!(exit_code(&anyhow::anyhow!("io")), 1);
    }

    #[test]
    fn renders_scene_file_to_svg() {
        let scene = temp_path("scene.json");
        let out = temp_path("out.svg");
        let dump = temp_path("dump.json");
        std::fs::write(
            &scene,
            r#"{ "canvas": { "width": 300, "height": 200 },
                 "circles": [ { "id": "q", "center": [100, 100], "radius": 30 } ],
                 "labels": [ { "ownerId": "q", "text": "+Q" } ] }"#,
        )
        .unwrap();
        let args = Args::try_parse_from([
            OsStr::new("diagram-layout"),
            OsStr::new("--scene"),
            scene.as_os_str(),
            OsStr::new("--out"),
            out.as_os_str(),
            OsStr::new("--dump-layout"),
            dump.as_os_str(),
            OsStr::new("--verify"),
        ])
        .unwrap();
        run_with(args).unwrap();

        let svg = std::fs::read_to_string(&out).unwrap();
        assert!(svg.contains(">+Q</text>"));
        assert!(std::fs::read_to_string(&dump).unwrap().contains("\"circles\""));
        for path in [scene, out, dump] {
            let _ = std::fs::remove_file(path);
        }
    }

    #[test]
    fn unknown_owner_maps_to_exit_one() {
        let scene = temp_path("dangling.json");
        std::fs::write(
            &scene,
            r#"{ "canvas": { "width": 10, "height": 10 },
                 "labels": [ { "ownerId": "ghost", "text": "?" } ] }"#,
        )
        .unwrap();
        let out = temp_path("never.svg");
        let args = Args::try_parse_from([
            OsStr::new("diagram-layout"),
            OsStr::new("--scene"),
            scene.as_os_str(),
            OsStr::new("--out"),
            out.as_os_str(),
        ])
        .unwrap();
        let err = run_with(args).unwrap_err();
        assert_eq!(exit_code(&err), 1);
        assert!(err.to_string().contains("ghost"));
        let _ = std::fs::remove_file(scene);
    }
}
