//! CLI for `proto-openapi`.
//!
//! # Subcommands
//!
//! ```text
//! # Convert a compiled descriptor set (protoc/buf output)
//! proto-openapi convert --descriptor api.bin -o openapi.yaml --title "Greeter API"
//!
//! # Compile .proto files with protoc, then convert
//! proto-openapi build \
//!   --proto-path proto \
//!   --proto demo/v1/greeter.proto \
//!   -o openapi.json
//!
//! # Print the files, services and RPCs of a descriptor set
//! proto-openapi inspect --descriptor api.bin
//! ```

#![forbid(unsafe_code)]

use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use proto_openapi::{ConvertConfig, DuplicatePaths, OutputFormat, ProjectConfig, ProtoSchema};

/// OpenAPI 3 documents from protobuf descriptor sets.
#[derive(Parser)]
#[command(name = "proto-openapi", version, about)]
struct Cli {
    /// Enable debug logging (`RUST_LOG` is honoured otherwise).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a compiled `FileDescriptorSet` into an OpenAPI document.
    ///
    /// Build the descriptor set with `protoc --include_imports
    /// --include_source_info -o api.bin ...` or
    /// `buf build --as-file-descriptor-set -o api.bin`.
    Convert(ConvertArgs),

    /// Compile `.proto` files with `protoc`, then convert the result.
    ///
    /// Requires `protoc` on `PATH` (or `--protoc`).
    Build(BuildArgs),

    /// Print the files, services, RPCs and type count of a descriptor set.
    Inspect(InspectArgs),
}

#[derive(Args)]
struct ConvertArgs {
    /// Path to the compiled proto `FileDescriptorSet` (binary).
    #[arg(short, long)]
    descriptor: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct BuildArgs {
    /// Include directory passed to `protoc -I`. Repeatable.
    #[arg(short = 'I', long = "proto-path")]
    proto_paths: Vec<PathBuf>,

    /// `.proto` file to compile, relative to an include directory. Repeatable.
    #[arg(short, long = "proto", required = true)]
    protos: Vec<PathBuf>,

    /// `protoc` executable.
    #[arg(long, default_value = "protoc")]
    protoc: PathBuf,

    /// Directory for the intermediate descriptor set.
    #[arg(long, default_value = "target")]
    work_dir: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct InspectArgs {
    /// Path to the compiled proto `FileDescriptorSet` (binary).
    #[arg(short, long)]
    descriptor: PathBuf,
}

/// Output and document settings shared by `convert` and `build`.
#[derive(Args)]
struct OutputArgs {
    /// Output file. Writes to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format. Defaults to the `--output` extension, else YAML.
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Path to a project config YAML file.
    ///
    /// CLI flags override values from the config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// `info.title`. Overrides `title` from the config file.
    #[arg(long)]
    title: Option<String>,

    /// `info.version`. Overrides `version` from the config file.
    #[arg(long, conflicts_with = "cargo_toml")]
    api_version: Option<String>,

    /// Read `info.version` from this `Cargo.toml`.
    #[arg(long, conflicts_with = "api_version")]
    cargo_toml: Option<PathBuf>,

    /// Let a later RPC replace an earlier one with the same path (logs a
    /// warning) instead of failing.
    #[arg(long)]
    allow_duplicate_paths: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Yaml => Self::Yaml,
            Format::Json => Self::Json,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Convert(args) => run_convert(&args),
        Command::Build(args) => run_build(&args),
        Command::Inspect(args) => run_inspect(&args),
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn run_convert(args: &ConvertArgs) -> anyhow::Result<()> {
    let schema = load_descriptor(&args.descriptor)?;
    convert_and_write(&schema, &args.output)
}

fn run_build(args: &BuildArgs) -> anyhow::Result<()> {
    fs::create_dir_all(&args.work_dir)
        .with_context(|| format!("Failed to create work dir: {}", args.work_dir.display()))?;

    let descriptor_path = args.work_dir.join("proto-descriptor.bin");
    info!("Compiling {} proto files...", args.protos.len());
    run_protoc(&args.protoc, &args.proto_paths, &args.protos, &descriptor_path)?;

    let schema = load_descriptor(&descriptor_path)?;
    convert_and_write(&schema, &args.output)
}

fn run_inspect(args: &InspectArgs) -> anyhow::Result<()> {
    let schema = load_descriptor(&args.descriptor)?;

    println!("=== Proto Schema ===");
    println!();
    println!("Types: {}", schema.type_count());

    for file in schema.files() {
        if file.services.is_empty() {
            continue;
        }
        println!();
        println!("{} (package: {})", file.name, display_package(&file.package));
        for service in &file.services {
            println!("  service {}", service.name);
            if let Some(summary) = service.documentation.lines().next() {
                println!("    // {summary}");
            }
            for rpc in &service.rpcs {
                println!(
                    "    {} → POST {}{}",
                    rpc.name,
                    proto_openapi::convert::paths::rpc_path(&file.package, &service.name, &rpc.name),
                    streaming_note(rpc.client_streaming, rpc.server_streaming),
                );
            }
        }
    }

    Ok(())
}

fn load_descriptor(path: &Path) -> anyhow::Result<ProtoSchema> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read descriptor: {}", path.display()))?;
    proto_openapi::load(&bytes)
        .with_context(|| format!("Failed to load descriptor: {}", path.display()))
}

fn convert_and_write(schema: &ProtoSchema, args: &OutputArgs) -> anyhow::Result<()> {
    let project = match &args.config {
        Some(path) => {
            info!("Loading config: {}", path.display());
            ProjectConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?
        }
        None => ProjectConfig::default(),
    };

    let config = ConvertConfig::new().with_project_config(&project);
    let config = apply_cli_overrides(config, args)?;

    let doc = proto_openapi::convert(schema, &config).context("Failed to convert descriptor")?;
    let format = output_format(args.format, args.output.as_deref());

    match &args.output {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("Failed to create output: {}", path.display()))?;
            proto_openapi::write_document(&doc, format, BufWriter::new(file))
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            info!("Wrote OpenAPI document to {}", path.display());
        }
        None => {
            proto_openapi::write_document(&doc, format, io::stdout().lock())
                .context("Failed to write output to stdout")?;
        }
    }

    Ok(())
}

/// Apply CLI flags that override config file values.
fn apply_cli_overrides(
    mut config: ConvertConfig,
    args: &OutputArgs,
) -> anyhow::Result<ConvertConfig> {
    if let Some(ref title) = args.title {
        config = config.title(title);
    }
    if let Some(version) = resolve_version(args.api_version.as_ref(), args.cargo_toml.as_ref())? {
        config = config.version(&version);
    }
    // One-directional: the flag can only relax the policy.
    if args.allow_duplicate_paths {
        config = config.duplicate_paths(DuplicatePaths::Overwrite);
    }
    Ok(config)
}

fn output_format(explicit: Option<Format>, output: Option<&Path>) -> OutputFormat {
    match (explicit, output) {
        (Some(format), _) => format.into(),
        (None, Some(path)) => OutputFormat::from_extension(path),
        (None, None) => OutputFormat::default(),
    }
}

/// Resolve `info.version` from an explicit flag or a `Cargo.toml`.
fn resolve_version(
    explicit: Option<&String>,
    cargo_toml: Option<&PathBuf>,
) -> anyhow::Result<Option<String>> {
    match (explicit, cargo_toml) {
        (Some(v), _) => Ok(Some(v.clone())),
        (None, Some(path)) => read_cargo_version(path).map(Some),
        (None, None) => Ok(None),
    }
}

/// Run `protoc`, writing a descriptor set with imports and source info.
fn run_protoc(
    protoc: &Path,
    proto_paths: &[PathBuf],
    protos: &[PathBuf],
    out: &Path,
) -> anyhow::Result<()> {
    let status = std::process::Command::new(protoc)
        .args(protoc_args(proto_paths, protos, out))
        .status()
        .with_context(|| {
            format!(
                "Failed to run `{}`, is it installed? See https://protobuf.dev/installation/",
                protoc.display()
            )
        })?;

    if !status.success() {
        bail!("`{}` failed with {status}", protoc.display());
    }
    Ok(())
}

fn protoc_args(proto_paths: &[PathBuf], protos: &[PathBuf], out: &Path) -> Vec<String> {
    let mut args = vec![
        "--include_imports".to_string(),
        "--include_source_info".to_string(),
        format!("--descriptor_set_out={}", out.display()),
    ];
    args.extend(proto_paths.iter().map(|p| format!("-I{}", p.display())));
    args.extend(protos.iter().map(|p| p.display().to_string()));
    args
}

/// Read `version` from a Cargo.toml `[package]` or `[workspace.package]`.
fn read_cargo_version(path: &Path) -> anyhow::Result<String> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let doc: toml::Table =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

    if let Some(v) = doc
        .get("package")
        .and_then(|p| p.get("version"))
        .and_then(toml::Value::as_str)
    {
        return Ok(v.to_string());
    }

    if let Some(v) = doc
        .get("workspace")
        .and_then(|w| w.get("package"))
        .and_then(|p| p.get("version"))
        .and_then(toml::Value::as_str)
    {
        return Ok(v.to_string());
    }

    bail!("No version found in {}", path.display());
}

fn display_package(package: &str) -> &str {
    if package.is_empty() {
        "<none>"
    } else {
        package
    }
}

fn streaming_note(client: bool, server: bool) -> &'static str {
    match (client, server) {
        (false, false) => "",
        (true, false) => "  [client streaming]",
        (false, true) => "  [server streaming]",
        (true, true) => "  [bidi streaming]",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Write content to a temporary file and return its path.
    fn write_temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("proto_openapi_test_{name}"));
        fs::write(&path, content).unwrap();
        path
    }

    fn output_args() -> OutputArgs {
        OutputArgs {
            output: None,
            format: None,
            config: None,
            title: None,
            api_version: None,
            cargo_toml: None,
            allow_duplicate_paths: false,
        }
    }

    #[test]
    fn cli_parses_convert() {
        let cli = Cli::try_parse_from([
            "proto-openapi",
            "convert",
            "--descriptor",
            "api.bin",
            "-o",
            "out.json",
            "--allow-duplicate-paths",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Command::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.descriptor, PathBuf::from("api.bin"));
        assert_eq!(args.output.output, Some(PathBuf::from("out.json")));
        assert!(args.output.allow_duplicate_paths);
    }

    #[test]
    fn cli_build_requires_proto() {
        assert!(Cli::try_parse_from(["proto-openapi", "build", "-I", "proto"]).is_err());
    }

    #[test]
    fn cli_version_flags_conflict() {
        let result = Cli::try_parse_from([
            "proto-openapi",
            "convert",
            "--descriptor",
            "api.bin",
            "--api-version",
            "1.0.0",
            "--cargo-toml",
            "Cargo.toml",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn protoc_args_order() {
        let args = protoc_args(
            &[PathBuf::from("proto"), PathBuf::from("third_party")],
            &[PathBuf::from("demo/v1/greeter.proto")],
            Path::new("target/proto-descriptor.bin"),
        );
        assert_eq!(
            args,
            vec![
                "--include_imports",
                "--include_source_info",
                "--descriptor_set_out=target/proto-descriptor.bin",
                "-Iproto",
                "-Ithird_party",
                "demo/v1/greeter.proto",
            ]
        );
    }

    #[test]
    fn output_format_precedence() {
        assert_eq!(
            output_format(Some(Format::Yaml), Some(Path::new("api.json"))),
            OutputFormat::Yaml
        );
        assert_eq!(
            output_format(None, Some(Path::new("api.json"))),
            OutputFormat::Json
        );
        assert_eq!(output_format(None, None), OutputFormat::Yaml);
    }

    #[test]
    fn read_cargo_version_package() {
        let path = write_temp_file(
            "cargo_pkg.toml",
            "[package]\nname = \"test\"\nversion = \"3.2.1\"\n",
        );
        let version = read_cargo_version(&path).unwrap();
        assert_eq!(version, "3.2.1");
    }

    #[test]
    fn read_cargo_version_workspace() {
        let path = write_temp_file(
            "cargo_ws.toml",
            "[workspace.package]\nversion = \"0.5.0\"\nedition = \"2021\"\n",
        );
        let version = read_cargo_version(&path).unwrap();
        assert_eq!(version, "0.5.0");
    }

    #[test]
    fn read_cargo_version_missing_errors() {
        let path = write_temp_file("cargo_no_ver.toml", "[package]\nname = \"test\"\n");
        let result = read_cargo_version(&path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("No version"));
    }

    #[test]
    fn resolve_version_none_without_flags() {
        assert_eq!(resolve_version(None, None).unwrap(), None);
    }

    #[test]
    fn resolve_version_explicit_takes_precedence() {
        let v = "2.0.0".to_string();
        let cargo = PathBuf::from("nonexistent.toml");
        // explicit wins even if cargo_toml is provided
        let result = resolve_version(Some(&v), Some(&cargo)).unwrap();
        assert_eq!(result.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn resolve_version_from_cargo_toml() {
        let path = write_temp_file(
            "cargo_resolve.toml",
            "[package]\nname = \"test\"\nversion = \"4.0.0\"\n",
        );
        let result = resolve_version(None, Some(&path)).unwrap();
        assert_eq!(result.as_deref(), Some("4.0.0"));
    }

    #[test]
    fn overrides_apply_on_top_of_config() {
        let mut args = output_args();
        args.title = Some("CLI Title".to_string());
        args.api_version = Some("9.9.9".to_string());
        args.allow_duplicate_paths = true;

        let config = apply_cli_overrides(ConvertConfig::new().title("File Title"), &args).unwrap();
        let doc = proto_openapi::convert(&ProtoSchema::default(), &config).unwrap();

        let info = doc.info.unwrap();
        assert_eq!(info.title, "CLI Title");
        assert_eq!(info.version, "9.9.9");
    }

    #[test]
    fn streaming_notes() {
        assert_eq!(streaming_note(false, false), "");
        assert_eq!(streaming_note(false, true), "  [server streaming]");
        assert_eq!(streaming_note(true, true), "  [bidi streaming]");
    }
}
