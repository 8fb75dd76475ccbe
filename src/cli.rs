use crate::document::Server;
use crate::generator::generate_document;
use crate::manifest::ApiManifest;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// OpenAPI 3.0 document generator - builds a document from an API manifest of types and endpoints
#[derive(Parser, Debug)]
#[command(name = "oas3-docgen")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the API manifest (.json for JSON, anything else is read as YAML)
    #[arg(value_name = "MANIFEST")]
    pub manifest_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Override the API title from the manifest
    #[arg(long = "title")]
    pub title: Option<String>,

    /// Override the API version from the manifest
    #[arg(long = "api-version", value_name = "VERSION")]
    pub api_version: Option<String>,

    /// Add a server URL (repeatable)
    #[arg(long = "server", value_name = "URL")]
    pub servers: Vec<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.manifest_path.exists() {
        anyhow::bail!(
            "Manifest does not exist: {}",
            args.manifest_path.display()
        );
    }

    if !args.manifest_path.is_file() {
        anyhow::bail!(
            "Manifest is not a file: {}",
            args.manifest_path.display()
        );
    }

    info!("Manifest: {}", args.manifest_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Generate the document described by `args` and return it as text
pub fn render(args: &CliArgs) -> Result<String> {
    info!("Loading manifest...");
    let manifest = ApiManifest::from_path(&args.manifest_path)?;
    let (mut doc_info, graph, endpoints) = manifest
        .into_parts()
        .context("Failed to build types and endpoints from manifest")?;
    info!(
        "Loaded {} endpoints over {} type nodes",
        endpoints.len(),
        graph.len()
    );

    if let Some(title) = &args.title {
        doc_info.info.title = title.clone();
    }
    if let Some(version) = &args.api_version {
        doc_info.info.version = version.clone();
    }
    doc_info
        .servers
        .extend(args.servers.iter().map(Server::new));

    info!("Building OpenAPI document...");
    let document = generate_document(&doc_info, &graph, &endpoints)
        .context("Failed to generate OpenAPI document")?;
    info!(
        "OpenAPI document built: {} paths, {} schemas",
        document.paths.len(),
        document.schemas().map_or(0, |schemas| schemas.len())
    );

    info!("Serializing to {:?} format...", args.output_format);
    match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document),
        OutputFormat::Json => serialize_json(&document),
    }
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting OpenAPI document generation...");
    let content = render(&args)?;

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
info:
  title: Notes
  version: 1.0.0
types:
  Note:
    id: int64
    text: string
endpoints:
  - method: GET
    path: /notes
    name: listNotes
    responses:
      - status: 200
        description: all notes
        contentType: application/json
        type: list<Note>
"#;

    fn args_for(path: PathBuf) -> CliArgs {
        CliArgs::parse_from(["oas3-docgen", path.to_str().unwrap()])
    }

    #[test]
    fn test_default_arguments() {
        let args = CliArgs::parse_from(["oas3-docgen", "api.yaml"]);
        assert_eq!(args.output_format, OutputFormat::Yaml);
        assert!(args.output_path.is_none());
        assert!(args.servers.is_empty());
        assert!(!args.verbose);
    }

    #[test]
    fn test_all_arguments() {
        let args = CliArgs::parse_from([
            "oas3-docgen",
            "api.json",
            "-f",
            "json",
            "-o",
            "out/openapi.json",
            "--title",
            "Renamed",
            "--api-version",
            "9.9.9",
            "--server",
            "https://a.example.com",
            "--server",
            "https://b.example.com",
            "-v",
        ]);
        assert_eq!(args.output_format, OutputFormat::Json);
        assert_eq!(args.output_path, Some(PathBuf::from("out/openapi.json")));
        assert_eq!(args.title.as_deref(), Some("Renamed"));
        assert_eq!(args.api_version.as_deref(), Some("9.9.9"));
        assert_eq!(args.servers.len(), 2);
        assert!(args.verbose);
    }

    #[test]
    fn test_missing_manifest_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let result = parse_args_from_parsed(args_for(temp_dir.path().join("missing.yaml")));
        assert!(result.is_err());

        let result = parse_args_from_parsed(args_for(temp_dir.path().to_path_buf()));
        assert!(result.unwrap_err().to_string().contains("not a file"));
    }

    #[test]
    fn test_render_applies_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let manifest_path = temp_dir.path().join("notes.yaml");
        fs::write(&manifest_path, MANIFEST).unwrap();

        let mut args = args_for(manifest_path);
        args.output_format = OutputFormat::Json;
        args.title = Some("Notes Service".to_string());
        args.servers = vec!["https://notes.example.com".to_string()];

        let json: serde_json::Value = serde_json::from_str(&render(&args).unwrap()).unwrap();
        assert_eq!(json["info"]["title"], "Notes Service");
        assert_eq!(json["info"]["version"], "1.0.0");
        assert_eq!(json["servers"][0]["url"], "https://notes.example.com");
        assert!(json["components"]["schemas"]["Note"].is_object());
    }

    #[test]
    fn test_run_writes_output_file() {
        let temp_dir = TempDir::new().unwrap();
        let manifest_path = temp_dir.path().join("notes.yaml");
        fs::write(&manifest_path, MANIFEST).unwrap();
        let output_path = temp_dir.path().join("out").join("openapi.yaml");

        let mut args = args_for(manifest_path);
        args.output_path = Some(output_path.clone());
        run(args).unwrap();

        let yaml = fs::read_to_string(&output_path).unwrap();
        assert!(yaml.contains("listNotes"));
    }
}
