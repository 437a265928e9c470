//! `simforge` - run one generation from the command line and print the result as JSON

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use simforge_artifact::{extract, validate_local};
use simforge_core::prelude::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let kind_arg = Arg::new("kind")
        .long("kind")
        .short('k')
        .default_value("component")
        .help("Output dialect: component or commands");

    Command::new("simforge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate validated interactive-simulation artifacts")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Write logs to stderr as JSON"),
        )
        .subcommand(
            Command::new("generate")
                .about("Plan, generate, validate and refine one artifact")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML config file"),
                )
                .arg(
                    Arg::new("provider")
                        .long("provider")
                        .short('p')
                        .help("Provider: openai, anthropic or ollama"),
                )
                .arg(Arg::new("model").long("model").short('m').help("Model name"))
                .arg(Arg::new("base-url").long("base-url").help("Provider base URL"))
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .value_parser(value_parser!(u64))
                        .help("Per-call timeout in seconds"),
                )
                .arg(kind_arg.clone())
                .arg(
                    Arg::new("image")
                        .long("image")
                        .short('i')
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(PathBuf))
                        .help("Reference image (repeatable)"),
                )
                .arg(
                    Arg::new("max-attempts")
                        .long("max-attempts")
                        .value_parser(value_parser!(u32))
                        .help("Refine cycles allowed (at most 3)"),
                )
                .arg(
                    Arg::new("no-semantic")
                        .long("no-semantic")
                        .action(ArgAction::SetTrue)
                        .help("Skip the AI semantic check"),
                )
                .arg(
                    Arg::new("fail-closed")
                        .long("fail-closed")
                        .action(ArgAction::SetTrue)
                        .help("Reject when the semantic check itself fails"),
                )
                .arg(
                    Arg::new("prompt")
                        .required(true)
                        .num_args(1..)
                        .help("What to build"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Extract and locally validate an artifact file")
                .arg(kind_arg)
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("File with raw model output"),
                ),
        )
        .subcommand(Command::new("config").about("Print the default config as TOML"))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn parse_kind(args: &ArgMatches) -> Result<ArtifactKind> {
    let name = args
        .get_one::<String>("kind")
        .map_or("component", String::as_str);
    Ok(name.parse::<ArtifactKind>()?)
}

fn conventional_key_env(kind: ProviderKind) -> Option<&'static str> {
    match kind {
        ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
        ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
        ProviderKind::Ollama => None,
    }
}

fn load_config(args: &ArgMatches) -> Result<SimForgeConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => SimForgeConfig::load(path)?,
        None => SimForgeConfig::default(),
    };

    if let Some(name) = args.get_one::<String>("provider") {
        let kind: ProviderKind = name.parse()?;
        if kind != config.provider.provider {
            config.provider = ProviderConfig::new(kind);
        }
    }
    if let Some(model) = args.get_one::<String>("model") {
        config.provider.model.clone_from(model);
    }
    if let Some(url) = args.get_one::<String>("base-url") {
        config.provider.base_url = Some(url.clone());
    }
    if let Some(secs) = args.get_one::<u64>("timeout") {
        config.provider.timeout_secs = *secs;
    }
    if config.provider.api_key.is_none() && config.provider.api_key_env.is_none() {
        config.provider.api_key_env =
            conventional_key_env(config.provider.provider).map(str::to_string);
    }

    if let Some(attempts) = args.get_one::<u32>("max-attempts") {
        config.generation = config.generation.with_max_attempts(*attempts);
    }
    if args.get_flag("no-semantic") {
        config.generation.semantic_validation = false;
    }
    if args.get_flag("fail-closed") {
        config.generation.fail_open = false;
    }
    Ok(config)
}

fn media_type(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    Ok(match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => bail!("unsupported image type: {}", path.display()),
    })
}

fn load_images(args: &ArgMatches) -> Result<Vec<ImageAttachment>> {
    args.get_many::<PathBuf>("image")
        .into_iter()
        .flatten()
        .map(|path| {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read image {}", path.display()))?;
            Ok(ImageAttachment::from_bytes(media_type(path)?, &bytes))
        })
        .collect()
}

async fn run_generate(args: &ArgMatches) -> Result<()> {
    let config = load_config(args)?;
    let kind = parse_kind(args)?;
    let images = load_images(args)?;
    let prompt = args
        .get_many::<String>("prompt")
        .context("prompt is required")?
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");

    let orchestrator = Orchestrator::from_config(&config)?;
    let info = orchestrator.provider_info();
    tracing::info!(provider = %info.name, model = %info.model, kind = %kind, "starting generation");

    let token = CancellationToken::new();
    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; cancelling");
            ctrl_c.cancel();
        }
    });

    let request = GenerationRequest::new(prompt, kind).with_images(images);
    let result = orchestrator.generate_with_cancel(request, token).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn run_validate(args: &ArgMatches) -> Result<()> {
    let kind = parse_kind(args)?;
    let path = args
        .get_one::<PathBuf>("file")
        .context("file is required")?;
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let artifact = extract(&raw, kind);
    let verdict = validate_local(&artifact, kind);
    let report = serde_json::json!({
        "artifact_kind": kind,
        "artifact": artifact,
        "accepted": verdict.accepted,
        "defects": verdict.defects,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !verdict.accepted {
        std::process::exit(1);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("generate", args)) => run_generate(args).await,
        Some(("validate", args)) => run_validate(args),
        Some(("config", _)) => {
            print!("{}", SimForgeConfig::default().to_toml_string()?);
            Ok(())
        }
        _ => bail!("no subcommand given"),
    }
}
