use anyhow::{Context, Result};
use clap::Parser;
use solace_core::{SolaceConfig, ToneStyle};
use solace_dialogue::DialogueSession;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod repl;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "SOLACE_CONFIG", default_value = "solace.toml")]
    config: String,

    /// Tone for comfort replies (overrides the config file)
    #[arg(short, long)]
    tone: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Serve the HTTP gateway instead of the interactive prompt
    #[arg(long)]
    serve: bool,
}

fn init_tracing(json: bool, default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    // The prompt shares the terminal with logs, so keep it quiet by default.
    init_tracing(args.log_json, if args.serve { "info" } else { "warn" });

    let mut config = SolaceConfig::load_or_default(&args.config);
    if let Some(tone) = &args.tone {
        config.dialogue.default_tone = tone
            .parse::<ToneStyle>()
            .with_context(|| "Invalid --tone")?;
    }
    info!(
        "Configuration loaded (tone: {}, config: {})",
        config.dialogue.default_tone, args.config
    );

    if args.serve {
        return serve(config).await;
    }

    let session_id = format!("cli-{}", chrono::Utc::now().format("%Y%m%d%H%M%S"));
    let mut session = DialogueSession::from_config(session_id, &config);
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    repl::run(&mut session, stdin.lock(), &mut stdout)
}

#[cfg(feature = "gateway")]
async fn serve(config: SolaceConfig) -> Result<()> {
    solace_gateway::GatewayServer::new(config).serve().await
}

#[cfg(not(feature = "gateway"))]
async fn serve(_config: SolaceConfig) -> Result<()> {
    anyhow::bail!("This build has no gateway support; rebuild with --features gateway")
}
