use clap::{Parser, ValueEnum};
use sigma_zkp::{runner, EngineConfig, Variant};
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "sigma")]
#[command(about = "Sigma-protocol zero-knowledge proof engine", long_about = None)]
#[command(version)]
struct Args {
    /// Protocol variant to run (e.g. schnorr, pedersen, dlog_equality)
    #[arg(short = 'e', long, env = "SIGMA_VARIANT")]
    variant: String,

    /// Role this process plays; ignored by local variants
    #[arg(short, long, env = "SIGMA_ROLE", value_enum, default_value = "verifier")]
    role: Role,

    /// Host to bind (verifier) or dial (prover)
    #[arg(long, env = "SIGMA_HOST")]
    host: Option<String>,

    /// Port to listen on or connect to
    #[arg(short, long, env = "SIGMA_PORT")]
    port: Option<u16>,

    /// Per-move timeout in seconds
    #[arg(long, env = "SIGMA_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Role {
    Prover,
    Verifier,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let variant: Variant = match args.variant.parse() {
        Ok(variant) => variant,
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    };

    let mut config = EngineConfig::from_env().unwrap_or_else(|figment_error| {
        error!("failed to load configuration: {figment_error}");
        EngineConfig::default()
    });
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.timeout_secs = timeout_secs;
    }

    let outcome = if variant.is_local() {
        runner::run_local(variant)
    } else {
        match args.role {
            Role::Verifier => runner::run_verifier(variant, &config).await.map(|()| true),
            Role::Prover => runner::run_prover(variant, &config).await,
        }
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    }
}
