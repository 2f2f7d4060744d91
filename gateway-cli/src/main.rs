//! Gateway CLI: operator tool for the payment gateway client.
//!
//! Signs request bodies, checks captured callbacks, hashes API passwords and
//! polls transaction status. Credentials come from a TOML file in the
//! `GatewayConfig` format.

mod observability;

use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use gateway_client::{
    GatewayClient, GatewayConfig,
    callback::CallbackMessage,
    config::Endpoint,
    credential::hash_password,
    document::StatusRequest,
    signer::SignatureScheme,
};
use tracing::{error, info};

use crate::observability::{LogFormat, init_observability};

/// Operator tool for signed payment gateway requests.
#[derive(Parser, Debug)]
#[command(name = "gateway-cli", version, about, long_about = None)]
struct Cli {
    /// Path to the gateway TOML configuration
    #[arg(short, long, global = true, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign a request body and print the headers to send with it
    Sign {
        /// Target endpoint
        #[arg(long, value_enum)]
        endpoint: EndpointArg,

        /// File holding the request body
        #[arg(long)]
        body: PathBuf,
    },

    /// Check the signature of a captured callback
    VerifyCallback {
        /// File holding the raw callback body
        #[arg(long)]
        body: PathBuf,

        /// Path and query the callback was received on
        #[arg(long)]
        path: String,

        /// Received `Date` header
        #[arg(long)]
        date: String,

        /// Received `Authorization` header
        #[arg(long)]
        authorization: String,
    },

    /// Print the gateway hash of an API password
    HashPassword {
        /// Plaintext password
        password: String,
    },

    /// Look up the status of a transaction
    Status {
        /// Gateway transaction uuid
        #[arg(long, conflicts_with = "merchant_transaction_id")]
        uuid: Option<String>,

        /// Merchant transaction id
        #[arg(long)]
        merchant_transaction_id: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum EndpointArg {
    Transaction,
    Schedule,
    Status,
    Options,
    GetProfile,
    UpdateProfile,
    DeleteProfile,
}

impl EndpointArg {
    const fn endpoint(self) -> Endpoint {
        match self {
            Self::Transaction => Endpoint::Transaction,
            Self::Schedule => Endpoint::Schedule,
            Self::Status => Endpoint::Status,
            Self::Options => Endpoint::Options,
            Self::GetProfile => Endpoint::GetProfile,
            Self::UpdateProfile => Endpoint::UpdateProfile,
            Self::DeleteProfile => Endpoint::DeleteProfile,
        }
    }

    const fn scheme(self) -> SignatureScheme {
        match self {
            Self::GetProfile | Self::UpdateProfile | Self::DeleteProfile => SignatureScheme::JsonV3,
            Self::Transaction | Self::Schedule | Self::Status | Self::Options => {
                SignatureScheme::XmlV2
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_observability(LogFormat::from_env(), cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Sign { endpoint, body } => cmd_sign(cli.config.as_deref(), endpoint, &body),
        Commands::VerifyCallback { body, path, date, authorization } => {
            cmd_verify_callback(cli.config.as_deref(), &body, path, &date, &authorization)
        }
        Commands::HashPassword { password } => {
            println!("{}", hash_password(&password));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Status { uuid, merchant_transaction_id } => {
            cmd_status(cli.config.as_deref(), uuid, merchant_transaction_id).await
        }
    }
}

fn load_client(path: Option<&Path>) -> anyhow::Result<GatewayClient> {
    let Some(path) = path else {
        bail!("no configuration given, pass --config or set GATEWAY_CONFIG");
    };
    let config = GatewayConfig::from_file(path)
        .with_context(|| format!("cannot load configuration from {}", path.display()))?;
    Ok(GatewayClient::from_config(&config)?)
}

fn read_body(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("cannot read {}", path.display()))
}

fn cmd_sign(config: Option<&Path>, endpoint: EndpointArg, body: &Path) -> anyhow::Result<ExitCode> {
    let client = load_client(config)?;
    let envelope = client.sign(endpoint.endpoint(), endpoint.scheme(), read_body(body)?)?;

    info!(url = %envelope.url, "request signed");
    println!("POST {}", envelope.url);
    for (name, value) in envelope.headers() {
        println!("{name}: {value}");
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_verify_callback(
    config: Option<&Path>,
    body: &Path,
    path: String,
    date: &str,
    authorization: &str,
) -> anyhow::Result<ExitCode> {
    let client = load_client(config)?;
    let message = CallbackMessage::from_headers(
        read_body(body)?,
        path,
        &[("Date", date), ("Authorization", authorization)],
    );

    if client.verify_callback(&message) {
        println!("valid");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("invalid");
        Ok(ExitCode::FAILURE)
    }
}

async fn cmd_status(
    config: Option<&Path>,
    uuid: Option<String>,
    merchant_transaction_id: Option<String>,
) -> anyhow::Result<ExitCode> {
    let request = match (uuid, merchant_transaction_id) {
        (Some(uuid), _) => StatusRequest::by_uuid(uuid),
        (None, Some(id)) => StatusRequest::by_merchant_transaction_id(id),
        (None, None) => bail!("pass --uuid or --merchant-transaction-id"),
    };

    let client = load_client(config)?;
    let status = client.send_status_request(&request).await?;

    println!("operation success: {}", status.operation_success);
    if let Some(transaction_status) = &status.transaction_status {
        println!("transaction status: {}", transaction_status.as_str());
    }
    if let Some(uuid) = &status.transaction_uuid {
        println!("transaction uuid: {uuid}");
    }
    if let (Some(amount), Some(currency)) = (&status.amount, &status.currency) {
        println!("amount: {amount} {currency}");
    }
    for failure in &status.errors {
        println!(
            "error {}: {}",
            failure.code.unwrap_or_default(),
            failure.message.as_deref().unwrap_or("")
        );
    }
    Ok(ExitCode::SUCCESS)
}
