use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::process::ExitCode;
use synoshell::{BringUp, Outcome};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "synoshell")]
#[command(
    author,
    version,
    about = "Enable telnet on a NAS, check its clock and start the install-check loop",
    long_about = None
)]
struct Args {
    /// IP address or host name of the NAS
    address: String,

    /// Print the shell output captured after launching the loop
    #[arg(long)]
    show_output: bool,

    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let outcome = BringUp::new(&args.address).run().await;

    match &outcome {
        Outcome::Succeeded(report) => {
            if args.show_output {
                tracing::info!("Command output:\n{}", report.launch.output());
            }
            tracing::info!("All steps completed successfully. Refresh your web assistant!");
        }
        Outcome::ActivationFailed(_) => {
            tracing::error!("Telnet could not be enabled on {}", args.address);
        }
        Outcome::SessionFailed(_) => {
            tracing::error!("One or more steps failed");
        }
    }

    Ok(outcome.exit_code())
}

fn init_tracing(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) => EnvFilter::try_new(&directives)
            .with_context(|| format!("invalid RUST_LOG value {directives:?}"))?,
        Err(_) => EnvFilter::new(level),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!(e))
}
