// ==========================================================
//  camscout  -  RTSP camera scanner and access auditor
// ==========================================================

use camscout::{output, table, Camscout, CamscoutError, Cli, ScanConfig};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(config: &ScanConfig) {
    let level = if config.debug {
        "debug"
    } else if config.verbose {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("camscout={}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), CamscoutError> {
    let cli = Cli::parse();
    let config = ScanConfig::from_cli(&cli);
    init_tracing(&config);

    let scanner = Camscout::new(config)?;

    let streams = match scanner.run().await {
        Ok(streams) => streams,
        Err(CamscoutError::NoStreams) => {
            table::print_streams(&[]);
            return Err(CamscoutError::NoStreams);
        }
        Err(e) => return Err(e),
    };
    table::print_streams(&streams);

    if let Some(path) = &cli.output {
        output::write_json(path, &streams)?;
        println!("Results written to {}", path.display());
    }

    Ok(())
}
