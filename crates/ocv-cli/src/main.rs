//! 🚀 ocv-cli — the front door, the bouncer, the maitre d' of ocv.
//!
//! 📦 Thin wrapper: parse flags, set up logging, load config, let the library
//! interrogate the cluster, and turn the verdict into an exit code. 🦆

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL};
use ocv::app_config::{ConfigOverrides, TlsMode, load_config};
use ocv::verifier::VerificationReport;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// 🩺 Check that an OpenSearch container is green and accepts index creation.
///
/// Connection details come from OPENSEARCH_SCHEME, OPENSEARCH_HOST and OPENSEARCH_PORT,
/// optionally layered with a TOML file and the flags below.
#[derive(Debug, Parser)]
#[command(name = "ocv", version, about)]
struct Args {
    /// 📁 Optional TOML config file; its values win over environment variables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 🔒 Username for basic auth (default: admin)
    #[arg(long)]
    user: Option<String>,

    /// 🔒 Password for basic auth (default: admin)
    #[arg(long)]
    password: Option<String>,

    /// ⚠️ Accept any TLS certificate for any hostname. Throwaway test containers only.
    #[arg(long)]
    insecure_tls: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            user: self.user.clone(),
            password: self.password.clone(),
            tls: self.insecure_tls.then_some(TlsMode::InsecureTestOnly),
        }
    }
}

fn summary_table(report: &VerificationReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![Cell::new("check"), Cell::new("result")]);
    table.add_row(vec![Cell::new("cluster"), Cell::new(&report.cluster_name)]);
    table.add_row(vec![Cell::new("nodes"), Cell::new(report.number_of_nodes)]);
    table.add_row(vec![Cell::new("health"), Cell::new(report.status)]);
    table.add_row(vec![
        Cell::new("index created"),
        Cell::new(format!("{} ✅", report.index)),
    ]);
    table
}

async fn verify(args: &Args) -> Result<VerificationReport> {
    let config = load_config(args.config.as_deref(), &args.overrides())
        .context("💀 In ocv-cli we couldn't build a connection config. Check the OPENSEARCH_* variables and the config file.")?;
    ocv::run(&config).await
}

/// 🚀 main() — where it all begins. The "I pressed F5 and held my breath" moment.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    match verify(&args).await {
        Ok(report) => {
            println!("{}", summary_table(&report));
            Ok(())
        }
        Err(err) => {
            error!("💀 error: {}", err);
            // -- 🧅 peel the onion of sadness, one layer at a time
            let mut the_vibes_are_giving_connection_issues = false;
            for cause in err.chain().skip(1) {
                error!("⚠️  cause: {}", cause);
                let cause_str = cause.to_string();
                if cause_str.contains("error sending request")
                    || cause_str.contains("never made it")
                    || cause_str.contains("Connection refused")
                    || cause_str.contains("connection refused")
                    || cause_str.contains("tcp connect error")
                    || cause_str.contains("dns error")
                {
                    the_vibes_are_giving_connection_issues = true;
                }
            }

            if the_vibes_are_giving_connection_issues {
                error!(
                    "🔧 hint: the cluster isn't reachable. Is the container actually running? \
                    `docker ps` will tell you. If it's up, give it a few more seconds, or check \
                    OPENSEARCH_SCHEME: an https listener won't answer plain http."
                );
            }

            std::process::exit(1);
        }
    }
}
