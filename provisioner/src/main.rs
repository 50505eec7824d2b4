//! `dashboard-admin`: cascade variables, provision users, export charts.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, eyre};
use dashboard_provisioner::config::DashboardSettings;
use dashboard_provisioner::domain::ports::DashboardApi;
use dashboard_provisioner::domain::{
    CascadeOptions, ItemStatus, ProvisioningConfig, RunReport, UserId, UserProvisioner,
    VariableCascade, export_chart,
};
use dashboard_provisioner::outbound::dashboard::DashboardHttpClient;
use ortho_config::OrthoConfig;
use roster::Roster;
use tokio::runtime::Builder;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `dashboard-admin` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "dashboard-admin",
    about = "Administer dashboard users and variables through the dashboard API",
    version
)]
struct Cli {
    /// JSON connection descriptor. Falls back to `DASHBOARD_*` settings.
    #[arg(long, value_name = "path", global = true)]
    dashboard: Option<PathBuf>,
    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Json, global = true)]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human-readable lines.
    Pretty,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Copy inherited variables onto descendants that lack them.
    CascadeVariables {
        /// Root of the subtree to cascade through.
        #[arg(long, value_name = "id")]
        root_user_id: i64,
        /// Resolve and report without writing anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Create users, variables, and restrictions from a roster file.
    CreateUsers {
        /// Roster JSON keyed by username.
        #[arg(long, value_name = "path")]
        roster: PathBuf,
        /// Parent assigned to every created user.
        #[arg(long, value_name = "id", default_value_t = 1)]
        parent_id: i64,
    },
    /// Print a chart definition as JSON.
    ExportChart {
        /// Chart to export.
        #[arg(long, value_name = "id")]
        chart_id: u64,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(cli))
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = match format {
        LogFormat::Json => fmt().with_env_filter(filter).json().try_init(),
        LogFormat::Pretty => fmt().with_env_filter(filter).try_init(),
    };
    if let Err(e) = installed {
        warn!(error = %e, "tracing init failed");
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = DashboardSettings::load_from_iter([OsString::from("dashboard-admin")])
        .map_err(|error| eyre!("load dashboard settings: {error}"))?
        .with_descriptor_path(cli.dashboard);
    let connection = settings
        .connection()
        .wrap_err("resolve dashboard connection")?;
    info!(base_url = %connection.base_url, "connecting to dashboard");
    let api: Arc<dyn DashboardApi> =
        Arc::new(DashboardHttpClient::new(connection).wrap_err("build HTTP client")?);

    match cli.command {
        Command::CascadeVariables {
            root_user_id,
            dry_run,
        } => {
            let outcome = VariableCascade::new(api)
                .run(UserId::new(root_user_id), CascadeOptions { dry_run })
                .await
                .wrap_err("cascade variables")?;
            if !outcome.conflicts.is_empty() {
                warn!(
                    conflicts = outcome.conflicts.len(),
                    "inherited variables disagreed; first-seen values were kept"
                );
            }
            summarise(&outcome.report);
        }
        Command::CreateUsers { roster, parent_id } => {
            let roster = Roster::from_file(&roster)
                .wrap_err_with(|| format!("load roster {}", roster.display()))?;
            let config = ProvisioningConfig {
                parent_id: UserId::new(parent_id),
            };
            match UserProvisioner::new(api).run(&roster, config).await {
                Ok(report) => summarise(&report),
                Err(aborted) => {
                    summarise(&aborted.report);
                    return Err(aborted).wrap_err("create users");
                }
            }
        }
        Command::ExportChart { chart_id } => {
            let chart = export_chart(api.as_ref(), chart_id)
                .await
                .wrap_err("export chart")?;
            let rendered = serde_json::to_string_pretty(&chart).wrap_err("render chart JSON")?;
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{rendered}").wrap_err("write chart JSON")?;
        }
    }
    Ok(())
}

fn summarise(report: &RunReport) {
    for outcome in report.failures() {
        if let ItemStatus::Failed { detail } = &outcome.status {
            error!(stage = %outcome.stage, subject = %outcome.subject, detail = %detail, "item failed");
        }
    }
    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        skipped = report.skipped(),
        "done"
    );
}
