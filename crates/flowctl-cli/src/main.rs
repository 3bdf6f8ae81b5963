//! flowctl - process group branch manager
//!
//! Usage:
//!   flowctl extract root,teamA --output teamA.yaml
//!   flowctl undeploy root,teamA
//!   flowctl install root,teamA --template ingest.xml --bump-release

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flowctl_core::commands::undeploy::warnings_of;
use flowctl_core::commands::{
    ExtractCommand, ExtractOptions, ExtractReport, InstallCommand, InstallOptions, InstallReport,
    UndeployCommand, UndeployOptions, UndeployReport,
};
use flowctl_core::config::SettingsOverride;
use flowctl_core::context::AppContext;
use flowctl_core::teardown::TeardownFailure;

#[derive(Parser)]
#[command(name = "flowctl")]
#[command(about = "Extract, undeploy and install process group branches", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the engine REST API
    #[arg(long, global = true)]
    url: Option<String>,

    /// Seconds to wait for a component to reach a requested state
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Seconds between two state polls
    #[arg(long, global = true)]
    interval: Option<u64>,

    /// Username exchanged for an access token
    #[arg(long, global = true)]
    user: Option<String>,

    #[arg(long, global = true)]
    password: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    insecure: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    format: OutputFormat,
}

impl GlobalArgs {
    fn overrides(&self) -> SettingsOverride {
        SettingsOverride {
            url: self.url.clone(),
            timeout_secs: self.timeout,
            interval_secs: self.interval,
            username: self.user.clone(),
            password: self.password.clone(),
            accept_invalid_certs: self.insecure,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Snapshot a branch into a JSON or YAML file
    Extract {
        /// Comma-separated group names, starting at the root (e.g. root,teamA)
        branch: String,
        /// Output file; `.json` writes JSON, anything else YAML
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Stop, disable and delete the group at the end of a branch
    #[command(alias = "rm")]
    Undeploy {
        /// Comma-separated group names, starting at the root
        branch: String,
    },

    /// Upload and instantiate a template under a branch
    Install {
        /// Comma-separated group names; missing groups are created
        branch: String,
        /// Template XML file; its stem becomes the template name
        #[arg(short, long)]
        template: PathBuf,
        /// Keep the uploaded template after instantiation
        #[arg(long)]
        keep_template: bool,
        /// Rewrite .RCn and -SNAPSHOT bundle versions to .RELEASE
        #[arg(long)]
        bump_release: bool,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flowctl=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::load(cli.global.config.as_deref(), cli.global.overrides())?;
    run_cli(&ctx, cli.command, cli.global.format)
}

fn run_cli(ctx: &AppContext, command: Commands, format: OutputFormat) -> Result<()> {
    let directory = ctx.directory()?;
    match command {
        Commands::Extract { branch, output } => {
            let options = ExtractOptions::parse(&branch, output);
            let report = ExtractCommand::new().execute(&directory, &options)?;
            print_extract_result(&report, format)?;
        }
        Commands::Undeploy { branch } => {
            let options = UndeployOptions::parse(&branch);
            let result = UndeployCommand::new(ctx.wait_policy()).execute(&directory, &options);
            match result {
                Ok(report) => print_undeploy_result(&report, format)?,
                Err(err) => {
                    if let Some(failure) = err.downcast_ref::<TeardownFailure>() {
                        for warning in warnings_of(&failure.report) {
                            eprintln!("  ⚠ {}", warning);
                        }
                    }
                    return Err(err);
                }
            }
        }
        Commands::Install {
            branch,
            template,
            keep_template,
            bump_release,
        } => {
            let options = InstallOptions::parse(&branch, template)
                .with_keep_template(keep_template)
                .with_bump_release(bump_release);
            let report = InstallCommand::new().execute(&directory, &options)?;
            print_install_result(&report, format)?;
        }
    }
    Ok(())
}

fn print_extract_result(report: &ExtractReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!(
                "✓ Extracted '{}' to {} ({})",
                report.name,
                report.output.display(),
                report.format
            );
            println!("  Processors:          {}", report.processors);
            println!("  Controller services: {}", report.controller_services);
            println!("  Subgroups:           {}", report.subgroups);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

fn print_undeploy_result(report: &UndeployReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            let branch = report.branch.join(",");
            if report.changed {
                println!("✓ Undeployed '{}'", branch);
            } else {
                println!("• '{}' not found, nothing to undeploy", branch);
            }
            for warning in &report.warnings {
                println!("  ⚠ {}", warning);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

fn print_install_result(report: &InstallReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!(
                "✓ Installed template '{}' into '{}'",
                report.template_name,
                report.branch.join(",")
            );
            for replaced in &report.replaced_templates {
                println!("  Replaced existing template {}", replaced);
            }
            if report.template_kept {
                println!("  Kept template {}", report.template_id);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}
