//! crdform CLI - drive Kubernetes custom resources from their CRD schemas

use clap::{Parser, Subcommand};
use crdform_provider::DEFAULT_PROVIDER_NAME;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod display;
mod error;
mod exit_codes;

use commands::GlobalOptions;
use commands::crud::Operation;

#[derive(Parser)]
#[command(name = "crdform")]
#[command(version)]
#[command(about = "Drive Kubernetes custom resources from their CRD schemas", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Provider configuration file (default: ~/.config/crdform/provider.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Never contact the cluster
    #[arg(long, global = true)]
    offline: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Provider name used as the resource type prefix
    #[arg(long, global = true, default_value = DEFAULT_PROVIDER_NAME)]
    provider: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the attribute tree built from a CRD
    Schema {
        /// CRD file
        crd: PathBuf,

        /// Only this resource type
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List resource types defined by CRD files
    Resources {
        /// CRD files
        #[arg(required = true)]
        crds: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a state document against a resource schema
    Validate {
        /// CRD file
        crd: PathBuf,

        /// State file (JSON or YAML)
        state: PathBuf,

        /// Resource type (required when the CRD serves several versions)
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,

        /// Output validation results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create the object described by a planned state
    Create {
        crd: PathBuf,
        state: PathBuf,
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,
    },

    /// Refresh a state from the cluster
    Read {
        crd: PathBuf,
        state: PathBuf,
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,
    },

    /// Apply a changed state
    Update {
        crd: PathBuf,
        state: PathBuf,
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,
    },

    /// Delete the object a state points to
    Delete {
        crd: PathBuf,
        state: PathBuf,
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,
    },

    /// Build the state for an existing object from `namespace/name`
    Import {
        crd: PathBuf,

        /// `namespace/name`, or `name` for cluster-scoped resources
        id: String,

        #[arg(short = 't', long = "type")]
        type_name: Option<String>,
    },
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn run(cli: Cli) -> error::Result<()> {
    let options = GlobalOptions {
        config: cli.config,
        offline: cli.offline,
        provider: cli.provider,
    };

    match cli.command {
        Commands::Schema {
            crd,
            type_name,
            json,
        } => commands::schema::run(&options, &crd, type_name.as_deref(), json),

        Commands::Resources { crds, json } => commands::resources::run(&options, &crds, json),

        Commands::Validate {
            crd,
            state,
            type_name,
            json,
        } => commands::validate::run(&options, &crd, &state, type_name.as_deref(), json),

        Commands::Create {
            crd,
            state,
            type_name,
        } => {
            commands::crud::run(&options, Operation::Create, &crd, &state, type_name.as_deref())
                .await
        }

        Commands::Read {
            crd,
            state,
            type_name,
        } => {
            commands::crud::run(&options, Operation::Read, &crd, &state, type_name.as_deref())
                .await
        }

        Commands::Update {
            crd,
            state,
            type_name,
        } => {
            commands::crud::run(&options, Operation::Update, &crd, &state, type_name.as_deref())
                .await
        }

        Commands::Delete {
            crd,
            state,
            type_name,
        } => {
            commands::crud::run(&options, Operation::Delete, &crd, &state, type_name.as_deref())
                .await
        }

        Commands::Import { crd, id, type_name } => {
            commands::import::run(&options, &crd, &id, type_name.as_deref())
        }
    }
}

#[tokio::main]
async fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let code = match run(cli).await {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}
