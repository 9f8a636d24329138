mod args;
mod output;
mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use args::{Overrides, resolve_config};

#[derive(Parser)]
#[command(
    name = "tempotree",
    about = "Compile temporal probabilistic planning domains into MDPs and plan on them with MCTS",
    version,
    propagate_version = true
)]
struct Cli {
    /// YAML run configuration; flags override its values
    #[arg(long, short = 'c', global = true, env = "TEMPOTREE_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, short = 'j', global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the domain and evaluate the MCTS planner on it
    Run {
        #[command(flatten)]
        overrides: Overrides,

        /// Always rebuild combination bundles and leave the cache untouched
        #[arg(long)]
        no_cache: bool,
    },

    /// Compile the domain and print the size of every stage
    Compile {
        #[command(flatten)]
        overrides: Overrides,

        #[arg(long)]
        no_cache: bool,
    },

    /// Print the effective run configuration as YAML
    Config {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// List the bundled reference domains
    Domains,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Run { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Run { overrides, no_cache } => resolve_config(config_path, overrides)
            .and_then(|config| run::run_plan(&config, !no_cache, cli.json)),
        Commands::Compile { overrides, no_cache } => resolve_config(config_path, overrides)
            .and_then(|config| run::run_compile(&config, !no_cache, cli.json)),
        Commands::Config { overrides } => {
            resolve_config(config_path, overrides).and_then(|config| print_config(&config, cli.json))
        }
        Commands::Domains => list_domains(cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn print_config(config: &tempotree_mdp::RunConfig, json: bool) -> anyhow::Result<()> {
    if json {
        return output::print_json(config);
    }
    print!("{}", serde_yaml::to_string(config)?);
    Ok(())
}

fn list_domains(json: bool) -> anyhow::Result<()> {
    if json {
        return output::print_json(&tempotree_mdp::domains::NAMES);
    }
    for name in tempotree_mdp::domains::NAMES {
        println!("{name}");
    }
    Ok(())
}
