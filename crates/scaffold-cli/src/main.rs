//! Scaffold - project file inspector
//!
//! Usage:
//!   scaffold init --domain my.domain     # Create a PROJECT file
//!   scaffold show                        # Print the project configuration
//!   scaffold resource add ...            # Track a scaffolded resource
//!   scaffold check --crd-version v1      # Check version compatibility

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scaffold_core::config::store::PROJECT_FILE;
use scaffold_core::prelude::*;

#[derive(Parser)]
#[command(name = "scaffold")]
#[command(about = "Inspect and edit scaffolding project files", long_about = None)]
struct Cli {
    /// Path to the project file
    #[arg(long, short, global = true, default_value = PROJECT_FILE)]
    file: PathBuf,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project file
    Init(InitArgs),

    /// Print the project configuration
    Show {
        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        format: OutputFormat,
    },

    /// Manage tracked resources
    Resource(ResourceArgs),

    /// Check whether any tracked resource belongs to a group
    HasGroup {
        /// Group name (case-insensitive)
        group: String,
    },

    /// Check that new scaffolding is compatible with tracked resources
    ///
    /// Exits with a non-zero status when a version conflicts.
    Check {
        /// CRD version of the new API
        #[arg(long)]
        crd_version: Option<String>,
        /// Webhook version of the new webhooks
        #[arg(long)]
        webhook_version: Option<String>,
    },

    /// Manage plugin configuration
    Plugin(PluginArgs),
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
    /// The project file as written to disk
    Toml,
}

#[derive(Args)]
struct InitArgs {
    /// Project configuration version
    #[arg(long, default_value = "3-alpha")]
    project_version: String,
    /// Domain of the project's API groups
    #[arg(long)]
    domain: Option<String>,
    /// Go module path of the project
    #[arg(long)]
    repo: Option<String>,
    /// Project name
    #[arg(long)]
    project_name: Option<String>,
    /// Plugin chain that scaffolded the project
    #[arg(long)]
    layout: Option<String>,
    /// Enable multi-group layout
    #[arg(long)]
    multigroup: bool,
    /// Enable component config
    #[arg(long)]
    component_config: bool,
    /// Overwrite an existing project file
    #[arg(long)]
    force: bool,
}

#[derive(Args)]
struct ResourceArgs {
    #[command(subcommand)]
    command: ResourceSubcommand,
}

#[derive(Args)]
struct GvkArgs {
    /// API group
    #[arg(long, default_value = "")]
    group: String,
    /// API version
    #[arg(long)]
    version: String,
    /// Kind
    #[arg(long)]
    kind: String,
}

impl GvkArgs {
    fn to_gvk(&self) -> Gvk {
        Gvk::new(&self.group, &self.version, &self.kind)
    }
}

#[derive(Subcommand)]
enum ResourceSubcommand {
    /// Track a resource (existing entries are kept unless --update)
    Add {
        #[command(flatten)]
        gvk: GvkArgs,
        /// CRD version of the scaffolded API
        #[arg(long)]
        crd_version: Option<String>,
        /// Webhook version of the scaffolded webhooks
        #[arg(long)]
        webhook_version: Option<String>,
        /// Merge into an existing entry instead of skipping it
        #[arg(long)]
        update: bool,
    },

    /// Print a tracked resource
    Get {
        #[command(flatten)]
        gvk: GvkArgs,
        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct PluginArgs {
    #[command(subcommand)]
    command: PluginSubcommand,
}

#[derive(Subcommand)]
enum PluginSubcommand {
    /// List plugins with stored configuration
    List,
    /// Print the stored configuration of a plugin
    Show {
        /// Plugin key (e.g. go.kubebuilder.io/v3)
        key: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run_cli(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `false` when a check did not pass.
fn run_cli(cli: Cli) -> Result<bool> {
    let store = ConfigStore::new(&cli.file);
    let registry = ConfigRegistry::with_default_versions();

    match cli.command {
        Commands::Init(args) => run_init(&store, &registry, args)?,
        Commands::Show { format } => {
            let config = store.load(&registry)?;
            print_config(config.as_ref(), format)?;
        }
        Commands::Resource(args) => run_resource(&store, &registry, args)?,
        Commands::HasGroup { group } => {
            let config = store.load(&registry)?;
            let found = config.has_group(&group);
            println!("{}", found);
            return Ok(found);
        }
        Commands::Check {
            crd_version,
            webhook_version,
        } => {
            let config = store.load(&registry)?;
            return Ok(run_check(
                config.as_ref(),
                crd_version.as_deref(),
                webhook_version.as_deref(),
            ));
        }
        Commands::Plugin(args) => run_plugin(&store, &registry, args)?,
    }
    Ok(true)
}

fn run_init(store: &ConfigStore, registry: &ConfigRegistry, args: InitArgs) -> Result<()> {
    if store.exists() && !args.force {
        anyhow::bail!(
            "Project file already exists: {} (use --force to overwrite)",
            store.path().display()
        );
    }

    let version: Version = args.project_version.parse()?;
    let mut config = registry.new_config(&version)?;
    if let Some(domain) = &args.domain {
        config.set_domain(domain);
    }
    if let Some(repo) = &args.repo {
        config.set_repository(repo);
    }
    if let Some(name) = &args.project_name {
        config.set_project_name(name);
    }
    if let Some(layout) = &args.layout {
        config.set_layout(layout);
    }
    if args.multigroup {
        config.set_multigroup();
    }
    if args.component_config {
        config.set_component_config();
    }

    store.save(config.as_ref())?;
    println!("✓ Created {} (version {})", store.path().display(), version);
    Ok(())
}

fn run_resource(store: &ConfigStore, registry: &ConfigRegistry, args: ResourceArgs) -> Result<()> {
    match args.command {
        ResourceSubcommand::Add {
            gvk,
            crd_version,
            webhook_version,
            update,
        } => {
            let mut config = store.load(registry)?;
            let gvk = gvk.to_gvk();

            let mut resource = Resource::new(gvk.clone());
            if let Some(crd_version) = crd_version {
                resource = resource.with_api(Api {
                    crd_version,
                    ..Default::default()
                });
            }
            if let Some(webhook_version) = webhook_version {
                resource = resource.with_webhooks(Webhooks {
                    webhook_version,
                    ..Default::default()
                });
            }

            let existed = config.has_resource(&gvk);
            if update {
                config.update_resource(resource)?;
            } else {
                config.add_resource(resource);
            }
            tracing::debug!(%gvk, existed, update, "resource tracked");

            store.save(config.as_ref())?;
            match (existed, update) {
                (true, false) => println!("• {} already tracked, left unchanged", gvk),
                (true, true) => println!("✓ Updated {}", gvk),
                (false, _) => println!("✓ Added {}", gvk),
            }
        }
        ResourceSubcommand::Get { gvk, format } => {
            let config = store.load(registry)?;
            let resource = config.get_resource(&gvk.to_gvk())?;
            match format {
                OutputFormat::Table => print_resource(&resource),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resource)?),
                OutputFormat::Toml => print!("{}", toml::to_string_pretty(&resource)?),
            }
        }
    }
    Ok(())
}

fn run_check(
    config: &dyn ProjectConfig,
    crd_version: Option<&str>,
    webhook_version: Option<&str>,
) -> bool {
    let mut compatible = true;

    if let Some(version) = crd_version {
        if config.is_crd_version_compatible(version) {
            println!("✓ CRD version {} is compatible", version);
        } else {
            println!("✗ CRD version {} conflicts with tracked resources", version);
            compatible = false;
        }
    }
    if let Some(version) = webhook_version {
        if config.is_webhook_version_compatible(version) {
            println!("✓ Webhook version {} is compatible", version);
        } else {
            println!(
                "✗ Webhook version {} conflicts with tracked resources",
                version
            );
            compatible = false;
        }
    }

    compatible
}

fn run_plugin(store: &ConfigStore, registry: &ConfigRegistry, args: PluginArgs) -> Result<()> {
    let config = store.load(registry)?;

    match args.command {
        PluginSubcommand::List => {
            for key in config.plugin_keys() {
                println!("{}", key);
            }
        }
        PluginSubcommand::Show { key } => {
            let Some(plugin_config) = config.plugin_config(&key) else {
                anyhow::bail!("No configuration stored for plugin '{}'", key);
            };
            print!("{}", toml::to_string_pretty(plugin_config)?);
        }
    }
    Ok(())
}

fn print_config(config: &dyn ProjectConfig, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("Version:          {}", config.version());
            println!("Domain:           {}", config.domain());
            println!("Repository:       {}", config.repository());
            println!("Project name:     {}", config.project_name());
            println!("Layout:           {}", config.layout());
            println!("Multi-group:      {}", config.is_multigroup());
            println!("Component config: {}", config.is_component_config());
            println!();
            println!("Resources ({}):", config.resources_len());
            for resource in config.get_resources() {
                print_resource(&resource);
            }
            let plugins = config.plugin_keys();
            if !plugins.is_empty() {
                println!();
                println!("Plugins: {}", plugins.join(", "));
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "version": config.version().to_string(),
                "domain": config.domain(),
                "repo": config.repository(),
                "projectName": config.project_name(),
                "layout": config.layout(),
                "multigroup": config.is_multigroup(),
                "componentConfig": config.is_component_config(),
                "resources": config.get_resources(),
                "plugins": config.plugin_keys(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Toml => print!("{}", config.marshal()?),
    }
    Ok(())
}

fn print_resource(resource: &Resource) {
    let mut details = Vec::new();
    if !resource.crd_version().is_empty() {
        details.push(format!("crd {}", resource.crd_version()));
    }
    if !resource.webhook_version().is_empty() {
        details.push(format!("webhooks {}", resource.webhook_version()));
    }

    if details.is_empty() {
        println!("  {}", resource.gvk);
    } else {
        println!("  {} ({})", resource.gvk, details.join(", "));
    }
}
