//! Open vSwitch ODL agent CLI (ovs-odl)

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use ovs_odl::commands::{
    DispatchCommand, NeutronPluginCommand, RegisterCommand, StatusCommand, SwitchCommand,
};
use ovs_odl::context::AppContext;
use ovs_odl_charm::DEFAULT_CONFIG_PATH;
use ovs_odl_types::{ControllerConnection, OvsdbManager, DEFAULT_ODL_PORT};

#[derive(Parser)]
#[command(name = "ovs-odl")]
#[command(about = "Open vSwitch agent for OpenDaylight")]
#[command(version)]
#[command(long_about = "
Open vSwitch agent for OpenDaylight

Points the local Open vSwitch at an ODL OVSDB manager and registers the node
and its MAC to network bindings with the controller.

Examples:
  ovs-odl dispatch --facts facts.json             # Run a hook invocation
  ovs-odl configure --manager tcp:odl:6640 --controller-ips 10.0.0.10
  ovs-odl unconfigure                             # Detach from the manager
  ovs-odl register-node --host odl -u admin -p admin
  ovs-odl register-macs --host odl -u admin -p admin
  ovs-odl neutron-plugin                          # Print relation payload
  ovs-odl status --format json
")]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ControllerArgs {
    /// Controller host name or address
    #[arg(long)]
    host: String,

    /// Controller RESTCONF port
    #[arg(long, default_value_t = DEFAULT_ODL_PORT)]
    port: u16,

    #[arg(short, long)]
    username: String,

    #[arg(short, long)]
    password: String,
}

impl ControllerArgs {
    fn connection(&self) -> ControllerConnection {
        ControllerConnection::new(&self.host, &self.username, &self.password).with_port(self.port)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the handlers that apply to the given relation facts
    Dispatch {
        /// JSON facts document, `-` for stdin
        #[arg(short, long, default_value = "-")]
        facts: PathBuf,
    },

    /// Point Open vSwitch at an OVSDB manager
    Configure {
        /// Manager connection string, e.g. tcp:odl-controller:6640
        #[arg(short, long)]
        manager: String,

        /// Controller address written to external_ids:controller-ips
        #[arg(long)]
        controller_ips: String,

        /// Tunnel endpoint; resolved from os-data-network when omitted
        #[arg(long)]
        local_ip: Option<IpAddr>,

        /// Host identity; the local hostname when omitted
        #[arg(long)]
        host_id: Option<String>,
    },

    /// Remove the OVSDB manager and all bridge controllers
    Unconfigure,

    /// Register this node with the controller
    RegisterNode {
        #[command(flatten)]
        controller: ControllerArgs,
    },

    /// Register the configured MAC bindings with the controller
    RegisterMacs {
        #[command(flatten)]
        controller: ControllerArgs,
    },

    /// Print the neutron-plugin relation payload
    NeutronPlugin,

    /// Show agent status
    Status {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let result = run(&cli).await;

    match result {
        Ok(()) => {
            if !cli.quiet {
                log::info!("Command completed successfully");
            }
            std::process::exit(0);
        }
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {}", e);

                if cli.verbose || cli.debug {
                    for cause in e.chain().skip(1) {
                        eprintln!("  Caused by: {}", cause);
                    }
                }
            }
            std::process::exit(1);
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    if let Commands::NeutronPlugin = cli.command {
        return NeutronPluginCommand.execute();
    }

    let context = AppContext::bootstrap(&cli.config)?;

    match &cli.command {
        Commands::Dispatch { facts } => DispatchCommand::new(context).execute(facts).await,

        Commands::Configure {
            manager,
            controller_ips,
            local_ip,
            host_id,
        } => {
            let manager = OvsdbManager::new(manager, controller_ips);
            SwitchCommand::new(context)
                .configure(&manager, *local_ip, host_id.clone())
                .await
        }

        Commands::Unconfigure => SwitchCommand::new(context).unconfigure().await,

        Commands::RegisterNode { controller } => {
            RegisterCommand::new(context)
                .node(&controller.connection())
                .await
        }

        Commands::RegisterMacs { controller } => {
            RegisterCommand::new(context)
                .macs(&controller.connection())
                .await
        }

        Commands::NeutronPlugin => NeutronPluginCommand.execute(),

        Commands::Status { format } => StatusCommand::new(context).execute(format).await,
    }
}
