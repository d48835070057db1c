//! Switchboard CLI - Main entry point

mod commands;

use clap::{Parser, Subcommand};
use commands::TargetOptions;
use switchboard_core::Dispatcher;
use switchboard_foundation::{BridgeLimits, McpConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Switchboard - call MCP backends over any transport
#[derive(Parser, Debug)]
#[command(name = "switchboard")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Transport for URL targets (http, sse, streamable_http)
    #[arg(long, global = true)]
    transport: Option<String>,

    /// MCP protocol version for URL targets
    #[arg(long, global = true)]
    protocol_version: Option<String>,

    /// Deadline for the whole call in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List configured servers
    Servers,
    /// Test connectivity (initialize)
    Probe {
        /// Registered server name or backend URL
        server: String,
    },
    /// List tools
    Tools {
        /// Registered server name or backend URL
        server: String,
    },
    /// List resources
    Resources {
        /// Registered server name or backend URL
        server: String,
    },
    /// Call a tool
    Call {
        /// Registered server name or backend URL
        server: String,
        /// Tool name
        tool: String,
        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Send an arbitrary MCP method
    Rpc {
        /// Registered server name or backend URL
        server: String,
        /// Method name (e.g. prompts/list)
        method: String,
        /// Method params as JSON
        #[arg(long, default_value = "{}")]
        params: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let config = McpConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load servers: {}", e);
        McpConfig::default()
    });

    let options = TargetOptions {
        transport: args.transport,
        protocol_version: args.protocol_version,
    };

    let (server, method, params) = match args.command {
        Command::Servers => {
            commands::list_servers(&config);
            return Ok(());
        }
        Command::Probe { server } => (server, "initialize".to_string(), serde_json::Value::Null),
        Command::Tools { server } => (server, "tools/list".to_string(), serde_json::json!({})),
        Command::Resources { server } => {
            (server, "resources/list".to_string(), serde_json::json!({}))
        }
        Command::Call { server, tool, args } => {
            let arguments = commands::parse_json("--args", &args)?;
            (
                server,
                "tools/call".to_string(),
                serde_json::json!({"name": tool, "arguments": arguments}),
            )
        }
        Command::Rpc {
            server,
            method,
            params,
        } => (server, method, commands::parse_json("--params", &params)?),
    };

    let limits = BridgeLimits::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load bridge limits: {}", e);
        BridgeLimits::default()
    });
    let dispatcher = Dispatcher::new()
        .map_err(switchboard_foundation::Error::from)?
        .with_limits(limits);

    let target = commands::resolve_target(&server, &options, &config)?;
    let result = dispatcher.invoke(&target, &method, params, args.timeout).await;

    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.success {
        std::process::exit(2);
    }
    Ok(())
}
