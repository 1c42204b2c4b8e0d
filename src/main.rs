//! vswitch - user-space VLAN-aware Ethernet switch core.
//!
//! Reads length-prefixed Ethernet frames from stdin (the driver's
//! outbound stream), forwards them per the configured port/VLAN
//! membership, and writes length-prefixed emissions to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vswitch::port::PortTable;
use vswitch::{run_io_loop, Switch};

/// vswitch - user-space VLAN-aware Ethernet switch
#[derive(Parser, Debug)]
#[command(name = "vswitch")]
#[command(author = "SecuAAS")]
#[command(version)]
#[command(about = "VLAN-aware Ethernet switch core", long_about = None)]
struct Args {
    /// Port specifications, e.g. `eth0`, `p1[U:5]`, `p2[T:10,20]`.
    ports: Vec<String>,

    /// Raise the log level to debug. Does not affect forwarding semantics.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose)?;

    let ports = PortTable::from_specs(&args.ports).context("invalid port specification")?;
    info!("configured {} port(s)", ports.len());
    for port in ports.iter() {
        info!(
            "port {} = {:?} untagged_vlan={:?} tagged_vlans={:?}",
            port.index, port.name, port.untagged_vlan, port.tagged_vlans
        );
    }

    let mut switch = Switch::new(ports);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut reader = stdin.lock();
    let mut writer = stdout.lock();

    run_io_loop(&mut switch, &mut reader, &mut writer).context("io loop terminated with an error")?;

    info!("clean shutdown on driver EOF");
    Ok(())
}

/// Set up `tracing` with an `EnvFilter` driven by `RUST_LOG`, raised to
/// `debug` when `-v`/`--verbose` is passed.
fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vswitch={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .init();

    Ok(())
}
