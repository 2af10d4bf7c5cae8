//! wadb - Wireless ADB session manager
//!
//! This is the binary entry point. Orchestration logic lives in the
//! workspace crates; this file maps subcommands onto it and displays the
//! structured results.

mod settings;

use clap::{Parser, Subcommand};
use serde::Serialize;

use settings::Settings;
use wadb_core::prelude::*;
use wadb_daemon::{
    commands, pair_and_connect, uninstall_packages, AdbRunner, CommandOutcome, DeviceEntry,
    FallbackConnect, PairRequest, PairingSession,
};

/// wadb - Wireless ADB session manager
#[derive(Parser, Debug)]
#[command(name = "wadb")]
#[command(about = "Pair, connect and manage wireless ADB sessions", long_about = None)]
struct Args {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pair with a device and establish a connection
    Pair {
        /// Endpoint shown in the wireless debugging dialog (host:port)
        endpoint: String,
        /// One-time pairing code
        code: String,
    },
    /// Connect to a device
    Connect {
        /// host[:port] to connect to
        target: String,
    },
    /// Disconnect a device
    Disconnect {
        /// Transport identifier or endpoint
        target: String,
    },
    /// List attached devices
    Devices,
    /// Install an APK
    Install {
        /// Path to the APK file
        apk: String,
    },
    /// Uninstall a package for the current user
    Uninstall {
        /// Package name (e.g. com.example.app)
        package: String,
    },
    /// Uninstall several packages, one at a time
    BulkUninstall {
        /// Package names
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Reboot the device
    Reboot,
    /// Force screen rotation
    Rotate {
        /// 0 = portrait, 1 = 90, 2 = 180, 3 = 270 degrees
        #[arg(value_parser = clap::value_parser!(u8).range(0..=3))]
        rotation: u8,
    },
    /// Manage the adb server
    Server {
        #[command(subcommand)]
        action: ServerAction,
    },
    /// Run adb with raw arguments
    Adb {
        #[arg(trailing_var_arg = true, required = true)]
        args: Vec<String>,
    },
    /// Run a raw command line through the platform shell
    Exec {
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ServerAction {
    Start,
    Kill,
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(err) = wadb_core::logging::init() {
        eprintln!("warning: failed to initialize logging: {err}");
    }

    let args = Args::parse();

    let settings = Settings::load().unwrap_or_else(|err| {
        eprintln!("warning: {err}");
        Settings::default()
    });
    let runner = build_runner(&settings);
    debug!("Using adb program: {}", runner.program());

    match args.command {
        Command::Pair { endpoint, code } => {
            let session = pair_and_connect(&runner, &PairRequest::new(endpoint, code)).await;
            if args.json {
                print_json(&session);
            } else {
                print_session(&session);
            }
            if !session.success {
                std::process::exit(1);
            }
        }
        Command::Connect { target } => finish(args.json, commands::connect(&runner, &target).await),
        Command::Disconnect { target } => {
            finish(args.json, commands::disconnect(&runner, &target).await)
        }
        Command::Devices => {
            let devices = commands::list_devices(&runner).await?;
            if args.json {
                print_json(&devices);
            } else {
                print_devices(&devices);
            }
        }
        Command::Install { apk } => finish(args.json, commands::install_apk(&runner, &apk).await),
        Command::Uninstall { package } => {
            finish(args.json, commands::uninstall_package(&runner, &package).await)
        }
        Command::BulkUninstall { packages } => {
            let results = uninstall_packages(&runner, &packages).await;
            if args.json {
                print_json(&results);
            } else {
                for (package, outcome) in &results {
                    let status = if outcome.success { "ok" } else { "FAILED" };
                    println!("{package}: {status} {}", outcome.detail.trim());
                }
            }
            if results.values().any(|outcome| !outcome.success) {
                std::process::exit(1);
            }
        }
        Command::Reboot => finish(args.json, commands::reboot(&runner).await),
        Command::Rotate { rotation } => {
            finish(args.json, commands::set_rotation(&runner, rotation).await)
        }
        Command::Server { action } => match action {
            ServerAction::Start => finish(args.json, commands::start_server(&runner).await),
            ServerAction::Kill => finish(args.json, commands::kill_server(&runner).await),
        },
        Command::Adb { args: adb_args } => {
            finish(args.json, commands::run_adb(&runner, &adb_args).await)
        }
        Command::Exec { command } => {
            finish(args.json, commands::exec_shell(&runner, &command.join(" ")).await)
        }
    }

    Ok(())
}

fn build_runner(settings: &Settings) -> AdbRunner {
    let mut runner = match &settings.adb_path {
        Some(path) => AdbRunner::with_program(path.clone()),
        None => AdbRunner::new(),
    };
    if let Some(cap) = settings.max_output_bytes {
        runner = runner.with_max_output(cap);
    }
    runner
}

/// Print an outcome and exit nonzero on failure.
fn finish(json: bool, outcome: CommandOutcome) {
    if json {
        print_json(&outcome);
    } else {
        if !outcome.output.is_empty() {
            print!("{}", outcome.output);
            if !outcome.output.ends_with('\n') {
                println!();
            }
        }
        if let Some(error) = &outcome.error {
            eprintln!("{error}");
        }
    }
    if !outcome.success {
        std::process::exit(1);
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).expect("result serializes to JSON")
    );
}

fn print_session(session: &PairingSession) {
    if !session.pairing_output.is_empty() {
        print!("{}", session.pairing_output);
        if !session.pairing_output.ends_with('\n') {
            println!();
        }
    }

    match &session.connect_endpoint {
        Some(endpoint) => println!("Connected via {endpoint}"),
        None => println!("No connect endpoint resolved"),
    }

    match &session.fallback {
        FallbackConnect::NotNeeded => {}
        FallbackConnect::Succeeded => println!("Fell back to host-only connect"),
        FallbackConnect::Failed { error } => println!("Host-only connect failed: {error}"),
    }

    for id in &session.disconnected {
        println!("Disconnected stale session {id}");
    }
    for failure in &session.disconnect_failures {
        eprintln!("Could not disconnect {}: {}", failure.id, failure.error);
    }

    if let Some(error) = &session.error {
        eprintln!("{error}");
    }

    println!();
    print_devices(&session.devices);
}

fn print_devices(devices: &[DeviceEntry]) {
    if devices.is_empty() {
        println!("no devices attached");
        return;
    }
    for device in devices {
        println!("{}\t{}", device.id, device.state);
    }
}
