//! # Storefront Console
//!
//! Headless driver for the storefront shell. Reads commands from stdin,
//! prints the resulting screen to stdout and logs to stderr.
//!
//! ## Usage
//! ```bash
//! # Defaults: 150 ms simulated fetch latency, config from the platform dir
//! cargo run -p storefront
//!
//! # Custom config file, slower fetches, testimonials fail on first load
//! cargo run -p storefront -- --config ./storefront.toml --latency-ms 800 --flaky testimonials
//! ```
//!
//! ## Commands
//! ```text
//! go <path>                    navigate (e.g. go /product/42)
//! login <user> [display name]  sign in; returns to the page that asked for it
//! logout                       sign out
//! add <product> <cents> [qty]  put something in the cart
//! retry <region>               retry a region that failed to load
//! reload                       discard all state and reload the page
//! theme                        toggle light/dark
//! whoami | cart                print session or cart as JSON
//! show | help | quit
//! ```

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use storefront_core::RouteTable;
use storefront_shell::notify::Level;
use storefront_shell::{
    catalog, MemoryNotifier, Notification, Notifier, Shell, StorefrontConfig, TracingNotifier,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Default simulated fetch latency.
const DEFAULT_LATENCY_MS: u64 = 150;

// =============================================================================
// Arguments & Commands
// =============================================================================

struct Args {
    config: Option<PathBuf>,
    latency_ms: u64,
    flaky: Vec<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args {
        config: None,
        latency_ms: DEFAULT_LATENCY_MS,
        flaky: Vec::new(),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 < args.len() {
                    parsed.config = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--latency-ms" => {
                if i + 1 < args.len() {
                    parsed.latency_ms = args[i + 1].parse().unwrap_or(DEFAULT_LATENCY_MS);
                    i += 1;
                }
            }
            "--flaky" => {
                if i + 1 < args.len() {
                    parsed.flaky.push(args[i + 1].clone());
                    i += 1;
                }
            }
            other => eprintln!("Ignoring unknown argument '{}'", other),
        }
        i += 1;
    }

    parsed
}

enum Command {
    Go(String),
    Login { user: String, name: Option<String> },
    Logout,
    Add { product: String, cents: i64, quantity: i64 },
    Retry(usize),
    Reload,
    Theme,
    WhoAmI,
    Cart,
    Show,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let command = match verb {
        "go" => Command::Go(words.next().ok_or("usage: go <path>")?.to_string()),
        "login" => {
            let user = words.next().ok_or("usage: login <user> [name]")?.to_string();
            let rest: Vec<&str> = words.collect();
            let name = (!rest.is_empty()).then(|| rest.join(" "));
            Command::Login { user, name }
        }
        "logout" => Command::Logout,
        "add" => {
            let usage = "usage: add <product> <cents> [qty]";
            let product = words.next().ok_or(usage)?.to_string();
            let cents = words
                .next()
                .and_then(|w| w.parse().ok())
                .ok_or(usage)?;
            let quantity = match words.next() {
                Some(w) => w.parse().map_err(|_| usage)?,
                None => 1,
            };
            Command::Add {
                product,
                cents,
                quantity,
            }
        }
        "retry" => Command::Retry(
            words
                .next()
                .and_then(|w| w.parse().ok())
                .ok_or("usage: retry <region>")?,
        ),
        "reload" => Command::Reload,
        "theme" => Command::Theme,
        "whoami" => Command::WhoAmI,
        "cart" => Command::Cart,
        "show" => Command::Show,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{}' (try help)", other)),
    };

    Ok(Some(command))
}

// =============================================================================
// Console Output
// =============================================================================

/// Logs every notification and keeps it for printing after the command.
struct ConsoleNotifier {
    pending: MemoryNotifier,
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        TracingNotifier.notify(notification.clone());
        self.pending.notify(notification);
    }
}

fn print_screen(shell: &Shell, notes: &MemoryNotifier) {
    for note in notes.drain() {
        let tag = match note.level {
            Level::Info | Level::Success => "note",
            Level::Warning => "warn",
            Level::Error => "error",
        };
        println!("({}) {}", tag, note.message);
    }
    print!("{}", shell.screen());
}

fn run(shell: &mut Shell, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Go(path) => shell.navigate(&path),
        Command::Login { user, name } => {
            let identity = shell.sign_in(&user, name.as_deref())?;
            println!("Signed in as {}", identity.display_name);
        }
        Command::Logout => {
            if shell.sign_out().is_none() {
                println!("Not signed in");
            }
        }
        Command::Add {
            product,
            cents,
            quantity,
        } => {
            shell
                .cart()
                .with_cart_mut(|cart| cart.add_item(&product, &product, cents, quantity))?;
            println!("Added {} x {}", quantity, product);
        }
        Command::Retry(region) => {
            if !shell.retry_region(region) {
                println!("Region {} has nothing to retry", region);
            }
        }
        Command::Reload => shell.reload(),
        Command::Theme => println!("Theme: {}", shell.theme().toggle()),
        Command::WhoAmI => {
            let identity = shell.session().current_identity();
            println!("{}", serde_json::to_string_pretty(&identity)?);
        }
        Command::Cart => {
            println!("{}", serde_json::to_string_pretty(&shell.cart().totals())?);
        }
        Command::Show => {}
        Command::Help => println!(
            "go <path> | login <user> [name] | logout | add <product> <cents> [qty] | \
             retry <region> | reload | theme | whoami | cart | show | quit"
        ),
        Command::Quit => {}
    }
    Ok(())
}

// =============================================================================
// Entry Point
// =============================================================================

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug,storefront_shell=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = parse_args();

    let config = StorefrontConfig::load(args.config)?;
    let latency = Duration::from_millis(args.latency_ms);
    let registry = catalog::storefront_registry(latency, &args.flaky)?;
    let table = RouteTable::storefront()?;

    let notes = MemoryNotifier::new(&config.notifications);
    let notifier = Arc::new(ConsoleNotifier {
        pending: notes.clone(),
    });
    let mut shell = Shell::new(table, registry, config, notifier)?;

    info!(latency_ms = args.latency_ms, "Storefront console started");
    shell.navigate("/");
    print_screen(&shell, &notes);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => {
                        if let Err(e) = run(&mut shell, command) {
                            eprintln!("error: {}", e);
                        }
                        print_screen(&shell, &notes);
                    }
                    Ok(None) => {}
                    Err(message) => eprintln!("{}", message),
                }
            }
            _ = shell.pump(), if shell.has_pending() => print_screen(&shell, &notes),
        }
    }

    info!("Storefront console stopped");
    Ok(())
}
