use clap::Parser;
use geolocus::location::{GeoResolver, PostalResolver};
use geolocus::server;

/// geolocus — request-scoped geolocation lookups.
///
/// Resolves an IP address to city/region/country/postal through injected
/// GeoIP variables and two external providers, or a US ZIP code to a
/// structured postal record.
///
/// Examples:
///   geolocus 8.8.8.8
///   geolocus --ip 8.8.8.8 --check-us
///   geolocus --zip 90210
///   geolocus --serve --port 8787
#[derive(Parser)]
#[command(name = "geolocus", version, about, long_about = None)]
struct Cli {
    /// IP address (positional). Example: geolocus 8.8.8.8
    #[arg(index = 1)]
    ip_positional: Option<String>,

    /// IP address (named). Falls back to request-context variables when
    /// omitted.
    #[arg(long)]
    ip: Option<String>,

    /// US ZIP code to resolve instead of an IP.
    #[arg(long, short = 'z')]
    zip: Option<String>,

    /// Print only whether the IP resolves to the United States.
    #[arg(long)]
    check_us: bool,

    /// Offline mode: consult injected GeoIP variables only.
    #[arg(long)]
    offline: bool,

    /// Run the HTTP façade instead of a one-shot lookup.
    #[arg(long)]
    serve: bool,

    /// Bind host for --serve.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Bind port for --serve.
    #[arg(long, short = 'p', default_value_t = 8787)]
    port: u16,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("Error: Cannot start runtime: {}", e);
            std::process::exit(1);
        });
        runtime.block_on(server::start(&cli.host, cli.port));
        return;
    }

    // ── ZIP lookup ──────────────────────────────────────────────

    if let Some(ref zip) = cli.zip {
        let record = PostalResolver::new().resolve_us(zip);
        if record.is_empty() {
            eprintln!("  No postal data for '{}'", zip);
        }
        println!("{}", serde_json::to_string_pretty(&record).unwrap());
        return;
    }

    // ── IP lookup ───────────────────────────────────────────────

    let mut resolver = GeoResolver::new();
    if cli.offline {
        resolver.set_offline(true);
    }

    let ip = cli.ip.as_deref().or(cli.ip_positional.as_deref());

    if cli.check_us {
        println!("{}", resolver.is_us(ip));
        return;
    }

    let resolved = resolver.resolve_with_source(ip);
    if resolved.record.is_empty() {
        eprintln!("  Location unknown (no injected variables, providers unavailable or no IP).");
    }
    println!("{}", serde_json::to_string_pretty(&resolved).unwrap());
}
