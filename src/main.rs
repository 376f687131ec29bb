use clap::Parser;
use miette::Result;
use istvon::cli::{commands, Cli, Commands};
use istvon::core::config::Config;

/// Environment variable holding a tracing filter directive
const LOG_ENV: &str = "ISTVON_LOG";

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(global.verbose);

    let config = Config::load(global.config.as_deref());

    match cli.command {
        Commands::Convert(args) => commands::convert::run(args, &global, &config),
        Commands::Validate(args) => commands::validate::run(args, &global, &config),
        Commands::Schema(cmd) => commands::schema::run(cmd, &global, &config),
        Commands::Template(cmd) => commands::template::run(cmd, &global, &config),
        Commands::Build(args) => commands::build::run(args, &global, &config),
        Commands::History(cmd) => commands::history::run(cmd, &global, &config),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

/// Log to stderr, filtered by `ISTVON_LOG` (else warn, or debug with --verbose)
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
