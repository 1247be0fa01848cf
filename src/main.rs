use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "firetrack",
    about = "FIRE milestone tracker: inflation-adjusted targets, accumulation and drawdown"
)]
struct App {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the projection report as JSON
    Project(firetrack::api::Cli),
    /// Serve the projection API over HTTP
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,firetrack=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    let app = App::parse();

    match app.command {
        Command::Project(cli) => match firetrack::api::render_projection(cli) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("Projection failed: {e}");
                std::process::exit(1);
            }
        },
        Command::Serve { port } => {
            if let Err(e) = firetrack::api::run_http_server(port).await {
                error!("Server error: {e}");
                std::process::exit(1);
            }
        }
    }
}
