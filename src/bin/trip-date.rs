use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use trip_planner::{
    client::{HttpTripClient, DEFAULT_FAILURE},
    config::ClientConfig,
    controller::TripDateController,
    dates::{format_date, is_in_past},
    models::trip::{NewTrip, Trip},
};

#[derive(Debug, Parser)]
#[command(name = "trip-date", about = "Set or clear trip start dates")]
struct Cli {
    #[command(flatten)]
    client: ClientConfig,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all trips with their start dates
    List,
    /// Show a single trip
    Show { id: String },
    /// Create a trip
    Create {
        title: String,
        #[arg(long)]
        destination: Option<String>,
        #[arg(long)]
        start_date: Option<String>,
    },
    /// Set or change a trip's start date
    Set { id: String, date: String },
    /// Remove a trip's start date
    Clear { id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    trip_planner::init_logging("warn");

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let client = HttpTripClient::new(&cli.client.api_url, cli.client.token.clone())?;

    match cli.command {
        Command::List => {
            let trips = client.list_trips().await.context("list trips")?;
            if trips.is_empty() {
                println!("no trips");
            }
            for trip in &trips {
                print_trip(trip);
            }
        }
        Command::Show { id } => {
            let trip = client.get_trip(&id).await.context("load trip")?;
            print_trip(&trip);
        }
        Command::Create {
            title,
            destination,
            start_date,
        } => {
            let trip = client
                .create_trip(&NewTrip {
                    title,
                    destination,
                    timezone: None,
                    start_date,
                })
                .await
                .context("create trip")?;
            print_trip(&trip);
        }
        Command::Set { id, date } => {
            let trip = client.get_trip(&id).await.context("load trip")?;
            let mut controller = TripDateController::new();
            controller.open(&trip)?;
            controller.edit(date)?;
            let updated = controller.submit(&client).await?;
            finish(trip, updated, &controller)?;
        }
        Command::Clear { id } => {
            let trip = client.get_trip(&id).await.context("load trip")?;
            let mut controller = TripDateController::new();
            controller.open(&trip)?;
            let updated = controller.clear(&client).await?;
            finish(trip, updated, &controller)?;
        }
    }

    Ok(())
}

/// Swaps in the returned trip, or reports the message the controller kept.
fn finish(
    original: Trip,
    updated: Option<Trip>,
    controller: &TripDateController,
) -> anyhow::Result<()> {
    match updated {
        Some(trip) => {
            print_trip(&trip);
            Ok(())
        }
        None => {
            let message = controller
                .error_message()
                .unwrap_or(DEFAULT_FAILURE)
                .to_string();
            anyhow::bail!("{}: {message}", original.title)
        }
    }
}

fn print_trip(trip: &Trip) {
    let past = if is_in_past(trip.start_date.as_deref()) {
        " (past)"
    } else {
        ""
    };
    println!(
        "{}  {}  [{}]  {}{}",
        trip.id,
        trip.title,
        trip.status,
        format_date(trip.start_date.as_deref()),
        past
    );
}
