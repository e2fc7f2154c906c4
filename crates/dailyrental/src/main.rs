use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use dailyrental::config::DailyRentalConfig;
use dailyrental::domain::{Customer, CustomerId, Rental, RentalCategory, RentalId, VehicleHandler};
use dailyrental::logging;
use dailyrental::storage::{JsonFileRentalRepository, RentalRepository};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
#[command(name = "dailyrental")]
#[command(about = "Daily rental checkout handling")]
struct Args {
    #[arg(short, long, global = true, help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Print the default configuration and exit")]
    gen_config: bool,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new rental
    Create {
        #[arg(long, value_parser = parse_timestamp)]
        start: NaiveDateTime,
        #[arg(long, value_parser = parse_timestamp)]
        end: NaiveDateTime,
        #[arg(long)]
        category: RentalCategory,
        #[arg(long)]
        customer_id: String,
        #[arg(long, default_value = "")]
        customer_name: String,
        #[arg(long, help = "Exempt the customer from checkout adjustments")]
        favorite: bool,
    },
    /// Check the vehicle of a rental out
    Checkout {
        rental_id: RentalId,
        #[arg(long, value_parser = parse_timestamp)]
        at: NaiveDateTime,
    },
    /// Check the vehicle of a rental back in
    Checkin { rental_id: RentalId },
    /// Print a rental as JSON
    Show { rental_id: RentalId },
}

fn parse_timestamp(value: &str) -> std::result::Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .map_err(|e| format!("expected YYYY-MM-DDTHH:MM[:SS]: {}", e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_logging(&args.verbosity, logging::DEFAULT_FILTER)?;

    if args.gen_config {
        let toml = toml::to_string_pretty(&DailyRentalConfig::default())?;
        println!("{}", toml);
        return Ok(());
    }

    let command = args
        .command
        .ok_or_else(|| anyhow!("no command given, see --help"))?;

    let config = DailyRentalConfig::load(args.config)?;
    info!(
        environment = %config.service.environment,
        data_file = %config.storage.data_file.display(),
        "Configuration loaded"
    );

    let repository = Arc::new(JsonFileRentalRepository::new(&config.storage.data_file));
    let handler = VehicleHandler::new(repository.clone());

    match command {
        Command::Create {
            start,
            end,
            category,
            customer_id,
            customer_name,
            favorite,
        } => {
            let customer = Customer::new(CustomerId::new(customer_id), customer_name, favorite);
            let rental = Rental::new(start, end, category, customer)?;
            repository.create_rental(&rental).await?;
            println!("{}", rental.id);
        }
        Command::Checkout { rental_id, at } => {
            let mut rental = load_rental(repository.as_ref(), &rental_id).await?;
            let decision = handler.checkout(&mut rental, at).await?;
            info!(rental_id = %rental.id, ?decision, "Checkout applied");
            println!("{}", serde_json::to_string_pretty(&rental)?);
        }
        Command::Checkin { rental_id } => {
            let mut rental = load_rental(repository.as_ref(), &rental_id).await?;
            handler.checkin(&mut rental).await?;
            println!("{}", serde_json::to_string_pretty(&rental)?);
        }
        Command::Show { rental_id } => {
            let rental = load_rental(repository.as_ref(), &rental_id).await?;
            println!("{}", serde_json::to_string_pretty(&rental)?);
        }
    }

    Ok(())
}

async fn load_rental(repository: &dyn RentalRepository, rental_id: &RentalId) -> Result<Rental> {
    repository
        .get_rental(rental_id)
        .await?
        .with_context(|| format!("rental {} not found", rental_id))
}
