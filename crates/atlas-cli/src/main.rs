use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use reqwest::Method;
use tracing_subscriber::EnvFilter;

use atlas_client::{ClientConfig, KeyStoreType, RemoteClient, SslConfig, parse_event_stream};
use atlas_core::{Country, Person, PersonDraft};

#[derive(Parser)]
#[command(name = "atlas", version, about = "Client for Atlas country and person services")]
struct Cli {
    #[command(flatten)]
    connection: Connection,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Connection {
    /// Service base URL
    #[arg(
        long,
        global = true,
        env = "REMOTE_SERVICES_URL",
        default_value = "http://localhost:8080"
    )]
    url: String,

    /// Bearer token sent with every request
    #[arg(long, global = true, env = "ATLAS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Client key store for mutual TLS
    #[arg(long, global = true, env = "REMOTE_SERVICES_SSL_KEY_STORE")]
    key_store: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "REMOTE_SERVICES_SSL_KEY_STORE_PASSWORD",
        hide_env_values = true,
        default_value = ""
    )]
    key_store_password: String,

    /// PKCS12 or PEM
    #[arg(
        long,
        global = true,
        env = "REMOTE_SERVICES_SSL_KEY_STORE_TYPE",
        default_value = "PKCS12"
    )]
    key_store_type: KeyStoreType,

    /// PEM bundle of extra CA certificates to trust
    #[arg(long, global = true, env = "REMOTE_SERVICES_SSL_TRUST_STORE")]
    trust_store: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with countries
    #[command(subcommand)]
    Countries(CountryCommand),

    /// Work with persons
    #[command(subcommand)]
    Persons(PersonCommand),
}

#[derive(Subcommand)]
enum CountryCommand {
    /// Stream every country as one JSON line each
    List,
    /// Show one country
    Get { name: String },
    /// Create a country (admin role required)
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        code: String,
        #[arg(long)]
        population: Option<i64>,
    },
    /// Delete a country (admin role required)
    Delete { name: String },
}

#[derive(Subcommand)]
enum PersonCommand {
    /// Stream every person as one JSON line each
    List,
    /// Show one person
    Get { id: i64 },
    /// Create a person in an existing country
    Create {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        country: String,
        #[arg(long)]
        email: Option<String>,
        /// Birth date as YYYY-MM-DD
        #[arg(long)]
        birth_date: Option<NaiveDate>,
    },
    /// Delete a person
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("atlas=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = connect(&cli.connection)?;
    let token = cli.connection.token.as_deref();

    match cli.command {
        Commands::Countries(command) => countries(&client, token, command).await,
        Commands::Persons(command) => persons(&client, token, command).await,
    }
}

fn connect(connection: &Connection) -> Result<RemoteClient> {
    let mut config = ClientConfig::new(&connection.url)?;
    if let Some(key_store) = &connection.key_store {
        config = config.with_ssl(SslConfig {
            key_store: key_store.clone(),
            key_store_password: connection.key_store_password.clone(),
            key_store_type: connection.key_store_type,
            trust_store: connection.trust_store.clone(),
        });
    }
    RemoteClient::new(&config).context("Failed to build HTTP client")
}

async fn countries(client: &RemoteClient, token: Option<&str>, command: CountryCommand) -> Result<()> {
    match command {
        CountryCommand::List => print_stream(client, token, "countries", "country").await,
        CountryCommand::Get { name } => {
            let Some(country) = client
                .get_json::<Country>(&["countries", &name], token)
                .await?
            else {
                bail!("Country not found: {name}");
            };
            println!("{}", serde_json::to_string_pretty(&country)?);
            Ok(())
        }
        CountryCommand::Create {
            name,
            code,
            population,
        } => {
            let mut country = Country::new(name, code);
            country.population = population;
            country.validate()?;
            let created: Country = client
                .send_json(Method::POST, &["countries"], &country, token)
                .await?;
            println!("{}", serde_json::to_string_pretty(&created)?);
            Ok(())
        }
        CountryCommand::Delete { name } => {
            client.delete(&["countries", &name], token).await?;
            eprintln!("Deleted country {name}");
            Ok(())
        }
    }
}

async fn persons(client: &RemoteClient, token: Option<&str>, command: PersonCommand) -> Result<()> {
    match command {
        PersonCommand::List => print_stream(client, token, "persons", "person").await,
        PersonCommand::Get { id } => {
            let path = id.to_string();
            let Some(person) = client
                .get_json::<Person>(&["persons", &path], token)
                .await?
            else {
                bail!("Person not found: {id}");
            };
            println!("{}", serde_json::to_string_pretty(&person)?);
            Ok(())
        }
        PersonCommand::Create {
            first_name,
            last_name,
            country,
            email,
            birth_date,
        } => {
            let draft = PersonDraft {
                first_name,
                last_name,
                email,
                birth_date,
                country,
            };
            draft.validate()?;
            let created: Person = client
                .send_json(Method::POST, &["persons"], &draft, token)
                .await?;
            println!("{}", serde_json::to_string_pretty(&created)?);
            Ok(())
        }
        PersonCommand::Delete { id } => {
            client.delete(&["persons", &id.to_string()], token).await?;
            eprintln!("Deleted person {id}");
            Ok(())
        }
    }
}

/// Print the `data` of every `event` entry in the stream at `path`, one JSON line each.
async fn print_stream(
    client: &RemoteClient,
    token: Option<&str>,
    path: &str,
    event: &str,
) -> Result<()> {
    let body = client.get_text(&[path], token).await?;
    let mut count = 0;
    for item in parse_event_stream(&body)
        .into_iter()
        .filter(|e| e.event.as_deref().is_none_or(|name| name == event))
    {
        println!("{}", item.data);
        count += 1;
    }
    tracing::debug!(count, path, "Stream finished");
    Ok(())
}
