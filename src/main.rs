use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ecoledirecte::models::{AccountKind, MessageKind};
use ecoledirecte::{ApiClient, ApiEvent, ClientConfig, Family, HomeworkQuery, Session, Student};

#[derive(Parser)]
#[command(name = "ecoledirecte")]
#[command(about = "Fetch EcoleDirecte data as JSON")]
struct Cli {
    /// For family accounts: the child to act as (defaults to the first one)
    #[arg(long, global = true)]
    child: Option<i64>,

    /// Log every API request and response event
    #[arg(long, global = true)]
    trace_events: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the accounts returned at login
    Account,
    /// List grades
    Grades,
    /// List periods with their subjects
    Periods,
    /// List homework
    Homework {
        /// Day to fetch (YYYY-MM-DD); repeatable. Defaults to every upcoming day.
        #[arg(short, long)]
        date: Vec<String>,

        /// Skip entries without homework
        #[arg(long)]
        only_with_work: bool,
    },
    /// List received and sent messages
    Messages,
    /// Show one message with its content
    Message {
        id: i64,

        /// Read from the sent list instead of the received one
        #[arg(long)]
        sent: bool,
    },
    /// Show the activity timeline
    Timeline,
    /// Download the profile photo
    Photo {
        #[arg(short, long)]
        out: std::path::PathBuf,
    },
}

/// Logs go to stderr so stdout only carries the JSON output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "ecoledirecte=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn student_for(session: &Session, child: Option<i64>) -> anyhow::Result<Student> {
    let main = session.main_account().context("login returned no account")?;
    if main.kind != AccountKind::Family {
        return Ok(Student::new(session)?);
    }

    let family = Family::new(session)?;
    match child {
        Some(id) => Ok(family.student(id)?),
        None => family
            .students()
            .into_iter()
            .next()
            .context("family account has no children"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let username =
        std::env::var("ECOLEDIRECTE_USERNAME").context("ECOLEDIRECTE_USERNAME must be set")?;
    let password =
        std::env::var("ECOLEDIRECTE_PASSWORD").context("ECOLEDIRECTE_PASSWORD must be set")?;

    let client = ApiClient::new(ClientConfig::from_env());
    let event_log = cli.trace_events.then(|| spawn_event_log(client.subscribe()));

    let outcome = match Session::login(client, &username, &password).await {
        Ok(session) => run(cli.command, &session, cli.child).await,
        Err(err) => Err(err.into()),
    };

    // Every client clone is gone by now, which closes the channel: the log ends
    // right after the last response event.
    if let Some(event_log) = event_log {
        event_log.await?;
    }
    outcome
}

async fn run(command: Commands, session: &Session, child: Option<i64>) -> anyhow::Result<()> {
    let student = || student_for(session, child);
    match command {
        Commands::Account => print_json(&session.accounts()),
        Commands::Grades => print_json(&student()?.get_grades().await?),
        Commands::Periods => print_json(&student()?.get_periods().await?),
        Commands::Homework {
            date,
            only_with_work,
        } => {
            let mut query = if date.is_empty() {
                HomeworkQuery::upcoming()
            } else {
                HomeworkQuery::for_dates(date)
            };
            if only_with_work {
                query = query.only_with_work();
            }
            print_json(&student()?.get_homework(query).await?)
        }
        Commands::Messages => print_json(&student()?.get_messages().await?),
        Commands::Message { id, sent } => {
            let kind = if sent {
                MessageKind::Sent
            } else {
                MessageKind::Received
            };
            print_json(&student()?.get_message(id, kind).await?)
        }
        Commands::Timeline => print_json(&student()?.timeline().await?),
        Commands::Photo { out } => match student()?.get_photo().await? {
            Some(bytes) => {
                std::fs::write(&out, &bytes)
                    .with_context(|| format!("failed to write {}", out.display()))?;
                tracing::info!("Wrote {} bytes to {}", bytes.len(), out.display());
                Ok(())
            }
            None => anyhow::bail!("account has no photo"),
        },
    }
}

/// Log API events until every client is gone. Returns how many were logged.
fn spawn_event_log(mut events: broadcast::Receiver<ApiEvent>) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut logged = 0;
        loop {
            match events.recv().await {
                Ok(ApiEvent::Request(req)) => {
                    tracing::info!(id = req.id, "-> {} {}", req.method, req.url)
                }
                Ok(ApiEvent::Response(res)) => tracing::info!(
                    id = res.id,
                    failure = res.failure,
                    "<- {} {}",
                    res.status,
                    res.body.get("code").cloned().unwrap_or_default()
                ),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Event log fell behind");
                    continue;
                }
                Err(RecvError::Closed) => break,
            }
            logged += 1;
        }
        logged
    })
}
