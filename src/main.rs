use anyhow::Context;
use futures::StreamExt;

use trip_planner::agent::submission::HELP_TEXT;
use trip_planner::agent::{Orchestrator, PlannerSession, Submission, SubmissionParser};
use trip_planner::channels::{Channel, CliChannel, OutgoingResponse, StatusUpdate};
use trip_planner::config::PlannerConfig;
use trip_planner::flights::FlightPricingClient;
use trip_planner::llm::create_provider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs share stderr with the prompt; stdout is the conversation.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = PlannerConfig::from_env().context("failed to load configuration")?;

    eprintln!("✈️  Trip Planner v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.llm.model);
    eprintln!("   Flights: {}", config.flights.base_url);
    eprintln!("   Type a message and press Enter. /help for commands, /quit to exit.\n");

    let llm = create_provider(&config.llm)?;
    let flights = FlightPricingClient::new(config.flights.clone())?;
    let mut orchestrator = Orchestrator::new(llm, flights);

    let channel = CliChannel::new();
    let mut messages = channel.start().await?;

    let mut session = PlannerSession::new();
    channel.announce(&orchestrator.start(&session));

    while let Some(msg) = messages.next().await {
        let reply = match SubmissionParser::parse(&msg.content) {
            Submission::Quit => break,
            Submission::Help => HELP_TEXT.to_string(),
            Submission::Summary => {
                let summary = session.collector.preferences().summary();
                if summary.is_empty() {
                    "Nothing recorded yet.".to_string()
                } else {
                    summary
                }
            }
            Submission::NewSession => {
                tracing::info!(previous = %session.id, "Starting a new session");
                session = PlannerSession::new();
                orchestrator.start(&session)
            }
            Submission::UserInput { content } => {
                channel
                    .send_status(StatusUpdate::Thinking("Thinking...".to_string()))
                    .await?;
                let reply = orchestrator.handle_turn(&mut session, &content).await;
                if session.is_finished() && session.itinerary.is_none() {
                    // Farewell: say goodbye and exit.
                    channel.respond(&msg, OutgoingResponse::text(reply)).await?;
                    break;
                }
                reply
            }
        };
        channel.respond(&msg, OutgoingResponse::text(reply)).await?;
    }

    channel.shutdown().await?;
    tracing::info!(
        session = %session.id,
        phase = %session.phase(),
        llm_cost = %session.llm_cost,
        "Planner exiting"
    );
    Ok(())
}
