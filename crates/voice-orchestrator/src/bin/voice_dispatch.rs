use std::env;

use call_tools::LiveKitConfig;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use voice_orchestrator::{
    AgentDispatch, AgentDispatchClient, CreateDispatchRequest, DEFAULT_DISPATCH_AGENT,
    DEFAULT_DISPATCH_ROOM, MANUAL_DISPATCH_AGENT_ID,
};

const USAGE: &str = "Usage: voice-dispatch <create|list> [--room ROOM] [--agent-name NAME] [--agent-id ID]";

struct Args {
    command: String,
    room: String,
    agent_name: String,
    agent_id: String,
}

fn parse_args() -> Option<Args> {
    let mut args = env::args().skip(1);
    let mut parsed = Args {
        command: args.next()?,
        room: DEFAULT_DISPATCH_ROOM.to_string(),
        agent_name: DEFAULT_DISPATCH_AGENT.to_string(),
        agent_id: MANUAL_DISPATCH_AGENT_ID.to_string(),
    };

    while let Some(flag) = args.next() {
        let value = args.next()?;
        match flag.as_str() {
            "--room" => parsed.room = value,
            "--agent-name" => parsed.agent_name = value,
            "--agent-id" => parsed.agent_id = value,
            _ => return None,
        }
    }
    Some(parsed)
}

fn print_dispatches(room: &str, dispatches: &[AgentDispatch]) {
    println!("{} dispatches in room {}", dispatches.len(), room);
    for dispatch in dispatches {
        println!(
            "  {} agent={} metadata={}",
            dispatch.id, dispatch.agent_name, dispatch.metadata
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let Some(args) = parse_args() else {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    };

    let client = AgentDispatchClient::new(LiveKitConfig::from_env());
    if !client.is_configured() {
        warn!("LiveKit credentials not found in environment; skipping dispatch");
        return Ok(());
    }

    match args.command.as_str() {
        "create" => {
            let request = CreateDispatchRequest::new(&args.agent_name, &args.room, &args.agent_id);
            let dispatch = client.create_dispatch(&request).await?;
            println!(
                "Created dispatch {} for agent '{}' in room {}",
                dispatch.id, dispatch.agent_name, dispatch.room
            );
            let dispatches = client.list_dispatches(&args.room).await?;
            print_dispatches(&args.room, &dispatches);
        }
        "list" => {
            let dispatches = client.list_dispatches(&args.room).await?;
            print_dispatches(&args.room, &dispatches);
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    }

    Ok(())
}
