use annai::prelude::*;
use clap::{Parser, ValueEnum};
use serde_json::Value;
use std::io::{self, Write};

/// CLI-facing journey selector for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum JourneyCli {
    Ntb,
    NtbConversion,
    EtbNk,
    EtbAk,
    Etb,
}

impl JourneyCli {
    fn into_journey(self) -> JourneyType {
        match self {
            JourneyCli::Ntb => JourneyType::Ntb,
            JourneyCli::NtbConversion => JourneyType::NtbConversion,
            JourneyCli::EtbNk => JourneyType::EtbWithKyc,
            JourneyCli::EtbAk => JourneyType::EtbAadhaarKyc,
            JourneyCli::Etb => JourneyType::EtbExpress,
        }
    }
}

/// A resumable journey engine CLI: inspect flows and walk a journey with a
/// durable session file.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The journey to inspect or start
    #[arg(short, long, value_enum)]
    journey: Option<JourneyCli>,

    /// Path to the durable session file
    #[arg(short, long, default_value = "journey_session.bin")]
    session: String,

    /// Entry URL to parse for the resume flag
    #[arg(short, long)]
    url: Option<String>,

    /// Run in interactive mode and walk the journey step by step
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let entry = match cli.url.as_deref() {
        Some(raw) => {
            let (entry, cleaned) = EntryPoint::from_url(raw);
            if let Some(cleaned) = cleaned {
                println!("Resume entry detected; cleaned URL: {cleaned}");
            }
            entry
        }
        None => EntryPoint::fresh(),
    };

    let storage = FileStore::open(&cli.session)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to open session store: {e}")));
    let mut session = JourneySession::init(storage, entry);

    if cli.human {
        run_interactive(&mut session, cli.journey.map(JourneyCli::into_journey));
    } else {
        run_non_interactive(&session, cli.journey.map(JourneyCli::into_journey));
    }
}

/// Prints the flow for a journey (or the restored session state) and exits.
fn run_non_interactive(session: &JourneySession<FileStore>, journey: Option<JourneyType>) {
    match journey {
        Some(journey) => {
            println!("Flow for journey '{journey}':");
            for (index, step) in build_steps(journey, session.catalog()).iter().enumerate() {
                println!("  {index}: {} ({})", step.id, step.title);
            }
        }
        None => {
            println!("Session phase: {:?}", session.phase());
            if let Some(journey) = session.journey_type() {
                println!("Journey:       {journey}");
            }
            println!("Step index:    {}", session.current_index());
            if let Some(step) = session.current_step() {
                println!("Current step:  {} ({})", step.id, step.title);
            }
            let changed = session.changed_fields();
            if !changed.is_empty() {
                println!("Changed:       {}", changed.join(", "));
            }
        }
    }
}

/// Walks a journey interactively, persisting every move to the session file.
fn run_interactive(session: &mut JourneySession<FileStore>, journey: Option<JourneyType>) {
    println!("--- Annai Interactive Mode ---");

    if session.phase() == JourneyPhase::Idle {
        let journey = journey.unwrap_or(JourneyType::Ntb);
        println!("Starting journey '{journey}'");
        session.start_journey(journey, None, None);
    } else {
        println!("Resuming saved session");
    }

    loop {
        render(session);
        let line = prompt_for_input(
            "next / back / jump <id> / set <key> <json> / switch <journey> / reset / quit",
            None,
        );
        let mut parts = line.splitn(3, ' ');
        match (parts.next().unwrap_or(""), parts.next(), parts.next()) {
            ("next" | "n", _, _) => session.advance(),
            ("back" | "b", _, _) => session.retreat(),
            ("jump" | "j", Some(id), _) => session.jump_to(&StepId::new(id)),
            ("set", Some(key), Some(raw)) => match serde_json::from_str::<Value>(raw) {
                Ok(value) => session.merge_draft(FormDraft::from_pairs([(key, value)])),
                Err(e) => println!("Invalid JSON value: {e}"),
            },
            ("switch", Some(name), _) => match JourneyType::parse(name) {
                Some(journey) => session.switch_flow(journey),
                None => println!("Unknown journey '{name}'"),
            },
            ("reset", _, _) => session.reset(),
            ("quit" | "q", _, _) => break,
            ("", _, _) => session.advance(),
            (other, _, _) => println!("Unknown command '{other}'"),
        }
        if session.phase() == JourneyPhase::Terminal {
            render(session);
            println!("\nJourney complete.");
            break;
        }
    }
}

fn render(session: &JourneySession<FileStore>) {
    println!();
    for (index, step) in session.steps().iter().enumerate() {
        let marker = if index == session.current_index() { ">" } else { " " };
        println!("  {marker} {index}: {}", step.title);
    }
    if let Some(branch) = session.branch() {
        println!("  ! detour: {branch}");
    }
    if let Some(action) = session.primary_action() {
        println!("  [{}]", action.label);
    }
    let changed = session.changed_fields();
    if !changed.is_empty() {
        println!("  changed fields: {}", changed.join(", "));
    }
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default.map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    io::stdout().flush().unwrap();

    io::stdin()
        .read_line(&mut line)
        .expect("Failed to read line");
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
