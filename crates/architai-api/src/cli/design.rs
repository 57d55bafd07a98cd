//! Interactive design session (`architai design`).
//!
//! Drives the question/answer loop against the session controller using
//! dialoguer prompts. Answers served from the turn buffer return instantly;
//! anything that reaches the service shows a spinner. Transport failures
//! leave the session untouched, so the user can simply try again.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use console::style;
use dialoguer::{Confirm, Input};

use architai_core::diagram::render_design_diagrams;
use architai_core::session::{SessionController, TurnOutcome};
use architai_infra::diagram::MermaidFileRenderer;
use architai_infra::gateway::HttpSessionGateway;
use architai_types::design::FinalDesign;
use architai_types::error::SessionError;
use architai_types::session::short_id;

use super::render::{DesignRenderer, design_markdown};
use super::spinner;
use crate::state::AppState;

type Controller = SessionController<Arc<HttpSessionGateway>>;

/// What the user typed at the answer prompt.
#[derive(Debug, PartialEq, Eq)]
enum AnswerInput {
    Answer(String),
    Restart,
    Quit,
}

impl AnswerInput {
    fn parse(raw: &str) -> Self {
        match raw.trim() {
            "/quit" | "/exit" => AnswerInput::Quit,
            "/restart" | "/new" => AnswerInput::Restart,
            other => AnswerInput::Answer(other.to_string()),
        }
    }
}

/// Run a design session from the first prompt to the final design.
pub async fn run_design(state: &AppState, prompt: Option<String>, json: bool) -> Result<()> {
    let controller = SessionController::new(Arc::clone(&state.gateway), state.config.reply_format);
    let mut prompt = prompt;

    loop {
        let idea = match prompt.take() {
            Some(idea) if !idea.trim().is_empty() => idea,
            _ => Input::<String>::new()
                .with_prompt("Describe the system you want to design")
                .interact_text()?,
        };

        let design = match run_session(&controller, &idea).await? {
            SessionEnd::Finalized(design) => design,
            SessionEnd::Restart => {
                controller.reset();
                println!();
                println!("  {} Starting over.", style("*").cyan().bold());
                continue;
            }
            SessionEnd::Quit => {
                if let Some(id) = controller.snapshot().session_id() {
                    println!();
                    println!(
                        "  Session {} left unfinished. Review it later with: {}",
                        style(short_id(id)).yellow(),
                        style(format!("architai show {}", short_id(id))).yellow()
                    );
                }
                return Ok(());
            }
        };

        let session_id = controller
            .snapshot()
            .session_id()
            .map(str::to_owned)
            .unwrap_or_default();
        return present_design(state, &session_id, &design, json).await;
    }
}

enum SessionEnd {
    Finalized(FinalDesign),
    Restart,
    Quit,
}

async fn run_session(controller: &Controller, idea: &str) -> Result<SessionEnd> {
    let progress = spinner("Creating design session...");
    let started = controller.start(idea).await;
    progress.finish_and_clear();
    let mut question = started.context("Failed to create design session")?;

    let snapshot = controller.snapshot();
    if let Some(id) = snapshot.session_id() {
        print_banner(idea, id);
    }

    loop {
        let Some(current) = question.take() else {
            match finalize_interactively(controller).await? {
                Some(design) => return Ok(SessionEnd::Finalized(design)),
                None => return Ok(SessionEnd::Quit),
            }
        };

        println!("\n{} {}", style("ArchitAI:").cyan().bold(), style(&current).bold());
        let raw: String = Input::new().with_prompt("Your answer").interact_text()?;

        let answer = match AnswerInput::parse(&raw) {
            AnswerInput::Answer(answer) => answer,
            AnswerInput::Restart => return Ok(SessionEnd::Restart),
            AnswerInput::Quit => return Ok(SessionEnd::Quit),
        };

        // Buffered questions need no round-trip, so skip the spinner.
        let remote = controller.snapshot().buffer.is_empty();
        let progress = remote.then(|| spinner("Thinking..."));
        let outcome = controller.submit_answer(&answer).await;
        if let Some(progress) = progress {
            progress.finish_and_clear();
        }

        match outcome {
            Ok(TurnOutcome::Buffered { question: next }) => question = Some(next),
            Ok(TurnOutcome::Asked { question: next }) => {
                print_commentary(controller);
                question = Some(next);
            }
            Ok(TurnOutcome::Waiting) => print_commentary(controller),
            Ok(TurnOutcome::Finalized(design)) => return Ok(SessionEnd::Finalized(design)),
            Err(e) if e.is_transient() => {
                print_failure(&e);
                if !Confirm::new()
                    .with_prompt("Try again?")
                    .default(true)
                    .interact()?
                {
                    return Ok(SessionEnd::Quit);
                }
                // Nothing was applied; re-ask whatever is still pending.
                question = controller
                    .snapshot()
                    .current_question()
                    .map(str::to_owned);
            }
            Err(e) => return Err(e).context("Design session failed"),
        }
    }
}

/// Ask for the final design until it arrives or the user gives up.
async fn finalize_interactively(controller: &Controller) -> Result<Option<FinalDesign>> {
    println!();
    if !Confirm::new()
        .with_prompt("No more questions. Generate the final design now?")
        .default(true)
        .interact()?
    {
        return Ok(None);
    }

    loop {
        let progress = spinner("Generating final design...");
        let result = controller.finalize().await;
        progress.finish_and_clear();

        match result {
            Ok(design) => return Ok(Some(design)),
            Err(e) if e.is_transient() => {
                print_failure(&e);
                if !Confirm::new()
                    .with_prompt("Try again?")
                    .default(true)
                    .interact()?
                {
                    return Ok(None);
                }
            }
            Err(SessionError::AlreadyFinalized) => {
                return Ok(controller.snapshot().final_design);
            }
            Err(e) => bail!("Cannot finalize: {e}"),
        }
    }
}

/// Print the design and write its diagrams.
async fn present_design(
    state: &AppState,
    session_id: &str,
    design: &FinalDesign,
    json: bool,
) -> Result<()> {
    let renderer = MermaidFileRenderer::new(&state.diagram_dir);
    let rendered = render_design_diagrams(&renderer, session_id, design).await;

    if json {
        let output = serde_json::json!({
            "session_id": session_id,
            "design": design,
            "diagram_files": rendered.iter().map(|d| &d.locator).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!();
    println!("{}", DesignRenderer::new().render(&design_markdown(design)));

    for diagram in &rendered {
        println!(
            "  {} Diagram written to {}",
            style("✓").green().bold(),
            style(&diagram.locator).cyan()
        );
    }
    println!();

    Ok(())
}

fn print_banner(idea: &str, session_id: &str) {
    println!();
    println!("  {} {}", style("*").cyan().bold(), style("ArchitAI").cyan().bold());
    println!("  {}", style(super::truncate(idea.trim(), 72)).dim());
    println!();
    println!("  {}  {}", style("Session:").bold(), style(short_id(session_id)).dim());
    println!(
        "  {}",
        style("Type /restart to start over, /quit to leave").dim()
    );
    println!("  {}", style("---").dim());
}

fn print_commentary(controller: &Controller) {
    let reply = controller
        .snapshot()
        .last_reply
        .filter(|r| !r.trim().is_empty());
    if let Some(reply) = reply {
        println!("{}", style(reply.trim()).dim());
    }
}

fn print_failure(error: &SessionError) {
    eprintln!();
    eprintln!(
        "  {} The design service did not respond: {error}",
        style("!").red().bold()
    );
    eprintln!("  {}", style("Your session is unchanged.").dim());
}
