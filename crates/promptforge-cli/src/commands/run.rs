//! Interactive enhancement flows on stdin/stdout.
//!
//! Thin presentation over `EnhancementService`: renders the current
//! `FlowView`, forwards the user's action, repeats until a terminal state.

use anyhow::Result;
use promptforge_application::{EnhancementService, FlowView};
use promptforge_core::answer::AnswerValue;
use promptforge_core::i18n::{Language, NoopTranslator, Translator};
use promptforge_core::question::Question;
use promptforge_core::session::{EnhancementMode, SessionState};
use std::io::{self, BufRead, Write};

pub async fn enhance(input: &str) -> Result<()> {
    let agent = super::select_agent()?;
    let service = EnhancementService::new(agent, EnhancementMode::SuperLazy, Language::Auto);
    let view = service.start(input).await?;
    print_result(&view);
    offer_tweaks(&service, view).await
}

pub async fn guided(input: &str, language: Language) -> Result<()> {
    run_flow(EnhancementMode::GuidedFiveQuestion, input, language).await
}

pub async fn topics(input: &str, language: Language) -> Result<()> {
    run_flow(EnhancementMode::ThreeRoundTopic, input, language).await
}

pub async fn analyze(input: &str, language: Language) -> Result<()> {
    run_flow(EnhancementMode::IterativeAnalysis, input, language).await
}

async fn run_flow(mode: EnhancementMode, input: &str, language: Language) -> Result<()> {
    let agent = super::select_agent()?;
    let translator = NoopTranslator;
    let service = EnhancementService::new(agent, mode, language.clone());
    let mut view = service.start(input).await?;

    loop {
        match view.state {
            SessionState::AwaitingAnswers { round } => {
                if let Some(report) = &view.last_analysis {
                    println!(
                        "\nPrompt quality: {}/100 ({})",
                        report.score,
                        report.score_label.as_str()
                    );
                }
                view = match view.current_question.clone() {
                    Some(question) => {
                        let label =
                            translator.translate(&language, &question.topic, None);
                        ask_question(&service, mode, round, &label, &question, &view)
                            .await?
                    }
                    // Cursor past the end but below the answer minimum.
                    None => {
                        println!("\nMore answers are needed to finish this round.");
                        service.previous().await?
                    }
                };
            }
            SessionState::RoundComplete { .. } => {
                view = service.confirm_round().await?;
            }
            SessionState::PreliminaryOffered { .. } => {
                print_result(&view);
                print!("\nKeep refining? [y/N] ");
                io::stdout().flush()?;
                view = if read_line()?.eq_ignore_ascii_case("y") {
                    service.continue_refining().await?
                } else {
                    service.accept_result().await?
                };
            }
            SessionState::MaxIterationsReached => {
                println!("\nIteration limit reached.");
                view = service.accept_result().await?;
            }
            SessionState::Finished => {
                print_result(&view);
                return offer_tweaks(&service, view).await;
            }
            // Only reachable when a question fetch was interrupted.
            SessionState::Idle | SessionState::FetchingQuestions { .. } => {
                anyhow::bail!("session ended unexpectedly");
            }
        }
    }
}

async fn ask_question(
    service: &EnhancementService,
    mode: EnhancementMode,
    round: u32,
    topic_label: &str,
    question: &Question,
    view: &FlowView,
) -> Result<FlowView> {
    println!(
        "\n[Round {} · {}] ({}/{}) {}",
        round,
        topic_label,
        view.cursor + 1,
        view.questions_total,
        question.prompt_text
    );
    for (index, option) in question.options.iter().enumerate() {
        let emoji = option.emoji.as_deref().unwrap_or(" ");
        println!("  {}. {} {}", index + 1, emoji, option.text);
    }
    let back_hint = if mode.allows_revisiting() { ", p = back" } else { "" };
    print!("Answer (number or text, Enter = skip{}): ", back_hint);
    io::stdout().flush()?;

    let line = read_line()?;
    if line.is_empty() {
        return Ok(service.skip_current().await?);
    }
    if line.eq_ignore_ascii_case("p") && mode.allows_revisiting() {
        return Ok(service.previous().await?);
    }

    let value = match line.parse::<usize>() {
        Ok(index) if index >= 1 && index <= question.options.len() => {
            AnswerValue::Selected(question.options[index - 1].text.clone())
        }
        _ => AnswerValue::Custom(line),
    };
    Ok(service.submit_answer(value).await?)
}

async fn offer_tweaks(service: &EnhancementService, mut view: FlowView) -> Result<()> {
    loop {
        if !view.suggested_tweaks.is_empty() {
            println!("\nSuggested tweaks: {}", view.suggested_tweaks.join(", "));
        }
        print!("Apply a tweak (Enter to finish): ");
        io::stdout().flush()?;
        let tweak = read_line()?;
        if tweak.is_empty() {
            return Ok(());
        }
        view = service.tweak(&tweak).await?;
        print_result(&view);
    }
}

fn print_result(view: &FlowView) {
    if let Some(text) = &view.latest_text {
        println!("\n--- version {} ---", view.iteration_number);
        println!("{}", text);
    }
}

fn read_line() -> Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
