//! Enhancement flow use case.
//!
//! Drives the session engine's effects against the generation collaborator:
//! question fetches recover with the built-in fallback tables, synthesis
//! calls never fall back, every completed synthesis appends exactly one
//! version to the ledger. All state for one session sits behind a single
//! async mutex, so commands execute strictly one at a time.

use promptforge_core::answer::AnswerValue;
use promptforge_core::error::{PromptForgeError, Result};
use promptforge_core::i18n::Language;
use promptforge_core::question::Question;
use promptforge_core::session::{
    CallOutcome, Effect, EnhancementMode, SessionEngine, SessionState, SynthesisKind,
};
use promptforge_core::version::{GeneratedPromptVersion, VersionDraft, VersionLedger};
use promptforge_interaction::defaults::fallback_questions;
use promptforge_interaction::request::{PreparedRequest, RequestBuilder};
use promptforge_interaction::response::{
    AnalysisReport, GenerationResponse, parse_response,
};
use promptforge_interaction::{AgentError, GenerationAgent};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Snapshot of the session handed to the presentation layer after each
/// command.
#[derive(Debug, Clone)]
pub struct FlowView {
    pub state: SessionState,
    /// The question to render, when awaiting answers.
    pub current_question: Option<Question>,
    /// Zero-based position within the round's batch.
    pub cursor: usize,
    pub questions_total: usize,
    /// Count of non-blank answers accumulated so far.
    pub answered_count: usize,
    /// Text of the currently displayed version, if any.
    pub latest_text: Option<String>,
    /// One-tap tweak suggestions from the last final synthesis.
    pub suggested_tweaks: Vec<String>,
    /// The last iterative-analysis verdict, if that mode is running.
    pub last_analysis: Option<AnalysisReport>,
    /// Highest version number assigned in this session's family so far.
    pub iteration_number: u32,
}

/// Everything owned by one session, guarded by one lock.
struct SessionCtx {
    engine: SessionEngine,
    ledger: VersionLedger,
    /// Root id of the family this session appends to; set on the first
    /// synthesized version, cleared by start_over.
    family_root: Option<String>,
    /// Which version the user is currently looking at (revert support).
    current_version_id: Option<String>,
    suggested_tweaks: Vec<String>,
    last_analysis: Option<AnalysisReport>,
}

/// Runs one enhancement session against a generation collaborator.
pub struct EnhancementService {
    agent: Arc<dyn GenerationAgent>,
    ctx: Mutex<SessionCtx>,
}

impl EnhancementService {
    /// Creates a service for a fresh session.
    pub fn new(agent: Arc<dyn GenerationAgent>, mode: EnhancementMode, language: Language) -> Self {
        Self {
            agent,
            ctx: Mutex::new(SessionCtx {
                engine: SessionEngine::new(mode, language),
                ledger: VersionLedger::new(),
                family_root: None,
                current_version_id: None,
                suggested_tweaks: Vec::new(),
                last_analysis: None,
            }),
        }
    }

    /// Starts the flow from the user's raw input.
    pub async fn start(&self, input: &str) -> Result<FlowView> {
        let mut ctx = self.ctx.lock().await;
        let effects = ctx.engine.start(input)?;
        self.run_effects(&mut ctx, effects).await?;
        Ok(Self::view(&ctx))
    }

    /// Submits an answer for the current question.
    pub async fn submit_answer(&self, value: AnswerValue) -> Result<FlowView> {
        let mut ctx = self.ctx.lock().await;
        let effects = ctx.engine.submit_answer(value)?;
        self.run_effects(&mut ctx, effects).await?;
        Ok(Self::view(&ctx))
    }

    /// Skips the current question.
    pub async fn skip_current(&self) -> Result<FlowView> {
        let mut ctx = self.ctx.lock().await;
        let effects = ctx.engine.skip_current()?;
        self.run_effects(&mut ctx, effects).await?;
        Ok(Self::view(&ctx))
    }

    /// Revisits the previous question (GuidedFiveQuestion flows).
    pub async fn previous(&self) -> Result<FlowView> {
        let mut ctx = self.ctx.lock().await;
        ctx.engine.previous()?;
        Ok(Self::view(&ctx))
    }

    /// Confirms the round, running whatever generation call the mode wants.
    pub async fn confirm_round(&self) -> Result<FlowView> {
        let mut ctx = self.ctx.lock().await;
        let effects = ctx.engine.confirm_round()?;
        self.run_effects(&mut ctx, effects).await?;
        Ok(Self::view(&ctx))
    }

    /// Accepts the latest result, ending the session.
    pub async fn accept_result(&self) -> Result<FlowView> {
        let mut ctx = self.ctx.lock().await;
        ctx.engine.accept_result()?;
        Ok(Self::view(&ctx))
    }

    /// Continues refining after a preliminary result.
    pub async fn continue_refining(&self) -> Result<FlowView> {
        let mut ctx = self.ctx.lock().await;
        let effects = ctx.engine.continue_refining()?;
        self.run_effects(&mut ctx, effects).await?;
        Ok(Self::view(&ctx))
    }

    /// Applies a named tweak to the currently displayed version.
    ///
    /// Appends a new version to the same family; round and iteration
    /// counters are untouched.
    pub async fn tweak(&self, tweak: &str) -> Result<FlowView> {
        let mut ctx = self.ctx.lock().await;
        let base = Self::displayed_version(&ctx)
            .ok_or_else(|| {
                PromptForgeError::validation("no generated prompt to tweak yet")
            })?
            .clone();

        let request = RequestBuilder::tweak(
            &base.generated_text,
            tweak,
            &ctx.engine.session().language,
        )?;
        let ticket = ctx.engine.begin_call()?;
        let raw = match self.agent.execute(request.payload).await {
            Ok(raw) => raw,
            Err(err) => {
                ctx.engine.abort_call(ticket);
                return Err(map_agent_error(err));
            }
        };
        let response = match parse_response(&raw, request.expected) {
            Ok(response) => response,
            Err(err) => {
                ctx.engine.abort_call(ticket);
                return Err(err);
            }
        };

        if ctx.engine.complete_tweak(ticket)?.is_stale() {
            return Ok(Self::view(&ctx));
        }

        let text = response
            .generated_text()
            .ok_or_else(|| PromptForgeError::schema("enhanced_prompt", "tweak"))?
            .to_string();
        let draft = VersionDraft {
            family_root: Some(base.family_root().to_string()),
            original_input: base.original_input.clone(),
            generated_text: text,
            mode: ctx.engine.session().mode,
            questions_snapshot: base.questions_snapshot.clone(),
        };
        let version = ctx.ledger.append(draft)?;
        tracing::info!(version = version.version, "tweak '{}' applied", tweak);
        ctx.current_version_id = Some(version.id.clone());
        Ok(Self::view(&ctx))
    }

    /// Makes a past version the displayed one.
    pub async fn revert_to(&self, version_id: &str) -> Result<FlowView> {
        let mut ctx = self.ctx.lock().await;
        if ctx.ledger.get(version_id).is_none() {
            return Err(PromptForgeError::not_found("prompt version", version_id));
        }
        ctx.current_version_id = Some(version_id.to_string());
        Ok(Self::view(&ctx))
    }

    /// All versions of the session's family, oldest first.
    pub async fn versions(&self) -> Vec<GeneratedPromptVersion> {
        let ctx = self.ctx.lock().await;
        match &ctx.family_root {
            Some(root) => ctx.ledger.list_family(root).into_iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// The currently displayed version, if any.
    pub async fn displayed(&self) -> Option<GeneratedPromptVersion> {
        let ctx = self.ctx.lock().await;
        Self::displayed_version(&ctx).cloned()
    }

    /// Discards everything and returns to the home state. An in-flight
    /// provider result, if any, is dropped when it arrives.
    pub async fn start_over(&self) -> FlowView {
        let mut ctx = self.ctx.lock().await;
        ctx.engine.start_over();
        ctx.family_root = None;
        ctx.current_version_id = None;
        ctx.suggested_tweaks.clear();
        ctx.last_analysis = None;
        Self::view(&ctx)
    }

    /// Current snapshot without changing anything.
    pub async fn current_view(&self) -> FlowView {
        let ctx = self.ctx.lock().await;
        Self::view(&ctx)
    }

    // ============================================================================
    // Effect execution
    // ============================================================================

    async fn run_effects(&self, ctx: &mut SessionCtx, effects: Vec<Effect>) -> Result<()> {
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::FetchQuestions { round } => {
                    match self.fetch_questions(ctx, round).await? {
                        CallOutcome::Applied(more) => queue.extend(more),
                        CallOutcome::Stale => return Ok(()),
                    }
                }
                Effect::RequestSynthesis { kind } => {
                    match self.run_synthesis(ctx, kind).await? {
                        CallOutcome::Applied(more) => queue.extend(more),
                        CallOutcome::Stale => return Ok(()),
                    }
                }
            }
        }
        Ok(())
    }

    /// Obtains a question batch, falling back to the built-in tables when
    /// the collaborator fails. Only question generation may fall back.
    async fn fetch_questions(&self, ctx: &mut SessionCtx, round: u32) -> Result<CallOutcome> {
        let mode = ctx.engine.session().mode;
        let request = RequestBuilder::question_batch(ctx.engine.session())?;
        let ticket = ctx.engine.begin_call()?;

        let questions = match self.agent.execute(request.payload).await {
            Ok(raw) => match parse_response(&raw, request.expected) {
                Ok(GenerationResponse::QuestionBatch(questions)) => questions,
                Ok(GenerationResponse::Analysis(report)) => {
                    let questions = report.questions.clone();
                    ctx.last_analysis = Some(report);
                    questions
                }
                Ok(_) | Err(_) => {
                    tracing::warn!(
                        round,
                        "unusable question response, using fallback table"
                    );
                    fallback_questions(mode, round)
                }
            },
            Err(err) => {
                tracing::warn!(round, error = %err, "question generation failed, using fallback table");
                fallback_questions(mode, round)
            }
        };

        ctx.engine.install_questions(ticket, questions)
    }

    /// Runs one generation call. Failures leave the engine in its pre-call
    /// state and surface as a single error; they are never retried here.
    async fn run_synthesis(&self, ctx: &mut SessionCtx, kind: SynthesisKind) -> Result<CallOutcome> {
        let request = Self::synthesis_request(ctx, kind)?;
        let ticket = ctx.engine.begin_call()?;

        let raw = match self.agent.execute(request.payload).await {
            Ok(raw) => raw,
            Err(err) => {
                ctx.engine.abort_call(ticket);
                return Err(map_agent_error(err));
            }
        };
        let response = match parse_response(&raw, request.expected) {
            Ok(response) => response,
            Err(err) => {
                ctx.engine.abort_call(ticket);
                return Err(err);
            }
        };

        let Some(text) = response.generated_text().map(str::to_string) else {
            ctx.engine.abort_call(ticket);
            return Err(PromptForgeError::internal(
                "synthesis response carried no text",
            ));
        };
        let tweaks = match &response {
            GenerationResponse::Final { lazy_tweaks, .. } => lazy_tweaks.clone(),
            _ => Vec::new(),
        };

        let outcome = ctx.engine.complete_synthesis(ticket, kind)?;
        if outcome.is_stale() {
            return Ok(outcome);
        }

        // Exactly one version per completed synthesis call.
        let session = ctx.engine.session();
        let snapshot = if session.answers.is_empty() {
            None
        } else {
            Some(session.answers.serialize())
        };
        let draft = VersionDraft {
            family_root: ctx.family_root.clone(),
            original_input: session.original_input.clone(),
            generated_text: text,
            mode: session.mode,
            questions_snapshot: snapshot,
        };
        let version = ctx.ledger.append(draft)?;
        tracing::info!(
            version = version.version,
            ?kind,
            "synthesis produced version {}",
            version.version
        );
        if ctx.family_root.is_none() {
            ctx.family_root = Some(version.id.clone());
        }
        ctx.current_version_id = Some(version.id.clone());
        ctx.suggested_tweaks = tweaks;
        Ok(outcome)
    }

    fn synthesis_request(ctx: &SessionCtx, kind: SynthesisKind) -> Result<PreparedRequest> {
        let session = ctx.engine.session();
        match kind {
            SynthesisKind::SuperLazy => RequestBuilder::super_lazy(&session.original_input),
            SynthesisKind::Preliminary => RequestBuilder::preliminary(session),
            SynthesisKind::Final | SynthesisKind::Iteration => {
                RequestBuilder::synthesis(session)
            }
        }
    }

    fn displayed_version(ctx: &SessionCtx) -> Option<&GeneratedPromptVersion> {
        if let Some(id) = &ctx.current_version_id {
            return ctx.ledger.get(id);
        }
        ctx.family_root
            .as_deref()
            .and_then(|root| ctx.ledger.latest(root))
    }

    fn view(ctx: &SessionCtx) -> FlowView {
        FlowView {
            state: ctx.engine.state(),
            current_question: ctx.engine.current_question().cloned(),
            cursor: ctx.engine.cursor(),
            questions_total: ctx.engine.questions().len(),
            answered_count: ctx.engine.session().answered_count(),
            latest_text: Self::displayed_version(ctx)
                .map(|version| version.generated_text.clone()),
            suggested_tweaks: ctx.suggested_tweaks.clone(),
            last_analysis: ctx.last_analysis.clone(),
            iteration_number: ctx
                .family_root
                .as_deref()
                .map(|root| ctx.ledger.iteration_number(root))
                .unwrap_or(0),
        }
    }
}

fn map_agent_error(err: AgentError) -> PromptForgeError {
    let retryable = err.is_retryable();
    PromptForgeError::network(err.to_string(), retryable)
}
