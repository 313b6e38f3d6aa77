// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppError,
    quiz::{Phase, QuizSession, ScoreReport, build_report},
    sessions::{self, SharedSlot},
    state::AppState,
};

/// One answer option as shown on screen. `index` is the canonical
/// option index; clients send it back untouched when answering, so the
/// randomized display order never reaches the session.
#[derive(Debug, Serialize)]
pub struct DisplayOption {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub text: String,
    pub options: Vec<DisplayOption>,
}

/// Feedback for the current question once it is settled.
#[derive(Debug, Serialize)]
pub struct AnswerFeedback {
    pub is_correct: bool,
    /// `None` when the timer ran out.
    pub chosen_option: Option<String>,
    pub correct_option: String,
}

/// Read-only snapshot of a session, safe to hand to any client: the
/// correct option is revealed only through `feedback`, after the
/// question is settled.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub state: &'static str,
    pub category: String,
    pub current_index: usize,
    pub total_questions: usize,
    pub remaining_seconds: u32,
    pub running_score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<AnswerFeedback>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ScoreReport>,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: Uuid,
    pub view: SessionView,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub option_index: usize,
}

/// Optional start payload. The category is free-form and recorded for
/// the client's benefit only; it does not influence question sourcing.
#[derive(Debug, Default, Deserialize)]
pub struct StartSessionRequest {
    pub category: Option<String>,
}

/// Builds the client view of a session. Display options are shuffled
/// fresh on every render; the mapping back to canonical indices travels
/// with each option.
fn view_of(session: &QuizSession, category: &str) -> SessionView {
    let question = session.current_question().map(|q| {
        let mut options: Vec<DisplayOption> = q
            .options
            .iter()
            .enumerate()
            .map(|(index, text)| DisplayOption {
                index,
                text: text.clone(),
            })
            .collect();
        options.shuffle(&mut rand::thread_rng());
        QuestionView {
            text: q.text.clone(),
            options,
        }
    });

    let feedback = if !session.is_completed() && session.phase() == Phase::Answered {
        session.last_answer().map(|a| AnswerFeedback {
            is_correct: a.is_correct,
            chosen_option: a.chosen_option_text.clone(),
            correct_option: a.correct_option_text.clone(),
        })
    } else {
        None
    };

    let report = build_report(session);

    SessionView {
        state: if session.is_completed() {
            "completed"
        } else {
            "in_progress"
        },
        category: category.to_string(),
        current_index: session.current_index(),
        total_questions: session.total_questions(),
        remaining_seconds: session.remaining_seconds(),
        running_score: session.running_score(),
        question,
        feedback,
        report,
    }
}

async fn lookup(state: &AppState, id: Uuid) -> Result<SharedSlot, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("Session not found".to_string()))
}

/// Starts a new quiz session. The body is optional; an omitted or empty
/// category defaults to "random".
///
/// Pulls a fresh question set from the supply chain (remote first, local
/// fallback second; 503 when both fail), shuffles and caps it, and
/// spawns the countdown ticker for the first question.
pub async fn start_session(
    State(state): State<AppState>,
    body: Option<Json<StartSessionRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let category = body
        .and_then(|Json(req)| req.category)
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| "random".to_string());

    let questions = state.supply.load().await?;

    // Supply already guarantees a non-empty set, so this cannot fail,
    // but the state machine checks for itself.
    let session = QuizSession::start(questions).map_err(|_| AppError::SupplyUnavailable)?;

    let (id, slot) = state.sessions.insert(session, category).await;
    let mut guard = slot.lock().await;
    sessions::spawn_ticker(&slot, &mut guard);

    tracing::info!("started quiz session {}", id);

    Ok((
        StatusCode::CREATED,
        Json(StartSessionResponse {
            session_id: id,
            view: view_of(&guard.session, &guard.category),
        }),
    ))
}

/// Returns the current view of a session.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let slot = lookup(&state, id).await?;
    let mut guard = slot.lock().await;
    guard.touch();
    Ok(Json(view_of(&guard.session, &guard.category)))
}

/// Records an answer for the current question, given as a canonical
/// option index.
///
/// A submission that lost the race against the timeout (or a duplicate
/// click) is acknowledged with the current view and changes nothing.
pub async fn submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.option_index > 3 {
        return Err(AppError::BadRequest(
            "option_index must be between 0 and 3".to_string(),
        ));
    }

    let slot = lookup(&state, id).await?;
    let mut guard = slot.lock().await;
    if guard.session.select_answer(req.option_index) {
        guard.cancel_ticker();
    }
    guard.touch();
    Ok(Json(view_of(&guard.session, &guard.category)))
}

/// Advances to the next question, or completes the session after the
/// last one. Called before the current question is settled it changes
/// nothing and returns the current view.
pub async fn advance_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let slot = lookup(&state, id).await?;
    let mut guard = slot.lock().await;

    use crate::quiz::Advance;
    match guard.session.advance() {
        Some(Advance::Next) => sessions::spawn_ticker(&slot, &mut guard),
        Some(Advance::Completed) => {
            guard.cancel_ticker();
            tracing::info!(
                "quiz session {} completed with score {}/{}",
                id,
                guard.session.running_score(),
                guard.session.total_questions()
            );
        }
        None => {}
    }
    guard.touch();
    Ok(Json(view_of(&guard.session, &guard.category)))
}

/// Abandons a session (restart, navigation away). Aborts the ticker and
/// drops all state. Idempotent.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if state.sessions.remove(id).await.is_some() {
        tracing::debug!("discarded quiz session {}", id);
    }
    StatusCode::NO_CONTENT
}
