// src/handlers/scores.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use validator::Validate;

use crate::{
    error::AppError,
    models::score::{
        LeaderboardEntry, LeaderboardQuery, ScoreHistoryQuery, ScoreRecord, SubmitScoreRequest,
        SubmitScoreResponse,
    },
    utils::jwt::Claims,
};

const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;

/// Validates the requested leaderboard size. Missing means the default;
/// zero and negative values are rejected rather than clamped.
fn validate_limit(limit: Option<i64>) -> Result<i64, AppError> {
    match limit {
        None => Ok(DEFAULT_LEADERBOARD_LIMIT),
        Some(n) if n >= 1 => Ok(n),
        Some(n) => Err(AppError::BadRequest(format!(
            "limit must be a positive integer, got {}",
            n
        ))),
    }
}

/// Persists a completed quiz result for the authenticated user.
///
/// Both statements run in one transaction: a failure on either side
/// leaves neither the score row nor the ratchet half-applied, so a
/// client retry cannot double-insert.
///
/// * Ratchets `users.best_score` first (a single atomic `GREATEST`
///   statement, so concurrent submissions cannot lower it); a missing
///   user row is a 404 before anything is written.
/// * Inserts the score row (never mutated afterwards).
pub async fn submit_score(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitScoreRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.user_id()?;

    let mut tx = pool.begin().await?;

    let best_score: i64 = sqlx::query_scalar(
        r#"
        UPDATE users
        SET best_score = GREATEST(best_score, $1)
        WHERE id = $2
        RETURNING best_score
        "#,
    )
    .bind(payload.score)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let record = sqlx::query_as::<_, ScoreRecord>(
        r#"
        INSERT INTO scores (user_id, category, score, total_questions, accuracy)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, category, score, total_questions, accuracy, created_at
        "#,
    )
    .bind(user_id)
    .bind(&payload.category)
    .bind(payload.score)
    .bind(payload.total_questions)
    .bind(payload.accuracy)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to insert score: {:?}", e);
        AppError::from(e)
    })?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitScoreResponse {
            message: "Score saved.".to_string(),
            best_score,
            score: record,
        }),
    ))
}

/// Returns the authenticated user's own score history, newest first,
/// optionally filtered by category.
pub async fn my_scores(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<ScoreHistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let mut query = QueryBuilder::<Postgres>::new(
        "SELECT id, user_id, category, score, total_questions, accuracy, created_at \
         FROM scores WHERE user_id = ",
    );
    query.push_bind(user_id);
    if let Some(category) = &params.category {
        query.push(" AND category = ");
        query.push_bind(category);
    }
    query.push(" ORDER BY created_at DESC");

    let scores: Vec<ScoreRecord> = query.build_query_as().fetch_all(&pool).await?;

    Ok(Json(json!({ "scores": scores })))
}

/// Public leaderboard: top N scores, optionally per category.
///
/// Ordering is total and stable: score descending, then accuracy
/// descending, then earliest submission first (being first to a score
/// wins the tie). The row id breaks exact-timestamp ties so repeated
/// queries against unchanged data never reorder.
pub async fn leaderboard(
    State(pool): State<PgPool>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = validate_limit(params.limit)?;

    let mut query = QueryBuilder::<Postgres>::new(
        "SELECT u.username, s.score, s.accuracy, s.created_at \
         FROM scores s JOIN users u ON s.user_id = u.id",
    );
    if let Some(category) = &params.category {
        query.push(" WHERE s.category = ");
        query.push_bind(category);
    }
    query.push(" ORDER BY s.score DESC, s.accuracy DESC, s.created_at ASC, s.id ASC LIMIT ");
    query.push_bind(limit);

    let entries: Vec<LeaderboardEntry> = query
        .build_query_as()
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch leaderboard: {:?}", e);
            AppError::from(e)
        })?;

    Ok(Json(json!({ "scores": entries })))
}
