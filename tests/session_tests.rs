// tests/session_tests.rs
//
// Exercises the quiz session HTTP surface end to end. No database is
// touched by these routes, so the pool is created lazily and never
// connected.

use std::sync::Arc;

use brainquiz::config::Config;
use brainquiz::routes;
use brainquiz::sessions::SessionStore;
use brainquiz::state::AppState;
use brainquiz::supply::QuestionSupply;
use sqlx::postgres::PgPoolOptions;

fn test_config(questions_file: &str) -> Config {
    Config {
        database_url: "postgres://localhost/unused".to_string(),
        jwt_secret: "session_test_secret".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        questions_api_url: None,
        questions_file: questions_file.to_string(),
    }
}

async fn spawn_app_with_questions(questions_file: &str) -> String {
    let config = test_config(questions_file);

    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .expect("Failed to create lazy pool");

    let supply = Arc::new(QuestionSupply::from_config(&config));
    let state = AppState {
        pool,
        config,
        supply,
        sessions: SessionStore::new(),
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn spawn_app() -> String {
    spawn_app_with_questions("data/questions.json").await
}

async fn start_session(client: &reqwest::Client, address: &str) -> serde_json::Value {
    client
        .post(format!("{}/api/session", address))
        .send()
        .await
        .expect("Failed to start session")
        .json()
        .await
        .expect("Failed to parse start response")
}

#[tokio::test]
async fn start_session_returns_first_question() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/session", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["session_id"].as_str().is_some());

    let view = &body["view"];
    assert_eq!(view["state"], "in_progress");
    assert_eq!(view["category"], "random");
    assert_eq!(view["current_index"], 0);
    assert_eq!(view["total_questions"], 10);
    assert_eq!(view["remaining_seconds"], 20);
    assert_eq!(view["running_score"], 0);

    // Four display options, each carrying a canonical index 0..=3.
    let options = view["question"]["options"].as_array().unwrap();
    assert_eq!(options.len(), 4);
    let mut indices: Vec<i64> = options.iter().map(|o| o["index"].as_i64().unwrap()).collect();
    indices.sort();
    assert_eq!(indices, vec![0, 1, 2, 3]);

    // The correct answer is never exposed before the question settles.
    assert!(view.get("feedback").is_none());
    assert!(view.get("report").is_none());
}

#[tokio::test]
async fn requested_category_is_recorded_and_echoed() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let body: serde_json::Value = client
        .post(format!("{}/api/session", address))
        .json(&serde_json::json!({ "category": "science" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["view"]["category"], "science");

    // The category sticks to the session across requests.
    let id = body["session_id"].as_str().unwrap();
    let view: serde_json::Value = client
        .get(format!("{}/api/session/{}", address, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["category"], "science");
}

#[tokio::test]
async fn blank_category_falls_back_to_random() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let body: serde_json::Value = client
        .post(format!("{}/api/session", address))
        .json(&serde_json::json!({ "category": "   " }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["view"]["category"], "random");
}

#[tokio::test]
async fn full_playthrough_produces_consistent_report() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let body = start_session(&client, &address).await;
    let id = body["session_id"].as_str().unwrap();

    let mut correct = 0u32;
    let final_view: serde_json::Value = loop {
        // Always answer canonical option 0; track correctness via feedback.
        let answered: serde_json::Value = client
            .post(format!("{}/api/session/{}/answer", address, id))
            .json(&serde_json::json!({ "option_index": 0 }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let feedback = &answered["feedback"];
        assert!(feedback["correct_option"].as_str().is_some());
        if feedback["is_correct"] == true {
            correct += 1;
        }
        assert_eq!(answered["running_score"], correct);

        let view: serde_json::Value = client
            .post(format!("{}/api/session/{}/next", address, id))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if view["state"] == "completed" {
            break view;
        }
    };

    let report = &final_view["report"];
    assert_eq!(report["score"], correct);
    assert_eq!(report["total_questions"], 10);
    assert_eq!(report["answers"].as_array().unwrap().len(), 10);

    let accuracy = report["accuracy"].as_u64().unwrap();
    assert_eq!(accuracy, ((correct as f64 / 10.0) * 100.0).round() as u64);
}

#[tokio::test]
async fn duplicate_answer_is_acknowledged_without_effect() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let body = start_session(&client, &address).await;
    let id = body["session_id"].as_str().unwrap();

    let first: serde_json::Value = client
        .post(format!("{}/api/session/{}/answer", address, id))
        .json(&serde_json::json!({ "option_index": 1 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Second submission for the same question: 200, nothing changes.
    let second_resp = client
        .post(format!("{}/api/session/{}/answer", address, id))
        .json(&serde_json::json!({ "option_index": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(second_resp.status().as_u16(), 200);
    let second: serde_json::Value = second_resp.json().await.unwrap();

    assert_eq!(second["running_score"], first["running_score"]);
    assert_eq!(
        second["feedback"]["chosen_option"],
        first["feedback"]["chosen_option"]
    );
}

#[tokio::test]
async fn advance_before_answering_changes_nothing() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let body = start_session(&client, &address).await;
    let id = body["session_id"].as_str().unwrap();

    let view: serde_json::Value = client
        .post(format!("{}/api/session/{}/next", address, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(view["state"], "in_progress");
    assert_eq!(view["current_index"], 0);
}

#[tokio::test]
async fn out_of_range_option_is_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let body = start_session(&client, &address).await;
    let id = body["session_id"].as_str().unwrap();

    let response = client
        .post(format!("{}/api/session/{}/answer", address, id))
        .json(&serde_json::json!({ "option_index": 7 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn unknown_session_is_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!(
            "{}/api/session/{}",
            address,
            uuid::Uuid::new_v4()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn deleted_session_is_gone() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let body = start_session(&client, &address).await;
    let id = body["session_id"].as_str().unwrap();

    let response = client
        .delete(format!("{}/api/session/{}", address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = client
        .get(format!("{}/api/session/{}", address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn start_fails_when_no_source_is_available() {
    // No remote source configured and the fallback file does not exist.
    let address = spawn_app_with_questions("/nonexistent/questions.json").await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/session", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 503);
}
