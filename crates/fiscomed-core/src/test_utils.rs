//! Test utilities for fiscomed-core
//!
//! Provides a mock advisor server speaking the Gemini `generateContent` wire
//! shape, for integration tests against the real HTTP backend.

use axum::{
    extract::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// Mock advisor server for testing and development
pub struct MockAdvisorServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockAdvisorServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/v1beta/models", get(handle_models))
            .route("/v1beta/models/:model", post(handle_generate));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockAdvisorServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Models listing endpoint (health check)
async fn handle_models() -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: vec![ModelInfo {
            name: "models/gemini-2.0-flash".to_string(),
        }],
    })
}

/// generateContent endpoint
///
/// Keyword-matches the prompt and answers with the JSON contract embedded
/// in a Gemini-shaped response, the way the live API would.
async fn handle_generate(Json(request): Json<GenerateRequest>) -> Json<GenerateResponse> {
    let full_prompt = request
        .contents
        .first()
        .and_then(|c| c.parts.first())
        .map(|p| p.text.to_lowercase())
        .unwrap_or_default();

    // Keyword-match only the transaction concept line, not the embedded
    // catalog of allowed classifications (which itself lists names like
    // "gasolina y peajes" and would otherwise shadow every concept).
    let prompt = full_prompt
        .lines()
        .find(|line| line.trim_start().starts_with("- concepto:"))
        .map(|line| line.to_string())
        .unwrap_or(full_prompt);

    let (classification, percentage) = if prompt.contains("gasolina") || prompt.contains("peaje") {
        ("Gasolina y peajes", 50)
    } else if prompt.contains("renta") {
        ("Renta de consultorio", 100)
    } else if prompt.contains("material") || prompt.contains("curación") {
        ("Material de curación", 100)
    } else if prompt.contains("internet") || prompt.contains("teléfono") {
        ("Teléfono e internet", 100)
    } else if prompt.contains("curso") || prompt.contains("congreso") {
        ("Capacitación y congresos", 100)
    } else if prompt.contains("fuera-de-catalogo") {
        // Deliberately invalid name, for catalog-validation tests
        ("Deducción Mágica", 100)
    } else {
        ("Gastos personales", 0)
    };

    let answer = format!(
        "```json\n{{\"classification\": \"{}\", \"deductible_percentage\": {}, \
         \"justification\": \"respuesta simulada\"}}\n```",
        classification, percentage
    );

    Json(GenerateResponse {
        candidates: vec![Candidate {
            content: CandidateContent {
                parts: vec![CandidatePart { text: answer }],
            },
        }],
    })
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Serialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Serialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Serialize)]
struct CandidatePart {
    text: String,
}

#[derive(Debug, Serialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    name: String,
}
