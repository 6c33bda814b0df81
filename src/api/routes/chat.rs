use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::ChatTurn;

/// Payload carried in the `data` form field as a JSON string. Clients that
/// predate sessions omit `session_id` and land on the nil-UUID default
/// session, which reproduces the legacy single-shared-engine behavior.
#[derive(Debug, Deserialize)]
pub struct ChatData {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub chat_history: Vec<ChatTurn>,
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct NewChatQuery {
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct NewChatResponse {
    pub response: String,
}

pub async fn chat_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ChatResponse>, ApiError> {
    let mut data: Option<String> = None;
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid multipart request: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("data") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::InvalidRequest(format!("Invalid multipart request: {e}")))?;
                data = Some(text);
            }
            Some("file") => {
                let file_name = field
                    .file_name()
                    .map(str::to_owned)
                    .unwrap_or_else(|| "upload".to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::InvalidRequest(format!("Invalid multipart request: {e}")))?;
                file = Some((file_name, bytes));
            }
            _ => {}
        }
    }

    let request: ChatData = serde_json::from_str(&data.unwrap_or_default())
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid JSON: {e}")))?;

    if request.message.is_empty() {
        return Err(ApiError::InvalidRequest("No message provided".to_string()));
    }

    let session = request.session_id.unwrap_or_else(Uuid::nil);

    // Legacy upload rule: a file only counts on the first message of a
    // session. A file arriving with non-empty history is ignored entirely.
    let mut reindex = false;
    if let Some((name, bytes)) = file {
        if request.chat_history.is_empty() {
            state.documents.save(session, &name, &bytes).await?;
            reindex = true;
        }
    }

    let response = state
        .chat
        .respond(session, &request.chat_history, &request.message, reindex)
        .await?;

    Ok(Json(ChatResponse {
        response,
        session_id: session,
    }))
}

/// Clears the session's uploaded files and evicts its engine handle so no
/// query can keep answering from a deleted document set. The session id may
/// arrive as a multipart form field or a query parameter; the form field
/// wins when both are present. Without a session id, every session is
/// cleared (the legacy wipe-everything behavior for clients that predate
/// sessions).
pub async fn new_chat(
    State(state): State<AppState>,
    Query(query): Query<NewChatQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<NewChatResponse>, ApiError> {
    let mut session = query.session_id;

    // a bare POST has no multipart body at all; that rejection means
    // "no form", not a bad request
    if let Ok(mut multipart) = multipart {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid multipart request: {e}")))?
        {
            let name = field.name().map(str::to_owned);
            if name.as_deref() == Some("session_id") {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::InvalidRequest(format!("Invalid multipart request: {e}")))?;
                let id = text
                    .parse()
                    .map_err(|_| ApiError::InvalidRequest(format!("Invalid session id: {text}")))?;
                session = Some(id);
            }
        }
    }

    match session {
        Some(session) => state.index.clear(session).await?,
        None => state.index.clear_all().await?,
    }

    Ok(Json(NewChatResponse {
        response: "Chat history cleared.".to_string(),
    }))
}
