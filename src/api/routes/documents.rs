use axum::{
    body::Bytes,
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::state::AppState;

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub session_id: Uuid,
    pub document: String,
}

/// Explicit indexing endpoint, decoupled from the chat turn: persists the
/// file, rebuilds the session's engine, and returns the session handle the
/// client should pass on subsequent `/chat` calls. A fresh session id is
/// generated when none is supplied.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DocumentResponse>, ApiError> {
    let mut session: Option<Uuid> = None;
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid multipart request: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("session_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::InvalidRequest(format!("Invalid multipart request: {e}")))?;
                let id = text
                    .parse()
                    .map_err(|_| ApiError::InvalidRequest(format!("Invalid session id: {text}")))?;
                session = Some(id);
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

    let (name, bytes) = file.ok_or_else(|| ApiError::InvalidRequest("No file provided".to_string()))?;
    let session = session.unwrap_or_else(Uuid::new_v4);

    let stored = state.documents.save(session, &name, &bytes).await?;
    state.index.rebuild(session).await?;

    Ok(Json(DocumentResponse {
        session_id: session,
        document: stored.name,
    }))
}
