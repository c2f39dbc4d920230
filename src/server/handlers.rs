//! Route handlers for the browser bridge.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::errors::{KitsupassError, Result};

use super::facade;
use super::middleware::{sealed_json, Client, PlainJson, Sealed};
use super::models::{
    AuthRequest, AuthResponse, EntriesQuery, NewEntry, OtpList, PairingAccepted, SavedEntry,
    SearchResults, SourceList, SpecificSearch,
};
use super::AppState;

const PAIRING_TITLE: &str = "Browser Access Request.";

// ---------------------------------------------------------------------------
// Pairing
// ---------------------------------------------------------------------------

/// `POST /v1/auth/request`: issue a pairing code and show it locally.
pub async fn auth_request(
    State(state): State<AppState>,
    PlainJson(request): PlainJson<AuthRequest>,
) -> &'static str {
    tracing::info!(
        client = %request.client,
        purpose = %request.purpose,
        rev = request.rev,
        "pairing requested"
    );

    let code = state.channel.request_pairing();
    let message = format!(
        "A new connection has been made to this application, requesting remote \
         access to all desktop vaults (while unlocked). Use the following code \
         to authorise it: {}",
        code.as_str()
    );
    state.notifier.notify(PAIRING_TITLE, &message);
    "OK"
}

/// `POST /v1/auth/response`: finish pairing, answer with our public key.
pub async fn auth_response(
    State(state): State<AppState>,
    PlainJson(response): PlainJson<AuthResponse>,
) -> Result<Json<PairingAccepted>> {
    state
        .channel
        .complete_pairing(&response.code, &response.id, &response.public_key)?;

    Ok(Json(PairingAccepted {
        public_key: state.channel.public_key_jwk(),
    }))
}

/// `POST /v1/auth/test`: succeeds once the browser can seal a request.
pub async fn auth_test(_request: Sealed<AuthRequest>) -> &'static str {
    "OK"
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// `GET /v1/entries?type=term&term=…` or `?type=url&url=…`.
///
/// A URL search tries the full host, then drops the left-most label
/// until some entry matches (`a.b.example.com`, `b.example.com`, …).
pub async fn search_entries(
    State(state): State<AppState>,
    client: Client,
    query: std::result::Result<Query<EntriesQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(query) = query.map_err(|e| KitsupassError::BadRequest(e.body_text()))?;
    let id = state.vault_id;

    let results = state
        .with_vault(move |vault| {
            let names: Vec<String> = match query {
                EntriesQuery::Term(term) => vault.find(&term.term)?.iter().collect(),
                EntriesQuery::Url(url) => {
                    let mut domain = facade::host_of(&url.url).unwrap_or_default();
                    let mut names = Vec::new();
                    while names.is_empty() && domain.contains('.') {
                        names = vault.find(&domain)?.iter().collect();
                        domain = domain
                            .split_once('.')
                            .map(|(_, rest)| rest.to_string())
                            .unwrap_or_default();
                    }
                    names
                }
            };
            Ok(facade::items(vault, &id, &names))
        })
        .await?;

    sealed_json(&state, &client, &SearchResults { results }).await
}

/// `POST /v1/entries/specific`: items for named entries of this store.
pub async fn specific_entries(
    State(state): State<AppState>,
    request: Sealed<SpecificSearch>,
) -> Result<Response> {
    let id = state.vault_id;
    let source = id.to_string();
    let wanted: Vec<String> = request
        .body
        .entries
        .into_iter()
        .filter(|entry| entry.source_id == source)
        .map(|entry| entry.entry_id)
        .collect();

    let results = state
        .with_vault(move |vault| {
            let names: Vec<String> = wanted
                .into_iter()
                .filter(|name| vault.contains(name))
                .collect();
            Ok(facade::items(vault, &id, &names))
        })
        .await?;

    sealed_json(&state, &request.client, &SearchResults { results }).await
}

/// `GET /v1/otps`.
pub async fn otps(State(state): State<AppState>, client: Client) -> Result<Response> {
    let id = state.vault_id;
    let otps = state.with_vault(move |vault| facade::otps(vault, &id)).await?;
    sealed_json(&state, &client, &OtpList { otps }).await
}

// ---------------------------------------------------------------------------
// Vaults
// ---------------------------------------------------------------------------

/// `GET /v1/vaults`.
pub async fn vaults(State(state): State<AppState>, client: Client) -> Result<Response> {
    let id = state.vault_id;
    let source = state
        .with_vault(move |vault| Ok(facade::source(vault, &id)))
        .await?;
    sealed_json(
        &state,
        &client,
        &SourceList {
            sources: vec![source],
        },
    )
    .await
}

/// `GET /v1/vaults-tree`.
pub async fn vaults_tree(State(state): State<AppState>, client: Client) -> Result<Response> {
    let id = state.vault_id;
    let tree = state.with_vault(move |vault| facade::tree(vault, &id)).await?;
    sealed_json(&state, &client, &tree).await
}

/// `POST /v1/vaults/{id}/group/{gid}/entry`: store a login saved by the browser.
pub async fn save_entry(
    State(state): State<AppState>,
    Path((vault_id, group_id)): Path<(String, String)>,
    request: Sealed<NewEntry>,
) -> Result<Response> {
    if vault_id != state.vault_id.to_string() {
        return Err(KitsupassError::NotFound(vault_id));
    }
    tracing::debug!(group = %group_id, kind = %request.body.entry_type, "saving entry");

    let (name, text) = facade::new_entry(&request.body)?;
    let entry_id = state
        .with_vault(move |vault| vault.insert(&name, &text))
        .await?;

    sealed_json(&state, &request.client, &SavedEntry { entry_id }).await
}

/// `POST /v1/vaults/{id}/lock`.
pub async fn lock(
    State(state): State<AppState>,
    _client: Client,
    Path(vault_id): Path<String>,
) -> Result<impl IntoResponse> {
    if vault_id == state.vault_id.to_string() {
        state.with_vault(|vault| vault.close()).await?;
    }
    Ok("OK")
}

/// `POST /v1/vaults/{id}/unlock`. May prompt on the bridge's terminal.
pub async fn unlock(
    State(state): State<AppState>,
    _client: Client,
    Path(vault_id): Path<String>,
) -> Result<impl IntoResponse> {
    if vault_id == state.vault_id.to_string() {
        state.unlock_vault().await?;
    }
    Ok("OK")
}
