use std::collections::HashSet;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Form;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use pokewiki_sdk::{ImageUpload, PageFilter, PageRecord, SortDirection, Wiki};
use pokewiki_types::Leaderboard;

use crate::auth::{CurrentUser, MaybeUser};
use crate::error::{ServerError, ServerResult};
use crate::router::AppState;

/// Numeric field used when a sort is requested without one.
const DEFAULT_SORT_FIELD: &str = "level";

/// Run a wiki operation on the blocking pool; store calls may hit disk.
async fn blocking<T, F>(state: &AppState, f: F) -> ServerResult<T>
where
    F: FnOnce(&Wiki) -> ServerResult<T> + Send + 'static,
    T: Send + 'static,
{
    let wiki = state.wiki.clone();
    tokio::task::spawn_blocking(move || f(&wiki))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn index(MaybeUser(user): MaybeUser) -> Json<Value> {
    Json(json!({
        "name": "pokewiki",
        "version": env!("CARGO_PKG_VERSION"),
        "user": user.map(|identity| identity.name),
    }))
}

pub async fn about() -> Json<Value> {
    Json(json!({
        "name": "pokewiki",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "A community wiki of pokemon pages, with a guess-the-pokemon game and a leaderboard.",
    }))
}

// ---- Pages ----

/// Search, filter and sort parameters for the page index. Blank values are
/// ignored.
#[derive(Debug, Default, Deserialize)]
pub struct PagesQuery {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub region: Option<String>,
    pub nature: Option<String>,
    /// `LowestToHighest` or `HighestToLowest`.
    pub sort: Option<String>,
    pub field: Option<String>,
}

impl PagesQuery {
    fn filter(&self) -> PageFilter {
        PageFilter {
            name: self.name.clone(),
            kind: self.kind.clone(),
            region: self.region.clone(),
            nature: self.nature.clone(),
        }
        .normalized()
    }

    fn direction(&self) -> ServerResult<Option<SortDirection>> {
        match self.sort.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|e: pokewiki_types::TypeError| ServerError::BadRequest(e.to_string())),
        }
    }
}

fn matching_pages(wiki: &Wiki, query: &PagesQuery) -> ServerResult<Value> {
    let filter = query.filter();
    let pages = wiki.pages();

    let keys = match query.direction()? {
        Some(direction) => {
            let field = query
                .field
                .as_deref()
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .unwrap_or(DEFAULT_SORT_FIELD);
            let sorted = pages.sort_pages(field, direction)?;
            if filter.is_empty() {
                sorted
            } else {
                let keep: HashSet<String> = pages.find_pages(&filter)?.into_iter().collect();
                sorted.into_iter().filter(|key| keep.contains(key)).collect()
            }
        }
        None if filter.is_empty() => pages.list_pages()?,
        None => pages.find_pages(&filter)?,
    };

    Ok(json!({
        "pages": keys,
        "categories": pages.categories()?,
    }))
}

pub async fn list_pages(
    State(state): State<AppState>,
    Query(query): Query<PagesQuery>,
) -> ServerResult<Json<Value>> {
    blocking(&state, move |wiki| matching_pages(wiki, &query)).await.map(Json)
}

pub async fn query_pages(
    State(state): State<AppState>,
    Form(query): Form<PagesQuery>,
) -> ServerResult<Json<Value>> {
    blocking(&state, move |wiki| matching_pages(wiki, &query)).await.map(Json)
}

pub async fn show_page(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ServerResult<Json<Value>> {
    blocking(&state, move |wiki| {
        let record = wiki
            .pages()
            .page(&name)?
            .ok_or_else(|| ServerError::NotFound(format!("no page named {name:?}")))?;
        let image = wiki.pages().page_image(&record)?;
        Ok(Json(json!({ "page": record, "image": image })))
    })
    .await
}

// ---- Accounts ----

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

pub async fn login_form() -> Json<Value> {
    Json(json!({ "action": "/login", "fields": ["username", "password"] }))
}

pub async fn signup_form() -> Json<Value> {
    Json(json!({ "action": "/signup", "fields": ["username", "password"] }))
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> ServerResult<Json<Value>> {
    let username = form.username.clone();
    let ok = blocking(&state, move |wiki| {
        Ok(wiki.credentials().authenticate(&form.username, &form.password)?)
    })
    .await?;
    if !ok {
        return Err(ServerError::InvalidCredentials);
    }
    let session = state.sessions.create(&username)?;
    Ok(Json(json!(session)))
}

pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> ServerResult<(StatusCode, Json<Value>)> {
    let username = form.username.clone();
    let created = blocking(&state, move |wiki| {
        Ok(wiki.credentials().register(&form.username, &form.password)?)
    })
    .await?;
    if !created {
        return Err(ServerError::Conflict("username already taken".into()));
    }
    Ok((StatusCode::CREATED, Json(json!({ "username": username }))))
}

pub async fn logout(State(state): State<AppState>, user: CurrentUser) -> ServerResult<StatusCode> {
    state.sessions.revoke(&user.token)?;
    info!(username = %user.identity.name, "signed out");
    Ok(StatusCode::NO_CONTENT)
}

// ---- Upload ----

/// Form fields that map onto named record fields or are set by the server.
const RESERVED_FIELDS: [&str; 2] = ["image-name", "image-type"];

pub async fn upload_form(State(state): State<AppState>, _user: CurrentUser) -> ServerResult<Json<Value>> {
    let categories = blocking(&state, |wiki| Ok(wiki.pages().categories()?)).await?;
    Ok(Json(json!({
        "action": "/upload",
        "fields": ["name", "type", "region", "nature", "level", "file"],
        "categories": categories,
    })))
}

pub async fn upload(
    State(state): State<AppState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> ServerResult<(StatusCode, Json<Value>)> {
    let mut record = PageRecord::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "file" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(e.to_string()))?;
            if !filename.is_empty() && !data.is_empty() {
                image = Some(ImageUpload::new(filename, content_type, data));
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ServerError::BadRequest(e.to_string()))?;
        let value = value.trim().to_string();
        if value.is_empty() || RESERVED_FIELDS.contains(&name.as_str()) {
            continue;
        }
        match name.as_str() {
            "name" => record.name = value,
            "type" => record.kind = Some(value),
            "region" => record.region = Some(value),
            "nature" => record.nature = Some(value),
            other => {
                record.attributes.insert(other.to_string(), Value::String(value));
            }
        }
    }

    if record.name.is_empty() {
        return Err(ServerError::BadRequest("page name is required".into()));
    }

    let key = record.key();
    let created = blocking(&state, move |wiki| {
        Ok(wiki.pages().put_page(record, image.as_ref())?)
    })
    .await?;
    if !created {
        return Err(ServerError::Conflict("a page with that name already exists".into()));
    }
    info!(username = %user.identity.name, key = %key, "page uploaded over http");
    Ok((StatusCode::CREATED, Json(json!({ "key": key }))))
}

// ---- Game ----

#[derive(Debug, Deserialize)]
pub struct GuessForm {
    pub id: u32,
    pub guess: String,
}

pub async fn game(State(state): State<AppState>, user: CurrentUser) -> ServerResult<Json<Value>> {
    let username = user.identity.name;
    blocking(&state, move |wiki| {
        let game = wiki.game();
        let id = game
            .next_pokemon(&username)?
            .ok_or_else(|| ServerError::NotFound("the pokedex is empty".into()))?;
        Ok(Json(json!({
            "id": id,
            "image": game.pokemon_image(id)?,
            "pokeball": game.pokeball_image()?,
            "player": game.game_user(&username)?,
        })))
    })
    .await
}

pub async fn guess(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<GuessForm>,
) -> ServerResult<Json<Value>> {
    let username = user.identity.name;
    blocking(&state, move |wiki| {
        let outcome = wiki.game().submit_guess(&username, form.id, &form.guess)?;
        Ok(Json(json!(outcome)))
    })
    .await
}

pub async fn leaderboard(State(state): State<AppState>) -> ServerResult<Json<Leaderboard>> {
    blocking(&state, |wiki| Ok(Json(Leaderboard::new(wiki.game().leaderboard()?)))).await
}
