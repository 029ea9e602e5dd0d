use std::convert::Infallible;
use std::sync::Arc;

use axum::Router;
use axum::extract::{FromRequest, FromRequestParts, Path, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use futures::stream::{self, Stream};
use serde::Serialize;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{Admin, Authenticated, authenticate};
use crate::dto::{CountryBody, HealthResponse, PersonRequest, PersonResponse};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// JSON body whose rejections come back in the API error format.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Path parameters, rejected the same way as [`JsonBody`].
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);

/// Build the full router with all routes and the authentication layer.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/countries", get(get_countries).post(create_country))
        .route(
            "/countries/{name}",
            get(get_country).put(update_country).delete(delete_country),
        )
        .route("/persons", get(get_persons).post(create_person))
        .route(
            "/persons/{id}",
            get(get_person).put(update_person).delete(delete_person),
        );

    let public = Router::new()
        .route("/actuator/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/v3/api-docs", ApiDoc::openapi()));

    public
        .merge(api)
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .with_state(state)
}

/// One named SSE event per item.
fn event_stream<T: Serialize + Send + 'static>(
    name: &'static str,
    items: Vec<T>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = items.into_iter().filter_map(move |item| {
        match Event::default().event(name).json_data(item) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                tracing::warn!(event = name, error = %e, "Dropping unserializable event");
                None
            }
        }
    });
    Sse::new(stream::iter(events)).keep_alive(KeepAlive::default())
}

// ---------------------------------------------------------------------------
// Countries
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/countries",
    responses(
        (status = 200, description = "Countries found, one `country` event each",
            content_type = "text/event-stream", body = [CountryBody]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "countries"
)]
pub async fn get_countries(
    State(state): State<Arc<AppState>>,
    _auth: Authenticated,
) -> Result<impl IntoResponse, ApiError> {
    let countries = state.countries.get_countries().await?;
    let bodies: Vec<CountryBody> = countries.into_iter().map(Into::into).collect();
    Ok(event_stream("country", bodies))
}

#[utoipa::path(
    get,
    path = "/countries/{name}",
    params(("name" = String, Path, description = "Country name")),
    responses(
        (status = 200, description = "Country found", body = CountryBody),
        (status = 404, description = "Country not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "countries"
)]
pub async fn get_country(
    State(state): State<Arc<AppState>>,
    _auth: Authenticated,
    PathParam(name): PathParam<String>,
) -> Result<impl IntoResponse, ApiError> {
    let country = state.countries.get_country(&name).await?;
    Ok(axum::Json(CountryBody::from(country)))
}

#[utoipa::path(
    post,
    path = "/countries",
    request_body = CountryBody,
    responses(
        (status = 201, description = "Country created", body = CountryBody),
        (status = 400, description = "Invalid country", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required", body = crate::dto::ErrorResponse),
        (status = 409, description = "Country already exists", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "countries"
)]
pub async fn create_country(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    JsonBody(body): JsonBody<CountryBody>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state.countries.create_country(body.into()).await?;
    Ok((StatusCode::CREATED, axum::Json(CountryBody::from(created))))
}

#[utoipa::path(
    put,
    path = "/countries/{name}",
    params(("name" = String, Path, description = "Current country name")),
    request_body = CountryBody,
    responses(
        (status = 200, description = "Country updated", body = CountryBody),
        (status = 400, description = "Invalid country", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required", body = crate::dto::ErrorResponse),
        (status = 404, description = "Country not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "New name already taken", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "countries"
)]
pub async fn update_country(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    PathParam(name): PathParam<String>,
    JsonBody(body): JsonBody<CountryBody>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state.countries.update_country(&name, body.into()).await?;
    Ok(axum::Json(CountryBody::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/countries/{name}",
    params(("name" = String, Path, description = "Country name")),
    responses(
        (status = 200, description = "Country deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required", body = crate::dto::ErrorResponse),
        (status = 404, description = "Country not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Persons still reference the country", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "countries"
)]
pub async fn delete_country(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    PathParam(name): PathParam<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.countries.delete_country(&name).await?;
    Ok(StatusCode::OK)
}

// ---------------------------------------------------------------------------
// Persons
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/persons",
    responses(
        (status = 200, description = "Persons found, one `person` event each",
            content_type = "text/event-stream", body = [PersonResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "persons"
)]
pub async fn get_persons(
    State(state): State<Arc<AppState>>,
    _auth: Authenticated,
) -> Result<impl IntoResponse, ApiError> {
    let persons = state.persons.get_persons().await?;
    let bodies: Vec<PersonResponse> = persons.into_iter().map(Into::into).collect();
    Ok(event_stream("person", bodies))
}

#[utoipa::path(
    get,
    path = "/persons/{id}",
    params(("id" = i64, Path, description = "Person id")),
    responses(
        (status = 200, description = "Person found", body = PersonResponse),
        (status = 404, description = "Person not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "persons"
)]
pub async fn get_person(
    State(state): State<Arc<AppState>>,
    _auth: Authenticated,
    PathParam(id): PathParam<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let person = state.persons.get_person(id).await?;
    Ok(axum::Json(PersonResponse::from(person)))
}

#[utoipa::path(
    post,
    path = "/persons",
    request_body = PersonRequest,
    responses(
        (status = 201, description = "Person created", body = PersonResponse),
        (status = 400, description = "Invalid person", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Country not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "persons"
)]
pub async fn create_person(
    State(state): State<Arc<AppState>>,
    Authenticated(auth): Authenticated,
    JsonBody(body): JsonBody<PersonRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state
        .persons
        .create_person(body.into(), Some(auth.token.value()))
        .await?;
    Ok((StatusCode::CREATED, axum::Json(PersonResponse::from(created))))
}

#[utoipa::path(
    put,
    path = "/persons/{id}",
    params(("id" = i64, Path, description = "Person id")),
    request_body = PersonRequest,
    responses(
        (status = 200, description = "Person updated", body = PersonResponse),
        (status = 400, description = "Invalid person", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Person or country not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "persons"
)]
pub async fn update_person(
    State(state): State<Arc<AppState>>,
    Authenticated(auth): Authenticated,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<PersonRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .persons
        .update_person(id, body.into(), Some(auth.token.value()))
        .await?;
    Ok(axum::Json(PersonResponse::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/persons/{id}",
    params(("id" = i64, Path, description = "Person id")),
    responses(
        (status = 200, description = "Person deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Person not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "persons"
)]
pub async fn delete_person(
    State(state): State<Arc<AppState>>,
    _auth: Authenticated,
    PathParam(id): PathParam<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.persons.delete_person(id).await?;
    Ok(StatusCode::OK)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/actuator/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
        (status = 503, description = "Storage is unreachable", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (status, label) = match state.storage.health_check().await {
        Ok(()) => (StatusCode::OK, "UP"),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "DOWN")
        }
    };

    let response = HealthResponse {
        status: label,
        storage: state.storage.kind(),
    };

    (status, axum::Json(response))
}
