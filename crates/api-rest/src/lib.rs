//! # API REST
//!
//! REST API for the telecare practice data layer.
//!
//! Handles:
//! - HTTP endpoints with axum, one read pair per collection plus the writes
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (query-string parsing, status codes, CORS)
//!
//! All data access goes through [`telecare_core::Practice`].

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use telecare_core::query::{
    AppointmentListing, CommunicationListing, CoverageListing, InvoiceListing, OrderListing,
    PatientListing, PractitionerListing, TaskListing,
};
use telecare_core::repositories::{
    AppointmentRecord, AppointmentWrite, Binding, CommunicationRecord, CommunicationWrite,
    CoverageRecord, InvoiceRecord, OrderRecord, OrderWrite, PatientRecord, PatientWrite,
    PractitionerRecord, TaskRecord, TaskWrite,
};
use telecare_core::{
    AppointmentForm, AppointmentView, Collection, CommunicationView, CoreError, CoverageView,
    DataSource, Fetched, InvoiceView, ListQuery, Listing, MessageForm, OrderForm, OrderView,
    Page, PatientForm, PatientView, Practice, PractitionerView, ServerHealth, Sort, TaskForm,
    TaskView, WriteOutcome,
};
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Page size used when a page number is given without a size.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Application state for the REST API server.
#[derive(Clone)]
pub struct AppState {
    practice: Arc<Practice>,
}

type ApiError = (StatusCode, String);
type ApiResult<T> = Result<T, ApiError>;

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        clear_cache,
        list_patients,
        get_patient,
        create_patient,
        update_patient,
        list_practitioners,
        get_practitioner,
        list_appointments,
        get_appointment,
        create_appointment,
        update_appointment,
        list_tasks,
        get_task,
        create_task,
        update_task,
        list_service_requests,
        get_service_request,
        create_service_request,
        list_medication_requests,
        get_medication_request,
        list_messages,
        get_message,
        send_message,
        list_invoices,
        get_invoice,
        list_coverages,
        get_coverage,
    ),
    components(schemas(
        ServerHealth,
        DataSource,
        PatientView,
        PractitionerView,
        AppointmentView,
        TaskView,
        OrderView,
        CommunicationView,
        InvoiceView,
        CoverageView,
        PatientListing,
        PractitionerListing,
        AppointmentListing,
        TaskListing,
        OrderListing,
        CommunicationListing,
        InvoiceListing,
        CoverageListing,
        PatientRecord,
        PractitionerRecord,
        AppointmentRecord,
        TaskRecord,
        OrderRecord,
        CommunicationRecord,
        InvoiceRecord,
        CoverageRecord,
        PatientWrite,
        AppointmentWrite,
        TaskWrite,
        OrderWrite,
        CommunicationWrite,
        PatientForm,
        AppointmentForm,
        TaskForm,
        OrderForm,
        MessageForm,
    ))
)]
pub struct ApiDoc;

/// Build the REST router over a shared practice.
pub fn router(practice: Arc<Practice>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/cache", delete(clear_cache))
        .route("/patients", get(list_patients).post(create_patient))
        .route("/patients/:id", get(get_patient).put(update_patient))
        .route("/practitioners", get(list_practitioners))
        .route("/practitioners/:id", get(get_practitioner))
        .route(
            "/appointments",
            get(list_appointments).post(create_appointment),
        )
        .route(
            "/appointments/:id",
            get(get_appointment).put(update_appointment),
        )
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/:id", get(get_task).put(update_task))
        .route(
            "/service-requests",
            get(list_service_requests).post(create_service_request),
        )
        .route("/service-requests/:id", get(get_service_request))
        .route("/medication-requests", get(list_medication_requests))
        .route("/medication-requests/:id", get(get_medication_request))
        .route("/messages", get(list_messages).post(send_message))
        .route("/messages/:id", get(get_message))
        .route("/invoices", get(list_invoices))
        .route("/invoices/:id", get(get_invoice))
        .route("/coverages", get(list_coverages))
        .route("/coverages/:id", get(get_coverage))
        .merge(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(AppState { practice })
}

// ============================================================================
// QUERY PARAMETERS AND ERRORS
// ============================================================================

/// Query-string form of a list query.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Case-insensitive text search over the view's display fields.
    pub search: Option<String>,
    /// Status label in view vocabulary, e.g. `booked`, `in_progress`, `active`.
    pub status: Option<String>,
    pub patient_id: Option<String>,
    /// Inclusive lower bound, `YYYY-MM-DD`.
    pub date_from: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`.
    pub date_to: Option<String>,
    /// View field to sort by; prefix with `-` for descending.
    pub sort: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListParams {
    fn into_query(self) -> ApiResult<ListQuery> {
        let page = match (self.page, self.page_size) {
            (None, None) => None,
            (_, Some(0)) | (Some(0), _) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    "page and page_size must be at least 1".into(),
                ))
            }
            (number, size) => Some(Page {
                number: number.unwrap_or(1),
                size: size.unwrap_or(DEFAULT_PAGE_SIZE),
            }),
        };

        Ok(ListQuery {
            search: self.search,
            status: self.status,
            patient_id: self.patient_id,
            date_from: parse_date("date_from", self.date_from)?,
            date_to: parse_date("date_to", self.date_to)?,
            sort: self.sort.as_deref().and_then(Sort::parse),
            page,
        })
    }
}

fn parse_date(field: &str, value: Option<String>) -> ApiResult<Option<NaiveDate>> {
    match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d").map(Some).map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                format!("{field} must be a date in YYYY-MM-DD format"),
            )
        }),
    }
}

fn api_error(err: CoreError) -> ApiError {
    let status = match &err {
        CoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::Upstream(_) | CoreError::Fhir(_) => StatusCode::BAD_GATEWAY,
        CoreError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("request failed: {err}");
    } else {
        tracing::debug!("request rejected: {err}");
    }
    (status, err.to_string())
}

async fn list_from<B: Binding>(
    collection: &Collection<B>,
    params: ListParams,
) -> ApiResult<Json<Listing<B::View>>> {
    let query = params.into_query()?;
    collection.list(&query).await.map(Json).map_err(api_error)
}

async fn get_from<B: Binding>(
    collection: &Collection<B>,
    id: &str,
) -> ApiResult<Json<Fetched<B::View>>> {
    collection.get(id).await.map(Json).map_err(api_error)
}

/// `confirmed` for a stored write, `202 Accepted` for a degraded one.
fn written<V>(
    outcome: WriteOutcome<V>,
    confirmed: StatusCode,
) -> (StatusCode, Json<WriteOutcome<V>>) {
    let status = if outcome.is_degraded() {
        StatusCode::ACCEPTED
    } else {
        confirmed
    };
    (status, Json(outcome))
}

// ============================================================================
// SERVER
// ============================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "FHIR server reachability and identity", body = ServerHealth)
    )
)]
/// Health check endpoint for the REST API
///
/// Probes the FHIR server's `metadata` endpoint. Always answers 200; an
/// unreachable server is reported in the body.
#[axum::debug_handler]
async fn health(State(state): State<AppState>) -> Json<ServerHealth> {
    Json(state.practice.health().await)
}

#[utoipa::path(
    delete,
    path = "/cache",
    responses((status = 204, description = "Cached listings dropped"))
)]
#[axum::debug_handler]
async fn clear_cache(State(state): State<AppState>) -> StatusCode {
    state.practice.clear_cache().await;
    StatusCode::NO_CONTENT
}

// ============================================================================
// PATIENTS AND PRACTITIONERS
// ============================================================================

#[utoipa::path(
    get,
    path = "/patients",
    params(ListParams),
    responses(
        (status = 200, description = "Patients, live or fallback", body = PatientListing),
        (status = 400, description = "Bad query"),
        (status = 502, description = "FHIR server unavailable (strict policy)")
    )
)]
#[axum::debug_handler]
async fn list_patients(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PatientListing>> {
    list_from(state.practice.patients(), params).await
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient logical id")),
    responses(
        (status = 200, description = "Patient", body = PatientRecord),
        (status = 404, description = "No such patient")
    )
)]
#[axum::debug_handler]
async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PatientRecord>> {
    get_from(state.practice.patients(), &id).await
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = PatientForm,
    responses(
        (status = 201, description = "Patient stored", body = PatientWrite),
        (status = 202, description = "Server unavailable; local record returned, not stored", body = PatientWrite),
        (status = 400, description = "Invalid form"),
        (status = 502, description = "FHIR server rejected the write")
    )
)]
/// Register a new patient
#[axum::debug_handler]
async fn create_patient(
    State(state): State<AppState>,
    Json(form): Json<PatientForm>,
) -> ApiResult<(StatusCode, Json<PatientWrite>)> {
    let outcome = state
        .practice
        .create_patient(&form)
        .await
        .map_err(api_error)?;
    Ok(written(outcome, StatusCode::CREATED))
}

#[utoipa::path(
    put,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient logical id")),
    request_body = PatientForm,
    responses(
        (status = 200, description = "Patient updated", body = PatientWrite),
        (status = 202, description = "Server unavailable; update not stored", body = PatientWrite),
        (status = 400, description = "Invalid form or local-only id"),
        (status = 502, description = "FHIR server rejected the write")
    )
)]
#[axum::debug_handler]
async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<PatientForm>,
) -> ApiResult<(StatusCode, Json<PatientWrite>)> {
    let outcome = state
        .practice
        .update_patient(&id, &form)
        .await
        .map_err(api_error)?;
    Ok(written(outcome, StatusCode::OK))
}

#[utoipa::path(
    get,
    path = "/practitioners",
    params(ListParams),
    responses((status = 200, description = "Practitioners", body = PractitionerListing))
)]
#[axum::debug_handler]
async fn list_practitioners(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PractitionerListing>> {
    list_from(state.practice.practitioners(), params).await
}

#[utoipa::path(
    get,
    path = "/practitioners/{id}",
    params(("id" = String, Path, description = "Practitioner logical id")),
    responses(
        (status = 200, description = "Practitioner", body = PractitionerRecord),
        (status = 404, description = "No such practitioner")
    )
)]
#[axum::debug_handler]
async fn get_practitioner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PractitionerRecord>> {
    get_from(state.practice.practitioners(), &id).await
}

// ============================================================================
// SCHEDULING
// ============================================================================

#[utoipa::path(
    get,
    path = "/appointments",
    params(ListParams),
    responses((status = 200, description = "Appointments", body = AppointmentListing))
)]
#[axum::debug_handler]
async fn list_appointments(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<AppointmentListing>> {
    list_from(state.practice.appointments(), params).await
}

#[utoipa::path(
    get,
    path = "/appointments/{id}",
    params(("id" = String, Path, description = "Appointment logical id")),
    responses(
        (status = 200, description = "Appointment", body = AppointmentRecord),
        (status = 404, description = "No such appointment")
    )
)]
#[axum::debug_handler]
async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AppointmentRecord>> {
    get_from(state.practice.appointments(), &id).await
}

#[utoipa::path(
    post,
    path = "/appointments",
    request_body = AppointmentForm,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentWrite),
        (status = 202, description = "Server unavailable; not stored", body = AppointmentWrite),
        (status = 400, description = "Invalid form")
    )
)]
#[axum::debug_handler]
async fn create_appointment(
    State(state): State<AppState>,
    Json(form): Json<AppointmentForm>,
) -> ApiResult<(StatusCode, Json<AppointmentWrite>)> {
    let outcome = state
        .practice
        .create_appointment(&form)
        .await
        .map_err(api_error)?;
    Ok(written(outcome, StatusCode::CREATED))
}

#[utoipa::path(
    put,
    path = "/appointments/{id}",
    params(("id" = String, Path, description = "Appointment logical id")),
    request_body = AppointmentForm,
    responses(
        (status = 200, description = "Appointment updated", body = AppointmentWrite),
        (status = 202, description = "Server unavailable; not stored", body = AppointmentWrite),
        (status = 400, description = "Invalid form")
    )
)]
#[axum::debug_handler]
async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<AppointmentForm>,
) -> ApiResult<(StatusCode, Json<AppointmentWrite>)> {
    let outcome = state
        .practice
        .update_appointment(&id, &form)
        .await
        .map_err(api_error)?;
    Ok(written(outcome, StatusCode::OK))
}

#[utoipa::path(
    get,
    path = "/tasks",
    params(ListParams),
    responses((status = 200, description = "Tasks", body = TaskListing))
)]
#[axum::debug_handler]
async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<TaskListing>> {
    list_from(state.practice.tasks(), params).await
}

#[utoipa::path(
    get,
    path = "/tasks/{id}",
    params(("id" = String, Path, description = "Task logical id")),
    responses(
        (status = 200, description = "Task", body = TaskRecord),
        (status = 404, description = "No such task")
    )
)]
#[axum::debug_handler]
async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<TaskRecord>> {
    get_from(state.practice.tasks(), &id).await
}

#[utoipa::path(
    post,
    path = "/tasks",
    request_body = TaskForm,
    responses(
        (status = 201, description = "Task created", body = TaskWrite),
        (status = 202, description = "Server unavailable; not stored", body = TaskWrite),
        (status = 400, description = "Invalid form")
    )
)]
#[axum::debug_handler]
async fn create_task(
    State(state): State<AppState>,
    Json(form): Json<TaskForm>,
) -> ApiResult<(StatusCode, Json<TaskWrite>)> {
    let outcome = state.practice.create_task(&form).await.map_err(api_error)?;
    Ok(written(outcome, StatusCode::CREATED))
}

#[utoipa::path(
    put,
    path = "/tasks/{id}",
    params(("id" = String, Path, description = "Task logical id")),
    request_body = TaskForm,
    responses(
        (status = 200, description = "Task updated", body = TaskWrite),
        (status = 202, description = "Server unavailable; not stored", body = TaskWrite),
        (status = 400, description = "Invalid form")
    )
)]
#[axum::debug_handler]
async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<TaskForm>,
) -> ApiResult<(StatusCode, Json<TaskWrite>)> {
    let outcome = state
        .practice
        .update_task(&id, &form)
        .await
        .map_err(api_error)?;
    Ok(written(outcome, StatusCode::OK))
}

// ============================================================================
// ORDERS
// ============================================================================

#[utoipa::path(
    get,
    path = "/service-requests",
    params(ListParams),
    responses((status = 200, description = "Lab, imaging and referral orders", body = OrderListing))
)]
#[axum::debug_handler]
async fn list_service_requests(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<OrderListing>> {
    list_from(state.practice.service_requests(), params).await
}

#[utoipa::path(
    get,
    path = "/service-requests/{id}",
    params(("id" = String, Path, description = "ServiceRequest logical id")),
    responses(
        (status = 200, description = "Order", body = OrderRecord),
        (status = 404, description = "No such order")
    )
)]
#[axum::debug_handler]
async fn get_service_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderRecord>> {
    get_from(state.practice.service_requests(), &id).await
}

#[utoipa::path(
    post,
    path = "/service-requests",
    request_body = OrderForm,
    responses(
        (status = 201, description = "Order placed", body = OrderWrite),
        (status = 202, description = "Server unavailable; not stored", body = OrderWrite),
        (status = 400, description = "Invalid form")
    )
)]
#[axum::debug_handler]
async fn create_service_request(
    State(state): State<AppState>,
    Json(form): Json<OrderForm>,
) -> ApiResult<(StatusCode, Json<OrderWrite>)> {
    let outcome = state.practice.create_order(&form).await.map_err(api_error)?;
    Ok(written(outcome, StatusCode::CREATED))
}

#[utoipa::path(
    get,
    path = "/medication-requests",
    params(ListParams),
    responses((status = 200, description = "Prescriptions", body = OrderListing))
)]
#[axum::debug_handler]
async fn list_medication_requests(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<OrderListing>> {
    list_from(state.practice.medication_requests(), params).await
}

#[utoipa::path(
    get,
    path = "/medication-requests/{id}",
    params(("id" = String, Path, description = "MedicationRequest logical id")),
    responses(
        (status = 200, description = "Prescription", body = OrderRecord),
        (status = 404, description = "No such prescription")
    )
)]
#[axum::debug_handler]
async fn get_medication_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderRecord>> {
    get_from(state.practice.medication_requests(), &id).await
}

// ============================================================================
// MESSAGING AND BILLING
// ============================================================================

#[utoipa::path(
    get,
    path = "/messages",
    params(ListParams),
    responses((status = 200, description = "Secure messages", body = CommunicationListing))
)]
#[axum::debug_handler]
async fn list_messages(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<CommunicationListing>> {
    list_from(state.practice.communications(), params).await
}

#[utoipa::path(
    get,
    path = "/messages/{id}",
    params(("id" = String, Path, description = "Communication logical id")),
    responses(
        (status = 200, description = "Message", body = CommunicationRecord),
        (status = 404, description = "No such message")
    )
)]
#[axum::debug_handler]
async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CommunicationRecord>> {
    get_from(state.practice.communications(), &id).await
}

#[utoipa::path(
    post,
    path = "/messages",
    request_body = MessageForm,
    responses(
        (status = 201, description = "Message sent", body = CommunicationWrite),
        (status = 202, description = "Server unavailable; not sent", body = CommunicationWrite),
        (status = 400, description = "Invalid form")
    )
)]
#[axum::debug_handler]
async fn send_message(
    State(state): State<AppState>,
    Json(form): Json<MessageForm>,
) -> ApiResult<(StatusCode, Json<CommunicationWrite>)> {
    let outcome = state.practice.send_message(&form).await.map_err(api_error)?;
    Ok(written(outcome, StatusCode::CREATED))
}

#[utoipa::path(
    get,
    path = "/invoices",
    params(ListParams),
    responses((status = 200, description = "Invoices", body = InvoiceListing))
)]
#[axum::debug_handler]
async fn list_invoices(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<InvoiceListing>> {
    list_from(state.practice.invoices(), params).await
}

#[utoipa::path(
    get,
    path = "/invoices/{id}",
    params(("id" = String, Path, description = "Invoice logical id")),
    responses(
        (status = 200, description = "Invoice", body = InvoiceRecord),
        (status = 404, description = "No such invoice")
    )
)]
#[axum::debug_handler]
async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<InvoiceRecord>> {
    get_from(state.practice.invoices(), &id).await
}

#[utoipa::path(
    get,
    path = "/coverages",
    params(ListParams),
    responses((status = 200, description = "Insurance coverage", body = CoverageListing))
)]
#[axum::debug_handler]
async fn list_coverages(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<CoverageListing>> {
    list_from(state.practice.coverages(), params).await
}

#[utoipa::path(
    get,
    path = "/coverages/{id}",
    params(("id" = String, Path, description = "Coverage logical id")),
    responses(
        (status = 200, description = "Coverage", body = CoverageRecord),
        (status = 404, description = "No such coverage")
    )
)]
#[axum::debug_handler]
async fn get_coverage(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CoverageRecord>> {
    get_from(state.practice.coverages(), &id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use fhir::{Bundle, CapabilityStatement, ResourceType, SearchParams};
    use serde_json::Value;
    use std::time::Duration;
    use telecare_core::{ClientError, ClientResult, FallbackPolicy, FhirClient};
    use tower::ServiceExt;

    struct Offline;

    #[async_trait]
    impl FhirClient for Offline {
        async fn search(&self, _: ResourceType, _: &SearchParams) -> ClientResult<Bundle> {
            Err(ClientError::Transport("connection refused".into()))
        }
        async fn read(&self, _: ResourceType, _: &str) -> ClientResult<Value> {
            Err(ClientError::Transport("connection refused".into()))
        }
        async fn create(&self, _: ResourceType, _: Value) -> ClientResult<Value> {
            Err(ClientError::Transport("connection refused".into()))
        }
        async fn update(&self, _: ResourceType, _: &str, _: Value) -> ClientResult<Value> {
            Err(ClientError::Transport("connection refused".into()))
        }
        async fn capabilities(&self) -> ClientResult<CapabilityStatement> {
            Err(ClientError::Transport("connection refused".into()))
        }
    }

    fn app(policy: FallbackPolicy) -> Router {
        router(Arc::new(Practice::with_client(
            Arc::new(Offline),
            Duration::from_secs(60),
            policy,
        )))
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).expect("request")
    }

    #[tokio::test]
    async fn lists_fall_back_with_query_applied() {
        let (status, body) = call(
            app(FallbackPolicy::Fixtures),
            get("/patients?search=jane&sort=-name"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "fallback");
        assert_eq!(body["total"], 1);
        assert_eq!(body["items"][0]["name"], "Jane Smith");
    }

    #[tokio::test]
    async fn pagination_reports_total_before_paging() {
        let (status, body) = call(
            app(FallbackPolicy::Fixtures),
            get("/patients?page=1&page_size=2"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["total"], 4);
    }

    #[tokio::test]
    async fn bad_query_is_rejected() {
        let (status, _) = call(
            app(FallbackPolicy::Fixtures),
            get("/appointments?date_from=next-week"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(app(FallbackPolicy::Fixtures), get("/tasks?page_size=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn strict_policy_maps_to_bad_gateway() {
        let (status, _) = call(app(FallbackPolicy::Strict), get("/invoices")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (status, _) = call(app(FallbackPolicy::Fixtures), get("/coverages/cov-999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(app(FallbackPolicy::Fixtures), get("/coverages/cov-001")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "fallback");
    }

    #[tokio::test]
    async fn degraded_write_is_accepted_not_created() {
        let request = Request::post("/patients")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"given_name":"Grace","family_name":"Hopper"}"#,
            ))
            .expect("request");
        let (status, body) = call(app(FallbackPolicy::Fixtures), request).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["outcome"], "degraded");
        assert!(body["value"]["id"]
            .as_str()
            .is_some_and(|id| id.starts_with("local-")));
    }

    #[tokio::test]
    async fn invalid_form_is_bad_request() {
        let request = Request::post("/messages")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"patient_id":"p-001","practitioner_id":"","body":"hi"}"#))
            .expect("request");
        let (status, _) = call(app(FallbackPolicy::Fixtures), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_reports_unreachable_server() {
        let (status, body) = call(app(FallbackPolicy::Fixtures), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reachable"], false);
    }

    #[test]
    fn openapi_lists_every_collection() {
        let doc = ApiDoc::openapi();
        for path in [
            "/patients",
            "/practitioners",
            "/appointments",
            "/tasks",
            "/service-requests",
            "/medication-requests",
            "/messages",
            "/invoices",
            "/coverages",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
