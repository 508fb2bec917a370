use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{FromRequest, FromRequestParts, Path, State},
    http::{HeaderName, HeaderValue, Method, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use platform_api::{ApiError, ApiResponse, ApiResult, Page, validate};
use platform_db::DbPool;
use platform_render::PDF_CONTENT_TYPE;
use products_billing::invoices;
use products_hr::{employees, payslips, subadmins};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<AppConfig>,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

/// JSON body extractor whose rejections use the API error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query-string extractor whose rejections use the API error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "payroll server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([header::CONTENT_TYPE])
        .allow_methods([Method::POST, Method::GET])
        .expose_headers([header::CONTENT_DISPOSITION])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    let cors = cors_layer(&state.config.cors_allowed_origins);

    let employee = Router::new()
        .route("/create", post(create_employee))
        .route("/update", post(update_employee))
        .route("/delete", post(delete_employee))
        .route("/get", get(get_employee))
        .route("/list", post(list_employees))
        .route("/salaryslip", post(generate_payslip))
        .route("/payslips", post(list_payslips))
        .route("/payslip/{id}", get(view_payslip));
    let invoice = Router::new()
        .route("/generate", post(generate_invoice))
        .route("/list", post(list_invoices));
    let subadmin = Router::new()
        .route("/register", post(register_subadmin))
        .route("/update", post(update_subadmin))
        .route("/delete", post(delete_subadmin))
        .route("/list", post(list_subadmins))
        .route("/login", post(login_subadmin));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/employee", employee)
        .nest("/invoice", invoice)
        .nest("/subadmin", subadmin)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[derive(Clone, Copy)]
enum Disposition {
    Attachment,
    Inline,
}

/// Streams a rendered document. The filename is reduced to a header-safe
/// character set.
fn pdf_response(pdf: Vec<u8>, filename: &str, disposition: Disposition) -> ApiResult<Response> {
    let kind = match disposition {
        Disposition::Attachment => "attachment",
        Disposition::Inline => "inline",
    };
    let safe: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let disposition = HeaderValue::from_str(&format!("{kind}; filename=\"{safe}\""))
        .map_err(|err| ApiError::internal(err.into()))?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(PDF_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}

#[derive(Deserialize)]
struct EmployeeKey {
    #[serde(default, rename = "employeeId", alias = "employee_id")]
    employee_id: Option<String>,
}

#[derive(Deserialize)]
struct SubadminKey {
    #[serde(default, rename = "subadminId", alias = "subadminid", alias = "subadmin_id")]
    subadmin_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmployeeRef {
    employee_id: String,
}

async fn create_employee(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<employees::NewEmployee>,
) -> ApiResult<ApiResponse<EmployeeRef>> {
    let employee_id = employees::create(&state.pool, input).await?;
    Ok(ApiResponse::created(
        "Employee added successfully",
        EmployeeRef { employee_id },
    ))
}

async fn update_employee(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<employees::EmployeeUpdate>,
) -> ApiResult<ApiResponse<EmployeeRef>> {
    let employee_id = employees::update(&state.pool, input).await?;
    Ok(ApiResponse::ok(
        "Employee updated successfully",
        EmployeeRef { employee_id },
    ))
}

async fn delete_employee(
    State(state): State<AppState>,
    ApiJson(key): ApiJson<EmployeeKey>,
) -> ApiResult<ApiResponse<()>> {
    let employee_id = validate::required_text("employeeId", key.employee_id)?;
    employees::delete(&state.pool, &employee_id).await?;
    Ok(ApiResponse::message("Employee deleted successfully"))
}

async fn get_employee(
    State(state): State<AppState>,
    ApiQuery(key): ApiQuery<EmployeeKey>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let employee_id = validate::required_text("employeeId", key.employee_id)?;
    let employee = employees::get(&state.pool, &employee_id).await?;
    Ok(ApiResponse::ok(
        "Employee retrieved successfully",
        json!({ "employee": employee }),
    ))
}

async fn list_employees(
    State(state): State<AppState>,
    ApiJson(query): ApiJson<employees::EmployeeQuery>,
) -> ApiResult<ApiResponse<Page<employees::EmployeeView>>> {
    let page = employees::list(&state.pool, query).await?;
    Ok(ApiResponse::ok("Employees retrieved successfully", page))
}

async fn generate_payslip(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<payslips::PayslipRequest>,
) -> ApiResult<Response> {
    let rendered = payslips::generate(&state.pool, &state.config.issuer, request).await?;
    pdf_response(rendered.pdf, &rendered.filename, Disposition::Attachment)
}

async fn list_payslips(
    State(state): State<AppState>,
    ApiJson(query): ApiJson<payslips::PayslipQuery>,
) -> ApiResult<ApiResponse<Page<payslips::PayslipSummary>>> {
    let page = payslips::list(&state.pool, query).await?;
    let message = if page.total == 0 {
        "No payslips found"
    } else {
        "Payslips retrieved successfully"
    };
    Ok(ApiResponse::ok(message, page))
}

async fn view_payslip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let rendered = payslips::view(&state.pool, &state.config.issuer, &id).await?;
    pdf_response(rendered.pdf, &rendered.filename, Disposition::Inline)
}

async fn generate_invoice(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<invoices::InvoiceRequest>,
) -> ApiResult<Response> {
    let rendered = invoices::generate(&state.pool, &state.config.issuer, request).await?;
    pdf_response(rendered.pdf, &rendered.filename, Disposition::Attachment)
}

async fn list_invoices(
    State(state): State<AppState>,
    ApiJson(query): ApiJson<invoices::InvoiceQuery>,
) -> ApiResult<ApiResponse<Page<invoices::InvoiceView>>> {
    let page = invoices::list(&state.pool, query).await?;
    Ok(ApiResponse::ok("Invoices retrieved successfully", page))
}

async fn register_subadmin(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<subadmins::Registration>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let subadmin_id = subadmins::register(&state.pool, input).await?;
    Ok(ApiResponse::ok(
        "Subadmin registered successfully",
        json!({ "subadminId": subadmin_id }),
    ))
}

async fn update_subadmin(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<subadmins::SubadminUpdate>,
) -> ApiResult<ApiResponse<()>> {
    subadmins::update(&state.pool, input).await?;
    Ok(ApiResponse::message("Subadmin updated successfully"))
}

async fn delete_subadmin(
    State(state): State<AppState>,
    ApiJson(key): ApiJson<SubadminKey>,
) -> ApiResult<ApiResponse<()>> {
    subadmins::delete(&state.pool, key.subadmin_id).await?;
    Ok(ApiResponse::message("Subadmin deleted successfully"))
}

async fn list_subadmins(
    State(state): State<AppState>,
    ApiJson(query): ApiJson<subadmins::SubadminQuery>,
) -> ApiResult<ApiResponse<Page<subadmins::SubadminView>>> {
    let page = subadmins::list(&state.pool, query).await?;
    Ok(ApiResponse::ok("Subadmins retrieved successfully", page))
}

async fn login_subadmin(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<subadmins::Credentials>,
) -> ApiResult<ApiResponse<subadmins::LoginGrant>> {
    let grant = subadmins::login(&state.pool, credentials).await?;
    Ok(ApiResponse::ok("Login successful", grant))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = state.pool.ping().await.is_ok();
    Json(HealthResponse {
        ok: db_ok,
        db_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    db_ok: bool,
    version: &'static str,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(%err, "failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}
