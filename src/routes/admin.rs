//! Admin Routes
//!
//! Read-only view over the request log.
//!
//! Endpoints:
//! - GET /admin/ - HTML table of the most recent requests (Basic auth)
//! - GET /admin/logs - Same rows as JSON (Basic auth)
//! - GET /admin/login - Login form
//! - POST /admin/login - Credential check, redirects to the dashboard

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{Html, Redirect},
    routing::get,
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::parse_basic_auth;
use crate::db::{LogRepository, OcrLog, RECENT_LOG_LIMIT};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the admin router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboard))
        .route("/admin/", get(dashboard))
        .route("/admin/logs", get(list_logs))
        .route("/admin/login", get(login_page).post(login))
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub logs: Vec<OcrLog>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Reject the request unless it carries valid Basic credentials
fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<()> {
    let credentials = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_basic_auth);

    match credentials {
        Some((username, password)) if state.authenticator().verify(&username, &password) => Ok(()),
        Some((username, _)) => {
            tracing::warn!(username = %username, "Admin authentication failed");
            Err(AppError::Unauthorized("Invalid credentials".to_string()))
        }
        None => Err(AppError::Unauthorized("Authentication required".to_string())),
    }
}

/// GET /admin/
async fn dashboard(State(state): State<AppState>, headers: HeaderMap) -> Result<Html<String>> {
    require_admin(&state, &headers)?;

    let logs = LogRepository::new(state.db())
        .list_recent(RECENT_LOG_LIMIT)
        .await?;

    Ok(Html(render_dashboard(&logs)))
}

/// GET /admin/logs
async fn list_logs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LogsQuery>,
) -> Result<Json<LogsResponse>> {
    require_admin(&state, &headers)?;

    let limit = query.limit.unwrap_or(RECENT_LOG_LIMIT).clamp(1, RECENT_LOG_LIMIT);
    let logs = LogRepository::new(state.db()).list_recent(limit).await?;
    let total = logs.len();

    Ok(Json(LogsResponse { logs, total }))
}

/// GET /admin/login
async fn login_page() -> Html<&'static str> {
    Html(LOGIN_HTML)
}

/// POST /admin/login
async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Result<Redirect> {
    if state.authenticator().verify(&form.username, &form.password) {
        tracing::info!(username = %form.username, "Admin login");
        Ok(Redirect::to("/admin/"))
    } else {
        tracing::warn!(username = %form.username, "Admin login failed");
        Err(AppError::Unauthorized("Invalid credentials".to_string()))
    }
}

fn render_dashboard(logs: &[OcrLog]) -> String {
    let mut rows = String::new();
    for log in logs {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><pre>{}</pre></td></tr>\n",
            log.id,
            html_escape::encode_text(&log.timestamp),
            html_escape::encode_text(&log.filename),
            log.file_type,
            log.status.as_str(),
            html_escape::encode_text(&log.extracted_text),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Blind OCR - Admin</title>
</head>
<body>
  <h1>Recent OCR requests</h1>
  <table>
    <thead>
      <tr><th>ID</th><th>Timestamp</th><th>Filename</th><th>Type</th><th>Status</th><th>Text</th></tr>
    </thead>
    <tbody>
{}    </tbody>
  </table>
</body>
</html>
"#,
        rows
    )
}

const LOGIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Blind OCR - Admin login</title>
</head>
<body>
  <h1>Admin login</h1>
  <form action="/admin/login" method="post">
    <label for="username">Username</label>
    <input id="username" name="username" autocomplete="username" required>
    <label for="password">Password</label>
    <input id="password" name="password" type="password" autocomplete="current-password" required>
    <button type="submit">Log in</button>
  </form>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use base64::Engine;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::db::{LogRepository, LogStatus, NewOcrLog};
    use crate::ocr::FileType;
    use crate::routes::test_support::{body_json, body_text, test_app, TEST_PASSWORD, TEST_USERNAME};

    fn basic(username: &str, password: &str) -> String {
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", username, password));
        format!("Basic {}", encoded)
    }

    fn get(uri: &str, auth: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_dashboard_requires_credentials() {
        let (app, _) = test_app(Ok(0), vec![]).await;

        let response = app.clone().oneshot(get("/admin/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

        let response = app
            .oneshot(get("/admin/", Some(basic(TEST_USERNAME, "wrong"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_dashboard_escapes_filenames() {
        let (app, pool) = test_app(Ok(0), vec![]).await;
        LogRepository::new(&pool)
            .append(&NewOcrLog {
                filename: "<script>alert(1)</script>.png",
                file_type: FileType::Image,
                extracted_text: "a & b",
                status: LogStatus::Success,
            })
            .await
            .unwrap();

        let response = app
            .oneshot(get("/admin/", Some(basic(TEST_USERNAME, TEST_PASSWORD))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;.png"));
        assert!(html.contains("a &amp; b"));
        assert!(!html.contains("<script>"));
    }

    #[tokio::test]
    async fn test_logs_json_limited_to_fifty() {
        let (app, pool) = test_app(Ok(0), vec![]).await;
        let repo = LogRepository::new(&pool);
        for i in 0..60 {
            repo.append(&NewOcrLog {
                filename: &format!("file-{}.pdf", i),
                file_type: FileType::Pdf,
                extracted_text: "text",
                status: LogStatus::Success,
            })
            .await
            .unwrap();
        }

        let response = app
            .clone()
            .oneshot(get("/admin/logs?limit=500", Some(basic(TEST_USERNAME, TEST_PASSWORD))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = body_json(response).await;
        assert_eq!(body["total"], 50);
        assert_eq!(body["logs"][0]["filename"], "file-59.pdf");
        assert_eq!(body["logs"][49]["filename"], "file-10.pdf");
        assert_eq!(body["logs"][0]["status"], "success");
        assert_eq!(body["logs"][0]["file_type"], "pdf");

        let response = app
            .oneshot(get("/admin/logs?limit=3", Some(basic(TEST_USERNAME, TEST_PASSWORD))))
            .await
            .unwrap();
        let body: Value = body_json(response).await;
        assert_eq!(body["total"], 3);
    }

    #[tokio::test]
    async fn test_login_form_flow() {
        let (app, _) = test_app(Ok(0), vec![]).await;

        let response = app.clone().oneshot(get("/admin/login", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let post = |body: String| {
            Request::builder()
                .method("POST")
                .uri("/admin/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap()
        };

        let response = app
            .clone()
            .oneshot(post(format!("username={}&password={}", TEST_USERNAME, TEST_PASSWORD)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/admin/");

        let response = app
            .oneshot(post(format!("username={}&password=nope", TEST_USERNAME)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
