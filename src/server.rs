use crate::config::{LayoutConfig, ServerConfig};
use crate::data::SchedulingOutput;
use crate::error::{PlanningError, Result};
use crate::planner::plan;
use crate::workbook::{self, sheets};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use log::{debug, error, info};
use std::sync::Arc;
use umya_spreadsheet::Spreadsheet;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const RESULT_FILENAME: &str = "Mois_avec_profs.xlsx";

#[derive(Clone)]
pub struct AppState {
    pub layout: Arc<LayoutConfig>,
}

/// The three workbooks of one request, still encoded.
struct Uploads {
    courses: Vec<u8>,
    availability: Vec<u8>,
    hours: Vec<u8>,
}

async fn read_uploads(mut multipart: Multipart) -> Result<Uploads> {
    let mut courses = None;
    let mut availability = None;
    let mut hours = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PlanningError::Upload(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| PlanningError::Upload(e.to_string()))?
            .to_vec();
        match name.as_str() {
            "courses" => courses = Some(bytes),
            "availability" => availability = Some(bytes),
            "hours" => hours = Some(bytes),
            other => debug!("Ignoring upload field '{}'", other),
        }
    }

    Ok(Uploads {
        courses: courses.ok_or(PlanningError::MissingUpload("courses"))?,
        availability: availability.ok_or(PlanningError::MissingUpload("availability"))?,
        hours: hours.ok_or(PlanningError::MissingUpload("hours"))?,
    })
}

/// Decodes the workbooks, plans, and hands both to `finish`, all off the async runtime.
async fn run_plan<T, F>(uploads: Uploads, layout: Arc<LayoutConfig>, finish: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(Spreadsheet, SchedulingOutput) -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let hours = workbook::from_bytes(&uploads.hours)?;
        let availability = workbook::from_bytes(&uploads.availability)?;
        let courses = workbook::from_bytes(&uploads.courses)?;
        let output = plan(sheets(&hours), sheets(&availability), sheets(&courses), &layout);
        finish(courses, output)
    })
    .await
    .map_err(|e| PlanningError::Internal(e.to_string()))?
}

fn rejection(e: PlanningError) -> (StatusCode, String) {
    error!("Generation failed: {}", e);
    let status = match e {
        PlanningError::Io(_) | PlanningError::Internal(_) | PlanningError::Layout(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::BAD_REQUEST,
    };
    (status, format!("Erreur dans la génération : {e}"))
}

async fn solve_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> std::result::Result<Json<SchedulingOutput>, (StatusCode, String)> {
    let uploads = read_uploads(multipart).await.map_err(rejection)?;
    let output = run_plan(uploads, state.layout, |_, output| Ok(output))
        .await
        .map_err(rejection)?;
    Ok(Json(output))
}

async fn generate_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> std::result::Result<impl IntoResponse, (StatusCode, String)> {
    let uploads = read_uploads(multipart).await.map_err(rejection)?;
    let bytes = run_plan(uploads, state.layout, |mut courses, output| {
        workbook::write_assignments(&mut courses, &output)?;
        workbook::to_bytes(&courses)
    })
    .await
    .map_err(rejection)?;

    let disposition = format!("attachment; filename=\"{RESULT_FILENAME}\"");
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

pub fn router(layout: LayoutConfig, max_upload_bytes: usize) -> Router {
    let state = AppState {
        layout: Arc::new(layout),
    };
    Router::new()
        .route("/v1/schedule/solve", post(solve_handler))
        .route("/v1/schedule/generate", post(generate_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let app = router(config.layout, config.max_upload_bytes);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::fixtures::{availability_book, course_book, hours_book};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    const BOUNDARY: &str = "lodima-test-boundary";

    fn multipart_body(parts: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, bytes) in parts {
            let disposition = format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{name}.xlsx\""
            );
            body.extend_from_slice(
                format!("--{BOUNDARY}\r\n{disposition}\r\nContent-Type: {XLSX_MIME}\r\n\r\n")
                    .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(uri: &str, parts: &[(&str, Vec<u8>)]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    fn all_parts() -> Vec<(&'static str, Vec<u8>)> {
        vec![
            ("courses", workbook::to_bytes(&course_book()).unwrap()),
            ("availability", workbook::to_bytes(&availability_book()).unwrap()),
            ("hours", workbook::to_bytes(&hours_book()).unwrap()),
        ]
    }

    fn app() -> Router {
        router(LayoutConfig::default(), 10 * 1024 * 1024)
    }

    #[tokio::test]
    async fn solve_returns_assignments_as_json() {
        let response = app()
            .oneshot(upload_request("/v1/schedule/solve", &all_parts()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["totalSlots"], 3);
        assert_eq!(json["filledSlots"], 3);
        let first = &json["assignments"]["Dupont"][0]["slot"];
        assert_eq!(first["date"], "2024-09-02");
        assert_eq!(first["period"], "AM");
        assert_eq!(first["classGroup"], "BAC PRO 22");
        assert_eq!(first["location"]["sheet"], "Septembre");
    }

    #[tokio::test]
    async fn generate_returns_the_filled_workbook() {
        let response = app()
            .oneshot(upload_request("/v1/schedule/generate", &all_parts()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], XLSX_MIME);
        assert!(
            response.headers()[header::CONTENT_DISPOSITION]
                .to_str()
                .unwrap()
                .contains(RESULT_FILENAME)
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let book = workbook::from_bytes(&body).unwrap();
        let sheet = book.get_sheet_by_name("Septembre").unwrap();
        assert_eq!(sheet.get_value((4, 6)), "Dupont");
        assert_eq!(sheet.get_value((6, 6)), "Martin");
    }

    #[tokio::test]
    async fn missing_workbook_is_a_bad_request() {
        let parts = vec![("courses", workbook::to_bytes(&course_book()).unwrap())];
        let response = app()
            .oneshot(upload_request("/v1/schedule/generate", &parts))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let message = String::from_utf8(body.to_vec()).unwrap();
        assert!(message.contains("availability"));
    }

    #[tokio::test]
    async fn unreadable_workbook_is_a_bad_request() {
        let mut parts = all_parts();
        parts[2].1 = b"not a spreadsheet".to_vec();
        let response = app()
            .oneshot(upload_request("/v1/schedule/solve", &parts))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
