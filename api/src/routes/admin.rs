//! Admin screen management (/admin/screens/*, /admin/images)

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::AppState;
use crate::domain::reorder::{self, ReorderBackend, ReorderError};
use crate::domain::screens::{self as screens_domain, Screen, ScreenInput};
use crate::services::error::{ApiError, LogErr};
use crate::storage;
use super::auth::AdminSession;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/screens", get(list_screens).post(create_screen))
        .route("/admin/screens/reorder", post(reorder_screens))
        .route("/admin/screens/{id}", put(update_screen).delete(delete_screen))
        .route("/admin/images", post(upload_image))
}

/// GET /admin/screens - Every screen, in display order
async fn list_screens(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
) -> Result<Json<Vec<Screen>>, ApiError> {
    let screens = screens_domain::list_admin_screens(&state.db)
        .await
        .log_500("List admin screens error")?;
    Ok(Json(screens))
}

/// POST /admin/screens - Add a screen at the end of the display order
async fn create_screen(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(input): Json<ScreenInput>,
) -> Result<(StatusCode, Json<Screen>), ApiError> {
    let draft = input.validate().map_err(ApiError::bad_request)?;
    let screen = screens_domain::insert_screen(&state.db, &draft)
        .await
        .log_500("Insert screen error")?;

    info!(screen_id = screen.id, name = %screen.name, "Screen created");
    Ok((StatusCode::CREATED, Json(screen)))
}

/// PUT /admin/screens/{id}
async fn update_screen(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(screen_id): Path<i64>,
    Json(input): Json<ScreenInput>,
) -> Result<Json<Screen>, ApiError> {
    let draft = input.validate().map_err(ApiError::bad_request)?;
    let screen = screens_domain::update_screen(&state.db, screen_id, &draft)
        .await
        .log_500("Update screen error")?
        .ok_or(StatusCode::NOT_FOUND)?;

    info!(screen_id, "Screen updated");
    Ok(Json(screen))
}

/// DELETE /admin/screens/{id}
async fn delete_screen(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(screen_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = screens_domain::delete_screen(&state.db, screen_id)
        .await
        .log_500("Delete screen error")?;

    if !deleted {
        return Err(StatusCode::NOT_FOUND.into());
    }
    info!(screen_id, "Screen deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct ReorderRequest {
    from: usize,
    to: usize,
}

/// POST /admin/screens/reorder - Move one row and rewrite every position.
/// All writes share one transaction; a failed row rolls the whole move back.
async fn reorder_screens(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<Vec<Screen>>, ApiError> {
    let mut screens = screens_domain::list_admin_screens(&state.db)
        .await
        .log_500("List admin screens error")?;

    reorder_in(&state.db, &mut screens, req.from, req.to).await?;

    info!(from = req.from, to = req.to, rows = screens.len(), "Screens reordered");
    Ok(Json(screens))
}

/// Apply the move through `backend`, then renumber `screens` to match.
/// A bad index is the caller's fault (400); anything else is a 500.
async fn reorder_in<B: ReorderBackend>(
    backend: &B,
    screens: &mut Vec<Screen>,
    from: usize,
    to: usize,
) -> Result<(), ApiError> {
    reorder::reorder(backend, screens, from, to, |s| s.id)
        .await
        .map_err(|e| match e {
            ReorderError::IndexOutOfRange { .. } => ApiError::bad_request(e),
            e => {
                error!("Reorder screens error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into()
            }
        })?;
    for (position, screen) in screens.iter_mut().enumerate() {
        screen.display_order = position as i32;
    }
    Ok(())
}

#[derive(Serialize)]
struct UploadResponse {
    url: String,
}

/// POST /admin/images - Upload one screen photo (multipart `file` field)
async fn upload_image(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .log_status("Multipart field error", StatusCode::BAD_REQUEST)?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();
        let extension =
            storage::image_extension(&content_type).ok_or(StatusCode::UNSUPPORTED_MEDIA_TYPE)?;

        let data = field
            .bytes()
            .await
            .log_status("Failed to read upload", StatusCode::BAD_REQUEST)?;
        if data.is_empty() {
            return Err(ApiError::bad_request("Uploaded file is empty"));
        }

        let path = storage::image_object_path(extension);
        let url = state
            .storage
            .upload(&path, data)
            .await
            .log_500("Image upload error")?;

        info!(%path, "Screen image uploaded");
        return Ok((StatusCode::CREATED, Json(UploadResponse { url })));
    }

    Err(ApiError::bad_request("Missing file field"))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, login_cookie, read_json};
    use super::reorder_in;
    use crate::domain::reorder::test_backend::table_of;
    use crate::domain::screens::fixtures::screen;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn admin_endpoints_require_session() {
        for (method, uri) in [
            ("GET", "/admin/screens"),
            ("POST", "/admin/screens/reorder"),
            ("DELETE", "/admin/screens/3"),
        ] {
            let (app, _media) = app();
            let response = app
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(uri)
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(Body::from(r#"{"from":0,"to":1}"#))
                        .expect("request"),
                )
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn invalid_screen_form_is_bad_request() {
        let body = json!({"name": "Akropolis", "city": " ", "coordinates": "54.7, 25.2"});
        let (app, _media) = app();
        let response = app
            .oneshot(
                Request::post("/admin/screens")
                    .header(header::COOKIE, login_cookie())
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"], "City is required");
    }

    #[tokio::test]
    async fn non_image_upload_is_rejected() {
        let boundary = "ledmap-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"clip.mp4\"\r\n\
             Content-Type: video/mp4\r\n\r\n\
             data\r\n\
             --{boundary}--\r\n"
        );
        let (app, _media) = app();
        let response = app
            .oneshot(
                Request::post("/admin/images")
                    .header(header::COOKIE, login_cookie())
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn image_upload_lands_in_local_storage() {
        let boundary = "ledmap-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"front.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             not-really-a-png\r\n\
             --{boundary}--\r\n"
        );
        let (app, media) = app();
        let response = app
            .oneshot(
                Request::post("/admin/images")
                    .header(header::COOKIE, login_cookie())
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CREATED);

        let url = read_json(response).await["url"]
            .as_str()
            .expect("url")
            .to_string();
        assert!(url.starts_with("/media/screens/"));
        assert!(url.ends_with(".png"));

        let stored = media.path().join(url.trim_start_matches("/media/"));
        assert_eq!(std::fs::read(stored).expect("stored image"), b"not-really-a-png");
    }

    fn five_screens() -> Vec<crate::domain::screens::Screen> {
        (1..=5).map(|id| screen(id, &format!("Screen {id}"), "Vilnius")).collect()
    }

    #[tokio::test]
    async fn reorder_out_of_range_is_bad_request_without_writes() {
        let table = table_of(&[1, 2, 3, 4, 5], None);
        let before = table.committed.lock().expect("lock").clone();
        let mut screens = five_screens();

        let err = reorder_in(&table, &mut screens, 5, 0).await.unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(*table.begun.lock().expect("lock"), 0);
        assert_eq!(*table.committed.lock().expect("lock"), before);
    }

    #[tokio::test]
    async fn reorder_failure_mid_list_changes_no_positions() {
        let table = table_of(&[1, 2, 3, 4, 5], Some(2));
        let before = table.committed.lock().expect("lock").clone();
        let mut screens = five_screens();

        let err = reorder_in(&table, &mut screens, 2, 0).await.unwrap_err();

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(*table.committed.lock().expect("lock"), before);
    }

    #[tokio::test]
    async fn reorder_renumbers_returned_screens() {
        let table = table_of(&[1, 2, 3, 4, 5], None);
        let mut screens = five_screens();

        reorder_in(&table, &mut screens, 2, 0).await.expect("reordered");

        let order: Vec<(i64, i32)> = screens.iter().map(|s| (s.id, s.display_order)).collect();
        assert_eq!(order, vec![(3, 0), (1, 1), (2, 2), (4, 3), (5, 4)]);
        assert_eq!(table.committed.lock().expect("lock")[&3], 0);
    }
}
