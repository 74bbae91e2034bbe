use crate::extract::Registered;
use agora_app::domain::{NotificationId, NotificationList, NotificationSnapshot};
use agora_app::AppContext;
use agora_errors::AppError;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use futures::Stream;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/notifications", get(list).delete(clear))
        .route("/api/notifications/read-all", post(read_all))
        .route("/api/notifications/stream", get(stream))
        .route("/api/notifications/{id}/read", post(read))
        .route("/api/notifications/{id}", delete(remove))
}

async fn list(
    State(ctx): State<AppContext>,
    Registered(profile): Registered,
) -> Json<NotificationSnapshot> {
    let feed = ctx.notification_feed(profile.user_id()).await;
    let list = NotificationList::new(feed.list());
    Json(NotificationSnapshot::from(&list))
}

async fn read(
    State(ctx): State<AppContext>,
    Registered(profile): Registered,
    Path(id): Path<NotificationId>,
) -> Result<StatusCode, AppError> {
    let feed = ctx.notification_feed(profile.user_id()).await;
    feed.mark_read(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn read_all(
    State(ctx): State<AppContext>,
    Registered(profile): Registered,
) -> Result<StatusCode, AppError> {
    let feed = ctx.notification_feed(profile.user_id()).await;
    feed.mark_all_read().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove(
    State(ctx): State<AppContext>,
    Registered(profile): Registered,
    Path(id): Path<NotificationId>,
) -> Result<StatusCode, AppError> {
    let feed = ctx.notification_feed(profile.user_id()).await;
    feed.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear(
    State(ctx): State<AppContext>,
    Registered(profile): Registered,
) -> Result<StatusCode, AppError> {
    let feed = ctx.notification_feed(profile.user_id()).await;
    feed.delete_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn stream(
    State(ctx): State<AppContext>,
    Registered(profile): Registered,
) -> Sse<impl Stream<Item = Result<SseEvent, axum::Error>>> {
    let feed = ctx.notification_feed(profile.user_id()).await;
    let updates = WatchStream::new(feed.subscribe()).map(move |list| {
        let _mounted = &feed;
        SseEvent::default()
            .event("notifications")
            .json_data(NotificationSnapshot::from(&list))
    });
    Sse::new(updates).keep_alive(KeepAlive::default())
}
