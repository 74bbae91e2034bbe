mod auth;
mod events;
mod interests;
mod notifications;
mod profile;
mod uploads;
mod votes;

use agora_app::AppContext;
use axum::Router;

pub fn router() -> Router<AppContext> {
    Router::new()
        .merge(auth::routes())
        .merge(profile::routes())
        .merge(uploads::routes())
        .merge(events::routes())
        .merge(votes::routes())
        .merge(notifications::routes())
        .merge(interests::routes())
}
