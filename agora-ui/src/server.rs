use agora_app::domain::{
    DashboardView, Event, EventForm, EventId, EventWithOwner, IdentityUser, InterestCounts,
    NotificationId, NotificationSnapshot, OrganizerStats, Profile, Role, VoteKind, VoteState,
};
use leptos::prelude::*;
use serde::{Deserialize, Serialize};
use server_fn::codec::Json;
use server_fn::ServerFnError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub identity: Option<IdentityUser>,
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPage {
    pub page_size: u64,
    pub events: Vec<Event>,
}

#[cfg(feature = "ssr")]
mod context {
    use agora_app::domain::{IdentityUser, Profile};
    use agora_app::infrastructure::auth::IdentitySession;
    use agora_app::AppContext;
    use agora_errors::AppError;
    use leptos::prelude::*;
    use server_fn::ServerFnError;
    use tower_sessions::Session;

    pub fn app() -> Result<AppContext, ServerFnError> {
        use_context::<AppContext>().ok_or_else(|| ServerFnError::new("AppContext missing"))
    }

    pub fn fail(e: AppError) -> ServerFnError {
        e.to_server_error()
    }

    async fn session() -> Result<IdentitySession, ServerFnError> {
        if let Some(session) = use_context::<Session>() {
            return Ok(IdentitySession::new(session));
        }
        // Server-side rendering: read the session from the request parts.
        let session = leptos_axum::extract::<Session>()
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;
        Ok(IdentitySession::new(session))
    }

    pub async fn identity() -> Result<Option<IdentityUser>, ServerFnError> {
        session().await?.current_user().await.map_err(fail)
    }

    pub async fn signed_in() -> Result<IdentityUser, ServerFnError> {
        identity().await?.ok_or_else(|| fail(AppError::Unauthenticated))
    }

    pub async fn profile() -> Result<Profile, ServerFnError> {
        let identity = signed_in().await?;
        app()?.profiles.require(&identity).await.map_err(fail)
    }
}

#[server(GetSessionFn, "/sfn", endpoint = "session")]
pub async fn get_session() -> Result<SessionView, ServerFnError> {
    let Some(identity) = context::identity().await? else {
        return Ok(SessionView {
            identity: None,
            profile: None,
        });
    };
    let profile = context::app()?
        .profiles
        .resolve(&identity)
        .await
        .map_err(context::fail)?;
    Ok(SessionView {
        identity: Some(identity),
        profile,
    })
}

#[server(EventsPageFn, "/sfn", endpoint = "events_page")]
pub async fn events_page(offset: u64) -> Result<FeedPage, ServerFnError> {
    let ctx = context::app()?;
    let page_size = ctx.feed_page_size();
    let events = ctx
        .events
        .page(offset, page_size)
        .await
        .map_err(context::fail)?;
    Ok(FeedPage { page_size, events })
}

#[server(VoteStateFn, "/sfn", endpoint = "vote_state")]
pub async fn vote_state(event_id: EventId) -> Result<VoteState, ServerFnError> {
    let ctx = context::app()?;
    let viewer = match context::identity().await? {
        Some(identity) => ctx
            .profiles
            .resolve(&identity)
            .await
            .map_err(context::fail)?
            .map(|p| p.user_id()),
        None => None,
    };
    let voting = ctx.voting(event_id, viewer).await.map_err(context::fail)?;
    Ok(voting.state())
}

#[server(CastVoteFn, "/sfn", endpoint = "cast_vote")]
pub async fn cast_vote(event_id: EventId, kind: VoteKind) -> Result<VoteState, ServerFnError> {
    use agora_app::application::VoteAttempt;

    let ctx = context::app()?;
    let profile = context::profile().await?;
    let voting = ctx
        .voting(event_id, Some(profile.user_id()))
        .await
        .map_err(context::fail)?;
    match voting.vote(kind).await {
        VoteAttempt::Applied(state) => Ok(state),
        // The click is dropped; the widget keeps showing the current state.
        VoteAttempt::InFlight | VoteAttempt::Unavailable => {
            tracing::debug!(event_id, %kind, "vote click dropped");
            Ok(voting.state())
        }
        VoteAttempt::Failed(e) => Err(context::fail(e)),
    }
}

#[server(NotificationsFn, "/sfn", endpoint = "notifications")]
pub async fn notifications() -> Result<NotificationSnapshot, ServerFnError> {
    use agora_app::domain::NotificationList;

    let profile = context::profile().await?;
    let feed = context::app()?.notification_feed(profile.user_id()).await;
    Ok(NotificationSnapshot::from(&NotificationList::new(feed.list())))
}

#[server(MarkNotificationReadFn, "/sfn", endpoint = "mark_notification_read")]
pub async fn mark_notification_read(id: NotificationId) -> Result<(), ServerFnError> {
    let profile = context::profile().await?;
    let feed = context::app()?.notification_feed(profile.user_id()).await;
    feed.mark_read(id).await.map_err(context::fail)
}

#[server(MarkAllNotificationsReadFn, "/sfn", endpoint = "mark_all_notifications_read")]
pub async fn mark_all_notifications_read() -> Result<(), ServerFnError> {
    let profile = context::profile().await?;
    let feed = context::app()?.notification_feed(profile.user_id()).await;
    feed.mark_all_read().await.map_err(context::fail)
}

#[server(DeleteNotificationFn, "/sfn", endpoint = "delete_notification")]
pub async fn delete_notification(id: NotificationId) -> Result<(), ServerFnError> {
    let profile = context::profile().await?;
    let feed = context::app()?.notification_feed(profile.user_id()).await;
    feed.delete(id).await.map_err(context::fail)
}

#[server(DeleteAllNotificationsFn, "/sfn", endpoint = "delete_all_notifications")]
pub async fn delete_all_notifications() -> Result<(), ServerFnError> {
    let profile = context::profile().await?;
    let feed = context::app()?.notification_feed(profile.user_id()).await;
    feed.delete_all().await.map_err(context::fail)
}

#[server(RegisterProfileFn, "/sfn", endpoint = "register_profile")]
pub async fn register_profile(
    full_name: String,
    role: Role,
    image_url: Option<String>,
) -> Result<Profile, ServerFnError> {
    use agora_app::domain::{AuthEvent, RegisterProfile};

    let ctx = context::app()?;
    let identity = context::signed_in().await?;
    let profile = ctx
        .profiles
        .register(
            &identity,
            RegisterProfile {
                full_name,
                role,
                image_url,
            },
        )
        .await
        .map_err(context::fail)?;
    ctx.auth_events
        .emit(AuthEvent::UserUpdated, &identity.id, Some(profile.user_id()));
    Ok(profile)
}

#[server(UpdateProfileFn, "/sfn", endpoint = "update_profile")]
pub async fn update_profile(
    full_name: String,
    image_url: Option<String>,
) -> Result<Profile, ServerFnError> {
    use agora_app::domain::{AuthEvent, UpdateProfile};

    let ctx = context::app()?;
    let identity = context::signed_in().await?;
    let current = context::profile().await?;
    let profile = ctx
        .profiles
        .update(
            &current,
            UpdateProfile {
                full_name,
                image_url,
            },
        )
        .await
        .map_err(context::fail)?;
    ctx.auth_events
        .emit(AuthEvent::UserUpdated, &identity.id, Some(profile.user_id()));
    Ok(profile)
}

#[server(GetEventFn, "/sfn", endpoint = "get_event")]
pub async fn get_event(id: EventId) -> Result<EventWithOwner, ServerFnError> {
    context::app()?.events.get(id).await.map_err(context::fail)
}

// Dates and the optional status travel as JSON rather than url-encoded.
#[server(name = CreateEventFn, prefix = "/sfn", endpoint = "create_event", input = Json)]
pub async fn create_event(form: EventForm) -> Result<Event, ServerFnError> {
    let profile = context::profile().await?;
    let today = chrono::Utc::now().date_naive();
    context::app()?
        .events
        .create(&profile, form, today)
        .await
        .map_err(context::fail)
}

#[server(name = UpdateEventFn, prefix = "/sfn", endpoint = "update_event", input = Json)]
pub async fn update_event(id: EventId, form: EventForm) -> Result<Event, ServerFnError> {
    let profile = context::profile().await?;
    context::app()?
        .events
        .update(&profile, id, form)
        .await
        .map_err(context::fail)
}

#[server(DeleteEventFn, "/sfn", endpoint = "delete_event")]
pub async fn delete_event(id: EventId) -> Result<(), ServerFnError> {
    let profile = context::profile().await?;
    context::app()?
        .events
        .delete(&profile, id)
        .await
        .map_err(context::fail)
}

#[server(OrganizerDashboardFn, "/sfn", endpoint = "organizer_dashboard")]
pub async fn organizer_dashboard() -> Result<DashboardView, ServerFnError> {
    let profile = context::profile().await?;
    context::app()?
        .events
        .dashboard(&profile)
        .await
        .map_err(context::fail)
}

#[server(OrganizerStatsFn, "/sfn", endpoint = "organizer_stats")]
pub async fn organizer_stats() -> Result<OrganizerStats, ServerFnError> {
    let profile = context::profile().await?;
    context::app()?
        .stats
        .organizer_stats(&profile)
        .await
        .map_err(context::fail)
}

#[server(InterestCountsFn, "/sfn", endpoint = "interest_counts")]
pub async fn interest_counts() -> Result<InterestCounts, ServerFnError> {
    let profile = context::profile().await?;
    context::app()?
        .stats
        .interest_counts(&profile)
        .await
        .map_err(context::fail)
}

#[server(VotedEventsFn, "/sfn", endpoint = "voted_events")]
pub async fn voted_events(kind: VoteKind) -> Result<Vec<EventWithOwner>, ServerFnError> {
    let profile = context::profile().await?;
    context::app()?
        .stats
        .voted_events(&profile, kind)
        .await
        .map_err(context::fail)
}
