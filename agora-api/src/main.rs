mod extract;
mod routes;

use agora_app::{AgoraConfig, AppContext};
use agora_ui::App;
use axum::extract::{Request, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use leptos::prelude::*;
use leptos_axum::{generate_route_list, handle_server_fns_with_context, LeptosRoutes};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_sessions::cookie::SameSite;
use tower_sessions::{MemoryStore, Session, SessionManagerLayer};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("agora stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let conf = get_configuration(Some("Cargo.toml"))?;
    let leptos_options = conf.leptos_options;
    let addr = leptos_options.site_addr;

    let config = AgoraConfig::from_env()?;
    let storage_dir = config.storage_dir.clone();
    let storage_base = config.storage_public_base.clone();
    let app_context = AppContext::connect(config).await?;

    let routes = generate_route_list(App);

    register_server_fns();

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax);

    let api = routes::router().with_state(app_context.clone());

    let app = Router::new()
        .route(
            "/sfn/{*fn_name}",
            post(server_fn_handler).with_state(app_context.clone()),
        )
        .leptos_routes_with_context(
            &leptos_options,
            routes,
            {
                let ctx = app_context.clone();
                move || provide_context(ctx.clone())
            },
            {
                let leptos_options = leptos_options.clone();
                move || shell(leptos_options.clone())
            },
        )
        .fallback(leptos_axum::file_and_error_handler(shell))
        .with_state(leptos_options)
        .merge(api)
        .nest_service(&storage_base, ServeDir::new(&storage_dir))
        .layer(session_layer)
        .layer(CompressionLayer::new());

    tracing::info!("Listening on http://{}", addr);
    tracing::info!(%storage_dir, %storage_base, "serving uploaded images");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

fn register_server_fns() {
    use agora_ui::server::*;

    server_fn::axum::register_explicit::<GetSessionFn>();
    server_fn::axum::register_explicit::<EventsPageFn>();
    server_fn::axum::register_explicit::<VoteStateFn>();
    server_fn::axum::register_explicit::<CastVoteFn>();
    server_fn::axum::register_explicit::<NotificationsFn>();
    server_fn::axum::register_explicit::<MarkNotificationReadFn>();
    server_fn::axum::register_explicit::<MarkAllNotificationsReadFn>();
    server_fn::axum::register_explicit::<DeleteNotificationFn>();
    server_fn::axum::register_explicit::<DeleteAllNotificationsFn>();
    server_fn::axum::register_explicit::<RegisterProfileFn>();
    server_fn::axum::register_explicit::<UpdateProfileFn>();
    server_fn::axum::register_explicit::<GetEventFn>();
    server_fn::axum::register_explicit::<CreateEventFn>();
    server_fn::axum::register_explicit::<UpdateEventFn>();
    server_fn::axum::register_explicit::<DeleteEventFn>();
    server_fn::axum::register_explicit::<OrganizerDashboardFn>();
    server_fn::axum::register_explicit::<OrganizerStatsFn>();
    server_fn::axum::register_explicit::<InterestCountsFn>();
    server_fn::axum::register_explicit::<VotedEventsFn>();
    tracing::info!("server functions registered");
}

/// Server functions see the shared context and the caller's session.
async fn server_fn_handler(
    State(ctx): State<AppContext>,
    session: Session,
    req: Request,
) -> impl IntoResponse {
    handle_server_fns_with_context(
        move || {
            provide_context(ctx.clone());
            provide_context(session.clone());
        },
        req,
    )
    .await
}

fn shell(options: LeptosOptions) -> impl IntoView {
    use leptos::hydration::{AutoReload, HydrationScripts};
    use leptos_meta::*;

    let css = r#"
        :root {
            --base: #faf4ed;
            --surface: #fffaf3;
            --overlay: #f2e9e1;
            --muted: #9893a5;
            --subtle: #797593;
            --text: #575279;
            --love: #b4637a;
            --gold: #ea9d34;
            --pine: #286983;
            --foam: #56949f;
        }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body {
            font-family: 'Inter', -apple-system, sans-serif;
            background: var(--base);
            color: var(--text);
            min-height: 100vh;
        }
        .container { max-width: 900px; margin: 0 auto; padding: 1.5rem; }
        .topbar { display: flex; justify-content: space-between; align-items: center; padding: 1rem 0; border-bottom: 1px solid var(--overlay); }
        .topbar__brand { color: var(--pine); font-weight: 800; font-size: 1.4rem; text-decoration: none; }
        .topbar__actions { display: flex; gap: 1rem; align-items: center; }
        .button { padding: 0.6rem 1.2rem; background: var(--pine); color: var(--base); border: none; border-radius: 8px; font-weight: 600; cursor: pointer; text-decoration: none; }
        .button--ghost { background: transparent; color: var(--pine); border: 2px solid var(--pine); }
        .button:disabled { background: var(--muted); cursor: not-allowed; }
        .filters { display: flex; gap: 0.75rem; margin: 1.5rem 0; flex-wrap: wrap; }
        .filters__search { flex: 1; padding: 0.75rem 1rem; border: 2px solid var(--overlay); border-radius: 8px; background: var(--surface); color: var(--text); }
        .filters__status { padding: 0.75rem; border: 2px solid var(--overlay); border-radius: 8px; background: var(--surface); }
        .event-card { background: var(--surface); border: 2px solid var(--overlay); border-radius: 12px; padding: 1.25rem; margin-bottom: 1rem; }
        .event-card__title { color: var(--love); font-size: 1.25rem; margin-bottom: 0.5rem; }
        .event-card__meta { color: var(--subtle); font-size: 0.9rem; margin-bottom: 0.75rem; }
        .event-card__image { max-width: 100%; border-radius: 8px; margin-bottom: 0.75rem; }
        .badge { display: inline-block; padding: 0.15rem 0.6rem; border-radius: 999px; font-size: 0.8rem; font-weight: 600; }
        .badge--official { background: var(--foam); color: var(--base); }
        .badge--draft { background: var(--overlay); color: var(--subtle); }
        .badge--pending { background: var(--gold); color: var(--base); }
        .voting { display: flex; gap: 0.75rem; margin-top: 0.75rem; }
        .voting__button { padding: 0.5rem 1rem; border: 2px solid var(--overlay); border-radius: 8px; background: var(--base); cursor: pointer; }
        .voting__button--active { border-color: var(--pine); background: var(--pine); color: var(--base); }
        .feed__tail { text-align: center; color: var(--muted); padding: 1rem; }
        .feed__empty { text-align: center; color: var(--subtle); padding: 3rem 0; }
        .bell { position: relative; }
        .bell__count { position: absolute; top: -0.5rem; right: -0.75rem; background: var(--love); color: var(--base); border-radius: 999px; padding: 0 0.4rem; font-size: 0.75rem; }
        .bell__panel { position: absolute; right: 0; top: 2rem; width: 320px; background: var(--surface); border: 2px solid var(--overlay); border-radius: 8px; padding: 0.75rem; z-index: 10; }
        .bell__item { padding: 0.5rem 0; border-bottom: 1px solid var(--overlay); }
        .bell__item--unread { font-weight: 700; }
        .form { display: flex; flex-direction: column; gap: 1rem; max-width: 480px; margin: 2rem auto; }
        .form__input { padding: 0.75rem 1rem; border: 2px solid var(--overlay); border-radius: 8px; background: var(--surface); color: var(--text); }
        .form__error { color: #8b3d4d; font-size: 0.9rem; }
        .stats { display: flex; gap: 1rem; margin: 1.5rem 0; }
        .stats__card { flex: 1; background: var(--surface); border: 2px solid var(--overlay); border-radius: 8px; padding: 1rem; text-align: center; }
        .stats__value { font-size: 1.8rem; font-weight: 800; color: var(--pine); }
        .loading { display: flex; flex-direction: column; align-items: center; padding: 3rem; }
        .loading__spinner {
            width: 50px; height: 50px; border: 4px solid var(--overlay);
            border-top-color: var(--gold); border-radius: 50%; animation: spin 1s linear infinite;
        }
        @keyframes spin { to { transform: rotate(360deg); } }
        .loading__text { margin-top: 1rem; color: var(--subtle); font-style: italic; }
        .error { background: #fce8ec; border: 2px solid var(--love); border-radius: 8px; padding: 1.25rem; margin: 2rem 0; }
        .error__title { color: var(--love); font-weight: 700; margin-bottom: 0.5rem; }
        .error__message { color: #8b3d4d; }
        .error__retry { margin-top: 1rem; padding: 0.5rem 1rem; background: var(--love); color: var(--base); border: none; border-radius: 4px; cursor: pointer; }
    "#;

    view! {
        <!DOCTYPE html>
        <html lang="fr">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <title>"Agora"</title>
                <style>{css}</style>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}
