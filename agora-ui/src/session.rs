use crate::server::{get_session, SessionView};
use agora_app::domain::{route_guard, RouteDecision, Role};
use leptos::prelude::*;
use leptos_router::components::Redirect;
use server_fn::ServerFnError;

pub type SessionResource = Resource<Result<SessionView, ServerFnError>>;

pub fn provide_session() -> SessionResource {
    let session = Resource::new(|| (), |_| get_session());
    provide_context(session);
    session
}

pub fn use_session() -> SessionResource {
    expect_context::<SessionResource>()
}

/// Renders `children` only when the session satisfies `required`, otherwise
/// redirects to the landing, registration or role home page.
#[component]
pub fn RoleGuard(#[prop(optional)] required: Option<Role>, children: ChildrenFn) -> impl IntoView {
    let session = use_session();
    let children = StoredValue::new(children);

    view! {
        <Suspense fallback=|| ()>
            {move || Suspend::new(async move {
                let view = session.await.unwrap_or(SessionView {
                    identity: None,
                    profile: None,
                });
                match route_guard(required, view.identity.as_ref(), view.profile.as_ref()) {
                    RouteDecision::Allow => children.with_value(|children| children()).into_any(),
                    RouteDecision::Redirect(path) => view! { <Redirect path=path/> }.into_any(),
                }
            })}
        </Suspense>
    }
}
