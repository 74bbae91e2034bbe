use crate::realtime;
use crate::server::{
    delete_all_notifications, delete_notification, mark_all_notifications_read,
    mark_notification_read, notifications,
};
use agora_app::domain::{Notification, NotificationId, NotificationList, NotificationSnapshot};
use leptos::prelude::*;
use leptos::task::spawn_local;
use server_fn::ServerFnError;

#[derive(Clone, Copy)]
enum BellAction {
    Read(NotificationId),
    ReadAll,
    Delete(NotificationId),
    DeleteAll,
}

impl BellAction {
    fn patch(self, list: &mut NotificationList) {
        match self {
            Self::Read(id) => list.mark_read(id),
            Self::ReadAll => list.mark_all_read(),
            Self::Delete(id) => list.remove(id),
            Self::DeleteAll => list.clear(),
        }
    }
}

async fn run(action: BellAction) -> Result<(), ServerFnError> {
    match action {
        BellAction::Read(id) => mark_notification_read(id).await,
        BellAction::ReadAll => mark_all_notifications_read().await,
        BellAction::Delete(id) => delete_notification(id).await,
        BellAction::DeleteAll => delete_all_notifications().await,
    }
}

/// Unread badge plus the notification panel of the signed-in account.
#[component]
pub fn NotificationBell() -> impl IntoView {
    let list = RwSignal::new(NotificationList::default());
    let open = RwSignal::new(false);

    let refetch = move || {
        spawn_local(async move {
            match notifications().await {
                Ok(loaded) => list.set(NotificationList::new(loaded.notifications)),
                Err(e) => leptos::logging::error!("notifications unavailable: {e}"),
            }
        });
    };
    Effect::new(move |_| refetch());

    let stream = realtime::listen(
        "/api/notifications/stream",
        "notifications",
        move |live: NotificationSnapshot| list.set(NotificationList::new(live.notifications)),
    );
    StoredValue::new_local(stream);

    // Patched locally before the call; a failed call is followed by a full
    // refetch instead of a rollback.
    let act = move |action: BellAction| {
        list.update(|l| action.patch(l));
        spawn_local(async move {
            if let Err(e) = run(action).await {
                leptos::logging::error!("notification action failed: {e}");
                refetch();
            }
        });
    };

    let item = move |n: Notification| {
        let id = n.id;
        let class = if n.is_read { "bell__item" } else { "bell__item bell__item--unread" };
        let badge = format!("badge badge--{}", n.status_label());
        view! {
            <li class=class on:click=move |_| act(BellAction::Read(id))>
                <span class=badge>{n.status_label()}</span>
                " " {n.title.clone()}
                <p>{n.message.clone()}</p>
                <button class="button button--ghost" on:click=move |ev| {
                    ev.stop_propagation();
                    act(BellAction::Delete(id));
                }>"Supprimer"</button>
            </li>
        }
    };

    view! {
        <div class="bell">
            <button class="button button--ghost" on:click=move |_| open.update(|o| *o = !*o)>
                "Notifications"
                <Show when=move || { list.with(|l| l.unread_count() > 0) }>
                    <span class="bell__count">{move || list.with(NotificationList::unread_count)}</span>
                </Show>
            </button>
            <Show when=move || open.get()>
                <div class="bell__panel">
                    <Show
                        when=move || !list.with(NotificationList::is_empty)
                        fallback=|| view! { <p>"Aucune notification"</p> }
                    >
                        <button class="button" on:click=move |_| act(BellAction::ReadAll)>
                            "Tout marquer comme lu"
                        </button>
                        " "
                        <button class="button button--ghost" on:click=move |_| act(BellAction::DeleteAll)>
                            "Tout supprimer"
                        </button>
                        <ul>
                            {move || list.get().items().iter().cloned().map(item).collect_view()}
                        </ul>
                    </Show>
                </div>
            </Show>
        </div>
    }
}
