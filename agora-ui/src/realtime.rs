//! Server-sent event subscriptions. Only the hydrated client listens; the
//! server render shows whatever the initial fetch returned.

use serde::de::DeserializeOwned;

/// Open stream; closing happens on drop.
pub struct LiveStream {
    #[cfg(feature = "hydrate")]
    source: web_sys::EventSource,
    #[cfg(feature = "hydrate")]
    _listener: wasm_bindgen::closure::Closure<dyn FnMut(web_sys::MessageEvent)>,
}

#[cfg(feature = "hydrate")]
pub fn listen<T, F>(url: &str, event: &str, mut on_message: F) -> Option<LiveStream>
where
    T: DeserializeOwned + 'static,
    F: FnMut(T) + 'static,
{
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    let source = web_sys::EventSource::new(url).ok()?;
    let listener = Closure::<dyn FnMut(web_sys::MessageEvent)>::new(move |msg: web_sys::MessageEvent| {
        let Some(data) = msg.data().as_string() else {
            return;
        };
        match serde_json::from_str::<T>(&data) {
            Ok(value) => on_message(value),
            Err(e) => leptos::logging::warn!("dropping malformed realtime payload: {e}"),
        }
    });
    source
        .add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
        .ok()?;
    Some(LiveStream {
        source,
        _listener: listener,
    })
}

#[cfg(not(feature = "hydrate"))]
pub fn listen<T, F>(_url: &str, _event: &str, _on_message: F) -> Option<LiveStream>
where
    T: DeserializeOwned + 'static,
    F: FnMut(T) + 'static,
{
    None
}

#[cfg(feature = "hydrate")]
impl Drop for LiveStream {
    fn drop(&mut self) {
        self.source.close();
    }
}
