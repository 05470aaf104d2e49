//! Toast notifications: request type, publish/subscribe bus, viewport queue.
//!
//! Anything may publish a [`ToastRequest`], either on the [`ToastBus`]
//! directly or by dispatching the `ui:toast` custom event. The
//! [`ToastViewport`] is the bus subscriber: it de-duplicates, caps and
//! auto-dismisses toasts and renders them into the `data-toast-viewport`
//! element.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::dom::node::{NodeData, NodeId};
use crate::dom::tree::Dom;
use crate::event::dom_event::{DomEvent, EventKind};
use crate::timer::{TimerAction, TimerId};
use crate::widget::attrs::{DATA_STATE, STATE_OPEN};
use crate::widget::traits::{Context, Controller};

pub const DATA_TOAST_VIEWPORT: &str = "data-toast-viewport";
pub const DATA_TOAST_ITEM: &str = "data-toast-item";
pub const DATA_TOAST_ACTION: &str = "data-toast-action";
pub const DATA_TOAST_CLOSE: &str = "data-toast-close";
pub const DATA_VARIANT: &str = "data-variant";

// ---------------------------------------------------------------------------
// ToastVariant / ToastRequest
// ---------------------------------------------------------------------------

/// Visual flavor of a toast. Part of the de-duplication key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToastVariant {
    #[default]
    Default,
    Success,
    Error,
    Warning,
    Info,
}

impl ToastVariant {
    /// Parse a variant name; unknown names map to `Default`.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "success" => ToastVariant::Success,
            "error" | "destructive" => ToastVariant::Error,
            "warning" => ToastVariant::Warning,
            "info" => ToastVariant::Info,
            _ => ToastVariant::Default,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ToastVariant::Default => "default",
            ToastVariant::Success => "success",
            ToastVariant::Error => "error",
            ToastVariant::Warning => "warning",
            ToastVariant::Info => "info",
        }
    }
}

/// Callback run when a toast's action element is activated.
pub type ToastCallback = Arc<dyn Fn() + Send + Sync>;

/// A notification to publish.
#[derive(Clone)]
pub struct ToastRequest {
    pub title: String,
    pub description: Option<String>,
    pub variant: ToastVariant,
    /// Auto-dismiss delay; `None` uses the configured default.
    pub duration: Option<Duration>,
    pub action_label: Option<String>,
    pub on_action: Option<ToastCallback>,
}

impl ToastRequest {
    /// A default-variant toast with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            variant: ToastVariant::Default,
            duration: None,
            action_label: None,
            on_action: None,
        }
    }

    /// Set the description (builder).
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the variant (builder).
    pub fn with_variant(mut self, variant: ToastVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Set the auto-dismiss delay (builder).
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Attach an action element with `label` that runs `callback` (builder).
    pub fn with_action(mut self, label: impl Into<String>, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.action_label = Some(label.into());
        self.on_action = Some(Arc::new(callback));
        self
    }

    /// De-duplication key: variant, title and description.
    pub fn dedup_key(&self) -> String {
        format!(
            "{}\u{1f}{}\u{1f}{}",
            self.variant.as_str(),
            self.title,
            self.description.as_deref().unwrap_or("")
        )
    }
}

impl fmt::Debug for ToastRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastRequest")
            .field("title", &self.title)
            .field("description", &self.description)
            .field("variant", &self.variant)
            .field("duration", &self.duration)
            .field("action_label", &self.action_label)
            .field("on_action", &self.on_action.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ToastBus
// ---------------------------------------------------------------------------

/// Handle returned by [`ToastBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Publish/subscribe channel for toast requests.
///
/// Each subscriber has its own inbox; a publish is delivered to all of them.
#[derive(Debug, Default)]
pub struct ToastBus {
    next_id: u64,
    subscribers: Vec<(SubscriberId, VecDeque<ToastRequest>)>,
}

impl ToastBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber.
    pub fn subscribe(&mut self) -> SubscriberId {
        self.next_id += 1;
        let id = SubscriberId(self.next_id);
        self.subscribers.push((id, VecDeque::new()));
        id
    }

    /// Remove a subscriber and drop its undelivered requests.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(s, _)| *s != id);
        self.subscribers.len() != before
    }

    /// Deliver `request` to every subscriber. Returns the number reached.
    pub fn publish(&mut self, request: ToastRequest) -> usize {
        if self.subscribers.is_empty() {
            trace!(title = %request.title, "toast published with no subscribers");
        }
        for (_, inbox) in &mut self.subscribers {
            inbox.push_back(request.clone());
        }
        self.subscribers.len()
    }

    /// Take everything delivered to `id` so far, oldest first.
    pub fn drain(&mut self, id: SubscriberId) -> Vec<ToastRequest> {
        self.subscribers
            .iter_mut()
            .find(|(s, _)| *s == id)
            .map(|(_, inbox)| inbox.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

// ---------------------------------------------------------------------------
// Toast
// ---------------------------------------------------------------------------

/// A queued toast.
#[derive(Debug, Clone)]
pub struct Toast {
    /// Generated id, `toast-<n>`.
    pub id: String,
    pub request: ToastRequest,
    /// Virtual time of the last (re)publish.
    pub created_at: Duration,
    timer: Option<TimerId>,
}

impl Toast {
    pub fn title(&self) -> &str {
        &self.request.title
    }

    /// Pending auto-dismiss timer.
    pub fn timer(&self) -> Option<TimerId> {
        self.timer
    }
}

// ---------------------------------------------------------------------------
// ToastViewport
// ---------------------------------------------------------------------------

/// The toast queue, newest first.
#[derive(Debug, Default)]
pub struct ToastViewport {
    subscription: Option<SubscriberId>,
    toasts: Vec<Toast>,
    next_id: u64,
}

impl ToastViewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queued toasts, newest first.
    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Add or refresh a toast. Returns its id.
    pub fn receive(&mut self, cx: &mut Context<'_>, request: ToastRequest) -> String {
        let key = request.dedup_key();
        let duration = request.duration.unwrap_or(cx.config.toast_duration);

        let mut toast = match self.toasts.iter().position(|t| t.request.dedup_key() == key) {
            Some(idx) => {
                let mut existing = self.toasts.remove(idx);
                if let Some(timer) = existing.timer.take() {
                    cx.timers.cancel(timer);
                }
                debug!(id = %existing.id, "toast refreshed");
                existing.request = request;
                existing
            }
            None => {
                self.next_id += 1;
                let id = format!("toast-{}", self.next_id);
                debug!(id = %id, title = %request.title, "toast added");
                Toast {
                    id,
                    request,
                    created_at: Duration::ZERO,
                    timer: None,
                }
            }
        };
        toast.created_at = cx.timers.now();
        toast.timer = Some(cx.timers.schedule(duration, TimerAction::ToastExpire(toast.id.clone())));
        let id = toast.id.clone();
        self.toasts.insert(0, toast);

        while self.toasts.len() > cx.config.toast_limit {
            if let Some(evicted) = self.toasts.pop() {
                if let Some(timer) = evicted.timer {
                    cx.timers.cancel(timer);
                }
                debug!(id = %evicted.id, "toast evicted");
            }
        }
        id
    }

    /// Remove a toast and cancel its timer. Returns `false` for unknown ids.
    pub fn dismiss(&mut self, cx: &mut Context<'_>, id: &str) -> bool {
        let Some(idx) = self.toasts.iter().position(|t| t.id == id) else {
            trace!(id, "dismiss of unknown toast");
            return false;
        };
        let toast = self.toasts.remove(idx);
        if let Some(timer) = toast.timer {
            cx.timers.cancel(timer);
        }
        debug!(id, "toast dismissed");
        true
    }

    /// Run the toast's action callback, then dismiss it.
    pub fn invoke_action(&mut self, cx: &mut Context<'_>, id: &str) -> bool {
        let callback = self
            .toasts
            .iter()
            .find(|t| t.id == id)
            .and_then(|t| t.request.on_action.clone());
        if let Some(callback) = callback {
            callback();
        }
        self.dismiss(cx, id)
    }

    /// Render the queue into the `data-toast-viewport` element, if present.
    pub fn render(&self, cx: &mut Context<'_>) {
        let dom = &mut cx.doc.dom;
        let Some(viewport) = dom.query_attr(DATA_TOAST_VIEWPORT).into_iter().next() else {
            return;
        };
        dom.clear_children(viewport);
        for toast in &self.toasts {
            render_toast(dom, viewport, toast);
        }
    }

    fn drain_inbox(&mut self, cx: &mut Context<'_>) -> bool {
        let Some(subscription) = self.subscription else {
            return false;
        };
        let requests = cx.toasts.drain(subscription);
        let changed = !requests.is_empty();
        for request in requests {
            self.receive(cx, request);
        }
        changed
    }
}

fn render_toast(dom: &mut Dom, viewport: NodeId, toast: &Toast) {
    let item = dom.insert_child(
        viewport,
        NodeData::new("li")
            .with_attr(DATA_TOAST_ITEM, toast.id.as_str())
            .with_attr(DATA_VARIANT, toast.request.variant.as_str())
            .with_attr(DATA_STATE, STATE_OPEN)
            .with_attr("role", "status"),
    );
    let title = dom.insert_child(item, NodeData::new("div").with_attr("data-toast-title", ""));
    dom.set_text(title, toast.request.title.as_str());
    if let Some(description) = &toast.request.description {
        let node = dom.insert_child(item, NodeData::new("div").with_attr("data-toast-description", ""));
        dom.set_text(node, description.as_str());
    }
    if let Some(label) = &toast.request.action_label {
        let action = dom.insert_child(
            item,
            NodeData::new("button")
                .focusable(true)
                .with_attr(DATA_TOAST_ACTION, toast.id.as_str()),
        );
        dom.set_text(action, label.as_str());
    }
    let close = dom.insert_child(
        item,
        NodeData::new("button")
            .focusable(true)
            .with_attr(DATA_TOAST_CLOSE, toast.id.as_str())
            .with_attr("aria-label", "Close"),
    );
    dom.set_text(close, "×");
}

impl Controller for ToastViewport {
    fn name(&self) -> &'static str {
        "toast"
    }

    fn hydrate(&mut self, cx: &mut Context<'_>) {
        if self.subscription.is_none() {
            self.subscription = Some(cx.toasts.subscribe());
        }
        self.render(cx);
    }

    fn handle(&mut self, cx: &mut Context<'_>, event: &mut DomEvent) {
        if !matches!(event.kind, EventKind::Click) {
            return;
        }
        let Some(target) = event.target else {
            return;
        };
        let action = cx.doc.dom.closest_attr(target, DATA_TOAST_ACTION);
        let close = cx.doc.dom.closest_attr(target, DATA_TOAST_CLOSE);
        let changed = match (action, close) {
            (Some((_, id)), _) => self.invoke_action(cx, &id),
            (None, Some((_, id))) => self.dismiss(cx, &id),
            (None, None) => false,
        };
        if changed {
            self.render(cx);
        }
    }

    fn on_timer(&mut self, cx: &mut Context<'_>, action: &TimerAction) -> bool {
        let TimerAction::ToastExpire(id) = action else {
            return false;
        };
        if let Some(idx) = self.toasts.iter().position(|t| &t.id == id) {
            self.toasts.remove(idx);
            debug!(id = %id, "toast expired");
            self.render(cx);
        }
        true
    }

    fn flush(&mut self, cx: &mut Context<'_>) {
        if self.drain_inbox(cx) {
            self.render(cx);
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::document::Document;
    use crate::geometry::Size;
    use crate::markup::parse;
    use crate::widget::fixture::Fixture;

    fn fixture() -> Fixture {
        let dom = parse(r#"<body><ol data-toast-viewport></ol></body>"#).unwrap();
        Fixture::new(Document::new(dom, Size::new(800, 600)))
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    // ── Bus ──────────────────────────────────────────────────────────

    #[test]
    fn bus_delivers_to_every_subscriber() {
        let mut bus = ToastBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();
        assert_eq!(bus.publish(ToastRequest::new("Saved")), 2);
        assert_eq!(bus.drain(a).len(), 1);
        assert_eq!(bus.drain(a).len(), 0);
        assert_eq!(bus.drain(b)[0].title, "Saved");
        assert!(bus.unsubscribe(a));
        assert!(!bus.unsubscribe(a));
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn publish_without_subscribers() {
        let mut bus = ToastBus::new();
        assert_eq!(bus.publish(ToastRequest::new("lost")), 0);
    }

    // ── Queue ────────────────────────────────────────────────────────

    #[test]
    fn duplicate_reuses_id_and_restarts_timer() {
        let mut fx = fixture();
        let mut vp = ToastViewport::new();
        let request = ToastRequest::new("Saved").with_description("Course updated");
        let first = vp.receive(&mut fx.cx(), request.clone());
        let first_timer = vp.toasts()[0].timer().unwrap();

        fx.timers.advance_to(ms(1000));
        let second = vp.receive(&mut fx.cx(), request);
        assert_eq!(first, second);
        assert_eq!(vp.len(), 1);
        assert!(!fx.timers.is_pending(first_timer));
        assert_eq!(fx.timers.next_deadline(), Some(ms(4500)));
        assert_eq!(vp.toasts()[0].created_at, ms(1000));
    }

    #[test]
    fn variant_is_part_of_the_key() {
        let mut fx = fixture();
        let mut vp = ToastViewport::new();
        vp.receive(&mut fx.cx(), ToastRequest::new("Saved"));
        vp.receive(&mut fx.cx(), ToastRequest::new("Saved").with_variant(ToastVariant::Error));
        assert_eq!(vp.len(), 2);
    }

    #[test]
    fn duplicate_moves_to_front() {
        let mut fx = fixture();
        let mut vp = ToastViewport::new();
        vp.receive(&mut fx.cx(), ToastRequest::new("A"));
        vp.receive(&mut fx.cx(), ToastRequest::new("B"));
        vp.receive(&mut fx.cx(), ToastRequest::new("A"));
        let titles: Vec<_> = vp.toasts().iter().map(Toast::title).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn sixth_toast_evicts_oldest() {
        let mut fx = fixture();
        let mut vp = ToastViewport::new();
        for n in 1..=6 {
            vp.receive(&mut fx.cx(), ToastRequest::new(format!("T{n}")));
        }
        assert_eq!(vp.len(), 5);
        assert!(vp.toasts().iter().all(|t| t.title() != "T1"));
        assert_eq!(vp.toasts()[0].title(), "T6");
        assert_eq!(fx.timers.len(), 5);
    }

    #[test]
    fn dismiss_cancels_timer() {
        let mut fx = fixture();
        let mut vp = ToastViewport::new();
        let id = vp.receive(&mut fx.cx(), ToastRequest::new("Bye"));
        assert!(vp.dismiss(&mut fx.cx(), &id));
        assert!(vp.is_empty());
        assert!(fx.timers.is_empty());
        assert!(!vp.dismiss(&mut fx.cx(), &id));
    }

    #[test]
    fn action_runs_callback_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut fx = fixture();
        let mut vp = ToastViewport::new();
        let id = vp.receive(
            &mut fx.cx(),
            ToastRequest::new("Deleted").with_action("Undo", move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert!(vp.invoke_action(&mut fx.cx(), &id));
        assert!(!vp.invoke_action(&mut fx.cx(), &id));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn custom_duration() {
        let mut fx = fixture();
        let mut vp = ToastViewport::new();
        vp.receive(&mut fx.cx(), ToastRequest::new("Quick").with_duration(ms(500)));
        assert_eq!(fx.timers.next_deadline(), Some(ms(500)));
    }

    // ── Rendering ────────────────────────────────────────────────────

    #[test]
    fn render_projects_queue() {
        let mut fx = fixture();
        let mut vp = ToastViewport::new();
        vp.receive(&mut fx.cx(), ToastRequest::new("Saved").with_variant(ToastVariant::Success));
        vp.render(&mut fx.cx());
        let dom = &fx.doc.dom;
        let items = dom.query_attr(DATA_TOAST_ITEM);
        assert_eq!(items.len(), 1);
        assert_eq!(dom.attr(items[0], DATA_VARIANT), Some("success"));
        assert_eq!(dom.query_attr(DATA_TOAST_CLOSE).len(), 1);
        assert!(dom.query_attr(DATA_TOAST_ACTION).is_empty());
    }

    #[test]
    fn request_debug_hides_callback() {
        let request = ToastRequest::new("x").with_action("Undo", || {});
        let text = format!("{request:?}");
        assert!(text.contains("on_action: true"));
    }

    #[test]
    fn variant_parsing() {
        assert_eq!(ToastVariant::parse("destructive"), ToastVariant::Error);
        assert_eq!(ToastVariant::parse("nope"), ToastVariant::Default);
    }
}
