//! Runtime: owns the document and the controllers, routes input to them.
//!
//! [`Runtime`] is the single entry point a host drives. Input becomes
//! [`DomEvent`]s on an internal queue; each event runs a capture pass and a
//! bubble pass over the attached controllers, then the runtime's default
//! action (Tab navigation, Enter/Space activation, toast publication). Focus
//! moves made while handling an event are replayed as `FocusOut`/`FocusIn`
//! events before the queue is considered drained.

use std::time::Duration;

use tracing::{debug, trace};

use crate::config::RuntimeConfig;
use crate::document::Document;
use crate::dom::node::NodeId;
use crate::event::dom_event::{CustomEvent, DomEvent, EventKind, Phase};
use crate::event::handler::EventDispatcher;
use crate::event::input::{InputEvent, Key, KeyEvent, MouseAction, MouseBtn};
use crate::focus::FocusChain;
use crate::geometry::Size;
use crate::init::InitRegistry;
use crate::markup::{self, MarkupError};
use crate::timer::TimerQueue;
use crate::widget::attrs::is_disabled;
use crate::widget::traits::{Context, Controller};
use crate::widgets::modal::{ModalController, ModalFamily};
use crate::widgets::toast::{Toast, ToastBus, ToastRequest, ToastViewport};
use crate::widgets::{DropdownController, PopoverController, SelectController, TabsController, TooltipController};

/// Elements whose Enter/Space keys belong to text entry, not activation.
const TEXT_ENTRY_TAGS: &[&str] = &["input", "textarea", "select"];

// ---------------------------------------------------------------------------
// Controllers
// ---------------------------------------------------------------------------

/// The built-in controllers, in listener order.
#[derive(Debug, Default)]
pub struct Controllers {
    pub tooltip: TooltipController,
    pub dropdown: DropdownController,
    pub select: SelectController,
    pub popover: PopoverController,
    pub tabs: TabsController,
    pub modal: ModalController,
    pub toast: ToastViewport,
}

impl Controllers {
    /// Listener order: tooltips see Escape first, disclosures may stop it
    /// before the modal does.
    fn all(&mut self) -> [&mut dyn Controller; 7] {
        [
            &mut self.tooltip,
            &mut self.dropdown,
            &mut self.select,
            &mut self.popover,
            &mut self.tabs,
            &mut self.modal,
            &mut self.toast,
        ]
    }
}

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

/// A document plus the controllers that bring its markup to life.
#[derive(Debug)]
pub struct Runtime {
    /// The document (DOM, focus, viewport, scroll lock).
    pub doc: Document,
    /// Virtual clock and pending delays.
    pub timers: TimerQueue,
    /// Toast publication bus.
    pub toasts: ToastBus,
    config: RuntimeConfig,
    registry: InitRegistry,
    controllers: Controllers,
    dispatcher: EventDispatcher,
}

impl Runtime {
    /// Wrap a document. Call [`setup`](Self::setup) before dispatching input.
    pub fn new(doc: Document, config: RuntimeConfig) -> Self {
        Self {
            doc,
            timers: TimerQueue::new(),
            toasts: ToastBus::new(),
            config,
            registry: InitRegistry::new(),
            controllers: Controllers::default(),
            dispatcher: EventDispatcher::new(),
        }
    }

    /// Parse `source`, wrap it with the default config and run setup.
    pub fn from_markup(source: &str, viewport: Size) -> Result<Self, MarkupError> {
        Self::from_markup_with(source, viewport, RuntimeConfig::default())
    }

    /// Like [`from_markup`](Self::from_markup) with an explicit config.
    pub fn from_markup_with(source: &str, viewport: Size, config: RuntimeConfig) -> Result<Self, MarkupError> {
        let dom = markup::parse(source)?;
        let mut runtime = Self::new(Document::new(dom, viewport), config);
        runtime.setup();
        Ok(runtime)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn controllers(&self) -> &Controllers {
        &self.controllers
    }

    /// Whether the named controller has its listeners attached.
    pub fn is_attached(&self, name: &str) -> bool {
        self.registry.is_attached(name)
    }

    /// Number of attached controllers.
    pub fn attached_count(&self) -> usize {
        self.registry.len()
    }

    /// Attach every controller (once) and project markup-declared state.
    ///
    /// Safe to call again after the markup changes: listeners stay attached
    /// exactly once, hydration runs every time.
    pub fn setup(&mut self) {
        let (mut cx, controllers, registry) = split(self);
        for controller in controllers.all() {
            if registry.claim(controller.name()) {
                debug!(controller = controller.name(), "listeners attached");
            }
            controller.hydrate(&mut cx);
        }
        self.settle();
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Route raw input from the host.
    pub fn handle_input(&mut self, input: InputEvent) {
        match input {
            InputEvent::Key(key) => self.press(key),
            InputEvent::Mouse(mouse) => {
                let (x, y) = (i32::from(mouse.x), i32::from(mouse.y));
                match mouse.kind {
                    MouseAction::Down(MouseBtn::Left) => {
                        match self.doc.hit_test(x, y).or_else(|| self.doc.dom.root()) {
                            Some(target) => self.click(target),
                            None => trace!(x, y, "click on empty document"),
                        }
                    }
                    MouseAction::Moved | MouseAction::Drag(_) => self.hover(self.doc.hit_test(x, y)),
                    MouseAction::ScrollUp | MouseAction::ScrollDown => {
                        self.dispatcher.push(DomEvent::window(EventKind::Scroll));
                        self.process();
                    }
                    MouseAction::Down(_) | MouseAction::Up(_) => {}
                }
            }
            InputEvent::Resize { width, height } => self.resize(i32::from(width), i32::from(height)),
        }
    }

    /// Press `key` at the focused element.
    pub fn press(&mut self, key: KeyEvent) {
        let target = self.doc.focused().or_else(|| self.doc.dom.root());
        self.dispatcher.push(DomEvent::key_down(target, key));
        self.process();
    }

    /// Pointer activation of `node`: focus moves first, then the click.
    pub fn click(&mut self, node: NodeId) {
        let dom = &self.doc.dom;
        let focus_target = dom.closest(node, |d| d.focusable && !is_disabled(d));
        match focus_target {
            Some(target) => {
                self.doc.focus(target);
            }
            None => self.doc.blur(),
        }
        self.sync_focus();
        self.dispatcher.push(DomEvent::click(node));
        self.process();
    }

    /// Programmatic focus. Returns `false` if `node` no longer exists.
    pub fn focus(&mut self, node: NodeId) -> bool {
        let focused = self.doc.focus(node);
        self.settle();
        focused
    }

    /// Move the pointer onto `node` (or off the document).
    pub fn hover(&mut self, node: Option<NodeId>) {
        let from = self.doc.hovered();
        if from == node {
            return;
        }
        let (left, entered) = EventDispatcher::hover_transition(&self.doc.dom, from, node);
        self.doc.set_hovered(node);
        for n in left {
            self.dispatcher.push(DomEvent::new(EventKind::PointerLeave, Some(n)));
        }
        for n in entered {
            self.dispatcher.push(DomEvent::new(EventKind::PointerEnter, Some(n)));
        }
        self.process();
    }

    /// Resize the viewport and reflow open panels.
    pub fn resize(&mut self, width: i32, height: i32) {
        self.doc.resize(width, height);
        self.dispatcher.push(DomEvent::window(EventKind::Resize));
        self.process();
    }

    /// The page scrolled; reflow open panels.
    pub fn scroll(&mut self) {
        self.dispatcher.push(DomEvent::window(EventKind::Scroll));
        self.process();
    }

    /// Dispatch an arbitrary event and drain the queue.
    pub fn dispatch(&mut self, event: DomEvent) {
        self.dispatcher.push(event);
        self.process();
    }

    // ── Time ─────────────────────────────────────────────────────────

    /// Advance the virtual clock by `elapsed`, firing due timers in order.
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.timers.now() + elapsed;
        while let Some((_, action)) = self.timers.pop_due(until) {
            trace!(?action, "timer fired");
            let (mut cx, controllers, registry) = split(self);
            for controller in controllers.all() {
                if registry.is_attached(controller.name()) && controller.on_timer(&mut cx, &action) {
                    break;
                }
            }
            self.settle();
        }
        self.timers.advance_to(until);
    }

    /// Time until the next pending timer, if any.
    pub fn next_timer_in(&self) -> Option<Duration> {
        self.timers
            .next_deadline()
            .map(|deadline| deadline.saturating_sub(self.timers.now()))
    }

    // ── Programmatic API ─────────────────────────────────────────────

    pub fn open_modal(&mut self, family: ModalFamily, group: &str) -> bool {
        let (mut cx, controllers, _) = split(self);
        let changed = controllers.modal.open(&mut cx, family, group);
        self.settle();
        changed
    }

    pub fn close_modal(&mut self, family: ModalFamily, group: &str) -> bool {
        let (mut cx, controllers, _) = split(self);
        let changed = controllers.modal.close(&mut cx, family, group);
        self.settle();
        changed
    }

    pub fn open_dropdown(&mut self, group: &str) -> bool {
        let (mut cx, controllers, _) = split(self);
        let changed = controllers.dropdown.open(&mut cx, group);
        self.settle();
        changed
    }

    pub fn close_dropdown(&mut self, group: &str) -> bool {
        let (mut cx, controllers, _) = split(self);
        let changed = controllers.dropdown.close(&mut cx, group);
        self.settle();
        changed
    }

    pub fn toggle_dropdown(&mut self, group: &str) -> bool {
        let (mut cx, controllers, _) = split(self);
        let changed = controllers.dropdown.toggle(&mut cx, group);
        self.settle();
        changed
    }

    pub fn open_select(&mut self, group: &str) -> bool {
        let (mut cx, controllers, _) = split(self);
        let changed = controllers.select.open(&mut cx, group);
        self.settle();
        changed
    }

    pub fn close_select(&mut self, group: &str) -> bool {
        let (mut cx, controllers, _) = split(self);
        let changed = controllers.select.close(&mut cx, group);
        self.settle();
        changed
    }

    pub fn toggle_select(&mut self, group: &str) -> bool {
        let (mut cx, controllers, _) = split(self);
        let changed = controllers.select.toggle(&mut cx, group);
        self.settle();
        changed
    }

    /// Choose a select item by value without opening the panel.
    pub fn select_value(&mut self, group: &str, value: &str) -> bool {
        let (mut cx, controllers, _) = split(self);
        let changed = controllers.select.select_value(&mut cx, group, value);
        self.settle();
        changed
    }

    pub fn open_popover(&mut self, group: &str) -> bool {
        let (mut cx, controllers, _) = split(self);
        let changed = controllers.popover.open(&mut cx, group);
        self.settle();
        changed
    }

    pub fn close_popover(&mut self, group: &str) -> bool {
        let (mut cx, controllers, _) = split(self);
        let changed = controllers.popover.close(&mut cx, group);
        self.settle();
        changed
    }

    pub fn toggle_popover(&mut self, group: &str) -> bool {
        let (mut cx, controllers, _) = split(self);
        let changed = controllers.popover.toggle(&mut cx, group);
        self.settle();
        changed
    }

    pub fn select_tab(&mut self, group: &str, value: &str) -> bool {
        let (mut cx, controllers, _) = split(self);
        let changed = controllers.tabs.select(&mut cx, group, value);
        self.settle();
        changed
    }

    /// Publish a toast through the `ui:toast` event.
    pub fn publish_toast(&mut self, request: ToastRequest) {
        self.dispatch(DomEvent::window(EventKind::Custom(CustomEvent::Toast(request))));
    }

    /// Dismiss a toast by id. Returns `false` for unknown ids.
    pub fn dismiss_toast(&mut self, id: &str) -> bool {
        let (mut cx, controllers, _) = split(self);
        let removed = controllers.toast.dismiss(&mut cx, id);
        if removed {
            controllers.toast.render(&mut cx);
        }
        self.settle();
        removed
    }

    /// Queued toasts, newest first.
    pub fn toasts(&self) -> &[Toast] {
        self.controllers.toast.toasts()
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Replay focus moves and drain the event queue.
    fn settle(&mut self) {
        self.sync_focus();
        self.process();
    }

    /// Dispatch queued events until none remain, then flush controllers.
    fn process(&mut self) {
        loop {
            while let Some(event) = self.dispatcher.pop() {
                self.run(event);
                self.sync_focus();
            }
            let (mut cx, controllers, registry) = split(self);
            for controller in controllers.all() {
                if registry.is_attached(controller.name()) {
                    controller.flush(&mut cx);
                }
            }
            self.sync_focus();
            if self.dispatcher.is_empty() {
                break;
            }
        }
    }

    fn run(&mut self, mut event: DomEvent) {
        trace!(kind = ?event.kind, "dispatch");
        let (mut cx, controllers, registry) = split(self);
        let mut listeners = controllers.all();

        event.phase = Phase::Capture;
        for controller in listeners.iter_mut() {
            if event.is_propagation_stopped() {
                break;
            }
            if registry.is_attached(controller.name()) {
                controller.capture(&mut cx, &mut event);
            }
        }

        event.phase = Phase::Bubble;
        for controller in listeners.iter_mut() {
            if event.is_propagation_stopped() {
                break;
            }
            if registry.is_attached(controller.name()) {
                controller.handle(&mut cx, &mut event);
            }
        }

        if !event.is_default_prevented() {
            self.default_action(event);
        }
    }

    fn default_action(&mut self, event: DomEvent) {
        match event.kind {
            EventKind::KeyDown(key) if key.is_tab() => {
                let mut chain = FocusChain::document(&self.doc.dom, self.doc.focused());
                let next = if key.is_backward_tab() {
                    chain.focus_previous()
                } else {
                    chain.focus_next()
                };
                if let Some(next) = next {
                    self.doc.focus(next);
                }
            }
            EventKind::KeyDown(key) => {
                if let Some(target) = event.target.filter(|&t| self.activates(t, &key)) {
                    self.dispatcher.push(DomEvent::click(target));
                }
            }
            EventKind::Custom(CustomEvent::Toast(request)) => {
                let delivered = self.toasts.publish(request);
                trace!(delivered, "toast published");
            }
            _ => {}
        }
    }

    /// Whether `key` at `target` synthesizes a click.
    fn activates(&self, target: NodeId, key: &KeyEvent) -> bool {
        if self.doc.focused() != Some(target) {
            return false;
        }
        let Some(data) = self.doc.dom.get(target) else {
            return false;
        };
        if is_disabled(data) || TEXT_ENTRY_TAGS.contains(&data.tag.as_str()) {
            return false;
        }
        match data.tag.as_str() {
            "a" => key.code == Key::Enter,
            _ => key.is_activation(),
        }
    }

    /// Queue `FocusOut`/`FocusIn` for focus moves since the last call.
    fn sync_focus(&mut self) {
        for change in self.doc.take_focus_changes() {
            if let Some(from) = change.from.filter(|&n| self.doc.dom.contains(n)) {
                self.dispatcher.push(DomEvent::new(EventKind::FocusOut, Some(from)));
            }
            if let Some(to) = change.to {
                self.dispatcher.push(DomEvent::new(EventKind::FocusIn, Some(to)));
            }
        }
    }
}

/// Borrow the controller context alongside the controllers and the registry.
fn split(runtime: &mut Runtime) -> (Context<'_>, &mut Controllers, &mut InitRegistry) {
    let cx = Context {
        doc: &mut runtime.doc,
        timers: &mut runtime.timers,
        toasts: &mut runtime.toasts,
        config: &runtime.config,
    };
    (cx, &mut runtime.controllers, &mut runtime.registry)
}

// ===========================================================================
// Tests
// ===========================================================================
