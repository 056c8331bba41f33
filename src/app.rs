use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use std::rc::Weak;

use dioxus::prelude::*;
use dioxus_router::{Link, Routable, Router};
#[cfg(target_arch = "wasm32")]
use gloo_timers::future::TimeoutFuture;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

use crate::clock;
use crate::config::{use_runtime_config, RuntimeConfig};
use crate::layout::{BlockRole, Layout, LineKind};
use crate::page::{Page, PageSettings};
use crate::particles::{particle_field, rain_drops, random_unit, AMBIENT, PARTICLE_COUNT, RAIN_DROP_COUNT};
use crate::reveal::TextPhase;
use crate::surface::{BlockId, Decoration, Surface, TextId};

const MAIN_CSS: Asset = asset!("/assets/main.css");

type SharedPage = Rc<RefCell<Page<SignalSurface>>>;

#[component]
pub fn App() -> Element {
    let config_resource = use_runtime_config();
    let Some(config) = config_resource() else {
        return rsx! {
            document::Title { "Good day" }
            document::Link { rel: "stylesheet", href: MAIN_CSS }
            div { class: "scene loading",
                p { "Waking up the sky..." }
            }
        };
    };

    use_context_provider(|| config);

    rsx! {
        document::Title { "Good day" }
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        document::Meta { name: "theme-color", content: "#87CEEB" }
        Router::<Route> {}
    }
}

#[derive(Clone, PartialEq, Routable)]
pub enum Route {
    #[route("/")]
    Home {},
    #[route("/:..route")]
    NotFound { route: Vec<String> },
}

#[component]
fn Home() -> Element {
    rsx! { GreetingCard {} }
}

#[component]
fn NotFound(route: Vec<String>) -> Element {
    let path = route.join("/");
    rsx! {
        div { class: "scene lost",
            p { "Nothing lives at /{path}." }
            Link { to: Route::Home {}, "Back to the sky" }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextView {
    pub content: String,
    pub phase: TextPhase,
}

/// What the page logic has drawn so far. Rendered by [`GreetingCard`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageView {
    pub style_vars: BTreeMap<&'static str, String>,
    pub decorations: BTreeMap<Decoration, bool>,
    pub blocks: Vec<bool>,
    pub texts: Vec<TextView>,
}

impl PageView {
    fn new(layout: &Layout) -> Self {
        Self {
            blocks: vec![false; layout.blocks.len()],
            texts: vec![
                TextView {
                    content: String::new(),
                    phase: TextPhase::Hidden,
                };
                layout.text_count()
            ],
            ..Self::default()
        }
    }

    fn root_style(&self) -> String {
        self.style_vars
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn shows(&self, decoration: Decoration) -> bool {
        self.decorations.get(&decoration).copied().unwrap_or(false)
    }

    fn block_visible(&self, block: BlockId) -> bool {
        self.blocks.get(block.0).copied().unwrap_or(false)
    }

    fn text(&self, text: TextId) -> TextView {
        self.texts.get(text.0).cloned().unwrap_or(TextView {
            content: String::new(),
            phase: TextPhase::Hidden,
        })
    }
}

fn card_dom_id(block: BlockId) -> String {
    format!("card-{}", block.0)
}

#[cfg(target_arch = "wasm32")]
fn parse_card_dom_id(id: &str) -> Option<BlockId> {
    id.strip_prefix("card-")?.parse().ok().map(BlockId)
}

/// [`Surface`] over a Dioxus signal, plus the browser's viewport watcher.
pub struct SignalSurface {
    view: Signal<PageView>,
    #[cfg(target_arch = "wasm32")]
    watcher: Option<ViewportWatcher>,
}

impl SignalSurface {
    fn new(view: Signal<PageView>) -> Self {
        Self {
            view,
            #[cfg(target_arch = "wasm32")]
            watcher: None,
        }
    }
}

impl Surface for SignalSurface {
    fn set_style_var(&mut self, name: &'static str, value: &str) {
        if self.view.peek().style_vars.get(name).map(String::as_str) == Some(value) {
            return;
        }
        self.view.write().style_vars.insert(name, value.to_string());
    }

    fn set_decoration_visible(&mut self, decoration: Decoration, visible: bool) {
        if self.view.peek().decorations.get(&decoration) == Some(&visible) {
            return;
        }
        self.view.write().decorations.insert(decoration, visible);
    }

    fn set_block_visible(&mut self, block: BlockId, visible: bool) {
        if let Some(slot) = self.view.write().blocks.get_mut(block.0) {
            *slot = visible;
        }
    }

    fn has_text(&self, text: TextId) -> bool {
        text.0 < self.view.peek().texts.len()
    }

    fn set_text(&mut self, text: TextId, content: &str) {
        if let Some(slot) = self.view.write().texts.get_mut(text.0) {
            slot.content = content.to_string();
        }
    }

    fn set_text_phase(&mut self, text: TextId, phase: TextPhase) {
        if let Some(slot) = self.view.write().texts.get_mut(text.0) {
            slot.phase = phase;
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn block_in_viewport(&self, block: BlockId) -> bool {
        let Some(window) = web_sys::window() else {
            return true;
        };
        let Some(element) = window
            .document()
            .and_then(|document| document.get_element_by_id(&card_dom_id(block)))
        else {
            return false;
        };
        let height = window
            .inner_height()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0);
        let rect = element.get_bounding_client_rect();
        rect.top() < height && rect.bottom() > 0.0
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn block_in_viewport(&self, _block: BlockId) -> bool {
        true
    }

    #[cfg(target_arch = "wasm32")]
    fn observe(&mut self, block: BlockId) {
        if let Some(watcher) = &self.watcher {
            watcher.observe(block);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn observe(&mut self, _block: BlockId) {}

    #[cfg(target_arch = "wasm32")]
    fn unobserve(&mut self, block: BlockId) {
        if let Some(watcher) = &self.watcher {
            watcher.unobserve(block);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn unobserve(&mut self, _block: BlockId) {}
}

#[cfg(target_arch = "wasm32")]
struct ViewportWatcher {
    observer: web_sys::IntersectionObserver,
    _closure: wasm_bindgen::closure::Closure<dyn FnMut(js_sys::Array, web_sys::IntersectionObserver)>,
}

#[cfg(target_arch = "wasm32")]
impl ViewportWatcher {
    const THRESHOLD: f64 = 0.1;

    fn new(page: Weak<RefCell<Page<SignalSurface>>>) -> Option<Self> {
        use wasm_bindgen::closure::Closure;

        let closure = Closure::wrap(Box::new(
            move |entries: js_sys::Array, observer: web_sys::IntersectionObserver| {
                for entry in entries.iter() {
                    let entry: web_sys::IntersectionObserverEntry = entry.unchecked_into();
                    if !entry.is_intersecting() {
                        continue;
                    }
                    let target = entry.target();
                    observer.unobserve(&target);
                    let Some(block) = parse_card_dom_id(&target.id()) else {
                        continue;
                    };
                    let Some(page) = page.upgrade() else {
                        return;
                    };
                    if let Ok(mut page) = page.try_borrow_mut() {
                        tracing::debug!("greeting-card: block {} scrolled into view", block.0);
                        page.notify_visible(block, clock::now());
                    };
                }
            },
        )
            as Box<dyn FnMut(js_sys::Array, web_sys::IntersectionObserver)>);
        let options = web_sys::IntersectionObserverInit::new();
        options.set_threshold(&wasm_bindgen::JsValue::from_f64(Self::THRESHOLD));
        let observer = web_sys::IntersectionObserver::new_with_options(
            closure.as_ref().unchecked_ref(),
            &options,
        )
        .ok()?;
        tracing::debug!("greeting-card: viewport watcher attached");
        Some(Self {
            observer,
            _closure: closure,
        })
    }

    fn element(block: BlockId) -> Option<web_sys::Element> {
        web_sys::window()?
            .document()?
            .get_element_by_id(&card_dom_id(block))
    }

    fn observe(&self, block: BlockId) {
        if let Some(element) = Self::element(block) {
            self.observer.observe(&element);
        }
    }

    fn unobserve(&self, block: BlockId) {
        if let Some(element) = Self::element(block) {
            self.observer.unobserve(&element);
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for ViewportWatcher {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Wakes up when the next timer is due and lets the page catch up.
#[cfg(target_arch = "wasm32")]
fn spawn_pump(page: Weak<RefCell<Page<SignalSurface>>>) {
    spawn(async move {
        loop {
            let wait_ms = {
                let Some(page) = page.upgrade() else {
                    break;
                };
                let Ok(mut page) = page.try_borrow_mut() else {
                    TimeoutFuture::new(16).await;
                    continue;
                };
                if !page.is_running() {
                    break;
                }
                let now = clock::now();
                page.pump(now);
                page.next_due_ms()
                    .map(|due| due - now.timestamp_millis())
                    .unwrap_or(1_000)
            };
            TimeoutFuture::new(wait_ms.clamp(16, 1_000) as u32).await;
        }
        tracing::debug!("greeting-card: pump stopped");
    });
}

#[component]
fn GreetingCard() -> Element {
    let config = use_context::<RuntimeConfig>();
    let layout = use_hook(|| Layout::build(&config.name, clock::now(), config.card_effect()));
    let view = use_signal({
        let layout = layout.clone();
        move || PageView::new(&layout)
    });
    let page: SharedPage = use_hook(|| {
        let settings = PageSettings {
            countdown: config.countdown_settings(),
            theme_refresh_ms: config.theme_refresh_ms(),
            storm: config.storm,
        };
        Rc::new(RefCell::new(Page::new(
            SignalSurface::new(view),
            layout.clone(),
            settings,
        )))
    });
    let particles = use_hook(|| particle_field(PARTICLE_COUNT, AMBIENT, random_unit));
    let drops = use_hook(|| rain_drops(RAIN_DROP_COUNT, random_unit));
    let mut mounted = use_signal(|| false);

    use_effect({
        let page = page.clone();
        move || {
            if *mounted.peek() {
                return;
            }
            mounted.set(true);
            tracing::debug!("greeting-card: mount");
            #[cfg(target_arch = "wasm32")]
            {
                let watcher = ViewportWatcher::new(Rc::downgrade(&page));
                page.borrow_mut().surface_mut().watcher = watcher;
            }
            page.borrow_mut().start(clock::now());
            #[cfg(target_arch = "wasm32")]
            spawn_pump(Rc::downgrade(&page));
        }
    });

    use_drop({
        let page = page.clone();
        move || {
            if let Ok(mut page) = page.try_borrow_mut() {
                page.stop();
            }
        }
    });

    let snapshot = view();
    let root_style = snapshot.root_style();
    let celestial_page = page.clone();
    let show_birds = snapshot.shows(Decoration::Birds);
    let show_planes = snapshot.shows(Decoration::Planes);
    let show_stars = snapshot.shows(Decoration::ShootingStars);
    let show_rain = snapshot.shows(Decoration::Rain);
    let show_lightning = snapshot.shows(Decoration::Lightning);

    rsx! {
        div { class: "scene", style: "{root_style}",
            div { class: "sky" }
            div { class: "sea" }
            div {
                class: "celestial",
                onclick: move |_| {
                    if let Ok(mut page) = celestial_page.try_borrow_mut() {
                        page.pulse_celestial(clock::now());
                    }
                },
            }
            for (index, particle) in particles.iter().enumerate() {
                div { key: "particle-{index}", class: "particle", style: particle.style() }
            }
            for index in 0..3 {
                div { key: "bird-{index}", class: "bird bird-{index}", style: display(show_birds) }
            }
            div { class: "plane", style: display(show_planes) }
            for index in 0..3 {
                div { key: "star-{index}", class: "shooting-star shooting-star-{index}", style: display(show_stars) }
            }
            if show_rain {
                for (index, drop) in drops.iter().enumerate() {
                    div { key: "drop-{index}", class: "rain-drop", style: drop.style() }
                }
            }
            if show_lightning {
                div { class: "lightning" }
            }
            main { class: "cards",
                for block in layout.blocks.iter() {
                    section {
                        key: "{block.id.0}",
                        id: card_dom_id(block.id),
                        class: card_class(block.role, snapshot.block_visible(block.id)),
                        for line in block.lines.iter() {
                            RevealText {
                                key: "{line.id.0}",
                                kind: line.kind,
                                view: snapshot.text(line.id),
                            }
                        }
                        if block.role == BlockRole::Countdown {
                            CountdownText { view: snapshot.text(layout.countdown_text) }
                        }
                    }
                }
            }
        }
    }
}

fn display(visible: bool) -> &'static str {
    if visible {
        "display: block;"
    } else {
        "display: none;"
    }
}

fn card_class(role: BlockRole, visible: bool) -> String {
    let state = if visible { "revealed" } else { "concealed" };
    format!("card {} {state}", role.class_name())
}

#[component]
fn RevealText(kind: LineKind, view: TextView) -> Element {
    let class = view.phase.css_class();
    let style = view.phase.inline_style();
    match kind {
        LineKind::Heading => rsx! {
            h1 { class: "card-heading {class}", style: "{style}", "{view.content}" }
        },
        LineKind::Label => rsx! {
            h2 { class: "card-label {class}", style: "{style}", "{view.content}" }
        },
        LineKind::Body => rsx! {
            p { class: "card-body {class}", style: "{style}", "{view.content}" }
        },
    }
}

/// Splits `1d 01h 01m 01s` into its numbers so each one can pop in turn.
fn countdown_segments(content: &str) -> Option<Vec<&str>> {
    let segments: Vec<&str> = content.split_whitespace().collect();
    let numeric = segments.iter().all(|segment| {
        segment
            .strip_suffix(['d', 'h', 'm', 's'])
            .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
    });
    (numeric && !segments.is_empty()).then_some(segments)
}

#[component]
fn CountdownText(view: TextView) -> Element {
    let Some(segments) = countdown_segments(&view.content) else {
        return rsx! {
            RevealText { kind: LineKind::Body, view: view.clone() }
        };
    };
    let numbers: Vec<(String, String)> = segments
        .into_iter()
        .enumerate()
        .map(|(index, segment)| {
            (
                format!("--delay: {:.1}s;", index as f32 * 0.1),
                segment.to_string(),
            )
        })
        .collect();
    rsx! {
        p { class: "countdown",
            for (index, (delay, segment)) in numbers.into_iter().enumerate() {
                span { key: "{index}", class: "number", style: "{delay}", "{segment} " }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn countdown_segments_only_split_durations() {
        assert_eq!(
            countdown_segments("1d 01h 01m 01s"),
            Some(vec!["1d", "01h", "01m", "01s"])
        );
        assert_eq!(countdown_segments("It's time! School has started! 🎉"), None);
        assert_eq!(countdown_segments(""), None);
    }

    #[test]
    fn card_class_reflects_visibility() {
        assert_eq!(card_class(BlockRole::Question, false), "card question-card concealed");
        assert_eq!(card_class(BlockRole::Greeting, true), "card greeting-card revealed");
    }
}
