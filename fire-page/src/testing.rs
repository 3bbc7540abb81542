//! In-memory stand-ins for the browser: an element tree, a manually driven
//! timer queue, a theme store and a chart engine.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use crate::charts::{ChartBackend, ChartDataset, ChartName, PlotData, PreparedChart, RenderDone};
use crate::dom::PageElement;
use crate::scheduler::Scheduler;
use crate::theme::{Theme, ThemeStore};

/// 2026-10-18 15:30 UTC
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 15, 30, 0).unwrap()
}

#[derive(Default)]
struct Node {
    id: String,
    classes: Vec<String>,
    hidden: bool,
    name: String,
    value: String,
    attrs: HashMap<String, String>,
    shown: Option<bool>,
    checked: bool,
    disabled: bool,
    scrolls: u32,
    is_document: bool,
    parent: Weak<RefCell<Node>>,
    children: Vec<FakeElement>,
}

#[derive(Clone)]
pub struct FakeElement(Rc<RefCell<Node>>);

impl FakeElement {
    fn new(node: Node) -> Self {
        Self(Rc::new(RefCell::new(node)))
    }

    /// A document root; elements are connected iff they descend from one.
    pub fn root() -> Self {
        Self::new(Node {
            is_document: true,
            ..Node::default()
        })
    }

    pub fn div(classes: &str) -> Self {
        Self::new(Node {
            classes: classes.split_whitespace().map(str::to_string).collect(),
            ..Node::default()
        })
    }

    pub fn input(classes: &str, value: &str) -> Self {
        let el = Self::div(classes);
        el.0.borrow_mut().value = value.to_string();
        el
    }

    pub fn hidden(name: &str, value: &str) -> Self {
        let el = Self::input("", value);
        {
            let mut node = el.0.borrow_mut();
            node.hidden = true;
            node.name = name.to_string();
        }
        el
    }

    pub fn with_id(self, id: &str) -> Self {
        self.0.borrow_mut().id = id.to_string();
        self
    }

    pub fn with_checked(self, checked: bool) -> Self {
        self.0.borrow_mut().checked = checked;
        self
    }

    pub fn append(&self, child: &FakeElement) {
        child.remove();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child.clone());
    }

    /// Detach from the parent, if any.
    pub fn remove(&self) {
        let parent = self.0.borrow().parent.upgrade();
        if let Some(parent) = parent {
            parent
                .borrow_mut()
                .children
                .retain(|c| !Rc::ptr_eq(&c.0, &self.0));
        }
        self.0.borrow_mut().parent = Weak::new();
    }

    pub fn shown(&self) -> Option<bool> {
        self.0.borrow().shown
    }

    pub fn scrolls(&self) -> u32 {
        self.0.borrow().scrolls
    }

    pub fn disabled(&self) -> bool {
        self.0.borrow().disabled
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub fn set_checked(&self, checked: bool) {
        self.0.borrow_mut().checked = checked;
    }

    fn parent(&self) -> Option<FakeElement> {
        self.0.borrow().parent.upgrade().map(FakeElement)
    }

    fn descendants(&self) -> Vec<FakeElement> {
        let mut out = Vec::new();
        for child in self.0.borrow().children.iter() {
            out.push(child.clone());
            out.extend(child.descendants());
        }
        out
    }
}

impl PageElement for FakeElement {
    fn element_id(&self) -> String {
        self.0.borrow().id.clone()
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.borrow().classes.iter().any(|c| c == class)
    }

    fn closest_with_class(&self, class: &str) -> Option<Self> {
        let mut current = Some(self.clone());
        while let Some(el) = current {
            if el.has_class(class) {
                return Some(el);
            }
            current = el.parent();
        }
        None
    }

    fn descendants_with_class(&self, class: &str) -> Vec<Self> {
        self.descendants()
            .into_iter()
            .filter(|el| el.has_class(class))
            .collect()
    }

    fn hidden_inputs_named(&self, name: &str) -> Vec<Self> {
        self.descendants()
            .into_iter()
            .filter(|el| {
                let node = el.0.borrow();
                node.hidden && node.name == name
            })
            .collect()
    }

    fn find_by_id(&self, id: &str) -> Option<Self> {
        if self.element_id() == id {
            return Some(self.clone());
        }
        self.descendants().into_iter().find(|el| el.element_id() == id)
    }

    fn last_child_element(&self) -> Option<Self> {
        self.0.borrow().children.last().cloned()
    }

    fn connected(&self) -> bool {
        let mut current = Some(self.clone());
        while let Some(el) = current {
            if el.0.borrow().is_document {
                return true;
            }
            current = el.parent();
        }
        false
    }

    fn input_value(&self) -> String {
        self.0.borrow().value.clone()
    }

    fn set_input_value(&self, value: &str) {
        self.0.borrow_mut().value = value.to_string();
    }

    fn checked(&self) -> bool {
        self.0.borrow().checked
    }

    fn set_input_disabled(&self, disabled: bool) {
        self.0.borrow_mut().disabled = disabled;
    }

    fn set_input_name(&self, name: &str) {
        self.0.borrow_mut().name = name.to_string();
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.0.borrow().attrs.get(name).cloned()
    }

    fn set_attr(&self, name: &str, value: &str) {
        self.0
            .borrow_mut()
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    fn set_shown(&self, shown: bool) {
        self.0.borrow_mut().shown = Some(shown);
    }

    fn scroll_to_start(&self) {
        self.0.borrow_mut().scrolls += 1;
    }
}

/// A parameter row with its remove button and date mirror.
pub fn parameter_row(mirror: &str) -> FakeElement {
    let row = FakeElement::div("parameter-row");
    row.append(&FakeElement::input("form-control", "1000"));
    row.append(&FakeElement::hidden("change_dates", mirror));
    row.append(&FakeElement::div("remove-parameter-row"));
    row
}

/// A row container with one row per mirror value.
pub fn rows_container(mirrors: &[&str]) -> FakeElement {
    let container = FakeElement::div("parameter-rows-container");
    for mirror in mirrors {
        container.append(&parameter_row(mirror));
    }
    container
}

/// A parameter change group: date input, years input, then its rows.
pub fn parameter_group(date: &str, years: &str, mirrors: &[&str]) -> FakeElement {
    let group = FakeElement::div("parameter-change");
    group.append(&FakeElement::input("form-control date-input", date));
    group.append(&FakeElement::input("form-control years-input", years));
    group.append(&rows_container(mirrors));
    group
}

type Task = Box<dyn FnOnce()>;

/// Timer queue that only advances when told to.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<Vec<(u32, Task)>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn delays(&self) -> Vec<u32> {
        self.queue.borrow().iter().map(|(d, _)| *d).collect()
    }

    /// Fire everything queued so far; tasks queued meanwhile wait for the
    /// next call. Returns the number fired.
    pub fn fire(&self) -> usize {
        let due: Vec<(u32, Task)> = self.queue.borrow_mut().drain(..).collect();
        let count = due.len();
        for (_, task) in due {
            task();
        }
        count
    }
}

impl Scheduler for ManualScheduler {
    fn defer(&self, delay_ms: u32, task: Box<dyn FnOnce()>) {
        self.queue.borrow_mut().push((delay_ms, task));
    }
}

/// Local storage stand-in that counts writes.
#[derive(Clone, Default)]
pub struct MemoryStore {
    value: Rc<RefCell<Option<String>>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryStore {
    pub fn with(value: Option<&str>) -> Self {
        let store = Self::default();
        *store.value.borrow_mut() = value.map(str::to_string);
        store
    }

    pub fn value(&self) -> Option<String> {
        self.value.borrow().clone()
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl ThemeStore for MemoryStore {
    fn load(&self) -> Option<String> {
        self.value()
    }

    fn save(&self, theme: Theme) {
        *self.value.borrow_mut() = Some(theme.as_str().to_string());
        self.writes.set(self.writes.get() + 1);
    }
}

fn chart_config(mode: &str, first: &str, last: &str) -> serde_json::Value {
    json!({
        "chart": {"type": "line", "zoom": {"enabled": true}},
        "theme": {"mode": mode},
        "yaxis": {"labels": {}},
        "tooltip": {"shared": true},
        "series": [
            {"name": "Net Worth", "data": [
                {"x": first, "y": 50000.0, "age": 36.8, "time_from_now": 0.0, "time_from_now_text": "now"},
                {"x": last, "y": 61000.0, "age": 37.0, "time_from_now": 0.2, "time_from_now_text": "0.2 yr from now"}
            ]}
        ]
    })
}

/// Both charts, light and dark.
pub fn dataset() -> ChartDataset {
    let mut dataset = ChartDataset::default();
    for name in ChartName::ALL {
        dataset.insert(
            name,
            PlotData {
                config_light: chart_config("light", "2026-11-01", "2027-01-01"),
                config_dark: chart_config("dark", "2026-11-01", "2027-01-01"),
            },
        );
    }
    dataset
}

#[derive(Debug, Clone, PartialEq)]
pub struct FakeChart {
    pub id: u32,
    pub name: ChartName,
}

#[derive(Default)]
struct EngineState {
    dataset: Option<ChartDataset>,
    surfaces: HashSet<ChartName>,
    next_id: u32,
    live: HashSet<u32>,
    max_live: usize,
    destroyed: usize,
    created: Vec<(FakeChart, PreparedChart)>,
    fail_create: HashSet<ChartName>,
    fail_render: HashSet<ChartName>,
    defer: bool,
    pending: Vec<(FakeChart, RenderDone)>,
    zoom_resets: Vec<(u32, (f64, f64))>,
}

/// Chart engine that tracks live handles.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Rc<RefCell<EngineState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        backend.state.borrow_mut().surfaces = ChartName::ALL.into_iter().collect();
        backend
    }

    pub fn with_dataset(dataset: ChartDataset) -> Self {
        let backend = Self::new();
        backend.set_dataset(Some(dataset));
        backend
    }

    pub fn set_dataset(&self, dataset: Option<ChartDataset>) {
        self.state.borrow_mut().dataset = dataset;
    }

    pub fn remove_surface(&self, name: ChartName) {
        self.state.borrow_mut().surfaces.remove(&name);
    }

    pub fn fail_create(&self, name: ChartName) {
        self.state.borrow_mut().fail_create.insert(name);
    }

    pub fn fail_render(&self, name: ChartName) {
        self.state.borrow_mut().fail_render.insert(name);
    }

    /// Hold render completions until [`FakeBackend::complete_renders`].
    pub fn defer_renders(&self) {
        self.state.borrow_mut().defer = true;
    }

    pub fn complete_renders(&self) {
        let pending: Vec<(FakeChart, RenderDone)> =
            self.state.borrow_mut().pending.drain(..).collect();
        for (chart, done) in pending {
            done(self.outcome(&chart));
        }
    }

    fn outcome(&self, chart: &FakeChart) -> anyhow::Result<()> {
        if self.state.borrow().fail_render.contains(&chart.name) {
            anyhow::bail!("engine rejected {}", chart.name);
        }
        Ok(())
    }

    pub fn created(&self) -> usize {
        self.state.borrow().created.len()
    }

    pub fn last_created(&self, name: ChartName) -> Option<PreparedChart> {
        self.state
            .borrow()
            .created
            .iter()
            .rev()
            .find(|(chart, _)| chart.name == name)
            .map(|(_, prepared)| prepared.clone())
    }

    pub fn live(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn max_live(&self) -> usize {
        self.state.borrow().max_live
    }

    pub fn destroyed(&self) -> usize {
        self.state.borrow().destroyed
    }

    pub fn zoom_resets(&self) -> Vec<(u32, (f64, f64))> {
        self.state.borrow().zoom_resets.clone()
    }
}

impl ChartBackend for FakeBackend {
    type Handle = FakeChart;

    fn dataset(&self) -> Option<ChartDataset> {
        self.state.borrow().dataset.clone()
    }

    fn has_surface(&self, name: ChartName) -> bool {
        self.state.borrow().surfaces.contains(&name)
    }

    fn create(&self, name: ChartName, chart: PreparedChart) -> anyhow::Result<FakeChart> {
        let mut state = self.state.borrow_mut();
        if state.fail_create.contains(&name) {
            anyhow::bail!("bad config for {}", name);
        }
        state.next_id += 1;
        let handle = FakeChart {
            id: state.next_id,
            name,
        };
        state.live.insert(handle.id);
        state.max_live = state.max_live.max(state.live.len());
        state.created.push((handle.clone(), chart));
        Ok(handle)
    }

    fn render(&self, handle: &FakeChart, done: RenderDone) {
        if self.state.borrow().defer {
            self.state.borrow_mut().pending.push((handle.clone(), done));
            return;
        }
        done(self.outcome(handle));
    }

    fn attach_zoom_reset(&self, handle: &FakeChart, range: (f64, f64)) {
        self.state.borrow_mut().zoom_resets.push((handle.id, range));
    }

    fn destroy(&self, handle: FakeChart) {
        let mut state = self.state.borrow_mut();
        if state.live.remove(&handle.id) {
            state.destroyed += 1;
        }
    }
}
