//! Doubles for the collaborators, shared by the unit tests. Each one is a
//! cheap handle so a test can keep a copy after boxing it into an engine.
use crate::config::{Config, PropertyDecl, PublishMode};
use crate::engine::{Collaborators, Engine};
use crate::external::{FocusSink, LayoutSubsystem, SceneSink};
use crate::models::{ClientId, Output, OutputId, Tag, TagRef, Xyhw};
use crate::scheduler::Scheduler;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct TestConfig {
    pub tags: Vec<String>,
    pub outputs: Vec<Output>,
    pub publish_mode: PublishMode,
    pub properties: Vec<PropertyDecl>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            tags: ["1", "2", "3", "4"].map(String::from).to_vec(),
            outputs: vec![test_output(0)],
            publish_mode: PublishMode::Bridge,
            properties: vec![],
        }
    }
}

impl Config for TestConfig {
    fn create_list_of_tag_labels(&self) -> Vec<String> {
        self.tags.clone()
    }

    fn outputs(&self) -> Vec<Output> {
        self.outputs.clone()
    }

    fn publish_mode(&self) -> PublishMode {
        self.publish_mode
    }

    fn custom_properties(&self) -> Vec<PropertyDecl> {
        self.properties.clone()
    }
}

/// Outputs laid out left to right, 1920x1080 each.
pub fn test_output(index: u32) -> Output {
    let x = i32::try_from(index).unwrap() * 1920;
    Output::new(
        OutputId(index),
        &format!("test-{index}"),
        Xyhw::new(x, 0, 1920, 1080),
    )
}

#[derive(Debug, Default)]
struct LayoutState {
    outputs: Vec<Output>,
    tags: Vec<Tag>,
    active: BTreeMap<OutputId, BTreeSet<TagRef>>,
    activations: Vec<usize>,
    tag_requests: Vec<(ClientId, Option<usize>)>,
}

/// A layout whose answers are set by the test. Tag ids are their initial
/// index; the first tag is active on every output.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLayout {
    state: Rc<RefCell<LayoutState>>,
}

impl ScriptedLayout {
    pub fn new(labels: &[&str]) -> Self {
        Self::with_outputs(labels, vec![test_output(0)])
    }

    pub fn with_outputs(labels: &[&str], outputs: Vec<Output>) -> Self {
        let tags = labels
            .iter()
            .enumerate()
            .map(|(id, label)| Tag::new(id, label))
            .collect();
        let active = outputs
            .iter()
            .map(|output| (output.id, BTreeSet::from([0])))
            .collect();
        let state = LayoutState {
            outputs,
            tags,
            active,
            ..LayoutState::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    pub fn set_active(&self, output: OutputId, tags: &[TagRef]) {
        let mut state = self.state.borrow_mut();
        state.active.insert(output, tags.iter().copied().collect());
    }

    /// Rearranges the tag ordering; `order[i]` is the current index of the
    /// tag that should end up at `i`.
    pub fn reorder(&self, order: &[usize]) {
        let mut state = self.state.borrow_mut();
        let tags: Vec<Tag> = order.iter().map(|&i| state.tags[i].clone()).collect();
        state.tags = tags;
    }

    pub fn activations(&self) -> Vec<usize> {
        self.state.borrow().activations.clone()
    }

    pub fn tag_requests(&self) -> Vec<(ClientId, Option<usize>)> {
        self.state.borrow().tag_requests.clone()
    }
}

impl LayoutSubsystem for ScriptedLayout {
    fn outputs(&self) -> Vec<Output> {
        self.state.borrow().outputs.clone()
    }

    fn active_tags(&self, output: OutputId) -> BTreeSet<TagRef> {
        self.state
            .borrow()
            .active
            .get(&output)
            .cloned()
            .unwrap_or_default()
    }

    fn tag_ordering(&self) -> Vec<Tag> {
        self.state.borrow().tags.clone()
    }

    fn activate_tag(&mut self, index: usize) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(tag) = state.tags.get(index).map(|tag| tag.id) else {
            return false;
        };
        state.activations.push(index);
        if let Some(first) = state.outputs.first().map(|output| output.id) {
            state.active.insert(first, BTreeSet::from([tag]));
        }
        true
    }

    fn request_client_tag(&mut self, client: ClientId, index: Option<usize>) -> Option<TagRef> {
        let mut state = self.state.borrow_mut();
        state.tag_requests.push((client, index));
        index.and_then(|index| state.tags.get(index).map(|tag| tag.id))
    }
}

/// Records every visibility request. Can be told to mark a scheduler dirty
/// whenever it is called, like a renderer that reacts synchronously.
#[derive(Debug, Clone, Default)]
pub struct RecordingScene {
    calls: Rc<RefCell<Vec<(ClientId, bool)>>>,
    redirty: Rc<RefCell<Option<Scheduler>>>,
}

impl RecordingScene {
    pub fn calls(&self) -> Vec<(ClientId, bool)> {
        self.calls.borrow().clone()
    }

    pub fn redirty(&self, scheduler: Scheduler) {
        *self.redirty.borrow_mut() = Some(scheduler);
    }
}

impl SceneSink for RecordingScene {
    fn set_scene_visibility(&mut self, client: ClientId, visible: bool) {
        self.calls.borrow_mut().push((client, visible));
        if let Some(scheduler) = self.redirty.borrow().as_ref() {
            scheduler.mark_dirty();
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingFocus {
    requests: Rc<RefCell<Vec<ClientId>>>,
}

impl RecordingFocus {
    pub fn requests(&self) -> Vec<ClientId> {
        self.requests.borrow().clone()
    }
}

impl FocusSink for RecordingFocus {
    fn request_activate(&mut self, client: ClientId) {
        self.requests.borrow_mut().push(client);
    }
}

/// An engine wired to fresh doubles, plus handles to inspect them.
pub fn test_engine(
    config: TestConfig,
) -> (Engine, ScriptedLayout, RecordingScene, RecordingFocus) {
    let labels: Vec<&str> = config.tags.iter().map(String::as_str).collect();
    let layout = ScriptedLayout::with_outputs(&labels, config.outputs.clone());
    let scene = RecordingScene::default();
    let focus = RecordingFocus::default();
    let collaborators = Collaborators {
        layout: Box::new(layout.clone()),
        scene: Box::new(scene.clone()),
        focus: Box::new(focus.clone()),
    };
    let engine = Engine::new(&config, collaborators).unwrap();
    (engine, layout, scene, focus)
}

pub async fn temp_path() -> std::io::Result<std::path::PathBuf> {
    tokio::task::spawn_blocking(|| tempfile::Builder::new().tempfile())
        .await
        .expect("Blocking task joined")?
        .into_temp_path()
        .keep()
        .map_err(Into::into)
}
