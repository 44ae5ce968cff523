//! Stand-in collaborators for running the engine on its own: a fixed tag
//! layout and sinks that only log what they are asked to do.
use std::collections::BTreeSet;
use tagwm_core::models::{ClientId, Output, OutputId, Tag, TagRef};
use tagwm_core::{Config, FocusSink, LayoutSubsystem, SceneSink};

/// One tag shown per output. Output `n` starts on tag `n`, wrapping around
/// when there are more outputs than tags.
#[derive(Debug, Clone)]
pub struct StaticLayout {
    tags: Vec<Tag>,
    outputs: Vec<Output>,
    shown: Vec<TagRef>,
}

impl StaticLayout {
    #[must_use]
    pub fn new(tags: Vec<Tag>, outputs: Vec<Output>) -> Self {
        let shown = if tags.is_empty() {
            vec![]
        } else {
            (0..outputs.len()).map(|i| tags[i % tags.len()].id).collect()
        };
        Self {
            tags,
            outputs,
            shown,
        }
    }

    #[must_use]
    pub fn from_config(config: &impl Config) -> Self {
        let tags = config
            .create_list_of_tag_labels()
            .iter()
            .enumerate()
            .map(|(id, label)| Tag::new(id, label))
            .collect();
        Self::new(tags, config.outputs())
    }

    fn output_index(&self, output: OutputId) -> Option<usize> {
        self.outputs.iter().position(|o| o.id == output)
    }
}

impl LayoutSubsystem for StaticLayout {
    fn outputs(&self) -> Vec<Output> {
        self.outputs.clone()
    }

    fn active_tags(&self, output: OutputId) -> BTreeSet<TagRef> {
        self.output_index(output)
            .and_then(|index| self.shown.get(index))
            .into_iter()
            .copied()
            .collect()
    }

    fn tag_ordering(&self) -> Vec<Tag> {
        self.tags.clone()
    }

    // Always lands on the first output.
    fn activate_tag(&mut self, index: usize) -> bool {
        let Some(tag) = self.tags.get(index) else {
            return false;
        };
        let Some(shown) = self.shown.first_mut() else {
            return false;
        };
        *shown = tag.id;
        true
    }

    fn request_client_tag(&mut self, _client: ClientId, index: Option<usize>) -> Option<TagRef> {
        index.and_then(|i| self.tags.get(i)).map(|tag| tag.id)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogScene;

impl SceneSink for LogScene {
    fn set_scene_visibility(&mut self, client: ClientId, visible: bool) {
        tracing::debug!("Scene: {} visible={}", client, visible);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogFocus;

impl FocusSink for LogFocus {
    fn request_activate(&mut self, client: ClientId) {
        tracing::info!("Focus requested for {}", client);
    }
}
