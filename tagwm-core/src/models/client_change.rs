use super::{Client, ClientId, ClientState, OutputId, Strut, TagRef, WindowType};
use std::collections::BTreeSet;

/// A partial update of a [`Client`]. Unset fields are left untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientChange {
    pub id: ClientId,
    pub title: Option<String>,
    pub app_id: Option<String>,
    pub instance: Option<String>,
    pub pid: Option<Option<u32>>,
    pub window_type: Option<WindowType>,
    pub tags: Option<BTreeSet<TagRef>>,
    pub output: Option<Option<OutputId>>,
    pub strut: Option<Option<Strut>>,
    pub states: Option<Vec<ClientState>>,
}

impl ClientChange {
    #[must_use]
    pub fn new(id: ClientId) -> Self {
        Self {
            id,
            title: None,
            app_id: None,
            instance: None,
            pid: None,
            window_type: None,
            tags: None,
            output: None,
            strut: None,
            states: None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::new(self.id)
    }

    /// Applies the change, returning true if any field actually changed.
    pub(crate) fn update(self, client: &mut Client) -> bool {
        let mut changed = false;
        if let Some(title) = self.title {
            changed = changed || client.title != title;
            client.title = title;
        }
        if let Some(app_id) = self.app_id {
            changed = changed || client.app_id != app_id;
            client.app_id = app_id;
        }
        if let Some(instance) = self.instance {
            changed = changed || client.instance != instance;
            client.instance = instance;
        }
        if let Some(pid) = self.pid {
            changed = changed || client.pid != pid;
            client.pid = pid;
        }
        if let Some(window_type) = self.window_type {
            changed = changed || client.window_type != window_type;
            client.window_type = window_type;
        }
        if let Some(tags) = self.tags {
            changed = changed || client.tags != tags;
            client.tags = tags;
        }
        if let Some(output) = self.output {
            changed = changed || client.output != output;
            client.output = output;
        }
        if let Some(strut) = self.strut {
            changed = changed || client.strut != strut;
            client.strut = strut;
        }
        if let Some(mut states) = self.states {
            let mut seen = Vec::with_capacity(states.len());
            states.retain(|state| {
                let first = !seen.contains(state);
                seen.push(*state);
                first
            });
            changed = changed || client.states != states;
            client.states = states;
        }
        changed
    }
}
