//! Events accepted from the outside world (command pipe, scripting) and how
//! the engine applies them.
use crate::bridge::{AtomId, BridgeSurface, RawMessage};
use crate::engine::Engine;
use crate::errors::Result;
use crate::external::Dispatch;
use crate::importers::NativeEvent;
use crate::models::{ClientId, ClientState, PropertyValue, Strut, TagRef, ValueKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum EngineEvent {
    MapNative,
    MapBridge { surface: BridgeSurface },
    Unmap { client: ClientId },
    Native(NativeEvent),
    Bridge(RawMessage),
    SetTags { client: ClientId, tags: BTreeSet<TagRef> },
    SetState { client: ClientId, state: ClientState, on: bool },
    SetStrut { client: ClientId, strut: Option<Strut> },
    Raise { client: ClientId },
    Lower { client: ClientId },
    Restack { order: Vec<ClientId> },
    ActivateTag(usize),
    TagsChanged,
    RegisterProperty { name: String, kind: ValueKind },
    SetProperty { name: String, value: PropertyValue },
    InternAtom { name: String },
    Publish,
}

/// What an event produced, for logging by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Mapped(ClientId),
    Interned(AtomId),
    Dispatched(Dispatch),
    Done,
}

impl Engine {
    /// Applies one external event.
    ///
    /// # Errors
    ///
    /// Passes on the error of the underlying operation, e.g. `NotFound` for
    /// an event naming a client that does not exist.
    pub fn execute(&mut self, event: EngineEvent) -> Result<Outcome> {
        tracing::trace!("Executing {:?}", event);
        let outcome = match event {
            EngineEvent::MapNative => Outcome::Mapped(self.map_native_surface()),
            EngineEvent::MapBridge { surface } => {
                let id = self.map_bridge_surface(surface);
                self.import_initial(id)?;
                Outcome::Mapped(id)
            }
            EngineEvent::Unmap { client } => {
                self.destroy(client)?;
                Outcome::Done
            }
            EngineEvent::Native(event) => Outcome::Dispatched(self.handle_native(event)),
            EngineEvent::Bridge(message) => Outcome::Dispatched(self.process_message(message)),
            EngineEvent::SetTags { client, tags } => {
                self.set_tags(client, tags)?;
                Outcome::Done
            }
            EngineEvent::SetState { client, state, on } => {
                self.set_state(client, state, on)?;
                Outcome::Done
            }
            EngineEvent::SetStrut { client, strut } => {
                self.set_strut(client, strut)?;
                Outcome::Done
            }
            EngineEvent::Raise { client } => {
                self.raise(client)?;
                Outcome::Done
            }
            EngineEvent::Lower { client } => {
                self.lower(client)?;
                Outcome::Done
            }
            EngineEvent::Restack { order } => {
                self.restack(&order)?;
                Outcome::Done
            }
            EngineEvent::ActivateTag(index) => Outcome::Dispatched(self.activate_tag(index).into()),
            EngineEvent::TagsChanged => {
                self.tags_changed();
                Outcome::Done
            }
            EngineEvent::RegisterProperty { name, kind } => {
                Outcome::Interned(self.register_property(&name, kind)?)
            }
            EngineEvent::SetProperty { name, value } => {
                self.set_property(&name, value)?;
                Outcome::Done
            }
            EngineEvent::InternAtom { name } => Outcome::Interned(self.atoms_mut().intern(&name)),
            EngineEvent::Publish => {
                self.publish();
                Outcome::Done
            }
        };
        Ok(outcome)
    }
}
