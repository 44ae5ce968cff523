//! Regenerates the externally visible desktop and stacking state and writes
//! it out, and takes root level requests coming back in.
use crate::bridge::{AtomId, BridgeSurface, RawProperty, WindowMap, XAtom, ROOT_WINDOW};
use crate::clients::ClientRegistry;
use crate::external::{Dispatch, LayoutSubsystem};
use crate::models::dto::DesktopState;
use crate::properties::PropertyRegistry;
use serde::{Deserialize, Serialize};

/// Where published state ends up.
pub trait PublishSink {
    fn write_desktop_state(&mut self, state: &DesktopState, windows: &WindowMap);

    /// The bridge root window, when the sink writes one.
    fn root(&self) -> Option<&BridgeSurface> {
        None
    }
}

/// Used when no bridge is running: nothing outside reads root properties.
#[derive(Debug, Default)]
pub struct NoopSink;

impl PublishSink for NoopSink {
    fn write_desktop_state(&mut self, _state: &DesktopState, _windows: &WindowMap) {}
}

/// Writes the EWMH desktop properties onto the bridge root window.
#[derive(Debug)]
pub struct BridgeRootSink {
    root: BridgeSurface,
    number_of_desktops: AtomId,
    desktop_names: AtomId,
    current_desktop: AtomId,
    client_list: AtomId,
    client_list_stacking: AtomId,
}

impl BridgeRootSink {
    #[must_use]
    pub fn new(atoms: &XAtom) -> Self {
        let supported = RawProperty::Atoms(atoms.net_supported());
        Self {
            root: BridgeSurface::new(ROOT_WINDOW).with_property(atoms.NetSupported, supported),
            number_of_desktops: atoms.NetNumberOfDesktops,
            desktop_names: atoms.NetDesktopNames,
            current_desktop: atoms.NetCurrentDesktop,
            client_list: atoms.NetClientList,
            client_list_stacking: atoms.NetClientListStacking,
        }
    }
}

impl PublishSink for BridgeRootSink {
    fn write_desktop_state(&mut self, state: &DesktopState, windows: &WindowMap) {
        let count = u32::try_from(state.desktop_count).unwrap_or(u32::MAX);
        let current = state
            .current_desktop
            .and_then(|index| u32::try_from(index).ok())
            .unwrap_or(0);
        // Native clients have no bridge window and are left out of the lists.
        let stacking: Vec<_> = state
            .stacking_list
            .iter()
            .filter_map(|&id| windows.window(id))
            .collect();
        let mut mapped = state.stacking_list.clone();
        mapped.sort_unstable();
        let mapped: Vec<_> = mapped.into_iter().filter_map(|id| windows.window(id)).collect();

        let root = &mut self.root;
        root.set_property(self.number_of_desktops, RawProperty::Cardinals(vec![count]));
        root.set_property(
            self.desktop_names,
            RawProperty::Strings(state.desktop_names.clone()),
        );
        root.set_property(self.current_desktop, RawProperty::Cardinals(vec![current]));
        root.set_property(self.client_list_stacking, RawProperty::Windows(stacking));
        root.set_property(self.client_list, RawProperty::Windows(mapped));
    }

    fn root(&self) -> Option<&BridgeSurface> {
        Some(&self.root)
    }
}

/// A request aimed at the bridge root window.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum RootRequest {
    CurrentDesktop(usize),
    NumberOfDesktops(usize),
    DesktopNames(Vec<String>),
    PropertyChanged { atom: AtomId, value: RawProperty },
    Other(AtomId),
}

pub struct Publisher {
    sink: Box<dyn PublishSink>,
    last: Option<DesktopState>,
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

impl Publisher {
    #[must_use]
    pub fn new(sink: Box<dyn PublishSink>) -> Self {
        Self { sink, last: None }
    }

    /// Builds the state from scratch. The current desktop is the active tag
    /// of the first output that comes first in the tag ordering.
    #[must_use]
    pub fn generate(clients: &ClientRegistry, layout: &dyn LayoutSubsystem) -> DesktopState {
        let tags = layout.tag_ordering();
        let current_desktop = layout
            .outputs()
            .iter()
            .map(|output| output.id)
            .min()
            .map(|output| layout.active_tags(output))
            .and_then(|active| tags.iter().position(|tag| active.contains(&tag.id)));
        DesktopState {
            desktop_count: tags.len(),
            desktop_names: tags.into_iter().map(|tag| tag.label).collect(),
            current_desktop,
            stacking_list: clients.stacking().to_vec(),
        }
    }

    pub fn publish(
        &mut self,
        clients: &ClientRegistry,
        layout: &dyn LayoutSubsystem,
        windows: &WindowMap,
    ) -> &DesktopState {
        let state = Self::generate(clients, layout);
        self.write(state, windows)
    }

    /// Publishes only when the regenerated state differs from the last one
    /// written. Returns whether anything was written.
    pub fn publish_if_changed(
        &mut self,
        clients: &ClientRegistry,
        layout: &dyn LayoutSubsystem,
        windows: &WindowMap,
    ) -> bool {
        let state = Self::generate(clients, layout);
        if self.last.as_ref() == Some(&state) {
            return false;
        }
        self.write(state, windows);
        true
    }

    fn write(&mut self, state: DesktopState, windows: &WindowMap) -> &DesktopState {
        tracing::trace!("Publishing {:?}", state);
        self.sink.write_desktop_state(&state, windows);
        self.last.insert(state)
    }

    #[must_use]
    pub fn last_published(&self) -> Option<&DesktopState> {
        self.last.as_ref()
    }

    #[must_use]
    pub fn root(&self) -> Option<&BridgeSurface> {
        self.sink.root()
    }

    /// Handles a root level request. Published state is never touched here;
    /// whatever the layout changes shows up on the next refresh.
    pub fn process_inbound(
        &mut self,
        request: RootRequest,
        layout: &mut dyn LayoutSubsystem,
        properties: &mut PropertyRegistry,
    ) -> Dispatch {
        match request {
            RootRequest::CurrentDesktop(index) => {
                if index >= layout.tag_ordering().len() {
                    tracing::debug!("Ignoring switch to unknown desktop {}", index);
                    return Dispatch::Unhandled;
                }
                layout.activate_tag(index).into()
            }
            RootRequest::NumberOfDesktops(count) => {
                tracing::debug!("Ignoring request for {} desktops, tags come from the config", count);
                Dispatch::Unhandled
            }
            RootRequest::DesktopNames(names) => {
                tracing::debug!("Ignoring desktop rename to {:?}, tags come from the config", names);
                Dispatch::Unhandled
            }
            RootRequest::PropertyChanged { atom, value } => {
                let Some(name) = properties.lookup_backend(atom).map(str::to_owned) else {
                    tracing::trace!("Root property {:?} is not a custom property", atom);
                    return Dispatch::Unhandled;
                };
                match properties.set_raw(&name, &value) {
                    Ok(()) => Dispatch::Handled,
                    Err(err) => {
                        tracing::warn!("Dropping update of {}: {}", name, err);
                        Dispatch::Unhandled
                    }
                }
            }
            RootRequest::Other(atom) => {
                tracing::debug!("Unhandled root message {:?}", atom);
                Dispatch::Unhandled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClientId, OutputId, PropertyValue, ProtocolOrigin, ValueKind};
    use crate::scheduler::Scheduler;
    use crate::test_utils::ScriptedLayout;

    #[test]
    fn desktop_names_follow_the_tag_ordering() {
        let layout = ScriptedLayout::new(&["web", "code", "chat"]);
        let clients = ClientRegistry::new(Scheduler::new());
        let state = Publisher::generate(&clients, &layout);
        assert_eq!(state.desktop_count, 3);
        assert_eq!(state.desktop_names, vec!["web", "code", "chat"]);
        assert_eq!(state.current_desktop, Some(0));

        layout.reorder(&[2, 0, 1]);
        let state = Publisher::generate(&clients, &layout);
        let ordering = layout.tag_ordering();
        for (index, name) in state.desktop_names.iter().enumerate() {
            assert_eq!(name, &ordering[index].label);
        }
        assert_eq!(state.current_desktop, Some(1));
    }

    #[test]
    fn current_desktop_is_the_earliest_active_tag_in_the_ordering() {
        let layout = ScriptedLayout::new(&["1", "2", "3"]);
        let clients = ClientRegistry::new(Scheduler::new());
        layout.set_active(OutputId(0), &[0, 2]);
        layout.reorder(&[2, 0, 1]);
        let state = Publisher::generate(&clients, &layout);
        assert_eq!(state.desktop_names, vec!["3", "1", "2"]);
        assert_eq!(state.current_desktop, Some(0));

        layout.set_active(OutputId(0), &[]);
        assert_eq!(Publisher::generate(&clients, &layout).current_desktop, None);
    }

    #[test]
    fn unchanged_state_is_not_written_twice() {
        let layout = ScriptedLayout::new(&["1"]);
        let mut clients = ClientRegistry::new(Scheduler::new());
        let windows = WindowMap::default();
        let mut publisher = Publisher::new(Box::new(NoopSink));
        assert!(publisher.publish_if_changed(&clients, &layout, &windows));
        assert!(!publisher.publish_if_changed(&clients, &layout, &windows));
        let id = clients.create(ProtocolOrigin::Native);
        assert!(publisher.publish_if_changed(&clients, &layout, &windows));
        assert!(publisher.last_published().unwrap().references(id));
    }

    #[test]
    fn root_sink_lists_only_bridged_windows() {
        let atoms = XAtom::new();
        let layout = ScriptedLayout::new(&["1", "2"]);
        let mut clients = ClientRegistry::new(Scheduler::new());
        let native = clients.create(ProtocolOrigin::Native);
        let bridged = clients.create(ProtocolOrigin::Bridged);
        let mut windows = WindowMap::default();
        windows.insert(0x60_0003, bridged);

        let mut publisher = Publisher::new(Box::new(BridgeRootSink::new(&atoms)));
        let state = publisher.publish(&clients, &layout, &windows).clone();
        assert_eq!(state.stacking_list, vec![native, bridged]);

        let root = publisher.root().unwrap();
        assert_eq!(
            root.property(atoms.NetClientListStacking),
            Some(&RawProperty::Windows(vec![0x60_0003]))
        );
        assert_eq!(
            root.property(atoms.NetNumberOfDesktops),
            Some(&RawProperty::Cardinals(vec![2]))
        );
        assert_eq!(
            root.property(atoms.NetDesktopNames),
            Some(&RawProperty::Strings(vec!["1".into(), "2".into()]))
        );
        assert!(!state.references(ClientId(99)));
    }

    #[test]
    fn current_desktop_requests_go_to_the_layout() {
        let mut layout = ScriptedLayout::new(&["1", "2"]);
        let mut properties = PropertyRegistry::default();
        let mut publisher = Publisher::new(Box::new(NoopSink));

        let dispatch =
            publisher.process_inbound(RootRequest::CurrentDesktop(1), &mut layout, &mut properties);
        assert_eq!(dispatch, Dispatch::Handled);
        assert_eq!(layout.activations(), vec![1]);
        assert!(publisher.last_published().is_none());

        let dispatch =
            publisher.process_inbound(RootRequest::CurrentDesktop(5), &mut layout, &mut properties);
        assert_eq!(dispatch, Dispatch::Unhandled);
    }

    #[test]
    fn desktop_count_and_names_are_owned_by_the_config() {
        let mut layout = ScriptedLayout::new(&["1", "2"]);
        let mut properties = PropertyRegistry::default();
        let mut publisher = Publisher::new(Box::new(NoopSink));
        let requests = [
            RootRequest::NumberOfDesktops(8),
            RootRequest::DesktopNames(vec!["a".into()]),
            RootRequest::Other(AtomId(999)),
        ];
        for request in requests {
            assert_eq!(
                publisher.process_inbound(request, &mut layout, &mut properties),
                Dispatch::Unhandled
            );
        }
        assert_eq!(layout.tag_ordering().len(), 2);
    }

    #[test]
    fn root_property_updates_reach_custom_properties() {
        let mut layout = ScriptedLayout::new(&["1"]);
        let mut properties = PropertyRegistry::default();
        properties.register("_TAGWM_BAR", AtomId(500), ValueKind::String).unwrap();
        let mut publisher = Publisher::new(Box::new(NoopSink));
        let request = RootRequest::PropertyChanged {
            atom: AtomId(500),
            value: RawProperty::Text("top".into()),
        };
        assert_eq!(
            publisher.process_inbound(request, &mut layout, &mut properties),
            Dispatch::Handled
        );
        assert_eq!(
            properties.get("_TAGWM_BAR").unwrap(),
            Some(PropertyValue::String("top".into()))
        );
    }
}
