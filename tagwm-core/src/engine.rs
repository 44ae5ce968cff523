//! The single threaded engine: one instance per compositor, fed one event at
//! a time by the event loop.
use crate::adapter::{Active, Backend, SceneNode};
use crate::banning;
use crate::bridge::{AtomId, BridgeSurface, RawMessage, XAtom};
use crate::clients::ClientRegistry;
use crate::config::{Config, PublishMode};
use crate::errors::{CoreError, Result};
use crate::external::{Dispatch, FocusSink, LayoutSubsystem, SceneSink};
use crate::importers::{BridgeImporter, BridgeUpdate, NativeEvent, NativeImporter};
use crate::models::dto::DesktopState;
use crate::models::{
    Client, ClientId, ClientState, Output, OutputId, PropertyValue, ProtocolOrigin, Strut,
    TagRef, ValueKind, WindowType, Xyhw,
};
use crate::properties::PropertyRegistry;
use crate::publisher::{BridgeRootSink, NoopSink, PublishSink, Publisher, RootRequest};
use crate::scheduler::Scheduler;
use crate::struts::StrutRegistry;
use std::collections::{BTreeSet, HashMap};

/// The collaborators the engine talks to but does not own the logic of.
pub struct Collaborators {
    pub layout: Box<dyn LayoutSubsystem>,
    pub scene: Box<dyn SceneSink>,
    pub focus: Box<dyn FocusSink>,
}

pub struct Engine {
    scheduler: Scheduler,
    clients: ClientRegistry,
    struts: StrutRegistry,
    publisher: Publisher,
    properties: PropertyRegistry,
    native: NativeImporter,
    bridge: BridgeImporter,
    atoms: XAtom,
    adapter: Active,
    scene_nodes: HashMap<ClientId, SceneNode>,
    layout: Box<dyn LayoutSubsystem>,
    scene: Box<dyn SceneSink>,
    focus: Box<dyn FocusSink>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("clients", &self.clients)
            .field("struts", &self.struts)
            .field("publisher", &self.publisher)
            .field("backend", &self.adapter.version())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// # Errors
    ///
    /// Fails if the backend cannot be brought up, or if the configuration
    /// declares the same custom property twice or with a default of the
    /// wrong kind.
    pub fn new(config: &impl Config, collaborators: Collaborators) -> Result<Self> {
        let scheduler = Scheduler::new();
        let mut atoms = XAtom::new();
        let adapter = Active::new(&atoms)?;
        let sink: Box<dyn PublishSink> = match config.publish_mode() {
            PublishMode::Native => Box::new(NoopSink),
            PublishMode::Bridge => Box::new(BridgeRootSink::new(&atoms)),
        };

        let mut struts = StrutRegistry::new(scheduler.clone());
        for output in config.outputs() {
            struts.add_output(output);
        }

        let mut properties = PropertyRegistry::default();
        for decl in config.custom_properties() {
            let atom = atoms.intern(&decl.name);
            properties.register(&decl.name, atom, decl.kind)?;
            if let Some(value) = decl.default {
                properties.set(&decl.name, value)?;
            }
        }

        tracing::info!("Engine up with backend {}", adapter.version());
        Ok(Self {
            clients: ClientRegistry::new(scheduler.clone()),
            struts,
            publisher: Publisher::new(sink),
            properties,
            native: NativeImporter::default(),
            bridge: BridgeImporter::default(),
            atoms,
            adapter,
            scene_nodes: HashMap::new(),
            layout: collaborators.layout,
            scene: collaborators.scene,
            focus: collaborators.focus,
            scheduler,
        })
    }

    #[must_use]
    pub const fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[must_use]
    pub const fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client.
    pub fn client(&self, id: ClientId) -> Result<&Client> {
        self.clients.client(id)
    }

    #[must_use]
    pub const fn struts(&self) -> &StrutRegistry {
        &self.struts
    }

    #[must_use]
    pub const fn atoms(&self) -> &XAtom {
        &self.atoms
    }

    /// Interning new names is how the bridge transport learns atom ids.
    pub fn atoms_mut(&mut self) -> &mut XAtom {
        &mut self.atoms
    }

    #[must_use]
    pub const fn adapter(&self) -> &Active {
        &self.adapter
    }

    #[must_use]
    pub fn scene_node(&self, id: ClientId) -> Option<&SceneNode> {
        self.scene_nodes.get(&id)
    }

    #[must_use]
    pub fn bridge_surface(&self, id: ClientId) -> Option<&BridgeSurface> {
        self.bridge.surface(id)
    }

    /// The bridge root window as last published, `None` in native mode.
    #[must_use]
    pub fn root_surface(&self) -> Option<&BridgeSurface> {
        self.publisher.root()
    }

    // Surfaces and lifecycle

    /// A native toplevel was mapped. Its properties arrive later as events.
    pub fn map_native_surface(&mut self) -> ClientId {
        let id = self.create(ProtocolOrigin::Native);
        self.native.attach(id);
        id
    }

    pub fn handle_native(&mut self, event: NativeEvent) -> Dispatch {
        self.native.handle(event, &mut self.clients)
    }

    /// A bridged surface was mapped. Call [`Engine::import_initial`] next.
    pub fn map_bridge_surface(&mut self, surface: BridgeSurface) -> ClientId {
        let id = self.create(ProtocolOrigin::Bridged);
        tracing::debug!("Mapped bridge window {:#x} as {}", surface.window, id);
        self.bridge.map(id, surface);
        id
    }

    fn create(&mut self, origin: ProtocolOrigin) -> ClientId {
        let id = self.clients.create(origin);
        let node = self.adapter.create_scene_node(id, origin);
        self.scene_nodes.insert(id, node);
        id
    }

    /// Reads every cached hint of a bridged client in one go. Marks the
    /// scheduler dirty at most once.
    ///
    /// # Errors
    ///
    /// `NotFound` if `id` is not a live bridged client.
    pub fn import_initial(&mut self, id: ClientId) -> Result<()> {
        let mut change = self
            .bridge
            .import_initial(id, &self.atoms, &self.adapter)
            .ok_or(CoreError::NotFound(id))?;
        if let Some(surface) = self.bridge.surface(id) {
            if let Some(geometry) = self.adapter.toplevel_geometry(surface) {
                change.output = Some(self.struts.output_at(&geometry));
            }
        }
        self.clients.apply(change)?;
        self.struts.track(self.clients.client(id)?);
        Ok(())
    }

    /// Handles one message from the bridge transport.
    pub fn process_message(&mut self, message: RawMessage) -> Dispatch {
        let Some(update) = self
            .bridge
            .translate(message, &self.atoms, &self.adapter, &self.clients)
        else {
            return Dispatch::Unhandled;
        };
        match update {
            BridgeUpdate::Change(change) => {
                let id = change.id;
                let touches_struts = change.strut.is_some() || change.output.is_some();
                if let Err(err) = self.clients.apply(change) {
                    tracing::debug!("Dropping bridge change: {}", err);
                    return Dispatch::Unhandled;
                }
                if touches_struts {
                    if let Some(client) = self.clients.get(id) {
                        self.struts.track(client);
                    }
                }
                Dispatch::Handled
            }
            BridgeUpdate::Activate(id) => {
                self.focus.request_activate(id);
                Dispatch::Handled
            }
            BridgeUpdate::MoveToDesktop { client, desktop } => {
                self.move_to_desktop(client, desktop)
            }
            BridgeUpdate::Root(request) => {
                let switches_desktop = matches!(request, RootRequest::CurrentDesktop(_));
                let dispatch = self.publisher.process_inbound(
                    request,
                    self.layout.as_mut(),
                    &mut self.properties,
                );
                if switches_desktop && dispatch.is_handled() {
                    self.scheduler.mark_dirty();
                }
                dispatch
            }
        }
    }

    fn move_to_desktop(&mut self, client: ClientId, desktop: Option<usize>) -> Dispatch {
        let result = match self.layout.request_client_tag(client, desktop) {
            Some(tag) => self.clients.set_tags(client, BTreeSet::from([tag])),
            None if desktop.is_none() => {
                self.clients.set_state(client, ClientState::Sticky, true)
            }
            None => {
                tracing::debug!("Layout refused to move {} to {:?}", client, desktop);
                return Dispatch::Unhandled;
            }
        };
        result.is_ok().into()
    }

    /// Tears a client down: listeners first, then stacking, struts and the
    /// record itself, all before returning.
    ///
    /// # Errors
    ///
    /// `NotFound` if `id` was never issued. Destroying twice is fine.
    pub fn destroy(&mut self, id: ClientId) -> Result<()> {
        if !self.clients.contains(id) {
            return self.clients.destroy(id).map(drop);
        }
        self.native.detach(id);
        self.bridge.unmap(id);
        self.scene_nodes.remove(&id);
        self.struts.remove_client(id);
        self.clients.destroy(id)?;
        tracing::debug!("Destroyed {}", id);
        Ok(())
    }

    // Client mutation

    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client.
    pub fn set_title(&mut self, id: ClientId, title: &str) -> Result<bool> {
        self.clients.set_title(id, title)
    }

    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client.
    pub fn set_app_id(&mut self, id: ClientId, app_id: &str) -> Result<bool> {
        self.clients.set_app_id(id, app_id)
    }

    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client.
    pub fn set_window_type(&mut self, id: ClientId, window_type: WindowType) -> Result<bool> {
        self.clients.set_window_type(id, window_type)
    }

    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client.
    pub fn set_tags(&mut self, id: ClientId, tags: BTreeSet<TagRef>) -> Result<bool> {
        self.clients.set_tags(id, tags)
    }

    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client, `UnknownOutput` for an
    /// output that was never added.
    pub fn set_output(&mut self, id: ClientId, output: Option<OutputId>) -> Result<bool> {
        if let Some(output) = output {
            self.struts.margins(output)?;
        }
        let changed = self.clients.set_output(id, output)?;
        self.struts.track(self.clients.client(id)?);
        Ok(changed)
    }

    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client.
    pub fn set_state(&mut self, id: ClientId, state: ClientState, on: bool) -> Result<bool> {
        self.clients.set_state(id, state, on)
    }

    /// Maximizes or restores a client, telling the backend for bridged ones.
    ///
    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client.
    pub fn set_maximized(&mut self, id: ClientId, maximized: bool) -> Result<bool> {
        if let Some(surface) = self.bridge.surface_mut(id) {
            self.adapter.set_maximized(surface, maximized, maximized);
        }
        self.clients.set_state(id, ClientState::Maximized, maximized)
    }

    /// Returns the new usable area of every output whose reservations changed.
    ///
    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client.
    pub fn set_strut(&mut self, id: ClientId, strut: Option<Strut>) -> Result<Vec<(OutputId, Xyhw)>> {
        self.struts.set_strut(&mut self.clients, id, strut)
    }

    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client.
    pub fn raise(&mut self, id: ClientId) -> Result<()> {
        self.clients.raise(id)
    }

    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client.
    pub fn lower(&mut self, id: ClientId) -> Result<()> {
        self.clients.lower(id)
    }

    /// # Errors
    ///
    /// `NotFound` if any id in `order` is not a live client.
    pub fn restack(&mut self, order: &[ClientId]) -> Result<()> {
        self.clients.restack(order)
    }

    // Outputs and tags

    pub fn add_output(&mut self, output: Output) {
        self.struts.add_output(output);
    }

    /// # Errors
    ///
    /// `UnknownOutput` if `id` was never added.
    pub fn remove_output(&mut self, id: OutputId) -> Result<Output> {
        self.struts.remove_output(id)
    }

    /// # Errors
    ///
    /// `UnknownOutput` if `output` was never added.
    pub fn usable_area(&self, output: OutputId) -> Result<Xyhw> {
        self.struts.usable_area(output)
    }

    /// The layout changed which tags are shown or how they are ordered.
    pub fn tags_changed(&mut self) {
        self.scheduler.mark_dirty();
    }

    pub fn activate_tag(&mut self, index: usize) -> bool {
        let activated = self.layout.activate_tag(index);
        if activated {
            self.scheduler.mark_dirty();
        }
        activated
    }

    // Custom properties

    /// Declares a property, interning a backend atom under the same name.
    ///
    /// # Errors
    ///
    /// `DuplicateName` if `name` is already registered.
    pub fn register_property(&mut self, name: &str, kind: ValueKind) -> Result<AtomId> {
        if self.properties.entry(name).is_ok() {
            return Err(CoreError::DuplicateName(name.to_owned()));
        }
        let atom = self.atoms.intern(name);
        self.properties.register(name, atom, kind)?;
        Ok(atom)
    }

    /// # Errors
    ///
    /// `UnknownProperty` if `name` is not registered.
    pub fn get_property(&self, name: &str) -> Result<Option<PropertyValue>> {
        self.properties.get(name)
    }

    /// # Errors
    ///
    /// `UnknownProperty` if `name` is not registered, `TypeMismatch` if the
    /// value is of another kind.
    pub fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        self.properties.set(name, value)
    }

    #[must_use]
    pub const fn properties(&self) -> &PropertyRegistry {
        &self.properties
    }

    // Published state

    /// A freshly generated snapshot; nothing is written.
    #[must_use]
    pub fn desktop_state(&self) -> DesktopState {
        Publisher::generate(&self.clients, self.layout.as_ref())
    }

    #[must_use]
    pub fn last_published(&self) -> Option<&DesktopState> {
        self.publisher.last_published()
    }

    /// Writes the current state out regardless of what was published before.
    pub fn publish(&mut self) -> DesktopState {
        self.publisher
            .publish(&self.clients, self.layout.as_ref(), self.bridge.windows())
            .clone()
    }

    /// Runs the refresh pass if anything marked the scheduler dirty since the
    /// last one. Returns whether a pass ran.
    pub fn refresh(&mut self) -> bool {
        if !self.scheduler.begin_pass() {
            return false;
        }
        let flipped = banning::recompute(&mut self.clients, self.layout.as_ref(), self.scene.as_mut());
        let published =
            self.publisher
                .publish_if_changed(&self.clients, self.layout.as_ref(), self.bridge.windows());
        tracing::trace!(
            "Refresh pass {}: {} visibility changes, published: {}",
            self.scheduler.passes(),
            flipped.len(),
            published
        );
        true
    }

    /// Whether the client may be given keyboard focus.
    #[must_use]
    pub fn focus_candidate(&self, id: ClientId) -> bool {
        let Some(client) = self.clients.get(id) else {
            return false;
        };
        if !client.visible() {
            return false;
        }
        match self.bridge.surface(id) {
            Some(surface) if surface.override_redirect => {
                self.adapter.override_redirect_wants_focus(surface)
            }
            Some(surface) => self.adapter.input_model(surface).accepts_focus(),
            None => true,
        }
    }
}
