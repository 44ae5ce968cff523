//! Reads legacy hints out of the bridge's per-surface cache, once in bulk
//! when a surface is mapped and then one message at a time.
use crate::adapter::Backend;
use crate::bridge::{
    AtomId, BridgeSurface, RawMessage, RawProperty, WindowMap, XAtom, ALL_DESKTOPS,
    ICONIC_STATE, NORMAL_STATE,
};
use crate::clients::ClientRegistry;
use crate::models::{ClientChange, ClientId, ClientState, Strut};
use crate::publisher::RootRequest;
use std::collections::HashMap;

const WITHDRAWN_STATE: u32 = 0;

const NET_WM_STATE_REMOVE: i64 = 0;
const NET_WM_STATE_ADD: i64 = 1;
const NET_WM_STATE_TOGGLE: i64 = 2;

/// What a bridge message means for the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeUpdate {
    Change(ClientChange),
    Activate(ClientId),
    /// `None` asks for every desktop.
    MoveToDesktop {
        client: ClientId,
        desktop: Option<usize>,
    },
    Root(RootRequest),
}

#[derive(Debug, Default)]
pub struct BridgeImporter {
    surfaces: HashMap<ClientId, BridgeSurface>,
    windows: WindowMap,
}

impl BridgeImporter {
    pub fn map(&mut self, client: ClientId, surface: BridgeSurface) {
        if let Some(stale) = self.windows.insert(surface.window, client) {
            tracing::debug!("Window {:#x} taken over from {} by {}", surface.window, stale, client);
        }
        self.surfaces.insert(client, surface);
    }

    pub fn unmap(&mut self, client: ClientId) -> Option<BridgeSurface> {
        self.windows.remove_client(client);
        self.surfaces.remove(&client)
    }

    #[must_use]
    pub fn surface(&self, client: ClientId) -> Option<&BridgeSurface> {
        self.surfaces.get(&client)
    }

    pub(crate) fn surface_mut(&mut self, client: ClientId) -> Option<&mut BridgeSurface> {
        self.surfaces.get_mut(&client)
    }

    #[must_use]
    pub const fn windows(&self) -> &WindowMap {
        &self.windows
    }

    /// Everything the cache already knows about `client`, as one change.
    pub fn import_initial(
        &self,
        client: ClientId,
        atoms: &XAtom,
        adapter: &impl Backend,
    ) -> Option<ClientChange> {
        let surface = self.surfaces.get(&client)?;
        let mut change = ClientChange::new(client);
        change.title = Some(title(surface, atoms).unwrap_or_default());
        if let Some((instance, class)) = class(surface, atoms) {
            change.instance = Some(instance);
            change.app_id = Some(class);
        }
        change.pid = Some(pid(surface, atoms));
        change.window_type = Some(adapter.window_type(surface));
        change.strut = Some(strut(surface, atoms));

        let mut states = net_wm_states(surface, atoms);
        if is_iconic(surface, atoms) {
            states.push(ClientState::Minimized);
        }
        change.states = Some(states);
        Some(change)
    }

    /// Translates one message, refreshing the cache on the way. `None` means
    /// the message is not for us: unknown type, malformed payload, or a
    /// window that is not (or no longer) mapped.
    pub fn translate(
        &mut self,
        message: RawMessage,
        atoms: &XAtom,
        adapter: &impl Backend,
        clients: &ClientRegistry,
    ) -> Option<BridgeUpdate> {
        if message.targets_root() {
            return Some(BridgeUpdate::Root(root_request(message, atoms)?));
        }
        let Some(client) = self.windows.client(message.window()) else {
            tracing::debug!("Message for unmanaged window {}: {:?}", message.window(), message);
            return None;
        };
        let surface = self.surfaces.get_mut(&client)?;
        match message {
            RawMessage::ClientMessage {
                message_type, data, ..
            } => {
                tracing::trace!("ClientMessage: {} : {:?}", client, atoms.get_name(message_type));
                client_message(surface, client, message_type, data, atoms, adapter, clients)
            }
            RawMessage::PropertyNotify { atom, value, .. } => {
                tracing::trace!("PropertyNotify: {} : {:?}", client, atoms.get_name(atom));
                surface.set_property(atom, value);
                property_notify(surface, client, atom, atoms, adapter, clients)
            }
        }
    }
}

fn root_request(message: RawMessage, atoms: &XAtom) -> Option<RootRequest> {
    match message {
        RawMessage::ClientMessage {
            message_type, data, ..
        } => {
            if message_type == atoms.NetCurrentDesktop {
                return match usize::try_from(data[0]) {
                    Ok(index) => Some(RootRequest::CurrentDesktop(index)),
                    Err(err) => {
                        tracing::debug!(
                            "Received invalid value for current desktop new index ({}): {}",
                            data[0],
                            err,
                        );
                        None
                    }
                };
            }
            if message_type == atoms.NetNumberOfDesktops {
                return usize::try_from(data[0]).ok().map(RootRequest::NumberOfDesktops);
            }
            Some(RootRequest::Other(message_type))
        }
        RawMessage::PropertyNotify { atom, value, .. } => {
            if atom == atoms.NetDesktopNames {
                if let RawProperty::Strings(names) = value {
                    return Some(RootRequest::DesktopNames(names));
                }
            }
            Some(RootRequest::PropertyChanged { atom, value })
        }
    }
}

fn client_message(
    surface: &mut BridgeSurface,
    client: ClientId,
    message_type: AtomId,
    data: [i64; 5],
    atoms: &XAtom,
    adapter: &impl Backend,
    clients: &ClientRegistry,
) -> Option<BridgeUpdate> {
    if message_type == atoms.NetWMState {
        return update_states(surface, client, data, atoms, adapter, clients);
    }

    if message_type == atoms.WMChangeState {
        if data[0] != ICONIC_STATE {
            tracing::debug!("WM_CHANGE_STATE to {} ignored for {}", data[0], client);
            return None;
        }
        let mut states = clients.get(client)?.states().to_vec();
        states.push(ClientState::Minimized);
        write_states(surface, &states, atoms);
        return Some(states_change(client, states));
    }

    if message_type == atoms.NetWMDesktop {
        // Sign extended by some transports.
        let desktop = if data[0] == ALL_DESKTOPS || data[0] == -1 {
            None
        } else {
            Some(usize::try_from(data[0]).ok()?)
        };
        return Some(BridgeUpdate::MoveToDesktop { client, desktop });
    }

    if message_type == atoms.NetActiveWindow {
        return Some(BridgeUpdate::Activate(client));
    }

    tracing::debug!(
        "Unhandled client message {} for {}",
        atoms.get_name(message_type),
        client
    );
    None
}

/// `_NET_WM_STATE` request: `data[0]` is the action, `data[1]` and `data[2]`
/// the affected states.
fn update_states(
    surface: &mut BridgeSurface,
    client: ClientId,
    data: [i64; 5],
    atoms: &XAtom,
    adapter: &impl Backend,
    clients: &ClientRegistry,
) -> Option<BridgeUpdate> {
    let action = data[0];
    if !(NET_WM_STATE_REMOVE..=NET_WM_STATE_TOGGLE).contains(&action) {
        tracing::debug!("Invalid _NET_WM_STATE action {} for {}", action, client);
        return None;
    }
    let apply = |current: bool| match action {
        NET_WM_STATE_REMOVE => false,
        NET_WM_STATE_ADD => true,
        _ => !current,
    };

    let mut states = clients.get(client)?.states().to_vec();
    let mut horizontal = surface.maximized_horz;
    let mut vertical = surface.maximized_vert;
    let mut understood = false;
    for raw in &data[1..=2] {
        let Ok(raw) = u32::try_from(*raw) else {
            continue;
        };
        let atom = AtomId(raw);
        if atom == atoms.NetWMStateMaximizedHorz {
            horizontal = apply(horizontal);
        } else if atom == atoms.NetWMStateMaximizedVert {
            vertical = apply(vertical);
        } else if let Some(state) = state_for_atom(atom, atoms) {
            let on = apply(states.contains(&state));
            states.retain(|&s| s != state);
            if on {
                states.push(state);
            }
        } else {
            continue;
        }
        understood = true;
    }
    if !understood {
        tracing::debug!("No supported state in _NET_WM_STATE request for {}", client);
        return None;
    }

    adapter.set_maximized(surface, horizontal, vertical);
    states.retain(|&s| s != ClientState::Maximized);
    if surface.maximized_horz && surface.maximized_vert {
        states.push(ClientState::Maximized);
    }
    write_states(surface, &states, atoms);
    Some(states_change(client, states))
}

fn property_notify(
    surface: &mut BridgeSurface,
    client: ClientId,
    atom: AtomId,
    atoms: &XAtom,
    adapter: &impl Backend,
    clients: &ClientRegistry,
) -> Option<BridgeUpdate> {
    let mut change = ClientChange::new(client);
    if atom == atoms.NetWMName || atom == atoms.WMName {
        change.title = Some(title(surface, atoms).unwrap_or_default());
    } else if atom == atoms.WMClass {
        let (instance, class) = class(surface, atoms).unwrap_or_default();
        change.instance = Some(instance);
        change.app_id = Some(class);
    } else if atom == atoms.NetWMPid {
        change.pid = Some(pid(surface, atoms));
    } else if atom == atoms.NetWMWindowType {
        change.window_type = Some(adapter.window_type(surface));
    } else if atom == atoms.NetWMStrutPartial || atom == atoms.NetWMStrut {
        change.strut = Some(strut(surface, atoms));
    } else if atom == atoms.NetWMState {
        let current = clients.get(client)?.states();
        let mut states = net_wm_states(surface, atoms);
        // Not expressed through _NET_WM_STATE.
        if current.contains(&ClientState::Withdrawn) {
            states.push(ClientState::Withdrawn);
        }
        if is_iconic(surface, atoms) && !states.contains(&ClientState::Minimized) {
            states.push(ClientState::Minimized);
        }
        surface.maximized_horz = has_state_atom(surface, atoms, atoms.NetWMStateMaximizedHorz);
        surface.maximized_vert = has_state_atom(surface, atoms, atoms.NetWMStateMaximizedVert);
        change.states = Some(states);
    } else if atom == atoms.WMState {
        let mut states = clients.get(client)?.states().to_vec();
        states.retain(|&s| s != ClientState::Withdrawn && s != ClientState::Minimized);
        match icccm_state(surface, atoms) {
            Some(WITHDRAWN_STATE) => states.push(ClientState::Withdrawn),
            Some(state) if i64::from(state) == ICONIC_STATE => states.push(ClientState::Minimized),
            Some(state) if i64::from(state) == NORMAL_STATE => {}
            _ => return None,
        }
        change.states = Some(states);
    } else {
        tracing::debug!("Cached {} for {}, nothing to import", atoms.get_name(atom), client);
        return None;
    }
    Some(BridgeUpdate::Change(change))
}

fn states_change(client: ClientId, states: Vec<ClientState>) -> BridgeUpdate {
    BridgeUpdate::Change(ClientChange {
        states: Some(states),
        ..ClientChange::new(client)
    })
}

/// `_NET_WM_NAME` wins over `WM_NAME`.
fn title(surface: &BridgeSurface, atoms: &XAtom) -> Option<String> {
    [atoms.NetWMName, atoms.WMName]
        .into_iter()
        .find_map(|atom| surface.property(atom).and_then(RawProperty::as_text))
        .map(str::to_owned)
}

/// Instance and class halves of `WM_CLASS`.
fn class(surface: &BridgeSurface, atoms: &XAtom) -> Option<(String, String)> {
    match surface.property(atoms.WMClass)? {
        RawProperty::Strings(parts) => {
            let instance = parts.first().cloned().unwrap_or_default();
            let class = parts.get(1).cloned().unwrap_or_else(|| instance.clone());
            Some((instance, class))
        }
        RawProperty::Text(class) => Some((class.clone(), class.clone())),
        _ => None,
    }
}

fn pid(surface: &BridgeSurface, atoms: &XAtom) -> Option<u32> {
    surface
        .property(atoms.NetWMPid)
        .and_then(RawProperty::as_cardinals)
        .and_then(<[u32]>::first)
        .copied()
}

/// `_NET_WM_STRUT_PARTIAL` wins over `_NET_WM_STRUT`.
fn strut(surface: &BridgeSurface, atoms: &XAtom) -> Option<Strut> {
    let cardinals = |atom| surface.property(atom).and_then(RawProperty::as_cardinals);
    cardinals(atoms.NetWMStrutPartial)
        .and_then(Strut::from_partial)
        .or_else(|| cardinals(atoms.NetWMStrut).and_then(Strut::from_legacy))
        .filter(|strut| !strut.is_empty())
}

fn icccm_state(surface: &BridgeSurface, atoms: &XAtom) -> Option<u32> {
    surface
        .property(atoms.WMState)
        .and_then(RawProperty::as_cardinals)
        .and_then(<[u32]>::first)
        .copied()
}

fn is_iconic(surface: &BridgeSurface, atoms: &XAtom) -> bool {
    icccm_state(surface, atoms).map(i64::from) == Some(ICONIC_STATE)
}

fn state_for_atom(atom: AtomId, atoms: &XAtom) -> Option<ClientState> {
    let state = match atom {
        a if a == atoms.NetWMStateHidden => ClientState::Minimized,
        a if a == atoms.NetWMStateFullscreen => ClientState::Fullscreen,
        a if a == atoms.NetWMStateSticky => ClientState::Sticky,
        a if a == atoms.NetWMStateAbove => ClientState::Above,
        a if a == atoms.NetWMStateBelow => ClientState::Below,
        a if a == atoms.NetWMStateDemandsAttention => ClientState::DemandsAttention,
        _ => return None,
    };
    Some(state)
}

fn atom_for_state(state: ClientState, atoms: &XAtom) -> Option<AtomId> {
    match state {
        ClientState::Minimized => Some(atoms.NetWMStateHidden),
        ClientState::Fullscreen => Some(atoms.NetWMStateFullscreen),
        ClientState::Sticky => Some(atoms.NetWMStateSticky),
        ClientState::Above => Some(atoms.NetWMStateAbove),
        ClientState::Below => Some(atoms.NetWMStateBelow),
        ClientState::DemandsAttention => Some(atoms.NetWMStateDemandsAttention),
        ClientState::Maximized | ClientState::Withdrawn => None,
    }
}

fn has_state_atom(surface: &BridgeSurface, atoms: &XAtom, wanted: AtomId) -> bool {
    surface
        .property(atoms.NetWMState)
        .and_then(RawProperty::as_atoms)
        .is_some_and(|list| list.contains(&wanted))
}

fn net_wm_states(surface: &BridgeSurface, atoms: &XAtom) -> Vec<ClientState> {
    let Some(list) = surface
        .property(atoms.NetWMState)
        .and_then(RawProperty::as_atoms)
    else {
        return vec![];
    };
    let mut states: Vec<ClientState> = list
        .iter()
        .filter_map(|&atom| state_for_atom(atom, atoms))
        .collect();
    if list.contains(&atoms.NetWMStateMaximizedHorz) && list.contains(&atoms.NetWMStateMaximizedVert)
    {
        states.push(ClientState::Maximized);
    }
    states
}

/// Mirrors the model's states back into the cached `_NET_WM_STATE`.
fn write_states(surface: &mut BridgeSurface, states: &[ClientState], atoms: &XAtom) {
    let mut list: Vec<AtomId> = states
        .iter()
        .filter_map(|&state| atom_for_state(state, atoms))
        .collect();
    if surface.maximized_horz {
        list.push(atoms.NetWMStateMaximizedHorz);
    }
    if surface.maximized_vert {
        list.push(atoms.NetWMStateMaximizedVert);
    }
    list.sort_unstable();
    list.dedup();
    surface.set_property(atoms.NetWMState, RawProperty::Atoms(list));
}
