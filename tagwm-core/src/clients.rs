//! Owner of every client record and of the global stacking order.
use crate::errors::{CoreError, Result};
use crate::models::{
    Client, ClientChange, ClientId, ClientState, OutputId, ProtocolOrigin, TagRef, WindowType,
};
use crate::scheduler::Scheduler;
use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Debug)]
pub struct ClientRegistry {
    clients: HashMap<ClientId, Client>,
    /// Back to front.
    stacking: Vec<ClientId>,
    next_id: u64,
    retired: HashSet<ClientId>,
    scheduler: Scheduler,
}

impl ClientRegistry {
    #[must_use]
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            clients: HashMap::new(),
            stacking: vec![],
            next_id: 1,
            retired: HashSet::new(),
            scheduler,
        }
    }

    /// Allocates a record for a freshly mapped surface and puts it on top of
    /// the stack. Ids are never handed out twice.
    pub fn create(&mut self, origin: ProtocolOrigin) -> ClientId {
        let id = ClientId(self.next_id);
        self.next_id += 1;
        let mut client = Client::new(id, origin);
        client.stacking_position = self.stacking.len();
        self.clients.insert(id, client);
        self.stacking.push(id);
        tracing::trace!("Created {} ({:?})", id, origin);
        self.scheduler.mark_dirty();
        id
    }

    /// Frees the record of `id`.
    ///
    /// Returns `Ok(false)` when `id` was already destroyed.
    ///
    /// # Errors
    ///
    /// `NotFound` if `id` was never issued by this registry.
    pub fn destroy(&mut self, id: ClientId) -> Result<bool> {
        if self.clients.remove(&id).is_none() {
            if self.retired.contains(&id) {
                tracing::debug!("{} destroyed twice, ignoring", id);
                return Ok(false);
            }
            return Err(CoreError::NotFound(id));
        }
        self.retired.insert(id);
        self.stacking.retain(|&other| other != id);
        self.reindex();
        self.scheduler.mark_dirty();
        Ok(true)
    }

    #[must_use]
    pub fn get(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(&id)
    }

    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client.
    pub fn client(&self, id: ClientId) -> Result<&Client> {
        self.get(id).ok_or(CoreError::NotFound(id))
    }

    #[must_use]
    pub fn contains(&self, id: ClientId) -> bool {
        self.clients.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Live clients, back to front.
    pub fn iter(&self) -> impl Iterator<Item = &Client> {
        self.stacking.iter().filter_map(|id| self.clients.get(id))
    }

    /// Live client ids, back to front.
    #[must_use]
    pub fn stacking(&self) -> &[ClientId] {
        &self.stacking
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Client> {
        self.clients.values_mut()
    }

    /// Applies a partial update, marking the scheduler dirty once if
    /// anything changed.
    ///
    /// # Errors
    ///
    /// `NotFound` if the change targets an unknown client.
    pub fn apply(&mut self, change: ClientChange) -> Result<bool> {
        let id = change.id;
        let client = self.clients.get_mut(&id).ok_or(CoreError::NotFound(id))?;
        let changed = change.update(client);
        if changed {
            self.scheduler.mark_dirty();
        }
        Ok(changed)
    }

    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client.
    pub fn set_title(&mut self, id: ClientId, title: &str) -> Result<bool> {
        self.apply(ClientChange {
            title: Some(title.to_owned()),
            ..ClientChange::new(id)
        })
    }

    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client.
    pub fn set_app_id(&mut self, id: ClientId, app_id: &str) -> Result<bool> {
        self.apply(ClientChange {
            app_id: Some(app_id.to_owned()),
            ..ClientChange::new(id)
        })
    }

    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client.
    pub fn set_window_type(&mut self, id: ClientId, window_type: WindowType) -> Result<bool> {
        self.apply(ClientChange {
            window_type: Some(window_type),
            ..ClientChange::new(id)
        })
    }

    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client.
    pub fn set_tags(&mut self, id: ClientId, tags: BTreeSet<TagRef>) -> Result<bool> {
        self.apply(ClientChange {
            tags: Some(tags),
            ..ClientChange::new(id)
        })
    }

    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client.
    pub fn set_output(&mut self, id: ClientId, output: Option<OutputId>) -> Result<bool> {
        self.apply(ClientChange {
            output: Some(output),
            ..ClientChange::new(id)
        })
    }

    /// Adds (`on`) or removes a single state.
    ///
    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client.
    pub fn set_state(&mut self, id: ClientId, state: ClientState, on: bool) -> Result<bool> {
        let client = self.client(id)?;
        if client.has_state(state) == on {
            return Ok(false);
        }
        let mut states = client.states().to_vec();
        if on {
            states.push(state);
        } else {
            states.retain(|&s| s != state);
        }
        self.apply(ClientChange {
            states: Some(states),
            ..ClientChange::new(id)
        })
    }

    /// Moves `id` to the front of the stack.
    ///
    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client.
    pub fn raise(&mut self, id: ClientId) -> Result<()> {
        let index = self.stack_index(id)?;
        if index + 1 != self.stacking.len() {
            let id = self.stacking.remove(index);
            self.stacking.push(id);
            self.restacked();
        }
        Ok(())
    }

    /// Moves `id` to the back of the stack.
    ///
    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client.
    pub fn lower(&mut self, id: ClientId) -> Result<()> {
        let index = self.stack_index(id)?;
        if index != 0 {
            let id = self.stacking.remove(index);
            self.stacking.insert(0, id);
            self.restacked();
        }
        Ok(())
    }

    /// Replaces the stacking order with `order` (back to front). Clients left
    /// out of `order` keep their relative order below the listed ones.
    ///
    /// # Errors
    ///
    /// `NotFound` for the first id in `order` that is not a live client; the
    /// stack is left untouched in that case.
    pub fn restack(&mut self, order: &[ClientId]) -> Result<()> {
        if let Some(&missing) = order.iter().find(|id| !self.clients.contains_key(id)) {
            return Err(CoreError::NotFound(missing));
        }
        let mut listed: Vec<ClientId> = Vec::with_capacity(order.len());
        for &id in order {
            if !listed.contains(&id) {
                listed.push(id);
            }
        }
        let mut stacking: Vec<ClientId> = self
            .stacking
            .iter()
            .copied()
            .filter(|id| !listed.contains(id))
            .collect();
        stacking.extend(listed);
        if stacking != self.stacking {
            self.stacking = stacking;
            self.restacked();
        }
        Ok(())
    }

    fn stack_index(&self, id: ClientId) -> Result<usize> {
        self.stacking
            .iter()
            .position(|&other| other == id)
            .ok_or(CoreError::NotFound(id))
    }

    fn restacked(&mut self) {
        self.reindex();
        self.scheduler.mark_dirty();
    }

    fn reindex(&mut self) {
        for (position, id) in self.stacking.iter().enumerate() {
            if let Some(client) = self.clients.get_mut(id) {
                client.stacking_position = position;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(count: usize) -> (ClientRegistry, Vec<ClientId>) {
        let mut registry = ClientRegistry::new(Scheduler::new());
        let ids = (0..count)
            .map(|_| registry.create(ProtocolOrigin::Native))
            .collect();
        (registry, ids)
    }

    fn positions(registry: &ClientRegistry) -> Vec<usize> {
        registry.iter().map(Client::stacking_position).collect()
    }

    #[test]
    fn ids_are_never_reused() {
        let (mut registry, ids) = registry_with(2);
        registry.destroy(ids[1]).unwrap();
        let next = registry.create(ProtocolOrigin::Bridged);
        assert_ne!(next, ids[1]);
        assert_eq!(next, ClientId(3));
    }

    #[test]
    fn destroying_twice_is_a_no_op() {
        let (mut registry, ids) = registry_with(1);
        assert!(registry.destroy(ids[0]).unwrap());
        assert!(!registry.destroy(ids[0]).unwrap());
    }

    #[test]
    fn destroying_an_unknown_id_fails() {
        let (mut registry, _) = registry_with(1);
        assert!(matches!(
            registry.destroy(ClientId(42)),
            Err(CoreError::NotFound(ClientId(42)))
        ));
    }

    #[test]
    fn destroy_keeps_stacking_positions_dense() {
        let (mut registry, ids) = registry_with(3);
        registry.destroy(ids[1]).unwrap();
        assert_eq!(registry.stacking(), &[ids[0], ids[2]]);
        assert_eq!(positions(&registry), vec![0, 1]);
    }

    #[test]
    fn raise_and_lower_move_to_the_ends() {
        let (mut registry, ids) = registry_with(3);
        registry.raise(ids[0]).unwrap();
        assert_eq!(registry.stacking(), &[ids[1], ids[2], ids[0]]);
        registry.lower(ids[2]).unwrap();
        assert_eq!(registry.stacking(), &[ids[2], ids[1], ids[0]]);
        assert_eq!(positions(&registry), vec![0, 1, 2]);
        assert_eq!(registry.client(ids[0]).unwrap().stacking_position(), 2);
    }

    #[test]
    fn restack_puts_unlisted_clients_at_the_back() {
        let (mut registry, ids) = registry_with(4);
        registry.restack(&[ids[3], ids[0]]).unwrap();
        assert_eq!(registry.stacking(), &[ids[1], ids[2], ids[3], ids[0]]);
    }

    #[test]
    fn restack_with_an_unknown_id_changes_nothing() {
        let (mut registry, ids) = registry_with(2);
        let before = registry.stacking().to_vec();
        assert!(registry.restack(&[ids[1], ClientId(99)]).is_err());
        assert_eq!(registry.stacking(), before.as_slice());
    }

    #[test]
    fn unchanged_values_do_not_mark_dirty() {
        let scheduler = Scheduler::new();
        let mut registry = ClientRegistry::new(scheduler.clone());
        let id = registry.create(ProtocolOrigin::Native);
        registry.set_title(id, "vim").unwrap();
        let marks = scheduler.mark_requests();
        assert!(!registry.set_title(id, "vim").unwrap());
        assert!(!registry.set_state(id, ClientState::Minimized, false).unwrap());
        registry.raise(id).unwrap();
        assert_eq!(scheduler.mark_requests(), marks);
    }

    #[test]
    fn set_state_toggles_a_single_state() {
        let (mut registry, ids) = registry_with(1);
        registry.set_state(ids[0], ClientState::Sticky, true).unwrap();
        registry.set_state(ids[0], ClientState::Minimized, true).unwrap();
        registry.set_state(ids[0], ClientState::Sticky, false).unwrap();
        assert_eq!(
            registry.client(ids[0]).unwrap().states(),
            &[ClientState::Minimized]
        );
    }
}
