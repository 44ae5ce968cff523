//! Screen edges reserved by panels and docks, aggregated per output.
use crate::clients::ClientRegistry;
use crate::errors::{CoreError, Result};
use crate::models::{Client, ClientChange, ClientId, Margins, Output, OutputId, Strut, Xyhw};
use crate::scheduler::Scheduler;
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct StrutRegistry {
    outputs: BTreeMap<OutputId, Output>,
    contributions: BTreeMap<ClientId, (Option<OutputId>, Strut)>,
    aggregates: BTreeMap<OutputId, Margins>,
    scheduler: Scheduler,
}

impl StrutRegistry {
    #[must_use]
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            outputs: BTreeMap::new(),
            contributions: BTreeMap::new(),
            aggregates: BTreeMap::new(),
            scheduler,
        }
    }

    /// Registers or replaces an output.
    pub fn add_output(&mut self, output: Output) {
        tracing::debug!("Adding {} ({}) at {:?}", output.id, output.name, output.bbox);
        self.outputs.insert(output.id, output);
        self.recompute();
        self.scheduler.mark_dirty();
    }

    /// # Errors
    ///
    /// `UnknownOutput` if `id` was never added.
    pub fn remove_output(&mut self, id: OutputId) -> Result<Output> {
        let output = self.outputs.remove(&id).ok_or(CoreError::UnknownOutput(id))?;
        self.aggregates.remove(&id);
        self.scheduler.mark_dirty();
        Ok(output)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Output> {
        self.outputs.values()
    }

    /// Replaces the reservation made by `id` and returns the new usable area
    /// of every output whose aggregate changed.
    ///
    /// # Errors
    ///
    /// `NotFound` if `id` is not a live client.
    pub fn set_strut(
        &mut self,
        clients: &mut ClientRegistry,
        id: ClientId,
        strut: Option<Strut>,
    ) -> Result<Vec<(OutputId, Xyhw)>> {
        clients.apply(ClientChange {
            strut: Some(strut),
            ..ClientChange::new(id)
        })?;
        Ok(self.track(clients.client(id)?))
    }

    /// Picks up the current strut and output of `client`.
    pub(crate) fn track(&mut self, client: &Client) -> Vec<(OutputId, Xyhw)> {
        match client.strut().filter(|strut| !strut.is_empty()) {
            Some(strut) => {
                self.contributions
                    .insert(client.id(), (client.output(), strut));
            }
            None => {
                self.contributions.remove(&client.id());
            }
        }
        self.recompute()
    }

    /// Drops the reservation of a client that went away.
    pub fn remove_client(&mut self, id: ClientId) -> Vec<(OutputId, Xyhw)> {
        if self.contributions.remove(&id).is_none() {
            return vec![];
        }
        let changed = self.recompute();
        if !changed.is_empty() {
            self.scheduler.mark_dirty();
        }
        changed
    }

    /// Rebuilds every aggregate, returning the outputs that changed.
    pub fn recompute(&mut self) -> Vec<(OutputId, Xyhw)> {
        let mut changed = vec![];
        for (&id, output) in &self.outputs {
            let mut margins = Margins::default();
            for (pinned, strut) in self.contributions.values() {
                if pinned.map_or(true, |pinned| pinned == id) {
                    margins.absorb(strut, &output.bbox);
                }
            }
            if self.aggregates.insert(id, margins) != Some(margins) {
                changed.push((id, output.bbox.shrink(margins)));
            }
        }
        changed
    }

    /// # Errors
    ///
    /// `UnknownOutput` if `output` was never added.
    pub fn margins(&self, output: OutputId) -> Result<Margins> {
        self.aggregates
            .get(&output)
            .copied()
            .ok_or(CoreError::UnknownOutput(output))
    }

    /// The output geometry minus every reserved edge.
    ///
    /// # Errors
    ///
    /// `UnknownOutput` if `output` was never added.
    pub fn usable_area(&self, output: OutputId) -> Result<Xyhw> {
        let bbox = self
            .outputs
            .get(&output)
            .ok_or(CoreError::UnknownOutput(output))?
            .bbox;
        Ok(bbox.shrink(self.margins(output)?))
    }

    /// The output containing the centre of `area`.
    #[must_use]
    pub fn output_at(&self, area: &Xyhw) -> Option<OutputId> {
        let x = area.x() + area.w() / 2;
        let y = area.y() + area.h() / 2;
        self.outputs
            .values()
            .find(|output| output.bbox.contains_point(x, y))
            .map(|output| output.id)
    }
}
