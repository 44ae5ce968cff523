//! The refresh pass: recompute which clients are shown ("banned" clients
//! are the hidden ones) from the tags the layout reports as active.
use crate::clients::ClientRegistry;
use crate::external::{LayoutSubsystem, SceneSink};
use crate::models::{ClientId, OutputId, TagRef};
use std::collections::{BTreeMap, BTreeSet};

/// Active tags of every known output, sampled once per pass.
pub(crate) fn active_tags(layout: &dyn LayoutSubsystem) -> BTreeMap<OutputId, BTreeSet<TagRef>> {
    layout
        .outputs()
        .into_iter()
        .map(|output| (output.id, layout.active_tags(output.id)))
        .collect()
}

/// Recomputes `visible` for every live client and forwards each change to
/// the scene. Returns the clients whose visibility flipped, in stacking order.
pub(crate) fn recompute(
    clients: &mut ClientRegistry,
    layout: &dyn LayoutSubsystem,
    scene: &mut dyn SceneSink,
) -> Vec<ClientId> {
    let active = active_tags(layout);
    let mut flipped = vec![];
    for client in clients.iter_mut() {
        let visible = client.wants_visible(&active);
        if client.visible != visible {
            client.visible = visible;
            flipped.push((client.stacking_position, client.id));
        }
    }
    flipped.sort_unstable();
    flipped
        .into_iter()
        .map(|(_, id)| {
            let visible = clients.get(id).is_some_and(|c| c.visible());
            tracing::trace!("{} is now {}", id, if visible { "shown" } else { "hidden" });
            scene.set_scene_visibility(id, visible);
            id
        })
        .collect()
}
