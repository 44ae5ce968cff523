use crate::clients::ClientRegistry;
use crate::external::Dispatch;
use crate::models::ClientId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NativeEventKind {
    Title,
    AppId,
}

impl NativeEventKind {
    pub const ALL: [Self; 2] = [Self::Title, Self::AppId];
}

/// A change announced by a native toplevel.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum NativeEvent {
    TitleChanged { client: ClientId, title: String },
    AppIdChanged { client: ClientId, app_id: String },
}

impl NativeEvent {
    #[must_use]
    pub const fn client(&self) -> ClientId {
        match self {
            Self::TitleChanged { client, .. } | Self::AppIdChanged { client, .. } => *client,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> NativeEventKind {
        match self {
            Self::TitleChanged { .. } => NativeEventKind::Title,
            Self::AppIdChanged { .. } => NativeEventKind::AppId,
        }
    }
}

/// Identifies one live listener subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(u64);

/// Keeps at most one subscription per client and event kind.
#[derive(Debug, Default)]
pub struct NativeImporter {
    subscriptions: HashMap<(ClientId, NativeEventKind), ListenerToken>,
    next_token: u64,
}

impl NativeImporter {
    /// Subscribes to title and app id changes of `client`. Attaching twice
    /// keeps the existing subscriptions.
    pub fn attach(&mut self, client: ClientId) {
        for kind in NativeEventKind::ALL {
            let next_token = &mut self.next_token;
            self.subscriptions.entry((client, kind)).or_insert_with(|| {
                *next_token += 1;
                ListenerToken(*next_token)
            });
        }
    }

    /// Releases every subscription of `client`, returning how many were live.
    pub fn detach(&mut self, client: ClientId) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|(owner, _), _| *owner != client);
        before - self.subscriptions.len()
    }

    #[must_use]
    pub fn is_attached(&self, client: ClientId, kind: NativeEventKind) -> bool {
        self.subscriptions.contains_key(&(client, kind))
    }

    #[must_use]
    pub fn token(&self, client: ClientId, kind: NativeEventKind) -> Option<ListenerToken> {
        self.subscriptions.get(&(client, kind)).copied()
    }

    /// Copies the announced value onto the client.
    pub fn handle(&self, event: NativeEvent, clients: &mut ClientRegistry) -> Dispatch {
        let client = event.client();
        if !self.is_attached(client, event.kind()) {
            tracing::trace!("No {:?} listener for {}, dropping event", event.kind(), client);
            return Dispatch::Unhandled;
        }
        let result = match &event {
            NativeEvent::TitleChanged { title, .. } => clients.set_title(client, title),
            NativeEvent::AppIdChanged { app_id, .. } => clients.set_app_id(client, app_id),
        };
        match result {
            Ok(_) => Dispatch::Handled,
            Err(err) => {
                tracing::warn!("Listener fired for a client that is gone: {}", err);
                Dispatch::Unhandled
            }
        }
    }
}
