//! Keeps the tree and the host's file explorer pointing at the same thing.
//!
//! The controller turns file selections into [`RevealAction`] values: expand
//! the ancestor chain, select the node. Whether implicit selections follow
//! the explorer is a per-call [`LinkState`] derived from settings at
//! operation start; explicit reveal requests are honored either way.

use std::path::Path;

use arbor_model::{ModelError, NodeKey, TreeModel};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Linked,
    Unlinked,
}

impl LinkState {
    /// Derive the state from the `sync_with_explorer` setting.
    pub fn from_setting(sync_with_explorer: bool) -> Self {
        if sync_with_explorer {
            LinkState::Linked
        } else {
            LinkState::Unlinked
        }
    }
}

/// What a host should do to bring a node into view. Applying one touches
/// only expansion flags and the active selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevealAction {
    /// Ancestors to expand, outermost first.
    pub expand: Vec<NodeKey>,
    pub select: NodeKey,
}

pub struct SyncController {
    model: TreeModel,
}

impl SyncController {
    pub fn new(model: TreeModel) -> Self {
        Self { model }
    }

    /// The explorer selection moved. Produces a reveal only in
    /// [`LinkState::Linked`]; unresolvable paths produce nothing and leave
    /// the selection alone.
    pub async fn on_file_selection(
        &self,
        path: &Path,
        link: LinkState,
    ) -> Result<Option<RevealAction>, ModelError> {
        if link == LinkState::Unlinked {
            tracing::debug!(
                target: "arbor.sync",
                path = %path.display(),
                "ignoring selection while unlinked"
            );
            return Ok(None);
        }
        self.reveal_for(path).await
    }

    /// An explicit reveal command; works regardless of link state.
    pub async fn on_reveal_request(&self, path: &Path) -> Result<Option<RevealAction>, ModelError> {
        self.reveal_for(path).await
    }

    /// Apply a reveal to the model. Returns `false` when the selected node
    /// vanished between resolution and application.
    pub fn apply(&self, action: &RevealAction) -> bool {
        for key in &action.expand {
            self.model.set_expanded(key, true);
        }
        self.model.select(Some(action.select.clone()))
    }

    async fn reveal_for(&self, path: &Path) -> Result<Option<RevealAction>, ModelError> {
        let Some(select) = self.model.find_node_for_path(path).await? else {
            tracing::debug!(
                target: "arbor.sync",
                path = %path.display(),
                "path resolves to no tree node"
            );
            return Ok(None);
        };
        let expand = self.model.ancestors(&select);
        Ok(Some(RevealAction { expand, select }))
    }
}
