//! Data-fetching boundary.
//!
//! Work items and edges come from a [`WorkItemSource`]: either the GraphQL
//! backend ([`graphql::GraphqlClient`]) or a JSON file on disk
//! ([`snapshot::SnapshotSource`]). [`poll::Poller`] layers periodic refresh
//! with backoff on top of any source.

pub mod graphql;
pub mod poll;
pub mod snapshot;

use serde::Serialize;

use crate::Result;
use crate::models::{Dataset, WorkItem};

pub use graphql::GraphqlClient;
pub use poll::{PollState, Poller};
pub use snapshot::SnapshotSource;

/// Which graph and team a fetch is limited to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Scope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}

impl Scope {
    pub fn new(graph: Option<String>, team: Option<String>) -> Self {
        Self { graph, team }
    }

    /// Polling only runs while a graph is selected.
    pub fn is_pollable(&self) -> bool {
        self.graph.is_some()
    }

    /// Returns true if `item` belongs to this scope. Items that do not say
    /// which graph or team they belong to are admitted.
    pub fn admits(&self, item: &WorkItem) -> bool {
        let graph_ok = match (&self.graph, &item.graph) {
            (Some(want), Some(have)) => &have.id == want,
            _ => true,
        };
        let team_ok = match (&self.team, &item.team) {
            (Some(want), Some(have)) => &have.id == want,
            _ => true,
        };
        graph_ok && team_ok
    }
}

/// Anything that can produce a dataset.
pub trait WorkItemSource: Send + Sync {
    /// Fetch the current work items and edges for `scope`.
    fn fetch(&self, scope: &Scope) -> Result<Dataset>;

    /// Short description for logs, e.g. the endpoint URL or file path.
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScopeRef;

    #[test]
    fn test_scope_admits() {
        let mut item = WorkItem::new("wi-1", "Scoped");
        let scope = Scope::new(Some("g1".to_string()), None);
        assert!(scope.admits(&item));

        item.graph = Some(ScopeRef {
            id: "g1".to_string(),
            name: None,
        });
        assert!(scope.admits(&item));

        item.graph = Some(ScopeRef {
            id: "g2".to_string(),
            name: None,
        });
        assert!(!scope.admits(&item));
        assert!(Scope::default().admits(&item));
    }

    #[test]
    fn test_scope_is_pollable_with_graph() {
        assert!(!Scope::default().is_pollable());
        assert!(!Scope::new(None, Some("t".to_string())).is_pollable());
        assert!(Scope::new(Some("g".to_string()), None).is_pollable());
    }
}
