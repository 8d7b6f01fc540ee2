//! In-memory link graph

use crate::{read, write, LinkGraph};
use caseflow_core::{
    CaseId, CaseflowResult, Link, LinkRef, RecordType, StorageError, ValidationError,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct GraphState {
    next_id: u64,
    /// Each link stored once, keyed by insertion order.
    links: BTreeMap<u64, Link>,
    /// Both endpoints index the same link id.
    adjacency: HashMap<CaseId, BTreeSet<u64>>,
}

/// Link graph held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLinkGraph {
    state: Arc<RwLock<GraphState>>,
}

impl InMemoryLinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link_count(&self) -> CaseflowResult<usize> {
        Ok(read(&self.state)?.links.len())
    }
}

impl GraphState {
    fn ids_between(&self, a: &CaseId, b: &CaseId) -> Vec<u64> {
        self.adjacency
            .get(a)
            .into_iter()
            .flatten()
            .filter(|id| self.links.get(id).is_some_and(|link| link.joins(a, b)))
            .copied()
            .collect()
    }
}

impl LinkGraph for InMemoryLinkGraph {
    fn link(&self, link: Link) -> CaseflowResult<bool> {
        if link.from_id == link.to_id {
            return Err(ValidationError::invalid(
                "link",
                format!("{} cannot be linked to itself", link.from_id),
            )
            .into());
        }

        let mut state = write(&self.state)?;
        let duplicate = state
            .ids_between(&link.from_id, &link.to_id)
            .iter()
            .any(|id| state.links.get(id).is_some_and(|l| l.relation == link.relation));
        if duplicate {
            return Ok(false);
        }

        let id = state.next_id;
        state.next_id += 1;
        state
            .adjacency
            .entry(link.from_id.clone())
            .or_default()
            .insert(id);
        state
            .adjacency
            .entry(link.to_id.clone())
            .or_default()
            .insert(id);
        state.links.insert(id, link);
        Ok(true)
    }

    fn unlink(&self, a: &CaseId, b: &CaseId) -> CaseflowResult<Vec<Link>> {
        let mut state = write(&self.state)?;
        let ids = state.ids_between(a, b);
        if ids.is_empty() {
            return Err(StorageError::NotFound {
                record_type: RecordType::Link,
                id: format!("{} <-> {}", a, b),
            }
            .into());
        }

        let mut removed = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(link) = state.links.remove(&id) {
                for endpoint in [&link.from_id, &link.to_id] {
                    if let Some(set) = state.adjacency.get_mut(endpoint) {
                        set.remove(&id);
                    }
                }
                removed.push(link);
            }
        }
        Ok(removed)
    }

    fn links_of(&self, id: &CaseId) -> CaseflowResult<Vec<LinkRef>> {
        let state = read(&self.state)?;
        Ok(state
            .adjacency
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|link_id| state.links.get(link_id))
            .filter_map(|link| link.view_from(id))
            .collect())
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use caseflow_core::{CaseKind, Relation};
    use proptest::prelude::*;

    fn arb_endpoint() -> impl Strategy<Value = CaseId> {
        (0usize..5, 1u32..4).prop_map(|(k, seq)| CaseId::new(CaseKind::ALL[k], 2025, seq, 4))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// If A links to B, B sees A.
        #[test]
        fn prop_links_are_symmetric(pairs in prop::collection::vec((arb_endpoint(), arb_endpoint()), 1..20)) {
            let graph = InMemoryLinkGraph::new();
            for (a, b) in &pairs {
                if a != b {
                    graph.link(Link::new(a.clone(), b.clone(), Relation::Related)).unwrap();
                }
            }
            for (a, b) in pairs.iter().filter(|(a, b)| a != b) {
                let from_a = graph.links_of(a).unwrap();
                let from_b = graph.links_of(b).unwrap();
                prop_assert!(from_a.iter().any(|r| &r.other_id == b));
                prop_assert!(from_b.iter().any(|r| &r.other_id == a));
                // never more than one Related link per pair
                prop_assert_eq!(from_a.iter().filter(|r| &r.other_id == b).count(), 1);
            }
        }
    }
}
