//! Ownership relationship discovery.
//!
//! Owners come from `filter[owns]=<lei>` and children from
//! `filter[ownedBy]=<lei>`. The ultimate parent is found by walking the owner
//! chain upward from the direct parent until it ends, loops, or hits the
//! configured depth.

use crate::transport::query;
use crate::validator::RecordValidator;
use crate::wire;
use leiscope_core::{LookupFailure, RegistryConfig, RelationshipSet};
use std::collections::HashSet;

/// Resolves the parents and direct children of an entity.
#[derive(Clone)]
pub struct RelationshipResolver {
    validator: RecordValidator,
    child_cap: usize,
    max_parent_depth: usize,
}

impl RelationshipResolver {
    /// Create a resolver sharing `validator`'s transport and quota.
    #[must_use]
    pub fn new(validator: RecordValidator, config: &RegistryConfig) -> Self {
        Self {
            validator,
            child_cap: config.relationship_child_cap,
            max_parent_depth: config.max_parent_depth,
        }
    }

    /// Relationship set of `lei`.
    ///
    /// Returns an empty set, without further requests, when `lei` itself does
    /// not validate. Parents and children that fail to validate are left out.
    pub async fn resolve(&self, lei: &str) -> RelationshipSet {
        let subject = self.validator.validate(lei).await;
        if !subject.valid {
            tracing::info!(lei, status = %subject.status, "Skipping relationships of invalid LEI");
            return RelationshipSet::default();
        }
        let subject_lei = subject.lei;

        let (owners, children) = tokio::join!(
            self.owners_of(&subject_lei),
            self.children_of(&subject_lei)
        );

        let mut set = RelationshipSet::default();

        if let Some(parent_lei) = owners.into_iter().next() {
            let parent = self.validator.validate(&parent_lei).await;
            if parent.valid {
                let top = self.walk_to_top(&subject_lei, &parent_lei).await;
                set.ultimate_parent = if top == parent_lei {
                    Some(parent.clone())
                } else {
                    let ultimate = self.validator.validate(&top).await;
                    ultimate.valid.then_some(ultimate)
                };
                set.direct_parent = Some(parent);
            } else {
                tracing::debug!(lei = %parent_lei, "Omitting direct parent that failed validation");
            }
        }

        for child_lei in children.into_iter().take(self.child_cap) {
            let child = self.validator.validate(&child_lei).await;
            if child.valid {
                set.direct_children.push(child);
            } else {
                tracing::debug!(lei = %child_lei, status = %child.status, "Omitting child that failed validation");
            }
        }

        tracing::info!(
            lei = %subject_lei,
            direct_parent = set.direct_parent.is_some(),
            ultimate_parent = set.ultimate_parent.is_some(),
            children = set.direct_children.len(),
            "Resolved relationships"
        );
        set
    }

    /// Follow owners upward from `start`; returns the last identifier reached.
    async fn walk_to_top(&self, subject: &str, start: &str) -> String {
        let mut visited: HashSet<String> = [subject.to_string(), start.to_string()].into();
        let mut current = start.to_string();

        for _ in 0..self.max_parent_depth {
            match self.owners_of(&current).await.into_iter().next() {
                None => return current,
                Some(next) if visited.contains(&next) => {
                    tracing::warn!(lei = %current, owner = %next, "Ownership cycle detected");
                    return current;
                }
                Some(next) => {
                    visited.insert(next.clone());
                    current = next;
                }
            }
        }

        tracing::debug!(
            lei = %current,
            depth = self.max_parent_depth,
            "Stopped ultimate parent walk at depth limit"
        );
        current
    }

    /// Identifiers of the entities that own `lei`.
    async fn owners_of(&self, lei: &str) -> Vec<String> {
        self.related("filter[owns]", lei, None).await
    }

    /// Identifiers of the entities `lei` owns, at most the child cap.
    async fn children_of(&self, lei: &str) -> Vec<String> {
        self.related("filter[ownedBy]", lei, Some(self.child_cap))
            .await
    }

    async fn related(&self, filter: &str, lei: &str, page_size: Option<usize>) -> Vec<String> {
        match self.try_related(filter, lei, page_size).await {
            Ok(leis) => leis,
            Err(failure) => {
                tracing::warn!(filter, lei, error = %failure, "Relationship query failed");
                Vec::new()
            }
        }
    }

    async fn try_related(
        &self,
        filter: &str,
        lei: &str,
        page_size: Option<usize>,
    ) -> Result<Vec<String>, LookupFailure> {
        let mut params = query([(filter, lei)]);
        if let Some(size) = page_size {
            params.push(("page[size]".to_string(), size.to_string()));
        }

        let Some(body) = self
            .validator
            .request("/lei-records", &params)
            .await
            .into_optional_body()?
        else {
            return Ok(Vec::new());
        };

        Ok(wire::parse_record_page(body)?
            .records
            .into_iter()
            .map(|record| record.lei)
            .filter(|related| related != lei)
            .collect())
    }
}
