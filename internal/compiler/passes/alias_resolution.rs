// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

//! Resolve the aliases of a component.
//!
//! Aliases can refer to other aliases, declared in any order. All the pending objects are
//! retried until either all aliases are resolved, or a whole pass did not resolve anything,
//! in which case there is a cycle.

use super::alias_cache::AliasCacheCreator;
use super::component_and_alias_resolver::ComponentAndAliasResolver;
use crate::diagnostics::Diagnostic;
use crate::object_tree::{AliasKind, AliasTarget, ObjectIndex, ResolvedAlias};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum AliasResolutionResult {
    NoAliasResolved,
    SomeAliasesResolved,
    AllAliasesResolved,
}

/// The alias refers to an alias of another object that is not resolved yet
struct TryLater;

impl ComponentAndAliasResolver<'_> {
    /// Returns the number of passes that were needed
    pub(super) fn resolve_aliases(&mut self, component: ObjectIndex) -> Result<usize, Diagnostic> {
        let mut pending = std::mem::take(&mut self.scope.objects_with_aliases);
        let mut pass = 0;
        while !pending.is_empty() {
            pass += 1;
            let mut progress = false;
            let mut still_pending = Vec::new();
            for object_index in pending {
                match self.resolve_aliases_in_object(object_index)? {
                    AliasResolutionResult::AllAliasesResolved => {
                        AliasCacheCreator::new(self.doc, self.caches, self.register)
                            .append_aliases_to_property_cache(object_index)?;
                        progress = true;
                    }
                    AliasResolutionResult::SomeAliasesResolved => {
                        progress = true;
                        still_pending.push(object_index);
                    }
                    AliasResolutionResult::NoAliasResolved => still_pending.push(object_index),
                }
            }
            log::trace!(
                "alias pass {pass} of component {component}: {} objects still pending",
                still_pending.len()
            );
            pending = still_pending;

            if !progress {
                let obj = &self.doc.objects[pending[0]];
                if let Some(alias) = obj.aliases.iter().find(|a| !a.is_resolved()) {
                    return Err(Diagnostic::error(
                        "Circular alias reference detected",
                        self.doc.source_location(alias.location),
                    ));
                }
                break;
            }
        }
        Ok(pass)
    }

    /// Try to resolve the aliases of one object that are not resolved yet, in declaration order
    pub(super) fn resolve_aliases_in_object(
        &mut self,
        object_index: ObjectIndex,
    ) -> Result<AliasResolutionResult, Diagnostic> {
        let mut resolved_count = 0;
        for alias_index in 0..self.doc.objects[object_index].aliases.len() {
            if self.doc.objects[object_index].aliases[alias_index].is_resolved() {
                continue;
            }
            match self.resolve_alias(object_index, alias_index)? {
                Ok(resolved) => {
                    self.doc.objects[object_index].aliases[alias_index].target =
                        AliasTarget::Resolved(resolved);
                    resolved_count += 1;
                }
                Err(TryLater) => break,
            }
        }

        let aliases = &self.doc.objects[object_index].aliases;
        Ok(if aliases.iter().all(|a| a.is_resolved()) {
            AliasResolutionResult::AllAliasesResolved
        } else if resolved_count > 0 {
            AliasResolutionResult::SomeAliasesResolved
        } else {
            AliasResolutionResult::NoAliasResolved
        })
    }

    fn resolve_alias(
        &self,
        object_index: ObjectIndex,
        alias_index: usize,
    ) -> Result<Result<ResolvedAlias, TryLater>, Diagnostic> {
        let alias = &self.doc.objects[object_index].aliases[alias_index];
        let error = |message: String| {
            Err(Diagnostic::error(message, self.doc.source_location(alias.reference_location)))
        };

        let id = alias.id_name();
        let Some(named) = self.scope.id_to_object.get(id) else {
            return error(format!("Invalid alias reference. Unable to find id \"{id}\""));
        };
        let target_object = named.index;
        let target_id = named.id_number;
        let resolved = |kind| Ok(Ok(ResolvedAlias { target_object, target_id, kind }));

        let (property, sub_property) = alias.property_path();
        if property.is_empty() {
            return resolved(AliasKind::PointerObject);
        }

        let Some(target_cache) = self.caches[target_object].as_deref() else {
            return error(format!("Invalid alias target location: {property}"));
        };
        let target = &self.doc.objects[target_object];
        // An alias of the target shadows the property of its type with the same name,
        // even before the alias was appended to the cache
        if let Some(local) = target.alias_position(property)
            && !target_cache.has_alias(property)
        {
            return if target_object == object_index {
                resolved(AliasKind::LocalAlias { alias_index: local })
            } else {
                Ok(Err(TryLater))
            };
        }
        let Some(target_property) = target_cache.property(property) else {
            return error(format!("Invalid alias target location: {property}"));
        };
        let core_index = target_property.core_index;

        let Some(sub_property) = sub_property else {
            return resolved(AliasKind::Property {
                core_index,
                value_type_index: None,
                points_to_object: target_property.is_object(),
            });
        };

        if let Some(value_type) = target_property.property_type.value_type() {
            let Some(index) = value_type.index_of_property(sub_property) else {
                return error(format!("Invalid alias target location: {sub_property}"));
            };
            return resolved(AliasKind::Property {
                core_index,
                value_type_index: Some(index),
                points_to_object: false,
            });
        }

        // Deep alias: the property is a group bound in the target object
        let deep = sub_property
            .starts_with(|c: char| c.is_lowercase())
            .then(|| {
                target
                    .bindings
                    .iter()
                    .filter(|b| b.property_name.as_deref() == Some(property))
                    .filter_map(|b| {
                        let group_object = b.object_index()?;
                        let sub = self.caches[group_object].as_deref()?.property(sub_property)?;
                        Some(AliasKind::DeepProperty {
                            core_index,
                            group_object,
                            sub_core_index: sub.core_index,
                        })
                    })
                    .last()
            })
            .flatten();
        match deep {
            Some(kind) => resolved(kind),
            None => error(format!("Invalid alias target location: {sub_property}")),
        }
    }
}
