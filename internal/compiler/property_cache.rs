// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

//! The property caches describe, for every object of a document, all the properties
//! available on it: the ones of its type and bases, the ones it declares itself, and
//! the ones added for its aliases once they are resolved.

use std::collections::HashMap;
use std::rc::Rc;

use crate::diagnostics::Diagnostic;
use crate::langtype::{PropertyType, TypeId, ValueType};
use crate::object_tree::{BindingValue, Document, ObjectIndex, PropertyDeclaration};
use crate::typeregister::{PropertyInfo, TypeRegister};
use smol_str::SmolStr;
use typed_index_collections::TiVec;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyFlags {
    pub is_alias: bool,
    pub is_writable: bool,
    pub is_resettable: bool,
    pub is_bindable: bool,
    pub is_var: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyData {
    pub name: SmolStr,
    /// Position of the property in its cache
    pub core_index: usize,
    pub property_type: PropertyType,
    pub flags: PropertyFlags,
}

impl PropertyData {
    pub fn is_object(&self) -> bool {
        self.property_type.is_object()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PropertyCache {
    /// The type this cache was created from, None for value type groups
    pub type_id: Option<TypeId>,
    properties: Vec<PropertyData>,
    default_property: Option<SmolStr>,
}

/// One property cache per object, indexed like [`Document::objects`].
///
/// Caches are shared between objects of the same type until something needs to be appended.
pub type PropertyCacheVector = TiVec<ObjectIndex, Option<Rc<PropertyCache>>>;

impl PropertyCache {
    /// The cache of all the properties of a type, bases first
    pub fn for_type(register: &TypeRegister, ty: TypeId) -> Self {
        let mut chain = register.base_chain(ty).collect::<Vec<_>>();
        chain.reverse();
        let mut cache = Self { type_id: Some(ty), ..Default::default() };
        for t in chain {
            for p in &register[t].properties {
                cache.append_property_info(p);
            }
        }
        cache.default_property = register.default_property(ty);
        cache
    }

    /// The cache for a group property over a value type, such as `font { ... }`
    pub fn for_value_type(value_type: ValueType) -> Self {
        let mut cache = Self::default();
        for p in value_type.properties() {
            cache.append_property(
                p.name.into(),
                p.ty,
                PropertyFlags {
                    is_writable: p.writable,
                    is_resettable: p.resettable,
                    is_bindable: true,
                    ..Default::default()
                },
            );
        }
        cache
    }

    fn append_property_info(&mut self, p: &PropertyInfo) -> usize {
        self.append_property(
            p.name.clone(),
            p.ty,
            PropertyFlags {
                is_alias: false,
                is_writable: p.writable,
                is_resettable: p.resettable,
                is_bindable: p.bindable,
                is_var: p.ty == PropertyType::Var,
            },
        )
    }

    fn append_declaration(&mut self, decl: &PropertyDeclaration) -> usize {
        let core_index = self.append_property(
            decl.name.clone(),
            decl.property_type,
            PropertyFlags {
                is_alias: false,
                is_writable: !decl.read_only,
                is_resettable: false,
                is_bindable: true,
                is_var: decl.property_type == PropertyType::Var,
            },
        );
        if decl.is_default {
            self.default_property = Some(decl.name.clone());
        }
        core_index
    }

    /// Append a property and return its core index
    pub fn append_property(
        &mut self,
        name: SmolStr,
        property_type: PropertyType,
        flags: PropertyFlags,
    ) -> usize {
        let core_index = self.properties.len();
        self.properties.push(PropertyData { name, core_index, property_type, flags });
        core_index
    }

    /// Lookup a property by name. Properties appended last shadow the ones of the base types.
    pub fn property(&self, name: &str) -> Option<&PropertyData> {
        self.properties.iter().rev().find(|p| p.name == name)
    }

    pub fn property_at(&self, core_index: usize) -> Option<&PropertyData> {
        self.properties.get(core_index)
    }

    pub fn default_property(&self) -> Option<&PropertyData> {
        self.default_property.as_deref().and_then(|name| self.property(name))
    }

    pub fn set_default_property_name(&mut self, name: SmolStr) {
        self.default_property = Some(name);
    }

    /// Whether an alias with that name was already appended
    pub fn has_alias(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.flags.is_alias && p.name == name)
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}

/// Get the cache of the object for modification, detaching it from the objects sharing it.
/// An object without cache gets an empty one.
pub fn own_at(caches: &mut PropertyCacheVector, index: ObjectIndex) -> &mut PropertyCache {
    Rc::make_mut(caches[index].get_or_insert_with(Default::default))
}

/// The cache of the object that is created by a group property binding to that property
pub fn group_property_cache(
    register: &TypeRegister,
    property: &PropertyData,
) -> Option<PropertyCache> {
    match property.property_type {
        PropertyType::Object(ty) => Some(PropertyCache::for_type(register, ty)),
        PropertyType::Value(vt) => Some(PropertyCache::for_value_type(vt)),
        _ => None,
    }
}

struct PropertyCacheCreator<'a> {
    doc: &'a Document,
    register: &'a TypeRegister,
    type_caches: HashMap<TypeId, Rc<PropertyCache>>,
    caches: PropertyCacheVector,
}

impl PropertyCacheCreator<'_> {
    fn cache_for_type(&mut self, ty: TypeId) -> Rc<PropertyCache> {
        let register = self.register;
        self.type_caches
            .entry(ty)
            .or_insert_with(|| Rc::new(PropertyCache::for_type(register, ty)))
            .clone()
    }

    fn create_typed_caches(&mut self) -> Result<(), Diagnostic> {
        let doc = self.doc;
        for (index, obj) in doc.objects.iter_enumerated() {
            let Some(type_name) = &obj.type_name else { continue };
            let ty = self.register.lookup(type_name).ok_or_else(|| {
                Diagnostic::error(
                    format!("{type_name} is not a type"),
                    doc.source_location(obj.location),
                )
            })?;
            let mut cache = self.cache_for_type(ty);
            if !obj.properties.is_empty() {
                let own = Rc::make_mut(&mut cache);
                for decl in &obj.properties {
                    own.append_declaration(decl);
                }
            }
            self.caches[index] = Some(cache);
        }
        Ok(())
    }

    /// Give a cache to the group properties of the object, recursively
    fn create_group_caches(&mut self, index: ObjectIndex) {
        let doc = self.doc;
        for binding in &doc.objects[index].bindings {
            let BindingValue::GroupProperty(target) = binding.value else { continue };
            let Some(name) = &binding.property_name else { continue };
            if self.caches[target].is_none() {
                let group_cache = self.caches[index]
                    .as_ref()
                    .and_then(|c| c.property(name))
                    .and_then(|p| group_property_cache(self.register, p));
                let Some(group_cache) = group_cache else {
                    log::trace!("no cache for group property '{name}' of object {index}");
                    continue;
                };
                self.caches[target] = Some(Rc::new(group_cache));
            }
            self.create_group_caches(target);
        }
    }
}

/// Create the property caches for all the objects of the document.
///
/// Objects with a type get the cache of their type extended with the properties they
/// declare. Group properties get the cache of the grouped property's type. Group
/// properties that do not match a property of their enclosing object get no cache.
pub fn create_property_caches(
    doc: &Document,
    register: &TypeRegister,
) -> Result<PropertyCacheVector, Diagnostic> {
    let mut creator = PropertyCacheCreator {
        doc,
        register,
        type_caches: HashMap::new(),
        caches: doc.objects.iter().map(|_| None).collect(),
    };
    creator.create_typed_caches()?;
    for (index, obj) in doc.objects.iter_enumerated() {
        if obj.type_name.is_some() {
            creator.create_group_caches(index);
        }
    }
    Ok(creator.caches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Location;
    use crate::object_tree::{Binding, Object};

    #[test]
    fn type_cache_shadowing_and_default() {
        let register = TypeRegister::builtin();
        let rect = register.lookup("Rectangle").unwrap();
        let cache = PropertyCache::for_type(&register, rect);
        assert_eq!(cache.property_at(0).map(|p| p.name.as_str()), Some("objectName"));
        let color = cache.property("color").unwrap();
        assert_eq!(color.property_type, PropertyType::Color);
        assert_eq!(cache.property_at(color.core_index), Some(color));
        assert_eq!(cache.default_property().map(|p| p.name.as_str()), Some("data"));
        assert!(cache.property("border").unwrap().is_object());
        assert!(!cache.property("border").unwrap().flags.is_writable);
    }

    #[test]
    fn caches_for_document() {
        let register = TypeRegister::builtin();
        let loc = Location::new(1, 1);
        let mut doc = Document::new("caches.qml");
        let root = doc.add_object(Object::new(Some("Rectangle"), loc));
        let border = doc.add_object(Object::new(None, loc));
        let font_owner = doc.add_object(Object::new(Some("Text"), loc));
        let font = doc.add_object(Object::new(None, loc));
        let unknown_group = doc.add_object(Object::new(None, loc));
        doc.objects[root].properties.push(PropertyDeclaration {
            is_default: true,
            ..PropertyDeclaration::new("extra", PropertyType::Int, loc)
        });
        doc.objects[root].bindings = vec![
            Binding::new(Some("border"), BindingValue::GroupProperty(border), loc),
            Binding::new(None, BindingValue::Object(font_owner), loc),
            Binding::new(Some("nothere"), BindingValue::GroupProperty(unknown_group), loc),
        ];
        doc.objects[font_owner].bindings =
            vec![Binding::new(Some("font"), BindingValue::GroupProperty(font), loc)];

        let caches = create_property_caches(&doc, &register).unwrap();
        let root_cache = caches[root].as_ref().unwrap();
        assert_eq!(root_cache.default_property().map(|p| p.name.as_str()), Some("extra"));
        let border_cache = caches[border].as_ref().unwrap();
        assert_eq!(border_cache.type_id, register.lookup("QQuickPen"));
        assert!(caches[font].as_ref().unwrap().property("pixelSize").is_some());
        assert!(caches[unknown_group].is_none());
    }

    #[test]
    fn unknown_type_is_an_error() {
        let register = TypeRegister::builtin();
        let mut doc = Document::new("bad.qml");
        doc.add_object(Object::new(Some("Frobnicator"), Location::new(3, 1)));
        let err = create_property_caches(&doc, &register).unwrap_err();
        assert_eq!(err.message(), "Frobnicator is not a type");
        assert_eq!(err.line_column(), (3, 1));
    }

    #[test]
    fn own_at_detaches_shared_cache() {
        let register = TypeRegister::builtin();
        let loc = Location::new(1, 1);
        let mut doc = Document::new("share.qml");
        let a = doc.add_object(Object::new(Some("Item"), loc));
        let b = doc.add_object(Object::new(Some("Item"), loc));
        let mut caches = create_property_caches(&doc, &register).unwrap();
        assert!(Rc::ptr_eq(caches[a].as_ref().unwrap(), caches[b].as_ref().unwrap()));
        let own = own_at(&mut caches, a);
        own.append_property("extra".into(), PropertyType::Int, PropertyFlags::default());
        assert!(caches[a].as_ref().unwrap().property("extra").is_some());
        assert!(caches[b].as_ref().unwrap().property("extra").is_none());
    }
}
