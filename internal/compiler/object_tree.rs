// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

/*!
 This module contains the intermediate representation of a parsed .qml document: a flat
 arena of objects referring to each other by index.
*/

use crate::diagnostics::{Location, SourceFile, SourceFileInner, SourceLocation};
use crate::langtype::PropertyType;
use derive_more::{From, Into};
use smol_str::SmolStr;
use std::path::PathBuf;
use typed_index_collections::TiVec;

/// Position of an object in [`Document::objects`]
#[derive(Debug, Clone, Copy, Into, From, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObjectIndex(usize);

impl ObjectIndex {
    /// The root object of the document
    pub const ROOT: Self = Self(0);
}

impl std::fmt::Display for ObjectIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The full document (a complete file)
#[derive(Default, Debug)]
pub struct Document {
    pub source_file: Option<SourceFile>,
    /// All the objects of the document. The first one is the root.
    ///
    /// Objects are only ever appended, so an index stays valid for the whole compilation.
    pub objects: TiVec<ObjectIndex, Object>,
    /// Every object that starts a component, in the order they were discovered.
    /// Filled by the component and alias resolver.
    pub component_roots: Vec<ObjectIndex>,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            source_file: Some(SourceFileInner::from_path_only(path.into())),
            ..Default::default()
        }
    }

    pub fn add_object(&mut self, object: Object) -> ObjectIndex {
        self.objects.push_and_get_key(object)
    }

    /// Attach a location of this document to its source file
    pub fn source_location(&self, location: Location) -> SourceLocation {
        SourceLocation::new(self.source_file.clone(), location)
    }

    pub fn inline_component_roots(&self) -> impl Iterator<Item = ObjectIndex> + '_ {
        self.objects
            .iter_enumerated()
            .filter(|(_, o)| o.flags.is_inline_component_root)
            .map(|(i, _)| i)
    }

    pub(crate) fn push_component_root(&mut self, root: ObjectIndex) {
        if !self.component_roots.contains(&root) {
            self.component_roots.push(root);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectFlags {
    /// The object is a `Component`, explicit or synthesized
    pub is_component: bool,
    /// The `Component` was synthesized around an object assigned to a Component property.
    /// Such objects are appended after all the parsed ones.
    pub is_implicit_component: bool,
    pub is_inline_component_root: bool,
    pub is_part_of_inline_component: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PropertyDeclaration {
    pub name: SmolStr,
    pub property_type: PropertyType,
    pub location: Location,
    pub is_default: bool,
    pub read_only: bool,
}

impl PropertyDeclaration {
    pub fn new(name: impl Into<SmolStr>, property_type: PropertyType, location: Location) -> Self {
        Self { name: name.into(), property_type, location, ..Default::default() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignalDeclaration {
    pub name: SmolStr,
    pub location: Location,
}

#[derive(Debug, Clone, Default)]
pub struct FunctionDeclaration {
    pub name: SmolStr,
    pub location: Location,
}

/// What is assigned to a property
#[derive(Debug, Clone, PartialEq)]
pub enum BindingValue {
    /// `prop: Type { ... }`
    Object(ObjectIndex),
    /// `prop { ... }` or `prop.sub: ...`. The object has no type name.
    GroupProperty(ObjectIndex),
    /// `Attached.prop: ...`
    AttachedProperty(ObjectIndex),
    Script(SmolStr),
    Number(f64),
    String(SmolStr),
    Boolean(bool),
}

#[derive(Debug, Clone)]
pub struct Binding {
    /// The name of the property, or None for the default property
    pub property_name: Option<SmolStr>,
    pub value: BindingValue,
    pub location: Location,
    pub value_location: Location,
    /// `onFoo: Bar {}` style bindings; never wrapped in a Component
    pub is_signal_handler_object: bool,
}

impl Binding {
    pub fn new(property_name: Option<&str>, value: BindingValue, location: Location) -> Self {
        Self {
            property_name: property_name.map(SmolStr::new),
            value,
            location,
            value_location: location,
            is_signal_handler_object: false,
        }
    }

    /// Index of the object this binding creates, for object, group and attached bindings
    pub fn object_index(&self) -> Option<ObjectIndex> {
        match self.value {
            BindingValue::Object(i)
            | BindingValue::GroupProperty(i)
            | BindingValue::AttachedProperty(i) => Some(i),
            _ => None,
        }
    }

    pub fn is_object_binding(&self) -> bool {
        matches!(self.value, BindingValue::Object(_))
    }
}

/// How a resolved alias reaches its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
    /// `property alias a: someId`
    PointerObject,
    /// `property alias a: someId.prop` or `someId.prop.member` for value types
    Property {
        core_index: usize,
        value_type_index: Option<usize>,
        /// The property holds a QObject pointer
        points_to_object: bool,
    },
    /// `property alias a: someId.group.prop` where `group` is bound to an object in `someId`
    DeepProperty { core_index: usize, group_object: ObjectIndex, sub_core_index: usize },
    /// Alias to another alias declared on the same object
    LocalAlias { alias_index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAlias {
    pub target_object: ObjectIndex,
    /// The component local number of the target object
    pub target_id: usize,
    pub kind: AliasKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AliasTarget {
    #[default]
    Unresolved,
    Resolved(ResolvedAlias),
}

#[derive(Debug, Clone, Default)]
pub struct Alias {
    pub name: SmolStr,
    /// The unparsed right hand side: `id`, `id.property` or `id.property.member`
    pub reference: SmolStr,
    pub location: Location,
    pub reference_location: Location,
    pub read_only: bool,
    pub target: AliasTarget,
}

impl Alias {
    pub fn new(name: impl Into<SmolStr>, reference: impl Into<SmolStr>, location: Location) -> Self {
        Self {
            name: name.into(),
            reference: reference.into(),
            location,
            reference_location: location,
            ..Default::default()
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.target, AliasTarget::Resolved(_))
    }

    pub fn resolved(&self) -> Option<&ResolvedAlias> {
        match &self.target {
            AliasTarget::Resolved(r) => Some(r),
            AliasTarget::Unresolved => None,
        }
    }

    /// The id part of the reference
    pub fn id_name(&self) -> &str {
        self.reference.split_once('.').map_or(self.reference.as_str(), |(id, _)| id)
    }

    /// The property and the optional member part of the reference.
    ///
    /// Both are empty for an alias to an object.
    pub fn property_path(&self) -> (&str, Option<&str>) {
        let Some((_, path)) = self.reference.split_once('.') else { return ("", None) };
        match path.split_once('.') {
            Some((property, sub)) => (property, Some(sub)),
            None => (path, None),
        }
    }
}

/// An object declaration, such as `Item { ... }`, a group property or attached property block
#[derive(Debug, Clone, Default)]
pub struct Object {
    /// The name of the type this object inherits from. None for group and attached properties.
    pub type_name: Option<SmolStr>,
    pub id: Option<SmolStr>,
    pub location: Location,
    pub id_location: Location,
    pub flags: ObjectFlags,

    pub bindings: Vec<Binding>,
    pub aliases: Vec<Alias>,
    pub properties: Vec<PropertyDeclaration>,
    pub signals: Vec<SignalDeclaration>,
    pub functions: Vec<FunctionDeclaration>,
    /// Index in `aliases` of the alias declared as `default`
    pub default_alias: Option<usize>,

    /// Number of the id within its component, assigned while collecting ids
    pub id_number: Option<usize>,
    /// For component roots: the objects with an id in the component, by id number
    pub named_objects: Vec<ObjectIndex>,
    /// A group property without declared type that was resolved through an alias or an id
    pub resolved_group: bool,
}

impl Object {
    pub fn new(type_name: Option<&str>, location: Location) -> Self {
        Self { type_name: type_name.map(SmolStr::new), location, ..Default::default() }
    }

    pub fn with_id(mut self, id: impl Into<SmolStr>, id_location: Location) -> Self {
        self.id = Some(id.into());
        self.id_location = id_location;
        self
    }

    pub fn first_binding(&self) -> Option<&Binding> {
        self.bindings.first()
    }

    pub fn alias_position(&self, name: &str) -> Option<usize> {
        self.aliases.iter().position(|a| a.name == name)
    }
}
