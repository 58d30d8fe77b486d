// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

//! The registry of all the types known to the compiler.
//!
//! This is what the resolver uses to answer questions such as "is this the
//! Component type" or "is this a delegate component" while it walks a document.

use std::collections::HashMap;

use crate::langtype::{PropertyType, TypeId, ValueType};
use smol_str::SmolStr;
use typed_index_collections::TiVec;

/// The C++ class name of the Component type
pub const COMPONENT_CLASS_NAME: &str = "QQmlComponent";
/// Any type inheriting from this class can be used where a Component is expected
pub const ABSTRACT_DELEGATE_COMPONENT_CLASS_NAME: &str = "QQmlAbstractDelegateComponent";
/// Qualifier under which the Component type is imported for synthesized wrappers
pub const COMPONENT_IMPORT_QUALIFIER: &str = "QML";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: SmolStr,
    pub ty: PropertyType,
    pub writable: bool,
    pub resettable: bool,
    pub bindable: bool,
}

impl PropertyInfo {
    pub fn new(name: impl Into<SmolStr>, ty: PropertyType) -> Self {
        Self { name: name.into(), ty, writable: true, resettable: false, bindable: true }
    }

    pub fn read_only(name: impl Into<SmolStr>, ty: PropertyType) -> Self {
        Self { writable: false, ..Self::new(name, ty) }
    }

    pub fn resettable(mut self) -> Self {
        self.resettable = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Implemented in C++
    Builtin,
    /// Implemented by a QML document or an inline component
    Composite,
}

#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub name: SmolStr,
    /// For builtin types, the name of the C++ class. For composite types, the name of the type.
    pub class_name: SmolStr,
    pub base: Option<TypeId>,
    pub kind: TypeKind,
    /// Properties declared by this type (not including the ones of the base)
    pub properties: Vec<PropertyInfo>,
    pub default_property: Option<SmolStr>,
}

impl TypeInfo {
    pub fn builtin(name: &str, class_name: &str, base: Option<TypeId>) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
            base,
            kind: TypeKind::Builtin,
            properties: Vec::new(),
            default_property: None,
        }
    }
}

pub struct TypeRegister {
    types: TiVec<TypeId, TypeInfo>,
    by_name: HashMap<SmolStr, TypeId>,
    component: TypeId,
}

impl std::ops::Index<TypeId> for TypeRegister {
    type Output = TypeInfo;
    fn index(&self, index: TypeId) -> &TypeInfo {
        &self.types[index]
    }
}

impl TypeRegister {
    /// Create a register with the builtin types of QtQml and QtQuick
    pub fn builtin() -> Self {
        let mut types = TiVec::new();
        let qt_object = types.push_and_get_key(TypeInfo::builtin("QtObject", "QObject", None));
        let component = types.push_and_get_key(TypeInfo::builtin(
            "Component",
            COMPONENT_CLASS_NAME,
            Some(qt_object),
        ));
        let mut register = Self { types, by_name: HashMap::new(), component };

        for id in [qt_object, component] {
            register.by_name.insert(register.types[id].name.clone(), id);
        }
        register.add_properties(qt_object, [PropertyInfo::new("objectName", PropertyType::String)]);
        register.add_properties(
            component,
            [
                PropertyInfo::read_only("progress", PropertyType::Real),
                PropertyInfo::read_only("status", PropertyType::Int),
                PropertyInfo::read_only("url", PropertyType::Url),
            ],
        );

        let abstract_delegate = register.insert_builtin(
            "AbstractDelegateComponent",
            ABSTRACT_DELEGATE_COMPONENT_CLASS_NAME,
            component,
        );
        let delegate_chooser =
            register.insert_builtin("DelegateChooser", "QQmlDelegateChooser", abstract_delegate);
        register.add_properties(
            delegate_chooser,
            [
                PropertyInfo::new("role", PropertyType::String),
                PropertyInfo::read_only("choices", PropertyType::List(qt_object)),
            ],
        );
        register.types[delegate_chooser].default_property = Some("choices".into());

        let item = register.insert_builtin("Item", "QQuickItem", qt_object);
        let anchors = register.insert_builtin("QQuickAnchors", "QQuickAnchors", qt_object);
        register.add_properties(
            anchors,
            [
                PropertyInfo::new("left", PropertyType::Var).resettable(),
                PropertyInfo::new("right", PropertyType::Var).resettable(),
                PropertyInfo::new("top", PropertyType::Var).resettable(),
                PropertyInfo::new("bottom", PropertyType::Var).resettable(),
                PropertyInfo::new("horizontalCenter", PropertyType::Var).resettable(),
                PropertyInfo::new("verticalCenter", PropertyType::Var).resettable(),
                PropertyInfo::new("fill", PropertyType::Object(item)).resettable(),
                PropertyInfo::new("centerIn", PropertyType::Object(item)).resettable(),
                PropertyInfo::new("margins", PropertyType::Real),
            ],
        );
        register.add_properties(
            item,
            [
                PropertyInfo::new("x", PropertyType::Real),
                PropertyInfo::new("y", PropertyType::Real),
                PropertyInfo::new("z", PropertyType::Real),
                PropertyInfo::new("width", PropertyType::Real).resettable(),
                PropertyInfo::new("height", PropertyType::Real).resettable(),
                PropertyInfo::new("implicitWidth", PropertyType::Real),
                PropertyInfo::new("implicitHeight", PropertyType::Real),
                PropertyInfo::new("opacity", PropertyType::Real),
                PropertyInfo::new("visible", PropertyType::Bool),
                PropertyInfo::new("enabled", PropertyType::Bool),
                PropertyInfo::new("parent", PropertyType::Object(item)).resettable(),
                PropertyInfo::read_only("anchors", PropertyType::Object(anchors)),
                PropertyInfo::read_only("data", PropertyType::List(qt_object)),
                PropertyInfo::read_only("children", PropertyType::List(item)),
                PropertyInfo::read_only("childrenRect", PropertyType::Value(ValueType::Rect)),
                PropertyInfo::new("transformOrigin", PropertyType::Int),
            ],
        );
        register.types[item].default_property = Some("data".into());

        let pen = register.insert_builtin("QQuickPen", "QQuickPen", qt_object);
        register.add_properties(
            pen,
            [
                PropertyInfo::new("width", PropertyType::Real),
                PropertyInfo::new("color", PropertyType::Color),
                PropertyInfo::new("pixelAligned", PropertyType::Bool),
            ],
        );

        let rectangle = register.insert_builtin("Rectangle", "QQuickRectangle", item);
        register.add_properties(
            rectangle,
            [
                PropertyInfo::new("color", PropertyType::Color),
                PropertyInfo::new("radius", PropertyType::Real),
                PropertyInfo::read_only("border", PropertyType::Object(pen)),
            ],
        );

        let text = register.insert_builtin("Text", "QQuickText", item);
        register.add_properties(
            text,
            [
                PropertyInfo::new("text", PropertyType::String),
                PropertyInfo::new("color", PropertyType::Color),
                PropertyInfo::new("font", PropertyType::Value(ValueType::Font)),
            ],
        );

        let loader = register.insert_builtin("Loader", "QQuickLoader", item);
        register.add_properties(
            loader,
            [
                PropertyInfo::new("active", PropertyType::Bool),
                PropertyInfo::new("source", PropertyType::Url),
                PropertyInfo::new("sourceComponent", PropertyType::Object(component)).resettable(),
                PropertyInfo::read_only("item", PropertyType::Object(qt_object)),
            ],
        );

        let repeater = register.insert_builtin("Repeater", "QQuickRepeater", item);
        register.add_properties(
            repeater,
            [
                PropertyInfo::new("model", PropertyType::Var),
                PropertyInfo::new("delegate", PropertyType::Object(component)),
                PropertyInfo::read_only("count", PropertyType::Int),
            ],
        );
        register.types[repeater].default_property = Some("delegate".into());

        let list_view = register.insert_builtin("ListView", "QQuickListView", item);
        register.add_properties(
            list_view,
            [
                PropertyInfo::new("model", PropertyType::Var),
                PropertyInfo::new("delegate", PropertyType::Object(component)),
                PropertyInfo::new("header", PropertyType::Object(component)),
                PropertyInfo::new("footer", PropertyType::Object(component)),
                PropertyInfo::new("highlight", PropertyType::Object(component)),
                PropertyInfo::new("currentIndex", PropertyType::Int),
                PropertyInfo::new("spacing", PropertyType::Real),
                PropertyInfo::read_only("count", PropertyType::Int),
            ],
        );

        let timer = register.insert_builtin("Timer", "QQmlTimer", qt_object);
        register.add_properties(
            timer,
            [
                PropertyInfo::new("interval", PropertyType::Int),
                PropertyInfo::new("running", PropertyType::Bool),
                PropertyInfo::new("repeat", PropertyType::Bool),
            ],
        );

        register
    }

    fn insert_builtin(&mut self, name: &str, class_name: &str, base: TypeId) -> TypeId {
        let id = self.types.push_and_get_key(TypeInfo::builtin(name, class_name, Some(base)));
        self.by_name.insert(name.into(), id);
        id
    }

    fn add_properties(&mut self, ty: TypeId, properties: impl IntoIterator<Item = PropertyInfo>) {
        self.types[ty].properties.extend(properties);
    }

    /// Register a type implemented in QML (another document, or an inline component)
    pub fn add_composite_type(
        &mut self,
        name: impl Into<SmolStr>,
        base: TypeId,
        properties: Vec<PropertyInfo>,
        default_property: Option<SmolStr>,
    ) -> TypeId {
        let name = name.into();
        let id = self.types.push_and_get_key(TypeInfo {
            name: name.clone(),
            class_name: name.clone(),
            base: Some(base),
            kind: TypeKind::Composite,
            properties,
            default_property,
        });
        self.by_name.insert(name, id);
        id
    }

    /// Make an existing type available under another (possibly qualified) name
    pub fn insert_type_with_name(&mut self, ty: TypeId, name: impl Into<SmolStr>) {
        self.by_name.insert(name.into(), ty);
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn component_type(&self) -> TypeId {
        self.component
    }

    /// Name under which the Component type is known to synthesized wrappers
    pub fn qualified_component_name(&self) -> SmolStr {
        smol_str::format_smolstr!(
            "{COMPONENT_IMPORT_QUALIFIER}.{}",
            self.types[self.component].name
        )
    }

    /// The type itself followed by all of its bases
    pub fn base_chain(&self, ty: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        std::iter::successors(Some(ty), move |t| self.types.get(*t).and_then(|info| info.base))
    }

    /// The first type in the inheritance chain that is implemented in C++
    pub fn first_builtin_type(&self, ty: TypeId) -> Option<TypeId> {
        self.base_chain(ty).find(|t| self.types[*t].kind == TypeKind::Builtin)
    }

    pub fn is_component(&self, ty: TypeId) -> bool {
        ty == self.component
    }

    pub fn inherits_component(&self, ty: TypeId) -> bool {
        self.base_chain(ty).any(|t| t == self.component)
    }

    /// A type can be assigned where a Component is expected without being wrapped when its
    /// first C++ type is the Component itself, or when it derives from the abstract delegate
    /// component.
    pub fn is_usable_component(&self, ty: TypeId) -> bool {
        let Some(first) = self.first_builtin_type(ty) else { return false };
        first == self.component
            || self
                .base_chain(first)
                .any(|t| self.types[t].class_name == ABSTRACT_DELEGATE_COMPONENT_CLASS_NAME)
    }

    /// The default property of the type, looking in the bases
    pub fn default_property(&self, ty: TypeId) -> Option<SmolStr> {
        self.base_chain(ty).find_map(|t| self.types[t].default_property.clone())
    }
}

impl Default for TypeRegister {
    fn default() -> Self {
        Self::builtin()
    }
}

#[test]
fn builtin_component_queries() {
    let mut register = TypeRegister::builtin();
    let component = register.component_type();
    let item = register.lookup("Item").unwrap();
    let chooser = register.lookup("DelegateChooser").unwrap();

    assert!(register.is_component(component));
    assert!(register.is_usable_component(component));
    assert!(register.is_usable_component(chooser));
    assert!(!register.is_component(chooser));
    assert!(register.inherits_component(chooser));
    assert!(!register.is_usable_component(item));
    assert_eq!(register.default_property(register.lookup("Rectangle").unwrap()), Some("data".into()));

    let delegate = register.add_composite_type("MyDelegate", item, Vec::new(), None);
    assert_eq!(register.first_builtin_type(delegate), Some(item));
    assert!(!register.is_usable_component(delegate));

    let wrapper = register.add_composite_type("MyComponent", component, Vec::new(), None);
    assert!(register.is_usable_component(wrapper));

    assert_eq!(register.lookup("QML.Component"), None);
    register.insert_type_with_name(component, register.qualified_component_name());
    assert_eq!(register.lookup("QML.Component"), Some(component));
}
