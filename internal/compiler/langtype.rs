// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

use derive_more::{From, Into};
use std::fmt::Display;

/// Index of a type in the [`crate::typeregister::TypeRegister`]
#[derive(Debug, Clone, Copy, Into, From, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TypeId(usize);

/// The type of a property, as seen by the property cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropertyType {
    /// The type could not be determined
    #[default]
    Invalid,
    Bool,
    Int,
    Real,
    String,
    Url,
    Color,
    /// A `var` property
    Var,
    /// A gadget, whose members can be accessed with `prop.member`
    Value(ValueType),
    /// A pointer to a QObject derived type
    Object(TypeId),
    /// A list of QObject derived types
    List(TypeId),
}

impl PropertyType {
    /// Whether a value of that type is a QObject pointer
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn object_type(&self) -> Option<TypeId> {
        match self {
            Self::Object(ty) => Some(*ty),
            _ => None,
        }
    }

    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Self::Value(vt) => Some(*vt),
            _ => None,
        }
    }

    /// Parse the name of a basic type as written in a property declaration.
    ///
    /// Object types are resolved by the type register instead.
    pub fn from_basic_name(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => Self::Bool,
            "int" => Self::Int,
            "real" | "double" => Self::Real,
            "string" => Self::String,
            "url" => Self::Url,
            "color" => Self::Color,
            "var" | "variant" => Self::Var,
            _ => return ValueType::from_name(name).map(Self::Value),
        })
    }
}

impl Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid => write!(f, "<invalid>"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Real => write!(f, "real"),
            Self::String => write!(f, "string"),
            Self::Url => write!(f, "url"),
            Self::Color => write!(f, "color"),
            Self::Var => write!(f, "var"),
            Self::Value(vt) => vt.fmt(f),
            Self::Object(ty) => write!(f, "object#{}", usize::from(*ty)),
            Self::List(ty) => write!(f, "list<object#{}>", usize::from(*ty)),
        }
    }
}

/// A member of a value type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueTypeProperty {
    pub name: &'static str,
    pub ty: PropertyType,
    pub writable: bool,
    pub resettable: bool,
}

const fn member(name: &'static str, ty: PropertyType) -> ValueTypeProperty {
    ValueTypeProperty { name, ty, writable: true, resettable: false }
}

const fn read_only(name: &'static str, ty: PropertyType) -> ValueTypeProperty {
    ValueTypeProperty { name, ty, writable: false, resettable: false }
}

const POINT_PROPERTIES: &[ValueTypeProperty] =
    &[member("x", PropertyType::Real), member("y", PropertyType::Real)];

const SIZE_PROPERTIES: &[ValueTypeProperty] =
    &[member("width", PropertyType::Real), member("height", PropertyType::Real)];

const RECT_PROPERTIES: &[ValueTypeProperty] = &[
    member("x", PropertyType::Real),
    member("y", PropertyType::Real),
    member("width", PropertyType::Real),
    member("height", PropertyType::Real),
    read_only("left", PropertyType::Real),
    read_only("right", PropertyType::Real),
    read_only("top", PropertyType::Real),
    read_only("bottom", PropertyType::Real),
];

const FONT_PROPERTIES: &[ValueTypeProperty] = &[
    member("family", PropertyType::String),
    member("bold", PropertyType::Bool),
    member("italic", PropertyType::Bool),
    member("underline", PropertyType::Bool),
    member("pointSize", PropertyType::Real),
    member("pixelSize", PropertyType::Int),
    member("weight", PropertyType::Int),
];

/// The builtin gadget types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ValueType {
    #[display("point")]
    Point,
    #[display("size")]
    Size,
    #[display("rect")]
    Rect,
    #[display("font")]
    Font,
}

impl ValueType {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "point" => Self::Point,
            "size" => Self::Size,
            "rect" => Self::Rect,
            "font" => Self::Font,
            _ => return None,
        })
    }

    pub fn properties(self) -> &'static [ValueTypeProperty] {
        match self {
            Self::Point => POINT_PROPERTIES,
            Self::Size => SIZE_PROPERTIES,
            Self::Rect => RECT_PROPERTIES,
            Self::Font => FONT_PROPERTIES,
        }
    }

    /// Index of the member in the value type, or None if there is no such member
    pub fn index_of_property(self, name: &str) -> Option<usize> {
        self.properties().iter().position(|p| p.name == name)
    }

    pub fn property(self, index: usize) -> Option<&'static ValueTypeProperty> {
        self.properties().get(index)
    }
}

#[test]
fn value_type_members() {
    assert_eq!(ValueType::Rect.index_of_property("width"), Some(2));
    assert_eq!(ValueType::Rect.index_of_property("depth"), None);
    assert!(!ValueType::Rect.property(4).unwrap().writable);
    assert_eq!(ValueType::Font.property(5).map(|p| p.ty), Some(PropertyType::Int));
    assert_eq!(PropertyType::from_basic_name("double"), Some(PropertyType::Real));
    assert_eq!(PropertyType::from_basic_name("point"), Some(PropertyType::Value(ValueType::Point)));
    assert_eq!(PropertyType::from_basic_name("Item"), None);
    assert_eq!(PropertyType::Value(ValueType::Size).to_string(), "size");
}
