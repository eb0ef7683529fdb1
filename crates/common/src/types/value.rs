// Rewind - Time-Travel Debugger Client
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A primitive debuggee value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Primitive {
    /// The `undefined` value, also used as the "no return value" sentinel.
    Undefined,
    /// The `null` value.
    Null,
    /// A boolean.
    Boolean(bool),
    /// A number.
    Number(f64),
    /// A string.
    String(String),
    /// An arbitrary precision integer, kept in its decimal form.
    BigInt(String),
    /// A symbol with its description.
    Symbol(String),
}

impl Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::BigInt(n) => write!(f, "{n}n"),
            Self::Symbol(desc) => write!(f, "Symbol({desc})"),
        }
    }
}

/// A named property of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Property name.
    pub name: String,
    /// Property value.
    pub value: ValueHandle,
}

/// The shallow preview an oracle attaches to an object handle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectPreview {
    /// Own properties included in the preview.
    #[serde(default)]
    pub properties: Vec<Property>,
    /// Whether the object has more properties than the preview carries.
    #[serde(default)]
    pub overflow: bool,
}

/// A remote object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    /// Oracle id used to load the object's properties.
    pub object_id: String,
    /// Class of the object, e.g. `Object`, `Array`, `Window`.
    pub class_name: String,
    /// Optional shallow preview.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<ObjectPreview>,
}

/// A remote environment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeRef {
    /// Oracle id of the scope.
    pub scope_id: String,
}

/// One entry of a `Map` or `Set`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntryRef {
    /// Entry key.
    pub key: Box<ValueHandle>,
    /// Entry value.
    pub value: Box<ValueHandle>,
}

/// A handle to a debuggee value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueHandle {
    /// A primitive, fully known on the client.
    Primitive(Primitive),
    /// A remote object whose properties are fetched on demand.
    Object(ObjectRef),
    /// A remote scope.
    Scope(ScopeRef),
    /// A map or set entry.
    MapEntry(MapEntryRef),
}

impl ValueHandle {
    /// The `undefined` value.
    pub fn undefined() -> Self {
        Self::Primitive(Primitive::Undefined)
    }

    /// A string value.
    pub fn string(s: impl Into<String>) -> Self {
        Self::Primitive(Primitive::String(s.into()))
    }

    /// A number value.
    pub fn number(n: f64) -> Self {
        Self::Primitive(Primitive::Number(n))
    }

    /// An object handle without preview.
    pub fn object(object_id: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self::Object(ObjectRef {
            object_id: object_id.into(),
            class_name: class_name.into(),
            preview: None,
        })
    }

    /// Whether this is the `undefined` sentinel.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Primitive(Primitive::Undefined))
    }

    /// Whether this handle refers to a scope.
    pub fn is_scope(&self) -> bool {
        matches!(self, Self::Scope(_))
    }

    /// Class name of an object handle.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::Object(obj) => Some(&obj.class_name),
            _ => None,
        }
    }

    /// Oracle id of an object handle.
    pub fn object_id(&self) -> Option<&str> {
        match self {
            Self::Object(obj) => Some(&obj.object_id),
            _ => None,
        }
    }

    /// Looks up an own property in the object's preview.
    pub fn preview_property(&self, name: &str) -> Option<&Self> {
        match self {
            Self::Object(ObjectRef { preview: Some(preview), .. }) => {
                preview.properties.iter().find(|prop| prop.name == name).map(|prop| &prop.value)
            }
            _ => None,
        }
    }

    /// Whether expanding this value can show anything.
    pub fn has_children(&self) -> bool {
        !matches!(self, Self::Primitive(_))
    }

    /// Children known locally without a round trip to the oracle.
    pub fn children(&self) -> Vec<Property> {
        match self {
            Self::Object(ObjectRef { preview: Some(preview), .. }) => preview.properties.clone(),
            Self::MapEntry(entry) => vec![
                Property { name: "<key>".to_string(), value: (*entry.key).clone() },
                Property { name: "<value>".to_string(), value: (*entry.value).clone() },
            ],
            _ => Vec::new(),
        }
    }
}

impl Display for ValueHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Object(obj) => f.write_str(&obj.class_name),
            Self::Scope(_) => f.write_str("Scope"),
            Self::MapEntry(entry) => write!(f, "{} → {}", entry.key, entry.value),
        }
    }
}

impl From<Primitive> for ValueHandle {
    fn from(p: Primitive) -> Self {
        Self::Primitive(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> ValueHandle {
        ValueHandle::Object(ObjectRef {
            object_id: "o1".to_string(),
            class_name: "Object".to_string(),
            preview: Some(ObjectPreview {
                properties: vec![Property { name: "x".to_string(), value: ValueHandle::number(1.0) }],
                overflow: false,
            }),
        })
    }

    #[test]
    fn test_capabilities() {
        let value = point();
        assert_eq!(value.class_name(), Some("Object"));
        assert_eq!(value.object_id(), Some("o1"));
        assert_eq!(value.preview_property("x"), Some(&ValueHandle::number(1.0)));
        assert_eq!(value.preview_property("y"), None);
        assert!(value.has_children());
        assert!(!value.is_scope());

        let scope = ValueHandle::Scope(ScopeRef { scope_id: "s".to_string() });
        assert!(scope.is_scope());
        assert!(scope.children().is_empty());

        assert!(ValueHandle::undefined().is_undefined());
        assert!(!ValueHandle::Primitive(Primitive::Null).is_undefined());
        assert!(!ValueHandle::number(0.0).has_children());
    }

    #[test]
    fn test_map_entry_children() {
        let entry = ValueHandle::MapEntry(MapEntryRef {
            key: Box::new(ValueHandle::string("k")),
            value: Box::new(ValueHandle::number(2.0)),
        });
        let names: Vec<_> = entry.children().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["<key>", "<value>"]);
        assert_eq!(entry.to_string(), "\"k\" → 2");
    }

    #[test]
    fn test_wire_format() {
        let value: ValueHandle =
            serde_json::from_str(r#"{"primitive":{"type":"boolean","value":false}}"#).unwrap();
        assert_eq!(value, ValueHandle::Primitive(Primitive::Boolean(false)));

        let value: ValueHandle =
            serde_json::from_str(r#"{"primitive":{"type":"undefined"}}"#).unwrap();
        assert!(value.is_undefined());

        let value: ValueHandle =
            serde_json::from_str(r#"{"object":{"objectId":"o9","className":"Array"}}"#).unwrap();
        assert_eq!(value, ValueHandle::object("o9", "Array"));
    }
}
