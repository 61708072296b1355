//! Template-ready descriptors derived from an introspected application
//!
//! These are the stable intermediate representation handed to every SDK
//! target: routes, models, and their properties.

use crate::GeneratorError;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// HTTP methods a route descriptor can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Head,
    Delete,
}

impl HttpMethod {
    /// Every method, in the order a wildcard route expands to
    pub const ALL: [HttpMethod; 6] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| GeneratorError::InvalidMethod(s.to_string()))
    }
}

/// A single callable endpoint of the introspected application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub path: String,
    pub method: HttpMethod,
    pub name: String,
}

/// Kind of a model property, resolved from the ORM field type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    String,
    Number,
    Boolean,
    Date,
    ObjectId,
    Array,
    Buffer,
    Map,
    Decimal128,
    Mixed,
}

impl PropertyKind {
    /// Type name as the ORM spells it
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyKind::String => "String",
            PropertyKind::Number => "Number",
            PropertyKind::Boolean => "Boolean",
            PropertyKind::Date => "Date",
            PropertyKind::ObjectId => "ObjectId",
            PropertyKind::Array => "Array",
            PropertyKind::Buffer => "Buffer",
            PropertyKind::Map => "Map",
            PropertyKind::Decimal128 => "Decimal128",
            PropertyKind::Mixed => "Mixed",
        }
    }

    /// Boolean marker templates test for, e.g. `typeString`
    pub fn flag(&self) -> String {
        format!("type{}", self.type_name())
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// One property of a model descriptor
///
/// Serializes as `{"name": .., "type": "String", "typeString": true}` so that
/// logic-less templates can branch on the flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub name: String,
    pub kind: PropertyKind,
    pub format: Option<String>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            format: None,
        }
    }

    /// Synthetic `createdAt`/`updatedAt` style property
    pub fn timestamp(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::Date,
            format: Some("date-time".to_string()),
        }
    }
}

impl Serialize for PropertyDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.format.is_some() { 4 } else { 3 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("type", self.kind.type_name())?;
        map.serialize_entry(&self.kind.flag(), &true)?;
        if let Some(format) = &self.format {
            map.serialize_entry("format", format)?;
        }
        map.end()
    }
}

/// Normalized description of one exposed model
///
/// Models that are private or lack a schema/config degenerate to
/// `ModelDescriptor::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub model_name: String,
    pub required: Vec<String>,
    pub properties: Vec<PropertyDescriptor>,
}

impl ModelDescriptor {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            ..Default::default()
        }
    }

    /// True for the degenerate descriptor of a skipped model
    pub fn is_empty(&self) -> bool {
        self.model_name.is_empty() && self.properties.is_empty() && self.required.is_empty()
    }

    /// Look up a property by name
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Everything extracted from the running application in one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Introspection {
    pub api_pathname: String,
    pub routes: Vec<RouteDescriptor>,
    pub models: IndexMap<String, ModelDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing_is_case_insensitive() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("DELETE".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert!("OPTIONS".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_property_serializes_type_flag() {
        let prop = PropertyDescriptor::new("email", PropertyKind::String);
        let value = serde_json::to_value(&prop).unwrap();
        assert_eq!(value["name"], "email");
        assert_eq!(value["type"], "String");
        assert_eq!(value["typeString"], true);
        assert!(value.get("format").is_none());
    }

    #[test]
    fn test_timestamp_property() {
        let prop = PropertyDescriptor::timestamp("createdAt");
        let value = serde_json::to_value(&prop).unwrap();
        assert_eq!(value["typeDate"], true);
        assert_eq!(value["format"], "date-time");
    }

    #[test]
    fn test_empty_descriptor() {
        assert!(ModelDescriptor::default().is_empty());
        assert!(!ModelDescriptor::new("User").is_empty());
    }
}
