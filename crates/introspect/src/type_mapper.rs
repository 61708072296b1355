//! Type mapping from ORM field types to property kinds

use sdkpack_common::PropertyKind;

/// Maps ORM type names to PropertyKind
pub struct TypeMapper;

impl TypeMapper {
    /// Map an ORM type name to PropertyKind, ignoring case
    ///
    /// # Examples
    /// ```
    /// use sdkpack_introspect::TypeMapper;
    /// use sdkpack_common::PropertyKind;
    ///
    /// assert_eq!(TypeMapper::map_type("String"), PropertyKind::String);
    /// assert_eq!(TypeMapper::map_type("objectid"), PropertyKind::ObjectId);
    /// assert_eq!(TypeMapper::map_type("[String]"), PropertyKind::Array);
    /// ```
    pub fn map_type(type_name: &str) -> PropertyKind {
        let name = type_name.trim();

        // Inline array declarations such as `[String]`
        if name.starts_with('[') && name.ends_with(']') {
            return PropertyKind::Array;
        }

        match name.to_ascii_lowercase().as_str() {
            "string" => PropertyKind::String,
            "number" => PropertyKind::Number,
            "boolean" | "bool" => PropertyKind::Boolean,
            "date" => PropertyKind::Date,
            "objectid" => PropertyKind::ObjectId,
            "array" => PropertyKind::Array,
            "buffer" => PropertyKind::Buffer,
            "map" => PropertyKind::Map,
            "decimal128" => PropertyKind::Decimal128,
            "mixed" => PropertyKind::Mixed,
            _ => {
                tracing::warn!(type_name = %type_name, "Unknown field type, treating as Mixed");
                PropertyKind::Mixed
            }
        }
    }

    /// Check if a field name is one of the timestamp fields
    pub fn is_timestamp(field_name: &str) -> bool {
        field_name == "createdAt" || field_name == "updatedAt"
    }
}
