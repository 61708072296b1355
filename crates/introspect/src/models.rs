//! Model extraction from the application's ORM layer

use crate::app::{AppModel, DataLayer};
use crate::type_mapper::TypeMapper;
use indexmap::IndexMap;
use sdkpack_common::{GeneratorError, ModelDescriptor, PropertyDescriptor, Result};
use tracing::debug;

/// ORMs whose schemas can be introspected
pub const SUPPORTED_ORMS: &[&str] = &["mongoose"];

const TIMESTAMP_FIELDS: [&str; 2] = ["createdAt", "updatedAt"];

/// Normalize every model of the data layer
///
/// Fails without partial results when the application has no data layer or
/// one backed by an unsupported ORM.
pub fn extract_models(data_layer: Option<&DataLayer>) -> Result<IndexMap<String, ModelDescriptor>> {
    let data_layer = data_layer
        .ok_or_else(|| GeneratorError::UnsupportedOrm("no ORM is defined".to_string()))?;

    if !SUPPORTED_ORMS.contains(&data_layer.orm.as_str()) {
        return Err(GeneratorError::UnsupportedOrm(data_layer.orm.clone()));
    }

    Ok(data_layer
        .models
        .iter()
        .map(|(name, model)| (name.clone(), describe_model(name, model)))
        .collect())
}

/// Build the descriptor of a single model
///
/// A model without a schema, without a config, or marked private yields the
/// empty descriptor.
pub fn describe_model(name: &str, model: &AppModel) -> ModelDescriptor {
    let (config, schema) = match (&model.config, &model.schema) {
        (Some(config), Some(schema)) if !config.private => (config, schema),
        (config, schema) => {
            debug!(
                model = %name,
                has_config = config.is_some(),
                has_schema = schema.is_some(),
                "Model is not exposed"
            );
            return ModelDescriptor::default();
        }
    };

    let mut descriptor = ModelDescriptor::new(name);

    if config.tracks_timestamps() {
        descriptor.properties.extend(
            TIMESTAMP_FIELDS
                .iter()
                .map(|field| PropertyDescriptor::timestamp(*field)),
        );
    }

    for (field_name, field) in schema {
        if field.required {
            descriptor.required.push(field_name.clone());
        }

        let property = PropertyDescriptor::new(field_name, TypeMapper::map_type(&field.type_name));

        // A declared timestamp field takes the synthetic one's place
        match descriptor
            .properties
            .iter_mut()
            .find(|p| TypeMapper::is_timestamp(&p.name) && p.name == *field_name)
        {
            Some(existing) => *existing = property,
            None => descriptor.properties.push(property),
        }
    }

    debug!(
        model = %name,
        properties = descriptor.properties.len(),
        required = descriptor.required.len(),
        "Described model"
    );

    descriptor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{ModelConfig, SchemaField, SchemaOptions};
    use sdkpack_common::PropertyKind;

    fn user_schema() -> IndexMap<String, SchemaField> {
        let mut schema = IndexMap::new();
        schema.insert("email".to_string(), SchemaField::new("String", true));
        schema.insert("age".to_string(), SchemaField::new("Number", false));
        schema.insert("active".to_string(), SchemaField::new("Boolean", true));
        schema
    }

    fn exposed(timestamps: bool) -> AppModel {
        AppModel {
            config: Some(ModelConfig {
                private: false,
                schema: Some(SchemaOptions { timestamps }),
            }),
            schema: Some(user_schema()),
        }
    }

    #[test]
    fn test_describe_model_in_document_order() {
        let descriptor = describe_model("User", &exposed(false));

        assert_eq!(descriptor.model_name, "User");
        assert_eq!(descriptor.required, vec!["email", "active"]);
        let names: Vec<&str> = descriptor.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["email", "age", "active"]);
        assert_eq!(descriptor.properties[1].kind, PropertyKind::Number);
    }

    #[test]
    fn test_timestamps_come_first() {
        let descriptor = describe_model("User", &exposed(true));

        let names: Vec<&str> = descriptor.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["createdAt", "updatedAt", "email", "age", "active"]);
        assert_eq!(descriptor.properties[0].kind, PropertyKind::Date);
        assert_eq!(descriptor.properties[0].format.as_deref(), Some("date-time"));
    }

    #[test]
    fn test_declared_timestamp_replaces_synthetic_one() {
        let mut model = exposed(true);
        if let Some(schema) = model.schema.as_mut() {
            schema.insert("updatedAt".to_string(), SchemaField::new("Number", false));
        }

        let descriptor = describe_model("User", &model);
        let names: Vec<&str> = descriptor.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["createdAt", "updatedAt", "email", "age", "active"]);
        assert_eq!(descriptor.properties[1].kind, PropertyKind::Number);
        assert!(descriptor.properties[1].format.is_none());
    }

    #[test]
    fn test_private_model_is_empty() {
        let mut model = exposed(true);
        if let Some(config) = model.config.as_mut() {
            config.private = true;
        }
        assert!(describe_model("Secret", &model).is_empty());
    }

    #[test]
    fn test_missing_schema_or_config_is_empty() {
        let no_config = AppModel {
            config: None,
            schema: Some(user_schema()),
        };
        let no_schema = AppModel {
            config: Some(ModelConfig::default()),
            schema: None,
        };

        assert!(describe_model("A", &no_config).is_empty());
        assert!(describe_model("B", &no_schema).is_empty());
        assert!(describe_model("C", &AppModel::default()).is_empty());
    }

    #[test]
    fn test_unsupported_orm_fails() {
        let layer = DataLayer {
            orm: "sequelize".to_string(),
            models: IndexMap::new(),
        };
        assert!(matches!(
            extract_models(Some(&layer)),
            Err(GeneratorError::UnsupportedOrm(orm)) if orm == "sequelize"
        ));
        assert!(matches!(
            extract_models(None),
            Err(GeneratorError::UnsupportedOrm(_))
        ));
    }

    #[test]
    fn test_extract_models_keeps_every_name() {
        let mut models = IndexMap::new();
        models.insert("User".to_string(), exposed(false));
        models.insert("Hidden".to_string(), AppModel::default());
        let layer = DataLayer {
            orm: "mongoose".to_string(),
            models,
        };

        let extracted = extract_models(Some(&layer)).unwrap();
        assert_eq!(extracted.len(), 2);
        assert!(!extracted["User"].is_empty());
        assert!(extracted["Hidden"].is_empty());
    }
}
