//! Write schemas derived from request templates, plus the configuration form shown to users.

// crates.io
use serde_json::{Value, json};
// self
use crate::{_prelude::*, template::RequestTemplate};

/// Direction of data flow for a schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataFlowDirection {
	/// Records flow from the host to the remote API.
	Write,
}

/// Value type of a schema property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
	/// Free-form text.
	String,
}

/// One record field the template reads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Property {
	/// Field identifier, e.g. `URL_{1}`.
	pub id: String,
	/// Display name; same as `id`.
	pub name: String,
	/// Always empty.
	pub description: String,
	/// Always [`PropertyType::String`].
	#[serde(rename = "Type")]
	pub property_type: PropertyType,
	/// Always empty.
	pub type_at_source: String,
}
impl Property {
	fn string(id: String) -> Self {
		Self {
			name: id.clone(),
			id,
			description: String::new(),
			property_type: PropertyType::String,
			type_at_source: String::new(),
		}
	}
}

/// Write-target schema handed to the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WriteSchema {
	/// Template name.
	pub id: String,
	/// Template name.
	pub name: String,
	/// Always empty.
	pub description: String,
	/// Always [`DataFlowDirection::Write`].
	pub data_flow_direction: DataFlowDirection,
	/// URL pattern of the template.
	pub query: String,
	/// Template serialized as form JSON; read back when a write is prepared.
	pub publisher_meta_json: String,
	/// One property per placeholder.
	pub properties: Vec<Property>,
}

/// Derives [`WriteSchema`] values from templates.
#[derive(Clone, Copy, Debug, Default)]
pub struct SchemaDeriver;
impl SchemaDeriver {
	/// Builds the schema: URL properties first, then body properties, each in first-appearance
	/// order.
	pub fn derive(&self, template: &RequestTemplate) -> Result<WriteSchema, serde_json::Error> {
		Ok(WriteSchema {
			id: template.name.clone(),
			name: template.name.clone(),
			description: String::new(),
			data_flow_direction: DataFlowDirection::Write,
			query: template.url.clone(),
			publisher_meta_json: template.to_form_json()?,
			properties: template.field_names().into_iter().map(Property::string).collect(),
		})
	}
}

/// JSON schema of the write configuration form.
pub fn write_form_schema() -> Value {
	json!({
		"type": "object",
		"properties": {
			"Name": { "type": "string", "title": "Name", "description": "Name of the request." },
			"Method": {
				"type": "string",
				"title": "Method",
				"description": "HTTP method of the request.",
				"enum": ["GET", "POST", "PUT", "PATCH", "DELETE"]
			},
			"Url": {
				"type": "string",
				"title": "Url",
				"description": "Request URL. Use {1}, {2}, ... for values taken from each record."
			},
			"Body": {
				"type": "string",
				"title": "Body",
				"description": "Request body. Use {1}, {2}, ... for values taken from each record."
			},
			"Headers": {
				"type": "array",
				"title": "Headers",
				"description": "Headers sent with every request.",
				"items": {
					"type": "object",
					"properties": {
						"Key": { "type": "string", "title": "Key" },
						"Value": { "type": "string", "title": "Value" }
					},
					"required": ["Key", "Value"]
				}
			}
		},
		"required": ["Name", "Method", "Url"]
	})
}

/// UI schema of the write configuration form.
pub fn write_form_ui_schema() -> Value {
	json!({
		"ui:order": ["Name", "Method", "Url", "Body", "Headers"],
		"Headers": { "items": { "ui:order": ["Key", "Value"] } },
		"Body": { "ui:widget": "textarea", "ui:options": { "rows": 5 } }
	})
}
