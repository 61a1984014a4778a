//! Derives the write schema for a request template and renders one record against it.

// crates.io
use color_eyre::Result;
use serde_json::{Map, Value, json};
// self
use web_request_connector::{
	dispatch::Record,
	schema::SchemaDeriver,
	template::{PlaceholderMode, RequestTemplate},
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let template = RequestTemplate::parse(
		&json!({
			"Name": "Update item",
			"Method": "PUT",
			"Url": "https://api.example.com/items/{1}",
			"Body": "{\"name\":\"{2}\",\"tags\":{3}}",
			"Headers": [{ "Key": "X-Tenant", "Value": "acme" }]
		})
		.to_string(),
	)?
	.with_placeholder_mode(PlaceholderMode::AllMatches);
	let schema = SchemaDeriver.derive(&template)?;

	println!("Schema `{}` reads:", schema.id);

	for property in &schema.properties {
		println!("  {}", property.id);
	}

	let record = Record::new(
		"row-1",
		json!({ "URL_{1}": 42, "BODY_{2}": "widget", "BODY_{3}": ["red", "large"] }).to_string(),
	);
	let fields: Map<String, Value> = record.fields()?;
	let rendered = template.render(&fields)?;

	println!("{} {}", rendered.method, rendered.url);
	println!("{}", rendered.body.unwrap_or_default());

	Ok(())
}
