//! User-authored request templates and placeholder substitution.
//!
//! A template is a method, a URL pattern, a body pattern, and static headers. Placeholders use
//! the grammar `\{+(\d)\}`: one or more opening braces, one digit, one closing brace. The whole
//! matched text is the placeholder token, so `{1}` and `{{1}` are distinct tokens. Each token
//! becomes a record field named `URL_<token>` or `BODY_<token>`.

// std
use std::sync::LazyLock;
// crates.io
use oauth2::http::{HeaderName, HeaderValue, Method};
use regex::{Captures, Regex};
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, DispatchError},
};

/// Field-name prefix for placeholders found in the URL pattern.
pub const URL_PREFIX: &str = "URL_";
/// Field-name prefix for placeholders found in the body pattern.
pub const BODY_PREFIX: &str = "BODY_";

static PLACEHOLDER: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\{+(\d)\}").expect("Placeholder pattern should compile."));

/// HTTP methods a template may use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
}
impl HttpMethod {
	/// Upper-case method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
			HttpMethod::Put => "PUT",
			HttpMethod::Patch => "PATCH",
			HttpMethod::Delete => "DELETE",
		}
	}

	/// Whether requests with this method carry the rendered body.
	pub const fn carries_body(self) -> bool {
		matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
	}

	/// Converts into the `http` crate's method type.
	pub fn to_http(self) -> Method {
		match self {
			HttpMethod::Get => Method::GET,
			HttpMethod::Post => Method::POST,
			HttpMethod::Put => Method::PUT,
			HttpMethod::Patch => Method::PATCH,
			HttpMethod::Delete => Method::DELETE,
		}
	}
}
impl FromStr for HttpMethod {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_uppercase().as_str() {
			"GET" => Ok(Self::Get),
			"POST" => Ok(Self::Post),
			"PUT" => Ok(Self::Put),
			"PATCH" => Ok(Self::Patch),
			"DELETE" => Ok(Self::Delete),
			_ => Err(ConfigError::UnsupportedMethod { method: s.to_owned() }),
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl Serialize for HttpMethod {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(self.as_str())
	}
}
impl<'de> Deserialize<'de> for HttpMethod {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		raw.parse().map_err(serde::de::Error::custom)
	}
}

/// How many placeholder tokens are taken from each pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderMode {
	/// Every distinct token, in order of first appearance.
	#[default]
	AllMatches,
	/// Only the first token of each pattern; later tokens stay literal.
	FirstMatch,
}

/// Static header sent with every request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateHeader {
	/// Header name.
	pub key: String,
	/// Header value.
	pub value: String,
}

/// Request template configured for a write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestTemplate {
	/// Display name; also used as the schema identifier.
	#[serde(default)]
	pub name: String,
	/// HTTP method.
	pub method: HttpMethod,
	/// URL pattern.
	pub url: String,
	/// Body pattern.
	#[serde(default, deserialize_with = "null_as_default")]
	pub body: String,
	/// Static headers, in configured order.
	#[serde(default, deserialize_with = "null_as_default")]
	pub headers: Vec<TemplateHeader>,
	#[serde(skip)]
	mode: PlaceholderMode,
}
impl RequestTemplate {
	/// Creates a template from its parts.
	pub fn new(
		name: impl Into<String>,
		method: HttpMethod,
		url: impl Into<String>,
		body: impl Into<String>,
	) -> Self {
		Self {
			name: name.into(),
			method,
			url: url.into(),
			body: body.into(),
			headers: Vec::new(),
			mode: PlaceholderMode::default(),
		}
	}

	/// Parses the host's template JSON and validates its headers.
	pub fn parse(raw: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(raw);
		let template: Self = serde_path_to_error::deserialize(&mut de)
			.map_err(|e| ConfigError::malformed_json("request template", e))?;

		template.validate_headers()?;

		Ok(template)
	}

	/// Appends a static header.
	pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push(TemplateHeader { key: key.into(), value: value.into() });

		self
	}

	/// Selects how placeholders are discovered.
	pub fn with_placeholder_mode(mut self, mode: PlaceholderMode) -> Self {
		self.mode = mode;

		self
	}

	/// Active placeholder mode.
	pub fn placeholder_mode(&self) -> PlaceholderMode {
		self.mode
	}

	/// Placeholder tokens in the URL pattern.
	pub fn url_placeholders(&self) -> Vec<String> {
		placeholders(&self.url, self.mode)
	}

	/// Placeholder tokens in the body pattern.
	pub fn body_placeholders(&self) -> Vec<String> {
		placeholders(&self.body, self.mode)
	}

	/// Record field names this template reads, URL fields first.
	pub fn field_names(&self) -> Vec<String> {
		self.url_placeholders()
			.iter()
			.map(|token| format!("{URL_PREFIX}{token}"))
			.chain(self.body_placeholders().iter().map(|token| format!("{BODY_PREFIX}{token}")))
			.collect()
	}

	/// Substitutes record fields into the URL and body patterns.
	pub fn render(&self, fields: &Map<String, Value>) -> Result<RenderedRequest, DispatchError> {
		let url = substitute(&self.url, &self.url_placeholders(), URL_PREFIX, fields)?;
		let url = Url::parse(&url).map_err(|source| DispatchError::InvalidUrl { url, source })?;
		let body = if self.method.carries_body() {
			Some(substitute(&self.body, &self.body_placeholders(), BODY_PREFIX, fields)?)
		} else {
			None
		};

		Ok(RenderedRequest { method: self.method, url, body, headers: self.headers.clone() })
	}

	/// Serializes the template back into the host's form JSON.
	pub fn to_form_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}

	fn validate_headers(&self) -> Result<(), ConfigError> {
		for header in &self.headers {
			let valid = HeaderName::from_bytes(header.key.as_bytes()).is_ok()
				&& HeaderValue::from_str(&header.value).is_ok();

			if !valid {
				return Err(ConfigError::InvalidHeader { name: header.key.clone() });
			}
		}

		Ok(())
	}
}

/// Concrete request produced for one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedRequest {
	/// HTTP method.
	pub method: HttpMethod,
	/// Absolute URL after substitution.
	pub url: Url,
	/// Body after substitution, for methods that carry one.
	pub body: Option<String>,
	/// Static headers copied from the template.
	pub headers: Vec<TemplateHeader>,
}

fn placeholders(pattern: &str, mode: PlaceholderMode) -> Vec<String> {
	let mut tokens = Vec::<String>::new();

	for found in PLACEHOLDER.find_iter(pattern) {
		if !tokens.iter().any(|t| t == found.as_str()) {
			tokens.push(found.as_str().to_owned());
		}
		if mode == PlaceholderMode::FirstMatch {
			break;
		}
	}

	tokens
}

fn substitute(
	pattern: &str,
	tokens: &[String],
	prefix: &str,
	fields: &Map<String, Value>,
) -> Result<String, DispatchError> {
	let mut values = HashMap::with_capacity(tokens.len());

	for token in tokens {
		let field = format!("{prefix}{token}");
		let value = fields.get(&field).ok_or(DispatchError::MissingField { field })?;

		values.insert(token.as_str(), field_text(value));
	}

	let rendered = PLACEHOLDER.replace_all(pattern, |caps: &Captures| {
		let token = &caps[0];

		values.get(token).cloned().unwrap_or_else(|| token.to_owned())
	});

	Ok(rendered.into_owned())
}

fn field_text(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		Value::Null => String::new(),
		other => other.to_string(),
	}
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: serde::Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn fields(value: Value) -> Map<String, Value> {
		match value {
			Value::Object(map) => map,
			_ => panic!("Fixture must be a JSON object."),
		}
	}

	#[test]
	fn parse_reads_the_host_form() {
		let template = RequestTemplate::parse(
			r#"{
				"Name": "Create item",
				"Method": "post",
				"Url": "https://api.example.com/items/{1}",
				"Body": "{\"name\":\"{2}\"}",
				"Headers": [{ "Key": "X-Tenant", "Value": "acme" }]
			}"#,
		)
		.expect("Template should parse.");

		assert_eq!(template.method, HttpMethod::Post);
		assert_eq!(template.headers, vec![TemplateHeader { key: "X-Tenant".into(), value: "acme".into() }]);
		assert_eq!(template.field_names(), vec!["URL_{1}", "BODY_{2}"]);
	}

	#[test]
	fn parse_rejects_bad_methods_and_headers() {
		let err = RequestTemplate::parse(r#"{"Method":"TRACE","Url":"https://x.test/"}"#)
			.expect_err("TRACE must be rejected.");

		assert!(err.to_string().contains("request template"));

		let err = RequestTemplate::parse(
			r#"{"Method":"GET","Url":"https://x.test/","Headers":[{"Key":"Bad Header","Value":"v"}]}"#,
		)
		.expect_err("Header names with spaces must be rejected.");

		assert!(matches!(err, ConfigError::InvalidHeader { ref name } if name == "Bad Header"));
	}

	#[test]
	fn null_body_and_headers_default_to_empty() {
		let template = RequestTemplate::parse(
			r#"{"Name":"n","Method":"GET","Url":"https://x.test/","Body":null,"Headers":null}"#,
		)
		.expect("Nulls should be accepted.");

		assert!(template.body.is_empty());
		assert!(template.headers.is_empty());
		assert!(template.field_names().is_empty());
	}

	#[test]
	fn placeholder_tokens_keep_their_braces() {
		let template = RequestTemplate::new(
			"t",
			HttpMethod::Get,
			"https://x.test/{2}/{1}/{{3}/{2}/{12}",
			"",
		);

		assert_eq!(template.url_placeholders(), vec!["{2}", "{1}", "{{3}"]);

		let first = template.with_placeholder_mode(PlaceholderMode::FirstMatch);

		assert_eq!(first.url_placeholders(), vec!["{2}"]);
	}

	#[test]
	fn render_substitutes_every_occurrence() {
		let template = RequestTemplate::new(
			"t",
			HttpMethod::Put,
			"https://api.example.com/{1}/children/{1}",
			"{\"n\":{2},\"s\":\"{3}\",\"z\":\"{4}\"}",
		);
		let rendered = template
			.render(&fields(json!({
				"URL_{1}": "a",
				"BODY_{2}": 7,
				"BODY_{3}": "x",
				"BODY_{4}": null,
			})))
			.expect("Render should succeed.");

		assert_eq!(rendered.url.as_str(), "https://api.example.com/a/children/a");
		assert_eq!(rendered.body.as_deref(), Some("{\"n\":7,\"s\":\"x\",\"z\":\"\"}"));
	}

	#[test]
	fn render_reports_missing_fields_and_bad_urls() {
		let template = RequestTemplate::new("t", HttpMethod::Get, "{1}", "");
		let err = template.render(&Map::new()).expect_err("Missing field must fail.");

		assert!(matches!(err, DispatchError::MissingField { ref field } if field == "URL_{1}"));

		let err = template
			.render(&fields(json!({ "URL_{1}": "not a url" })))
			.expect_err("Relative URL must fail.");

		assert!(matches!(err, DispatchError::InvalidUrl { .. }));
	}

	#[test]
	fn first_match_leaves_later_tokens_literal() {
		let template = RequestTemplate::new("t", HttpMethod::Delete, "https://x.test/{1}?v={2}", "{3}")
			.with_placeholder_mode(PlaceholderMode::FirstMatch);
		let rendered =
			template.render(&fields(json!({ "URL_{1}": "9" }))).expect("Render should succeed.");

		assert_eq!(rendered.url.as_str(), "https://x.test/9?v={2}");
		assert_eq!(rendered.body, None);
	}
}
