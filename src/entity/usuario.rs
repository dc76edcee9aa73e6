//! User access grants.

// self
use crate::_prelude::*;

/// Access grant linking a login to a builder.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
	/// User login.
	pub login: String,
	/// CNPJ root of the builder the user may act for.
	pub raiz_cnpj_construtora: String,
}
impl Usuario {
	/// Builds a grant record from its parts.
	pub fn new(login: impl Into<String>, raiz_cnpj_construtora: impl Into<String>) -> Self {
		Self { login: login.into(), raiz_cnpj_construtora: raiz_cnpj_construtora.into() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn serializes_with_camel_case_fields() {
		let value = serde_json::to_value(Usuario::new("fiscal.01", "12345678"))
			.expect("Usuario should serialize.");

		assert_eq!(value, serde_json::json!({ "login": "fiscal.01", "raizCnpjConstrutora": "12345678" }));
	}
}
