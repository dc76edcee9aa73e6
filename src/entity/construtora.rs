//! Builder records.

// self
use crate::{_prelude::*, entity::Endereco};

/// Builder (construction company) owning one or more sites.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Construtora {
	/// CNPJ root (first eight digits).
	pub raiz_cnpj: String,
	/// Legal name.
	pub razao_social: String,
	/// Trade name.
	pub nome_fantasia: Option<String>,
	/// Head-office address.
	pub endereco: Option<Endereco>,
	/// Contact e-mail.
	pub email: Option<String>,
	/// Contact phone.
	pub telefone: Option<String>,
}
