//! Plain records exchanged with the Recom API.
//!
//! These types carry no behavior; they only fix the JSON shape expected by the service:
//! camelCase field names, RFC 3339 date-times and numeric enum codes.

pub mod construtora;
pub mod nfse;
pub mod obra;
pub mod usuario;

pub use construtora::*;
pub use nfse::*;
pub use obra::*;
pub use usuario::*;

// self
use crate::_prelude::*;

/// Postal address.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endereco {
	/// Street name.
	pub logradouro: String,
	/// Street number.
	pub numero: String,
	/// Additional address line.
	pub complemento: Option<String>,
	/// Neighbourhood.
	pub bairro: String,
	/// Postal code (CEP).
	pub cep: String,
	/// IBGE municipality code.
	pub codigo_municipio: String,
	/// State abbreviation.
	pub uf: String,
}

/// Party (company or person) referenced by invoices and sites.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instituicao {
	/// CNPJ or CPF.
	pub cnpj: String,
	/// Legal name.
	pub razao_social: String,
	/// Municipal registration.
	pub inscricao_municipal: Option<String>,
	/// Address.
	pub endereco: Option<Endereco>,
}
