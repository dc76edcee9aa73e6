//! NFS-e invoice records submitted to increment or amortize a deductible balance.

// self
use crate::{_prelude::*, entity::Instituicao};

/// Service line of an invoice.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Servico {
	/// Municipal service list code.
	pub codigo: String,
	/// Service description.
	pub descricao: String,
	/// ISS rate applied to the service.
	pub aliquota: f64,
}

/// Fields shared by every NFS-e submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nfse {
	/// Issue instant.
	#[serde(with = "time::serde::rfc3339")]
	pub data_emissao: OffsetDateTime,
	/// Free-form description.
	pub descricao: String,
	/// Issuing service provider.
	pub emitente: Instituicao,
	/// Invoice number.
	pub numero: String,
	/// RANFS number, when the invoice came from a RANFS.
	pub numero_ranfs: Option<String>,
	/// Service line.
	pub servico: Servico,
	/// Service taker.
	pub tomador: Instituicao,
	/// Invoice amount.
	pub valor: f64,
	/// Login of the external user submitting the invoice.
	pub usuario_externo: Option<String>,
	/// Site code the invoice applies to.
	pub codigo_obra: String,
}

/// Invoice where the site is the service taker; increments the deductible balance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NfseTomador {
	/// Shared invoice fields.
	#[serde(flatten)]
	pub nfse: Nfse,
}

/// Invoice where the site is the service provider; amortizes the deductible balance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NfsePrestador {
	/// Shared invoice fields.
	#[serde(flatten)]
	pub nfse: Nfse,
	/// Deductions declared on the invoice.
	pub valor_deducoes: f64,
}
