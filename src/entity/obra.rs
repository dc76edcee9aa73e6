//! Construction site records and their tax registration details.

// self
use crate::{
	_prelude::*,
	entity::{Endereco, Instituicao},
};

/// Enum code received from the service that matches no known variant.
#[derive(Debug, ThisError)]
#[error("Unknown {kind} code {code}.")]
pub struct UnknownCode {
	/// Enum being decoded.
	pub kind: &'static str,
	/// Offending code.
	pub code: u8,
}

// The service exchanges these enums as their numeric codes.
macro_rules! numeric_codes {
	($name:ident { $($variant:ident = $code:literal),+ $(,)? }) => {
		impl From<$name> for u8 {
			fn from(value: $name) -> Self {
				value as u8
			}
		}
		impl TryFrom<u8> for $name {
			type Error = UnknownCode;

			fn try_from(code: u8) -> Result<Self, Self::Error> {
				match code {
					$($code => Ok(Self::$variant),)+
					_ => Err(UnknownCode { kind: stringify!($name), code }),
				}
			}
		}
	};
}

/// How the site's deductible amount is computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Deducao {
	/// Estimated from the site's declared figures.
	#[default]
	Estimada = 0,
	/// Actual invoiced values.
	ValorReal = 1,
}
numeric_codes!(Deducao { Estimada = 0, ValorReal = 1 });

/// Site location zone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Zona {
	/// Urban zone.
	#[default]
	Urbana = 0,
	/// Rural zone.
	Rural = 1,
}
numeric_codes!(Zona { Urbana = 0, Rural = 1 });

/// Kind of construction work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum TipoObra {
	/// New construction.
	#[default]
	Construcao = 0,
	/// Renovation.
	Reforma = 1,
	/// Demolition.
	Demolicao = 2,
}
numeric_codes!(TipoObra { Construcao = 0, Reforma = 1, Demolicao = 2 });

/// Engineer responsible for the site.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsavelTecnico {
	/// Full name.
	pub nome: String,
	/// CPF.
	pub cpf: String,
	/// Phone number.
	pub fone: Option<String>,
	/// E-mail address.
	pub email: Option<String>,
	/// CREA registration.
	pub crea: String,
}

/// Tax registration details of a site.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObraFiscal {
	/// Location zone.
	pub local: Zona,
	/// Kind of work.
	pub tipo_obra: TipoObra,
	/// CEI registration.
	pub cei: Option<String>,
	/// ART number.
	pub art: Option<String>,
	/// Fiscal indication.
	pub indicacao_fiscal: Option<String>,
	/// Real-estate registration.
	pub inscricao: Option<String>,
	/// Social housing (HIS) flag.
	pub his: bool,
	/// "Minha Casa Minha Vida" housing flag.
	pub hpmcmv: bool,
	/// HIS certificate number.
	pub certificado_his: Option<String>,
	/// Building permit number.
	pub alvara: Option<String>,
	/// Responsible engineer.
	pub responsavel_tecnico: Option<ResponsavelTecnico>,
}

/// Construction site, the unit deductible balances accrue against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Obra {
	/// CNPJ root of the owning builder.
	pub raiz_cnpj_construtora: String,
	/// Site CNPJ, when registered separately.
	pub cnpj: Option<String>,
	/// Site code.
	pub codigo: String,
	/// Short title.
	pub titulo: String,
	/// Site address.
	pub endereco: Endereco,
	/// Free-form description.
	pub descricao: Option<String>,
	/// IBGE municipality code.
	pub codigo_municipio: String,
	/// Party carrying out the work.
	pub construtor: Instituicao,
	/// Party contracting the work.
	pub tomador: Instituicao,
	/// Start date.
	#[serde(with = "time::serde::rfc3339")]
	pub data_inicio: OffsetDateTime,
	/// End date, when finished.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub data_termino: Option<OffsetDateTime>,
	/// Deduction mode.
	pub deducao: Deducao,
	/// Tax registration details.
	pub obra_fiscal: Option<ObraFiscal>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn enums_travel_as_numeric_codes() {
		let fiscal = ObraFiscal {
			local: Zona::Rural,
			tipo_obra: TipoObra::Demolicao,
			..Default::default()
		};
		let value = serde_json::to_value(&fiscal).expect("ObraFiscal should serialize.");

		assert_eq!(value["local"], 1);
		assert_eq!(value["tipoObra"], 2);
		assert_eq!(serde_json::to_value(Deducao::ValorReal).expect("Deducao should serialize."), 1);
		assert_eq!(
			serde_json::from_str::<TipoObra>("1").expect("Known codes should decode."),
			TipoObra::Reforma
		);
		assert!(serde_json::from_str::<Zona>("7").is_err());
	}
}
