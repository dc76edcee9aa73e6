//! Operation spans and counters.
//!
//! With the `tracing` feature, [`observe`] runs each operation inside a
//! `recom_client.operation` span carrying `op` and `stage`, and logs failures at `debug`.
//! With the `metrics` feature, it bumps `recom_client_operation_total{op, outcome}` once on
//! entry and once on completion. With neither feature the wrapper only awaits the future.

// self
use crate::_prelude::*;

/// Operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Authority discovery document fetch.
	Discovery,
	/// Client Credentials token exchange.
	ClientCredentials,
	/// Password token exchange.
	Password,
	/// Invoice submission that increments a deductible balance.
	IncrementBalance,
	/// Invoice submission that amortizes a deductible balance.
	AmortizeBalance,
	/// Reversal of an increment.
	ReverseIncrement,
	/// Reversal of an amortization.
	ReverseAmortization,
	/// Site existence check.
	SiteExists,
	/// Maximum deductible amount query.
	MaxDeductibleAmount,
	/// Builder registration.
	RegisterBuilder,
	/// Site registration.
	RegisterSite,
	/// User access grant.
	GrantUserAccess,
	/// User access revocation.
	RevokeUserAccess,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::Discovery => "discovery",
			OperationKind::ClientCredentials => "client_credentials",
			OperationKind::Password => "password",
			OperationKind::IncrementBalance => "increment_balance",
			OperationKind::AmortizeBalance => "amortize_balance",
			OperationKind::ReverseIncrement => "reverse_increment",
			OperationKind::ReverseAmortization => "reverse_amortization",
			OperationKind::SiteExists => "site_exists",
			OperationKind::MaxDeductibleAmount => "max_deductible_amount",
			OperationKind::RegisterBuilder => "register_builder",
			OperationKind::RegisterSite => "register_site",
			OperationKind::GrantUserAccess => "grant_user_access",
			OperationKind::RevokeUserAccess => "revoke_user_access",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` as one observed operation.
pub async fn observe<F, T>(kind: OperationKind, stage: &'static str, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	count(kind, Outcome::Attempt);

	#[cfg(feature = "tracing")]
	let result = {
		use tracing::Instrument;

		let span = tracing::info_span!("recom_client.operation", op = kind.as_str(), stage);
		let result = fut.instrument(span.clone()).await;

		if let Err(e) = &result {
			span.in_scope(|| tracing::debug!(error = %e, "operation failed"));
		}

		result
	};
	#[cfg(not(feature = "tracing"))]
	let result = {
		let _ = stage;

		fut.await
	};

	count(kind, if result.is_ok() { Outcome::Success } else { Outcome::Failure });

	result
}

/// Increments the operation counter; a no-op without the `metrics` feature.
pub fn count(kind: OperationKind, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"recom_client_operation_total",
			"op" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}
