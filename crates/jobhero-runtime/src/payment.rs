//! One-time unlock payments.
//!
//! A [`PaymentGateway`] resolves a checkout to a transaction id or fails.
//! [`unlock_entitlement`] flips the entitlement flag only after a
//! successful checkout. The transaction is not verified server-side.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use jobhero_core::{EntitlementError, EntitlementStore, UserInput};

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Payment declined: {0}")]
    Declined(String),

    #[error("Payment cancelled")]
    Cancelled,

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Payment succeeded but the unlock could not be saved: {0}")]
    Entitlement(#[from] EntitlementError),
}

/// Contact details shown pre-filled in the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Amount in the currency's minor unit (paise for INR)
    pub amount_minor: u64,
    pub currency: String,
    pub description: String,
    pub prefill: Prefill,
}

impl CheckoutRequest {
    /// Lifetime elite unlock: 25 INR.
    pub fn elite_unlock(input: &UserInput) -> Self {
        Self {
            amount_minor: 2500,
            currency: "INR".to_string(),
            description: "Elite Unlock (Lifetime)".to_string(),
            prefill: Prefill {
                name: input.full_name.clone(),
                email: input.email.clone(),
                contact: input.phone.clone(),
            },
        }
    }
}

/// A checkout provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Run a checkout, resolving to the transaction id.
    async fn checkout(&self, request: &CheckoutRequest) -> Result<String, PaymentError>;

    fn name(&self) -> &str;
}

/// Gateway used when no real checkout key is configured.
#[derive(Debug, Clone, Default)]
pub struct SimulatedGateway {
    decline_reason: Option<String>,
}

impl SimulatedGateway {
    /// Every checkout succeeds.
    pub fn approving() -> Self {
        Self::default()
    }

    /// Every checkout is declined with `reason`.
    pub fn declining(reason: impl Into<String>) -> Self {
        Self {
            decline_reason: Some(reason.into()),
        }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn checkout(&self, request: &CheckoutRequest) -> Result<String, PaymentError> {
        if let Some(reason) = &self.decline_reason {
            return Err(PaymentError::Declined(reason.clone()));
        }

        warn!(
            amount_minor = request.amount_minor,
            currency = %request.currency,
            "No payment key configured, simulating a successful checkout"
        );
        Ok(format!("SIM_TEST_{}", Utc::now().timestamp_millis()))
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

/// Proof of a completed unlock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockReceipt {
    pub transaction_id: String,
    pub gateway: String,
    pub amount_minor: u64,
    pub currency: String,
    pub unlocked_at: DateTime<Utc>,
}

/// Check out through `gateway`, then persist the unlock in `store`.
///
/// The flag is untouched when the checkout fails.
pub async fn unlock_entitlement(
    gateway: &dyn PaymentGateway,
    store: &dyn EntitlementStore,
    request: &CheckoutRequest,
) -> Result<UnlockReceipt, PaymentError> {
    let transaction_id = gateway.checkout(request).await?;
    if transaction_id.trim().is_empty() {
        return Err(PaymentError::Gateway(
            "gateway returned an empty transaction id".to_string(),
        ));
    }

    store.set(true)?;
    info!(
        gateway = gateway.name(),
        transaction_id = %transaction_id,
        "Elite unlock recorded"
    );

    Ok(UnlockReceipt {
        transaction_id,
        gateway: gateway.name().to_string(),
        amount_minor: request.amount_minor,
        currency: request.currency.clone(),
        unlocked_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobhero_core::{
        template_access, MemoryEntitlementStore, ResumeTemplate, TemplateAccess,
    };

    struct BlankGateway;

    #[async_trait]
    impl PaymentGateway for BlankGateway {
        async fn checkout(&self, _request: &CheckoutRequest) -> Result<String, PaymentError> {
            Ok("  ".to_string())
        }

        fn name(&self) -> &str {
            "blank"
        }
    }

    fn request() -> CheckoutRequest {
        CheckoutRequest::elite_unlock(&UserInput {
            full_name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            phone: "98765".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_elite_unlock_request() {
        let request = request();
        assert_eq!(request.amount_minor, 2500);
        assert_eq!(request.currency, "INR");
        assert_eq!(request.description, "Elite Unlock (Lifetime)");
        assert_eq!(request.prefill.contact, "98765");
    }

    #[tokio::test]
    async fn test_simulated_unlock_sets_flag() {
        let store = MemoryEntitlementStore::default();
        assert_eq!(
            template_access(&store, ResumeTemplate::Elegant).unwrap(),
            TemplateAccess::RequiresUnlock
        );

        let receipt = unlock_entitlement(&SimulatedGateway::approving(), &store, &request())
            .await
            .unwrap();

        assert!(receipt.transaction_id.starts_with("SIM_TEST_"));
        assert_eq!(receipt.gateway, "simulated");
        assert!(store.get().unwrap());
        assert_eq!(
            template_access(&store, ResumeTemplate::Elegant).unwrap(),
            TemplateAccess::Granted
        );
    }

    #[tokio::test]
    async fn test_declined_leaves_flag_unset() {
        let store = MemoryEntitlementStore::default();
        let err = unlock_entitlement(&SimulatedGateway::declining("card expired"), &store, &request())
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Declined(ref r) if r == "card expired"));
        assert!(!store.get().unwrap());
    }

    #[tokio::test]
    async fn test_empty_transaction_rejected() {
        let store = MemoryEntitlementStore::default();
        let err = unlock_entitlement(&BlankGateway, &store, &request())
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Gateway(_)));
        assert!(!store.get().unwrap());
    }
}
