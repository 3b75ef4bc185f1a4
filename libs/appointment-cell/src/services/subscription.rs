// libs/appointment-cell/src/services/subscription.rs
use std::sync::Arc;

use chrono::Months;
use tracing::info;
use uuid::Uuid;

use shared_database::SubscriptionRepository;
use shared_models::{PlanSubscription, SchedulingError};
use shared_utils::Clock;

use crate::models::RenewalStatus;
use crate::services::windows::PlanRenewalWindow;

/// Monthly plan of a professional and its renewal gate.
pub struct SubscriptionService {
    subscriptions: Arc<dyn SubscriptionRepository>,
    clock: Arc<dyn Clock>,
    window: PlanRenewalWindow,
}

impl SubscriptionService {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>, clock: Arc<dyn Clock>, window: PlanRenewalWindow) -> Self {
        Self {
            subscriptions,
            clock,
            window,
        }
    }

    pub async fn renewal_status(&self, professional_id: Uuid) -> Result<RenewalStatus, SchedulingError> {
        let subscription = self.subscription(professional_id).await?;
        Ok(self.window.evaluate(&subscription, self.clock.now()))
    }

    /// Extend the plan by one calendar month from the later of its expiry and now.
    pub async fn renew_plan(&self, professional_id: Uuid) -> Result<PlanSubscription, SchedulingError> {
        let subscription = self.subscription(professional_id).await?;
        let now = self.clock.now();
        self.window.ensure_open(&subscription, now)?;

        let base = subscription.expires_at.max(now);
        let expires_at = base
            .checked_add_months(Months::new(1))
            .ok_or_else(|| SchedulingError::invalid(format!("cannot extend plan past {}", base)))?;

        let renewed = self
            .subscriptions
            .save_subscription(&PlanSubscription {
                professional_id,
                expires_at,
                updated_at: now,
            })
            .await?;

        info!(
            "Plan of professional {} renewed until {} (was {})",
            professional_id, renewed.expires_at, subscription.expires_at
        );
        Ok(renewed)
    }

    async fn subscription(&self, professional_id: Uuid) -> Result<PlanSubscription, SchedulingError> {
        self.subscriptions
            .get_subscription(professional_id)
            .await?
            .ok_or_else(|| SchedulingError::NotFound(format!("Plan subscription for professional {}", professional_id)))
    }
}
