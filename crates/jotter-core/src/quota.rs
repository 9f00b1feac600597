//! Storage quota rules.
//!
//! Every note mutation is described by a [`SizeChange`]. Before the mutation
//! is persisted, [`QuotaValidator::validate`] resolves the user's limits
//! (premium override or free-tier defaults), checks three independent
//! ceilings in a fixed order and, if all pass, commits the size delta to the
//! user's monthly usage counter.
//!
//! | Ceiling | Compared value | Violation |
//! |---------|----------------|-----------|
//! | attachment | size of the file being added | [`QuotaViolation::Attachment`] |
//! | total | delta + usage so far this month | [`QuotaViolation::Total`] |
//! | note | note size after the mutation | [`QuotaViolation::Note`] |

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::codes::ErrorCode;
use crate::defaults;
use crate::error::{Error, Result};
use crate::models::Subscription;
use crate::size::humanize_size;
use crate::traits::{PremiumRepository, QuotaRepository, SettingsRepository};

// =============================================================================
// LIMITS
// =============================================================================

/// Byte ceilings applied to one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuotaLimits {
    /// Max size of a single note (text + all attachments).
    pub note_max_size: i64,
    /// Max usage per calendar month.
    pub total_max_size: i64,
    /// Max size of a single attachment.
    pub attachments_max_size: i64,
}

/// Free-tier limits as configured in the settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultLimits {
    pub limits: QuotaLimits,
    /// Attachment ceiling advertised to free users in the upgrade message.
    pub premium_attachment_max_size: i64,
}

impl DefaultLimits {
    /// Settings keys read by [`DefaultLimits::from_settings`].
    pub const KEYS: [&'static str; 4] = [
        defaults::KEY_NOTE_MAX_SIZE,
        defaults::KEY_MONTH_USAGE_QUOTA,
        defaults::KEY_ATTACHMENT_MAX_SIZE,
        defaults::KEY_ATTACHMENT_MAX_SIZE_PREMIUM,
    ];

    /// Build defaults from raw settings values.
    ///
    /// Missing keys use the compiled defaults. Values that are not integers
    /// also fall back, with a warning naming the key.
    pub fn from_settings(settings: &HashMap<String, String>) -> Self {
        let read = |key: &str, fallback: i64| -> i64 {
            match settings.get(key) {
                None => fallback,
                Some(raw) => match raw.trim().parse::<i64>() {
                    Ok(v) => v,
                    Err(_) => {
                        warn!(
                            subsystem = "quota",
                            component = "limits",
                            key,
                            value = %raw,
                            "Unparsable quota setting, using compiled default"
                        );
                        fallback
                    }
                },
            }
        };

        Self {
            limits: QuotaLimits {
                note_max_size: read(defaults::KEY_NOTE_MAX_SIZE, defaults::NOTE_MAX_SIZE),
                total_max_size: read(
                    defaults::KEY_MONTH_USAGE_QUOTA,
                    defaults::MONTH_USAGE_QUOTA,
                ),
                attachments_max_size: read(
                    defaults::KEY_ATTACHMENT_MAX_SIZE,
                    defaults::ATTACHMENT_MAX_SIZE,
                ),
            },
            premium_attachment_max_size: read(
                defaults::KEY_ATTACHMENT_MAX_SIZE_PREMIUM,
                defaults::ATTACHMENT_MAX_SIZE_PREMIUM,
            ),
        }
    }
}

impl Default for DefaultLimits {
    fn default() -> Self {
        Self::from_settings(&HashMap::new())
    }
}

/// Per-user limits record of a premium account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumLimits {
    pub user_id: i64,
    pub note_max_size: i64,
    pub total_max_size: i64,
    pub attachments_max_size: i64,
}

impl PremiumLimits {
    pub fn limits(&self) -> QuotaLimits {
        QuotaLimits {
            note_max_size: self.note_max_size,
            total_max_size: self.total_max_size,
            attachments_max_size: self.attachments_max_size,
        }
    }
}

/// Which source the limits were taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Premium,
}

/// Limits resolved for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserLimits {
    pub tier: Tier,
    pub limits: QuotaLimits,
    /// Active subscription, whether or not a premium limits record exists.
    pub premium_active: bool,
}

/// Pick the limits that apply to a user.
///
/// Premium limits apply only when the user has an active subscription *and*
/// a premium limits record; anything else gets the configured defaults.
pub fn resolve_limits(
    user_id: Option<i64>,
    subscription: Option<&Subscription>,
    premium_limits: Option<&PremiumLimits>,
    defaults: &DefaultLimits,
) -> UserLimits {
    let premium_active = subscription.map(Subscription::is_premium).unwrap_or(false);

    match (user_id, premium_active, premium_limits) {
        (Some(id), true, Some(record)) if id != 0 => UserLimits {
            tier: Tier::Premium,
            limits: record.limits(),
            premium_active,
        },
        _ => UserLimits {
            tier: Tier::Free,
            limits: defaults.limits,
            premium_active,
        },
    }
}

// =============================================================================
// SIZE CHANGES
// =============================================================================

/// Size accounting for one note mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizeChange {
    pub user_id: i64,
    /// Note size before the mutation (0 for a new note).
    pub prev_size: i64,
    /// Note size after the mutation.
    pub new_size: i64,
    /// Size of the attachment being added, 0 when none is.
    pub attachment_size: i64,
}

impl SizeChange {
    /// Value compared against the attachment ceiling.
    pub fn attachments_size(&self) -> i64 {
        self.attachment_size.max(0)
    }

    /// Growth counted towards monthly usage. Shrinking counts as zero.
    pub fn total_size(&self) -> i64 {
        self.new_size.saturating_sub(self.prev_size).max(0)
    }

    /// Value compared against the note ceiling.
    pub fn note_size(&self) -> i64 {
        self.new_size.max(0)
    }
}

/// First day of the usage period containing `day`.
pub fn usage_period(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

// =============================================================================
// VIOLATIONS
// =============================================================================

/// A storage ceiling that a mutation would exceed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuotaViolation {
    #[error("attachment of {size} bytes exceeds {max_size} bytes")]
    Attachment {
        size: i64,
        max_size: i64,
        /// User holds an active subscription.
        premium: bool,
        /// Ceiling offered to free users who upgrade.
        premium_max_size: i64,
    },

    #[error("note of {size} bytes exceeds {max_size} bytes")]
    Note { size: i64, max_size: i64 },

    #[error("monthly usage of {size} bytes exceeds {max_size} bytes")]
    Total { size: i64, max_size: i64 },
}

impl QuotaViolation {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Attachment { premium: true, .. } => {
                ErrorCode::ATTACHMENT_SIZE_QUOTA_EXCEED_PREMIUM
            }
            Self::Attachment { premium: false, .. } => {
                ErrorCode::ATTACHMENT_SIZE_QUOTA_EXCEED_STANDARD
            }
            Self::Note { .. } => ErrorCode::NOTE_SIZE_QUOTA_EXCEED,
            Self::Total { .. } => ErrorCode::TOTAL_SIZE_QUOTA_EXCEED,
        }
    }

    /// User-facing message with the applicable limits filled in.
    pub fn message(&self) -> String {
        match self {
            Self::Attachment {
                max_size,
                premium: true,
                ..
            } => format!(
                "Unfortunately, the file size exceeds {}.",
                humanize_size(*max_size)
            ),
            Self::Attachment {
                max_size,
                premium: false,
                premium_max_size,
                ..
            } => format!(
                "You will not be able to upload the file, as its size exceeds {}. \
                 You can switch to Project Pro to be able to upload files up to {}.",
                humanize_size(*max_size),
                humanize_size(*premium_max_size)
            ),
            Self::Note { max_size, .. } => format!(
                "Unfortunately, the size of the note exceeds {}. \
                 If you would like to create notes of larger size, \
                 you have to upgrade your subscription to Project Pro",
                humanize_size(*max_size)
            ),
            Self::Total { .. } => ErrorCode::TOTAL_SIZE_QUOTA_EXCEED.message().to_string(),
        }
    }
}

// =============================================================================
// CHECKER
// =============================================================================

/// The three ceiling checks for one user at one point in time.
#[derive(Debug, Clone, Copy)]
pub struct QuotaChecker {
    limits: UserLimits,
    usage: i64,
    premium_attachment_max_size: i64,
}

impl QuotaChecker {
    pub fn new(limits: UserLimits, usage: i64, premium_attachment_max_size: i64) -> Self {
        Self {
            limits,
            usage,
            premium_attachment_max_size,
        }
    }

    pub fn limits(&self) -> &UserLimits {
        &self.limits
    }

    pub fn usage(&self) -> i64 {
        self.usage
    }

    pub fn check_attachment_limit(&self, size: i64) -> std::result::Result<(), QuotaViolation> {
        let max_size = self.limits.limits.attachments_max_size;
        if size > 0 && size > max_size {
            return Err(QuotaViolation::Attachment {
                size,
                max_size,
                premium: self.limits.premium_active,
                premium_max_size: self.premium_attachment_max_size,
            });
        }
        Ok(())
    }

    pub fn check_total_limit(&self, size: i64) -> std::result::Result<(), QuotaViolation> {
        let max_size = self.limits.limits.total_max_size;
        let used = size.saturating_add(self.usage);
        if used > 0 && used > max_size {
            return Err(QuotaViolation::Total {
                size: used,
                max_size,
            });
        }
        Ok(())
    }

    pub fn check_note_limit(&self, size: i64) -> std::result::Result<(), QuotaViolation> {
        let max_size = self.limits.limits.note_max_size;
        if size > max_size {
            return Err(QuotaViolation::Note { size, max_size });
        }
        Ok(())
    }

    /// Run attachment, total and note checks in that order.
    pub fn check(&self, change: &SizeChange) -> std::result::Result<(), QuotaViolation> {
        self.check_attachment_limit(change.attachments_size())?;
        self.check_total_limit(change.total_size())?;
        self.check_note_limit(change.note_size())
    }
}

// =============================================================================
// VALIDATOR
// =============================================================================

/// Limits and usage for one user, as reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuotaSnapshot {
    #[serde(flatten)]
    pub limits: UserLimits,
    pub usage: i64,
    pub period_start: NaiveDate,
}

/// Validates note mutations against a user's limits and records usage.
#[derive(Clone)]
pub struct QuotaValidator {
    quotas: Arc<dyn QuotaRepository>,
    premium: Arc<dyn PremiumRepository>,
    settings: Arc<dyn SettingsRepository>,
}

impl QuotaValidator {
    pub fn new(
        quotas: Arc<dyn QuotaRepository>,
        premium: Arc<dyn PremiumRepository>,
        settings: Arc<dyn SettingsRepository>,
    ) -> Self {
        Self {
            quotas,
            premium,
            settings,
        }
    }

    async fn defaults(&self) -> Result<DefaultLimits> {
        let values = self.settings.get_many(&DefaultLimits::KEYS).await?;
        Ok(DefaultLimits::from_settings(&values))
    }

    /// Resolve the limits for a user. `None` (or id 0) yields the defaults.
    pub async fn user_limits(&self, user_id: Option<i64>) -> Result<UserLimits> {
        let defaults = self.defaults().await?;
        self.resolve(user_id, &defaults).await
    }

    async fn resolve(&self, user_id: Option<i64>, defaults: &DefaultLimits) -> Result<UserLimits> {
        let Some(id) = user_id.filter(|id| *id != 0) else {
            return Ok(resolve_limits(None, None, None, defaults));
        };

        let subscription = self.premium.subscription(id).await?;
        let premium_limits = match &subscription {
            Some(sub) if sub.is_premium() => self.premium.premium_limits(id).await?,
            _ => None,
        };
        let limits = resolve_limits(
            Some(id),
            subscription.as_ref(),
            premium_limits.as_ref(),
            defaults,
        );

        debug!(
            subsystem = "quota",
            component = "limits",
            user_id = id,
            tier = ?limits.tier,
            premium_active = limits.premium_active,
            "Resolved user limits"
        );
        Ok(limits)
    }

    /// Limits and current usage without mutating anything.
    pub async fn snapshot(&self, user_id: i64) -> Result<QuotaSnapshot> {
        self.snapshot_on(user_id, Utc::now().date_naive()).await
    }

    pub async fn snapshot_on(&self, user_id: i64, today: NaiveDate) -> Result<QuotaSnapshot> {
        let limits = self.user_limits(Some(user_id)).await?;
        let period_start = usage_period(today);
        let usage = self.quotas.usage(user_id, period_start).await?;
        Ok(QuotaSnapshot {
            limits,
            usage,
            period_start,
        })
    }

    /// Check a mutation and commit its growth to the usage counter.
    ///
    /// Returns the usage after commit. A violation leaves usage untouched.
    pub async fn validate(&self, change: &SizeChange) -> Result<i64> {
        self.validate_on(change, Utc::now().date_naive()).await
    }

    pub async fn validate_on(&self, change: &SizeChange, today: NaiveDate) -> Result<i64> {
        let defaults = self.defaults().await?;
        let limits = self.resolve(Some(change.user_id), &defaults).await?;
        let period = usage_period(today);
        let usage = self.quotas.usage(change.user_id, period).await?;

        let checker = QuotaChecker::new(limits, usage, defaults.premium_attachment_max_size);
        if let Err(violation) = checker.check(change) {
            info!(
                subsystem = "quota",
                component = "validator",
                op = "validate",
                user_id = change.user_id,
                error_code = violation.code().value(),
                prev_size = change.prev_size,
                new_size = change.new_size,
                attachment_size = change.attachment_size,
                usage_bytes = usage,
                "Quota violation"
            );
            return Err(Error::Quota(violation));
        }

        let delta = change.total_size();
        if delta == 0 {
            return Ok(usage);
        }

        let ceiling = limits.limits.total_max_size;
        match self
            .quotas
            .try_add_usage(change.user_id, period, delta, ceiling)
            .await?
        {
            Some(new_usage) => {
                debug!(
                    subsystem = "quota",
                    component = "validator",
                    op = "commit_usage",
                    user_id = change.user_id,
                    size_bytes = delta,
                    usage_bytes = new_usage,
                    "Usage committed"
                );
                Ok(new_usage)
            }
            // Another writer consumed the remaining quota after our check.
            None => Err(Error::Quota(QuotaViolation::Total {
                size: usage.saturating_add(delta),
                max_size: ceiling,
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryPremiumRepository, MemoryQuotaRepository, MemorySettingsRepository};
    use crate::models::PremiumStatus;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const MB: i64 = 1024 * 1024;

    fn defaults() -> DefaultLimits {
        DefaultLimits {
            limits: QuotaLimits {
                note_max_size: 10 * MB,
                total_max_size: 60 * MB,
                attachments_max_size: 5 * MB,
            },
            premium_attachment_max_size: 100 * MB,
        }
    }

    fn subscription(user_id: i64, status: PremiumStatus) -> Subscription {
        Subscription {
            user_id,
            status,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
        }
    }

    fn premium_record(user_id: i64) -> PremiumLimits {
        PremiumLimits {
            user_id,
            note_max_size: 50 * MB,
            total_max_size: 1024 * MB,
            attachments_max_size: 50 * MB,
        }
    }

    fn free_checker(usage: i64) -> QuotaChecker {
        let limits = resolve_limits(Some(1), None, None, &defaults());
        QuotaChecker::new(limits, usage, 100 * MB)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    struct Fixture {
        quotas: Arc<MemoryQuotaRepository>,
        premium: Arc<MemoryPremiumRepository>,
        validator: QuotaValidator,
    }

    fn fixture() -> Fixture {
        let quotas = Arc::new(MemoryQuotaRepository::new());
        let premium = Arc::new(MemoryPremiumRepository::new());
        let settings = Arc::new(MemorySettingsRepository::new());
        settings.insert(defaults::KEY_NOTE_MAX_SIZE, (10 * MB).to_string());
        settings.insert(defaults::KEY_MONTH_USAGE_QUOTA, (60 * MB).to_string());
        settings.insert(defaults::KEY_ATTACHMENT_MAX_SIZE, (5 * MB).to_string());
        settings.insert(
            defaults::KEY_ATTACHMENT_MAX_SIZE_PREMIUM,
            (100 * MB).to_string(),
        );
        let validator = QuotaValidator::new(quotas.clone(), premium.clone(), settings);
        Fixture {
            quotas,
            premium,
            validator,
        }
    }

    // ─── resolve_limits ──────────────────────────────────────────────────

    #[test]
    fn test_free_user_gets_defaults() {
        let limits = resolve_limits(Some(1), None, None, &defaults());
        assert_eq!(limits.tier, Tier::Free);
        assert_eq!(limits.limits, defaults().limits);
        assert!(!limits.premium_active);
    }

    #[test]
    fn test_active_premium_with_record_gets_premium_limits() {
        let sub = subscription(1, PremiumStatus::Active);
        let record = premium_record(1);
        let limits = resolve_limits(Some(1), Some(&sub), Some(&record), &defaults());
        assert_eq!(limits.tier, Tier::Premium);
        assert_eq!(limits.limits, record.limits());
    }

    #[test]
    fn test_active_premium_without_record_falls_back_to_defaults() {
        let sub = subscription(1, PremiumStatus::Active);
        let limits = resolve_limits(Some(1), Some(&sub), None, &defaults());
        assert_eq!(limits.tier, Tier::Free);
        assert_eq!(limits.limits, defaults().limits);
        assert!(limits.premium_active);
    }

    #[test]
    fn test_inactive_subscription_ignores_record() {
        let record = premium_record(1);
        for status in [
            PremiumStatus::Unpayed,
            PremiumStatus::Expired,
            PremiumStatus::Cancelled,
        ] {
            let sub = subscription(1, status);
            let limits = resolve_limits(Some(1), Some(&sub), Some(&record), &defaults());
            assert_eq!(limits.tier, Tier::Free, "status {:?}", status);
            assert!(!limits.premium_active);
        }
    }

    #[test]
    fn test_missing_or_zero_user_gets_defaults() {
        let sub = subscription(0, PremiumStatus::Active);
        let record = premium_record(0);
        assert_eq!(
            resolve_limits(None, Some(&sub), Some(&record), &defaults()).tier,
            Tier::Free
        );
        assert_eq!(
            resolve_limits(Some(0), Some(&sub), Some(&record), &defaults()).tier,
            Tier::Free
        );
    }

    // ─── DefaultLimits ───────────────────────────────────────────────────

    #[test]
    fn test_default_limits_from_settings() {
        let mut settings = HashMap::new();
        settings.insert(defaults::KEY_NOTE_MAX_SIZE.to_string(), "100".to_string());
        settings.insert(defaults::KEY_MONTH_USAGE_QUOTA.to_string(), " 1000 ".to_string());
        settings.insert(defaults::KEY_ATTACHMENT_MAX_SIZE.to_string(), "lots".to_string());

        let parsed = DefaultLimits::from_settings(&settings);
        assert_eq!(parsed.limits.note_max_size, 100);
        assert_eq!(parsed.limits.total_max_size, 1000);
        assert_eq!(
            parsed.limits.attachments_max_size,
            defaults::ATTACHMENT_MAX_SIZE
        );
        assert_eq!(
            parsed.premium_attachment_max_size,
            defaults::ATTACHMENT_MAX_SIZE_PREMIUM
        );
    }

    // ─── SizeChange ──────────────────────────────────────────────────────

    #[test]
    fn test_size_change_derivations() {
        let grow = SizeChange {
            user_id: 1,
            prev_size: 100,
            new_size: 250,
            attachment_size: 150,
        };
        assert_eq!(grow.attachments_size(), 150);
        assert_eq!(grow.total_size(), 150);
        assert_eq!(grow.note_size(), 250);

        let shrink = SizeChange {
            user_id: 1,
            prev_size: 250,
            new_size: 100,
            attachment_size: 0,
        };
        assert_eq!(shrink.total_size(), 0);
        assert_eq!(shrink.note_size(), 100);
    }

    #[test]
    fn test_usage_period_is_first_of_month() {
        assert_eq!(
            usage_period(today()),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
        let first = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        assert_eq!(usage_period(first), first);
    }

    // ─── QuotaChecker ────────────────────────────────────────────────────

    #[test]
    fn test_attachment_limit() {
        let checker = free_checker(0);
        assert!(checker.check_attachment_limit(0).is_ok());
        assert!(checker.check_attachment_limit(5 * MB).is_ok());
        let err = checker.check_attachment_limit(5 * MB + 1).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ATTACHMENT_SIZE_QUOTA_EXCEED_STANDARD);
    }

    #[test]
    fn test_attachment_violation_flags_premium_even_without_record() {
        let sub = subscription(1, PremiumStatus::Active);
        let limits = resolve_limits(Some(1), Some(&sub), None, &defaults());
        let checker = QuotaChecker::new(limits, 0, 100 * MB);
        let err = checker.check_attachment_limit(6 * MB).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ATTACHMENT_SIZE_QUOTA_EXCEED_PREMIUM);
        assert_eq!(err.message(), "Unfortunately, the file size exceeds 5.0 MB.");
    }

    #[test]
    fn test_standard_attachment_message_advertises_premium_ceiling() {
        let err = free_checker(0).check_attachment_limit(6 * MB).unwrap_err();
        let msg = err.message();
        assert!(msg.contains("exceeds 5.0 MB"), "{}", msg);
        assert!(msg.contains("up to 100.0 MB"), "{}", msg);
    }

    #[test]
    fn test_total_limit_includes_existing_usage() {
        let checker = free_checker(59 * MB);
        assert!(checker.check_total_limit(MB).is_ok());
        let err = checker.check_total_limit(MB + 1).unwrap_err();
        assert_eq!(
            err,
            QuotaViolation::Total {
                size: 60 * MB + 1,
                max_size: 60 * MB
            }
        );
        assert_eq!(err.code(), ErrorCode::TOTAL_SIZE_QUOTA_EXCEED);
    }

    #[test]
    fn test_total_limit_zero_usage_passes_with_zero_ceiling() {
        let limits = UserLimits {
            tier: Tier::Free,
            limits: QuotaLimits {
                note_max_size: 0,
                total_max_size: 0,
                attachments_max_size: 0,
            },
            premium_active: false,
        };
        let checker = QuotaChecker::new(limits, 0, 0);
        assert!(checker.check_total_limit(0).is_ok());
        assert!(checker.check_total_limit(1).is_err());
    }

    #[test]
    fn test_note_limit() {
        let checker = free_checker(0);
        assert!(checker.check_note_limit(10 * MB).is_ok());
        let err = checker.check_note_limit(10 * MB + 1).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NOTE_SIZE_QUOTA_EXCEED);
        assert!(err.message().contains("10.0 MB"));
    }

    #[test]
    fn test_check_order_attachment_before_total_before_note() {
        // Violates all three ceilings; the attachment check wins.
        let checker = free_checker(60 * MB);
        let change = SizeChange {
            user_id: 1,
            prev_size: 0,
            new_size: 20 * MB,
            attachment_size: 20 * MB,
        };
        assert!(matches!(
            checker.check(&change),
            Err(QuotaViolation::Attachment { .. })
        ));

        // Without the attachment the total check wins over the note check.
        let change = SizeChange {
            attachment_size: 0,
            ..change
        };
        assert!(matches!(
            checker.check(&change),
            Err(QuotaViolation::Total { .. })
        ));
    }

    // ─── QuotaValidator ──────────────────────────────────────────────────

    #[tokio::test]
    async fn test_validate_commits_growth() {
        let fx = fixture();
        let change = SizeChange {
            user_id: 7,
            prev_size: 1000,
            new_size: 4000,
            attachment_size: 0,
        };
        let usage = fx.validator.validate_on(&change, today()).await.unwrap();
        assert_eq!(usage, 3000);
        assert_eq!(fx.quotas.current(7, usage_period(today())), Some(3000));
    }

    #[tokio::test]
    async fn test_validate_shrink_does_not_touch_usage() {
        let fx = fixture();
        fx.quotas.set(7, usage_period(today()), 500);
        let change = SizeChange {
            user_id: 7,
            prev_size: 4000,
            new_size: 1000,
            attachment_size: 0,
        };
        let usage = fx.validator.validate_on(&change, today()).await.unwrap();
        assert_eq!(usage, 500);
    }

    #[tokio::test]
    async fn test_validate_violation_leaves_usage_unchanged() {
        let fx = fixture();
        let change = SizeChange {
            user_id: 7,
            prev_size: 0,
            new_size: 11 * MB,
            attachment_size: 0,
        };
        let err = fx.validator.validate_on(&change, today()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NOTE_SIZE_QUOTA_EXCEED);
        assert_eq!(fx.quotas.current(7, usage_period(today())), Some(0));
    }

    #[tokio::test]
    async fn test_validate_uses_premium_limits() {
        let fx = fixture();
        fx.premium
            .set_subscription(subscription(9, PremiumStatus::Active));
        fx.premium.set_limits(premium_record(9));

        let change = SizeChange {
            user_id: 9,
            prev_size: 0,
            new_size: 40 * MB,
            attachment_size: 40 * MB,
        };
        let usage = fx.validator.validate_on(&change, today()).await.unwrap();
        assert_eq!(usage, 40 * MB);
    }

    #[tokio::test]
    async fn test_usage_resets_in_new_month() {
        let fx = fixture();
        let march = today();
        let april = NaiveDate::from_ymd_opt(2026, 4, 2).unwrap();
        fx.quotas.set(7, usage_period(march), 59 * MB);

        let change = SizeChange {
            user_id: 7,
            prev_size: 0,
            new_size: 2 * MB,
            attachment_size: 0,
        };
        assert!(fx.validator.validate_on(&change, march).await.is_err());
        let usage = fx.validator.validate_on(&change, april).await.unwrap();
        assert_eq!(usage, 2 * MB);
    }

    #[tokio::test]
    async fn test_snapshot_reports_limits_and_usage() {
        let fx = fixture();
        fx.quotas.set(3, usage_period(today()), 1234);
        let snapshot = fx.validator.snapshot_on(3, today()).await.unwrap();
        assert_eq!(snapshot.usage, 1234);
        assert_eq!(snapshot.limits.tier, Tier::Free);
        assert_eq!(snapshot.limits.limits.note_max_size, 10 * MB);
        assert_eq!(
            snapshot.period_start,
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
    }

    #[tokio::test]
    async fn test_user_limits_without_user_are_defaults() {
        let fx = fixture();
        let limits = fx.validator.user_limits(None).await.unwrap();
        assert_eq!(limits.tier, Tier::Free);
        assert_eq!(limits.limits.attachments_max_size, 5 * MB);
    }

    /// Reports a fixed usage but refuses every increment, as when another
    /// writer fills the quota between the check and the commit.
    struct ExhaustedOnCommit {
        usage: i64,
        commits: Mutex<Vec<(i64, i64)>>,
    }

    #[async_trait]
    impl QuotaRepository for ExhaustedOnCommit {
        async fn usage(&self, _user_id: i64, _period: NaiveDate) -> Result<i64> {
            Ok(self.usage)
        }

        async fn try_add_usage(
            &self,
            _user_id: i64,
            _period: NaiveDate,
            delta: i64,
            ceiling: i64,
        ) -> Result<Option<i64>> {
            self.commits.lock().unwrap().push((delta, ceiling));
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_lost_commit_reports_total_violation() {
        let quotas = Arc::new(ExhaustedOnCommit {
            usage: MB,
            commits: Mutex::new(Vec::new()),
        });
        let settings = Arc::new(MemorySettingsRepository::new());
        settings.insert(defaults::KEY_MONTH_USAGE_QUOTA, (60 * MB).to_string());
        let validator = QuotaValidator::new(
            quotas.clone(),
            Arc::new(MemoryPremiumRepository::new()),
            settings,
        );

        let change = SizeChange {
            user_id: 7,
            prev_size: 0,
            new_size: 2 * MB,
            attachment_size: 0,
        };
        let err = validator.validate_on(&change, today()).await.unwrap_err();
        match err {
            Error::Quota(QuotaViolation::Total { size, max_size }) => {
                assert_eq!(size, 3 * MB);
                assert_eq!(max_size, 60 * MB);
            }
            other => panic!("expected total violation, got {:?}", other),
        }
        assert_eq!(*quotas.commits.lock().unwrap(), vec![(2 * MB, 60 * MB)]);
        assert_eq!(quotas.usage(7, today()).await.unwrap(), MB);
    }
}
