// ABOUTME: Field table for the prop-firm entity edited by the intake wizard

use super::{FieldFormat, FieldKind, FieldSchema, FieldSpec};
use crate::models::EntityKind;

pub const BASIC_INFO: &str = "basicInfo";
pub const CHALLENGE: &str = "challenge";
pub const ACCOUNT_SIZES: &str = "accountSizes";
pub const TRADING_RULES: &str = "tradingRules";
pub const PAYOUTS: &str = "payouts";
pub const PLATFORMS: &str = "platforms";
pub const PUBLISHING: &str = "publishing";

/// Discriminator that decides the default evaluation phases
pub const CHALLENGE_TYPE: &str = "challengeType";
pub const PHASE_COUNT: &str = "phaseCount";
pub const PHASES: &str = "phases";

pub const LOGO: &str = "logo";
pub const LOGO_URL: &str = "logoUrl";

pub const CREATED_BY: &str = "createdBy";
pub const LAST_MODIFIED_BY: &str = "lastModifiedBy";

/// Keys every evaluation phase has to fill in before the challenge step passes
pub const PHASE_REQUIRED_KEYS: &[&str] = &["profitTarget", "maxDailyLoss", "maxTotalLoss"];

impl FieldSchema {
    pub fn firm() -> Self {
        use FieldKind::{Attachment, Flag, List, Number, Records, Text};

        FieldSchema::new(
            EntityKind::Firm,
            vec![
                // Basic info
                FieldSpec::new("name", BASIC_INFO, Text).required(),
                FieldSpec::new("slug", BASIC_INFO, Text)
                    .required()
                    .with_format(FieldFormat::Slug),
                FieldSpec::new("website", BASIC_INFO, Text)
                    .required()
                    .with_format(FieldFormat::Url),
                FieldSpec::new("description", BASIC_INFO, Text),
                FieldSpec::new("foundedYear", BASIC_INFO, Number),
                FieldSpec::new("headquarters", BASIC_INFO, Text),
                FieldSpec::new(LOGO, BASIC_INFO, Attachment),
                FieldSpec::new(LOGO_URL, BASIC_INFO, Attachment),
                FieldSpec::new("leadership", BASIC_INFO, Records(&["name"])),
                // Challenge
                FieldSpec::new(CHALLENGE_TYPE, CHALLENGE, Text).required(),
                FieldSpec::new(PHASE_COUNT, CHALLENGE, Number),
                FieldSpec::new(PHASES, CHALLENGE, Records(PHASE_REQUIRED_KEYS)),
                FieldSpec::new("instantFunding", CHALLENGE, Flag),
                // Account sizes
                FieldSpec::new("accountSizes", ACCOUNT_SIZES, List).required(),
                FieldSpec::new("maxAllocation", ACCOUNT_SIZES, Number),
                // Trading rules
                FieldSpec::new("newsTrading", TRADING_RULES, Flag),
                FieldSpec::new("weekendHolding", TRADING_RULES, Flag),
                FieldSpec::new("expertAdvisors", TRADING_RULES, Flag),
                FieldSpec::new("copyTrading", TRADING_RULES, Flag),
                FieldSpec::new("hedging", TRADING_RULES, Flag),
                FieldSpec::new("scalping", TRADING_RULES, Flag),
                FieldSpec::new("consistencyRule", TRADING_RULES, Flag),
                FieldSpec::new("maxDailyLoss", TRADING_RULES, Number),
                FieldSpec::new("maxTotalLoss", TRADING_RULES, Number),
                // Payouts
                FieldSpec::new("payoutMethods", PAYOUTS, List),
                FieldSpec::new("profitSplit", PAYOUTS, Number).required(),
                FieldSpec::new("payoutFrequency", PAYOUTS, Text),
                FieldSpec::new("firstPayoutDays", PAYOUTS, Number),
                // Platforms
                FieldSpec::new("platforms", PLATFORMS, List).required(),
                FieldSpec::new("instruments", PLATFORMS, List),
                FieldSpec::new("countriesRestricted", PLATFORMS, List),
                // Publishing
                FieldSpec::new("status", PUBLISHING, Text).required(),
                FieldSpec::new("featured", PUBLISHING, Flag),
                FieldSpec::new("discountCode", PUBLISHING, Text),
                // Audit
                FieldSpec::root(CREATED_BY, Text),
                FieldSpec::root(LAST_MODIFIED_BY, Text),
            ],
        )
    }
}
