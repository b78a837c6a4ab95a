// ABOUTME: Ordered registry of wizard steps
// Each step owns one schema section and names the rendering unit that draws it

use crate::schema::firm::{
    ACCOUNT_SIZES, BASIC_INFO, CHALLENGE, PAYOUTS, PLATFORMS, PUBLISHING, TRADING_RULES,
};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Step registry must contain at least one step")]
    Empty,
    #[error("Step {found} is out of order, expected step {expected}")]
    OutOfOrder { expected: usize, found: usize },
}

/// One page of the wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDescriptor {
    /// 1-indexed position
    pub number: usize,
    pub title: &'static str,
    pub description: &'static str,
    /// Schema section whose fields this step validates
    pub section: &'static str,
    /// Rendering unit responsible for the step's fields
    pub renderer: &'static str,
}

impl StepDescriptor {
    pub const fn new(
        number: usize,
        title: &'static str,
        description: &'static str,
        section: &'static str,
        renderer: &'static str,
    ) -> Self {
        Self {
            number,
            title,
            description,
            section,
            renderer,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepRegistry {
    steps: Vec<StepDescriptor>,
}

impl StepRegistry {
    pub fn new(steps: Vec<StepDescriptor>) -> Result<Self, RegistryError> {
        if steps.is_empty() {
            return Err(RegistryError::Empty);
        }
        for (index, step) in steps.iter().enumerate() {
            if step.number != index + 1 {
                return Err(RegistryError::OutOfOrder {
                    expected: index + 1,
                    found: step.number,
                });
            }
        }
        Ok(Self { steps })
    }

    /// Steps of the new/edit firm wizard
    pub fn firm() -> Self {
        Self {
            steps: vec![
                StepDescriptor::new(1, "Basic Info", "Name, website and leadership", BASIC_INFO, "BasicInfoStep"),
                StepDescriptor::new(2, "Challenge", "Evaluation type and phases", CHALLENGE, "ChallengeStep"),
                StepDescriptor::new(3, "Account Sizes", "Funded account tiers", ACCOUNT_SIZES, "AccountSizesStep"),
                StepDescriptor::new(4, "Trading Rules", "What traders may and may not do", TRADING_RULES, "TradingRulesStep"),
                StepDescriptor::new(5, "Payouts", "Profit split and payout schedule", PAYOUTS, "PayoutsStep"),
                StepDescriptor::new(6, "Platforms", "Platforms, instruments and restrictions", PLATFORMS, "PlatformsStep"),
                StepDescriptor::new(7, "Publishing", "Listing status and promotion", PUBLISHING, "PublishingStep"),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, number: usize) -> Option<&StepDescriptor> {
        number.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepDescriptor> {
        self.steps.iter()
    }

    /// Clamp a step number into `1..=len`
    pub fn clamp(&self, number: usize) -> usize {
        number.clamp(1, self.steps.len())
    }

    pub fn is_last(&self, number: usize) -> bool {
        number == self.steps.len()
    }
}
