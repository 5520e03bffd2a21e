//! Subscription tiers and the static table describing their quotas.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named subscription plan. Stored as its upper-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionTier {
    Free,
    Start,
    Basic,
    Pro,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "FREE",
            SubscriptionTier::Start => "START",
            SubscriptionTier::Basic => "BASIC",
            SubscriptionTier::Pro => "PRO",
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown subscription tier '{0}'")]
pub struct UnknownTier(pub String);

impl FromStr for SubscriptionTier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FREE" => Ok(SubscriptionTier::Free),
            "START" => Ok(SubscriptionTier::Start),
            "BASIC" => Ok(SubscriptionTier::Basic),
            "PRO" => Ok(SubscriptionTier::Pro),
            _ => Err(UnknownTier(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierDefinition {
    pub display_name: String,
    /// Monthly price in roubles.
    pub price: u32,
    pub resume_limit: i64,
    pub is_trial: bool,
    /// Only meaningful when `is_trial` is set.
    pub trial_days: i64,
}

/// Immutable tier name → definition mapping. Always contains FREE.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TierTable {
    tiers: BTreeMap<SubscriptionTier, TierDefinition>,
}

impl TierTable {
    /// The plans offered in production.
    pub fn standard() -> Self {
        let mut tiers = BTreeMap::new();
        tiers.insert(
            SubscriptionTier::Free,
            TierDefinition {
                display_name: "Free trial".to_string(),
                price: 0,
                resume_limit: 30,
                is_trial: true,
                trial_days: 14,
            },
        );
        tiers.insert(
            SubscriptionTier::Start,
            TierDefinition {
                display_name: "Start".to_string(),
                price: 2990,
                resume_limit: 100,
                is_trial: false,
                trial_days: 0,
            },
        );
        tiers.insert(
            SubscriptionTier::Basic,
            TierDefinition {
                display_name: "Basic".to_string(),
                price: 5990,
                resume_limit: 300,
                is_trial: false,
                trial_days: 0,
            },
        );
        tiers.insert(
            SubscriptionTier::Pro,
            TierDefinition {
                display_name: "Pro".to_string(),
                price: 14990,
                resume_limit: 10_000_000,
                is_trial: false,
                trial_days: 0,
            },
        );
        Self { tiers }
    }

    /// Looks up a tier, falling back to FREE for tiers absent from the table.
    pub fn get(&self, tier: SubscriptionTier) -> &TierDefinition {
        self.tiers
            .get(&tier)
            .unwrap_or_else(|| self.free())
    }

    /// Resolves a stored tier name. Unknown names resolve to FREE.
    pub fn resolve(&self, name: &str) -> (SubscriptionTier, &TierDefinition) {
        match name.parse::<SubscriptionTier>() {
            Ok(tier) if self.tiers.contains_key(&tier) => (tier, self.get(tier)),
            _ => (SubscriptionTier::Free, self.free()),
        }
    }

    pub fn free(&self) -> &TierDefinition {
        &self.tiers[&SubscriptionTier::Free]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SubscriptionTier, &TierDefinition)> {
        self.tiers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_limits() {
        let table = TierTable::standard();
        assert_eq!(table.get(SubscriptionTier::Free).resume_limit, 30);
        assert_eq!(table.get(SubscriptionTier::Start).resume_limit, 100);
        assert_eq!(table.get(SubscriptionTier::Pro).resume_limit, 10_000_000);
        assert!(table.free().is_trial);
        assert_eq!(table.free().trial_days, 14);
    }

    #[test]
    fn test_tier_parse_is_case_insensitive() {
        assert_eq!("pro".parse::<SubscriptionTier>(), Ok(SubscriptionTier::Pro));
        assert_eq!(" Start ".parse::<SubscriptionTier>(), Ok(SubscriptionTier::Start));
        assert!("GOLD".parse::<SubscriptionTier>().is_err());
    }

    #[test]
    fn test_unknown_tier_resolves_to_free() {
        let table = TierTable::standard();
        let (tier, def) = table.resolve("ENTERPRISE");
        assert_eq!(tier, SubscriptionTier::Free);
        assert_eq!(def.resume_limit, 30);
    }

    #[test]
    fn test_unknown_tier_error_names_the_input() {
        let err = "gold".parse::<SubscriptionTier>().unwrap_err();
        assert_eq!(err, UnknownTier("gold".to_string()));
        assert_eq!(err.to_string(), "unknown subscription tier 'gold'");
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn test_tier_serializes_upper_case() {
        let json = serde_json::to_string(&SubscriptionTier::Basic).unwrap();
        assert_eq!(json, "\"BASIC\"");
    }
}
