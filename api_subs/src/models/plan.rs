use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Closed set of subscription tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Core,
    Pro,
}

impl PlanTier {
    pub const ALL: [PlanTier; 3] = [PlanTier::Free, PlanTier::Core, PlanTier::Pro];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Core => "core",
            PlanTier::Pro => "pro",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(PlanTier::Free),
            "core" => Ok(PlanTier::Core),
            "pro" => Ok(PlanTier::Pro),
            other => Err(format!("unknown plan tier: {}", other)),
        }
    }
}

/// Resources a plan puts a ceiling on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Links,
    EmailSignups,
    LandingPages,
    QrCodes,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Links => "links",
            Resource::EmailSignups => "email signups",
            Resource::LandingPages => "landing pages",
            Resource::QrCodes => "QR codes",
        };
        f.write_str(name)
    }
}

/// Per-tier ceilings. `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanLimits {
    pub links: Option<u32>,
    pub email_signups: Option<u32>,
    pub landing_pages: Option<u32>,
    pub qr_codes: Option<u32>,
}

impl PlanLimits {
    pub fn limit_for(&self, resource: Resource) -> Option<u32> {
        match resource {
            Resource::Links => self.links,
            Resource::EmailSignups => self.email_signups,
            Resource::LandingPages => self.landing_pages,
            Resource::QrCodes => self.qr_codes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanEntry {
    pub plan: PlanTier,
    pub limits: PlanLimits,
}

/// Immutable tier → limits table, built once at startup and shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCatalog {
    free: PlanLimits,
    core: PlanLimits,
    pro: PlanLimits,
}

impl PlanCatalog {
    pub fn new(free: PlanLimits, core: PlanLimits, pro: PlanLimits) -> Self {
        PlanCatalog { free, core, pro }
    }

    pub fn limits(&self, plan: PlanTier) -> &PlanLimits {
        match plan {
            PlanTier::Free => &self.free,
            PlanTier::Core => &self.core,
            PlanTier::Pro => &self.pro,
        }
    }

    pub fn entries(&self) -> Vec<PlanEntry> {
        PlanTier::ALL
            .iter()
            .map(|plan| PlanEntry {
                plan: *plan,
                limits: *self.limits(*plan),
            })
            .collect()
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        PlanCatalog {
            free: PlanLimits {
                links: Some(3),
                email_signups: Some(10),
                landing_pages: Some(1),
                qr_codes: Some(0),
            },
            core: PlanLimits {
                links: Some(100),
                email_signups: None,
                landing_pages: Some(5),
                qr_codes: Some(5),
            },
            pro: PlanLimits {
                links: Some(3000),
                email_signups: None,
                landing_pages: Some(20),
                qr_codes: Some(200),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_matches_published_tiers() {
        let catalog = PlanCatalog::default();

        assert_eq!(catalog.limits(PlanTier::Free).links, Some(3));
        assert_eq!(catalog.limits(PlanTier::Free).email_signups, Some(10));
        assert_eq!(catalog.limits(PlanTier::Core).email_signups, None);
        assert_eq!(catalog.limits(PlanTier::Core).landing_pages, Some(5));
        assert_eq!(catalog.limits(PlanTier::Pro).links, Some(3000));
        assert_eq!(catalog.limits(PlanTier::Pro).qr_codes, Some(200));
    }

    #[test]
    fn plan_tier_parses_case_insensitively() {
        assert_eq!("Pro".parse::<PlanTier>(), Ok(PlanTier::Pro));
        assert_eq!(" core ".parse::<PlanTier>(), Ok(PlanTier::Core));
        assert!("enterprise".parse::<PlanTier>().is_err());
    }

    #[test]
    fn entries_list_every_tier_in_order() {
        let entries = PlanCatalog::default().entries();
        let plans: Vec<_> = entries.iter().map(|e| e.plan).collect();
        assert_eq!(plans, PlanTier::ALL.to_vec());
    }
}
