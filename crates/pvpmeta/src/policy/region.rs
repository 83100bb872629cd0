use chrono::Duration;

/// Regions synced by default, in lane order.
pub const SYNC_REGIONS: &[&str] = &["us", "eu"];

/// Per-region lane configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionPolicy {
    /// Lane label. Each region gets its own so a back-off in one never stalls another.
    pub queue: &'static str,
    /// Locale used for translations fetched in this region.
    pub locale: &'static str,
}

/// Lane configuration for a region, or `None` if the region is not synced.
pub fn region_policy_for(region: &str) -> Option<RegionPolicy> {
    match region {
        "us" => Some(RegionPolicy {
            queue: "character_sync_us",
            locale: "en_US",
        }),
        "eu" => Some(RegionPolicy {
            queue: "character_sync_eu",
            locale: "en_GB",
        }),
        _ => None,
    }
}

/// Staleness windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTtls {
    /// An entry processed more recently than this is not re-fetched.
    pub equipment: Duration,
    /// Character and item metadata refresh interval.
    pub meta: Duration,
    /// How long a 404'd character is left alone.
    pub unavailable_cooldown: Duration,
}

impl Default for SyncTtls {
    fn default() -> Self {
        Self {
            equipment: Duration::hours(1),
            meta: Duration::weeks(1),
            unavailable_cooldown: Duration::weeks(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synced_regions_have_policies() {
        for region in SYNC_REGIONS {
            assert!(region_policy_for(region).is_some(), "{region}");
        }
    }

    #[test]
    fn region_locales() {
        assert_eq!(region_policy_for("us").map(|p| p.locale), Some("en_US"));
        assert_eq!(region_policy_for("eu").map(|p| p.locale), Some("en_GB"));
        assert_eq!(
            region_policy_for("eu").map(|p| p.queue),
            Some("character_sync_eu")
        );
        assert!(region_policy_for("kr").is_none());
    }

    #[test]
    fn default_ttls() {
        let ttls = SyncTtls::default();
        assert_eq!(ttls.equipment.num_minutes(), 60);
        assert_eq!(ttls.meta.num_days(), 7);
        assert_eq!(ttls.unavailable_cooldown.num_days(), 14);
    }
}
