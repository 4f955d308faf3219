//! Analysis and derivation configuration

use chrono::Weekday;

/// Settings for daily re-bucketing of intraday samples
pub struct DailyBucketSettings {
    // The in-game trading day resets at 06:00, not midnight, so samples are
    // shifted back by this many hours before taking the date portion.
    pub day_start_offset_hours: i64,
}

/// Weekly maintenance window (non-trading / low-confidence region)
pub struct MaintenanceSettings {
    pub weekday: Weekday,
    /// Window start, inclusive (local hour)
    pub start_hour: u32,
    /// Window end, exclusive (local hour)
    pub end_hour: u32,
}

/// Settings for the read-through table cache used by the query layer
pub struct CacheSettings {
    pub ttl_secs: u64,
}

/// The Master Configuration Struct
pub struct AnalysisConfig {
    pub daily: DailyBucketSettings,
    pub maintenance: MaintenanceSettings,
    pub cache: CacheSettings,
    /// Default bundle size for exchange links (5 low-tier = 1 high-tier)
    pub default_bundle_ratio: f64,
}

pub const ANALYSIS: AnalysisConfig = AnalysisConfig {
    daily: DailyBucketSettings {
        day_start_offset_hours: 6,
    },
    maintenance: MaintenanceSettings {
        weekday: Weekday::Wed,
        start_hour: 6,
        end_hour: 10,
    },
    cache: CacheSettings {
        // 10 minutes, matching the dashboard refresh cadence
        ttl_secs: 600,
    },
    default_bundle_ratio: 5.0,
};
