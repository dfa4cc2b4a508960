/// Maximum page size allowed on any list endpoint
pub const MAX_PAGE_SIZE: i64 = 100;

/// Default page size for organization listings
pub const DEFAULT_ORGANIZATION_PAGE_SIZE: i64 = 20;

/// Default page size for user listings
pub const DEFAULT_USER_PAGE_SIZE: i64 = 50;

/// Default page size for file listings
pub const DEFAULT_FILE_PAGE_SIZE: i64 = 20;

// =============================================================================
// DIAGNOSTICS
// =============================================================================

/// Number of tables reported by the size ranking
pub const STATS_TABLE_SIZE_LIMIT: i64 = 10;

/// Number of statement shapes reported by the slow query ranking
pub const STATS_SLOW_QUERY_LIMIT: i64 = 20;

/// Query text is cut to this many characters in diagnostics output
pub const STATS_QUERY_PREVIEW_CHARS: i32 = 100;
