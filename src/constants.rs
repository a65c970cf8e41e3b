//! Global Constants
//!
//! Centralized constants for heuristic thresholds and allow-lists.
//! All magic numbers used by the analyzers are defined here with
//! documentation.

/// Plugin pipeline stage codes.
pub mod stage {
    pub const PRE_VALIDATION: i64 = 10;
    pub const PRE_OPERATION: i64 = 20;
    pub const MAIN_OPERATION: i64 = 30;
    pub const POST_OPERATION: i64 = 40;
}

/// Risk analyzer thresholds (see `analysis::risk` for the rule set).
pub mod risk {
    /// Client-side step count above this emits a Medium risk.
    pub const CLIENT_STEPS_MEDIUM: usize = 5;
    /// Client-side step count above this additionally emits a High risk.
    pub const CLIENT_STEPS_HIGH: usize = 10;

    /// Staged-bucket size above this emits a Medium risk.
    pub const BUCKET_STEPS_MEDIUM: usize = 3;
    /// Staged-bucket size above this additionally emits a High risk.
    pub const BUCKET_STEPS_HIGH: usize = 5;

    /// Pre-validation should be minimal; above this emits Medium.
    pub const PRE_VALIDATION_MEDIUM: usize = 2;

    /// Async step count above this emits a Medium risk.
    pub const ASYNC_STEPS_MEDIUM: usize = 10;
    /// Async step count above this additionally emits a High risk.
    pub const ASYNC_STEPS_HIGH: usize = 20;

    /// Async steps with external calls above this emit a Low risk.
    pub const ASYNC_EXTERNAL_LOW: usize = 5;

    /// Client + all sync buckets above this emits a High risk.
    pub const TOTAL_SYNC_HIGH: usize = 10;

    /// Flow-typed steps anywhere in the pipeline above this emit Medium.
    pub const FLOW_STEPS_MEDIUM: usize = 5;
}

/// Script complexity scoring weights and thresholds.
pub mod script {
    /// Non-comment line counts above these add 2 and 1 score points.
    pub const LINES_HEAVY: usize = 500;
    pub const LINES_MODERATE: usize = 200;

    /// External call counts above these add 2 and 1 score points.
    pub const CALLS_HEAVY: usize = 3;
    pub const CALLS_ANY: usize = 0;

    /// More than one framework fingerprint adds 1 score point.
    pub const FRAMEWORKS_MANY: usize = 1;

    /// Score cutoffs for the High and Medium complexity tiers.
    pub const SCORE_HIGH: u32 = 4;
    pub const SCORE_MEDIUM: u32 = 2;
}

/// Endpoint aggregation thresholds.
pub mod endpoint {
    /// Reference count at or above this adds a Low "widely referenced"
    /// risk factor.
    pub const HEAVY_REFERENCE_COUNT: usize = 5;
}

/// Domain allow-lists for endpoint trust classification. Matching is by
/// suffix on the lower-cased domain, so `foo.crm.dynamics.com` matches
/// `dynamics.com`.
pub mod domains {
    /// The platform vendor's own domains.
    pub const TRUSTED: &[&str] = &[
        "dynamics.com",
        "microsoft.com",
        "microsoftonline.com",
        "office.com",
        "office365.com",
        "azure.com",
        "azurewebsites.net",
        "azure-apim.net",
        "windows.net",
        "powerapps.com",
        "powerautomate.com",
        "powerplatform.com",
        "sharepoint.com",
        "graph.microsoft.com",
    ];

    /// Common third-party SaaS domains.
    pub const KNOWN: &[&str] = &[
        "stripe.com",
        "twilio.com",
        "sendgrid.com",
        "sendgrid.net",
        "slack.com",
        "salesforce.com",
        "zendesk.com",
        "hubspot.com",
        "docusign.com",
        "docusign.net",
        "mailchimp.com",
        "github.com",
        "googleapis.com",
        "google.com",
        "zapier.com",
        "atlassian.net",
    ];
}

/// URL fragments identifying the platform's own API surface. Script calls
/// matching any of these are internal data access, not external
/// dependencies, and are discarded by the script parser.
pub mod internal_urls {
    pub const PATTERNS: &[&str] = &[
        "/api/data/",
        "/_api/",
        "/xrmservices/",
        "/webresources/",
        "localhost",
        "127.0.0.1",
    ];
}
