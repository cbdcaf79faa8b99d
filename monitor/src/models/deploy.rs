//! Normalized deploy records shared by every platform

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use tracing::debug;

/// A deployment platform watched by the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Render,
    Vercel,
}

impl Platform {
    /// Display name used in menu headers and logs
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Render => "Render",
            Platform::Vercel => "Vercel",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A build currently in progress on one platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRecord {
    pub platform: Platform,

    /// Service (Render) or project (Vercel) name
    pub origin_name: String,

    /// Platform-native deploy id, unique within a platform snapshot
    pub deploy_id: String,

    /// Short description of the triggering change
    pub commit_message: Option<String>,

    /// Deep link to the deploy on the platform dashboard
    pub detail_url: String,

    /// Link to the commit on the source host, only known for Vercel
    pub source_url: Option<String>,

    /// Who triggered the deploy, when the platform reports it
    pub creator: Option<String>,
}

/// The complete set of in-progress deploys for one platform as of one poll cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSnapshot {
    pub platform: Platform,
    pub deploys: Vec<DeployRecord>,
    pub polled_at: DateTime<Utc>,
}

impl PollSnapshot {
    /// Build a snapshot, dropping records from other platforms and repeated deploy
    /// ids. The first occurrence of an id wins and input order is preserved.
    pub fn new(platform: Platform, deploys: Vec<DeployRecord>, polled_at: DateTime<Utc>) -> Self {
        let mut seen = HashSet::new();
        let deploys = deploys
            .into_iter()
            .filter(|record| {
                if record.platform != platform {
                    debug!(
                        "Dropping {} deploy {} from {} snapshot",
                        record.platform, record.deploy_id, platform
                    );
                    return false;
                }
                if !seen.insert(record.deploy_id.clone()) {
                    debug!(
                        "Dropping duplicate {} deploy {}",
                        platform, record.deploy_id
                    );
                    return false;
                }
                true
            })
            .collect();

        Self {
            platform,
            deploys,
            polled_at,
        }
    }

    pub fn len(&self) -> usize {
        self.deploys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deploys.is_empty()
    }
}
