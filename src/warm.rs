use futures::{StreamExt, stream};
use tracing::{debug, info, warn};

use crate::{cms::CmsClient, error::FetchError, queries};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WarmReport {
    pub warmed: usize,
    pub missing: usize,
    pub failed: usize,
}

enum Outcome {
    Warmed,
    Missing,
    Failed,
}

/// Fetches every movie the CMS lists so detail pages start out cached.
pub async fn warm_movie_pages(
    cms: &CmsClient,
    ttl_secs: u64,
    max_concurrent: usize,
) -> Result<WarmReport, FetchError> {
    let slugs = queries::all_slugs(cms).await?;

    debug!(total_slugs = slugs.len(), "warming movie pages");

    let outcomes: Vec<Outcome> = stream::iter(slugs)
        .map(|slug| async move {
            match queries::movie_by_slug(cms, &slug, Some(ttl_secs)).await {
                Ok(Some(_)) => Outcome::Warmed,
                Ok(None) => {
                    debug!(slug = %slug, "listed slug has no movie");
                    Outcome::Missing
                },
                Err(err) => {
                    warn!(slug = %slug, error = %err, "failed to warm movie page");
                    Outcome::Failed
                },
            }
        })
        .buffer_unordered(max_concurrent.max(1))
        .collect()
        .await;

    let mut report = WarmReport::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Warmed => report.warmed += 1,
            Outcome::Missing => report.missing += 1,
            Outcome::Failed => report.failed += 1,
        }
    }

    info!(
        warmed = report.warmed,
        missing = report.missing,
        failed = report.failed,
        cached = cms.cache().len(),
        "warmed movie pages"
    );

    Ok(report)
}
