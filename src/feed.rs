use futures::StreamExt;
use tracing::{debug, warn};

use crate::client::HnClient;
use crate::error::Result;
use crate::store::Store;
use crate::types::{sort_by_score, Story};

/// Outcome of one load: the full sorted collection (hidden stories
/// included) and the number of ids that failed to resolve.
#[derive(Debug)]
pub struct FeedLoad {
    pub stories: Vec<Story>,
    pub failed: usize,
}

/// Two-stage load: fetch the best-story id list, then resolve each id
/// through the cache with bounded parallelism.
///
/// A failure fetching the id list fails the load; a failure resolving a
/// single id only drops that id. Results are collected in id-list order so
/// the score sort breaks ties by upstream rank, regardless of which request
/// finished first.
pub async fn load_best(
    client: &HnClient,
    store: &Store,
    limit: usize,
    concurrency: usize,
) -> Result<FeedLoad> {
    let mut ids = client.best_story_ids().await?;
    if limit > 0 {
        ids.truncate(limit);
    }
    let total = ids.len();

    let results: Vec<(u64, Result<Story>)> = futures::stream::iter(
        ids.into_iter()
            .map(|id| async move { (id, resolve(client, store, id).await) }),
    )
    .buffered(concurrency.max(1))
    .collect()
    .await;

    let mut stories = Vec::with_capacity(total);
    let mut failed = 0;
    for (id, result) in results {
        match result {
            Ok(story) => stories.push(story),
            Err(e) => {
                failed += 1;
                warn!(id, error = %e, "skipping story that failed to resolve");
            }
        }
    }

    sort_by_score(&mut stories);
    debug!(resolved = stories.len(), failed, "feed load complete");

    Ok(FeedLoad { stories, failed })
}

/// Resolve one id: a cached record is trusted verbatim, stale `hidden` flag
/// and all; otherwise fetch, cache, and return the fresh story.
async fn resolve(client: &HnClient, store: &Store, id: u64) -> Result<Story> {
    if let Some(story) = store.get(id) {
        return Ok(story);
    }

    let raw = client.item(id).await?;
    let story = raw.into_story(client.permalink(id));

    // A cache write failure costs a refetch next run, nothing more.
    if let Err(e) = store.put(&story) {
        warn!(id, error = %e, "failed to cache story");
    }

    Ok(story)
}
