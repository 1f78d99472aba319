//! Bucket Enumerator: follows the listing continuation chain under a prefix.
//!
//! Pages are requested strictly one after another; the next call is only
//! issued once the previous page has been consumed. Each call to
//! [`object_stream`] starts a fresh enumeration, nothing is persisted.

use futures::stream::{self, Stream, TryStreamExt};
use tracing::{debug, error, info};

use crate::contract::{ListRequest, ObjectEntry, ObjectLister, LIST_PAGE_SIZE};
use crate::error::{ManifestError, Result};

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Lazily yields every object under `prefix`, one listing call per page.
pub fn object_stream<'a, L>(
    lister: &'a L,
    prefix: &'a str,
) -> impl Stream<Item = Result<ObjectEntry>> + 'a
where
    L: ObjectLister + ?Sized,
{
    stream::try_unfold((Cursor::Start, 0usize), move |(cursor, pages)| async move {
        let continuation_token = match cursor {
            Cursor::Done => return Ok(None),
            Cursor::Start => None,
            Cursor::Next(token) => Some(token),
        };

        let req = ListRequest {
            prefix: prefix.to_string(),
            continuation_token,
            max_keys: LIST_PAGE_SIZE,
        };
        let page = lister.list_page(req).await.map_err(|e| {
            error!(error = %e, prefix, page = pages + 1, "Listing call failed");
            e
        })?;

        let pages = pages + 1;
        let next = match page.next_continuation_token {
            Some(token) if !token.is_empty() => Cursor::Next(token),
            _ => Cursor::Done,
        };
        debug!(
            prefix,
            page = pages,
            objects = page.objects.len(),
            truncated = matches!(next, Cursor::Next(_)),
            "Fetched listing page"
        );

        let objects = stream::iter(page.objects.into_iter().map(Ok::<_, ManifestError>));
        Ok::<_, ManifestError>(Some((objects, (next, pages))))
    })
    .try_flatten()
}

/// Drains [`object_stream`] into memory.
pub async fn collect_objects<L>(lister: &L, prefix: &str) -> Result<Vec<ObjectEntry>>
where
    L: ObjectLister + ?Sized,
{
    let objects: Vec<ObjectEntry> = object_stream(lister, prefix).try_collect().await?;
    info!(prefix, objects = objects.len(), "Enumerated bucket objects");
    Ok(objects)
}
