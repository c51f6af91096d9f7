//! Reference Resolver: populate channel references with their data-node
//! payloads, recursively for composite nodes.
//!
//! Resolution is monotonic and idempotent. A node that already carries a
//! payload is never refetched, so running the resolver twice over the same
//! channels performs no network calls the second time and leaves payloads
//! unchanged. Each channel succeeds or fails on its own; a failure marks
//! that channel's `fetch_error` and never aborts its siblings.

use futures_util::future::{join_all, BoxFuture};
use futures_util::FutureExt;

use crate::api::{Backend, FetchResult};
use crate::model::{Channel, DataContents, DataNode};

/// Resolve every channel's reference in place. Channels with no bound
/// reference (`data: null`) are valid and left untouched. Sibling channels
/// resolve concurrently; each result lands in its declared slot, so
/// completion order never affects the outcome.
pub async fn resolve_channels(backend: &dyn Backend, channels: &mut [Channel]) {
    join_all(channels.iter_mut().map(|ch| resolve_channel(backend, ch))).await;
}

async fn resolve_channel(backend: &dyn Backend, channel: &mut Channel) {
    let Some(node) = channel.data.as_mut() else {
        return;
    };
    match resolve_node(backend, node).await {
        Ok(()) => channel.fetch_error = None,
        Err(e) => channel.fetch_error = Some(e.to_string()),
    }
}

/// Fetch this node's payload if it is still a bare reference, then recurse
/// into any children. Children of one node resolve concurrently; all of
/// them run to completion before the first child error (if any) is
/// reported, so one bad branch does not leave its siblings unresolved.
fn resolve_node<'a>(
    backend: &'a dyn Backend,
    node: &'a mut DataNode,
) -> BoxFuture<'a, FetchResult<()>> {
    async move {
        if node.contents.is_none() {
            let fetched = backend.fetch_data_node(&node.uuid).await?;
            node.contents = fetched.contents;
        }
        if let Some(DataContents::Branch(children)) = node.contents.as_mut() {
            let results = join_all(
                children
                    .iter_mut()
                    .map(|child| resolve_node(backend, child)),
            )
            .await;
            for result in results {
                result?;
            }
        }
        Ok(())
    }
    .boxed()
}
