//! Breadth-first page discovery
//!
//! Classic BFS over the site's link graph, bounded by a page budget and
//! restricted to the seed's origin. The frontier is a FIFO queue, so sibling
//! links from a page are explored before that page's grandchildren.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, info, warn};
use url::Url;

use crate::crawler::links::extract_links;
use crate::renderer::Renderer;
use crate::url::{is_http_scheme, normalize, same_origin};
use crate::{KansoError, UrlError};

/// Discovers same-origin pages reachable from the seed, in traversal order
///
/// # Algorithm
///
/// Initialize the queue with the normalized seed. While the queue is
/// non-empty and the budget is not exhausted: pop the front, skip it if
/// already visited, otherwise mark it visited and navigate to it. The URL is
/// appended to the discovery list whether or not navigation succeeded (a
/// failed page still occupies a discovery slot so report consumers know it
/// was attempted), but links are only harvested from pages that rendered.
/// Harvested links are normalized (fragment stripped), kept only when their
/// origin matches the seed's and their scheme is http(s), and enqueued in
/// document order.
///
/// # Arguments
///
/// * `renderer` - The navigable-page service; navigations are sequential
/// * `seed` - Absolute http(s) URL whose origin bounds the crawl
/// * `page_budget` - Upper bound on the discovery list; 0 yields an empty
///   list without navigating
///
/// # Errors
///
/// Returns an error only when the seed itself is unusable (non-http scheme).
/// Navigation failures never abort the traversal.
pub async fn discover(
    renderer: &dyn Renderer,
    seed: &Url,
    page_budget: usize,
) -> Result<Vec<Url>, KansoError> {
    if !is_http_scheme(seed) {
        return Err(UrlError::InvalidScheme(format!(
            "seed must be http or https, got: {}",
            seed.scheme()
        ))
        .into());
    }

    let seed = normalize(seed);
    let mut queue: VecDeque<Url> = VecDeque::from([seed.clone()]);
    let mut visited: HashSet<String> = HashSet::new();
    let mut discovered: Vec<Url> = Vec::new();

    while discovered.len() < page_budget {
        let Some(current) = queue.pop_front() else {
            break;
        };

        if !visited.insert(current.as_str().to_string()) {
            continue;
        }

        match renderer.render(&current).await {
            Ok(page) => {
                discovered.push(current.clone());
                debug!("Discovered {} ({} of budget {})", current, discovered.len(), page_budget);

                for link in extract_links(&page.html, &page.url) {
                    let link = normalize(&link);

                    if !is_http_scheme(&link) || !same_origin(&link, &seed) {
                        continue;
                    }

                    if !visited.contains(link.as_str()) {
                        queue.push_back(link);
                    }
                }
            }
            Err(e) => {
                // The failed URL still counts toward the budget, but no
                // links are harvested from it.
                warn!("Navigation failed for {current}: {e}");
                discovered.push(current);
            }
        }
    }

    info!("Discovery finished: {} page(s)", discovered.len());
    Ok(discovered)
}
