//! Bookmark manager alias and link helpers.

use crate::clock::Clock;
use crate::model::bookmark::Bookmark;
use crate::repo::kv_repo::KvRepository;
use crate::service::entity_manager::EntityManager;

pub type BookmarkManager<R, C> = EntityManager<Bookmark, R, C>;

impl<R: KvRepository, C: Clock> EntityManager<Bookmark, R, C> {
    /// Bookmarks whose url host matches `host`, ignoring case and a
    /// leading `www.`.
    pub fn by_host(&self, host: &str) -> Vec<Bookmark> {
        let wanted = strip_www(&host.trim().to_lowercase()).to_string();
        self.collect_where(|bookmark| {
            url_host(&bookmark.url).is_some_and(|found| strip_www(&found) == wanted)
        })
    }
}

/// Lowercased host part of an `http(s)://host/...` style url.
pub fn url_host(url: &str) -> Option<String> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host = rest
        .split(['/', '?', '#'])
        .next()?
        .rsplit('@')
        .next()?
        .split(':')
        .next()?;
    if host.is_empty() {
        return None;
    }
    Some(host.to_lowercase())
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
