//! Autocomplete options with an inline "create" entry.

use std::future::Future;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::{lock, Scope, Shared, Source};
use crate::error::ServiceResult;
use crate::models::{Tag, TagOption};

/// Options for `keyword` given the tags a search returned.
///
/// A create entry is appended when the keyword is non-blank and no tag is
/// named exactly like it.
pub fn build_options(keyword: &str, tags: &[Tag]) -> Vec<TagOption> {
    let keyword = keyword.trim();
    let mut options: Vec<TagOption> = tags.iter().map(TagOption::existing).collect();
    if !keyword.is_empty() && !tags.iter().any(|tag| tag.name == keyword) {
        options.push(TagOption::create(keyword));
    }
    options
}

/// Live option list for an autocomplete input.
///
/// Searches once with an empty keyword on connect, then again on every
/// keyword and on every `refresh` (which re-runs the last keyword). Only the
/// most recently issued search can update the options. A failed search
/// leaves the previous options in place.
pub fn suggestions<F, Fut>(
    keyword: &Source<String>,
    refresh: &Source<()>,
    scope: &Scope,
    search: F,
) -> Shared<Vec<TagOption>>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ServiceResult<Vec<Tag>>> + Send + 'static,
{
    let last = Arc::new(Mutex::new(String::new()));
    let record = Arc::clone(&last);
    let typed = keyword.map(move |k: &String| {
        let k = k.trim().to_string();
        *lock(&record) = k.clone();
        k
    });
    let rerun = refresh.map(move |_| lock(&last).clone());
    let search = Arc::new(search);
    let name = scope.name().to_string();

    typed
        .merge(&rerun)
        .start_with(String::new())
        .take_until(scope)
        .switch_map(scope, move |kw: &String| {
            debug!(scope = %name, keyword = %kw, "tag search");
            let pending = search(kw.clone());
            let kw = kw.clone();
            async move { (kw, pending.await) }
        })
        .filter_map(|(kw, result)| match result {
            Ok(tags) => Some(build_options(kw, tags)),
            Err(err) => {
                warn!(keyword = %kw, error = %err, "tag search failed; keeping previous options");
                None
            }
        })
        .share()
}
