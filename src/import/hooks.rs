use crate::db::ProductStatus;
use crate::discogs::{DiscogsRelease, SearchPage};
use crate::import::types::{CategoryBranch, ProductDraft};
use std::sync::Arc;

/// Extension point around search and product creation.
///
/// Every method has a pass-through default so a hook only overrides what it
/// cares about. `filter_*` methods return the (possibly changed) value;
/// the rest are notifications. All calls are synchronous and happen on the
/// request that triggered them.
pub trait ImportHook: Send + Sync {
    fn before_search(&self, _query: &str) {}

    fn filter_search_results(&self, page: SearchPage) -> SearchPage {
        page
    }

    fn after_search(&self, _query: &str, _page: &SearchPage) {}

    /// Alter the release before anything is derived from it
    fn filter_release(&self, release: DiscogsRelease) -> DiscogsRelease {
        release
    }

    fn before_product_created(&self, _release: &DiscogsRelease) {}

    fn product_status(&self, status: ProductStatus, _release: &DiscogsRelease) -> ProductStatus {
        status
    }

    fn filter_tracklist(&self, tracklist: String, _release: &DiscogsRelease) -> String {
        tracklist
    }

    fn filter_description(&self, description: String, _release: &DiscogsRelease) -> String {
        description
    }

    fn filter_short_description(&self, short: String, _release: &DiscogsRelease) -> String {
        short
    }

    fn filter_categories(
        &self,
        categories: Vec<CategoryBranch>,
        _release: &DiscogsRelease,
    ) -> Vec<CategoryBranch> {
        categories
    }

    /// Last look at the full draft before it is persisted
    fn filter_draft(&self, draft: ProductDraft, _release: &DiscogsRelease) -> ProductDraft {
        draft
    }

    fn before_meta_added(&self, _product_id: &str, _release: &DiscogsRelease) {}

    fn after_meta_added(&self, _product_id: &str, _release: &DiscogsRelease) {}

    fn after_product_created(&self, _product_id: &str, _release: &DiscogsRelease) {}
}

/// Ordered list of hooks; filters are folded in registration order
#[derive(Clone, Default)]
pub struct Hooks {
    hooks: Vec<Arc<dyn ImportHook>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, hook: Arc<dyn ImportHook>) {
        self.hooks.push(hook);
    }

    pub fn with(mut self, hook: Arc<dyn ImportHook>) -> Self {
        self.register(hook);
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn before_search(&self, query: &str) {
        self.hooks.iter().for_each(|h| h.before_search(query));
    }

    pub fn filter_search_results(&self, page: SearchPage) -> SearchPage {
        self.hooks
            .iter()
            .fold(page, |page, h| h.filter_search_results(page))
    }

    pub fn after_search(&self, query: &str, page: &SearchPage) {
        self.hooks.iter().for_each(|h| h.after_search(query, page));
    }

    pub fn filter_release(&self, release: DiscogsRelease) -> DiscogsRelease {
        self.hooks
            .iter()
            .fold(release, |release, h| h.filter_release(release))
    }

    pub fn before_product_created(&self, release: &DiscogsRelease) {
        self.hooks
            .iter()
            .for_each(|h| h.before_product_created(release));
    }

    pub fn product_status(&self, status: ProductStatus, release: &DiscogsRelease) -> ProductStatus {
        self.hooks
            .iter()
            .fold(status, |status, h| h.product_status(status, release))
    }

    pub fn filter_tracklist(&self, tracklist: String, release: &DiscogsRelease) -> String {
        self.hooks
            .iter()
            .fold(tracklist, |text, h| h.filter_tracklist(text, release))
    }

    pub fn filter_description(&self, description: String, release: &DiscogsRelease) -> String {
        self.hooks
            .iter()
            .fold(description, |html, h| h.filter_description(html, release))
    }

    pub fn filter_short_description(&self, short: String, release: &DiscogsRelease) -> String {
        self.hooks
            .iter()
            .fold(short, |text, h| h.filter_short_description(text, release))
    }

    pub fn filter_categories(
        &self,
        categories: Vec<CategoryBranch>,
        release: &DiscogsRelease,
    ) -> Vec<CategoryBranch> {
        self.hooks
            .iter()
            .fold(categories, |cats, h| h.filter_categories(cats, release))
    }

    pub fn filter_draft(&self, draft: ProductDraft, release: &DiscogsRelease) -> ProductDraft {
        self.hooks
            .iter()
            .fold(draft, |draft, h| h.filter_draft(draft, release))
    }

    pub fn before_meta_added(&self, product_id: &str, release: &DiscogsRelease) {
        self.hooks
            .iter()
            .for_each(|h| h.before_meta_added(product_id, release));
    }

    pub fn after_meta_added(&self, product_id: &str, release: &DiscogsRelease) {
        self.hooks
            .iter()
            .for_each(|h| h.after_meta_added(product_id, release));
    }

    pub fn after_product_created(&self, product_id: &str, release: &DiscogsRelease) {
        self.hooks
            .iter()
            .for_each(|h| h.after_product_created(product_id, release));
    }
}
