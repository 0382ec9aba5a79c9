use crate::api::{FeedEndpoint, FeedRequest};
use crate::fragment;
use crate::models::{Article, Tab, PAGE_SIZE};

/// The triple a feed listing is fetched for. Two states with equal keys show the
/// same listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedKey {
    pub tab: Tab,
    pub tags: Vec<String>,
    pub page: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedState {
    pub active_tab: Tab,
    pub selected_tags: Vec<String>,
    /// One-based.
    pub current_page: u32,
    pub page_size: u32,
    pub total_count: u32,
    pub items: Vec<Article>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            active_tab: Tab::Global,
            selected_tags: Vec::new(),
            current_page: 1,
            page_size: PAGE_SIZE,
            total_count: 0,
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedAction {
    SelectTab(Tab),
    SelectTags(Vec<String>),
    ToggleTag(String),
    GoToPage(u32),
    /// The fragment changed outside the controller (history navigation, shared link).
    FragmentChanged(String),
    /// A tag listing was requested with nothing selected.
    TagSelectionEmptied,
}

/// What a reduction asks the controller to do next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    pub refetch: bool,
    /// New fragment to publish, set only for locally originated tag changes.
    pub fragment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedFetch {
    Request(FeedRequest),
    FallBackToGlobal,
}

impl FeedState {
    pub fn key(&self) -> FeedKey {
        FeedKey {
            tab: self.active_tab,
            tags: self.selected_tags.clone(),
            page: self.current_page,
        }
    }

    pub fn page_count(&self) -> u32 {
        self.total_count.div_ceil(self.page_size.max(1)).max(1)
    }

    pub fn reduce(&mut self, action: FeedAction) -> Transition {
        let before = self.key();
        let mut fragment = None;

        match action {
            FeedAction::SelectTab(tab) => {
                self.active_tab = if tab == Tab::Tag && self.selected_tags.is_empty() {
                    Tab::Global
                } else {
                    tab
                };
            }
            FeedAction::SelectTags(tags) => {
                self.apply_tags(fragment::parse(&fragment::format(&tags)));
                fragment = Some(fragment::format(&self.selected_tags));
            }
            FeedAction::ToggleTag(tag) => {
                let mut tags = self.selected_tags.clone();
                if let Some(pos) = tags.iter().position(|t| *t == tag) {
                    tags.remove(pos);
                } else {
                    tags.push(tag);
                }
                self.apply_tags(tags);
                fragment = Some(fragment::format(&self.selected_tags));
            }
            FeedAction::GoToPage(page) => {
                self.current_page = page.clamp(1, self.last_addressable_page());
            }
            FeedAction::FragmentChanged(raw) => {
                self.apply_tags(fragment::parse(&raw));
            }
            FeedAction::TagSelectionEmptied => {
                if self.selected_tags.is_empty() {
                    self.active_tab = Tab::Global;
                }
            }
        }

        let after = self.key();
        if after.tab != before.tab || after.tags != before.tags {
            self.current_page = 1;
        }
        Transition {
            refetch: self.key() != before,
            fragment,
        }
    }

    /// Highest page whose offset still fits the listing's `u32` offset.
    fn last_addressable_page(&self) -> u32 {
        (u32::MAX / self.page_size.max(1)).saturating_add(1)
    }

    fn apply_tags(&mut self, tags: Vec<String>) {
        self.active_tab = if tags.is_empty() { Tab::Global } else { Tab::Tag };
        self.selected_tags = tags;
    }

    /// Works out which listing to request for the current state.
    pub fn plan_fetch(&self, authenticated: bool) -> PlannedFetch {
        let offset = self
            .current_page
            .saturating_sub(1)
            .saturating_mul(self.page_size);
        let mut request = FeedRequest {
            endpoint: FeedEndpoint::Global,
            offset,
            limit: self.page_size,
            tag: None,
        };
        match self.active_tab {
            Tab::Your if authenticated => request.endpoint = FeedEndpoint::Personal,
            Tab::Tag if self.selected_tags.is_empty() => return PlannedFetch::FallBackToGlobal,
            Tab::Tag => request.tag = Some(fragment::format(&self.selected_tags)),
            _ => {}
        }
        PlannedFetch::Request(request)
    }

    pub(crate) fn patch_items(&mut self, slug: &str, patch: impl Fn(&mut Article)) {
        for article in self.items.iter_mut().filter(|a| a.slug == slug) {
            patch(article);
        }
    }
}
