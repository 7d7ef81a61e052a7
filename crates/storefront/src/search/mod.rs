//! Multi-kind storefront search.
//!
//! Search is a per-request fan-out, not a persistent index: each query
//! fetches a bounded candidate set per entity kind from the content store
//! concurrently, filters by case-insensitive substring match against a fixed
//! field set per kind, and merges into one deterministically ranked list.
//!
//! A failure fetching one kind degrades that kind's contribution to empty;
//! it never aborts the other kinds or the merge.

use serde::Serialize;
use tracing::instrument;

use crate::content::{Bike, ContentClient, ContentError, Page, Story};

/// Minimum trimmed query length. Below this no fetch is issued at all -
/// a hard floor that bounds request volume, not a UI nicety.
pub const MIN_QUERY_LENGTH: usize = 2;

/// Maximum hits returned by the quick (dropdown) variant.
pub const QUICK_RESULT_LIMIT: usize = 8;

/// The entity kinds that participate in search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Bikes,
    Stories,
    Pages,
}

impl EntityKind {
    /// Wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bikes => "bikes",
            Self::Stories => "stories",
            Self::Pages => "pages",
        }
    }

    /// Section heading for result views.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bikes => "Bikes",
            Self::Stories => "Stories",
            Self::Pages => "Pages",
        }
    }
}

/// A matched entity projected into the uniform result record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: String,
    /// Kind-specific display title (model name, headline, page title),
    /// falling back to the raw object title.
    pub title: String,
    pub slug: String,
    pub kind: EntityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl SearchHit {
    /// Storefront path for this hit.
    #[must_use]
    pub fn href(&self) -> String {
        match self.kind {
            EntityKind::Bikes => format!("/bikes/{}", self.slug),
            EntityKind::Stories => format!("/stories/{}", self.slug),
            EntityKind::Pages => format!("/{}", self.slug),
        }
    }
}

/// Bounded result set for the inline/dropdown variant.
#[derive(Debug, Default, Serialize)]
pub struct QuickSearchResults {
    /// Top-ranked hits, at most [`QUICK_RESULT_LIMIT`].
    pub hits: Vec<SearchHit>,
    /// True unbounded match count (may exceed `hits.len()`).
    pub total: usize,
}

/// Unbounded result set for the dedicated results view, grouped by kind.
#[derive(Debug, Default)]
pub struct SearchResults {
    pub query: String,
    pub bikes: Vec<SearchHit>,
    pub stories: Vec<SearchHit>,
    pub pages: Vec<SearchHit>,
}

impl SearchResults {
    /// Total number of matches across all kinds.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.bikes.len() + self.stories.len() + self.pages.len()
    }

    /// Check if there are any results.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bikes.is_empty() && self.stories.is_empty() && self.pages.is_empty()
    }
}

/// The storefront search engine.
///
/// Cheaply cloneable; shares the underlying [`ContentClient`].
#[derive(Clone)]
pub struct SearchEngine {
    content: ContentClient,
}

impl SearchEngine {
    /// Create a search engine over the given content client.
    #[must_use]
    pub const fn new(content: ContentClient) -> Self {
        Self { content }
    }

    /// Quick search: top-ranked slice plus the true match count.
    #[instrument(skip(self))]
    pub async fn quick_search(&self, query: &str) -> QuickSearchResults {
        let mut hits = self.ranked_matches(query).await;
        let total = hits.len();
        hits.truncate(QUICK_RESULT_LIMIT);
        QuickSearchResults { hits, total }
    }

    /// Full search: every match, grouped by kind in rank order.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> SearchResults {
        let hits = self.ranked_matches(query).await;

        let mut results = SearchResults {
            query: query.trim().to_string(),
            ..SearchResults::default()
        };
        for hit in hits {
            match hit.kind {
                EntityKind::Bikes => results.bikes.push(hit),
                EntityKind::Stories => results.stories.push(hit),
                EntityKind::Pages => results.pages.push(hit),
            }
        }
        results
    }

    /// Fan out, filter, and rank. Shared by both presentation variants.
    async fn ranked_matches(&self, query: &str) -> Vec<SearchHit> {
        let needle = query.trim().to_lowercase();
        if needle.chars().count() < MIN_QUERY_LENGTH {
            return Vec::new();
        }

        let limit = crate::content::SEARCH_CANDIDATE_LIMIT;
        // Bikes and stories expand one reference level so category display
        // titles are available for matching; pages have no references.
        let (bikes, stories, pages) = tokio::join!(
            self.content.list_bikes_limited(limit),
            self.content.list_stories(limit),
            self.content.list_pages(limit),
        );

        let mut hits = Vec::new();
        hits.extend(
            or_empty(bikes, EntityKind::Bikes)
                .into_iter()
                .filter(|b| bike_matches(b, &needle))
                .map(bike_hit),
        );
        hits.extend(
            or_empty(stories, EntityKind::Stories)
                .into_iter()
                .filter(|s| story_matches(s, &needle))
                .map(story_hit),
        );
        hits.extend(
            or_empty(pages, EntityKind::Pages)
                .into_iter()
                .filter(|p| page_matches(p, &needle))
                .map(page_hit),
        );

        rank(&mut hits, &needle);
        hits
    }
}

/// Degrade a failed kind to an empty contribution.
fn or_empty<T>(result: Result<Vec<T>, ContentError>, kind: EntityKind) -> Vec<T> {
    match result {
        Ok(objects) => objects,
        Err(e) => {
            tracing::warn!(
                kind = kind.as_str(),
                error = %e,
                "search fetch failed, kind contributes no results"
            );
            Vec::new()
        }
    }
}

/// Case-insensitive substring test against an optional field.
fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

fn bike_matches(bike: &Bike, needle: &str) -> bool {
    contains_ci(Some(&bike.title), needle)
        || contains_ci(Some(&bike.metadata.model_name), needle)
        || contains_ci(bike.metadata.description.as_deref(), needle)
        || contains_ci(
            bike.metadata
                .category
                .as_ref()
                .and_then(|c| c.display_title()),
            needle,
        )
}

fn story_matches(story: &Story, needle: &str) -> bool {
    contains_ci(Some(&story.title), needle)
        || contains_ci(Some(&story.metadata.headline), needle)
        || contains_ci(story.metadata.excerpt.as_deref(), needle)
        || contains_ci(story.metadata.author.as_deref(), needle)
}

fn page_matches(page: &Page, needle: &str) -> bool {
    contains_ci(Some(&page.title), needle)
        || contains_ci(Some(&page.metadata.page_title), needle)
        || contains_ci(page.metadata.meta_description.as_deref(), needle)
}

fn bike_hit(bike: Bike) -> SearchHit {
    SearchHit {
        title: bike.display_title().to_string(),
        id: bike.id,
        slug: bike.slug,
        kind: EntityKind::Bikes,
        description: bike.metadata.description,
        image_url: bike.metadata.main_image.map(|img| img.imgix_url),
    }
}

fn story_hit(story: Story) -> SearchHit {
    SearchHit {
        title: story.display_headline().to_string(),
        id: story.id,
        slug: story.slug,
        kind: EntityKind::Stories,
        description: story.metadata.excerpt,
        image_url: story.metadata.featured_image.map(|img| img.imgix_url),
    }
}

fn page_hit(page: Page) -> SearchHit {
    SearchHit {
        title: page.display_title().to_string(),
        id: page.id,
        slug: page.slug,
        kind: EntityKind::Pages,
        description: page.metadata.meta_description,
        image_url: page.metadata.hero_image.map(|img| img.imgix_url),
    }
}

/// Relevance class of a hit title for a given needle. Lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchClass {
    Exact,
    Prefix,
    Other,
}

fn match_class(title: &str, needle: &str) -> MatchClass {
    let title = title.to_lowercase();
    if title == needle {
        MatchClass::Exact
    } else if title.starts_with(needle) {
        MatchClass::Prefix
    } else {
        MatchClass::Other
    }
}

/// Sort hits by relevance: exact title match, then title prefix match, then
/// everything else; ties broken by title, then slug. This is a total order,
/// so identical data always yields identical ordering.
fn rank(hits: &mut [SearchHit], needle: &str) {
    hits.sort_by(|a, b| {
        match_class(&a.title, needle)
            .cmp(&match_class(&b.title, needle))
            .then_with(|| a.title.cmp(&b.title))
            .then_with(|| a.slug.cmp(&b.slug))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(title: &str, slug: &str) -> SearchHit {
        SearchHit {
            id: slug.to_string(),
            title: title.to_string(),
            slug: slug.to_string(),
            kind: EntityKind::Bikes,
            description: None,
            image_url: None,
        }
    }

    #[test]
    fn exact_beats_prefix_beats_substring() {
        let mut hits = vec![
            hit("Procaliber", "procaliber"),
            hit("Fuel EX 8", "fuel-ex-8"),
            hit("Fuel EX", "fuel-ex"),
        ];
        rank(&mut hits, "fuel ex");

        let titles: Vec<&str> = hits.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["Fuel EX", "Fuel EX 8", "Procaliber"]);
    }

    #[test]
    fn ranking_is_case_insensitive() {
        assert_eq!(match_class("FUEL EX", "fuel ex"), MatchClass::Exact);
        assert_eq!(match_class("Fuel EX 8", "fuel ex"), MatchClass::Prefix);
        assert_eq!(match_class("Top Fuel", "fuel"), MatchClass::Other);
    }

    #[test]
    fn ties_break_by_title_then_slug() {
        let mut hits = vec![
            hit("Marlin", "marlin-b"),
            hit("Marlin", "marlin-a"),
            hit("Domane", "domane"),
        ];
        rank(&mut hits, "li");

        let slugs: Vec<&str> = hits.iter().map(|h| h.slug.as_str()).collect();
        assert_eq!(slugs, vec!["domane", "marlin-a", "marlin-b"]);
    }

    #[test]
    fn hit_hrefs_by_kind() {
        let mut page = hit("About", "about");
        page.kind = EntityKind::Pages;
        assert_eq!(page.href(), "/about");

        let mut story = hit("Trail Guide", "trail-guide");
        story.kind = EntityKind::Stories;
        assert_eq!(story.href(), "/stories/trail-guide");

        assert_eq!(hit("Fuel EX", "fuel-ex").href(), "/bikes/fuel-ex");
    }

    #[test]
    fn contains_ci_handles_absent_fields() {
        assert!(!contains_ci(None, "fuel"));
        assert!(contains_ci(Some("Full FUEL lineup"), "fuel"));
    }
}
