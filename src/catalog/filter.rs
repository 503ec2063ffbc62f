//! Text and category filtering over catalog cards.

use crate::catalog::AudioCard;

/// Active filter state for the storefront list.
///
/// An empty query matches everything; `category == None` means all
/// categories. Both dimensions must match for a card to stay visible.
#[derive(Debug, Clone, Default)]
pub struct CardFilter {
    query: String,
    category: Option<String>,
}

impl CardFilter {
    pub fn new() -> Self {
        CardFilter::default()
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.trim().to_lowercase();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category;
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn matches(&self, card: &AudioCard) -> bool {
        self.matches_query(card) && self.matches_category(card)
    }

    /// Indices of the cards that survive the filter, in catalog order.
    pub fn apply(&self, cards: &[AudioCard]) -> Vec<usize> {
        cards
            .iter()
            .enumerate()
            .filter(|(_, card)| self.matches(card))
            .map(|(index, _)| index)
            .collect()
    }

    fn matches_query(&self, card: &AudioCard) -> bool {
        if self.query.is_empty() {
            return true;
        }
        // title and tags together form the searchable text
        let mut haystack = card.title.to_lowercase();
        for tag in &card.tags {
            haystack.push(' ');
            haystack.push_str(&tag.to_lowercase());
        }
        haystack.contains(&self.query)
    }

    fn matches_category(&self, card: &AudioCard) -> bool {
        match &self.category {
            None => true,
            Some(category) => &card.category == category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_empty_filter_matches_all() {
        let catalog = Catalog::demo();
        let filter = CardFilter::new();
        assert_eq!(filter.apply(&catalog.cards).len(), catalog.cards.len());
    }

    #[test]
    fn test_query_matches_title_case_insensitive() {
        let catalog = Catalog::demo();
        let mut filter = CardFilter::new();
        filter.set_query("MIDNIGHT");

        let visible = filter.apply(&catalog.cards);
        assert_eq!(visible.len(), 1);
        assert_eq!(catalog.cards[visible[0]].title, "Midnight Drive");
    }

    #[test]
    fn test_query_matches_tags() {
        let catalog = Catalog::demo();
        let mut filter = CardFilter::new();
        filter.set_query("guitar");

        let visible = filter.apply(&catalog.cards);
        assert_eq!(visible.len(), 1);
        assert_eq!(catalog.cards[visible[0]].title, "Paper Boats");
    }

    #[test]
    fn test_query_is_trimmed() {
        let catalog = Catalog::demo();
        let mut filter = CardFilter::new();
        filter.set_query("  rain  ");
        assert_eq!(filter.apply(&catalog.cards).len(), 1);
    }

    #[test]
    fn test_category_filter() {
        let catalog = Catalog::demo();
        let mut filter = CardFilter::new();
        filter.set_category(Some("Ambient".to_string()));

        let visible = filter.apply(&catalog.cards);
        assert_eq!(visible.len(), 2);
        assert!(visible
            .iter()
            .all(|&i| catalog.cards[i].category == "Ambient"));
    }

    #[test]
    fn test_query_and_category_combine() {
        let catalog = Catalog::demo();
        let mut filter = CardFilter::new();
        filter.set_category(Some("Electronic".to_string()));
        filter.set_query("space");

        let visible = filter.apply(&catalog.cards);
        assert_eq!(visible.len(), 1);
        assert_eq!(catalog.cards[visible[0]].title, "Low Orbit");
    }

    #[test]
    fn test_no_match_yields_empty() {
        let catalog = Catalog::demo();
        let mut filter = CardFilter::new();
        filter.set_query("definitely not in the catalog");
        assert!(filter.apply(&catalog.cards).is_empty());
    }
}
