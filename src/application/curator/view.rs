//! Filter criteria and the pure function that derives the visible rows.

use std::cmp::Ordering;

use crate::domain::entities::Curatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Label,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn ascending(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }
}

/// Ephemeral client-side criteria over one collection page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criteria<C> {
    search: String,
    needle: String,
    category: Option<C>,
    sort: Option<SortOrder>,
}

impl<C: Copy + Eq> Criteria<C> {
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn category(&self) -> Option<C> {
        self.category
    }

    pub fn sort(&self) -> Option<SortOrder> {
        self.sort
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty() && self.category.is_none() && self.sort.is_none()
    }

    pub(super) fn set_search(&mut self, text: &str) {
        self.search = text.to_string();
        self.needle = text.to_lowercase();
    }

    pub(super) fn set_category(&mut self, category: Option<C>) {
        self.category = category;
    }

    pub(super) fn set_sort(&mut self, sort: Option<SortOrder>) {
        self.sort = sort;
    }

    fn admits<E>(&self, entity: &E) -> bool
    where
        E: Curatable<Category = C>,
    {
        self.category.is_none_or(|category| entity.category() == category)
            && entity.matches_search(&self.needle)
    }
}

impl<C> Default for Criteria<C> {
    fn default() -> Self {
        Self {
            search: String::new(),
            needle: String::new(),
            category: None,
            sort: None,
        }
    }
}

/// Indices into `items` of the rows admitted by `criteria`, in display order.
///
/// Depends on nothing but its arguments; the sort is stable so ties keep
/// the server's order.
pub fn visible_indices<E: Curatable>(items: &[E], criteria: &Criteria<E::Category>) -> Vec<usize> {
    let mut indices: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, entity)| criteria.admits(*entity))
        .map(|(index, _)| index)
        .collect();

    if let Some(order) = criteria.sort {
        indices.sort_by(|&a, &b| {
            let ordering = compare(&items[a], &items[b], order.field);
            match order.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    indices
}

fn compare<E: Curatable>(a: &E, b: &E, field: SortField) -> Ordering {
    match field {
        SortField::Id => a.id().cmp(&b.id()),
        SortField::Label => a.label().to_lowercase().cmp(&b.label().to_lowercase()),
        // Rows without a timestamp sort first.
        SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
    }
}
