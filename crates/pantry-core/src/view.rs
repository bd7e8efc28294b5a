//! # Tabular View Engine
//!
//! Search, sort and paginate any homogeneous collection for display.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     project(rows, params)                               │
//! │                                                                         │
//! │  rows (store order)                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. FILTER    any scalar field, lowercased, contains lowercased query   │
//! │       │       (empty query keeps everything, non-scalars are skipped)   │
//! │       │                                                                 │
//! │       │ ──────────────► total_matched = filtered.len()                  │
//! │       ▼                                                                 │
//! │  2. SORT      stable, natural order of the sort column's values         │
//! │       │       (descending flips the comparator, ties keep input order)  │
//! │       ▼                                                                 │
//! │  3. PAGINATE  [page_index * page_size, + page_size)                     │
//! │       │       (out of range → empty page, never an error)               │
//! │       ▼                                                                 │
//! │  Projection { page, total_matched }                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine never mutates its input. It borrows the rows and hands back
//! references, so calling it on every render pass is cheap.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Page sizes offered by the data table.
pub const PAGE_SIZE_OPTIONS: [usize; 3] = [10, 25, 100];

/// Page size used when nothing else was chosen.
pub const DEFAULT_PAGE_SIZE: usize = 10;

// =============================================================================
// Field Values
// =============================================================================

/// A single cell value as seen by the view engine.
///
/// `Object` stands for structured values (addresses, settings maps). They are
/// displayed elsewhere but never searched.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(Cow<'a, str>),
    Object,
}

impl<'a> FieldValue<'a> {
    /// Text used by the search filter, `None` for values that are skipped.
    pub fn search_text(&self) -> Option<Cow<'_, str>> {
        match self {
            FieldValue::Null | FieldValue::Object => None,
            FieldValue::Bool(b) => Some(Cow::Owned(b.to_string())),
            FieldValue::Int(n) => Some(Cow::Owned(n.to_string())),
            FieldValue::Float(x) => Some(Cow::Owned(x.to_string())),
            FieldValue::Text(s) => Some(Cow::Borrowed(s.as_ref())),
        }
    }

    /// Whether this value takes part in searching.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, FieldValue::Null | FieldValue::Object)
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Bool(_) => 1,
            FieldValue::Int(_) | FieldValue::Float(_) => 2,
            FieldValue::Text(_) => 3,
            FieldValue::Object => 4,
        }
    }

    /// Natural ordering used by the sort stage.
    ///
    /// Numbers compare numerically, strings lexicographically. Values of
    /// different types order by type (Null < Bool < Number < Text < Object)
    /// so the comparator stays total.
    pub fn natural_cmp(&self, other: &FieldValue<'_>) -> Ordering {
        match (self, other) {
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            (FieldValue::Int(a), FieldValue::Int(b)) => a.cmp(b),
            (FieldValue::Int(a), FieldValue::Float(b)) => (*a as f64).total_cmp(b),
            (FieldValue::Float(a), FieldValue::Int(b)) => a.total_cmp(&(*b as f64)),
            (FieldValue::Float(a), FieldValue::Float(b)) => a.total_cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b)) => a.as_ref().cmp(b.as_ref()),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(s: &'a str) -> Self {
        FieldValue::Text(Cow::Borrowed(s))
    }
}

impl<'a> From<&'a String> for FieldValue<'a> {
    fn from(s: &'a String) -> Self {
        FieldValue::Text(Cow::Borrowed(s.as_str()))
    }
}

impl From<String> for FieldValue<'_> {
    fn from(s: String) -> Self {
        FieldValue::Text(Cow::Owned(s))
    }
}

impl From<i64> for FieldValue<'_> {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<f64> for FieldValue<'_> {
    fn from(x: f64) -> Self {
        FieldValue::Float(x)
    }
}

impl From<bool> for FieldValue<'_> {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl<'a, T: Into<FieldValue<'a>>> From<Option<T>> for FieldValue<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

// =============================================================================
// Tabular Trait
// =============================================================================

/// A row type the data table can render.
pub trait Tabular {
    /// Column keys in display order. The first one is the default sort column.
    fn columns() -> &'static [&'static str];

    /// Value of one column. Unknown keys yield `FieldValue::Null`.
    fn field(&self, key: &str) -> FieldValue<'_>;
}

// =============================================================================
// View Parameters
// =============================================================================

/// Sort direction of the active column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "asc"),
            SortDirection::Descending => write!(f, "desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(CoreError::UnknownSortDirection(other.to_string())),
        }
    }
}

/// Search/sort/paginate settings of one rendered table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewParams {
    pub search_query: String,
    /// `None` leaves rows in store order.
    pub sort_key: Option<String>,
    pub sort_direction: SortDirection,
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for ViewParams {
    fn default() -> Self {
        ViewParams {
            search_query: String::new(),
            sort_key: None,
            sort_direction: SortDirection::Ascending,
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ViewParams {
    /// Defaults for a table of `T`: sorted ascending by its first column.
    pub fn for_table<T: Tabular>() -> Self {
        ViewParams {
            sort_key: T::columns().first().map(|key| key.to_string()),
            ..Default::default()
        }
    }

    /// Changes the search query and jumps back to the first page.
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.page_index = 0;
    }

    /// Changes the page size and jumps back to the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
        self.page_index = 0;
    }

    pub fn set_page(&mut self, page_index: usize) {
        self.page_index = page_index;
    }

    /// Column header click: the active column flips direction, any other
    /// column becomes active in ascending order.
    pub fn toggle_sort(&mut self, key: &str) {
        if self.sort_key.as_deref() == Some(key) {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_key = Some(key.to_string());
            self.sort_direction = SortDirection::Ascending;
        }
    }

    /// Sorts by `key` after checking it is a column of `T`.
    pub fn sort_by<T: Tabular>(&mut self, key: &str, direction: SortDirection) -> CoreResult<()> {
        if !T::columns().contains(&key) {
            return Err(CoreError::UnknownColumn {
                column: key.to_string(),
            });
        }
        self.sort_key = Some(key.to_string());
        self.sort_direction = direction;
        Ok(())
    }
}

// =============================================================================
// View State
// =============================================================================

/// View parameters bound to the identity of the collection they describe.
///
/// When the table starts showing a different collection the parameters go
/// back to their defaults, so a search typed for categories never leaks into
/// the inventory table.
#[derive(Debug, Clone)]
pub struct ViewState {
    identity: Option<String>,
    defaults: ViewParams,
    pub params: ViewParams,
}

impl ViewState {
    pub fn new(defaults: ViewParams) -> Self {
        ViewState {
            identity: None,
            params: defaults.clone(),
            defaults,
        }
    }

    /// Records the collection currently shown. Returns `true` when it changed
    /// and the parameters were reset.
    pub fn bind(&mut self, identity: &str) -> bool {
        if self.identity.as_deref() == Some(identity) {
            return false;
        }
        self.identity = Some(identity.to_string());
        self.params = self.defaults.clone();
        true
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }
}

// =============================================================================
// Projection
// =============================================================================

/// Result of one pass through the view pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection<'a, T> {
    /// Rows of the requested page.
    pub page: Vec<&'a T>,
    /// Rows left after filtering, before pagination.
    pub total_matched: usize,
}

impl<'a, T> Projection<'a, T> {
    /// Number of pages for `page_size`.
    pub fn page_count(&self, page_size: usize) -> usize {
        if page_size == 0 {
            return 0;
        }
        self.total_matched.div_ceil(page_size)
    }

    pub fn into_owned(self) -> Vec<T>
    where
        T: Clone,
    {
        self.page.into_iter().cloned().collect()
    }
}

/// Runs `rows` through filter, sort and paginate.
///
/// ## Example
/// ```rust
/// use pantry_core::view::{project, FieldValue, Tabular, ViewParams};
///
/// struct Row(&'static str, i64);
///
/// impl Tabular for Row {
///     fn columns() -> &'static [&'static str] {
///         &["name", "qty"]
///     }
///     fn field(&self, key: &str) -> FieldValue<'_> {
///         match key {
///             "name" => self.0.into(),
///             "qty" => self.1.into(),
///             _ => FieldValue::Null,
///         }
///     }
/// }
///
/// let rows = vec![Row("Flour", 3), Row("Sugar", 1), Row("Rye Flour", 2)];
/// let mut params = ViewParams::for_table::<Row>();
/// params.set_search("flour");
/// params.toggle_sort("qty");
///
/// let view = project(&rows, &params);
/// assert_eq!(view.total_matched, 2);
/// assert_eq!(view.page[0].0, "Rye Flour");
/// ```
pub fn project<'a, T: Tabular>(rows: &'a [T], params: &ViewParams) -> Projection<'a, T> {
    // 1. Filter
    let mut matched: Vec<&'a T> = if params.search_query.is_empty() {
        rows.iter().collect()
    } else {
        let needle = params.search_query.to_lowercase();
        rows.iter().filter(|row| matches_query(*row, &needle)).collect()
    };
    let total_matched = matched.len();

    // 2. Sort (slice::sort_by is stable)
    if let Some(key) = params.sort_key.as_deref() {
        let direction = params.sort_direction;
        matched.sort_by(|a, b| direction.apply(a.field(key).natural_cmp(&b.field(key))));
    }

    // 3. Paginate
    let start = params.page_index.saturating_mul(params.page_size);
    let page = if start >= matched.len() {
        Vec::new()
    } else {
        let end = start.saturating_add(params.page_size).min(matched.len());
        matched[start..end].to_vec()
    };

    Projection {
        page,
        total_matched,
    }
}

fn matches_query<T: Tabular>(row: &T, needle: &str) -> bool {
    T::columns().iter().any(|key| {
        row.field(key)
            .search_text()
            .is_some_and(|text| text.to_lowercase().contains(needle))
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        name: &'static str,
        price: Option<f64>,
        tags: bool,
    }

    impl Tabular for Row {
        fn columns() -> &'static [&'static str] {
            &["id", "name", "price", "tags"]
        }

        fn field(&self, key: &str) -> FieldValue<'_> {
            match key {
                "id" => self.id.into(),
                "name" => self.name.into(),
                "price" => self.price.into(),
                // Structured value, never searchable
                "tags" if self.tags => FieldValue::Object,
                _ => FieldValue::Null,
            }
        }
    }

    fn row(id: i64, name: &'static str, price: Option<f64>) -> Row {
        Row {
            id,
            name,
            price,
            tags: true,
        }
    }

    fn ids(view: &Projection<'_, Row>) -> Vec<i64> {
        view.page.iter().map(|r| r.id).collect()
    }

    fn sample() -> Vec<Row> {
        vec![
            row(1, "Croissant", Some(2.5)),
            row(2, "Baguette", Some(1.8)),
            row(3, "Sourdough", None),
            row(4, "Pain au Chocolat", Some(2.5)),
            row(5, "Brioche", Some(3.0)),
        ]
    }

    #[test]
    fn test_empty_query_keeps_all_rows() {
        let rows = sample();
        let view = project(&rows, &ViewParams::default());
        assert_eq!(view.total_matched, 5);
        assert_eq!(ids(&view), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_query_keeps_rows_without_scalars() {
        let rows = vec![Row {
            id: 0,
            name: "",
            price: None,
            tags: true,
        }];
        assert_eq!(project(&rows, &ViewParams::default()).total_matched, 1);
    }

    #[test]
    fn test_filter_is_case_insensitive_across_fields() {
        let rows = sample();
        let mut params = ViewParams::default();

        params.set_search("BRIO");
        assert_eq!(ids(&project(&rows, &params)), vec![5]);

        // Matches the stringified number of the price column
        params.set_search("2.5");
        assert_eq!(ids(&project(&rows, &params)), vec![1, 4]);

        // Matches the id column
        params.set_search("3");
        assert_eq!(ids(&project(&rows, &params)), vec![3, 5]);
    }

    #[test]
    fn test_filter_skips_null_and_object_values() {
        let rows = sample();
        let mut params = ViewParams::default();
        params.set_search("null");
        assert_eq!(project(&rows, &params).total_matched, 0);
    }

    #[test]
    fn test_sort_by_number_and_text() {
        let rows = sample();
        let mut params = ViewParams::default();

        params.toggle_sort("name");
        assert_eq!(ids(&project(&rows, &params)), vec![2, 5, 1, 4, 3]);

        params.toggle_sort("name");
        assert_eq!(params.sort_direction, SortDirection::Descending);
        assert_eq!(ids(&project(&rows, &params)), vec![3, 4, 1, 5, 2]);

        // Null price sorts first ascending
        params.toggle_sort("price");
        assert_eq!(ids(&project(&rows, &params)), vec![3, 2, 1, 4, 5]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let rows = sample();
        let mut params = ViewParams::default();
        params.sort_by::<Row>("price", SortDirection::Ascending).unwrap();
        let asc = ids(&project(&rows, &params));
        // 1 and 4 share the price 2.5 and keep input order
        assert_eq!(asc, vec![3, 2, 1, 4, 5]);

        params.sort_direction = SortDirection::Descending;
        let desc = ids(&project(&rows, &params));
        assert_eq!(desc, vec![5, 1, 4, 2, 3]);
    }

    #[test]
    fn test_repeated_projection_is_identical() {
        let rows = sample();
        let mut params = ViewParams::for_table::<Row>();
        params.set_search("a");
        params.toggle_sort("price");

        let first = project(&rows, &params);
        let second = project(&rows, &params);
        assert_eq!(first, second);

        // Projecting the first page again with the same params changes nothing
        let page: Vec<Row> = first.clone().into_owned();
        let again = project(&page, &params);
        assert_eq!(ids(&again), ids(&first));
    }

    #[test]
    fn test_pagination_bounds() {
        let rows = sample();
        let mut params = ViewParams::default();
        params.set_page_size(2);

        params.set_page(1);
        assert_eq!(ids(&project(&rows, &params)), vec![3, 4]);

        params.set_page(2);
        assert_eq!(ids(&project(&rows, &params)), vec![5]);

        params.set_page_size(10);
        params.set_page(1000);
        let view = project(&rows, &params);
        assert!(view.page.is_empty());
        assert_eq!(view.total_matched, 5);
    }

    #[test]
    fn test_total_matched_counts_filtered_rows() {
        let rows = sample();
        let mut params = ViewParams::default();
        params.set_search("o");
        params.set_page_size(1);
        let view = project(&rows, &params);
        assert_eq!(view.page.len(), 1);
        assert_eq!(view.total_matched, 4);
        assert_eq!(view.page_count(1), 4);
    }

    #[test]
    fn test_search_and_page_size_reset_page_index() {
        let mut params = ViewParams::default();
        params.set_page(3);
        params.set_search("x");
        assert_eq!(params.page_index, 0);

        params.set_page(3);
        params.set_page_size(25);
        assert_eq!(params.page_index, 0);
    }

    #[test]
    fn test_for_table_sorts_by_first_column() {
        let params = ViewParams::for_table::<Row>();
        assert_eq!(params.sort_key.as_deref(), Some("id"));
        assert_eq!(params.sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn test_sort_by_rejects_unknown_column() {
        let mut params = ViewParams::default();
        assert!(params
            .sort_by::<Row>("weight", SortDirection::Ascending)
            .is_err());
        assert_eq!(params.sort_key, None);
    }

    #[test]
    fn test_view_state_resets_on_new_identity() {
        let mut state = ViewState::new(ViewParams::default());
        assert!(state.bind("categories"));
        state.params.set_search("bread");
        state.params.set_page(2);

        assert!(!state.bind("categories"));
        assert_eq!(state.params.search_query, "bread");

        assert!(state.bind("inventory"));
        assert_eq!(state.params, ViewParams::default());
        assert_eq!(state.identity(), Some("inventory"));
    }

    #[test]
    fn test_mixed_types_order_totally() {
        let values = [
            FieldValue::Text("a".into()),
            FieldValue::Int(2),
            FieldValue::Null,
            FieldValue::Float(1.5),
            FieldValue::Bool(true),
        ];
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.natural_cmp(b));
        assert_eq!(
            sorted,
            vec![
                FieldValue::Null,
                FieldValue::Bool(true),
                FieldValue::Float(1.5),
                FieldValue::Int(2),
                FieldValue::Text("a".into()),
            ]
        );
    }

    #[test]
    fn test_sort_direction_parsing() {
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Descending);
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Ascending);
        assert!("up".parse::<SortDirection>().is_err());
    }
}
