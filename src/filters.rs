/// Status narrowing applied to the list request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Done,
    Undone,
}

impl StatusFilter {
    pub const ALL: [Self; 3] = [StatusFilter::All, StatusFilter::Done, StatusFilter::Undone];

    pub fn index(self) -> usize {
        match self {
            StatusFilter::All => 0,
            StatusFilter::Done => 1,
            StatusFilter::Undone => 2,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Done => "Done",
            StatusFilter::Undone => "Undone",
        }
    }

    /// Value of the `status` query parameter; `None` means the parameter is omitted.
    pub fn query_value(self) -> Option<&'static str> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Done => Some("done"),
            StatusFilter::Undone => Some("undone"),
        }
    }

    pub fn next(self) -> Self {
        StatusFilter::ALL[(self.index() + 1) % StatusFilter::ALL.len()]
    }
}

/// Priority ordering of the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    None,
    Ascending,
    Descending,
}

impl SortDirection {
    // none -> asc -> desc -> none
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::None => SortDirection::Ascending,
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::None,
        }
    }

    pub fn query_value(self) -> Option<&'static str> {
        match self {
            SortDirection::None => None,
            SortDirection::Ascending => Some("asc"),
            SortDirection::Descending => Some("desc"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortDirection::None => "Priority: unsorted",
            SortDirection::Ascending => "Priority: ascending",
            SortDirection::Descending => "Priority: descending",
        }
    }
}

/// The toolbar state every list request is derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilters {
    pub status: StatusFilter,
    pub search: String,
    pub sort: SortDirection,
}

impl ListFilters {
    /// True when the user has narrowed the list (status or search). Sorting does not
    /// narrow anything.
    pub fn is_active(&self) -> bool {
        self.status != StatusFilter::All || !self.search.is_empty()
    }

    /// Query pairs for `GET /tasks`, leaving out every parameter whose state is unset.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status.query_value() {
            pairs.push(("status", status.to_string()));
        }
        if let Some(sort) = self.sort.query_value() {
            pairs.push(("sort_by_priority", sort.to_string()));
        }
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        pairs
    }
}
