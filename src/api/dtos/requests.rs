use serde::Deserialize;

use crate::domain::models::schedule_entry::{ArchivedFilter, EntryListFilter};

#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    pub series_id: Option<String>,
    #[serde(default)]
    pub archived: ArchivedFilter,
}

impl From<ListEntriesQuery> for EntryListFilter {
    fn from(query: ListEntriesQuery) -> Self {
        Self {
            series_id: query.series_id,
            archived: query.archived,
        }
    }
}
