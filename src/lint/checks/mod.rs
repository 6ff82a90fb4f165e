//! Individual lint checks

pub mod flow;
pub mod quality;
pub mod references;
pub mod structure;

use crate::catalog::EventCatalog;
use crate::types::page::EventPage;

/// Every page of every event as `(event_id, page_index, page)`
pub(crate) fn pages(catalog: &EventCatalog) -> impl Iterator<Item = (u32, usize, &EventPage)> {
    catalog.events().flat_map(|event| {
        event
            .pages
            .iter()
            .enumerate()
            .map(move |(index, page)| (event.id, index, page))
    })
}
