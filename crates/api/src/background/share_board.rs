//! Agency-wide share board.
//!
//! The board lists, for every enquiry that has itineraries, which itinerary
//! and PDF would be sent if the agency shared it now. It is rebuilt by a
//! single [`Refresher`] task: periodically and after every mutation that
//! can change the selection, with overlapping requests collapsed.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use itinera_core::error::CoreError;
use itinera_core::pdf_version::{
    pick_default_selection, rank_itineraries, ItineraryRecord, SelectionReason,
};
use itinera_core::refresh::{RefreshHandle, Refresher, SnapshotSource};
use itinera_core::share::{build_share_payload, SharePayload};
use itinera_core::types::{DbId, Timestamp};
use itinera_db::repositories::{AgencyItinerary, ItineraryRepo};
use itinera_db::DbPool;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Share readiness of one enquiry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareBoardEntry {
    pub enquiry_id: DbId,
    pub itinerary_count: usize,
    /// Why the default itinerary was chosen. `None` when nothing is sendable.
    pub reason: Option<SelectionReason>,
    /// What would be sent. `None` when no itinerary has a PDF.
    pub payload: Option<SharePayload>,
}

/// A full snapshot of the board, keyed by agency.
#[derive(Debug, Clone, Default)]
pub struct ShareBoard {
    pub generated_at: Option<Timestamp>,
    pub agencies: BTreeMap<DbId, Vec<ShareBoardEntry>>,
}

impl ShareBoard {
    /// Entries of one agency, in enquiry order.
    pub fn for_agency(&self, agency_id: DbId) -> &[ShareBoardEntry] {
        self.agencies
            .get(&agency_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Build a board from itinerary rows joined with their agency.
pub fn build_share_board(rows: Vec<AgencyItinerary>) -> ShareBoard {
    let mut grouped: BTreeMap<(DbId, DbId), Vec<_>> = BTreeMap::new();
    for row in rows {
        grouped
            .entry((row.agency_id, row.itinerary.enquiry_id))
            .or_default()
            .push(ItineraryRecord::from(row.itinerary));
    }

    let mut agencies: BTreeMap<DbId, Vec<ShareBoardEntry>> = BTreeMap::new();
    for ((agency_id, enquiry_id), mut records) in grouped {
        rank_itineraries(&mut records);
        let selection = pick_default_selection(&records);
        let payload = selection
            .as_ref()
            .and_then(|s| build_share_payload(&records[s.index]).ok());

        agencies.entry(agency_id).or_default().push(ShareBoardEntry {
            enquiry_id,
            itinerary_count: records.len(),
            reason: selection.map(|s| s.reason),
            payload,
        });
    }

    ShareBoard {
        generated_at: Some(Utc::now()),
        agencies,
    }
}

/// Loads the board from the database.
pub struct ShareBoardSource {
    pool: DbPool,
}

impl ShareBoardSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotSource for ShareBoardSource {
    type Snapshot = ShareBoard;

    async fn fetch(&self) -> Result<ShareBoard, CoreError> {
        let rows = ItineraryRepo::list_all_with_agency(&self.pool)
            .await
            .map_err(|e| CoreError::Internal(format!("share board query failed: {e}")))?;
        let board = build_share_board(rows);
        tracing::debug!(agencies = board.agencies.len(), "Share board refreshed");
        Ok(board)
    }
}

/// Start the share board refresher.
pub fn start(
    pool: DbPool,
    interval: Duration,
    cancel: &CancellationToken,
) -> (RefreshHandle<ShareBoard>, JoinHandle<()>) {
    tracing::info!(interval_secs = interval.as_secs(), "Share board refresher started");
    Refresher::spawn(ShareBoardSource::new(pool), interval, cancel)
}
