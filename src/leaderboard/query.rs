//! Read views over a board: search, pagination and serialization

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::ops::Range;

use crate::common::errors::{LeaderboardError, Result};
use crate::common::types::{
    Board, CompetitionStatus, DisplayMetadata, Participant, Snapshot, SnapshotLabel,
};

/// Output serialization of a view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    /// `csv` (any case) selects CSV; anything else is JSON
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.trim().eq_ignore_ascii_case("csv") => OutputFormat::Csv,
            _ => OutputFormat::Json,
        }
    }
}

/// Read parameters as received from a client, already lenient-parsed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub search: Option<String>,
    pub skip: Option<i64>,
    pub size: Option<i64>,
    /// Select the blacklisted partition instead of the public one
    pub excluded: bool,
}

/// Clamped slice bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub start: usize,
    pub end: usize,
}

impl Pagination {
    /// Clamp raw `skip`/`size` to a valid range over `len` items.
    ///
    /// Negative `skip` counts as zero and `skip` past the end yields an
    /// empty page. Missing or non-positive `size` means everything after
    /// `skip`.
    pub fn clamp(skip: Option<i64>, size: Option<i64>, len: usize) -> Self {
        let start = skip
            .map(|s| usize::try_from(s.max(0)).unwrap_or(usize::MAX))
            .unwrap_or(0)
            .min(len);
        let remaining = len - start;
        let take = match size {
            Some(s) if s > 0 => usize::try_from(s).unwrap_or(usize::MAX).min(remaining),
            _ => remaining,
        };
        Self {
            start,
            end: start + take,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Participants matching `search` on id or handle, case-insensitively
pub fn search<'a>(participants: &'a [Participant], search: Option<&str>) -> Vec<&'a Participant> {
    let needle = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();
    participants.iter().filter(|p| p.matches(&needle)).collect()
}

/// Search then paginate, returning the page and the number of matches
pub fn select<'a>(participants: &'a [Participant], query: &ViewQuery) -> (Vec<&'a Participant>, usize) {
    let mut matched = search(participants, query.search.as_deref());
    let total = matched.len();
    let page = Pagination::clamp(query.skip, query.size, total);
    matched.truncate(page.end);
    matched.drain(..page.start);
    (matched, total)
}

/// JSON body of `GET /leaderboard`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView<'a> {
    pub version: u32,
    #[serde(flatten)]
    pub metadata: &'a DisplayMetadata,
    pub last_update: DateTime<Utc>,
    pub status: CompetitionStatus,
    /// Matches before pagination
    pub total: usize,
    pub participants: Vec<&'a Participant>,
}

/// Filtered, paginated view of one partition of `board`
pub fn board_view<'a>(board: &'a Board, query: &ViewQuery) -> BoardView<'a> {
    let partition = if query.excluded {
        &board.excluded
    } else {
        &board.participants
    };
    let (participants, total) = select(partition, query);

    BoardView {
        version: board.version,
        metadata: &board.metadata,
        last_update: board.last_update,
        status: board.status,
        total,
        participants,
    }
}

/// JSON body of `GET /leaderboard/snapshots/{label}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotView<'a> {
    pub label: SnapshotLabel,
    pub captured_at: DateTime<Utc>,
    pub total: usize,
    pub participants: Vec<&'a Participant>,
}

/// Filtered, paginated view of a snapshot; `excluded` is ignored
pub fn snapshot_view<'a>(snapshot: &'a Snapshot, query: &ViewQuery) -> SnapshotView<'a> {
    let (participants, total) = select(&snapshot.participants, query);
    SnapshotView {
        label: snapshot.label,
        captured_at: snapshot.captured_at,
        total,
        participants,
    }
}

/// CSV rendering: position, party id, handle, then one column per strategy value
pub fn to_csv(participants: &[&Participant], headers: &[String]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    let mut header_row = vec!["Position", "Party ID", "Handle"];
    header_row.extend(headers.iter().map(String::as_str));
    writer.write_record(&header_row)?;

    for p in participants {
        let position = p.position.to_string();
        let mut row = vec![
            position.as_str(),
            p.party_id.as_str(),
            p.handle.as_deref().unwrap_or(""),
        ];
        row.extend(p.data.iter().map(String::as_str));
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| LeaderboardError::Internal(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| LeaderboardError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::VerifiedIdentity;
    use pretty_assertions::assert_eq;

    fn participant(id: &str, handle: Option<&str>, position: u64) -> Participant {
        let identity = VerifiedIdentity {
            party_id: id.to_string(),
            handle: handle.unwrap_or_default().to_string(),
            identity_id: position as i64,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_blacklisted: false,
        };
        let mut p = Participant::for_identity(&identity, vec![format!("{}.00", position)], 0.0, Utc::now());
        p.handle = handle.map(str::to_string);
        p.position = position;
        p
    }

    fn ids(list: &[&Participant]) -> Vec<String> {
        list.iter().map(|p| p.party_id.clone()).collect()
    }

    #[test]
    fn test_pagination_clamping() {
        assert_eq!(Pagination::clamp(None, None, 5).range(), 0..5);
        assert_eq!(Pagination::clamp(Some(-3), None, 5), Pagination::clamp(Some(0), None, 5));
        assert_eq!(Pagination::clamp(Some(2), Some(0), 5).range(), 2..5);
        assert_eq!(Pagination::clamp(Some(2), Some(-1), 5).range(), 2..5);
        assert_eq!(Pagination::clamp(Some(3), Some(10), 5).range(), 3..5);
        assert_eq!(Pagination::clamp(Some(9), Some(2), 5).range(), 5..5);
        assert_eq!(Pagination::clamp(Some(i64::MAX), Some(i64::MAX), 5).range(), 5..5);
        assert_eq!(Pagination::clamp(Some(1), Some(2), 0).range(), 0..0);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let list = vec![participant("0xAL1CE", Some("Alice"), 1), participant("0xBOB", None, 2)];
        assert_eq!(ids(&search(&list, Some("alice"))), vec!["0xAL1CE"]);
        assert_eq!(ids(&search(&list, Some("0XB"))), vec!["0xBOB"]);
        assert_eq!(search(&list, Some("")).len(), 2);
        assert_eq!(search(&list, None).len(), 2);
    }

    #[test]
    fn test_select_paginates_after_search() {
        let list: Vec<Participant> = (1..=5).map(|i| participant(&format!("p{}", i), None, i)).collect();
        let query = ViewQuery {
            search: Some("p".to_string()),
            skip: Some(1),
            size: Some(2),
            excluded: false,
        };
        let (page, total) = select(&list, &query);
        assert_eq!(total, 5);
        assert_eq!(ids(&page), vec!["p2", "p3"]);
    }

    #[test]
    fn test_board_view_selects_partition() {
        let mut board = Board::loading(3, DisplayMetadata::default(), Utc::now());
        board.participants = vec![participant("pub", None, 1)];
        board.excluded = vec![participant("bad", None, 1)];

        let public = board_view(&board, &ViewQuery::default());
        assert_eq!(ids(&public.participants), vec!["pub"]);

        let excluded = board_view(
            &board,
            &ViewQuery {
                excluded: true,
                ..ViewQuery::default()
            },
        );
        assert_eq!(ids(&excluded.participants), vec!["bad"]);
        assert_eq!(excluded.version, 3);
    }

    #[test]
    fn test_board_view_json_shape() {
        let metadata = DisplayMetadata {
            description: "Top traders".to_string(),
            headers: vec!["Balance".to_string()],
            ..DisplayMetadata::default()
        };
        let board = Board::loading(1, metadata, Utc::now());
        let value = serde_json::to_value(board_view(&board, &ViewQuery::default())).unwrap();
        assert_eq!(value["description"], "Top traders");
        assert_eq!(value["status"], "loading");
        assert_eq!(value["total"], 0);
        assert!(value["lastUpdate"].is_string());
    }

    #[test]
    fn test_csv_rendering() {
        let list = vec![participant("0xa", Some("alice, the great"), 1), participant("0xb", None, 2)];
        let refs: Vec<&Participant> = list.iter().collect();
        let csv = to_csv(&refs, &["Balance".to_string()]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Position,Party ID,Handle,Balance");
        assert_eq!(lines[1], "1,0xa,\"alice, the great\",1.00");
        assert_eq!(lines[2], "2,0xb,,2.00");
    }

    #[test]
    fn test_output_format_param() {
        assert_eq!(OutputFormat::from_param(Some("CSV")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_param(Some("xml")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_param(None), OutputFormat::Json);
    }
}
