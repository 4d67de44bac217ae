//! Save/load family snapshots as JSON.
//!
//! A snapshot is a versioned document holding every member and spousal link
//! of a family:
//!
//! ```json
//! {
//!   "version": 1,
//!   "members": [{ "id": 1, "gender": "M", "names": { "en": "Arthur" } }],
//!   "links": [{ "id": 1, "member_a": 1, "member_b": 2, "marriage_date": "1950-06-01" }]
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use kinship::{Member, SpousalLink};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StoreFileError, StoreFileResult};
use crate::memory::InMemoryStore;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Every member and link of a family, ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilySnapshot {
    /// Format version.
    pub version: u32,
    /// Members ordered by id.
    pub members: Vec<Member>,
    /// Spousal links in insertion order.
    #[serde(default)]
    pub links: Vec<SpousalLink>,
}

impl FamilySnapshot {
    /// Creates a snapshot at the current format version.
    pub fn new(members: Vec<Member>, links: Vec<SpousalLink>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            members,
            links,
        }
    }

    /// Writes the snapshot as pretty-printed JSON.
    pub fn write_to<W: Write>(&self, writer: W) -> StoreFileResult<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Reads a snapshot, rejecting unknown format versions.
    pub fn read_from<R: Read>(reader: R) -> StoreFileResult<Self> {
        let snapshot: Self = serde_json::from_reader(reader)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreFileError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }

    /// Saves the snapshot to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> StoreFileResult<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| StoreFileError::io_error(path, e))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush().map_err(|e| StoreFileError::io_error(path, e))?;
        debug!(
            path = %path.display(),
            members = self.members.len(),
            links = self.links.len(),
            "snapshot saved"
        );
        Ok(())
    }

    /// Loads a snapshot from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> StoreFileResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| StoreFileError::io_error(path, e))?;
        let snapshot = Self::read_from(BufReader::new(file))?;
        debug!(
            path = %path.display(),
            members = snapshot.members.len(),
            links = snapshot.links.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }
}

impl InMemoryStore {
    /// Builds a store from a snapshot. Later duplicates of a member id win.
    pub fn from_snapshot(snapshot: FamilySnapshot) -> Self {
        Self::from_parts(snapshot.members, snapshot.links)
    }

    /// Captures the store's contents, members ordered by id.
    pub fn to_snapshot(&self) -> FamilySnapshot {
        let mut members: Vec<Member> = self.members().cloned().collect();
        members.sort_by_key(|m| m.id);
        FamilySnapshot::new(members, self.links().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use kinship::Gender;
    use kinship_engine::MemberStore;
    use tempfile::TempDir;

    fn store() -> InMemoryStore {
        let mut store = InMemoryStore::new();
        store.insert_member(
            Member::new(2, Gender::Female)
                .with_name("en", "Beatrice")
                .with_birth(NaiveDate::from_ymd_opt(1925, 3, 4).unwrap()),
        );
        store.insert_member(Member::new(1, Gender::Male).with_name("en", "Arthur"));
        store.insert_member(Member::new(3, Gender::Male).with_parents(1, 2));
        store
            .add_link(
                SpousalLink::new(1, 2).married_on(NaiveDate::from_ymd_opt(1950, 6, 1).unwrap()),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("family.json");

        let original = store();
        original.to_snapshot().save(&path).unwrap();
        let restored = InMemoryStore::from_snapshot(FamilySnapshot::load(&path).unwrap());

        assert_eq!(restored.to_snapshot(), original.to_snapshot());
        assert_eq!(restored.list_children(1).unwrap()[0].id, 3);
        assert!(restored.get_spousal_link(2, 1).unwrap().is_some());
    }

    #[test]
    fn test_members_sorted_by_id() {
        let snapshot = store().to_snapshot();
        let ids: Vec<u64> = snapshot.members.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_link_ids_continue_after_restore() {
        let mut restored = InMemoryStore::from_snapshot(store().to_snapshot());
        assert_eq!(restored.link_spouses(3, 2).unwrap(), 2);
    }

    #[test]
    fn test_unsupported_version() {
        let json = r#"{ "version": 9, "members": [], "links": [] }"#;
        let err = FamilySnapshot::read_from(json.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            StoreFileError::UnsupportedVersion { found: 9, expected: 1 }
        ));
    }

    #[test]
    fn test_links_default_to_empty() {
        let json = r#"{ "version": 1, "members": [{ "id": 1, "gender": "F" }] }"#;
        let snapshot = FamilySnapshot::read_from(json.as_bytes()).unwrap();
        assert_eq!(snapshot.members.len(), 1);
        assert!(snapshot.links.is_empty());
    }

    #[test]
    fn test_malformed_json() {
        let err = FamilySnapshot::read_from("{ not json".as_bytes()).unwrap_err();
        assert!(matches!(err, StoreFileError::Format(_)));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = FamilySnapshot::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, StoreFileError::Io { .. }));
    }
}
