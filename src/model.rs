use chrono::{DateTime, Local};
use indicatif::HumanBytes;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Owner and group of a filesystem entry.
///
/// The numeric ids are captured by the walker; the names stay empty until an
/// [`crate::platform::IdentityResolver`] fills them in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub username: String,
    pub group_name: String,
}

impl Identity {
    pub fn is_resolved(&self) -> bool {
        !self.username.is_empty() || !self.group_name.is_empty()
    }
}

/// Metadata for a single entry visited by the walker.
#[derive(Debug, Clone)]
pub struct MetadataRecord {
    pub path: PathBuf,
    pub parent_dir: PathBuf,
    pub is_dir: bool,
    pub size: u64,
    pub modified: DateTime<Local>,
    pub permission_bits: u32,
    pub identity: Identity,
}

impl MetadataRecord {
    /// Builds a record from `lstat`-style metadata already gathered for `path`.
    pub fn from_metadata(path: PathBuf, metadata: &Metadata) -> io::Result<Self> {
        let modified = local_time(metadata.modified()?)?;
        let parent_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(Self {
            parent_dir,
            is_dir: metadata.is_dir(),
            size: metadata.len(),
            modified,
            permission_bits: permission_bits(metadata),
            identity: ownership(metadata),
            path,
        })
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    /// Fractional age in days relative to `now`.
    pub fn age_days(&self, now: DateTime<Local>) -> f64 {
        let elapsed = now.signed_duration_since(self.modified);
        elapsed.num_milliseconds() as f64 / 86_400_000.0
    }

    pub fn human_size(&self) -> String {
        HumanBytes(self.size).to_string()
    }
}

/// Converts a filesystem timestamp without panicking on values chrono cannot
/// represent, which some filesystems accept from any user.
pub(crate) fn local_time(time: SystemTime) -> io::Result<DateTime<Local>> {
    let (secs, nanos) = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => (i64::try_from(after.as_secs()).ok(), after.subsec_nanos()),
        Err(err) => {
            let before = err.duration();
            let secs = i64::try_from(before.as_secs()).ok().map(|secs| -secs);
            match before.subsec_nanos() {
                0 => (secs, 0),
                nanos => (secs.and_then(|secs| secs.checked_sub(1)), 1_000_000_000 - nanos),
            }
        }
    };

    secs.and_then(|secs| DateTime::from_timestamp(secs, nanos))
        .map(|utc| utc.with_timezone(&Local))
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "modification time out of supported range",
            )
        })
}

#[cfg(unix)]
fn permission_bits(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}

#[cfg(unix)]
fn ownership(metadata: &Metadata) -> Identity {
    use std::os::unix::fs::MetadataExt;
    Identity {
        uid: Some(metadata.uid()),
        gid: Some(metadata.gid()),
        ..Identity::default()
    }
}

#[cfg(not(unix))]
fn ownership(_metadata: &Metadata) -> Identity {
    Identity::default()
}

/// Records gathered for one root path, in discovery order until sorted.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<MetadataRecord>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: MetadataRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetadataRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, MetadataRecord> {
        self.records.iter_mut()
    }

    /// Sum of sizes of every non-directory record.
    pub fn total_size(&self) -> u64 {
        self.records
            .iter()
            .filter(|record| !record.is_dir)
            .map(|record| record.size)
            .sum()
    }

    /// Oldest first. Equal timestamps are ordered by path.
    pub fn sort_by_age_ascending(&mut self) {
        self.records.sort_by(|a, b| {
            a.modified
                .cmp(&b.modified)
                .then_with(|| a.path.cmp(&b.path))
        });
    }

    /// Smallest first. Equal sizes are ordered by path.
    pub fn sort_by_size_ascending(&mut self) {
        self.records
            .sort_by(|a, b| a.size.cmp(&b.size).then_with(|| a.path.cmp(&b.path)));
    }

    pub fn sort_by_path(&mut self) {
        self.records.sort_by(|a, b| a.path.cmp(&b.path));
    }
}

impl From<Vec<MetadataRecord>> for RecordSet {
    fn from(records: Vec<MetadataRecord>) -> Self {
        Self { records }
    }
}

impl FromIterator<MetadataRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = MetadataRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RecordSet {
    type Item = MetadataRecord;
    type IntoIter = std::vec::IntoIter<MetadataRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a MetadataRecord;
    type IntoIter = std::slice::Iter<'a, MetadataRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    pub(crate) fn record(
        path: &str,
        size: u64,
        is_dir: bool,
        modified: DateTime<Local>,
    ) -> MetadataRecord {
        let path = PathBuf::from(path);
        MetadataRecord {
            parent_dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            is_dir,
            size,
            modified,
            permission_bits: 0o644,
            identity: Identity::default(),
            path,
        }
    }

    fn epoch() -> DateTime<Local> {
        Local.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_total_size_skips_directories() {
        let set: RecordSet = vec![
            record("/r", 4096, true, epoch()),
            record("/r/a", 100, false, epoch()),
            record("/r/sub", 4096, true, epoch()),
            record("/r/sub/b", 250, false, epoch()),
        ]
        .into();
        assert_eq!(set.total_size(), 350);
    }

    #[test]
    fn test_total_size_independent_of_order() {
        let records = vec![
            record("/r/a", 1, false, epoch()),
            record("/r/d", 77, true, epoch()),
            record("/r/b", 20, false, epoch()),
            record("/r/c", 300, false, epoch()),
        ];
        let forward: RecordSet = records.clone().into();
        let backward: RecordSet = records.into_iter().rev().collect();
        assert_eq!(forward.total_size(), 321);
        assert_eq!(backward.total_size(), 321);
    }

    #[test]
    fn test_sort_by_age_ascending_puts_oldest_first() {
        let mut set: RecordSet = vec![
            record("/r/new", 1, false, epoch()),
            record("/r/old", 1, false, epoch() - Duration::days(40)),
            record("/r/mid", 1, false, epoch() - Duration::days(10)),
        ]
        .into();
        set.sort_by_age_ascending();
        let names: Vec<String> = set.iter().map(MetadataRecord::name).collect();
        assert_eq!(names, vec!["old", "mid", "new"]);
    }

    #[test]
    fn test_sort_by_size_ascending_puts_smallest_first() {
        let mut set: RecordSet = vec![
            record("/r/big", 900, false, epoch()),
            record("/r/small", 5, false, epoch()),
            record("/r/b-mid", 50, false, epoch()),
            record("/r/a-mid", 50, false, epoch()),
        ]
        .into();
        set.sort_by_size_ascending();
        let names: Vec<String> = set.iter().map(MetadataRecord::name).collect();
        assert_eq!(names, vec!["small", "a-mid", "b-mid", "big"]);
    }

    #[test]
    fn test_local_time_rejects_out_of_range_timestamps() {
        let far_future = UNIX_EPOCH + std::time::Duration::from_secs(10_000_000_000_000);
        let err = local_time(far_future).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_local_time_handles_pre_epoch_timestamps() {
        let before = UNIX_EPOCH - std::time::Duration::from_millis(1_500);
        let converted = local_time(before).unwrap();
        assert_eq!(converted.timestamp_millis(), -1_500);

        let now = SystemTime::now();
        let converted = local_time(now).unwrap();
        assert_eq!(converted, DateTime::<Local>::from(now));
    }

    #[test]
    fn test_age_days() {
        let rec = record("/r/a", 1, false, epoch() - Duration::hours(36));
        assert!((rec.age_days(epoch()) - 1.5).abs() < f64::EPSILON);
    }
}
