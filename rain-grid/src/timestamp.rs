use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime};
use rain_utils::dates::{format_timestamp, parse_timestamp};

/// One entry of the time index.
///
/// The original text is kept so output rows carry the input timestamps
/// verbatim. The UTC offset, when present, is an annotation only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Timestamp {
    text: String,
    local: NaiveDateTime,
    offset: Option<FixedOffset>,
}

impl Timestamp {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let (local, offset) = parse_timestamp(text)?;
        Ok(Timestamp {
            text: text.trim().to_string(),
            local,
            offset,
        })
    }

    pub fn from_datetime(dt: DateTime<FixedOffset>) -> Self {
        Timestamp {
            text: format_timestamp(&dt),
            local: dt.naive_local(),
            offset: Some(*dt.offset()),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn local(&self) -> NaiveDateTime {
        self.local
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    /// Sort key: the UTC instant when an offset is known, otherwise wall-clock time.
    ///
    /// Naive and offset keys only compare meaningfully within one kind; see
    /// [`TimeIndex::has_mixed_offsets`].
    pub fn instant(&self) -> NaiveDateTime {
        match self.offset {
            Some(offset) => self.local - Duration::seconds(offset.local_minus_utc() as i64),
            None => self.local,
        }
    }
}

/// Ordered timestamps shared by every input and output column.
///
/// Spacing is neither validated nor filled: every window-based feature
/// counts rows, so an irregular index changes what "one hour" means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeIndex(Vec<Timestamp>);

impl TimeIndex {
    pub fn new(timestamps: Vec<Timestamp>) -> Self {
        TimeIndex(timestamps)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Timestamp> {
        self.0.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Timestamp> {
        self.0.iter()
    }

    /// True when some timestamps carry a UTC offset and others do not.
    pub fn has_mixed_offsets(&self) -> bool {
        let with_offset = self.0.iter().filter(|ts| ts.offset.is_some()).count();
        with_offset > 0 && with_offset < self.0.len()
    }

    /// True when every instant is later than the one before it.
    pub fn is_strictly_increasing(&self) -> bool {
        self.0
            .windows(2)
            .all(|pair| pair[0].instant() < pair[1].instant())
    }
}

impl FromIterator<Timestamp> for TimeIndex {
    fn from_iter<I: IntoIterator<Item = Timestamp>>(iter: I) -> Self {
        TimeIndex(iter.into_iter().collect())
    }
}
