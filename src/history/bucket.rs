//! Grouping history summaries by age

use crate::model::ConversationSummary;
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Age window for `Bucket::Previous7Days`, measured as an instant span
pub fn recent_window() -> Duration {
    Duration::days(7)
}

/// Display group for a history summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Today,
    Yesterday,
    Previous7Days,
    Older,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [
        Bucket::Today,
        Bucket::Yesterday,
        Bucket::Previous7Days,
        Bucket::Older,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Bucket::Today => "Today",
            Bucket::Yesterday => "Yesterday",
            Bucket::Previous7Days => "Previous 7 Days",
            Bucket::Older => "Older",
        }
    }
}

/// Classify one instant relative to `now`.
///
/// Today and yesterday are calendar days in `now`'s time zone. The
/// previous-7-days cutoff is the instant `now - 7x24h`; an item exactly at
/// the cutoff is `Older`. Missing or unparseable timestamps are `Older`.
pub fn classify<Tz: TimeZone>(at: Option<DateTime<Utc>>, now: &DateTime<Tz>) -> Bucket {
    let Some(at) = at else {
        return Bucket::Older;
    };

    let today = now.date_naive();
    let day = at.with_timezone(&now.timezone()).date_naive();

    if day == today {
        Bucket::Today
    } else if today.pred_opt() == Some(day) {
        Bucket::Yesterday
    } else if at > now.with_timezone(&Utc) - recent_window() {
        Bucket::Previous7Days
    } else {
        Bucket::Older
    }
}

/// Summaries partitioned into display groups, input order kept within each
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryGroups<'a> {
    pub today: Vec<&'a ConversationSummary>,
    pub yesterday: Vec<&'a ConversationSummary>,
    pub previous_7_days: Vec<&'a ConversationSummary>,
    pub older: Vec<&'a ConversationSummary>,
}

impl<'a> HistoryGroups<'a> {
    pub fn get(&self, bucket: Bucket) -> &[&'a ConversationSummary] {
        match bucket {
            Bucket::Today => &self.today,
            Bucket::Yesterday => &self.yesterday,
            Bucket::Previous7Days => &self.previous_7_days,
            Bucket::Older => &self.older,
        }
    }

    fn get_mut(&mut self, bucket: Bucket) -> &mut Vec<&'a ConversationSummary> {
        match bucket {
            Bucket::Today => &mut self.today,
            Bucket::Yesterday => &mut self.yesterday,
            Bucket::Previous7Days => &mut self.previous_7_days,
            Bucket::Older => &mut self.older,
        }
    }

    pub fn len(&self) -> usize {
        Bucket::ALL.iter().map(|b| self.get(*b).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Groups in display order, skipping empty ones
    pub fn non_empty(&self) -> impl Iterator<Item = (Bucket, &[&'a ConversationSummary])> + '_ {
        Bucket::ALL
            .into_iter()
            .map(|b| (b, self.get(b)))
            .filter(|(_, items)| !items.is_empty())
    }

    /// All summaries in display order
    pub fn flatten(&self) -> Vec<&'a ConversationSummary> {
        Bucket::ALL
            .into_iter()
            .flat_map(|b| self.get(b).iter().copied())
            .collect()
    }
}

/// Partition `items` into today / yesterday / previous 7 days / older
pub fn bucket<'a, Tz: TimeZone>(
    items: &'a [ConversationSummary],
    now: &DateTime<Tz>,
) -> HistoryGroups<'a> {
    let mut groups = HistoryGroups::default();
    for item in items {
        groups
            .get_mut(classify(item.parsed_timestamp(), now))
            .push(item);
    }
    groups
}
