//! Named orderings and filters over the `TASKS` table.

use crate::error::{Error, Result};
use crate::models::parse_date;
use chrono::NaiveDate;
use rusqlite::types::Value;
use std::fmt;
use std::str::FromStr;

/// Name of a selection strategy as typed on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    TaskNumber,
    Priority,
    DueDate,
    ClosedRange,
    Overdue,
}

impl Method {
    pub const ALL: [Method; 5] = [
        Method::TaskNumber,
        Method::Priority,
        Method::DueDate,
        Method::ClosedRange,
        Method::Overdue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::TaskNumber => "task_number",
            Method::Priority => "priority",
            Method::DueDate => "due_date",
            Method::ClosedRange => "closed_range",
            Method::Overdue => "overdue",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| Error::UnsupportedQuery(s.to_string()))
    }
}

/// A fully specified selection, ready to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Every task, by id ascending
    TaskNumber,
    /// Every task, highest priority first
    Priority,
    /// Every task, latest due date first
    DueDate,
    /// Tasks due within `[start, end]`, earliest due first
    ClosedRange { start: NaiveDate, end: NaiveDate },
    /// Tasks due strictly before `today`, earliest due first
    Overdue { today: NaiveDate },
}

impl Selection {
    /// Resolve a method name and its optional bounds.
    ///
    /// `start` and `end` are only consulted for `closed_range`, where both are
    /// required and must not be inverted. `today` anchors `overdue`.
    pub fn resolve(
        method: &str,
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self> {
        let method: Method = method.parse()?;
        Ok(match method {
            Method::TaskNumber => Selection::TaskNumber,
            Method::Priority => Selection::Priority,
            Method::DueDate => Selection::DueDate,
            Method::Overdue => Selection::Overdue { today },
            Method::ClosedRange => {
                let (start, end) = match (non_empty(start), non_empty(end)) {
                    (Some(s), Some(e)) => (parse_date(s)?, parse_date(e)?),
                    _ => {
                        return Err(Error::Parse(
                            "closed_range needs both --start and --end".to_string(),
                        ));
                    }
                };
                Selection::closed_range(start, end)?
            }
        })
    }

    pub fn closed_range(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::Parse(format!(
                "range start {start} is after range end {end}"
            )));
        }
        Ok(Selection::ClosedRange { start, end })
    }

    pub fn method(&self) -> Method {
        match self {
            Selection::TaskNumber => Method::TaskNumber,
            Selection::Priority => Method::Priority,
            Selection::DueDate => Method::DueDate,
            Selection::ClosedRange { .. } => Method::ClosedRange,
            Selection::Overdue { .. } => Method::Overdue,
        }
    }

    /// WHERE and ORDER BY clauses plus the values bound into them
    pub(crate) fn clauses(&self) -> (&'static str, Vec<Value>) {
        match *self {
            Selection::TaskNumber => ("ORDER BY ID ASC", vec![]),
            Selection::Priority => ("ORDER BY PRIORITY DESC, ID ASC", vec![]),
            Selection::DueDate => ("ORDER BY DUE_DATE DESC, ID ASC", vec![]),
            Selection::ClosedRange { start, end } => (
                "WHERE DUE_DATE BETWEEN ?1 AND ?2 ORDER BY DUE_DATE ASC, ID ASC",
                vec![date_value(start), date_value(end)],
            ),
            Selection::Overdue { today } => (
                "WHERE DUE_DATE < ?1 ORDER BY DUE_DATE ASC, ID ASC",
                vec![date_value(today)],
            ),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn date_value(date: NaiveDate) -> Value {
    Value::Text(date.format(crate::models::DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_method_names_round_trip() {
        for method in Method::ALL {
            assert_eq!(method.as_str().parse::<Method>().unwrap(), method);
        }
    }

    #[test]
    fn test_unknown_method_is_unsupported() {
        let err = Selection::resolve("alphabetical", None, None, day(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedQuery(ref m) if m == "alphabetical"));
    }

    #[test]
    fn test_method_names_are_case_sensitive() {
        assert!("Priority".parse::<Method>().is_err());
    }

    #[test]
    fn test_closed_range_requires_bounds() {
        let today = day(2024, 1, 1);
        assert!(matches!(
            Selection::resolve("closed_range", Some("2024-01-01"), None, today),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            Selection::resolve("closed_range", Some(""), Some("2024-01-01"), today),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_closed_range_rejects_inverted_bounds() {
        let err = Selection::resolve(
            "closed_range",
            Some("2024-02-01"),
            Some("2024-01-01"),
            day(2024, 1, 1),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_closed_range_bad_date() {
        let err = Selection::resolve(
            "closed_range",
            Some("2024/01/01"),
            Some("2024-01-09"),
            day(2024, 1, 1),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidDate { .. }));
    }

    #[test]
    fn test_bounds_ignored_for_other_methods() {
        let sel = Selection::resolve("priority", Some("junk"), None, day(2024, 1, 1)).unwrap();
        assert_eq!(sel, Selection::Priority);
    }

    #[test]
    fn test_overdue_binds_today() {
        let sel = Selection::resolve("overdue", None, None, day(2024, 3, 9)).unwrap();
        let (sql, params) = sel.clauses();
        assert!(sql.starts_with("WHERE DUE_DATE < ?1"));
        assert_eq!(params, vec![Value::Text("2024-03-09".to_string())]);
        assert_eq!(sel.method(), Method::Overdue);
    }
}
