//! Calendar view: a Monday-first month grid of due dates.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

use crate::{Error, Result};
use crate::models::WorkItem;
use crate::priority::PriorityField;
use crate::views::ItemCard;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// False for the leading/trailing days borrowed from adjacent months
    pub in_month: bool,
    pub items: Vec<ItemCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    /// Each week has exactly seven days, Monday through Sunday
    pub weeks: Vec<Vec<CalendarDay>>,
    /// Items without a due date
    pub undated: Vec<ItemCard>,
}

impl CalendarMonth {
    /// Items due inside the month itself.
    pub fn due_in_month(&self) -> usize {
        self.weeks
            .iter()
            .flatten()
            .filter(|d| d.in_month)
            .map(|d| d.items.len())
            .sum()
    }
}

/// Parse `YYYY-MM` into the first day of that month.
pub fn parse_month(s: &str) -> Result<NaiveDate> {
    let (year, month) = s
        .trim()
        .split_once('-')
        .ok_or_else(|| Error::InvalidInput(format!("Expected YYYY-MM, got: {}", s)))?;
    let year: i32 = year
        .parse()
        .map_err(|_| Error::InvalidInput(format!("Invalid year in: {}", s)))?;
    let month: u32 = month
        .parse()
        .map_err(|_| Error::InvalidInput(format!("Invalid month in: {}", s)))?;
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::InvalidInput(format!("No such month: {}", s)))
}

fn first_of_next_month(first: NaiveDate) -> NaiveDate {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(first)
}

/// Lay out the month containing `month_start` and place each item on its
/// due date (UTC calendar day).
pub fn build(items: &[&WorkItem], month_start: NaiveDate, field: PriorityField) -> CalendarMonth {
    let first = month_start.with_day(1).unwrap_or(month_start);
    let next_month = first_of_next_month(first);
    let last = next_month - Duration::days(1);

    let grid_start = first - Duration::days(first.weekday().num_days_from_monday() as i64);
    let grid_end = last + Duration::days(6 - last.weekday().num_days_from_monday() as i64);

    let mut weeks = Vec::new();
    let mut week = Vec::with_capacity(7);
    let mut day = grid_start;
    while day <= grid_end {
        let due_here: Vec<ItemCard> = items
            .iter()
            .filter(|item| item.due_date.is_some_and(|due| due.date_naive() == day))
            .map(|item| ItemCard::from_item(item, field))
            .collect();
        week.push(CalendarDay {
            date: day,
            in_month: day.month() == first.month(),
            items: due_here,
        });
        if day.weekday() == Weekday::Sun {
            weeks.push(std::mem::take(&mut week));
        }
        day += Duration::days(1);
    }

    let undated = items
        .iter()
        .filter(|item| item.due_date.is_none())
        .map(|item| ItemCard::from_item(item, field))
        .collect();

    CalendarMonth {
        year: first.year(),
        month: first.month(),
        weeks,
        undated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkItemStatus;
    use crate::views::fixtures::*;

    #[test]
    fn test_grid_is_monday_first_and_full_weeks() {
        // March 2026 starts on a Sunday
        let month = build(&[], parse_month("2026-03").unwrap(), PriorityField::Comp);
        assert_eq!(month.weeks.len(), 6);
        for week in &month.weeks {
            assert_eq!(week.len(), 7);
            assert_eq!(week[0].date.weekday(), Weekday::Mon);
        }
        assert_eq!(month.weeks[0][0].date, NaiveDate::from_ymd_opt(2026, 2, 23).unwrap());
        assert!(!month.weeks[0][0].in_month);
        assert!(month.weeks[0][6].in_month);
        let in_month = month.weeks.iter().flatten().filter(|d| d.in_month).count();
        assert_eq!(in_month, 31);
    }

    #[test]
    fn test_items_land_on_due_day() {
        let mut due = item("due", WorkItemStatus::InProgress, 0.5, 1);
        due.due_date = Some("2026-03-18T15:30:00Z".parse().unwrap());
        let mut other_month = item("april", WorkItemStatus::InProgress, 0.5, 1);
        other_month.due_date = Some("2026-04-20T00:00:00Z".parse().unwrap());
        let undated = item("undated", WorkItemStatus::InProgress, 0.5, 1);

        let month = build(
            &[&due, &other_month, &undated],
            parse_month("2026-03").unwrap(),
            PriorityField::Comp,
        );
        let day = month
            .weeks
            .iter()
            .flatten()
            .find(|d| d.date == NaiveDate::from_ymd_opt(2026, 3, 18).unwrap())
            .unwrap();
        assert_eq!(day.items.len(), 1);
        assert_eq!(day.items[0].id, "due");
        assert_eq!(month.due_in_month(), 1);
        assert_eq!(month.undated.len(), 1);
        assert_eq!(month.undated[0].id, "undated");
    }

    #[test]
    fn test_december_rolls_over() {
        let month = build(&[], parse_month("2025-12").unwrap(), PriorityField::Comp);
        let last = month.weeks.last().unwrap().last().unwrap();
        assert_eq!(last.date, NaiveDate::from_ymd_opt(2026, 1, 4).unwrap());
        assert_eq!(month.month, 12);
    }

    #[test]
    fn test_parse_month_rejects_garbage() {
        assert!(parse_month("2026-13").is_err());
        assert!(parse_month("March").is_err());
        assert!(parse_month("20x6-01").is_err());
        assert_eq!(
            parse_month(" 2026-02 ").unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
        );
    }
}
