//! Pure month-grid construction for the calendar view. No clocks, no
//! storage: callers pass the entries and today's date in.

use std::collections::HashMap;

use time::{Date, Month};

use crate::entries::repo::DayEntry;

/// One in-month cell of the calendar grid.
#[derive(Debug, Clone)]
pub struct DaySlot {
    pub date: Date,
    pub day: u8,
    pub entry: Option<DayEntry>,
    pub score_class: &'static str,
    pub is_today: bool,
    pub is_future: bool,
}

/// CSS class for a score. Twelve categories: "none" plus 0 through 10.
pub fn score_class(score: Option<i32>) -> &'static str {
    match score {
        Some(0) => "score-0",
        Some(1) => "score-1",
        Some(2) => "score-2",
        Some(3) => "score-3",
        Some(4) => "score-4",
        Some(5) => "score-5",
        Some(6) => "score-6",
        Some(7) => "score-7",
        Some(8) => "score-8",
        Some(9) => "score-9",
        Some(10) => "score-10",
        _ => "score-none",
    }
}

pub fn month_name(month: Month) -> &'static str {
    match month {
        Month::January => "January",
        Month::February => "February",
        Month::March => "March",
        Month::April => "April",
        Month::May => "May",
        Month::June => "June",
        Month::July => "July",
        Month::August => "August",
        Month::September => "September",
        Month::October => "October",
        Month::November => "November",
        Month::December => "December",
    }
}

/// Builds a day slot for a single date.
pub fn day_slot(date: Date, entry: Option<DayEntry>, today: Date) -> DaySlot {
    let score_class = score_class(entry.as_ref().map(|e| e.score));
    DaySlot {
        date,
        day: date.day(),
        entry,
        score_class,
        is_today: date == today,
        is_future: date > today,
    }
}

/// Lays a month out as Sunday-first weeks of exactly 7 slots. Slots outside
/// the month are `None`.
pub fn month_grid(
    year: i32,
    month: Month,
    entries: &HashMap<Date, DayEntry>,
    today: Date,
) -> anyhow::Result<Vec<Vec<Option<DaySlot>>>> {
    let first_day = Date::from_calendar_date(year, month, 1)?;
    let days_in_month = time::util::days_in_year_month(year, month);
    let start_weekday = first_day.weekday().number_days_from_sunday() as usize;

    let mut weeks: Vec<Vec<Option<DaySlot>>> = Vec::new();
    let mut current_week: Vec<Option<DaySlot>> = vec![None; start_weekday];

    for day in 1..=days_in_month {
        let date = Date::from_calendar_date(year, month, day)?;
        let entry = entries.get(&date).cloned();
        current_week.push(Some(day_slot(date, entry, today)));

        if current_week.len() == 7 {
            weeks.push(current_week);
            current_week = Vec::new();
        }
    }

    if !current_week.is_empty() {
        current_week.resize_with(7, || None);
        weeks.push(current_week);
    }

    Ok(weeks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn entry_for(date: Date, score: i32) -> DayEntry {
        let now = OffsetDateTime::now_utc();
        DayEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            date,
            score,
            summary: "test".into(),
            created_at: now,
            updated_at: now,
        }
    }

    // June 2022: 30 days, the 1st falls on a Wednesday.
    const YEAR: i32 = 2022;
    const MONTH: Month = Month::June;

    #[test]
    fn thirty_day_month_starting_wednesday() {
        let today = date!(2022 - 06 - 15);
        let weeks = month_grid(YEAR, MONTH, &HashMap::new(), today).unwrap();

        assert_eq!(weeks.len(), 5);
        for week in &weeks {
            assert_eq!(week.len(), 7);
        }
        // Sunday, Monday, Tuesday lead-in is empty
        assert!(weeks[0][0].is_none());
        assert!(weeks[0][1].is_none());
        assert!(weeks[0][2].is_none());
        let first = weeks[0][3].as_ref().expect("June 1 slot");
        assert_eq!(first.day, 1);
        // Trailing pad in the final week
        assert!(weeks[4][5].is_none());
        assert!(weeks[4][6].is_none());

        let in_month: usize = weeks
            .iter()
            .flatten()
            .filter(|slot| slot.is_some())
            .count();
        assert_eq!(in_month, 30);
    }

    #[test]
    fn slots_carry_entry_and_score_class() {
        let mut entries = HashMap::new();
        entries.insert(date!(2022 - 06 - 03), entry_for(date!(2022 - 06 - 03), 8));
        let today = date!(2022 - 06 - 15);
        let weeks = month_grid(YEAR, MONTH, &entries, today).unwrap();

        for slot in weeks.iter().flatten().flatten() {
            if slot.date == date!(2022 - 06 - 03) {
                assert_eq!(slot.score_class, "score-8");
                assert!(slot.entry.is_some());
            } else {
                assert_eq!(slot.score_class, "score-none");
                assert!(slot.entry.is_none());
            }
        }
    }

    #[test]
    fn today_and_future_flags() {
        let today = date!(2022 - 06 - 15);
        let weeks = month_grid(YEAR, MONTH, &HashMap::new(), today).unwrap();
        for slot in weeks.iter().flatten().flatten() {
            assert_eq!(slot.is_today, slot.date == today);
            assert_eq!(slot.is_future, slot.date > today);
        }
    }

    #[test]
    fn month_starting_sunday_has_no_lead_in() {
        // May 2022 began on a Sunday and has 31 days
        let weeks = month_grid(2022, Month::May, &HashMap::new(), date!(2022 - 05 - 01)).unwrap();
        assert!(weeks[0][0].is_some());
        assert_eq!(weeks.len(), 5);
    }

    #[test]
    fn six_week_month() {
        // October 2022: 31 days, starts Saturday -> 6 rows
        let weeks =
            month_grid(2022, Month::October, &HashMap::new(), date!(2022 - 10 - 01)).unwrap();
        assert_eq!(weeks.len(), 6);
    }

    #[test]
    fn score_class_covers_all_categories() {
        assert_eq!(score_class(None), "score-none");
        for s in 0..=10 {
            assert_eq!(score_class(Some(s)), format!("score-{s}"));
        }
        assert_eq!(score_class(Some(42)), "score-none");
    }
}
