use askama::Template;
use axum::response::Html;
use time::Date;

use crate::{
    calendar::DaySlot,
    entries::repo::DayEntry,
    error::AppError,
};

pub fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterPage {
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "calendar.html")]
pub struct CalendarPage {
    pub email: String,
    pub weeks: Vec<Vec<Option<DaySlot>>>,
    pub year: i32,
    pub month_name: &'static str,
    pub prev_year: i32,
    pub prev_month: u8,
    pub next_year: i32,
    pub next_month: u8,
}

#[derive(Template)]
#[template(path = "settings.html")]
pub struct SettingsPage {
    pub email: String,
}

#[derive(Template)]
#[template(path = "components/entry_form.html")]
pub struct EntryFormPartial {
    pub date: Date,
    pub entry: Option<DayEntry>,
    pub error: Option<String>,
    pub is_future: bool,
}

#[derive(Template)]
#[template(path = "components/day_cell.html")]
pub struct DayCellPartial {
    pub slot: DaySlot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::day_slot;
    use time::macros::date;

    #[test]
    fn login_page_renders_error_banner() {
        let without = LoginPage { error: None }.render().unwrap();
        assert!(!without.contains("class=\"error\""));
        let with = LoginPage {
            error: Some("Invalid email or password".into()),
        }
        .render()
        .unwrap();
        assert!(with.contains("Invalid email or password"));
    }

    #[test]
    fn day_cell_carries_score_class_and_anchor_id() {
        let slot = day_slot(date!(2022 - 06 - 03), None, date!(2022 - 06 - 15));
        let html = DayCellPartial { slot }.render().unwrap();
        assert!(html.contains("score-none"));
        assert!(html.contains("id=\"day-2022-06-03\""));
    }

    #[test]
    fn entry_form_blocks_future_dates() {
        let html = EntryFormPartial {
            date: date!(2099 - 01 - 01),
            entry: None,
            error: None,
            is_future: true,
        }
        .render()
        .unwrap();
        assert!(!html.contains("<form"));
    }
}
