use actix_web::{get, web, Responder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    calendar::{CalendarDay, Holiday, Period, WorkingCalendar},
    error::EngineError,
    store::{DbStore, PayrollSource as _},
};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(get_month);
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct MonthCalendar {
    pub(super) period: Period,
    pub(super) working_days: u32,
    pub(super) working_dates: Vec<NaiveDate>,
    pub(super) holidays: Vec<Holiday>,
    pub(super) days: Vec<CalendarDay>,
}

#[get("/{year}/{month}")]
async fn get_month(store: web::Data<DbStore>, path: web::Path<(i32, u32)>) -> Result<impl Responder, EngineError> {
    let (year, month) = path.into_inner();
    let period = Period::new(year, month)?;

    let calendar = WorkingCalendar::new(store.holidays(year).await?);

    Ok(web::Json(MonthCalendar {
        period,
        working_days: calendar.working_days(period),
        working_dates: calendar.working_dates(period).collect(),
        holidays: calendar.holidays_in(period).cloned().collect(),
        days: calendar.month(period),
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use crate::entity::{holiday, sea_orm_active_enums::HolidayType};

    use super::*;

    fn holiday(date: NaiveDate, name: &str) -> holiday::Model {
        holiday::Model {
            id: Uuid::new_v4(),
            date,
            name: name.to_string(),
            holiday_type: HolidayType::National,
            is_paid: true,
        }
    }

    #[actix_web::test]
    async fn test_get_month() {
        let date = |d| NaiveDate::from_ymd_opt(2025, 4, d).unwrap();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![
                    holiday(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(), "Idul Fitri"),
                    holiday(date(1), "Idul Fitri"),
                    holiday(date(2), "Cuti Bersama Idul Fitri"),
                    holiday(date(3), "Cuti Bersama Idul Fitri"),
                    holiday(date(4), "Cuti Bersama Idul Fitri"),
                    holiday(date(18), "Wafat Isa Almasih"),
                ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(DbStore::new(db.into_connection())))
                .service(web::scope("/calendar").configure(config))
        ).await;

        let req = test::TestRequest::default()
            .uri("/calendar/2025/4")
            .to_request();

        let month: MonthCalendar = test::call_and_read_body_json(&app, req).await;

        assert_eq!(month.working_days, 17);
        assert_eq!(month.working_dates.len(), 17);
        assert_eq!(month.holidays.len(), 5);
        assert_eq!(month.days.len(), 30);
    }

    #[actix_web::test]
    async fn test_invalid_month() {
        let db = MockDatabase::new(DatabaseBackend::Postgres);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(DbStore::new(db.into_connection())))
                .service(web::scope("/calendar").configure(config))
        ).await;

        let req = test::TestRequest::default()
            .uri("/calendar/2025/13")
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
