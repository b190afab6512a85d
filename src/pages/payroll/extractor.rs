use super::*;

impl FromRequest for PayrollPeriod {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let period_id = req.match_info().get("period_id").expect("This extractor must be used under `period_id` path");
            let Ok(period_id) = Uuid::from_str(period_id) else {
                return Err(actix_web::error::ErrorBadRequest("invalid `period_id`"))
            };

            let store = req.app_data::<web::Data<DbStore>>().expect("DbStore must be attached");

            Ok(store.find_period(period_id).await?)
        })
    }
}

/// A period that still accepts runs, draft or processing.
pub(super) struct OpenPeriod(pub(super) PayrollPeriod);

impl Deref for OpenPeriod {
    type Target = PayrollPeriod;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for OpenPeriod {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let payroll_period = PayrollPeriod::from_request(&req, &mut dev::Payload::None).await?;

            if !payroll_period.status.allows_mutation() {
                return Err(EngineError::PeriodLocked(payroll_period.status).into());
            }

            Ok(Self(payroll_period))
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::entity::sea_orm_active_enums::PeriodStatus as DbPeriodStatus;

    use super::{super::tests::period_model, *};

    #[actix_web::test]
    async fn test_period_extractor() {
        #[get("/{period_id}")]
        async fn test_handler(payroll_period: PayrollPeriod) -> impl Responder {
            web::Json(payroll_period)
        }

        let model = period_model(DbPeriodStatus::Processing);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ model.clone() ],
                vec![],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(DbStore::new(db.into_connection())))
                .service(test_handler)
        ).await;

        let req = test::TestRequest::default()
            .uri(&format!("/{}", model.id))
            .to_request();

        let returned: PayrollPeriod = test::call_and_read_body_json(&app, req).await;
        assert_eq!(returned.id, model.id);
        assert_eq!(returned.status, PeriodStatus::Processing);

        let req = test::TestRequest::default()
            .uri(&format!("/{}", Uuid::new_v4()))
            .to_request();
        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::default()
            .uri("/not-a-uuid")
            .to_request();
        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_open_period_extractor() {
        #[get("/{period_id}")]
        async fn test_handler(payroll_period: OpenPeriod) -> impl Responder {
            web::Json(payroll_period.0)
        }

        let draft = period_model(DbPeriodStatus::Draft);
        let paid = period_model(DbPeriodStatus::Paid);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ draft.clone() ],
                vec![ paid.clone() ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(DbStore::new(db.into_connection())))
                .service(test_handler)
        ).await;

        let req = test::TestRequest::default()
            .uri(&format!("/{}", draft.id))
            .to_request();

        let returned: PayrollPeriod = test::call_and_read_body_json(&app, req).await;
        assert_eq!(returned.id, draft.id);

        let req = test::TestRequest::default()
            .uri(&format!("/{}", paid.id))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
