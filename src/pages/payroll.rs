use std::{ops::Deref, str::FromStr};

use actix_web::{dev, get, post, web, FromRequest, HttpRequest, HttpResponse, Responder};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    calendar::Period,
    error::EngineError,
    payroll::{summarize, PayrollPeriod, PeriodStatus},
    run::{run_period, CancelFlag, PayrollPolicy},
    store::{DbStore, PayrollSink as _, PeriodRepository as _},
};

use extractor::OpenPeriod;
use model::*;

mod extractor;
mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(create_period)
        .service(get_period)
        .service(run)
        .service(change_status);
}

#[post("")]
async fn create_period(store: web::Data<DbStore>, payload: web::Json<CreatePeriod>) -> Result<impl Responder, EngineError> {
    let period = Period::new(payload.year, payload.month)?;

    let payroll_period = store.create_period(period).await?;

    info!(period_id = %payroll_period.id, %period, "payroll period created");

    Ok(HttpResponse::Created().json(web::Json(payroll_period)))
}

#[get("/{period_id}")]
async fn get_period(store: web::Data<DbStore>, payroll_period: PayrollPeriod) -> Result<impl Responder, EngineError> {
    let records = store.payroll_records(payroll_period.id).await?;

    Ok(web::Json(PeriodDetail {
        summary: summarize(&records),
        period: payroll_period,
        records,
    }))
}

#[post("/{period_id}/run")]
async fn run(store: web::Data<DbStore>, policy: web::Data<PayrollPolicy>, payroll_period: OpenPeriod) -> Result<impl Responder, EngineError> {
    let report = run_period(store.as_ref(), payroll_period.0, &policy, &CancelFlag::default()).await?;

    Ok(web::Json(report))
}

#[post("/{period_id}/{action}")]
async fn change_status(store: web::Data<DbStore>, mut payroll_period: PayrollPeriod, path: web::Path<(Uuid, String)>) -> Result<impl Responder, actix_web::Error> {
    let (_, action) = path.into_inner();

    let Ok(action) = PeriodAction::from_str(&action) else {
        return Err(actix_web::error::ErrorNotFound("unknown payroll period action"))
    };

    let from = payroll_period.status;
    payroll_period.transition(action.target())?;
    store.save_period(&payroll_period).await?;

    info!(period_id = %payroll_period.id, %from, to = %payroll_period.status, "payroll period status changed");

    Ok(web::Json(payroll_period))
}
