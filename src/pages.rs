use actix_web::web;

mod calendar;
mod payroll;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(web::scope("/calendar")
            .configure(calendar::config))
        .service(web::scope("/payroll")
            .configure(payroll::config));
}
