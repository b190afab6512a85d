//! sea-orm models for the payroll schema.

pub mod attendance_record;
pub mod bpjs_rate;
pub mod employee;
pub mod employee_allowance;
pub mod holiday;
pub mod payroll_period;
pub mod payroll_record;
pub mod period_input;
pub mod ptkp_rate;
pub mod sea_orm_active_enums;
pub mod tax_bracket;
