//! Indonesian payroll engine: working calendar, attendance aggregation, gross pay,
//! BPJS and PPh-21 deductions, and per-division payroll roll-ups.
//!
//! The computation modules are pure and synchronous. [`store`] holds the data access
//! seams, [`pages`] the HTTP surface served by the binary.

pub mod config;
pub mod consts;
pub mod error;
pub mod utils;

pub mod attendance;
pub mod calendar;
pub mod compensation;
pub mod deduction;
pub mod employee;
pub mod payroll;
pub mod report;
pub mod run;

pub mod entity;
pub mod pages;
pub mod store;
