//! Kiln Core
//!
//! Core types and pure logic for talking to a recipe machine.
//!
//! This crate contains:
//! - Domain types: recipes, parameter schemas, job state and reports
//! - DTOs: the job order sent to the machine
//! - Validation: checking parameters against a recipe schema
//! - Extraction: finding the parameters that name local files

pub mod domain;
pub mod dto;
pub mod extract;
pub mod validation;

pub use domain::job::{JobInfo, Priority, TaskState};
pub use domain::machine::MachineInfo;
pub use domain::recipe::{
    ParameterSchema, PropertySchema, PropertyType, Recipe, RecipeSummary, SchemaError,
};
pub use domain::report::{DELIVERY_STEP, DeliveryError, JobReport, TaskReport};
pub use dto::job::{JobOrder, Parameters};
pub use extract::file_parameters;
pub use validation::{ValidationError, Violation};
