//! File parameter extraction
//!
//! Finds the parameter values that name local files which must be uploaded
//! into the job's file namespace before it runs.

use crate::domain::recipe::ParameterSchema;
use crate::dto::job::Parameters;

/// Values of every `format: "file"` parameter, in schema declaration order
///
/// Parameters that are absent or not strings are skipped; the rest of the
/// parameters travel with the job order itself.
pub fn file_parameters(schema: &ParameterSchema, parameters: &Parameters) -> Vec<String> {
    schema
        .file_properties()
        .filter_map(|name| parameters.get(name))
        .filter_map(|value| value.as_str())
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect()
}
