//! Field mapping analysis between a template and an uploaded contact file.
//!
//! A template references personalization data through `{VARIABLE}`
//! placeholders in its subject and body. Before a campaign is sent, every
//! placeholder must resolve to a column of the contact file. Variables and
//! columns are compared after [`normalize_field`], so `{CONTACT-NAME}` matches
//! a `contact_name` or `Contact Name` column.
//!
//! [`field_matches`] is the only matching rule in the workspace. The analyzer,
//! the variable -> column display rows and the send-time renderer all go
//! through it (via [`matching_column`]).

use crate::model::contact::{ContactRecord, FilePreview};
use crate::model::template::Template;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `.` does not cross newlines and `*?` stops at the first `}`.
    RE.get_or_init(|| Regex::new(r"\{(.*?)\}").expect("placeholder regex is valid"))
}

/// Extracts the distinct placeholder names of `text`, in order of first
/// appearance.
///
/// The inner text is captured verbatim. An opening brace without a closing
/// one on the same line produces nothing.
pub fn extract_variables(text: &str) -> Vec<String> {
    let mut variables: Vec<String> = Vec::new();
    for caps in placeholder_regex().captures_iter(text) {
        let name = caps.get(1).map_or("", |m| m.as_str());
        if !variables.iter().any(|v| v == name) {
            variables.push(name.to_string());
        }
    }
    variables
}

/// Lowercases `s` and drops every character that is not alphanumeric.
pub fn normalize_field(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Whether a template variable is satisfied by a file column.
///
/// A plain case-insensitive comparison is subsumed by the normalized one, so
/// only the normalized forms are compared.
pub fn field_matches(variable: &str, column: &str) -> bool {
    normalize_field(variable) == normalize_field(column)
}

/// The first column that satisfies `variable`, if any.
pub fn matching_column<'a, I>(variable: &str, columns: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let wanted = normalize_field(variable);
    columns
        .into_iter()
        .find(|column| normalize_field(column) == wanted)
}

/// Outcome of [`analyze_field_mapping`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMappingResult {
    pub template_variables: Vec<String>,
    pub file_columns: Vec<String>,
    pub matched_fields: Vec<String>,
    pub missing_fields: Vec<String>,
    pub is_valid: bool,
}

/// A summary of a [`FieldMappingResult`] for choosing what to show the user.
///
/// `NoVariables` is kept apart from `AllMatched`: a template without any
/// placeholder is not valid for submission, but it is not a "missing field"
/// error either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingStatus {
    NoData,
    NoVariables,
    AllMatched,
    Missing(usize),
}

/// One row of the variable -> column display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub variable: String,
    pub column: Option<String>,
}

impl FieldMappingResult {
    pub fn status(&self) -> MappingStatus {
        if self.file_columns.is_empty() && self.template_variables.is_empty() {
            MappingStatus::NoData
        } else if self.template_variables.is_empty() {
            MappingStatus::NoVariables
        } else if self.missing_fields.is_empty() {
            MappingStatus::AllMatched
        } else {
            MappingStatus::Missing(self.missing_fields.len())
        }
    }

    /// Pairs each template variable with the column it resolves to.
    pub fn column_mappings(&self) -> Vec<ColumnMapping> {
        self.template_variables
            .iter()
            .map(|variable| ColumnMapping {
                variable: variable.clone(),
                column: matching_column(variable, self.file_columns.iter().map(String::as_str))
                    .map(str::to_string),
            })
            .collect()
    }
}

/// Checks that every placeholder of `template` can be filled from `file`.
///
/// A missing template, or a file without contacts, yields the all-empty result
/// with `is_valid == false`. Only the first contact's columns are considered.
pub fn analyze_field_mapping(
    template: Option<&Template>,
    file: Option<&FilePreview>,
) -> FieldMappingResult {
    let (Some(template), Some(first)) = (template, file.and_then(FilePreview::first_record)) else {
        return FieldMappingResult::default();
    };

    let mut template_variables = extract_variables(template.subject_text());
    for variable in extract_variables(template.body_text()) {
        if !template_variables.contains(&variable) {
            template_variables.push(variable);
        }
    }

    let file_columns: Vec<String> = first.columns().map(str::to_string).collect();

    let (matched_fields, missing_fields): (Vec<String>, Vec<String>) = template_variables
        .iter()
        .cloned()
        .partition(|variable| {
            matching_column(variable, file_columns.iter().map(String::as_str)).is_some()
        });

    let is_valid = missing_fields.is_empty() && !template_variables.is_empty();

    FieldMappingResult {
        template_variables,
        file_columns,
        matched_fields,
        missing_fields,
        is_valid,
    }
}

/// Replaces every `{VARIABLE}` in `text` with the matching value of `record`.
///
/// Null values render as empty text; variables without a matching column are
/// left untouched.
pub fn render_personalized(text: &str, record: &ContactRecord) -> String {
    placeholder_regex()
        .replace_all(text, |caps: &regex::Captures| {
            let variable = caps.get(1).map_or("", |m| m.as_str());
            match matching_column(variable, record.columns()).and_then(|c| record.get(c)) {
                Some(value) => value.as_display_text(),
                None => caps
                    .get(0)
                    .map_or(String::new(), |m| m.as_str().to_string()),
            }
        })
        .into_owned()
}
