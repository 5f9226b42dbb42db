//! Record filtering and ordering.
//!
//! External callers name fields the way the HTTP API exposes them; a
//! [`FieldMap`] translates those names to the internal attribute names each
//! [`Record`] understands. The maps are plain constants handed to whoever
//! needs them.
//!
//! The filter syntax is a small subset of `OData` `$filter`:
//! `display_name eq 'John' and email eq 'john@example.com'`. Ordering follows
//! `$orderby`: `display_name desc, id`.

use std::cmp::Ordering;

use crate::error::{DbError, DbResult};
use crate::model::Record;

/// Translation table from external field names to internal attribute names.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    fields: &'static [(&'static str, &'static str)],
}

pub const USER_FIELDS: FieldMap = FieldMap::new(&[
    ("id", "id"),
    ("display_name", "displayName"),
    ("email", "email"),
]);

pub const ROLE_FIELDS: FieldMap = FieldMap::new(&[("id", "id"), ("description", "description")]);

/// An equality test on one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub attribute: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub attribute: &'static str,
    pub descending: bool,
}

/// A conjunction of conditions plus an ordering. The empty query selects
/// every record ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filter: Vec<Condition>,
    pub order_by: Vec<OrderBy>,
}

impl FieldMap {
    #[must_use]
    pub const fn new(fields: &'static [(&'static str, &'static str)]) -> Self {
        Self { fields }
    }

    #[must_use]
    pub fn internal(&self, external: &str) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|(name, _)| *name == external)
            .map(|(_, internal)| *internal)
    }

    fn require(&self, external: &str) -> DbResult<&'static str> {
        self.internal(external)
            .ok_or_else(|| DbError::InvalidFilter(format!("unknown field '{external}'")))
    }

    /// ## Summary
    /// Builds a [`Query`] from optional filter and order-by expressions.
    ///
    /// ## Errors
    /// Returns `InvalidFilter` if either expression is malformed or names an
    /// unknown field.
    pub fn query(&self, filter: Option<&str>, order_by: Option<&str>) -> DbResult<Query> {
        Ok(Query {
            filter: filter.map_or(Ok(Vec::new()), |text| self.parse_filter(text))?,
            order_by: order_by.map_or(Ok(Vec::new()), |text| self.parse_order_by(text))?,
        })
    }

    /// ## Summary
    /// Parses `field eq 'value' [and field eq 'value' ...]`. Quotes inside a
    /// value are doubled (`'O''Brien'`).
    ///
    /// ## Errors
    /// Returns `InvalidFilter` on unknown fields, unsupported operators or
    /// unterminated literals.
    pub fn parse_filter(&self, text: &str) -> DbResult<Vec<Condition>> {
        let mut conditions = Vec::new();
        let mut rest = text.trim();
        if rest.is_empty() {
            return Ok(conditions);
        }

        loop {
            let (field, after_field) = next_token(rest);
            let attribute = self.require(field)?;

            let (operator, after_operator) = next_token(after_field);
            if !operator.eq_ignore_ascii_case("eq") {
                return Err(DbError::InvalidFilter(format!(
                    "unsupported operator '{operator}'"
                )));
            }

            let (value, after_value) = parse_literal(after_operator)?;
            conditions.push(Condition { attribute, value });

            rest = after_value.trim_start();
            if rest.is_empty() {
                break;
            }

            let (conjunction, after_conjunction) = next_token(rest);
            if !conjunction.eq_ignore_ascii_case("and") {
                return Err(DbError::InvalidFilter(format!(
                    "expected 'and', found '{conjunction}'"
                )));
            }
            rest = after_conjunction;
        }

        Ok(conditions)
    }

    /// ## Summary
    /// Parses a comma separated list of `field [asc|desc]`.
    ///
    /// ## Errors
    /// Returns `InvalidFilter` on unknown fields or directions.
    pub fn parse_order_by(&self, text: &str) -> DbResult<Vec<OrderBy>> {
        text.split(',')
            .map(str::trim)
            .filter(|clause| !clause.is_empty())
            .map(|clause| {
                let mut parts = clause.split_whitespace();
                let attribute = self.require(parts.next().unwrap_or_default())?;
                let descending = match parts.next() {
                    None => false,
                    Some(direction) if direction.eq_ignore_ascii_case("asc") => false,
                    Some(direction) if direction.eq_ignore_ascii_case("desc") => true,
                    Some(direction) => {
                        return Err(DbError::InvalidFilter(format!(
                            "invalid direction '{direction}'"
                        )));
                    }
                };
                if let Some(extra) = parts.next() {
                    return Err(DbError::InvalidFilter(format!(
                        "unexpected '{extra}' in order by"
                    )));
                }
                Ok(OrderBy {
                    attribute,
                    descending,
                })
            })
            .collect()
    }
}

impl Query {
    #[must_use]
    pub fn matches<T: Record>(&self, record: &T) -> bool {
        self.filter
            .iter()
            .all(|condition| record.attribute(condition.attribute) == Some(condition.value.as_str()))
    }

    /// Orders two records by the query's keys, falling back to their ids.
    #[must_use]
    pub fn compare<T: Record>(&self, a: &T, b: &T) -> Ordering {
        self.order_by
            .iter()
            .map(|key| {
                let ordering = a.attribute(key.attribute).cmp(&b.attribute(key.attribute));
                if key.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.id().cmp(b.id()))
    }
}

fn next_token(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    text.split_at(end)
}

fn parse_literal(text: &str) -> DbResult<(String, &str)> {
    let text = text.trim_start();
    let Some(body) = text.strip_prefix('\'') else {
        return Err(DbError::InvalidFilter(format!(
            "expected quoted value, found '{text}'"
        )));
    };

    let mut value = String::new();
    let mut chars = body.char_indices().peekable();
    while let Some((index, ch)) = chars.next() {
        if ch != '\'' {
            value.push(ch);
            continue;
        }
        if chars.next_if(|&(_, next)| next == '\'').is_some() {
            value.push('\'');
            continue;
        }
        return Ok((value, &body[index + 1..]));
    }

    Err(DbError::InvalidFilter("unterminated string literal".to_string()))
}
