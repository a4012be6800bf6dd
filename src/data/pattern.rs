// src/data/pattern.rs

//! Implements [`LinePattern`], a compiled line template.
//!
//! A line template is literal text with `{}` placeholders, e.g.
//! `"[{} {}] [{}] [{}] {}"`. Each placeholder is paired, in order, with one
//! [`Field`]. The template is compiled into one regular expression: literal
//! text is escaped and each placeholder is replaced by its `Field`'s capture
//! group fragment.
//!
//! A `LinePattern` is immutable after construction and is shared between
//! threads as a [`LinePatternP`].
//!
//! [`Field`]: crate::data::field::Field

use crate::data::field::{Field, Fields};
use crate::debug::printers::de_wrn;

use std::fmt;
use std::io::{Error, ErrorKind, Result};
use std::sync::Arc;

use ::more_asserts::debug_assert_ge;
use ::regex::Regex;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// The placeholder in a line template.
pub const PLACEHOLDER: &str = "{}";

/// Thread-safe [Atomic Reference Counting Pointer] to a [`LinePattern`].
///
/// [Atomic Reference Counting Pointer]: std::sync::Arc
pub type LinePatternP = Arc<LinePattern>;

/// A line template compiled to a [`Regex`] and an ordered schema of
/// value-less [`Field`]s.
///
/// Invariant: `schema.len()` equals the count of placeholders in the
/// template, which equals the count of capture groups in the regex.
pub struct LinePattern {
    /// The user-authored template.
    template: String,
    /// The generated regular expression.
    regex_str: String,
    regex: Regex,
    schema: Fields,
}

impl fmt::Debug for LinePattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LinePattern")
            .field("template", &self.template)
            .field("regex", &self.regex_str)
            .field("schema", &self.schema.iter().map(|f| f.kind()).collect::<Vec<_>>())
            .finish()
    }
}

impl LinePattern {
    /// Compile `template` with `fields` paired positionally to its
    /// placeholders.
    ///
    /// Returns `ErrorKind::InvalidInput` if the count of placeholders is not
    /// `fields.len()`, if a `Field` configuration is invalid, or if the
    /// generated regex fails to compile.
    pub fn new(
        template: &str,
        fields: Fields,
    ) -> Result<LinePattern> {
        defn!("({:?}, {} fields)", template, fields.len());
        let count: usize = Self::count_placeholders(template);
        if count != fields.len() {
            defx!("count {} != fields {}", count, fields.len());
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "template {:?} has {} placeholders but {} fields were given",
                    template,
                    count,
                    fields.len()
                ),
            ));
        }
        for field in fields.iter() {
            field.validate()?;
        }

        let mut regex_str = String::with_capacity(template.len() * 2 + count * 16);
        let mut schema: Fields = Fields::with_capacity(count);
        // literal text between placeholders; one more piece than placeholders
        let mut field_iter = fields.iter();
        let mut pieces = template.split(PLACEHOLDER).peekable();
        while let Some(literal) = pieces.next() {
            regex_str.push_str(&::regex::escape(literal));
            if pieces.peek().is_none() {
                break;
            }
            // `count == fields.len()` so this is always `Some`
            if let Some(field) = field_iter.next() {
                regex_str.push_str(&field.to_regex());
                schema.push(field.clone_schema());
            }
        }
        debug_assert_eq!(schema.len(), count, "schema length != placeholders");
        defo!("regex_str {:?}", regex_str);

        let regex: Regex = match Regex::new(regex_str.as_str()) {
            Ok(val) => val,
            Err(err) => {
                defx!("Regex::new error {}", err);
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("template {:?} compiled to a bad regex: {}", template, err),
                ));
            }
        };
        debug_assert_ge!(regex.captures_len(), 1);
        defx!("captures_len {}", regex.captures_len());

        Ok(LinePattern {
            template: String::from(template),
            regex_str,
            regex,
            schema,
        })
    }

    /// Count the `{}` placeholders in `template`.
    pub fn count_placeholders(template: &str) -> usize {
        template
            .match_indices(PLACEHOLDER)
            .count()
    }

    pub fn template(&self) -> &str {
        self.template.as_str()
    }

    pub fn regex_str(&self) -> &str {
        self.regex_str.as_str()
    }

    /// The value-less `Field`s, in placeholder order.
    pub fn schema(&self) -> &Fields {
        &self.schema
    }

    /// Count of fields in the schema.
    pub fn len(&self) -> usize {
        self.schema.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schema.is_empty()
    }

    /// Search `line` for the pattern.
    ///
    /// On success returns a clone of the schema with each `Field`'s value set
    /// from the corresponding capture group, in order.
    /// Returns `None` if the line does not match, or if a capture group did
    /// not participate in the match. A non-match is not an error.
    ///
    /// Only per-call storage is used so one `LinePattern` may be used from
    /// many threads at once.
    pub fn match_line(
        &self,
        line: &str,
    ) -> Option<Fields> {
        let captures = self.regex.captures(line)?;
        // group 0 is the whole match
        if captures.len() - 1 != self.schema.len() {
            de_wrn!(
                "LinePattern {:?} captured {} groups, expected {}",
                self.template,
                captures.len() - 1,
                self.schema.len()
            );
            return None;
        }
        let mut fields: Fields = Fields::with_capacity(self.schema.len());
        for (index, schema_field) in self.schema.iter().enumerate() {
            let capture = captures.get(index + 1)?;
            let mut field: Field = schema_field.clone();
            field.set_value(capture.as_str());
            fields.push(field);
        }

        Some(fields)
    }

    /// Does `line` match the pattern? Cheaper than [`match_line`].
    ///
    /// [`match_line`]: LinePattern::match_line
    pub fn is_match(
        &self,
        line: &str,
    ) -> bool {
        self.regex.is_match(line)
    }
}
