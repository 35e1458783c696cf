//! Typed access to the fields of one raw record row.

use crate::error::{GridError, GridResult};
use crate::units::Megawatts;

pub(crate) struct Fields<'a, S> {
    record: &'static str,
    fields: &'a [S],
}

impl<'a, S: AsRef<str>> Fields<'a, S> {
    /// Wraps a row, failing on the first missing field if it has fewer than `arity` fields.
    pub(crate) fn new(record: &'static str, fields: &'a [S], arity: usize) -> GridResult<Self> {
        if fields.len() < arity {
            return Err(GridError::malformed(
                record,
                fields.len(),
                "",
                format!("expected {arity} fields, found {}", fields.len()),
            ));
        }
        Ok(Self { record, fields })
    }

    pub(crate) fn record(&self) -> &'static str {
        self.record
    }

    pub(crate) fn text(&self, index: usize) -> GridResult<&'a str> {
        self.fields
            .get(index)
            .map(|field| field.as_ref())
            .ok_or_else(|| GridError::malformed(self.record, index, "", "missing field"))
    }

    pub(crate) fn number(&self, index: usize) -> GridResult<f64> {
        let raw = self.text(index)?;
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|err| GridError::malformed(self.record, index, raw, format!("{err}")))?;
        if !value.is_finite() {
            return Err(GridError::malformed(
                self.record,
                index,
                raw,
                "value is not finite",
            ));
        }
        Ok(value)
    }

    pub(crate) fn megawatts(&self, index: usize) -> GridResult<Megawatts> {
        let value = self.number(index)?;
        if value < 0.0 {
            let raw = self.text(index)?;
            return Err(GridError::malformed(
                self.record,
                index,
                raw,
                "value must be non-negative",
            ));
        }
        Ok(Megawatts(value))
    }
}
