//! Entities: one row's typed values
//!
//! An entity is either unbound (built by the caller, typically for
//! `Table::insert`) or bound to `(table, row)` when it came from
//! `Table::get`/`Table::select`. Setting a field on a bound entity queues an
//! update on its table; nothing is written until that table commits.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::codec::FieldValue;
use crate::schema::RecordSchema;
use crate::storage::{StoreError, StoreResult, Table, TableState};

/// Back-reference from a bound entity to its row
#[derive(Debug, Clone)]
struct Binding {
    table: Weak<RefCell<TableState>>,
    index: usize,
}

/// One record's values in declaration order
#[derive(Debug, Clone)]
pub struct Entity {
    schema: Rc<RecordSchema>,
    values: Vec<FieldValue>,
    binding: Option<Binding>,
}

impl Entity {
    /// Builds an unbound entity.
    ///
    /// Fields not named in `values` take their codec's blank value (`""` or
    /// `0`). Fails on unknown field names and on values outside a codec's
    /// domain.
    pub fn new<I, K, V>(schema: Rc<RecordSchema>, values: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        let mut slots: Vec<FieldValue> = schema
            .fields()
            .iter()
            .map(|f| f.codec.empty_value())
            .collect();

        for (name, value) in values {
            let name = name.as_ref();
            let position = schema.index_of(name).ok_or_else(|| schema.unknown_field(name))?;
            let value = value.into();
            schema.fields()[position].codec.check(&value)?;
            slots[position] = value;
        }

        Ok(Self {
            schema,
            values: slots,
            binding: None,
        })
    }

    pub(crate) fn bound(
        schema: Rc<RecordSchema>,
        values: Vec<FieldValue>,
        table: Weak<RefCell<TableState>>,
        index: usize,
    ) -> Self {
        Self {
            schema,
            values,
            binding: Some(Binding { table, index }),
        }
    }

    pub fn schema(&self) -> &Rc<RecordSchema> {
        &self.schema
    }

    /// Model name
    pub fn type_name(&self) -> &str {
        self.schema.name()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.schema.index_of(name).map(|i| &self.values[i])
    }

    /// Values in declaration order
    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    /// `(name, value)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .zip(self.values.iter())
    }

    /// Row this entity was read from, if bound
    pub fn row_index(&self) -> Option<usize> {
        self.binding.as_ref().map(|b| b.index)
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Returns the table this entity is bound to, if it still exists
    pub fn table(&self) -> Option<Table> {
        self.binding
            .as_ref()
            .and_then(|b| b.table.upgrade())
            .map(Table::from_state)
    }

    /// Sets one field.
    ///
    /// On a bound entity this also queues an update of that single field on
    /// the owning table; the in-memory value changes only if queuing
    /// succeeded. Fails with `Detached` if the table has been dropped.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> StoreResult<()> {
        let position = self
            .schema
            .index_of(name)
            .ok_or_else(|| self.schema.unknown_field(name))?;
        let value = value.into();
        self.schema.fields()[position].codec.check(&value)?;

        if let Some(binding) = &self.binding {
            let state = binding
                .table
                .upgrade()
                .ok_or(StoreError::Detached {
                    index: binding.index,
                })?;
            Table::from_state(state).update(binding.index, [(name, value.clone())])?;
        }

        self.values[position] = value;
        Ok(())
    }

    /// Drops the table binding, keeping the values
    pub fn unbind(&mut self) {
        self.binding = None;
    }
}

impl PartialEq for Entity {
    /// Equal when schemas and values match; bindings are ignored
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.values == other.values
    }
}

/// `TypeName(field1=repr1,field2=repr2)` in declaration order
impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.type_name())?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", name, value.repr())?;
        }
        f.write_str(")")
    }
}
