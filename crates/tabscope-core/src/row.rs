//! Rows and row identity.
//!
//! Rows are shared between sheets (a frequency table points at its source's
//! rows, a join holds per-source sub-rows), so they live behind `Rc` and
//! carry an id assigned at creation. Selection is keyed by that id.

use indexmap::IndexMap;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tabscope_engine::Value;

pub type RowId = u64;

pub type RowRef = Rc<Row>;

static NEXT_ROW_ID: AtomicU64 = AtomicU64::new(1);

/// The shapes a row can take. Only column accessors look inside.
#[derive(Clone, Debug)]
pub enum RowData {
    /// Positional fields, as read from delimited text.
    List(Vec<Value>),
    /// Named fields, as read from JSON objects.
    Record(IndexMap<String, Value>),
    /// A join result: slot 0 holds the key tuple as a `List` row, slot
    /// `i + 1` holds the row from source sheet `i`, if it had the key.
    Combined(Vec<Option<RowRef>>),
    /// A frequency group: the grouped value and the source rows sharing it.
    Group { key: String, members: Vec<RowRef> },
    /// A single line of text.
    Text(String),
}

#[derive(Debug)]
pub struct Row {
    id: RowId,
    data: RefCell<RowData>,
}

impl Row {
    pub fn new(data: RowData) -> RowRef {
        Rc::new(Row {
            id: NEXT_ROW_ID.fetch_add(1, Ordering::Relaxed),
            data: RefCell::new(data),
        })
    }

    pub fn list(values: Vec<Value>) -> RowRef {
        Self::new(RowData::List(values))
    }

    pub fn text(line: impl Into<String>) -> RowRef {
        Self::new(RowData::Text(line.into()))
    }

    pub fn id(&self) -> RowId {
        self.id
    }

    pub fn data(&self) -> Ref<'_, RowData> {
        self.data.borrow()
    }

    pub fn data_mut(&self) -> RefMut<'_, RowData> {
        self.data.borrow_mut()
    }

    /// Replace the contents in place, keeping the identity.
    pub fn replace(&self, data: RowData) {
        *self.data.borrow_mut() = data;
    }

    /// A new row with its own identity and a copy of this row's data.
    /// Sub-rows of a combined or group row stay shared.
    pub fn duplicate(&self) -> RowRef {
        Self::new(self.data.borrow().clone())
    }

    /// Members of a frequency group row; empty for other shapes.
    pub fn members(&self) -> Vec<RowRef> {
        match &*self.data.borrow() {
            RowData::Group { members, .. } => members.clone(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_gets_new_identity_and_copied_data() {
        let row = Row::list(vec![Value::from("a"), Value::Int(1)]);
        let copy = row.duplicate();
        assert_ne!(row.id(), copy.id());

        if let RowData::List(values) = &mut *copy.data_mut() {
            values[0] = Value::from("b");
        }
        match &*row.data() {
            RowData::List(values) => assert_eq!(values[0], Value::from("a")),
            other => panic!("unexpected row shape {:?}", other),
        }
    }

    #[test]
    fn replace_keeps_identity() {
        let row = Row::text("one");
        let id = row.id();
        row.replace(RowData::Text("two".into()));
        assert_eq!(row.id(), id);
        assert!(matches!(&*row.data(), RowData::Text(s) if s == "two"));
    }
}
