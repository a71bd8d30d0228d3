use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Field names for one reply shape, built once and shared by every row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    names: Vec<Option<String>>,
    lookup: HashMap<String, usize>,
}

impl Schema {
    pub fn new<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = Option<N>>,
        N: Into<String>,
    {
        let names: Vec<Option<String>> = names.into_iter().map(|name| name.map(Into::into)).collect();
        let mut lookup = HashMap::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            if let Some(name) = name {
                // later duplicates win
                lookup.insert(name.clone(), position);
            }
        }
        Self { names, lookup }
    }

    pub fn named<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self::new(names.into_iter().map(Some))
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    pub fn name(&self, position: usize) -> Option<&str> {
        self.names.get(position).and_then(|name| name.as_deref())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A decoded reply row, addressable by position and by field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    schema: Arc<Schema>,
    values: Vec<String>,
}

impl Record {
    pub fn new(schema: Arc<Schema>, values: Vec<String>) -> Self {
        Self { schema, values }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.values.get(position).map(String::as_str)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.schema.position(name).and_then(|position| self.get(position))
    }

    pub fn parse<T: FromStr>(&self, name: &str) -> Option<T> {
        self.field(name).and_then(|value| value.trim().parse().ok())
    }

    pub fn parse_at<T: FromStr>(&self, position: usize) -> Option<T> {
        self.get(position).and_then(|value| value.trim().parse().ok())
    }

    /// Numeric field with the protocol's lenient "missing means zero" reading.
    pub fn int(&self, name: &str) -> i64 {
        self.parse(name).unwrap_or(0)
    }

    /// Raw row text for tabular records.
    pub fn unparsed(&self) -> &str {
        self.get(0).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &str)> {
        self.values
            .iter()
            .enumerate()
            .map(|(position, value)| (self.schema.name(position), value.as_str()))
    }

    /// Appends `other`'s fields after this record's; on name clashes the
    /// appended field wins.
    pub fn merge(self, other: Record) -> Record {
        let names = (0..self.values.len())
            .map(|position| self.schema.name(position).map(str::to_string))
            .chain((0..other.values.len()).map(|position| other.schema.name(position).map(str::to_string)))
            .collect::<Vec<_>>();
        let mut values = self.values;
        values.extend(other.values);
        Record::new(Arc::new(Schema::new(names)), values)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (position, value) in self.values.iter().enumerate() {
            match self.schema.name(position) {
                Some(name) if self.schema.position(name) == Some(position) => {
                    map.serialize_entry(name, value)?;
                }
                Some(_) => {}
                None => map.serialize_entry(&position.to_string(), value)?,
            }
        }
        map.end()
    }
}

pub(crate) fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
