use std::collections::HashMap;

use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Value};

/// Zero-argument accessor resolving one attribute of a record.
pub type Accessor<T> = fn(&T) -> Value;

/// An object exposing a fixed, ordered list of named attributes.
///
/// Attributes are resolved lazily on every read and resolution never mutates
/// the record. An attribute that the record cannot resolve reads as
/// [`Value::Null`], it is not an error.
///
/// Any `dyn Record` serializes as its [`Record::to_dict`] mapping, so records
/// nested in vectors, maps or plain structs are expanded recursively by the
/// JSON encoder.
///
/// # Examples
///
/// ```
/// use jobstats::core::record::Record;
/// use serde_json::{json, Value};
///
/// struct Day {
///     day: String,
///     jobs: usize,
/// }
///
/// impl Record for Day {
///     fn attribute_names(&self) -> &[&'static str] {
///         &["day", "jobs"]
///     }
///
///     fn get_attr(&self, name: &str) -> Value {
///         match name {
///             "day" => json!(self.day),
///             "jobs" => json!(self.jobs),
///             _ => Value::Null,
///         }
///     }
/// }
///
/// let day = Day { day: "2024-01-01".to_string(), jobs: 3 };
/// assert_eq!(Value::Object(day.to_dict()), json!({"day": "2024-01-01", "jobs": 3}));
/// assert_eq!(day.get_attr("missing"), Value::Null);
/// ```
pub trait Record {
    /// Declared attribute names, in declaration order.
    fn attribute_names(&self) -> &[&'static str];

    /// Resolves one attribute by name.
    fn get_attr(&self, name: &str) -> Value;

    /// Ordered mapping from each declared attribute name to its resolved value.
    fn to_dict(&self) -> Map<String, Value> {
        self.attribute_names()
            .iter()
            .map(|name| (name.to_string(), self.get_attr(name)))
            .collect()
    }

    /// The [`to_dict`](Record::to_dict) mapping as a JSON object.
    fn to_value(&self) -> Value {
        Value::Object(self.to_dict())
    }
}

impl Serialize for dyn Record + '_ {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let names = self.attribute_names();
        let mut map = serializer.serialize_map(Some(names.len()))?;
        for name in names {
            map.serialize_entry(name, &self.get_attr(name))?;
        }
        map.end()
    }
}

impl Serialize for dyn Record + Send + Sync + '_ {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (self as &dyn Record).serialize(serializer)
    }
}

/// Table of attribute accessors for one record type.
///
/// A schema declares the ordered attribute names and registers, for each name,
/// either a stored field accessor or a derivation. Fields take precedence over
/// derivations of the same name.
///
/// ```
/// use jobstats::core::record::{RecordSchema, SchemaRecord, Record};
/// use serde_json::{json, Value};
/// use std::sync::LazyLock;
///
/// struct Job {
///     id: String,
///     maps: u32,
///     reduces: u32,
/// }
///
/// static JOB_SCHEMA: LazyLock<RecordSchema<Job>> = LazyLock::new(|| {
///     RecordSchema::<Job>::new(&["id", "tasks"])
///         .field("id", |job| json!(job.id))
///         .derived("tasks", |job| json!(job.maps + job.reduces))
/// });
///
/// impl SchemaRecord for Job {
///     fn schema(&self) -> &RecordSchema<Self> {
///         &JOB_SCHEMA
///     }
/// }
///
/// let job = Job { id: "job_1".to_string(), maps: 4, reduces: 1 };
/// assert_eq!(job.get_attr("tasks"), json!(5));
/// ```
pub struct RecordSchema<T> {
    attributes: Vec<&'static str>,
    fields: HashMap<&'static str, Accessor<T>>,
    derivations: HashMap<&'static str, Accessor<T>>,
}

impl<T> RecordSchema<T> {
    pub fn new(attributes: &[&'static str]) -> Self {
        RecordSchema {
            attributes: attributes.to_vec(),
            fields: HashMap::new(),
            derivations: HashMap::new(),
        }
    }

    /// Registers a stored field.
    pub fn field(mut self, name: &'static str, accessor: Accessor<T>) -> Self {
        self.fields.insert(name, accessor);
        self
    }

    /// Registers a derivation, consulted when no field of that name exists.
    pub fn derived(mut self, name: &'static str, accessor: Accessor<T>) -> Self {
        self.derivations.insert(name, accessor);
        self
    }

    pub fn attributes(&self) -> &[&'static str] {
        &self.attributes
    }

    pub fn resolve(&self, record: &T, name: &str) -> Value {
        match self
            .fields
            .get(name)
            .or_else(|| self.derivations.get(name))
        {
            Some(accessor) => accessor(record),
            None => Value::Null,
        }
    }
}

/// Records whose attributes are described by a [`RecordSchema`].
pub trait SchemaRecord: Sized {
    fn schema(&self) -> &RecordSchema<Self>;
}

impl<T: SchemaRecord> Record for T {
    fn attribute_names(&self) -> &[&'static str] {
        self.schema().attributes()
    }

    fn get_attr(&self, name: &str) -> Value {
        self.schema().resolve(self, name)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use serde_json::{Value, json};

    use super::{Record, RecordSchema, SchemaRecord};

    struct JobHistory {
        jobid: String,
        path: String,
        name: Option<String>,
    }

    static JOB_HISTORY_SCHEMA: LazyLock<RecordSchema<JobHistory>> = LazyLock::new(|| {
        RecordSchema::<JobHistory>::new(&["jobid", "path", "name", "history"])
            .field("jobid", |job| json!(job.jobid))
            .field("path", |job| json!(job.path))
            .derived("name", |job| match &job.name {
                Some(name) => json!(name),
                None => json!("unnamed"),
            })
            .derived("path", |_| json!("shadowed"))
    });

    impl SchemaRecord for JobHistory {
        fn schema(&self) -> &RecordSchema<Self> {
            &JOB_HISTORY_SCHEMA
        }
    }

    fn job() -> JobHistory {
        JobHistory {
            jobid: "job_201209091200_0001".to_string(),
            path: "/history/2012/09/09/job_201209091200_0001_user".to_string(),
            name: None,
        }
    }

    #[test]
    fn to_dict_should_follow_declaration_order() {
        let job = job();
        let dict = job.to_dict();

        let keys: Vec<&str> = dict.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["jobid", "path", "name", "history"]);

        for (key, value) in &dict {
            assert_eq!(value, &job.get_attr(key));
        }
    }

    #[test]
    fn field_should_take_precedence_over_derivation() {
        assert_eq!(
            job().get_attr("path"),
            json!("/history/2012/09/09/job_201209091200_0001_user")
        );
    }

    #[test]
    fn derivation_should_be_invoked_on_read() {
        let mut job = job();
        assert_eq!(job.get_attr("name"), json!("unnamed"));

        job.name = Some("wordcount".to_string());
        assert_eq!(job.get_attr("name"), json!("wordcount"));
    }

    #[test]
    fn missing_attribute_should_resolve_to_null() {
        let job = job();
        assert_eq!(job.get_attr("history"), Value::Null);
        assert_eq!(job.get_attr("unknown"), Value::Null);
    }

    #[test]
    fn dyn_record_should_serialize_as_mapping() {
        let job = job();
        let record: &dyn Record = &job;

        let serialized = serde_json::to_value(record).unwrap();
        assert_eq!(serialized, job.to_value());
    }
}
