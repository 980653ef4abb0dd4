//! Paginated queries.
//!
//! Pages are requested with `page.rows` and a 1-based `page.number`. The
//! iterator stops on the first of: `page.more` present and falsy, an
//! empty page, or (when the server sends no `page` object) a short page.

use std::collections::VecDeque;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::Api;
use crate::error::{Error, Result};
use crate::query::filter::{Filter, Sorter};
use crate::query::object::FilterQuery;
use crate::request::{PreparedRequest, RequestSpec};

/// One fetched page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based page number.
    pub number: u32,
    pub records: Vec<Value>,
    /// Whether the server has records after this page.
    pub more: bool,
}

/// A sort/filter query over a paginated list endpoint.
#[derive(Debug, Clone)]
pub struct PaginatedQuery {
    query: FilterQuery,
    rows: u32,
}

impl PaginatedQuery {
    /// `spec` must name its list field via [`RequestSpec::paginated`].
    pub fn new(api: Api, spec: RequestSpec) -> Self {
        let rows = api.page_size();
        Self {
            query: FilterQuery::new(api, spec),
            rows,
        }
    }

    /// Rows requested per page. Zero is ignored.
    pub fn rows(mut self, rows: u32) -> Self {
        if rows > 0 {
            self.rows = rows;
        }
        self
    }

    pub fn filter_by(mut self, filter: Filter) -> Self {
        self.query = self.query.filter_by(filter);
        self
    }

    pub fn sort_by(mut self, sorter: Sorter) -> Self {
        self.query = self.query.sort_by(sorter);
        self
    }

    pub fn only<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query = self.query.only(fields);
        self
    }

    pub fn spec(&self) -> &RequestSpec {
        self.query.spec()
    }

    pub fn page_size(&self) -> u32 {
        self.rows
    }

    /// The request for the first page, without sending it.
    pub fn prepare(&self) -> Result<PreparedRequest> {
        self.query.prepare_with(&self.page_params(1))
    }

    /// Fetch one page.
    pub fn page(&self, number: u32) -> Result<Page> {
        let field = self.list_field()?;
        let mut body = self.query.get_with(&self.page_params(number))?;

        let records = match body.get_mut(field).map(Value::take) {
            Some(Value::Array(records)) => records,
            Some(Value::Null) | None => return Err(Error::MissingField(field.to_string())),
            Some(other) => {
                return Err(Error::Config(format!(
                    "expected a list in '{}', got {}",
                    field, other
                )));
            }
        };

        let more = match body.get("page").and_then(|page| page.get("more")) {
            Some(flag) => is_truthy(flag),
            None => records.len() >= self.rows as usize,
        };
        let more = more && !records.is_empty();

        tracing::debug!(
            path = %self.spec().path(),
            page = number,
            records = records.len(),
            more,
            "fetched page"
        );

        Ok(Page {
            number,
            records,
            more,
        })
    }

    /// Lazily iterate every record, starting again from page 1.
    pub fn all(&self) -> Pages {
        Pages {
            query: self.clone(),
            next_page: 1,
            buffer: VecDeque::new(),
            done: false,
        }
    }

    /// First record, fetching a single page.
    pub fn first(&self) -> Result<Option<Value>> {
        self.all().next().transpose()
    }

    /// Fetch every page and collect the records.
    pub fn collect(&self) -> Result<Vec<Value>> {
        self.all().collect()
    }

    /// Fetch every page and deserialize each record into `T`.
    pub fn collect_as<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.all()
            .map(|record| -> Result<T> { Ok(serde_json::from_value(record?)?) })
            .collect()
    }

    fn list_field(&self) -> Result<&'static str> {
        self.spec().paginated_field().ok_or_else(|| {
            Error::Config(format!("{} is not a paginated endpoint", self.spec().path()))
        })
    }

    fn page_params(&self, number: u32) -> Vec<(String, String)> {
        vec![
            ("page.rows".to_string(), self.rows.to_string()),
            ("page.number".to_string(), number.to_string()),
        ]
    }
}

/// Lazy record iterator over a [`PaginatedQuery`].
///
/// Yields records in server order. After an error the iterator is
/// exhausted.
#[derive(Debug)]
pub struct Pages {
    query: PaginatedQuery,
    next_page: u32,
    buffer: VecDeque<Value>,
    done: bool,
}

impl Iterator for Pages {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Some(Ok(record));
            }
            if self.done {
                return None;
            }

            match self.query.page(self.next_page) {
                Ok(page) => {
                    self.next_page += 1;
                    self.done = !page.more;
                    self.buffer.extend(page.records);
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

impl std::iter::FusedIterator for Pages {}

/// The server sends flags as booleans, numbers or strings.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
