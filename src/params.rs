use std::{fmt, slice};

/// A single captured parameter, consisting of a name and a value.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Param {
    pub name: String,
    pub value: String,
}

/// An ordered list of parameters captured for one request.
///
/// Path captures appear left to right as they occur in the path. Query
/// captures appear in query-string order. The two kinds are always kept in
/// separate containers.
///
/// ```rust
/// use trellis::Params;
///
/// let mut params = Params::new();
/// params.set("name", "iris");
/// params.set("else", "/elsehere");
///
/// assert_eq!(params.get("name"), Some("iris"));
/// assert_eq!(params.to_string(), "name=iris,else=/elsehere");
/// ```
#[derive(Clone, Default, Eq, PartialEq)]
pub struct Params {
    inner: Vec<Param>,
}

impl Params {
    pub fn new() -> Self {
        Self { inner: Vec::new() }
    }

    /// Appends a parameter.
    ///
    /// Names are not deduplicated. Lookups return the most recent value
    /// stored under a name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push(Param {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Returns the value stored under `name`, if any.
    pub fn get(&self, name: impl AsRef<str>) -> Option<&str> {
        let name = name.as_ref();
        self.inner
            .iter()
            .rev()
            .find(|param| param.name == name)
            .map(|param| param.value.as_str())
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if there are no parameters in the list.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns an iterator over `(name, value)` pairs in capture order.
    pub fn iter(&self) -> ParamsIter<'_> {
        ParamsIter {
            inner: self.inner.iter(),
        }
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Renders `name=value` pairs comma-joined in capture order.
impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.set(name, value);
        }
        params
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a str, &'a str);
    type IntoIter = ParamsIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the names and values of a [`Params`] list.
pub struct ParamsIter<'a> {
    inner: slice::Iter<'a, Param>,
}

impl<'a> Iterator for ParamsIter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|p| (p.name.as_str(), p.value.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for ParamsIter<'_> {}

/// Parses a raw query string (without the leading `?`) into ordered pairs.
pub(crate) fn parse_query(raw: &str) -> Params {
    url::form_urlencoded::parse(raw.as_bytes()).collect()
}
