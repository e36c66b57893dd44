//! Deterministic cache keys.
//!
//! A key is `{op}:{p1}:{p2}...` with every parameter percent-encoded, so a
//! parameter containing `:` can never collide with a different parameter
//! split. Identical queries always build identical keys.
//!
//! Operation names follow the catalogue lookups, e.g. `author_id:12` or
//! `search_books:le%20guin:`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Starts a key for the given operation name.
    pub fn op(name: &'static str) -> CacheKeyBuilder {
        CacheKeyBuilder {
            buf: name.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
pub struct CacheKeyBuilder {
    buf: String,
}

impl CacheKeyBuilder {
    pub fn param(mut self, value: impl fmt::Display) -> Self {
        self.buf.push(':');
        self.buf.push_str(&urlencoding::encode(&value.to_string()));
        self
    }

    /// Appends an optional parameter; `None` encodes as an empty segment, so
    /// callers normalise blank input to `None` first.
    pub fn opt_param<T: fmt::Display>(self, value: Option<T>) -> Self {
        match value {
            Some(v) => self.param(v),
            None => self.param(""),
        }
    }

    pub fn build(self) -> CacheKey {
        CacheKey(self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_queries_share_a_key() {
        let a = CacheKey::op("authors_by_name").param("Le Guin").build();
        let b = CacheKey::op("authors_by_name").param("Le Guin").build();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "authors_by_name:Le%20Guin");
    }

    #[test]
    fn separators_inside_params_do_not_collide() {
        let a = CacheKey::op("search_books").param("a:b").param("c").build();
        let b = CacheKey::op("search_books").param("a").param("b:c").build();
        assert_ne!(a, b);
    }

    #[test]
    fn missing_param_differs_from_present_param() {
        let none = CacheKey::op("search_books")
            .opt_param(None::<&str>)
            .param("Dune")
            .build();
        let some = CacheKey::op("search_books")
            .opt_param(Some("Dune"))
            .param("")
            .build();
        assert_eq!(none.as_str(), "search_books::Dune");
        assert_ne!(none, some);
    }

    #[test]
    fn numeric_params() {
        let key = CacheKey::op("book_id").param(7).build();
        assert_eq!(key.to_string(), "book_id:7");
    }
}
