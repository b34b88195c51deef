//! Core HTTP protocol types and utilities

use std::fmt;

#[inline(always)]
pub(crate) fn slice_to_usize(bytes: &[u8]) -> Option<usize> {
    if bytes.is_empty() {
        return None;
    }

    let mut result: usize = 0;

    for &byte in bytes {
        if !byte.is_ascii_digit() {
            return None;
        }

        result = result
            .checked_mul(10)?
            .checked_add((byte - b'0') as usize)?;
    }

    Some(result)
}

#[inline]
pub(crate) fn trim_whitespace(mut bytes: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = bytes {
        if !first.is_ascii_whitespace() {
            break;
        }
        bytes = rest;
    }
    while let [rest @ .., last] = bytes {
        if !last.is_ascii_whitespace() {
            break;
        }
        bytes = rest;
    }
    bytes
}

// METHOD

/// HTTP request method, matched literally.
///
/// Only exact upper-case spellings map to the named variants; anything else
/// (including `get`) is kept verbatim in [`Method::Other`]. Routing compares
/// methods by value, so `get /echo/x` does not reach the echo handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `HEAD`
    Head,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `OPTIONS`
    Options,
    /// Any other token, case preserved.
    Other(Box<[u8]>),
}

impl Method {
    #[inline]
    pub(crate) fn from_bytes(src: &[u8]) -> Self {
        match src {
            b"GET" => Method::Get,
            b"POST" => Method::Post,
            b"PUT" => Method::Put,
            b"HEAD" => Method::Head,
            b"PATCH" => Method::Patch,
            b"DELETE" => Method::Delete,
            b"OPTIONS" => Method::Options,
            other => Method::Other(other.into()),
        }
    }

    /// Returns the method exactly as it appeared on the request line.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Method::Get => b"GET",
            Method::Post => b"POST",
            Method::Put => b"PUT",
            Method::Head => b"HEAD",
            Method::Patch => b"PATCH",
            Method::Delete => b"DELETE",
            Method::Options => b"OPTIONS",
            Method::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

// STATUS_CODE

macro_rules! set_status_codes {
    ($(
        $(#[$docs:meta])+
        $name:ident = ($num:expr, $str:expr);
    )+) => {
        /// HTTP status codes produced by the server.
        ///
        /// Reason phrases are fixed per code.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum StatusCode { $(
            #[doc = concat!(stringify!($num), " ", $str)]
            $(#[$docs])+
            $name = $num,
        )+ }

        impl StatusCode {
            // Returns the status line as bytes (e.g., `b"HTTP/1.1 200 OK\r\n"`).
            #[inline]
            pub(crate) const fn into_first_line(self) -> &'static [u8] {
                match self { $(
                    StatusCode::$name => concat!("HTTP/1.1 ", $num, " ", $str, "\r\n").as_bytes(),
                )+ }
            }

            /// Returns the fixed reason phrase.
            #[inline]
            pub const fn reason(self) -> &'static str {
                match self { $(
                    StatusCode::$name => $str,
                )+ }
            }
        }
    }
}

set_status_codes! {
    /// [[RFC9110, Section 15.3.1](https://datatracker.ietf.org/doc/html/rfc9110#section-15.3.1)]
    Ok = (200, "OK");
    /// [[RFC9110, Section 15.3.2](https://datatracker.ietf.org/doc/html/rfc9110#section-15.3.2)]
    Created = (201, "Created");

    /// [[RFC9110, Section 15.5.1](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.1)]
    BadRequest = (400, "Bad Request");
    /// [[RFC9110, Section 15.5.4](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.4)]
    Forbidden = (403, "Forbidden");
    /// [[RFC9110, Section 15.5.5](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.5)]
    NotFound = (404, "Not Found");

    /// [[RFC9110, Section 15.6.1](https://datatracker.ietf.org/doc/html/rfc9110#section-15.6.1)]
    InternalServerError = (500, "Internal Server Error");
}

impl StatusCode {
    /// Returns the numeric code.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

// HEADER MAP

/// Request headers keyed by lower-cased name.
///
/// Each name appears once; inserting an existing name replaces its value in
/// place, so the last occurrence on the wire wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderMap {
    headers: Vec<Header>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Header {
    name: Box<str>,
    value: Box<[u8]>,
}

impl HeaderMap {
    #[inline]
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            headers: Vec::with_capacity(capacity),
        }
    }

    /// Stores `value` under the lower-cased `name`. Returns `true` if the name
    /// was already present.
    pub(crate) fn insert(&mut self, name: &str, value: &[u8]) -> bool {
        let name = name.to_ascii_lowercase();

        match self.headers.iter_mut().find(|h| &*h.name == name.as_str()) {
            Some(header) => {
                header.value = value.into();
                true
            }
            None => {
                self.headers.push(Header {
                    name: name.into_boxed_str(),
                    value: value.into(),
                });
                false
            }
        }
    }

    /// Case-insensitive lookup.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| &*h.value)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Iterates `(lower-cased name, value)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.headers.iter().map(|h| (&*h.name, &*h.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_usize() {
        #[rustfmt::skip]
        let cases: [(&[u8], Option<usize>); 7] = [
            (b"0",      Some(0)),
            (b"17",     Some(17)),
            (b"000123", Some(123)),
            (b"",       None),
            (b"-1",     None),
            (b"12a",    None),
            (b"999999999999999999999999", None),
        ];

        for (value, expected) in cases {
            assert_eq!(slice_to_usize(value), expected);
        }
    }

    #[test]
    fn trim() {
        assert_eq!(trim_whitespace(b"  foo/1.0 \t"), b"foo/1.0");
        assert_eq!(trim_whitespace(b"   "), b"");
        assert_eq!(trim_whitespace(b"a b"), b"a b");
    }

    #[test]
    fn method_is_literal() {
        assert_eq!(Method::from_bytes(b"GET"), Method::Get);
        assert_eq!(Method::from_bytes(b"POST"), Method::Post);
        assert_eq!(Method::from_bytes(b"get"), Method::Other(b"get"[..].into()));
        assert_eq!(Method::from_bytes(b"BREW").as_bytes(), b"BREW");
        assert_eq!(Method::from_bytes(b"BREW").to_string(), "BREW");
    }

    #[test]
    fn status_lines() {
        #[rustfmt::skip]
        let cases: [(StatusCode, &[u8]); 6] = [
            (StatusCode::Ok,                  b"HTTP/1.1 200 OK\r\n"),
            (StatusCode::Created,             b"HTTP/1.1 201 Created\r\n"),
            (StatusCode::BadRequest,          b"HTTP/1.1 400 Bad Request\r\n"),
            (StatusCode::Forbidden,           b"HTTP/1.1 403 Forbidden\r\n"),
            (StatusCode::NotFound,            b"HTTP/1.1 404 Not Found\r\n"),
            (StatusCode::InternalServerError, b"HTTP/1.1 500 Internal Server Error\r\n"),
        ];

        for (status, line) in cases {
            assert_eq!(status.into_first_line(), line);
        }
        assert_eq!(StatusCode::NotFound.as_u16(), 404);
        assert_eq!(StatusCode::NotFound.reason(), "Not Found");
    }

    #[test]
    fn header_map_last_wins() {
        let mut map = HeaderMap::default();

        assert!(!map.insert("User-Agent", b"first"));
        assert!(!map.insert("Host", b"x"));
        assert!(map.insert("USER-AGENT", b"second"));

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("user-agent"), Some(&b"second"[..]));
        assert_eq!(map.get("uSeR-aGeNt"), Some(&b"second"[..]));
        assert!(map.contains("HOST"));
        assert!(!map.contains("accept"));

        let names: Vec<_> = map.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["user-agent", "host"]);
    }
}
