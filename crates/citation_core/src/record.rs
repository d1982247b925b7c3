use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Scheme plus an optional `www?` prefix, followed by the URL body that is kept.
static URL_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:https://|http://)(?:www.)?([A-Za-z0-9./_\-:#\[\]@!$&'()*+,;%=]+)")
        .expect("static url prefix pattern")
});

/// A single web citation.
///
/// The key (the URL) and the access date are fixed at creation; author,
/// title and year are filled in later by manual input or enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    key: String,
    author: Option<String>,
    title: Option<String>,
    year: Option<u32>,
    accessed_on: NaiveDate,
}

impl Record {
    pub fn new(key: impl Into<String>, accessed_on: NaiveDate) -> Self {
        Self {
            key: key.into(),
            author: None,
            title: None,
            year: None,
            accessed_on,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn year(&self) -> Option<u32> {
        self.year
    }

    pub fn accessed_on(&self) -> NaiveDate {
        self.accessed_on
    }

    /// Which optional fields are still blank.
    pub fn missing(&self) -> MissingFields {
        MissingFields {
            author: self.author.is_none(),
            title: self.title.is_none(),
            year: self.year.is_none(),
        }
    }

    /// The string this record is ordered by: author, else title, else the
    /// URL with its scheme and `www.` prefix stripped.
    pub fn sort_key(&self) -> &str {
        if let Some(author) = self.author() {
            return author;
        }
        if let Some(title) = self.title() {
            return title;
        }
        trim_url(&self.key)
    }

    /// Overwrites every field present in `fields`. Returns true if anything changed.
    pub fn apply(&mut self, fields: &PartialRecord) -> bool {
        let fields = fields.normalized();
        let mut changed = false;
        if let Some(author) = fields.author {
            changed |= self.author.as_deref() != Some(author.as_str());
            self.author = Some(author);
        }
        if let Some(title) = fields.title {
            changed |= self.title.as_deref() != Some(title.as_str());
            self.title = Some(title);
        }
        if let Some(year) = fields.year {
            changed |= self.year != Some(year);
            self.year = Some(year);
        }
        changed
    }

    /// Fills only the fields that are still blank. Returns true if anything changed.
    pub fn fill_blanks(&mut self, fields: &PartialRecord) -> bool {
        let fields = fields.normalized();
        let mut changed = false;
        if self.author.is_none() && fields.author.is_some() {
            self.author = fields.author;
            changed = true;
        }
        if self.title.is_none() && fields.title.is_some() {
            self.title = fields.title;
            changed = true;
        }
        if self.year.is_none() && fields.year.is_some() {
            self.year = fields.year;
            changed = true;
        }
        changed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingFields {
    pub author: bool,
    pub title: bool,
    pub year: bool,
}

impl MissingFields {
    pub fn any(&self) -> bool {
        self.author || self.title || self.year
    }
}

/// Optional fields supplied by a user or an enrichment pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialRecord {
    pub author: Option<String>,
    pub title: Option<String>,
    pub year: Option<u32>,
}

impl PartialRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }

    /// True when no field carries a usable value.
    pub fn is_empty(&self) -> bool {
        let normalized = self.normalized();
        normalized.author.is_none() && normalized.title.is_none() && normalized.year.is_none()
    }

    /// Trims text fields and drops blanks; a zero year counts as absent.
    pub fn normalized(&self) -> PartialRecord {
        PartialRecord {
            author: non_blank(self.author.as_deref()),
            title: non_blank(self.title.as_deref()),
            year: self.year.filter(|year| *year > 0),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

/// Strips the scheme and an optional `www.` prefix. Everything after the
/// prefix (host, path, query) is kept. Strings that do not look like an
/// http(s) URL are returned unchanged.
pub fn trim_url(url: &str) -> &str {
    URL_PREFIX_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|body| &url[body.start()..])
        .unwrap_or(url)
}
