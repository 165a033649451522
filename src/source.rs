use std::fmt;
use std::time::Duration;

use clap::ValueEnum;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::error::DictyError;

const DOWNLOAD_BASE_URL: &str =
    "http://dictybase.org/db/cgi-bin/dictyBase/download/download.pl?area=mutant_phenotypes&ID=";

/// One of the five mutation-type category files published alongside the
/// master list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Null,
    Overexpression,
    Multiple,
    Developmental,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Null,
        Category::Overexpression,
        Category::Multiple,
        Category::Developmental,
        Category::Other,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Null => write!(f, "null"),
            Category::Overexpression => write!(f, "overexpression"),
            Category::Multiple => write!(f, "multiple"),
            Category::Developmental => write!(f, "developmental"),
            Category::Other => write!(f, "other"),
        }
    }
}

/// A named dictyBase download: the master list or one category file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    All,
    Category(Category),
}

impl Source {
    pub const ALL: [Source; 6] = [
        Source::All,
        Source::Category(Category::Null),
        Source::Category(Category::Overexpression),
        Source::Category(Category::Multiple),
        Source::Category(Category::Developmental),
        Source::Category(Category::Other),
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Source::All => "all-mutants.txt",
            Source::Category(Category::Null) => "null-mutants.txt",
            Source::Category(Category::Overexpression) => "overexpression-mutants.txt",
            Source::Category(Category::Multiple) => "multiple-mutants.txt",
            Source::Category(Category::Developmental) => "developmental-mutants.txt",
            Source::Category(Category::Other) => "other-mutants.txt",
        }
    }

    pub fn url(&self) -> String {
        format!("{DOWNLOAD_BASE_URL}{}", self.file_name())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

pub trait SourceClient: Send + Sync {
    fn fetch(&self, source: Source) -> Result<String, DictyError>;
}

#[derive(Clone)]
pub struct DictybaseHttpClient {
    client: Client,
}

impl DictybaseHttpClient {
    pub fn new() -> Result<Self, DictyError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("dicty-mutants/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| DictyError::Filesystem(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| DictyError::SourceUnavailable {
                source_name: "dictybase".to_string(),
                message: err.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl SourceClient for DictybaseHttpClient {
    fn fetch(&self, source: Source) -> Result<String, DictyError> {
        let response = self.client.get(source.url()).send().map_err(|err| {
            DictyError::SourceUnavailable {
                source_name: source.file_name().to_string(),
                message: err.to_string(),
            }
        })?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            return Err(DictyError::SourceUnavailable {
                source_name: source.file_name().to_string(),
                message: format!("HTTP status {status}"),
            });
        }
        response.text().map_err(|err| DictyError::SourceUnavailable {
            source_name: source.file_name().to_string(),
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_file_names() {
        let names: Vec<_> = Source::ALL.iter().map(|source| source.file_name()).collect();
        assert_eq!(
            names,
            vec![
                "all-mutants.txt",
                "null-mutants.txt",
                "overexpression-mutants.txt",
                "multiple-mutants.txt",
                "developmental-mutants.txt",
                "other-mutants.txt",
            ]
        );
    }

    #[test]
    fn source_urls_target_mutant_phenotypes_area() {
        let url = Source::Category(Category::Null).url();
        assert!(url.contains("area=mutant_phenotypes"));
        assert!(url.ends_with("ID=null-mutants.txt"));
    }
}
