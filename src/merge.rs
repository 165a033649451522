use std::collections::HashSet;

use tracing::debug;

use crate::error::DictyError;
use crate::record::MutantRecord;
use crate::source::{Category, Source, SourceClient};

/// Raw text of all six dictyBase downloads, fetched up front so that an
/// unreachable source aborts a refresh before any parsing happens.
#[derive(Debug, Clone)]
pub struct SourceSet {
    pub all: String,
    pub categories: [(Category, String); 5],
}

impl SourceSet {
    pub fn fetch_all(client: &dyn SourceClient) -> Result<Self, DictyError> {
        let all = client.fetch(Source::All)?;
        let fetch = |category: Category| -> Result<(Category, String), DictyError> {
            Ok((category, client.fetch(Source::Category(category))?))
        };
        let categories = [
            fetch(Category::Null)?,
            fetch(Category::Overexpression)?,
            fetch(Category::Multiple)?,
            fetch(Category::Developmental)?,
            fetch(Category::Other)?,
        ];
        Ok(Self { all, categories })
    }
}

/// Parses the master list and unions category membership onto it.
///
/// Category files carry full records of their own, but only the id column
/// matters here; descriptor, genes and phenotypes are taken from the master
/// copy. Ids that appear in a category file without a master entry are
/// dropped. The published files drift against each other between monthly
/// updates, so that is expected data behavior, reported at debug level only.
pub fn merge_tags(sources: &SourceSet) -> Result<Vec<MutantRecord>, DictyError> {
    let mut records = parse_source(&sources.all)?;

    for (category, text) in &sources.categories {
        let member_ids: HashSet<String> = parse_source(text)?
            .into_iter()
            .map(|record| record.id)
            .collect();

        let mut matched = 0usize;
        for record in &mut records {
            if member_ids.contains(&record.id) {
                record.flags.set(*category);
                matched += 1;
            }
        }
        if matched < member_ids.len() {
            debug!(
                category = %category,
                orphaned = member_ids.len() - matched,
                "category file lists ids missing from all-mutants"
            );
        }
    }

    Ok(records)
}

/// Splits a source file into records, skipping the header line.
fn parse_source(text: &str) -> Result<Vec<MutantRecord>, DictyError> {
    text.lines()
        .skip(1)
        .filter(|line| !line.is_empty())
        .map(MutantRecord::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn sources(all: &str, null: &str, other: &str) -> SourceSet {
        let header = "Systematic Name\tStrain Descriptor\tAssociated gene(s)\tPhenotypes\n";
        let blank = header.to_string();
        SourceSet {
            all: format!("{header}{all}"),
            categories: [
                (Category::Null, format!("{header}{null}")),
                (Category::Overexpression, blank.clone()),
                (Category::Multiple, blank.clone()),
                (Category::Developmental, blank.clone()),
                (Category::Other, format!("{header}{other}")),
            ],
        }
    }

    #[test]
    fn merge_sets_only_matching_flags() {
        let set = sources(
            "DBS1\tone\tcbfA\taberrant protein localization\nDBS2\ttwo\tgefB\tsmall\n",
            "DBS1\tone\tcbfA\taberrant protein localization\n",
            "",
        );
        let records = merge_tags(&set).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].flags.null);
        assert!(!records[0].flags.other);
        assert_eq!(records[1].flags, Default::default());
    }

    #[test]
    fn merge_drops_orphan_category_ids() {
        let set = sources(
            "DBS1\tone\tcbfA\tnone\n",
            "",
            "DBS9\tghost\tgene\tnone\n",
        );
        let records = merge_tags(&set).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "DBS1");
        assert!(!records[0].flags.other);
    }

    #[test]
    fn merge_preserves_master_order() {
        let set = sources(
            "DBS3\tc\tg\tp\nDBS1\ta\tg\tp\nDBS2\tb\tg\tp\n",
            "",
            "",
        );
        let records = merge_tags(&set).unwrap();
        let ids: Vec<_> = records.iter().map(|record| record.id.as_str()).collect();
        assert_eq!(ids, vec!["DBS3", "DBS1", "DBS2"]);
    }

    #[test]
    fn merge_rejects_malformed_master_line() {
        let set = sources("DBS1\tonly-two-fields\n", "", "");
        let err = merge_tags(&set).unwrap_err();
        assert_matches!(err, DictyError::MalformedRecord(_));
    }

    #[test]
    fn header_line_is_skipped() {
        let set = sources("", "", "");
        assert!(merge_tags(&set).unwrap().is_empty());
    }
}
