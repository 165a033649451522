use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::DictyError;
use crate::record::MutantRecord;
use crate::source::Category;

/// An immutable snapshot of every curated mutant, keyed by dictyBase id.
///
/// Built once per refresh from the merged record sequence and handed to
/// callers as an explicit value; queries never mutate it. Master-file order
/// is preserved for iteration.
#[derive(Debug, Clone)]
pub struct MutantStore {
    records: Vec<MutantRecord>,
    by_id: HashMap<String, usize>,
}

impl MutantStore {
    /// Duplicate ids keep their first position but the later record wins,
    /// matching how upstream republishes corrections within one file.
    pub fn from_records(records: Vec<MutantRecord>) -> Self {
        let mut deduped: Vec<MutantRecord> = Vec::with_capacity(records.len());
        let mut by_id = HashMap::with_capacity(records.len());
        for record in records {
            match by_id.get(&record.id) {
                Some(&index) => deduped[index] = record,
                None => {
                    by_id.insert(record.id.clone(), deduped.len());
                    deduped.push(record);
                }
            }
        }
        Self {
            records: deduped,
            by_id,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Result<&MutantRecord, DictyError> {
        self.by_id
            .get(id)
            .map(|&index| &self.records[index])
            .ok_or_else(|| DictyError::UnknownMutant(id.to_string()))
    }

    /// All known ids in master-file order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.id.as_str())
    }

    pub fn records(&self) -> &[MutantRecord] {
        &self.records
    }

    pub fn genes_of(&self, id: &str) -> Result<&[String], DictyError> {
        Ok(&self.get(id)?.genes)
    }

    pub fn phenotypes_of(&self, id: &str) -> Result<&[String], DictyError> {
        Ok(&self.get(id)?.phenotypes)
    }

    /// Union of every record's genes, sorted and deduplicated.
    pub fn all_genes(&self) -> BTreeSet<&str> {
        self.records
            .iter()
            .flat_map(|record| record.genes.iter().map(String::as_str))
            .collect()
    }

    pub fn all_phenotypes(&self) -> BTreeSet<&str> {
        self.records
            .iter()
            .flat_map(|record| record.phenotypes.iter().map(String::as_str))
            .collect()
    }

    /// Inverted index: gene name to the set of mutant ids annotated with it.
    pub fn gene_index(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut index: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for record in &self.records {
            for gene in &record.genes {
                index.entry(gene).or_default().insert(&record.id);
            }
        }
        index
    }

    pub fn phenotype_index(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut index: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for record in &self.records {
            for phenotype in &record.phenotypes {
                index.entry(phenotype).or_default().insert(&record.id);
            }
        }
        index
    }

    /// Ids whose record carries the given category flag, master-file order.
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter(move |record| record.flags.is_set(category))
            .map(|record| record.id.as_str())
    }

    pub fn into_records(self) -> Vec<MutantRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::record::CategoryFlags;

    fn record(id: &str, genes: &[&str], phenotypes: &[&str]) -> MutantRecord {
        MutantRecord {
            id: id.to_string(),
            descriptor: format!("{id} strain"),
            genes: genes.iter().map(|gene| gene.to_string()).collect(),
            phenotypes: phenotypes.iter().map(|item| item.to_string()).collect(),
            flags: CategoryFlags::default(),
        }
    }

    fn sample_store() -> MutantStore {
        MutantStore::from_records(vec![
            record("DBS2", &["pkaC", "gefB"], &["small"]),
            record("DBS1", &["cbfA"], &["aberrant protein localization"]),
            record("DBS3", &["gefB"], &["small", "round"]),
        ])
    }

    #[test]
    fn get_known_and_unknown() {
        let store = sample_store();
        assert_eq!(store.get("DBS1").unwrap().genes, vec!["cbfA"]);
        let err = store.get("DBS9").unwrap_err();
        assert_matches!(err, DictyError::UnknownMutant(id) if id == "DBS9");
    }

    #[test]
    fn accessors_fail_on_unknown_id() {
        let store = sample_store();
        assert_matches!(store.genes_of("nope"), Err(DictyError::UnknownMutant(_)));
        assert_matches!(
            store.phenotypes_of("nope"),
            Err(DictyError::UnknownMutant(_))
        );
    }

    #[test]
    fn ids_keep_insertion_order() {
        let store = sample_store();
        let ids: Vec<_> = store.ids().collect();
        assert_eq!(ids, vec!["DBS2", "DBS1", "DBS3"]);
    }

    #[test]
    fn all_genes_sorted_unique() {
        let store = sample_store();
        let genes: Vec<_> = store.all_genes().into_iter().collect();
        assert_eq!(genes, vec!["cbfA", "gefB", "pkaC"]);
    }

    #[test]
    fn gene_index_matches_record_membership() {
        let store = sample_store();
        let index = store.gene_index();
        for record in store.records() {
            for gene in &record.genes {
                assert!(index[gene.as_str()].contains(record.id.as_str()));
            }
        }
        for (gene, ids) in &index {
            for id in ids {
                assert!(store.get(id).unwrap().genes.iter().any(|g| g == gene));
            }
        }
    }

    #[test]
    fn phenotype_index_shared_value() {
        let store = sample_store();
        let index = store.phenotype_index();
        let small: Vec<_> = index["small"].iter().copied().collect();
        assert_eq!(small, vec!["DBS2", "DBS3"]);
    }

    #[test]
    fn empty_gene_lists_do_not_break_aggregation() {
        let store = MutantStore::from_records(vec![record("DBS1", &[""], &[""])]);
        let genes: Vec<_> = store.all_genes().into_iter().collect();
        assert_eq!(genes, vec![""]);
    }

    #[test]
    fn duplicate_id_keeps_position_latest_record_wins() {
        let store = MutantStore::from_records(vec![
            record("DBS1", &["old"], &["old"]),
            record("DBS2", &["x"], &["y"]),
            record("DBS1", &["new"], &["new"]),
        ]);
        assert_eq!(store.len(), 2);
        let ids: Vec<_> = store.ids().collect();
        assert_eq!(ids, vec!["DBS1", "DBS2"]);
        assert_eq!(store.genes_of("DBS1").unwrap(), ["new"]);
    }

    #[test]
    fn category_filter() {
        let mut flagged = record("DBS1", &["cbfA"], &["none"]);
        flagged.flags.set(Category::Null);
        let store = MutantStore::from_records(vec![flagged, record("DBS2", &["g"], &["p"])]);
        let nulls: Vec<_> = store.in_category(Category::Null).collect();
        assert_eq!(nulls, vec!["DBS1"]);
        assert!(store.in_category(Category::Other).next().is_none());
    }
}
