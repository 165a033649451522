use serde::{Deserialize, Serialize};

use crate::error::DictyError;
use crate::source::Category;

/// Separator between gene names (and between phenotypes) inside a single
/// tab-delimited field. Matched as a literal substring, not a pattern:
/// upstream files contain it verbatim, padding spaces included.
const LIST_SEPARATOR: &str = " | ";

/// One curated strain entry from dictyBase's mutant phenotype downloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutantRecord {
    pub id: String,
    pub descriptor: String,
    pub genes: Vec<String>,
    pub phenotypes: Vec<String>,
    #[serde(default)]
    pub flags: CategoryFlags,
}

/// Membership flags, one per category file. False until the merge pass finds
/// the record's id in that category's file; never reset afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFlags {
    pub null: bool,
    pub overexpression: bool,
    pub multiple: bool,
    pub developmental: bool,
    pub other: bool,
}

impl CategoryFlags {
    pub fn set(&mut self, category: Category) {
        match category {
            Category::Null => self.null = true,
            Category::Overexpression => self.overexpression = true,
            Category::Multiple => self.multiple = true,
            Category::Developmental => self.developmental = true,
            Category::Other => self.other = true,
        }
    }

    pub fn is_set(&self, category: Category) -> bool {
        match category {
            Category::Null => self.null,
            Category::Overexpression => self.overexpression,
            Category::Multiple => self.multiple,
            Category::Developmental => self.developmental,
            Category::Other => self.other,
        }
    }
}

impl MutantRecord {
    /// Parses one data line of a mutant phenotype file.
    ///
    /// Layout: `id \t descriptor \t gene1 | gene2 \t pheno1 | pheno2`.
    /// Fields past the fourth are ignored. An empty gene or phenotype field
    /// yields a single empty string; that is how upstream publishes records
    /// with no annotation and it is preserved as-is.
    pub fn parse(line: &str) -> Result<Self, DictyError> {
        let mut fields = line.split('\t');
        let (Some(id), Some(descriptor), Some(genes), Some(phenotypes)) = (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) else {
            return Err(DictyError::MalformedRecord(line.to_string()));
        };

        Ok(Self {
            id: id.to_string(),
            descriptor: descriptor.to_string(),
            genes: split_list(genes),
            phenotypes: split_list(phenotypes),
            flags: CategoryFlags::default(),
        })
    }
}

fn split_list(field: &str) -> Vec<String> {
    field
        .split(LIST_SEPARATOR)
        .map(|item| item.to_string())
        .collect()
}
