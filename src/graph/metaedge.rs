//! Metaedge whitelist
//!
//! A metaedge is the short code in the `metaedge` column of edges.tsv
//! (`CtD` = Compound-treats-Disease). Only codes listed here are loaded;
//! every other row is discarded by the loader.

use super::types::Relation;

/// Recognized metaedge codes and the relation each maps to
pub const METAEDGES: &[(&str, Relation)] = &[
    ("CtD", Relation::Treats),
    ("CpD", Relation::Palliates),
    ("CuG", Relation::Upregulates),
    ("AuG", Relation::Upregulates),
    ("DuG", Relation::Upregulates),
    ("CdG", Relation::Downregulates),
    ("AdG", Relation::Downregulates),
    ("DdG", Relation::Downregulates),
    ("DaG", Relation::Associates),
    ("DlA", Relation::Localizes),
    ("CrC", Relation::Resembles),
    ("DrD", Relation::Resembles),
    ("CbG", Relation::Binds),
    ("AeG", Relation::Expresses),
    ("Gr>G", Relation::Regulates),
    ("GrG", Relation::Regulates),
    ("GcG", Relation::Covaries),
    ("GiG", Relation::Interacts),
];

/// Look up the relation for a metaedge code
pub fn relation_for(code: &str) -> Option<Relation> {
    METAEDGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, relation)| *relation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(relation_for("CtD"), Some(Relation::Treats));
        assert_eq!(relation_for("CpD"), Some(Relation::Palliates));
        assert_eq!(relation_for("DlA"), Some(Relation::Localizes));
        assert_eq!(relation_for("AdG"), Some(Relation::Downregulates));
        assert_eq!(relation_for("Gr>G"), Some(Relation::Regulates));
    }

    #[test]
    fn test_unknown_codes() {
        assert_eq!(relation_for("CcSE"), None);
        assert_eq!(relation_for("ctd"), None);
        assert_eq!(relation_for(""), None);
    }

    #[test]
    fn test_every_relation_has_a_code() {
        for relation in Relation::ALL {
            assert!(
                METAEDGES.iter().any(|(_, r)| *r == relation),
                "{relation} has no code"
            );
        }
        let up: Vec<_> = METAEDGES
            .iter()
            .filter(|(_, r)| *r == Relation::Upregulates)
            .map(|(code, _)| *code)
            .collect();
        assert_eq!(up, vec!["CuG", "AuG", "DuG"]);
    }
}
