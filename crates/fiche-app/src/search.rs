// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::Customer;

/// Display cap for dropdown results; matching beyond the cap is discarded,
/// not ranked.
pub const DEFAULT_RESULT_CAP: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Title,
    Demand,
    PatientType,
    ActionDescription,
    ActionDireText,
    CustomerName,
    CustomerDid,
    CustomerAddress,
    CustomerFileTitle,
    CustomerNote,
}

impl EntryKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Demand => "Demand",
            Self::PatientType => "Type",
            Self::ActionDescription => "Action Desc.",
            Self::ActionDireText => "Action Dire Text",
            Self::CustomerName => "Name",
            Self::CustomerDid => "DID",
            Self::CustomerAddress => "Address",
            Self::CustomerFileTitle => "File Title",
            Self::CustomerNote => "Note",
        }
    }
}

/// Index path of a tree node within one customer. Levels below the entry's
/// own depth are `None`. These are positions into the fetched tree, not
/// copies, so applying a hit restores the exact nodes the entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodePath {
    pub title: usize,
    pub demand: Option<usize>,
    pub patient_type: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub id: usize,
    pub kind: EntryKind,
    /// Position in the fleet the index was built over; `None` when the
    /// index covers a single (already selected) customer.
    pub customer: Option<usize>,
    /// Tree position; `None` for customer-level entries.
    pub path: Option<NodePath>,
    pub text: String,
    pub display_path: String,
    pub display_match: String,
}

/// Row of the rendered result list once two-phase disclosure is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchRow {
    Match(usize),
    SyntheticPatientType {
        customer: Option<usize>,
        path: NodePath,
    },
}

/// Flattened, pre-order view of one customer's tree (or of the whole
/// fleet), rebuilt only when the underlying snapshot changes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchIndex {
    entries: Vec<IndexEntry>,
}

impl SearchIndex {
    /// Flattens the selected customer's tree. Entries are emitted only for
    /// non-empty node text; an action contributes up to two entries.
    pub fn build(customer: &Customer) -> Self {
        let mut builder = IndexBuilder::default();
        builder.push_tree(None, customer, "");
        Self {
            entries: builder.entries,
        }
    }

    /// Fleet-wide index: customer-level fields first, then the customer's
    /// tree, per customer in list order.
    pub fn build_global(customers: &[Customer]) -> Self {
        let mut builder = IndexBuilder::default();
        for (customer_index, customer) in customers.iter().enumerate() {
            let prefix = format!("{} > ", customer.display_label());
            builder.push_customer_fields(customer_index, customer, &prefix);
            builder.push_tree(Some(customer_index), customer, &prefix);
        }
        Self {
            entries: builder.entries,
        }
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn entry(&self, id: usize) -> Option<&IndexEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring filter over `text`, preserving traversal
    /// order and truncating to `cap`. Empty or whitespace-only queries
    /// match nothing. Returns entry ids.
    pub fn filter(&self, query: &str, cap: usize) -> Vec<usize> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.text.to_lowercase().contains(&needle))
            .map(|entry| entry.id)
            .take(cap)
            .collect()
    }

    /// Derives the displayed rows from the raw matches and the expansion
    /// marker. An expanded demand match gains synthetic rows for its named
    /// patient types, inserted immediately after it; the underlying match
    /// list is never mutated. At most one entry can be expanded.
    pub fn disclose(
        &self,
        customer: &Customer,
        matches: &[usize],
        expanded: Option<usize>,
    ) -> Vec<SearchRow> {
        let mut rows = Vec::new();
        for &entry_id in matches {
            rows.push(SearchRow::Match(entry_id));
            if Some(entry_id) != expanded {
                continue;
            }
            let Some(entry) = self.entry(entry_id) else {
                continue;
            };
            if entry.kind != EntryKind::Demand {
                continue;
            }
            let Some(path) = entry.path else {
                continue;
            };
            let Some(demand_index) = path.demand else {
                continue;
            };
            let Some(title) = customer.demand_titles.get(path.title) else {
                continue;
            };
            let Some(demand) = title.demands.get(demand_index) else {
                continue;
            };
            for (patient_type_index, patient_type) in demand.patient_types.iter().enumerate() {
                if patient_type.name.is_empty() {
                    continue;
                }
                rows.push(SearchRow::SyntheticPatientType {
                    customer: entry.customer,
                    path: NodePath {
                        title: path.title,
                        demand: Some(demand_index),
                        patient_type: Some(patient_type_index),
                    },
                });
            }
        }
        rows
    }
}

#[derive(Default)]
struct IndexBuilder {
    entries: Vec<IndexEntry>,
}

impl IndexBuilder {
    fn push(
        &mut self,
        kind: EntryKind,
        customer: Option<usize>,
        path: Option<NodePath>,
        text: &str,
        display_path: String,
    ) {
        if text.is_empty() {
            return;
        }
        self.entries.push(IndexEntry {
            id: self.entries.len(),
            kind,
            customer,
            path,
            text: text.to_owned(),
            display_path,
            display_match: text.to_owned(),
        });
    }

    fn push_customer_fields(&mut self, customer_index: usize, customer: &Customer, prefix: &str) {
        let fields = [
            (EntryKind::CustomerName, "Name", customer.name.as_str()),
            (EntryKind::CustomerDid, "DID", customer.did_number.as_str()),
            (
                EntryKind::CustomerAddress,
                "Address",
                customer.address.as_str(),
            ),
            (
                EntryKind::CustomerFileTitle,
                "File Title",
                customer.filetitle.as_str(),
            ),
            (EntryKind::CustomerNote, "Note 1", customer.note1.as_str()),
            (EntryKind::CustomerNote, "Note 2", customer.note2.as_str()),
            (EntryKind::CustomerNote, "Note 3", customer.note3.as_str()),
        ];
        for (kind, label, text) in fields {
            self.push(
                kind,
                Some(customer_index),
                None,
                text,
                format!("{prefix}{label}"),
            );
        }
    }

    fn push_tree(&mut self, customer_index: Option<usize>, customer: &Customer, prefix: &str) {
        for (title_index, title) in customer.demand_titles.iter().enumerate() {
            let title_path = format!("{prefix}Title: {}", title.title);
            self.push(
                EntryKind::Title,
                customer_index,
                Some(NodePath {
                    title: title_index,
                    demand: None,
                    patient_type: None,
                }),
                &title.title,
                title_path.clone(),
            );
            for (demand_index, demand) in title.demands.iter().enumerate() {
                let demand_path = format!("{title_path} > Demand: {}", demand.name);
                self.push(
                    EntryKind::Demand,
                    customer_index,
                    Some(NodePath {
                        title: title_index,
                        demand: Some(demand_index),
                        patient_type: None,
                    }),
                    &demand.name,
                    demand_path.clone(),
                );
                for (patient_type_index, patient_type) in demand.patient_types.iter().enumerate() {
                    let patient_type_path =
                        format!("{demand_path} > Type: {}", patient_type.name);
                    let path = NodePath {
                        title: title_index,
                        demand: Some(demand_index),
                        patient_type: Some(patient_type_index),
                    };
                    self.push(
                        EntryKind::PatientType,
                        customer_index,
                        Some(path),
                        &patient_type.name,
                        patient_type_path.clone(),
                    );
                    for action in &patient_type.actions {
                        let action_path = format!("{patient_type_path} > Action");
                        self.push(
                            EntryKind::ActionDescription,
                            customer_index,
                            Some(path),
                            &action.description,
                            format!("{action_path} (Description)"),
                        );
                        self.push(
                            EntryKind::ActionDireText,
                            customer_index,
                            Some(path),
                            &action.dire_text,
                            format!("{action_path} (Dire Text)"),
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_RESULT_CAP, EntryKind, NodePath, SearchIndex, SearchRow};
    use crate::model::{Action, Customer, Demand, DemandTitle, PatientType};

    fn customer_with_tree() -> Customer {
        Customer {
            did_number: "100".to_owned(),
            name: "Dr. Aubert".to_owned(),
            filetitle: "12-Aubert".to_owned(),
            address: "4 rue des Lilas".to_owned(),
            note1: "premier".to_owned(),
            note2: String::new(),
            note3: String::new(),
            sheet_url: String::new(),
            demand_titles: vec![DemandTitle {
                title: "T1".to_owned(),
                demands: vec![Demand {
                    name: "D1".to_owned(),
                    patient_types: vec![PatientType {
                        name: "P1".to_owned(),
                        actions: vec![Action {
                            description: "Clean wound".to_owned(),
                            dire_text: "Call if fever".to_owned(),
                        }],
                    }],
                }],
            }],
        }
    }

    #[test]
    fn index_counts_only_non_empty_leaf_text() {
        let mut customer = customer_with_tree();
        customer.demand_titles[0].demands[0].patient_types[0]
            .actions
            .push(Action {
                description: "Second".to_owned(),
                dire_text: String::new(),
            });
        // title + demand + patient type + (desc, dire) + desc
        assert_eq!(SearchIndex::build(&customer).len(), 6);
    }

    #[test]
    fn rebuilding_yields_identical_entries_in_identical_order() {
        let customer = customer_with_tree();
        assert_eq!(SearchIndex::build(&customer), SearchIndex::build(&customer));
    }

    #[test]
    fn traversal_is_pre_order() {
        let index = SearchIndex::build(&customer_with_tree());
        let kinds: Vec<EntryKind> = index.entries().iter().map(|entry| entry.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EntryKind::Title,
                EntryKind::Demand,
                EntryKind::PatientType,
                EntryKind::ActionDescription,
                EntryKind::ActionDireText,
            ]
        );
    }

    #[test]
    fn blank_and_whitespace_queries_match_nothing() {
        let index = SearchIndex::build(&customer_with_tree());
        assert!(index.filter("", DEFAULT_RESULT_CAP).is_empty());
        assert!(index.filter("   ", DEFAULT_RESULT_CAP).is_empty());
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        let index = SearchIndex::build(&customer_with_tree());
        let matches = index.filter("clean", DEFAULT_RESULT_CAP);
        assert_eq!(matches.len(), 1);
        let entry = index.entry(matches[0]).expect("entry");
        assert_eq!(entry.kind, EntryKind::ActionDescription);
        assert!(entry.display_path.ends_with("Action (Description)"));
        assert_eq!(
            entry.path,
            Some(NodePath {
                title: 0,
                demand: Some(0),
                patient_type: Some(0),
            })
        );
    }

    #[test]
    fn results_are_capped_in_traversal_order() {
        let mut customer = customer_with_tree();
        customer.demand_titles[0].demands[0].patient_types[0].actions = (0..20)
            .map(|index| Action {
                description: format!("rincer {index:02}"),
                dire_text: String::new(),
            })
            .collect();

        let index = SearchIndex::build(&customer);
        let matches = index.filter("rincer", 15);
        assert_eq!(matches.len(), 15);
        let first = index.entry(matches[0]).expect("entry");
        let last = index.entry(matches[14]).expect("entry");
        assert_eq!(first.text, "rincer 00");
        assert_eq!(last.text, "rincer 14");
    }

    #[test]
    fn display_paths_follow_the_tree() {
        let index = SearchIndex::build(&customer_with_tree());
        let paths: Vec<&str> = index
            .entries()
            .iter()
            .map(|entry| entry.display_path.as_str())
            .collect();
        assert_eq!(
            paths,
            vec![
                "Title: T1",
                "Title: T1 > Demand: D1",
                "Title: T1 > Demand: D1 > Type: P1",
                "Title: T1 > Demand: D1 > Type: P1 > Action (Description)",
                "Title: T1 > Demand: D1 > Type: P1 > Action (Dire Text)",
            ]
        );
    }

    #[test]
    fn global_index_includes_customer_fields_with_back_reference() {
        let customers = vec![customer_with_tree()];
        let index = SearchIndex::build_global(&customers);

        let did_matches = index.filter("100", DEFAULT_RESULT_CAP);
        assert_eq!(did_matches.len(), 1);
        let entry = index.entry(did_matches[0]).expect("entry");
        assert_eq!(entry.kind, EntryKind::CustomerDid);
        assert_eq!(entry.customer, Some(0));
        assert_eq!(entry.path, None);

        let tree_matches = index.filter("clean", DEFAULT_RESULT_CAP);
        let entry = index.entry(tree_matches[0]).expect("entry");
        assert_eq!(entry.customer, Some(0));
        assert!(entry.display_path.starts_with("12-Aubert > Title: T1"));
    }

    #[test]
    fn disclosure_inserts_synthetic_rows_after_the_expanded_demand() {
        let mut customer = customer_with_tree();
        customer.demand_titles[0].demands[0].patient_types.push(PatientType {
            name: "P2".to_owned(),
            actions: Vec::new(),
        });
        let index = SearchIndex::build(&customer);
        let matches = index.filter("d1", DEFAULT_RESULT_CAP);
        assert_eq!(matches.len(), 1);
        let demand_entry = matches[0];

        let collapsed = index.disclose(&customer, &matches, None);
        assert_eq!(collapsed, vec![SearchRow::Match(demand_entry)]);

        let expanded = index.disclose(&customer, &matches, Some(demand_entry));
        assert_eq!(expanded.len(), 3);
        assert_eq!(expanded[0], SearchRow::Match(demand_entry));
        assert_eq!(
            expanded[1],
            SearchRow::SyntheticPatientType {
                customer: None,
                path: NodePath {
                    title: 0,
                    demand: Some(0),
                    patient_type: Some(0),
                },
            }
        );
        assert_eq!(
            expanded[2],
            SearchRow::SyntheticPatientType {
                customer: None,
                path: NodePath {
                    title: 0,
                    demand: Some(0),
                    patient_type: Some(1),
                },
            }
        );
    }

    #[test]
    fn disclosure_ignores_non_demand_entries() {
        let customer = customer_with_tree();
        let index = SearchIndex::build(&customer);
        let matches = index.filter("p1", DEFAULT_RESULT_CAP);
        assert_eq!(matches.len(), 1);

        let rows = index.disclose(&customer, &matches, Some(matches[0]));
        assert_eq!(rows, vec![SearchRow::Match(matches[0])]);
    }
}
