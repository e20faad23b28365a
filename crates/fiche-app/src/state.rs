// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{Action, Customer, Demand, DemandTitle, PatientType};
use crate::search::NodePath;

/// Where the view should scroll after a search hit lands. Consumed exactly
/// once via [`SelectionState::take_scroll_target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    Demand { demand: usize },
    PatientType { demand: usize, patient_type: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectCommand {
    LoadCustomers(Vec<Customer>),
    SelectCustomer(String),
    ClearCustomer,
    SelectTitle(Option<usize>),
    SelectDemand(Option<usize>),
    SelectPatientType(Option<usize>),
    RemoveCurrentAction(usize),
    ClearCurrentActions,
    ApplySearchHit(Option<NodePath>),
    ReplaceSelectedCustomer(Customer),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectEvent {
    CustomersLoaded { count: usize },
    CustomerSelected(String),
    CustomerRefreshed(String),
    CustomerCleared,
    TitleSelected(Option<usize>),
    DemandSelected(Option<usize>),
    PatientTypeSelected(Option<usize>),
    ActionsReplaced { count: usize },
    ActionRemoved { index: usize },
    ActionsCleared,
    SelectionFailed(String),
    ScrollRequested(ScrollTarget),
}

/// Owns the fetched customer list and the selection chain into it.
///
/// The chain is a path of indices into the immutable tree:
/// customer -> demand title -> demand -> patient type. Every transition to
/// a shallower or sibling node resets all deeper levels; the chain is
/// re-enterable at any level. `current_actions` is the working copy of the
/// selected patient type's action list and is only ever replaced or edited
/// for display, never appended to and never written back.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionState {
    customers: Vec<Customer>,
    selected_customer: Option<usize>,
    selected_title: Option<usize>,
    selected_demand: Option<usize>,
    selected_patient_type: Option<usize>,
    current_actions: Vec<Action>,
    last_error: Option<String>,
    scroll_target: Option<ScrollTarget>,
}

impl SelectionState {
    pub fn dispatch(&mut self, command: SelectCommand) -> Vec<SelectEvent> {
        match command {
            SelectCommand::LoadCustomers(customers) => self.load_customers(customers),
            SelectCommand::SelectCustomer(did) => self.select_customer(&did),
            SelectCommand::ClearCustomer => self.clear_customer(),
            SelectCommand::SelectTitle(index) => self.select_title(index),
            SelectCommand::SelectDemand(index) => self.select_demand(index),
            SelectCommand::SelectPatientType(index) => self.select_patient_type(index),
            SelectCommand::RemoveCurrentAction(index) => self.remove_current_action(index),
            SelectCommand::ClearCurrentActions => self.clear_current_actions(),
            SelectCommand::ApplySearchHit(path) => self.apply_search_hit(path),
            SelectCommand::ReplaceSelectedCustomer(customer) => self.replace_selected(customer),
        }
    }

    fn load_customers(&mut self, customers: Vec<Customer>) -> Vec<SelectEvent> {
        let previous_did = self
            .selected_customer()
            .map(|customer| customer.did_number.clone());

        self.customers = customers;
        self.last_error = None;
        let count = self.customers.len();
        let mut events = vec![SelectEvent::CustomersLoaded { count }];

        // Re-anchor an existing selection by did; the tree beneath it may
        // have changed, so the deeper levels always reset.
        match previous_did.and_then(|did| self.find_customer(&did)) {
            Some(index) => {
                self.selected_customer = Some(index);
                self.reset_below_customer();
                events.push(SelectEvent::CustomerSelected(
                    self.customers[index].did_number.clone(),
                ));
            }
            None => {
                if self.selected_customer.take().is_some() {
                    self.reset_below_customer();
                    events.push(SelectEvent::CustomerCleared);
                }
            }
        }
        events
    }

    fn select_customer(&mut self, did: &str) -> Vec<SelectEvent> {
        self.last_error = None;
        match self.find_customer(did) {
            Some(index) => {
                self.selected_customer = Some(index);
                self.reset_below_customer();
                vec![SelectEvent::CustomerSelected(
                    self.customers[index].did_number.clone(),
                )]
            }
            None => {
                self.selected_customer = None;
                self.reset_below_customer();
                let message = format!("customer {did} not found in the loaded list");
                self.last_error = Some(message.clone());
                vec![SelectEvent::SelectionFailed(message)]
            }
        }
    }

    fn clear_customer(&mut self) -> Vec<SelectEvent> {
        self.last_error = None;
        self.selected_customer = None;
        self.reset_below_customer();
        vec![SelectEvent::CustomerCleared]
    }

    fn select_title(&mut self, index: Option<usize>) -> Vec<SelectEvent> {
        self.last_error = None;
        let Some(customer) = self.selected_customer() else {
            return self.fail("select a customer before choosing a demand title");
        };
        if let Some(index) = index
            && index >= customer.demand_titles.len()
        {
            return self.fail(format!("demand title {index} is out of range"));
        }

        self.selected_title = index;
        self.reset_below_title();
        vec![SelectEvent::TitleSelected(index)]
    }

    fn select_demand(&mut self, index: Option<usize>) -> Vec<SelectEvent> {
        self.last_error = None;
        let Some(title) = self.selected_title() else {
            return self.fail("select a demand title before choosing a demand");
        };
        if let Some(index) = index
            && index >= title.demands.len()
        {
            return self.fail(format!("demand {index} is out of range"));
        }

        self.selected_demand = index;
        self.reset_below_demand();
        vec![SelectEvent::DemandSelected(index)]
    }

    fn select_patient_type(&mut self, index: Option<usize>) -> Vec<SelectEvent> {
        self.last_error = None;
        let Some(demand) = self.selected_demand() else {
            return self.fail("select a demand before choosing a patient type");
        };
        if let Some(index) = index
            && index >= demand.patient_types.len()
        {
            return self.fail(format!("patient type {index} is out of range"));
        }

        self.selected_patient_type = index;
        let mut events = vec![SelectEvent::PatientTypeSelected(index)];
        events.push(self.replace_actions_from_selection());
        events
    }

    fn remove_current_action(&mut self, index: usize) -> Vec<SelectEvent> {
        // Removal is by working-list identity, not by description text, so
        // actions that share a description stay independent.
        if index >= self.current_actions.len() {
            return Vec::new();
        }
        self.current_actions.remove(index);
        vec![SelectEvent::ActionRemoved { index }]
    }

    fn clear_current_actions(&mut self) -> Vec<SelectEvent> {
        self.current_actions.clear();
        vec![SelectEvent::ActionsCleared]
    }

    fn apply_search_hit(&mut self, path: Option<NodePath>) -> Vec<SelectEvent> {
        self.last_error = None;
        let Some(customer) = self.selected_customer() else {
            return self.fail("select a customer before applying a search result");
        };
        let Some(path) = path else {
            // Customer-level hit: land on the customer with nothing deeper.
            self.reset_below_customer();
            self.selected_title = None;
            return vec![SelectEvent::TitleSelected(None)];
        };

        let Some(title) = customer.demand_titles.get(path.title) else {
            return self.fail(format!("demand title {} is out of range", path.title));
        };
        if let Some(demand_index) = path.demand {
            let Some(demand) = title.demands.get(demand_index) else {
                return self.fail(format!("demand {demand_index} is out of range"));
            };
            if let Some(patient_type_index) = path.patient_type
                && patient_type_index >= demand.patient_types.len()
            {
                return self.fail(format!("patient type {patient_type_index} is out of range"));
            }
        } else if path.patient_type.is_some() {
            return self.fail("search result names a patient type without its demand");
        }

        self.selected_title = Some(path.title);
        self.selected_demand = path.demand;
        self.selected_patient_type = path.patient_type;

        let mut events = vec![
            SelectEvent::TitleSelected(Some(path.title)),
            SelectEvent::DemandSelected(path.demand),
            SelectEvent::PatientTypeSelected(path.patient_type),
        ];
        events.push(self.replace_actions_from_selection());

        let target = match (path.demand, path.patient_type) {
            (Some(demand), Some(patient_type)) => Some(ScrollTarget::PatientType {
                demand,
                patient_type,
            }),
            (Some(demand), None) => Some(ScrollTarget::Demand { demand }),
            _ => None,
        };
        if let Some(target) = target {
            self.scroll_target = Some(target);
            events.push(SelectEvent::ScrollRequested(target));
        }
        events
    }

    fn replace_selected(&mut self, customer: Customer) -> Vec<SelectEvent> {
        // Stale-response guard: a refresh that raced a re-selection is
        // silently discarded.
        let Some(index) = self.selected_customer else {
            return Vec::new();
        };
        if self.customers[index].did_number != customer.did_number {
            return Vec::new();
        }

        let did = customer.did_number.clone();
        self.customers[index] = customer;
        self.reset_below_customer();
        vec![SelectEvent::CustomerRefreshed(did)]
    }

    fn replace_actions_from_selection(&mut self) -> SelectEvent {
        let actions = self
            .selected_patient_type()
            .map(|patient_type| patient_type.actions.clone())
            .unwrap_or_default();
        if actions.is_empty() {
            self.current_actions.clear();
            SelectEvent::ActionsCleared
        } else {
            self.current_actions = actions;
            SelectEvent::ActionsReplaced {
                count: self.current_actions.len(),
            }
        }
    }

    fn reset_below_customer(&mut self) {
        self.selected_title = None;
        self.reset_below_title();
    }

    fn reset_below_title(&mut self) {
        self.selected_demand = None;
        self.reset_below_demand();
    }

    fn reset_below_demand(&mut self) {
        self.selected_patient_type = None;
        self.current_actions.clear();
    }

    fn fail(&mut self, message: impl Into<String>) -> Vec<SelectEvent> {
        let message = message.into();
        self.last_error = Some(message.clone());
        vec![SelectEvent::SelectionFailed(message)]
    }

    fn find_customer(&self, did: &str) -> Option<usize> {
        self.customers
            .iter()
            .position(|customer| customer.did_number == did)
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn selected_customer(&self) -> Option<&Customer> {
        self.selected_customer.map(|index| &self.customers[index])
    }

    pub fn selected_title(&self) -> Option<&DemandTitle> {
        let customer = self.selected_customer()?;
        customer.demand_titles.get(self.selected_title?)
    }

    pub fn selected_demand(&self) -> Option<&Demand> {
        let title = self.selected_title()?;
        title.demands.get(self.selected_demand?)
    }

    pub fn selected_patient_type(&self) -> Option<&PatientType> {
        let demand = self.selected_demand()?;
        demand.patient_types.get(self.selected_patient_type?)
    }

    pub fn selected_customer_index(&self) -> Option<usize> {
        self.selected_customer
    }

    pub fn selected_title_index(&self) -> Option<usize> {
        self.selected_title
    }

    pub fn selected_demand_index(&self) -> Option<usize> {
        self.selected_demand
    }

    pub fn selected_patient_type_index(&self) -> Option<usize> {
        self.selected_patient_type
    }

    pub fn current_actions(&self) -> &[Action] {
        &self.current_actions
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Hands out the pending scroll request, clearing it so redraws never
    /// re-trigger the scroll.
    pub fn take_scroll_target(&mut self) -> Option<ScrollTarget> {
        self.scroll_target.take()
    }
}

#[cfg(test)]
mod tests {
    use super::{ScrollTarget, SelectCommand, SelectEvent, SelectionState};
    use crate::model::{Action, Customer, Demand, DemandTitle, PatientType};
    use crate::search::NodePath;

    fn action(description: &str, dire_text: &str) -> Action {
        Action {
            description: description.to_owned(),
            dire_text: dire_text.to_owned(),
        }
    }

    fn sample_customer(did: &str) -> Customer {
        Customer {
            did_number: did.to_owned(),
            name: format!("Dr. {did}"),
            filetitle: String::new(),
            address: String::new(),
            note1: String::new(),
            note2: String::new(),
            note3: String::new(),
            sheet_url: "https://sheets.example/doc".to_owned(),
            demand_titles: vec![
                DemandTitle {
                    title: "Plaies".to_owned(),
                    demands: vec![
                        Demand {
                            name: "Pansement simple".to_owned(),
                            patient_types: vec![
                                PatientType {
                                    name: "Adulte".to_owned(),
                                    actions: vec![
                                        action("Nettoyer la plaie", "Appeler si fievre"),
                                        action("Changer le pansement", ""),
                                    ],
                                },
                                PatientType {
                                    name: "Enfant".to_owned(),
                                    actions: Vec::new(),
                                },
                            ],
                        },
                        Demand {
                            name: "Pansement complexe".to_owned(),
                            patient_types: Vec::new(),
                        },
                    ],
                },
                DemandTitle {
                    title: "Perfusions".to_owned(),
                    demands: Vec::new(),
                },
            ],
        }
    }

    fn loaded_state() -> SelectionState {
        let mut state = SelectionState::default();
        state.dispatch(SelectCommand::LoadCustomers(vec![
            sample_customer("100"),
            sample_customer("200"),
        ]));
        state
    }

    fn drill_to_patient_type(state: &mut SelectionState, did: &str) {
        state.dispatch(SelectCommand::SelectCustomer(did.to_owned()));
        state.dispatch(SelectCommand::SelectTitle(Some(0)));
        state.dispatch(SelectCommand::SelectDemand(Some(0)));
        state.dispatch(SelectCommand::SelectPatientType(Some(0)));
    }

    #[test]
    fn full_drill_down_loads_patient_type_actions_in_order() {
        let mut state = loaded_state();
        drill_to_patient_type(&mut state, "100");

        let actions = state.current_actions();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].description, "Nettoyer la plaie");
        assert_eq!(actions[1].description, "Changer le pansement");
        assert_eq!(
            state.current_actions(),
            state.selected_patient_type().expect("patient type").actions
        );
    }

    #[test]
    fn selecting_action_less_patient_type_clears_working_list() {
        let mut state = loaded_state();
        drill_to_patient_type(&mut state, "100");

        let events = state.dispatch(SelectCommand::SelectPatientType(Some(1)));
        assert!(state.selected_patient_type().is_some());
        assert!(state.current_actions().is_empty());
        assert!(events.contains(&SelectEvent::ActionsCleared));
    }

    #[test]
    fn selecting_a_different_customer_resets_the_whole_chain() {
        let mut state = loaded_state();
        drill_to_patient_type(&mut state, "100");

        state.dispatch(SelectCommand::SelectCustomer("200".to_owned()));
        assert_eq!(
            state.selected_customer().map(|c| c.did_number.as_str()),
            Some("200")
        );
        assert!(state.selected_title().is_none());
        assert!(state.selected_demand().is_none());
        assert!(state.selected_patient_type().is_none());
        assert!(state.current_actions().is_empty());
    }

    #[test]
    fn selecting_a_sibling_title_resets_deeper_levels() {
        let mut state = loaded_state();
        drill_to_patient_type(&mut state, "100");

        state.dispatch(SelectCommand::SelectTitle(Some(1)));
        assert_eq!(state.selected_title_index(), Some(1));
        assert!(state.selected_demand().is_none());
        assert!(state.selected_patient_type().is_none());
        assert!(state.current_actions().is_empty());
    }

    #[test]
    fn unknown_did_sets_error_and_leaves_selection_unset() {
        let mut state = loaded_state();
        drill_to_patient_type(&mut state, "100");

        let events = state.dispatch(SelectCommand::SelectCustomer("999".to_owned()));
        assert!(state.selected_customer().is_none());
        assert!(state.current_actions().is_empty());
        assert!(state.last_error().expect("error").contains("999"));
        assert!(matches!(events[0], SelectEvent::SelectionFailed(_)));
    }

    #[test]
    fn duplicate_descriptions_are_removed_one_at_a_time() {
        let mut state = SelectionState::default();
        let mut customer = sample_customer("100");
        customer.demand_titles[0].demands[0].patient_types[0].actions = vec![
            action("Nettoyer la plaie", ""),
            action("Nettoyer la plaie", "Appeler si fievre"),
            action("Changer le pansement", ""),
        ];
        state.dispatch(SelectCommand::LoadCustomers(vec![customer]));
        drill_to_patient_type(&mut state, "100");

        state.dispatch(SelectCommand::RemoveCurrentAction(0));
        let remaining = state.current_actions();
        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining[0].description, "Nettoyer la plaie");
        assert_eq!(remaining[0].dire_text, "Appeler si fievre");
        assert_eq!(remaining[1].description, "Changer le pansement");
    }

    #[test]
    fn removal_leaves_backing_patient_type_untouched() {
        let mut state = loaded_state();
        drill_to_patient_type(&mut state, "100");

        state.dispatch(SelectCommand::RemoveCurrentAction(0));
        assert_eq!(state.current_actions().len(), 1);
        assert_eq!(
            state.selected_patient_type().expect("patient type").actions.len(),
            2
        );
    }

    #[test]
    fn out_of_range_removal_is_a_no_op() {
        let mut state = loaded_state();
        drill_to_patient_type(&mut state, "100");

        let events = state.dispatch(SelectCommand::RemoveCurrentAction(9));
        assert!(events.is_empty());
        assert_eq!(state.current_actions().len(), 2);
    }

    #[test]
    fn apply_search_hit_drills_in_one_step_and_requests_scroll() {
        let mut state = loaded_state();
        state.dispatch(SelectCommand::SelectCustomer("100".to_owned()));

        let events = state.dispatch(SelectCommand::ApplySearchHit(Some(NodePath {
            title: 0,
            demand: Some(0),
            patient_type: Some(0),
        })));

        assert_eq!(state.selected_title_index(), Some(0));
        assert_eq!(state.selected_demand_index(), Some(0));
        assert_eq!(state.selected_patient_type_index(), Some(0));
        assert_eq!(state.current_actions().len(), 2);
        assert!(events.contains(&SelectEvent::ScrollRequested(ScrollTarget::PatientType {
            demand: 0,
            patient_type: 0,
        })));

        assert_eq!(
            state.take_scroll_target(),
            Some(ScrollTarget::PatientType {
                demand: 0,
                patient_type: 0,
            })
        );
        assert_eq!(state.take_scroll_target(), None);
    }

    #[test]
    fn search_match_applied_as_hit_loads_the_matched_action() {
        use crate::search::{DEFAULT_RESULT_CAP, SearchIndex};

        let customer = Customer {
            did_number: "1".to_owned(),
            name: String::new(),
            filetitle: String::new(),
            address: String::new(),
            note1: String::new(),
            note2: String::new(),
            note3: String::new(),
            sheet_url: String::new(),
            demand_titles: vec![DemandTitle {
                title: "T1".to_owned(),
                demands: vec![Demand {
                    name: "D1".to_owned(),
                    patient_types: vec![PatientType {
                        name: "P1".to_owned(),
                        actions: vec![action("Clean wound", "Call if fever")],
                    }],
                }],
            }],
        };
        let index = SearchIndex::build(&customer);

        let mut state = SelectionState::default();
        state.dispatch(SelectCommand::LoadCustomers(vec![customer]));
        state.dispatch(SelectCommand::SelectCustomer("1".to_owned()));

        let matches = index.filter("clean", DEFAULT_RESULT_CAP);
        assert_eq!(matches.len(), 1);
        let entry = index.entry(matches[0]).expect("entry");
        state.dispatch(SelectCommand::ApplySearchHit(entry.path));

        assert_eq!(state.selected_title().map(|t| t.title.as_str()), Some("T1"));
        assert_eq!(state.selected_demand().map(|d| d.name.as_str()), Some("D1"));
        assert_eq!(
            state.selected_patient_type().map(|p| p.name.as_str()),
            Some("P1")
        );
        assert_eq!(state.current_actions().len(), 1);
        assert_eq!(state.current_actions()[0].description, "Clean wound");
    }

    #[test]
    fn demand_depth_hit_requests_demand_scroll() {
        let mut state = loaded_state();
        state.dispatch(SelectCommand::SelectCustomer("100".to_owned()));

        state.dispatch(SelectCommand::ApplySearchHit(Some(NodePath {
            title: 0,
            demand: Some(1),
            patient_type: None,
        })));
        assert_eq!(
            state.take_scroll_target(),
            Some(ScrollTarget::Demand { demand: 1 })
        );
        assert!(state.selected_patient_type().is_none());
    }

    #[test]
    fn customer_level_hit_clears_deeper_levels_without_scroll() {
        let mut state = loaded_state();
        drill_to_patient_type(&mut state, "100");

        state.dispatch(SelectCommand::ApplySearchHit(None));
        assert!(state.selected_title().is_none());
        assert!(state.current_actions().is_empty());
        assert_eq!(state.take_scroll_target(), None);
    }

    #[test]
    fn refresh_with_matching_did_replaces_record_and_resets_chain() {
        let mut state = loaded_state();
        drill_to_patient_type(&mut state, "100");

        let mut refreshed = sample_customer("100");
        refreshed.name = "Dr. 100 (refreshed)".to_owned();
        let events = state.dispatch(SelectCommand::ReplaceSelectedCustomer(refreshed));

        assert_eq!(events, vec![SelectEvent::CustomerRefreshed("100".to_owned())]);
        assert_eq!(
            state.selected_customer().map(|c| c.name.as_str()),
            Some("Dr. 100 (refreshed)")
        );
        assert!(state.selected_title().is_none());
        assert!(state.current_actions().is_empty());
    }

    #[test]
    fn refresh_after_reselection_is_discarded() {
        let mut state = loaded_state();
        drill_to_patient_type(&mut state, "100");
        state.dispatch(SelectCommand::SelectCustomer("200".to_owned()));

        let events = state.dispatch(SelectCommand::ReplaceSelectedCustomer(sample_customer(
            "100",
        )));
        assert!(events.is_empty());
        assert_eq!(
            state.selected_customer().map(|c| c.did_number.as_str()),
            Some("200")
        );
    }

    #[test]
    fn wholesale_reload_re_anchors_selection_by_did() {
        let mut state = loaded_state();
        drill_to_patient_type(&mut state, "200");

        let events = state.dispatch(SelectCommand::LoadCustomers(vec![
            sample_customer("200"),
            sample_customer("300"),
        ]));
        assert!(events.contains(&SelectEvent::CustomerSelected("200".to_owned())));
        assert_eq!(state.selected_customer_index(), Some(0));
        assert!(state.selected_title().is_none());
        assert!(state.current_actions().is_empty());
    }

    #[test]
    fn wholesale_reload_clears_vanished_selection() {
        let mut state = loaded_state();
        drill_to_patient_type(&mut state, "100");

        let events = state.dispatch(SelectCommand::LoadCustomers(vec![sample_customer("300")]));
        assert!(events.contains(&SelectEvent::CustomerCleared));
        assert!(state.selected_customer().is_none());
        assert!(state.current_actions().is_empty());
    }

    #[test]
    fn deep_selection_without_prerequisites_fails_inline() {
        let mut state = loaded_state();

        let events = state.dispatch(SelectCommand::SelectTitle(Some(0)));
        assert!(matches!(events[0], SelectEvent::SelectionFailed(_)));

        state.dispatch(SelectCommand::SelectCustomer("100".to_owned()));
        let events = state.dispatch(SelectCommand::SelectDemand(Some(0)));
        assert!(matches!(events[0], SelectEvent::SelectionFailed(_)));
        assert!(state.last_error().is_some());
    }
}
