// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use fiche_app::{Action, Customer, Demand, DemandTitle, PatientType};

const PRACTITIONER_NAMES: [&str; 12] = [
    "Dr. Aubert",
    "Dr. Morel",
    "Dr. Blanc",
    "Dr. Garnier",
    "Dr. Faure",
    "Dr. Chevalier",
    "Dr. Lambert",
    "Dr. Rousseau",
    "Dr. Fontaine",
    "Dr. Caron",
    "Dr. Perrot",
    "Dr. Marchand",
];

const DEMAND_TITLES: [&str; 8] = [
    "Plaies",
    "Perfusions",
    "Injections",
    "Prelevements",
    "Diabete",
    "Post-operatoire",
    "Surveillance",
    "Soins palliatifs",
];

const DEMAND_NAMES: [&str; 10] = [
    "Pansement simple",
    "Pansement complexe",
    "Perfusion courte",
    "Perfusion longue duree",
    "Injection sous-cutanee",
    "Injection intramusculaire",
    "Prise de sang",
    "Glycemie capillaire",
    "Ablation de fils",
    "Pose de sonde",
];

const PATIENT_TYPE_NAMES: [&str; 6] = [
    "Adulte",
    "Enfant",
    "Diabetique",
    "Sous anticoagulant",
    "Immunodeprime",
    "A domicile",
];

const ACTION_DESCRIPTIONS: [&str; 10] = [
    "Nettoyer la plaie au serum physiologique",
    "Changer le pansement tous les deux jours",
    "Verifier le point de ponction",
    "Controler la glycemie avant le soin",
    "Noter le volume perfuse",
    "Desinfecter avec antiseptique incolore",
    "Surveiller les signes d'infection",
    "Peser le patient une fois par semaine",
    "Verifier la date de peremption du produit",
    "Tracer le soin dans le dossier",
];

const DIRE_TEXTS: [&str; 5] = [
    "Appeler le cabinet si fievre",
    "Prevenir en cas de saignement",
    "Dire au patient de rester a jeun",
    "Rappeler la date du prochain passage",
    "Signaler toute douleur inhabituelle",
];

const STREET_NAMES: [&str; 6] = [
    "rue des Lilas",
    "avenue Pasteur",
    "place du Marche",
    "rue Victor Hugo",
    "boulevard Carnot",
    "chemin des Vignes",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Deterministic fleet generator: the same seed always yields the same
/// customers, so tests and demo mode are reproducible.
#[derive(Debug, Clone)]
pub struct FicheFaker {
    rng: DeterministicRng,
}

impl FicheFaker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: DeterministicRng::new(if seed == 0 { 1 } else { seed }),
        }
    }

    fn pick<'a>(&mut self, pool: &[&'a str]) -> &'a str {
        pool[self.rng.int_n(pool.len())]
    }

    pub fn customer(&mut self, index: usize) -> Customer {
        let name = PRACTITIONER_NAMES[index % PRACTITIONER_NAMES.len()];
        let surname = name.trim_start_matches("Dr. ");
        let did = (100 + index as u64 * 11).to_string();
        let title_count = 1 + self.rng.int_n(3);

        Customer {
            did_number: did.clone(),
            name: name.to_owned(),
            filetitle: format!("{}-{surname}", index + 1),
            address: format!("{} {}", 1 + self.rng.int_n(40), self.pick(&STREET_NAMES)),
            note1: format!("Cabinet {surname}"),
            note2: "Passage le matin de preference".to_owned(),
            note3: String::new(),
            sheet_url: format!("https://docs.google.com/spreadsheets/d/fiche-{did}"),
            demand_titles: (0..title_count)
                .map(|title_index| self.demand_title(title_index))
                .collect(),
        }
    }

    fn demand_title(&mut self, index: usize) -> DemandTitle {
        let demand_count = 1 + self.rng.int_n(3);
        DemandTitle {
            title: DEMAND_TITLES[index % DEMAND_TITLES.len()].to_owned(),
            demands: (0..demand_count).map(|_| self.demand()).collect(),
        }
    }

    fn demand(&mut self) -> Demand {
        let patient_type_count = self.rng.int_n(3);
        Demand {
            name: self.pick(&DEMAND_NAMES).to_owned(),
            patient_types: (0..patient_type_count)
                .map(|_| self.patient_type())
                .collect(),
        }
    }

    fn patient_type(&mut self) -> PatientType {
        let action_count = 1 + self.rng.int_n(3);
        PatientType {
            name: self.pick(&PATIENT_TYPE_NAMES).to_owned(),
            actions: (0..action_count).map(|_| self.action()).collect(),
        }
    }

    fn action(&mut self) -> Action {
        let dire_text = if self.rng.int_n(2) == 0 {
            self.pick(&DIRE_TEXTS).to_owned()
        } else {
            String::new()
        };
        Action {
            description: self.pick(&ACTION_DESCRIPTIONS).to_owned(),
            dire_text,
        }
    }
}

/// Demo fleet used by `--demo` and the heavier tests. Always contains
/// `wound_care_customer` first so known nodes exist to search for.
pub fn sample_customers() -> Vec<Customer> {
    let mut faker = FicheFaker::new(7);
    let mut customers = vec![wound_care_customer()];
    customers.extend((1..8).map(|index| faker.customer(index)));
    customers
}

/// Fixed single-customer tree carrying the awkward shapes: multi-line dire
/// text, an action-less patient type, and two actions that share a
/// description.
pub fn wound_care_customer() -> Customer {
    customer(
        "100",
        "Dr. Aubert",
        "1-Aubert",
        vec![
            title(
                "Plaies",
                vec![
                    demand(
                        "Pansement simple",
                        vec![
                            patient_type(
                                "Adulte",
                                vec![
                                    action(
                                        "Nettoyer la plaie au serum physiologique",
                                        "Appeler le cabinet si fievre",
                                    ),
                                    action("Changer le pansement tous les deux jours", ""),
                                    action("Changer le pansement tous les deux jours", ""),
                                ],
                            ),
                            patient_type("Enfant", Vec::new()),
                        ],
                    ),
                    demand(
                        "Pansement complexe",
                        vec![patient_type(
                            "Sous anticoagulant",
                            vec![action(
                                "Surveiller les signes d'infection",
                                "Prevenir en cas de saignement<br>Noter l'heure",
                            )],
                        )],
                    ),
                ],
            ),
            title(
                "Perfusions",
                vec![demand("Perfusion courte", Vec::new())],
            ),
        ],
    )
}

pub fn customer(
    did: &str,
    name: &str,
    filetitle: &str,
    demand_titles: Vec<DemandTitle>,
) -> Customer {
    Customer {
        did_number: did.to_owned(),
        name: name.to_owned(),
        filetitle: filetitle.to_owned(),
        address: "4 rue des Lilas".to_owned(),
        note1: String::new(),
        note2: String::new(),
        note3: String::new(),
        sheet_url: format!("https://docs.google.com/spreadsheets/d/fiche-{did}"),
        demand_titles,
    }
}

pub fn title(title_text: &str, demands: Vec<Demand>) -> DemandTitle {
    DemandTitle {
        title: title_text.to_owned(),
        demands,
    }
}

pub fn demand(name: &str, patient_types: Vec<PatientType>) -> Demand {
    Demand {
        name: name.to_owned(),
        patient_types,
    }
}

pub fn patient_type(name: &str, actions: Vec<Action>) -> PatientType {
    PatientType {
        name: name.to_owned(),
        actions,
    }
}

pub fn action(description: &str, dire_text: &str) -> Action {
    Action {
        description: description.to_owned(),
        dire_text: dire_text.to_owned(),
    }
}
