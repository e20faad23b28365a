// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use fiche_api::{Client, SheetImport};
use fiche_app::{Customer, CustomerFormInput};
use fiche_tui::{AppRuntime, InternalEvent, RefreshRequest, RefreshResult};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

const FALLBACK_IMPORT_MESSAGE: &str = "update triggered";

/// Backend-backed runtime. Gateway calls run on background threads so the
/// view stays responsive while requests are in flight.
pub struct ApiRuntime {
    client: Client,
    debounce: Duration,
    result_cap: usize,
}

impl ApiRuntime {
    pub fn new(client: Client, debounce: Duration, result_cap: usize) -> Self {
        Self {
            client,
            debounce,
            result_cap,
        }
    }
}

impl AppRuntime for ApiRuntime {
    fn list_customers(&mut self) -> Result<Vec<Customer>> {
        Ok(self.client.list_customers()?)
    }

    fn refresh_customer_from_sheet(&mut self, request: &RefreshRequest) -> RefreshResult {
        run_refresh_pipeline(&self.client, request)
    }

    fn submit_new_customer(&mut self, form: &CustomerFormInput) -> Result<String> {
        let receipt = self.client.upsert_from_sheet(&SheetImport {
            name: form.name.clone(),
            did_number: form.did_number.clone(),
            sheet_url: form.sheet_url.clone(),
        })?;
        Ok(receipt_message(receipt.message))
    }

    fn search_debounce(&self) -> Duration {
        self.debounce
    }

    fn result_cap(&self) -> usize {
        self.result_cap
    }

    fn spawn_list_customers(&mut self, request_id: u64, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::spawn(move || {
            let result = client
                .list_customers()
                .map_err(|error| error.to_string());
            let _ = tx.send(InternalEvent::CustomersListed { request_id, result });
        });
        Ok(())
    }

    fn spawn_refresh(
        &mut self,
        request_id: u64,
        request: RefreshRequest,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        thread::spawn(move || {
            let did = request.did.clone();
            let result = run_refresh_pipeline(&client, &request);
            let _ = tx.send(InternalEvent::Refresh {
                request_id,
                did,
                result,
            });
        });
        Ok(())
    }
}

/// Update-from-sheet sequence: trigger the backend import, then re-fetch
/// the record. The two failure modes surface on distinct channels.
fn run_refresh_pipeline(client: &Client, request: &RefreshRequest) -> RefreshResult {
    let receipt = match client.upsert_from_sheet(&SheetImport {
        name: request.name.clone(),
        did_number: request.did.clone(),
        sheet_url: request.sheet_url.clone(),
    }) {
        Ok(receipt) => receipt,
        Err(error) => {
            return RefreshResult::UpdateFailed {
                error: error.to_string(),
            };
        }
    };
    let message = receipt_message(receipt.message);

    match client.get_customer(&request.did) {
        Ok(customer) => RefreshResult::Refreshed {
            message,
            customer: Box::new(customer),
        },
        Err(error) => RefreshResult::FetchFailed {
            message,
            error: error.to_string(),
        },
    }
}

fn receipt_message(message: String) -> String {
    if message.trim().is_empty() {
        FALLBACK_IMPORT_MESSAGE.to_owned()
    } else {
        message
    }
}

/// Offline runtime for `--demo`: the testkit fleet stands in for the
/// backend, writes included.
pub struct DemoRuntime {
    customers: Vec<Customer>,
}

impl DemoRuntime {
    pub fn new(customers: Vec<Customer>) -> Self {
        Self { customers }
    }
}

impl AppRuntime for DemoRuntime {
    fn list_customers(&mut self) -> Result<Vec<Customer>> {
        Ok(self.customers.clone())
    }

    fn refresh_customer_from_sheet(&mut self, request: &RefreshRequest) -> RefreshResult {
        match self
            .customers
            .iter()
            .find(|customer| customer.did_number == request.did)
        {
            Some(customer) => RefreshResult::Refreshed {
                message: "demo data refreshed".to_owned(),
                customer: Box::new(customer.clone()),
            },
            None => RefreshResult::UpdateFailed {
                error: format!("customer {} not present in demo data", request.did),
            },
        }
    }

    fn submit_new_customer(&mut self, form: &CustomerFormInput) -> Result<String> {
        if self
            .customers
            .iter()
            .any(|customer| customer.did_number == form.did_number)
        {
            anyhow::bail!(
                "customer {} already exists in demo data -- use update instead",
                form.did_number
            );
        }
        self.customers.push(Customer {
            did_number: form.did_number.clone(),
            name: form.name.clone(),
            filetitle: String::new(),
            address: String::new(),
            note1: String::new(),
            note2: String::new(),
            note3: String::new(),
            sheet_url: form.sheet_url.clone(),
            demand_titles: Vec::new(),
        });
        Ok(format!("customer {} added to demo data", form.did_number))
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiRuntime, DemoRuntime, run_refresh_pipeline};
    use anyhow::{Result, anyhow};
    use fiche_api::Client;
    use fiche_app::CustomerFormInput;
    use fiche_testkit::sample_customers;
    use fiche_tui::{AppRuntime, RefreshRequest, RefreshResult};
    use std::thread;
    use std::time::Duration;
    use tiny_http::{Header, Response, Server};

    fn json_header() -> Header {
        Header::from_bytes("Content-Type", "application/json").expect("valid content type header")
    }

    fn sample_request() -> RefreshRequest {
        RefreshRequest {
            did: "100".to_owned(),
            name: "Dr. Aubert".to_owned(),
            sheet_url: "https://sheets.example/doc".to_owned(),
        }
    }

    #[test]
    fn demo_runtime_serves_and_refreshes_fleet() -> Result<()> {
        let mut runtime = DemoRuntime::new(sample_customers());
        let customers = runtime.list_customers()?;
        assert!(!customers.is_empty());

        let result = runtime.refresh_customer_from_sheet(&sample_request());
        assert!(matches!(result, RefreshResult::Refreshed { .. }));

        let missing = runtime.refresh_customer_from_sheet(&RefreshRequest {
            did: "999".to_owned(),
            ..sample_request()
        });
        assert!(matches!(missing, RefreshResult::UpdateFailed { .. }));
        Ok(())
    }

    #[test]
    fn demo_runtime_adds_new_customers_once() -> Result<()> {
        let mut runtime = DemoRuntime::new(sample_customers());
        let before = runtime.list_customers()?.len();

        let form = CustomerFormInput {
            name: "Dr. Neuve".to_owned(),
            did_number: "300".to_owned(),
            sheet_url: "https://sheets.example/doc".to_owned(),
        };
        let message = runtime.submit_new_customer(&form)?;
        assert!(message.contains("300"));
        assert_eq!(runtime.list_customers()?.len(), before + 1);

        assert!(runtime.submit_new_customer(&form).is_err());
        Ok(())
    }

    #[test]
    fn refresh_pipeline_fetches_record_after_import() -> Result<()> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}", server.server_addr());

        let handle = thread::spawn(move || {
            let request = server.recv().expect("import request expected");
            assert_eq!(request.url(), "/customers/create-or-update-from-sheet/");
            request
                .respond(
                    Response::from_string(r#"{"message":"import triggered"}"#)
                        .with_status_code(200)
                        .with_header(json_header()),
                )
                .expect("respond to import");

            let request = server.recv().expect("fetch request expected");
            assert_eq!(request.url(), "/customers/100/");
            request
                .respond(
                    Response::from_string(r#"{"did_number":"100","name":"Dr. Aubert"}"#)
                        .with_status_code(200)
                        .with_header(json_header()),
                )
                .expect("respond to fetch");
        });

        let client = Client::new(&addr, Duration::from_secs(1))?;
        let result = run_refresh_pipeline(&client, &sample_request());
        match result {
            RefreshResult::Refreshed { message, customer } => {
                assert_eq!(message, "import triggered");
                assert_eq!(customer.did_number, "100");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn refresh_pipeline_reports_update_failure_verbatim() -> Result<()> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}", server.server_addr());

        let handle = thread::spawn(move || {
            let request = server.recv().expect("import request expected");
            request
                .respond(
                    Response::from_string(r#"{"error":"sheet is not shared"}"#)
                        .with_status_code(400)
                        .with_header(json_header()),
                )
                .expect("respond to import");
        });

        let client = Client::new(&addr, Duration::from_secs(1))?;
        let result = run_refresh_pipeline(&client, &sample_request());
        assert!(matches!(
            result,
            RefreshResult::UpdateFailed { ref error } if error.contains("sheet is not shared")
        ));

        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn refresh_pipeline_separates_fetch_failure_from_update_failure() -> Result<()> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}", server.server_addr());

        let handle = thread::spawn(move || {
            let request = server.recv().expect("import request expected");
            request
                .respond(
                    Response::from_string(r#"{"message":"import triggered"}"#)
                        .with_status_code(200)
                        .with_header(json_header()),
                )
                .expect("respond to import");

            let request = server.recv().expect("fetch request expected");
            request
                .respond(
                    Response::from_string(r#"{"detail":"database offline"}"#)
                        .with_status_code(500)
                        .with_header(json_header()),
                )
                .expect("respond to fetch");
        });

        let client = Client::new(&addr, Duration::from_secs(1))?;
        let result = run_refresh_pipeline(&client, &sample_request());
        assert!(matches!(
            result,
            RefreshResult::FetchFailed { ref message, ref error }
                if message == "import triggered" && error.contains("database offline")
        ));

        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn api_runtime_reports_configured_search_settings() -> Result<()> {
        let client = Client::new("http://127.0.0.1:1", Duration::from_millis(50))?;
        let runtime = ApiRuntime::new(client, Duration::from_millis(150), 7);
        assert_eq!(runtime.search_debounce(), Duration::from_millis(150));
        assert_eq!(runtime.result_cap(), 7);
        Ok(())
    }
}
