use crate::diff::{decide, Verdict};
use crate::EngineError;
use hitch_spec::{Record, ResourceId, Specification};
use hitch_transport::{Transport, WireRequest};
use tracing::{debug, info};

/// The sole status code treated as success. The engine has no schema for
/// what an arbitrary endpoint considers success, so it takes the strictest
/// unambiguous rule instead of guessing at 2xx ranges.
const SUCCESS_STATUS: u16 = 200;

/// Result of one reconciliation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The prior record still satisfies the specification. Nothing was sent;
    /// the caller keeps its record as-is.
    Unchanged,
    /// An exchange happened and succeeded. The caller persists this record
    /// verbatim, replacing any prior one wholesale.
    Applied(Record),
}

/// Orchestrates the single HTTP exchange that reconciles desired state into
/// a new record.
///
/// The transport is injected and owned by the host; the reconciler holds no
/// shared mutable state and is safe to use concurrently for different
/// specifications. Serializing cycles for the *same* resource is the
/// caller's job.
pub struct Reconciler<'t> {
    transport: &'t dyn Transport,
}

impl<'t> Reconciler<'t> {
    pub fn new(transport: &'t dyn Transport) -> Self {
        Self { transport }
    }

    /// One Decide-then-maybe-Apply pass.
    ///
    /// On `Unchanged` no request is issued. On a successful apply over a
    /// prior record, `created_at` carries over and only `updated_at` is
    /// fresh. Failures leave any prior record exactly as it was.
    pub fn reconcile(
        &self,
        desired: &Specification,
        previous: Option<&Record>,
    ) -> Result<Outcome, EngineError> {
        match decide(desired, previous) {
            Verdict::Unchanged => {
                debug!("{} unchanged, skipping exchange", desired.url);
                Ok(Outcome::Unchanged)
            }
            verdict => {
                debug!("{} verdict {verdict:?}, applying", desired.url);
                let mut record = self.apply(desired)?;
                if let Some(prev) = previous {
                    record.created_at = prev.created_at.clone();
                }
                Ok(Outcome::Applied(record))
            }
        }
    }

    /// Perform exactly one HTTP exchange and build the replacement record.
    ///
    /// Invoked only when `decide` returned `NoPriorState` or `Changed`.
    pub fn apply(&self, desired: &Specification) -> Result<Record, EngineError> {
        // 1. Validate before any I/O.
        desired.validate()?;

        // 2. Build the wire request: headers in sorted order, body attached
        //    regardless of method, nothing injected implicitly.
        let request = WireRequest {
            method: desired.method,
            url: desired.url.clone(),
            body: desired.payload.clone(),
            headers: desired
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };

        // 3. One synchronous exchange, no retry. Connect and body-read
        //    failures classify separately and produce no record.
        let response = self.transport.exchange(&request)?;

        // 4. Exactly 200 is success. Anything else surfaces the code and the
        //    full body, and never overwrites a prior good record.
        if response.status != SUCCESS_STATUS {
            return Err(EngineError::Status {
                status: response.status,
                body: response.body,
            });
        }

        // 5. Build the replacement record from the response.
        info!("{} {} applied", desired.method, desired.url);
        let now = chrono::Utc::now().to_rfc3339();
        Ok(Record {
            id: ResourceId::new(desired.url.clone()),
            url: desired.url.clone(),
            method: desired.method,
            payload: desired.payload.clone(),
            headers: desired.headers.clone(),
            response_body: response.body,
            status_code: response.status,
            created_at: now.clone(),
            updated_at: now,
            checksum: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hitch_spec::Method;
    use hitch_transport::{TransportError, WireResponse};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Scripted transport: pops the next canned result per exchange and
    /// captures every request it sees.
    struct MockTransport {
        responses: Mutex<Vec<Result<WireResponse, TransportError>>>,
        requests: Mutex<Vec<WireRequest>>,
    }

    impl MockTransport {
        fn new(responses: Vec<Result<WireResponse, TransportError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn returning(status: u16, body: &str) -> Self {
            Self::new(vec![Ok(WireResponse {
                status,
                body: body.to_owned(),
            })])
        }

        fn exchange_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn last_request(&self) -> WireRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Transport for MockTransport {
        fn exchange(&self, request: &WireRequest) -> Result<WireResponse, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Ok(WireResponse {
                    status: 200,
                    body: "ok".to_owned(),
                });
            }
            responses.remove(0)
        }
    }

    fn widget_spec() -> Specification {
        Specification {
            url: "https://api.example.com/widgets".to_owned(),
            method: Method::Post,
            payload: r#"{"n":1}"#.to_owned(),
            headers: BTreeMap::new(),
        }
    }

    #[test]
    fn first_apply_builds_record_from_response() {
        let transport = MockTransport::returning(200, "ok");
        let reconciler = Reconciler::new(&transport);

        let record = reconciler.apply(&widget_spec()).unwrap();
        assert_eq!(record.id, *"https://api.example.com/widgets");
        assert_eq!(record.url, "https://api.example.com/widgets");
        assert_eq!(record.method, Method::Post);
        assert_eq!(record.payload, r#"{"n":1}"#);
        assert_eq!(record.response_body, "ok");
        assert_eq!(record.status_code, 200);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn unchanged_spec_skips_the_exchange() {
        let transport = MockTransport::returning(200, "ok");
        let reconciler = Reconciler::new(&transport);

        let spec = widget_spec();
        let record = reconciler.apply(&spec).unwrap();
        assert_eq!(transport.exchange_count(), 1);

        let outcome = reconciler.reconcile(&spec, Some(&record)).unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(transport.exchange_count(), 1, "no second request");
    }

    #[test]
    fn no_prior_state_applies() {
        let transport = MockTransport::returning(200, "ok");
        let reconciler = Reconciler::new(&transport);

        let outcome = reconciler.reconcile(&widget_spec(), None).unwrap();
        assert!(matches!(outcome, Outcome::Applied(_)));
        assert_eq!(transport.exchange_count(), 1);
    }

    #[test]
    fn changed_payload_with_failing_endpoint_keeps_prior_record() {
        let transport = MockTransport::returning(200, "ok");
        let reconciler = Reconciler::new(&transport);
        let spec = widget_spec();
        let record = reconciler.apply(&spec).unwrap();

        // Same resource, new payload, endpoint now failing.
        let failing = MockTransport::returning(500, "server error");
        let reconciler = Reconciler::new(&failing);
        let mut desired = spec;
        desired.payload = r#"{"n":2}"#.to_owned();

        let err = reconciler.reconcile(&desired, Some(&record)).unwrap_err();
        match err {
            EngineError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "server error");
            }
            other => panic!("expected Status, got {other:?}"),
        }
        // The caller still holds the original record, untouched.
        assert_eq!(record.response_body, "ok");
        assert_eq!(record.payload, r#"{"n":1}"#);
    }

    #[test]
    fn header_change_reapplies_and_replaces_wholesale() {
        let transport = MockTransport::returning(200, "ok");
        let reconciler = Reconciler::new(&transport);
        let spec = widget_spec();
        let record = reconciler.apply(&spec).unwrap();

        let next = MockTransport::returning(200, "ok2");
        let reconciler = Reconciler::new(&next);
        let mut desired = spec;
        desired
            .headers
            .insert("X-Key".to_owned(), "abc".to_owned());

        let outcome = reconciler.reconcile(&desired, Some(&record)).unwrap();
        let Outcome::Applied(new_record) = outcome else {
            panic!("expected Applied");
        };
        assert_eq!(new_record.response_body, "ok2");
        assert_eq!(new_record.headers.get("X-Key").unwrap(), "abc");
        let sent = next.last_request();
        assert_eq!(sent.headers, vec![("X-Key".to_owned(), "abc".to_owned())]);
    }

    #[test]
    fn non_success_statuses_never_produce_a_record() {
        for status in [301, 404, 500, 201, 204] {
            let transport = MockTransport::returning(status, "nope");
            let reconciler = Reconciler::new(&transport);
            let err = reconciler.apply(&widget_spec()).unwrap_err();
            assert!(
                matches!(err, EngineError::Status { status: s, .. } if s == status),
                "status {status} must classify as a status failure"
            );
        }
    }

    #[test]
    fn transport_failure_classifies_as_transport() {
        let transport =
            MockTransport::new(vec![Err(TransportError::Connect("refused".to_owned()))]);
        let reconciler = Reconciler::new(&transport);
        let err = reconciler.apply(&widget_spec()).unwrap_err();
        assert!(matches!(err, EngineError::Transport(_)));
    }

    #[test]
    fn body_read_failure_classifies_separately() {
        let transport =
            MockTransport::new(vec![Err(TransportError::BodyRead("eof".to_owned()))]);
        let reconciler = Reconciler::new(&transport);
        let err = reconciler.apply(&widget_spec()).unwrap_err();
        assert!(matches!(err, EngineError::BodyRead(_)));
    }

    #[test]
    fn invalid_url_fails_before_any_io() {
        let transport = MockTransport::returning(200, "ok");
        let reconciler = Reconciler::new(&transport);
        let mut spec = widget_spec();
        spec.url = "not a url".to_owned();

        let err = reconciler.apply(&spec).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(transport.exchange_count(), 0, "validation must precede I/O");
    }

    #[test]
    fn idempotent_reapply_yields_identical_records() {
        let spec = widget_spec();

        let transport = MockTransport::returning(200, "B");
        let first = Reconciler::new(&transport).apply(&spec).unwrap();
        let transport = MockTransport::returning(200, "B");
        let second = Reconciler::new(&transport).apply(&spec).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.url, second.url);
        assert_eq!(first.method, second.method);
        assert_eq!(first.payload, second.payload);
        assert_eq!(first.headers, second.headers);
        assert_eq!(first.response_body, second.response_body);
        assert_eq!(first.status_code, second.status_code);
    }

    #[test]
    fn reapply_carries_created_at_forward() {
        let transport = MockTransport::returning(200, "ok");
        let reconciler = Reconciler::new(&transport);
        let spec = widget_spec();
        let mut record = reconciler.apply(&spec).unwrap();
        record.created_at = "2020-06-15T12:00:00+00:00".to_owned();

        let mut desired = spec;
        desired.payload = r#"{"n":3}"#.to_owned();
        let outcome = reconciler.reconcile(&desired, Some(&record)).unwrap();
        let Outcome::Applied(new_record) = outcome else {
            panic!("expected Applied");
        };
        assert_eq!(new_record.created_at, "2020-06-15T12:00:00+00:00");
        assert_ne!(new_record.updated_at, new_record.created_at);
    }

    #[test]
    fn body_is_sent_for_bodiless_methods_too() {
        let transport = MockTransport::returning(200, "ok");
        let reconciler = Reconciler::new(&transport);
        let mut spec = widget_spec();
        spec.method = Method::Get;
        spec.payload = "still sent".to_owned();

        reconciler.apply(&spec).unwrap();
        let sent = transport.last_request();
        assert_eq!(sent.method, Method::Get);
        assert_eq!(sent.body, "still sent");
    }

    #[test]
    fn headers_arrive_sorted_at_the_transport() {
        let transport = MockTransport::returning(200, "ok");
        let reconciler = Reconciler::new(&transport);
        let mut spec = widget_spec();
        spec.headers.insert("X-Zulu".to_owned(), "z".to_owned());
        spec.headers.insert("X-Alpha".to_owned(), "a".to_owned());
        spec.headers.insert("X-Mike".to_owned(), "m".to_owned());

        reconciler.apply(&spec).unwrap();
        let sent = transport.last_request();
        let names: Vec<&str> = sent.headers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["X-Alpha", "X-Mike", "X-Zulu"]);
    }
}
