//! Building the core service from host-provided bridges.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{
    HttpClient, HttpRequest, HttpResponse, InlineQueue, SignInFlowId, SignInPresenter,
};
use core_runtime::events::{AuthEvent, NetworkEvent};
use core_service::{
    CoreConfig, CoreError, CoreEvent, CoreService, GateState, NetworkError, ServiceConfig,
};
use mockall::mock;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;

const USER: &str =
    r#"{"id":7,"email":"c@d.com","first_name":"Cy","last_name":"Dee","phone_number":"555"}"#;

mock! {
    Presenter {}

    impl SignInPresenter for Presenter {
        fn present_sign_in(&self, flow: SignInFlowId);
        fn dismiss_sign_in(&self, flow: SignInFlowId);
    }
}

#[derive(Default)]
struct Backend {
    replies: Mutex<VecDeque<HttpResponse>>,
    urls: Mutex<Vec<String>>,
}

#[async_trait]
impl HttpClient for Backend {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        self.urls.lock().push(request.url.clone());
        if request.url.ends_with("/login") {
            return Ok(HttpResponse::new(200, USER.as_bytes().to_vec()));
        }
        self.replies
            .lock()
            .pop_front()
            .ok_or_else(|| BridgeError::Connection("no scripted reply".to_string()))
    }
}

struct PromptForwarder(mpsc::UnboundedSender<SignInFlowId>);

impl SignInPresenter for PromptForwarder {
    fn present_sign_in(&self, flow: SignInFlowId) {
        let _ = self.0.send(flow);
    }

    fn dismiss_sign_in(&self, _flow: SignInFlowId) {}
}

fn service_urls() -> ServiceConfig {
    ServiceConfig::new("https://auth.example.com/api", "https://api.example.com/v1").unwrap()
}

fn config(backend: Arc<Backend>, presenter: Arc<dyn SignInPresenter>) -> CoreConfig {
    CoreConfig::builder()
        .service(service_urls())
        .http_client(backend)
        .callback_queue(InlineQueue::shared())
        .presenter(presenter)
        .event_buffer_size(32)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_gate_is_shared_with_resource_client() {
    let mut presenter = MockPresenter::new();
    presenter.expect_present_sign_in().times(0);
    let core = CoreService::new(config(Arc::default(), Arc::new(presenter))).unwrap();

    assert!(Arc::ptr_eq(core.auth(), core.resources().gate()));
    assert_eq!(core.auth().state(), GateState::NoSession);
    assert_eq!(core.config().event_buffer_size, 32);
}

#[tokio::test]
async fn test_invalid_buffer_size_is_a_config_error() {
    let mut config = config(Arc::default(), Arc::new(MockPresenter::new()));
    config.event_buffer_size = 0;

    assert!(matches!(CoreService::new(config), Err(CoreError::Config(_))));
}

#[test]
fn test_missing_presenter_is_reported_as_capability() {
    let result = CoreConfig::builder()
        .service(service_urls())
        .http_client(Arc::new(Backend::default()))
        .callback_queue(InlineQueue::shared())
        .build()
        .map_err(CoreError::from);

    assert!(matches!(
        result,
        Err(CoreError::CapabilityMissing { ref capability, .. }) if capability == "SignInPresenter"
    ));
}

#[tokio::test]
async fn test_resource_call_prompts_once_and_reports_events() {
    let backend = Arc::new(Backend::default());
    backend
        .replies
        .lock()
        .push_back(HttpResponse::new(401, Vec::<u8>::new()));
    backend
        .replies
        .lock()
        .push_back(HttpResponse::new(200, b"[]".to_vec()));

    let (tx, mut prompts) = mpsc::unbounded_channel();
    let core = CoreService::new(config(backend.clone(), Arc::new(PromptForwarder(tx)))).unwrap();
    let mut events = core.subscribe_events();

    let gate = Arc::clone(core.auth());
    let user = tokio::spawn(async move {
        let mut answered = 0;
        while prompts.recv().await.is_some() {
            answered += 1;
            let _ = gate.sign_in_requested("c@d.com", "pw").await;
        }
        answered
    });

    assert_eq!(core.resources().get_quotes().await, Ok(Vec::new()));
    assert_eq!(core.auth().current_user().map(|u| u.id), Some(7));

    let mut seen = Vec::new();
    while let Some(Ok(event)) = events.try_recv() {
        seen.push(event);
    }
    assert!(seen.contains(&CoreEvent::Auth(AuthEvent::SessionInvalidated)));
    assert!(seen
        .iter()
        .any(|e| matches!(e, CoreEvent::Network(NetworkEvent::AuthRetry { .. }))));

    let urls = backend.urls.lock().clone();
    assert_eq!(urls.first().map(String::as_str), Some("https://auth.example.com/api/login"));
    assert_eq!(urls.iter().filter(|u| u.ends_with("/v1/quotes")).count(), 2);

    drop(core);
    user.abort();
}

#[tokio::test]
async fn test_errors_convert_into_core_error() {
    let err: CoreError = NetworkError::UserCancelled.into();
    assert!(matches!(err, CoreError::Network(NetworkError::UserCancelled)));
    assert!(err.to_string().contains("Network error"));
}
