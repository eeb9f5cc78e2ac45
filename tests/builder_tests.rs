use kapi::signature::{sign, SIGNATURE_KEY};
use kapi::{
    Client, Config, Executor, ListResponse, Params, RawResponse, RequestBuilder,
    RequestDescriptor, RequestState, RestError,
};
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::sync::{Arc, Mutex};

#[derive(Debug, Deserialize, PartialEq)]
struct MediaEntry {
    id: String,
    name: String,
}

/// Collects every outcome delivered to a completion
fn recorder<T: Send + 'static>() -> (Arc<Mutex<Vec<kapi::Result<T>>>>, impl FnMut(kapi::Result<T>) + Send + 'static) {
    let outcomes = Arc::new(Mutex::new(Vec::new()));
    let sink = outcomes.clone();
    (outcomes, move |outcome| sink.lock().unwrap().push(outcome))
}

/// Executor answering every request with a canned response
struct StaticExecutor {
    response: RawResponse,
    seen: Mutex<Vec<RequestDescriptor>>,
}

impl StaticExecutor {
    fn new(response: RawResponse) -> Self {
        StaticExecutor {
            response,
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl Executor for &StaticExecutor {
    fn execute(&self, request: &RequestDescriptor) -> RawResponse {
        self.seen.lock().unwrap().push(request.clone());
        self.response.clone()
    }
}

fn clip_builder() -> RequestBuilder<MediaEntry> {
    RequestBuilder::new("media", "add").with_params(Params::new().with("name", "clip"))
}

#[test]
fn test_build_without_configuration() {
    let mut builder = clip_builder();
    let request = builder.build(None, false);

    assert_eq!(request.method(), "POST");
    assert_eq!(request.header("Accept"), Some("application/json"));
    assert!(request.header("Accept-Charset").is_some());
    assert_eq!(
        request.url(),
        format!("{}{}{}", kapi::client::DEFAULT_ENDPOINT, kapi::request::URL_API_VERSION, "service/media/action/add")
    );
    assert_eq!(request.params().get_str("name"), Some("clip"));
    assert!(!request.params().contains_key(SIGNATURE_KEY));
}

#[test]
fn test_build_with_signature() {
    let mut builder = clip_builder();
    let unsigned_body = builder.build(None, false).body().to_string();

    let request = builder.build(None, true);
    let expected = sign(&unsigned_body);
    assert_eq!(request.params().get_str(SIGNATURE_KEY), Some(expected.as_str()));
    assert_eq!(request.signature(), Some(expected.as_str()));
    assert!(request.body().contains(&format!(r#""kalsig":"{}""#, expected)));
}

#[test]
fn test_failure_response_delivers_error() {
    let (outcomes, completion) = recorder::<MediaEntry>();
    let mut builder = clip_builder();
    builder.set_completion(completion);

    builder.build(None, false);
    builder
        .on_complete(&RawResponse::failure(Some(500), r#"{"code":"ERR","message":"bad id"}"#))
        .unwrap();

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes.len(), 1);
    let error = outcomes[0].as_ref().unwrap_err();
    assert_eq!(error.message(), "bad id");
    assert_eq!(error.code(), Some("ERR"));
}

#[test]
fn test_success_response_delivers_result() {
    let (outcomes, completion) = recorder::<MediaEntry>();
    let mut builder = clip_builder();
    builder.set_completion(completion);

    builder.build(None, false);
    builder
        .on_complete(&RawResponse::success(r#"{"id":"123","name":"clip"}"#))
        .unwrap();

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(
        outcomes[0].as_ref().unwrap(),
        &MediaEntry { id: "123".to_string(), name: "clip".to_string() }
    );
}

#[test]
fn test_malformed_success_delivers_error() {
    let (outcomes, completion) = recorder::<MediaEntry>();
    let mut builder = clip_builder();
    builder.set_completion(completion);

    builder.build(None, false);
    builder.on_complete(&RawResponse::success("not json")).unwrap();

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(matches!(outcomes[0], Err(RestError::Parse { .. })));
}

#[test]
fn test_resolution_without_completion() {
    let mut builder = clip_builder();
    builder.build(None, false);
    builder
        .on_complete(&RawResponse::success(r#"{"id":"1","name":"a"}"#))
        .unwrap();

    assert_eq!(builder.state(), RequestState::Resolved);
    let entry = builder.take_outcome().unwrap().unwrap();
    assert_eq!(entry.id, "1");
    assert!(builder.take_outcome().is_none());
}

#[test]
fn test_second_resolution_is_rejected() {
    let (outcomes, completion) = recorder::<MediaEntry>();
    let mut builder = clip_builder();
    builder.set_completion(completion);

    builder.build(None, false);
    let response = RawResponse::success(r#"{"id":"1","name":"a"}"#);
    builder.on_complete(&response).unwrap();
    assert!(matches!(builder.on_complete(&response), Err(RestError::NotPending)));
    assert_eq!(outcomes.lock().unwrap().len(), 1);

    // a fresh build opens a new resolution
    builder.build(None, false);
    builder.on_complete(&response).unwrap();
    assert_eq!(outcomes.lock().unwrap().len(), 2);
}

#[test]
fn test_resolution_on_another_thread() {
    let (outcomes, completion) = recorder::<MediaEntry>();
    let mut builder = clip_builder();
    builder.set_completion(completion);
    let request = builder.build(None, false);

    let handle = std::thread::spawn(move || {
        assert_eq!(request.tag(), "media.add");
        builder
            .on_complete(&RawResponse::success(r#"{"id":"7","name":"clip"}"#))
            .unwrap();
    });
    handle.join().unwrap();

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes[0].as_ref().unwrap().id, "7");
}

#[tokio::test]
async fn test_resolution_on_async_task() {
    let mut builder: RequestBuilder<bool> = RequestBuilder::new("system", "ping");
    let (tx, rx) = tokio::sync::oneshot::channel();
    let mut tx = Some(tx);
    builder.set_completion(move |outcome| {
        if let Some(tx) = tx.take() {
            let _ = tx.send(outcome);
        }
    });
    builder.build(None, false);

    tokio::spawn(async move {
        builder.on_complete(&RawResponse::success("true")).unwrap();
    });

    assert!(rx.await.unwrap().unwrap());
}

#[test]
fn test_serialization_ignores_insertion_order() {
    let mut entries: Vec<(String, i64)> = (0..32).map(|i| (format!("key{}", i), i)).collect();
    let ordered: Params = entries.iter().cloned().collect();

    let mut rng = rand::thread_rng();
    for _ in 0..8 {
        entries.shuffle(&mut rng);
        let shuffled: Params = entries.iter().cloned().collect();
        assert_eq!(shuffled.serialize(), ordered.serialize());
        assert_eq!(sign(&shuffled.serialize()), sign(&ordered.serialize()));
    }
}

#[test]
fn test_client_queue_merges_configuration() {
    let executor = StaticExecutor::new(RawResponse::success(r#"{"id":"0_a","name":"clip"}"#));
    let config = Config::default().with_ks("djJ8MTIz").with_signing(true);
    let client = Client::with_executor(config, &executor);

    let (outcomes, completion) = recorder::<MediaEntry>();
    let mut builder = clip_builder();
    builder.set_completion(completion);
    client.queue(&mut builder).unwrap();

    assert_eq!(outcomes.lock().unwrap()[0].as_ref().unwrap().id, "0_a");

    let seen = executor.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let params = seen[0].params();
    assert_eq!(params.get_str("ks"), Some("djJ8MTIz"));
    assert_eq!(params.get_str("name"), Some("clip"));
    assert!(params.get_str("clientTag").is_some());
    assert!(kapi::signature::verify(params));
}

#[test]
fn test_client_apply_list() {
    let body = r#"{"objects":[{"id":"0_a","name":"a"},{"id":"0_b","name":"b"}],"totalCount":2,"objectType":"KalturaMediaListResponse"}"#;
    let executor = StaticExecutor::new(RawResponse::success(body));
    let client = Client::with_executor(Config::default(), &executor);

    let list: ListResponse<MediaEntry> = client.apply(RequestBuilder::new("media", "list")).unwrap();
    assert_eq!(list.total_count, 2);
    assert_eq!(list.objects[1].name, "b");
}

#[test]
fn test_client_apply_server_exception() {
    let body = r#"{"code":"INVALID_KS","message":"Invalid KS","objectType":"KalturaAPIException"}"#;
    let executor = StaticExecutor::new(RawResponse::success(body));
    let client = Client::with_executor(Config::default(), &executor);

    let error = client.apply(clip_builder()).unwrap_err();
    assert!(error.is_invalid_session());
}
