use example_rrpc_service_definition::echo::{
    Chat, IDEMPOTENT, Log, Ping, Repeat, RepeatRequest, Say,
};
use futures::future;
use futures::stream::{self, StreamExt};
use rrpc::{
    CallContext, ClientMetadata, DataVariant, InstanceContainer, InstanceKey, OptionKey, Options,
    Payload, PayloadStream, ProtocolViolation, ProvidableInstance, RpcError, RpcMetadata,
    RpcProcedure, RpcTransport, ServerMetadata, instance_key, interceptor_fn,
};
use rrpc_client::{RpcClientEngine, RpcClientModule, RpcProcedureCall};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// --- Test Setup: Mock Transport ---

/// Records every frame the engine hands over and answers with scripted frames.
#[derive(Default)]
struct MockTransport {
    sent: Arc<Mutex<Vec<Payload>>>,
    /// Outgoing channel errors, with the number of frames sent before each.
    failed: Arc<Mutex<Vec<(usize, String)>>>,
    pushed: Mutex<Vec<Vec<u8>>>,
    unary_reply: Mutex<Option<Payload>>,
    stream_reply: Mutex<Vec<Payload>>,
    calls: AtomicUsize,
}

impl MockTransport {
    fn replying(payload: Payload) -> Arc<Self> {
        let transport = Self::default();
        *transport.unary_reply.lock().unwrap() = Some(payload);
        Arc::new(transport)
    }

    fn streaming(frames: Vec<Payload>) -> Arc<Self> {
        let transport = Self::default();
        *transport.stream_reply.lock().unwrap() = frames;
        Arc::new(transport)
    }

    fn sent(&self) -> Vec<Payload> {
        self.sent.lock().unwrap().clone()
    }

    fn reply_frames(&self) -> PayloadStream {
        let frames: Vec<_> = self.stream_reply.lock().unwrap().drain(..).map(Ok).collect();
        stream::iter(frames).boxed()
    }
}

#[async_trait::async_trait]
impl RpcTransport for MockTransport {
    async fn request_response(&self, payload: Payload) -> Result<Payload, io::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(payload);
        self.unary_reply
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no reply scripted"))
    }

    fn request_stream(&self, payload: Payload) -> PayloadStream {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(payload);
        self.reply_frames()
    }

    fn request_channel(&self, payloads: PayloadStream) -> PayloadStream {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let replies = self.reply_frames();
        let recorder = Arc::clone(&self.sent);
        let failures = Arc::clone(&self.failed);

        // Drain the outgoing side before replying.
        stream::once(async move {
            let frames: Vec<_> = payloads.collect().await;
            let mut sent = recorder.lock().unwrap();
            for frame in frames {
                match frame {
                    Ok(payload) => sent.push(payload),
                    Err(e) => failures.lock().unwrap().push((sent.len(), e.to_string())),
                }
            }
            replies
        })
        .flatten()
        .boxed()
    }

    async fn fire_and_forget(&self, payload: Payload) -> Result<(), io::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(payload);
        Ok(())
    }

    async fn metadata_push(&self, metadata: Vec<u8>) -> Result<(), io::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pushed.lock().unwrap().push(metadata);
        Ok(())
    }
}

fn engine(transport: Arc<MockTransport>) -> RpcClientEngine {
    RpcClientEngine::new(RpcClientModule::builder(transport).build())
}

fn server_metadata_frame() -> Payload {
    Payload::metadata_only(ServerMetadata::default().encode())
}

fn repeat_frame(index: u32, text: &str) -> Payload {
    Payload::data_only(Repeat::encode_response(&(index, text.to_string())).unwrap())
}

/// Never-ending reply stream that counts the frames it produces and flags
/// when it is dropped.
#[derive(Default)]
struct EndlessTransport {
    produced: Arc<AtomicUsize>,
    released: Arc<AtomicBool>,
}

struct ReleaseOnDrop(Arc<AtomicBool>);

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl RpcTransport for EndlessTransport {
    async fn request_response(&self, _payload: Payload) -> Result<Payload, io::Error> {
        unreachable!("only streams are used")
    }

    fn request_stream(&self, _payload: Payload) -> PayloadStream {
        let produced = Arc::clone(&self.produced);
        let guard = ReleaseOnDrop(Arc::clone(&self.released));

        let body = stream::iter(0u32..).map(move |index| {
            let _held = &guard;
            produced.fetch_add(1, Ordering::SeqCst);
            Ok(repeat_frame(index, "tick"))
        });

        stream::once(future::ready(Ok(server_metadata_frame())))
            .chain(body)
            .boxed()
    }

    fn request_channel(&self, _payloads: PayloadStream) -> PayloadStream {
        unreachable!("only streams are used")
    }

    async fn fire_and_forget(&self, _payload: Payload) -> Result<(), io::Error> {
        unreachable!("only streams are used")
    }

    async fn metadata_push(&self, _metadata: Vec<u8>) -> Result<(), io::Error> {
        unreachable!("only streams are used")
    }
}

struct Tenant(&'static str);

impl ProvidableInstance for Tenant {
    const KEY: InstanceKey<Self> = instance_key!("test.tenant");
}

// --- Request-response ---

#[tokio::test]
async fn test_say_carries_interceptor_metadata() {
    let reply = Payload::new(
        ServerMetadata::default().encode(),
        Say::encode_response(&"hello".to_string()).unwrap(),
    );
    let transport = MockTransport::replying(reply);

    let module = RpcClientModule::builder(transport.clone())
        .request_interceptor(interceptor_fn(|context: CallContext<ClientMetadata>| async move {
            let metadata = context.metadata().with_extra_entry("trace", b"abc".to_vec());
            context.modify(|builder| builder.set_metadata(metadata))
        }))
        .build();

    let response = Say::call(&RpcClientEngine::new(module), "hello".to_string())
        .await
        .unwrap();
    assert_eq!(response, "hello");

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);

    let metadata = ClientMetadata::decode(sent[0].metadata.as_ref().unwrap()).unwrap();
    assert_eq!(metadata.service_name(), "Echo");
    assert_eq!(metadata.procedure_name(), "say");
    assert_eq!(metadata.extra()["trace"], b"abc".to_vec());

    let request = Say::decode_request(sent[0].data.as_ref().unwrap()).unwrap();
    assert_eq!(request, "hello");
}

#[tokio::test]
async fn test_missing_response_metadata_defaults() {
    let transport = MockTransport::replying(Payload::data_only(
        Say::encode_response(&"hi".to_string()).unwrap(),
    ));
    let observed = Arc::new(Mutex::new(None));
    let recorder = observed.clone();

    let module = RpcClientModule::builder(transport)
        .response_interceptor(interceptor_fn(move |context: CallContext<ServerMetadata>| {
            let recorder = recorder.clone();
            async move {
                *recorder.lock().unwrap() = Some(context.metadata().clone());
                context
            }
        }))
        .build();

    let response = Say::call(&RpcClientEngine::new(module), "hi".to_string())
        .await
        .unwrap();

    assert_eq!(response, "hi");
    assert_eq!(observed.lock().unwrap().take(), Some(ServerMetadata::default()));
}

#[tokio::test]
async fn test_missing_response_payload_is_protocol_violation() {
    let transport = MockTransport::replying(server_metadata_frame());

    let result = Say::call(&engine(transport), "hi".to_string()).await;

    assert!(matches!(
        result,
        Err(RpcError::Protocol(ProtocolViolation::MissingPayload))
    ));
}

#[tokio::test]
async fn test_replaced_request_of_wrong_type_fails() {
    let transport = MockTransport::replying(server_metadata_frame());
    let module = RpcClientModule::builder(transport.clone())
        .request_interceptor(interceptor_fn(|context: CallContext<ClientMetadata>| async move {
            context.modify(|builder| builder.set_data(DataVariant::single(42u64)))
        }))
        .build();

    let result = Say::call(&RpcClientEngine::new(module), "hi".to_string()).await;

    assert!(matches!(result, Err(RpcError::UnexpectedData { .. })));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rejection_stops_before_transport() {
    let transport = MockTransport::replying(server_metadata_frame());
    let module = RpcClientModule::builder(transport.clone())
        .request_interceptor(interceptor_fn(|context: CallContext<ClientMetadata>| async move {
            let rejection = DataVariant::error(RpcError::rejected("no token"));
            context.modify(|builder| builder.set_data(rejection))
        }))
        .build();

    let result = Say::call(&RpcClientEngine::new(module), "hi".to_string()).await;

    assert!(matches!(result, Err(RpcError::Rejected(_))));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_declared_and_per_call_options_reach_interceptors() {
    const TIMEOUT_MS: OptionKey<u64> = OptionKey::rpc("timeout_ms", 9_001);

    let reply = Payload::new(
        ServerMetadata::default().encode(),
        Say::encode_response(&"x".to_string()).unwrap(),
    );
    let transport = MockTransport::replying(reply);
    let observed = Arc::new(Mutex::new((None, None)));
    let recorder = observed.clone();

    let module = RpcClientModule::builder(transport)
        .response_interceptor(interceptor_fn(move |context: CallContext<ServerMetadata>| {
            let recorder = recorder.clone();
            async move {
                *recorder.lock().unwrap() = (
                    context.options().get_value(&IDEMPOTENT).copied(),
                    context.options().get_value(&TIMEOUT_MS).copied(),
                );
                context
            }
        }))
        .build();

    let options = Options::builder().set(&TIMEOUT_MS, 500).build();
    Say::call_with_options(&RpcClientEngine::new(module), "x".to_string(), options)
        .await
        .unwrap();

    assert_eq!(*observed.lock().unwrap(), (Some(true), Some(500)));
}

#[tokio::test]
async fn test_local_instances_override_module_instances() {
    let reply = Payload::new(
        ServerMetadata::default().encode(),
        Say::encode_response(&"x".to_string()).unwrap(),
    );
    let transport = MockTransport::replying(reply);
    let observed = Arc::new(Mutex::new(None));
    let recorder = observed.clone();

    let module = RpcClientModule::builder(transport)
        .instance(Tenant("global"))
        .request_interceptor(interceptor_fn(move |context: CallContext<ClientMetadata>| {
            let recorder = recorder.clone();
            async move {
                *recorder.lock().unwrap() = context.instances().get::<Tenant>().map(|t| t.0);
                context
            }
        }))
        .build();
    let base = RpcClientEngine::new(module);

    let scoped = base.with_instances(&InstanceContainer::empty().add(Tenant("local")));
    Say::call(&scoped, "x".to_string()).await.unwrap();

    assert_eq!(observed.lock().unwrap().take(), Some("local"));
    assert_eq!(base.module().instances().get::<Tenant>().unwrap().0, "global");
}

#[tokio::test]
async fn test_response_interceptor_error_becomes_call_error() {
    let reply = Payload::new(
        ServerMetadata::default().encode(),
        Say::encode_response(&"signed".to_string()).unwrap(),
    );
    let module = RpcClientModule::builder(MockTransport::replying(reply))
        .response_interceptor(interceptor_fn(|context: CallContext<ServerMetadata>| async move {
            let rejection = DataVariant::error(RpcError::rejected("bad sig"));
            context.modify(|builder| builder.set_data(rejection))
        }))
        .build();

    let error = Say::call(&RpcClientEngine::new(module), "hi".to_string())
        .await
        .unwrap_err();

    assert!(matches!(error, RpcError::Rejected(_)));
    assert!(error.to_string().contains("bad sig"), "{}", error);
}

#[tokio::test]
async fn test_response_chain_sees_instances_added_by_request_chain() {
    let reply = Payload::new(
        ServerMetadata::default().encode(),
        Say::encode_response(&"x".to_string()).unwrap(),
    );
    let observed = Arc::new(Mutex::new(None));
    let recorder = observed.clone();

    let module = RpcClientModule::builder(MockTransport::replying(reply))
        .request_interceptor(interceptor_fn(|context: CallContext<ClientMetadata>| async move {
            context.modify(|builder| builder.add_local_instance(Tenant("from-request")))
        }))
        .response_interceptor(interceptor_fn(move |context: CallContext<ServerMetadata>| {
            let recorder = recorder.clone();
            async move {
                *recorder.lock().unwrap() = context.instances().get::<Tenant>().map(|t| t.0);
                context
            }
        }))
        .build();
    let engine = RpcClientEngine::new(module);

    Say::call(&engine, "x".to_string()).await.unwrap();

    assert_eq!(observed.lock().unwrap().take(), Some("from-request"));
    assert!(engine.module().instances().get::<Tenant>().is_none());
}

// --- Request-stream ---

#[tokio::test]
async fn test_stream_skips_metadata_frame_and_runs_response_chain_once() {
    let transport = MockTransport::streaming(vec![
        server_metadata_frame(),
        repeat_frame(0, "a"),
        repeat_frame(1, "a"),
        repeat_frame(2, "a"),
    ]);
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();

    let module = RpcClientModule::builder(transport)
        .response_interceptor(interceptor_fn(move |context: CallContext<ServerMetadata>| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { context }
        }))
        .build();

    let request = RepeatRequest {
        text: "a".into(),
        count: 3,
    };
    let engine = RpcClientEngine::new(module);
    let items: Vec<_> = Repeat::call_stream(&engine, request, Options::empty())
        .collect()
        .await;

    let items: Vec<_> = items.into_iter().map(Result::unwrap).collect();
    assert_eq!(items, vec![(0, "a".into()), (1, "a".into()), (2, "a".into())]);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stream_without_leading_metadata_fails() {
    let transport = MockTransport::streaming(vec![repeat_frame(0, "a"), repeat_frame(1, "a")]);
    let request = RepeatRequest {
        text: "a".into(),
        count: 2,
    };

    let items: Vec<_> = Repeat::call_stream(&engine(transport), request, Options::empty())
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    assert!(matches!(
        items[0],
        Err(RpcError::Protocol(ProtocolViolation::MissingMetadata))
    ));
}

#[tokio::test]
async fn test_empty_stream_is_protocol_violation() {
    let transport = MockTransport::streaming(Vec::new());
    let request = RepeatRequest {
        text: "a".into(),
        count: 0,
    };

    let items: Vec<_> = Repeat::call_stream(&engine(transport), request, Options::empty())
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    assert!(matches!(
        items[0],
        Err(RpcError::Protocol(ProtocolViolation::EmptyStream))
    ));
}

#[tokio::test]
async fn test_stream_is_lazy() {
    let transport = MockTransport::streaming(vec![server_metadata_frame()]);
    let request = RepeatRequest {
        text: "a".into(),
        count: 0,
    };

    let responses = Repeat::call_stream(&engine(transport.clone()), request, Options::empty());
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);

    let items: Vec<_> = responses.collect().await;
    assert!(items.is_empty());
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stream_response_interceptor_error_ends_stream() {
    let transport = MockTransport::streaming(vec![
        server_metadata_frame(),
        repeat_frame(0, "a"),
        repeat_frame(1, "a"),
    ]);
    let module = RpcClientModule::builder(transport)
        .response_interceptor(interceptor_fn(|context: CallContext<ServerMetadata>| async move {
            let rejection = DataVariant::error(RpcError::rejected("bad sig"));
            context.modify(|builder| builder.set_data(rejection))
        }))
        .build();
    let request = RepeatRequest {
        text: "a".into(),
        count: 2,
    };

    let engine = RpcClientEngine::new(module);
    let items: Vec<_> = Repeat::call_stream(&engine, request, Options::empty())
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Err(RpcError::Rejected(_))));
}

#[tokio::test]
async fn test_frame_without_payload_ends_stream_after_earlier_items() {
    let transport = MockTransport::streaming(vec![
        server_metadata_frame(),
        repeat_frame(7, "a"),
        server_metadata_frame(),
        repeat_frame(8, "a"),
    ]);
    let request = RepeatRequest {
        text: "a".into(),
        count: 2,
    };

    let items: Vec<_> = Repeat::call_stream(&engine(transport), request, Options::empty())
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap(), &(7, "a".to_string()));
    assert!(matches!(
        items[1],
        Err(RpcError::Protocol(ProtocolViolation::MissingPayload))
    ));
    assert!(items[1].as_ref().unwrap_err().is_protocol_violation());
}

#[tokio::test]
async fn test_dropping_stream_releases_transport_stream() {
    let transport = Arc::new(EndlessTransport::default());
    let engine = RpcClientEngine::new(RpcClientModule::builder(transport.clone()).build());
    let request = RepeatRequest {
        text: "tick".into(),
        count: u32::MAX,
    };

    let items: Vec<_> = Repeat::call_stream(&engine, request, Options::empty())
        .take(3)
        .collect()
        .await;

    assert_eq!(items.len(), 3);
    assert!(items.iter().all(Result::is_ok));
    assert!(transport.released.load(Ordering::SeqCst));
    assert!(transport.produced.load(Ordering::SeqCst) <= 4);
}

// --- Request-channel ---

#[tokio::test]
async fn test_channel_sends_control_frame_first() {
    let transport = MockTransport::streaming(vec![
        server_metadata_frame(),
        Payload::data_only(Chat::encode_response(&"pong".to_string()).unwrap()),
    ]);

    let requests = stream::iter(vec![Ok("one".to_string()), Ok("two".to_string())]);
    let replies: Vec<_> =
        Chat::call_channel(&engine(transport.clone()), requests, Options::empty())
            .collect()
            .await;

    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].as_ref().unwrap(), "pong");

    let sent = transport.sent();
    assert_eq!(sent.len(), 3);

    assert!(sent[0].data.is_none());
    let metadata = ClientMetadata::decode(sent[0].metadata.as_ref().unwrap()).unwrap();
    assert_eq!(metadata.procedure_name(), "chat");

    assert!(sent[1].metadata.is_none());
    assert_eq!(Chat::decode_request(sent[1].data.as_ref().unwrap()).unwrap(), "one");
    assert_eq!(Chat::decode_request(sent[2].data.as_ref().unwrap()).unwrap(), "two");
}

#[tokio::test]
async fn test_channel_forwards_outgoing_errors() {
    let transport = MockTransport::streaming(vec![server_metadata_frame()]);

    let requests = stream::iter(vec![
        Ok("a".to_string()),
        Err(RpcError::rejected("boom")),
        Ok("b".to_string()),
    ]);
    let replies: Vec<_> =
        Chat::call_channel(&engine(transport.clone()), requests, Options::empty())
            .collect()
            .await;

    assert!(replies.is_empty());

    let sent = transport.sent();
    assert_eq!(sent.len(), 3);
    assert!(sent[0].data.is_none());
    assert_eq!(Chat::decode_request(sent[1].data.as_ref().unwrap()).unwrap(), "a");
    assert_eq!(Chat::decode_request(sent[2].data.as_ref().unwrap()).unwrap(), "b");

    let failed = transport.failed.lock().unwrap().clone();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, 2);
    assert!(failed[0].1.contains("boom"), "{}", failed[0].1);
}

// --- Fire-and-forget and metadata-push ---

#[tokio::test]
async fn test_fire_and_forget_skips_response_chain() {
    let transport = Arc::new(MockTransport::default());
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();

    let module = RpcClientModule::builder(transport.clone())
        .response_interceptor(interceptor_fn(move |context: CallContext<ServerMetadata>| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { context }
        }))
        .build();

    Log::fire_and_forget(&RpcClientEngine::new(module), "line".to_string(), Options::empty())
        .await
        .unwrap();

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(Log::decode_request(sent[0].data.as_ref().unwrap()).unwrap(), "line");
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_metadata_push_sends_metadata_only() {
    let transport = Arc::new(MockTransport::default());
    let observed = Arc::new(Mutex::new(None));
    let recorder = observed.clone();

    let module = RpcClientModule::builder(transport.clone())
        .request_interceptor(interceptor_fn(move |context: CallContext<ClientMetadata>| {
            let recorder = recorder.clone();
            async move {
                *recorder.lock().unwrap() = Some(context.data().kind_name());
                let metadata = context.metadata().with_extra_entry("status", b"up".to_vec());
                context.modify(|builder| builder.set_metadata(metadata))
            }
        }))
        .build();

    Ping::metadata_push(&RpcClientEngine::new(module), Options::empty())
        .await
        .unwrap();

    assert_eq!(observed.lock().unwrap().take(), Some("empty"));

    let pushed = transport.pushed.lock().unwrap().clone();
    assert_eq!(pushed.len(), 1);
    let metadata = ClientMetadata::decode(&pushed[0]).unwrap();
    assert_eq!(metadata.procedure_name(), Ping::PROCEDURE_NAME);
    assert_eq!(metadata.extra()["status"], b"up".to_vec());
}
