//! ChatSession のテスト用フィクスチャ
//!
//! MockProtocolClient に登録されたハンドラーを捕捉し、ブローカーからの
//! イベントやフレームをテストから発生させる。

use std::sync::{Arc, Mutex};

use agora_shared::dto::PUBLIC_TOPIC;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::domain::{
    ClientEvent, EventHandler, FrameHandler, InboundFrame, client::MockProtocolClient,
};

use super::session::{ChatSession, SessionInput};

type Slot<T> = Arc<Mutex<Option<T>>>;

/// モックに渡されたハンドラーと publish 内容
#[derive(Clone, Default)]
pub struct Captures {
    on_event: Slot<EventHandler>,
    on_frame: Slot<FrameHandler>,
    subscribed: Arc<Mutex<Vec<String>>>,
    published: Arc<Mutex<Vec<(String, String)>>>,
}

impl Captures {
    pub fn expect_connect(&self, client: &mut MockProtocolClient) {
        let slot = Arc::clone(&self.on_event);
        client.expect_connect().returning(move |handler| {
            *slot.lock().unwrap() = Some(handler);
            Ok(())
        });
    }

    pub fn expect_subscribe(&self, client: &mut MockProtocolClient) {
        let slot = Arc::clone(&self.on_frame);
        let subscribed = Arc::clone(&self.subscribed);
        client
            .expect_subscribe()
            .returning(move |destination, handler| {
                subscribed.lock().unwrap().push(destination.to_string());
                *slot.lock().unwrap() = Some(handler);
                Ok(())
            });
    }

    pub fn expect_publish(&self, client: &mut MockProtocolClient) {
        let published = Arc::clone(&self.published);
        client.expect_publish().returning(move |destination, body| {
            published
                .lock()
                .unwrap()
                .push((destination.to_string(), body.to_string()));
            Ok(())
        });
    }

    /// ライフサイクルイベントを発生させる
    pub fn fire(&self, event: ClientEvent) {
        let slot = self.on_event.lock().unwrap();
        let handler = slot.as_ref().expect("connect() was not called");
        handler(event);
    }

    /// 公開チャンネルにフレームを届ける
    pub fn deliver(&self, body: &str) {
        let slot = self.on_frame.lock().unwrap();
        let handler = slot.as_ref().expect("subscribe() was not called");
        handler(InboundFrame {
            destination: PUBLIC_TOPIC.to_string(),
            body: body.to_string(),
        });
    }

    pub fn take_frame_handler(&self) -> FrameHandler {
        self.on_frame
            .lock()
            .unwrap()
            .take()
            .expect("subscribe() was not called")
    }

    pub fn subscribed(&self) -> Vec<String> {
        self.subscribed.lock().unwrap().clone()
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }
}

/// login から JOIN 通知まで一通り成功するモック
///
/// `disconnects` は disconnect() が呼ばれる回数（Drop 時の teardown を含む）。
pub fn mock_client(captures: &Captures, disconnects: usize) -> MockProtocolClient {
    let mut client = MockProtocolClient::new();
    captures.expect_connect(&mut client);
    captures.expect_subscribe(&mut client);
    captures.expect_publish(&mut client);
    client.expect_disconnect().times(disconnects).return_const(());
    client.expect_is_connected().return_const(true);
    client
}

/// 入力チャネルに溜まった入力を全て適用する
pub fn pump(
    session: &mut ChatSession<MockProtocolClient>,
    inputs: &mut UnboundedReceiver<SessionInput>,
) {
    while let Ok(input) = inputs.try_recv() {
        session.handle(input);
    }
}

/// `username` でログインし Connected になったセッション
pub fn connected_session(
    username: &str,
    disconnects: usize,
) -> (
    ChatSession<MockProtocolClient>,
    UnboundedReceiver<SessionInput>,
    Captures,
) {
    let captures = Captures::default();
    let (mut session, mut inputs) = ChatSession::new(mock_client(&captures, disconnects));
    session.login(username).unwrap();
    captures.fire(ClientEvent::Connected);
    pump(&mut session, &mut inputs);
    (session, inputs, captures)
}
