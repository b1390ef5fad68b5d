//! One actor per live client connection. Mirrors the heartbeat/registry
//! lifecycle pattern used throughout this codebase for actix WS actors:
//! register on `started`, detach on `stopped`, and never run async work
//! on the actor's own stack — hand it to `ctx.spawn(...).into_actor(self)`
//! so the mailbox keeps draining while it's in flight.

use std::time::{Duration, Instant};

use actix::{Actor, ActorContext, ActorFutureExt, AsyncContext, Handler, Message, Running, StreamHandler, WrapFuture};
use actix_web_actors::ws;
use tracing::{debug, warn};

use crate::coordinator;
use crate::domain::state::UserId;
use crate::state::app_state::AppState;
use crate::ws::protocol::ServerEvent;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone, Message)]
#[rtype(result = "()")]
pub struct Push(pub ServerEvent);

pub struct GameSession {
    table_id: i64,
    user_id: UserId,
    state: AppState,
    last_heartbeat: Instant,
}

impl GameSession {
    pub fn new(table_id: i64, user_id: UserId, state: AppState) -> Self {
        Self { table_id, user_id, state, last_heartbeat: Instant::now() }
    }

    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(table_id = act.table_id, user_id = act.user_id, "client heartbeat timed out");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for GameSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.heartbeat(ctx);

        let recipient = ctx.address().recipient();
        self.state.registry.attach(self.table_id, self.user_id, recipient);

        let state = self.state.clone();
        let table_id = self.table_id;
        let user_id = self.user_id;
        ctx.spawn(
            async move { coordinator::on_connect(&state, table_id, user_id).await }
                .into_actor(self)
                .map(|result, act, ctx| {
                    if let Err(e) = result {
                        warn!(table_id = act.table_id, user_id = act.user_id, error = %e, "connection join failed");
                        ctx.close(Some(ws::CloseReason {
                            code: ws::CloseCode::Policy,
                            description: Some(e.to_string()),
                        }));
                        ctx.stop();
                    }
                }),
        );
    }

    fn stopping(&mut self, _ctx: &mut Self::Context) -> Running {
        self.state.registry.detach(self.table_id, self.user_id);
        let state = self.state.clone();
        let table_id = self.table_id;
        let user_id = self.user_id;
        actix::spawn(async move {
            coordinator::on_disconnect(&state, table_id, user_id).await;
        });
        Running::Stop
    }
}

impl Handler<Push> for GameSession {
    type Result = ();

    fn handle(&mut self, msg: Push, ctx: &mut Self::Context) {
        match serde_json::to_string(&msg.0) {
            Ok(text) => ctx.text(text),
            Err(e) => warn!(table_id = self.table_id, user_id = self.user_id, error = %e, "failed to encode outbound frame"),
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for GameSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                warn!(table_id = self.table_id, user_id = self.user_id, error = %e, "websocket protocol error");
                ctx.stop();
                return;
            }
        };

        match msg {
            ws::Message::Ping(bytes) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&bytes);
            }
            ws::Message::Pong(_) => {
                self.last_heartbeat = Instant::now();
            }
            ws::Message::Text(text) => {
                let event = match serde_json::from_str(&text) {
                    Ok(event) => event,
                    Err(_) => {
                        debug!(table_id = self.table_id, user_id = self.user_id, "ignoring malformed client frame");
                        return;
                    }
                };
                let state = self.state.clone();
                let table_id = self.table_id;
                let user_id = self.user_id;
                ctx.spawn(
                    async move { coordinator::handle_client_event(&state, table_id, user_id, event).await }
                        .into_actor(self)
                        .map(|_, _, _| ()),
                );
            }
            ws::Message::Binary(_) => {
                debug!(table_id = self.table_id, user_id = self.user_id, "ignoring unexpected binary frame");
            }
            ws::Message::Close(reason) => {
                ctx.close(reason);
                ctx.stop();
            }
            ws::Message::Continuation(_) | ws::Message::Nop => {}
        }
    }
}
