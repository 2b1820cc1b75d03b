use crate::channel::{CandidateChannel, CandidateSubscription};
use crate::config::SignalingConfig;
use crate::coordinator::call_command::CallCommand;
use crate::coordinator::call_handle::CallHandle;
use crate::coordinator::call_state::CallState;
use crate::coordinator::candidate_publisher::CandidatePublisher;
use crate::coordinator::session::LocalSession;
use crate::error::{CapabilityError, SignalingError};
use crate::peer::{LocalPeer, PeerCapability, PeerConnectionState, PeerEvent};
use crate::retry::with_retry;
use crate::room::{RoomRecords, RoomSubscription, RoomUpdate};
use beacon_core::{IceCandidate, Role, RoomId};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Drives one peer connection through the offer/answer exchange and candidate
/// trickling for a single room.
///
/// Setup (room creation or lookup, description exchange) runs inside the entry
/// call so its outcome is returned directly. Afterwards the coordinator moves
/// into its own task and reacts to hangups, engine events, room updates and
/// remote candidates, one at a time.
pub(crate) struct SignalingCoordinator {
    room_id: RoomId,
    session: LocalSession,
    peer: Arc<dyn PeerCapability>,
    peer_events: Option<mpsc::Receiver<PeerEvent>>,
    rooms: RoomRecords,
    channel: CandidateChannel,
    config: SignalingConfig,
    room_updates: Option<RoomSubscription>,
    remote_candidates: Option<CandidateSubscription>,
    publisher: Option<CandidatePublisher>,
    publish_failures: Option<mpsc::UnboundedReceiver<SignalingError>>,
    state: watch::Sender<CallState>,
    transport_live: bool,
    closed: bool,
    dropped_candidates: usize,
}

impl SignalingCoordinator {
    fn new(
        role: Role,
        room_id: RoomId,
        peer: LocalPeer,
        rooms: RoomRecords,
        channel: CandidateChannel,
        config: SignalingConfig,
    ) -> Self {
        let (state, _) = watch::channel(CallState::Idle);

        Self {
            room_id,
            session: LocalSession::new(role),
            peer: peer.capability,
            peer_events: Some(peer.events),
            rooms,
            channel,
            config,
            room_updates: None,
            remote_candidates: None,
            publisher: None,
            publish_failures: None,
            state,
            transport_live: false,
            closed: false,
            dropped_candidates: 0,
        }
    }

    /// Creates a room, publishes the local offer and starts waiting for an answer.
    pub(crate) async fn initiate(
        peer: LocalPeer,
        rooms: RoomRecords,
        channel: CandidateChannel,
        config: SignalingConfig,
    ) -> Result<CallHandle, SignalingError> {
        // The room id has to exist before any local candidate can be filed.
        let allocated = with_retry(&config.retry, "room allocation", || rooms.allocate()).await;
        let room_id = match allocated {
            Ok(room_id) => room_id,
            Err(e) => {
                error!("Failed to allocate room: {}", e);
                close_capability(peer.capability.as_ref()).await;
                return Err(e);
            }
        };

        let mut coordinator = Self::new(Role::Initiator, room_id, peer, rooms, channel, config);

        match coordinator.negotiate_as_initiator().await {
            Ok(()) => Ok(coordinator.spawn()),
            Err(e) => {
                coordinator.shutdown(CallState::Failed(e.clone())).await;
                Err(e)
            }
        }
    }

    /// Answers the offer stored in `room_id`.
    pub(crate) async fn join(
        room_id: RoomId,
        peer: LocalPeer,
        rooms: RoomRecords,
        channel: CandidateChannel,
        config: SignalingConfig,
    ) -> Result<CallHandle, SignalingError> {
        let mut coordinator = Self::new(Role::Joiner, room_id, peer, rooms, channel, config);

        match coordinator.negotiate_as_joiner().await {
            Ok(()) => Ok(coordinator.spawn()),
            Err(e) => {
                coordinator.shutdown(CallState::Failed(e.clone())).await;
                Err(e)
            }
        }
    }

    async fn negotiate_as_initiator(&mut self) -> Result<(), SignalingError> {
        let room_id = self.room_id.clone();
        let rooms = self.rooms.clone();
        let channel = self.channel.clone();
        let remote_side = self.session.role().remote_side();

        let candidates = with_retry(&self.config.retry, "candidate subscription", || {
            channel.subscribe_additions(&room_id, remote_side)
        })
        .await?;
        self.remote_candidates = Some(candidates);

        self.set_state(CallState::AwaitingLocalDescription);
        let offer = self.peer.create_offer().await?;
        self.peer.set_local_description(offer.clone()).await?;
        debug!("Created offer for room {}", room_id);

        with_retry(&self.config.retry, "offer publication", || {
            rooms.publish_offer(&room_id, &offer)
        })
        .await?;

        let updates = with_retry(&self.config.retry, "room subscription", || {
            rooms.subscribe_room_updates(&room_id)
        })
        .await?;
        self.room_updates = Some(updates);

        self.set_state(CallState::AwaitingRemoteDescription);
        Ok(())
    }

    async fn negotiate_as_joiner(&mut self) -> Result<(), SignalingError> {
        let room_id = self.room_id.clone();
        let rooms = self.rooms.clone();
        let channel = self.channel.clone();
        let remote_side = self.session.role().remote_side();

        let room =
            with_retry(&self.config.retry, "room lookup", || rooms.get_room(&room_id)).await?;
        if room.is_answered() {
            return Err(SignalingError::AlreadyAnswered(room_id));
        }
        debug!("Got offer for room {}", room_id);

        self.set_state(CallState::AwaitingLocalDescription);
        self.peer.set_remote_description(room.offer).await?;
        self.session.mark_remote_description_set();

        // Candidates filed by the initiator before we arrived are part of the backlog.
        let candidates = with_retry(&self.config.retry, "candidate subscription", || {
            channel.subscribe_with_backlog(&room_id, remote_side)
        })
        .await?;
        self.remote_candidates = Some(candidates);

        let answer = self.peer.create_answer().await?;
        self.peer.set_local_description(answer.clone()).await?;
        debug!("Created answer for room {}", room_id);

        with_retry(&self.config.retry, "answer publication", || {
            rooms.set_answer(&room_id, &answer)
        })
        .await?;

        self.set_state(CallState::Connecting);
        Ok(())
    }

    fn spawn(self) -> CallHandle {
        let (command_tx, command_rx) = mpsc::channel(8);
        let handle = CallHandle::new(
            self.room_id.clone(),
            self.session.role(),
            self.state.subscribe(),
            command_tx,
        );

        tokio::spawn(self.run(command_rx));
        handle
    }

    async fn run(mut self, mut commands: mpsc::Receiver<CallCommand>) {
        info!(
            "Call event loop started for room {} as {}",
            self.room_id,
            self.session.role()
        );

        let (publisher, failures) = CandidatePublisher::spawn(
            self.channel.clone(),
            self.room_id.clone(),
            self.session.role().local_side(),
            self.config.retry.clone(),
        );
        self.publisher = Some(publisher);
        self.publish_failures = Some(failures);

        while !self.closed {
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(CallCommand::Hangup) => self.shutdown(CallState::Closed).await,
                    None => {
                        info!("All handles for room {} dropped. Hanging up.", self.room_id);
                        self.shutdown(CallState::Closed).await;
                    }
                },

                evt = next_peer_event(&mut self.peer_events) => {
                    self.handle_peer_event(evt).await;
                }

                update = next_room_update(&mut self.room_updates) => {
                    self.handle_room_update(update).await;
                }

                candidate = next_remote_candidate(&mut self.remote_candidates) => {
                    self.handle_remote_candidate(candidate).await;
                }

                failure = next_publish_failure(&mut self.publish_failures) => {
                    self.handle_publish_failure(failure).await;
                }
            }
        }

        info!("Call event loop finished for room {}", self.room_id);
    }

    async fn handle_peer_event(&mut self, event: Option<PeerEvent>) {
        if self.closed {
            return;
        }
        let Some(event) = event else {
            self.peer_events = None;
            if self.is_connected() {
                debug!("Peer event channel closed for room {}", self.room_id);
                return;
            }
            // Without engine events the call can never become connected.
            let cause = CapabilityError::new("events", "peer event channel closed");
            self.shutdown(CallState::Failed(cause.into())).await;
            return;
        };

        match event {
            PeerEvent::IceCandidate(candidate) => self.publish_local_candidate(candidate),

            PeerEvent::IceGatheringComplete => {
                info!("Got final candidate for room {}", self.room_id);
            }

            PeerEvent::Track { id, kind } => {
                info!("Got remote {} track {} in room {}", kind, id, self.room_id);
            }

            PeerEvent::ConnectionState(state) => {
                info!("Connection state for room {}: {:?}", self.room_id, state);
                match state {
                    PeerConnectionState::Connected => {
                        self.transport_live = true;
                        self.maybe_connected();
                    }
                    PeerConnectionState::Failed => {
                        let cause = CapabilityError::new("connection", "peer connection failed");
                        self.shutdown(CallState::Failed(cause.into())).await;
                    }
                    PeerConnectionState::Disconnected => {
                        self.transport_live = false;
                        warn!("Peer connection for room {} disconnected", self.room_id);
                    }
                    PeerConnectionState::Closed => {
                        self.transport_live = false;
                    }
                    PeerConnectionState::New | PeerConnectionState::Connecting => {}
                }
            }

            PeerEvent::IceGatheringState(state) => {
                debug!("ICE gathering state for room {}: {}", self.room_id, state);
            }

            PeerEvent::IceConnectionState(state) => {
                debug!("ICE connection state for room {}: {}", self.room_id, state);
            }

            PeerEvent::SignalingState(state) => {
                debug!("Signaling state for room {}: {}", self.room_id, state);
            }
        }
    }

    fn publish_local_candidate(&self, candidate: IceCandidate) {
        if let Some(publisher) = &self.publisher {
            publisher.publish(candidate);
        }
    }

    async fn handle_publish_failure(&mut self, failure: Option<SignalingError>) {
        if self.closed {
            return;
        }
        let Some(e) = failure else {
            self.publish_failures = None;
            return;
        };

        match e {
            e if e.is_transient() => {
                self.dropped_candidates += 1;
                warn!(
                    "Dropped local candidate for room {} ({} so far): {}",
                    self.room_id, self.dropped_candidates, e
                );
                if self.dropped_candidates > self.config.candidate_loss_limit {
                    self.shutdown(CallState::Failed(e)).await;
                }
            }
            e => self.shutdown(CallState::Failed(e)).await,
        }
    }

    async fn handle_room_update(&mut self, update: Option<Result<RoomUpdate, SignalingError>>) {
        if self.closed {
            return;
        }
        let Some(update) = update else {
            self.room_updates = None;
            if self.session.remote_description_set() {
                debug!("Room feed for {} ended after answer", self.room_id);
                return;
            }
            let cause = SignalingError::StorageUnavailable(format!(
                "room feed for {} ended before an answer arrived",
                self.room_id
            ));
            self.shutdown(CallState::Failed(cause)).await;
            return;
        };

        let room = match update {
            Ok(RoomUpdate::Changed(room)) => room,
            Ok(RoomUpdate::Deleted) => {
                if self.session.remote_description_set() {
                    debug!("Room {} removed after answer was accepted", self.room_id);
                    return;
                }
                let cause = SignalingError::RoomNotFound(self.room_id.clone());
                self.shutdown(CallState::Failed(cause)).await;
                return;
            }
            Err(e) => {
                self.shutdown(CallState::Failed(e)).await;
                return;
            }
        };

        let Some(answer) = room.and_then(|r| r.answer) else {
            debug!("Room {} updated without answer", self.room_id);
            return;
        };

        // Change feeds redeliver; the answer is applied once.
        if self.session.remote_description_set() {
            debug!("Ignoring repeated answer for room {}", self.room_id);
            return;
        }

        info!("Got remote description for room {}", self.room_id);
        if let Err(e) = self.peer.set_remote_description(answer).await {
            self.shutdown(CallState::Failed(e.into())).await;
            return;
        }
        self.session.mark_remote_description_set();

        self.flush_pending_candidates().await;
        if self.closed {
            return;
        }

        self.set_state(CallState::Connecting);
        self.maybe_connected();
    }

    async fn handle_remote_candidate(
        &mut self,
        candidate: Option<Result<IceCandidate, SignalingError>>,
    ) {
        if self.closed {
            return;
        }

        match candidate {
            None => {
                self.remote_candidates = None;
                if self.is_connected() {
                    warn!("Remote candidate feed for room {} ended", self.room_id);
                    return;
                }
                let cause = SignalingError::ChannelUnavailable(format!(
                    "remote candidate feed for {} ended before the call connected",
                    self.room_id
                ));
                self.shutdown(CallState::Failed(cause)).await;
            }
            Some(Err(e)) => self.shutdown(CallState::Failed(e)).await,
            Some(Ok(candidate)) => {
                let engine_buffers = self.peer.buffers_early_candidates();
                match self.session.admit(candidate, engine_buffers) {
                    Some(candidate) => self.deliver_remote_candidate(candidate).await,
                    None => debug!(
                        "Queued early candidate for room {} ({} pending)",
                        self.room_id,
                        self.session.pending_len()
                    ),
                }
            }
        }
    }

    async fn flush_pending_candidates(&mut self) {
        let pending = self.session.take_pending();
        if !pending.is_empty() {
            debug!(
                "Flushing {} queued candidates for room {}",
                pending.len(),
                self.room_id
            );
        }

        for candidate in pending {
            if self.closed {
                return;
            }
            self.deliver_remote_candidate(candidate).await;
        }
    }

    async fn deliver_remote_candidate(&mut self, candidate: IceCandidate) {
        debug!("Got new remote candidate for room {}", self.room_id);
        if let Err(e) = self.peer.add_ice_candidate(candidate).await {
            self.shutdown(CallState::Failed(e.into())).await;
        }
    }

    fn is_connected(&self) -> bool {
        *self.state.borrow() == CallState::Connected
    }

    fn maybe_connected(&mut self) {
        if self.closed || !self.session.remote_description_set() || !self.transport_live {
            return;
        }
        if !self.is_connected() {
            self.set_state(CallState::Connected);
        }
    }

    fn set_state(&self, next: CallState) {
        let previous = self.state.send_replace(next.clone());
        match &next {
            CallState::Failed(e) => error!(
                "Call in room {} ({}) failed from {:?}: {}",
                self.room_id,
                self.session.role(),
                previous,
                e
            ),
            _ => info!(
                "Call in room {} ({}): {:?} -> {:?}",
                self.room_id,
                self.session.role(),
                previous,
                next
            ),
        }
    }

    /// Ends the call. Subscriptions are cancelled and the engine is closed;
    /// room and candidate records stay as they are. Later calls are no-ops.
    async fn shutdown(&mut self, terminal: CallState) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Some(publisher) = self.publisher.take() {
            publisher.stop();
        }
        if let Some(mut updates) = self.room_updates.take() {
            updates.cancel();
        }
        if let Some(mut candidates) = self.remote_candidates.take() {
            candidates.cancel();
        }
        self.session.clear();

        close_capability(self.peer.as_ref()).await;
        self.set_state(terminal);
    }
}

async fn close_capability(peer: &dyn PeerCapability) {
    if let Err(e) = peer.close().await {
        warn!("Failed to close peer connection: {}", e);
    }
}

async fn next_peer_event(events: &mut Option<mpsc::Receiver<PeerEvent>>) -> Option<PeerEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn next_room_update(
    updates: &mut Option<RoomSubscription>,
) -> Option<Result<RoomUpdate, SignalingError>> {
    match updates {
        Some(sub) => sub.recv().await,
        None => std::future::pending().await,
    }
}

async fn next_remote_candidate(
    candidates: &mut Option<CandidateSubscription>,
) -> Option<Result<IceCandidate, SignalingError>> {
    match candidates {
        Some(sub) => sub.recv().await,
        None => std::future::pending().await,
    }
}

async fn next_publish_failure(
    failures: &mut Option<mpsc::UnboundedReceiver<SignalingError>>,
) -> Option<SignalingError> {
    match failures {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
