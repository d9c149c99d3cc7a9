//! Session state machine driving the presence client.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::{DateTime, Utc};
use deadlock_rpc_game_log::HeroSource;
use deadlock_rpc_presence::{PresenceClient, PublishOutcome};
use futures_util::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::state::{Session, build_fields};
use crate::watcher::ProcessProbe;

/// Callback invoked whenever the session changes (start, stop, hero change).
pub type OnStatusFn = Box<dyn Fn(&Session) + Send + Sync + 'static>;

/// Polls the game process and mirrors the session into the presence client.
///
/// | state  | game running | action                                      |
/// |--------|--------------|---------------------------------------------|
/// | Idle   | yes          | connect, detect hero, start session, publish |
/// | Idle   | no           | nothing                                     |
/// | Active | yes          | re-detect hero, republish                   |
/// | Active | no           | clear presence, back to Idle                |
pub struct Tracker<P, H, C> {
    probe: P,
    heroes: H,
    client: C,
    session: Session,
    interval: Duration,
    on_status: Option<OnStatusFn>,
}

impl<P, H, C> Tracker<P, H, C>
where
    P: ProcessProbe,
    H: HeroSource,
    C: PresenceClient,
{
    pub fn new(probe: P, heroes: H, client: C, interval: Duration) -> Self {
        Self {
            probe,
            heroes,
            client,
            session: Session::Idle,
            interval,
            on_status: None,
        }
    }

    /// Sets the session change callback.
    pub fn with_status_fn(mut self, on_status: OnStatusFn) -> Self {
        self.on_status = Some(on_status);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Runs ticks until `cancel` fires, then clears the published status.
    ///
    /// A panicking tick is logged and the loop carries on after the normal
    /// interval.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!(interval_secs = self.interval.as_secs(), "session tracker started");

        loop {
            if cancel.is_cancelled() {
                break;
            }

            if let Err(panic) = AssertUnwindSafe(self.tick()).catch_unwind().await {
                tracing::error!(reason = %panic_message(panic.as_ref()), "tracker tick failed");
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        self.shutdown().await;
        tracing::info!("session tracker stopped");
    }

    /// Runs one probe-and-publish step at the current time.
    pub async fn tick(&mut self) {
        self.tick_at(Utc::now()).await;
    }

    /// Runs one probe-and-publish step, using `now` as the session start if
    /// the game has just appeared.
    pub async fn tick_at(&mut self, now: DateTime<Utc>) {
        let running = self.probe.is_target_running();

        match (self.session.is_active(), running) {
            (false, false) => {
                tracing::debug!("game not running");
            }
            (false, true) => {
                let character = self.heroes.detect();
                tracing::info!(hero = ?character, "game started");
                self.session = Session::Active {
                    started_at: now,
                    character,
                };
                self.notify();
                self.publish().await;
            }
            (true, true) => {
                let detected = self.heroes.detect();
                if let Session::Active { character, .. } = &mut self.session
                    && *character != detected
                {
                    tracing::info!(from = ?character, to = ?detected, "hero changed");
                    *character = detected;
                    self.notify();
                }
                self.publish().await;
            }
            (true, false) => {
                tracing::info!("game stopped");
                self.clear().await;
                self.session = Session::Idle;
                self.notify();
            }
        }
    }

    /// Publishes the current session, reconnecting once if the connection
    /// turns out to be gone.
    async fn publish(&mut self) -> PublishOutcome {
        if !self.client.is_connected()
            && let Err(e) = self.client.connect().await
        {
            tracing::warn!(error = %e, "could not connect to Discord");
            return PublishOutcome::ReconnectNeeded(e.to_string());
        }

        let fields = build_fields(&self.session);
        let outcome = PublishOutcome::from(self.client.update(&fields).await);

        match outcome {
            PublishOutcome::Published => {
                tracing::debug!(state = %fields.state, "presence updated");
                PublishOutcome::Published
            }
            PublishOutcome::PermanentFailure(reason) => {
                tracing::warn!(%reason, "Discord rejected presence update");
                PublishOutcome::PermanentFailure(reason)
            }
            PublishOutcome::ReconnectNeeded(reason) => {
                tracing::warn!(%reason, "presence connection lost, reconnecting");
                self.client.close().await;
                if let Err(e) = self.client.connect().await {
                    tracing::warn!(error = %e, "reconnect failed");
                    return PublishOutcome::ReconnectNeeded(e.to_string());
                }

                let retry = PublishOutcome::from(self.client.update(&fields).await);
                match &retry {
                    PublishOutcome::Published => {
                        tracing::info!(state = %fields.state, "presence restored after reconnect");
                    }
                    PublishOutcome::ReconnectNeeded(reason)
                    | PublishOutcome::PermanentFailure(reason) => {
                        tracing::warn!(%reason, "presence update failed after reconnect");
                    }
                }
                retry
            }
        }
    }

    /// Best-effort clear of the published status.
    async fn clear(&mut self) {
        if !self.client.is_connected() {
            return;
        }
        match self.client.clear().await {
            Ok(()) => tracing::info!("presence cleared"),
            Err(e) => tracing::warn!(error = %e, "could not clear presence"),
        }
    }

    async fn shutdown(&mut self) {
        if self.session.is_active() {
            self.clear().await;
            self.session = Session::Idle;
        }
        self.client.close().await;
    }

    fn notify(&self) {
        if let Some(on_status) = &self.on_status {
            on_status(&self.session);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use chrono::TimeZone;
    use deadlock_rpc_presence::{PresenceError, PresenceFields, PresenceFuture};

    // -- Fakes --

    /// Replays a fixed sequence of probe results, then repeats the last one.
    struct ScriptedProbe {
        results: VecDeque<bool>,
        last: bool,
    }

    impl ScriptedProbe {
        fn new(results: &[bool]) -> Self {
            Self {
                results: results.iter().copied().collect(),
                last: false,
            }
        }
    }

    impl ProcessProbe for ScriptedProbe {
        fn is_target_running(&mut self) -> bool {
            if let Some(r) = self.results.pop_front() {
                self.last = r;
            }
            self.last
        }
    }

    /// Hero source the test can change between ticks.
    #[derive(Clone, Default)]
    struct SharedHero(Arc<Mutex<Option<String>>>);

    impl SharedHero {
        fn set(&self, hero: Option<&str>) {
            *self.0.lock().unwrap() = hero.map(String::from);
        }
    }

    impl HeroSource for SharedHero {
        fn detect(&self) -> Option<String> {
            self.0.lock().unwrap().clone()
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Connect,
        Update(PresenceFields),
        Clear,
        Close,
    }

    #[derive(Default)]
    struct Script {
        calls: Vec<Call>,
        connect_failures: usize,
        update_failures: VecDeque<PresenceError>,
        clear_fails: bool,
    }

    #[derive(Clone, Default)]
    struct FakeClient {
        script: Arc<Mutex<Script>>,
        connected: bool,
    }

    impl FakeClient {
        fn calls(&self) -> Vec<Call> {
            self.script.lock().unwrap().calls.clone()
        }

        fn take_calls(&self) -> Vec<Call> {
            std::mem::take(&mut self.script.lock().unwrap().calls)
        }

        fn fail_next_update(&self, e: PresenceError) {
            self.script.lock().unwrap().update_failures.push_back(e);
        }
    }

    impl PresenceClient for FakeClient {
        fn connect(&mut self) -> PresenceFuture<'_, Result<(), PresenceError>> {
            let mut script = self.script.lock().unwrap();
            script.calls.push(Call::Connect);
            let res = if script.connect_failures > 0 {
                script.connect_failures -= 1;
                Err(PresenceError::NoSocket)
            } else {
                self.connected = true;
                Ok(())
            };
            Box::pin(async move { res })
        }

        fn update<'a>(
            &'a mut self,
            fields: &'a PresenceFields,
        ) -> PresenceFuture<'a, Result<(), PresenceError>> {
            let mut script = self.script.lock().unwrap();
            script.calls.push(Call::Update(fields.clone()));
            let res = match script.update_failures.pop_front() {
                Some(e) => {
                    if e.needs_reconnect() {
                        self.connected = false;
                    }
                    Err(e)
                }
                None => Ok(()),
            };
            Box::pin(async move { res })
        }

        fn clear(&mut self) -> PresenceFuture<'_, Result<(), PresenceError>> {
            let mut script = self.script.lock().unwrap();
            script.calls.push(Call::Clear);
            let res = if script.clear_fails {
                Err(PresenceError::Timeout)
            } else {
                Ok(())
            };
            Box::pin(async move { res })
        }

        fn close(&mut self) -> PresenceFuture<'_, ()> {
            self.script.lock().unwrap().calls.push(Call::Close);
            self.connected = false;
            Box::pin(async {})
        }

        fn is_connected(&self) -> bool {
            self.connected
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn tracker(
        probe: &[bool],
    ) -> (Tracker<ScriptedProbe, SharedHero, FakeClient>, SharedHero, FakeClient) {
        let hero = SharedHero::default();
        let client = FakeClient::default();
        let t = Tracker::new(
            ScriptedProbe::new(probe),
            hero.clone(),
            client.clone(),
            Duration::from_secs(15),
        );
        (t, hero, client)
    }

    fn updates(calls: &[Call]) -> Vec<&PresenceFields> {
        calls
            .iter()
            .filter_map(|c| match c {
                Call::Update(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    // -- Transitions --

    #[tokio::test]
    async fn absent_then_present_then_absent() {
        let (mut t, _hero, client) = tracker(&[false, false, false, true, false]);

        for i in 0..3 {
            t.tick_at(at(100 + i)).await;
        }
        assert!(client.calls().is_empty());
        assert_eq!(t.session(), &Session::Idle);

        t.tick_at(at(200)).await;
        let calls = client.take_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], Call::Connect);
        let Call::Update(fields) = &calls[1] else {
            panic!("expected update, got {:?}", calls[1]);
        };
        assert_eq!(fields.state, "In Game");
        assert_eq!(fields.details, "Playing Deadlock");
        assert_eq!(fields.start_timestamp, Some(200));

        t.tick_at(at(215)).await;
        assert_eq!(client.take_calls(), vec![Call::Clear]);
        assert_eq!(t.session(), &Session::Idle);
    }

    #[tokio::test]
    async fn start_time_is_fixed_while_active() {
        let (mut t, hero, client) = tracker(&[true, true, true]);

        t.tick_at(at(1_000)).await;
        assert_eq!(t.session().started_at(), Some(at(1_000)));
        assert_eq!(t.session().character(), None);

        hero.set(Some("Haze"));
        t.tick_at(at(1_015)).await;
        assert_eq!(t.session().started_at(), Some(at(1_000)));
        assert_eq!(t.session().character(), Some("Haze"));

        hero.set(Some("Wraith"));
        t.tick_at(at(1_030)).await;
        assert_eq!(t.session().started_at(), Some(at(1_000)));
        assert_eq!(t.session().character(), Some("Wraith"));

        let calls = client.calls();
        let published = updates(&calls);
        assert_eq!(published.len(), 3);
        assert!(published.iter().all(|f| f.start_timestamp == Some(1_000)));
        assert_eq!(published[0].state, "In Game");
        assert_eq!(published[1].state, "Playing Haze");
        assert_eq!(published[2].state, "Playing Wraith");

        // Connected once, then republished on the same connection.
        assert_eq!(calls.iter().filter(|c| **c == Call::Connect).count(), 1);
    }

    #[tokio::test]
    async fn hero_detected_at_start() {
        let (mut t, hero, client) = tracker(&[true]);
        hero.set(Some("Lady Geist"));

        t.tick_at(at(50)).await;
        assert_eq!(t.session().character(), Some("Lady Geist"));
        assert_eq!(updates(&client.calls())[0].state, "Playing Lady Geist");
    }

    #[tokio::test]
    async fn hero_lost_falls_back_to_in_game() {
        let (mut t, hero, client) = tracker(&[true, true]);
        hero.set(Some("Bebop"));
        t.tick_at(at(1)).await;

        hero.set(None);
        t.tick_at(at(2)).await;
        assert_eq!(t.session().character(), None);
        assert_eq!(updates(&client.calls())[1].state, "In Game");
    }

    #[tokio::test]
    async fn new_session_gets_fresh_start_time() {
        let (mut t, hero, _client) = tracker(&[true, false, true]);
        hero.set(Some("Dynamo"));

        t.tick_at(at(1_000)).await;
        let first = t.session().started_at().unwrap();

        t.tick_at(at(1_015)).await;
        assert_eq!(t.session(), &Session::Idle);
        assert_eq!(t.session().started_at(), None);
        assert_eq!(t.session().character(), None);

        t.tick_at(at(1_030)).await;
        let second = t.session().started_at().unwrap();
        assert!(second > first);
        assert_eq!(t.session().character(), Some("Dynamo"));
    }

    // -- Failure handling --

    #[tokio::test]
    async fn lost_connection_reconnects_on_same_tick() {
        let (mut t, _hero, client) = tracker(&[true, true]);
        t.tick_at(at(10)).await;
        client.take_calls();

        client.fail_next_update(PresenceError::Io(std::io::Error::from(
            std::io::ErrorKind::BrokenPipe,
        )));
        t.tick_at(at(25)).await;

        let calls = client.take_calls();
        assert_eq!(calls.len(), 4, "{calls:?}");
        assert!(matches!(calls[0], Call::Update(_)));
        assert_eq!(calls[1], Call::Close);
        assert_eq!(calls[2], Call::Connect);
        let Call::Update(retried) = &calls[3] else {
            panic!("expected retried update, got {:?}", calls[3]);
        };
        assert_eq!(retried.start_timestamp, Some(10));
        assert!(t.client().is_connected());
    }

    #[tokio::test]
    async fn reconnect_failure_gives_up_for_the_tick() {
        let (mut t, _hero, client) = tracker(&[true, true, true]);
        t.tick_at(at(10)).await;
        client.take_calls();

        client.fail_next_update(PresenceError::Closed("gone".into()));
        client.script.lock().unwrap().connect_failures = 1;
        t.tick_at(at(25)).await;
        assert_eq!(client.take_calls().len(), 3); // update, close, connect
        assert!(t.session().is_active());

        // Next tick connects again and publishes.
        t.tick_at(at(40)).await;
        let calls = client.take_calls();
        assert_eq!(calls[0], Call::Connect);
        assert!(matches!(calls[1], Call::Update(_)));
    }

    #[tokio::test]
    async fn rejected_update_is_not_retried() {
        let (mut t, _hero, client) = tracker(&[true, true]);
        t.tick_at(at(10)).await;
        client.take_calls();

        client.fail_next_update(PresenceError::Rejected {
            code: 4002,
            message: "bad activity".into(),
        });
        t.tick_at(at(25)).await;

        let calls = client.take_calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(calls[0], Call::Update(_)));
    }

    #[tokio::test]
    async fn failed_connect_still_starts_session() {
        let (mut t, _hero, client) = tracker(&[true, true]);
        client.script.lock().unwrap().connect_failures = 1;

        t.tick_at(at(10)).await;
        assert_eq!(client.take_calls(), vec![Call::Connect]);
        assert_eq!(t.session().started_at(), Some(at(10)));

        t.tick_at(at(25)).await;
        let calls = client.take_calls();
        assert_eq!(calls[0], Call::Connect);
        let Call::Update(fields) = &calls[1] else {
            panic!("expected update");
        };
        assert_eq!(fields.start_timestamp, Some(10));
    }

    #[tokio::test]
    async fn clear_failure_still_returns_to_idle() {
        let (mut t, _hero, client) = tracker(&[true, false]);
        client.script.lock().unwrap().clear_fails = true;

        t.tick_at(at(10)).await;
        t.tick_at(at(25)).await;
        assert_eq!(t.session(), &Session::Idle);
    }

    #[tokio::test]
    async fn no_clear_without_connection() {
        let (mut t, _hero, client) = tracker(&[true, false]);
        client.script.lock().unwrap().connect_failures = 1;

        t.tick_at(at(10)).await;
        t.tick_at(at(25)).await;
        assert_eq!(client.calls(), vec![Call::Connect]);
        assert_eq!(t.session(), &Session::Idle);
    }

    // -- Status callback --

    #[tokio::test]
    async fn status_callback_on_changes_only() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let lines2 = Arc::clone(&lines);
        let (t, hero, _client) = tracker(&[true, true, true, false]);
        let mut t = t.with_status_fn(Box::new(move |s| {
            lines2.lock().unwrap().push(s.status_line());
        }));

        t.tick_at(at(1)).await;
        t.tick_at(at(2)).await; // unchanged
        hero.set(Some("Yamato"));
        t.tick_at(at(3)).await;
        t.tick_at(at(4)).await;

        assert_eq!(
            *lines.lock().unwrap(),
            vec!["Playing Deadlock", "Playing Yamato", "Waiting for Deadlock"]
        );
    }

    // -- Loop --

    #[tokio::test(start_paused = true)]
    async fn run_stops_on_cancel_and_clears() {
        let (t, _hero, client) = tracker(&[true]);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(t.run(cancel.clone()));

        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();
        handle.await.unwrap();

        let calls = client.calls();
        assert_eq!(calls[0], Call::Connect);
        assert!(matches!(calls[1], Call::Update(_)));
        assert_eq!(&calls[2..], &[Call::Clear, Call::Close]);
    }

    #[tokio::test(start_paused = true)]
    async fn run_ticks_on_interval() {
        let (t, _hero, client) = tracker(&[true]);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(t.run(cancel.clone()));

        // Ticks at 0s, 15s, 30s.
        tokio::time::sleep(Duration::from_secs(31)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(updates(&client.calls()).len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_start_never_ticks() {
        let (t, _hero, client) = tracker(&[true]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        t.run(cancel).await;

        assert_eq!(client.calls(), vec![Call::Close]);
    }

    struct PanicOnceProbe {
        panicked: bool,
    }

    impl ProcessProbe for PanicOnceProbe {
        fn is_target_running(&mut self) -> bool {
            if !self.panicked {
                self.panicked = true;
                panic!("process table exploded");
            }
            true
        }
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_tick_does_not_stop_loop() {
        let client = FakeClient::default();
        let t = Tracker::new(
            PanicOnceProbe { panicked: false },
            SharedHero::default(),
            client.clone(),
            Duration::from_secs(15),
        );
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(t.run(cancel.clone()));

        tokio::time::sleep(Duration::from_secs(20)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(updates(&client.calls()).len(), 1);
    }

    #[test]
    fn panic_message_variants() {
        let s: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(s.as_ref()), "static");
        let s: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(s.as_ref()), "owned");
        let s: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(s.as_ref()), "unknown panic");
    }
}
