use std::sync::Arc;
use std::time::Duration;

use ratatui::layout::Rect;
use tokio::task::JoinHandle;

use super::{end, Channels, Engine, EngineSettings};
use crate::core::action::ActionType;
use crate::core::error::TwigError;
use crate::input::bindings::KeyBindings;
use crate::utils::test_utils::{MockTerminal, RecordingScreen};
use crate::views::{ViewId, ViewState};

struct Harness {
    terminal: Arc<MockTerminal>,
    screen: Arc<RecordingScreen>,
    channels: Channels,
    task: JoinHandle<Result<(), TwigError>>,
}

impl Harness {
    async fn start(startup_errors: Vec<TwigError>) -> Self {
        Self::start_with(EngineSettings::default(), startup_errors).await
    }

    async fn start_with(settings: EngineSettings, startup_errors: Vec<TwigError>) -> Self {
        let terminal = Arc::new(MockTerminal::new(24, 80));
        let screen = Arc::new(RecordingScreen::new(vec![ViewId::Main, ViewId::Commit]));
        let (channels, receivers) = Channels::new();
        let engine = Engine::new(
            channels.clone(),
            receivers,
            terminal.clone(),
            screen.clone(),
            Arc::new(KeyBindings::with_defaults()),
            settings,
        );
        engine.initialise(startup_errors).await.unwrap();
        let task = tokio::spawn(engine.run());

        Self {
            terminal,
            screen,
            channels,
            task,
        }
    }

    async fn stop(self) {
        end(&self.channels, self.terminal.as_ref());
        self.join().await;
    }

    async fn join(self) {
        tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .expect("engine did not stop")
            .unwrap()
            .unwrap();
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}

#[tokio::test(start_paused = true)]
async fn quit_key_stops_every_loop() {
    let harness = Harness::start(Vec::new()).await;
    assert!(harness.screen.is_initialised());
    assert_eq!(harness.screen.states(), vec![ViewState::Active]);

    harness.terminal.push_str("q");
    let screen = harness.screen.clone();
    let terminal = harness.terminal.clone();
    harness.join().await;

    assert!(screen.is_disposed());
    assert!(terminal.is_cancelled());
    assert!(screen.actions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn multi_key_sequence_dispatches_one_action() {
    let harness = Harness::start(Vec::new()).await;

    harness.terminal.push_str("gg");
    let screen = harness.screen.clone();
    wait_until(|| !screen.actions().is_empty()).await;

    assert_eq!(screen.actions(), vec![ActionType::FirstLine]);
    assert!(screen.keys().is_empty());
    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn unbound_keys_reach_the_view_as_one_literal() {
    let harness = Harness::start(Vec::new()).await;

    harness.terminal.push_str("gx");
    let screen = harness.screen.clone();
    wait_until(|| !screen.keys().is_empty()).await;
    assert_eq!(screen.keys(), vec!["gx".to_string()]);

    harness.terminal.push_str("x");
    wait_until(|| screen.keys().len() == 2).await;
    assert_eq!(screen.keys()[1], "x");
    assert!(screen.actions().is_empty());
    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn keys_are_handled_in_arrival_order() {
    let harness = Harness::start(Vec::new()).await;

    harness.terminal.push_str("jjkG");
    let screen = harness.screen.clone();
    wait_until(|| screen.actions().len() == 4).await;
    assert_eq!(
        screen.actions(),
        vec![
            ActionType::NextLine,
            ActionType::NextLine,
            ActionType::PrevLine,
            ActionType::LastLine,
        ]
    );
    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn redraw_requests_coalesce_into_one_render() {
    let harness = Harness::start(Vec::new()).await;
    let screen = harness.screen.clone();
    wait_until(|| screen.render_count() == 1).await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(screen.render_count(), 1);

    for _ in 0..10 {
        harness.channels.request_redraw();
    }
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(screen.render_count(), 2);
    assert_eq!(harness.terminal.update_count(), 2);
    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn errors_stay_visible_then_clear_without_input() {
    let harness = Harness::start(Vec::new()).await;
    let screen = harness.screen.clone();

    harness.channels.report_error(TwigError::view("boom"));
    wait_until(|| screen.error_snapshots().last() == Some(&vec!["boom".to_string()])).await;

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(
        screen.error_snapshots().last(),
        Some(&vec!["boom".to_string()])
    );

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(screen.error_snapshots().last(), Some(&Vec::new()));
    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn errors_reported_together_are_shown_together() {
    let harness = Harness::start(Vec::new()).await;
    let screen = harness.screen.clone();

    harness.channels.report_error(TwigError::view("first"));
    harness.channels.report_error(TwigError::view("second"));
    wait_until(|| {
        screen
            .error_snapshots()
            .last()
            .is_some_and(|errors| errors.len() == 2)
    })
    .await;
    assert_eq!(
        screen.error_snapshots().last(),
        Some(&vec!["first".to_string(), "second".to_string()])
    );
    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn startup_errors_are_displayed() {
    let harness = Harness::start(vec![TwigError::view("bad config")]).await;
    let screen = harness.screen.clone();

    wait_until(|| {
        screen
            .error_snapshots()
            .iter()
            .any(|errors| errors.contains(&"bad config".to_string()))
    })
    .await;
    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn failed_actions_are_reported_and_the_engine_keeps_running() {
    let harness = Harness::start(Vec::new()).await;
    let screen = harness.screen.clone();
    screen.fail_actions(true);

    harness.terminal.push_str("j");
    wait_until(|| screen.error_snapshots().iter().any(|errors| !errors.is_empty())).await;

    screen.fail_actions(false);
    harness.terminal.push_str("k");
    wait_until(|| screen.actions().len() == 2).await;
    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn status_messages_reach_the_screen() {
    let harness = Harness::start(Vec::new()).await;
    let screen = harness.screen.clone();

    harness.channels.report_status("Refreshed");
    wait_until(|| screen.statuses() == vec!["Refreshed".to_string()]).await;
    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn suspend_key_suspends_the_terminal() {
    let harness = Harness::start(Vec::new()).await;
    let terminal = harness.terminal.clone();

    // Ctrl-Z
    terminal.push_bytes(&[0x1a]);
    wait_until(|| terminal.suspend_count() == 1).await;
    assert!(harness.screen.actions().is_empty());
    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn end_unblocks_a_waiting_input_loop_and_is_idempotent() {
    let harness = Harness::start(Vec::new()).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    end(&harness.channels, harness.terminal.as_ref());
    end(&harness.channels, harness.terminal.as_ref());
    assert!(harness.channels.is_exiting());
    harness.join().await;
}

#[tokio::test(start_paused = true)]
async fn failed_renders_are_reported_and_drawing_resumes() {
    let harness = Harness::start(Vec::new()).await;
    let screen = harness.screen.clone();
    let terminal = harness.terminal.clone();
    screen.fail_renders(true);

    wait_until(|| {
        screen
            .error_snapshots()
            .iter()
            .any(|errors| errors.contains(&"render failed".to_string()))
    })
    .await;
    assert_eq!(terminal.update_count(), 0);
    assert!(terminal.last_update().is_none());

    screen.fail_renders(false);
    harness.channels.request_redraw();
    wait_until(|| terminal.update_count() > 0).await;

    let frames = terminal.last_update().unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].area, Rect::new(0, 0, 80, 24));
    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn zero_refresh_interval_still_draws() {
    let settings = EngineSettings {
        refresh_interval: Duration::ZERO,
        ..EngineSettings::default()
    };
    let harness = Harness::start_with(settings, Vec::new()).await;
    let screen = harness.screen.clone();

    wait_until(|| screen.render_count() == 1).await;
    harness.terminal.push_str("j");
    wait_until(|| screen.render_count() == 2).await;
    harness.stop().await;
}
