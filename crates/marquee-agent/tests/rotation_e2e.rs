//! End-to-end rotation behaviour against paused Tokio time.

use std::sync::Arc;

use marquee_agent::{CoordinatorEffects, CoordinatorOptions, IntakeSender, OverlayPipeline};
use marquee_core::{
    AnimationConfig, AnimationDirection, ConfigVersion, PushUpdate, SettingsUpdate,
    TransitionPhase,
};
use marquee_testkit::{
    pass_ms, paused_clock, settle, MemoryBootstrap, RecordingRenderer, ScriptedAnimator,
    StepScript,
};
use serde_json::json;

struct Harness {
    pipeline: OverlayPipeline,
    intake: IntakeSender,
    renderer: Arc<RecordingRenderer>,
    animator: Arc<ScriptedAnimator>,
}

impl Harness {
    fn start(animator: fn(Arc<dyn marquee_core::effects::PhysicalTimeEffects>) -> ScriptedAnimator) -> Self {
        Self::with_bootstrap(animator, None)
    }

    fn with_bootstrap(
        animator: fn(Arc<dyn marquee_core::effects::PhysicalTimeEffects>) -> ScriptedAnimator,
        bootstrap: Option<MemoryBootstrap>,
    ) -> Self {
        let time = paused_clock();
        let renderer = Arc::new(RecordingRenderer::new());
        let animator = Arc::new(animator(Arc::clone(&time)));
        let mut effects = CoordinatorEffects::new(time, renderer.clone(), animator.clone());
        if let Some(bootstrap) = bootstrap {
            effects = effects.with_bootstrap(Arc::new(bootstrap));
        }
        let pipeline = OverlayPipeline::start(effects, CoordinatorOptions::default()).unwrap();
        let intake = pipeline.intake();
        Self {
            pipeline,
            intake,
            renderer,
            animator,
        }
    }

    async fn configure(&self, settings: SettingsUpdate) {
        self.intake.settings(settings).await.unwrap();
        settle().await;
    }

    async fn push(&self, key: &str, payload: serde_json::Value) {
        self.intake.push(PushUpdate::new(key, payload)).await.unwrap();
        settle().await;
    }
}

fn instant_settings<const N: usize>(keys: [&str; N], seconds: f64) -> SettingsUpdate {
    SettingsUpdate::new(keys, seconds).with_animation(AnimationConfig::instant())
}

#[tokio::test(start_paused = true)]
async fn follower_and_gifter_alternate_every_interval() {
    let h = Harness::start(ScriptedAnimator::instant);
    h.push("follower", json!({"name": "Bo"})).await;
    h.push("gifter", json!({"name": "Ann", "count": 5})).await;
    h.configure(instant_settings(["follower", "gifter"], 5.0)).await;

    assert_eq!(h.renderer.labels(), ["follower"]);
    assert_eq!(h.renderer.last().unwrap().payload(), Some(&json!({"name": "Bo"})));

    pass_ms(5_000).await;
    assert_eq!(h.renderer.labels(), ["follower", "gifter"]);
    assert_eq!(
        h.renderer.last().unwrap().payload(),
        Some(&json!({"name": "Ann", "count": 5}))
    );

    pass_ms(5_000).await;
    assert_eq!(h.renderer.labels(), ["follower", "gifter", "follower"]);
    assert_eq!(h.pipeline.status().await.unwrap().current_index, 0);
}

#[tokio::test(start_paused = true)]
async fn gifter_data_waits_behind_empty_follower() {
    let h = Harness::start(ScriptedAnimator::instant);
    h.configure(instant_settings(["follower", "gifter"], 5.0)).await;
    h.push("gifter", json!({"name": "Ann"})).await;

    let first = h.renderer.last().unwrap();
    assert_eq!(first.label(), "follower");
    assert_eq!(first.payload(), None);

    pass_ms(5_000).await;
    assert_eq!(h.renderer.last().unwrap().payload(), Some(&json!({"name": "Ann"})));

    pass_ms(5_000).await;
    assert_eq!(h.renderer.labels(), ["follower", "gifter", "follower"]);
}

#[tokio::test(start_paused = true)]
async fn rotation_wraps_back_to_first_key() {
    let h = Harness::start(ScriptedAnimator::instant);
    h.configure(instant_settings(["a", "b", "c"], 1.0)).await;

    pass_ms(3_000).await;
    assert_eq!(h.renderer.labels(), ["a", "b", "c", "a"]);

    let status = h.pipeline.status().await.unwrap();
    assert_eq!(status.current_index, 0);
    assert_eq!(status.displayed_key.as_ref().map(|k| k.as_str()), Some("a"));
    assert_eq!(h.pipeline.stats().await.unwrap().ticks, 4);
}

#[tokio::test(start_paused = true)]
async fn keys_without_data_render_placeholder() {
    let h = Harness::start(ScriptedAnimator::instant);
    h.configure(instant_settings(["follower", "gifter"], 5.0)).await;

    let frame = h.renderer.last().unwrap();
    assert_eq!(frame.label(), "follower");
    assert!(frame.content.snapshot().is_none());
}

#[tokio::test(start_paused = true)]
async fn empty_selection_shows_empty_state_without_timer() {
    let h = Harness::start(ScriptedAnimator::instant);
    h.configure(instant_settings(["rotator", "  ", ""], 5.0)).await;

    assert_eq!(h.renderer.labels(), ["empty:no_sources"]);
    pass_ms(30_000).await;
    assert_eq!(h.renderer.count(), 1);

    let status = h.pipeline.status().await.unwrap();
    assert!(!status.timer_active);
    assert!(status.keys.is_empty());
    assert_eq!(h.pipeline.stats().await.unwrap().timers_started, 0);
}

#[tokio::test(start_paused = true)]
async fn push_for_displayed_key_rerenders_in_place() {
    let h = Harness::start(ScriptedAnimator::instant);
    h.configure(instant_settings(["follower", "gifter"], 5.0)).await;

    h.push("follower", json!({"name": "Cy"})).await;
    let frames = h.renderer.frames();
    assert_eq!(h.renderer.labels(), ["follower", "follower"]);
    assert!(frames[1].forced);
    assert_eq!(frames[1].payload(), Some(&json!({"name": "Cy"})));
    assert_eq!(h.pipeline.status().await.unwrap().current_index, 0);

    // The timer keeps its own cadence.
    pass_ms(5_000).await;
    assert_eq!(h.renderer.labels(), ["follower", "follower", "gifter"]);
}

#[tokio::test(start_paused = true)]
async fn push_for_other_key_waits_for_its_turn() {
    let h = Harness::start(ScriptedAnimator::instant);
    h.configure(instant_settings(["follower", "gifter"], 5.0)).await;

    h.push("gifter", json!({"name": "Dee"})).await;
    assert_eq!(h.renderer.count(), 1);

    pass_ms(5_000).await;
    let frame = h.renderer.last().unwrap();
    assert_eq!(frame.label(), "gifter");
    assert!(!frame.forced);
    assert_eq!(frame.payload(), Some(&json!({"name": "Dee"})));
}

#[tokio::test(start_paused = true)]
async fn single_key_rotation_refreshes_on_push_only() {
    let h = Harness::start(ScriptedAnimator::instant);
    h.configure(instant_settings(["gifter"], 5.0)).await;
    assert!(!h.pipeline.status().await.unwrap().timer_active);

    h.push("gifter", json!({"name": "Eve"})).await;
    assert_eq!(h.renderer.labels(), ["gifter", "gifter"]);

    pass_ms(20_000).await;
    assert_eq!(h.renderer.count(), 2);
}

#[tokio::test(start_paused = true)]
async fn non_object_payload_renders_as_no_data() {
    let h = Harness::start(ScriptedAnimator::instant);
    h.configure(instant_settings(["gifter"], 5.0)).await;
    h.push("gifter", json!({"name": "Fay"})).await;

    h.intake
        .push_json(r#"{"key":"gifter","payload":"Fay"}"#)
        .await
        .unwrap();
    settle().await;

    let frame = h.renderer.last().unwrap();
    assert_eq!(frame.label(), "gifter");
    assert!(frame.forced);
    assert_eq!(frame.payload(), None);
}

#[tokio::test(start_paused = true)]
async fn reconfigure_mid_transition_keeps_one_timer() {
    let h = Harness::start(ScriptedAnimator::configured);
    h.configure(SettingsUpdate::new(["a", "b"], 1.0)).await;
    assert_eq!(h.pipeline.status().await.unwrap().phase, TransitionPhase::AnimatingIn);

    pass_ms(250).await;
    h.configure(SettingsUpdate::new(["x", "y", "z"], 1.0)).await;

    let status = h.pipeline.status().await.unwrap();
    assert_eq!(status.config_version, ConfigVersion(2));
    assert!(status.timer_active);
    assert_eq!(status.live_timers, 1);

    // a finishes entering at 500, x renders at 1000, y at 2000.
    pass_ms(2_650).await;
    assert_eq!(h.renderer.labels(), ["a", "x", "y"]);

    let stats = h.pipeline.stats().await.unwrap();
    assert_eq!(stats.timers_started, 2);
    assert_eq!(stats.timers_stopped, 1);
    assert_eq!(stats.max_concurrent_phases, 1);
    assert_eq!(h.animator.max_active(), 1);
}

#[tokio::test(start_paused = true)]
async fn rapid_reconfiguration_shows_only_latest() {
    let h = Harness::start(ScriptedAnimator::configured);
    h.configure(SettingsUpdate::new(["a", "b"], 1.0)).await;
    for keys in [["c", "d"], ["e", "f"], ["g", "h"]] {
        h.intake.settings(SettingsUpdate::new(keys, 5.0)).await.unwrap();
    }
    settle().await;

    // a finishes entering at 500 and is animated out until 1000.
    pass_ms(1_100).await;
    assert_eq!(h.renderer.labels(), ["a", "g"]);
    assert_eq!(h.pipeline.status().await.unwrap().config_version, ConfigVersion(4));
}

#[tokio::test(start_paused = true)]
async fn reset_during_transition_never_renders_stale_target() {
    let h = Harness::start(ScriptedAnimator::configured);
    h.push("a", json!({"n": 1})).await;
    h.configure(SettingsUpdate::new(["a", "b"], 1.0)).await;

    // b starts animating out the current entry at 1000.
    pass_ms(1_200).await;
    assert_eq!(h.pipeline.status().await.unwrap().phase, TransitionPhase::AnimatingOut);

    h.intake.reset().await.unwrap();
    settle().await;

    pass_ms(10_000).await;
    assert_eq!(h.renderer.labels(), ["a", "empty:reset"]);
    assert!(h.renderer.last().unwrap().forced);

    let status = h.pipeline.status().await.unwrap();
    assert!(!status.timer_active);
    assert_eq!(status.cached_keys, 0);
    assert_eq!(status.phase, TransitionPhase::Idle);
    assert_eq!(h.pipeline.stats().await.unwrap().resets, 1);
}

#[tokio::test(start_paused = true)]
async fn push_racing_reset_leaves_nothing_behind() {
    let h = Harness::start(ScriptedAnimator::instant);
    h.configure(instant_settings(["a", "b"], 1.0)).await;

    h.intake.push(PushUpdate::new("a", json!({"n": 9}))).await.unwrap();
    h.intake.reset().await.unwrap();
    settle().await;
    pass_ms(5_000).await;

    assert_eq!(h.renderer.last().unwrap().label(), "empty:reset");
    let status = h.pipeline.status().await.unwrap();
    assert_eq!(status.cached_keys, 0);
    assert_eq!(status.displayed_key, None);
    assert_eq!(h.pipeline.stats().await.unwrap().max_concurrent_phases, 1);
}

#[tokio::test(start_paused = true)]
async fn configuration_after_reset_starts_fresh() {
    let h = Harness::start(ScriptedAnimator::instant);
    h.push("a", json!({"n": 1})).await;
    h.configure(instant_settings(["a", "b"], 1.0)).await;
    h.intake.reset().await.unwrap();
    settle().await;

    h.configure(instant_settings(["a", "b"], 1.0)).await;
    let frame = h.renderer.last().unwrap();
    assert_eq!(frame.label(), "a");
    assert_eq!(frame.payload(), None);
}

#[tokio::test(start_paused = true)]
async fn failing_animations_do_not_stall_rotation() {
    let h = Harness::start(|time| ScriptedAnimator::new(time, StepScript::Fail, StepScript::Fail));
    h.configure(SettingsUpdate::new(["a", "b"], 1.0)).await;

    pass_ms(2_000).await;
    assert_eq!(h.renderer.labels(), ["a", "b", "a"]);

    let stats = h.pipeline.stats().await.unwrap();
    assert_eq!(stats.animation_failures, 5);
    assert_eq!(stats.renders, 3);

    h.animator.set_script(AnimationDirection::Out, StepScript::Succeed(0));
    h.animator.set_script(AnimationDirection::In, StepScript::Succeed(0));
    pass_ms(1_000).await;
    assert_eq!(h.renderer.labels(), ["a", "b", "a", "b"]);
    assert_eq!(h.pipeline.stats().await.unwrap().animation_failures, 5);
}

#[tokio::test(start_paused = true)]
async fn hanging_animation_is_abandoned_at_ceiling() {
    let h = Harness::start(|time| {
        ScriptedAnimator::new(time, StepScript::Succeed(0), StepScript::Hang)
    });
    let animation = AnimationConfig {
        ceiling_ms: 2_000,
        ..AnimationConfig::default()
    };
    h.configure(SettingsUpdate::new(["a", "b"], 1.5).with_animation(animation))
        .await;

    // b is requested at 1500 but waits for a's entrance to time out at 2000.
    pass_ms(1_700).await;
    assert_eq!(h.renderer.labels(), ["a"]);

    pass_ms(1_800).await;
    assert_eq!(h.renderer.labels(), ["a", "b"]);
    let status = h.pipeline.status().await.unwrap();
    assert_eq!(status.phase, TransitionPhase::AnimatingIn);
    assert_eq!(h.pipeline.stats().await.unwrap().animation_failures, 1);
}

#[tokio::test(start_paused = true)]
async fn render_failures_are_treated_as_mounted() {
    let h = Harness::start(ScriptedAnimator::instant);
    h.renderer.fail_renders(true);
    h.configure(instant_settings(["a", "b"], 1.0)).await;

    pass_ms(1_000).await;
    assert_eq!(h.renderer.labels(), ["a", "b"]);
    let stats = h.pipeline.stats().await.unwrap();
    assert_eq!(stats.render_failures, 2);
    assert_eq!(
        h.pipeline.status().await.unwrap().displayed_key.map(|k| k.to_string()),
        Some("b".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn bootstrap_loads_snapshots_before_first_render() {
    let bootstrap = MemoryBootstrap::new(
        instant_settings(["follower", "gifter"], 5.0),
        vec![
            PushUpdate::new("follower", json!({"name": "Gus"})),
            PushUpdate::new("gifter", json!({"name": "Hal"})),
        ],
    );
    let h = Harness::with_bootstrap(ScriptedAnimator::instant, Some(bootstrap));
    settle().await;

    let frame = h.renderer.last().unwrap();
    assert_eq!(frame.label(), "follower");
    assert_eq!(frame.payload(), Some(&json!({"name": "Gus"})));
    assert_eq!(h.pipeline.status().await.unwrap().cached_keys, 2);
}

#[tokio::test(start_paused = true)]
async fn bootstrap_failure_shows_unconfigured_until_settings_arrive() {
    let h = Harness::with_bootstrap(ScriptedAnimator::instant, Some(MemoryBootstrap::unreachable()));
    settle().await;
    assert_eq!(h.renderer.labels(), ["empty:unconfigured"]);

    h.configure(instant_settings(["a"], 5.0)).await;
    assert_eq!(h.renderer.labels(), ["empty:unconfigured", "a"]);
    assert_eq!(h.animator.played().last(), Some(&AnimationDirection::In));
}

#[tokio::test(start_paused = true)]
async fn malformed_settings_keep_current_rotation() {
    let h = Harness::start(ScriptedAnimator::instant);
    h.configure(instant_settings(["a", "b"], 1.0)).await;

    h.intake.settings_json("{\"selectedKeys\": [").await.unwrap();
    h.intake.push_json(r#"{"payload":{"name":"nobody"}}"#).await.unwrap();
    settle().await;

    let status = h.pipeline.status().await.unwrap();
    assert_eq!(status.config_version, ConfigVersion(1));
    assert_eq!(status.keys.len(), 2);
    assert_eq!(h.pipeline.stats().await.unwrap().malformed_intake, 2);

    pass_ms(1_000).await;
    assert_eq!(h.renderer.labels(), ["a", "b"]);
}

#[tokio::test(start_paused = true)]
async fn zero_ceiling_still_mounts_content() {
    for _ in 0..10 {
        let h = Harness::start(ScriptedAnimator::instant);
        h.intake
            .settings_json(
                r#"{"selectedKeys":["follower"],"animationConfig":{"exitMs":0,"enterMs":0,"ceilingMs":0}}"#,
            )
            .await
            .unwrap();
        settle().await;

        assert_eq!(h.renderer.labels(), ["follower"]);
        let stats = h.pipeline.stats().await.unwrap();
        assert_eq!(stats.render_failures, 0);
        assert_eq!(stats.animation_failures, 0);
    }
}

#[tokio::test(start_paused = true)]
async fn bootstrap_snapshots_survive_settings_outage() {
    let bootstrap =
        MemoryBootstrap::without_settings(vec![PushUpdate::new("gifter", json!({"name": "Ivo"}))]);
    let h = Harness::with_bootstrap(ScriptedAnimator::instant, Some(bootstrap));
    settle().await;
    assert_eq!(h.renderer.labels(), ["empty:unconfigured"]);

    h.configure(instant_settings(["gifter"], 5.0)).await;
    let frame = h.renderer.last().unwrap();
    assert_eq!(frame.label(), "gifter");
    assert_eq!(frame.payload(), Some(&json!({"name": "Ivo"})));
}

#[tokio::test(start_paused = true)]
async fn interval_change_during_entrance_does_not_replay_it() {
    let h = Harness::start(ScriptedAnimator::configured);
    h.configure(SettingsUpdate::new(["a", "b"], 5.0)).await;

    pass_ms(250).await;
    h.configure(SettingsUpdate::new(["a", "b"], 10.0)).await;
    pass_ms(2_000).await;

    assert_eq!(h.renderer.labels(), ["a"]);
    assert_eq!(h.animator.played(), [AnimationDirection::In]);
    let status = h.pipeline.status().await.unwrap();
    assert_eq!(status.phase, TransitionPhase::Idle);
    assert_eq!(status.interval_ms, 10_000);
    assert_eq!(status.displayed_key.as_ref().map(|k| k.as_str()), Some("a"));
}

#[tokio::test(start_paused = true)]
async fn push_during_entrance_refreshes_after_it() {
    let h = Harness::start(ScriptedAnimator::configured);
    h.configure(SettingsUpdate::new(["a", "b"], 5.0)).await;

    // a is animating in until 500.
    pass_ms(200).await;
    assert_eq!(h.pipeline.status().await.unwrap().phase, TransitionPhase::AnimatingIn);
    h.push("a", json!({"n": 1})).await;
    assert_eq!(h.renderer.count(), 1);

    // Out 500..1000, refreshed a renders at 1000 and is in by 1500.
    pass_ms(1_400).await;
    let frames = h.renderer.frames();
    assert_eq!(h.renderer.labels(), ["a", "a"]);
    assert!(frames[1].forced);
    assert_eq!(frames[1].payload(), Some(&json!({"n": 1})));
    assert_eq!(
        h.animator.played(),
        [AnimationDirection::In, AnimationDirection::Out, AnimationDirection::In]
    );

    let stats = h.pipeline.stats().await.unwrap();
    assert_eq!(stats.forced_renders, 1);
    assert_eq!(stats.max_concurrent_phases, 1);
    assert_eq!(h.animator.max_active(), 1);
}

#[tokio::test(start_paused = true)]
async fn push_during_exit_is_read_by_the_next_render() {
    let h = Harness::start(ScriptedAnimator::configured);
    h.configure(SettingsUpdate::new(["a", "b"], 2.0)).await;

    // The tick at 2000 animates a out until 2500.
    pass_ms(2_200).await;
    assert_eq!(h.pipeline.status().await.unwrap().phase, TransitionPhase::AnimatingOut);
    h.push("b", json!({"n": 2})).await;
    h.push("a", json!({"n": 3})).await;

    pass_ms(900).await;
    assert_eq!(h.renderer.labels(), ["a", "b"]);
    let frame = h.renderer.last().unwrap();
    assert!(!frame.forced);
    assert_eq!(frame.payload(), Some(&json!({"n": 2})));

    let stats = h.pipeline.stats().await.unwrap();
    assert_eq!(stats.forced_renders, 0);
    assert_eq!(stats.max_concurrent_phases, 1);
    assert_eq!(h.animator.max_active(), 1);
}
