use super::*;
use std::time::Duration;

fn center(policy: NotificationPolicy) -> (NotificationCenter, broadcast::Receiver<ViewEvent>) {
    let (events, rx) = broadcast::channel(64);
    (NotificationCenter::new(policy, events), rx)
}

#[tokio::test(start_paused = true)]
async fn banner_fades_then_disappears() {
    let (center, mut events) = center(NotificationPolicy::Stack);
    let id = center.display(NotificationKind::Success, "Recipe deleted");

    assert!(matches!(
        events.recv().await,
        Ok(ViewEvent::NotificationShown(n)) if n.id == id
    ));
    assert_eq!(center.visible()[0].phase, NotificationPhase::Visible);

    tokio::time::sleep(DISPLAY_DURATION + Duration::from_millis(100)).await;
    assert_eq!(center.visible()[0].phase, NotificationPhase::Fading);
    assert!(matches!(
        events.recv().await,
        Ok(ViewEvent::NotificationFading(fading)) if fading == id
    ));

    tokio::time::sleep(FADE_DURATION).await;
    assert!(center.visible().is_empty());
    assert!(matches!(
        events.recv().await,
        Ok(ViewEvent::NotificationDismissed(gone)) if gone == id
    ));
}

#[tokio::test(start_paused = true)]
async fn stacked_banners_are_newest_first_and_expire_independently() {
    let (center, _events) = center(NotificationPolicy::Stack);
    let first = center.display(NotificationKind::Info, "No recipes found");
    tokio::time::sleep(Duration::from_millis(1000)).await;
    let second = center.display(NotificationKind::Info, "No recipes found");

    let visible: Vec<_> = center.visible().into_iter().map(|n| n.id).collect();
    assert_eq!(visible, vec![second, first]);

    tokio::time::sleep(Duration::from_millis(2000)).await;
    let visible: Vec<_> = center.visible().into_iter().map(|n| n.id).collect();
    assert_eq!(visible, vec![second]);
}

#[tokio::test(start_paused = true)]
async fn dismiss_cancels_scheduled_fade() {
    let (center, mut events) = center(NotificationPolicy::Stack);
    let id = center.display(NotificationKind::Error, "Could not add recipe");
    let _ = events.recv().await;

    assert!(center.dismiss(id));
    assert!(!center.dismiss(id));
    assert!(matches!(
        events.recv().await,
        Ok(ViewEvent::NotificationDismissed(gone)) if gone == id
    ));

    tokio::time::sleep(DISPLAY_DURATION + FADE_DURATION + Duration::from_millis(50)).await;
    assert!(matches!(
        events.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    ));
}

#[tokio::test(start_paused = true)]
async fn supersede_policy_keeps_only_latest() {
    let (center, _events) = center(NotificationPolicy::Supersede);
    center.display(NotificationKind::Info, "first");
    let latest = center.display(NotificationKind::Success, "second");

    let visible = center.visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, latest);
    assert_eq!(visible[0].message, "second");
    assert_eq!(center.policy(), NotificationPolicy::Supersede);
}

#[test]
fn kinds_have_stable_names() {
    assert_eq!(NotificationKind::Success.as_str(), "success");
    assert_eq!(NotificationKind::Error.as_str(), "error");
    assert_eq!(NotificationKind::Info.as_str(), "info");
}
