use tokio::sync::broadcast::error::TryRecvError;

use super::*;

fn event(attempted: &str) -> DenialEvent {
    DenialEvent {
        navigation: Uuid::new_v4(),
        attempted: attempted.to_owned(),
        redirect_to: "/sign-in".to_owned(),
        message: SIGN_IN_REQUIRED_MESSAGE.to_owned(),
    }
}

#[test]
fn notify_without_subscribers_is_silent() {
    DenialNotifier::default().notify(event("/create-order"));
}

#[test]
fn every_subscriber_receives_each_event() {
    let notifier = DenialNotifier::default();
    let mut a = notifier.subscribe();
    let mut b = notifier.subscribe();

    let sent = event("/orders/1");
    notifier.notify(sent.clone());

    assert_eq!(a.try_recv().unwrap(), sent);
    assert_eq!(b.try_recv().unwrap(), sent);
    assert!(matches!(a.try_recv(), Err(TryRecvError::Empty)));
}

#[test]
fn late_subscriber_misses_earlier_events() {
    let notifier = DenialNotifier::default();
    notifier.notify(event("/create-order"));
    let mut rx = notifier.subscribe();
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[test]
fn zero_capacity_is_clamped() {
    let notifier = DenialNotifier::new(0);
    let mut rx = notifier.subscribe();
    notifier.notify(event("/feed"));
    assert!(rx.try_recv().is_ok());
}
